pub mod memory;
pub mod reference;
pub mod store;

pub use memory::MemoryStore;
pub use reference::ReferenceData;
pub use store::GroupStore;

#[cfg(test)]
pub use store::MockGroupStore;
