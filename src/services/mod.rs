pub mod groups;
pub mod matcher;
pub mod normalizer;
pub mod ratings;
pub mod recommendations;
pub mod vector;

pub use groups::{GroupService, NamedRecommendation, RecommendationOutcome, TopRatedOutcome};
pub use matcher::{cosine_similarity, ArchetypeMatch, ArchetypeMatcher};
pub use normalizer::Normalizer;
pub use recommendations::{GroupRecommendation, RecommendationEngine, RecommendationError};
pub use vector::FrequencyVectorBuilder;
