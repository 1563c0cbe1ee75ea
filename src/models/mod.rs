mod catalogue;
mod group;
mod preferences;
mod review;

pub use catalogue::{
    capitalize, ArchetypeCatalogue, ArchetypeId, CatalogueError, FrequencyVector,
    RecommendationList, RecommendedItem, Vocabulary,
};
pub use group::{Group, GroupId, GroupPhase, GroupProgress, GroupStatus, Member};
pub use preferences::{Dimension, FieldValue, RawPreferenceSet, DIETARY_OPTIONS};
pub use review::{ItemRating, RatedItem, SatisfactionSurvey, RATING_RANGE};
