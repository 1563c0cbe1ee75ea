use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt::Display;
use thiserror::Error;

/// Errors raised while assembling reference data
#[derive(Debug, Error, PartialEq)]
pub enum CatalogueError {
    #[error("vocabulary is empty")]
    EmptyVocabulary,
    #[error("vocabulary label {0:?} appears more than once")]
    DuplicateLabel(String),
    #[error("archetype {archetype} has {actual} dimensions, expected {expected}")]
    DimensionMismatch {
        archetype: ArchetypeId,
        expected: usize,
        actual: usize,
    },
    #[error("archetype {archetype} has an invalid weight at index {index}")]
    InvalidWeight { archetype: ArchetypeId, index: usize },
    #[error("archetype {0} is defined more than once")]
    DuplicateArchetype(ArchetypeId),
}

/// Canonical capitalization: first character upper-case, the rest lower-case
pub fn capitalize(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Ordered category labels; a label's position is its vector index
#[derive(Debug, Clone, PartialEq)]
pub struct Vocabulary {
    labels: Vec<String>,
}

impl Vocabulary {
    pub fn new<I, S>(labels: I) -> Result<Self, CatalogueError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let labels: Vec<String> = labels.into_iter().map(|l| capitalize(l.as_ref())).collect();
        if labels.is_empty() {
            return Err(CatalogueError::EmptyVocabulary);
        }

        let mut seen = HashSet::new();
        for label in &labels {
            if !seen.insert(label.as_str()) {
                return Err(CatalogueError::DuplicateLabel(label.clone()));
            }
        }

        Ok(Self { labels })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }
}

/// Dense count vector over the vocabulary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrequencyVector(Vec<f64>);

impl FrequencyVector {
    pub fn zeros(len: usize) -> Self {
        Self(vec![0.0; len])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn increment(&mut self, index: usize) {
        self.0[index] += 1.0;
    }

    /// True when every component is zero
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|v| *v == 0.0)
    }
}

impl From<Vec<f64>> for FrequencyVector {
    fn from(values: Vec<f64>) -> Self {
        Self(values)
    }
}

/// Opaque key of a precomputed archetype group
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArchetypeId(String);

impl ArchetypeId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ArchetypeId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ArchetypeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Display for ArchetypeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One ranked recommendation of an archetype
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendedItem {
    pub item_id: String,
    pub score: f64,
}

/// Items in rank order, most desirable first
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecommendationList(Vec<RecommendedItem>);

impl RecommendationList {
    pub fn new(items: Vec<RecommendedItem>) -> Self {
        Self(items)
    }

    pub fn items(&self) -> &[RecommendedItem] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, item_id: &str) -> bool {
        self.0.iter().any(|item| item.item_id == item_id)
    }
}

impl FromIterator<(String, f64)> for RecommendationList {
    fn from_iter<T: IntoIterator<Item = (String, f64)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(item_id, score)| RecommendedItem { item_id, score })
                .collect(),
        )
    }
}

/// Precomputed archetype vectors and their recommendations for one group size
///
/// Archetypes keep their load order, which decides similarity ties.
#[derive(Debug, Clone)]
pub struct ArchetypeCatalogue {
    group_size: usize,
    dimension: usize,
    archetypes: Vec<(ArchetypeId, FrequencyVector)>,
    recommendations: HashMap<ArchetypeId, RecommendationList>,
}

impl ArchetypeCatalogue {
    pub fn new(
        group_size: usize,
        dimension: usize,
        archetypes: Vec<(ArchetypeId, FrequencyVector)>,
        recommendations: HashMap<ArchetypeId, RecommendationList>,
    ) -> Result<Self, CatalogueError> {
        let mut seen = HashSet::new();
        for (id, vector) in &archetypes {
            if !seen.insert(id) {
                return Err(CatalogueError::DuplicateArchetype(id.clone()));
            }
            if vector.len() != dimension {
                return Err(CatalogueError::DimensionMismatch {
                    archetype: id.clone(),
                    expected: dimension,
                    actual: vector.len(),
                });
            }
            if let Some(index) = vector
                .as_slice()
                .iter()
                .position(|v| !v.is_finite() || *v < 0.0)
            {
                return Err(CatalogueError::InvalidWeight {
                    archetype: id.clone(),
                    index,
                });
            }
        }

        Ok(Self {
            group_size,
            dimension,
            archetypes,
            recommendations,
        })
    }

    pub fn group_size(&self) -> usize {
        self.group_size
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.archetypes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.archetypes.is_empty()
    }

    /// Archetypes in catalogue order
    pub fn archetypes(&self) -> impl Iterator<Item = (&ArchetypeId, &FrequencyVector)> {
        self.archetypes.iter().map(|(id, vector)| (id, vector))
    }

    pub fn recommendations_for(&self, id: &ArchetypeId) -> Option<&RecommendationList> {
        self.recommendations.get(id)
    }
}
