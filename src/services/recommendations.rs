use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;

use crate::{
    models::{ArchetypeCatalogue, ArchetypeId, RecommendationList, Vocabulary},
    services::{
        matcher::{ArchetypeMatch, ArchetypeMatcher},
        vector::FrequencyVectorBuilder,
    },
};

/// Reasons a group cannot be given recommendations
#[derive(Debug, Error, PartialEq)]
pub enum RecommendationError {
    #[error("group has no usable preferences")]
    EmptyInput,
    #[error("no catalogue is loaded for group size {0}")]
    UnsupportedGroupSize(usize),
    #[error("catalogue for group size {0} has no archetypes")]
    NoArchetypes(usize),
    #[error("archetype {0} has no recommendations")]
    MissingRecommendations(ArchetypeId),
    #[error("catalogue for group size {group_size} has {actual} dimensions, vocabulary has {expected}")]
    DimensionMismatch {
        group_size: usize,
        expected: usize,
        actual: usize,
    },
}

/// Result of matching a group against its catalogue
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupRecommendation {
    pub archetype_id: ArchetypeId,
    pub similarity: f64,
    /// Set when no archetype shared any category with the group
    pub degenerate: bool,
    pub items: RecommendationList,
}

/// Returns an archetype's ranked list, failing when it is absent or empty
pub fn lookup<'a>(
    catalogue: &'a ArchetypeCatalogue,
    archetype_id: &ArchetypeId,
) -> Result<&'a RecommendationList, RecommendationError> {
    match catalogue.recommendations_for(archetype_id) {
        Some(list) if !list.is_empty() => Ok(list),
        _ => Err(RecommendationError::MissingRecommendations(
            archetype_id.clone(),
        )),
    }
}

/// Group matching pipeline over immutable reference data
///
/// Built once at startup; every call recomputes the vector from the bag it is
/// given and keeps no state between calls.
#[derive(Debug)]
pub struct RecommendationEngine {
    builder: FrequencyVectorBuilder,
    catalogues: BTreeMap<usize, ArchetypeCatalogue>,
}

impl RecommendationEngine {
    /// Fails when a catalogue's vectors do not span the vocabulary
    pub fn new<I>(vocabulary: &Vocabulary, catalogues: I) -> Result<Self, RecommendationError>
    where
        I: IntoIterator<Item = ArchetypeCatalogue>,
    {
        let builder = FrequencyVectorBuilder::new(vocabulary);
        let catalogues = catalogues
            .into_iter()
            .map(|c| {
                if c.dimension() != builder.dimension() {
                    return Err(RecommendationError::DimensionMismatch {
                        group_size: c.group_size(),
                        expected: builder.dimension(),
                        actual: c.dimension(),
                    });
                }
                Ok((c.group_size(), c))
            })
            .collect::<Result<BTreeMap<_, _>, _>>()?;

        Ok(Self {
            builder,
            catalogues,
        })
    }

    pub fn supports(&self, group_size: usize) -> bool {
        self.catalogues.contains_key(&group_size)
    }

    pub fn group_sizes(&self) -> Vec<usize> {
        self.catalogues.keys().copied().collect()
    }

    /// Finds the closest archetype for a bag of tokens
    pub fn match_group<S: AsRef<str>>(
        &self,
        bag: &[S],
        group_size: usize,
    ) -> Result<ArchetypeMatch, RecommendationError> {
        let catalogue = self.catalogue(group_size)?;
        let vector = self.builder.build(bag);

        ArchetypeMatcher::new(catalogue)
            .best_match(&vector)
            .ok_or(RecommendationError::NoArchetypes(group_size))
    }

    /// Full pipeline: bag, vector, archetype, ranked list
    pub fn recommend<S: AsRef<str>>(
        &self,
        bag: &[S],
        group_size: usize,
    ) -> Result<GroupRecommendation, RecommendationError> {
        let catalogue = self.catalogue(group_size)?;
        if bag.is_empty() {
            return Err(RecommendationError::EmptyInput);
        }

        let matched = self.match_group(bag, group_size)?;
        let degenerate = matched.is_degenerate();
        if degenerate {
            tracing::warn!(
                group_size,
                archetype_id = %matched.archetype_id,
                "No archetype shares a category with the group, using catalogue order"
            );
        }

        let items = lookup(catalogue, &matched.archetype_id)?.clone();

        tracing::info!(
            group_size,
            archetype_id = %matched.archetype_id,
            similarity = matched.similarity,
            items = items.len(),
            "Matched group to archetype"
        );

        Ok(GroupRecommendation {
            archetype_id: matched.archetype_id,
            similarity: matched.similarity,
            degenerate,
            items,
        })
    }

    fn catalogue(&self, group_size: usize) -> Result<&ArchetypeCatalogue, RecommendationError> {
        self.catalogues
            .get(&group_size)
            .ok_or(RecommendationError::UnsupportedGroupSize(group_size))
    }
}
