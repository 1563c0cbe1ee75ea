use serde::Serialize;

use crate::models::{ArchetypeCatalogue, ArchetypeId, FrequencyVector};

/// Cosine similarity of two vectors; 0 when either has zero norm
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f64>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}

/// The archetype closest to a group vector
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArchetypeMatch {
    pub archetype_id: ArchetypeId,
    pub similarity: f64,
}

impl ArchetypeMatch {
    /// A zero similarity means the winner was picked by catalogue order alone
    pub fn is_degenerate(&self) -> bool {
        self.similarity <= 0.0
    }
}

/// Linear scan over one catalogue
pub struct ArchetypeMatcher<'a> {
    catalogue: &'a ArchetypeCatalogue,
}

impl<'a> ArchetypeMatcher<'a> {
    pub fn new(catalogue: &'a ArchetypeCatalogue) -> Self {
        Self { catalogue }
    }

    /// Finds the archetype with maximal cosine similarity
    ///
    /// Ties keep the first archetype in catalogue order. Returns `None` only for
    /// an empty catalogue.
    pub fn best_match(&self, vector: &FrequencyVector) -> Option<ArchetypeMatch> {
        let mut best: Option<ArchetypeMatch> = None;

        for (id, archetype) in self.catalogue.archetypes() {
            let similarity = cosine_similarity(vector.as_slice(), archetype.as_slice());
            let better = best.as_ref().map_or(true, |b| similarity > b.similarity);
            if better {
                best = Some(ArchetypeMatch {
                    archetype_id: id.clone(),
                    similarity,
                });
            }
        }

        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn catalogue(entries: Vec<(&str, Vec<f64>)>) -> ArchetypeCatalogue {
        let dimension = entries.first().map_or(0, |(_, v)| v.len());
        ArchetypeCatalogue::new(
            5,
            dimension,
            entries
                .into_iter()
                .map(|(id, v)| (ArchetypeId::from(id), FrequencyVector::from(v)))
                .collect(),
            HashMap::new(),
        )
        .unwrap()
    }

    #[test]
    fn test_cosine_similarity_basic() {
        let sim = cosine_similarity(&[2.0, 1.0, 0.0], &[1.0, 0.0, 0.0]);
        assert!((sim - 2.0 / 5f64.sqrt()).abs() < 1e-12);

        let same = cosine_similarity(&[3.0, 4.0], &[6.0, 8.0]);
        assert!((same - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_cosine_similarity_is_symmetric() {
        let pairs = [
            (vec![1.0, 2.0, 3.0], vec![0.0, 5.0, 1.0]),
            (vec![7.0, 0.0, 0.5], vec![2.0, 2.0, 2.0]),
            (vec![0.0, 0.0, 0.0], vec![1.0, 1.0, 1.0]),
        ];
        for (a, b) in pairs {
            assert_eq!(cosine_similarity(&a, &b), cosine_similarity(&b, &a));
        }
    }

    #[test]
    fn test_cosine_similarity_zero_vector_is_zero() {
        let sim = cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]);
        assert_eq!(sim, 0.0);
        assert!(!sim.is_nan());
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[0.0, 0.0]), 0.0);
    }

    #[test]
    fn test_best_match_picks_highest_similarity() {
        let catalogue = catalogue(vec![("A", vec![1.0, 0.0, 0.0]), ("B", vec![0.0, 1.0, 0.0])]);
        let matched = ArchetypeMatcher::new(&catalogue)
            .best_match(&FrequencyVector::from(vec![2.0, 1.0, 0.0]))
            .unwrap();

        assert_eq!(matched.archetype_id, ArchetypeId::from("A"));
        assert!((matched.similarity - 0.894).abs() < 1e-3);
        assert!(!matched.is_degenerate());
    }

    #[test]
    fn test_zero_vector_returns_first_archetype() {
        let catalogue = catalogue(vec![("B", vec![0.0, 1.0, 0.0]), ("A", vec![1.0, 0.0, 0.0])]);
        let matched = ArchetypeMatcher::new(&catalogue)
            .best_match(&FrequencyVector::zeros(3))
            .unwrap();

        assert_eq!(matched.archetype_id, ArchetypeId::from("B"));
        assert_eq!(matched.similarity, 0.0);
        assert!(matched.is_degenerate());
    }

    #[test]
    fn test_ties_keep_first_in_catalogue_order() {
        let catalogue = catalogue(vec![("first", vec![2.0, 0.0]), ("second", vec![3.0, 0.0])]);
        let matched = ArchetypeMatcher::new(&catalogue)
            .best_match(&FrequencyVector::from(vec![1.0, 0.0]))
            .unwrap();

        assert_eq!(matched.archetype_id, ArchetypeId::from("first"));
    }

    #[test]
    fn test_empty_catalogue_has_no_match() {
        let catalogue = catalogue(vec![]);
        assert!(ArchetypeMatcher::new(&catalogue)
            .best_match(&FrequencyVector::zeros(0))
            .is_none());
    }
}
