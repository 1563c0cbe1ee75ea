use std::collections::HashMap;

use crate::models::{capitalize, FrequencyVector, Vocabulary};

/// Counts group tokens into a vector over the vocabulary
#[derive(Debug, Clone)]
pub struct FrequencyVectorBuilder {
    index: HashMap<String, usize>,
    dimension: usize,
}

impl FrequencyVectorBuilder {
    pub fn new(vocabulary: &Vocabulary) -> Self {
        let index = vocabulary
            .labels()
            .iter()
            .enumerate()
            .map(|(i, label)| (label.clone(), i))
            .collect();

        Self {
            index,
            dimension: vocabulary.len(),
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Builds the frequency vector for a bag of tokens
    ///
    /// Tokens are capitalized before lookup; tokens outside the vocabulary are
    /// ignored. The result always has the vocabulary's length.
    pub fn build<S: AsRef<str>>(&self, bag: &[S]) -> FrequencyVector {
        let mut vector = FrequencyVector::zeros(self.dimension);
        let mut unmatched = 0usize;

        for token in bag {
            match self.index.get(&capitalize(token.as_ref())) {
                Some(&i) => vector.increment(i),
                None => unmatched += 1,
            }
        }

        if unmatched > 0 {
            tracing::debug!(
                unmatched,
                total = bag.len(),
                "Tokens outside the vocabulary were ignored"
            );
        }

        vector
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> FrequencyVectorBuilder {
        FrequencyVectorBuilder::new(&Vocabulary::new(["Italian", "Mexican", "Coffee"]).unwrap())
    }

    #[test]
    fn test_single_member_vector() {
        let vector = builder().build(&["Italian", "Coffee", "Vegan"]);
        assert_eq!(vector.as_slice(), &[1.0, 0.0, 1.0]);
    }

    #[test]
    fn test_duplicates_increase_frequency() {
        let vector = builder().build(&["Italian", "Italian", "Mexican"]);
        assert_eq!(vector.as_slice(), &[2.0, 1.0, 0.0]);
    }

    #[test]
    fn test_lookup_is_capitalized() {
        let vector = builder().build(&["ITALIAN", "coffee"]);
        assert_eq!(vector.as_slice(), &[1.0, 0.0, 1.0]);
    }

    #[test]
    fn test_empty_bag_is_all_zero() {
        let bag: [&str; 0] = [];
        let vector = builder().build(&bag);
        assert_eq!(vector.len(), 3);
        assert!(vector.is_zero());
    }

    #[test]
    fn test_length_always_matches_vocabulary() {
        let vocabulary = Vocabulary::new((0..122).map(|i| format!("label {}", i))).unwrap();
        let builder = FrequencyVectorBuilder::new(&vocabulary);

        for bag in [vec![], vec!["Label 3"], vec!["unknown"; 500]] {
            assert_eq!(builder.build(&bag).len(), 122);
        }
    }
}
