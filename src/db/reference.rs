use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde_json::{Map, Value};

use crate::{
    error::{AppError, AppResult},
    models::{ArchetypeCatalogue, ArchetypeId, FrequencyVector, RecommendationList, Vocabulary},
};

pub const VOCABULARY_FILE: &str = "vocabulary.json";
pub const BUSINESS_NAMES_FILE: &str = "business_names.json";

pub fn archetypes_file(group_size: usize) -> String {
    format!("archetypes_size_{}.json", group_size)
}

pub fn recommendations_file(group_size: usize) -> String {
    format!("recommendations_size_{}.json", group_size)
}

/// Vocabulary, catalogues and display names, loaded once at startup
#[derive(Debug)]
pub struct ReferenceData {
    pub vocabulary: Vocabulary,
    pub catalogues: Vec<ArchetypeCatalogue>,
    pub business_names: HashMap<String, String>,
}

impl ReferenceData {
    /// Loads every file for the given group-size buckets from `dir`
    pub fn load(dir: &Path, group_sizes: &[usize]) -> AppResult<Self> {
        let vocabulary = parse_vocabulary(&read(&dir.join(VOCABULARY_FILE))?)?;

        let catalogues = group_sizes
            .iter()
            .map(|size| {
                let archetypes = read(&dir.join(archetypes_file(*size)))?;
                let recommendations = read(&dir.join(recommendations_file(*size)))?;
                parse_catalogue(*size, vocabulary.len(), &archetypes, &recommendations)
            })
            .collect::<AppResult<Vec<_>>>()?;

        let names_path = dir.join(BUSINESS_NAMES_FILE);
        let business_names = if names_path.exists() {
            parse_business_names(&read(&names_path)?)?
        } else {
            tracing::info!(path = %names_path.display(), "No business names file, showing item ids");
            HashMap::new()
        };

        tracing::info!(
            vocabulary = vocabulary.len(),
            catalogues = catalogues.len(),
            business_names = business_names.len(),
            "Reference data loaded"
        );

        Ok(Self {
            vocabulary,
            catalogues,
            business_names,
        })
    }
}

fn read(path: &Path) -> AppResult<String> {
    fs::read_to_string(path)
        .map_err(|e| AppError::DataLoad(format!("Failed to read {}: {}", path.display(), e)))
}

/// Parses a JSON array of category labels
pub fn parse_vocabulary(json: &str) -> AppResult<Vocabulary> {
    let labels: Vec<String> = serde_json::from_str(json)?;
    Vocabulary::new(labels).map_err(|e| AppError::DataLoad(e.to_string()))
}

/// Parses one bucket's archetype vectors and recommendation lists
///
/// Both files are JSON objects keyed by archetype id; key order is kept.
pub fn parse_catalogue(
    group_size: usize,
    dimension: usize,
    archetypes_json: &str,
    recommendations_json: &str,
) -> AppResult<ArchetypeCatalogue> {
    let archetypes: Map<String, Value> = serde_json::from_str(archetypes_json)?;
    let archetypes = archetypes
        .into_iter()
        .map(|(id, vector)| {
            let vector: Vec<f64> = serde_json::from_value(vector).map_err(|e| {
                AppError::DataLoad(format!("Archetype {} has an invalid vector: {}", id, e))
            })?;
            Ok((ArchetypeId::from(id), FrequencyVector::from(vector)))
        })
        .collect::<AppResult<Vec<_>>>()?;

    let lists: Map<String, Value> = serde_json::from_str(recommendations_json)?;
    let recommendations = lists
        .into_iter()
        .map(|(id, list)| {
            let items = parse_recommendation_list(&id, list)?;
            Ok((ArchetypeId::from(id), items))
        })
        .collect::<AppResult<HashMap<_, _>>>()?;

    ArchetypeCatalogue::new(group_size, dimension, archetypes, recommendations)
        .map_err(|e| AppError::DataLoad(format!("Group size {}: {}", group_size, e)))
}

fn parse_recommendation_list(archetype: &str, list: Value) -> AppResult<RecommendationList> {
    let Value::Object(items) = list else {
        return Err(AppError::DataLoad(format!(
            "Recommendations for archetype {} must be an object",
            archetype
        )));
    };

    items
        .into_iter()
        .map(|(item_id, score)| match score.as_f64() {
            Some(score) => Ok((item_id, score)),
            None => Err(AppError::DataLoad(format!(
                "Item {} of archetype {} has a non-numeric score",
                item_id, archetype
            ))),
        })
        .collect()
}

/// Parses a JSON object of item id to display name
pub fn parse_business_names(json: &str) -> AppResult<HashMap<String, String>> {
    Ok(serde_json::from_str(json)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_vocabulary_capitalizes() {
        let vocabulary = parse_vocabulary(r#"["italian", "street food stalls"]"#).unwrap();
        assert_eq!(vocabulary.labels(), &["Italian", "Street food stalls"]);
    }

    #[test]
    fn test_parse_vocabulary_rejects_duplicates() {
        let err = parse_vocabulary(r#"["Tea", "TEA"]"#).unwrap_err();
        assert!(matches!(err, AppError::DataLoad(_)));
    }

    #[test]
    fn test_parse_catalogue_keeps_file_order() {
        let catalogue = parse_catalogue(
            5,
            2,
            r#"{"9": [1, 0], "2": [0, 1], "5": [1, 1]}"#,
            r#"{"9": {"zeta": 5.0, "alpha": 4.5}}"#,
        )
        .unwrap();

        let ids: Vec<&str> = catalogue.archetypes().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["9", "2", "5"]);

        let list = catalogue
            .recommendations_for(&ArchetypeId::from("9"))
            .unwrap();
        let items: Vec<&str> = list.items().iter().map(|i| i.item_id.as_str()).collect();
        assert_eq!(items, vec!["zeta", "alpha"]);
        assert!(catalogue.recommendations_for(&ArchetypeId::from("2")).is_none());
    }

    #[test]
    fn test_parse_catalogue_rejects_wrong_length() {
        let err = parse_catalogue(5, 3, r#"{"1": [1, 0]}"#, "{}").unwrap_err();
        assert!(matches!(err, AppError::DataLoad(_)));
    }

    #[test]
    fn test_parse_catalogue_rejects_non_numeric_score() {
        let err = parse_catalogue(5, 1, r#"{"1": [1]}"#, r#"{"1": {"b": "great"}}"#).unwrap_err();
        assert!(matches!(err, AppError::DataLoad(_)));
    }

    #[test]
    fn test_load_from_directory() {
        let temp = tempfile::tempdir().unwrap();
        let dir = temp.path();
        fs::write(dir.join(VOCABULARY_FILE), r#"["Italian", "Coffee"]"#).unwrap();
        fs::write(dir.join(archetypes_file(5)), r#"{"0": [1, 0]}"#).unwrap();
        fs::write(dir.join(recommendations_file(5)), r#"{"0": {"b1": 1.5}}"#).unwrap();
        fs::write(dir.join(BUSINESS_NAMES_FILE), r#"{"b1": "Cafe Uno"}"#).unwrap();

        let data = ReferenceData::load(dir, &[5]).unwrap();
        assert_eq!(data.vocabulary.len(), 2);
        assert_eq!(data.catalogues.len(), 1);
        assert_eq!(data.catalogues[0].group_size(), 5);
        assert_eq!(data.business_names.get("b1").unwrap(), "Cafe Uno");

        let err = ReferenceData::load(dir, &[8]).unwrap_err();
        assert!(matches!(err, AppError::DataLoad(_)));
    }

    #[test]
    fn test_business_names_are_optional() {
        let temp = tempfile::tempdir().unwrap();
        let dir = temp.path();
        fs::write(dir.join(VOCABULARY_FILE), r#"["Tea"]"#).unwrap();
        fs::write(dir.join(archetypes_file(8)), r#"{"0": [2]}"#).unwrap();
        fs::write(dir.join(recommendations_file(8)), r#"{"0": {"b7": 3.0}}"#).unwrap();

        let data = ReferenceData::load(dir, &[8]).unwrap();
        assert!(data.business_names.is_empty());
    }
}
