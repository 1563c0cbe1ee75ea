use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// Valid range for every 1-5 rating and survey answer
pub const RATING_RANGE: RangeInclusive<i64> = 1..=5;

/// One member's rating of one recommended item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRating {
    pub item_id: String,
    pub rating: i64,
}

/// Follow-up satisfaction questionnaire, every answer on a 1-5 scale
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SatisfactionSurvey {
    pub matched_interests: i64,
    pub discovered_new_items: i64,
    pub diverse_recommendations: i64,
    pub easy_to_find: i64,
    pub ideal_item_found: i64,
    pub overall_satisfaction: i64,
    pub confidence_in_decision: i64,
    pub would_buy_recommendations: i64,
    pub good_group_suggestions: i64,
    pub convinced_of_items: i64,
    pub confident_will_like: i64,
    pub trust_in_recommender: i64,
    /// Filled in by the server with the group's top-rated items at review time
    #[serde(default)]
    pub top_recommendations: Vec<String>,
}

impl SatisfactionSurvey {
    pub fn answers(&self) -> [(&'static str, i64); 12] {
        [
            ("matched_interests", self.matched_interests),
            ("discovered_new_items", self.discovered_new_items),
            ("diverse_recommendations", self.diverse_recommendations),
            ("easy_to_find", self.easy_to_find),
            ("ideal_item_found", self.ideal_item_found),
            ("overall_satisfaction", self.overall_satisfaction),
            ("confidence_in_decision", self.confidence_in_decision),
            ("would_buy_recommendations", self.would_buy_recommendations),
            ("good_group_suggestions", self.good_group_suggestions),
            ("convinced_of_items", self.convinced_of_items),
            ("confident_will_like", self.confident_will_like),
            ("trust_in_recommender", self.trust_in_recommender),
        ]
    }

    /// Names of answers outside 1-5
    pub fn out_of_range(&self) -> Vec<&'static str> {
        self.answers()
            .into_iter()
            .filter(|(_, value)| !RATING_RANGE.contains(value))
            .map(|(name, _)| name)
            .collect()
    }
}

/// A recommended item ranked by the group's mean rating
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatedItem {
    pub item_id: String,
    pub name: String,
    pub average_rating: f64,
    pub rating_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn survey(value: i64) -> SatisfactionSurvey {
        SatisfactionSurvey {
            matched_interests: value,
            discovered_new_items: value,
            diverse_recommendations: value,
            easy_to_find: value,
            ideal_item_found: value,
            overall_satisfaction: value,
            confidence_in_decision: value,
            would_buy_recommendations: value,
            good_group_suggestions: value,
            convinced_of_items: value,
            confident_will_like: value,
            trust_in_recommender: value,
            top_recommendations: vec![],
        }
    }

    #[test]
    fn test_valid_survey_has_no_out_of_range_answers() {
        assert!(survey(1).out_of_range().is_empty());
        assert!(survey(5).out_of_range().is_empty());
    }

    #[test]
    fn test_out_of_range_answers_are_named() {
        let mut s = survey(3);
        s.easy_to_find = 0;
        s.trust_in_recommender = 6;
        assert_eq!(s.out_of_range(), vec!["easy_to_find", "trust_in_recommender"]);
    }

    #[test]
    fn test_wide_answers_deserialize_and_are_flagged() {
        let mut json = serde_json::to_value(survey(4)).unwrap();
        json["matched_interests"] = serde_json::json!(300);
        json["easy_to_find"] = serde_json::json!(-1);

        let parsed: SatisfactionSurvey = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.out_of_range(), vec!["matched_interests", "easy_to_find"]);
    }

    #[test]
    fn test_survey_deserializes_without_top_recommendations() {
        let json = serde_json::json!({
            "matched_interests": 4,
            "discovered_new_items": 4,
            "diverse_recommendations": 4,
            "easy_to_find": 4,
            "ideal_item_found": 4,
            "overall_satisfaction": 4,
            "confidence_in_decision": 4,
            "would_buy_recommendations": 4,
            "good_group_suggestions": 4,
            "convinced_of_items": 4,
            "confident_will_like": 4,
            "trust_in_recommender": 4
        });
        let parsed: SatisfactionSurvey = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, survey(4));
    }
}
