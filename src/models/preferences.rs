use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Accepted answers for the dietary-preference question
pub const DIETARY_OPTIONS: [&str; 4] = ["Vegan", "Vegetarian", "Non-Vegetarian", "No Preference"];

/// One question of the dining survey
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    PreferredCuisine,
    UsualEatingTime,
    PreferredPlace,
    MainCourse,
    ExtraTreat,
    DrinkChoice,
    ComfortSip,
    DietaryPreference,
}

impl Dimension {
    /// Dimensions whose answers are positive category signals
    pub const POSITIVE: [Dimension; 7] = [
        Dimension::PreferredCuisine,
        Dimension::UsualEatingTime,
        Dimension::PreferredPlace,
        Dimension::MainCourse,
        Dimension::ExtraTreat,
        Dimension::DrinkChoice,
        Dimension::ComfortSip,
    ];

    pub const ALL: [Dimension; 8] = [
        Dimension::PreferredCuisine,
        Dimension::UsualEatingTime,
        Dimension::PreferredPlace,
        Dimension::MainCourse,
        Dimension::ExtraTreat,
        Dimension::DrinkChoice,
        Dimension::ComfortSip,
        Dimension::DietaryPreference,
    ];

    /// Field name used in survey payloads
    pub fn field_name(&self) -> &'static str {
        match self {
            Dimension::PreferredCuisine => "preferred_cuisine",
            Dimension::UsualEatingTime => "usual_eating_time",
            Dimension::PreferredPlace => "preferred_place",
            Dimension::MainCourse => "main_course",
            Dimension::ExtraTreat => "extra_treat",
            Dimension::DrinkChoice => "drink_choice",
            Dimension::ComfortSip => "comfort_sip",
            Dimension::DietaryPreference => "dietary_preference",
        }
    }
}

impl Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.field_name())
    }
}

/// A survey answer: either one label or a multi-select list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    One(String),
    Many(Vec<String>),
}

impl FieldValue {
    /// True when the answer carries no label at all
    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::One(value) => value.trim().is_empty(),
            FieldValue::Many(values) => values.iter().all(|v| v.trim().is_empty()),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::One(value.to_string())
    }
}

impl From<Vec<&str>> for FieldValue {
    fn from(values: Vec<&str>) -> Self {
        FieldValue::Many(values.into_iter().map(String::from).collect())
    }
}

/// One member's raw survey answers
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPreferenceSet {
    #[serde(default)]
    pub preferred_cuisine: Option<FieldValue>,
    #[serde(default)]
    pub usual_eating_time: Option<FieldValue>,
    #[serde(default)]
    pub preferred_place: Option<FieldValue>,
    #[serde(default)]
    pub main_course: Option<FieldValue>,
    #[serde(default)]
    pub extra_treat: Option<FieldValue>,
    #[serde(default)]
    pub drink_choice: Option<FieldValue>,
    #[serde(default)]
    pub comfort_sip: Option<FieldValue>,
    #[serde(default)]
    pub dietary_preference: Option<String>,
}

impl RawPreferenceSet {
    /// Answer for one of the positive-signal dimensions
    ///
    /// Dietary preference is single-valued and read through `dietary_preference`.
    pub fn field(&self, dimension: Dimension) -> Option<&FieldValue> {
        match dimension {
            Dimension::PreferredCuisine => self.preferred_cuisine.as_ref(),
            Dimension::UsualEatingTime => self.usual_eating_time.as_ref(),
            Dimension::PreferredPlace => self.preferred_place.as_ref(),
            Dimension::MainCourse => self.main_course.as_ref(),
            Dimension::ExtraTreat => self.extra_treat.as_ref(),
            Dimension::DrinkChoice => self.drink_choice.as_ref(),
            Dimension::ComfortSip => self.comfort_sip.as_ref(),
            Dimension::DietaryPreference => None,
        }
    }

    /// Dimensions left unanswered
    pub fn missing_dimensions(&self) -> Vec<Dimension> {
        let mut missing: Vec<Dimension> = Dimension::POSITIVE
            .iter()
            .copied()
            .filter(|d| self.field(*d).map_or(true, FieldValue::is_blank))
            .collect();

        if self
            .dietary_preference
            .as_deref()
            .map_or(true, |v| v.trim().is_empty())
        {
            missing.push(Dimension::DietaryPreference);
        }

        missing
    }
}
