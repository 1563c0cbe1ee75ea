use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use uuid::Uuid;

use super::{ItemRating, RawPreferenceSet, SatisfactionSurvey};

/// Identifier of a dining group
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(String);

impl GroupId {
    /// Generates a fresh group id (e.g. "group_3f2c...")
    pub fn generate() -> Self {
        Self(format!("group_{}", Uuid::new_v4().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for GroupId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for GroupId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Display for GroupId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A fixed-size group of diners
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub group_id: GroupId,
    pub group_size: usize,
    pub created_at: DateTime<Utc>,
}

impl Group {
    pub fn new(group_size: usize) -> Self {
        Self {
            group_id: GroupId::generate(),
            group_size,
            created_at: Utc::now(),
        }
    }
}

/// A group member and everything they have submitted so far
#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    pub user_id: String,
    pub preferences: Option<RawPreferenceSet>,
    pub recommendations_shown: bool,
    pub ratings: Vec<ItemRating>,
    pub review: Option<SatisfactionSurvey>,
}

impl Member {
    pub fn new(user_id: String) -> Self {
        Self {
            user_id,
            preferences: None,
            recommendations_shown: false,
            ratings: Vec::new(),
            review: None,
        }
    }

    pub fn has_rated(&self) -> bool {
        !self.ratings.is_empty()
    }
}

/// Where a group is in the survey workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupPhase {
    CollectingPreferences,
    ReadyToMatch,
    RecommendationsShown,
    CollectingRatings,
    RatingsComplete,
    CollectingReviews,
    Done,
}

/// Submission counters for one group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupProgress {
    pub group_size: usize,
    pub members: usize,
    pub preferences_submitted: usize,
    pub recommendations_shown: usize,
    pub ratings_submitted: usize,
    pub reviews_submitted: usize,
}

impl GroupProgress {
    pub fn is_full(&self) -> bool {
        self.members >= self.group_size
    }

    pub fn all_preferences_submitted(&self) -> bool {
        self.preferences_submitted >= self.group_size
    }

    pub fn all_rated(&self) -> bool {
        self.ratings_submitted >= self.group_size
    }

    pub fn waiting_for_preferences(&self) -> usize {
        self.group_size.saturating_sub(self.preferences_submitted)
    }

    pub fn waiting_for_ratings(&self) -> usize {
        self.group_size.saturating_sub(self.ratings_submitted)
    }

    /// Derives the workflow phase from the counters
    pub fn phase(&self) -> GroupPhase {
        if !self.all_preferences_submitted() {
            GroupPhase::CollectingPreferences
        } else if self.recommendations_shown == 0 {
            GroupPhase::ReadyToMatch
        } else if self.ratings_submitted == 0 {
            GroupPhase::RecommendationsShown
        } else if !self.all_rated() {
            GroupPhase::CollectingRatings
        } else if self.reviews_submitted == 0 {
            GroupPhase::RatingsComplete
        } else if self.reviews_submitted < self.group_size {
            GroupPhase::CollectingReviews
        } else {
            GroupPhase::Done
        }
    }
}

/// Group status returned to clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupStatus {
    pub group_id: GroupId,
    pub group_size: usize,
    pub current_members: usize,
    pub preferences_submitted: usize,
    pub recommendations_shown: usize,
    pub ratings_submitted: usize,
    pub reviews_submitted: usize,
    pub is_full: bool,
    pub all_preferences_submitted: bool,
    pub phase: GroupPhase,
}

impl GroupStatus {
    pub fn new(group_id: GroupId, progress: GroupProgress) -> Self {
        Self {
            group_id,
            group_size: progress.group_size,
            current_members: progress.members,
            preferences_submitted: progress.preferences_submitted,
            recommendations_shown: progress.recommendations_shown,
            ratings_submitted: progress.ratings_submitted,
            reviews_submitted: progress.reviews_submitted,
            is_full: progress.is_full(),
            all_preferences_submitted: progress.all_preferences_submitted(),
            phase: progress.phase(),
        }
    }
}
