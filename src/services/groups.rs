use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::Serialize;

use crate::{
    db::GroupStore,
    error::{AppError, AppResult},
    models::{
        ArchetypeId, Group, GroupId, GroupProgress, GroupStatus, ItemRating, RatedItem,
        RawPreferenceSet, SatisfactionSurvey, DIETARY_OPTIONS, RATING_RANGE,
    },
    services::{
        normalizer::Normalizer,
        ratings::{display_name, top_rated},
        recommendations::{GroupRecommendation, RecommendationEngine},
    },
};

/// How many top-rated items are snapshotted into a review
const REVIEW_TOP_ITEMS: usize = 3;

/// A recommended item as shown to a member
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedRecommendation {
    pub item_id: String,
    pub name: String,
    pub score: f64,
}

/// Recommendations, or how many members the group is still waiting for
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RecommendationOutcome {
    Incomplete {
        waiting_for: usize,
        message: String,
    },
    Complete {
        group_size: usize,
        archetype_id: ArchetypeId,
        similarity: f64,
        degenerate: bool,
        recommendations: Vec<NamedRecommendation>,
    },
}

/// Top-rated items, or how many members still have to rate
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TopRatedOutcome {
    Incomplete { waiting_for: usize, message: String },
    Complete { top_rated: Vec<RatedItem> },
}

/// Drives a group through preferences, recommendations, ratings and reviews
pub struct GroupService {
    store: Arc<dyn GroupStore>,
    engine: Arc<RecommendationEngine>,
    normalizer: Normalizer,
    item_names: HashMap<String, String>,
    top_rated_limit: usize,
}

impl GroupService {
    pub fn new(
        store: Arc<dyn GroupStore>,
        engine: Arc<RecommendationEngine>,
        normalizer: Normalizer,
    ) -> Self {
        Self {
            store,
            engine,
            normalizer,
            item_names: HashMap::new(),
            top_rated_limit: 5,
        }
    }

    pub fn with_item_names(mut self, item_names: HashMap<String, String>) -> Self {
        self.item_names = item_names;
        self
    }

    pub fn with_top_rated_limit(mut self, limit: usize) -> Self {
        self.top_rated_limit = limit;
        self
    }

    /// Creates a group for a size that has a loaded catalogue
    pub async fn create_group(&self, group_size: usize) -> AppResult<Group> {
        if !self.engine.supports(group_size) {
            return Err(AppError::InvalidInput(format!(
                "Unsupported group size {}. Supported sizes: {:?}",
                group_size,
                self.engine.group_sizes()
            )));
        }

        let group = Group::new(group_size);
        self.store.insert_group(group.clone()).await?;

        tracing::info!(group_id = %group.group_id, group_size, "Group created");
        Ok(group)
    }

    pub async fn join_group(&self, group_id: &GroupId, user_id: &str) -> AppResult<GroupProgress> {
        let user_id = user_id.trim();
        if user_id.is_empty() {
            return Err(AppError::InvalidInput("user_id cannot be empty".to_string()));
        }

        let progress = self.store.add_member(group_id, user_id).await?;
        tracing::info!(
            group_id = %group_id,
            members = progress.members,
            group_size = progress.group_size,
            "Member joined group"
        );
        Ok(progress)
    }

    pub async fn submit_preferences(
        &self,
        group_id: &GroupId,
        user_id: &str,
        preferences: RawPreferenceSet,
    ) -> AppResult<GroupProgress> {
        let missing = preferences.missing_dimensions();
        if !missing.is_empty() {
            let names: Vec<&str> = missing.iter().map(|d| d.field_name()).collect();
            return Err(AppError::InvalidInput(format!(
                "Please provide: {}",
                names.join(", ")
            )));
        }

        if let Some(dietary) = preferences.dietary_preference.as_deref() {
            if !DIETARY_OPTIONS.contains(&dietary) {
                return Err(AppError::InvalidInput(format!(
                    "Invalid dietary preference. Must be one of: {}",
                    DIETARY_OPTIONS.join(", ")
                )));
            }
        }

        let progress = self
            .store
            .save_preferences(group_id, user_id, preferences)
            .await?;

        tracing::info!(
            group_id = %group_id,
            submitted = progress.preferences_submitted,
            group_size = progress.group_size,
            "Preferences submitted"
        );
        Ok(progress)
    }

    /// Matches the group once every member has submitted preferences
    pub async fn recommendations(
        &self,
        group_id: &GroupId,
        user_id: &str,
    ) -> AppResult<RecommendationOutcome> {
        self.store.member(group_id, user_id).await?;
        let progress = self.store.progress(group_id).await?;
        if !progress.all_preferences_submitted() {
            let waiting_for = progress.waiting_for_preferences();
            return Ok(RecommendationOutcome::Incomplete {
                waiting_for,
                message: format!(
                    "Waiting for {} more members to submit preferences",
                    waiting_for
                ),
            });
        }

        let group = self.store.group(group_id).await?;
        let matched = self.match_group(&group).await?;
        self.store
            .mark_recommendations_shown(group_id, user_id)
            .await?;

        let recommendations = matched
            .items
            .items()
            .iter()
            .map(|item| NamedRecommendation {
                item_id: item.item_id.clone(),
                name: display_name(&self.item_names, &item.item_id),
                score: item.score,
            })
            .collect();

        Ok(RecommendationOutcome::Complete {
            group_size: group.group_size,
            archetype_id: matched.archetype_id,
            similarity: matched.similarity,
            degenerate: matched.degenerate,
            recommendations,
        })
    }

    /// Records one member's 1-5 rating of every recommended item
    pub async fn submit_ratings(
        &self,
        group_id: &GroupId,
        user_id: &str,
        ratings: Vec<ItemRating>,
    ) -> AppResult<GroupProgress> {
        let member = self.store.member(group_id, user_id).await?;
        if !member.recommendations_shown {
            return Err(AppError::PreconditionFailed(
                "Recommendations must be shown before rating them".to_string(),
            ));
        }

        if let Some(invalid) = ratings.iter().find(|r| !RATING_RANGE.contains(&r.rating)) {
            return Err(AppError::InvalidInput(format!(
                "Rating for {} must be between 1 and 5, got {}",
                invalid.item_id, invalid.rating
            )));
        }

        let mut given: HashSet<&str> = HashSet::with_capacity(ratings.len());
        if let Some(repeated) = ratings.iter().find(|r| !given.insert(r.item_id.as_str())) {
            return Err(AppError::InvalidInput(format!(
                "{} was rated more than once",
                repeated.item_id
            )));
        }

        let group = self.store.group(group_id).await?;
        let matched = self.match_group(&group).await?;
        let expected: HashSet<&str> = matched
            .items
            .items()
            .iter()
            .map(|i| i.item_id.as_str())
            .collect();
        if expected != given {
            return Err(AppError::InvalidInput(
                "Please rate every recommendation exactly once".to_string(),
            ));
        }

        let progress = self.store.save_ratings(group_id, user_id, ratings).await?;

        tracing::info!(
            group_id = %group_id,
            rated = progress.ratings_submitted,
            group_size = progress.group_size,
            "Ratings submitted"
        );
        Ok(progress)
    }

    /// Group's favourite items once every member has rated
    pub async fn top_rated(&self, group_id: &GroupId) -> AppResult<TopRatedOutcome> {
        let progress = self.store.progress(group_id).await?;
        if !progress.all_rated() {
            let waiting_for = progress.waiting_for_ratings();
            return Ok(TopRatedOutcome::Incomplete {
                waiting_for,
                message: format!("Waiting for {} more members to rate", waiting_for),
            });
        }

        let ratings = self.store.group_ratings(group_id).await?;
        Ok(TopRatedOutcome::Complete {
            top_rated: top_rated(&ratings, &self.item_names, self.top_rated_limit),
        })
    }

    pub async fn submit_review(
        &self,
        group_id: &GroupId,
        user_id: &str,
        mut survey: SatisfactionSurvey,
    ) -> AppResult<GroupProgress> {
        self.store.member(group_id, user_id).await?;
        let progress = self.store.progress(group_id).await?;
        if !progress.all_rated() {
            return Err(AppError::PreconditionFailed(format!(
                "Waiting for {} more members to rate before the survey",
                progress.waiting_for_ratings()
            )));
        }

        let invalid = survey.out_of_range();
        if !invalid.is_empty() {
            return Err(AppError::InvalidInput(format!(
                "Please provide a rating between 1 and 5 for: {}",
                invalid.join(", ")
            )));
        }

        let ratings = self.store.group_ratings(group_id).await?;
        survey.top_recommendations = top_rated(&ratings, &self.item_names, REVIEW_TOP_ITEMS)
            .into_iter()
            .map(|item| item.item_id)
            .collect();

        let progress = self.store.save_review(group_id, user_id, survey).await?;
        tracing::info!(
            group_id = %group_id,
            reviewed = progress.reviews_submitted,
            phase = ?progress.phase(),
            "Review submitted"
        );
        Ok(progress)
    }

    pub async fn status(&self, group_id: &GroupId) -> AppResult<GroupStatus> {
        let progress = self.store.progress(group_id).await?;
        Ok(GroupStatus::new(group_id.clone(), progress))
    }

    /// Recomputes the group's match from its stored preferences
    async fn match_group(&self, group: &Group) -> AppResult<GroupRecommendation> {
        let preferences = self.store.group_preferences(&group.group_id).await?;
        let bag = self.normalizer.group_bag(&preferences);

        tracing::debug!(
            group_id = %group.group_id,
            members = preferences.len(),
            tokens = bag.len(),
            "Built group preference bag"
        );

        self.engine.recommend(&bag, group.group_size).map_err(|e| {
            tracing::warn!(group_id = %group.group_id, error = %e, "No recommendations for group");
            AppError::from(e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{MemoryStore, MockGroupStore};
    use crate::models::{ArchetypeCatalogue, FrequencyVector, RecommendationList, Vocabulary};

    fn engine() -> Arc<RecommendationEngine> {
        let vocabulary = Vocabulary::new(["Italian", "Mexican", "Coffee", "Vegan"]).unwrap();

        let mut lists: HashMap<ArchetypeId, RecommendationList> = HashMap::new();
        lists.insert(
            ArchetypeId::from("italian-lovers"),
            vec![("trattoria".to_string(), 4.9), ("pizzeria".to_string(), 4.2)]
                .into_iter()
                .collect(),
        );
        lists.insert(
            ArchetypeId::from("taco-fans"),
            vec![("taqueria".to_string(), 4.7)].into_iter().collect(),
        );

        let catalogue = ArchetypeCatalogue::new(
            2,
            4,
            vec![
                (
                    ArchetypeId::from("italian-lovers"),
                    FrequencyVector::from(vec![3.0, 0.0, 1.0, 0.0]),
                ),
                (
                    ArchetypeId::from("taco-fans"),
                    FrequencyVector::from(vec![0.0, 3.0, 0.0, 1.0]),
                ),
            ],
            lists,
        )
        .unwrap();

        Arc::new(RecommendationEngine::new(&vocabulary, vec![catalogue]).unwrap())
    }

    fn service() -> GroupService {
        let mut names = HashMap::new();
        names.insert("trattoria".to_string(), "Trattoria Roma".to_string());

        GroupService::new(Arc::new(MemoryStore::new()), engine(), Normalizer::new())
            .with_item_names(names)
    }

    fn preferences(cuisine: &str) -> RawPreferenceSet {
        RawPreferenceSet {
            preferred_cuisine: Some(cuisine.into()),
            usual_eating_time: Some("Brunch".into()),
            preferred_place: Some(vec!["Restaurants"].into()),
            main_course: Some("None of the below".into()),
            extra_treat: Some("['Desserts']".into()),
            drink_choice: Some(vec!["Wine"].into()),
            comfort_sip: Some(vec!["Coffee"].into()),
            dietary_preference: Some("No Preference".to_string()),
        }
    }

    fn survey() -> SatisfactionSurvey {
        SatisfactionSurvey {
            matched_interests: 4,
            discovered_new_items: 3,
            diverse_recommendations: 5,
            easy_to_find: 4,
            ideal_item_found: 4,
            overall_satisfaction: 5,
            confidence_in_decision: 4,
            would_buy_recommendations: 3,
            good_group_suggestions: 4,
            convinced_of_items: 4,
            confident_will_like: 5,
            trust_in_recommender: 4,
            top_recommendations: vec![],
        }
    }

    fn ratings(pairs: &[(&str, i64)]) -> Vec<ItemRating> {
        pairs
            .iter()
            .map(|(item_id, rating)| ItemRating {
                item_id: item_id.to_string(),
                rating: *rating,
            })
            .collect()
    }

    async fn full_group(service: &GroupService) -> GroupId {
        let group = service.create_group(2).await.unwrap();
        for (user, cuisine) in [("alice", "Italian"), ("bob", "Italian")] {
            service.join_group(&group.group_id, user).await.unwrap();
            service
                .submit_preferences(&group.group_id, user, preferences(cuisine))
                .await
                .unwrap();
        }
        group.group_id
    }

    #[tokio::test]
    async fn test_create_group_rejects_unsupported_size() {
        let err = service().create_group(6).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_submit_preferences_requires_every_dimension() {
        let service = service();
        let group = service.create_group(2).await.unwrap();
        service.join_group(&group.group_id, "alice").await.unwrap();

        let mut incomplete = preferences("Italian");
        incomplete.drink_choice = None;
        let err = service
            .submit_preferences(&group.group_id, "alice", incomplete)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(msg) if msg.contains("drink_choice")));
    }

    #[tokio::test]
    async fn test_submit_preferences_validates_dietary_option() {
        let service = service();
        let group = service.create_group(2).await.unwrap();
        service.join_group(&group.group_id, "alice").await.unwrap();

        let mut invalid = preferences("Italian");
        invalid.dietary_preference = Some("Pescatarian".to_string());
        let err = service
            .submit_preferences(&group.group_id, "alice", invalid)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_recommendations_wait_for_all_members() {
        let service = service();
        let group = service.create_group(2).await.unwrap();
        service.join_group(&group.group_id, "alice").await.unwrap();
        service
            .submit_preferences(&group.group_id, "alice", preferences("Italian"))
            .await
            .unwrap();

        let outcome = service
            .recommendations(&group.group_id, "alice")
            .await
            .unwrap();
        assert!(matches!(
            outcome,
            RecommendationOutcome::Incomplete { waiting_for: 1, .. }
        ));
    }

    #[tokio::test]
    async fn test_recommendations_match_closest_archetype() {
        let service = service();
        let group_id = full_group(&service).await;

        let outcome = service.recommendations(&group_id, "alice").await.unwrap();
        let RecommendationOutcome::Complete {
            archetype_id,
            recommendations,
            degenerate,
            ..
        } = outcome
        else {
            panic!("expected recommendations");
        };

        assert_eq!(archetype_id, ArchetypeId::from("italian-lovers"));
        assert!(!degenerate);
        assert_eq!(recommendations[0].name, "Trattoria Roma");
        assert_eq!(recommendations[1].name, "pizzeria");

        let status = service.status(&group_id).await.unwrap();
        assert_eq!(status.recommendations_shown, 1);
    }

    #[tokio::test]
    async fn test_ratings_require_recommendations_shown() {
        let service = service();
        let group_id = full_group(&service).await;

        let err = service
            .submit_ratings(&group_id, "alice", ratings(&[("trattoria", 5), ("pizzeria", 3)]))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::PreconditionFailed(_)));
    }

    #[tokio::test]
    async fn test_ratings_must_cover_every_recommendation() {
        let service = service();
        let group_id = full_group(&service).await;
        service.recommendations(&group_id, "alice").await.unwrap();

        let err = service
            .submit_ratings(&group_id, "alice", ratings(&[("trattoria", 5)]))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));

        let err = service
            .submit_ratings(&group_id, "alice", ratings(&[("trattoria", 9), ("pizzeria", 3)]))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));

        let err = service
            .submit_ratings(&group_id, "alice", ratings(&[("trattoria", -1), ("pizzeria", 300)]))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_repeated_item_rating_is_rejected() {
        let service = service();
        let group_id = full_group(&service).await;
        service.recommendations(&group_id, "alice").await.unwrap();

        let repeated = ratings(&[("trattoria", 5), ("trattoria", 1), ("pizzeria", 3)]);
        let err = service
            .submit_ratings(&group_id, "alice", repeated)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(msg) if msg.contains("trattoria")));

        let status = service.status(&group_id).await.unwrap();
        assert_eq!(status.ratings_submitted, 0);
    }

    #[tokio::test]
    async fn test_full_workflow_reaches_done() {
        let service = service();
        let group_id = full_group(&service).await;

        for (user, trattoria, pizzeria) in [("alice", 5, 3), ("bob", 4, 4)] {
            service.recommendations(&group_id, user).await.unwrap();
            let sheet = ratings(&[("trattoria", trattoria), ("pizzeria", pizzeria)]);
            service
                .submit_ratings(&group_id, user, sheet)
                .await
                .unwrap();
        }

        let TopRatedOutcome::Complete { top_rated } = service.top_rated(&group_id).await.unwrap()
        else {
            panic!("expected top rated items");
        };
        assert_eq!(top_rated[0].item_id, "trattoria");
        assert_eq!(top_rated[0].average_rating, 4.5);

        let progress = service
            .submit_review(&group_id, "alice", survey())
            .await
            .unwrap();
        assert_eq!(progress.phase(), crate::models::GroupPhase::CollectingReviews);

        let progress = service
            .submit_review(&group_id, "bob", survey())
            .await
            .unwrap();
        assert_eq!(progress.phase(), crate::models::GroupPhase::Done);
    }

    #[tokio::test]
    async fn test_review_requires_all_ratings() {
        let service = service();
        let group_id = full_group(&service).await;

        let err = service
            .submit_review(&group_id, "alice", survey())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::PreconditionFailed(_)));
    }

    #[tokio::test]
    async fn test_empty_bag_reports_no_recommendations() {
        let mut store = MockGroupStore::new();
        let group = Group::new(2);
        let returned = group.clone();

        store
            .expect_member()
            .returning(|_, user_id| Ok(crate::models::Member::new(user_id.to_string())));
        store.expect_progress().returning(|_| {
            Ok(GroupProgress {
                group_size: 2,
                members: 2,
                preferences_submitted: 2,
                recommendations_shown: 0,
                ratings_submitted: 0,
                reviews_submitted: 0,
            })
        });
        store
            .expect_group()
            .returning(move |_| Ok(returned.clone()));
        store.expect_group_preferences().returning(|_| {
            let nothing = RawPreferenceSet {
                main_course: Some("None of the below".into()),
                dietary_preference: Some("Non-Vegetarian".to_string()),
                ..Default::default()
            };
            Ok(vec![nothing.clone(), nothing])
        });
        store.expect_mark_recommendations_shown().never();

        let service = GroupService::new(Arc::new(store), engine(), Normalizer::new());
        let err = service
            .recommendations(&group.group_id, "alice")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
