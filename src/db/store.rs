use crate::{
    error::AppResult,
    models::{Group, GroupId, GroupProgress, ItemRating, Member, RawPreferenceSet, SatisfactionSurvey},
};

/// Storage for groups and their members' submissions
///
/// Implementations guarantee at most one preference set, one batch of ratings
/// and one review per member, and report `GroupProgress` from a single
/// consistent snapshot so the ready-to-match gate never fires early.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait GroupStore: Send + Sync {
    async fn insert_group(&self, group: Group) -> AppResult<()>;

    async fn group(&self, group_id: &GroupId) -> AppResult<Group>;

    /// Adds a member; fails when the group is full or the user id is taken
    async fn add_member(&self, group_id: &GroupId, user_id: &str) -> AppResult<GroupProgress>;

    async fn member(&self, group_id: &GroupId, user_id: &str) -> AppResult<Member>;

    async fn save_preferences(
        &self,
        group_id: &GroupId,
        user_id: &str,
        preferences: RawPreferenceSet,
    ) -> AppResult<GroupProgress>;

    /// Every submitted preference set of the group, in join order
    async fn group_preferences(&self, group_id: &GroupId) -> AppResult<Vec<RawPreferenceSet>>;

    async fn mark_recommendations_shown(&self, group_id: &GroupId, user_id: &str) -> AppResult<()>;

    async fn save_ratings(
        &self,
        group_id: &GroupId,
        user_id: &str,
        ratings: Vec<ItemRating>,
    ) -> AppResult<GroupProgress>;

    async fn group_ratings(&self, group_id: &GroupId) -> AppResult<Vec<ItemRating>>;

    async fn save_review(
        &self,
        group_id: &GroupId,
        user_id: &str,
        review: SatisfactionSurvey,
    ) -> AppResult<GroupProgress>;

    async fn progress(&self, group_id: &GroupId) -> AppResult<GroupProgress>;
}
