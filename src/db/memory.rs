use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::{
    db::GroupStore,
    error::{AppError, AppResult},
    models::{
        Group, GroupId, GroupProgress, ItemRating, Member, RawPreferenceSet, SatisfactionSurvey,
    },
};

struct GroupRecord {
    group: Group,
    members: Vec<Member>,
}

impl GroupRecord {
    fn progress(&self) -> GroupProgress {
        let count = |f: fn(&Member) -> bool| self.members.iter().filter(|m| f(m)).count();

        GroupProgress {
            group_size: self.group.group_size,
            members: self.members.len(),
            preferences_submitted: count(|m| m.preferences.is_some()),
            recommendations_shown: count(|m| m.recommendations_shown),
            ratings_submitted: count(Member::has_rated),
            reviews_submitted: count(|m| m.review.is_some()),
        }
    }

    fn member_mut(&mut self, user_id: &str) -> AppResult<&mut Member> {
        let group_id = self.group.group_id.clone();
        self.members
            .iter_mut()
            .find(|m| m.user_id == user_id)
            .ok_or_else(|| {
                AppError::NotFound(format!("User {} is not a member of {}", user_id, group_id))
            })
    }
}

#[derive(Default)]
struct Inner {
    groups: HashMap<GroupId, GroupRecord>,
    users: HashMap<String, GroupId>,
}

impl Inner {
    fn record(&self, group_id: &GroupId) -> AppResult<&GroupRecord> {
        self.groups
            .get(group_id)
            .ok_or_else(|| AppError::NotFound(format!("Group {} not found", group_id)))
    }

    fn record_mut(&mut self, group_id: &GroupId) -> AppResult<&mut GroupRecord> {
        self.groups
            .get_mut(group_id)
            .ok_or_else(|| AppError::NotFound(format!("Group {} not found", group_id)))
    }
}

/// Process-local store; one lock guards every group
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl GroupStore for MemoryStore {
    async fn insert_group(&self, group: Group) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        if inner.groups.contains_key(&group.group_id) {
            return Err(AppError::Conflict(format!(
                "Group {} already exists",
                group.group_id
            )));
        }
        inner.groups.insert(
            group.group_id.clone(),
            GroupRecord {
                group,
                members: Vec::new(),
            },
        );
        Ok(())
    }

    async fn group(&self, group_id: &GroupId) -> AppResult<Group> {
        let inner = self.inner.read().await;
        Ok(inner.record(group_id)?.group.clone())
    }

    async fn add_member(&self, group_id: &GroupId, user_id: &str) -> AppResult<GroupProgress> {
        let mut inner = self.inner.write().await;
        if inner.users.contains_key(user_id) {
            return Err(AppError::Conflict(format!("User {} already exists", user_id)));
        }

        let record = inner.record_mut(group_id)?;
        if record.progress().is_full() {
            return Err(AppError::InvalidInput("Group is full".to_string()));
        }
        record.members.push(Member::new(user_id.to_string()));
        let progress = record.progress();

        inner.users.insert(user_id.to_string(), group_id.clone());
        Ok(progress)
    }

    async fn member(&self, group_id: &GroupId, user_id: &str) -> AppResult<Member> {
        let inner = self.inner.read().await;
        inner
            .record(group_id)?
            .members
            .iter()
            .find(|m| m.user_id == user_id)
            .cloned()
            .ok_or_else(|| {
                AppError::NotFound(format!("User {} is not a member of {}", user_id, group_id))
            })
    }

    async fn save_preferences(
        &self,
        group_id: &GroupId,
        user_id: &str,
        preferences: RawPreferenceSet,
    ) -> AppResult<GroupProgress> {
        let mut inner = self.inner.write().await;
        let record = inner.record_mut(group_id)?;
        let member = record.member_mut(user_id)?;
        if member.preferences.is_some() {
            return Err(AppError::Conflict(format!(
                "User {} has already submitted preferences",
                user_id
            )));
        }
        member.preferences = Some(preferences);
        Ok(record.progress())
    }

    async fn group_preferences(&self, group_id: &GroupId) -> AppResult<Vec<RawPreferenceSet>> {
        let inner = self.inner.read().await;
        Ok(inner
            .record(group_id)?
            .members
            .iter()
            .filter_map(|m| m.preferences.clone())
            .collect())
    }

    async fn mark_recommendations_shown(&self, group_id: &GroupId, user_id: &str) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        inner
            .record_mut(group_id)?
            .member_mut(user_id)?
            .recommendations_shown = true;
        Ok(())
    }

    async fn save_ratings(
        &self,
        group_id: &GroupId,
        user_id: &str,
        ratings: Vec<ItemRating>,
    ) -> AppResult<GroupProgress> {
        let mut inner = self.inner.write().await;
        let record = inner.record_mut(group_id)?;
        let member = record.member_mut(user_id)?;
        if member.has_rated() {
            return Err(AppError::Conflict(format!(
                "User {} has already rated the recommendations",
                user_id
            )));
        }
        member.ratings = ratings;
        Ok(record.progress())
    }

    async fn group_ratings(&self, group_id: &GroupId) -> AppResult<Vec<ItemRating>> {
        let inner = self.inner.read().await;
        Ok(inner
            .record(group_id)?
            .members
            .iter()
            .flat_map(|m| m.ratings.iter().cloned())
            .collect())
    }

    async fn save_review(
        &self,
        group_id: &GroupId,
        user_id: &str,
        review: SatisfactionSurvey,
    ) -> AppResult<GroupProgress> {
        let mut inner = self.inner.write().await;
        let record = inner.record_mut(group_id)?;
        let member = record.member_mut(user_id)?;
        if member.review.is_some() {
            return Err(AppError::Conflict(format!(
                "User {} has already submitted a review",
                user_id
            )));
        }
        member.review = Some(review);
        Ok(record.progress())
    }

    async fn progress(&self, group_id: &GroupId) -> AppResult<GroupProgress> {
        let inner = self.inner.read().await;
        Ok(inner.record(group_id)?.progress())
    }
}
