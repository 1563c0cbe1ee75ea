use axum::{
    extract::{Path, State},
    Extension, Json,
};

use crate::{
    error::AppResult,
    middleware::RequestId,
    models::GroupId,
    services::{RecommendationOutcome, TopRatedOutcome},
};

use super::AppState;

/// Handler for a member's view of the group recommendations
pub async fn group_recommendations(
    State(state): State<AppState>,
    Path((group_id, user_id)): Path<(String, String)>,
    Extension(request_id): Extension<RequestId>,
) -> AppResult<Json<RecommendationOutcome>> {
    let group_id = GroupId::from(group_id);
    tracing::debug!(%request_id, %group_id, "Group recommendations");

    let outcome = state.groups.recommendations(&group_id, &user_id).await?;
    Ok(Json(outcome))
}

pub async fn top_rated(
    State(state): State<AppState>,
    Path(group_id): Path<String>,
) -> AppResult<Json<TopRatedOutcome>> {
    let outcome = state.groups.top_rated(&GroupId::from(group_id)).await?;
    Ok(Json(outcome))
}
