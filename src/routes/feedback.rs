use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::AppResult,
    middleware::RequestId,
    models::{GroupId, GroupPhase, ItemRating, SatisfactionSurvey},
};

use super::AppState;

#[derive(Debug, Deserialize)]
pub struct RatingsRequest {
    pub ratings: Vec<ItemRating>,
}

#[derive(Debug, Serialize)]
pub struct FeedbackResponse {
    pub message: String,
    pub phase: GroupPhase,
}

pub async fn submit_ratings(
    State(state): State<AppState>,
    Path((group_id, user_id)): Path<(String, String)>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<RatingsRequest>,
) -> AppResult<(StatusCode, Json<FeedbackResponse>)> {
    let group_id = GroupId::from(group_id);
    tracing::debug!(%request_id, %group_id, items = request.ratings.len(), "Submit ratings");

    let progress = state
        .groups
        .submit_ratings(&group_id, &user_id, request.ratings)
        .await?;

    let message = if progress.all_rated() {
        "All members have rated, top picks are ready".to_string()
    } else {
        format!(
            "Ratings saved, waiting for {} more members",
            progress.waiting_for_ratings()
        )
    };

    Ok((
        StatusCode::CREATED,
        Json(FeedbackResponse {
            message,
            phase: progress.phase(),
        }),
    ))
}

pub async fn submit_review(
    State(state): State<AppState>,
    Path((group_id, user_id)): Path<(String, String)>,
    Extension(request_id): Extension<RequestId>,
    Json(survey): Json<SatisfactionSurvey>,
) -> AppResult<(StatusCode, Json<FeedbackResponse>)> {
    let group_id = GroupId::from(group_id);
    tracing::debug!(%request_id, %group_id, "Submit review");

    let progress = state
        .groups
        .submit_review(&group_id, &user_id, survey)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(FeedbackResponse {
            message: "Thank you for your feedback".to_string(),
            phase: progress.phase(),
        }),
    ))
}
