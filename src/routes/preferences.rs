use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Serialize;

use crate::{
    error::AppResult,
    middleware::RequestId,
    models::{GroupId, RawPreferenceSet},
};

use super::AppState;

#[derive(Debug, Serialize)]
pub struct PreferencesResponse {
    pub message: String,
    pub preferences_submitted: usize,
    pub group_size: usize,
    pub all_preferences_submitted: bool,
}

/// Handler for one member's survey answers
pub async fn submit_preferences(
    State(state): State<AppState>,
    Path((group_id, user_id)): Path<(String, String)>,
    Extension(request_id): Extension<RequestId>,
    Json(preferences): Json<RawPreferenceSet>,
) -> AppResult<(StatusCode, Json<PreferencesResponse>)> {
    let group_id = GroupId::from(group_id);
    tracing::debug!(%request_id, %group_id, "Submit preferences");

    let progress = state
        .groups
        .submit_preferences(&group_id, &user_id, preferences)
        .await?;

    let message = if progress.all_preferences_submitted() {
        "All preferences submitted, recommendations are ready".to_string()
    } else {
        format!(
            "Preferences saved, waiting for {} more members",
            progress.waiting_for_preferences()
        )
    };

    Ok((
        StatusCode::CREATED,
        Json(PreferencesResponse {
            message,
            preferences_submitted: progress.preferences_submitted,
            group_size: progress.group_size,
            all_preferences_submitted: progress.all_preferences_submitted(),
        }),
    ))
}
