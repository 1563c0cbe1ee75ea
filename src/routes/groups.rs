use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::AppResult,
    middleware::RequestId,
    models::{Group, GroupId, GroupStatus},
};

use super::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateGroupRequest {
    pub group_size: usize,
}

#[derive(Debug, Deserialize)]
pub struct JoinGroupRequest {
    pub user_id: String,
}

#[derive(Debug, Serialize)]
pub struct JoinGroupResponse {
    pub group_id: GroupId,
    pub user_id: String,
    pub current_members: usize,
    pub group_size: usize,
    pub is_full: bool,
}

pub async fn create_group(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<CreateGroupRequest>,
) -> AppResult<(StatusCode, Json<Group>)> {
    tracing::debug!(%request_id, group_size = request.group_size, "Create group");
    let group = state.groups.create_group(request.group_size).await?;
    Ok((StatusCode::CREATED, Json(group)))
}

pub async fn join_group(
    State(state): State<AppState>,
    Path(group_id): Path<String>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<JoinGroupRequest>,
) -> AppResult<(StatusCode, Json<JoinGroupResponse>)> {
    let group_id = GroupId::from(group_id);
    tracing::debug!(%request_id, %group_id, "Join group");

    let progress = state.groups.join_group(&group_id, &request.user_id).await?;
    Ok((
        StatusCode::CREATED,
        Json(JoinGroupResponse {
            group_id,
            user_id: request.user_id.trim().to_string(),
            current_members: progress.members,
            group_size: progress.group_size,
            is_full: progress.is_full(),
        }),
    ))
}

pub async fn group_status(
    State(state): State<AppState>,
    Path(group_id): Path<String>,
) -> AppResult<Json<GroupStatus>> {
    let status = state.groups.status(&GroupId::from(group_id)).await?;
    Ok(Json(status))
}
