//! Request handlers and failure-kind → HTTP status mapping.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    extract::{Query, State},
    http::StatusCode,
    response::Json,
};
use serde_json::{json, Value};
use std::sync::Arc;

use super::dto::*;
use super::server::AppState;
use crate::domain::errors::{DomainError, Entity, ErrorKind};

pub type ApiError = (StatusCode, Json<ErrorResponse>);
pub type ApiResult<T> = Result<T, ApiError>;

fn bad_request(message: impl Into<String>) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(ErrorResponse::new("BAD_REQUEST", message)))
}

/// Map a domain failure onto a status code and stable error code.
pub fn error_response(err: DomainError) -> ApiError {
    let (status, code) = match (err.kind(), err.entity()) {
        (ErrorKind::NotFound, _) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        (ErrorKind::AlreadyExists, Some(Entity::Team)) => (StatusCode::BAD_REQUEST, "TEAM_EXISTS"),
        (ErrorKind::AlreadyExists, Some(Entity::PullRequest)) => (StatusCode::CONFLICT, "PR_EXISTS"),
        (ErrorKind::AlreadyExists, _) => (StatusCode::CONFLICT, "CONFLICT"),
        (ErrorKind::AlreadyMerged, _) => (StatusCode::CONFLICT, "PR_MERGED"),
        (ErrorKind::ReviewerNotAssigned, _) => (StatusCode::CONFLICT, "NOT_ASSIGNED"),
        (ErrorKind::NoAvailableReviewers | ErrorKind::AuthorInactive, _) => {
            (StatusCode::CONFLICT, "NO_CANDIDATE")
        }
        (ErrorKind::ConcurrencyConflict, _) => (StatusCode::CONFLICT, "CONFLICT"),
        (ErrorKind::Validation, _) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
        (ErrorKind::Storage, _) => {
            tracing::error!(error = %err, "request failed");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("INTERNAL", "internal error")),
            );
        }
    };

    (status, Json(ErrorResponse::new(code, err.to_string())))
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| bad_request(format!("invalid json body: {}", rejection.body_text())))
}

fn query<T>(params: Result<Query<T>, QueryRejection>) -> ApiResult<T> {
    params
        .map(|Query(value)| value)
        .map_err(|rejection| bad_request(rejection.body_text()))
}

fn require(fields: &[(&str, &str)]) -> ApiResult<()> {
    let missing: Vec<&str> = fields
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| *name)
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(bad_request(format!("missing required fields: {}", missing.join(", "))))
    }
}

pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn not_found() -> ApiError {
    (StatusCode::NOT_FOUND, Json(ErrorResponse::new("NOT_FOUND", "route not found")))
}

// ---------- Teams ----------

pub async fn add_team(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<TeamDto>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<TeamEnvelope>)> {
    let req = body(payload)?;
    require(&[("team_name", req.team_name.as_str())])?;

    let members = req
        .members
        .into_iter()
        .map(|m| m.into_user(&req.team_name))
        .collect();

    let (team, roster) = state
        .teams
        .create_team_with_members(&req.team_name, members)
        .await
        .map_err(error_response)?;

    Ok((
        StatusCode::CREATED,
        Json(TeamEnvelope {
            team: TeamDto::from_roster(&team.name, &roster),
        }),
    ))
}

pub async fn get_team(
    State(state): State<Arc<AppState>>,
    params: Result<Query<TeamQuery>, QueryRejection>,
) -> ApiResult<Json<TeamDto>> {
    let params = query(params)?;
    require(&[("team_name", params.team_name.as_str())])?;

    let (team, roster) = state
        .teams
        .get_team_with_members(&params.team_name)
        .await
        .map_err(error_response)?;

    Ok(Json(TeamDto::from_roster(&team.name, &roster)))
}

// ---------- Users ----------

pub async fn set_user_active(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SetIsActiveRequest>, JsonRejection>,
) -> ApiResult<Json<UserEnvelope>> {
    let req = body(payload)?;
    require(&[("user_id", req.user_id.as_str())])?;

    let user = state
        .teams
        .set_user_active(&req.user_id, req.is_active)
        .await
        .map_err(error_response)?;

    Ok(Json(UserEnvelope { user: user.into() }))
}

pub async fn get_review_queue(
    State(state): State<Arc<AppState>>,
    params: Result<Query<UserQuery>, QueryRejection>,
) -> ApiResult<Json<ReviewQueueResponse>> {
    let params = query(params)?;
    require(&[("user_id", params.user_id.as_str())])?;

    let prs = state
        .teams
        .list_pull_requests_for_reviewer(&params.user_id)
        .await
        .map_err(error_response)?;

    Ok(Json(ReviewQueueResponse {
        user_id: params.user_id,
        pull_requests: prs.into_iter().map(PullRequestShortDto::from).collect(),
    }))
}

// ---------- Pull requests ----------

pub async fn create_pull_request(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreatePullRequestRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<PullRequestEnvelope>)> {
    let req = body(payload)?;
    require(&[
        ("pull_request_id", req.pull_request_id.as_str()),
        ("pull_request_name", req.pull_request_name.as_str()),
        ("author_id", req.author_id.as_str()),
    ])?;

    let pr = state
        .assignments
        .create_pull_request(&req.pull_request_id, &req.pull_request_name, &req.author_id)
        .await
        .map_err(error_response)?;

    Ok((StatusCode::CREATED, Json(PullRequestEnvelope { pr: pr.into() })))
}

pub async fn merge_pull_request(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<MergePullRequestRequest>, JsonRejection>,
) -> ApiResult<Json<PullRequestEnvelope>> {
    let req = body(payload)?;
    require(&[("pull_request_id", req.pull_request_id.as_str())])?;

    let pr = state
        .assignments
        .merge_pull_request(&req.pull_request_id)
        .await
        .map_err(error_response)?;

    Ok(Json(PullRequestEnvelope { pr: pr.into() }))
}

pub async fn reassign_reviewer(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ReassignRequest>, JsonRejection>,
) -> ApiResult<Json<ReassignResponse>> {
    let req = body(payload)?;
    require(&[
        ("pull_request_id", req.pull_request_id.as_str()),
        ("old_user_id", req.old_user_id.as_str()),
    ])?;

    let outcome = state
        .assignments
        .reassign_reviewer(&req.pull_request_id, &req.old_user_id)
        .await
        .map_err(error_response)?;

    Ok(Json(ReassignResponse {
        pr: outcome.pull_request.into(),
        replaced_by: outcome.replaced_by,
    }))
}

// ---------- Stats ----------

pub async fn assignment_stats(State(state): State<Arc<AppState>>) -> ApiResult<Json<StatsResponse>> {
    let stats = state
        .teams
        .reviewer_assignment_stats()
        .await
        .map_err(error_response)?;

    Ok(Json(StatsResponse {
        stats: stats.into_iter().map(AssignmentStatDto::from).collect(),
    }))
}
