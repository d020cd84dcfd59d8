// Request handlers for API endpoints

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::Json,
    Extension,
};
use tracing::{error, info, warn};

use crate::api::responses::{ApiError, HealthResponse};
use crate::api::{validation, AppState};
use crate::core::errors::ServiceError;
use crate::core::models::{CallerIdentity, Group, GroupDetail};

/// Extract request ID from headers or generate a UUID
fn request_id(headers: &HeaderMap) -> String {
    headers
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
}

/// Create a group owned by the caller
///
/// POST /group/
///
/// The body is parsed as raw JSON and validated against the creation
/// schema before the resource logic runs. The owner always comes from the
/// authenticated identity.
pub async fn create_group_handler(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    Extension(caller): Extension<CallerIdentity>,
    Json(payload): Json<serde_json::Value>,
) -> Result<(StatusCode, Json<Group>), ApiError> {
    let request_id = request_id(&headers);

    let new_group = validation::parse_create_group(payload).map_err(|e| {
        warn!(
            account_id = caller.account_id,
            request_id = %request_id,
            error = %e,
            "Rejected group creation payload"
        );
        ApiError::from_service_error_with_id(e, request_id.clone())
    })?;

    let created = app_state
        .groups
        .create(new_group, caller)
        .await
        .map_err(|e| {
            error!(error = %e, request_id = %request_id, "Group creation failed");
            ApiError::from_service_error_with_id(e, request_id.clone())
        })?;

    info!(
        group_id = created.id,
        account_id = caller.account_id,
        request_id = %request_id,
        "Group created"
    );

    Ok((StatusCode::CREATED, Json(created)))
}

/// List the caller's groups
///
/// GET /group/
pub async fn list_groups_handler(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    Extension(caller): Extension<CallerIdentity>,
) -> Result<Json<Vec<Group>>, ApiError> {
    let request_id = request_id(&headers);

    let groups = app_state.groups.list_owned(caller).await.map_err(|e| {
        error!(error = %e, request_id = %request_id, "Group listing failed");
        ApiError::from_service_error_with_id(e, request_id.clone())
    })?;

    Ok(Json(groups))
}

/// Fetch one group with its contacts
///
/// GET /group/:id/
///
/// The path id must be numeric; a non-numeric id is rejected before any
/// store call. Only the owner may see the group and its contacts.
pub async fn group_detail_handler(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    Extension(caller): Extension<CallerIdentity>,
    Path(id): Path<String>,
) -> Result<Json<GroupDetail>, ApiError> {
    let request_id = request_id(&headers);

    let group_id: i64 = id.parse().map_err(|_| {
        ApiError::from_service_error_with_id(
            ServiceError::Validation(format!("Invalid group id '{}'", id)),
            request_id.clone(),
        )
    })?;

    let detail = app_state
        .groups
        .get_with_contacts(group_id, caller)
        .await
        .map_err(|e| {
            match &e {
                ServiceError::OwnershipViolation => {
                    warn!(
                        group_id,
                        account_id = caller.account_id,
                        request_id = %request_id,
                        "Ownership violation on group fetch"
                    );
                }
                ServiceError::NotFound(_) => {}
                _ => {
                    error!(error = %e, group_id, request_id = %request_id, "Group fetch failed");
                }
            }
            ApiError::from_service_error_with_id(e, request_id.clone())
        })?;

    Ok(Json(detail))
}

/// Health check handler
///
/// GET /health
///
/// Probes database connectivity with a short timeout so the endpoint
/// stays fast even when the store is unresponsive.
pub async fn health_handler(
    State(app_state): State<AppState>,
) -> Result<Json<HealthResponse>, ApiError> {
    let database = match tokio::time::timeout(
        std::time::Duration::from_millis(500),
        app_state.group_store.ping(),
    )
    .await
    {
        Ok(Ok(())) => "connected".to_string(),
        Ok(Err(e)) => {
            warn!(error = %e, "Database ping failed");
            "disconnected".to_string()
        }
        Err(_) => {
            warn!("Database ping timed out in health check");
            "slow".to_string()
        }
    };

    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        database,
    }))
}
