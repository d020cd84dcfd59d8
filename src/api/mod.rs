// Axum web server layer

use axum::{
    error_handling::HandleErrorLayer,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    BoxError, Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

pub mod handlers;
pub mod responses;
pub mod validation;

use crate::core::errors::ServiceError;
use crate::core::groups::GroupResource;
use crate::core::models::{CallerIdentity, Contact, Group, NewGroup};

/// Trait for group persistence operations
#[async_trait::async_trait]
pub trait GroupStore: Send + Sync {
    /// Insert a new group row with the given owner; returns the created
    /// record including its generated id.
    async fn insert(&self, group: NewGroup, owner_id: i64) -> Result<Group, ServiceError>;
    /// All groups whose owner matches `owner_id`.
    async fn list_by_owner(&self, owner_id: i64) -> Result<Vec<Group>, ServiceError>;
    /// Lookup by id; `None` when no such group exists.
    async fn get_by_id(&self, id: i64) -> Result<Option<Group>, ServiceError>;
    /// Connectivity probe for the health endpoint.
    async fn ping(&self) -> Result<(), ServiceError>;
}

/// Trait for contact persistence operations
#[async_trait::async_trait]
pub trait ContactStore: Send + Sync {
    /// All contacts whose group relation matches `group_id`.
    async fn list_by_group(&self, group_id: i64) -> Result<Vec<Contact>, ServiceError>;
}

/// Trait for resolving an API key hash to a caller identity
#[async_trait::async_trait]
pub trait AccountStore: Send + Sync {
    async fn lookup_account(
        &self,
        token_hash: &str,
    ) -> Result<Option<CallerIdentity>, ServiceError>;
}

/// Application state containing all shared dependencies
///
/// Components are wrapped in Arc for shared ownership across async tasks
/// and must be Send + Sync.
#[derive(Clone)]
pub struct AppState {
    pub groups: GroupResource,
    pub group_store: Arc<dyn GroupStore + Send + Sync>,
    pub config: Arc<Config>,
}

// Re-export Config from config module
pub use crate::config::Config;

/// Create the Axum router with all routes and middleware
///
/// Middleware stack (outermost to innermost):
/// - Request timeout (tower::timeout) behind HandleErrorLayer
/// - Body size limit (tower-http::limit)
/// - Tracing (tower-http::trace)
/// - Auth middleware on protected routes; `/health` bypasses auth
pub fn create_router(
    app_state: AppState,
    auth_state: Option<Arc<crate::auth::auth_middleware::AuthState>>,
) -> Router {
    let mut router = Router::new()
        .route(
            "/group/",
            axum::routing::post(handlers::create_group_handler)
                .get(handlers::list_groups_handler),
        )
        .route("/group/:id/", axum::routing::get(handlers::group_detail_handler))
        .route("/health", axum::routing::get(handlers::health_handler));

    // Apply auth middleware to protected routes only
    if let Some(auth_state) = auth_state {
        router = router.route_layer(axum::middleware::from_fn_with_state(
            auth_state,
            |state: State<Arc<crate::auth::auth_middleware::AuthState>>,
             request: Request,
             next: Next| async move {
                // Health endpoint is reachable without credentials
                if request.uri().path() == "/health" {
                    return Ok(next.run(request).await);
                }

                crate::auth::auth_middleware::auth_middleware(state, request, next).await
            },
        ));
    }

    let body_limit = app_state.config.body_size_limit_bytes;
    let timeout_secs = app_state.config.request_timeout_secs;

    let router = router
        .layer(TraceLayer::new_for_http())
        .layer(RequestBodyLimitLayer::new(body_limit))
        .with_state(app_state);

    // HandleErrorLayer must come BEFORE timeout to catch the timeout error
    let middleware_stack = ServiceBuilder::new()
        .layer(HandleErrorLayer::new(|e: BoxError| async move {
            let status = if e.is::<tower::timeout::error::Elapsed>() {
                StatusCode::REQUEST_TIMEOUT
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            (status, e.to_string())
        }))
        .timeout(Duration::from_secs(timeout_secs))
        .into_inner();

    router.layer(middleware_stack)
}
