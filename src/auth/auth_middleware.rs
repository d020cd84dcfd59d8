// Axum authentication middleware

use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{Json, Response},
};
use std::sync::Arc;
use tracing::{error, warn};

use crate::api::responses::ErrorResponse;
use crate::api::AccountStore;
use crate::auth::api_token::ApiToken;

/// Authentication state containing the account lookup dependency
#[derive(Clone)]
pub struct AuthState {
    pub account_store: Arc<dyn AccountStore + Send + Sync>,
}

/// Authentication middleware function
///
/// Extracts the API token from the `X-API-Key` header, hashes it,
/// resolves the caller through the account store, and sets the
/// `CallerIdentity` in request extensions for handlers to use. Requests
/// without a resolvable identity never reach a handler.
pub async fn auth_middleware(
    State(auth_state): State<Arc<AuthState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, (StatusCode, Json<ErrorResponse>)> {
    // 1. Extract token from header
    let token_str = extract_api_key(request.headers()).ok_or_else(|| {
        (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse {
                error: "Missing API key".to_string(),
                request_id: None,
            }),
        )
    })?;

    // 2. Hash token
    let token = ApiToken::new(&token_str);
    let token_hash = token.hash();

    // 3. Resolve caller
    let caller = match auth_state
        .account_store
        .lookup_account(token_hash.as_str())
        .await
    {
        Ok(Some(caller)) => caller,
        Ok(None) => {
            warn!("Rejected request with unknown API key");
            return Err((
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse {
                    error: "Invalid API key".to_string(),
                    request_id: None,
                }),
            ));
        }
        Err(e) => {
            error!(error = %e, "Account lookup failed");
            let status = StatusCode::from_u16(e.status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            return Err((
                status,
                Json(ErrorResponse {
                    error: e.user_message(),
                    request_id: None,
                }),
            ));
        }
    };

    // 4. Set extension for handler
    request.extensions_mut().insert(caller);

    // 5. Continue to next middleware/handler
    Ok(next.run(request).await)
}

/// Extract API token from request headers
fn extract_api_key(headers: &HeaderMap) -> Option<String> {
    headers
        .get("X-API-Key")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
}
