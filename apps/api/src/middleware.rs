use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;
use classbook_core::AppError;
use tracing::warn;

use crate::auth::BearerToken;
use crate::error::ApiResult;
use crate::state::AppState;

const BEARER_PREFIX: &str = "Bearer ";

/// Authenticates `Authorization: Bearer` requests.
///
/// Requests without the header continue anonymously. A present but
/// unusable credential is rejected before any handler runs.
pub async fn authenticate_bearer(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let Some(value) = request.headers().get(header::AUTHORIZATION) else {
        return Ok(next.run(request).await);
    };

    let token = value
        .to_str()
        .ok()
        .and_then(|value| value.strip_prefix(BEARER_PREFIX))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| {
            warn!(reason = "bad_scheme", "bearer token rejected");
            AppError::unauthenticated()
        })?
        .to_owned();

    let identity = state
        .authentication_service
        .authenticate_bearer(&token)
        .await?;

    request.extensions_mut().insert(identity);
    request.extensions_mut().insert(BearerToken(token));
    Ok(next.run(request).await)
}
