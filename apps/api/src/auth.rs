//! Request-local identity extraction.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use classbook_core::{AppError, Identity};

use crate::error::ApiError;

/// Raw bearer token of an authenticated request, kept for sign-out.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

/// Identity established by the bearer middleware.
///
/// Handlers that take this extractor reject anonymous requests with 401.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Identity);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .map(Self)
            .ok_or_else(|| AppError::unauthenticated().into())
    }
}

impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<BearerToken>()
            .cloned()
            .ok_or_else(|| AppError::unauthenticated().into())
    }
}
