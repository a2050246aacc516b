//! Session principal extraction.
//!
//! Authentication itself is delegated to an external provider sitting in
//! front of this service; by the time a request arrives here the provider has
//! established the session and attached the principal as a header. The
//! catalog only checks that a principal is present on mutating routes.

use crate::transport::http::types::ErrorResponse;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::Json;

/// Header set by the fronting auth layer.
pub const PRINCIPAL_HEADER: &str = "x-auth-subject";

/// The authenticated principal for the current request.
#[derive(Debug, Clone)]
pub struct Principal {
    pub subject: String,
}

#[async_trait]
impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ErrorResponse>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let subject = parts
            .headers
            .get(PRINCIPAL_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|s| !s.is_empty());

        match subject {
            Some(s) => Ok(Principal { subject: s.to_string() }),
            None => Err((
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse::new("Authentication required")),
            )),
        }
    }
}
