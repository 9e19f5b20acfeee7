//! Map Key Function
//!
//! Hands the third-party map service key to signed-in callers.
//!
//! - OPTIONS /functions/v1/map-key - CORS preflight
//! - GET|POST /functions/v1/map-key - `{ "key": ... }`
//!
//! The caller must present `Authorization: Bearer <token>`. The token is
//! only checked for shape; the hosting platform verifies it upstream.

use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

use super::cors_headers;
use crate::api::dto::MapKeyResponse;
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;

pub const MISSING_AUTH_MESSAGE: &str = "Missing or invalid authorization header";
pub const MISSING_KEY_MESSAGE: &str = "Map service key is not configured";

/// OPTIONS /functions/v1/map-key
pub async fn preflight() -> impl IntoResponse {
    (StatusCode::OK, cors_headers(), "ok")
}

/// GET|POST /functions/v1/map-key
pub async fn map_key(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<impl IntoResponse> {
    bearer_token(&headers).ok_or_else(|| ApiError::Unauthorized(MISSING_AUTH_MESSAGE.to_string()))?;

    let key = state
        .map_key()
        .ok_or_else(|| ApiError::Misconfigured(MISSING_KEY_MESSAGE.to_string()))?;

    Ok((
        StatusCode::OK,
        cors_headers(),
        Json(MapKeyResponse {
            key: key.to_string(),
        }),
    ))
}

/// The bearer token from an `Authorization` header, if well formed
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(auth: Option<&'static str>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(value) = auth {
            headers.insert(AUTHORIZATION, HeaderValue::from_static(value));
        }
        headers
    }

    #[test]
    fn test_bearer_token() {
        assert_eq!(bearer_token(&headers(Some("Bearer abc.def"))), Some("abc.def"));
        assert_eq!(bearer_token(&headers(None)), None);
        assert_eq!(bearer_token(&headers(Some("Basic dXNlcjpwYXNz"))), None);
        assert_eq!(bearer_token(&headers(Some("Bearer "))), None);
        assert_eq!(bearer_token(&headers(Some("bearer abc"))), None);
    }
}
