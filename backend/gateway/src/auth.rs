//! Gateway Authentication
//!
//! Optional static bearer token: when the server is configured with one,
//! every problems-API request must present it. The caller's owner reference
//! rides along in the `X-User-Id` header either way.

use std::sync::Arc;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{HeaderMap, StatusCode, header, request::Parts},
};
use tracing::warn;

use crate::server::GatewayState;

/// Identity attached to an accepted request.
pub struct AuthenticatedUser {
    pub user_id: Option<String>,
}

pub struct RequireAuth(pub AuthenticatedUser);

#[async_trait]
impl FromRequestParts<Arc<GatewayState>> for RequireAuth {
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<GatewayState>,
    ) -> Result<Self, Self::Rejection> {
        check_bearer_token(&parts.headers, state.api_token.as_deref())?;

        let user_id = parts
            .headers
            .get("x-user-id")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        Ok(RequireAuth(AuthenticatedUser { user_id }))
    }
}

fn check_bearer_token(
    headers: &HeaderMap,
    expected: Option<&str>,
) -> Result<(), (StatusCode, &'static str)> {
    let Some(expected) = expected else {
        return Ok(());
    };

    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    match token {
        Some(token) if token == expected => Ok(()),
        Some(_) => {
            warn!("Rejected request with invalid bearer token");
            Err((StatusCode::UNAUTHORIZED, "Invalid token"))
        }
        None => {
            warn!("Rejected request without credentials");
            Err((StatusCode::UNAUTHORIZED, "Missing credentials"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with_auth(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_open_server_accepts_anything() {
        assert!(check_bearer_token(&HeaderMap::new(), None).is_ok());
    }

    #[test]
    fn test_matching_token_accepted() {
        let headers = headers_with_auth("Bearer sekrit");
        assert!(check_bearer_token(&headers, Some("sekrit")).is_ok());
    }

    #[test]
    fn test_wrong_token_rejected() {
        let headers = headers_with_auth("Bearer wrong");
        let err = check_bearer_token(&headers, Some("sekrit")).unwrap_err();
        assert_eq!(err.0, StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_missing_header_rejected() {
        let err = check_bearer_token(&HeaderMap::new(), Some("sekrit")).unwrap_err();
        assert_eq!(err.0, StatusCode::UNAUTHORIZED);
        assert_eq!(err.1, "Missing credentials");
    }

    #[test]
    fn test_non_bearer_scheme_rejected() {
        let headers = headers_with_auth("Basic dXNlcjpwYXNz");
        assert!(check_bearer_token(&headers, Some("sekrit")).is_err());
    }
}
