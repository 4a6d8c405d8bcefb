//! Caller identity taken from request headers

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, request::Parts},
};

use crate::api::types::ApiError;
use crate::domain::identity::Identity;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const ORGANIZATION_ID_HEADER: &str = "x-organization-id";

/// Extractor for per-user endpoints; requires `X-User-Id` and
/// `X-Organization-Id`
#[derive(Debug, Clone)]
pub struct RequireUser(pub Identity);

impl<S> FromRequestParts<S> for RequireUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        extract_identity(&parts.headers).map(RequireUser)
    }
}

pub fn extract_identity(headers: &HeaderMap) -> Result<Identity, ApiError> {
    let user_id = required_header(headers, USER_ID_HEADER, "X-User-Id")?;
    let organization_id = required_header(headers, ORGANIZATION_ID_HEADER, "X-Organization-Id")?;

    Ok(Identity::new(user_id, organization_id))
}

fn required_header(headers: &HeaderMap, name: &str, display: &str) -> Result<String, ApiError> {
    let value = headers
        .get(name)
        .ok_or_else(|| ApiError::unauthorized(format!("Missing {} header", display)))?
        .to_str()
        .map_err(|_| ApiError::bad_request(format!("Invalid {} header encoding", display)))?
        .trim();

    if value.is_empty() {
        return Err(ApiError::unauthorized(format!("Empty {} header", display)));
    }

    Ok(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    fn headers(pairs: &[(&'static str, &str)]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for (name, value) in pairs {
            headers.insert(*name, value.parse().unwrap());
        }
        headers
    }

    #[test]
    fn test_extracts_trimmed_identity() {
        let identity = extract_identity(&headers(&[
            (USER_ID_HEADER, " alice "),
            (ORGANIZATION_ID_HEADER, "acme"),
        ]))
        .unwrap();

        assert_eq!(identity, Identity::new("alice", "acme"));
    }

    #[test]
    fn test_missing_organization() {
        let err = extract_identity(&headers(&[(USER_ID_HEADER, "alice")])).unwrap_err();

        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
        assert!(err.response.error.message.contains("X-Organization-Id"));
    }

    #[test]
    fn test_blank_user() {
        let err = extract_identity(&headers(&[
            (USER_ID_HEADER, "  "),
            (ORGANIZATION_ID_HEADER, "acme"),
        ]))
        .unwrap_err();

        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
    }
}
