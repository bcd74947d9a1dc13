use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use mongodb::bson::oid::ObjectId;
use std::sync::Arc;

use ideaforge_engine::EngineError;

use crate::error::ApiError;
use crate::state::AppState;

const DEVICE_ID_HEADER: &str = "x-device-id";
const DEVICE_PLATFORM_HEADER: &str = "x-device-platform";

/// Device fingerprint presented by unauthenticated callers.
#[derive(Debug, Clone)]
pub struct DeviceInfo {
    pub device_id: String,
    pub platform: String,
}

/// The caller's resolved identity: a verified token subject, or the stable
/// anonymous user behind the request's device fingerprint (created on first
/// sight). Resolved once per request, here at the boundary; the engine only
/// ever sees the resulting user id.
#[derive(Debug, Clone, Copy)]
pub struct CallerIdentity {
    pub user_id: ObjectId,
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for CallerIdentity {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        if let Some(token) = bearer_token(&parts.headers)? {
            let claims = state.auth.verify_token(token)?;
            let user_id = ObjectId::parse_str(&claims.sub)
                .map_err(|_| ApiError::Unauthorized("Invalid token subject".to_string()))?;
            return Ok(Self { user_id });
        }

        let device = extract_device_info(&parts.headers).ok_or_else(|| {
            ApiError::Engine(EngineError::DeviceIdentity(
                "Device ID is required for anonymous users".to_string(),
            ))
        })?;

        let users = state.persist.users();
        let user = match users
            .find_anonymous_by_device(&device.device_id, &device.platform)
            .await
            .map_err(|e| ApiError::Internal(e.into()))?
        {
            Some(user) => user,
            None => users
                .create_anonymous(&device.device_id, &device.platform)
                .await
                .map_err(|e| ApiError::Internal(e.into()))?,
        };

        Ok(Self { user_id: user.id })
    }
}

fn bearer_token(headers: &HeaderMap) -> Result<Option<&str>, ApiError> {
    let Some(value) = headers.get(AUTHORIZATION) else {
        return Ok(None);
    };

    let value = value
        .to_str()
        .map_err(|_| ApiError::Unauthorized("Invalid authorization header".to_string()))?;

    let mut parts = value.split_whitespace();
    let scheme = parts.next().unwrap_or_default();
    let token = parts.next().unwrap_or_default();

    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() || parts.next().is_some() {
        return Err(ApiError::Unauthorized(
            "Invalid authorization header".to_string(),
        ));
    }

    Ok(Some(token))
}

/// Read the device fingerprint headers. Platform defaults to web unless the
/// client declares mobile; the device id has no default.
pub fn extract_device_info(headers: &HeaderMap) -> Option<DeviceInfo> {
    let device_id = headers
        .get(DEVICE_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())?;

    let platform = match headers
        .get(DEVICE_PLATFORM_HEADER)
        .and_then(|v| v.to_str().ok())
    {
        Some("mobile") => "mobile",
        _ => "web",
    };

    Some(DeviceInfo {
        device_id: device_id.to_string(),
        platform: platform.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_device_info_requires_device_id() {
        let headers = HeaderMap::new();
        assert!(extract_device_info(&headers).is_none());
    }

    #[test]
    fn test_device_platform_defaults_to_web() {
        let mut headers = HeaderMap::new();
        headers.insert(DEVICE_ID_HEADER, HeaderValue::from_static("abc-123"));

        let device = extract_device_info(&headers).unwrap();
        assert_eq!(device.device_id, "abc-123");
        assert_eq!(device.platform, "web");
    }

    #[test]
    fn test_device_platform_mobile() {
        let mut headers = HeaderMap::new();
        headers.insert(DEVICE_ID_HEADER, HeaderValue::from_static("abc-123"));
        headers.insert(DEVICE_PLATFORM_HEADER, HeaderValue::from_static("mobile"));

        let device = extract_device_info(&headers).unwrap();
        assert_eq!(device.platform, "mobile");
    }

    #[test]
    fn test_bearer_token_parsing() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(bearer_token(&headers).unwrap(), Some("abc.def.ghi"));

        let mut bad = HeaderMap::new();
        bad.insert(AUTHORIZATION, HeaderValue::from_static("Basic foo"));
        assert!(bearer_token(&bad).is_err());

        assert_eq!(bearer_token(&HeaderMap::new()).unwrap(), None);
    }
}
