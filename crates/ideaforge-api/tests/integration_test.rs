use axum::http::StatusCode;
use axum::response::IntoResponse;

use ideaforge_api::error::ApiError;
use ideaforge_engine::EngineError;

#[tokio::test]
async fn test_bad_request_maps_to_400() {
    let error = ApiError::BadRequest("Invalid thread ID format".to_string());
    let response = error.into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_engine_not_found_maps_to_404() {
    let error = ApiError::Engine(EngineError::NotFound("Thread not found".to_string()));
    let response = error.into_response();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_gateway_failure_maps_to_502() {
    let error = ApiError::Engine(EngineError::Gateway(anyhow::anyhow!("provider down")));
    let response = error.into_response();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_device_identity_maps_to_400() {
    let error = ApiError::Engine(EngineError::DeviceIdentity(
        "Device ID is required for anonymous users".to_string(),
    ));
    let response = error.into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_configuration_error_maps_to_500() {
    let error = ApiError::Engine(EngineError::Configuration(
        "Missing refinement template".to_string(),
    ));
    let response = error.into_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[test]
fn test_gateway_error_message_is_stable() {
    // The client-facing message must never carry prompt or provider details.
    let error = EngineError::Gateway(anyhow::anyhow!("secret prompt body leaked"));
    assert_eq!(error.to_string(), "AI generation failed");
}
