//! API integration tests.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

async fn test_router() -> axum::Router {
    dotenvy::dotenv().ok();
    let config = jobgrid_api::ApiConfig::from_env();
    let state = jobgrid_api::AppState::new(config)
        .await
        .expect("state requires Firestore and storage configuration");
    jobgrid_api::create_router(state, None)
}

#[tokio::test]
#[ignore = "requires Firestore and storage configuration"]
async fn test_health_endpoint() {
    let app = test_router().await;

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "requires Firestore and storage configuration"]
async fn test_protected_route_rejects_missing_token() {
    let app = test_router().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/job/get")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "requires Firestore and storage configuration"]
async fn test_unknown_route_is_404() {
    let app = test_router().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/nope")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
