use super::*;
use axum::{
    body::{self, Body},
    http::Request,
};
use tower::ServiceExt;

async fn test_app() -> Router {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    build_router(
        Arc::new(AppState {
            api: ApiContext { storage },
        }),
        64 * 1024,
    )
}

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    let body = body.to_string();
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .header("content-length", body.len())
        .body(Body::from(body))
        .expect("request")
}

async fn read_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}

fn control_json(main_id: &str) -> serde_json::Value {
    serde_json::json!({
        "mainID": main_id,
        "mainDescription": "Rotate credentials",
        "domain": "Identity",
        "scope": "Global",
    })
}

#[tokio::test]
async fn healthz_reports_ok_when_storage_is_ready() {
    let app = test_app().await;
    let request = Request::get("/healthz")
        .body(Body::empty())
        .expect("request");
    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let body = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    assert_eq!(body.as_ref(), b"ok");
}

#[tokio::test]
async fn put_then_list_returns_created_control() {
    let app = test_app().await;

    let response = app
        .clone()
        .oneshot(json_request("PUT", "/items", control_json("12")))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::CREATED);
    let message: String = read_json(response).await;
    assert_eq!(message, "Put item 12");

    let response = app
        .oneshot(Request::get("/items").body(Body::empty()).expect("request"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let controls: Vec<Control> = read_json(response).await;
    assert_eq!(controls.len(), 1);
    assert_eq!(controls[0].main_id, "12");
    assert_eq!(controls[0].scope, "Global");
}

#[tokio::test]
async fn duplicate_put_returns_conflict_with_message() {
    let app = test_app().await;
    app.clone()
        .oneshot(json_request("PUT", "/items", control_json("ac-1")))
        .await
        .expect("response");

    let response = app
        .oneshot(json_request("PUT", "/items", control_json("AC-1")))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let error: ApiError = read_json(response).await;
    assert_eq!(error.message, "Duplicate mainID found: AC-1");
}

#[tokio::test]
async fn put_with_missing_fields_is_bad_request() {
    let app = test_app().await;
    let response = app
        .oneshot(json_request(
            "PUT",
            "/items",
            serde_json::json!({ "mainID": "1", "domain": "Network" }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error: ApiError = read_json(response).await;
    assert_eq!(error.message, "Missing required fields: mainDescription, scope");
}

#[tokio::test]
async fn get_single_control_or_empty_object() {
    let app = test_app().await;
    app.clone()
        .oneshot(json_request("PUT", "/items", control_json("3")))
        .await
        .expect("response");

    let response = app
        .clone()
        .oneshot(Request::get("/items/3").body(Body::empty()).expect("request"))
        .await
        .expect("response");
    let control: Control = read_json(response).await;
    assert_eq!(control.main_description, "Rotate credentials");

    let response = app
        .oneshot(Request::get("/items/4").body(Body::empty()).expect("request"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = read_json(response).await;
    assert_eq!(body, serde_json::json!({}));
}

#[tokio::test]
async fn post_updates_fields_and_unknown_id_is_not_found() {
    let app = test_app().await;
    app.clone()
        .oneshot(json_request("PUT", "/items", control_json("8")))
        .await
        .expect("response");

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/items/8",
            serde_json::json!({ "mainID": "8", "scope": "Regional" }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let message: String = read_json(response).await;
    assert_eq!(message, "Updated item 8");

    let response = app
        .clone()
        .oneshot(Request::get("/items/8").body(Body::empty()).expect("request"))
        .await
        .expect("response");
    let control: Control = read_json(response).await;
    assert_eq!(control.scope, "Regional");
    assert_eq!(control.domain, "Identity");

    let response = app
        .oneshot(json_request("POST", "/items/9", control_json("9")))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn post_renaming_onto_existing_id_is_conflict() {
    let app = test_app().await;
    for id in ["1", "2"] {
        app.clone()
            .oneshot(json_request("PUT", "/items", control_json(id)))
            .await
            .expect("response");
    }

    let response = app
        .oneshot(json_request("POST", "/items/1", control_json("2")))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn delete_removes_control_and_is_idempotent() {
    let app = test_app().await;
    app.clone()
        .oneshot(json_request("PUT", "/items", control_json("x y")))
        .await
        .expect("response");

    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(
                Request::delete("/items/x%20y")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let message: String = read_json(response).await;
        assert_eq!(message, "Deleted item x y");
    }

    let response = app
        .oneshot(Request::get("/items").body(Body::empty()).expect("request"))
        .await
        .expect("response");
    let controls: Vec<Control> = read_json(response).await;
    assert!(controls.is_empty());
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let app = build_router(
        Arc::new(AppState {
            api: ApiContext { storage },
        }),
        16,
    );
    let response = app
        .oneshot(json_request("PUT", "/items", control_json("1")))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

fn raw_json_request(method: &str, uri: &str, body: &'static str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .header("content-length", body.len())
        .body(Body::from(body))
        .expect("request")
}

#[tokio::test]
async fn truncated_put_body_answers_with_api_error() {
    let app = test_app().await;
    let response = app
        .oneshot(raw_json_request("PUT", "/items", r#"{"mainID": 5"#))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let error: ApiError = read_json(response).await;
    assert_eq!(error.code, ErrorCode::Validation);
    assert!(!error.message.is_empty());
}

#[tokio::test]
async fn mistyped_post_body_answers_with_api_error() {
    let app = test_app().await;
    app.clone()
        .oneshot(json_request("PUT", "/items", control_json("3")))
        .await
        .expect("response");

    let response = app
        .oneshot(raw_json_request("POST", "/items/3", r#"{"scope": 7}"#))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let error: ApiError = read_json(response).await;
    assert_eq!(error.code, ErrorCode::Validation);
    assert!(error.message.contains("scope"), "{}", error.message);
}
