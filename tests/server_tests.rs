use std::sync::Arc;

use axum::body::{self, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use mathtutor::config::Settings;
use mathtutor::server::{build_router, AppState};
use mathtutor::TutorError;
use serde_json::{json, Value};
use tower::ServiceExt;

fn test_app() -> Router {
  app_with(Settings::default())
}

fn app_with(settings: Settings) -> Router {
  build_router(Arc::new(AppState { settings }))
}

async fn post_solve(app: Router, payload: &str) -> (StatusCode, Value) {
  let request = Request::post("/solve")
    .header("content-type", "application/json")
    .body(Body::from(payload.to_string()))
    .expect("request");
  let response = app.oneshot(request).await.expect("response");
  let status = response.status();
  let bytes = body::to_bytes(response.into_body(), usize::MAX)
    .await
    .expect("body");
  (status, serde_json::from_slice(&bytes).expect("json"))
}

#[tokio::test]
async fn healthz_reports_ok() {
  let request = Request::get("/healthz").body(Body::empty()).expect("request");
  let response = test_app().oneshot(request).await.expect("response");
  assert_eq!(response.status(), StatusCode::OK);

  let body = body::to_bytes(response.into_body(), usize::MAX)
    .await
    .expect("body");
  assert_eq!(body.as_ref(), b"ok");
}

#[tokio::test]
async fn index_serves_the_page() {
  let request = Request::get("/").body(Body::empty()).expect("request");
  let response = test_app().oneshot(request).await.expect("response");
  assert_eq!(response.status(), StatusCode::OK);

  let body = body::to_bytes(response.into_body(), usize::MAX)
    .await
    .expect("body");
  let html = String::from_utf8(body.to_vec()).expect("utf8");
  assert!(html.contains("/solve"));
}

#[tokio::test]
async fn solves_an_equation() {
  let payload = json!({ "text": "x^2 - 5x + 6 = 0" }).to_string();
  let (status, body) = post_solve(test_app(), &payload).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["ok"], true);
  assert_eq!(body["type"], "solve");
  assert_eq!(body["result"], "x = 2, x = 3");
  assert!(body["steps"].as_array().is_some_and(|s| !s.is_empty()));
  assert!(body["latex"].is_string());
  assert_eq!(body["solutions"][0]["x"], "2");
}

#[tokio::test]
async fn mode_and_verbosity_are_honoured() {
  let payload = json!({
    "text": "x^3",
    "mode": "diff",
    "verbosity": "brief",
  })
  .to_string();
  let (status, body) = post_solve(test_app(), &payload).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["type"], "derivative");
  assert_eq!(body["result"], "3*x^2");
  assert!(body.get("solutions").is_none());
}

#[tokio::test]
async fn auto_mode_uses_keywords() {
  let payload = json!({ "text": "محدد [[1, 2], [3, 4]]", "mode": "auto" });
  let (status, body) = post_solve(test_app(), &payload.to_string()).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["type"], "matrix");
  assert_eq!(body["result"], "-2");
}

#[tokio::test]
async fn empty_text_is_rejected() {
  let (status, body) = post_solve(test_app(), r#"{"text": "   "}"#).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["ok"], false);
  assert_eq!(body["error"], "يرجى كتابة مسألة.");
}

#[tokio::test]
async fn malformed_json_reads_as_empty() {
  let (status, body) = post_solve(test_app(), "not json").await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["error"], "يرجى كتابة مسألة.");
}

#[tokio::test]
async fn overlong_text_is_rejected() {
  let text = "1 + ".repeat(200) + "1";
  let payload = json!({ "text": text }).to_string();
  let (status, body) = post_solve(test_app(), &payload).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["ok"], false);
  assert!(body["error"].as_str().is_some_and(|e| e.contains("500")));
}

#[tokio::test]
async fn unknown_mode_is_rejected() {
  let payload = json!({ "text": "1 + 1", "mode": "plot" }).to_string();
  let (status, body) = post_solve(test_app(), &payload).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["ok"], false);
}

#[tokio::test]
async fn solver_errors_are_reported() {
  let payload = json!({ "text": "x + 1 = x + 2" }).to_string();
  let (status, body) = post_solve(test_app(), &payload).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["ok"], false);
  assert!(body["error"].as_str().is_some_and(|e| e.contains("لم يتم")));
}

#[tokio::test]
async fn unknown_verbosity_names_the_field() {
  let payload = json!({ "text": "2+2", "verbosity": "loud" }).to_string();
  let (status, body) = post_solve(test_app(), &payload).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["ok"], false);
  assert!(
    body["error"].as_str().is_some_and(|e| e.contains("مستوى الشرح")),
    "{body}"
  );
}

#[tokio::test]
async fn unknown_angle_unit_names_the_field() {
  let payload = json!({ "text": "sin(30)", "angle_unit": "grad" }).to_string();
  let (status, body) = post_solve(test_app(), &payload).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(
    body["error"].as_str().is_some_and(|e| e.contains("وحدة الزاوية")),
    "{body}"
  );
}

#[tokio::test]
async fn angle_unit_aliases_are_accepted() {
  let payload = json!({ "text": "sin(0)", "angle_unit": "rad" }).to_string();
  let (status, body) = post_solve(test_app(), &payload).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["result"], "0");
}

#[tokio::test]
async fn undefined_value_is_an_error() {
  let payload = json!({ "text": "1/0" }).to_string();
  let (status, body) = post_solve(test_app(), &payload).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["ok"], false);
}

#[tokio::test]
async fn slow_solve_times_out() {
  let app = app_with(Settings {
    solve_timeout_ms: 0,
    ..Settings::default()
  });
  let payload = json!({
    "text": "derivative order 3 of x^3*sin(x)^2*exp(x)",
  })
  .to_string();
  let (status, body) = post_solve(app, &payload).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["error"], TutorError::Timeout.to_string());
}
