//! HTTP surface: `POST /solve`, the embedded page and a health check.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::Settings;
use crate::tutor::{solve_query, AngleUnit, Options, Solution, Verbosity};
use crate::{Intent, TutorError};

const INDEX_HTML: &str = include_str!("../static/index.html");

#[derive(Debug, Clone)]
pub struct AppState {
  pub settings: Settings,
}

/// Body of `POST /solve`. A body that is not valid JSON reads as empty.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SolveRequest {
  pub text: String,
  /// An intent name or alias; `auto` or empty lets the classifier decide.
  pub mode: Option<String>,
  pub verbosity: Option<String>,
  pub angle_unit: Option<String>,
}

#[derive(Serialize)]
struct SolveResponse<'a> {
  ok: bool,
  #[serde(flatten)]
  solution: &'a Solution,
}

impl SolveRequest {
  fn options(&self, settings: &Settings) -> Result<Options, TutorError> {
    let mode = match self.mode.as_deref().map(str::trim) {
      None | Some("") | Some("auto") => None,
      Some(name) => Some(name.parse::<Intent>()?),
    };
    let verbosity = match self.verbosity.as_deref() {
      Some(name) => name.parse::<Verbosity>()?,
      None => settings.default_verbosity,
    };
    let angle_unit = match self.angle_unit.as_deref() {
      Some(name) => name.parse::<AngleUnit>()?,
      None => settings.default_angle_unit,
    };
    Ok(Options {
      mode,
      verbosity,
      angle_unit,
    })
  }
}

pub fn build_router(state: Arc<AppState>) -> Router {
  let max_body = state.settings.max_body_bytes;
  let cors = state.settings.cors;
  let mut router = Router::new()
    .route("/", get(index))
    .route("/healthz", get(healthz))
    .route("/solve", post(solve))
    .with_state(state)
    .layer(RequestBodyLimitLayer::new(max_body))
    .layer(TraceLayer::new_for_http());
  if cors {
    router = router.layer(CorsLayer::permissive());
  }
  router
}

pub async fn serve(settings: Settings) -> anyhow::Result<()> {
  let addr: SocketAddr = settings
    .bind_addr
    .parse()
    .with_context(|| format!("invalid bind address '{}'", settings.bind_addr))?;
  let app = build_router(Arc::new(AppState { settings }));

  let listener = tokio::net::TcpListener::bind(addr)
    .await
    .with_context(|| format!("failed to bind {addr}"))?;
  info!(%addr, "mathtutor listening");
  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await?;
  Ok(())
}

async fn shutdown_signal() {
  if let Err(error) = tokio::signal::ctrl_c().await {
    warn!(%error, "could not install the ctrl-c handler");
    std::future::pending::<()>().await;
  }
  info!("shutting down");
}

async fn index() -> Html<&'static str> {
  Html(INDEX_HTML)
}

async fn healthz() -> &'static str {
  "ok"
}

fn error_response(error: &TutorError) -> Response {
  (
    StatusCode::BAD_REQUEST,
    Json(json!({ "ok": false, "error": error.to_string() })),
  )
    .into_response()
}

async fn solve(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
  let request: SolveRequest = serde_json::from_slice(&body).unwrap_or_default();
  let text = request.text.trim().to_string();
  if text.is_empty() {
    return error_response(&TutorError::EmptyInput);
  }
  let limit = state.settings.max_input_chars;
  if text.chars().count() > limit {
    return error_response(&TutorError::InputTooLong(limit));
  }
  let options = match request.options(&state.settings) {
    Ok(options) => options,
    Err(error) => return error_response(&error),
  };

  let timeout = Duration::from_millis(state.settings.solve_timeout_ms);
  let task = tokio::task::spawn_blocking(move || solve_query(&text, &options));
  match tokio::time::timeout(timeout, task).await {
    Ok(Ok(Ok(solution))) => (
      StatusCode::OK,
      Json(SolveResponse {
        ok: true,
        solution: &solution,
      }),
    )
      .into_response(),
    Ok(Ok(Err(error))) => {
      info!(%error, "query rejected");
      error_response(&error)
    }
    Ok(Err(join_error)) => {
      warn!(error = %join_error, "solver task failed");
      error_response(&TutorError::EvaluationError(
        "حدث خطأ أثناء الحل.".to_string(),
      ))
    }
    Err(_) => {
      warn!(timeout_ms = state.settings.solve_timeout_ms, "solver timed out");
      error_response(&TutorError::Timeout)
    }
  }
}
