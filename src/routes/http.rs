//! HTTP endpoint handlers. These are thin read-only wrappers over the store;
//! attempts are driven over the WebSocket.

use std::sync::Arc;
use axum::{extract::{Path, Query, State}, http::StatusCode, response::IntoResponse, Json};
use tracing::{info, instrument, warn};

use crate::logic::{to_out, to_summary};
use crate::protocol::*;
use crate::state::AppState;

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

#[instrument(level = "info", skip(state), fields(lesson = ?q.lesson))]
pub async fn http_list_challenges(
  State(state): State<Arc<AppState>>,
  Query(q): Query<ChallengeQuery>,
) -> impl IntoResponse {
  let items = state.list(q.lesson.as_deref()).await;
  info!(target: "challenge", count = items.len(), "HTTP challenge list served");
  Json(items.iter().map(to_summary).collect::<Vec<ChallengeSummary>>())
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_challenge(
  State(state): State<Arc<AppState>>,
  Path(id): Path<i64>,
) -> axum::response::Response {
  match state.get_item(id).await {
    Some(item) => {
      info!(target: "challenge", id, lesson = %item.lesson, "HTTP challenge served");
      Json(to_out(&item)).into_response()
    }
    None => {
      warn!(target: "challenge", id, "HTTP challenge not found");
      (StatusCode::NOT_FOUND, Json(ErrorOut { message: format!("Unknown challenge id: {}", id) })).into_response()
    }
  }
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_audio_settings(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(state.audio.clone())
}
