//! WebSocket upgrade + message loop. Each connection owns at most one lesson
//! session; every client message is applied to it and answered with one JSON
//! message carrying the fresh view and the engine events it produced.

use std::sync::Arc;
use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tracing::{info, error, instrument, debug};

use crate::logic::open_session;
use crate::protocol::{ClientWsMessage, ServerWsMessage};
use crate::session::{LessonSession, SessionError};
use crate::state::AppState;

#[instrument(level = "info", skip(state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "challenge_engine", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  info!(target: "challenge_engine", "WebSocket connected");
  let mut session: Option<LessonSession> = None;

  while let Some(Ok(msg)) = socket.recv().await {
    match msg {
      Message::Text(txt) => {
        let reply_msg = match serde_json::from_str::<ClientWsMessage>(&txt) {
          Ok(incoming) => {
            debug!(target: "challenge_engine", "WS received: {:?}", &incoming);
            handle_client_ws(incoming, &state, &mut session).await
          }
          Err(e) => ServerWsMessage::Error { message: format!("Invalid JSON: {}", e) },
        };

        let out = serde_json::to_string(&reply_msg).unwrap_or_else(|e| {
          serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
        });

        if let Err(e) = socket.send(Message::Text(out)).await {
          error!(target: "challenge_engine", error = %e, "WS send error");
          break;
        }
      }
      Message::Ping(payload) => { let _ = socket.send(Message::Pong(payload)).await; }
      Message::Close(_) => break,
      _ => {}
    }
  }
  if let Some(s) = &session {
    info!(target: "challenge_engine", session_id = %s.id(), position = s.position(), status = ?s.status(), "Session dropped with connection");
  }
  info!(target: "challenge_engine", "WebSocket disconnected");
}

fn view_reply(s: &mut LessonSession) -> ServerWsMessage {
  ServerWsMessage::View {
    session_id: s.id().to_string(),
    position: s.position(),
    total: s.total(),
    view: s.view(),
    events: s.take_events(),
  }
}

fn error_reply(e: SessionError) -> ServerWsMessage {
  ServerWsMessage::Error { message: e.to_string() }
}

pub(crate) async fn handle_client_ws(
  msg: ClientWsMessage,
  state: &AppState,
  session: &mut Option<LessonSession>,
) -> ServerWsMessage {
  if let ClientWsMessage::Ping = msg {
    return ServerWsMessage::Pong;
  }
  if let ClientWsMessage::StartLesson { lesson } = msg {
    return match open_session(state, lesson.as_deref()).await {
      Ok(s) => view_reply(session.insert(s)),
      Err(e) => error_reply(e),
    };
  }

  let Some(s) = session.as_mut() else {
    return error_reply(SessionError::NotStarted);
  };

  let result = match msg {
    ClientWsMessage::Input { event } => {
      s.input(event);
      Ok(())
    }
    ClientWsMessage::Check => s.check().map(|status| {
      tracing::info!(target: "challenge", session_id = %s.id(), ?status, "WS check evaluated");
    }),
    ClientWsMessage::Retry => s.retry(),
    ClientWsMessage::Next => match s.next() {
      Ok(true) => Ok(()),
      Ok(false) => {
        return ServerWsMessage::LessonComplete { lesson: s.lesson().to_string(), events: s.take_events() };
      }
      Err(e) => Err(e),
    },
    ClientWsMessage::SaveSettings { audio } => {
      s.save_audio(audio);
      Ok(())
    }
    ClientWsMessage::Ping | ClientWsMessage::StartLesson { .. } => Ok(()),
  };

  match result {
    Ok(()) => view_reply(s),
    Err(e) => error_reply(e),
  }
}
