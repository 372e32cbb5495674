//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};

use crate::domain::{ChallengeType, OptionId};
use crate::engine::events::{EngineEvent, InputEvent};
use crate::engine::media::AudioSettings;
use crate::engine::ChallengeView;

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    StartLesson {
        #[serde(default)]
        lesson: Option<String>,
    },
    Input {
        event: InputEvent,
    },
    Check,
    Retry,
    Next,
    SaveSettings {
        audio: AudioSettings,
    },
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    View {
        #[serde(rename = "sessionId")]
        session_id: String,
        position: usize,
        total: usize,
        view: ChallengeView,
        /// Engine events since the previous reply (selections, text changes, media commands).
        events: Vec<EngineEvent>,
    },
    LessonComplete {
        lesson: String,
        events: Vec<EngineEvent>,
    },
    Error {
        message: String,
    },
}

/// Challenge as delivered to clients: no correct flags, orders, or answer text.
#[derive(Debug, Serialize)]
pub struct ChallengeOut {
    pub id: i64,
    pub lesson: String,
    pub question: String,
    #[serde(rename = "type")]
    pub kind: ChallengeType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(rename = "audioSrc", skip_serializing_if = "Option::is_none")]
    pub audio_src: Option<String>,
    #[serde(rename = "videoSrc", skip_serializing_if = "Option::is_none")]
    pub video_src: Option<String>,
    pub options: Vec<OptionOut>,
}

#[derive(Debug, Serialize)]
pub struct OptionOut {
    pub id: OptionId,
    pub text: String,
    #[serde(rename = "imageSrc", skip_serializing_if = "Option::is_none")]
    pub image_src: Option<String>,
    #[serde(rename = "audioSrc", skip_serializing_if = "Option::is_none")]
    pub audio_src: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChallengeSummary {
    pub id: i64,
    pub lesson: String,
    #[serde(rename = "type")]
    pub kind: ChallengeType,
    pub question: String,
}

//
// HTTP request/response DTOs
//

#[derive(Debug, Deserialize)]
pub struct ChallengeQuery {
    pub lesson: Option<String>,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}

#[derive(Serialize)]
pub struct ErrorOut {
    pub message: String,
}
