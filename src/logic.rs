//! Core behaviors shared by both HTTP and WebSocket handlers.
//!
//! This includes:
//!   - Local grading for the session collaborator (option flag / text match)
//!   - Opening a lesson session from the store
//!   - Public DTO conversion with answer keys stripped

use tracing::{info, instrument, warn};

use crate::domain::{AttemptStatus, LessonItem, OptionId};
use crate::engine::resolve_correct_answer;
use crate::protocol::{ChallengeOut, ChallengeSummary, OptionOut};
use crate::session::{LessonSession, SessionError};
use crate::state::AppState;
use crate::util::{normalize_answer, trunc_for_log};

/// Selection types: the chosen option's own flag decides. Unknown ids are wrong.
pub fn grade_selection(item: &LessonItem, option_id: OptionId) -> AttemptStatus {
  match item.options.iter().find(|o| o.id == option_id) {
    Some(o) if o.correct => AttemptStatus::Correct,
    Some(_) => AttemptStatus::Wrong,
    None => {
      warn!(target: "challenge", id = item.challenge.id, option_id, "Selected id not among options");
      AttemptStatus::Wrong
    }
  }
}

/// Text types: case and whitespace insensitive match against the resolved answer.
pub fn grade_text(item: &LessonItem, answer: &str) -> AttemptStatus {
  let Some(expected) = resolve_correct_answer(&item.challenge, &item.options) else {
    warn!(target: "challenge", id = item.challenge.id, "No resolvable answer; grading as wrong");
    return AttemptStatus::Wrong;
  };
  let status = if normalize_answer(&expected) == normalize_answer(answer) {
    AttemptStatus::Correct
  } else {
    AttemptStatus::Wrong
  };
  info!(target: "challenge", id = item.challenge.id, answer = %trunc_for_log(answer, 60), ?status, "Text answer graded");
  status
}

#[instrument(level = "info", skip(state))]
pub async fn open_session(state: &AppState, lesson: Option<&str>) -> Result<LessonSession, SessionError> {
  let lesson = lesson.unwrap_or(state.default_lesson.as_str()).to_string();
  let items = state
    .lesson_items(&lesson)
    .await
    .ok_or_else(|| SessionError::UnknownLesson(lesson.clone()))?;
  let session = LessonSession::start(&lesson, items, state.audio.clone(), state.show_correct_answer)?;
  info!(target: "challenge_engine", session_id = %session.id(), %lesson, total = session.total(), "Lesson session started");
  Ok(session)
}

pub fn to_out(item: &LessonItem) -> ChallengeOut {
  let c = &item.challenge;
  ChallengeOut {
    id: c.id,
    lesson: item.lesson.clone(),
    question: c.question.clone(),
    kind: c.kind,
    hint: c.hint.clone(),
    audio_src: c.audio_src.clone(),
    video_src: c.video_src.clone(),
    options: item
      .options
      .iter()
      .map(|o| OptionOut {
        id: o.id,
        text: o.text.clone(),
        image_src: o.image_src.clone(),
        audio_src: o.audio_src.clone(),
      })
      .collect(),
  }
}

pub fn to_summary(item: &LessonItem) -> ChallengeSummary {
  ChallengeSummary {
    id: item.challenge.id,
    lesson: item.lesson.clone(),
    kind: item.challenge.kind,
    question: item.challenge.question.clone(),
  }
}
