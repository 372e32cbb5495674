//! Lesson session: the grading/session collaborator that drives one engine.
//!
//! This module owns:
//!   - the lesson's items and the current position
//!   - the attempt status fed back into the engine
//!   - the `CheckHandle` the ordering widget registers with
//!   - the audio settings the engine reads when configuring media
//!
//! Every engine event passes through `pump`, which records selections and
//! buffered text, grades sentinel and submit events, and queues the event for
//! the client.

use thiserror::Error;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::{AttemptStatus, ChallengeType, LessonItem, OptionId};
use crate::engine::events::{drain, EngineEvent, EventSink, InputEvent};
use crate::engine::media::{AudioSettings, ClientMedia, SharedAudioSettings};
use crate::engine::ordering::{CORRECT_SENTINEL, INCORRECT_SENTINEL};
use crate::engine::registry::CheckHandle;
use crate::engine::{ChallengeEngine, ChallengeProps, ChallengeView};
use crate::logic::{grade_selection, grade_text};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
  #[error("lesson '{0}' has no challenges")]
  EmptyLesson(String),
  #[error("unknown lesson '{0}'")]
  UnknownLesson(String),
  #[error("no lesson started")]
  NotStarted,
  #[error("attempt already settled; retry or continue")]
  AlreadySettled,
  #[error("attempt is still open")]
  Unsettled,
  #[error("nothing to check yet")]
  NothingToCheck,
}

pub struct LessonSession {
  id: String,
  lesson: String,
  items: Vec<LessonItem>,
  index: usize,
  status: AttemptStatus,
  show_correct_answer: bool,
  engine: ChallengeEngine,
  events: UnboundedReceiver<EngineEvent>,
  audio: SharedAudioSettings,
  selected: Option<OptionId>,
  text: String,
  outbox: Vec<EngineEvent>,
}

fn props_for(item: &LessonItem, status: AttemptStatus, show_correct_answer: bool) -> ChallengeProps {
  ChallengeProps {
    challenge: item.challenge.clone(),
    options: item.options.clone(),
    status,
    selected_option: None,
    disabled: status != AttemptStatus::None,
    show_correct_answer,
  }
}

impl LessonSession {
  pub fn start(
    lesson: &str,
    items: Vec<LessonItem>,
    audio: AudioSettings,
    show_correct_answer: bool,
  ) -> Result<Self, SessionError> {
    let first = items.first().ok_or_else(|| SessionError::EmptyLesson(lesson.to_string()))?;
    let (sink, events) = EventSink::channel();
    let checks = CheckHandle::new();
    let audio = SharedAudioSettings::new(audio);
    let engine = ChallengeEngine::new(
      props_for(first, AttemptStatus::None, show_correct_answer),
      sink.clone(),
      checks,
      Box::new(ClientMedia::new(sink)),
      Box::new(audio.clone()),
    );
    let mut session = Self {
      id: Uuid::new_v4().to_string(),
      lesson: lesson.to_string(),
      items,
      index: 0,
      status: AttemptStatus::None,
      show_correct_answer,
      engine,
      events,
      audio,
      selected: None,
      text: String::new(),
      outbox: Vec::new(),
    };
    session.pump();
    Ok(session)
  }

  pub fn id(&self) -> &str {
    &self.id
  }

  pub fn lesson(&self) -> &str {
    &self.lesson
  }

  /// 1-based position of the current challenge.
  pub fn position(&self) -> usize {
    self.index + 1
  }

  pub fn total(&self) -> usize {
    self.items.len()
  }

  pub fn status(&self) -> AttemptStatus {
    self.status
  }

  pub fn view(&self) -> ChallengeView {
    self.engine.view()
  }

  // `start` rejects empty lessons and `next` never steps past the last item.
  fn item(&self) -> &LessonItem {
    &self.items[self.index]
  }

  fn kind(&self) -> ChallengeType {
    self.item().challenge.kind
  }

  pub fn input(&mut self, event: InputEvent) {
    self.engine.handle_input(event);
    self.pump();
  }

  /// Ask for a verdict on the current attempt.
  pub fn check(&mut self) -> Result<AttemptStatus, SessionError> {
    if self.status != AttemptStatus::None {
      return Err(SessionError::AlreadySettled);
    }
    let kind = self.kind();
    if kind == ChallengeType::DragDrop {
      // The sentinel lands in the event channel and is graded by `pump`.
      self.engine.check_order().ok_or(SessionError::NothingToCheck)?;
    } else if kind.is_text() {
      if self.text.trim().is_empty() {
        return Err(SessionError::NothingToCheck);
      }
      let status = grade_text(self.item(), &self.text);
      self.settle(status);
    } else {
      let id = self.selected.ok_or(SessionError::NothingToCheck)?;
      let status = grade_selection(self.item(), id);
      self.settle(status);
    }
    self.pump();
    Ok(self.status)
  }

  pub fn retry(&mut self) -> Result<(), SessionError> {
    if self.status == AttemptStatus::None {
      return Err(SessionError::Unsettled);
    }
    self.settle(AttemptStatus::None);
    self.pump();
    Ok(())
  }

  /// Advance to the next challenge. `Ok(false)` when the lesson is complete.
  pub fn next(&mut self) -> Result<bool, SessionError> {
    if self.status == AttemptStatus::None {
      return Err(SessionError::Unsettled);
    }
    if self.index + 1 >= self.items.len() {
      info!(target: "challenge", session_id = %self.id, lesson = %self.lesson, "Lesson complete");
      return Ok(false);
    }
    self.index += 1;
    debug_assert!(self.index < self.items.len());
    self.status = AttemptStatus::None;
    self.engine.update(props_for(self.item(), self.status, self.show_correct_answer));
    self.pump();
    Ok(true)
  }

  pub fn save_audio(&mut self, settings: AudioSettings) {
    debug!(target: "challenge_engine", session_id = %self.id, ?settings, "Audio settings updated");
    self.audio.set(settings);
  }

  /// Events produced since the last call, in emission order.
  pub fn take_events(&mut self) -> Vec<EngineEvent> {
    std::mem::take(&mut self.outbox)
  }

  fn settle(&mut self, status: AttemptStatus) {
    self.status = status;
    info!(target: "challenge", session_id = %self.id, id = self.item().challenge.id, ?status, "Attempt status set");
    self.engine.update(props_for(self.item(), status, self.show_correct_answer));
  }

  fn pump(&mut self) {
    loop {
      let batch = drain(&mut self.events);
      if batch.is_empty() {
        break;
      }
      for event in batch {
        match &event {
          EngineEvent::Select { option_id }
            if self.kind() == ChallengeType::DragDrop
              && (*option_id == CORRECT_SENTINEL || *option_id == INCORRECT_SENTINEL) =>
          {
            if self.status == AttemptStatus::None {
              let status = if *option_id == CORRECT_SENTINEL { AttemptStatus::Correct } else { AttemptStatus::Wrong };
              self.settle(status);
            }
          }
          EngineEvent::Select { option_id } => self.selected = Some(*option_id),
          EngineEvent::TextChange { text } => {
            self.text = text.clone();
            if text.is_empty() {
              self.selected = None;
            }
          }
          EngineEvent::TextSubmit { text } => {
            if self.status == AttemptStatus::None {
              let status = grade_text(self.item(), text);
              self.settle(status);
            }
          }
          EngineEvent::Media { .. } => {}
        }
        self.outbox.push(event);
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::engine::WidgetView;
  use crate::seeds::seed_lesson;

  fn session_at(id: i64) -> LessonSession {
    let items: Vec<LessonItem> = seed_lesson().into_iter().filter(|i| i.challenge.id == id).collect();
    LessonSession::start("t", items, AudioSettings::default(), true).expect("session")
  }

  #[test]
  fn empty_lesson_is_rejected() {
    let err = LessonSession::start("none", vec![], AudioSettings::default(), true).err();
    assert_eq!(err, Some(SessionError::EmptyLesson("none".into())));
  }

  #[test]
  fn select_then_check_then_retry() {
    let mut s = session_at(1);
    assert_eq!(s.check(), Err(SessionError::NothingToCheck));
    s.input(InputEvent::Click { option_id: 2 });
    assert_eq!(s.check(), Ok(AttemptStatus::Wrong));
    assert!(s.view().reveal.is_some());
    assert_eq!(s.check(), Err(SessionError::AlreadySettled));

    s.retry().expect("retry");
    assert_eq!(s.status(), AttemptStatus::None);
    assert_eq!(s.check(), Err(SessionError::NothingToCheck), "old selection must not be resubmitted");
    assert!(s.take_events().contains(&EngineEvent::TextChange { text: String::new() }));

    s.input(InputEvent::KeyPress { key: "1".into(), shift: false });
    assert_eq!(s.check(), Ok(AttemptStatus::Correct));
  }

  #[test]
  fn text_submit_grades_immediately_and_retry_clears_buffer() {
    let mut s = session_at(5);
    for v in ["E", "EC", "EC3"] {
      s.input(InputEvent::TextInput { value: v.into() });
    }
    s.input(InputEvent::KeyPress { key: "Enter".into(), shift: false });
    assert_eq!(s.status(), AttemptStatus::Wrong);

    s.retry().expect("retry");
    let WidgetView::Text(t) = s.view().body else { panic!("text view") };
    assert_eq!(t.value, "");
    assert_eq!(s.check(), Err(SessionError::NothingToCheck));

    s.input(InputEvent::TextInput { value: "ec2".into() });
    assert_eq!(s.check(), Ok(AttemptStatus::Correct));
  }

  #[test]
  fn drag_drop_check_goes_through_registered_handle() {
    let mut s = session_at(4);
    assert_eq!(s.check(), Ok(AttemptStatus::Wrong));
    assert!(s.take_events().contains(&EngineEvent::Select { option_id: INCORRECT_SENTINEL }));
    s.retry().expect("retry");

    for target in 0..4usize {
      let WidgetView::Ordering(v) = s.view().body else { panic!("ordering view") };
      let from = v.items.iter().position(|i| i.id == target as OptionId + 1).expect("item");
      s.input(InputEvent::DragDrop { from, to: target });
    }
    assert_eq!(s.check(), Ok(AttemptStatus::Correct));
  }

  #[test]
  fn next_moves_through_lesson() {
    let mut s = LessonSession::start("seed", seed_lesson(), AudioSettings::default(), true).expect("session");
    assert_eq!(s.next(), Err(SessionError::Unsettled));
    s.input(InputEvent::Click { option_id: 1 });
    s.check().expect("check");
    assert_eq!(s.next(), Ok(true));
    assert_eq!(s.position(), 2);
    assert_eq!(s.view().kind, ChallengeType::Assist);
    assert_eq!(s.check(), Err(SessionError::NothingToCheck));
  }

  #[test]
  fn next_on_last_item_reports_completion() {
    let mut s = session_at(3);
    s.input(InputEvent::KeyPress { key: "t".into(), shift: false });
    assert_eq!(s.check(), Ok(AttemptStatus::Correct));
    assert_eq!(s.next(), Ok(false));
    assert_eq!(s.position(), 1);
  }

  #[test]
  fn saved_audio_settings_reach_media_view() {
    let mut s = session_at(8);
    s.save_audio(AudioSettings { volume: 0.2, muted: true, autoplay: false });
    let WidgetView::Listening(g) = s.view().body else { panic!("listening view") };
    let media = g.media.expect("media");
    assert_eq!(media.volume, 0.2);
    assert!(media.muted && !media.autoplay);
  }

  #[test]
  fn session_is_send() {
    fn assert_send<T: Send>() {}
    assert_send::<LessonSession>();
  }
}
