//! Free-text / speech entry widget.

use serde::Serialize;
use tracing::debug;

use crate::domain::{AttemptStatus, ChallengeType};
use crate::engine::events::EngineEvent;
use crate::engine::WidgetCtx;
use crate::util::trunc_for_log;

const COMMIT_KEY: &str = "Enter";

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TextView {
  pub value: String,
  pub focused: bool,
  pub speech_primary: bool,
  pub listening: bool,
  pub can_submit: bool,
  pub disabled: bool,
}

pub struct TextWidget {
  kind: ChallengeType,
  value: String,
  listening: bool,
}

impl TextWidget {
  pub fn new(kind: ChallengeType) -> Self {
    Self { kind, value: String::new(), listening: false }
  }

  pub fn value(&self) -> &str {
    &self.value
  }

  /// Typed edit. Emits `TextChange` with the full value.
  pub fn input(&mut self, value: String, ctx: &mut WidgetCtx<'_>) -> bool {
    if ctx.disabled {
      return false;
    }
    self.value = value;
    ctx.sink.emit(EngineEvent::TextChange { text: self.value.clone() });
    true
  }

  pub fn speech_start(&mut self, disabled: bool) {
    if !disabled {
      self.listening = true;
    }
  }

  pub fn speech_stop(&mut self) {
    self.listening = false;
  }

  /// Transcribed speech goes through the same change path as typing.
  pub fn speech_result(&mut self, text: String, ctx: &mut WidgetCtx<'_>) -> bool {
    self.listening = false;
    debug!(target: "engine", text = %trunc_for_log(&text, 80), "Speech result received");
    self.input(text, ctx)
  }

  /// Enter (without Shift) submits the trimmed value.
  pub fn key(&mut self, key: &str, shift: bool, ctx: &mut WidgetCtx<'_>) -> bool {
    if key != COMMIT_KEY || shift || ctx.disabled {
      return false;
    }
    let trimmed = self.value.trim();
    if trimmed.is_empty() {
      return false;
    }
    ctx.sink.emit(EngineEvent::TextSubmit { text: trimmed.to_string() });
    true
  }

  pub fn clear(&mut self) {
    self.value.clear();
    self.listening = false;
  }

  pub fn view(&self, status: AttemptStatus, disabled: bool) -> TextView {
    TextView {
      value: self.value.clone(),
      focused: status == AttemptStatus::None && !disabled,
      speech_primary: self.kind == ChallengeType::SpeechInput,
      listening: self.listening,
      can_submit: !disabled && !self.value.trim().is_empty(),
      disabled,
    }
  }
}
