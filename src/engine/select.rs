//! Select/Grid widget: one button per option, keyboard shortcuts, audio cues.

use serde::Serialize;
use tracing::debug;

use crate::domain::{AnswerOption, AttemptStatus, ChallengeType, OptionId};
use crate::engine::events::EngineEvent;
use crate::engine::media::play_with_policy;
use crate::engine::WidgetCtx;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GridLayout {
  SingleColumn,
  AutoFit,
  Responsive { min: u8, max: u8 },
  Fixed { columns: u8 },
}

pub fn layout_for(kind: ChallengeType) -> GridLayout {
  match kind {
    ChallengeType::Assist => GridLayout::SingleColumn,
    ChallengeType::ImageSelect => GridLayout::Responsive { min: 1, max: 3 },
    ChallengeType::TrueFalse => GridLayout::Fixed { columns: 2 },
    _ => GridLayout::AutoFit,
  }
}

/// `t`/`f` for the first two TRUE_FALSE options, `1..n` everywhere else.
pub fn shortcut_for(kind: ChallengeType, index: usize) -> String {
  match (kind, index) {
    (ChallengeType::TrueFalse, 0) => "t".into(),
    (ChallengeType::TrueFalse, 1) => "f".into(),
    _ => (index + 1).to_string(),
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonState {
  Idle,
  Selected,
  Correct,
  Wrong,
}

pub fn button_state(selected: bool, status: AttemptStatus) -> ButtonState {
  match (selected, status) {
    (false, _) => ButtonState::Idle,
    (true, AttemptStatus::None) => ButtonState::Selected,
    (true, AttemptStatus::Correct) => ButtonState::Correct,
    (true, AttemptStatus::Wrong) => ButtonState::Wrong,
  }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OptionButton {
  pub id: OptionId,
  pub text: String,
  pub shortcut: String,
  pub state: ButtonState,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub image_src: Option<String>,
  pub has_audio: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SelectView {
  pub layout: GridLayout,
  pub buttons: Vec<OptionButton>,
  pub disabled: bool,
}

pub struct SelectWidget {
  kind: ChallengeType,
  options: Vec<AnswerOption>,
}

impl SelectWidget {
  pub fn new(kind: ChallengeType, options: &[AnswerOption]) -> Self {
    Self { kind, options: options.to_vec() }
  }

  pub fn option_for_key(&self, key: &str) -> Option<&AnswerOption> {
    let key = key.to_lowercase();
    self.options
      .iter()
      .enumerate()
      .find(|(i, _)| shortcut_for(self.kind, *i) == key)
      .map(|(_, o)| o)
  }

  /// Click on an option. Returns the reported id, or `None` for a no-op.
  pub fn click(&self, id: OptionId, ctx: &mut WidgetCtx<'_>) -> Option<OptionId> {
    let Some(option) = self.options.iter().find(|o| o.id == id) else {
      debug!(target: "engine", option_id = id, "Click on unknown option ignored");
      return None;
    };
    self.choose(option, ctx)
  }

  pub fn key(&self, key: &str, ctx: &mut WidgetCtx<'_>) -> Option<OptionId> {
    let option = self.option_for_key(key)?;
    self.choose(option, ctx)
  }

  fn choose(&self, option: &AnswerOption, ctx: &mut WidgetCtx<'_>) -> Option<OptionId> {
    if ctx.disabled {
      return None;
    }
    if let Some(src) = option.audio_src.as_deref().filter(|s| !s.trim().is_empty()) {
      play_with_policy(ctx.media, ctx.audio, src);
    }
    ctx.sink.emit(EngineEvent::Select { option_id: option.id });
    Some(option.id)
  }

  pub fn view(&self, selected: Option<OptionId>, status: AttemptStatus, disabled: bool) -> SelectView {
    let buttons = self.options
      .iter()
      .enumerate()
      .map(|(i, o)| OptionButton {
        id: o.id,
        text: o.text.clone(),
        shortcut: shortcut_for(self.kind, i),
        state: button_state(selected == Some(o.id), status),
        image_src: o.image_src.clone().filter(|s| !s.trim().is_empty()),
        has_audio: o.audio_src.as_deref().map_or(false, |s| !s.trim().is_empty()),
      })
      .collect();
    SelectView { layout: layout_for(self.kind), buttons, disabled }
  }
}
