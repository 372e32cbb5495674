//! Domain models used by the engine: challenge types, answer options, attempt status.

use serde::{Deserialize, Serialize};

/// Option ids are plain integers, matching the lesson store's numeric keys.
pub type OptionId = i64;

/// Interaction mode of a single question.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChallengeType {
  Select,
  Assist,
  TrueFalse,
  DragDrop,
  TextInput,
  SpeechInput,
  ImageSelect,
  Listening,
  Video,
}
impl Default for ChallengeType {
  fn default() -> Self { ChallengeType::Select }
}

impl ChallengeType {
  /// Text types capture a typed/spoken answer instead of an option id.
  pub fn is_text(self) -> bool {
    matches!(self, ChallengeType::TextInput | ChallengeType::SpeechInput)
  }
}

/// One question. Immutable for the duration of an attempt.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Challenge {
  pub id: i64,
  pub question: String,
  #[serde(rename = "type", default)]
  pub kind: ChallengeType,
  #[serde(default)] pub hint: Option<String>,
  #[serde(default, rename = "audioSrc")] pub audio_src: Option<String>,
  #[serde(default, rename = "videoSrc")] pub video_src: Option<String>,
  #[serde(default, rename = "correctAnswer")] pub correct_answer: Option<String>,
}

/// One selectable/orderable choice of a question.
/// For DRAG_DROP `order` is the 1-based correct position; elsewhere `correct` marks the answer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnswerOption {
  pub id: OptionId,
  pub text: String,
  #[serde(default)] pub correct: bool,
  #[serde(default, rename = "imageSrc")] pub image_src: Option<String>,
  #[serde(default, rename = "audioSrc")] pub audio_src: Option<String>,
  #[serde(default)] pub order: Option<u32>,
}

/// Caller-controlled attempt state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptStatus {
  None,
  Correct,
  Wrong,
}
impl Default for AttemptStatus {
  fn default() -> Self { AttemptStatus::None }
}

/// A challenge with its options, as held by the store and served to a session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LessonItem {
  pub lesson: String,
  pub challenge: Challenge,
  pub options: Vec<AnswerOption>,
}
