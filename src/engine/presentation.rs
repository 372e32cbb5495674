//! Question presentation (prompt + hint toggle) and the answer reveal panel.

use serde::Serialize;

use crate::domain::{AttemptStatus, Challenge};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HintView {
  pub text: String,
  pub visible: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct QuestionView {
  pub question: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub hint: Option<HintView>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RevealView {
  pub correct_answer: String,
}

#[derive(Debug, Default)]
pub struct Presentation {
  hint_visible: bool,
}

impl Presentation {
  pub fn toggle_hint(&mut self, challenge: &Challenge) {
    if has_hint(challenge) {
      self.hint_visible = !self.hint_visible;
    }
  }

  pub fn reset(&mut self) {
    self.hint_visible = false;
  }

  pub fn view(&self, challenge: &Challenge) -> QuestionView {
    QuestionView {
      question: challenge.question.clone(),
      hint: challenge
        .hint
        .as_deref()
        .filter(|h| !h.trim().is_empty())
        .map(|h| HintView { text: h.to_string(), visible: self.hint_visible }),
    }
  }
}

fn has_hint(challenge: &Challenge) -> bool {
  challenge.hint.as_deref().map_or(false, |h| !h.trim().is_empty())
}

/// Shown only for a wrong attempt with reveal enabled and a resolvable answer.
pub fn reveal(status: AttemptStatus, show_correct_answer: bool, correct: Option<&str>) -> Option<RevealView> {
  if status != AttemptStatus::Wrong || !show_correct_answer {
    return None;
  }
  correct
    .filter(|c| !c.trim().is_empty())
    .map(|c| RevealView { correct_answer: c.to_string() })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::ChallengeType;

  fn challenge(hint: Option<&str>) -> Challenge {
    Challenge {
      id: 5,
      question: "Which service runs virtual servers?".into(),
      kind: ChallengeType::Select,
      hint: hint.map(String::from),
      audio_src: None,
      video_src: None,
      correct_answer: None,
    }
  }

  #[test]
  fn hint_toggles_only_when_present() {
    let mut p = Presentation::default();
    let with = challenge(Some("Think compute"));
    p.toggle_hint(&with);
    assert_eq!(p.view(&with).hint.map(|h| h.visible), Some(true));
    p.toggle_hint(&with);
    assert_eq!(p.view(&with).hint.map(|h| h.visible), Some(false));

    let without = challenge(None);
    p.toggle_hint(&without);
    assert!(p.view(&without).hint.is_none());
  }

  #[test]
  fn reveal_requires_wrong_and_flag_and_text() {
    assert!(reveal(AttemptStatus::Wrong, true, Some("EC2")).is_some());
    assert!(reveal(AttemptStatus::Correct, true, Some("EC2")).is_none());
    assert!(reveal(AttemptStatus::None, true, Some("EC2")).is_none());
    assert!(reveal(AttemptStatus::Wrong, false, Some("EC2")).is_none());
    assert!(reveal(AttemptStatus::Wrong, true, None).is_none());
    assert!(reveal(AttemptStatus::Wrong, true, Some("")).is_none());
  }
}
