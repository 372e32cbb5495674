//! Load-time content audit.
//!
//! The engine trusts upstream content: it never rejects a question for having
//! zero or several correct options, or for gaps in drag orders. This audit only
//! reports such problems so authors can find them in the logs.

use thiserror::Error;
use tracing::warn;

use crate::domain::{ChallengeType, LessonItem, OptionId};
use crate::engine::ordering::{CORRECT_SENTINEL, INCORRECT_SENTINEL};
use crate::engine::resolve_correct_answer;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContentIssue {
  #[error("challenge {challenge_id}: no option is flagged correct")]
  NoCorrectOption { challenge_id: i64 },
  #[error("challenge {challenge_id}: {count} options are flagged correct")]
  MultipleCorrectOptions { challenge_id: i64, count: usize },
  #[error("challenge {challenge_id}: drag orders {found:?} are not a 1..={expected} permutation")]
  NonContiguousOrder { challenge_id: i64, found: Vec<Option<u32>>, expected: usize },
  #[error("challenge {challenge_id}: option id {option_id} collides with an order-check sentinel")]
  SentinelCollision { challenge_id: i64, option_id: OptionId },
  #[error("challenge {challenge_id}: text challenge has no resolvable answer")]
  MissingTextAnswer { challenge_id: i64 },
  #[error("challenge {challenge_id}: {kind:?} challenge has no media source")]
  MissingMedia { challenge_id: i64, kind: ChallengeType },
}

pub fn audit(item: &LessonItem) -> Vec<ContentIssue> {
  let c = &item.challenge;
  let mut issues = Vec::new();

  match c.kind {
    ChallengeType::DragDrop => {
      let mut found: Vec<Option<u32>> = item.options.iter().map(|o| o.order).collect();
      found.sort();
      let expected: Vec<Option<u32>> = (1..=item.options.len() as u32).map(Some).collect();
      if found != expected {
        issues.push(ContentIssue::NonContiguousOrder { challenge_id: c.id, found, expected: item.options.len() });
      }
      for o in &item.options {
        if o.id == CORRECT_SENTINEL || o.id == INCORRECT_SENTINEL {
          issues.push(ContentIssue::SentinelCollision { challenge_id: c.id, option_id: o.id });
        }
      }
    }
    ChallengeType::TextInput | ChallengeType::SpeechInput => {
      if resolve_correct_answer(c, &item.options).is_none() {
        issues.push(ContentIssue::MissingTextAnswer { challenge_id: c.id });
      }
    }
    _ => match item.options.iter().filter(|o| o.correct).count() {
      0 => issues.push(ContentIssue::NoCorrectOption { challenge_id: c.id }),
      1 => {}
      count => issues.push(ContentIssue::MultipleCorrectOptions { challenge_id: c.id, count }),
    },
  }

  let media = match c.kind {
    ChallengeType::Listening => Some(&c.audio_src),
    ChallengeType::Video => Some(&c.video_src),
    _ => None,
  };
  if let Some(src) = media {
    if src.as_deref().map_or(true, |s| s.trim().is_empty()) {
      issues.push(ContentIssue::MissingMedia { challenge_id: c.id, kind: c.kind });
    }
  }

  issues
}

/// Audit every item and log what was found. Returns the issue count.
pub fn audit_and_log<'a>(items: impl IntoIterator<Item = &'a LessonItem>) -> usize {
  let mut total = 0;
  for item in items {
    for issue in audit(item) {
      warn!(target: "challenge", lesson = %item.lesson, %issue, "Content issue (serving anyway)");
      total += 1;
    }
  }
  total
}
