//! Loading engine configuration (audio policy, reveal flag, optional challenge bank) from TOML.
//!
//! See `EngineConfig` and `ChallengeCfg` for the expected schema.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use tracing::{error, info};

use crate::domain::{AnswerOption, Challenge, ChallengeType, LessonItem, OptionId};
use crate::engine::media::AudioSettings;

pub const DEFAULT_LESSON: &str = "default";

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to read {path}: {source}")]
  Io { path: String, source: std::io::Error },
  #[error("failed to parse {path}: {source}")]
  Parse { path: String, source: toml::de::Error },
}

#[derive(Clone, Debug, Deserialize, Default)]
pub struct EngineConfig {
  #[serde(default)]
  pub audio: AudioSettings,
  #[serde(default)]
  pub presentation: PresentationCfg,
  #[serde(default)]
  pub challenges: Vec<ChallengeCfg>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct PresentationCfg {
  #[serde(default = "default_true")]
  pub show_correct_answer: bool,
}

impl Default for PresentationCfg {
  fn default() -> Self {
    Self { show_correct_answer: true }
  }
}

fn default_true() -> bool { true }
fn default_lesson() -> String { DEFAULT_LESSON.into() }

/// Challenge entry accepted in TOML configuration.
#[derive(Clone, Debug, Deserialize)]
pub struct ChallengeCfg {
  #[serde(default)] pub id: Option<i64>,
  #[serde(default = "default_lesson")] pub lesson: String,
  pub question: String,
  #[serde(rename = "type", default)] pub kind: ChallengeType,
  #[serde(default)] pub hint: Option<String>,
  #[serde(default)] pub audio_src: Option<String>,
  #[serde(default)] pub video_src: Option<String>,
  #[serde(default)] pub correct_answer: Option<String>,
  #[serde(default)] pub options: Vec<OptionCfg>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct OptionCfg {
  /// Defaults to the 1-based position within the challenge.
  #[serde(default)] pub id: Option<OptionId>,
  pub text: String,
  #[serde(default)] pub correct: bool,
  #[serde(default)] pub image_src: Option<String>,
  #[serde(default)] pub audio_src: Option<String>,
  #[serde(default)] pub order: Option<u32>,
}

impl ChallengeCfg {
  /// Returns `None` when the entry has no id.
  pub fn into_item(self) -> Option<LessonItem> {
    let id = self.id?;
    let options = self
      .options
      .into_iter()
      .enumerate()
      .map(|(i, o)| AnswerOption {
        id: o.id.unwrap_or(i as OptionId + 1),
        text: o.text,
        correct: o.correct,
        image_src: o.image_src,
        audio_src: o.audio_src,
        order: o.order,
      })
      .collect();
    Some(LessonItem {
      lesson: self.lesson,
      challenge: Challenge {
        id,
        question: self.question,
        kind: self.kind,
        hint: self.hint,
        audio_src: self.audio_src,
        video_src: self.video_src,
        correct_answer: self.correct_answer,
      },
      options,
    })
  }
}

pub fn load_engine_config(path: &Path) -> Result<EngineConfig, ConfigError> {
  let shown = path.display().to_string();
  let s = std::fs::read_to_string(path).map_err(|source| ConfigError::Io { path: shown.clone(), source })?;
  toml::from_str::<EngineConfig>(&s).map_err(|source| ConfigError::Parse { path: shown, source })
}

/// Attempt to load `EngineConfig` from ENGINE_CONFIG_PATH. On any IO/parse error, returns None.
pub fn load_engine_config_from_env() -> Option<EngineConfig> {
  let path = std::env::var("ENGINE_CONFIG_PATH").ok()?;
  match load_engine_config(Path::new(&path)) {
    Ok(cfg) => {
      info!(target: "challenge_engine", %path, challenges = cfg.challenges.len(), "Loaded engine config (TOML)");
      Some(cfg)
    }
    Err(e) => {
      error!(target: "challenge_engine", %path, error = %e, "Failed to load engine config");
      None
    }
  }
}
