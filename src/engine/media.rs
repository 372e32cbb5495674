//! Media control adapters, audio settings, and the Listening/Video gates.
//!
//! Playback is a convenience: every failure here is logged and swallowed.

use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::{AnswerOption, Challenge, ChallengeType};
use crate::engine::events::{EngineEvent, EventSink};
use crate::engine::select::{SelectView, SelectWidget};

/// Volume / mute / autoplay policy supplied by the audio-settings collaborator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AudioSettings {
  #[serde(default = "default_volume")]
  pub volume: f32,
  #[serde(default)]
  pub muted: bool,
  #[serde(default = "default_autoplay")]
  pub autoplay: bool,
}

fn default_volume() -> f32 { 0.8 }
fn default_autoplay() -> bool { true }

impl Default for AudioSettings {
  fn default() -> Self {
    Self { volume: default_volume(), muted: false, autoplay: default_autoplay() }
  }
}

impl AudioSettings {
  /// Clamp volume into 0..=1; NaN becomes the default.
  pub fn sanitized(mut self) -> Self {
    self.volume = if self.volume.is_nan() { default_volume() } else { self.volume.clamp(0.0, 1.0) };
    self
  }
}

pub trait AudioSettingsSource {
  fn audio_settings(&self) -> AudioSettings;
}

impl AudioSettingsSource for AudioSettings {
  fn audio_settings(&self) -> AudioSettings {
    self.clone()
  }
}

/// Settings the session can update while the engine keeps reading them.
#[derive(Clone, Debug, Default)]
pub struct SharedAudioSettings {
  inner: Arc<RwLock<AudioSettings>>,
}

impl SharedAudioSettings {
  pub fn new(settings: AudioSettings) -> Self {
    Self { inner: Arc::new(RwLock::new(settings.sanitized())) }
  }

  pub fn set(&self, settings: AudioSettings) {
    let mut guard = self.inner.write().unwrap_or_else(|p| p.into_inner());
    *guard = settings.sanitized();
  }
}

impl AudioSettingsSource for SharedAudioSettings {
  fn audio_settings(&self) -> AudioSettings {
    self.inner.read().unwrap_or_else(|p| p.into_inner()).clone()
  }
}

#[derive(Debug, Error)]
pub enum MediaError {
  #[error("playback rejected: {0}")]
  Rejected(String),
  #[error("media decode failed: {0}")]
  Decode(String),
  #[error("media output disconnected")]
  Disconnected,
}

/// Playback wrapper consumed by widgets.
pub trait MediaControl: Send {
  fn play(&mut self, src: &str) -> Result<(), MediaError>;
  fn set_volume(&mut self, level: f32);
  fn set_muted(&mut self, muted: bool);
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum MediaCommand {
  Play { src: String },
  Volume { level: f32 },
  Mute { muted: bool },
}

/// Forwards media commands to the browser over the engine's event channel.
pub struct ClientMedia {
  sink: EventSink,
}

impl ClientMedia {
  pub fn new(sink: EventSink) -> Self {
    Self { sink }
  }

  fn send(&self, command: MediaCommand) -> Result<(), MediaError> {
    if self.sink.is_closed() {
      return Err(MediaError::Disconnected);
    }
    self.sink.emit(EngineEvent::Media { command });
    Ok(())
  }
}

impl MediaControl for ClientMedia {
  fn play(&mut self, src: &str) -> Result<(), MediaError> {
    let src = src.trim();
    if src.is_empty() {
      return Err(MediaError::Rejected("empty source".into()));
    }
    self.send(MediaCommand::Play { src: src.to_string() })
  }
  fn set_volume(&mut self, level: f32) {
    let _ = self.send(MediaCommand::Volume { level });
  }
  fn set_muted(&mut self, muted: bool) {
    let _ = self.send(MediaCommand::Mute { muted });
  }
}

/// Apply the current policy and play `src`. Failures never propagate.
pub fn play_with_policy(control: &mut dyn MediaControl, settings: &AudioSettings, src: &str) {
  control.set_volume(settings.volume);
  control.set_muted(settings.muted);
  match control.play(src) {
    Ok(()) => debug!(target: "engine", %src, "Playback started"),
    Err(e) => warn!(target: "engine", %src, error = %e, "Playback failed; ignoring"),
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
  Audio,
  Video,
}

/// Configuration for one native media element.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MediaView {
  pub kind: MediaKind,
  pub src: String,
  pub volume: f32,
  pub muted: bool,
  pub autoplay: bool,
  pub ready: bool,
}

/// Returns `None` for a missing or blank source so no empty player is rendered.
pub fn media_view(kind: MediaKind, src: Option<&str>, settings: &AudioSettings, ready: bool) -> Option<MediaView> {
  let src = src.map(str::trim).filter(|s| !s.is_empty())?;
  Some(MediaView {
    kind,
    src: src.to_string(),
    volume: settings.volume,
    muted: settings.muted,
    autoplay: settings.autoplay,
    ready,
  })
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GateView {
  pub media: Option<MediaView>,
  pub select: SelectView,
}

/// Listening or Video gate: a media element plus a delegated Select widget.
pub struct MediaGate {
  kind: MediaKind,
  src: Option<String>,
  ready: bool,
  select: SelectWidget,
}

impl MediaGate {
  pub fn new(challenge: &Challenge, options: &[AnswerOption]) -> Self {
    let (kind, src) = match challenge.kind {
      ChallengeType::Video => (MediaKind::Video, challenge.video_src.clone()),
      _ => (MediaKind::Audio, challenge.audio_src.clone()),
    };
    Self { kind, src, ready: false, select: SelectWidget::new(challenge.kind, options) }
  }

  pub fn kind(&self) -> MediaKind {
    self.kind
  }

  pub fn select(&self) -> &SelectWidget {
    &self.select
  }

  /// Media element finished loading; attempt autoplay if the policy allows it.
  pub fn media_ready(&mut self, control: &mut dyn MediaControl, settings: &AudioSettings) {
    self.ready = true;
    let Some(src) = self.src.as_deref().filter(|s| !s.trim().is_empty()) else {
      return;
    };
    if settings.autoplay {
      play_with_policy(control, settings, src);
    }
  }

  pub fn media_failed(&mut self, error: &MediaError) {
    self.ready = false;
    warn!(target: "engine", kind = ?self.kind, src = ?self.src, %error, "Media element reported failure; ignoring");
  }

  pub fn view(&self, settings: &AudioSettings, select: SelectView) -> GateView {
    GateView { media: media_view(self.kind, self.src.as_deref(), settings, self.ready), select }
  }
}
