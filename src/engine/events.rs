//! Event types crossing the engine boundary.
//!
//! `InputEvent` flows in (clicks, keys, drags, media callbacks).
//! `EngineEvent` flows out through an `EventSink` to whoever grades the attempt.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::debug;

use crate::domain::OptionId;
use crate::engine::media::MediaCommand;

/// Discrete learner input, as sent by the front end.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InputEvent {
  Click {
    #[serde(rename = "optionId")]
    option_id: OptionId,
  },
  KeyPress {
    key: String,
    #[serde(default)]
    shift: bool,
  },
  TextInput {
    value: String,
  },
  SpeechStart,
  SpeechStop,
  SpeechResult {
    text: String,
  },
  DragDrop {
    from: usize,
    to: usize,
  },
  MoveUp {
    index: usize,
  },
  MoveDown {
    index: usize,
  },
  ToggleHint,
  MediaReady,
  MediaFailed {
    reason: String,
  },
}

/// Capture events reported upward.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineEvent {
  Select {
    #[serde(rename = "optionId")]
    option_id: OptionId,
  },
  /// Live value changed (every keystroke or speech result).
  TextChange { text: String },
  /// Learner asked to check this value now.
  TextSubmit { text: String },
  Media { command: MediaCommand },
}

/// Sending half of the engine's outbound channel.
#[derive(Clone, Debug)]
pub struct EventSink {
  tx: mpsc::UnboundedSender<EngineEvent>,
}

impl EventSink {
  pub fn channel() -> (Self, mpsc::UnboundedReceiver<EngineEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Self { tx }, rx)
  }

  pub fn emit(&self, event: EngineEvent) {
    if let Err(e) = self.tx.send(event) {
      debug!(target: "engine", event = ?e.0, "Event receiver dropped; event discarded");
    }
  }

  pub fn is_closed(&self) -> bool {
    self.tx.is_closed()
  }
}

/// Drain everything currently queued without waiting.
pub fn drain(rx: &mut mpsc::UnboundedReceiver<EngineEvent>) -> Vec<EngineEvent> {
  let mut out = Vec::new();
  while let Ok(ev) = rx.try_recv() {
    out.push(ev);
  }
  out
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn input_events_parse_from_client_json() {
    let ev: InputEvent = serde_json::from_str(r#"{"kind":"key_press","key":"Enter","shift":true}"#).expect("key");
    assert_eq!(ev, InputEvent::KeyPress { key: "Enter".into(), shift: true });

    let ev: InputEvent = serde_json::from_str(r#"{"kind":"click","optionId":2}"#).expect("click");
    assert_eq!(ev, InputEvent::Click { option_id: 2 });

    let ev: InputEvent = serde_json::from_str(r#"{"kind":"drag_drop","from":0,"to":2}"#).expect("drag");
    assert_eq!(ev, InputEvent::DragDrop { from: 0, to: 2 });
  }

  #[test]
  fn emit_after_receiver_dropped_is_silent() {
    let (sink, rx) = EventSink::channel();
    drop(rx);
    assert!(sink.is_closed());
    sink.emit(EngineEvent::TextChange { text: String::new() });
  }

  #[test]
  fn drain_returns_events_in_order() {
    let (sink, mut rx) = EventSink::channel();
    sink.emit(EngineEvent::Select { option_id: 1 });
    sink.emit(EngineEvent::TextChange { text: "a".into() });
    assert_eq!(
      drain(&mut rx),
      vec![EngineEvent::Select { option_id: 1 }, EngineEvent::TextChange { text: "a".into() }]
    );
    assert!(drain(&mut rx).is_empty());
  }
}
