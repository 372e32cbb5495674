//! Challenge Interaction Engine.
//!
//! `ChallengeEngine` is the dispatcher: it receives `ChallengeProps` from the
//! session collaborator, mounts exactly one widget for the challenge type, routes
//! `InputEvent`s to it, and renders a serializable `ChallengeView`. It never
//! grades selections; capture events leave through the `EventSink` and the
//! caller feeds the resulting `AttemptStatus` back in via `update`.

pub mod events;
pub mod media;
pub mod ordering;
pub mod presentation;
pub mod registry;
pub mod select;
pub mod text;

use serde::Serialize;
use tracing::{debug, warn};

use crate::domain::{AnswerOption, AttemptStatus, Challenge, ChallengeType, OptionId};
use events::{EngineEvent, EventSink, InputEvent};
use media::{AudioSettings, AudioSettingsSource, GateView, MediaControl, MediaError, MediaGate, MediaKind};
use ordering::{OrderingView, OrderingWidget};
use presentation::{reveal, Presentation, QuestionView, RevealView};
use registry::CheckHandle;
use select::{SelectView, SelectWidget};
use text::{TextView, TextWidget};

/// Collaborators a widget may touch while handling one input event.
pub struct WidgetCtx<'a> {
  pub sink: &'a EventSink,
  pub media: &'a mut dyn MediaControl,
  pub audio: &'a AudioSettings,
  pub disabled: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ChallengeProps {
  pub challenge: Challenge,
  pub options: Vec<AnswerOption>,
  pub status: AttemptStatus,
  pub selected_option: Option<OptionId>,
  pub disabled: bool,
  pub show_correct_answer: bool,
}

impl ChallengeProps {
  #[allow(dead_code)]
  pub fn new(challenge: Challenge, options: Vec<AnswerOption>) -> Self {
    Self {
      challenge,
      options,
      status: AttemptStatus::None,
      selected_option: None,
      disabled: false,
      show_correct_answer: true,
    }
  }
}

/// Prefer the challenge's authoritative answer, else the first option flagged correct.
pub fn resolve_correct_answer(challenge: &Challenge, options: &[AnswerOption]) -> Option<String> {
  challenge
    .correct_answer
    .as_ref()
    .filter(|a| !a.trim().is_empty())
    .cloned()
    .or_else(|| options.iter().find(|o| o.correct).map(|o| o.text.clone()))
}

pub enum Widget {
  Select(SelectWidget),
  Ordering(OrderingWidget),
  Text(TextWidget),
  Gate(MediaGate),
}

/// Total type → widget table.
pub fn widget_for(challenge: &Challenge, options: &[AnswerOption], sink: &EventSink, checks: &CheckHandle) -> Widget {
  match challenge.kind {
    ChallengeType::TextInput | ChallengeType::SpeechInput => Widget::Text(TextWidget::new(challenge.kind)),
    ChallengeType::DragDrop => Widget::Ordering(OrderingWidget::mount(options, sink, checks)),
    ChallengeType::Listening | ChallengeType::Video => Widget::Gate(MediaGate::new(challenge, options)),
    ChallengeType::Select | ChallengeType::Assist | ChallengeType::TrueFalse | ChallengeType::ImageSelect => {
      Widget::Select(SelectWidget::new(challenge.kind, options))
    }
  }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "widget", rename_all = "snake_case")]
pub enum WidgetView {
  Select(SelectView),
  Ordering(OrderingView),
  Text(TextView),
  Listening(GateView),
  Video(GateView),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChallengeView {
  pub challenge_id: i64,
  pub kind: ChallengeType,
  pub status: AttemptStatus,
  pub disabled: bool,
  pub question: QuestionView,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub reveal: Option<RevealView>,
  pub body: WidgetView,
}

pub struct ChallengeEngine {
  props: ChallengeProps,
  widget: Widget,
  presentation: Presentation,
  selected: Option<OptionId>,
  sink: EventSink,
  checks: CheckHandle,
  media: Box<dyn MediaControl>,
  audio: Box<dyn AudioSettingsSource + Send>,
}

impl ChallengeEngine {
  pub fn new(
    props: ChallengeProps,
    sink: EventSink,
    checks: CheckHandle,
    media: Box<dyn MediaControl>,
    audio: Box<dyn AudioSettingsSource + Send>,
  ) -> Self {
    let widget = widget_for(&props.challenge, &props.options, &sink, &checks);
    let selected = props.selected_option.or_else(|| placeholder_of(&widget));
    debug!(target: "engine", challenge_id = props.challenge.id, kind = ?props.challenge.kind, "Challenge mounted");
    Self { props, widget, presentation: Presentation::default(), selected, sink, checks, media, audio }
  }

  #[allow(dead_code)]
  pub fn props(&self) -> &ChallengeProps {
    &self.props
  }

  #[allow(dead_code)]
  pub fn selected(&self) -> Option<OptionId> {
    self.selected
  }

  /// Buffered text for text types.
  #[allow(dead_code)]
  pub fn text(&self) -> Option<&str> {
    match &self.widget {
      Widget::Text(t) => Some(t.value()),
      _ => None,
    }
  }

  pub fn correct_answer(&self) -> Option<String> {
    resolve_correct_answer(&self.props.challenge, &self.props.options)
  }

  /// Run the registered order check, if an ordering widget is mounted.
  pub fn check_order(&self) -> Option<bool> {
    self.checks.invoke()
  }

  /// Receive new props. Entering `None` (retry or fresh question) clears all
  /// transient input before this call returns.
  pub fn update(&mut self, props: ChallengeProps) {
    let prev = std::mem::replace(&mut self.props, props);
    let question_changed = prev.challenge != self.props.challenge;
    let entered_none = self.props.status == AttemptStatus::None && prev.status != AttemptStatus::None;
    let options_changed = prev.options != self.props.options;

    if question_changed {
      self.presentation.reset();
      self.reset_attempt(true);
      debug!(target: "engine", challenge_id = self.props.challenge.id, kind = ?self.props.challenge.kind, "Challenge mounted");
    } else if entered_none {
      self.reset_attempt(options_changed);
      debug!(target: "engine", challenge_id = self.props.challenge.id, from = ?prev.status, "Attempt reset for retry");
    } else {
      // Text widgets only use options for answer resolution; their buffer survives.
      if options_changed && !matches!(self.widget, Widget::Text(_)) {
        self.mount();
      }
      // A stale caller-side selection must not leak into the new attempt, so only changes are adopted.
      if prev.selected_option != self.props.selected_option {
        self.selected = self.props.selected_option;
      }
    }
  }

  fn mount(&mut self) {
    self.widget = widget_for(&self.props.challenge, &self.props.options, &self.sink, &self.checks);
    self.selected = placeholder_of(&self.widget);
  }

  /// `remount` forces a fresh widget; an ordering board is always reshuffled.
  fn reset_attempt(&mut self, remount: bool) {
    self.selected = None;
    if let Widget::Text(t) = &mut self.widget {
      t.clear();
    }
    self.sink.emit(EngineEvent::TextChange { text: String::new() });
    if remount || matches!(self.widget, Widget::Ordering(_)) {
      self.mount();
    }
  }

  pub fn handle_input(&mut self, event: InputEvent) {
    let settings = self.audio.audio_settings();
    let disabled = self.props.disabled;
    let mut ctx = WidgetCtx { sink: &self.sink, media: self.media.as_mut(), audio: &settings, disabled };

    match (event, &mut self.widget) {
      (InputEvent::ToggleHint, _) => self.presentation.toggle_hint(&self.props.challenge),

      (InputEvent::Click { option_id }, Widget::Select(w)) => {
        if let Some(id) = w.click(option_id, &mut ctx) {
          self.selected = Some(id);
        }
      }
      (InputEvent::Click { option_id }, Widget::Gate(g)) => {
        if let Some(id) = g.select().click(option_id, &mut ctx) {
          self.selected = Some(id);
        }
      }
      (InputEvent::KeyPress { key, .. }, Widget::Select(w)) => {
        if let Some(id) = w.key(&key, &mut ctx) {
          self.selected = Some(id);
        }
      }
      (InputEvent::KeyPress { key, .. }, Widget::Gate(g)) => {
        if let Some(id) = g.select().key(&key, &mut ctx) {
          self.selected = Some(id);
        }
      }
      (InputEvent::KeyPress { key, shift }, Widget::Text(t)) => {
        t.key(&key, shift, &mut ctx);
      }

      (InputEvent::TextInput { value }, Widget::Text(t)) => {
        t.input(value, &mut ctx);
      }
      (InputEvent::SpeechStart, Widget::Text(t)) => t.speech_start(disabled),
      (InputEvent::SpeechStop, Widget::Text(t)) => t.speech_stop(),
      (InputEvent::SpeechResult { text }, Widget::Text(t)) => {
        t.speech_result(text, &mut ctx);
      }

      (InputEvent::DragDrop { from, to }, Widget::Ordering(o)) => {
        o.drag_drop(from, to, disabled);
      }
      (InputEvent::MoveUp { index }, Widget::Ordering(o)) => {
        o.step_up(index, disabled);
      }
      (InputEvent::MoveDown { index }, Widget::Ordering(o)) => {
        o.step_down(index, disabled);
      }

      (InputEvent::MediaReady, Widget::Gate(g)) => g.media_ready(ctx.media, &settings),
      (InputEvent::MediaFailed { reason }, Widget::Gate(g)) => g.media_failed(&MediaError::Decode(reason)),
      (InputEvent::MediaFailed { reason }, Widget::Select(_)) => {
        let e = MediaError::Decode(reason);
        warn!(target: "engine", challenge_id = self.props.challenge.id, error = %e, "Option audio cue failed; ignoring");
      }
      (InputEvent::MediaFailed { reason }, _) => {
        debug!(target: "engine", challenge_id = self.props.challenge.id, %reason, "Media failure for a widget without media ignored");
      }

      (event, _) => {
        debug!(target: "engine", ?event, kind = ?self.props.challenge.kind, "Input not handled by active widget");
      }
    }
  }

  pub fn view(&self) -> ChallengeView {
    let settings = self.audio.audio_settings();
    let status = self.props.status;
    let disabled = self.props.disabled;

    let body = match &self.widget {
      Widget::Select(w) => WidgetView::Select(w.view(self.selected, status, disabled)),
      Widget::Ordering(o) => WidgetView::Ordering(o.view(disabled)),
      Widget::Text(t) => WidgetView::Text(t.view(status, disabled)),
      Widget::Gate(g) => {
        let gate = g.view(&settings, g.select().view(self.selected, status, disabled));
        match g.kind() {
          MediaKind::Audio => WidgetView::Listening(gate),
          MediaKind::Video => WidgetView::Video(gate),
        }
      }
    };

    let correct = self.correct_answer();
    ChallengeView {
      challenge_id: self.props.challenge.id,
      kind: self.props.challenge.kind,
      status,
      disabled,
      question: self.presentation.view(&self.props.challenge),
      reveal: reveal(status, self.props.show_correct_answer, correct.as_deref()),
      body,
    }
  }
}

fn placeholder_of(widget: &Widget) -> Option<OptionId> {
  match widget {
    Widget::Ordering(o) => o.placeholder(),
    _ => None,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::engine::events::drain;
  use crate::engine::media::ClientMedia;
  use crate::engine::ordering::{CORRECT_SENTINEL, INCORRECT_SENTINEL};
  use tokio::sync::mpsc::UnboundedReceiver;

  const ALL_TYPES: [ChallengeType; 9] = [
    ChallengeType::Select,
    ChallengeType::Assist,
    ChallengeType::TrueFalse,
    ChallengeType::DragDrop,
    ChallengeType::TextInput,
    ChallengeType::SpeechInput,
    ChallengeType::ImageSelect,
    ChallengeType::Listening,
    ChallengeType::Video,
  ];

  fn challenge(kind: ChallengeType) -> Challenge {
    Challenge {
      id: 42,
      question: "Pick the compute service".into(),
      kind,
      hint: Some("It starts with E".into()),
      audio_src: Some("/a/q42.mp3".into()),
      video_src: Some("/v/q42.mp4".into()),
      correct_answer: None,
    }
  }

  fn options(kind: ChallengeType) -> Vec<AnswerOption> {
    let texts = ["EC2", "S3", "RDS"];
    texts
      .iter()
      .enumerate()
      .map(|(i, t)| AnswerOption {
        id: i as OptionId + 1,
        text: (*t).into(),
        correct: i == 0,
        image_src: None,
        audio_src: None,
        order: (kind == ChallengeType::DragDrop).then(|| i as u32 + 1),
      })
      .collect()
  }

  fn engine(props: ChallengeProps) -> (ChallengeEngine, UnboundedReceiver<EngineEvent>) {
    let (sink, rx) = EventSink::channel();
    let media = Box::new(ClientMedia::new(sink.clone()));
    let e = ChallengeEngine::new(props, sink, CheckHandle::new(), media, Box::new(AudioSettings::default()));
    (e, rx)
  }

  fn settle(e: &mut ChallengeEngine, status: AttemptStatus) {
    let mut p = e.props().clone();
    p.status = status;
    p.disabled = status != AttemptStatus::None;
    e.update(p);
  }

  #[test]
  fn widget_table_is_total() {
    for kind in ALL_TYPES {
      let (e, _rx) = engine(ChallengeProps::new(challenge(kind), options(kind)));
      let ok = match (kind, &e.view().body) {
        (ChallengeType::TextInput | ChallengeType::SpeechInput, WidgetView::Text(_)) => true,
        (ChallengeType::DragDrop, WidgetView::Ordering(_)) => true,
        (ChallengeType::Listening, WidgetView::Listening(g)) => g.select.buttons.len() == 3,
        (ChallengeType::Video, WidgetView::Video(g)) => g.media.as_ref().map(|m| m.kind) == Some(MediaKind::Video),
        (
          ChallengeType::Select | ChallengeType::Assist | ChallengeType::TrueFalse | ChallengeType::ImageSelect,
          WidgetView::Select(s),
        ) => s.layout == select::layout_for(kind),
        _ => false,
      };
      assert!(ok, "unexpected widget for {kind:?}");
    }
  }

  #[test]
  fn correct_answer_prefers_challenge_field_and_is_idempotent() {
    let mut c = challenge(ChallengeType::TextInput);
    let opts = options(ChallengeType::Select);
    assert_eq!(resolve_correct_answer(&c, &opts).as_deref(), Some("EC2"));

    c.correct_answer = Some("Amazon EC2".into());
    let first = resolve_correct_answer(&c, &opts);
    let second = resolve_correct_answer(&c, &opts);
    assert_eq!(first, second);
    assert_eq!(first.as_deref(), Some("Amazon EC2"));

    c.correct_answer = Some("   ".into());
    assert_eq!(resolve_correct_answer(&c, &opts).as_deref(), Some("EC2"));
    assert_eq!(resolve_correct_answer(&c, &[]), None);
  }

  #[test]
  fn retry_clears_state_for_every_type() {
    for kind in ALL_TYPES {
      let (mut e, mut rx) = engine(ChallengeProps::new(challenge(kind), options(kind)));
      match kind {
        ChallengeType::TextInput | ChallengeType::SpeechInput => {
          e.handle_input(InputEvent::TextInput { value: "S3".into() })
        }
        ChallengeType::DragDrop => e.handle_input(InputEvent::MoveDown { index: 0 }),
        _ => e.handle_input(InputEvent::Click { option_id: 2 }),
      }
      drain(&mut rx);

      settle(&mut e, AttemptStatus::Wrong);
      settle(&mut e, AttemptStatus::None);

      let events = drain(&mut rx);
      assert!(
        events.contains(&EngineEvent::TextChange { text: String::new() }),
        "{kind:?}: missing TextChange(\"\") on retry"
      );
      match kind {
        ChallengeType::TextInput | ChallengeType::SpeechInput => {
          assert_eq!(e.text(), Some(""));
          assert_eq!(e.selected(), None);
        }
        ChallengeType::DragDrop => {
          let WidgetView::Ordering(v) = e.view().body else { panic!("ordering view") };
          assert_eq!(e.selected(), v.items.first().map(|i| i.id));
          assert!(v.items.iter().any(|i| i.in_place == Some(false)), "reshuffle must not be solved");
        }
        _ => assert_eq!(e.selected(), None, "{kind:?}: selection leaked across attempts"),
      }
    }
  }

  #[test]
  fn stale_caller_selection_is_not_adopted_on_retry() {
    let kind = ChallengeType::Select;
    let mut props = ChallengeProps::new(challenge(kind), options(kind));
    props.selected_option = Some(2);
    let (mut e, _rx) = engine(props);
    assert_eq!(e.selected(), Some(2));
    settle(&mut e, AttemptStatus::Wrong);
    settle(&mut e, AttemptStatus::None);
    assert_eq!(e.selected(), None);
  }

  #[test]
  fn true_false_select_emits_option_id() {
    let tf_options = vec![
      AnswerOption { id: 1, text: "True".into(), correct: true, image_src: None, audio_src: None, order: None },
      AnswerOption { id: 2, text: "False".into(), correct: false, image_src: None, audio_src: None, order: None },
    ];
    let (mut e, mut rx) = engine(ChallengeProps::new(challenge(ChallengeType::TrueFalse), tf_options));
    e.handle_input(InputEvent::Click { option_id: 2 });
    assert_eq!(drain(&mut rx), vec![EngineEvent::Select { option_id: 2 }]);
    assert_eq!(e.selected(), Some(2));
    assert_eq!(e.props().status, AttemptStatus::None);

    e.handle_input(InputEvent::KeyPress { key: "t".into(), shift: false });
    assert_eq!(e.selected(), Some(1));
  }

  #[test]
  fn drag_drop_solved_through_engine_reports_correct() {
    let kind = ChallengeType::DragDrop;
    let (mut e, mut rx) = engine(ChallengeProps::new(challenge(kind), options(kind)));
    let placeholder = e.selected();
    assert!(placeholder.is_some());
    assert_eq!(drain(&mut rx), vec![EngineEvent::Select { option_id: placeholder.unwrap_or_default() }]);
    assert_eq!(e.check_order(), Some(false));

    // id k has order k; drag each into place.
    for target in 0..3 {
      let WidgetView::Ordering(v) = e.view().body else { panic!("ordering view") };
      let from = v.items.iter().position(|i| i.id == target as OptionId + 1).expect("item");
      e.handle_input(InputEvent::DragDrop { from, to: target });
    }
    assert_eq!(e.check_order(), Some(true));
    assert_eq!(
      drain(&mut rx),
      vec![
        EngineEvent::Select { option_id: INCORRECT_SENTINEL },
        EngineEvent::Select { option_id: CORRECT_SENTINEL },
      ]
    );
  }

  #[test]
  fn leaving_drag_drop_deregisters_check() {
    let (mut e, _rx) = engine(ChallengeProps::new(challenge(ChallengeType::DragDrop), options(ChallengeType::DragDrop)));
    assert!(e.check_order().is_some());
    let mut next = ChallengeProps::new(challenge(ChallengeType::Select), options(ChallengeType::Select));
    next.challenge.id = 43;
    e.update(next);
    assert_eq!(e.check_order(), None);
  }

  #[test]
  fn reveal_shows_only_when_wrong() {
    let kind = ChallengeType::Select;
    let (mut e, _rx) = engine(ChallengeProps::new(challenge(kind), options(kind)));
    assert!(e.view().reveal.is_none());
    settle(&mut e, AttemptStatus::Wrong);
    assert_eq!(e.view().reveal.map(|r| r.correct_answer), Some("EC2".into()));
    settle(&mut e, AttemptStatus::Correct);
    assert!(e.view().reveal.is_none());
  }

  #[test]
  fn text_only_type_with_no_options_renders() {
    let (e, _rx) = engine(ChallengeProps::new(challenge(ChallengeType::TextInput), vec![]));
    let v = e.view();
    assert!(matches!(v.body, WidgetView::Text(_)));
    assert!(v.reveal.is_none());
  }

  #[test]
  fn inputs_for_other_widgets_are_ignored() {
    let kind = ChallengeType::Select;
    let (mut e, mut rx) = engine(ChallengeProps::new(challenge(kind), options(kind)));
    e.handle_input(InputEvent::DragDrop { from: 0, to: 1 });
    e.handle_input(InputEvent::TextInput { value: "x".into() });
    e.handle_input(InputEvent::MediaFailed { reason: "decode".into() });
    assert!(drain(&mut rx).is_empty());
  }

  #[test]
  fn hint_resets_on_new_question() {
    let kind = ChallengeType::Select;
    let (mut e, _rx) = engine(ChallengeProps::new(challenge(kind), options(kind)));
    e.handle_input(InputEvent::ToggleHint);
    assert_eq!(e.view().question.hint.map(|h| h.visible), Some(true));
    let mut next = e.props().clone();
    next.challenge.id = 99;
    e.update(next);
    assert_eq!(e.view().question.hint.map(|h| h.visible), Some(false));
  }

  fn numbered(ids: &[OptionId], kind: ChallengeType) -> Vec<AnswerOption> {
    ids
      .iter()
      .enumerate()
      .map(|(i, id)| AnswerOption {
        id: *id,
        text: format!("choice {id}"),
        correct: i == 0,
        image_src: None,
        audio_src: None,
        order: (kind == ChallengeType::DragDrop).then(|| i as u32 + 1),
      })
      .collect()
  }

  #[test]
  fn retry_with_new_options_remounts_select_grid() {
    let kind = ChallengeType::Select;
    let (mut e, _rx) = engine(ChallengeProps::new(challenge(kind), numbered(&[1, 2], kind)));
    settle(&mut e, AttemptStatus::Wrong);

    let mut next = e.props().clone();
    next.status = AttemptStatus::None;
    next.disabled = false;
    next.options = numbered(&[7, 8, 9], kind);
    e.update(next);

    let WidgetView::Select(v) = e.view().body else { panic!("select view") };
    assert_eq!(v.buttons.iter().map(|b| b.id).collect::<Vec<_>>(), vec![7, 8, 9]);
    e.handle_input(InputEvent::Click { option_id: 8 });
    assert_eq!(e.selected(), Some(8));
  }

  #[test]
  fn new_option_set_reshuffles_ordering_board() {
    let kind = ChallengeType::DragDrop;
    let (mut e, mut rx) = engine(ChallengeProps::new(challenge(kind), options(kind)));
    drain(&mut rx);

    let mut next = e.props().clone();
    next.options = numbered(&[11, 12, 13, 14], kind);
    e.update(next);

    let WidgetView::Ordering(v) = e.view().body else { panic!("ordering view") };
    let mut ids: Vec<OptionId> = v.items.iter().map(|i| i.id).collect();
    assert!(v.items.iter().any(|i| i.in_place == Some(false)), "new board must start unsolved");
    ids.sort();
    assert_eq!(ids, vec![11, 12, 13, 14]);
    assert_eq!(e.selected(), v.items.first().map(|i| i.id));
    assert_eq!(e.check_order(), Some(false));
  }

  #[test]
  fn new_option_set_keeps_typed_text() {
    let kind = ChallengeType::TextInput;
    let (mut e, mut rx) = engine(ChallengeProps::new(challenge(kind), options(kind)));
    e.handle_input(InputEvent::TextInput { value: "S3".into() });
    drain(&mut rx);

    let mut next = e.props().clone();
    next.options = numbered(&[21, 22], kind);
    e.update(next);

    assert_eq!(e.text(), Some("S3"));
    assert!(drain(&mut rx).is_empty());
    assert_eq!(e.correct_answer().as_deref(), Some("choice 21"));
  }

  #[test]
  fn media_failure_without_media_widget_is_quiet() {
    let kind = ChallengeType::DragDrop;
    let (mut e, mut rx) = engine(ChallengeProps::new(challenge(kind), options(kind)));
    drain(&mut rx);
    let before = e.view();
    e.handle_input(InputEvent::MediaFailed { reason: "no element".into() });
    assert_eq!(e.view(), before);
    assert!(drain(&mut rx).is_empty());
  }

  #[test]
  fn engine_is_send() {
    fn assert_send<T: Send>() {}
    assert_send::<ChallengeEngine>();
  }
}
