//! Drag-to-Order widget.
//!
//! On mount the options are shuffled by rejection sampling so the puzzle never
//! starts solved (n > 1). Two reorderings are offered and they differ on purpose:
//! drag-drop removes then inserts (`move_by_insert`), the up/down step controls
//! swap neighbours (`move_by_swap`). The check registered in the controller's
//! `CheckHandle` reports a sentinel id through the ordinary select channel.

use std::sync::{Arc, Mutex};

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use tracing::{debug, info};

use crate::domain::{AnswerOption, OptionId};
use crate::engine::events::{EngineEvent, EventSink};
use crate::engine::registry::{CheckHandle, Registration};
use crate::util::lock;

/// Reported when every item sits at its `order`.
pub const CORRECT_SENTINEL: OptionId = 999;
/// Reported when at least one item is misplaced.
pub const INCORRECT_SENTINEL: OptionId = 998;

/// Upper bound on rejected shuffles before falling back to a rotation.
pub const MAX_SHUFFLE_ATTEMPTS: usize = 64;

pub fn in_place(item: &AnswerOption, index: usize) -> bool {
  item.order == Some(index as u32 + 1)
}

/// True iff every item's `order` equals its 1-based position.
pub fn is_solved(items: &[AnswerOption]) -> bool {
  items.iter().enumerate().all(|(i, it)| in_place(it, i))
}

pub fn placed_count(items: &[AnswerOption]) -> usize {
  items.iter().enumerate().filter(|(i, it)| in_place(it, *i)).count()
}

/// Remove the item at `from` and reinsert it at `to`; everything else keeps its relative order.
/// Out-of-range `from` returns the list unchanged; `to` is clamped to the end.
pub fn move_by_insert<T: Clone>(list: &[T], from: usize, to: usize) -> Vec<T> {
  let mut out = list.to_vec();
  if from >= out.len() {
    return out;
  }
  let moved = out.remove(from);
  let to = to.min(out.len());
  out.insert(to, moved);
  out
}

/// Exchange the items at `i` and `j`. Out-of-range indices return the list unchanged.
pub fn move_by_swap<T: Clone>(list: &[T], i: usize, j: usize) -> Vec<T> {
  let mut out = list.to_vec();
  if i < out.len() && j < out.len() {
    out.swap(i, j);
  }
  out
}

/// Shuffle until the arrangement is not already solved.
///
/// With n > 1 at most one arrangement of order values is solved, so each draw
/// is rejected with probability <= 1/2. The loop is still capped; after
/// `MAX_SHUFFLE_ATTEMPTS` a solved draw is rotated by one, which is unsolved
/// because the item at index 0 then holds order 2.
pub fn shuffle_unsolved<R: Rng + ?Sized>(options: &[AnswerOption], rng: &mut R) -> Vec<AnswerOption> {
  let mut items = options.to_vec();
  if items.len() <= 1 {
    return items;
  }
  for attempt in 1..=MAX_SHUFFLE_ATTEMPTS {
    items.shuffle(rng);
    if !is_solved(&items) {
      debug!(target: "engine", attempt, n = items.len(), "Accepted shuffle");
      return items;
    }
  }
  items.rotate_left(1);
  items
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Progress {
  pub placed: usize,
  pub total: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OrderItem {
  pub id: OptionId,
  pub text: String,
  pub position: usize,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub image_src: Option<String>,
  /// Only reported while the widget is enabled.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub in_place: Option<bool>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OrderingView {
  pub items: Vec<OrderItem>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub progress: Option<Progress>,
  pub disabled: bool,
}

fn check_and_report(board: &Mutex<Vec<AnswerOption>>, sink: &EventSink) -> bool {
  let solved = is_solved(&lock(board));
  let option_id = if solved { CORRECT_SENTINEL } else { INCORRECT_SENTINEL };
  info!(target: "engine", solved, option_id, "Order checked");
  sink.emit(EngineEvent::Select { option_id });
  solved
}

pub struct OrderingWidget {
  board: Arc<Mutex<Vec<AnswerOption>>>,
  placeholder: Option<OptionId>,
  registration: Registration,
}

impl OrderingWidget {
  pub fn mount(options: &[AnswerOption], sink: &EventSink, checks: &CheckHandle) -> Self {
    let mut rng = rand::thread_rng();
    Self::mount_with_rng(options, sink, checks, &mut rng)
  }

  pub fn mount_with_rng<R: Rng + ?Sized>(
    options: &[AnswerOption],
    sink: &EventSink,
    checks: &CheckHandle,
    rng: &mut R,
  ) -> Self {
    Self::mount_arranged(shuffle_unsolved(options, rng), sink, checks)
  }

  /// Mount with a fixed starting arrangement.
  pub fn mount_arranged(arranged: Vec<AnswerOption>, sink: &EventSink, checks: &CheckHandle) -> Self {
    let placeholder = arranged.first().map(|o| o.id);
    let board = Arc::new(Mutex::new(arranged));

    // The answer is the permutation itself; the first id just marks "something chosen".
    if let Some(option_id) = placeholder {
      sink.emit(EngineEvent::Select { option_id });
    }

    let check_board = Arc::clone(&board);
    let check_sink = sink.clone();
    let registration = Registration::new(checks, Box::new(move || check_and_report(&check_board, &check_sink)));

    Self { board, placeholder, registration }
  }

  pub fn placeholder(&self) -> Option<OptionId> {
    self.placeholder
  }

  #[allow(dead_code)]
  pub fn arrangement(&self) -> Vec<OptionId> {
    lock(&self.board).iter().map(|o| o.id).collect()
  }

  pub fn drag_drop(&self, from: usize, to: usize, disabled: bool) -> bool {
    self.reorder(disabled, |items| move_by_insert(items, from, to))
  }

  pub fn step_up(&self, index: usize, disabled: bool) -> bool {
    if index == 0 {
      return false;
    }
    self.reorder(disabled, |items| move_by_swap(items, index, index - 1))
  }

  pub fn step_down(&self, index: usize, disabled: bool) -> bool {
    self.reorder(disabled, |items| move_by_swap(items, index, index + 1))
  }

  fn reorder(&self, disabled: bool, f: impl FnOnce(&[AnswerOption]) -> Vec<AnswerOption>) -> bool {
    if disabled {
      return false;
    }
    let mut board = lock(&self.board);
    let next = f(&board);
    let changed = next.iter().map(|o| o.id).ne(board.iter().map(|o| o.id));
    *board = next;
    if changed {
      debug!(target: "engine", registration = ?self.registration.id(), placed = placed_count(&board), total = board.len(), "Reordered");
    }
    changed
  }

  pub fn view(&self, disabled: bool) -> OrderingView {
    let board = lock(&self.board);
    let items = board
      .iter()
      .enumerate()
      .map(|(i, o)| OrderItem {
        id: o.id,
        text: o.text.clone(),
        position: i + 1,
        image_src: o.image_src.clone().filter(|s| !s.trim().is_empty()),
        in_place: (!disabled).then(|| in_place(o, i)),
      })
      .collect();
    let progress = (!disabled).then(|| Progress { placed: placed_count(&board), total: board.len() });
    OrderingView { items, progress, disabled }
  }
}
