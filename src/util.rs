//! Small utility helpers used across modules.

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Lock a mutex, recovering the inner value if a previous holder panicked.
/// Engine state is plain data, so a poisoned guard is still consistent enough to read.
pub fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
  m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Normalize a free-text answer for comparison: trim, lowercase, collapse inner whitespace.
pub fn normalize_answer(s: &str) -> String {
  s.split_whitespace()
    .map(|w| w.to_lowercase())
    .collect::<Vec<_>>()
    .join(" ")
}

/// Log-safe truncation for learner input.
/// Cuts on a char boundary so multi-byte text never panics.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.len() <= max {
    return s.to_string();
  }
  let mut end = max;
  while !s.is_char_boundary(end) {
    end -= 1;
  }
  format!("{}… ({} bytes total)", &s[..end], s.len())
}
