//! Externally invokable "check current order" capability.
//!
//! The ordering widget is transient, but the control that triggers a check lives
//! outside it. The controller owns a `CheckHandle`; a mounted widget registers a
//! check function and holds a `Registration` guard that deregisters on drop.

use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::util::lock;

pub type CheckFn = Box<dyn FnMut() -> bool + Send>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegistrationId(u64);

#[derive(Default)]
struct Slot {
  next_id: u64,
  active: Option<(RegistrationId, CheckFn)>,
}

/// Shared handle; clones refer to the same slot.
#[derive(Clone, Default)]
pub struct CheckHandle {
  slot: Arc<Mutex<Slot>>,
}

impl CheckHandle {
  pub fn new() -> Self {
    Self::default()
  }

  /// Install `f` as the active check, replacing any previous one.
  pub fn register(&self, f: CheckFn) -> RegistrationId {
    let mut slot = lock(&self.slot);
    slot.next_id += 1;
    let id = RegistrationId(slot.next_id);
    slot.active = Some((id, f));
    debug!(target: "engine", registration = id.0, "Order check registered");
    id
  }

  /// Remove the check only if `id` is still the active one.
  pub fn unregister(&self, id: RegistrationId) -> bool {
    let mut slot = lock(&self.slot);
    match &slot.active {
      Some((active, _)) if *active == id => {
        slot.active = None;
        debug!(target: "engine", registration = id.0, "Order check deregistered");
        true
      }
      _ => false,
    }
  }

  /// Run the active check. `None` when nothing is mounted.
  pub fn invoke(&self) -> Option<bool> {
    let mut slot = lock(&self.slot);
    slot.active.as_mut().map(|(_, f)| f())
  }

  #[allow(dead_code)]
  pub fn is_registered(&self) -> bool {
    lock(&self.slot).active.is_some()
  }
}

/// Deregisters its check when dropped.
pub struct Registration {
  handle: CheckHandle,
  id: RegistrationId,
}

impl Registration {
  pub fn new(handle: &CheckHandle, f: CheckFn) -> Self {
    let id = handle.register(f);
    Self { handle: handle.clone(), id }
  }

  pub fn id(&self) -> RegistrationId {
    self.id
  }
}

impl Drop for Registration {
  fn drop(&mut self) {
    self.handle.unregister(self.id);
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn invoke_without_registration_is_none() {
    let h = CheckHandle::new();
    assert_eq!(h.invoke(), None);
    assert!(!h.is_registered());
  }

  #[test]
  fn guard_drop_deregisters() {
    let h = CheckHandle::new();
    {
      let _reg = Registration::new(&h, Box::new(|| true));
      assert_eq!(h.invoke(), Some(true));
      assert_eq!(h.invoke(), Some(true));
    }
    assert_eq!(h.invoke(), None);
  }

  #[test]
  fn stale_guard_does_not_remove_newer_registration() {
    let h = CheckHandle::new();
    let old = Registration::new(&h, Box::new(|| false));
    let new = Registration::new(&h, Box::new(|| true));
    assert_ne!(old.id(), new.id());
    drop(old);
    assert_eq!(h.invoke(), Some(true));
    drop(new);
    assert!(!h.is_registered());
  }
}
