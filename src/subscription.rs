//! Listener registration and removal.
//!
//! [`Subscriptions`] is the container's insertion-ordered listener list with
//! ID-based removal; [`Subscription`] is the public handle an
//! [`Observable::subscribe`] call returns.
//!
//! [`Observable::subscribe`]: crate::observable::Observable::subscribe

use std::{
  cell::RefCell,
  rc::{Rc, Weak},
};

use smallvec::SmallVec;

use crate::observable::core::Core;

/// A registered listener. Stored reference-counted so `publish` can snapshot
/// the list and invoke callbacks without holding any borrow on the container.
pub(crate) type Callback = Rc<dyn Fn()>;

/// Insertion-ordered listener storage with ID-based removal.
///
/// IDs are monotonically increasing and never reused, so a stale
/// [`Subscription`] handle can never remove a listener registered later.
/// Duplicate callbacks are allowed; each registration is its own entry and
/// fires independently.
///
/// Uses `SmallVec<[_; 2]>` to avoid heap allocation for the common case of a
/// container with at most a couple of listeners (its own subscribers plus a
/// parent's child observer).
pub(crate) struct Subscriptions {
  next_id: usize,
  items: SmallVec<[(usize, Callback); 2]>,
}

impl Default for Subscriptions {
  fn default() -> Self { Self { next_id: 0, items: SmallVec::new() } }
}

impl Subscriptions {
  /// Add a listener and return its unique ID.
  pub(crate) fn add(&mut self, callback: Callback) -> usize {
    let id = self.next_id;
    self.next_id += 1;
    self.items.push((id, callback));
    id
  }

  /// Remove a listener by ID. `None` if the ID was already removed.
  pub(crate) fn remove(&mut self, id: usize) -> Option<Callback> {
    self
      .items
      .iter()
      .position(|(i, _)| *i == id)
      .map(|pos| self.items.remove(pos).1)
  }

  #[inline]
  pub(crate) fn contains(&self, id: usize) -> bool { self.items.iter().any(|(i, _)| *i == id) }

  #[inline]
  pub(crate) fn len(&self) -> usize { self.items.len() }

  /// Clone out the callbacks in registration order. The snapshot is what a
  /// publish iterates, so listeners registered or removed *during* a publish
  /// do not affect that publish.
  pub(crate) fn snapshot(&self) -> SmallVec<[Callback; 2]> {
    self.items.iter().map(|(_, cb)| cb.clone()).collect()
  }
}

/// Handle to one registered listener.
///
/// Returned by [`Observable::subscribe`]; consuming it with
/// [`unsubscribe`](Subscription::unsubscribe) removes exactly that
/// registration. Dropping the handle does *not* unsubscribe; a listener
/// stays registered for the life of its container unless explicitly removed.
///
/// The handle holds only a weak reference to the container, so keeping it
/// around never keeps the container alive.
///
/// [`Observable::subscribe`]: crate::observable::Observable::subscribe
#[derive(Debug)]
pub struct Subscription {
  target: Weak<RefCell<Core>>,
  id: usize,
}

impl Subscription {
  pub(crate) fn new(target: Weak<RefCell<Core>>, id: usize) -> Self { Self { target, id } }

  /// Remove the listener this handle was returned for. No-op if it was
  /// already removed or if the container no longer exists.
  pub fn unsubscribe(self) {
    if let Some(core) = self.target.upgrade() {
      core.borrow_mut().subscribers.remove(self.id);
    }
  }

  /// Whether the listener is still registered on a live container.
  pub fn is_active(&self) -> bool {
    self
      .target
      .upgrade()
      .is_some_and(|core| core.borrow().subscribers.contains(self.id))
  }
}
