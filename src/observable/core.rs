//! Container internals: backing storage, child-observer bookkeeping, publish.

use std::{cell::RefCell, collections::HashMap, rc::Rc, rc::Weak};

use indexmap::IndexMap;
use serde_json::Value as Json;

use crate::{
  observable::Observable,
  subscription::Subscriptions,
  value::{Key, Value},
};

/// The raw structured value a container owns. Never handed out directly;
/// every access goes through the container so mutations are intercepted.
pub(crate) enum Backing {
  Seq(Vec<Value>),
  Map(IndexMap<String, Value>),
}

impl Backing {
  pub(crate) fn len(&self) -> usize {
    match self {
      Backing::Seq(items) => items.len(),
      Backing::Map(fields) => fields.len(),
    }
  }

  /// Lookup with an already-normalized key.
  pub(crate) fn get(&self, key: &Key) -> Option<&Value> {
    match (self, key) {
      (Backing::Seq(items), Key::Index(i)) => items.get(*i),
      (Backing::Map(fields), Key::Field(f)) => fields.get(f),
      _ => None,
    }
  }

  /// Store with an already-normalized key. A sequence write past the end
  /// pads the gap with nulls, the way holes serialize.
  pub(crate) fn set(&mut self, key: Key, value: Value) {
    match (self, key) {
      (Backing::Seq(items), Key::Index(i)) => {
        if i < items.len() {
          items[i] = value;
        } else {
          items.resize(i, Value::Plain(Json::Null));
          items.push(value);
        }
      }
      (Backing::Map(fields), Key::Field(f)) => {
        fields.insert(f, value);
      }
      _ => {}
    }
  }

  /// Remove with an already-normalized key. Mapping removal preserves the
  /// order of the remaining fields; sequence removal leaves a null hole
  /// rather than shifting later elements.
  pub(crate) fn remove(&mut self, key: &Key) -> Option<Value> {
    match (self, key) {
      (Backing::Seq(items), Key::Index(i)) => items
        .get_mut(*i)
        .map(|slot| std::mem::replace(slot, Value::Plain(Json::Null))),
      (Backing::Map(fields), Key::Field(f)) => fields.shift_remove(f),
      _ => None,
    }
  }

  /// Every key currently holding a nested observable, with its handle.
  pub(crate) fn reactive_entries(&self) -> Vec<(Key, Observable)> {
    match self {
      Backing::Seq(items) => items
        .iter()
        .enumerate()
        .filter_map(|(i, v)| Some((Key::Index(i), v.as_reactive()?.clone())))
        .collect(),
      Backing::Map(fields) => fields
        .iter()
        .filter_map(|(f, v)| Some((Key::Field(f.clone()), v.as_reactive()?.clone())))
        .collect(),
    }
  }
}

/// Records the subscription a parent holds on a nested observable: the child
/// handle plus the ID of the parent's callback in the child's listener list.
/// One entry per key whose value is currently reactive, nothing else.
pub(crate) struct ChildObserver {
  child: Observable,
  id: usize,
}

impl ChildObserver {
  pub(crate) fn new(child: Observable, id: usize) -> Self { Self { child, id } }

  /// Unsubscribe the parent's callback from the child.
  pub(crate) fn release(self) {
    self.child.core.borrow_mut().subscribers.remove(self.id);
  }
}

pub(crate) struct Core {
  pub(crate) backing: Backing,
  pub(crate) subscribers: Subscriptions,
  pub(crate) child_observers: HashMap<Key, ChildObserver>,
  /// Weak self-handle used to build child callbacks. Keeps the link
  /// child-callback → parent weak, so a detached child never keeps its
  /// former parent alive.
  pub(crate) weak_self: Weak<RefCell<Core>>,
}

/// A dying container tears down the subscriptions it holds on its own
/// children, so a child's listener list never accumulates inert entries
/// from former parents.
impl Drop for Core {
  fn drop(&mut self) {
    for (_, observer) in self.child_observers.drain() {
      observer.release();
    }
  }
}

impl Core {
  /// Map a caller key onto this container's shape. `None` means the key can
  /// address nothing here (a non-numeric field on a sequence).
  ///
  /// Mirrors dynamic property semantics: `seq["2"]` is `seq[2]`, and
  /// `map[2]` is `map["2"]`.
  pub(crate) fn normalize(&self, key: Key) -> Option<Key> {
    match (&self.backing, key) {
      (Backing::Seq(_), key @ Key::Index(_)) => Some(key),
      (Backing::Seq(_), Key::Field(f)) => f.parse().ok().map(Key::Index),
      (Backing::Map(_), Key::Index(i)) => Some(Key::Field(i.to_string())),
      (Backing::Map(_), key @ Key::Field(_)) => Some(key),
    }
  }
}

/// Invoke every listener registered at the start of the call, in
/// registration order, on the current call stack.
///
/// The listener list is snapshotted and the borrow released before any
/// callback runs, so a listener may freely mutate this container (or any
/// other) re-entrantly; the nested notifications complete depth-first before
/// the remaining listeners of the outer publish run. A panicking listener
/// propagates and aborts the remaining notifications of this publish.
pub(crate) fn publish(core: &Rc<RefCell<Core>>) {
  let snapshot = core.borrow().subscribers.snapshot();
  for callback in snapshot {
    callback();
  }
}
