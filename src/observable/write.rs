//! Write and delete interception: keyed assignment, removal, explicit
//! length assignment, and the child-observer bookkeeping they drive.

use std::rc::Rc;

use serde_json::Value as Json;

use super::{
  core::{self, Backing, ChildObserver},
  Observable,
};
use crate::{
  subscription::Callback,
  value::{Key, Value},
};

impl Observable {
  /// Assign `value` at `key`.
  ///
  /// A write whose new value equals the previous one (by value for plain
  /// data, by identity for observables) is a no-op: no storage change, no
  /// relinking, no notification. Every other keyed write notifies exactly
  /// once.
  ///
  /// Child bookkeeping happens as part of the same operation: an observable
  /// being overwritten is unlinked, an observable being stored is linked, a
  /// replacement of one observable by another is unlink-then-link. Writing
  /// past the end of a sequence pads the gap with nulls. A key that cannot
  /// address this container's shape (a non-numeric field on a sequence) is
  /// ignored entirely.
  pub fn set(&self, key: impl Into<Key>, value: impl Into<Value>) {
    let value = value.into();
    let mut unlink = None;
    let mut link = None;
    {
      let mut guard = self.core.borrow_mut();
      let core = &mut *guard;
      let Some(key) = core.normalize(key.into()) else { return };
      let prev = core.backing.get(&key);
      if prev == Some(&value) {
        return;
      }
      if matches!(prev, Some(Value::Reactive(_))) {
        unlink = core.child_observers.remove(&key);
      }
      if let Value::Reactive(child) = &value {
        link = Some((key.clone(), child.clone()));
      }
      core.backing.set(key, value);
    }
    if let Some(observer) = unlink {
      observer.release();
    }
    if let Some((key, child)) = link {
      self.attach_child(key, child);
    }
    core::publish(&self.core);
  }

  /// Remove the slot at `key`, returning its value.
  ///
  /// Deletion always notifies, present key or not: one consistent rule
  /// rather than a presence probe. A removed observable is unlinked first.
  /// Mapping removal closes the gap in field order; sequence removal leaves
  /// a null hole so later indices keep their meaning. A key that cannot
  /// address this container's shape is ignored, as for [`set`](Self::set).
  pub fn remove(&self, key: impl Into<Key>) -> Option<Value> {
    let unlink;
    let removed;
    {
      let mut guard = self.core.borrow_mut();
      let core = &mut *guard;
      let Some(key) = core.normalize(key.into()) else {
        return None;
      };
      unlink = core.child_observers.remove(&key);
      removed = core.backing.remove(&key);
    }
    if let Some(observer) = unlink {
      observer.release();
    }
    core::publish(&self.core);
    removed
  }

  /// Explicit length assignment on a sequence: truncates, unlinking any
  /// observables cut off, or pads with nulls. Notifies once iff the length
  /// actually changes; no-op on a mapping.
  ///
  /// Unlike the implicit length updates inside a sequence mutator call,
  /// which are covered by that call's single notification, an explicit
  /// length assignment is an ordinary qualifying write.
  pub fn set_len(&self, new_len: usize) {
    let mut unlinked = Vec::new();
    {
      let mut guard = self.core.borrow_mut();
      let core = &mut *guard;
      let Backing::Seq(items) = &mut core.backing else { return };
      if items.len() == new_len {
        return;
      }
      if new_len < items.len() {
        items.truncate(new_len);
        let cut: Vec<Key> = core
          .child_observers
          .keys()
          .filter(|key| matches!(key, Key::Index(i) if *i >= new_len))
          .cloned()
          .collect();
        for key in cut {
          unlinked.extend(core.child_observers.remove(&key));
        }
      } else {
        items.resize(new_len, Value::Plain(Json::Null));
      }
    }
    for observer in unlinked {
      observer.release();
    }
    core::publish(&self.core);
  }

  /// Link a nested observable: register a callback on the child that
  /// publishes on this container, and record it under `key` so the exact
  /// registration can be removed when the child is replaced or removed.
  pub(crate) fn attach_child(&self, key: Key, child: Observable) {
    let parent = self.core.borrow().weak_self.clone();
    let callback: Callback = Rc::new(move || {
      if let Some(core) = parent.upgrade() {
        core::publish(&core);
      }
    });
    let id = child.core.borrow_mut().subscribers.add(callback);
    self
      .core
      .borrow_mut()
      .child_observers
      .insert(key, ChildObserver::new(child, id));
  }

  /// Link every reactive value already present in the backing. Used by the
  /// typed constructors so the child-observer invariant holds from birth.
  pub(crate) fn attach_initial(&self) {
    let children = self.core.borrow().backing.reactive_entries();
    for (key, child) in children {
      self.attach_child(key, child);
    }
  }
}

#[cfg(test)]
mod test {
  use std::{cell::Cell, rc::Rc};

  use serde_json::json;

  use super::*;

  fn counted(obs: &Observable) -> Rc<Cell<usize>> {
    let hits = Rc::new(Cell::new(0));
    let h = hits.clone();
    obs.subscribe(move || h.set(h.get() + 1));
    hits
  }

  #[test]
  fn changed_writes_notify_once_each() {
    let obs = Observable::new(json!([3, 2, 1]));
    let hits = counted(&obs);

    obs.set(0, 1);
    assert_eq!(hits.get(), 1);
    obs.set(0, 2);
    assert_eq!(hits.get(), 2);
  }

  #[test]
  fn repeated_writes_do_not_notify() {
    let obs = Observable::new(json!([3, 2, 1]));
    let hits = counted(&obs);

    obs.set(0, 1);
    obs.set(0, 1);
    assert_eq!(hits.get(), 1);
    assert_eq!(obs.to_plain(), json!([1, 2, 1]));
  }

  #[test]
  fn new_field_writes_notify() {
    let obs = Observable::new(json!({}));
    let hits = counted(&obs);

    obs.set("name", "ada");
    assert_eq!(hits.get(), 1);
    assert_eq!(obs.get("name"), Some(Value::plain("ada")));
  }

  #[test]
  fn non_addressable_keys_are_ignored() {
    let obs = Observable::new(json!([1]));
    let hits = counted(&obs);

    obs.set("name", 2);
    assert_eq!(hits.get(), 0);
    assert_eq!(obs.to_plain(), json!([1]));
    // Numeric fields address the index instead.
    obs.set("0", 2);
    assert_eq!(hits.get(), 1);
    assert_eq!(obs.to_plain(), json!([2]));
  }

  #[test]
  fn index_keys_address_mapping_fields() {
    let obs = Observable::new(json!({ "0": "zero" }));
    let hits = counted(&obs);

    obs.set(0usize, "nil");
    assert_eq!(hits.get(), 1);
    assert_eq!(obs.get("0"), Some(Value::plain("nil")));
  }

  #[test]
  fn remove_notifies_even_for_absent_keys() {
    let obs = Observable::new(json!({ "a": 1 }));
    let hits = counted(&obs);

    assert_eq!(obs.remove("a"), Some(Value::plain(1)));
    assert_eq!(hits.get(), 1);
    assert_eq!(obs.remove("a"), None);
    assert_eq!(hits.get(), 2);
  }

  #[test]
  fn remove_ignores_non_addressable_keys() {
    let obs = Observable::new(json!([1]));
    let hits = counted(&obs);

    assert_eq!(obs.remove("name"), None);
    assert_eq!(hits.get(), 0);
    // Absent but addressable keys still notify.
    assert_eq!(obs.remove(5usize), None);
    assert_eq!(hits.get(), 1);
  }

  #[test]
  fn storing_a_child_links_it() {
    let parent = Observable::new(json!({}));
    let child = Observable::new(json!([]));
    let parent_hits = counted(&parent);

    parent.set("items", &child);
    assert_eq!(parent_hits.get(), 1);

    child.push(1);
    assert_eq!(parent_hits.get(), 2);
  }

  #[test]
  fn overwriting_a_child_unlinks_it() {
    let parent = Observable::new(json!({}));
    let child = Observable::new(json!([]));
    parent.set("items", &child);
    let parent_hits = counted(&parent);

    parent.set("items", json!(null));
    assert_eq!(parent_hits.get(), 1);
    assert_eq!(child.subscriber_count(), 0);

    child.push(1);
    assert_eq!(parent_hits.get(), 1);
  }

  #[test]
  fn replacing_a_child_relinks() {
    let parent = Observable::new(json!({}));
    let old = Observable::new(json!([]));
    let new = Observable::new(json!([]));
    parent.set("items", &old);

    parent.set("items", &new);
    assert_eq!(old.subscriber_count(), 0);
    assert_eq!(new.subscriber_count(), 1);

    let parent_hits = counted(&parent);
    new.push(1);
    assert_eq!(parent_hits.get(), 1);
    old.push(1);
    assert_eq!(parent_hits.get(), 1);
  }

  #[test]
  fn rewriting_the_same_child_is_a_no_op() {
    let parent = Observable::new(json!({}));
    let child = Observable::new(json!([]));
    parent.set("items", &child);
    let parent_hits = counted(&parent);

    parent.set("items", &child);
    assert_eq!(parent_hits.get(), 0);
    assert_eq!(child.subscriber_count(), 1);
  }

  #[test]
  fn set_len_notifies_iff_length_changes() {
    let obs = Observable::new(json!([1, 2, 3]));
    let hits = counted(&obs);

    obs.set_len(3);
    assert_eq!(hits.get(), 0);
    obs.set_len(1);
    assert_eq!(hits.get(), 1);
    assert_eq!(obs.to_plain(), json!([1]));
    obs.set_len(3);
    assert_eq!(hits.get(), 2);
    assert_eq!(obs.to_plain(), json!([1, null, null]));
  }

  #[test]
  fn set_len_unlinks_truncated_children() {
    let parent = Observable::seq([Value::plain(1), Value::from(Observable::new(json!([])))]);
    let child = parent.get(1).unwrap().as_reactive().unwrap().clone();
    assert_eq!(child.subscriber_count(), 1);

    parent.set_len(1);
    assert_eq!(child.subscriber_count(), 0);
  }
}
