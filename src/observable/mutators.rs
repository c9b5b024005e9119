//! In-place sequence mutators.
//!
//! Each mutator is observable as exactly one notification per call, no
//! matter how many elements it touches, the distinguishing property of a
//! reactive sequence over a naive per-slot interceptor. Internally a call
//! unlinks the sequence's child observers, performs the edit on the backing
//! `Vec`, relinks children at their new positions, and publishes once.
//!
//! On a mapping these operations mean nothing and are silent no-ops.

use std::{
  cmp::Ordering,
  ops::{Bound, RangeBounds},
};

use super::{core, core::Backing, Observable};
use crate::value::{Key, Value};

impl Observable {
  /// Append one element. Appending an observable links it.
  pub fn push(&self, value: impl Into<Value>) {
    let value = value.into();
    self.mutate_seq(move |items| items.push(value));
  }

  /// Remove and return the last element.
  pub fn pop(&self) -> Option<Value> { self.mutate_seq(Vec::pop).flatten() }

  /// Remove and return the first element; the rest shift down one index.
  pub fn shift(&self) -> Option<Value> {
    self
      .mutate_seq(|items| (!items.is_empty()).then(|| items.remove(0)))
      .flatten()
  }

  /// Insert at `index` (clamped to the length); later elements shift up.
  pub fn insert(&self, index: usize, value: impl Into<Value>) {
    let value = value.into();
    self.mutate_seq(move |items| {
      let index = index.min(items.len());
      items.insert(index, value);
    });
  }

  /// Remove `delete_count` elements starting at `start` (both clamped to
  /// the sequence) and splice `replacement` in their place. Returns the
  /// removed elements.
  pub fn splice<V: Into<Value>>(
    &self,
    start: usize,
    delete_count: usize,
    replacement: impl IntoIterator<Item = V>,
  ) -> Vec<Value> {
    self
      .mutate_seq(move |items| {
        let start = start.min(items.len());
        let end = start.saturating_add(delete_count).min(items.len());
        items
          .splice(start..end, replacement.into_iter().map(Into::into))
          .collect()
      })
      .unwrap_or_default()
  }

  /// Reverse the elements in place.
  pub fn reverse(&self) { self.mutate_seq(|items| items.reverse()); }

  /// Sort the elements in place with `compare`.
  pub fn sort_by(&self, compare: impl FnMut(&Value, &Value) -> Ordering) {
    self.mutate_seq(move |items| items.sort_by(compare));
  }

  /// Overwrite every slot in `range` (clamped) with clones of `value`.
  pub fn fill(&self, value: impl Into<Value>, range: impl RangeBounds<usize>) {
    let value = value.into();
    self.mutate_seq(move |items| {
      let (start, end) = clamp_range(&range, items.len());
      for slot in &mut items[start..end] {
        *slot = value.clone();
      }
    });
  }

  /// Copy the elements in `src` (clamped) to the positions starting at
  /// `dest`, truncating the copy at the end of the sequence. Copying an
  /// observable stores another handle to the same child; every position it
  /// occupies afterwards carries its own link.
  pub fn copy_within(&self, src: impl RangeBounds<usize>, dest: usize) {
    self.mutate_seq(move |items| {
      let len = items.len();
      let (start, end) = clamp_range(&src, len);
      let dest = dest.min(len);
      let count = (end - start).min(len - dest);
      let copied = items[start..start + count].to_vec();
      items[dest..dest + count].clone_from_slice(&copied);
    });
  }

  /// Run one structural edit on the backing sequence, bracketed by the
  /// bookkeeping that keeps the child-observer invariant true across
  /// arbitrary reordering: unlink all children, edit, relink children at
  /// their new indices, publish once. `None` (and no notification) when the
  /// container is a mapping.
  fn mutate_seq<R>(&self, edit: impl FnOnce(&mut Vec<Value>) -> R) -> Option<R> {
    let unlinked: Vec<_>;
    let relink: Vec<(Key, Observable)>;
    let result;
    {
      let mut guard = self.core.borrow_mut();
      let core = &mut *guard;
      let Backing::Seq(items) = &mut core.backing else { return None };
      unlinked = core.child_observers.drain().map(|(_, ob)| ob).collect();
      result = edit(items);
      relink = core.backing.reactive_entries();
    }
    for observer in unlinked {
      observer.release();
    }
    for (key, child) in relink {
      self.attach_child(key, child);
    }
    core::publish(&self.core);
    Some(result)
  }
}

fn clamp_range(range: &impl RangeBounds<usize>, len: usize) -> (usize, usize) {
  let start = match range.start_bound() {
    Bound::Included(&s) => s,
    Bound::Excluded(&s) => s.saturating_add(1),
    Bound::Unbounded => 0,
  };
  let end = match range.end_bound() {
    Bound::Included(&e) => e.saturating_add(1),
    Bound::Excluded(&e) => e,
    Bound::Unbounded => len,
  };
  let end = end.min(len);
  (start.min(end), end)
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
  fn each_mutator_notifies_exactly_once() {
    let obs = Observable::new(json!([5, 3, 4, 1, 2]));
    let hits = counted(&obs);

    obs.push(6);
    assert_eq!(hits.get(), 1);
    obs.pop();
    assert_eq!(hits.get(), 2);
    obs.shift();
    assert_eq!(hits.get(), 3);
    obs.insert(0, 0);
    assert_eq!(hits.get(), 4);
    obs.splice(1, 2, [json!(7), json!(8)]);
    assert_eq!(hits.get(), 5);
    obs.reverse();
    assert_eq!(hits.get(), 6);
    obs.sort_by(|a, b| a.to_plain().to_string().cmp(&b.to_plain().to_string()));
    assert_eq!(hits.get(), 7);
    obs.fill(0, 1..3);
    assert_eq!(hits.get(), 8);
    obs.copy_within(0..2, 2);
    assert_eq!(hits.get(), 9);
  }

  #[test]
  fn mutators_that_touch_nothing_still_notify_once() {
    let obs = Observable::new(json!([]));
    let hits = counted(&obs);

    assert_eq!(obs.pop(), None);
    assert_eq!(hits.get(), 1);
    assert_eq!(obs.shift(), None);
    assert_eq!(hits.get(), 2);
    obs.reverse();
    assert_eq!(hits.get(), 3);
    obs.fill(1, ..);
    assert_eq!(hits.get(), 4);
  }

  #[test]
  fn mutators_are_silent_on_mappings() {
    let obs = Observable::new(json!({ "a": 1 }));
    let hits = counted(&obs);

    obs.push(2);
    assert_eq!(obs.pop(), None);
    obs.reverse();
    assert_eq!(hits.get(), 0);
    assert_eq!(obs.to_plain(), json!({ "a": 1 }));
  }

  #[test]
  fn splice_returns_removed_and_edits_in_place() {
    let obs = Observable::new(json!([1, 2, 3, 4]));
    let removed = obs.splice(1, 2, [json!(9)]);
    assert_eq!(removed, vec![Value::plain(2), Value::plain(3)]);
    assert_eq!(obs.to_plain(), json!([1, 9, 4]));

    // Clamped out-of-range arguments are accepted.
    let removed = obs.splice(10, 5, [json!(7)]);
    assert!(removed.is_empty());
    assert_eq!(obs.to_plain(), json!([1, 9, 4, 7]));
  }

  #[test]
  fn fill_and_copy_within_edit_expected_ranges() {
    let obs = Observable::new(json!([1, 2, 3, 4, 5]));
    obs.fill(0, 1..=2);
    assert_eq!(obs.to_plain(), json!([1, 0, 0, 4, 5]));
    obs.copy_within(3..5, 0);
    assert_eq!(obs.to_plain(), json!([4, 5, 0, 4, 5]));
    // Copy truncates at the end of the sequence.
    obs.copy_within(0..3, 3);
    assert_eq!(obs.to_plain(), json!([4, 5, 0, 4, 5]));
  }

  #[test]
  fn reordering_keeps_children_linked_at_new_indices() {
    let child = Observable::new(json!(["inner"]));
    let parent = Observable::seq([Value::plain(1), Value::from(&child)]);
    let parent_hits = counted(&parent);

    parent.reverse();
    assert_eq!(parent_hits.get(), 1);
    assert!(parent.get(0).unwrap().is_reactive());
    assert_eq!(child.subscriber_count(), 1);

    child.push("more");
    assert_eq!(parent_hits.get(), 2);
  }

  #[test]
  fn shift_unlinks_a_removed_child() {
    let child = Observable::new(json!([]));
    let parent = Observable::seq([Value::from(&child), Value::plain(2)]);
    let parent_hits = counted(&parent);

    let removed = parent.shift().unwrap();
    assert!(removed.as_reactive().unwrap().ptr_eq(&child));
    assert_eq!(child.subscriber_count(), 0);

    child.push(1);
    assert_eq!(parent_hits.get(), 1); // only the shift itself
  }

  #[test]
  fn copy_within_duplicates_a_child_link_per_index() {
    let child = Observable::new(json!([]));
    let parent = Observable::seq([Value::from(&child), Value::plain(2)]);
    let parent_hits = counted(&parent);

    parent.copy_within(0..1, 1);
    assert_eq!(parent_hits.get(), 1);
    // The child now sits at two indices, each with its own link.
    assert_eq!(child.subscriber_count(), 2);

    child.push(1);
    assert_eq!(parent_hits.get(), 3); // one bubble per link
  }

  #[test]
  fn clamp_range_bounds() {
    assert_eq!(clamp_range(&(1..3), 5), (1, 3));
    assert_eq!(clamp_range(&(1..=3), 5), (1, 4));
    assert_eq!(clamp_range(&(..), 5), (0, 5));
    assert_eq!(clamp_range(&(4..), 2), (2, 2));
    assert_eq!(clamp_range(&(3..1), 5), (1, 1));
  }
}
