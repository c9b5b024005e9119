//! The reactive container itself.
//!
//! [`Observable`] wraps exactly one structured value, an ordered sequence
//! or a string-keyed mapping, and intercepts every mutation path to it:
//! keyed writes, deletions, explicit length changes and the in-place
//! sequence mutators. A mutation that actually changes observable state
//! notifies every subscriber exactly once, synchronously, then bubbles to
//! the subscribers of any enclosing observable.

pub(crate) mod core;
mod mutators;
mod write;

use std::{cell::RefCell, fmt, rc::Rc};

use serde_json::Value as Json;

use self::core::{Backing, Core};
use crate::{
  subscription::{Subscription, Subscriptions},
  value::{Key, Value},
};

/// A reactive container over a sequence or a mapping.
///
/// `Observable` is a cheap handle: cloning it produces another handle to the
/// *same* container, the way a subject clones into the same subscriber list.
/// Use [`ptr_eq`](Observable::ptr_eq) to test for container identity.
///
/// Reads pass straight through to the backing value; writes go through the
/// interception logic in [`set`](Observable::set),
/// [`remove`](Observable::remove) and the sequence mutators.
#[derive(Clone)]
pub struct Observable {
  pub(crate) core: Rc<RefCell<Core>>,
}

// ==================== Construction ====================

impl Observable {
  /// Wraps a plain JSON value. Arrays become sequences and objects become
  /// mappings, preserving their element and field order. Any other value
  /// wraps as a one-element sequence, so construction is total.
  ///
  /// Only the top level becomes reactive: nested plain arrays and objects
  /// stay plain data. Build nested reactivity explicitly with
  /// [`seq`](Observable::seq) / [`map`](Observable::map) and store child
  /// observables as values.
  pub fn new(value: Json) -> Self {
    let backing = match value {
      Json::Array(items) => Backing::Seq(items.into_iter().map(Value::Plain).collect()),
      Json::Object(fields) => {
        Backing::Map(fields.into_iter().map(|(f, v)| (f, Value::Plain(v))).collect())
      }
      scalar => Backing::Seq(vec![Value::Plain(scalar)]),
    };
    Self::from_backing(backing)
  }

  /// Builds a sequence container from element values, which may themselves
  /// be observables; reactive elements are linked immediately.
  pub fn seq<V: Into<Value>>(items: impl IntoIterator<Item = V>) -> Self {
    let items = items.into_iter().map(Into::into).collect();
    let obs = Self::from_backing(Backing::Seq(items));
    obs.attach_initial();
    obs
  }

  /// Builds a mapping container from `(field, value)` pairs, preserving
  /// their order; reactive values are linked immediately.
  pub fn map<F: Into<String>, V: Into<Value>>(entries: impl IntoIterator<Item = (F, V)>) -> Self {
    let fields = entries
      .into_iter()
      .map(|(f, v)| (f.into(), v.into()))
      .collect();
    let obs = Self::from_backing(Backing::Map(fields));
    obs.attach_initial();
    obs
  }

  fn from_backing(backing: Backing) -> Self {
    let core = Rc::new_cyclic(|weak| {
      RefCell::new(Core {
        backing,
        subscribers: Subscriptions::default(),
        child_observers: Default::default(),
        weak_self: weak.clone(),
      })
    });
    Self { core }
  }
}

// ==================== Subscription ====================

impl Observable {
  /// Register `listener` to be invoked, with no arguments, on every
  /// qualifying mutation of this container or of any nested observable
  /// stored in it.
  ///
  /// Subscribing twice registers two entries and both fire. Listeners run
  /// synchronously in registration order against a snapshot of the listener
  /// list, so a listener may itself mutate this or any related container;
  /// the nested notifications complete depth-first. A panicking listener
  /// aborts the remaining notifications of that publish. The returned
  /// handle removes exactly this registration; merely dropping it does not
  /// unsubscribe.
  pub fn subscribe(&self, listener: impl Fn() + 'static) -> Subscription {
    let id = self.core.borrow_mut().subscribers.add(Rc::new(listener));
    Subscription::new(Rc::downgrade(&self.core), id)
  }

  /// Number of currently registered listeners, a parent's child observer
  /// included.
  pub fn subscriber_count(&self) -> usize { self.core.borrow().subscribers.len() }

  /// Container identity: do two handles refer to the same container?
  #[inline]
  pub fn ptr_eq(&self, other: &Self) -> bool { Rc::ptr_eq(&self.core, &other.core) }
}

// ==================== Transparent reads ====================

impl Observable {
  #[inline]
  pub fn is_seq(&self) -> bool { matches!(self.core.borrow().backing, Backing::Seq(_)) }

  #[inline]
  pub fn is_map(&self) -> bool { matches!(self.core.borrow().backing, Backing::Map(_)) }

  /// Number of elements (sequence) or fields (mapping).
  pub fn len(&self) -> usize { self.core.borrow().backing.len() }

  pub fn is_empty(&self) -> bool { self.len() == 0 }

  /// Value at `key`, if the key addresses a present slot. Plain data is
  /// cloned out; a reactive value comes back as another handle to the same
  /// child container.
  pub fn get(&self, key: impl Into<Key>) -> Option<Value> {
    let core = self.core.borrow();
    let key = core.normalize(key.into())?;
    core.backing.get(&key).cloned()
  }

  pub fn contains_key(&self, key: impl Into<Key>) -> bool {
    let core = self.core.borrow();
    match core.normalize(key.into()) {
      Some(key) => core.backing.get(&key).is_some(),
      None => false,
    }
  }

  /// Keys in enumeration order: `0..len` for a sequence, insertion order
  /// for a mapping. Exactly the raw value's keys: the capability surface
  /// (subscribe, serialization, ...) never shows up here.
  pub fn keys(&self) -> Vec<Key> {
    let core = self.core.borrow();
    match &core.backing {
      Backing::Seq(items) => (0..items.len()).map(Key::Index).collect(),
      Backing::Map(fields) => fields.keys().cloned().map(Key::Field).collect(),
    }
  }

  /// `(key, value)` pairs in enumeration order.
  pub fn entries(&self) -> Vec<(Key, Value)> {
    let core = self.core.borrow();
    match &core.backing {
      Backing::Seq(items) => items
        .iter()
        .cloned()
        .enumerate()
        .map(|(i, v)| (Key::Index(i), v))
        .collect(),
      Backing::Map(fields) => fields
        .iter()
        .map(|(f, v)| (Key::Field(f.clone()), v.clone()))
        .collect(),
    }
  }
}

// ==================== Serialization views ====================

impl Observable {
  /// Deep plain snapshot of the backing value; nested observables flatten
  /// to their data.
  pub fn to_plain(&self) -> Json {
    let core = self.core.borrow();
    match &core.backing {
      Backing::Seq(items) => Json::Array(items.iter().map(Value::to_plain).collect()),
      Backing::Map(fields) => {
        Json::Object(fields.iter().map(|(f, v)| (f.clone(), v.to_plain())).collect())
      }
    }
  }

  /// JSON text, byte-identical to serializing the equivalent plain value
  /// directly. Internal bookkeeping never appears; nested observables
  /// serialize as their plain data.
  pub fn to_json(&self) -> String {
    serde_json::to_string(self).expect("JSON-shaped data cannot fail to serialize")
  }
}

impl fmt::Debug for Observable {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_tuple("Observable").field(&self.to_plain()).finish()
  }
}
