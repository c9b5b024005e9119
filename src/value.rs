//! Element and key types stored inside an [`Observable`].
//!
//! A slot in a container holds a [`Value`]: either plain JSON data or a
//! nested [`Observable`]. The tag replaces the dynamic "is this reactive?"
//! probe a proxy-based implementation would need: nesting is visible in the
//! type, and every branch on it is exhaustive.
//!
//! [`Observable`]: crate::observable::Observable

use std::fmt;

use serde_json::Value as Json;

use crate::observable::Observable;

/// Addresses one slot of a container: an index into a sequence or a named
/// field of a mapping.
///
/// Keys are convertible from the obvious Rust types, so call sites read like
/// dynamic property access:
///
/// ```rust
/// use observable_tree::prelude::*;
///
/// let doc = Observable::new(json!({ "title": "draft" }));
/// assert!(doc.contains_key("title"));
///
/// let row = Observable::new(json!([10, 20]));
/// assert_eq!(row.get(1), Some(Value::plain(20)));
/// ```
///
/// A key is normalized against the shape of the container it is used on: an
/// `Index` key on a mapping addresses the decimal field (`obj[0]` is
/// `obj["0"]`), and a numeric `Field` key on a sequence addresses that index.
/// A non-numeric field on a sequence addresses nothing.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub enum Key {
  Index(usize),
  Field(String),
}

impl From<usize> for Key {
  #[inline]
  fn from(index: usize) -> Self { Key::Index(index) }
}

impl From<&str> for Key {
  #[inline]
  fn from(field: &str) -> Self { Key::Field(field.to_owned()) }
}

impl From<String> for Key {
  #[inline]
  fn from(field: String) -> Self { Key::Field(field) }
}

impl fmt::Display for Key {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Key::Index(i) => write!(f, "{i}"),
      Key::Field(s) => f.write_str(s),
    }
  }
}

/// One stored element: plain data, or a nested reactive container.
///
/// `Plain` holds arbitrary JSON data, including whole plain subtrees; a
/// plain array stored inside an observable stays plain, it does not become
/// reactive on its own. `Reactive` holds a handle to another [`Observable`];
/// storing one links it to the enclosing container so its mutations bubble
/// up.
#[derive(Clone)]
pub enum Value {
  Plain(Json),
  Reactive(Observable),
}

impl Value {
  /// Wraps anything `serde_json` can represent as a plain element.
  #[inline]
  pub fn plain(value: impl Into<Json>) -> Self { Value::Plain(value.into()) }

  #[inline]
  pub fn is_reactive(&self) -> bool { matches!(self, Value::Reactive(_)) }

  #[inline]
  pub fn as_plain(&self) -> Option<&Json> {
    match self {
      Value::Plain(json) => Some(json),
      Value::Reactive(_) => None,
    }
  }

  #[inline]
  pub fn as_reactive(&self) -> Option<&Observable> {
    match self {
      Value::Plain(_) => None,
      Value::Reactive(obs) => Some(obs),
    }
  }

  /// Deep plain snapshot: nested observables flatten to their data.
  pub fn to_plain(&self) -> Json {
    match self {
      Value::Plain(json) => json.clone(),
      Value::Reactive(obs) => obs.to_plain(),
    }
  }
}

/// Equality is what gates no-op writes: plain data compares by value,
/// reactive handles compare by container identity, and the two variants are
/// never equal to each other.
impl PartialEq for Value {
  fn eq(&self, other: &Self) -> bool {
    match (self, other) {
      (Value::Plain(a), Value::Plain(b)) => a == b,
      (Value::Reactive(a), Value::Reactive(b)) => a.ptr_eq(b),
      _ => false,
    }
  }
}

impl fmt::Debug for Value {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Value::Plain(json) => write!(f, "Plain({json:?})"),
      Value::Reactive(obs) => write!(f, "Reactive({obs:?})"),
    }
  }
}

impl From<Observable> for Value {
  #[inline]
  fn from(obs: Observable) -> Self { Value::Reactive(obs) }
}

impl From<&Observable> for Value {
  #[inline]
  fn from(obs: &Observable) -> Self { Value::Reactive(obs.clone()) }
}

macro_rules! plain_from_impl {
  ($($ty: ty),*) => {
    $(
      impl From<$ty> for Value {
        #[inline]
        fn from(value: $ty) -> Self { Value::Plain(value.into()) }
      }
    )*
  };
}

plain_from_impl!(Json, bool, i32, i64, u32, u64, f64, &str, String, ());

#[cfg(test)]
mod test {
  use serde_json::json;

  use super::*;
  use crate::observable::Observable;

  #[test]
  fn plain_equality_is_by_value() {
    assert_eq!(Value::plain(1), Value::Plain(json!(1)));
    assert_ne!(Value::plain(1), Value::plain(2));
    assert_eq!(Value::plain(json!([1, 2])), Value::plain(json!([1, 2])));
  }

  #[test]
  fn reactive_equality_is_by_identity() {
    let a = Observable::new(json!([]));
    let b = Observable::new(json!([]));
    assert_eq!(Value::from(a.clone()), Value::from(a.clone()));
    assert_ne!(Value::from(a.clone()), Value::from(b));
    // A handle clone is the same container.
    assert_eq!(Value::from(&a), Value::from(a.clone()));
  }

  #[test]
  fn variants_never_compare_equal() {
    let child = Observable::new(json!([]));
    assert_ne!(Value::plain(json!([])), Value::from(child));
  }

  #[test]
  fn key_conversions() {
    assert_eq!(Key::from(3usize), Key::Index(3));
    assert_eq!(Key::from("name"), Key::Field("name".into()));
    assert_eq!(Key::from("name".to_string()), Key::Field("name".into()));
  }
}
