//! Serde impls: an observable serializes exactly as its plain backing
//! value would, recursing through nested observables and exposing none of
//! the subscription bookkeeping.

use serde::{
  ser::{SerializeMap, SerializeSeq},
  Serialize, Serializer,
};

use crate::{
  observable::{core::Backing, Observable},
  value::Value,
};

impl Serialize for Observable {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    let core = self.core.borrow();
    match &core.backing {
      Backing::Seq(items) => {
        let mut seq = serializer.serialize_seq(Some(items.len()))?;
        for value in items {
          seq.serialize_element(value)?;
        }
        seq.end()
      }
      Backing::Map(fields) => {
        let mut map = serializer.serialize_map(Some(fields.len()))?;
        for (field, value) in fields {
          map.serialize_entry(field, value)?;
        }
        map.end()
      }
    }
  }
}

impl Serialize for Value {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    match self {
      Value::Plain(json) => json.serialize(serializer),
      Value::Reactive(obs) => obs.serialize(serializer),
    }
  }
}
