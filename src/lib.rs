//! # observable-tree: transparent reactive wrappers for nested values
//!
//! Wrap a plain JSON-like value (an array or an object) in an [`Observable`]
//! and it keeps behaving like the raw value for every read, enumeration and
//! serialization operation, but registered listeners are invoked,
//! synchronously and in registration order, whenever the value (or any nested
//! observable inside it) is mutated.
//!
//! ## Quick Start
//!
//! ```rust
//! use observable_tree::prelude::*;
//! use std::{cell::Cell, rc::Rc};
//!
//! let todos = Observable::new(json!(["write", "ship"]));
//!
//! let hits = Rc::new(Cell::new(0));
//! let h = hits.clone();
//! todos.subscribe(move || h.set(h.get() + 1));
//!
//! todos.push("relax");
//! assert_eq!(hits.get(), 1);
//! assert_eq!(todos.to_json(), r#"["write","ship","relax"]"#);
//! ```
//!
//! ## Key Concepts
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Observable`] | A reactive container over a sequence or a mapping |
//! | [`Value`] | A stored element: plain JSON data or a nested observable |
//! | [`Key`] | Addresses one slot: a sequence index or a mapping field |
//! | [`Subscription`] | Handle to remove one registered listener |
//!
//! Nesting is first class: storing an `Observable` inside another links them,
//! so a mutation deep in the tree notifies the subscribers of every container
//! on the path to the root, exactly once each per mutation. Replacing or
//! removing the nested value unlinks it again.
//!
//! Everything is single-threaded and synchronous: a mutation updates the
//! backing storage, then invokes listeners on the same call stack. There is
//! no scheduler, no batching and no change payload: a listener is told
//! *that* something changed, and reads the container to see what.
//!
//! [`Observable`]: observable::Observable
//! [`Value`]: value::Value
//! [`Key`]: value::Key
//! [`Subscription`]: subscription::Subscription

pub mod observable;
pub mod prelude;
pub mod subscription;
pub mod value;

mod ser;

// Re-export the prelude module
pub use prelude::*;
