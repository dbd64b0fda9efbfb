//! # bunny-dom
//!
//! Chainable element builders over the browser DOM.
//!
//! ## Modules
//!
//! - [`dom`]: the platform layer (`web-sys` on WASM, an in-memory document natively)
//! - [`element`]: [`Element`], a typed handle whose mutators chain
//! - [`kinds`]: element kind markers and their kind-specific helpers
//! - [`container`]: [`Container`], the tree-building context
//! - [`root`]: [`Root`], the container over `<body>` with state and calls
//! - [`keys`]: random `_key` attributes
//!
//! ## Example
//!
//! ```ignore
//! use bunny_dom::Root;
//!
//! let root = Root::global();
//! root.ready(|| {
//! 	let root = Root::global();
//! 	let table = root.table();
//! 	table.row().th("Name").parent_as::<bunny_dom::kinds::TableRow>().unwrap().th("Age");
//! 	table.row().td("bunny");
//! });
//! ```

#![warn(missing_docs)]

pub mod container;
pub mod dom;
pub mod element;
pub mod keys;
pub mod kinds;
pub mod root;

pub use container::{Container, same_scope};
pub use dom::{AsNode, Document, Event, Node, ReadyState};
pub use element::{Element, InsertTarget};
pub use kinds::{ElementKind, Generic, Kind};
pub use root::Root;
