//! # bunny
//!
//! A minimal DOM manipulation toolkit for Rust and WebAssembly.
//!
//! bunny wraps the browser primitives a small page needs: element creation
//! with chainable mutators, tree building through containers, a keyed
//! reactive store, an expiring persisted key-value helper and a JSON call
//! helper with retries.
//!
//! ## Crates
//!
//! | Crate | Contents |
//! |-------|----------|
//! | `bunny-core` | errors, logging macros, settings, the reactive [`StateStore`] |
//! | `bunny-dom` | [`Element`], [`Container`], [`Root`] and the DOM layer |
//! | `bunny-storage` | [`PersistedStore`] over `localStorage` or memory |
//! | `bunny-http` | [`Caller`], [`CallConfig`] and the [`Transport`] seam |
//!
//! Everything runs natively against an in-memory document, so pages can be
//! built and asserted on with plain `cargo test`; on `wasm32` the same API
//! drives the real DOM through `web-sys`.
//!
//! ## Quick Example
//!
//! ```rust,ignore
//! use bunny::prelude::*;
//!
//! let page = root();
//! page.ready(|| {
//! 	let page = root();
//! 	let count = page.create_state("count", 0).unwrap();
//!
//! 	let label = page.p("");
//! 	let _binding = count.bind(move |value| {
//! 		label.text(&format!("Clicked {value} times"));
//! 	});
//! 	page.button("+1").when("click", move |_, _| count.update(|n| n + 1));
//!
//! 	bunny::set("visited", &true, Some(TimeDelta::days(1)));
//! });
//! ```

#![warn(missing_docs)]

use std::collections::HashMap;

use chrono::TimeDelta;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

pub use bunny_core::{
	Error, Result, Settings, State, StateStore, Subscription, configure, debug_log, error_log,
	info_log, settings, warn_log, with_settings,
};
pub use bunny_dom::kinds::{
	Button, Div, Heading, Input, List, ListItem, Paragraph, Table, TableField, TableHead,
	TableRow,
};
pub use bunny_dom::{
	AsNode, Container, Document, Element, ElementKind, Event, Generic, InsertTarget, Kind, Node,
	ReadyState, Root, same_scope,
};
pub use bunny_http::{CallConfig, CallState, Caller, Method, ReqwestTransport, Transport};
pub use bunny_storage::{
	Clock, DefaultArea, ManualClock, MemoryStorage, PersistedStore, StorageArea, SystemClock,
	default_store,
};

/// The member crates, for items not re-exported at the top level.
pub mod crates {
	pub use bunny_core as core;
	pub use bunny_dom as dom;
	pub use bunny_http as http;
	pub use bunny_storage as storage;
}

/// Creates a detached container over a new `<tag>` element.
///
/// ```rust,ignore
/// let card = bunny::bunny("article")?;
/// card.title("Carrots", 2);
/// card.p("Crunchy.");
/// card.insert_in("#cards");
/// ```
pub fn bunny(tag: &str) -> Result<Container<Generic>> {
	Container::new(tag)
}

/// The root container of the current thread, over `<body>`.
pub fn root() -> Root {
	Root::global()
}

fn detached<K: ElementKind>(result: Result<Element<K>>) -> Result<Element<K>> {
	let element = result?;
	bunny_dom::keys::assign_key(element.node());
	Ok(element)
}

fn built<K: ElementKind>(result: Result<Element<K>>) -> Element<K> {
	result.unwrap_or_else(|error| {
		error_log!("Could not create <{}>: {}", K::TAG, error);
		panic!("failed to create <{}> element: {error}", K::TAG)
	})
}

fn with_text<K: ElementKind>(element: Element<K>, text: &str) -> Element<K> {
	if !text.is_empty() {
		element.text(text);
	}
	element
}

macro_rules! define_factory {
	($(#[$meta:meta])* $name:ident, $try_name:ident => $kind:ty) => {
		$(#[$meta])*
		///
		/// # Panics
		///
		/// Panics when the element cannot be created; see the `try_` form.
		pub fn $name() -> Element<$kind> {
			built($try_name())
		}

		$(#[$meta])*
		///
		/// # Errors
		///
		/// Fails when the document cannot create the element.
		pub fn $try_name() -> Result<Element<$kind>> {
			detached(Element::<$kind>::new())
		}
	};
	($(#[$meta:meta])* $name:ident(text), $try_name:ident => $kind:ty) => {
		$(#[$meta])*
		///
		/// # Panics
		///
		/// Panics when the element cannot be created; see the `try_` form.
		pub fn $name(text: &str) -> Element<$kind> {
			built($try_name(text))
		}

		$(#[$meta])*
		///
		/// # Errors
		///
		/// Fails when the document cannot create the element.
		pub fn $try_name(text: &str) -> Result<Element<$kind>> {
			Ok(with_text(detached(Element::<$kind>::new())?, text))
		}
	};
}

define_factory!(
	/// Detached `<div>`.
	div, try_div => Div
);
define_factory!(
	/// Detached `<p>`; empty `text` leaves it empty.
	p(text), try_p => Paragraph
);
define_factory!(
	/// Detached `<button>`; empty `text` leaves it empty.
	button(text), try_button => Button
);
define_factory!(
	/// Detached `<table>`.
	table, try_table => Table
);
define_factory!(
	/// Detached `<tr>`.
	row, try_row => TableRow
);
define_factory!(
	/// Detached `<th>`; empty `text` leaves it empty.
	th(text), try_th => TableHead
);
define_factory!(
	/// Detached `<td>`; empty `text` leaves it empty.
	td(text), try_td => TableField
);
define_factory!(
	/// Detached `<li>`; empty `text` leaves it empty.
	li(text), try_li => ListItem
);

/// Detached `<input type="...">`.
pub fn input(input_type: &str) -> Element<Input> {
	built(try_input(input_type))
}

/// Fallible form of [`input`].
pub fn try_input(input_type: &str) -> Result<Element<Input>> {
	detached(Element::<Input>::with_type(input_type))
}

/// Detached `<ul>`.
pub fn ul() -> Element<List> {
	built(try_ul())
}

/// Fallible form of [`ul`].
pub fn try_ul() -> Result<Element<List>> {
	detached(Element::<List>::ul())
}

/// Detached `<h1>`..`<h6>`; `level` is clamped into that range.
pub fn title(text: &str, level: u8) -> Element<Heading> {
	built(try_title(text, level))
}

/// Fallible form of [`title`].
pub fn try_title(text: &str, level: u8) -> Result<Element<Heading>> {
	detached(Element::<Heading>::heading(text, level))
}

/// Detached element of any tag.
pub fn element(tag: &str) -> Result<Element<Generic>> {
	detached(Element::create(tag))
}

fn with_store<R>(
	operation: &str,
	fallback: R,
	f: impl FnOnce(PersistedStore<DefaultArea>) -> R,
) -> R {
	match default_store() {
		Ok(store) => f(store),
		Err(error) => {
			error_log!("bunny.{} error: {}", operation, error);
			fallback
		}
	}
}

/// Persists `value` under `key` in the default area, expiring after `ttl`.
/// Failures are logged.
pub fn set<T: Serialize + ?Sized>(key: &str, value: &T, ttl: Option<TimeDelta>) {
	with_store("set", (), |store| store.set(key, value, ttl));
}

/// Reads `key` from the default area; absent, expired or unreadable entries
/// are `None`.
pub fn get<T: DeserializeOwned>(key: &str) -> Option<T> {
	with_store("get", None, |store| store.get(key))
}

/// Removes `key` from the default area.
pub fn clear(key: &str) {
	with_store("clear", (), |store| store.clear(key));
}

/// Every live entry of the default area.
pub fn all() -> HashMap<String, Value> {
	with_store("all", HashMap::new(), |store| store.all())
}

/// Commonly used items.
///
/// ```rust,ignore
/// use bunny::prelude::*;
/// ```
pub mod prelude {
	pub use crate::{
		CallConfig, CallState, Container, Element, ElementKind, Error, Generic, Kind, Result,
		Root, Settings, State, StateStore, bunny, configure, root,
	};
	pub use bunny_dom::kinds::*;

	// External
	pub use chrono::TimeDelta;
	pub use serde::{Deserialize, Serialize};
	pub use serde_json::{Value, json};
}
