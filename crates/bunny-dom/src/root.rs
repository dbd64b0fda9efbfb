//! The document root
//!
//! [`Root`] is the thread's container over `document.body`. On top of the
//! container API it schedules DOM-ready callbacks, looks elements up by CSS
//! selector, owns the reactive [`StateStore`] and performs JSON calls whose
//! progress is reported to an `on_call` handler.
//!
//! ## Example
//!
//! ```ignore
//! use bunny_dom::Root;
//!
//! let root = Root::global();
//! root.ready(|| {
//! 	let root = Root::global();
//! 	let count = root.create_state("count", 0).unwrap();
//! 	let label = root.p("");
//! 	let _binding = count.bind(move |value| {
//! 		label.text(&format!("Clicked {value} times"));
//! 	});
//! 	root.button("+1").when("click", move |_, _| count.update(|n| n + 1));
//! });
//! ```

use core::fmt;
use core::ops::Deref;
use std::rc::{Rc, Weak};

use bunny_core::{Result, State, StateStore};
use bunny_http::{CallConfig, CallState, Caller, Transport};
use serde_json::Value;

use crate::container::Container;
use crate::dom::Document;
use crate::kinds::Generic;

struct RootInner {
	container: Container<Generic>,
	store: StateStore,
	caller: Caller,
}

/// Handle to the thread's root container. Clones share everything.
#[derive(Clone)]
pub struct Root {
	inner: Rc<RootInner>,
}

thread_local! {
	static ROOT: Root = Root::try_new()
		.unwrap_or_else(|e| panic!("failed to create the root container: {e}"));
}

impl Root {
	fn try_new() -> Result<Self> {
		let body = Document::try_global()?.body()?;
		Ok(Self {
			inner: Rc::new(RootInner {
				container: Container::from_node(body),
				store: StateStore::new(),
				caller: Caller::default(),
			}),
		})
	}

	/// The root of the current thread.
	///
	/// # Panics
	///
	/// Panics when the document has no `<body>`.
	pub fn global() -> Self {
		ROOT.with(Clone::clone)
	}

	/// Runs `callback` once the DOM is ready.
	///
	/// On an already loaded document the callback is deferred by
	/// `Settings::ready_delay_ms`; otherwise it runs on `DOMContentLoaded`.
	pub fn ready(&self, callback: impl FnOnce() + 'static) {
		let document = match Document::try_global() {
			Ok(document) => document,
			Err(error) => {
				bunny_core::error_log!("ready: {}", error);
				return;
			}
		};
		if document.ready_state().is_loaded() {
			let delay = bunny_core::with_settings(|settings| settings.ready_delay_ms);
			document.defer(delay, callback);
		} else {
			document.on_content_loaded(callback);
		}
	}

	/// First element of the document matching `selector`.
	pub fn select(&self, selector: &str) -> Result<Option<Container<Generic>>> {
		Container::select(selector)
	}

	/// Every element of the document matching `selector`.
	pub fn select_all(&self, selector: &str) -> Result<Vec<Container<Generic>>> {
		Ok(Document::try_global()?
			.query_selector_all(selector)?
			.into_iter()
			.map(Container::from_node)
			.collect())
	}

	/// The reactive store.
	pub fn state(&self) -> &StateStore {
		&self.inner.store
	}

	/// Shortcut for [`StateStore::create`].
	pub fn create_state<T: 'static>(&self, key: &str, initial: T) -> Result<State<T>> {
		self.inner.store.create(key, initial)
	}

	/// Shortcut for [`StateStore::get`].
	pub fn use_state<T: 'static>(&self, key: &str) -> Result<State<T>> {
		self.inner.store.get(key)
	}

	/// Installs the handler receiving the root and every [`CallState`],
	/// replacing any previous one.
	pub fn on_call(&self, handler: impl Fn(&Root, &CallState) + 'static) {
		let inner: Weak<RootInner> = Rc::downgrade(&self.inner);
		self.inner.caller.on_call(move |state| {
			if let Some(inner) = inner.upgrade() {
				handler(&Root { inner }, state);
			}
		});
	}

	/// Replaces the transport used by [`call`](Self::call).
	pub fn set_transport(&self, transport: impl Transport + 'static) {
		self.inner.caller.set_transport(transport);
	}

	/// Calls `url`, reporting progress to the `on_call` handler.
	pub async fn call(&self, url: &str, config: CallConfig) -> Result<Value> {
		self.inner.caller.call(url, config).await
	}

	/// Starts [`call`](Self::call) on the page's executor without waiting
	/// for it; the outcome is only seen by the `on_call` handler.
	#[cfg(target_arch = "wasm32")]
	pub fn spawn_call(&self, url: &str, config: CallConfig) {
		let root = self.clone();
		let url = url.to_string();
		wasm_bindgen_futures::spawn_local(async move {
			let _ = root.call(&url, config).await;
		});
	}
}

impl Deref for Root {
	type Target = Container<Generic>;

	fn deref(&self) -> &Self::Target {
		&self.inner.container
	}
}

impl fmt::Debug for Root {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Root")
			.field("container", &self.inner.container)
			.field("state", &self.inner.store)
			.finish()
	}
}
