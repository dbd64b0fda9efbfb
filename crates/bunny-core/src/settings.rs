//! Library-wide settings.
//!
//! Settings are plain data with defaults for every field. They can be built
//! in code or parsed from TOML, then installed for the current thread with
//! [`configure`].
//!
//! ```
//! use bunny_core::settings::{Settings, configure, settings};
//!
//! let loaded = Settings::from_toml_str(r#"
//!     storage_namespace = "app:"
//!     call_tries = 2
//!
//!     [call_headers]
//!     Authorization = "Bearer token"
//! "#).unwrap();
//!
//! configure(loaded);
//! assert_eq!(settings().call_tries, 2);
//! assert_eq!(settings().element_key_length, 20);
//! ```

use std::cell::RefCell;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::Result;

/// Settings consumed by the DOM, storage and HTTP layers.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
	/// Tag elements built through a container with a random `_key` attribute.
	pub element_keys: bool,
	/// Length of the generated `_key` attribute.
	pub element_key_length: usize,
	/// Delay in milliseconds before a `ready` callback runs on an already
	/// loaded document.
	pub ready_delay_ms: u32,
	/// Prefix prepended to every persisted key.
	pub storage_namespace: Option<String>,
	/// Retry budget for calls whose config does not set one.
	pub call_tries: u32,
	/// Headers sent with every call, before per-call headers.
	pub call_headers: IndexMap<String, String>,
}

impl Default for Settings {
	fn default() -> Self {
		Self {
			element_keys: true,
			element_key_length: 20,
			ready_delay_ms: 1,
			storage_namespace: None,
			call_tries: 0,
			call_headers: IndexMap::new(),
		}
	}
}

impl Settings {
	/// Parses settings from a TOML document. Missing fields keep their defaults.
	pub fn from_toml_str(source: &str) -> Result<Self> {
		Ok(toml::from_str(source)?)
	}

	/// Disables the `_key` attribute on built elements.
	pub fn without_element_keys(mut self) -> Self {
		self.element_keys = false;
		self
	}

	/// Sets the storage namespace.
	pub fn with_storage_namespace(mut self, namespace: impl Into<String>) -> Self {
		self.storage_namespace = Some(namespace.into());
		self
	}

	/// Sets the default call retry budget.
	pub fn with_call_tries(mut self, tries: u32) -> Self {
		self.call_tries = tries;
		self
	}

	/// Adds a header sent with every call.
	pub fn with_call_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.call_headers.insert(name.into(), value.into());
		self
	}
}

thread_local! {
	static SETTINGS: RefCell<Settings> = RefCell::new(Settings::default());
}

/// Installs `settings` for the current thread.
pub fn configure(settings: Settings) {
	SETTINGS.with(|current| *current.borrow_mut() = settings);
}

/// Returns a copy of the active settings.
pub fn settings() -> Settings {
	SETTINGS.with(|current| current.borrow().clone())
}

/// Reads the active settings without cloning them.
pub fn with_settings<R>(f: impl FnOnce(&Settings) -> R) -> R {
	SETTINGS.with(|current| f(&current.borrow()))
}
