//! Flat string-keyed storage areas.

use core::cell::RefCell;
use std::rc::Rc;

use bunny_core::{Error, Result};
use indexmap::IndexMap;

/// A flat string-to-string store such as `window.localStorage`.
pub trait StorageArea {
	/// Reads `key`.
	fn get_item(&self, key: &str) -> Result<Option<String>>;

	/// Writes `key`.
	fn set_item(&self, key: &str, value: &str) -> Result<()>;

	/// Deletes `key`; deleting a missing key succeeds.
	fn remove_item(&self, key: &str) -> Result<()>;

	/// Every key currently stored.
	fn keys(&self) -> Result<Vec<String>>;
}

/// In-memory area. Clones share the same entries.
///
/// An optional quota, counted in bytes of keys plus values, makes writes fail
/// the way a full `localStorage` does.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
	entries: Rc<RefCell<IndexMap<String, String>>>,
	quota: Option<usize>,
}

thread_local! {
	static SHARED: MemoryStorage = MemoryStorage::new();
}

impl MemoryStorage {
	/// Empty area without a quota.
	pub fn new() -> Self {
		Self::default()
	}

	/// Empty area refusing writes beyond `bytes`.
	pub fn with_quota(bytes: usize) -> Self {
		Self {
			quota: Some(bytes),
			..Self::default()
		}
	}

	/// The area shared by the current thread.
	pub fn shared() -> Self {
		SHARED.with(Clone::clone)
	}

	/// Number of stored entries.
	pub fn len(&self) -> usize {
		self.entries.borrow().len()
	}

	/// Returns `true` when nothing is stored.
	pub fn is_empty(&self) -> bool {
		self.entries.borrow().is_empty()
	}

	fn used_bytes(&self, skip: &str) -> usize {
		self.entries
			.borrow()
			.iter()
			.filter(|(key, _)| key.as_str() != skip)
			.map(|(key, value)| key.len() + value.len())
			.sum()
	}
}

impl StorageArea for MemoryStorage {
	fn get_item(&self, key: &str) -> Result<Option<String>> {
		Ok(self.entries.borrow().get(key).cloned())
	}

	fn set_item(&self, key: &str, value: &str) -> Result<()> {
		if let Some(quota) = self.quota
			&& self.used_bytes(key) + key.len() + value.len() > quota
		{
			return Err(Error::Storage(format!(
				"quota of {quota} bytes exceeded while writing '{key}'"
			)));
		}
		self.entries
			.borrow_mut()
			.insert(key.to_string(), value.to_string());
		Ok(())
	}

	fn remove_item(&self, key: &str) -> Result<()> {
		self.entries.borrow_mut().shift_remove(key);
		Ok(())
	}

	fn keys(&self) -> Result<Vec<String>> {
		Ok(self.entries.borrow().keys().cloned().collect())
	}
}

/// `window.localStorage`.
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone)]
pub struct LocalStorage(web_sys::Storage);

#[cfg(target_arch = "wasm32")]
fn storage_error(error: wasm_bindgen::JsValue) -> Error {
	Error::Storage(
		error
			.as_string()
			.unwrap_or_else(|| format!("{error:?}")),
	)
}

#[cfg(target_arch = "wasm32")]
impl LocalStorage {
	/// Opens the page's local storage.
	pub fn new() -> Result<Self> {
		web_sys::window()
			.ok_or_else(|| Error::Storage("no global window".to_string()))?
			.local_storage()
			.map_err(storage_error)?
			.map(Self)
			.ok_or_else(|| Error::Storage("localStorage is unavailable".to_string()))
	}
}

#[cfg(target_arch = "wasm32")]
impl StorageArea for LocalStorage {
	fn get_item(&self, key: &str) -> Result<Option<String>> {
		self.0.get_item(key).map_err(storage_error)
	}

	fn set_item(&self, key: &str, value: &str) -> Result<()> {
		self.0.set_item(key, value).map_err(storage_error)
	}

	fn remove_item(&self, key: &str) -> Result<()> {
		self.0.remove_item(key).map_err(storage_error)
	}

	fn keys(&self) -> Result<Vec<String>> {
		let length = self.0.length().map_err(storage_error)?;
		let mut keys = Vec::with_capacity(length as usize);
		for index in 0..length {
			if let Some(key) = self.0.key(index).map_err(storage_error)? {
				keys.push(key);
			}
		}
		Ok(keys)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_memory_storage_round_trip() {
		let area = MemoryStorage::new();
		area.set_item("a", "1").unwrap();
		area.set_item("b", "2").unwrap();
		area.set_item("a", "3").unwrap();

		assert_eq!(area.get_item("a").unwrap().as_deref(), Some("3"));
		assert_eq!(area.keys().unwrap(), vec!["a", "b"]);

		area.remove_item("a").unwrap();
		area.remove_item("missing").unwrap();
		assert_eq!(area.get_item("a").unwrap(), None);
		assert_eq!(area.len(), 1);
	}

	#[rstest]
	fn test_clones_share_entries() {
		let area = MemoryStorage::new();
		let other = area.clone();
		area.set_item("k", "v").unwrap();
		assert_eq!(other.get_item("k").unwrap().as_deref(), Some("v"));
	}

	#[rstest]
	fn test_quota_rejects_oversized_writes() {
		let area = MemoryStorage::with_quota(10);
		area.set_item("key", "12345").unwrap();
		// Overwriting does not count the previous value
		area.set_item("key", "1234567").unwrap();

		let result = area.set_item("other", "x");

		assert!(matches!(result, Err(Error::Storage(_))));
		assert_eq!(area.get_item("other").unwrap(), None);
	}
}
