//! Expiring persisted store
//!
//! Values are wrapped with an optional expiry instant, encoded with
//! [`codec`](crate::codec) and written to a [`StorageArea`]. Reads enforce
//! the expiry: an entry read after its instant is removed and reported as
//! absent.
//!
//! The `try_*` methods return every failure. [`set`](PersistedStore::set),
//! [`get`](PersistedStore::get), [`clear`](PersistedStore::clear) and
//! [`all`](PersistedStore::all) log failures and fall back to "nothing".
//!
//! ## Example
//!
//! ```ignore
//! use bunny_storage::{MemoryStorage, PersistedStore, SystemClock};
//! use chrono::TimeDelta;
//!
//! let store = PersistedStore::new(MemoryStorage::new(), SystemClock);
//! store.set("session", &token, Some(TimeDelta::hours(1)));
//! let token: Option<String> = store.get("session");
//! ```

use std::collections::HashMap;

use bunny_core::{Result, debug_log, error_log};
use chrono::TimeDelta;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::area::StorageArea;
use crate::clock::{Clock, SystemClock};
use crate::codec::{self, Payload};

/// Key-value store with expiry over a storage area.
#[derive(Debug, Clone)]
pub struct PersistedStore<A: StorageArea, C: Clock = SystemClock> {
	area: A,
	clock: C,
	namespace: Option<String>,
}

impl<A: StorageArea, C: Clock> PersistedStore<A, C> {
	/// Store over `area`, prefixing keys with the configured
	/// `storage_namespace`.
	pub fn new(area: A, clock: C) -> Self {
		let namespace = bunny_core::with_settings(|settings| settings.storage_namespace.clone());
		Self {
			area,
			clock,
			namespace,
		}
	}

	/// Overrides the key prefix.
	pub fn with_namespace(mut self, namespace: Option<String>) -> Self {
		self.namespace = namespace.filter(|prefix| !prefix.is_empty());
		self
	}

	/// The underlying area.
	pub fn area(&self) -> &A {
		&self.area
	}

	fn full_key(&self, key: &str) -> String {
		match &self.namespace {
			Some(prefix) => format!("{prefix}{key}"),
			None => key.to_string(),
		}
	}

	fn local_key<'k>(&self, stored_key: &'k str) -> Option<&'k str> {
		match &self.namespace {
			Some(prefix) => stored_key.strip_prefix(prefix.as_str()),
			None => Some(stored_key),
		}
	}

	/// Stores `value` under `key`.
	///
	/// `ttl` of `None` or zero never expires. Otherwise the entry expires
	/// `ttl` after now; a negative `ttl` stores an entry that is already
	/// expired.
	pub fn try_set<T: Serialize + ?Sized>(
		&self,
		key: &str,
		value: &T,
		ttl: Option<TimeDelta>,
	) -> Result<()> {
		let expires_at = ttl
			.filter(|ttl| !ttl.is_zero())
			.map(|ttl| self.clock.now_millis().saturating_add(ttl.num_milliseconds()));
		let payload = Payload {
			value: serde_json::to_value(value)?,
			expires_at,
		};
		self.area.set_item(&self.full_key(key), &codec::encode(&payload)?)
	}

	/// Reads `key`.
	///
	/// Absent, expired and `null` entries are `Ok(None)`; an expired entry is
	/// removed on the way.
	///
	/// # Errors
	///
	/// Storage failures, corrupt payloads and values that do not deserialize
	/// into `T`.
	pub fn try_get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
		let full_key = self.full_key(key);
		let Some(stored) = self.area.get_item(&full_key)? else {
			return Ok(None);
		};
		let payload = codec::decode(&stored)?;
		if payload.is_expired(self.clock.now_millis()) {
			debug_log!("Entry '{}' expired, removing it", full_key);
			self.area.remove_item(&full_key)?;
			return Ok(None);
		}
		if payload.value.is_null() {
			return Ok(None);
		}
		Ok(Some(serde_json::from_value(payload.value)?))
	}

	/// Removes `key`.
	pub fn try_clear(&self, key: &str) -> Result<()> {
		self.area.remove_item(&self.full_key(key))
	}

	/// Every live entry of this store's namespace, keyed without the prefix.
	///
	/// Keys are listed once before decoding, so entries removed for expiring
	/// do not disturb the walk. Expired, corrupt and `null` entries are left
	/// out; only a failure to list the keys is an error.
	pub fn try_all(&self) -> Result<HashMap<String, Value>> {
		let keys = self.area.keys()?;
		let mut entries = HashMap::with_capacity(keys.len());
		for stored_key in &keys {
			let Some(key) = self.local_key(stored_key) else {
				continue;
			};
			match self.try_get::<Value>(key) {
				Ok(Some(value)) => {
					entries.insert(key.to_string(), value);
				}
				Ok(None) => {}
				Err(error) => debug_log!("Skipping entry '{}': {}", stored_key, error),
			}
		}
		Ok(entries)
	}

	/// [`try_set`](Self::try_set), logging failures.
	pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T, ttl: Option<TimeDelta>) {
		if let Err(error) = self.try_set(key, value, ttl) {
			error_log!("bunny.set error: {}", error);
		}
	}

	/// [`try_get`](Self::try_get), logging failures and returning `None`.
	pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
		self.try_get(key).unwrap_or_else(|error| {
			error_log!("bunny.get error: {}", error);
			None
		})
	}

	/// [`try_clear`](Self::try_clear), logging failures.
	pub fn clear(&self, key: &str) {
		if let Err(error) = self.try_clear(key) {
			error_log!("bunny.clear error: {}", error);
		}
	}

	/// [`try_all`](Self::try_all), logging failures and returning an empty map.
	pub fn all(&self) -> HashMap<String, Value> {
		self.try_all().unwrap_or_else(|error| {
			error_log!("bunny.all error: {}", error);
			HashMap::new()
		})
	}
}
