//! Key-addressed collection of reactive entries.

use core::any::Any;
use core::cell::RefCell;
use core::fmt;
use std::collections::HashMap;
use std::rc::Rc;

use super::state::{State, StateCell};
use crate::error::{Error, Result};
use crate::warn_log;

struct Entry {
	key: Rc<str>,
	cell: Rc<dyn Any>,
}

/// A set of named reactive values.
///
/// Cloning a store yields another handle to the same entries.
#[derive(Clone, Default)]
pub struct StateStore {
	entries: Rc<RefCell<HashMap<String, Entry>>>,
}

impl StateStore {
	/// Creates an empty store.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates the entry `key` with `initial` as its value.
	///
	/// Creating a key that already exists is not an error: a warning is
	/// logged and the existing controller is returned, with its current value
	/// left untouched. It fails only when the existing entry holds another
	/// type.
	pub fn create<T: 'static>(&self, key: &str, initial: T) -> Result<State<T>> {
		if self.contains(key) {
			warn_log!("State '{}' already exists, returning the existing controller", key);
			return self.get(key);
		}

		let shared_key: Rc<str> = Rc::from(key);
		let cell = Rc::new(StateCell::new(initial));
		self.entries.borrow_mut().insert(
			key.to_string(),
			Entry {
				key: shared_key.clone(),
				cell: cell.clone(),
			},
		);
		Ok(State::from_cell(shared_key, cell))
	}

	/// Returns the controller of an existing entry.
	///
	/// # Errors
	///
	/// [`Error::UnknownKey`] when `key` was never created (or was removed),
	/// [`Error::TypeMismatch`] when it holds a value of another type.
	pub fn get<T: 'static>(&self, key: &str) -> Result<State<T>> {
		let entries = self.entries.borrow();
		let entry = entries
			.get(key)
			.ok_or_else(|| Error::UnknownKey(key.to_string()))?;
		let cell = entry
			.cell
			.clone()
			.downcast::<StateCell<T>>()
			.map_err(|_| Error::TypeMismatch {
				key: key.to_string(),
			})?;
		Ok(State::from_cell(entry.key.clone(), cell))
	}

	/// Returns `true` when `key` currently exists.
	pub fn contains(&self, key: &str) -> bool {
		self.entries.borrow().contains_key(key)
	}

	/// Removes `key`, returning it to the absent state.
	///
	/// Outstanding [`State`] handles keep their value and listeners but are
	/// no longer reachable through the store.
	pub fn remove(&self, key: &str) -> bool {
		self.entries.borrow_mut().remove(key).is_some()
	}

	/// Keys of every entry, sorted.
	pub fn keys(&self) -> Vec<String> {
		let mut keys: Vec<String> = self.entries.borrow().keys().cloned().collect();
		keys.sort();
		keys
	}

	/// Number of entries.
	pub fn len(&self) -> usize {
		self.entries.borrow().len()
	}

	/// Returns `true` when the store has no entries.
	pub fn is_empty(&self) -> bool {
		self.entries.borrow().is_empty()
	}
}

impl fmt::Debug for StateStore {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("StateStore")
			.field("keys", &self.keys())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::{fixture, rstest};
	use std::cell::Cell;

	#[fixture]
	fn store() -> StateStore {
		StateStore::new()
	}

	#[rstest]
	fn test_get_unknown_key_fails(store: StateStore) {
		let result = store.get::<i32>("missing");
		assert!(matches!(result, Err(Error::UnknownKey(key)) if key == "missing"));
	}

	#[rstest]
	fn test_duplicate_create_returns_existing(store: StateStore) {
		let first = store.create("count", 1).unwrap();
		first.set(10);

		let second = store.create("count", 99).unwrap();

		assert!(first.ptr_eq(&second));
		assert_eq!(second.get(), 10);
	}

	#[rstest]
	fn test_duplicate_create_with_other_type_fails(store: StateStore) {
		store.create("count", 1_i32).unwrap();

		let result = store.create("count", "one".to_string());

		assert!(matches!(result, Err(Error::TypeMismatch { .. })));
	}

	#[rstest]
	fn test_get_with_wrong_type_fails(store: StateStore) {
		store.create("flag", true).unwrap();
		assert!(matches!(
			store.get::<String>("flag"),
			Err(Error::TypeMismatch { key }) if key == "flag"
		));
	}

	#[rstest]
	fn test_get_shares_listeners(store: StateStore) {
		let created = store.create("count", 0).unwrap();
		let calls = Rc::new(Cell::new(0));
		let counter = calls.clone();
		let _sub = created.subscribe(move |_, _| counter.set(counter.get() + 1));

		store.get::<i32>("count").unwrap().set(3);

		assert_eq!(calls.get(), 1);
		assert_eq!(created.get(), 3);
	}

	#[rstest]
	fn test_remove_returns_key_to_absent(store: StateStore) {
		let detached = store.create("count", 1).unwrap();

		assert!(store.remove("count"));
		assert!(!store.remove("count"));
		assert!(store.get::<i32>("count").is_err());

		detached.set(2);
		assert_eq!(detached.get(), 2);

		let fresh = store.create("count", 0).unwrap();
		assert!(!fresh.ptr_eq(&detached));
		assert_eq!(fresh.get(), 0);
	}

	#[rstest]
	fn test_keys_are_sorted(store: StateStore) {
		store.create("zeta", 0).unwrap();
		store.create("alpha", 0).unwrap();

		assert_eq!(store.keys(), vec!["alpha", "zeta"]);
		assert_eq!(store.len(), 2);
		assert!(!store.is_empty());
	}

	#[rstest]
	fn test_listener_may_create_keys(store: StateStore) {
		let trigger = store.create("trigger", 0).unwrap();
		let inner = store.clone();
		let _sub = trigger.subscribe(move |new, _| {
			inner.create(&format!("derived-{new}"), *new).unwrap();
		});

		trigger.set(1);

		assert!(store.contains("derived-1"));
	}
}
