//! Observable value handle and listener bookkeeping.

use core::cell::{Cell, RefCell};
use core::fmt;
use std::rc::{Rc, Weak};

type Listener<T> = Rc<dyn Fn(&T, &T)>;

/// Storage behind a state key, shared by every [`State`] handle of that key.
pub(crate) struct StateCell<T> {
	value: RefCell<T>,
	listeners: RefCell<Vec<(u64, Listener<T>)>>,
	next_id: Cell<u64>,
}

impl<T> StateCell<T> {
	pub(crate) fn new(value: T) -> Self {
		Self {
			value: RefCell::new(value),
			listeners: RefCell::new(Vec::new()),
			next_id: Cell::new(0),
		}
	}
}

/// Type-erased listener removal, so a [`Subscription`] does not carry `T`.
trait ListenerSet {
	fn remove_listener(&self, id: u64) -> bool;
}

impl<T> ListenerSet for StateCell<T> {
	fn remove_listener(&self, id: u64) -> bool {
		let mut listeners = self.listeners.borrow_mut();
		let before = listeners.len();
		listeners.retain(|(listener_id, _)| *listener_id != id);
		listeners.len() != before
	}
}

/// Controller for one reactive entry.
///
/// Handles are cheap to clone; all clones share the same value and
/// listeners.
pub struct State<T: 'static> {
	key: Rc<str>,
	cell: Rc<StateCell<T>>,
}

impl<T: 'static> Clone for State<T> {
	fn clone(&self) -> Self {
		Self {
			key: self.key.clone(),
			cell: self.cell.clone(),
		}
	}
}

impl<T: 'static> State<T> {
	pub(crate) fn from_cell(key: Rc<str>, cell: Rc<StateCell<T>>) -> Self {
		Self { key, cell }
	}

	/// The key this state was created under.
	pub fn key(&self) -> &str {
		&self.key
	}

	/// Returns a copy of the current value.
	pub fn get(&self) -> T
	where
		T: Clone,
	{
		self.cell.value.borrow().clone()
	}

	/// Reads the current value without cloning it.
	pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
		f(&self.cell.value.borrow())
	}

	/// Replaces the value and notifies every listener with `(new, old)`.
	pub fn set(&self, value: T)
	where
		T: Clone,
	{
		let current = value.clone();
		let previous = self.cell.value.replace(value);
		self.notify(&current, &previous);
	}

	/// Computes the next value from the current one, then behaves like [`set`](Self::set).
	pub fn update(&self, f: impl FnOnce(&T) -> T)
	where
		T: Clone,
	{
		let next = self.with(f);
		self.set(next);
	}

	/// Mutates the value in place, then notifies listeners.
	pub fn modify(&self, f: impl FnOnce(&mut T))
	where
		T: Clone,
	{
		let previous = self.get();
		f(&mut self.cell.value.borrow_mut());
		let current = self.get();
		self.notify(&current, &previous);
	}

	/// Registers a listener called with `(new, old)` after every change.
	pub fn subscribe(&self, listener: impl Fn(&T, &T) + 'static) -> Subscription {
		let id = self.cell.next_id.get();
		self.cell.next_id.set(id + 1);
		self.cell
			.listeners
			.borrow_mut()
			.push((id, Rc::new(listener)));

		let cell: Rc<dyn ListenerSet> = self.cell.clone();
		Subscription {
			cell: Rc::downgrade(&cell),
			id,
		}
	}

	/// Renders immediately with the current value, then on every change.
	pub fn bind(&self, render: impl Fn(&T) + 'static) -> Subscription {
		self.with(&render);
		self.subscribe(move |current, _| render(current))
	}

	/// Number of registered listeners.
	pub fn listener_count(&self) -> usize {
		self.cell.listeners.borrow().len()
	}

	/// Returns `true` when both handles control the same entry.
	pub fn ptr_eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.cell, &other.cell)
	}

	fn notify(&self, current: &T, previous: &T) {
		// Snapshot so listeners may subscribe, unsubscribe or set re-entrantly
		let listeners: Vec<Listener<T>> = self
			.cell
			.listeners
			.borrow()
			.iter()
			.map(|(_, listener)| listener.clone())
			.collect();

		for listener in listeners {
			listener(current, previous);
		}
	}
}

impl<T: fmt::Debug + 'static> fmt::Debug for State<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("State")
			.field("key", &self.key)
			.field("value", &*self.cell.value.borrow())
			.field("listeners", &self.listener_count())
			.finish()
	}
}

/// Registration returned by [`State::subscribe`] and [`State::bind`].
///
/// Dropping a subscription keeps the listener registered; call
/// [`unsubscribe`](Self::unsubscribe) to remove it.
#[must_use = "keep the subscription to be able to unsubscribe later"]
pub struct Subscription {
	cell: Weak<dyn ListenerSet>,
	id: u64,
}

impl Subscription {
	/// Removes the listener. Returns `false` when it was already gone.
	pub fn unsubscribe(self) -> bool {
		self.cell
			.upgrade()
			.is_some_and(|cell| cell.remove_listener(self.id))
	}
}

impl fmt::Debug for Subscription {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Subscription").field("id", &self.id).finish()
	}
}
