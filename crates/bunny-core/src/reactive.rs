//! Keyed reactive state.
//!
//! A [`StateStore`] maps string keys to observable values. Each key moves
//! through a small life cycle:
//!
//! ```text
//! absent --create--> created --subscribe/bind--> observed --set/update--> notified
//!    ^                                                                       |
//!    +------------------------------- remove --------------------------------+
//! ```
//!
//! Notification is synchronous: `set` returns only after every listener of
//! that key has run, in subscription order. There is no ordering between
//! different keys.
//!
//! ## Example
//!
//! ```
//! use bunny_core::reactive::StateStore;
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! let store = StateStore::new();
//! let count = store.create("count", 0).unwrap();
//!
//! let seen = Rc::new(RefCell::new(Vec::new()));
//! let sink = seen.clone();
//! count.subscribe(move |new, old| sink.borrow_mut().push((*new, *old)));
//!
//! count.set(1);
//! count.update(|n| n + 1);
//! assert_eq!(*seen.borrow(), vec![(1, 0), (2, 1)]);
//! ```

mod state;
mod store;

pub use state::{State, Subscription};
pub use store::StateStore;
