//! Time source for expiry checks.

use core::cell::Cell;
use std::rc::Rc;

use chrono::{DateTime, TimeDelta, Utc};

/// Source of the current time in milliseconds since the Unix epoch.
pub trait Clock {
	/// Current time in milliseconds since the Unix epoch.
	fn now_millis(&self) -> i64;
}

/// Wall clock (`Date.now()` on WASM).
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
	fn now_millis(&self) -> i64 {
		Utc::now().timestamp_millis()
	}
}

/// Clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
	millis: Rc<Cell<i64>>,
}

impl ManualClock {
	/// Clock frozen at `at`.
	pub fn at(at: DateTime<Utc>) -> Self {
		Self::from_millis(at.timestamp_millis())
	}

	/// Clock frozen at `millis` since the epoch.
	pub fn from_millis(millis: i64) -> Self {
		Self {
			millis: Rc::new(Cell::new(millis)),
		}
	}

	/// Moves the clock by `delta`, which may be negative.
	pub fn advance(&self, delta: TimeDelta) {
		self.millis
			.set(self.millis.get().saturating_add(delta.num_milliseconds()));
	}

	/// Jumps to `millis` since the epoch.
	pub fn set_millis(&self, millis: i64) {
		self.millis.set(millis);
	}
}

impl Clock for ManualClock {
	fn now_millis(&self) -> i64 {
		self.millis.get()
	}
}
