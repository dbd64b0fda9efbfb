//! # bunny-core
//!
//! Shared building blocks for the bunny crates.
//!
//! - [`error`]: the [`Error`] enum and [`Result`] alias used everywhere
//! - [`logging`]: `debug_log!`, `info_log!`, `warn_log!` and `error_log!`
//!   (browser console on WASM, `tracing` natively)
//! - [`settings`]: library settings loadable from TOML
//! - [`reactive`]: the keyed reactive [`StateStore`]

#![warn(missing_docs)]

pub mod error;
pub mod logging;
pub mod reactive;
pub mod settings;

pub use error::{Error, Result};
pub use reactive::{State, StateStore, Subscription};
pub use settings::{Settings, configure, settings, with_settings};

#[doc(hidden)]
pub mod __private {
	pub use tracing;
	#[cfg(target_arch = "wasm32")]
	pub use web_sys;
}
