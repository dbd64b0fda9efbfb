//! # bunny-storage
//!
//! Persisted key-value helper: values are stored as compressed JSON
//! `{ "value": ..., "expiresAt": ... }` payloads in a flat string store.
//!
//! - [`area`]: the [`StorageArea`] seam, [`MemoryStorage`] and (on WASM) `LocalStorage`
//! - [`clock`]: [`SystemClock`] and the test-friendly [`ManualClock`]
//! - [`codec`]: payload encoding
//! - [`store`]: the expiring [`PersistedStore`]

#![warn(missing_docs)]

pub mod area;
pub mod clock;
pub mod codec;
pub mod store;

#[cfg(target_arch = "wasm32")]
pub use area::LocalStorage;
pub use area::{MemoryStorage, StorageArea};
pub use clock::{Clock, ManualClock, SystemClock};
pub use codec::Payload;
pub use store::PersistedStore;

/// The platform's default area: `localStorage` on WASM, the thread's shared
/// [`MemoryStorage`] elsewhere.
#[cfg(target_arch = "wasm32")]
pub type DefaultArea = LocalStorage;

/// The platform's default area: `localStorage` on WASM, the thread's shared
/// [`MemoryStorage`] elsewhere.
#[cfg(not(target_arch = "wasm32"))]
pub type DefaultArea = MemoryStorage;

/// Opens the default area with the wall clock.
pub fn default_store() -> bunny_core::Result<PersistedStore<DefaultArea>> {
	#[cfg(target_arch = "wasm32")]
	let area = LocalStorage::new()?;
	#[cfg(not(target_arch = "wasm32"))]
	let area = MemoryStorage::shared();

	Ok(PersistedStore::new(area, SystemClock))
}
