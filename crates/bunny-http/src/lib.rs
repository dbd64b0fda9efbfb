//! # bunny-http
//!
//! A small JSON call helper.
//!
//! - [`CallConfig`]: method, JSON body, headers and retry budget
//! - [`Transport`]: the seam performing one attempt ([`ReqwestTransport`] by default)
//! - [`Caller`]: retries failed attempts and reports [`CallState`]s to a handler
//!
//! ## Example
//!
//! ```ignore
//! use bunny_http::{CallConfig, CallState, Caller};
//!
//! let caller = Caller::default();
//! caller.on_call(|state| match state {
//!     CallState::Loading => spinner.show(),
//!     CallState::Ok(users) => render(users),
//!     CallState::Error(message) => alert(message),
//! });
//! caller.call("/api/users", CallConfig::get().tries(2)).await?;
//! ```

#![warn(missing_docs)]

pub mod caller;
pub mod config;
pub mod transport;

pub use caller::{CallState, Caller};
pub use config::{CallConfig, Method, Request};
pub use transport::{ReqwestTransport, Transport};
