//! Retrying caller with a state callback.

use core::cell::RefCell;
use core::fmt;
use std::rc::Rc;

use bunny_core::{Result, debug_log, warn_log};
use serde_json::Value;

use crate::config::{CallConfig, Request};
use crate::transport::{ReqwestTransport, Transport};

/// Progress of a call, as reported to the `on_call` handler.
#[derive(Debug, Clone, PartialEq)]
pub enum CallState {
	/// An attempt is about to start.
	Loading,
	/// The response body, parsed as JSON.
	Ok(Value),
	/// Every attempt failed; the message of the last failure.
	Error(String),
}

impl CallState {
	/// Lower-case state name: `loading`, `ok` or `error`.
	pub fn name(&self) -> &'static str {
		match self {
			Self::Loading => "loading",
			Self::Ok(_) => "ok",
			Self::Error(_) => "error",
		}
	}
}

type Handler = Rc<dyn Fn(&CallState)>;

/// Performs calls through a [`Transport`] and reports their progress.
///
/// A call makes up to `tries + 1` attempts, one after another with no delay.
/// [`CallState::Loading`] is reported first and again before each retry,
/// then exactly one of [`CallState::Ok`] or [`CallState::Error`]. A request
/// that cannot be built reports `Loading` then `Error`.
pub struct Caller {
	transport: RefCell<Rc<dyn Transport>>,
	handler: RefCell<Option<Handler>>,
}

impl Default for Caller {
	fn default() -> Self {
		Self::new(ReqwestTransport::new())
	}
}

impl fmt::Debug for Caller {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Caller")
			.field("has_handler", &self.handler.borrow().is_some())
			.finish()
	}
}

impl Caller {
	/// Caller over `transport`.
	pub fn new(transport: impl Transport + 'static) -> Self {
		Self {
			transport: RefCell::new(Rc::new(transport)),
			handler: RefCell::new(None),
		}
	}

	/// Replaces the transport used by later calls.
	pub fn set_transport(&self, transport: impl Transport + 'static) {
		*self.transport.borrow_mut() = Rc::new(transport);
	}

	/// Installs the state handler, replacing any previous one.
	pub fn on_call(&self, handler: impl Fn(&CallState) + 'static) {
		*self.handler.borrow_mut() = Some(Rc::new(handler));
	}

	fn emit(&self, state: &CallState) {
		let handler = self.handler.borrow().clone();
		if let Some(handler) = handler {
			handler(state);
		}
	}

	/// Calls `url` and returns the parsed response body.
	///
	/// # Errors
	///
	/// The error of the last attempt once the retry budget is spent. The
	/// request is not attempted when it cannot be built from `config`.
	pub async fn call(&self, url: &str, config: CallConfig) -> Result<Value> {
		self.emit(&CallState::Loading);
		let request = bunny_core::with_settings(|settings| Request::build(url, &config, settings));
		let request = match request {
			Ok(request) => request,
			Err(error) => {
				warn_log!("{} {}: {}", config.method, url, error);
				self.emit(&CallState::Error(error.to_string()));
				return Err(error);
			}
		};
		let tries = config
			.tries
			.unwrap_or_else(|| bunny_core::with_settings(|settings| settings.call_tries));
		let transport = self.transport.borrow().clone();

		let mut attempt = 0;
		loop {
			match transport.send(&request).await {
				Ok(value) => {
					self.emit(&CallState::Ok(value.clone()));
					return Ok(value);
				}
				Err(error) if attempt < tries => {
					attempt += 1;
					debug_log!(
						"{} {} failed ({}), retry {}/{}",
						request.method,
						request.url,
						error,
						attempt,
						tries
					);
					self.emit(&CallState::Loading);
				}
				Err(error) => {
					warn_log!("{} {} failed: {}", request.method, request.url, error);
					self.emit(&CallState::Error(error.to_string()));
					return Err(error);
				}
			}
		}
	}
}
