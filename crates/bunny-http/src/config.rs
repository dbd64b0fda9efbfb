//! Call configuration and request assembly.

use core::fmt;

use bunny_core::{Error, Result, Settings};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// HTTP methods a call may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
	/// `GET`, never sends a body.
	#[default]
	Get,
	/// `POST`
	Post,
	/// `DELETE`
	Delete,
	/// `PATCH`
	Patch,
	/// `PUT`
	Put,
}

impl Method {
	/// Upper-case method name.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Get => "GET",
			Self::Post => "POST",
			Self::Delete => "DELETE",
			Self::Patch => "PATCH",
			Self::Put => "PUT",
		}
	}
}

impl fmt::Display for Method {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl From<Method> for reqwest::Method {
	fn from(method: Method) -> Self {
		match method {
			Method::Get => reqwest::Method::GET,
			Method::Post => reqwest::Method::POST,
			Method::Delete => reqwest::Method::DELETE,
			Method::Patch => reqwest::Method::PATCH,
			Method::Put => reqwest::Method::PUT,
		}
	}
}

/// Configuration of one call.
///
/// ## Example
///
/// ```ignore
/// let config = CallConfig::post(json!({ "name": "bunny" }))
///     .header("Authorization", "Bearer token")
///     .tries(2);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallConfig {
	/// Request method.
	pub method: Method,
	/// JSON body, ignored for `GET`.
	pub body: Option<Value>,
	/// Per-call headers, applied after the default ones.
	pub headers: IndexMap<String, String>,
	/// Retries after the first failure. `None` uses `Settings::call_tries`.
	pub tries: Option<u32>,
}

impl CallConfig {
	/// Config for `method` with no body.
	pub fn new(method: Method) -> Self {
		Self {
			method,
			..Self::default()
		}
	}

	/// `GET` config.
	pub fn get() -> Self {
		Self::new(Method::Get)
	}

	/// `POST` config with a JSON body.
	pub fn post(body: Value) -> Self {
		Self::new(Method::Post).body(body)
	}

	/// `PUT` config with a JSON body.
	pub fn put(body: Value) -> Self {
		Self::new(Method::Put).body(body)
	}

	/// `PATCH` config with a JSON body.
	pub fn patch(body: Value) -> Self {
		Self::new(Method::Patch).body(body)
	}

	/// `DELETE` config.
	pub fn delete() -> Self {
		Self::new(Method::Delete)
	}

	/// Sets the JSON body.
	pub fn body(mut self, body: Value) -> Self {
		self.body = Some(body);
		self
	}

	/// Adds a header, replacing an earlier one of the same name.
	pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.headers.insert(name.into(), value.into());
		self
	}

	/// Sets the retry budget.
	pub fn tries(mut self, tries: u32) -> Self {
		self.tries = Some(tries);
		self
	}
}

/// A request ready to hand to a [`Transport`](crate::Transport).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
	/// Request method.
	pub method: Method,
	/// Target URL.
	pub url: String,
	/// Headers in sending order, names unique ignoring case.
	pub headers: Vec<(String, String)>,
	/// Serialized JSON body.
	pub body: Option<String>,
}

impl Request {
	/// Assembles the request for `url`.
	///
	/// Headers are `Content-Type: application/json`, then the settings'
	/// `call_headers`, then the config's headers; a later header replaces an
	/// earlier one with the same name. The body is serialized for every
	/// method except `GET`.
	///
	/// # Errors
	///
	/// Fails with [`Error::Http`] on a header name that is not an HTTP token
	/// or a header value holding a line break, and with
	/// [`Error::Serialization`] when the body cannot be serialized.
	pub fn build(url: &str, config: &CallConfig, settings: &Settings) -> Result<Self> {
		let mut headers: Vec<(String, String)> =
			vec![("Content-Type".to_string(), "application/json".to_string())];
		for (name, value) in settings.call_headers.iter().chain(config.headers.iter()) {
			validate_header(name, value)?;
			match headers
				.iter_mut()
				.find(|(existing, _)| existing.eq_ignore_ascii_case(name))
			{
				Some((_, current)) => *current = value.clone(),
				None => headers.push((name.clone(), value.clone())),
			}
		}

		let body = match (&config.method, &config.body) {
			(Method::Get, _) | (_, None) => None,
			(_, Some(body)) => Some(serde_json::to_string(body)?),
		};

		Ok(Self {
			method: config.method,
			url: url.to_string(),
			headers,
			body,
		})
	}

	/// Value of a header, matched ignoring case.
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers
			.iter()
			.find(|(existing, _)| existing.eq_ignore_ascii_case(name))
			.map(|(_, value)| value.as_str())
	}
}

fn is_token_char(c: char) -> bool {
	c.is_ascii_alphanumeric() || "!#$%&'*+-.^_`|~".contains(c)
}

fn validate_header(name: &str, value: &str) -> Result<()> {
	if name.is_empty() || !name.chars().all(is_token_char) {
		return Err(Error::Http(format!("invalid header name '{name}'")));
	}
	if value.contains(['\r', '\n']) {
		return Err(Error::Http(format!("invalid value for header '{name}'")));
	}
	Ok(())
}
