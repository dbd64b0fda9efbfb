//! Transport seam between the caller and the network.

use bunny_core::{Error, Result};
use futures::FutureExt;
use futures::future::LocalBoxFuture;
use serde_json::Value;

use crate::config::Request;

/// Sends a request and parses the response body as JSON.
///
/// Futures are not `Send`; calls run on the single-threaded executor of the
/// page (or of a test).
pub trait Transport {
	/// Performs one attempt.
	fn send<'a>(&'a self, request: &'a Request) -> LocalBoxFuture<'a, Result<Value>>;
}

/// [`Transport`] backed by `reqwest` (`fetch` on WASM).
///
/// The status code is not inspected: any response whose body parses as JSON
/// counts as a success.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
	client: reqwest::Client,
}

impl ReqwestTransport {
	/// Transport with a default client.
	pub fn new() -> Self {
		Self::default()
	}

	/// Transport over a preconfigured client.
	pub fn with_client(client: reqwest::Client) -> Self {
		Self { client }
	}

	async fn execute(&self, request: &Request) -> Result<Value> {
		let mut builder = self
			.client
			.request(request.method.into(), &request.url);
		for (name, value) in &request.headers {
			builder = builder.header(name.as_str(), value.as_str());
		}
		if let Some(body) = &request.body {
			builder = builder.body(body.clone());
		}

		let response = builder
			.send()
			.await
			.map_err(|e| Error::Http(format!("Request failed: {}", e)))?;

		response
			.json::<Value>()
			.await
			.map_err(|e| Error::Http(format!("Failed to parse response: {}", e)))
	}
}

impl Transport for ReqwestTransport {
	fn send<'a>(&'a self, request: &'a Request) -> LocalBoxFuture<'a, Result<Value>> {
		self.execute(request).boxed_local()
	}
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
	use super::*;
	use crate::config::{CallConfig, Method};
	use bunny_core::Settings;
	use serde_json::json;

	#[tokio::test]
	async fn test_reqwest_transport_sends_json() {
		let mut server = mockito::Server::new_async().await;
		let mock = server
			.mock("POST", "/users")
			.match_header("content-type", "application/json")
			.match_header("x-app", "bunny")
			.match_body(mockito::Matcher::Json(json!({"name": "bunny"})))
			.with_status(201)
			.with_header("content-type", "application/json")
			.with_body(r#"{"id":1}"#)
			.expect(1)
			.create_async()
			.await;

		let config = CallConfig::post(json!({"name": "bunny"})).header("X-App", "bunny");
		let url = format!("{}/users", server.url());
		let request = Request::build(&url, &config, &Settings::default()).unwrap();

		let value = ReqwestTransport::new().send(&request).await.unwrap();

		assert_eq!(value, json!({"id": 1}));
		mock.assert_async().await;
	}

	#[tokio::test]
	async fn test_error_status_with_json_body_is_a_success() {
		let mut server = mockito::Server::new_async().await;
		let _mock = server
			.mock("GET", "/missing")
			.with_status(404)
			.with_body(r#"{"error":"not found"}"#)
			.create_async()
			.await;

		let request = Request {
			method: Method::Get,
			url: format!("{}/missing", server.url()),
			headers: Vec::new(),
			body: None,
		};

		let value = ReqwestTransport::new().send(&request).await.unwrap();
		assert_eq!(value, json!({"error": "not found"}));
	}

	#[tokio::test]
	async fn test_non_json_body_fails() {
		let mut server = mockito::Server::new_async().await;
		let _mock = server
			.mock("GET", "/text")
			.with_status(200)
			.with_body("plain text")
			.create_async()
			.await;

		let request = Request::build(
			&format!("{}/text", server.url()),
			&CallConfig::get(),
			&Settings::default(),
		)
		.unwrap();

		let result = ReqwestTransport::new().send(&request).await;
		assert!(matches!(result, Err(Error::Http(message)) if message.contains("parse")));
	}
}
