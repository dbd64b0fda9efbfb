//! Caller retry and state reporting, against a scripted transport and a
//! mock server.

#![cfg(not(target_arch = "wasm32"))]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use bunny_core::{Error, Result, Settings, configure};
use bunny_http::{CallConfig, CallState, Caller, Request, ReqwestTransport, Transport};
use futures::FutureExt;
use futures::future::LocalBoxFuture;
use rstest::rstest;
use serde_json::{Value, json};

/// Replays queued outcomes and records every request it receives.
#[derive(Clone, Default)]
struct ScriptedTransport {
	outcomes: Rc<RefCell<VecDeque<Result<Value>>>>,
	requests: Rc<RefCell<Vec<Request>>>,
}

impl ScriptedTransport {
	fn with(outcomes: Vec<Result<Value>>) -> Self {
		Self {
			outcomes: Rc::new(RefCell::new(outcomes.into())),
			requests: Rc::default(),
		}
	}
}

impl Transport for ScriptedTransport {
	fn send<'a>(&'a self, request: &'a Request) -> LocalBoxFuture<'a, Result<Value>> {
		self.requests.borrow_mut().push(request.clone());
		let outcome = self
			.outcomes
			.borrow_mut()
			.pop_front()
			.unwrap_or_else(|| Err(Error::Http("no scripted outcome".to_string())));
		async move { outcome }.boxed_local()
	}
}

fn recording(caller: &Caller) -> Rc<RefCell<Vec<CallState>>> {
	let states = Rc::new(RefCell::new(Vec::new()));
	let sink = states.clone();
	caller.on_call(move |state| sink.borrow_mut().push(state.clone()));
	states
}

fn failure(message: &str) -> Result<Value> {
	Err(Error::Http(message.to_string()))
}

#[tokio::test]
async fn test_success_reports_loading_then_ok() {
	let transport = ScriptedTransport::with(vec![Ok(json!({"users": []}))]);
	let caller = Caller::new(transport.clone());
	let states = recording(&caller);

	let value = caller.call("/api/users", CallConfig::get()).await.unwrap();

	assert_eq!(value, json!({"users": []}));
	assert_eq!(
		*states.borrow(),
		vec![CallState::Loading, CallState::Ok(json!({"users": []}))]
	);
	assert_eq!(transport.requests.borrow().len(), 1);
}

#[tokio::test]
async fn test_retries_until_success() {
	let transport = ScriptedTransport::with(vec![
		failure("offline"),
		failure("offline"),
		Ok(json!(42)),
	]);
	let caller = Caller::new(transport.clone());
	let states = recording(&caller);

	let value = caller.call("/api", CallConfig::get().tries(3)).await.unwrap();

	assert_eq!(value, json!(42));
	assert_eq!(
		*states.borrow(),
		vec![
			CallState::Loading,
			CallState::Loading,
			CallState::Loading,
			CallState::Ok(json!(42)),
		]
	);
}

#[rstest]
#[case(0, 1)]
#[case(1, 2)]
#[case(3, 4)]
#[tokio::test]
async fn test_exhausted_budget_reports_one_error(#[case] tries: u32, #[case] attempts: usize) {
	let transport = ScriptedTransport::with(Vec::new());
	let caller = Caller::new(transport.clone());
	let states = recording(&caller);

	let result = caller.call("/api", CallConfig::delete().tries(tries)).await;

	assert!(matches!(result, Err(Error::Http(_))));
	assert_eq!(transport.requests.borrow().len(), attempts);
	let states = states.borrow();
	assert_eq!(states.len(), attempts + 1);
	assert!(states[..attempts].iter().all(|state| *state == CallState::Loading));
	assert_eq!(
		states[attempts],
		CallState::Error("HTTP error: no scripted outcome".to_string())
	);
}

#[tokio::test]
async fn test_default_budget_comes_from_settings() {
	configure(
		Settings::default()
			.with_call_tries(1)
			.with_call_header("Authorization", "Bearer default"),
	);
	let transport = ScriptedTransport::with(vec![failure("first"), Ok(json!("second"))]);
	let caller = Caller::new(transport.clone());

	let value = caller.call("/api", CallConfig::get()).await.unwrap();

	assert_eq!(value, json!("second"));
	let requests = transport.requests.borrow();
	assert_eq!(requests.len(), 2);
	assert_eq!(requests[0].header("Authorization"), Some("Bearer default"));
}

#[tokio::test]
async fn test_call_without_handler_still_returns() {
	let caller = Caller::new(ScriptedTransport::with(vec![Ok(json!(true))]));
	assert_eq!(caller.call("/api", CallConfig::get()).await.unwrap(), json!(true));
}

#[tokio::test]
async fn test_handler_can_be_replaced_from_inside() {
	let caller = Rc::new(Caller::new(ScriptedTransport::with(vec![Ok(json!(1))])));
	let replaced = Rc::new(RefCell::new(false));
	let handle = caller.clone();
	let flag = replaced.clone();
	caller.on_call(move |_| {
		let flag = flag.clone();
		handle.on_call(move |_| *flag.borrow_mut() = true);
	});

	caller.call("/api", CallConfig::get()).await.unwrap();

	assert!(*replaced.borrow());
}

#[tokio::test]
async fn test_reqwest_caller_against_mock_server() {
	let mut server = mockito::Server::new_async().await;
	let failing = server
		.mock("PUT", "/items/1")
		.with_status(500)
		.with_body("<html>oops</html>")
		.expect(1)
		.create_async()
		.await;

	let caller = Caller::new(ReqwestTransport::new());
	let states = recording(&caller);
	let url = format!("{}/items/1", server.url());

	let result = caller
		.call(&url, CallConfig::put(json!({"done": true})))
		.await;

	assert!(result.is_err());
	failing.assert_async().await;
	assert_eq!(states.borrow().len(), 2);
	assert_eq!(states.borrow()[1].name(), "error");
}

#[tokio::test]
async fn test_unbuildable_request_reports_loading_then_error() {
	let transport = ScriptedTransport::with(vec![Ok(json!(1))]);
	let caller = Caller::new(transport.clone());
	let states = recording(&caller);

	let result = caller
		.call("/api", CallConfig::get().header("Bad Header", "x"))
		.await;

	assert!(matches!(result, Err(Error::Http(_))));
	let states = states.borrow();
	assert_eq!(states.len(), 2);
	assert_eq!(states[0], CallState::Loading);
	assert_eq!(states[1].name(), "error");
	assert!(transport.requests.borrow().is_empty());
}
