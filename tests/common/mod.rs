//! In-process backend shared by the integration tests.
//!
//! [`Backend`] answers like a token-protected API: calls whose bearer token differs from
//! the currently valid one get a 401, everything else gets the scripted route body.

#![allow(dead_code)]

// std
use std::{
	collections::{HashMap, HashSet},
	future,
	sync::Arc,
};
// crates.io
use parking_lot::{Mutex, RwLock};
use serde_json::{Value, json};
// self
use http_easy::{
	call::Call,
	failure::{CODE_NETWORK, Failure},
	http::{HeaderValue, header::AUTHORIZATION},
	payload::Payload,
	reply::Response,
	transport::{Transport, TransportFuture},
};

/// One observed dispatch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dispatch {
	pub target: String,
	pub replayed: bool,
	pub token: Option<String>,
	pub body: Option<Value>,
}

#[derive(Clone, Debug, Default)]
pub struct Backend(Arc<BackendState>);
impl Backend {
	pub fn new(valid_token: &str) -> Self {
		let backend = Self::default();

		*backend.0.valid_token.write() = valid_token.to_owned();

		backend
	}

	/// Serves `body` with a 200 for authorized calls to `target`.
	pub fn route(&self, target: &str, body: Value) {
		self.0.routes.lock().insert(target.to_owned(), (200, body));
	}

	/// Serves `status` and `body` for authorized calls to `target`.
	pub fn route_status(&self, target: &str, status: u16, body: Value) {
		self.0.routes.lock().insert(target.to_owned(), (status, body));
	}

	/// Rejects `target` with a 401 regardless of the token.
	pub fn always_reject(&self, target: &str) {
		self.0.rejected.lock().insert(target.to_owned());
	}

	pub fn valid_token(&self) -> String {
		self.0.valid_token.read().clone()
	}

	pub fn dispatched(&self) -> Vec<Dispatch> {
		self.0.dispatched.lock().clone()
	}

	pub fn replayed_targets(&self) -> Vec<String> {
		self.dispatched().into_iter().filter(|d| d.replayed).map(|d| d.target).collect()
	}

	fn answer(&self, call: Call) -> Result<Response, Failure> {
		let token = call
			.headers
			.get(AUTHORIZATION)
			.and_then(|value| value.to_str().ok())
			.and_then(|value| value.strip_prefix("Bearer "))
			.map(str::to_owned);

		self.0.dispatched.lock().push(Dispatch {
			target: call.target.clone(),
			replayed: call.is_replayed(),
			token: token.clone(),
			body: call.body.as_ref().map(Payload::to_json),
		});

		let authorized = token.as_deref() == Some(self.valid_token().as_str())
			&& !self.0.rejected.lock().contains(&call.target);

		if !authorized {
			return Err(Failure::status(Response::new(
				call,
				401,
				Some(json!({ "message": "token expired" })),
			)));
		}

		let route = self.0.routes.lock().get(&call.target).cloned();

		match route {
			Some((status, body)) => {
				let response = Response::new(call, status, Some(body));

				if response.is_success() { Ok(response) } else { Err(Failure::status(response)) }
			},
			None => Err(Failure::transport(Some(CODE_NETWORK), "Network Error").with_call(call)),
		}
	}
}
impl Transport for Backend {
	fn send(&self, call: Call) -> TransportFuture {
		Box::pin(future::ready(self.answer(call)))
	}
}

#[derive(Debug, Default)]
pub struct BackendState {
	valid_token: RwLock<String>,
	routes: Mutex<HashMap<String, (u16, Value)>>,
	rejected: Mutex<HashSet<String>>,
	dispatched: Mutex<Vec<Dispatch>>,
}

/// Client-side token store; [`Credentials::attach`] is installed as a request interceptor.
#[derive(Clone, Debug)]
pub struct Credentials(Arc<RwLock<String>>);
impl Credentials {
	pub fn new(token: &str) -> Self {
		Self(Arc::new(RwLock::new(token.to_owned())))
	}

	pub fn set(&self, token: &str) {
		*self.0.write() = token.to_owned();
	}

	pub fn get(&self) -> String {
		self.0.read().clone()
	}

	pub fn attach(&self) -> impl 'static + Send + Sync + Fn(Call) -> Result<Call, Failure> {
		let token = Arc::clone(&self.0);

		move |call| {
			let value = HeaderValue::from_str(&format!("Bearer {}", token.read()))
				.map_err(|e| Failure::internal("invalid token").with_source(e))?;

			Ok(call.with_header(AUTHORIZATION, value))
		}
	}
}
