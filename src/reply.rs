//! Response envelopes and the success values flowing through the response pipeline.

// crates.io
use http::HeaderMap;
// self
use crate::{_prelude::*, call::Call};

/// Completed HTTP exchange as seen by response interceptors.
#[derive(Clone, Debug, PartialEq)]
pub struct Response {
	/// Call that produced this response.
	pub call: Call,
	/// HTTP status code.
	pub status: u16,
	/// Response headers.
	pub headers: HeaderMap,
	/// Decoded body; `None` for empty (no-content) responses.
	pub body: Option<Value>,
}
impl Response {
	/// Creates a response with no headers.
	pub fn new(call: Call, status: u16, body: Option<Value>) -> Self {
		Self { call, status, headers: HeaderMap::new(), body }
	}

	/// Returns `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}
}

/// Success value produced by a call.
#[derive(Clone, Debug, PartialEq)]
pub enum Reply {
	/// The untouched envelope (transport output or `raw` unwrap mode).
	Response(Box<Response>),
	/// An unwrapped body or data field; `None` when the value is absent.
	Payload(Option<Value>),
}
impl Reply {
	/// Returns the envelope, if the reply has not been unwrapped.
	pub fn as_response(&self) -> Option<&Response> {
		match self {
			Self::Response(response) => Some(response),
			Self::Payload(_) => None,
		}
	}

	/// Returns the unwrapped value, if any.
	pub fn as_payload(&self) -> Option<&Value> {
		match self {
			Self::Payload(value) => value.as_ref(),
			Self::Response(_) => None,
		}
	}

	/// Converts into a JSON value: envelopes yield their body, absent values yield `null`.
	pub fn into_value(self) -> Value {
		match self {
			Self::Response(response) => response.body.unwrap_or(Value::Null),
			Self::Payload(value) => value.unwrap_or(Value::Null),
		}
	}
}
impl From<Response> for Reply {
	fn from(response: Response) -> Self {
		Self::Response(Box::new(response))
	}
}
