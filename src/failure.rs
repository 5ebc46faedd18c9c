//! Failure outcomes flowing through the response pipeline.
//!
//! A [`Failure`] is what transports reject with and what response interceptors receive,
//! transform, or replace. It carries the originating [`Call`] when one is known, the
//! response envelope for HTTP-level failures, and an optional source error.

// self
use crate::{
	_prelude::*,
	call::Call,
	error::BoxError,
	reply::Response,
};

/// Transport code for requests aborted by a client-side deadline.
pub const CODE_ABORTED: &str = "ECONNABORTED";
/// Transport code for requests that timed out.
pub const CODE_TIMED_OUT: &str = "ETIMEDOUT";
/// Transport code for connectivity failures.
pub const CODE_NETWORK: &str = "ERR_NETWORK";

/// Why a call was cancelled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CancelReason {
	/// Cancelled by the caller or by an interceptor.
	Aborted,
	/// The token refresh this call was waiting on (or triggered) failed.
	RefreshFailed,
	/// The refresh this call was waiting on was dropped before it settled.
	RefreshAbandoned,
}
impl CancelReason {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Aborted => "aborted",
			Self::RefreshFailed => "request canceled due to refresh token failure",
			Self::RefreshAbandoned => "request canceled because the token refresh was abandoned",
		}
	}
}
impl Display for CancelReason {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Failure categories.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum FailureKind {
	/// The server answered with a non-2xx status.
	#[error("Request failed with status code {status}.")]
	Status {
		/// HTTP status code.
		status: u16,
	},
	/// The exchange failed below HTTP (DNS, TCP, TLS, deadline).
	#[error("Transport failure: {message}.")]
	Transport {
		/// Transport error code such as [`CODE_TIMED_OUT`] or [`CODE_NETWORK`].
		code: Option<String>,
		/// Human-readable transport message.
		message: String,
	},
	/// The response envelope reported an unsuccessful result code.
	#[error("Response envelope reported an unsuccessful result code.")]
	Business,
	/// The call was cancelled.
	#[error("Call was cancelled: {0}.")]
	Cancelled(CancelReason),
	/// A success predicate or data extractor failed.
	#[error("Response could not be unwrapped.")]
	Unwrap,
	/// The re-authenticate hook failed.
	#[error("Re-authentication hook failed.")]
	ReAuthenticate,
	/// Any other failure raised inside the pipeline.
	#[error("{message}")]
	Internal {
		/// Human-readable message.
		message: String,
	},
}

/// Rejected outcome of a call.
#[derive(Debug, ThisError)]
#[error("{kind}")]
pub struct Failure {
	kind: FailureKind,
	call: Option<Box<Call>>,
	response: Option<Box<Response>>,
	#[source]
	source: Option<BoxError>,
}
impl Failure {
	/// Creates a failure of `kind` with no call, response, or source attached.
	pub fn new(kind: FailureKind) -> Self {
		Self { kind, call: None, response: None, source: None }
	}

	/// HTTP-level failure built from a non-2xx response.
	pub fn status(response: Response) -> Self {
		let kind = FailureKind::Status { status: response.status };

		Self::new(kind).with_call(response.call.clone()).with_response(response)
	}

	/// Transport-level failure.
	pub fn transport(code: Option<&str>, message: impl Into<String>) -> Self {
		Self::new(FailureKind::Transport { code: code.map(str::to_owned), message: message.into() })
	}

	/// Business failure carrying the full response envelope.
	pub fn business(response: Response) -> Self {
		Self::new(FailureKind::Business).with_call(response.call.clone()).with_response(response)
	}

	/// Cancellation with the given reason.
	pub fn cancelled(reason: CancelReason) -> Self {
		Self::new(FailureKind::Cancelled(reason))
	}

	/// Internal pipeline failure.
	pub fn internal(message: impl Into<String>) -> Self {
		Self::new(FailureKind::Internal { message: message.into() })
	}

	/// Attaches the originating call.
	pub fn with_call(mut self, call: Call) -> Self {
		self.call = Some(Box::new(call));

		self
	}

	/// Attaches the response envelope.
	pub fn with_response(mut self, response: Response) -> Self {
		self.response = Some(Box::new(response));

		self
	}

	/// Attaches a source error.
	pub fn with_source(mut self, source: impl Into<BoxError>) -> Self {
		self.source = Some(source.into());

		self
	}

	/// Failure category.
	pub fn kind(&self) -> &FailureKind {
		&self.kind
	}

	/// Originating call, if the failure is attributable.
	pub fn call(&self) -> Option<&Call> {
		self.call.as_deref()
	}

	/// Response envelope, if the server answered.
	pub fn response(&self) -> Option<&Response> {
		self.response.as_deref()
	}

	/// HTTP status of the response, if any.
	pub fn http_status(&self) -> Option<u16> {
		match (&self.kind, self.response.as_deref()) {
			(_, Some(response)) => Some(response.status),
			(FailureKind::Status { status }, None) => Some(*status),
			_ => None,
		}
	}

	/// Transport code, for transport-level failures.
	pub fn code(&self) -> Option<&str> {
		match &self.kind {
			FailureKind::Transport { code, .. } => code.as_deref(),
			_ => None,
		}
	}

	/// Returns `true` for cancellations of any reason.
	pub fn is_cancelled(&self) -> bool {
		matches!(self.kind, FailureKind::Cancelled(_))
	}

	/// Returns the cancellation reason, if this is a cancellation.
	pub fn cancel_reason(&self) -> Option<CancelReason> {
		match self.kind {
			FailureKind::Cancelled(reason) => Some(reason),
			_ => None,
		}
	}

	/// Consumes the failure, returning the originating call.
	pub fn into_call(self) -> Option<Call> {
		self.call.map(|call| *call)
	}
}
