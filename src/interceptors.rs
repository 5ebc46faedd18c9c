//! Interceptor contracts and the built-in interceptors.
//!
//! Request interceptors run synchronously, in registration order, before the call is
//! handed to the transport. Response interceptors form a chain with promise-style
//! `then(on_success, on_failure)` semantics: each stage receives whatever the previous
//! stage produced, success or failure, and may pass it on, transform it, or replace a
//! failure with a success (which is how the authenticate interceptor substitutes a
//! replayed result).

pub mod authenticate;
pub mod error_message;
pub mod normalize;
pub mod unwrap;

pub use authenticate::*;
pub use error_message::*;
pub use normalize::*;
pub use unwrap::*;

// std
use std::future;
// self
use crate::{
	_prelude::*,
	call::Call,
	client::Client,
	failure::Failure,
	reply::Reply,
};

/// Result of a call as it moves through the response chain.
pub type Outcome = Result<Reply, Failure>;

/// Boxed future produced by response stages and by [`Client::dispatch`].
pub type OutcomeFuture = Pin<Box<dyn Future<Output = Outcome> + Send>>;

/// Handle returned when an interceptor is installed; used to eject it later.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InterceptorId(pub(crate) u64);
impl Display for InterceptorId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "interceptor#{}", self.0)
	}
}

/// Hook that rewrites or rejects a call before it reaches the transport.
pub trait RequestInterceptor
where
	Self: 'static + Send + Sync,
{
	/// Returns the (possibly rewritten) call, or a failure that skips the transport and
	/// enters the response chain as a rejection.
	fn on_request(&self, call: Call) -> Result<Call, Failure>;
}

/// Stage of the response chain.
///
/// Both hooks default to passing their input through, so implementors override only the
/// side they care about. The [`Client`] handle lets a stage resubmit calls through the
/// same pipeline.
pub trait ResponseInterceptor
where
	Self: 'static + Send + Sync,
{
	/// Handles a successful outcome.
	fn on_success(&self, reply: Reply, client: &Client) -> OutcomeFuture {
		let _ = client;

		Box::pin(future::ready(Ok(reply)))
	}

	/// Handles a failed outcome.
	fn on_failure(&self, failure: Failure, client: &Client) -> OutcomeFuture {
		let _ = client;

		Box::pin(future::ready(Err(failure)))
	}
}

impl<F> RequestInterceptor for F
where
	F: 'static + Send + Sync + Fn(Call) -> Result<Call, Failure>,
{
	fn on_request(&self, call: Call) -> Result<Call, Failure> {
		self(call)
	}
}
