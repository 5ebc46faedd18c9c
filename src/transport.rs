//! Transport primitives the client pipeline dispatches calls through.
//!
//! [`Transport`] is the pipeline's only dependency on an HTTP stack. Implementations
//! turn a fully prepared [`Call`] into a [`Response`] for 2xx statuses and reject with a
//! [`Failure`] otherwise, attaching the originating call so downstream interceptors can
//! attribute and replay it. The `reqwest` feature ships [`ReqwestTransport`].

#[cfg(feature = "reqwest")] mod reqwest_transport;
#[cfg(feature = "reqwest")] pub use reqwest_transport::*;

// self
use crate::{_prelude::*, call::Call, failure::Failure, reply::Response};

/// Boxed future returned by [`Transport::send`].
pub type TransportFuture = Pin<Box<dyn Future<Output = Result<Response, Failure>> + Send>>;

/// Executes calls against a backend.
///
/// `send` is invoked synchronously at dispatch time, in dispatch order, and the returned
/// future owns everything it needs so it can be awaited by a different task than the
/// one that dispatched it.
pub trait Transport
where
	Self: 'static + Send + Sync,
{
	/// Starts executing `call`.
	///
	/// # Outcome Contract
	///
	/// - Resolve with a [`Response`] for 2xx statuses.
	/// - Reject with [`Failure::status`] for any other status, keeping the envelope.
	/// - Reject with [`Failure::transport`] when no response was received, using
	///   [`CODE_TIMED_OUT`](crate::failure::CODE_TIMED_OUT) or
	///   [`CODE_NETWORK`](crate::failure::CODE_NETWORK) when the cause is known.
	/// - Always attach `call` to the outcome.
	fn send(&self, call: Call) -> TransportFuture;
}
impl<T> Transport for Arc<T>
where
	T: ?Sized + Transport,
{
	fn send(&self, call: Call) -> TransportFuture {
		(**self).send(call)
	}
}
