//! Optional observability helpers for the interceptor pipeline.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `http_easy.interceptor` with the
//!   `interceptor` and `stage` fields, plus warn events when a token refresh or a
//!   re-authenticate hook fails.
//! - Enable `metrics` to increment the `http_easy_interceptor_total` counter for every
//!   recorded outcome, labeled by `interceptor` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Built-in interceptors observed by the pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InterceptorKind {
	/// Request payload normalizer.
	Normalize,
	/// Response envelope unwrapper.
	Unwrap,
	/// Token refresh coordinator.
	Authenticate,
	/// Error presenter.
	ErrorMessage,
}
impl InterceptorKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			InterceptorKind::Normalize => "normalize",
			InterceptorKind::Unwrap => "unwrap",
			InterceptorKind::Authenticate => "authenticate",
			InterceptorKind::ErrorMessage => "error_message",
		}
	}
}
impl Display for InterceptorKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded by interceptors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InterceptorOutcome {
	/// A refresh (or other unit of work) started.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
	/// A call was parked behind an in-flight refresh.
	Queued,
	/// A call was resubmitted after a refresh.
	Replay,
	/// The re-authenticate hook was invoked.
	ReAuthenticate,
	/// An error was handed to the presentation callback.
	Presented,
}
impl InterceptorOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			InterceptorOutcome::Attempt => "attempt",
			InterceptorOutcome::Success => "success",
			InterceptorOutcome::Failure => "failure",
			InterceptorOutcome::Queued => "queued",
			InterceptorOutcome::Replay => "replay",
			InterceptorOutcome::ReAuthenticate => "re_authenticate",
			InterceptorOutcome::Presented => "presented",
		}
	}
}
impl Display for InterceptorOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
