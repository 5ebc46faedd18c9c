// self
use crate::{_prelude::*, obs::InterceptorKind};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedStage<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedStage<F> = F;

/// A span builder used by interceptor stages.
#[derive(Clone, Debug)]
pub struct InterceptorSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl InterceptorSpan {
	/// Creates a new span tagged with the provided interceptor + stage.
	pub fn new(kind: InterceptorKind, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("http_easy.interceptor", interceptor = kind.as_str(), stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, stage);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedStage<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Emits a warn event for a failed interceptor hook (when tracing is enabled).
pub fn warn_hook_failure(kind: InterceptorKind, hook: &'static str, error: &dyn StdError) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(interceptor = kind.as_str(), hook, error = %error, "interceptor hook failed");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (kind, hook, error);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn warn_hook_failure_accepts_any_error() {
		warn_hook_failure(
			InterceptorKind::Authenticate,
			"refresh",
			&std::io::Error::other("refresh endpoint unreachable"),
		);
	}

	#[tokio::test]
	async fn instrument_wraps_future() {
		let span = InterceptorSpan::new(InterceptorKind::Authenticate, "instrument_wraps_future");
		let value = span.instrument(async { 42 }).await;

		assert_eq!(value, 42);
	}
}
