// self
use crate::obs::{InterceptorKind, InterceptorOutcome};

/// Records an interceptor outcome via the global metrics recorder (when enabled).
pub fn record_interceptor_outcome(kind: InterceptorKind, outcome: InterceptorOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"http_easy_interceptor_total",
			"interceptor" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}
