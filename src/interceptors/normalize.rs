//! Request-phase payload normalizer.

// self
use crate::{
	_prelude::*,
	call::Call,
	failure::Failure,
	interceptors::RequestInterceptor,
	obs::{self, InterceptorKind, InterceptorOutcome},
	payload::{NormalizeOptions, normalize_with},
};

/// Normalizes call bodies and queries before they reach the transport.
///
/// The interceptor defaults are merged field-by-field with each call's
/// [`CallOptions::normalize_payload`](crate::call::CallOptions::normalize_payload), the call
/// winning. Unset fields resolve to off, `trim` included. A call is left untouched when
/// neither side supplies options.
#[derive(Clone, Debug, Default)]
pub struct NormalizeInterceptor {
	defaults: Option<NormalizeOptions>,
}
impl NormalizeInterceptor {
	/// Creates an interceptor with `defaults` applied to every call.
	pub fn new(defaults: NormalizeOptions) -> Self {
		Self { defaults: Some(defaults) }
	}

	/// Creates an interceptor that only acts on calls carrying their own options.
	pub fn per_call() -> Self {
		Self::default()
	}
}
impl RequestInterceptor for NormalizeInterceptor {
	fn on_request(&self, mut call: Call) -> Result<Call, Failure> {
		let overrides = call.options.normalize_payload;

		if self.defaults.is_none() && overrides.is_none() {
			return Ok(call);
		}

		let settings =
			self.defaults.unwrap_or_default().merge(overrides.unwrap_or_default()).resolve(false);

		call.body = call.body.map(|body| normalize_with(body, settings));
		call.query = call.query.map(|query| normalize_with(query, settings));

		obs::record_interceptor_outcome(InterceptorKind::Normalize, InterceptorOutcome::Success);

		Ok(call)
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	// self
	use super::*;
	use crate::payload::Payload;

	fn payload(value: Value) -> Payload {
		Payload::from(value)
	}

	#[test]
	fn untouched_without_any_options() {
		let call = Call::post("/users").with_body(payload(json!({ "name": "  neo  " })));
		let out = NormalizeInterceptor::per_call()
			.on_request(call.clone())
			.expect("Normalization never rejects.");

		assert_eq!(out, call);
	}

	#[test]
	fn trim_defaults_to_off_when_wired_as_interceptor() {
		let call = Call::post("/users").with_body(payload(json!({ "name": "  ", "nick": " x " })));
		let out = NormalizeInterceptor::new(NormalizeOptions::default().with_empty_to_null(true))
			.on_request(call)
			.expect("Normalization never rejects.");

		assert_eq!(out.body, Some(payload(json!({ "name": "  ", "nick": " x " }))));
	}

	#[test]
	fn call_overrides_win_field_by_field() {
		let body: Payload = [("name", Payload::from("  ")), ("gone", Payload::Absent)]
			.into_iter()
			.collect();
		let call = Call::post("/users")
			.with_body(body)
			.with_query(payload(json!({ "q": " term " })))
			.with_normalize(NormalizeOptions::default().with_trim(true));
		let out = NormalizeInterceptor::new(
			NormalizeOptions::default().with_drop_absent(true).with_empty_to_null(true),
		)
		.on_request(call)
		.expect("Normalization never rejects.");

		assert_eq!(out.body, Some(payload(json!({ "name": null }))));
		assert_eq!(out.query, Some(payload(json!({ "q": "term" }))));
	}
}
