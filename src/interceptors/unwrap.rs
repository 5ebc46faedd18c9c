//! Response Unwrapper: turns backend envelopes into a single success/failure contract.
//!
//! Many backends answer `200 OK` and report the business result inside the body, e.g.
//! `{ "code": 0, "data": { .. } }`. The unwrapper reads the result code, rejects
//! unsuccessful envelopes (when configured to), and returns as much of the response as
//! the call's [`ResponseReturn`] asks for.

// std
use std::future;
// self
use crate::{
	_prelude::*,
	call::ResponseReturn,
	client::Client,
	error::BoxError,
	failure::{Failure, FailureKind},
	interceptors::{Outcome, OutcomeFuture, ResponseInterceptor},
	obs::{self, InterceptorKind, InterceptorOutcome},
	reply::{Reply, Response},
};

type Accessor = Arc<dyn Fn(&Value) -> Option<Value> + Send + Sync>;
type Extractor = Arc<dyn Fn(&Value) -> Result<Value, BoxError> + Send + Sync>;
type Predicate = Arc<dyn Fn(Option<&Value>) -> Result<bool, BoxError> + Send + Sync>;

/// Where the result code lives in the body.
#[derive(Clone)]
pub enum CodeField {
	/// Top-level field name.
	Name(String),
	/// Custom accessor.
	Accessor(Accessor),
}
impl CodeField {
	/// Reads the code through a custom accessor.
	pub fn accessor<F>(f: F) -> Self
	where
		F: 'static + Send + Sync + Fn(&Value) -> Option<Value>,
	{
		Self::Accessor(Arc::new(f))
	}

	fn read(&self, body: &Value) -> Option<Value> {
		match self {
			Self::Name(name) => body.get(name).cloned(),
			Self::Accessor(f) => f(body),
		}
	}
}
impl Debug for CodeField {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::Name(name) => f.debug_tuple("Name").field(name).finish(),
			Self::Accessor(_) => f.write_str("Accessor(..)"),
		}
	}
}

/// Where the payload lives in the body, for [`ResponseReturn::Data`].
#[derive(Clone)]
pub enum DataField {
	/// Top-level field name; a missing field yields an absent payload.
	Name(String),
	/// Custom extractor; errors reject the call.
	Extractor(Extractor),
}
impl DataField {
	/// Extracts the payload with an infallible function.
	pub fn extractor<F>(f: F) -> Self
	where
		F: 'static + Send + Sync + Fn(&Value) -> Value,
	{
		Self::Extractor(Arc::new(move |body: &Value| -> Result<Value, BoxError> {
			Ok(f(body))
		}))
	}

	/// Extracts the payload with a fallible function.
	pub fn try_extractor<F, E>(f: F) -> Self
	where
		F: 'static + Send + Sync + Fn(&Value) -> Result<Value, E>,
		E: Into<BoxError>,
	{
		Self::Extractor(Arc::new(move |body: &Value| -> Result<Value, BoxError> {
			f(body).map_err(Into::into)
		}))
	}
}
impl Debug for DataField {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::Name(name) => f.debug_tuple("Name").field(name).finish(),
			Self::Extractor(_) => f.write_str("Extractor(..)"),
		}
	}
}

/// How a result code is judged successful.
#[derive(Clone)]
pub enum SuccessCode {
	/// The code must equal this value.
	Equals(Value),
	/// Custom predicate over the code (`None` when the field is missing).
	Predicate(Predicate),
}
impl SuccessCode {
	/// Judges the code with an infallible predicate.
	pub fn predicate<F>(f: F) -> Self
	where
		F: 'static + Send + Sync + Fn(Option<&Value>) -> bool,
	{
		Self::Predicate(Arc::new(move |code: Option<&Value>| -> Result<bool, BoxError> {
			Ok(f(code))
		}))
	}

	/// Judges the code with a fallible predicate.
	pub fn try_predicate<F, E>(f: F) -> Self
	where
		F: 'static + Send + Sync + Fn(Option<&Value>) -> Result<bool, E>,
		E: Into<BoxError>,
	{
		Self::Predicate(Arc::new(move |code: Option<&Value>| -> Result<bool, BoxError> {
			f(code).map_err(Into::into)
		}))
	}

	fn check(&self, code: Option<&Value>) -> Result<bool, BoxError> {
		match self {
			Self::Equals(expected) => Ok(code == Some(expected)),
			Self::Predicate(f) => f(code),
		}
	}
}
impl Debug for SuccessCode {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::Equals(value) => f.debug_tuple("Equals").field(value).finish(),
			Self::Predicate(_) => f.write_str("Predicate(..)"),
		}
	}
}

/// Unwrapper policy.
#[derive(Clone, Debug)]
pub struct UnwrapOptions {
	/// Result code location; defaults to the `code` field.
	pub code_field: CodeField,
	/// Payload location; defaults to the `data` field.
	pub data_field: DataField,
	/// Success rule; defaults to `code == 0`.
	pub success_code: SuccessCode,
	/// Reject unsuccessful envelopes; defaults to `true`.
	pub throw_on_failure: bool,
}
impl UnwrapOptions {
	/// Sets the result code location.
	pub fn with_code_field(mut self, code_field: CodeField) -> Self {
		self.code_field = code_field;

		self
	}

	/// Sets the payload location.
	pub fn with_data_field(mut self, data_field: DataField) -> Self {
		self.data_field = data_field;

		self
	}

	/// Sets the success rule.
	pub fn with_success_code(mut self, success_code: SuccessCode) -> Self {
		self.success_code = success_code;

		self
	}

	/// Sets whether unsuccessful envelopes are rejected.
	pub fn with_throw_on_failure(mut self, throw_on_failure: bool) -> Self {
		self.throw_on_failure = throw_on_failure;

		self
	}
}
impl Default for UnwrapOptions {
	fn default() -> Self {
		UnwrapConfig::default().into()
	}
}
impl From<UnwrapConfig> for UnwrapOptions {
	fn from(config: UnwrapConfig) -> Self {
		Self {
			code_field: CodeField::Name(config.code_field),
			data_field: DataField::Name(config.data_field),
			success_code: SuccessCode::Equals(config.success_code),
			throw_on_failure: config.throw_on_failure,
		}
	}
}

/// Declarative unwrapper settings (field names and an exact success code).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UnwrapConfig {
	/// Result code field name.
	pub code_field: String,
	/// Payload field name.
	pub data_field: String,
	/// Successful result code.
	pub success_code: Value,
	/// Reject unsuccessful envelopes.
	pub throw_on_failure: bool,
}
impl Default for UnwrapConfig {
	fn default() -> Self {
		Self {
			code_field: "code".into(),
			data_field: "data".into(),
			success_code: Value::from(0),
			throw_on_failure: true,
		}
	}
}

/// Unwraps `response` according to its call's [`ResponseReturn`] and `options`.
///
/// - `raw` returns the envelope without any check.
/// - A missing body yields an absent payload without any check.
/// - An unsuccessful code rejects with [`FailureKind::Business`] (carrying the envelope)
///   when `throw_on_failure` is set; otherwise extraction proceeds.
/// - `body` returns the body; the data extractor is never invoked.
/// - `data` returns the extracted payload.
///
/// Predicate and extractor errors reject with [`FailureKind::Unwrap`].
pub fn unwrap(response: Response, options: &UnwrapOptions) -> Outcome {
	let mode = response.call.options.response_return.unwrap_or_default();

	if mode == ResponseReturn::Raw {
		return Ok(Reply::from(response));
	}

	let Some(body) = response.body.as_ref() else {
		return Ok(Reply::Payload(None));
	};
	let code = options.code_field.read(body);
	let success = match options.success_code.check(code.as_ref()) {
		Ok(success) => success,
		Err(e) => return Err(unwrap_failure(response, e)),
	};

	if !success && options.throw_on_failure {
		return Err(Failure::business(response));
	}

	match (mode, &options.data_field) {
		(ResponseReturn::Data, DataField::Name(name)) =>
			Ok(Reply::Payload(body.get(name).cloned())),
		(ResponseReturn::Data, DataField::Extractor(f)) => match f(body) {
			Ok(data) => Ok(Reply::Payload(Some(data))),
			Err(e) => Err(unwrap_failure(response, e)),
		},
		_ => Ok(Reply::Payload(response.body)),
	}
}

fn unwrap_failure(response: Response, source: BoxError) -> Failure {
	Failure::new(FailureKind::Unwrap)
		.with_call(response.call.clone())
		.with_response(response)
		.with_source(source)
}

/// Response stage running [`unwrap`] on every envelope; already unwrapped replies and
/// failures pass through.
#[derive(Clone, Debug, Default)]
pub struct UnwrapInterceptor {
	options: UnwrapOptions,
}
impl UnwrapInterceptor {
	/// Creates the stage.
	pub fn new(options: UnwrapOptions) -> Self {
		Self { options }
	}
}
impl ResponseInterceptor for UnwrapInterceptor {
	fn on_success(&self, reply: Reply, _client: &Client) -> OutcomeFuture {
		let outcome = match reply {
			Reply::Response(response) => {
				let outcome = unwrap(*response, &self.options);
				let label = if outcome.is_ok() {
					InterceptorOutcome::Success
				} else {
					InterceptorOutcome::Failure
				};

				obs::record_interceptor_outcome(InterceptorKind::Unwrap, label);

				outcome
			},
			other => Ok(other),
		};

		Box::pin(future::ready(outcome))
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	// self
	use super::*;
	use crate::call::Call;

	fn response(mode: ResponseReturn, body: Option<Value>) -> Response {
		Response::new(Call::get("/items").with_response_return(mode), 200, body)
	}

	#[test]
	fn raw_skips_success_check() {
		let envelope = response(ResponseReturn::Raw, Some(json!({ "code": 1 })));
		let reply = unwrap(envelope.clone(), &UnwrapOptions::default())
			.expect("Raw mode never rejects.");

		assert_eq!(reply.as_response(), Some(&envelope));
	}

	#[test]
	fn missing_body_is_returned_as_absent() {
		let reply = unwrap(response(ResponseReturn::Data, None), &UnwrapOptions::default())
			.expect("Empty bodies never reject.");

		assert_eq!(reply, Reply::Payload(None));
	}

	#[test]
	fn business_failure_carries_envelope() {
		let failure = unwrap(
			response(ResponseReturn::Body, Some(json!({ "code": 500, "message": "busy" }))),
			&UnwrapOptions::default(),
		)
		.expect_err("Non-zero codes should reject.");

		assert_eq!(failure.kind(), &FailureKind::Business);
		assert_eq!(
			failure.response().and_then(|r| r.body.clone()),
			Some(json!({ "code": 500, "message": "busy" }))
		);
	}

	#[test]
	fn data_mode_extracts_named_field() {
		let options = UnwrapConfig {
			code_field: "resultCode".into(),
			data_field: "list".into(),
			success_code: json!("SUCCESS"),
			..UnwrapConfig::default()
		};
		let reply = unwrap(
			response(ResponseReturn::Data, Some(json!({ "resultCode": "SUCCESS", "list": [1, 2] }))),
			&options.into(),
		)
		.expect("Successful envelopes should unwrap.");

		assert_eq!(reply.into_value(), json!([1, 2]));
	}

	#[test]
	fn unsuccessful_envelope_falls_through_when_not_throwing() {
		let options = UnwrapOptions::default().with_throw_on_failure(false);
		let reply = unwrap(response(ResponseReturn::Data, Some(json!({ "code": 7 }))), &options)
			.expect("Non-throwing unwrap should not reject.");

		assert_eq!(reply, Reply::Payload(None));
	}

	#[test]
	fn body_mode_never_invokes_extractor() {
		let options = UnwrapOptions::default()
			.with_throw_on_failure(false)
			.with_data_field(DataField::extractor(|_| panic!("Extractor must not run in body mode.")));
		let reply = unwrap(response(ResponseReturn::Body, Some(json!({ "code": 3 }))), &options)
			.expect("Body mode should return the body.");

		assert_eq!(reply.into_value(), json!({ "code": 3 }));
	}

	#[test]
	fn extractor_errors_reject() {
		let options = UnwrapOptions::default().with_data_field(DataField::try_extractor(|_| {
			Err::<Value, _>(std::io::Error::other("malformed page"))
		}));
		let failure = unwrap(response(ResponseReturn::Data, Some(json!({ "code": 0 }))), &options)
			.expect_err("Extractor errors should reject.");

		assert_eq!(failure.kind(), &FailureKind::Unwrap);
		assert_eq!(
			StdError::source(&failure).map(ToString::to_string),
			Some("malformed page".to_owned())
		);
	}

	#[test]
	fn predicate_decides_success() {
		let options = UnwrapOptions::default()
			.with_code_field(CodeField::accessor(|body| body.pointer("/meta/status").cloned()))
			.with_success_code(SuccessCode::predicate(|code| {
				code.and_then(Value::as_str).is_some_and(|s| s.starts_with("OK"))
			}));
		let ok = unwrap(
			response(ResponseReturn::Data, Some(json!({ "meta": { "status": "OK_CACHED" }, "data": 1 }))),
			&options,
		)
		.expect("Predicate should accept.");

		assert_eq!(ok.into_value(), json!(1));
		assert!(
			unwrap(response(ResponseReturn::Data, Some(json!({ "meta": {} }))), &options).is_err()
		);
	}
}
