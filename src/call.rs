//! Outbound call descriptors and per-call overrides.

// std
use std::time::Duration as StdDuration;
// crates.io
use http::{
	HeaderMap, Method,
	header::{HeaderName, HeaderValue},
};
// self
use crate::{
	_prelude::*,
	catalog::Language,
	payload::{NormalizeOptions, Payload},
};

/// How much of a successful response is returned to the caller.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseReturn {
	/// The full [`Response`](crate::reply::Response) envelope; no success check runs.
	Raw,
	/// The response body.
	#[default]
	Body,
	/// The configured data field of the response body.
	Data,
}

/// How a presented error should be rendered by the host UI.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorMessageMode {
	/// Transient toast-style message.
	#[default]
	Message,
	/// Blocking dialog.
	Modal,
	/// Do not present anything.
	None,
}

/// Per-call overrides consumed by the cooperating interceptors.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CallOptions {
	/// Unwrap mode for the response unwrapper.
	pub response_return: Option<ResponseReturn>,
	/// Presentation mode for the error presenter.
	pub error_message_mode: Option<ErrorMessageMode>,
	/// Message language for the error presenter.
	pub language: Option<Language>,
	/// Normalizer overrides, merged over the interceptor's defaults.
	pub normalize_payload: Option<NormalizeOptions>,
}

/// Client-level defaults applied to every call whose override is unset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CallDefaults {
	/// Default unwrap mode.
	pub response_return: ResponseReturn,
	/// Default presentation mode.
	pub error_message_mode: ErrorMessageMode,
}
impl CallDefaults {
	/// Fills the unset overrides of `call`.
	pub fn apply(&self, mut call: Call) -> Call {
		call.options.response_return.get_or_insert(self.response_return);
		call.options.error_message_mode.get_or_insert(self.error_message_mode);

		call
	}
}

/// Outbound request descriptor.
///
/// The replay marker is owned by the authenticate interceptor: it is set on the copy
/// that gets resubmitted after a token refresh and cannot be set from outside this crate.
#[derive(Clone, Debug, PartialEq)]
pub struct Call {
	/// HTTP method.
	pub method: Method,
	/// Absolute URL or path relative to the transport's base URL.
	pub target: String,
	/// Request headers.
	pub headers: HeaderMap,
	/// Query object.
	pub query: Option<Payload>,
	/// Request body.
	pub body: Option<Payload>,
	/// Per-call timeout; overrides the transport default.
	pub timeout: Option<StdDuration>,
	/// Interceptor overrides.
	pub options: CallOptions,
	replayed: bool,
}
impl Call {
	/// Creates a call with no headers, query, or body.
	pub fn new(method: Method, target: impl Into<String>) -> Self {
		Self {
			method,
			target: target.into(),
			headers: HeaderMap::new(),
			query: None,
			body: None,
			timeout: None,
			options: CallOptions::default(),
			replayed: false,
		}
	}

	/// `GET` shorthand.
	pub fn get(target: impl Into<String>) -> Self {
		Self::new(Method::GET, target)
	}

	/// `POST` shorthand.
	pub fn post(target: impl Into<String>) -> Self {
		Self::new(Method::POST, target)
	}

	/// `PUT` shorthand.
	pub fn put(target: impl Into<String>) -> Self {
		Self::new(Method::PUT, target)
	}

	/// `PATCH` shorthand.
	pub fn patch(target: impl Into<String>) -> Self {
		Self::new(Method::PATCH, target)
	}

	/// `DELETE` shorthand.
	pub fn delete(target: impl Into<String>) -> Self {
		Self::new(Method::DELETE, target)
	}

	/// Inserts a header, replacing any previous value.
	pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
		self.headers.insert(name, value);

		self
	}

	/// Sets the query object.
	pub fn with_query(mut self, query: impl Into<Payload>) -> Self {
		self.query = Some(query.into());

		self
	}

	/// Sets the body.
	pub fn with_body(mut self, body: impl Into<Payload>) -> Self {
		self.body = Some(body.into());

		self
	}

	/// Sets a per-call timeout.
	pub fn with_timeout(mut self, timeout: StdDuration) -> Self {
		self.timeout = Some(timeout);

		self
	}

	/// Overrides the unwrap mode.
	pub fn with_response_return(mut self, mode: ResponseReturn) -> Self {
		self.options.response_return = Some(mode);

		self
	}

	/// Overrides the presentation mode.
	pub fn with_error_message_mode(mut self, mode: ErrorMessageMode) -> Self {
		self.options.error_message_mode = Some(mode);

		self
	}

	/// Overrides the message language.
	pub fn with_language(mut self, language: Language) -> Self {
		self.options.language = Some(language);

		self
	}

	/// Overrides normalizer options for this call.
	pub fn with_normalize(mut self, options: NormalizeOptions) -> Self {
		self.options.normalize_payload = Some(options);

		self
	}

	/// Returns `true` once this call has been resubmitted after a token refresh.
	pub fn is_replayed(&self) -> bool {
		self.replayed
	}

	/// Marks the call as resubmitted after a token refresh.
	pub(crate) fn into_replay(mut self) -> Self {
		self.replayed = true;

		self
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn defaults_fill_only_unset_overrides() {
		let defaults = CallDefaults {
			response_return: ResponseReturn::Data,
			error_message_mode: ErrorMessageMode::Modal,
		};
		let call = defaults.apply(Call::get("/a").with_response_return(ResponseReturn::Raw));

		assert_eq!(call.options.response_return, Some(ResponseReturn::Raw));
		assert_eq!(call.options.error_message_mode, Some(ErrorMessageMode::Modal));
	}

	#[test]
	fn replay_marker_starts_unset() {
		let call = Call::post("/login");

		assert!(!call.is_replayed());
		assert!(call.into_replay().is_replayed());
	}

	#[test]
	fn call_options_deserialize_from_camel_case() {
		let options: CallOptions = serde_json::from_str(
			r#"{"responseReturn":"raw","errorMessageMode":"none","language":"en","normalizePayload":{"emptyToNull":true}}"#,
		)
		.expect("Call options should deserialize.");

		assert_eq!(options.response_return, Some(ResponseReturn::Raw));
		assert_eq!(options.error_message_mode, Some(ErrorMessageMode::None));
		assert_eq!(options.language, Some(Language::En));
		assert_eq!(
			options.normalize_payload,
			Some(NormalizeOptions::default().with_empty_to_null(true))
		);
	}
}
