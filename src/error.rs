//! Crate-level error types shared by the client, interceptors, and transports.

// self
use crate::{_prelude::*, failure::Failure};

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Boxed error accepted from user-supplied hooks (refresh, re-authenticate, extractors).
pub type BoxError = Box<dyn StdError + Send + Sync>;

/// Canonical error exposed by the typed client APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// The call failed without a backend response body worth surfacing.
	#[error(transparent)]
	Failure(Box<Failure>),
	/// The backend answered with a body; the body is surfaced instead of the raw failure.
	#[error("Backend rejected the call with status {status}.")]
	Backend {
		/// HTTP status code of the rejecting response.
		status: u16,
		/// Response body returned by the backend, if any.
		body: Option<Value>,
		/// Failure that carried the response.
		#[source]
		failure: Box<Failure>,
	},
	/// The reply could not be decoded into the requested type.
	#[error("Reply could not be decoded into the requested type.")]
	Decode {
		/// Path-aware decoding failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
}
impl From<Failure> for Error {
	fn from(failure: Failure) -> Self {
		match failure.response() {
			Some(response) => Self::Backend {
				status: response.status,
				body: response.body.clone(),
				failure: Box::new(failure),
			},
			None => Self::Failure(Box::new(failure)),
		}
	}
}

/// Configuration and validation failures raised while assembling a client.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// Refresh was enabled but no refresh handler was supplied.
	#[error("Refresh is enabled but no refresh handler was supplied.")]
	MissingRefreshHandler,
	/// Transport base URL cannot be parsed.
	#[error("Base URL `{url}` is invalid.")]
	InvalidBaseUrl {
		/// Raw URL string from the configuration.
		url: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// A configured default header is not a valid header name or value.
	#[error("Default header `{name}` is invalid.")]
	InvalidHeader {
		/// Header name from the configuration.
		name: String,
	},
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}
