// std
use std::time::Duration as StdDuration;
// crates.io
use http::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
// self
use crate::{
	_prelude::*,
	call::Call,
	error::ConfigError,
	failure::{CODE_NETWORK, CODE_TIMED_OUT, Failure},
	payload::Payload,
	reply::Response,
	transport::{Transport, TransportFuture},
};

/// Declarative settings for [`ReqwestTransport`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TransportConfig {
	/// Base URL that relative call targets are joined onto.
	pub base_url: Option<String>,
	/// Default timeout in milliseconds; `None` disables it.
	pub timeout_ms: Option<u64>,
	/// Headers sent with every call; call headers with the same name win.
	pub headers: BTreeMap<String, String>,
}
impl TransportConfig {
	const DEFAULT_CONTENT_TYPE: &'static str = "application/json;charset=utf-8";
	const DEFAULT_TIMEOUT_MS: u64 = 30_000;
}
impl Default for TransportConfig {
	fn default() -> Self {
		Self {
			base_url: None,
			timeout_ms: Some(Self::DEFAULT_TIMEOUT_MS),
			headers: BTreeMap::from([(
				CONTENT_TYPE.as_str().to_owned(),
				Self::DEFAULT_CONTENT_TYPE.to_owned(),
			)]),
		}
	}
}

/// Thin wrapper around [`ReqwestClient`] implementing [`Transport`].
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
	client: ReqwestClient,
	base_url: Option<Url>,
	headers: HeaderMap,
	timeout: Option<StdDuration>,
}
impl ReqwestTransport {
	/// Builds a transport with a fresh reqwest client.
	pub fn new(config: &TransportConfig) -> Result<Self, ConfigError> {
		let client = ReqwestClient::builder().build()?;

		Self::with_client(client, config)
	}

	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient, config: &TransportConfig) -> Result<Self, ConfigError> {
		let base_url = config
			.base_url
			.as_deref()
			.map(|raw| {
				Url::parse(raw)
					.map_err(|source| ConfigError::InvalidBaseUrl { url: raw.to_owned(), source })
			})
			.transpose()?;
		let mut headers = HeaderMap::new();

		for (name, value) in &config.headers {
			let invalid = || ConfigError::InvalidHeader { name: name.clone() };
			let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| invalid())?;
			let header_value = HeaderValue::from_str(value).map_err(|_| invalid())?;

			headers.insert(header_name, header_value);
		}

		Ok(Self {
			client,
			base_url,
			headers,
			timeout: config.timeout_ms.map(StdDuration::from_millis),
		})
	}

	fn resolve(&self, target: &str) -> Result<Url, url::ParseError> {
		match &self.base_url {
			Some(base) => base.join(target),
			None => Url::parse(target),
		}
	}

	async fn execute(self, call: Call) -> Result<Response, Failure> {
		let url = match self.resolve(&call.target) {
			Ok(url) => url,
			Err(e) =>
				return Err(Failure::internal(format!("Call target `{}` is not a valid URL", call.target))
					.with_source(e)
					.with_call(call)),
		};
		let mut builder = self
			.client
			.request(call.method.clone(), url)
			.headers(self.headers.clone())
			.headers(call.headers.clone());

		if let Some(timeout) = call.timeout.or(self.timeout) {
			builder = builder.timeout(timeout);
		}
		if let Some(query) = &call.query {
			builder = builder.query(&query_pairs(query));
		}

		match &call.body {
			None | Some(Payload::Absent) => {},
			Some(Payload::Binary(bytes)) => builder = builder.body(bytes.clone()),
			Some(body) => match serde_json::to_vec(body) {
				Ok(encoded) => builder = builder.body(encoded),
				Err(e) =>
					return Err(Failure::internal("Call body could not be encoded")
						.with_source(e)
						.with_call(call)),
			},
		}

		let response = match builder.send().await {
			Ok(response) => response,
			Err(e) => return Err(map_reqwest_error(e).with_call(call)),
		};
		let status = response.status().as_u16();
		let headers = response.headers().to_owned();
		let bytes = match response.bytes().await {
			Ok(bytes) => bytes,
			Err(e) => return Err(map_reqwest_error(e).with_call(call)),
		};
		let response = Response { call, status, headers, body: decode_body(&bytes) };

		if response.is_success() { Ok(response) } else { Err(Failure::status(response)) }
	}
}
impl Transport for ReqwestTransport {
	fn send(&self, call: Call) -> TransportFuture {
		Box::pin(self.clone().execute(call))
	}
}

fn map_reqwest_error(e: ReqwestError) -> Failure {
	let code = if e.is_timeout() {
		Some(CODE_TIMED_OUT)
	} else if e.is_connect() || e.is_request() {
		Some(CODE_NETWORK)
	} else {
		None
	};

	Failure::transport(code, e.to_string()).with_source(e)
}

fn decode_body(bytes: &[u8]) -> Option<Value> {
	if bytes.is_empty() {
		return None;
	}

	Some(
		serde_json::from_slice(bytes)
			.unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned())),
	)
}

/// Flattens a query object into key/value pairs: scalars are stringified, arrays repeat
/// the key, nested containers are JSON-encoded, absent and null entries are skipped.
fn query_pairs(query: &Payload) -> Vec<(String, String)> {
	let Payload::Object(map) = query else {
		return Vec::new();
	};
	let mut pairs = Vec::new();

	for (key, value) in map {
		match value {
			Payload::Array(items) =>
				for item in items {
					if let Some(v) = query_scalar(item) {
						pairs.push((key.clone(), v));
					}
				},
			other =>
				if let Some(v) = query_scalar(other) {
					pairs.push((key.clone(), v));
				},
		}
	}

	pairs
}

fn query_scalar(value: &Payload) -> Option<String> {
	match value {
		Payload::Absent | Payload::Null => None,
		Payload::Bool(v) => Some(v.to_string()),
		Payload::Number(v) => Some(v.to_string()),
		Payload::String(v) => Some(v.clone()),
		other => Some(other.to_json().to_string()),
	}
}
