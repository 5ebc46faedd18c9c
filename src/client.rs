//! Client Assembler: the interceptor pipeline bound to a transport.
//!
//! [`Client`] owns a [`Transport`] plus ordered request and response interceptor lists.
//! [`ClientBuilder`] wires the built-in interceptors in a fixed order (normalizer,
//! unwrapper, authenticate, error presenter) and then runs user setup callbacks, so
//! declarative configuration and hand-installed interceptors compose predictably.

// std
use std::sync::atomic::{AtomicU64, Ordering};
// crates.io
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	call::{Call, CallDefaults},
	error::ConfigError,
	interceptors::{
		AuthenticateInterceptor, AuthenticateOptions, ErrorMessageInterceptor,
		ErrorMessageOptions, InterceptorId, NormalizeInterceptor, Outcome, OutcomeFuture,
		RequestInterceptor, ResponseInterceptor, UnwrapConfig, UnwrapInterceptor, UnwrapOptions,
	},
	payload::NormalizeOptions,
	reply::Reply,
	transport::Transport,
};

type Registry<T> = RwLock<Vec<(InterceptorId, Arc<T>)>>;
type AuthenticateFactory = Box<dyn FnOnce(&Client) -> AuthenticateOptions + Send>;
type SetupHook = Box<dyn FnOnce(&Client) + Send>;

/// Declarative portion of a client assembly, loadable from configuration files.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClientConfig {
	/// Defaults applied to every call.
	pub defaults: CallDefaults,
	/// Installs the payload normalizer with these defaults when set.
	pub normalize_payload: Option<NormalizeOptions>,
	/// Installs the response unwrapper with these settings when set.
	pub unwrap: Option<UnwrapConfig>,
}

struct ClientInner {
	transport: Arc<dyn Transport>,
	defaults: CallDefaults,
	requests: Registry<dyn RequestInterceptor>,
	responses: Registry<dyn ResponseInterceptor>,
	next_id: AtomicU64,
}

/// Cheaply cloneable handle to an interceptor pipeline.
#[derive(Clone)]
pub struct Client(Arc<ClientInner>);
impl Client {
	/// Creates a client with no interceptors and default call settings.
	pub fn new(transport: impl Transport) -> Self {
		Self::with_defaults(transport, CallDefaults::default())
	}

	/// Creates a client with no interceptors.
	pub fn with_defaults(transport: impl Transport, defaults: CallDefaults) -> Self {
		Self(Arc::new(ClientInner {
			transport: Arc::new(transport),
			defaults,
			requests: Default::default(),
			responses: Default::default(),
			next_id: AtomicU64::new(0),
		}))
	}

	/// Starts a [`ClientBuilder`] for `transport`.
	pub fn builder(transport: impl Transport) -> ClientBuilder {
		ClientBuilder::new(transport)
	}

	/// Defaults applied to every call.
	pub fn defaults(&self) -> CallDefaults {
		self.0.defaults
	}

	/// Appends a request interceptor.
	pub fn add_request_interceptor(&self, interceptor: impl RequestInterceptor) -> InterceptorId {
		let id = self.next_id();

		self.0.requests.write().push((id, Arc::new(interceptor)));

		id
	}

	/// Appends a response interceptor.
	pub fn add_response_interceptor(&self, interceptor: impl ResponseInterceptor) -> InterceptorId {
		let id = self.next_id();

		self.0.responses.write().push((id, Arc::new(interceptor)));

		id
	}

	/// Removes a request interceptor; returns `false` if `id` is unknown.
	pub fn eject_request_interceptor(&self, id: InterceptorId) -> bool {
		eject(&self.0.requests, id)
	}

	/// Removes a response interceptor; returns `false` if `id` is unknown.
	pub fn eject_response_interceptor(&self, id: InterceptorId) -> bool {
		eject(&self.0.responses, id)
	}

	/// Runs `call` through the pipeline.
	///
	/// Defaults and request interceptors are applied, and the transport is invoked,
	/// before this method returns; only the transport exchange and the response chain
	/// happen when the returned future is polled. Dispatch order therefore equals call
	/// order even if the futures are awaited in a different order.
	pub fn dispatch(&self, call: Call) -> OutcomeFuture {
		let call = self.0.defaults.apply(call);
		let requests = snapshot(&self.0.requests);
		let responses = snapshot(&self.0.responses);
		let sent = requests
			.iter()
			.try_fold(call, |call, interceptor| interceptor.on_request(call))
			.map(|call| self.0.transport.send(call));
		let client = self.clone();

		Box::pin(async move {
			let mut outcome = match sent {
				Ok(exchange) => exchange.await.map(Reply::from),
				Err(failure) => Err(failure),
			};

			for stage in responses {
				outcome = match outcome {
					Ok(reply) => stage.on_success(reply, &client).await,
					Err(failure) => stage.on_failure(failure, &client).await,
				};
			}

			outcome
		})
	}

	/// Runs `call` through the pipeline and awaits the outcome.
	pub async fn send(&self, call: Call) -> Outcome {
		self.dispatch(call).await
	}

	/// Runs `call` and decodes the reply into `T`.
	///
	/// Failures that carry a backend response surface as [`Error::Backend`] with the
	/// response body; every other failure surfaces as [`Error::Failure`].
	pub async fn request<T>(&self, call: Call) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let value = self.send(call).await?.into_value();

		serde_path_to_error::deserialize(value).map_err(|source| Error::Decode { source })
	}

	fn next_id(&self) -> InterceptorId {
		InterceptorId(self.0.next_id.fetch_add(1, Ordering::Relaxed))
	}
}
impl Debug for Client {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Client")
			.field("defaults", &self.0.defaults)
			.field("request_interceptors", &self.0.requests.read().len())
			.field("response_interceptors", &self.0.responses.read().len())
			.finish()
	}
}

/// Assembles a [`Client`] with the built-in interceptors.
pub struct ClientBuilder {
	transport: Arc<dyn Transport>,
	defaults: CallDefaults,
	normalize: Option<NormalizeOptions>,
	unwrap: Option<UnwrapOptions>,
	authenticate: Option<AuthenticateFactory>,
	error_message: Option<ErrorMessageOptions>,
	setup: Vec<SetupHook>,
}
impl ClientBuilder {
	/// Creates a builder with no interceptors enabled.
	pub fn new(transport: impl Transport) -> Self {
		Self {
			transport: Arc::new(transport),
			defaults: CallDefaults::default(),
			normalize: None,
			unwrap: None,
			authenticate: None,
			error_message: None,
			setup: Vec::new(),
		}
	}

	/// Applies the declarative settings in `config`.
	pub fn config(mut self, config: ClientConfig) -> Self {
		self.defaults = config.defaults;
		self.normalize = config.normalize_payload;
		self.unwrap = config.unwrap.map(UnwrapOptions::from);

		self
	}

	/// Overrides the per-call defaults.
	pub fn defaults(mut self, defaults: CallDefaults) -> Self {
		self.defaults = defaults;

		self
	}

	/// Enables the payload normalizer with `options` as its defaults.
	pub fn normalize_payload(mut self, options: NormalizeOptions) -> Self {
		self.normalize = Some(options);

		self
	}

	/// Enables the response unwrapper.
	pub fn unwrap_response(mut self, options: UnwrapOptions) -> Self {
		self.unwrap = Some(options);

		self
	}

	/// Enables the authenticate interceptor; `factory` receives the client being built so
	/// the refresh hook can issue calls through it.
	pub fn authenticate<F>(mut self, factory: F) -> Self
	where
		F: 'static + Send + FnOnce(&Client) -> AuthenticateOptions,
	{
		self.authenticate = Some(Box::new(factory));

		self
	}

	/// Enables the error presenter.
	pub fn error_message(mut self, options: ErrorMessageOptions) -> Self {
		self.error_message = Some(options);

		self
	}

	/// Registers a callback that runs after the built-in interceptors are installed.
	pub fn setup<F>(mut self, hook: F) -> Self
	where
		F: 'static + Send + FnOnce(&Client),
	{
		self.setup.push(Box::new(hook));

		self
	}

	/// Installs everything and returns the client.
	pub fn build(self) -> Result<Client, ConfigError> {
		let client = Client(Arc::new(ClientInner {
			transport: self.transport,
			defaults: self.defaults,
			requests: Default::default(),
			responses: Default::default(),
			next_id: AtomicU64::new(0),
		}));

		if let Some(options) = self.normalize {
			client.add_request_interceptor(NormalizeInterceptor::new(options));
		}
		if let Some(options) = self.unwrap {
			client.add_response_interceptor(UnwrapInterceptor::new(options));
		}
		if let Some(factory) = self.authenticate {
			client.add_response_interceptor(AuthenticateInterceptor::new(factory(&client))?);
		}
		if let Some(options) = self.error_message {
			client.add_response_interceptor(ErrorMessageInterceptor::new(options));
		}

		for hook in self.setup {
			hook(&client);
		}

		Ok(client)
	}
}
impl Debug for ClientBuilder {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ClientBuilder")
			.field("defaults", &self.defaults)
			.field("normalize", &self.normalize)
			.field("unwrap", &self.unwrap.is_some())
			.field("authenticate", &self.authenticate.is_some())
			.field("error_message", &self.error_message.is_some())
			.field("setup_hooks", &self.setup.len())
			.finish()
	}
}

fn snapshot<T>(registry: &Registry<T>) -> Vec<Arc<T>>
where
	T: ?Sized,
{
	registry.read().iter().map(|(_, interceptor)| Arc::clone(interceptor)).collect()
}

fn eject<T>(registry: &Registry<T>, id: InterceptorId) -> bool
where
	T: ?Sized,
{
	let mut guard = registry.write();
	let before = guard.len();

	guard.retain(|(candidate, _)| *candidate != id);

	guard.len() != before
}
