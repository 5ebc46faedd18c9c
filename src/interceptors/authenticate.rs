//! Authenticate coordinator: single-flight token refresh with FIFO replay.
//!
//! The coordinator watches the failure side of the response chain. The first call that
//! fails with an authentication error starts a refresh session and awaits the refresh
//! hook; every authentication failure that arrives while the session is open is parked
//! in a FIFO queue instead of starting another refresh. When the refresh settles the
//! queue is drained in arrival order: on success each parked call is replayed through the
//! full client pipeline (with its replay marker set) before the originating call is; on
//! failure each parked call is cancelled with [`CancelReason::RefreshFailed`], the
//! re-authenticate hook runs once, and the originating call is cancelled the same way.
//!
//! A replayed call that fails authentication again is never refreshed a second time: the
//! re-authenticate hook runs and the failure propagates. Dropping the future that owns an
//! open session closes it, and parked calls resolve with
//! [`CancelReason::RefreshAbandoned`].

mod metrics;

pub use metrics::RefreshMetrics;

// std
use std::{collections::VecDeque, mem};
// crates.io
use futures::channel::oneshot;
// self
use crate::{
	_prelude::*,
	call::Call,
	client::Client,
	error::{BoxError, ConfigError},
	failure::{CancelReason, Failure, FailureKind},
	interceptors::{Outcome, OutcomeFuture, ResponseInterceptor},
	obs::{self, InterceptorKind, InterceptorOutcome, InterceptorSpan},
};

const KIND: InterceptorKind = InterceptorKind::Authenticate;

type HookFuture = Pin<Box<dyn Future<Output = Result<(), BoxError>> + Send>>;
type Hook = Arc<dyn Fn(&Failure) -> HookFuture + Send + Sync>;
type AuthFailurePredicate = Arc<dyn Fn(&Failure) -> bool + Send + Sync>;
type Resume = Result<OutcomeFuture, Failure>;

/// Hooks and switches for [`AuthenticateInterceptor`].
///
/// Hook futures own their captures; clone whatever they need from the failure before
/// returning.
#[derive(Clone)]
pub struct AuthenticateOptions {
	re_authenticate: Hook,
	refresh_token: Option<Hook>,
	refresh_enabled: bool,
	is_auth_failure: Option<AuthFailurePredicate>,
}
impl AuthenticateOptions {
	/// Creates options with refresh disabled; `re_authenticate` forces a new login.
	pub fn new<F, Fut, T, E>(re_authenticate: F) -> Self
	where
		F: 'static + Send + Sync + Fn(&Failure) -> Fut,
		Fut: 'static + Send + Future<Output = Result<T, E>>,
		E: Into<BoxError>,
	{
		Self {
			re_authenticate: hook(re_authenticate),
			refresh_token: None,
			refresh_enabled: false,
			is_auth_failure: None,
		}
	}

	/// Sets the refresh hook. Its resolved value is ignored; a rejection means the refresh
	/// failed.
	pub fn with_refresh_token<F, Fut, T, E>(mut self, refresh_token: F) -> Self
	where
		F: 'static + Send + Sync + Fn(&Failure) -> Fut,
		Fut: 'static + Send + Future<Output = Result<T, E>>,
		E: Into<BoxError>,
	{
		self.refresh_token = Some(hook(refresh_token));

		self
	}

	/// Toggles the refresh subsystem; enabling it requires a refresh hook.
	pub fn with_refresh_enabled(mut self, refresh_enabled: bool) -> Self {
		self.refresh_enabled = refresh_enabled;

		self
	}

	/// Overrides the authentication-failure test (default: HTTP 401).
	pub fn with_auth_failure_predicate<F>(mut self, is_auth_failure: F) -> Self
	where
		F: 'static + Send + Sync + Fn(&Failure) -> bool,
	{
		self.is_auth_failure = Some(Arc::new(is_auth_failure));

		self
	}
}
impl Debug for AuthenticateOptions {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthenticateOptions")
			.field("refresh_token", &self.refresh_token.is_some())
			.field("refresh_enabled", &self.refresh_enabled)
			.field("is_auth_failure", &self.is_auth_failure.is_some())
			.finish()
	}
}

/// Response stage coordinating token refreshes; cheap to clone, clones share state.
#[derive(Clone)]
pub struct AuthenticateInterceptor(Arc<Coordinator>);
impl AuthenticateInterceptor {
	/// Validates `options` and creates the coordinator.
	pub fn new(options: AuthenticateOptions) -> Result<Self, ConfigError> {
		let refresh = match (options.refresh_enabled, options.refresh_token) {
			(true, None) => return Err(ConfigError::MissingRefreshHandler),
			(true, Some(refresh)) => Some(refresh),
			(false, _) => None,
		};
		let is_auth_failure = options
			.is_auth_failure
			.unwrap_or_else(|| Arc::new(|failure: &Failure| failure.http_status() == Some(401)));

		Ok(Self(Arc::new(Coordinator {
			re_authenticate: options.re_authenticate,
			refresh,
			is_auth_failure,
			session: Mutex::new(RefreshSession::default()),
			metrics: RefreshMetrics::default(),
		})))
	}

	/// Counters for this coordinator.
	pub fn metrics(&self) -> &RefreshMetrics {
		&self.0.metrics
	}

	/// Returns `true` while a refresh session is open.
	pub fn is_refreshing(&self) -> bool {
		self.0.session.lock().refreshing
	}

	/// Number of calls parked behind the open refresh session.
	pub fn pending(&self) -> usize {
		self.0.session.lock().pending.len()
	}
}
impl ResponseInterceptor for AuthenticateInterceptor {
	fn on_failure(&self, failure: Failure, client: &Client) -> OutcomeFuture {
		let coordinator = Arc::clone(&self.0);
		let client = client.clone();

		Box::pin(async move { coordinator.handle(failure, client).await })
	}
}
impl Debug for AuthenticateInterceptor {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthenticateInterceptor")
			.field("refresh_enabled", &self.0.refresh.is_some())
			.field("refreshing", &self.is_refreshing())
			.field("pending", &self.pending())
			.field("metrics", &self.0.metrics)
			.finish()
	}
}

struct Coordinator {
	re_authenticate: Hook,
	// Present iff refresh is enabled.
	refresh: Option<Hook>,
	is_auth_failure: AuthFailurePredicate,
	session: Mutex<RefreshSession>,
	metrics: RefreshMetrics,
}
impl Coordinator {
	async fn handle(&self, failure: Failure, client: Client) -> Outcome {
		if !(self.is_auth_failure)(&failure) {
			return Err(failure);
		}

		let Some(call) = failure.call().cloned() else {
			return Err(failure);
		};
		let Some(refresh) = self.refresh.as_ref() else {
			self.escalate(&failure, call).await?;

			return Err(failure);
		};

		if call.is_replayed() {
			self.escalate(&failure, call).await?;

			return Err(failure);
		}

		// The flag flips under the lock before the first suspension point.
		let waiting = self.session.lock().enter(&call);

		match waiting {
			Some(resume) => self.wait(resume, call).await,
			None => {
				let span = InterceptorSpan::new(KIND, "refresh");

				span.instrument(self.run_session(refresh, failure, call, client)).await
			},
		}
	}

	async fn wait(&self, resume: oneshot::Receiver<Resume>, call: Call) -> Outcome {
		self.metrics.record_queued();
		obs::record_interceptor_outcome(KIND, InterceptorOutcome::Queued);

		match resume.await {
			Ok(Ok(replay)) => replay.await,
			Ok(Err(failure)) => Err(failure),
			Err(oneshot::Canceled) =>
				Err(Failure::cancelled(CancelReason::RefreshAbandoned).with_call(call)),
		}
	}

	async fn run_session(
		&self,
		refresh: &Hook,
		failure: Failure,
		call: Call,
		client: Client,
	) -> Outcome {
		let session = SessionGuard { session: &self.session, armed: true };

		self.metrics.record_attempt();
		obs::record_interceptor_outcome(KIND, InterceptorOutcome::Attempt);

		let refreshed = refresh(&failure).await;
		let pending = session.close();

		match refreshed {
			Ok(()) => {
				self.metrics.record_success();
				obs::record_interceptor_outcome(KIND, InterceptorOutcome::Success);

				for task in pending {
					self.record_replay();

					// A parked call whose caller went away has nobody to resume.
					let _ = task.resume.send(Ok(client.dispatch(task.call.into_replay())));
				}

				self.record_replay();

				client.dispatch(call.into_replay()).await
			},
			Err(e) => {
				self.metrics.record_failure();
				obs::record_interceptor_outcome(KIND, InterceptorOutcome::Failure);
				obs::warn_hook_failure(KIND, "refresh_token", &*e);

				for task in pending {
					let cancelled =
						Failure::cancelled(CancelReason::RefreshFailed).with_call(task.call);
					let _ = task.resume.send(Err(cancelled));
				}

				self.escalate(&failure, call.clone()).await?;

				Err(Failure::cancelled(CancelReason::RefreshFailed).with_call(call).with_source(e))
			},
		}
	}

	async fn escalate(&self, failure: &Failure, call: Call) -> Result<(), Failure> {
		self.metrics.record_re_authentication();
		obs::record_interceptor_outcome(KIND, InterceptorOutcome::ReAuthenticate);

		(self.re_authenticate)(failure).await.map_err(|e| {
			obs::warn_hook_failure(KIND, "re_authenticate", &*e);

			Failure::new(FailureKind::ReAuthenticate).with_call(call).with_source(e)
		})
	}

	fn record_replay(&self) {
		self.metrics.record_replay();
		obs::record_interceptor_outcome(KIND, InterceptorOutcome::Replay);
	}
}

#[derive(Default)]
struct RefreshSession {
	refreshing: bool,
	pending: VecDeque<PendingTask>,
}
impl RefreshSession {
	/// Parks `call` if a session is open; otherwise opens one and returns `None`.
	fn enter(&mut self, call: &Call) -> Option<oneshot::Receiver<Resume>> {
		if !self.refreshing {
			self.refreshing = true;

			return None;
		}

		let (resume, waiting) = oneshot::channel();

		self.pending.push_back(PendingTask { call: call.clone(), resume });

		Some(waiting)
	}
}

struct PendingTask {
	call: Call,
	resume: oneshot::Sender<Resume>,
}

// Closes the session on drop so an abandoned refresh never leaves the flag set.
struct SessionGuard<'a> {
	session: &'a Mutex<RefreshSession>,
	armed: bool,
}
impl SessionGuard<'_> {
	fn close(mut self) -> VecDeque<PendingTask> {
		self.armed = false;

		let mut session = self.session.lock();

		session.refreshing = false;

		mem::take(&mut session.pending)
	}
}
impl Drop for SessionGuard<'_> {
	fn drop(&mut self) {
		if self.armed {
			let mut session = self.session.lock();

			session.refreshing = false;
			session.pending.clear();
		}
	}
}

fn hook<F, Fut, T, E>(f: F) -> Hook
where
	F: 'static + Send + Sync + Fn(&Failure) -> Fut,
	Fut: 'static + Send + Future<Output = Result<T, E>>,
	E: Into<BoxError>,
{
	Arc::new(move |failure: &Failure| -> HookFuture {
		let fut = f(failure);

		Box::pin(async move { fut.await.map(|_| ()).map_err(Into::into) })
	})
}
