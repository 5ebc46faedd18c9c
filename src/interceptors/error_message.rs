//! Error Presenter: classifies failures and hands a localized message to the host UI.

// std
use std::future;
// self
use crate::{
	_prelude::*,
	call::ErrorMessageMode,
	catalog::{self, Language, MessageKey},
	client::Client,
	failure::{CODE_ABORTED, CODE_NETWORK, CODE_TIMED_OUT, Failure, FailureKind},
	interceptors::{OutcomeFuture, ResponseInterceptor},
	obs::{self, InterceptorKind, InterceptorOutcome},
};

type Present = Arc<dyn Fn(&Failure, &Notice) + Send + Sync>;

/// What the presentation callback should show.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Notice {
	/// Resolved message; empty for failures without a catalog entry.
	pub message: &'static str,
	/// Resolved presentation mode.
	pub mode: ErrorMessageMode,
	/// Language the message was resolved in.
	pub language: Language,
}

/// Classification of a failure for presentation purposes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureClass {
	/// Cancelled calls are never presented.
	Cancelled,
	/// A catalog entry applies.
	Known(MessageKey),
	/// Not an HTTP-level failure; presented with an empty message.
	Unrecognized,
}

/// Classifies `failure`.
///
/// HTTP and transport failures always resolve to a catalog entry: the status entry when
/// one exists, overridden by the timeout entry for timeouts, overridden by the network
/// entry for connectivity errors, and falling back to the network entry otherwise.
pub fn classify(failure: &Failure) -> FailureClass {
	let (code, message) = match failure.kind() {
		FailureKind::Cancelled(_) => return FailureClass::Cancelled,
		FailureKind::Status { .. } => (None, ""),
		FailureKind::Transport { code, message } => (code.as_deref(), message.as_str()),
		_ => return FailureClass::Unrecognized,
	};
	let mut key = failure.http_status().and_then(MessageKey::for_status);

	if matches!(code, Some(CODE_ABORTED | CODE_TIMED_OUT)) || message.contains("timeout") {
		key = Some(MessageKey::RequestTimeout);
	}
	if code == Some(CODE_NETWORK) || message.contains("Network Error") {
		key = Some(MessageKey::NetworkError);
	}

	FailureClass::Known(key.unwrap_or(MessageKey::NetworkError))
}

/// Presenter settings.
#[derive(Clone)]
pub struct ErrorMessageOptions {
	present: Present,
	language: Option<Language>,
}
impl ErrorMessageOptions {
	/// Creates options around the presentation callback.
	pub fn new<F>(present: F) -> Self
	where
		F: 'static + Send + Sync + Fn(&Failure, &Notice),
	{
		Self { present: Arc::new(present), language: None }
	}

	/// Pins the presenter's default language, used when neither the call nor the process
	/// sets one.
	pub fn with_language(mut self, language: Language) -> Self {
		self.language = Some(language);

		self
	}
}
impl Debug for ErrorMessageOptions {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ErrorMessageOptions").field("language", &self.language).finish()
	}
}

/// Response stage invoking the presentation callback for every non-cancelled failure and
/// then propagating the failure unchanged.
#[derive(Clone, Debug)]
pub struct ErrorMessageInterceptor {
	options: ErrorMessageOptions,
}
impl ErrorMessageInterceptor {
	/// Creates the stage.
	pub fn new(options: ErrorMessageOptions) -> Self {
		Self { options }
	}

	/// Resolves the notice for `failure`, or `None` for cancellations.
	pub fn resolve(&self, failure: &Failure) -> Option<Notice> {
		let call = failure.call();
		let language = catalog::resolve_language(
			call.and_then(|call| call.options.language),
			self.options.language,
		);
		let mode = call.and_then(|call| call.options.error_message_mode).unwrap_or_default();
		let message = match classify(failure) {
			FailureClass::Cancelled => return None,
			FailureClass::Known(key) => catalog::message(language, key),
			FailureClass::Unrecognized => "",
		};

		Some(Notice { message, mode, language })
	}
}
impl ResponseInterceptor for ErrorMessageInterceptor {
	fn on_failure(&self, failure: Failure, _client: &Client) -> OutcomeFuture {
		if let Some(notice) = self.resolve(&failure) {
			(self.options.present)(&failure, &notice);
			obs::record_interceptor_outcome(
				InterceptorKind::ErrorMessage,
				InterceptorOutcome::Presented,
			);
		}

		Box::pin(future::ready(Err(failure)))
	}
}
