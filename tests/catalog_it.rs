//! Kept in its own binary: the process-wide language would leak into parallel tests.

// crates.io
use futures::future;
// self
use http_easy::{
	call::Call,
	catalog::{self, Language},
	client::Client,
	failure::{CODE_TIMED_OUT, Failure},
	interceptors::{ErrorMessageInterceptor, ErrorMessageOptions},
	transport::{Transport, TransportFuture},
};

struct TimingOut;
impl Transport for TimingOut {
	fn send(&self, call: Call) -> TransportFuture {
		Box::pin(future::ready(Err(Failure::transport(
			Some(CODE_TIMED_OUT),
			"timeout of 30000ms exceeded",
		)
		.with_call(call))))
	}
}

#[tokio::test]
async fn language_resolution_precedence() {
	let presenter = ErrorMessageInterceptor::new(
		ErrorMessageOptions::new(|_, _| {}).with_language(Language::En),
	);
	let client = Client::new(TimingOut);

	client.add_response_interceptor(presenter.clone());

	let failure = client.send(Call::get("/slow")).await.expect_err("Call should time out.");
	let resolve = |failure: &Failure| {
		presenter.resolve(failure).expect("Timeouts should be presented.")
	};

	catalog::set_global_language(None);

	assert_eq!(resolve(&failure).message, "Request timeout, please try again later.");

	catalog::set_global_language(Some(Language::Zh));

	assert_eq!(catalog::global_language(), Some(Language::Zh));
	assert_eq!(resolve(&failure).message, "请求超时，请稍后再试。");

	let call_override = client
		.send(Call::get("/slow").with_language(Language::En))
		.await
		.expect_err("Call should time out.");

	assert_eq!(resolve(&call_override).language, Language::En);

	catalog::set_global_language(None);

	let bare = ErrorMessageInterceptor::new(ErrorMessageOptions::new(|_, _| {}));

	assert_eq!(bare.resolve(&failure).map(|notice| notice.language), Some(Language::Zh));
}
