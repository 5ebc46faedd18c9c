mod common;

// std
use std::sync::Arc;
// crates.io
use futures::future;
use parking_lot::Mutex;
use serde::Deserialize;
use serde_json::json;
// self
use common::{Backend, Credentials};
use http_easy::{
	call::{Call, CallDefaults, ErrorMessageMode, ResponseReturn},
	catalog::Language,
	client::{Client, ClientConfig},
	error::{BoxError, Error},
	failure::{CancelReason, Failure, FailureKind},
	interceptors::{AuthenticateOptions, ErrorMessageOptions, Notice, UnwrapConfig},
	payload::{NormalizeOptions, Payload},
};

#[derive(Debug, Deserialize, PartialEq)]
struct Profile {
	name: String,
}

type Notices = Arc<Mutex<Vec<(FailureKind, Notice)>>>;

fn config() -> ClientConfig {
	serde_json::from_value(json!({
		"defaults": { "responseReturn": "data", "errorMessageMode": "modal" },
		"normalizePayload": { "dropAbsent": true, "emptyToNull": true },
		"unwrap": { "codeField": "code", "dataField": "data", "successCode": 0 }
	}))
	.expect("Client config should deserialize.")
}

fn assemble(
	backend: &Backend,
	credentials: &Credentials,
	refresh_succeeds: bool,
) -> (Client, Notices) {
	let notices = Notices::default();
	let sink = Arc::clone(&notices);
	let attach = credentials.attach();
	let credentials = credentials.clone();
	let fresh = backend.valid_token();
	let client = Client::builder(backend.clone())
		.config(config())
		.authenticate(move |_client| {
			AuthenticateOptions::new(|_| future::ready(Ok::<(), BoxError>(())))
				.with_refresh_enabled(true)
				.with_refresh_token(move |_| {
					if refresh_succeeds {
						credentials.set(&fresh);

						future::ready(Ok(()))
					} else {
						future::ready(Err(BoxError::from("refresh token revoked")))
					}
				})
		})
		.error_message(ErrorMessageOptions::new(move |failure: &Failure, notice: &Notice| {
			sink.lock().push((failure.kind().clone(), *notice));
		}))
		.setup(move |client| {
			client.add_request_interceptor(attach);
		})
		.build()
		.expect("Client should assemble.");

	(client, notices)
}

#[tokio::test]
async fn replayed_envelope_is_unwrapped_without_presenting() {
	let backend = Backend::new("fresh");
	let credentials = Credentials::new("stale");

	backend.route("/profile", json!({ "code": 0, "data": { "name": "neo" } }));

	let (client, notices) = assemble(&backend, &credentials, true);
	let profile = client
		.request::<Profile>(Call::get("/profile"))
		.await
		.expect("Profile should be returned after the refresh.");

	assert_eq!(profile, Profile { name: "neo".into() });
	assert!(notices.lock().is_empty());
	assert_eq!(backend.replayed_targets(), ["/profile"]);
}

#[tokio::test]
async fn business_failures_surface_the_backend_body() {
	let backend = Backend::new("fresh");
	let credentials = Credentials::new("fresh");

	backend.route("/quota", json!({ "code": 1001, "message": "quota exceeded" }));

	let (client, notices) = assemble(&backend, &credentials, true);
	let err = client
		.request::<Profile>(Call::get("/quota"))
		.await
		.expect_err("Business failures should reject.");

	match err {
		Error::Backend { status, body, .. } => {
			assert_eq!(status, 200);
			assert_eq!(body, Some(json!({ "code": 1001, "message": "quota exceeded" })));
		},
		other => panic!("Unexpected error: {other:?}."),
	}

	let notices = notices.lock();

	assert_eq!(notices.len(), 1);
	assert_eq!(notices[0].0, FailureKind::Business);
	assert_eq!(notices[0].1.message, "");
	assert_eq!(notices[0].1.mode, ErrorMessageMode::Modal);
}

#[tokio::test]
async fn http_failures_are_presented_in_the_call_language() {
	let backend = Backend::new("fresh");
	let credentials = Credentials::new("fresh");

	backend.route_status("/missing", 404, json!({ "message": "no such pet" }));

	let (client, notices) = assemble(&backend, &credentials, true);
	let _ = client.send(Call::get("/missing")).await;
	let _ = client
		.send(
			Call::get("/missing")
				.with_language(Language::En)
				.with_error_message_mode(ErrorMessageMode::Message),
		)
		.await;
	let notices = notices.lock();

	assert_eq!(notices.len(), 2);
	assert_eq!(notices[0].1.message, "未找到, 请求的资源不存在。");
	assert_eq!(notices[0].1.language, Language::Zh);
	assert_eq!(notices[1].1.message, "Not found, the requested resource does not exist.");
	assert_eq!(notices[1].1.mode, ErrorMessageMode::Message);
}

#[tokio::test]
async fn cancellations_are_not_presented() {
	let backend = Backend::new("fresh");
	let credentials = Credentials::new("stale");
	let (client, notices) = assemble(&backend, &credentials, false);
	let failure = client.send(Call::get("/profile")).await.expect_err("Refresh should fail.");

	assert_eq!(failure.cancel_reason(), Some(CancelReason::RefreshFailed));
	assert!(notices.lock().is_empty());
}

#[tokio::test]
async fn request_payloads_are_normalized_before_dispatch() {
	let backend = Backend::new("fresh");
	let credentials = Credentials::new("fresh");

	backend.route("/users", json!({ "code": 0, "data": { "id": 7 } }));

	let (client, _notices) = assemble(&backend, &credentials, true);
	let body: Payload = [
		("name", Payload::from(" neo ")),
		("nickname", Payload::from("")),
		("referrer", Payload::Absent),
	]
	.into_iter()
	.collect();
	let created = client
		.send(Call::post("/users").with_body(body.clone()))
		.await
		.expect("Create should succeed.")
		.into_value();

	assert_eq!(created, json!({ "id": 7 }));

	let trimmed = client
		.send(
			Call::post("/users")
				.with_body(body)
				.with_normalize(NormalizeOptions::default().with_trim(true))
				.with_response_return(ResponseReturn::Body),
		)
		.await
		.expect("Create should succeed.")
		.into_value();

	assert_eq!(trimmed, json!({ "code": 0, "data": { "id": 7 } }));

	let bodies = backend.dispatched().into_iter().map(|d| d.body).collect::<Vec<_>>();

	assert_eq!(
		bodies,
		[
			Some(json!({ "name": " neo ", "nickname": null })),
			Some(json!({ "name": "neo", "nickname": null })),
		]
	);
}

#[test]
fn config_round_trips_through_serde() {
	let config = config();

	assert_eq!(
		config.defaults,
		CallDefaults {
			response_return: ResponseReturn::Data,
			error_message_mode: ErrorMessageMode::Modal,
		}
	);
	assert_eq!(
		config.normalize_payload,
		Some(NormalizeOptions::default().with_drop_absent(true).with_empty_to_null(true))
	);
	assert_eq!(config.unwrap, Some(UnwrapConfig::default()));
}
