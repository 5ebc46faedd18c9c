//! Demonstrates two concurrent calls with an expired token sharing a single refresh and
//! being replayed in arrival order, against a local mock backend.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use parking_lot::RwLock;
use serde::Deserialize;
use serde_json::json;
// self
use http_easy::{
	call::{Call, CallDefaults, ResponseReturn},
	client::Client,
	error::Error,
	failure::Failure,
	http::{HeaderValue, header::AUTHORIZATION},
	interceptors::{AuthenticateInterceptor, AuthenticateOptions, UnwrapOptions},
	transport::{ReqwestTransport, TransportConfig},
};

#[derive(Debug, Deserialize)]
struct Grant {
	token: String,
}

#[derive(Debug, Deserialize)]
struct Pet {
	id: u64,
	name: String,
}

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;

	for (id, name) in [(1, "mochi"), (2, "tofu")] {
		let path = format!("/pets/{id}");

		server
			.mock_async(|when, then| {
				when.method(GET).path(path.clone()).header("authorization", "Bearer stale");
				then.status(401).json_body(json!({ "message": "token expired" }));
			})
			.await;
		server
			.mock_async(|when, then| {
				when.method(GET).path(path.clone()).header("authorization", "Bearer fresh");
				then.status(200).json_body(json!({ "code": 0, "data": { "id": id, "name": name } }));
			})
			.await;
	}

	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path("/auth/refresh");
			then.status(200).json_body(json!({ "code": 0, "data": { "token": "fresh" } }));
		})
		.await;
	let token = Arc::new(RwLock::new(String::from("stale")));
	let transport = ReqwestTransport::new(&TransportConfig {
		base_url: Some(server.base_url()),
		..TransportConfig::default()
	})?;
	let client = Client::builder(transport)
		.defaults(CallDefaults { response_return: ResponseReturn::Data, ..Default::default() })
		.unwrap_response(UnwrapOptions::default())
		.build()?;
	let store = Arc::clone(&token);
	let refresher = client.clone();
	let auth = AuthenticateInterceptor::new(
		AuthenticateOptions::new(|_| async {
			println!("Re-authentication requested.");

			Ok::<(), Error>(())
		})
		.with_refresh_enabled(true)
		.with_refresh_token(move |_| {
			let client = refresher.clone();
			let store = Arc::clone(&store);

			async move {
				let grant = client.request::<Grant>(Call::post("/auth/refresh")).await?;

				println!("Refreshed token: {}.", grant.token);

				*store.write() = grant.token;

				Ok::<(), Error>(())
			}
		})
		.with_auth_failure_predicate(|failure: &Failure| {
			failure.http_status() == Some(401)
				&& failure.call().is_some_and(|call| call.target != "/auth/refresh")
		}),
	)?;
	let attach = Arc::clone(&token);

	client.add_request_interceptor(move |call: Call| -> Result<Call, Failure> {
		let value = HeaderValue::from_str(&format!("Bearer {}", attach.read()))
			.map_err(|e| Failure::internal("invalid token").with_source(e))?;

		Ok(call.with_header(AUTHORIZATION, value))
	});
	client.add_response_interceptor(auth.clone());

	let (first, second) = tokio::join!(
		client.request::<Pet>(Call::get("/pets/1")),
		client.request::<Pet>(Call::get("/pets/2")),
	);

	for pet in [first?, second?] {
		println!("Pet #{}: {}.", pet.id, pet.name);
	}

	println!(
		"Refresh attempts: {}, queued calls: {}, replays: {}.",
		auth.metrics().attempts(),
		auth.metrics().queued(),
		auth.metrics().replays()
	);

	refresh.assert_calls_async(1).await;

	Ok(())
}
