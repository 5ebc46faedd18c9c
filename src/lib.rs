//! Composable HTTP client interceptors: single-flight token refresh with FIFO replay,
//! response envelope unwrapping, payload normalization, and localized error messages.
//!
//! A [`client::Client`] runs every [`call::Call`] through ordered request interceptors, a
//! pluggable [`transport::Transport`], and a chain of response interceptors. The
//! [`client::ClientBuilder`] wires the built-in interceptors from
//! [`interceptors`] in a fixed order so declarative configuration composes predictably.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod call;
pub mod catalog;
pub mod client;
pub mod error;
pub mod failure;
pub mod interceptors;
pub mod obs;
pub mod payload;
pub mod reply;
pub mod transport;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for tests; enabled via `cfg(test)` or the `test`
	//! crate feature.

	pub use crate::_prelude::*;

	// std
	use std::collections::VecDeque;
	// self
	use crate::{
		call::Call,
		failure::Failure,
		reply::Response,
		transport::{Transport, TransportFuture},
	};

	/// Canned outcome served by [`ScriptedTransport`].
	#[derive(Clone, Debug)]
	pub enum Scripted {
		/// Respond with a status and optional JSON body.
		Status(u16, Option<Value>),
		/// Fail below HTTP with the given transport code and message.
		Transport(Option<&'static str>, &'static str),
	}

	/// In-memory transport that serves scripted outcomes per target.
	///
	/// Each target owns a queue; outcomes are consumed in order and the last one repeats.
	/// Unscripted targets fail with a network error. Every dispatched call is recorded.
	#[derive(Clone, Debug, Default)]
	pub struct ScriptedTransport(Arc<ScriptedState>);
	impl ScriptedTransport {
		/// Queues a status reply with a JSON body for `target`.
		pub fn reply(&self, target: &str, status: u16, body: Value) {
			self.script(target, Scripted::Status(status, Some(body)));
		}

		/// Queues a status reply without a body for `target`.
		pub fn reply_empty(&self, target: &str, status: u16) {
			self.script(target, Scripted::Status(status, None));
		}

		/// Queues a transport failure for `target`.
		pub fn fail(&self, target: &str, code: Option<&'static str>, message: &'static str) {
			self.script(target, Scripted::Transport(code, message));
		}

		/// Queues an arbitrary outcome for `target`.
		pub fn script(&self, target: &str, outcome: Scripted) {
			self.0.routes.lock().entry(target.to_owned()).or_default().push_back(outcome);
		}

		/// Calls dispatched so far, in dispatch order.
		pub fn dispatched(&self) -> Vec<Call> {
			self.0.dispatched.lock().clone()
		}

		fn next(&self, target: &str) -> Option<Scripted> {
			let mut routes = self.0.routes.lock();
			let queue = routes.get_mut(target)?;

			if queue.len() > 1 { queue.pop_front() } else { queue.front().cloned() }
		}
	}
	impl Transport for ScriptedTransport {
		fn send(&self, call: Call) -> TransportFuture {
			self.0.dispatched.lock().push(call.clone());

			let outcome = match self.next(&call.target) {
				Some(Scripted::Status(status, body)) => {
					let response = Response::new(call, status, body);

					if response.is_success() { Ok(response) } else { Err(Failure::status(response)) }
				},
				Some(Scripted::Transport(code, message)) =>
					Err(Failure::transport(code, message).with_call(call)),
				None => Err(Failure::transport(Some(crate::failure::CODE_NETWORK), "Network Error")
					.with_call(call)),
			};

			Box::pin(std::future::ready(outcome))
		}
	}

	#[derive(Debug, Default)]
	struct ScriptedState {
		routes: Mutex<HashMap<String, VecDeque<Scripted>>>,
		dispatched: Mutex<Vec<Call>>,
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use serde_json::Value;
	pub use thiserror::Error as ThisError;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use http;
#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};
