//! Rate-limited client for the CRPT document creation endpoint.
//!
//! Submissions pass a shared fixed-window quota before anything goes on the wire, and every
//! answer is classified into a typed outcome. Transport, codec, and limiter are swappable.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod client;
pub mod codec;
pub mod document;
pub mod error;
pub mod http;
pub mod limiter;
pub mod obs;
pub mod outcome;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		client::{Client, ClientBuilder},
		error::TransportError,
		http::{DocumentTransport, TransportFuture, TransportRequest, TransportResponse},
	};

	type Reply = Arc<dyn Fn() -> Result<TransportResponse, TransportError> + Send + Sync>;

	/// Transport double that records every request and replies with a scripted outcome.
	#[derive(Clone)]
	pub struct RecordingTransport {
		requests: Arc<Mutex<Vec<TransportRequest>>>,
		reply: Reply,
	}
	impl RecordingTransport {
		/// Replies to every request with `status` and `body`.
		pub fn replying(status: u16, body: impl Into<String>) -> Self {
			let body = body.into();

			Self::with_reply(move || Ok(TransportResponse::new(status, body.clone())))
		}

		/// Replies to every request with the provided closure.
		pub fn with_reply(
			reply: impl Fn() -> Result<TransportResponse, TransportError> + 'static + Send + Sync,
		) -> Self {
			Self { requests: Default::default(), reply: Arc::new(reply) }
		}

		/// Returns every request observed so far.
		pub fn requests(&self) -> Vec<TransportRequest> {
			self.requests.lock().clone()
		}

		/// Returns the most recent request.
		pub fn last_request(&self) -> TransportRequest {
			self.requests.lock().last().cloned().expect("Transport should have received a request.")
		}

		/// Returns the number of requests observed so far.
		pub fn calls(&self) -> usize {
			self.requests.lock().len()
		}
	}
	impl DocumentTransport for RecordingTransport {
		fn send(&self, request: TransportRequest) -> TransportFuture<'_> {
			self.requests.lock().push(request);

			let reply = (self.reply)();

			Box::pin(async move { reply })
		}
	}

	impl Debug for RecordingTransport {
		fn fmt(&self, f: &mut Formatter) -> FmtResult {
			f.debug_struct("RecordingTransport").field("calls", &self.calls()).finish()
		}
	}

	/// Builds a client that talks to `transport` with a generous quota.
	pub fn build_test_client(transport: RecordingTransport) -> Client {
		ClientBuilder::default()
			.limit(100, std::time::Duration::from_secs(1))
			.transport(transport)
			.build()
			.expect("Failed to build test client.")
	}
}

mod _prelude {
	pub use std::{
		collections::BTreeMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
		time::Duration,
	};

	pub use parking_lot::Mutex;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use serde_json::Value as JsonValue;
	pub use thiserror::Error as ThisError;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};
