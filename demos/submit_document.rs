//! Submits a handful of documents through a client limited to two requests per second against a
//! local mock of the creation endpoint, printing when each one was admitted.

// std
use std::time::{Duration, Instant};
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use serde_json::json;
// self
use crpt_client::client::{CallOptions, Client};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let create_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/v3/lk/documents/create");
			then.status(201)
				.header("content-type", "application/json")
				.body("{\"value\":\"3fa85f64-5717-4562-b3fc-2c963f66afa6\"}");
		})
		.await;
	let client = Client::builder()
		.limit(2, Duration::from_secs(1))
		.base_url(server.base_url())
		.bearer_auth("demo-token")
		.build()?;
	let options = CallOptions::for_product_group("milk");
	let started = Instant::now();

	for doc_id in 0..5 {
		let document = json!({
			"description": { "participantInn": "7700000000" },
			"doc_id": doc_id,
			"doc_type": "LP_INTRODUCE_GOODS",
		});
		let response = client.submit_with(&document, "ZGVtby1zaWduYXR1cmU=", &options).await?;

		println!(
			"doc {doc_id} -> {} {:?} after {:?}",
			response.status,
			response.document_id(),
			started.elapsed()
		);
	}

	create_mock.assert_calls_async(5).await;

	let metrics = client.metrics();

	println!(
		"attempts={} successes={} failures={}",
		metrics.attempts(),
		metrics.successes(),
		metrics.failures()
	);

	Ok(())
}
