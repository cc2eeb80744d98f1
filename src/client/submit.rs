//! Document submission pipeline.
//!
//! [`Client::submit`] validates its inputs, takes one permit from the client's limiter, builds
//! the request envelope, sends it through the transport, and classifies the answer. Nothing
//! below the limiter runs until the permit is granted, and no lock is held while the request is
//! in flight. Failures are never retried here; retry policy belongs to the caller.

// self
use crate::{
	_prelude::*,
	client::{CallOptions, Client},
	codec::{self, seal_document},
	document::{self, CREATE_DOCUMENT_PATH, CreateDocumentRequest, CreateDocumentResponse},
	http::{self, Method, TransportRequest},
	limiter::{self, CancelSignal},
	obs::{self, SubmitOutcome, SubmitSpan},
	outcome::{self, SubmitResponse},
};

const CONTENT_TYPE: &str = "content-type";
const APPLICATION_JSON: &str = "application/json";

impl Client {
	/// Submits `document` with its detached `signature` using default call options.
	pub async fn submit<D>(&self, document: &D, signature: &str) -> Result<SubmitResponse>
	where
		D: ?Sized + Serialize,
	{
		self.submit_with(document, signature, &CallOptions::default()).await
	}

	/// Submits `document` with per-call overrides.
	pub async fn submit_with<D>(
		&self,
		document: &D,
		signature: &str,
		options: &CallOptions,
	) -> Result<SubmitResponse>
	where
		D: ?Sized + Serialize,
	{
		self.submit_until(document, signature, options, std::future::pending()).await
	}

	/// Submits `document`, giving up with [`Error::Cancelled`] if `cancel` resolves while the
	/// call is still waiting for its admission permit.
	///
	/// Once the permit is granted `cancel` is no longer observed; the transport's own timeout
	/// bounds the exchange.
	pub async fn submit_until<'a, D, F>(
		&'a self,
		document: &D,
		signature: &str,
		options: &CallOptions,
		cancel: F,
	) -> Result<SubmitResponse>
	where
		D: ?Sized + Serialize,
		F: 'a + Send + Future<Output = ()>,
	{
		let span = SubmitSpan::new("submit");

		self.metrics.record_attempt();
		obs::record_submit_outcome(SubmitOutcome::Attempt);

		let document = serde_json::to_value(document).map_err(Error::preparation);
		let cancel: CancelSignal<'a> = match options.admission_timeout {
			Some(timeout) => limiter::either(Box::pin(cancel), limiter::after(timeout)),
			None => Box::pin(cancel),
		};
		let result = span.instrument(self.run(document, signature, options, cancel)).await;

		match &result {
			Ok(_) => {
				self.metrics.record_success();
				obs::record_submit_outcome(SubmitOutcome::Success);
			},
			Err(Error::Cancelled) => {
				self.metrics.record_cancelled();
				obs::record_submit_outcome(SubmitOutcome::Cancelled);
			},
			Err(_) => {
				self.metrics.record_failure();
				obs::record_submit_outcome(SubmitOutcome::Failure);
			},
		}

		result
	}

	async fn run<'a>(
		&'a self,
		document: Result<JsonValue>,
		signature: &str,
		options: &CallOptions,
		cancel: CancelSignal<'a>,
	) -> Result<SubmitResponse> {
		let document = document?;

		validate_inputs(&document, signature)?;

		self.limiter.acquire(cancel).await?;

		let request = self.prepare(&document, signature, options)?;

		obs::debug_dispatch(&request);

		let result = self.transport.send(request).await;

		if let Ok(raw) = &result {
			obs::debug_response(raw.status, &raw.headers);
		}

		let response = outcome::classify(result)?;
		let parsed = self.parse_success_body(&response.body);

		Ok(SubmitResponse {
			status: response.status,
			body: response.body,
			headers: response.headers,
			parsed,
		})
	}

	/// Builds the wire request; every failure here is a preparation failure.
	fn prepare(
		&self,
		document: &JsonValue,
		signature: &str,
		options: &CallOptions,
	) -> Result<TransportRequest> {
		let text = self.codec.encode(document).map_err(Error::preparation)?;
		let product_group = document::non_blank(options.product_group.as_deref());
		let envelope =
			CreateDocumentRequest::introduce_goods(seal_document(&text), product_group, signature);
		let envelope = serde_json::to_value(&envelope).map_err(Error::preparation)?;
		let body = self.codec.encode(&envelope).map_err(Error::preparation)?;

		Ok(TransportRequest {
			method: Method::Post,
			url: self.create_document_url(product_group)?,
			headers: self.merge_headers(options)?,
			body,
			timeout: options.request_timeout.unwrap_or(self.config.request_timeout),
		})
	}

	fn create_document_url(&self, product_group: Option<&str>) -> Result<Url> {
		let mut url = self.config.base_url.join(CREATE_DOCUMENT_PATH).map_err(Error::preparation)?;

		if let Some(product_group) = product_group {
			url.query_pairs_mut().append_pair("pg", product_group);
		}

		Ok(url)
	}

	fn merge_headers(&self, options: &CallOptions) -> Result<BTreeMap<String, String>> {
		let mut headers = self.config.default_headers.clone();

		headers.entry(CONTENT_TYPE.into()).or_insert_with(|| APPLICATION_JSON.into());

		for (name, value) in &options.headers {
			let name = http::normalize_header_name(name).map_err(Error::preparation)?;

			http::validate_header_value(&name, value).map_err(Error::preparation)?;
			headers.insert(name, value.clone());
		}

		Ok(headers)
	}

	fn parse_success_body(&self, body: &str) -> Option<CreateDocumentResponse> {
		if body.trim().is_empty() {
			return None;
		}

		codec::decode_as::<CreateDocumentResponse>(self.codec.as_ref(), body)
			.map_err(|e| obs::warn_unparsed_body(&e))
			.ok()
	}
}

fn validate_inputs(document: &JsonValue, signature: &str) -> Result<()> {
	if document.is_null() {
		return Err(Error::invalid_argument("document must not be null"));
	}
	if signature.trim().is_empty() {
		return Err(Error::invalid_argument("signature must not be blank"));
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::_preludet::{RecordingTransport, build_test_client};

	#[test]
	fn null_document_and_blank_signature_are_invalid() {
		let doc = serde_json::json!({ "a": 1 });

		assert!(validate_inputs(&doc, "sig==").is_ok());
		assert!(matches!(
			validate_inputs(&JsonValue::Null, "sig=="),
			Err(Error::InvalidArgument { .. })
		));
		assert!(matches!(validate_inputs(&doc, "  "), Err(Error::InvalidArgument { .. })));
	}

	#[test]
	fn url_keeps_base_host_and_appends_group() {
		let client = Client::builder()
			.base_url("https://sandbox.example.com/ignored/path")
			.transport(RecordingTransport::replying(200, ""))
			.build()
			.expect("Failed to build client with a custom base URL.");

		assert_eq!(
			client.create_document_url(None).expect("URL should build.").as_str(),
			"https://sandbox.example.com/api/v3/lk/documents/create"
		);
		assert_eq!(
			client.create_document_url(Some("milk")).expect("URL should build.").as_str(),
			"https://sandbox.example.com/api/v3/lk/documents/create?pg=milk"
		);
	}

	#[test]
	fn call_headers_override_defaults_case_insensitively() {
		let client = build_test_client(RecordingTransport::replying(200, ""));
		let options = CallOptions::default()
			.with_header("Content-Type", "application/json; charset=utf-8")
			.with_header("X-Trace", "1")
			.with_header("x-trace", "2");
		let headers = client.merge_headers(&options).expect("Headers should merge.");

		assert_eq!(
			headers.get("content-type").map(String::as_str),
			Some("application/json; charset=utf-8")
		);
		assert_eq!(headers.get("x-trace").map(String::as_str), Some("2"));
	}

	#[test]
	fn unparseable_success_body_degrades_to_none() {
		let client = build_test_client(RecordingTransport::replying(200, ""));

		assert_eq!(
			client.parse_success_body("{\"value\":\"doc-1\"}"),
			Some(CreateDocumentResponse { value: "doc-1".into() })
		);
		assert_eq!(client.parse_success_body("{}"), None);
		assert_eq!(client.parse_success_body("<html>"), None);
		assert_eq!(client.parse_success_body("   "), None);
	}

	#[tokio::test]
	async fn one_submission_makes_one_post() {
		let transport = RecordingTransport::replying(200, "{\"value\":\"doc-7\"}");
		let client = build_test_client(transport.clone());
		let response = client
			.submit(&serde_json::json!({ "doc_id": 7 }), "sig==")
			.await
			.expect("Submission should succeed.");
		let request = transport.last_request();

		assert_eq!(response.document_id(), Some("doc-7"));
		assert_eq!(transport.calls(), 1);
		assert_eq!(transport.requests(), vec![request.clone()]);
		assert_eq!(request.method, Method::Post);
		assert_eq!(request.header("content-type"), Some(APPLICATION_JSON));
		assert_eq!(request.url.path(), CREATE_DOCUMENT_PATH);
	}
}
