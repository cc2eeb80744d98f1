//! Transport primitives for document submissions.
//!
//! The module exposes [`DocumentTransport`] alongside the plain request/response values it
//! exchanges so downstream crates can plug in custom HTTP stacks (or deterministic fakes)
//! without touching the pipeline. The transport is the client's only dependency on a network
//! stack; it performs exactly one exchange per call, honors the request's timeout, and reports
//! deadline failures as [`TransportError::Timeout`] so the classifier can tell them apart from
//! every other transport failure.

// std
#[cfg(feature = "reqwest")] use std::ops::Deref;
// self
use crate::{
	_prelude::*,
	error::{ConfigError, TransportError},
};

/// Boxed future returned by [`DocumentTransport::send`].
pub type TransportFuture<'a> =
	Pin<Box<dyn Future<Output = Result<TransportResponse, TransportError>> + 'a + Send>>;

/// Abstraction over HTTP transports capable of executing one document exchange.
///
/// Implementations must be `Send + Sync + 'static` so a single instance can be shared by every
/// clone of a client, and the futures they return must be `Send` so callers can spawn
/// submissions onto multi-threaded executors.
pub trait DocumentTransport
where
	Self: 'static + Send + Sync,
{
	/// Performs the exchange and returns the raw response, whatever its status.
	///
	/// Non-2xx statuses are *not* errors at this layer; only failures to obtain a response are.
	fn send(&self, request: TransportRequest) -> TransportFuture<'_>;
}

/// HTTP methods understood by the built-in transport.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Method {
	/// `GET`
	Get,
	/// `POST`
	Post,
	/// `PUT`
	Put,
	/// `DELETE`
	Delete,
}
impl Method {
	/// Returns the canonical upper-case token.
	pub const fn as_str(self) -> &'static str {
		match self {
			Method::Get => "GET",
			Method::Post => "POST",
			Method::Put => "PUT",
			Method::Delete => "DELETE",
		}
	}
}
impl Display for Method {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Fully prepared outbound request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransportRequest {
	/// HTTP method.
	pub method: Method,
	/// Absolute target address.
	pub url: Url,
	/// Header map keyed by lower-case header name.
	pub headers: BTreeMap<String, String>,
	/// Text body; empty for bodiless methods.
	pub body: String,
	/// Deadline for the whole exchange.
	pub timeout: Duration,
}
impl TransportRequest {
	/// Looks up a header by case-insensitive name.
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
	}
}

/// Raw response handed back by a transport.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransportResponse {
	/// HTTP status code.
	pub status: u16,
	/// Response body decoded as UTF-8 text.
	pub body: String,
	/// Response headers keyed by lower-case name; repeated headers keep every value.
	pub headers: BTreeMap<String, Vec<String>>,
}
impl TransportResponse {
	/// Creates a response without headers.
	pub fn new(status: u16, body: impl Into<String>) -> Self {
		Self { status, body: body.into(), headers: BTreeMap::new() }
	}

	/// Appends a header value.
	pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
		self.headers.entry(name.to_ascii_lowercase()).or_default().push(value.into());

		self
	}
}

/// Validates a header name and returns its lower-case form.
pub fn normalize_header_name(name: &str) -> Result<String, ConfigError> {
	const EXTRA_TOKEN_CHARS: &str = "!#$%&'*+-.^_`|~";

	let trimmed = name.trim();

	if trimmed.is_empty()
		|| !trimmed.chars().all(|c| c.is_ascii_alphanumeric() || EXTRA_TOKEN_CHARS.contains(c))
	{
		return Err(ConfigError::InvalidHeaderName { name: name.to_owned() });
	}

	Ok(trimmed.to_ascii_lowercase())
}

/// Rejects header values carrying control characters other than tab.
pub fn validate_header_value(name: &str, value: &str) -> Result<(), ConfigError> {
	if value.bytes().any(|b| (b < b' ' && b != b'\t') || b == 0x7f) {
		return Err(ConfigError::InvalidHeaderValue { name: name.to_owned() });
	}

	Ok(())
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// The connect timeout belongs to the wrapped client; the per-request timeout comes from each
/// [`TransportRequest`].
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransport(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Builds a client that gives up connecting after `connect_timeout`.
	pub fn with_connect_timeout(connect_timeout: Duration) -> Result<Self, ConfigError> {
		let client = ReqwestClient::builder().connect_timeout(connect_timeout).build()?;

		Ok(Self(client))
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestTransport {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestTransport {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl DocumentTransport for ReqwestTransport {
	fn send(&self, request: TransportRequest) -> TransportFuture<'_> {
		let client = self.0.clone();

		Box::pin(async move {
			let method = match request.method {
				Method::Get => reqwest::Method::GET,
				Method::Post => reqwest::Method::POST,
				Method::Put => reqwest::Method::PUT,
				Method::Delete => reqwest::Method::DELETE,
			};
			let mut builder = client.request(method, request.url).timeout(request.timeout);

			for (name, value) in &request.headers {
				builder = builder.header(name.as_str(), value.as_str());
			}
			if matches!(request.method, Method::Post | Method::Put) {
				builder = builder.body(request.body);
			}

			let response = builder.send().await?;
			let status = response.status().as_u16();
			let mut headers = BTreeMap::<String, Vec<String>>::new();

			for (name, value) in response.headers() {
				headers
					.entry(name.as_str().to_owned())
					.or_default()
					.push(String::from_utf8_lossy(value.as_bytes()).into_owned());
			}

			let body = response.text().await?;

			Ok(TransportResponse { status, body, headers })
		})
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn header_names_are_validated_and_lowercased() {
		assert_eq!(
			normalize_header_name("Content-Type").expect("Header name should be valid."),
			"content-type"
		);
		assert_eq!(
			normalize_header_name(" X-Request-Id ").expect("Header name should be valid."),
			"x-request-id"
		);
		assert!(normalize_header_name("").is_err());
		assert!(normalize_header_name("bad header").is_err());
		assert!(normalize_header_name("bad:header").is_err());
	}

	#[test]
	fn header_values_reject_control_characters() {
		assert!(validate_header_value("authorization", "Bearer t0k3n").is_ok());
		assert!(validate_header_value("x-note", "tab\tseparated, ünïcode").is_ok());

		for bad in ["tok\nen", "tok\ren", "nul\0", "del\u{7f}"] {
			assert!(matches!(
				validate_header_value("x-note", bad),
				Err(ConfigError::InvalidHeaderValue { .. })
			));
		}
	}

	#[test]
	fn response_headers_accumulate_values() {
		let response = TransportResponse::new(200, "")
			.with_header("Set-Cookie", "a=1")
			.with_header("set-cookie", "b=2");

		assert_eq!(response.headers.get("set-cookie"), Some(&vec!["a=1".into(), "b=2".into()]));
	}

	#[test]
	fn methods_render_canonical_tokens() {
		assert_eq!(Method::Post.to_string(), "POST");
		assert_eq!(Method::Delete.as_str(), "DELETE");
	}
}
