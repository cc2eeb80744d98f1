// std
use std::num::NonZeroU32;
// self
use crate::{
	_prelude::*,
	client::{Client, ClientConfig},
	codec::{JsonCodec, PayloadCodec},
	error::ConfigError,
	http::{self, DocumentTransport},
	limiter::{FixedWindowLimiter, RateLimiter},
};

/// Default base address of the endpoint.
pub const DEFAULT_BASE_URL: &str = "https://ismp.crpt.ru";
/// Default connect timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// Default request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
/// Default number of requests admitted per window.
pub const DEFAULT_LIMIT: u32 = 10;
/// Default quota window.
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(1);

/// Builder for [`Client`] values.
///
/// Every setting is optional. Collaborators left unset fall back to the built-in
/// implementations: a [`FixedWindowLimiter`] sized by [`limit`](Self::limit), a
/// [`JsonCodec`], and (with the `reqwest` feature) a reqwest transport using the configured
/// connect timeout.
pub struct ClientBuilder {
	limit: u32,
	window: Duration,
	base_url: String,
	connect_timeout: Duration,
	request_timeout: Duration,
	default_headers: Vec<(String, String)>,
	transport: Option<Arc<dyn DocumentTransport>>,
	codec: Option<Arc<dyn PayloadCodec>>,
	rate_limiter: Option<Arc<dyn RateLimiter>>,
}
impl ClientBuilder {
	/// Admits at most `requests` calls per `window`.
	pub fn limit(mut self, requests: u32, window: Duration) -> Self {
		self.limit = requests;
		self.window = window;

		self
	}

	/// Overrides the base address.
	pub fn base_url(mut self, url: impl Into<String>) -> Self {
		self.base_url = url.into();

		self
	}

	/// Overrides both timeouts.
	pub fn timeouts(mut self, connect: Duration, request: Duration) -> Self {
		self.connect_timeout = connect;
		self.request_timeout = request;

		self
	}

	/// Adds or replaces a header sent with every request.
	pub fn default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.default_headers.push((name.into(), value.into()));

		self
	}

	/// Sends `Authorization: Bearer <token>` with every request.
	pub fn bearer_auth(self, token: impl Display) -> Self {
		self.default_header("Authorization", format!("Bearer {token}"))
	}

	/// Sends `Content-Type: application/json` with every request.
	pub fn content_type_json(self) -> Self {
		self.default_header("Content-Type", "application/json")
	}

	/// Uses `transport` instead of the built-in one.
	pub fn transport<T>(self, transport: T) -> Self
	where
		T: DocumentTransport,
	{
		self.shared_transport(Arc::new(transport))
	}

	/// Uses an already shared transport.
	pub fn shared_transport(mut self, transport: Arc<dyn DocumentTransport>) -> Self {
		self.transport = Some(transport);

		self
	}

	/// Uses `codec` instead of [`JsonCodec`].
	pub fn codec<T>(mut self, codec: T) -> Self
	where
		T: 'static + PayloadCodec,
	{
		self.codec = Some(Arc::new(codec));

		self
	}

	/// Uses `limiter` instead of a [`FixedWindowLimiter`]; the configured limit is then ignored.
	pub fn rate_limiter<T>(self, limiter: T) -> Self
	where
		T: 'static + RateLimiter,
	{
		self.shared_rate_limiter(Arc::new(limiter))
	}

	/// Uses an already shared limiter, e.g. one quota across several clients.
	pub fn shared_rate_limiter(mut self, limiter: Arc<dyn RateLimiter>) -> Self {
		self.rate_limiter = Some(limiter);

		self
	}

	/// Consumes the builder and validates the resulting client.
	pub fn build(self) -> Result<Client, ConfigError> {
		let base_url = Url::parse(&self.base_url)
			.map_err(|source| ConfigError::InvalidBaseUrl { source })?;

		if base_url.cannot_be_a_base() {
			return Err(ConfigError::CannotBeABase { url: self.base_url });
		}

		let mut default_headers = BTreeMap::new();

		for (name, value) in self.default_headers {
			let name = http::normalize_header_name(&name)?;

			http::validate_header_value(&name, &value)?;
			default_headers.insert(name, value);
		}

		let limiter = match self.rate_limiter {
			Some(limiter) => limiter,
			None => {
				let limit = NonZeroU32::new(self.limit).ok_or(ConfigError::ZeroLimit)?;

				Arc::new(FixedWindowLimiter::new(limit, self.window)?)
			},
		};
		let transport = match self.transport {
			Some(transport) => transport,
			None => default_transport(self.connect_timeout)?,
		};
		let codec = self.codec.unwrap_or_else(|| Arc::new(JsonCodec));
		let config = ClientConfig {
			base_url,
			connect_timeout: self.connect_timeout,
			request_timeout: self.request_timeout,
			default_headers,
		};

		Ok(Client::from_parts(config, transport, codec, limiter))
	}
}
impl Default for ClientBuilder {
	fn default() -> Self {
		Self {
			limit: DEFAULT_LIMIT,
			window: DEFAULT_WINDOW,
			base_url: DEFAULT_BASE_URL.into(),
			connect_timeout: DEFAULT_CONNECT_TIMEOUT,
			request_timeout: DEFAULT_REQUEST_TIMEOUT,
			default_headers: Vec::new(),
			transport: None,
			codec: None,
			rate_limiter: None,
		}
	}
}
impl Debug for ClientBuilder {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ClientBuilder")
			.field("limit", &self.limit)
			.field("window", &self.window)
			.field("base_url", &self.base_url)
			.field("connect_timeout", &self.connect_timeout)
			.field("request_timeout", &self.request_timeout)
			.field("transport_set", &self.transport.is_some())
			.field("codec_set", &self.codec.is_some())
			.field("rate_limiter_set", &self.rate_limiter.is_some())
			.finish()
	}
}

#[cfg(feature = "reqwest")]
fn default_transport(
	connect_timeout: Duration,
) -> Result<Arc<dyn DocumentTransport>, ConfigError> {
	Ok(Arc::new(crate::http::ReqwestTransport::with_connect_timeout(connect_timeout)?))
}

#[cfg(not(feature = "reqwest"))]
fn default_transport(_: Duration) -> Result<Arc<dyn DocumentTransport>, ConfigError> {
	Err(ConfigError::MissingTransport)
}
