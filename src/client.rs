//! Rate-limited document client.

/// Builder API for assembling clients.
pub mod builder;
/// Submission counters shared by every clone of a client.
pub mod metrics;
pub mod options;

mod submit;

pub use builder::*;
pub use metrics::*;
pub use options::*;

// self
#[cfg(feature = "reqwest")] use crate::error::ConfigError;
use crate::{
	_prelude::*,
	codec::PayloadCodec,
	http::DocumentTransport,
	limiter::{self, Cancelled, RateLimiter},
};

/// Immutable settings shared by every clone of a [`Client`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
	/// Base address the endpoint path is joined onto.
	pub base_url: Url,
	/// Connect timeout handed to the default transport.
	pub connect_timeout: Duration,
	/// Request timeout used when a call does not override it.
	pub request_timeout: Duration,
	/// Headers sent with every request, keyed by lower-case name.
	pub default_headers: BTreeMap<String, String>,
}

/// Submits documents to the creation endpoint under a shared request quota.
///
/// The client owns the limiter, transport, and codec behind `Arc`s, so clones are cheap and
/// share one quota counter. Every clone may be used from any number of tasks concurrently;
/// the limiter bounds how many submissions are *admitted* per window, not how many are in
/// flight.
#[derive(Clone)]
pub struct Client {
	config: Arc<ClientConfig>,
	transport: Arc<dyn DocumentTransport>,
	codec: Arc<dyn PayloadCodec>,
	limiter: Arc<dyn RateLimiter>,
	metrics: Arc<SubmitMetrics>,
}
impl Client {
	/// Starts a [`ClientBuilder`] seeded with the defaults.
	pub fn builder() -> ClientBuilder {
		ClientBuilder::default()
	}

	/// Creates a client with default settings and the given quota.
	#[cfg(feature = "reqwest")]
	pub fn new(limit: u32, window: Duration) -> Result<Self, ConfigError> {
		ClientBuilder::default().limit(limit, window).build()
	}

	pub(crate) fn from_parts(
		config: ClientConfig,
		transport: Arc<dyn DocumentTransport>,
		codec: Arc<dyn PayloadCodec>,
		limiter: Arc<dyn RateLimiter>,
	) -> Self {
		Self {
			config: Arc::new(config),
			transport,
			codec,
			limiter,
			metrics: Default::default(),
		}
	}

	/// Settings this client was built with.
	pub fn config(&self) -> &ClientConfig {
		&self.config
	}

	/// Submission counters shared by every clone.
	pub fn metrics(&self) -> &SubmitMetrics {
		&self.metrics
	}

	/// Takes a permit from the client's quota if one is available right now.
	pub fn try_acquire_permit(&self) -> bool {
		self.limiter.try_acquire()
	}

	/// Waits for a permit from the client's quota.
	pub async fn acquire_permit(&self) -> Result<(), Cancelled> {
		self.limiter.acquire(limiter::never()).await
	}
}
impl Debug for Client {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Client")
			.field("base_url", &self.config.base_url.as_str())
			.field("request_timeout", &self.config.request_timeout)
			.field("default_headers", &self.config.default_headers.keys().collect::<Vec<_>>())
			.finish()
	}
}
