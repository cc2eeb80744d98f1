//! Client-level error types shared by the limiter, the pipeline, and the transports.

// self
use crate::_prelude::*;

/// Client-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Boxed error used for underlying causes.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical client error exposed by public APIs.
///
/// Variants mirror the outcome taxonomy: everything that happens before the permit is taken
/// (`InvalidArgument`), while waiting for it (`Cancelled`), while preparing the request
/// (`PreparationFailed`), inside the transport (`Timeout`, `Transport`), and the classified
/// non-2xx statuses. Status-bearing variants keep the raw body for diagnostics.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// A required input is missing or blank; raised before any permit is consumed.
	#[error("Invalid argument: {reason}.")]
	InvalidArgument {
		/// Which input was rejected and why.
		reason: String,
	},
	/// Waiting for an admission permit was aborted.
	#[error("Waiting for an admission permit was cancelled.")]
	Cancelled,
	/// Encoding or address construction failed.
	#[error("Failed to prepare the document request.")]
	PreparationFailed {
		/// Underlying codec or URL failure.
		#[source]
		source: BoxError,
	},
	/// Transport exceeded its deadline.
	#[error("Request timed out while calling the document endpoint.")]
	Timeout {
		/// Transport-specific timeout error.
		#[source]
		source: BoxError,
	},
	/// Transport failure (DNS, TCP, TLS, protocol).
	#[error("Network error occurred while calling the document endpoint.")]
	Transport {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},

	/// Endpoint answered 429.
	#[error("Request quota exceeded on the server side ({status}).")]
	RateLimitExceeded {
		/// HTTP status code.
		status: u16,
		/// Raw response body.
		body: String,
	},
	/// Endpoint rejected the payload (400 or 422).
	#[error("Document request was rejected as malformed ({status}).")]
	BadRequest {
		/// HTTP status code.
		status: u16,
		/// Raw response body.
		body: String,
	},
	/// Endpoint rejected the credentials (401 or 403).
	#[error("Authentication or authorization failed ({status}).")]
	AuthenticationFailed {
		/// HTTP status code.
		status: u16,
		/// Raw response body.
		body: String,
	},
	/// Endpoint failed internally (5xx).
	#[error("Document endpoint returned a server error ({status}).")]
	ServerError {
		/// HTTP status code.
		status: u16,
		/// Raw response body.
		body: String,
	},
	/// Any other non-2xx status.
	#[error("Document endpoint returned an unsuccessful status ({status}).")]
	GenericFailure {
		/// HTTP status code.
		status: u16,
		/// Raw response body.
		body: String,
	},
}
impl Error {
	/// Builds an [`Error::InvalidArgument`] from a reason string.
	pub fn invalid_argument(reason: impl Into<String>) -> Self {
		Self::InvalidArgument { reason: reason.into() }
	}

	/// Wraps a preparation failure.
	pub fn preparation(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::PreparationFailed { source: Box::new(src) }
	}

	/// Returns the stable classification of this error.
	pub fn kind(&self) -> ErrorKind {
		match self {
			Self::Config(_) => ErrorKind::Config,
			Self::InvalidArgument { .. } => ErrorKind::InvalidArgument,
			Self::Cancelled => ErrorKind::Cancelled,
			Self::PreparationFailed { .. } => ErrorKind::PreparationFailed,
			Self::Timeout { .. } => ErrorKind::Timeout,
			Self::Transport { .. } => ErrorKind::TransportFailure,
			Self::RateLimitExceeded { .. } => ErrorKind::RateLimitExceeded,
			Self::BadRequest { .. } => ErrorKind::BadRequest,
			Self::AuthenticationFailed { .. } => ErrorKind::AuthenticationFailed,
			Self::ServerError { .. } => ErrorKind::ServerError,
			Self::GenericFailure { .. } => ErrorKind::GenericFailure,
		}
	}

	/// HTTP status code, when the error came from a response.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::RateLimitExceeded { status, .. }
			| Self::BadRequest { status, .. }
			| Self::AuthenticationFailed { status, .. }
			| Self::ServerError { status, .. }
			| Self::GenericFailure { status, .. } => Some(*status),
			_ => None,
		}
	}

	/// Raw response body, when the error came from a response.
	pub fn body(&self) -> Option<&str> {
		match self {
			Self::RateLimitExceeded { body, .. }
			| Self::BadRequest { body, .. }
			| Self::AuthenticationFailed { body, .. }
			| Self::ServerError { body, .. }
			| Self::GenericFailure { body, .. } => Some(body),
			_ => None,
		}
	}
}
impl From<TransportError> for Error {
	fn from(e: TransportError) -> Self {
		match e {
			TransportError::Timeout { source } => Self::Timeout { source },
			TransportError::Other { source } => Self::Transport { source },
		}
	}
}

/// Stable, fieldless view of [`Error`] for matching and labeling.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
	/// See [`Error::Config`].
	Config,
	/// See [`Error::InvalidArgument`].
	InvalidArgument,
	/// See [`Error::Cancelled`].
	Cancelled,
	/// See [`Error::PreparationFailed`].
	PreparationFailed,
	/// See [`Error::Timeout`].
	Timeout,
	/// See [`Error::Transport`].
	TransportFailure,
	/// See [`Error::RateLimitExceeded`].
	RateLimitExceeded,
	/// See [`Error::BadRequest`].
	BadRequest,
	/// See [`Error::AuthenticationFailed`].
	AuthenticationFailed,
	/// See [`Error::ServerError`].
	ServerError,
	/// See [`Error::GenericFailure`].
	GenericFailure,
}

/// Configuration and validation failures raised while building a client.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Base URL cannot be parsed.
	#[error("Base URL is invalid.")]
	InvalidBaseUrl {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Base URL cannot carry a path (e.g. `mailto:`).
	#[error("Base URL `{url}` cannot be used as a base.")]
	CannotBeABase {
		/// Offending URL.
		url: String,
	},
	/// Header name is empty or not a valid token.
	#[error("Header name `{name}` is invalid.")]
	InvalidHeaderName {
		/// Offending header name.
		name: String,
	},
	/// Header value contains a control character.
	#[error("Value of header `{name}` contains a forbidden character.")]
	InvalidHeaderValue {
		/// Name of the header carrying the offending value.
		name: String,
	},
	/// Quota limit must be positive.
	#[error("Request limit must be greater than zero.")]
	ZeroLimit,
	/// Quota window must be positive.
	#[error("Quota window must be longer than zero.")]
	ZeroWindow,
	/// No transport was configured and the default one is compiled out.
	#[error("No transport configured; enable the `reqwest` feature or supply one.")]
	MissingTransport,
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO, deadline).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// The exchange did not finish before its deadline.
	#[error("Transport deadline elapsed.")]
	Timeout {
		/// Transport-specific timeout error.
		#[source]
		source: BoxError,
	},
	/// Any other failure (connection refused, TLS, protocol).
	#[error("Transport failed.")]
	Other {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
}
impl TransportError {
	/// Wraps a transport-specific deadline error.
	pub fn timeout(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Timeout { source: Box::new(src) }
	}

	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Other { source: Box::new(src) }
	}
}
impl From<std::io::Error> for TransportError {
	fn from(e: std::io::Error) -> Self {
		if e.kind() == std::io::ErrorKind::TimedOut { Self::timeout(e) } else { Self::network(e) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		if e.is_timeout() { Self::timeout(e) } else { Self::network(e) }
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn io_timeouts_map_to_timeout_kind() {
		let err: Error =
			TransportError::from(std::io::Error::new(std::io::ErrorKind::TimedOut, "slow")).into();

		assert_eq!(err.kind(), ErrorKind::Timeout);

		let err: Error =
			TransportError::from(std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "down"))
				.into();

		assert_eq!(err.kind(), ErrorKind::TransportFailure);
		assert!(StdError::source(&err).is_some());
	}

	#[test]
	fn status_errors_expose_diagnostics() {
		let err = Error::ServerError { status: 503, body: "maintenance".into() };

		assert_eq!(err.status(), Some(503));
		assert_eq!(err.body(), Some("maintenance"));
		assert_eq!(Error::Cancelled.status(), None);
		assert_eq!(Error::Cancelled.body(), None);
	}
}
