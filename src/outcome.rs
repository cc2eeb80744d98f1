//! Outcome classification for transport results.
//!
//! [`classify`] is a pure mapping from what the transport returned to either the raw
//! successful response or a typed [`Error`]. Decoding the success body is left to the caller
//! so a shape mismatch can degrade gracefully instead of failing the call.

// self
use crate::{
	_prelude::*,
	document::CreateDocumentResponse,
	error::TransportError,
	http::TransportResponse,
};

/// Classification of an HTTP status code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OutcomeKind {
	/// 200–299.
	Success,
	/// 429.
	RateLimitExceeded,
	/// 400 or 422.
	BadRequest,
	/// 401 or 403.
	AuthenticationFailed,
	/// 500–599.
	ServerError,
	/// Any other status.
	GenericFailure,
}

/// Maps a status code onto its [`OutcomeKind`].
pub const fn classify_status(status: u16) -> OutcomeKind {
	match status {
		200..=299 => OutcomeKind::Success,
		429 => OutcomeKind::RateLimitExceeded,
		400 | 422 => OutcomeKind::BadRequest,
		401 | 403 => OutcomeKind::AuthenticationFailed,
		500..=599 => OutcomeKind::ServerError,
		_ => OutcomeKind::GenericFailure,
	}
}

/// Turns a transport result into the raw 2xx response or a classified [`Error`].
pub fn classify(
	result: Result<TransportResponse, TransportError>,
) -> Result<TransportResponse, Error> {
	let response = result?;
	let status = response.status;
	let kind = classify_status(status);

	if kind == OutcomeKind::Success {
		return Ok(response);
	}

	let body = response.body;

	Err(match kind {
		OutcomeKind::RateLimitExceeded => Error::RateLimitExceeded { status, body },
		OutcomeKind::BadRequest => Error::BadRequest { status, body },
		OutcomeKind::AuthenticationFailed => Error::AuthenticationFailed { status, body },
		OutcomeKind::ServerError => Error::ServerError { status, body },
		OutcomeKind::Success | OutcomeKind::GenericFailure =>
			Error::GenericFailure { status, body },
	})
}

/// Successful submission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmitResponse {
	/// HTTP status code (2xx).
	pub status: u16,
	/// Raw response body.
	pub body: String,
	/// Response headers keyed by lower-case name.
	pub headers: BTreeMap<String, Vec<String>>,
	/// Decoded body; `None` when the body is blank or has an unexpected shape.
	pub parsed: Option<CreateDocumentResponse>,
}
impl SubmitResponse {
	/// Identifier of the created document, when the body carried one.
	pub fn document_id(&self) -> Option<&str> {
		self.parsed.as_ref().map(|parsed| parsed.value.as_str())
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::error::ErrorKind;

	fn kind_of(status: u16) -> Option<ErrorKind> {
		classify(Ok(TransportResponse::new(status, "body"))).err().map(|err| err.kind())
	}

	#[test]
	fn status_boundaries_map_to_expected_kinds() {
		let table = [
			(200, None),
			(299, None),
			(300, Some(ErrorKind::GenericFailure)),
			(400, Some(ErrorKind::BadRequest)),
			(404, Some(ErrorKind::GenericFailure)),
			(422, Some(ErrorKind::BadRequest)),
			(429, Some(ErrorKind::RateLimitExceeded)),
			(401, Some(ErrorKind::AuthenticationFailed)),
			(403, Some(ErrorKind::AuthenticationFailed)),
			(500, Some(ErrorKind::ServerError)),
			(599, Some(ErrorKind::ServerError)),
			(600, Some(ErrorKind::GenericFailure)),
			(199, Some(ErrorKind::GenericFailure)),
		];

		for (status, expected) in table {
			assert_eq!(kind_of(status), expected, "Unexpected classification for {status}.");
		}
	}

	#[test]
	fn failures_keep_status_and_body() {
		let err = classify(Ok(TransportResponse::new(422, "{\"error\":\"bad inn\"}")))
			.expect_err("422 should be classified as a failure.");

		assert_eq!(err.status(), Some(422));
		assert_eq!(err.body(), Some("{\"error\":\"bad inn\"}"));
	}

	#[test]
	fn transport_failures_are_split_by_deadline() {
		let timeout = classify(Err(TransportError::timeout(std::io::Error::new(
			std::io::ErrorKind::TimedOut,
			"deadline",
		))))
		.expect_err("Timeouts should fail.");
		let refused = classify(Err(TransportError::network(std::io::Error::new(
			std::io::ErrorKind::ConnectionRefused,
			"refused",
		))))
		.expect_err("Connection failures should fail.");

		assert_eq!(timeout.kind(), ErrorKind::Timeout);
		assert_eq!(refused.kind(), ErrorKind::TransportFailure);
		assert!(StdError::source(&refused).is_some());
	}
}
