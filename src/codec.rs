//! Payload codec contracts plus the base64 envelope used for embedded documents.

// crates.io
use base64::{Engine, engine::general_purpose::STANDARD};
use serde::de::DeserializeOwned;
// self
use crate::_prelude::*;

/// Serializes structured values to text and back.
///
/// Implementations must be deterministic: structurally equal values encode to the same text,
/// and decoding an encoded value yields a structurally equal value.
pub trait PayloadCodec
where
	Self: Send + Sync,
{
	/// Encodes `value` into its canonical text form.
	fn encode(&self, value: &JsonValue) -> Result<String, CodecError>;

	/// Decodes `text` into a structured value.
	fn decode(&self, text: &str) -> Result<JsonValue, CodecError>;
}

/// Decodes `text` with `codec` and maps it onto `T`, reporting the failing path on mismatch.
pub fn decode_as<T>(codec: &dyn PayloadCodec, text: &str) -> Result<T, CodecError>
where
	T: DeserializeOwned,
{
	let value = codec.decode(text)?;

	serde_path_to_error::deserialize(value).map_err(CodecError::from)
}

/// Errors produced by [`PayloadCodec`] implementations.
#[derive(Debug, ThisError)]
pub enum CodecError {
	/// Text is not valid for the codec's format.
	#[error("Payload is not valid JSON.")]
	Syntax(#[from] serde_json::Error),
	/// Text is valid but does not fit the expected shape.
	#[error("Payload does not match the expected shape at `{path}`.")]
	Shape {
		/// Path of the offending field.
		path: String,
		/// Structured deserialization failure.
		#[source]
		source: serde_json::Error,
	},
	/// Envelope text is not valid base64 or not UTF-8.
	#[error("Document envelope is malformed: {reason}.")]
	Envelope {
		/// Human-readable reason.
		reason: String,
	},
}
impl From<serde_path_to_error::Error<serde_json::Error>> for CodecError {
	fn from(e: serde_path_to_error::Error<serde_json::Error>) -> Self {
		let path = e.path().to_string();

		Self::Shape { path, source: e.into_inner() }
	}
}

/// Default codec backed by `serde_json` (compact output, map keys in sorted order).
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonCodec;
impl PayloadCodec for JsonCodec {
	fn encode(&self, value: &JsonValue) -> Result<String, CodecError> {
		Ok(serde_json::to_string(value)?)
	}

	fn decode(&self, text: &str) -> Result<JsonValue, CodecError> {
		Ok(serde_json::from_str(text)?)
	}
}

/// Wraps encoded document text into the binary-safe envelope (standard, padded base64).
pub fn seal_document(text: &str) -> String {
	STANDARD.encode(text.as_bytes())
}

/// Reverses [`seal_document`].
pub fn open_document(envelope: &str) -> Result<String, CodecError> {
	let bytes = STANDARD
		.decode(envelope)
		.map_err(|e| CodecError::Envelope { reason: e.to_string() })?;

	String::from_utf8(bytes).map_err(|e| CodecError::Envelope { reason: e.to_string() })
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[derive(Debug, Deserialize)]
	struct Expected {
		#[allow(dead_code)]
		value: String,
	}

	#[test]
	fn envelope_round_trips_non_ascii_text() {
		let text = "{\"name\":\"молоко 3,2%\",\"emoji\":\"🥛\"}";
		let sealed = seal_document(text);

		assert_eq!(sealed, seal_document(text));
		assert_eq!(open_document(&sealed).expect("Envelope should open."), text);
	}

	#[test]
	fn malformed_envelope_is_reported() {
		assert!(matches!(open_document("not base64!"), Err(CodecError::Envelope { .. })));
	}

	#[test]
	fn json_codec_is_deterministic() {
		let codec = JsonCodec;
		let a = serde_json::json!({ "b": 1, "a": [true, null] });
		let b = serde_json::json!({ "a": [true, null], "b": 1 });

		assert_eq!(
			codec.encode(&a).expect("Encoding should succeed."),
			codec.encode(&b).expect("Encoding should succeed.")
		);
	}

	#[test]
	fn typed_decode_reports_failing_path() {
		let err = decode_as::<Expected>(&JsonCodec, "{\"value\":42}")
			.expect_err("Numeric value should not decode as a string.");

		match err {
			CodecError::Shape { path, .. } => assert_eq!(path, "value"),
			other => panic!("Unexpected error variant: {other:?}."),
		}
		assert!(matches!(decode_as::<Expected>(&JsonCodec, "{"), Err(CodecError::Syntax(_))));
	}
}
