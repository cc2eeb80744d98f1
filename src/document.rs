//! Wire model for the document creation endpoint.

// self
use crate::_prelude::*;

/// Path of the document creation endpoint, relative to the base URL.
pub const CREATE_DOCUMENT_PATH: &str = "/api/v3/lk/documents/create";

/// Document format declared in every submission.
pub const DOCUMENT_FORMAT_MANUAL: &str = "MANUAL";

/// Document type for introducing domestically produced goods into circulation.
pub const DOCUMENT_TYPE_INTRODUCE_GOODS: &str = "LP_INTRODUCE_GOODS";

/// Request envelope posted to [`CREATE_DOCUMENT_PATH`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateDocumentRequest {
	/// Always [`DOCUMENT_FORMAT_MANUAL`].
	pub document_format: String,
	/// Base64 of the encoded document.
	pub product_document: String,
	/// Product group qualifier; omitted from the wire when absent.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub product_group: Option<String>,
	/// Detached signature over the document.
	pub signature: String,
	/// Always [`DOCUMENT_TYPE_INTRODUCE_GOODS`].
	#[serde(rename = "type")]
	pub kind: String,
}
impl CreateDocumentRequest {
	/// Builds an envelope for an already sealed document.
	///
	/// Blank product groups are dropped.
	pub fn introduce_goods(
		product_document: String,
		product_group: Option<&str>,
		signature: impl Into<String>,
	) -> Self {
		Self {
			document_format: DOCUMENT_FORMAT_MANUAL.into(),
			product_document,
			product_group: non_blank(product_group).map(str::to_owned),
			signature: signature.into(),
			kind: DOCUMENT_TYPE_INTRODUCE_GOODS.into(),
		}
	}
}

/// Body of a successful creation response.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateDocumentResponse {
	/// Identifier assigned to the created document.
	pub value: String,
}

/// Returns `value` unless it is absent or whitespace only.
pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
	value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn envelope_serializes_wire_field_names() {
		let request = CreateDocumentRequest::introduce_goods("ZG9j".into(), Some("milk"), "sig==");
		let json = serde_json::to_value(&request).expect("Envelope should serialize.");

		assert_eq!(
			json,
			serde_json::json!({
				"document_format": "MANUAL",
				"product_document": "ZG9j",
				"product_group": "milk",
				"signature": "sig==",
				"type": "LP_INTRODUCE_GOODS",
			})
		);
	}

	#[test]
	fn blank_product_group_is_omitted() {
		for group in [None, Some(""), Some("   ")] {
			let request = CreateDocumentRequest::introduce_goods("ZG9j".into(), group, "sig==");
			let json = serde_json::to_value(&request).expect("Envelope should serialize.");

			assert!(json.get("product_group").is_none(), "Group {group:?} leaked into {json}.");
		}
	}
}
