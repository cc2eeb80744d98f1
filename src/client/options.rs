//! Per-call overrides for document submissions.

// self
use crate::_prelude::*;

/// Optional per-call configuration merged over the client's defaults.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CallOptions {
	/// Extra headers; applied after the client defaults, last write wins per name.
	pub headers: Vec<(String, String)>,
	/// Overrides the client's request timeout.
	pub request_timeout: Option<Duration>,
	/// Product group qualifier (`pg` query parameter and `product_group` field).
	pub product_group: Option<String>,
	/// Upper bound on how long the call may wait for an admission permit.
	pub admission_timeout: Option<Duration>,
}
impl CallOptions {
	/// Options carrying only a product group.
	pub fn for_product_group(product_group: impl Into<String>) -> Self {
		Self::default().with_product_group(product_group)
	}

	/// Adds a header for this call.
	pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.headers.push((name.into(), value.into()));

		self
	}

	/// Overrides the request timeout for this call.
	pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
		self.request_timeout = Some(timeout);

		self
	}

	/// Sets the product group for this call.
	pub fn with_product_group(mut self, product_group: impl Into<String>) -> Self {
		self.product_group = Some(product_group.into());

		self
	}

	/// Gives up with [`Error::Cancelled`] if no permit is granted within `timeout`.
	pub fn with_admission_timeout(mut self, timeout: Duration) -> Self {
		self.admission_timeout = Some(timeout);

		self
	}
}
