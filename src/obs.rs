//! Optional observability helpers for document submissions.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `crpt_client.submit` with the `stage` field,
//!   debug events for dispatched requests and responses, a warning when a successful body fails
//!   to decode, and trace events whenever a caller waits for an admission permit.
//! - Enable `metrics` to increment the `crpt_client_submit_total` counter for every
//!   attempt/success/failure/cancellation, labeled by `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Outcome labels recorded for each submission.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SubmitOutcome {
	/// Entry to the pipeline.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
	/// Caller gave up waiting for a permit.
	Cancelled,
}
impl SubmitOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			SubmitOutcome::Attempt => "attempt",
			SubmitOutcome::Success => "success",
			SubmitOutcome::Failure => "failure",
			SubmitOutcome::Cancelled => "cancelled",
		}
	}
}
impl Display for SubmitOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
