// std
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters for submissions.
#[derive(Debug, Default)]
pub struct SubmitMetrics {
	attempts: AtomicU64,
	success: AtomicU64,
	failure: AtomicU64,
	cancelled: AtomicU64,
}
impl SubmitMetrics {
	/// Returns the total number of submissions started.
	pub fn attempts(&self) -> u64 {
		self.attempts.load(Ordering::Relaxed)
	}

	/// Returns the number of submissions that ended with a 2xx response.
	pub fn successes(&self) -> u64 {
		self.success.load(Ordering::Relaxed)
	}

	/// Returns the number of submissions that failed for any reason other than cancellation.
	pub fn failures(&self) -> u64 {
		self.failure.load(Ordering::Relaxed)
	}

	/// Returns the number of submissions abandoned while waiting for a permit.
	pub fn cancellations(&self) -> u64 {
		self.cancelled.load(Ordering::Relaxed)
	}

	pub(crate) fn record_attempt(&self) {
		self.attempts.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_success(&self) {
		self.success.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_failure(&self) {
		self.failure.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_cancelled(&self) {
		self.cancelled.fetch_add(1, Ordering::Relaxed);
	}
}
