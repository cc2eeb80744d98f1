//! Admission control contracts consulted before every outbound document request.
//!
//! A [`RateLimiter`] hands out permits; the pipeline takes exactly one before it touches the
//! codec or the transport. Waiting is cancellable through a [`CancelSignal`], and a cancelled
//! wait never consumes a permit.

pub mod fixed_window;

pub use fixed_window::FixedWindowLimiter;

// self
use crate::_prelude::*;

/// Boxed future that resolves when the caller gives up waiting.
pub type CancelSignal<'a> = Pin<Box<dyn Future<Output = ()> + 'a + Send>>;

/// Boxed future returned by [`RateLimiter::acquire`].
pub type AcquireFuture<'a> = Pin<Box<dyn Future<Output = Result<(), Cancelled>> + 'a + Send>>;

/// Shared quota gate consulted before each outbound call.
pub trait RateLimiter
where
	Self: Send + Sync,
{
	/// Waits until a permit is granted or `cancel` resolves, whichever comes first.
	///
	/// Dropping the returned future abandons the wait without consuming a permit.
	fn acquire<'a>(&'a self, cancel: CancelSignal<'a>) -> AcquireFuture<'a>;

	/// Grants a permit if one is available right now; never waits.
	fn try_acquire(&self) -> bool;
}

/// Returned when a wait for a permit is aborted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ThisError)]
#[error("Waiting for an admission permit was cancelled.")]
pub struct Cancelled;
impl From<Cancelled> for Error {
	fn from(_: Cancelled) -> Self {
		Self::Cancelled
	}
}

/// Cancel signal that never fires.
pub fn never<'a>() -> CancelSignal<'a> {
	Box::pin(std::future::pending())
}

/// Cancel signal that fires once `timeout` has elapsed.
pub fn after<'a>(timeout: Duration) -> CancelSignal<'a> {
	Box::pin(tokio::time::sleep(timeout))
}

/// Cancel signal that fires as soon as either `first` or `second` fires.
pub fn either<'a>(first: CancelSignal<'a>, second: CancelSignal<'a>) -> CancelSignal<'a> {
	Box::pin(async move {
		tokio::select! {
			() = first => {},
			() = second => {},
		}
	})
}
