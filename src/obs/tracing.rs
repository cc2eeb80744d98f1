// self
use crate::{_prelude::*, http::TransportRequest};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedSubmit<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedSubmit<F> = F;

/// A span builder used by the submission pipeline.
#[derive(Clone, Debug)]
pub struct SubmitSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl SubmitSpan {
	/// Creates a new span tagged with the provided stage.
	pub fn new(stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("crpt_client.submit", stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = stage;

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedSubmit<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Notes that the head of the admission queue is about to sleep.
pub fn trace_admission_wait(wait: Duration) {
	#[cfg(feature = "tracing")]
	{
		tracing::trace!(
			wait_us = wait.as_micros() as u64,
			"quota exhausted; waiting for next window"
		);
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = wait;
	}
}

/// Logs an outbound request; header values are never logged.
pub fn debug_dispatch(request: &TransportRequest) {
	#[cfg(feature = "tracing")]
	{
		let header_names = request.headers.keys().map(String::as_str).collect::<Vec<_>>();

		tracing::debug!(
			method = request.method.as_str(),
			url = %request.url,
			headers = ?header_names,
			"dispatching document request"
		);
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = request;
	}
}

/// Logs the status and header names of a response.
pub fn debug_response(status: u16, headers: &BTreeMap<String, Vec<String>>) {
	#[cfg(feature = "tracing")]
	{
		let header_names = headers.keys().map(String::as_str).collect::<Vec<_>>();

		tracing::debug!(status, headers = ?header_names, "document endpoint responded");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (status, headers);
	}
}

/// Warns that a successful body could not be decoded.
pub fn warn_unparsed_body(error: &dyn StdError) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(error = %error, "failed to decode successful response body");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = error;
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn event_helpers_noop_without_subscriber() {
		trace_admission_wait(Duration::from_millis(5));
		debug_response(200, &BTreeMap::new());
		warn_unparsed_body(&std::io::Error::other("bad body"));
	}

	#[tokio::test]
	async fn instrument_wraps_future() {
		let span = SubmitSpan::new("instrument_wraps_future");
		let value = span.instrument(async { 42 }).await;

		assert_eq!(value, 42);
	}
}
