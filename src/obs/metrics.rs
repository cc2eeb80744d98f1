// self
use crate::obs::SubmitOutcome;

/// Records a submission outcome via the global metrics recorder (when enabled).
pub fn record_submit_outcome(outcome: SubmitOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!("crpt_client_submit_total", "outcome" => outcome.as_str()).increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = outcome;
	}
}
