//! Fixed-window admission limiter with FIFO waiters.
//!
//! Time is cut into windows of `window` length anchored at construction. At most `limit`
//! permits are granted per window. Waiters queue on a fair async mutex so the earliest arrival
//! is always the next one admitted; only the head of the queue sleeps on the clock, and it
//! re-checks the window after every wake.

// std
use std::num::NonZeroU32;
// crates.io
use tokio::{sync::Mutex as FifoMutex, time::Instant};
// self
use crate::{
	_prelude::*,
	error::ConfigError,
	limiter::{self, AcquireFuture, CancelSignal, Cancelled, RateLimiter},
	obs,
};

const MIN_BACKOFF: Duration = Duration::from_micros(50);

/// Fixed-window [`RateLimiter`] shared by every caller of a client.
#[derive(Debug)]
pub struct FixedWindowLimiter {
	limit: NonZeroU32,
	window: Duration,
	queue: FifoMutex<()>,
	state: Mutex<QuotaWindow>,
}
impl FixedWindowLimiter {
	/// Creates a limiter granting `limit` permits per `window`.
	pub fn new(limit: NonZeroU32, window: Duration) -> Result<Self, ConfigError> {
		if window.is_zero() {
			return Err(ConfigError::ZeroWindow);
		}

		Ok(Self::anchored(limit, window))
	}

	/// Creates a limiter granting `limit` permits per second.
	pub fn per_second(limit: NonZeroU32) -> Self {
		Self::anchored(limit, Duration::from_secs(1))
	}

	fn anchored(limit: NonZeroU32, window: Duration) -> Self {
		Self {
			limit,
			window,
			queue: FifoMutex::new(()),
			state: Mutex::new(QuotaWindow { start: Instant::now(), used: 0 }),
		}
	}

	/// Permits granted per window.
	pub fn limit(&self) -> NonZeroU32 {
		self.limit
	}

	/// Window length.
	pub fn window(&self) -> Duration {
		self.window
	}

	/// Waits for a permit with no way to cancel other than dropping the future.
	pub async fn acquire(&self) {
		self.admit().await;
	}

	/// Waits for a permit until `cancel` resolves.
	pub async fn acquire_until<F>(&self, cancel: F) -> Result<(), Cancelled>
	where
		F: Future<Output = ()>,
	{
		tokio::select! {
			biased;
			() = cancel => Err(Cancelled),
			() = self.admit() => Ok(()),
		}
	}

	/// Waits for a permit for at most `timeout`.
	pub async fn acquire_timeout(&self, timeout: Duration) -> Result<(), Cancelled> {
		self.acquire_until(limiter::after(timeout)).await
	}

	/// Grants a permit if one is available right now.
	///
	/// Returns `false` when the quota for the current window is spent, and also when another
	/// caller holds the admission turn; queued waiters are never overtaken.
	pub fn try_acquire(&self) -> bool {
		let Ok(_turn) = self.queue.try_lock() else {
			return false;
		};

		self.try_grant(Instant::now()).is_ok()
	}

	async fn admit(&self) {
		// Held across the sleep: later arrivals queue behind the head in FIFO order.
		let _turn = self.queue.lock().await;

		loop {
			match self.try_grant(Instant::now()) {
				Ok(()) => return,
				Err(wait) => {
					obs::trace_admission_wait(wait);

					tokio::time::sleep(wait).await;
				},
			}
		}
	}

	/// Grants a permit or returns how long to sleep before checking again.
	fn try_grant(&self, now: Instant) -> Result<(), Duration> {
		let Some(mut state) = self.state.try_lock() else {
			return Err(self.backoff_floor());
		};

		state.roll_forward(now, self.window);

		if state.used < self.limit.get() {
			state.used += 1;

			return Ok(());
		}

		let remaining = state.until_next_window(now, self.window);

		Err(if remaining.is_zero() { self.backoff_floor() } else { remaining })
	}

	fn backoff_floor(&self) -> Duration {
		MIN_BACKOFF.max(self.window / 100)
	}
}
impl RateLimiter for FixedWindowLimiter {
	fn acquire<'a>(&'a self, cancel: CancelSignal<'a>) -> AcquireFuture<'a> {
		Box::pin(self.acquire_until(cancel))
	}

	fn try_acquire(&self) -> bool {
		Self::try_acquire(self)
	}
}

/// Counter for the active window; only touched under the limiter's lock.
#[derive(Debug)]
struct QuotaWindow {
	start: Instant,
	used: u32,
}
impl QuotaWindow {
	/// Moves `start` to the window containing `now` in whole-window steps.
	fn roll_forward(&mut self, now: Instant, window: Duration) {
		let elapsed = now.saturating_duration_since(self.start);

		if elapsed < window {
			return;
		}

		let passed = (elapsed.as_nanos() / window.as_nanos()).max(1);
		let advance = u64::try_from(window.as_nanos().saturating_mul(passed))
			.ok()
			.map(Duration::from_nanos)
			.and_then(|step| self.start.checked_add(step));

		// Saturate on absurd gaps; alignment no longer matters there.
		self.start = advance.unwrap_or(now);
		self.used = 0;
	}

	fn until_next_window(&self, now: Instant, window: Duration) -> Duration {
		self.start
			.checked_add(window)
			.map_or(Duration::ZERO, |end| end.saturating_duration_since(now))
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn limiter(limit: u32, window_ms: u64) -> Arc<FixedWindowLimiter> {
		let limit = NonZeroU32::new(limit).expect("Test limit must be positive.");

		Arc::new(
			FixedWindowLimiter::new(limit, Duration::from_millis(window_ms))
				.expect("Failed to build test limiter."),
		)
	}

	#[test]
	fn zero_window_is_rejected() {
		let limit = NonZeroU32::new(1).expect("Test limit must be positive.");

		assert!(matches!(
			FixedWindowLimiter::new(limit, Duration::ZERO),
			Err(ConfigError::ZeroWindow)
		));
	}

	#[tokio::test(start_paused = true)]
	async fn try_acquire_grants_exactly_limit_per_window() {
		let rl = limiter(2, 1_000);

		assert!(rl.try_acquire());
		assert!(rl.try_acquire());
		assert!(!rl.try_acquire());

		tokio::time::advance(Duration::from_millis(999)).await;

		assert!(!rl.try_acquire());

		tokio::time::advance(Duration::from_millis(1)).await;

		assert!(rl.try_acquire());
	}

	#[tokio::test(start_paused = true)]
	async fn idle_gap_rolls_forward_in_whole_windows() {
		let rl = limiter(2, 100);

		assert!(rl.try_acquire());
		assert!(rl.try_acquire());

		// 3.5 windows of silence must not bank extra permits.
		tokio::time::advance(Duration::from_millis(350)).await;

		assert!(rl.try_acquire());
		assert!(rl.try_acquire());
		assert!(!rl.try_acquire());

		// The active window started at 300ms, so the next one opens at 400ms, not 450ms.
		tokio::time::advance(Duration::from_millis(50)).await;

		assert!(rl.try_acquire());
	}

	#[test]
	fn roll_forward_keeps_window_alignment() {
		let origin = Instant::now();
		let window = Duration::from_millis(10);
		let mut state = QuotaWindow { start: origin, used: 7 };

		state.roll_forward(origin + Duration::from_millis(9), window);

		assert_eq!(state.used, 7);
		assert_eq!(state.start, origin);

		state.roll_forward(origin + Duration::from_millis(47), window);

		assert_eq!(state.used, 0);
		assert_eq!(state.start, origin + Duration::from_millis(40));
		assert_eq!(
			state.until_next_window(origin + Duration::from_millis(47), window),
			Duration::from_millis(3)
		);
	}

	#[tokio::test(start_paused = true)]
	async fn acquire_blocks_until_next_window() {
		let rl = limiter(1, 50);
		let started = Instant::now();

		rl.acquire().await;
		rl.acquire().await;

		let waited = started.elapsed();

		assert!(waited >= Duration::from_millis(50), "Second acquire returned after {waited:?}.");
		assert!(waited < Duration::from_millis(100), "Second acquire overslept: {waited:?}.");
	}

	#[tokio::test(start_paused = true)]
	async fn cancelled_wait_consumes_nothing() {
		let rl = limiter(1, 1_000);

		rl.acquire().await;

		assert_eq!(rl.acquire_timeout(Duration::from_millis(100)).await, Err(Cancelled));

		tokio::time::advance(Duration::from_millis(900)).await;

		assert!(rl.try_acquire());
		assert!(!rl.try_acquire());
	}

	#[tokio::test(start_paused = true)]
	async fn concurrent_waiters_never_exceed_limit_per_window() {
		let rl = limiter(3, 100);
		let origin = Instant::now();
		let grants = Arc::new(Mutex::new(Vec::new()));
		let mut handles = Vec::new();

		for _ in 0..10 {
			let rl = Arc::clone(&rl);
			let grants = Arc::clone(&grants);

			handles.push(tokio::spawn(async move {
				rl.acquire().await;
				grants.lock().push(origin.elapsed());
			}));
		}
		for handle in handles {
			handle.await.expect("Waiter task should not panic.");
		}

		let mut per_window = BTreeMap::new();

		for elapsed in grants.lock().iter() {
			*per_window.entry(elapsed.as_millis() / 100).or_insert(0_u32) += 1;
		}

		assert_eq!(per_window.values().copied().collect::<Vec<_>>(), vec![3, 3, 3, 1]);
	}

	#[tokio::test(start_paused = true)]
	async fn waiters_are_admitted_in_arrival_order() {
		let rl = limiter(1, 10);
		let order = Arc::new(Mutex::new(Vec::new()));
		let mut handles = Vec::new();

		assert!(rl.try_acquire());

		for id in 0..5 {
			let rl = Arc::clone(&rl);
			let order = Arc::clone(&order);

			handles.push(tokio::spawn(async move {
				rl.acquire().await;
				order.lock().push(id);
			}));

			tokio::task::yield_now().await;
		}

		// A newcomer cannot jump the queue while others wait.
		assert!(!rl.try_acquire());

		for handle in handles {
			handle.await.expect("Waiter task should not panic.");
		}

		assert_eq!(*order.lock(), vec![0, 1, 2, 3, 4]);
	}
}
