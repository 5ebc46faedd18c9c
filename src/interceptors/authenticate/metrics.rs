// std
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters for one authenticate coordinator.
#[derive(Debug, Default)]
pub struct RefreshMetrics {
	attempts: AtomicU64,
	success: AtomicU64,
	failure: AtomicU64,
	queued: AtomicU64,
	replays: AtomicU64,
	re_authentications: AtomicU64,
}
impl RefreshMetrics {
	/// Returns the number of refresh hook invocations.
	pub fn attempts(&self) -> u64 {
		self.attempts.load(Ordering::Relaxed)
	}

	/// Returns the number of refreshes that resolved.
	pub fn successes(&self) -> u64 {
		self.success.load(Ordering::Relaxed)
	}

	/// Returns the number of refreshes that rejected.
	pub fn failures(&self) -> u64 {
		self.failure.load(Ordering::Relaxed)
	}

	/// Returns the number of calls parked behind an in-flight refresh.
	pub fn queued(&self) -> u64 {
		self.queued.load(Ordering::Relaxed)
	}

	/// Returns the number of calls resubmitted after a refresh.
	pub fn replays(&self) -> u64 {
		self.replays.load(Ordering::Relaxed)
	}

	/// Returns the number of re-authenticate hook invocations.
	pub fn re_authentications(&self) -> u64 {
		self.re_authentications.load(Ordering::Relaxed)
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

	pub(crate) fn record_queued(&self) {
		self.queued.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_replay(&self) {
		self.replays.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_re_authentication(&self) {
		self.re_authentications.fetch_add(1, Ordering::Relaxed);
	}
}
