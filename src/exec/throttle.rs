use crate::cnf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Caps the rate of charged operations across an evaluation tree.
///
/// Hot points in the pipeline call [`Throttle::charge_op`], which may sleep
/// to keep the observed rate at or below the configured ops/second. Rates
/// above [`cnf::THROTTLE_DISABLE_RATE`] disable throttling entirely.
#[derive(Debug)]
pub struct Throttle {
	rate: u64,
	started: Instant,
	charged: AtomicU64,
}

impl Throttle {
	pub fn new(rate: u64) -> Self {
		Self {
			rate,
			started: Instant::now(),
			charged: AtomicU64::new(0),
		}
	}

	/// Whether this throttle ever blocks
	pub fn is_active(&self) -> bool {
		self.rate > 0 && self.rate <= cnf::THROTTLE_DISABLE_RATE
	}

	/// Charge a single operation, sleeping if the rate budget is exhausted
	pub async fn charge_op(&self) {
		if !self.is_active() {
			return;
		}
		let charged = self.charged.fetch_add(1, Ordering::Relaxed) + 1;
		// The time at which this charge stays within the configured rate
		let due = self.started + Duration::from_secs_f64(charged as f64 / self.rate as f64);
		let now = Instant::now();
		if due > now {
			tokio::time::sleep(due - now).await;
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn high_rates_disable_throttling() {
		assert!(!Throttle::new(0).is_active());
		assert!(!Throttle::new(cnf::THROTTLE_DISABLE_RATE + 1).is_active());
		assert!(Throttle::new(100).is_active());
	}

	#[tokio::test]
	async fn throttle_spaces_out_charges() {
		let throttle = Throttle::new(1000);
		let start = Instant::now();
		for _ in 0..10 {
			throttle.charge_op().await;
		}
		// 10 charges at 1000 ops/sec need at least ~10ms
		assert!(start.elapsed() >= Duration::from_millis(9));
	}
}
