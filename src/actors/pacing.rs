//! # Operation pacing for actors.
//!
//! A [`Pacer`] turns an operations-per-second target into a jittered
//! inter-operation sleep. Jitter spreads actors with identical rates apart
//! so they do not hammer the exclusion section in lockstep.

use std::time::Duration;

use rand::Rng;
use tokio::time;
use tokio_util::sync::CancellationToken;

/// Jitter band around the nominal period: uniform in [0.5, 1.5) × period.
const JITTER_MIN: f64 = 0.5;
const JITTER_MAX: f64 = 1.5;

/// Converts a rate target into cancellable, jittered sleeps.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Pacer {
    period: Duration,
}

impl Pacer {
    /// Builds a pacer from an operations-per-second target.
    ///
    /// Callers validate the rate first; a non-finite or non-positive value
    /// falls back to one operation per second.
    pub fn from_hz(hz: f64) -> Self {
        let period = if hz.is_finite() && hz > 0.0 {
            Duration::from_secs_f64(1.0 / hz)
        } else {
            Duration::from_secs(1)
        };
        Self { period }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Sleeps one jittered period.
    ///
    /// Returns `false` if `token` was cancelled mid-sleep; the caller
    /// should exit its loop instead of starting another operation.
    pub async fn rest(&self, token: &CancellationToken) -> bool {
        let delay = self.jittered();
        tokio::select! {
            _ = time::sleep(delay) => true,
            _ = token.cancelled() => false,
        }
    }

    fn jittered(&self) -> Duration {
        let mut rng = rand::rng();
        let factor = rng.random_range(JITTER_MIN..JITTER_MAX);
        self.period.mul_f64(factor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_hz_period() {
        assert_eq!(Pacer::from_hz(2.0).period(), Duration::from_millis(500));
        assert_eq!(Pacer::from_hz(0.5).period(), Duration::from_secs(2));
    }

    #[test]
    fn test_degenerate_rates_fall_back() {
        assert_eq!(Pacer::from_hz(0.0).period(), Duration::from_secs(1));
        assert_eq!(Pacer::from_hz(f64::NAN).period(), Duration::from_secs(1));
        assert_eq!(Pacer::from_hz(-3.0).period(), Duration::from_secs(1));
    }

    #[test]
    fn test_jitter_stays_in_band() {
        let pacer = Pacer::from_hz(10.0);
        for _ in 0..200 {
            let d = pacer.jittered();
            assert!(d >= pacer.period().mul_f64(JITTER_MIN));
            assert!(d < pacer.period().mul_f64(JITTER_MAX));
        }
    }

    #[tokio::test]
    async fn test_rest_is_cancellable() {
        let pacer = Pacer::from_hz(0.1); // 10s nominal
        let token = CancellationToken::new();
        token.cancel();
        assert!(!pacer.rest(&token).await);
    }
}
