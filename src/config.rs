//! # Run configuration.
//!
//! [`SimConfig`] describes one simulation run: which buffer discipline to
//! use, the buffer capacity, the actor population, and the operation rates.
//! The remaining fields tune runtime behavior (acquire timeout, shutdown
//! grace, bus capacity) and have defaults that rarely need touching.
//!
//! Validation happens once, in [`Coordinator::start`](crate::Coordinator);
//! a rejected config spawns nothing.

use std::time::Duration;

use crate::error::ConfigError;

/// Which coordination discipline a run's buffer uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Discipline {
    /// Circular buffer with shared head/tail cursors and strict FIFO order.
    /// Producers enqueue symbols; consumers drain the oldest item.
    Fifo,
    /// Per-index slot addressing with orange/apple actor pairs. No ordering
    /// or fairness guarantee across actors.
    Addressable,
}

/// Configuration for one simulation run.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Buffer discipline.
    pub discipline: Discipline,

    /// Number of slots. Must be at least 1.
    pub capacity: usize,

    /// Producer actor count. Zero is valid (a run that only drains).
    pub producers: usize,

    /// Consumer actor count. Zero is valid (a run that only fills).
    pub consumers: usize,

    /// Target produce operations per second, per producer.
    pub production_rate_hz: f64,

    /// Target consume operations per second, per consumer.
    pub consumption_rate_hz: f64,

    /// Upper bound on any single blocking wait inside the buffer.
    ///
    /// Not a failure threshold: a timed-out wait re-checks the liveness
    /// flag and parks again. It bounds how stale a shutdown request can go
    /// unobserved by a blocked actor.
    pub acquire_timeout: Duration,

    /// Maximum time `stop()` waits for actors to exit before reporting
    /// them stuck.
    pub grace: Duration,

    /// Capacity of the event bus broadcast channel. Lagging receivers skip
    /// the oldest events. Minimum 1 (clamped by the bus).
    pub bus_capacity: usize,
}

impl SimConfig {
    /// Checks the configuration without building anything.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        check_rate("production_rate_hz", self.production_rate_hz)?;
        check_rate("consumption_rate_hz", self.consumption_rate_hz)?;
        if self.acquire_timeout.is_zero() {
            return Err(ConfigError::ZeroAcquireTimeout);
        }
        Ok(())
    }
}

fn check_rate(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidRate { name, value })
    }
}

impl Default for SimConfig {
    /// Defaults mirroring the classic classroom setup:
    /// - `discipline = Fifo`
    /// - `capacity = 16`, `producers = 3`, `consumers = 1`
    /// - both rates at 2 operations per second
    /// - `acquire_timeout = 1s`, `grace = 5s`, `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            discipline: Discipline::Fifo,
            capacity: 16,
            producers: 3,
            consumers: 1,
            production_rate_hz: 2.0,
            consumption_rate_hz: 2.0,
            acquire_timeout: Duration::from_secs(1),
            grace: Duration::from_secs(5),
            bus_capacity: 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(SimConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let cfg = SimConfig {
            capacity: 0,
            ..SimConfig::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroCapacity));
    }

    #[test]
    fn test_bad_rates_rejected() {
        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let cfg = SimConfig {
                production_rate_hz: bad,
                ..SimConfig::default()
            };
            assert!(matches!(
                cfg.validate(),
                Err(ConfigError::InvalidRate {
                    name: "production_rate_hz",
                    ..
                })
            ));
        }
        let cfg = SimConfig {
            consumption_rate_hz: 0.0,
            ..SimConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_zero_actor_counts_are_valid() {
        let cfg = SimConfig {
            producers: 0,
            consumers: 0,
            ..SimConfig::default()
        };
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_zero_acquire_timeout_rejected() {
        let cfg = SimConfig {
            acquire_timeout: Duration::ZERO,
            ..SimConfig::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroAcquireTimeout));
    }
}
