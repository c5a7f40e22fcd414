//! Error types used by the slotvisor runtime and buffers.
//!
//! This module defines three error enums:
//!
//! - [`ConfigError`] — invalid run parameters, rejected before anything is spawned.
//! - [`BufferError`] — a blocking buffer operation observed shutdown.
//! - [`RuntimeError`] — errors raised by the coordination runtime itself.
//!
//! All types provide `as_label()` helpers returning short stable identifiers
//! for logging/metrics.

use std::time::Duration;
use thiserror::Error;

/// # Errors produced by run configuration validation.
///
/// A [`Coordinator`](crate::Coordinator) rejects the configuration before
/// constructing a buffer or spawning actors, so none of these leave any
/// runtime state behind.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Buffer capacity of zero makes every operation block forever.
    #[error("buffer capacity must be at least 1")]
    ZeroCapacity,

    /// A rate was zero, negative, NaN, or infinite.
    #[error("{name} must be a positive finite rate, got {value}")]
    InvalidRate {
        /// Name of the offending field.
        name: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// A zero acquire timeout would turn blocked actors into busy-waiters
    /// and make shutdown unobservable for them.
    #[error("acquire timeout must be non-zero")]
    ZeroAcquireTimeout,
}

impl ConfigError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ConfigError::ZeroCapacity => "config_zero_capacity",
            ConfigError::InvalidRate { .. } => "config_invalid_rate",
            ConfigError::ZeroAcquireTimeout => "config_zero_acquire_timeout",
        }
    }
}

/// # Errors produced by blocking buffer operations.
///
/// A blocked `produce`/`consume` resolves with [`BufferError::ShuttingDown`]
/// once the buffer's liveness flag drops. Actors recover locally by exiting
/// their loop; this is never surfaced as a user-visible failure.
///
/// Acquire timeouts are **not** represented here: a timeout only triggers a
/// liveness re-check and a retry inside the buffer, never an error.
#[non_exhaustive]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferError {
    /// The buffer became non-alive before the operation could commit.
    /// No partial write occurred.
    #[error("buffer is shutting down")]
    ShuttingDown,
}

impl BufferError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            BufferError::ShuttingDown => "buffer_shutting_down",
        }
    }
}

/// # Errors produced by the coordination runtime.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Shutdown grace period was exceeded; some actors were still running.
    #[error("shutdown grace {grace:?} exceeded; stuck: {stuck:?}")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
        /// Names of actors that did not stop in time.
        stuck: Vec<String>,
    },
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::GraceExceeded { .. } => "runtime_grace_exceeded",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RuntimeError::GraceExceeded { grace, stuck } => {
                format!("grace exceeded after {grace:?}; stuck actors={stuck:?}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_are_stable() {
        assert_eq!(ConfigError::ZeroCapacity.as_label(), "config_zero_capacity");
        assert_eq!(
            BufferError::ShuttingDown.as_label(),
            "buffer_shutting_down"
        );
        let err = RuntimeError::GraceExceeded {
            grace: Duration::from_secs(5),
            stuck: vec!["producer-1".into()],
        };
        assert_eq!(err.as_label(), "runtime_grace_exceeded");
        assert!(err.as_message().contains("producer-1"));
    }

    #[test]
    fn test_display_mentions_rate_name() {
        let err = ConfigError::InvalidRate {
            name: "production_rate_hz",
            value: -1.0,
        };
        assert!(err.to_string().contains("production_rate_hz"));
    }
}
