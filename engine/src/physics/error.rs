//! Physics Error Types
//!
//! The numerical core never fails: stale handles are no-ops and geometry
//! predicates always return a value. These errors cover the few places
//! where bad input must be reported instead of silently absorbed.

use thiserror::Error;

/// Errors surfaced by configuration loading and projectile spawning.
#[derive(Error, Debug)]
pub enum PhysicsError {
    /// An ability cannot produce a finite projectile flight.
    #[error("invalid ability configuration for '{ability}': {reason}")]
    InvalidAbilityConfiguration {
        /// Name of the offending ability
        ability: String,
        /// What is wrong with it
        reason: &'static str,
    },

    /// A configuration value is out of its valid range.
    #[error("invalid configuration: {reason}")]
    InvalidConfiguration {
        /// Description of the invalid parameter
        reason: &'static str,
    },

    /// JSON configuration could not be parsed.
    #[error("config parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

/// Convenience alias used across the physics and projectile APIs.
pub type PhysicsResult<T> = Result<T, PhysicsError>;
