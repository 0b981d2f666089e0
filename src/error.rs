//! Physics Error Types
//!
//! Unified error type for the engine. Only genuine invariant violations are
//! errors: constructing a body with a non-finite or non-positive mass, or
//! building a world from an invalid configuration. Numerical degeneracies
//! (zero-length normals, coincident centers, parallel rays) are handled
//! locally with epsilon guards and never surface here.

use thiserror::Error;

/// Unified error type for physics operations.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum PhysicsError {
    /// A body was constructed with a mass outside `(0, +inf)`.
    ///
    /// Static bodies are made with [`crate::Body::set_static`], never by
    /// passing an infinite mass to the constructor.
    #[error("invalid body mass {mass}: must be finite and positive")]
    InvalidMass {
        /// The rejected mass value.
        mass: f64,
    },

    /// A configuration parameter fails validation.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Human-readable description of the problem.
        reason: &'static str,
    },
}

// ============================================================================
// Tests
// ============================================================================
