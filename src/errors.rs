//! Error Types
//!
//! This module defines the error types used throughout the crate.
//!
//! # Overview
//!
//! Only two classes of failure are reported through [`PrismError`]:
//! - Resource exhaustion or a record limit hit while growing a backing
//!   buffer (fatal for the frame)
//! - Rejected configuration (malformed JSON or out-of-range settings)
//!
//! Precondition violations (unknown handles, negative epsilons, cyclic
//! hierarchies) are programming errors. They are caught by `debug_assert!`
//! and never surface as a `Result`. An entity being culled is an expected
//! outcome, not an error.
//!
//! # Usage
//!
//! ```rust,ignore
//! use prism::errors::{PrismError, Result};
//!
//! fn run_frame(collector: &mut VisibilityCollector, scene: &Scene) -> Result<()> {
//!     collector.collect(scene, &mut MyStage)?;
//!     Ok(())
//! }
//! ```

use std::collections::TryReserveError;

use thiserror::Error;

/// The main error type for the visibility subsystem.
#[derive(Error, Debug)]
pub enum PrismError {
    // ========================================================================
    // Resource Errors
    // ========================================================================
    /// A backing buffer could not grow to hold this frame's records.
    ///
    /// A half-written light buffer would corrupt the shading stage's reads,
    /// so the frame must not proceed.
    #[error("Failed to grow buffer '{label}' to {requested} records: {source}")]
    BufferGrowth {
        /// Debug label of the buffer
        label: String,
        /// Capacity that was requested
        requested: usize,
        /// Allocator failure
        #[source]
        source: TryReserveError,
    },

    /// A backing buffer would exceed its configured record limit.
    #[error("Buffer '{label}' needs {requested} records but is limited to {limit}")]
    BufferLimit {
        /// Debug label of the buffer
        label: String,
        /// Capacity that was requested
        requested: usize,
        /// Configured maximum
        limit: usize,
    },

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// A settings value is outside its valid range.
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Alias for `Result<T, PrismError>`.
pub type Result<T> = std::result::Result<T, PrismError>;
