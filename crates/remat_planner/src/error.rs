//! Planner error types.
//!
//! This module provides structured error handling for the planning
//! pipeline, from configuration validation through schedule
//! reconstruction.

use remat_core::ChainError;
use thiserror::Error;

/// Errors that can occur while planning a rematerialisation schedule.
///
/// # Variants
///
/// - `InvalidConfig`: Rejected configuration (non-positive budget or
///   slot count, out-of-range epsilon, degenerate memory unit)
/// - `EmptyStage`: A stage group contains no operations
/// - `InvalidStage`: A stage group is internally inconsistent
/// - `InfeasibleSchedule`: No schedule fits the requested range and
///   memory; never silently degraded to a worse-but-feasible schedule
/// - `Internal`: Solver-bug assertion (e.g., a decision entry the
///   table fill should have produced is missing); not recoverable
/// - `Chain`: Wrapped chain construction error
///
/// # Examples
///
/// ```
/// use remat_planner::PlanError;
///
/// let err = PlanError::infeasible_schedule(0, 4, 12);
/// assert!(format!("{}", err).contains("12"));
/// assert!(err.is_infeasible());
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlanError {
    /// Rejected configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// What was wrong with the configuration
        message: String,
    },

    /// A stage group contains no operations.
    #[error("Stage {stage} contains no operations")]
    EmptyStage {
        /// Index of the empty stage
        stage: usize,
    },

    /// A stage group is internally inconsistent.
    #[error("Invalid stage {stage}: {message}")]
    InvalidStage {
        /// Index of the offending stage
        stage: usize,
        /// What was inconsistent
        message: String,
    },

    /// No schedule fits the requested range and memory.
    #[error(
        "No feasible schedule for stages {lmin}..={lmax} with {memory} memory units"
    )]
    InfeasibleSchedule {
        /// First stage of the requested range
        lmin: usize,
        /// Last stage of the requested range
        lmax: usize,
        /// Memory units available for the range
        memory: usize,
    },

    /// Solver-bug assertion; not recoverable.
    #[error("Internal planner inconsistency: {message}")]
    Internal {
        /// Description of the violated invariant
        message: String,
    },

    /// Wrapped chain construction error.
    #[error("Chain error: {0}")]
    Chain(#[from] ChainError),
}

impl PlanError {
    /// Create an invalid configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create an empty stage error.
    pub fn empty_stage(stage: usize) -> Self {
        Self::EmptyStage { stage }
    }

    /// Create an invalid stage error.
    pub fn invalid_stage(stage: usize, message: impl Into<String>) -> Self {
        Self::InvalidStage {
            stage,
            message: message.into(),
        }
    }

    /// Create an infeasible schedule error.
    pub fn infeasible_schedule(lmin: usize, lmax: usize, memory: usize) -> Self {
        Self::InfeasibleSchedule { lmin, lmax, memory }
    }

    /// Create an internal inconsistency error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Check if this is an invalid configuration error.
    pub fn is_invalid_config(&self) -> bool {
        matches!(self, Self::InvalidConfig { .. })
    }

    /// Check if this is an empty stage error.
    pub fn is_empty_stage(&self) -> bool {
        matches!(self, Self::EmptyStage { .. })
    }

    /// Check if this is an infeasible schedule error.
    pub fn is_infeasible(&self) -> bool {
        matches!(self, Self::InfeasibleSchedule { .. })
    }

    /// Check if this is an internal inconsistency error.
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Internal { .. })
    }
}
