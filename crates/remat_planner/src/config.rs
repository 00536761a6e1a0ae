//! Planner configuration.
//!
//! This module provides [`PlannerConfig`], the memory-budget
//! configuration for a solve: the byte budget, the number of discrete
//! memory slots the budget is divided into, and the safety margin
//! applied before discretisation.

use crate::error::PlanError;
use remat_core::discretize;

/// Default number of memory slots.
pub const DEFAULT_MEM_SLOTS: usize = 500;

/// Default safety margin.
pub const DEFAULT_EPS: f64 = 0.02;

/// Configuration for a rematerialisation solve.
///
/// Controls how the continuous byte budget is discretised into the
/// integer memory units the optimizer works with. A larger slot count
/// gives a finer-grained (and slower) solve; the epsilon margin
/// absorbs rounding and allocator slack so the discretised schedule
/// never exceeds the true budget.
///
/// # Examples
///
/// ```
/// use remat_planner::PlannerConfig;
///
/// // Defaults: 500 slots, 2% margin
/// let config = PlannerConfig::new(1_000_000);
/// assert_eq!(config.mem_slots, 500);
/// config.validate().unwrap();
///
/// // Custom discretisation
/// let config = PlannerConfig::new(1_000_000)
///     .with_mem_slots(200)
///     .with_eps(0.05);
/// assert_eq!(config.mem_unit(), 4750);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlannerConfig {
    /// Memory budget in bytes.
    ///
    /// Must be positive.
    pub mem_limit: u64,

    /// Number of discrete memory slots.
    ///
    /// The DP table has one memory row per slot, so the solve costs
    /// `O(mem_slots * L^2)` space and `O(mem_slots * L^3)` time.
    /// Default: 500
    pub mem_slots: usize,

    /// Safety margin in `[0, 1)` applied before discretisation.
    ///
    /// Default: 0.02
    pub eps: f64,
}

impl PlannerConfig {
    /// Create a configuration with the default slot count and margin.
    pub fn new(mem_limit: u64) -> Self {
        Self {
            mem_limit,
            mem_slots: DEFAULT_MEM_SLOTS,
            eps: DEFAULT_EPS,
        }
    }

    /// Set the number of memory slots.
    pub fn with_mem_slots(mut self, mem_slots: usize) -> Self {
        self.mem_slots = mem_slots;
        self
    }

    /// Set the safety margin.
    pub fn with_eps(mut self, eps: f64) -> Self {
        self.eps = eps;
        self
    }

    /// The derived memory unit in bytes.
    ///
    /// `floor(mem_limit * (1 - eps) / mem_slots)`; zero indicates a
    /// degenerate configuration rejected by [`validate`](Self::validate).
    pub fn mem_unit(&self) -> u64 {
        discretize::mem_unit(self.mem_limit, self.mem_slots.max(1), self.eps)
    }

    /// Validate the configuration.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The configuration can drive a solve
    /// * `Err(PlanError::InvalidConfig)` - Non-positive budget or slot
    ///   count, out-of-range epsilon, or a memory unit that rounds to
    ///   zero
    pub fn validate(&self) -> Result<(), PlanError> {
        if self.mem_limit == 0 {
            return Err(PlanError::invalid_config("memory budget must be positive"));
        }
        if self.mem_slots == 0 {
            return Err(PlanError::invalid_config("slot count must be positive"));
        }
        if !(0.0..1.0).contains(&self.eps) {
            return Err(PlanError::invalid_config(format!(
                "epsilon must be in [0, 1), got {}",
                self.eps
            )));
        }
        if self.mem_unit() == 0 {
            return Err(PlanError::invalid_config(format!(
                "memory unit rounds to zero for budget {} over {} slots; \
                 increase the budget or reduce the slot count",
                self.mem_limit, self.mem_slots
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PlannerConfig::new(1_000_000);
        assert_eq!(config.mem_slots, DEFAULT_MEM_SLOTS);
        assert_eq!(config.eps, DEFAULT_EPS);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_mem_unit_derivation() {
        let config = PlannerConfig::new(1_000_000).with_eps(0.0).with_mem_slots(500);
        assert_eq!(config.mem_unit(), 2000);
    }

    #[test]
    fn test_zero_budget_rejected() {
        let config = PlannerConfig::new(0);
        assert!(config.validate().unwrap_err().is_invalid_config());
    }

    #[test]
    fn test_zero_slots_rejected() {
        let config = PlannerConfig::new(1_000_000).with_mem_slots(0);
        assert!(config.validate().unwrap_err().is_invalid_config());
    }

    #[test]
    fn test_eps_out_of_range_rejected() {
        for eps in [-0.1, 1.0, 1.5] {
            let config = PlannerConfig::new(1_000_000).with_eps(eps);
            assert!(
                config.validate().is_err(),
                "eps {} should be rejected",
                eps
            );
        }
    }

    #[test]
    fn test_degenerate_unit_rejected() {
        // Budget smaller than the slot count rounds the unit to zero.
        let config = PlannerConfig::new(100).with_mem_slots(500);
        let err = config.validate().unwrap_err();
        assert!(err.is_invalid_config());
        assert!(format!("{}", err).contains("rounds to zero"));
    }
}
