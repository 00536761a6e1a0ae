//! Memory discretisation helpers.
//!
//! The optimizer works on integer memory units rather than raw bytes.
//! Every byte quantity is divided by a fixed unit and rounded up, so the
//! discretised chain never under-reports a memory requirement. The unit
//! itself carries a safety margin `eps` that absorbs rounding and
//! allocator slack.

/// Derive the memory unit in bytes from a budget and a slot count.
///
/// The unit is `floor(mem_limit * (1 - eps) / mem_slots)`, so that the
/// full budget maps to slightly fewer than `mem_slots` units and the
/// margin absorbs discretisation error.
///
/// # Arguments
///
/// * `mem_limit` - Memory budget in bytes
/// * `mem_slots` - Number of discrete memory slots
/// * `eps` - Safety margin in `[0, 1)`
///
/// # Examples
///
/// ```
/// use remat_core::discretize::mem_unit;
///
/// let unit = mem_unit(1_000_000, 500, 0.02);
/// assert_eq!(unit, 1960);
/// ```
pub fn mem_unit(mem_limit: u64, mem_slots: usize, eps: f64) -> u64 {
    ((mem_limit as f64) * (1.0 - eps) / (mem_slots as f64)).floor() as u64
}

/// Discretise a raw byte quantity into memory units, rounding up.
///
/// The ceiling guarantees `discretize(bytes, unit) * unit >= bytes`, so
/// no schedule built on discretised sizes can exceed the true budget
/// when re-expressed in bytes.
///
/// # Panics
///
/// Panics on a zero `unit`; callers validate the unit when deriving it
/// from the configuration.
pub fn discretize(bytes: u64, unit: u64) -> usize {
    bytes.div_ceil(unit) as usize
}

/// Discretise a slice of byte quantities.
pub fn discretize_all(bytes: &[u64], unit: u64) -> Vec<usize> {
    bytes.iter().map(|&b| discretize(b, unit)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_mem_unit_applies_margin() {
        // 2% margin on 1MB over 500 slots
        assert_eq!(mem_unit(1_000_000, 500, 0.02), 1960);
        // No margin divides evenly
        assert_eq!(mem_unit(1_000_000, 500, 0.0), 2000);
    }

    #[test]
    fn test_discretize_rounds_up() {
        assert_eq!(discretize(0, 100), 0);
        assert_eq!(discretize(1, 100), 1);
        assert_eq!(discretize(100, 100), 1);
        assert_eq!(discretize(101, 100), 2);
    }

    #[test]
    fn test_discretize_all() {
        assert_eq!(discretize_all(&[0, 50, 100, 150], 100), vec![0, 1, 1, 2]);
    }

    proptest! {
        /// Discretisation never under-represents the raw byte count.
        #[test]
        fn prop_discretize_never_under_reports(
            bytes in 0u64..1_000_000_000,
            unit in 1u64..1_000_000,
        ) {
            let units = discretize(bytes, unit) as u64;
            prop_assert!(units * unit >= bytes);
            // And it is tight: one unit less would under-report.
            if units > 0 {
                prop_assert!((units - 1) * unit < bytes);
            }
        }
    }
}
