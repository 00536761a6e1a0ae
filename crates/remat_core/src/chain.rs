//! The discretised cost chain consumed by the optimizer.
//!
//! A [`Chain`] describes a linearised pipeline of `L` stages plus an
//! implicit terminal loss point at index `L`. Internally every column
//! is stored in padded "point" form, exactly as the dynamic-programming
//! recurrence consumes it, so accessor indices line up with the
//! recurrence without further offset arithmetic:
//!
//! - times (`fwd_time`, `bwd_time`, `tmp_fwd`, `tmp_bwd`) have `L + 1`
//!   entries, the terminal point contributing zero;
//! - sizes (`x_size`, `xbar_size`) have `L + 2` entries, where
//!   `x_size[i]` is the input activation of stage `i` (index 0 is the
//!   model input) and the final entry is a zero pad.

use crate::error::ChainError;
use num_traits::Float;

/// Immutable, discretised cost chain for a sequential pipeline.
///
/// Memory quantities are integer units produced by
/// [`discretize`](crate::discretize::discretize); compute costs are a
/// caller-chosen floating-point type.
///
/// # Type Parameters
///
/// * `T` - Floating-point type (e.g., `f64`) for compute costs
///
/// # Examples
///
/// ```
/// use remat_core::chain::Chain;
///
/// // Two stages: sizes are [input, out0, out1] in memory units.
/// let chain: Chain<f64> = Chain::new(
///     vec![5.0, 4.0],
///     vec![3.0, 2.0],
///     vec![2, 1, 1],
///     vec![2, 1, 1],
///     vec![0, 0],
///     vec![0, 0],
/// )
/// .unwrap();
///
/// assert_eq!(chain.length(), 2);
/// assert_eq!(chain.x_size(0), 2);
/// // Terminal point pads to zero.
/// assert_eq!(chain.fwd_time(2), 0.0);
/// assert_eq!(chain.x_size(3), 0);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Chain<T: Float> {
    length: usize,
    fwd_time: Vec<T>,
    bwd_time: Vec<T>,
    x_size: Vec<usize>,
    xbar_size: Vec<usize>,
    tmp_fwd: Vec<usize>,
    tmp_bwd: Vec<usize>,
}

impl<T: Float> Chain<T> {
    /// Create a chain from per-stage measurements.
    ///
    /// # Arguments
    ///
    /// * `fwd_time` - Forward compute cost per stage (`L` entries)
    /// * `bwd_time` - Backward compute cost per stage (`L` entries)
    /// * `x_size` - Activation sizes in memory units (`L + 1` entries:
    ///   the model input followed by each stage's output)
    /// * `xbar_size` - Peak held-activation sizes (`L + 1` entries,
    ///   same indexing as `x_size`)
    /// * `tmp_fwd` - Forward transient memory per stage (`L` entries)
    /// * `tmp_bwd` - Backward transient memory per stage (`L` entries)
    ///
    /// # Returns
    ///
    /// * `Ok(chain)` - Validated, internally padded chain
    /// * `Err(ChainError)` - Empty input, column length mismatch, or a
    ///   negative compute cost
    pub fn new(
        mut fwd_time: Vec<T>,
        mut bwd_time: Vec<T>,
        mut x_size: Vec<usize>,
        mut xbar_size: Vec<usize>,
        mut tmp_fwd: Vec<usize>,
        mut tmp_bwd: Vec<usize>,
    ) -> Result<Self, ChainError> {
        let length = fwd_time.len();
        if length == 0 {
            return Err(ChainError::EmptyChain);
        }

        Self::check_len("bwd_time", length, bwd_time.len())?;
        Self::check_len("x_size", length + 1, x_size.len())?;
        Self::check_len("xbar_size", length + 1, xbar_size.len())?;
        Self::check_len("tmp_fwd", length, tmp_fwd.len())?;
        Self::check_len("tmp_bwd", length, tmp_bwd.len())?;

        for (stage, &t) in fwd_time.iter().enumerate() {
            if t < T::zero() {
                return Err(ChainError::negative_cost("fwd_time", stage));
            }
        }
        for (stage, &t) in bwd_time.iter().enumerate() {
            if t < T::zero() {
                return Err(ChainError::negative_cost("bwd_time", stage));
            }
        }

        // Pad to point form: the terminal loss point costs nothing and
        // produces nothing.
        fwd_time.push(T::zero());
        bwd_time.push(T::zero());
        x_size.push(0);
        xbar_size.push(0);
        tmp_fwd.push(0);
        tmp_bwd.push(0);

        Ok(Self {
            length,
            fwd_time,
            bwd_time,
            x_size,
            xbar_size,
            tmp_fwd,
            tmp_bwd,
        })
    }

    fn check_len(column: &'static str, expected: usize, actual: usize) -> Result<(), ChainError> {
        if expected != actual {
            return Err(ChainError::length_mismatch(column, expected, actual));
        }
        Ok(())
    }

    /// Number of stages `L` (the terminal loss point is at index `L`).
    pub fn length(&self) -> usize {
        self.length
    }

    /// Forward compute cost of point `i` (`0..=L`, terminal zero).
    pub fn fwd_time(&self, i: usize) -> T {
        self.fwd_time[i]
    }

    /// Backward compute cost of point `i` (`0..=L`, terminal zero).
    pub fn bwd_time(&self, i: usize) -> T {
        self.bwd_time[i]
    }

    /// Input activation size of point `i` in memory units (`0..=L+1`).
    ///
    /// `x_size(0)` is the model input; `x_size(i)` for `i >= 1` is the
    /// persisted output of stage `i - 1`; the final index is a zero pad.
    pub fn x_size(&self, i: usize) -> usize {
        self.x_size[i]
    }

    /// Peak held-activation size of point `i` in memory units.
    ///
    /// At least `x_size(i)` except where collapsed to zero for a
    /// single-operation in-place stage.
    pub fn xbar_size(&self, i: usize) -> usize {
        self.xbar_size[i]
    }

    /// Forward transient memory of point `i` in memory units.
    pub fn tmp_fwd(&self, i: usize) -> usize {
        self.tmp_fwd[i]
    }

    /// Backward transient memory of point `i` in memory units.
    pub fn tmp_bwd(&self, i: usize) -> usize {
        self.tmp_bwd[i]
    }

    /// Padded forward costs (`L + 1` entries).
    pub fn fwd_times(&self) -> &[T] {
        &self.fwd_time
    }

    /// Padded backward costs (`L + 1` entries).
    pub fn bwd_times(&self) -> &[T] {
        &self.bwd_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_stage() -> Chain<f64> {
        Chain::new(
            vec![5.0, 4.0],
            vec![3.0, 2.0],
            vec![2, 1, 1],
            vec![2, 1, 1],
            vec![0, 0],
            vec![1, 1],
        )
        .unwrap()
    }

    #[test]
    fn test_padding_and_accessors() {
        let chain = two_stage();
        assert_eq!(chain.length(), 2);

        assert_eq!(chain.fwd_time(0), 5.0);
        assert_eq!(chain.fwd_time(1), 4.0);
        assert_eq!(chain.fwd_time(2), 0.0);

        assert_eq!(chain.bwd_time(1), 2.0);
        assert_eq!(chain.bwd_time(2), 0.0);

        assert_eq!(chain.x_size(0), 2);
        assert_eq!(chain.x_size(2), 1);
        assert_eq!(chain.x_size(3), 0);

        assert_eq!(chain.tmp_bwd(0), 1);
        assert_eq!(chain.tmp_bwd(2), 0);
    }

    #[test]
    fn test_empty_chain_rejected() {
        let result: Result<Chain<f64>, _> =
            Chain::new(vec![], vec![], vec![0], vec![0], vec![], vec![]);
        assert!(result.unwrap_err().is_empty_chain());
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let result: Result<Chain<f64>, _> = Chain::new(
            vec![5.0, 4.0],
            vec![3.0, 2.0],
            vec![2, 1], // needs L + 1 = 3 entries
            vec![2, 1, 1],
            vec![0, 0],
            vec![0, 0],
        );
        let err = result.unwrap_err();
        assert!(err.is_length_mismatch());
        assert!(format!("{}", err).contains("x_size"));
    }

    #[test]
    fn test_negative_cost_rejected() {
        let result: Result<Chain<f64>, _> = Chain::new(
            vec![5.0],
            vec![-1.0],
            vec![1, 1],
            vec![1, 1],
            vec![0],
            vec![0],
        );
        assert!(result.unwrap_err().is_negative_cost());
    }

    #[test]
    fn test_clone_and_equality() {
        let chain = two_stage();
        assert_eq!(chain, chain.clone());
    }
}
