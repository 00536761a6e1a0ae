//! Schedule reconstruction from the decision table.
//!
//! Replays the `what` table recursively to emit the ordered list of
//! atomic operations whose total time equals the table's optimum
//! exactly. Each recursive call returns its own owned [`Sequence`];
//! the caller concatenates, so no shared cursor is threaded through
//! the recursion. Depth is bounded by the chain length.

use crate::error::PlanError;
use crate::table::{Decision, DpTables};
use num_traits::Float;
use remat_core::{Chain, Operation, Sequence};

/// Reconstruct the optimal schedule for stages `lmin..=lmax` with
/// `cmem` memory units.
///
/// # Arguments
///
/// * `chain` - The chain the tables were computed for
/// * `lmin` - First stage of the range
/// * `lmax` - Last point of the range (`chain.length()` for the full
///   pipeline, covering the terminal loss)
/// * `cmem` - Memory units available to the range
/// * `tables` - Tables from [`compute_tables`](crate::table::compute_tables)
///
/// # Returns
///
/// * `Ok(sequence)` - Schedule with
///   `sequence.total_time(chain) == tables.opt(cmem, lmin, lmax)`
/// * `Err(PlanError::InfeasibleSchedule)` - Zero memory or an infinite
///   table cell for the request
/// * `Err(PlanError::Internal)` - A decision entry the fill should
///   have produced is missing (solver bug)
pub fn reconstruct<T: Float>(
    chain: &Chain<T>,
    lmin: usize,
    lmax: usize,
    cmem: usize,
    tables: &DpTables<T>,
) -> Result<Sequence, PlanError> {
    if cmem == 0 {
        return Err(PlanError::infeasible_schedule(lmin, lmax, 0));
    }
    if !tables.is_feasible(cmem, lmin, lmax) {
        return Err(PlanError::infeasible_schedule(lmin, lmax, cmem));
    }

    let mut sequence = Sequence::new();

    if lmin == lmax {
        if lmin == chain.length() {
            sequence.push(Operation::Loss);
        } else {
            sequence.push(Operation::ForwardEnable(lmin));
            sequence.push(Operation::Backward(lmin));
        }
        return Ok(sequence);
    }

    match tables.what(cmem, lmin, lmax) {
        Some(Decision::Chain) => {
            sequence.push(Operation::ForwardEnable(lmin));
            let inner = checked_budget(cmem, chain.xbar_size(lmin + 1), lmin, lmax)?;
            sequence.append(reconstruct(chain, lmin + 1, lmax, inner, tables)?);
            sequence.push(Operation::Backward(lmin));
        }
        Some(Decision::Leaf(k)) => {
            sequence.push(Operation::ForwardCheck(lmin));
            for t in (lmin + 1)..k {
                sequence.push(Operation::ForwardNograd(t));
            }
            let suffix_mem = checked_budget(cmem, chain.x_size(k), lmin, lmax)?;
            sequence.append(reconstruct(chain, k, lmax, suffix_mem, tables)?);
            // The prefix is emitted after the suffix: it is replayed
            // during the suffix's backward pass, at full budget.
            sequence.append(reconstruct(chain, lmin, k - 1, cmem, tables)?);
        }
        None => {
            return Err(PlanError::internal(format!(
                "no decision recorded for stages {}..={} at {} memory units",
                lmin, lmax, cmem
            )));
        }
    }

    Ok(sequence)
}

/// Subtract a persisted checkpoint from the running budget.
///
/// A finite table value implies the subtraction cannot underflow, so
/// an underflow here is a solver bug rather than an infeasibility.
fn checked_budget(cmem: usize, hold: usize, lmin: usize, lmax: usize) -> Result<usize, PlanError> {
    cmem.checked_sub(hold).ok_or_else(|| {
        PlanError::internal(format!(
            "checkpoint of {} units exceeds budget {} for stages {}..={}",
            hold, cmem, lmin, lmax
        ))
    })
}
