//! Chain construction from profiled stage groups.
//!
//! Converts collaborator measurements into the normalised, discretised
//! [`Chain`] the optimizer consumes. This module knows nothing about
//! the optimizer's algorithm; it only aggregates, scans, and
//! discretises.

use crate::error::PlanError;
use num_traits::Float;
use remat_core::discretize::discretize;
use remat_core::{Chain, StageGroup};
use std::collections::HashMap;

/// Build a discretised chain from profiled stages.
///
/// # Arguments
///
/// * `stages` - Linearised stage groups with per-operation measurements
/// * `input_bytes` - Sizes of the model's input tensors in bytes
/// * `mem_unit` - Discretisation unit in bytes (positive; derived from
///   the validated [`PlannerConfig`](crate::config::PlannerConfig))
///
/// # Returns
///
/// * `Ok(chain)` - Fully discretised chain, one stage per group
/// * `Err(PlanError)` - Empty pipeline, empty stage, or an operation
///   referencing a producer at or after itself
pub fn build_chain<T: Float>(
    stages: &[StageGroup<T>],
    input_bytes: &[u64],
    mem_unit: u64,
) -> Result<Chain<T>, PlanError> {
    if stages.is_empty() {
        return Err(PlanError::Chain(remat_core::ChainError::EmptyChain));
    }

    let input_total: u64 = input_bytes.iter().sum();

    let mut fwd_time = Vec::with_capacity(stages.len());
    let mut bwd_time = Vec::with_capacity(stages.len());
    let mut x_size = Vec::with_capacity(stages.len() + 1);
    let mut xbar_size = Vec::with_capacity(stages.len() + 1);
    let mut tmp_bwd = Vec::with_capacity(stages.len());

    x_size.push(discretize(input_total, mem_unit));
    xbar_size.push(discretize(input_total, mem_unit));

    for (idx, stage) in stages.iter().enumerate() {
        validate_stage(idx, stage)?;

        // Cost floor of one: a zero-measured operation must not make
        // recomputation look free.
        let fwd: T = stage
            .ops
            .iter()
            .fold(T::zero(), |acc, op| acc + op.fwd_cost.max(T::one()));
        let bwd: T = stage
            .ops
            .iter()
            .fold(T::zero(), |acc, op| acc + op.bwd_cost.max(T::one()));
        fwd_time.push(fwd);
        bwd_time.push(bwd);

        let out_bytes = stage.ops[stage.ops.len() - 1].out_bytes;
        x_size.push(discretize(out_bytes, mem_unit));

        // Peak bytes held while the stage's forward (and a possible
        // later recompute) is live. A single strictly in-place op
        // produces no extra checkpoint-worthy memory.
        if stage.is_single_inplace() {
            xbar_size.push(0);
        } else {
            let fwd_peak: u64 = stage
                .ops
                .iter()
                .map(|op| op.fwd_tmp_bytes + op.out_bytes)
                .sum();
            xbar_size.push(discretize(out_bytes.max(fwd_peak), mem_unit));
        }

        tmp_bwd.push(discretize(stage_bwd_tmp(stage), mem_unit));
    }

    // Forward transients are not separately profiled by collaborators;
    // the column stays so the recurrence remains general.
    let tmp_fwd = vec![0; stages.len()];

    Chain::new(fwd_time, bwd_time, x_size, xbar_size, tmp_fwd, tmp_bwd).map_err(PlanError::from)
}

fn validate_stage<T: Float>(idx: usize, stage: &StageGroup<T>) -> Result<(), PlanError> {
    if stage.ops.is_empty() {
        return Err(PlanError::empty_stage(idx));
    }
    for (op_idx, op) in stage.ops.iter().enumerate() {
        for &producer in &op.inputs {
            if producer >= op_idx {
                return Err(PlanError::invalid_stage(
                    idx,
                    format!(
                        "operation {} ({}) references producer {} at or after itself",
                        op_idx, op.label, producer
                    ),
                ));
            }
        }
    }
    Ok(())
}

/// Worst-case simultaneous liveness during one stage's backward pass.
///
/// Walks the operations in reverse, tracking which gradients are still
/// needed by not-yet-processed producers. At each operation the
/// requirement is the byte sum of live gradients plus the operation's
/// own backward transient; the running maximum is the stage's backward
/// temp. The scan is seeded with the external consumers of the stage
/// output, whose gradients are resident when the stage's backward
/// begins.
fn stage_bwd_tmp<T: Float>(stage: &StageGroup<T>) -> u64 {
    let n = stage.ops.len();

    // users[p]: in-stage consumers of operation p's output.
    let mut users: Vec<Vec<usize>> = vec![Vec::new(); n];
    for (i, op) in stage.ops.iter().enumerate() {
        for &p in &op.inputs {
            users[p].push(i);
        }
    }

    // Live in-stage gradients: op index -> remaining consumer count.
    let mut live: HashMap<usize, usize> = HashMap::new();
    // External consumers hang off the final op and are released once
    // it has been processed.
    let mut external: u64 = stage.consumer_grad_bytes.iter().sum();

    let mut peak: u64 = 0;
    for i in (0..n).rev() {
        let op = &stage.ops[i];

        let live_bytes: u64 = live
            .keys()
            .map(|&k| stage.ops[k].grad_bytes)
            .sum::<u64>()
            + external;
        peak = peak.max(live_bytes + op.bwd_tmp_bytes);

        live.insert(i, op.inputs.len());
        if i == n - 1 {
            external = 0;
        }
        for &u in &users[i] {
            if let Some(count) = live.get_mut(&u) {
                *count -= 1;
            }
        }
        live.retain(|_, count| *count > 0);
    }

    peak
}
