//! # remat_planner
//!
//! Memory-constrained checkpoint-placement optimizer for sequential
//! computation pipelines.
//!
//! Given an ordered chain of profiled stages, the planner decides, for
//! each stage, whether its activation is kept resident
//! ("checkpointed") or discarded and recomputed later
//! ("rematerialised"), minimising total execution time under a fixed
//! memory budget. The placement is exact: a dynamic program over every
//! memory budget and stage range, never a heuristic.
//!
//! ## Architecture Position
//!
//! Layer 2 of the two-layer architecture. Depends on `remat_core`
//! (L1) for the data model. Collaborators — the graph linearizer that
//! produces stage groups, the profiler that measures them, and the
//! executor that replays the schedule — sit outside both layers.
//!
//! ## Modules
//!
//! - `builder`: Profiled stage groups -> discretised [`Chain`]
//! - `table`: The dynamic-programming table solver
//! - `reconstruct`: Decision table -> operation [`Sequence`]
//! - `annotate`: Sequence -> per-stage checkpoint-region annotation
//! - `config`: Memory budget configuration
//!
//! ## Example
//!
//! ```rust
//! use remat_core::stage::{StageGroup, StageOp};
//! use remat_planner::{plan, PlannerConfig};
//!
//! let stages: Vec<StageGroup<f64>> = (0..4)
//!     .map(|i| {
//!         StageGroup::single(
//!             StageOp::new(format!("layer{}", i), 100.0, 200.0, 4096)
//!                 .with_grad_bytes(4096),
//!         )
//!     })
//!     .collect();
//!
//! let config = PlannerConfig::new(64 * 1024).with_mem_slots(50);
//! let plan = plan(&stages, &[4096], &config).unwrap();
//! assert_eq!(plan.annotation.num_stages(), 4);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod annotate;
pub mod builder;
pub mod config;
pub mod reconstruct;
pub mod table;

mod error;

pub use config::PlannerConfig;
pub use error::PlanError;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::annotate::annotate;
    pub use crate::builder::build_chain;
    pub use crate::reconstruct::reconstruct;
    pub use crate::table::{compute_tables, Decision, DpTables};
    pub use crate::{plan, Plan, PlanError, PlannerConfig};
}

use num_traits::Float;
use remat_core::{Chain, ScheduleAnnotation, Sequence, StageGroup};
use tracing::debug;

/// Result of an end-to-end planning run.
///
/// Carries the discretised chain the schedule was optimised for, the
/// raw operation sequence (diagnostics and replay validation), and the
/// per-stage checkpoint-region annotation consumed by the executor.
#[derive(Debug, Clone)]
pub struct Plan<T: Float> {
    /// The discretised chain the tables were computed for.
    pub chain: Chain<T>,
    /// The reconstructed schedule, in execution order.
    pub sequence: Sequence,
    /// Per-stage checkpoint-region ids.
    pub annotation: ScheduleAnnotation,
}

/// Plan a rematerialisation schedule for a profiled pipeline.
///
/// Runs the full pipeline: configuration validation, chain
/// construction, the table solve over `mem_slots` memory units,
/// schedule reconstruction with the model input's residency charged up
/// front, and annotation.
///
/// # Arguments
///
/// * `stages` - Linearised stage groups with per-operation measurements
/// * `input_bytes` - Sizes of the model's input tensors in bytes
/// * `config` - Memory budget and discretisation parameters
///
/// # Returns
///
/// * `Ok(plan)` - Optimal schedule under the budget
/// * `Err(PlanError)` - Invalid configuration or stages, or no
///   feasible schedule within the budget
pub fn plan<T>(
    stages: &[StageGroup<T>],
    input_bytes: &[u64],
    config: &PlannerConfig,
) -> Result<Plan<T>, PlanError>
where
    T: Float + Send + Sync,
{
    config.validate()?;

    let chain = builder::build_chain(stages, input_bytes, config.mem_unit())?;
    debug!(
        stages = chain.length(),
        mem_unit = config.mem_unit(),
        mem_slots = config.mem_slots,
        "constructed chain"
    );

    let tables = table::compute_tables(&chain, config.mem_slots);

    // The model input stays resident for the whole run; its units are
    // charged before the first stage is scheduled.
    let budget = config.mem_slots.saturating_sub(chain.x_size(0));
    let sequence = reconstruct::reconstruct(&chain, 0, chain.length(), budget, &tables)?;
    debug!(operations = sequence.len(), "reconstructed schedule");

    let annotation = annotate::annotate(&sequence, chain.length());

    Ok(Plan {
        chain,
        sequence,
        annotation,
    })
}
