//! Profiled stage inputs supplied by collaborators.
//!
//! The graph linearizer groups primitive operations into ordered
//! stages; the profiler attaches per-operation compute costs and memory
//! sizes. This module models exactly that hand-off: a [`StageOp`] is
//! one primitive operation's measurements, a [`StageGroup`] is one
//! linearised stage. The planner never executes anything — it only
//! reads these numbers.

use num_traits::Float;

/// Measurements for one primitive operation inside a stage.
///
/// # Type Parameters
///
/// * `T` - Floating-point type (e.g., `f64`) for compute costs
///
/// # Examples
///
/// ```
/// use remat_core::stage::StageOp;
///
/// // A matmul producing a 4KB output, consuming the previous op.
/// let op: StageOp<f64> = StageOp::new("matmul", 128.0, 256.0, 4096)
///     .with_bwd_tmp_bytes(2048)
///     .with_inputs(vec![0]);
/// assert_eq!(op.out_bytes, 4096);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StageOp<T: Float> {
    /// Human-readable operation name (diagnostics only).
    pub label: String,

    /// Forward compute cost (FLOP count or measured time).
    pub fwd_cost: T,

    /// Backward compute cost (FLOP count or measured time).
    pub bwd_cost: T,

    /// Size of the forward output tensor in bytes.
    pub out_bytes: u64,

    /// Transient memory consumed during the forward pass, in bytes.
    pub fwd_tmp_bytes: u64,

    /// Transient memory consumed during the backward pass, in bytes.
    pub bwd_tmp_bytes: u64,

    /// Size of the gradient this operation emits in bytes.
    pub grad_bytes: u64,

    /// Whether the operation writes its output in place.
    pub inplace: bool,

    /// Indices of producer operations within the same stage.
    pub inputs: Vec<usize>,
}

impl<T: Float> StageOp<T> {
    /// Create an operation from its core measurements.
    ///
    /// Transient sizes and the gradient size default to zero, the
    /// in-place flag to false, and the producer list to empty.
    pub fn new(label: impl Into<String>, fwd_cost: T, bwd_cost: T, out_bytes: u64) -> Self {
        Self {
            label: label.into(),
            fwd_cost,
            bwd_cost,
            out_bytes,
            fwd_tmp_bytes: 0,
            bwd_tmp_bytes: 0,
            grad_bytes: 0,
            inplace: false,
            inputs: Vec::new(),
        }
    }

    /// Set the forward transient memory in bytes.
    pub fn with_fwd_tmp_bytes(mut self, bytes: u64) -> Self {
        self.fwd_tmp_bytes = bytes;
        self
    }

    /// Set the backward transient memory in bytes.
    pub fn with_bwd_tmp_bytes(mut self, bytes: u64) -> Self {
        self.bwd_tmp_bytes = bytes;
        self
    }

    /// Set the emitted gradient size in bytes.
    pub fn with_grad_bytes(mut self, bytes: u64) -> Self {
        self.grad_bytes = bytes;
        self
    }

    /// Mark the operation as in-place.
    pub fn with_inplace(mut self, inplace: bool) -> Self {
        self.inplace = inplace;
        self
    }

    /// Set the producer operation indices within the stage.
    pub fn with_inputs(mut self, inputs: Vec<usize>) -> Self {
        self.inputs = inputs;
        self
    }
}

/// One linearised stage: a non-empty ordered list of operations.
///
/// The final operation's output is the stage's persisted activation.
/// `consumer_grad_bytes` lists the gradient sizes of the downstream
/// consumers of that output; they seed the backward liveness scan that
/// derives the stage's backward transient memory.
///
/// # Examples
///
/// ```
/// use remat_core::stage::{StageGroup, StageOp};
///
/// let stage: StageGroup<f64> = StageGroup::new(vec![
///     StageOp::new("linear", 64.0, 128.0, 1024),
///     StageOp::new("relu", 8.0, 8.0, 1024).with_inputs(vec![0]),
/// ])
/// .with_consumer_grad_bytes(vec![1024]);
/// assert_eq!(stage.ops.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StageGroup<T: Float> {
    /// The stage's operations in execution order.
    pub ops: Vec<StageOp<T>>,

    /// Gradient sizes of downstream consumers of the stage output.
    pub consumer_grad_bytes: Vec<u64>,
}

impl<T: Float> StageGroup<T> {
    /// Create a stage from its operations.
    pub fn new(ops: Vec<StageOp<T>>) -> Self {
        Self {
            ops,
            consumer_grad_bytes: Vec::new(),
        }
    }

    /// Create a single-operation stage.
    pub fn single(op: StageOp<T>) -> Self {
        Self::new(vec![op])
    }

    /// Set the downstream consumer gradient sizes.
    pub fn with_consumer_grad_bytes(mut self, bytes: Vec<u64>) -> Self {
        self.consumer_grad_bytes = bytes;
        self
    }

    /// The stage's final operation, whose output is persisted.
    pub fn last_op(&self) -> Option<&StageOp<T>> {
        self.ops.last()
    }

    /// Whether the stage is a single strictly in-place operation.
    ///
    /// Such a stage produces no extra checkpoint-worthy memory, so its
    /// held-activation size collapses to zero.
    pub fn is_single_inplace(&self) -> bool {
        self.ops.len() == 1 && self.ops[0].inplace
    }
}
