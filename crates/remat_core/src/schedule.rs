//! Schedule operations, sequences, and annotations.
//!
//! The reconstructor emits a flat [`Sequence`] of atomic [`Operation`]s
//! describing, in execution order, which stages run forward with a
//! retained graph, which persist a checkpoint, which recompute without
//! a graph, and where each backward pass happens. The annotator folds
//! that sequence back onto the original stages as a
//! [`ScheduleAnnotation`].

use crate::chain::Chain;
use crate::stage::StageGroup;
use num_traits::Float;
use std::fmt;

/// One atomic schedule operation.
///
/// # Variants
///
/// - `ForwardEnable`: run the stage forward, retaining its graph and
///   activation for the backward pass
/// - `ForwardCheck`: run the stage forward and persist a checkpoint of
///   its output
/// - `ForwardNograd`: run the stage forward purely to recompute,
///   building no backward graph
/// - `Backward`: run the stage's backward pass
/// - `Loss`: terminal marker separating the forward and backward phases
///
/// # Examples
///
/// ```
/// use remat_core::schedule::Operation;
///
/// let op = Operation::ForwardCheck(3);
/// assert_eq!(op.stage(), Some(3));
/// assert_eq!(format!("{}", op), "ForwardCheck(3)");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Operation {
    /// Forward with retained backward graph.
    ForwardEnable(usize),
    /// Forward persisting a checkpoint.
    ForwardCheck(usize),
    /// Forward recomputation without a backward graph.
    ForwardNograd(usize),
    /// Backward pass of a stage.
    Backward(usize),
    /// Terminal loss marker.
    Loss,
}

impl Operation {
    /// The stage index this operation touches, if any.
    pub fn stage(&self) -> Option<usize> {
        match self {
            Operation::ForwardEnable(i)
            | Operation::ForwardCheck(i)
            | Operation::ForwardNograd(i)
            | Operation::Backward(i) => Some(*i),
            Operation::Loss => None,
        }
    }

    /// Whether this is one of the three forward variants.
    pub fn is_forward(&self) -> bool {
        matches!(
            self,
            Operation::ForwardEnable(_) | Operation::ForwardCheck(_) | Operation::ForwardNograd(_)
        )
    }

    /// Compute cost of this operation under the given chain.
    ///
    /// Forward variants cost the stage's forward time, `Backward` its
    /// backward time, and `Loss` the terminal point's (zero) cost.
    pub fn time<T: Float>(&self, chain: &Chain<T>) -> T {
        match self {
            Operation::ForwardEnable(i)
            | Operation::ForwardCheck(i)
            | Operation::ForwardNograd(i) => chain.fwd_time(*i),
            Operation::Backward(i) => chain.bwd_time(*i),
            Operation::Loss => {
                chain.fwd_time(chain.length()) + chain.bwd_time(chain.length())
            }
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::ForwardEnable(i) => write!(f, "ForwardEnable({})", i),
            Operation::ForwardCheck(i) => write!(f, "ForwardCheck({})", i),
            Operation::ForwardNograd(i) => write!(f, "ForwardNograd({})", i),
            Operation::Backward(i) => write!(f, "Backward({})", i),
            Operation::Loss => write!(f, "Loss"),
        }
    }
}

/// An ordered list of schedule operations.
///
/// Built once by the reconstructor for a `(lmin, lmax, memory)`
/// request; exposed to callers for diagnostics and replay validation.
///
/// # Examples
///
/// ```
/// use remat_core::schedule::{Operation, Sequence};
///
/// let mut seq = Sequence::new();
/// seq.push(Operation::ForwardEnable(0));
/// seq.push(Operation::Loss);
/// seq.push(Operation::Backward(0));
/// assert_eq!(seq.len(), 3);
/// assert_eq!(format!("{}", seq), "ForwardEnable(0), Loss, Backward(0)");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Sequence {
    ops: Vec<Operation>,
}

impl Sequence {
    /// Create an empty sequence.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a single operation.
    pub fn push(&mut self, op: Operation) {
        self.ops.push(op);
    }

    /// Append all operations of another sequence, consuming it.
    pub fn append(&mut self, other: Sequence) {
        self.ops.extend(other.ops);
    }

    /// The operations in execution order.
    pub fn ops(&self) -> &[Operation] {
        &self.ops
    }

    /// Number of operations.
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Whether the sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Position of the terminal `Loss` marker, if present.
    pub fn loss_position(&self) -> Option<usize> {
        self.ops.iter().position(|op| matches!(op, Operation::Loss))
    }

    /// Total compute time of the schedule under the given chain.
    ///
    /// Equals the optimizer's table value for the request that built
    /// this sequence.
    pub fn total_time<T: Float>(&self, chain: &Chain<T>) -> T {
        self.ops
            .iter()
            .fold(T::zero(), |acc, op| acc + op.time(chain))
    }

    /// Iterate over the operations.
    pub fn iter(&self) -> std::slice::Iter<'_, Operation> {
        self.ops.iter()
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for op in &self.ops {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{}", op)?;
            first = false;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a Sequence {
    type Item = &'a Operation;
    type IntoIter = std::slice::Iter<'a, Operation>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.iter()
    }
}

impl FromIterator<Operation> for Sequence {
    fn from_iter<I: IntoIterator<Item = Operation>>(iter: I) -> Self {
        Self {
            ops: iter.into_iter().collect(),
        }
    }
}

/// Per-stage checkpoint-region annotation.
///
/// Each stage carries an ordered list of region ids, one entry per
/// nesting depth. Entries are `None`-padded on the right so that every
/// stage inside the same top-level region reports an equal-length
/// list (nested recomputation can occur unevenly across siblings).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScheduleAnnotation {
    stages: Vec<Vec<Option<usize>>>,
}

impl ScheduleAnnotation {
    /// Create an annotation from per-stage id lists.
    pub fn from_stages(stages: Vec<Vec<Option<usize>>>) -> Self {
        Self { stages }
    }

    /// Number of annotated stages.
    pub fn num_stages(&self) -> usize {
        self.stages.len()
    }

    /// Region ids of one stage, outermost first.
    pub fn stage(&self, idx: usize) -> &[Option<usize>] {
        &self.stages[idx]
    }

    /// All per-stage id lists.
    pub fn stages(&self) -> &[Vec<Option<usize>>] {
        &self.stages
    }

    /// Expand the per-stage annotation to one entry per original
    /// operation, in flat linearised order.
    ///
    /// Operations within a stage share the stage's id list.
    pub fn expand_to_ops<T: Float>(&self, groups: &[StageGroup<T>]) -> Vec<Vec<Option<usize>>> {
        groups
            .iter()
            .zip(&self.stages)
            .flat_map(|(group, ids)| group.ops.iter().map(move |_| ids.clone()))
            .collect()
    }
}
