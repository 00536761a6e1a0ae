//! # remat_core: Data Model for the Rematerialisation Planner
//!
//! ## Layer 1 (Foundation) Role
//!
//! remat_core serves as the bottom layer of the two-layer architecture,
//! providing:
//! - The discretised cost chain consumed by the optimizer (`chain`)
//! - Profiled stage inputs supplied by collaborators (`stage`)
//! - Schedule operations, sequences, and annotations (`schedule`)
//! - Memory discretisation helpers (`discretize`)
//! - Error types: `ChainError` (`error`)
//!
//! ## Zero Dependency Principle
//!
//! Layer 1 has no dependencies on other remat_* crates, with minimal
//! external dependencies:
//! - num-traits: Traits for generic numerical computation
//! - thiserror: Structured error types
//! - serde: Serialisation support (optional)
//!
//! ## Usage Examples
//!
//! ```rust
//! use remat_core::chain::Chain;
//! use remat_core::discretize::{discretize, mem_unit};
//!
//! // Discretise a raw byte quantity into memory units
//! let unit = mem_unit(1_000_000, 500, 0.02);
//! let units = discretize(4096, unit);
//! assert!(units as u64 * unit >= 4096);
//!
//! // Build a one-stage chain directly from measurements
//! let chain: Chain<f64> = Chain::new(
//!     vec![5.0],
//!     vec![3.0],
//!     vec![1, 1],
//!     vec![1, 1],
//!     vec![0],
//!     vec![0],
//! )
//! .unwrap();
//! assert_eq!(chain.length(), 1);
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialisation for chains, stages, and schedules

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod chain;
pub mod discretize;
pub mod error;
pub mod schedule;
pub mod stage;

pub use chain::Chain;
pub use error::ChainError;
pub use schedule::{Operation, ScheduleAnnotation, Sequence};
pub use stage::{StageGroup, StageOp};
