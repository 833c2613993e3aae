//! Structural delta engine for compiled types.
//!
//! # Architecture
//!
//! The engine is built on traits for extensibility:
//!
//! - [`ChangeComputer`](traits::ChangeComputer): Trait for computing one concern of a type comparison
//! - Individual change computers in the [`changes`] module
//!
//! Deltas are built bottom-up per type, merged per component, and rooted
//! in one [`DeltaForest`] per baseline comparison.
//!
//! # Example
//!
//! ```ignore
//! use api_tools::diff::DeltaEngine;
//!
//! let engine = DeltaEngine::new();
//! let forest = engine.compare(&old_baseline, &new_baseline)?;
//! for leaf in forest.leaves() {
//!     println!("{} {} {:?}", leaf.key, leaf.change_kind, leaf.flag());
//! }
//! ```

pub mod changes;
mod delta;
mod engine;
mod result;
pub mod traits;

pub use delta::{ChangeFlag, ChangeKind, Delta};
pub use engine::DeltaEngine;
pub use result::{DeltaForest, DeltaSummary};
pub use traits::{ChangeComputer, Side, TypeContext};
