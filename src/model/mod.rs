//! Structural model of compiled components.
//!
//! The model is produced by an external bytecode reader and consumed by the
//! delta engine, the reference extractor and the search engine:
//!
//! - [`Type`], [`Field`], [`Method`]: one compiled type and its members
//! - [`Component`]: a versioned unit of types with its [`VisibilityMap`]
//! - [`Baseline`]: a resolved, ordered component graph
//!
//! ```ignore
//! let baseline = BaselineBuilder::new("target")
//!     .component(Component::new("org.example.core", "1.0.0").with_type(color))
//!     .build()?;
//! let providers = baseline.resolve_package(from, "org.example")?;
//! ```

mod baseline;
mod component;
mod identifiers;
pub mod signatures;
mod types;
mod usage;
mod visibility;

pub use baseline::*;
pub use component::*;
pub use identifiers::*;
pub use types::*;
pub use usage::*;
pub use visibility::*;
