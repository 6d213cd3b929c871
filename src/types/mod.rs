//! Input model: what the front-end hands to the loader.
//!
//! - [`typedtree`] - the typed signature tree of one interface
//! - [`decl`] - compiled signatures (realized includes, `module type of`)
//! - [`Path`] - compiler-internal references
//!
//! Both halves are plain owned data and deserializable, so a front-end (or a
//! fixture) can pass them over as JSON.

pub mod asttypes;
pub mod decl;
pub mod path;
pub mod type_expr;
pub mod typedtree;
pub mod variance;

// Re-exports for convenience
pub use asttypes::{
    ArgLabel, ClosedFlag, Injectivity, MutableFlag, PrivateFlag, RecFlag, VarianceAnnotation,
    VirtualFlag,
};
pub use decl::{Attribute, AttributePayload, Attributes};
pub use path::Path;
pub use type_expr::TypeExpr;
pub use variance::{Variance, VarianceFlag};
