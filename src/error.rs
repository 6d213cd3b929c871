//! Fatal load errors.
//!
//! Each variant is a shape the front-end promises never to hand over in a
//! well-typed signature. The first one met aborts the whole load. Missing
//! or malformed documentation is never an error here; see
//! [`Doc`](crate::model::Doc).

use crate::location::Location;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LoadError {
    /// `type t += C = D` in a signature
    #[error("{loc}: extension constructor `{name}` is a rebind")]
    ExtensionRebind { name: String, loc: Location },

    /// A constructor arrow where only a class signature or path may appear
    #[error("{loc}: class arrow in class signature position")]
    ClassArrowInSignature { loc: Location },

    /// `with type t := ...` without a right-hand side
    #[error("{loc}: type substitution on `{fragment}` has no manifest")]
    MissingSubstitutionManifest { fragment: String, loc: Location },

    /// A type parameter that is neither `_` nor a variable
    #[error("{loc}: type parameter of `{name}` is not a variable")]
    InvalidTypeParameter { name: String, loc: Location },

    /// A module alias in module type position
    #[error("{loc}: module alias `{path}` used as a module type")]
    ModuleTypeAlias { path: String, loc: Location },

    /// A local identifier not bound by any enclosing signature
    #[error("unbound identifier `{ident}`")]
    UnboundIdent { ident: String },
}

/// Convenience type alias for loader results.
pub type LoadResult<T> = std::result::Result<T, LoadError>;
