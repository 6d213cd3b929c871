//! Flags shared by the typed tree and the compiled signature.

use serde::{Deserialize, Serialize};

/// Recursive flag on a type group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RecFlag {
    Nonrecursive,
    #[default]
    Recursive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PrivateFlag {
    Private,
    #[default]
    Public,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MutableFlag {
    #[default]
    Immutable,
    Mutable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum VirtualFlag {
    Virtual,
    #[default]
    Concrete,
}

/// Closed/open flag for polymorphic variants and object types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClosedFlag {
    Closed,
    Open,
}

/// Variance annotation written on a type parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum VarianceAnnotation {
    Covariant,
    Contravariant,
    #[default]
    NoVariance,
}

/// Injectivity annotation written on a type parameter (`!'a`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Injectivity {
    Injective,
    #[default]
    NoInjectivity,
}

/// Argument label in the front-end's encoding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ArgLabel {
    /// Positional argument: `t -> u`
    #[default]
    Nolabel,
    /// Labeled argument: `l:t -> u`
    Labelled(String),
    /// Optional argument: `?l:t -> u`
    Optional(String),
}

impl ArgLabel {
    pub fn labelled(name: impl Into<String>) -> Self {
        ArgLabel::Labelled(name.into())
    }

    pub fn optional(name: impl Into<String>) -> Self {
        ArgLabel::Optional(name.into())
    }
}
