//! Long identifiers: the dotted names written on the left of a `with`
//! constraint and inside package types.
//!
//! Unlike a [`Path`](crate::types::Path), a `Longident` carries no stamps; it
//! is resolved against the structure of the constrained signature, not the
//! scope environment.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A long identifier like `M.N.t`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Longident {
    /// A simple identifier: `t`
    Lident(String),
    /// A dotted name: `M.t` is `Ldot(Lident("M"), "t")`
    Ldot(Box<Longident>, String),
    /// A functor application: `F(X)`. Never legal in a fragment.
    Lapply(Box<Longident>, Box<Longident>),
}

impl Longident {
    pub fn lident(name: impl Into<String>) -> Self {
        Longident::Lident(name.into())
    }

    pub fn ldot(prefix: Longident, name: impl Into<String>) -> Self {
        Longident::Ldot(Box::new(prefix), name.into())
    }

    /// Parse `"M.N.t"` into a dotted long identifier.
    pub fn parse(s: &str) -> Self {
        let mut parts = s.split('.');
        let first = parts.next().unwrap_or_default();
        parts.fold(Longident::Lident(first.to_string()), |acc, part| {
            Longident::Ldot(Box::new(acc), part.to_string())
        })
    }

    pub fn last(&self) -> &str {
        match self {
            Longident::Lident(s) => s,
            Longident::Ldot(_, s) => s,
            Longident::Lapply(_, arg) => arg.last(),
        }
    }

    /// Components from outermost to innermost, or `None` if an application
    /// occurs anywhere in the identifier.
    pub fn components(&self) -> Option<Vec<&str>> {
        match self {
            Longident::Lident(s) => Some(vec![s.as_str()]),
            Longident::Ldot(prefix, s) => {
                let mut v = prefix.components()?;
                v.push(s.as_str());
                Some(v)
            }
            Longident::Lapply(_, _) => None,
        }
    }
}

impl fmt::Display for Longident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Longident::Lident(s) => write!(f, "{}", s),
            Longident::Ldot(prefix, s) => write!(f, "{}.{}", prefix, s),
            Longident::Lapply(func, arg) => write!(f, "{}({})", func, arg),
        }
    }
}
