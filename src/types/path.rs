//! Compiler-internal paths.
//!
//! A `Path` is how the typed tree refers to a type, module, module type or
//! class: a head [`Ident`] followed by projections and functor applications.
//! The loader resolves every such path into a documentation
//! [`Path`](crate::model::Path) through the scope environment.
//!
//! # Example
//!
//! ```rust
//! use sigdoc::ident::Ident;
//! use sigdoc::types::Path;
//!
//! let list = Path::pdot(Path::pident(Ident::create_persistent("Stdlib")), "List");
//! let t = Path::pdot(list, "t");
//!
//! assert_eq!(t.name(), "Stdlib.List.t");
//! assert_eq!(t.head().map(|id| id.name()), Some("Stdlib"));
//! ```

use crate::ident::Ident;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Path {
    /// A bound identifier: `t`, `M`
    Pident(Ident),
    /// A projection: `M.t`
    Pdot(Box<Path>, String),
    /// Functor application: `F(X)`
    Papply(Box<Path>, Box<Path>),
}

impl Path {
    #[inline]
    pub fn pident(id: Ident) -> Self {
        Path::Pident(id)
    }

    #[inline]
    pub fn pdot(prefix: Path, name: impl Into<String>) -> Self {
        Path::Pdot(Box::new(prefix), name.into())
    }

    #[inline]
    pub fn papply(functor: Path, arg: Path) -> Self {
        Path::Papply(Box::new(functor), Box::new(arg))
    }

    /// Check if two paths refer to the same entity.
    pub fn same(&self, other: &Path) -> bool {
        match (self, other) {
            (Path::Pident(id1), Path::Pident(id2)) => id1.same(id2),
            (Path::Pdot(p1, s1), Path::Pdot(p2, s2)) => s1 == s2 && p1.same(p2),
            (Path::Papply(f1, a1), Path::Papply(f2, a2)) => f1.same(f2) && a1.same(a2),
            _ => false,
        }
    }

    /// The head identifier, or `None` if the path starts with an application.
    pub fn head(&self) -> Option<&Ident> {
        match self {
            Path::Pident(id) => Some(id),
            Path::Pdot(p, _) => p.head(),
            Path::Papply(_, _) => None,
        }
    }

    /// The last component of this path.
    pub fn last(&self) -> &str {
        match self {
            Path::Pident(id) => id.name(),
            Path::Pdot(_, s) => s,
            Path::Papply(_, p) => p.last(),
        }
    }

    pub fn name(&self) -> String {
        match self {
            Path::Pident(id) => id.name().to_string(),
            Path::Pdot(p, s) => format!("{}.{}", p.name(), s),
            Path::Papply(p1, p2) => format!("{}({})", p1.name(), p2.name()),
        }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ident::IdGenerator;

    #[test]
    fn test_same_uses_stamps() {
        let id_gen = IdGenerator::new();
        let m1 = id_gen.create("M");
        let m2 = id_gen.create("M");

        let p1 = Path::pdot(Path::pident(m1.clone()), "t");
        assert!(p1.same(&Path::pdot(Path::pident(m1), "t")));
        assert!(!p1.same(&Path::pdot(Path::pident(m2), "t")));
    }

    #[test]
    fn test_application_has_no_head() {
        let f = Path::pident(Ident::create_persistent("F"));
        let x = Path::pident(Ident::create_persistent("X"));
        let t = Path::pdot(Path::papply(f, x), "t");

        assert_eq!(t.name(), "F(X).t");
        assert_eq!(t.last(), "t");
        assert!(t.head().is_none());
    }
}
