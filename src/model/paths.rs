//! Stable identifiers and references of the documentation model.
//!
//! An [`Identifier`] names one documented entity by its position in the
//! declaration tree: `(parent, kind, name)` up to a single [`Root`] per
//! compilation unit. Identifiers are immutable and cheap to clone; equality
//! is structural, so two independently built identifiers for the same
//! entity compare equal.
//!
//! [`Path`] and [`Fragment`] are what type expressions and constraints
//! refer through. A reference the loader could follow all the way is
//! `Resolved`; the rest of the variants record how far it got.
//!
//! [`Root`]: IdentifierKind::Root

use crate::names;
use smol_str::SmolStr;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IdentifierKind {
    Root,
    Module,
    ModuleType,
    Type,
    Value,
    Exception,
    Extension,
    Class,
    ClassType,
    Method,
    InstanceVariable,
    Constructor,
    Field,
    FunctorParameter,
}

impl IdentifierKind {
    /// Prefix used in the printed form of an identifier.
    pub fn as_str(self) -> &'static str {
        match self {
            IdentifierKind::Root => "root",
            IdentifierKind::Module => "module",
            IdentifierKind::ModuleType => "module-type",
            IdentifierKind::Type => "type",
            IdentifierKind::Value => "val",
            IdentifierKind::Exception => "exception",
            IdentifierKind::Extension => "extension",
            IdentifierKind::Class => "class",
            IdentifierKind::ClassType => "class-type",
            IdentifierKind::Method => "method",
            IdentifierKind::InstanceVariable => "instance-variable",
            IdentifierKind::Constructor => "constructor",
            IdentifierKind::Field => "field",
            IdentifierKind::FunctorParameter => "argument",
        }
    }
}

#[derive(Debug, PartialEq, Eq, Hash)]
enum Node {
    Root {
        container: SmolStr,
        name: SmolStr,
    },
    Child {
        parent: Identifier,
        kind: IdentifierKind,
        name: SmolStr,
    },
    /// Functor parameters are numbered along the owner's chain of
    /// parameters, so a shadowing parameter gets its own identifier.
    Argument {
        parent: Identifier,
        position: usize,
        name: SmolStr,
    },
}

/// A stable, hierarchical name for one documented entity.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Identifier(Arc<Node>);

impl Identifier {
    /// The root of a compilation unit: `(compilation-root-name, unit-name)`.
    pub fn root(container: impl Into<SmolStr>, name: impl Into<SmolStr>) -> Self {
        Identifier(Arc::new(Node::Root {
            container: container.into(),
            name: name.into(),
        }))
    }

    /// Allocate the identifier of a declaration nested under `self`.
    pub fn child(&self, kind: IdentifierKind, name: impl Into<SmolStr>) -> Self {
        debug_assert!(!matches!(kind, IdentifierKind::Root | IdentifierKind::FunctorParameter));
        Identifier(Arc::new(Node::Child {
            parent: self.clone(),
            kind,
            name: name.into(),
        }))
    }

    /// Allocate the identifier of the `position`-th (1-based) parameter of
    /// a functor declared by `self`.
    pub fn argument(&self, position: usize, name: impl Into<SmolStr>) -> Self {
        Identifier(Arc::new(Node::Argument {
            parent: self.clone(),
            position,
            name: name.into(),
        }))
    }

    pub fn kind(&self) -> IdentifierKind {
        match &*self.0 {
            Node::Root { .. } => IdentifierKind::Root,
            Node::Child { kind, .. } => *kind,
            Node::Argument { .. } => IdentifierKind::FunctorParameter,
        }
    }

    pub fn name(&self) -> &str {
        match &*self.0 {
            Node::Root { name, .. } | Node::Child { name, .. } | Node::Argument { name, .. } => name,
        }
    }

    /// Position of a functor parameter among its owner's parameters.
    pub fn position(&self) -> Option<usize> {
        match &*self.0 {
            Node::Argument { position, .. } => Some(*position),
            _ => None,
        }
    }

    pub fn parent(&self) -> Option<&Identifier> {
        match &*self.0 {
            Node::Root { .. } => None,
            Node::Child { parent, .. } | Node::Argument { parent, .. } => Some(parent),
        }
    }

    /// The compilation root this identifier belongs to.
    pub fn root_of(&self) -> &Identifier {
        let mut id = self;
        while let Some(parent) = id.parent() {
            id = parent;
        }
        id
    }

    /// Whether `self` is `other` or nested anywhere under it.
    pub fn is_within(&self, other: &Identifier) -> bool {
        let mut id = Some(self);
        while let Some(current) = id {
            if current == other {
                return true;
            }
            id = current.parent();
        }
        false
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.0 {
            Node::Root { name, .. } => write!(f, "{}", name),
            Node::Child { parent, kind, name } => {
                write!(f, "{}.{}-{}", parent, kind.as_str(), names::parenthesise(name))
            }
            Node::Argument {
                parent,
                position,
                name,
            } => write!(f, "{}.argument-{}-{}", parent, position, name),
        }
    }
}

impl fmt::Debug for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.0 {
            Node::Root { container, name } => write!(f, "Root({}, {})", container, name),
            Node::Child { .. } | Node::Argument { .. } => write!(f, "{}", self),
        }
    }
}

/// Namespace a path is looked up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathKind {
    Module,
    ModuleType,
    Type,
    ClassType,
}

/// A reference to a module, module type, type or class.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Path {
    /// Points at a declaration of this (or an enclosing) unit.
    Resolved(Identifier),
    /// Another compilation unit.
    Root(SmolStr),
    /// A predefined type or exception (`int`, `list`, `Not_found`).
    Core(SmolStr),
    /// A projection whose target the loader did not know statically.
    Dot(Box<Path>, SmolStr),
    /// Functor application.
    Apply(Box<Path>, Box<Path>),
}

impl Path {
    pub fn dot(self, name: impl Into<SmolStr>) -> Self {
        Path::Dot(Box::new(self), name.into())
    }

    /// Build an unresolved path from a dotted string, as written in a
    /// `@canonical` tag. Returns `None` for an empty or malformed string.
    pub fn from_dotted(s: &str) -> Option<Self> {
        let mut parts = s.trim().split('.');
        let head = parts.next().filter(|h| !h.is_empty())?;
        parts.try_fold(Path::Root(head.into()), |acc, part| {
            (!part.is_empty()).then(|| acc.dot(part))
        })
    }

    /// The identifier this path resolved to, if it resolved completely.
    pub fn identifier(&self) -> Option<&Identifier> {
        match self {
            Path::Resolved(id) => Some(id),
            _ => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Path::Resolved(_))
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Path::Resolved(id) => write!(f, "{}", id),
            Path::Root(name) | Path::Core(name) => write!(f, "{}", name),
            Path::Dot(p, name) => write!(f, "{}.{}", p, name),
            Path::Apply(p, arg) => write!(f, "{}({})", p, arg),
        }
    }
}

/// A reference relative to a constrained signature (`with type M.t = ...`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Fragment {
    /// The constrained signature itself.
    Root,
    /// Resolved through the signature's known structure.
    Resolved(Identifier),
    /// A projection not resolvable without expanding the signature.
    Dot(Box<Fragment>, SmolStr),
}

impl Fragment {
    pub fn dot(self, name: impl Into<SmolStr>) -> Self {
        Fragment::Dot(Box::new(self), name.into())
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Fragment::Resolved(_))
    }
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fragment::Root => Ok(()),
            Fragment::Resolved(id) => write!(f, "{}", id),
            Fragment::Dot(p, name) if **p == Fragment::Root => write!(f, "{}", name),
            Fragment::Dot(p, name) => write!(f, "{}.{}", p, name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_structural_equality() {
        let root = Identifier::root("pkg", "Unit");
        let a = root.child(IdentifierKind::Module, "M").child(IdentifierKind::Type, "t");
        let b = root.child(IdentifierKind::Module, "M").child(IdentifierKind::Type, "t");
        let c = root
            .child(IdentifierKind::ModuleType, "M")
            .child(IdentifierKind::Type, "t");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.kind(), IdentifierKind::Type);
        assert_eq!(a.root_of(), &root);
    }

    #[test]
    fn test_identifier_display() {
        let root = Identifier::root("pkg", "Unit");
        let m = root.child(IdentifierKind::Module, "M");
        assert_eq!(m.child(IdentifierKind::Type, "t").to_string(), "Unit.module-M.type-t");
        assert_eq!(m.child(IdentifierKind::Value, "+").to_string(), "Unit.module-M.val-(+)");
        assert_eq!(format!("{:?}", root), "Root(pkg, Unit)");
    }

    #[test]
    fn test_argument_identifiers() {
        let f = Identifier::root("pkg", "Unit").child(IdentifierKind::Module, "F");
        let first = f.argument(1, "X");
        let second = f.argument(2, "X");

        assert_ne!(first, second);
        assert_eq!(first, f.argument(1, "X"));
        assert_eq!(second.to_string(), "Unit.module-F.argument-2-X");
        assert_eq!(second.kind(), IdentifierKind::FunctorParameter);
        assert_eq!(second.name(), "X");
        assert_eq!(second.position(), Some(2));
        assert_eq!(second.parent(), Some(&f));
        assert_eq!(f.position(), None);
    }

    #[test]
    fn test_is_within() {
        let root = Identifier::root("pkg", "Unit");
        let m = root.child(IdentifierKind::Module, "M");
        let t = m.child(IdentifierKind::Type, "t");
        assert!(t.is_within(&m));
        assert!(t.is_within(&root));
        assert!(!m.is_within(&t));
    }

    #[test]
    fn test_path_from_dotted() {
        let p = Path::from_dotted("Foo.Bar").unwrap();
        assert_eq!(p, Path::Root("Foo".into()).dot("Bar"));
        assert_eq!(p.to_string(), "Foo.Bar");
        assert!(Path::from_dotted("").is_none());
        assert!(Path::from_dotted("Foo..Bar").is_none());
    }

    #[test]
    fn test_fragment_display() {
        let frag = Fragment::Root.dot("M").dot("t");
        assert_eq!(frag.to_string(), "M.t");
        assert!(!frag.is_resolved());
    }
}
