//! Type expressions of the documentation model.

use super::comment::Doc;
use super::paths::{Fragment, Path};
use smol_str::SmolStr;

/// Argument label of an arrow. Positional arguments carry no label.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Label {
    Label(SmolStr),
    Optional(SmolStr),
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeExpr {
    Any,
    Var(SmolStr),
    Arrow(Option<Label>, Box<TypeExpr>, Box<TypeExpr>),
    Tuple(Vec<TypeExpr>),
    Constr(Path, Vec<TypeExpr>),
    PolymorphicVariant(PolymorphicVariant),
    Object(Object),
    Class(Path, Vec<TypeExpr>),
    Alias(Box<TypeExpr>, SmolStr),
    /// Never built with an empty variable list.
    Poly(Vec<SmolStr>, Box<TypeExpr>),
    Package(Package),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolymorphicVariantKind {
    /// `[> ...]`
    Open,
    /// `[ ... ]`
    Fixed,
    /// `[< ... > tags]`
    Closed(Vec<SmolStr>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PolymorphicVariant {
    pub kind: PolymorphicVariantKind,
    pub elements: Vec<PolymorphicVariantElement>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PolymorphicVariantElement {
    Constructor(VariantConstructor),
    /// An inherited variant type.
    Type(TypeExpr),
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariantConstructor {
    pub name: SmolStr,
    pub constant: bool,
    pub arguments: Vec<TypeExpr>,
    pub doc: Doc,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Object {
    pub fields: Vec<ObjectField>,
    pub open: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ObjectField {
    Method { name: SmolStr, type_: TypeExpr },
    Inherit(TypeExpr),
}

/// `(module S with type t = T)`
#[derive(Debug, Clone, PartialEq)]
pub struct Package {
    pub path: Path,
    pub substitutions: Vec<(Fragment, TypeExpr)>,
}

impl TypeExpr {
    /// Build a quantified type, collapsing an empty quantifier to its body.
    pub fn poly(vars: Vec<SmolStr>, body: TypeExpr) -> TypeExpr {
        if vars.is_empty() {
            body
        } else {
            TypeExpr::Poly(vars, Box::new(body))
        }
    }

    pub fn arrow(label: Option<Label>, arg: TypeExpr, res: TypeExpr) -> TypeExpr {
        TypeExpr::Arrow(label, Box::new(arg), Box::new(res))
    }

    /// Head path of a type constructor application.
    pub fn head_path(&self) -> Option<&Path> {
        match self {
            TypeExpr::Constr(p, _) | TypeExpr::Class(p, _) => Some(p),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poly_collapses_empty_quantifier() {
        let body = TypeExpr::arrow(None, TypeExpr::Var("a".into()), TypeExpr::Var("a".into()));
        assert_eq!(TypeExpr::poly(vec![], body.clone()), body);
        assert!(matches!(
            TypeExpr::poly(vec!["a".into()], body),
            TypeExpr::Poly(vars, _) if vars.len() == 1
        ));
    }

    #[test]
    fn test_head_path() {
        let t = TypeExpr::Constr(Path::Core("int".into()), vec![]);
        assert_eq!(t.head_path(), Some(&Path::Core("int".into())));
        assert_eq!(TypeExpr::Any.head_path(), None);
    }
}
