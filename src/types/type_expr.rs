//! Type expressions of a compiled signature.
//!
//! The type checker stores types as a shared graph; by the time a compiled
//! signature reaches the loader it has been unfolded into this tree.
//! Sharing that matters for documentation survives in two ways: named type
//! variables, and anonymous variables carrying the same `id`.

use super::asttypes::ArgLabel;
use super::path::Path;
use crate::longident::Longident;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TypeExpr {
    /// A type variable. Anonymous variables with equal `id` are the same variable.
    Tvar { name: Option<String>, id: i32 },
    /// `l:T1 -> T2`
    Tarrow(ArgLabel, Box<TypeExpr>, Box<TypeExpr>),
    /// `T1 * ... * Tn`
    Ttuple(Vec<TypeExpr>),
    /// `(T1, ..., Tn) p`
    Tconstr(Path, Vec<TypeExpr>),
    /// Object type: methods and whether the row is open.
    Tobject(Vec<(String, TypeExpr)>, bool),
    /// Polymorphic variant.
    Tvariant(RowDesc),
    /// `'a 'b. T`: body and the universal variables it binds.
    Tpoly(Box<TypeExpr>, Vec<TypeExpr>),
    /// A universal variable bound by an enclosing `Tpoly`.
    Tunivar { name: Option<String>, id: i32 },
    /// `(module S with type t1 = T1 ...)`
    Tpackage(Path, Vec<Longident>, Vec<TypeExpr>),
    /// A cycle or explicit `as 'a`, cut at the named variable.
    Talias(Box<TypeExpr>, String),
}

/// Row of a polymorphic variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowDesc {
    pub row_fields: Vec<(String, RowField)>,
    /// No further tags may be added.
    pub row_closed: bool,
    /// Abbreviation this row was expanded from, if any.
    #[serde(default)]
    pub row_name: Option<(Path, Vec<TypeExpr>)>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RowField {
    /// Tag definitely present, with its argument.
    Rpresent(Option<TypeExpr>),
    /// Tag possibly present: constant?, conjunctive argument types.
    Reither(bool, Vec<TypeExpr>),
    Rabsent,
}

impl TypeExpr {
    pub fn var(name: impl Into<String>) -> Self {
        TypeExpr::Tvar {
            name: Some(name.into()),
            id: 0,
        }
    }

    pub fn constr(path: Path, args: Vec<TypeExpr>) -> Self {
        TypeExpr::Tconstr(path, args)
    }

    pub fn arrow(arg: TypeExpr, res: TypeExpr) -> Self {
        TypeExpr::Tarrow(ArgLabel::Nolabel, Box::new(arg), Box::new(res))
    }

    /// Visit this expression and every sub-expression, outermost first.
    pub fn iter(&self, f: &mut impl FnMut(&TypeExpr)) {
        f(self);
        match self {
            TypeExpr::Tvar { .. } | TypeExpr::Tunivar { .. } => {}
            TypeExpr::Tarrow(_, a, r) => {
                a.iter(f);
                r.iter(f);
            }
            TypeExpr::Ttuple(ts) | TypeExpr::Tconstr(_, ts) | TypeExpr::Tpackage(_, _, ts) => {
                ts.iter().for_each(|t| t.iter(f))
            }
            TypeExpr::Tobject(methods, _) => methods.iter().for_each(|(_, t)| t.iter(f)),
            TypeExpr::Tvariant(row) => {
                for (_, field) in &row.row_fields {
                    match field {
                        RowField::Rpresent(Some(t)) => t.iter(f),
                        RowField::Reither(_, ts) => ts.iter().for_each(|t| t.iter(f)),
                        RowField::Rpresent(None) | RowField::Rabsent => {}
                    }
                }
                if let Some((_, args)) = &row.row_name {
                    args.iter().for_each(|t| t.iter(f));
                }
            }
            TypeExpr::Tpoly(body, vars) => {
                vars.iter().for_each(|t| t.iter(f));
                body.iter(f);
            }
            TypeExpr::Talias(t, _) => t.iter(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ident::Ident;

    #[test]
    fn test_iter_visits_nested_variables() {
        let list = Path::pident(Ident::create_predef("list", 9));
        let ty = TypeExpr::arrow(
            TypeExpr::var("a"),
            TypeExpr::constr(list, vec![TypeExpr::Tvar { name: None, id: 3 }]),
        );

        let mut vars = Vec::new();
        ty.iter(&mut |t| {
            if let TypeExpr::Tvar { name, id } = t {
                vars.push((name.clone(), *id));
            }
        });
        assert_eq!(vars, vec![(Some("a".to_string()), 0), (None, 3)]);
    }
}
