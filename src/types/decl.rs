//! Compiled signatures.
//!
//! This is the signature the type checker *computed*, as opposed to the one
//! the author wrote. The loader meets it in two places: the realized content
//! of an `include`, and the operand of a `module type of` that is not a
//! plain alias.

use super::asttypes::{ArgLabel, MutableFlag, PrivateFlag, VirtualFlag};
use super::path::Path;
use super::type_expr::TypeExpr;
use super::variance::Variance;
use crate::ident::Ident;
use crate::location::{Located, Location};
use serde::{Deserialize, Serialize};

// ============================================================================
// Attributes
// ============================================================================

/// An attribute, e.g. `[@@ocaml.doc "..."]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub attr_name: Located<String>,
    pub attr_payload: AttributePayload,
    #[serde(default)]
    pub attr_loc: Location,
}

pub type Attributes = Vec<Attribute>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttributePayload {
    Empty,
    /// A single string constant: the only shape doc comments take.
    Str(String),
    Ident(String),
    /// Any other payload, kept as text.
    Other(String),
}

impl Attribute {
    pub fn new(name: impl Into<String>, payload: AttributePayload, loc: Location) -> Self {
        Attribute {
            attr_name: Located::new(name.into(), loc.clone()),
            attr_payload: payload,
            attr_loc: loc,
        }
    }

    pub fn name(&self) -> &str {
        &self.attr_name.txt
    }
}

// ============================================================================
// Values
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValueDescription {
    pub val_type: TypeExpr,
    pub val_kind: ValueKind,
    #[serde(default)]
    pub val_loc: Location,
    #[serde(default)]
    pub val_attributes: Attributes,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ValueKind {
    ValReg,
    ValPrim(PrimitiveDescription),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrimitiveDescription {
    pub prim_name: String,
    pub prim_arity: i32,
    /// Empty when the native name is the same as `prim_name`.
    #[serde(default)]
    pub prim_native_name: String,
}

impl PrimitiveDescription {
    /// Names as written in the `external` declaration.
    pub fn names(&self) -> Vec<String> {
        if self.prim_native_name.is_empty() {
            vec![self.prim_name.clone()]
        } else {
            vec![self.prim_name.clone(), self.prim_native_name.clone()]
        }
    }
}

// ============================================================================
// Type Declarations
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeDeclaration {
    pub type_params: Vec<TypeExpr>,
    pub type_kind: TypeKind,
    #[serde(default)]
    pub type_private: PrivateFlag,
    #[serde(default)]
    pub type_manifest: Option<TypeExpr>,
    /// One entry per parameter.
    #[serde(default)]
    pub type_variance: Vec<Variance>,
    #[serde(default)]
    pub type_loc: Location,
    #[serde(default)]
    pub type_attributes: Attributes,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TypeKind {
    TypeAbstract,
    TypeRecord(Vec<LabelDeclaration>),
    TypeVariant(Vec<ConstructorDeclaration>),
    TypeOpen,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelDeclaration {
    pub ld_id: Ident,
    #[serde(default)]
    pub ld_mutable: MutableFlag,
    pub ld_type: TypeExpr,
    #[serde(default)]
    pub ld_loc: Location,
    #[serde(default)]
    pub ld_attributes: Attributes,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConstructorDeclaration {
    pub cd_id: Ident,
    pub cd_args: ConstructorArguments,
    #[serde(default)]
    pub cd_res: Option<TypeExpr>,
    #[serde(default)]
    pub cd_loc: Location,
    #[serde(default)]
    pub cd_attributes: Attributes,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ConstructorArguments {
    CstrTuple(Vec<TypeExpr>),
    CstrRecord(Vec<LabelDeclaration>),
}

// ============================================================================
// Extension Constructors
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtensionConstructor {
    pub ext_type_path: Path,
    #[serde(default)]
    pub ext_type_params: Vec<TypeExpr>,
    pub ext_args: ConstructorArguments,
    #[serde(default)]
    pub ext_ret_type: Option<TypeExpr>,
    #[serde(default)]
    pub ext_private: PrivateFlag,
    #[serde(default)]
    pub ext_loc: Location,
    #[serde(default)]
    pub ext_attributes: Attributes,
}

// ============================================================================
// Module Types
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ModuleType {
    MtyIdent(Path),
    MtySignature(Signature),
    MtyFunctor {
        param: Ident,
        /// `None` for a parameterless functor.
        param_type: Option<Box<ModuleType>>,
        result: Box<ModuleType>,
    },
    MtyAlias(Path),
}

pub type Signature = Vec<SignatureItem>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SignatureItem {
    SigValue(Ident, ValueDescription),
    SigType(Ident, TypeDeclaration, RecStatus),
    SigTypext(Ident, ExtensionConstructor, ExtStatus),
    SigModule(Ident, ModuleDeclaration, RecStatus),
    SigModtype(Ident, ModtypeDeclaration),
    /// A class. Its companion class type and object type are not listed as
    /// items of their own; their identifiers travel with the declaration.
    SigClass(Ident, ClassDeclaration, RecStatus),
    SigClassType(Ident, ClassTypeDeclaration, RecStatus),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleDeclaration {
    pub md_type: ModuleType,
    #[serde(default)]
    pub md_attributes: Attributes,
    #[serde(default)]
    pub md_loc: Location,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModtypeDeclaration {
    /// `None` for an abstract module type.
    #[serde(default)]
    pub mtd_type: Option<ModuleType>,
    #[serde(default)]
    pub mtd_attributes: Attributes,
    #[serde(default)]
    pub mtd_loc: Location,
}

/// Position of an item in a recursive group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecStatus {
    /// Alone in a nonrecursive group
    TrecNot,
    /// First in a recursive group
    TrecFirst,
    /// Subsequent member of a group
    TrecNext,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExtStatus {
    /// First constructor of a type extension
    TextFirst,
    /// Further constructor of the same extension
    TextNext,
    /// An exception
    TextException,
}

// ============================================================================
// Classes
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassDeclaration {
    /// Identifier of the class type declared alongside the class.
    #[serde(default)]
    pub cty_id_class_type: Option<Ident>,
    /// Identifier of the object type `c`.
    #[serde(default)]
    pub cty_id_object: Option<Ident>,
    pub cty_params: Vec<TypeExpr>,
    pub cty_type: ClassType,
    #[serde(default)]
    pub cty_variance: Vec<Variance>,
    #[serde(default)]
    pub cty_loc: Location,
    #[serde(default)]
    pub cty_attributes: Attributes,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassTypeDeclaration {
    /// Identifier of the object type `c`.
    #[serde(default)]
    pub clty_id_object: Option<Ident>,
    pub clty_params: Vec<TypeExpr>,
    pub clty_type: ClassType,
    #[serde(default)]
    pub clty_variance: Vec<Variance>,
    #[serde(default)]
    pub clty_loc: Location,
    #[serde(default)]
    pub clty_attributes: Attributes,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ClassType {
    CtyConstr(Path, Vec<TypeExpr>),
    CtySignature(ClassSignature),
    CtyArrow(ArgLabel, TypeExpr, Box<ClassType>),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassSignature {
    /// `None` when the self type is the anonymous object type.
    #[serde(default)]
    pub csig_self: Option<TypeExpr>,
    #[serde(default)]
    pub csig_vars: Vec<(String, MutableFlag, VirtualFlag, TypeExpr)>,
    #[serde(default)]
    pub csig_methods: Vec<(String, PrivateFlag, VirtualFlag, TypeExpr)>,
}

impl ClassType {
    /// A class is virtual when any method or instance variable of its
    /// final signature is.
    pub fn is_virtual(&self) -> bool {
        match self {
            ClassType::CtyConstr(_, _) => false,
            ClassType::CtyArrow(_, _, body) => body.is_virtual(),
            ClassType::CtySignature(csig) => {
                csig.csig_vars
                    .iter()
                    .any(|(_, _, v, _)| *v == VirtualFlag::Virtual)
                    || csig
                        .csig_methods
                        .iter()
                        .any(|(_, _, v, _)| *v == VirtualFlag::Virtual)
            }
        }
    }
}

impl SignatureItem {
    /// The identifier this item binds.
    pub fn ident(&self) -> &Ident {
        match self {
            SignatureItem::SigValue(id, _)
            | SignatureItem::SigType(id, _, _)
            | SignatureItem::SigTypext(id, _, _)
            | SignatureItem::SigModule(id, _, _)
            | SignatureItem::SigModtype(id, _)
            | SignatureItem::SigClass(id, _, _)
            | SignatureItem::SigClassType(id, _, _) => id,
        }
    }

    /// Identifiers a class or class type binds besides its own.
    pub fn companion_idents(&self) -> Vec<&Ident> {
        match self {
            SignatureItem::SigClass(_, cd, _) => {
                cd.cty_id_class_type.iter().chain(&cd.cty_id_object).collect()
            }
            SignatureItem::SigClassType(_, cltd, _) => cltd.clty_id_object.iter().collect(),
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_names() {
        let p = PrimitiveDescription {
            prim_name: "caml_int_of_string".into(),
            prim_arity: 1,
            prim_native_name: String::new(),
        };
        assert_eq!(p.names(), vec!["caml_int_of_string".to_string()]);

        let p = PrimitiveDescription {
            prim_native_name: "caml_int_of_string_unboxed".into(),
            ..p
        };
        assert_eq!(p.names().len(), 2);
    }

    #[test]
    fn test_class_virtual() {
        let csig = ClassSignature {
            csig_self: None,
            csig_vars: vec![],
            csig_methods: vec![(
                "m".into(),
                PrivateFlag::Public,
                VirtualFlag::Virtual,
                TypeExpr::var("a"),
            )],
        };
        let arrow = ClassType::CtyArrow(
            ArgLabel::Nolabel,
            TypeExpr::var("b"),
            Box::new(ClassType::CtySignature(csig)),
        );
        assert!(arrow.is_virtual());
        assert!(!ClassType::CtySignature(ClassSignature {
            csig_self: None,
            csig_vars: vec![],
            csig_methods: vec![],
        })
        .is_virtual());
    }
}
