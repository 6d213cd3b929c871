//! Typed signature tree.
//!
//! This is the front-end's view of an interface after type checking: every
//! reference is a resolved [`Path`], every binder carries its [`Ident`], and
//! documentation comments are still raw attributes. The loader consumes it
//! read-only.
//!
//! Only the signature half of the typed tree is modelled; structures appear
//! solely as the operand of `module type of`.

#![allow(non_camel_case_types)]

use super::asttypes::{
    ArgLabel, ClosedFlag, Injectivity, MutableFlag, PrivateFlag, RecFlag, VarianceAnnotation,
    VirtualFlag,
};
use super::decl::{Attribute, Attributes};
use super::path::Path;
use crate::ident::Ident;
use crate::location::{Located, Location};
use crate::longident::Longident;
use serde::{Deserialize, Serialize};

pub type Loc<T> = Located<T>;

// ============================================================================
// Core types
// ============================================================================

/// A type expression as written in the interface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreType {
    pub ctyp_desc: CoreTypeDesc,
    #[serde(default)]
    pub ctyp_loc: Location,
    #[serde(default)]
    pub ctyp_attributes: Attributes,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CoreTypeDesc {
    /// `_`
    Ttyp_any,
    /// `'a`
    Ttyp_var(String),
    /// `l:T1 -> T2`
    Ttyp_arrow(ArgLabel, Box<CoreType>, Box<CoreType>),
    /// `T1 * ... * Tn`
    Ttyp_tuple(Vec<CoreType>),
    /// `(T1, ..., Tn) p`
    Ttyp_constr(Path, Vec<CoreType>),
    /// `< m1 : T1; ...; .. >`
    Ttyp_object(Vec<ObjectField>, ClosedFlag),
    /// `(T1, ..., Tn) #c`
    Ttyp_class(Path, Vec<CoreType>),
    /// `T as 'a`
    Ttyp_alias(Box<CoreType>, String),
    /// `[< `A | `B of T > `A ]`: fields, closedness, present tags
    Ttyp_variant(Vec<RowField>, ClosedFlag, Option<Vec<String>>),
    /// `'a 'b. T`
    Ttyp_poly(Vec<String>, Box<CoreType>),
    /// `(module S with type t = T)`
    Ttyp_package(PackageType),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ObjectField {
    /// `m : T`
    OTtag(Loc<String>, Attributes, CoreType),
    /// An inherited object type.
    OTinherit(CoreType),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RowField {
    /// `` `A of T1 & T2 ``: name, attributes, constant?, arguments
    Rtag(Loc<String>, Attributes, bool, Vec<CoreType>),
    /// An inherited variant type.
    Rinherit(CoreType),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageType {
    pub pack_path: Path,
    pub pack_fields: Vec<(Loc<Longident>, CoreType)>,
    #[serde(default)]
    pub pack_loc: Location,
}

// ============================================================================
// Signatures
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Signature {
    pub sig_items: Vec<SignatureItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignatureItem {
    pub sig_desc: SignatureItemDesc,
    #[serde(default)]
    pub sig_loc: Location,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SignatureItemDesc {
    /// `val x : T` / `external x : T = "prim"`
    Tsig_value(ValueDescription),
    /// `type t1 = ... and t2 = ...`
    Tsig_type(RecFlag, Vec<TypeDeclaration>),
    /// `type t := ...`
    Tsig_typesubst(Vec<TypeDeclaration>),
    /// `type t += ...`
    Tsig_typext(TypeExtension),
    /// `exception C of T`
    Tsig_exception(ExtensionConstructor),
    /// `module M : MT`
    Tsig_module(ModuleDeclaration),
    /// `module M := P`
    Tsig_modsubst(ModuleSubstitution),
    /// `module rec M1 : MT1 and M2 : MT2`
    Tsig_recmodule(Vec<ModuleDeclaration>),
    /// `module type S = MT`
    Tsig_modtype(ModuleTypeDeclaration),
    /// `open M`
    Tsig_open(OpenDescription),
    /// `include MT`
    Tsig_include(IncludeDescription),
    /// `class c : ...`
    Tsig_class(Vec<ClassDescription>),
    /// `class type ct = ...`
    Tsig_class_type(Vec<ClassTypeDeclaration>),
    /// Floating attribute, including standalone doc comments.
    Tsig_attribute(Attribute),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValueDescription {
    pub val_id: Ident,
    pub val_desc: CoreType,
    /// Primitive names of an `external`; empty for a plain `val`.
    #[serde(default)]
    pub val_prim: Vec<String>,
    #[serde(default)]
    pub val_loc: Location,
    #[serde(default)]
    pub val_attributes: Attributes,
}

// ============================================================================
// Type declarations
// ============================================================================

/// A type parameter: the written type plus its annotations.
pub type TypeParam = (CoreType, VarianceAnnotation, Injectivity);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeDeclaration {
    pub typ_id: Ident,
    #[serde(default)]
    pub typ_params: Vec<TypeParam>,
    /// `constraint T1 = T2` clauses.
    #[serde(default)]
    pub typ_cstrs: Vec<(CoreType, CoreType, Location)>,
    pub typ_kind: TypeKind,
    #[serde(default)]
    pub typ_private: PrivateFlag,
    #[serde(default)]
    pub typ_manifest: Option<CoreType>,
    #[serde(default)]
    pub typ_loc: Location,
    #[serde(default)]
    pub typ_attributes: Attributes,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TypeKind {
    Ttype_abstract,
    Ttype_variant(Vec<ConstructorDeclaration>),
    Ttype_record(Vec<LabelDeclaration>),
    Ttype_open,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelDeclaration {
    pub ld_id: Ident,
    #[serde(default)]
    pub ld_mutable: MutableFlag,
    pub ld_type: CoreType,
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
    pub cd_res: Option<CoreType>,
    #[serde(default)]
    pub cd_loc: Location,
    #[serde(default)]
    pub cd_attributes: Attributes,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ConstructorArguments {
    Cstr_tuple(Vec<CoreType>),
    Cstr_record(Vec<LabelDeclaration>),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeExtension {
    pub tyext_path: Path,
    #[serde(default)]
    pub tyext_params: Vec<TypeParam>,
    pub tyext_constructors: Vec<ExtensionConstructor>,
    #[serde(default)]
    pub tyext_private: PrivateFlag,
    #[serde(default)]
    pub tyext_loc: Location,
    #[serde(default)]
    pub tyext_attributes: Attributes,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtensionConstructor {
    pub ext_id: Ident,
    pub ext_kind: ExtensionConstructorKind,
    #[serde(default)]
    pub ext_loc: Location,
    #[serde(default)]
    pub ext_attributes: Attributes,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ExtensionConstructorKind {
    /// Declaration with arguments and optional result type.
    Text_decl(ConstructorArguments, Option<CoreType>),
    /// `C = D`. Cannot occur in a signature.
    Text_rebind(Path),
}

// ============================================================================
// Modules and module types
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleDeclaration {
    pub md_id: Ident,
    pub md_type: ModuleType,
    #[serde(default)]
    pub md_attributes: Attributes,
    #[serde(default)]
    pub md_loc: Location,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleSubstitution {
    pub ms_id: Ident,
    pub ms_manifest: Path,
    #[serde(default)]
    pub ms_attributes: Attributes,
    #[serde(default)]
    pub ms_loc: Location,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleTypeDeclaration {
    pub mtd_id: Ident,
    /// `None` for an abstract module type.
    #[serde(default)]
    pub mtd_type: Option<ModuleType>,
    #[serde(default)]
    pub mtd_attributes: Attributes,
    #[serde(default)]
    pub mtd_loc: Location,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleType {
    pub mty_desc: ModuleTypeDesc,
    #[serde(default)]
    pub mty_loc: Location,
    #[serde(default)]
    pub mty_attributes: Attributes,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ModuleTypeDesc {
    /// `S`
    Tmty_ident(Path),
    /// `sig ... end`
    Tmty_signature(Signature),
    /// `functor (X : MT) -> MT'`
    Tmty_functor(FunctorParameter, Box<ModuleType>),
    /// `MT with ...`
    Tmty_with(Box<ModuleType>, Vec<(Loc<Longident>, WithConstraint)>),
    /// `module type of ME`
    Tmty_typeof(ModuleExpr),
    /// `(module P)` as the type of a module alias.
    Tmty_alias(Path),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum FunctorParameter {
    /// `functor () -> ...`
    Unit,
    /// `functor (X : MT) -> ...`
    Named(Ident, Box<ModuleType>),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum WithConstraint {
    /// `with type t = T`
    Twith_type(TypeDeclaration),
    /// `with module M = P`
    Twith_module(Path),
    /// `with type t := T`
    Twith_typesubst(TypeDeclaration),
    /// `with module M := P`
    Twith_modsubst(Path),
}

/// The operand of `module type of`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleExpr {
    pub mod_desc: ModuleExprDesc,
    /// Signature computed by the type checker for this expression.
    pub mod_type: super::decl::ModuleType,
    #[serde(default)]
    pub mod_loc: Location,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ModuleExprDesc {
    Tmod_ident(Path),
    Tmod_structure,
    Tmod_functor,
    Tmod_apply(Box<ModuleExpr>, Box<ModuleExpr>),
    Tmod_constraint(Box<ModuleExpr>),
    Tmod_unpack,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenDescription {
    pub open_path: Path,
    #[serde(default)]
    pub open_loc: Location,
    #[serde(default)]
    pub open_attributes: Attributes,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncludeDescription {
    pub incl_mod: ModuleType,
    /// The realized signature, with the identifiers the rest of the
    /// enclosing signature uses to refer to included items.
    pub incl_type: super::decl::Signature,
    #[serde(default)]
    pub incl_loc: Location,
    #[serde(default)]
    pub incl_attributes: Attributes,
}

// ============================================================================
// Classes
// ============================================================================

/// Common shape of class and class type declarations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassInfos<T> {
    #[serde(default)]
    pub ci_virt: VirtualFlag,
    #[serde(default)]
    pub ci_params: Vec<TypeParam>,
    /// Identifier of the class (or class type) itself.
    pub ci_id_class: Ident,
    /// Identifier of the class type declared alongside a class.
    pub ci_id_class_type: Ident,
    /// Identifier of the object type `c` introduced by the declaration.
    pub ci_id_object: Ident,
    pub ci_expr: T,
    #[serde(default)]
    pub ci_loc: Location,
    #[serde(default)]
    pub ci_attributes: Attributes,
}

pub type ClassDescription = ClassInfos<ClassType>;
pub type ClassTypeDeclaration = ClassInfos<ClassType>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassType {
    pub cltyp_desc: ClassTypeDesc,
    #[serde(default)]
    pub cltyp_loc: Location,
    #[serde(default)]
    pub cltyp_attributes: Attributes,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ClassTypeDesc {
    /// `['a] c`
    Tcty_constr(Path, Vec<CoreType>),
    /// `object ... end`
    Tcty_signature(ClassSignature),
    /// `l:T -> CT`
    Tcty_arrow(ArgLabel, CoreType, Box<ClassType>),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassSignature {
    /// `object ('self) ... end`; `Ttyp_any` when no self type was written.
    pub csig_self: CoreType,
    pub csig_fields: Vec<ClassTypeField>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassTypeField {
    pub ctf_desc: ClassTypeFieldDesc,
    #[serde(default)]
    pub ctf_loc: Location,
    #[serde(default)]
    pub ctf_attributes: Attributes,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ClassTypeFieldDesc {
    Tctf_inherit(ClassType),
    Tctf_val(String, MutableFlag, VirtualFlag, CoreType),
    Tctf_method(String, PrivateFlag, VirtualFlag, CoreType),
    Tctf_constraint(CoreType, CoreType),
    Tctf_attribute(Attribute),
}

// ============================================================================
// Helper Functions
// ============================================================================

impl CoreType {
    pub fn new(desc: CoreTypeDesc) -> Self {
        CoreType {
            ctyp_desc: desc,
            ctyp_loc: Location::none(),
            ctyp_attributes: Vec::new(),
        }
    }
}

impl SignatureItem {
    pub fn new(desc: SignatureItemDesc) -> Self {
        SignatureItem {
            sig_desc: desc,
            sig_loc: Location::none(),
        }
    }
}

impl ModuleType {
    pub fn new(desc: ModuleTypeDesc) -> Self {
        ModuleType {
            mty_desc: desc,
            mty_loc: Location::none(),
            mty_attributes: Vec::new(),
        }
    }
}

impl ClassType {
    pub fn new(desc: ClassTypeDesc) -> Self {
        ClassType {
            cltyp_desc: desc,
            cltyp_loc: Location::none(),
            cltyp_attributes: Vec::new(),
        }
    }
}

impl From<Vec<SignatureItem>> for Signature {
    fn from(sig_items: Vec<SignatureItem>) -> Self {
        Signature { sig_items }
    }
}
