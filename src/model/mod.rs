//! Output model: the documentation IR the loader produces.
//!
//! - [`paths`] - identifiers, paths and fragments
//! - [`type_expr`] - type expressions
//! - [`signature`] - declarations and signatures
//! - [`comment`] - documentation values

pub mod comment;
pub mod paths;
pub mod signature;
pub mod type_expr;

// Re-exports for convenience
pub use comment::{Comment, CommentItem, Doc, DocElement, DocError, Tag};
pub use paths::{Fragment, Identifier, IdentifierKind, Path, PathKind};
pub use signature::{
    Class, ClassDecl, ClassSignature, ClassSignatureItem, ClassType, ClassTypeExpr, Constructor,
    ConstructorArgs, Exception, Expansion, Extension, ExtensionConstructor, External, Field,
    FunctorArgument, FunctorParameter, Include, IncludeExpansion, IncludeStatus, InstanceVariable,
    Interface, Method, Module, ModuleDeclType, ModuleSubstitution, ModuleType, ModuleTypeExpr,
    RecFlag, Representation, Signature, SignatureItem, Substitution, TypeDecl, TypeEquation,
    TypeParam, TypeParamDesc, TypeSubstitution, Value, Variance,
};
pub use type_expr::{
    Label, Object, ObjectField, Package, PolymorphicVariant, PolymorphicVariantElement,
    PolymorphicVariantKind, TypeExpr, VariantConstructor,
};
