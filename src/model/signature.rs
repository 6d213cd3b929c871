//! Declaration records of the documentation model.

use super::comment::{CommentItem, Doc};
use super::paths::{Fragment, Identifier, Path};
use super::type_expr::{Label, TypeExpr};
use smol_str::SmolStr;

/// Position of a declaration in its recursive group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecFlag {
    /// First (or only) member of a recursive group
    Ordinary,
    /// Subsequent member of the group
    And,
    /// `type nonrec`
    Nonrec,
}

/// An ordered list of declarations with its own summary documentation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Signature {
    pub items: Vec<SignatureItem>,
    pub doc: Doc,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SignatureItem {
    Module(RecFlag, Module),
    ModuleType(ModuleType),
    /// `module M := P`
    ModuleSubstitution(ModuleSubstitution),
    Type(RecFlag, TypeDecl),
    /// `type t := ...`
    TypeSubstitution(TypeDecl),
    TypExt(Extension),
    Exception(Exception),
    Value(Value),
    External(External),
    Class(RecFlag, Class),
    ClassType(RecFlag, ClassType),
    Include(Include),
    Comment(CommentItem),
}

impl Signature {
    /// Build a signature, lifting a leading doc comment into its summary
    /// when `lift_top_comment` is set. A stop comment is never lifted.
    pub fn from_items(mut items: Vec<SignatureItem>, lift_top_comment: bool) -> Self {
        let doc = match items.first() {
            Some(SignatureItem::Comment(CommentItem::Docs(_))) if lift_top_comment => {
                match items.remove(0) {
                    SignatureItem::Comment(CommentItem::Docs(doc)) => doc,
                    _ => Doc::Absent,
                }
            }
            _ => Doc::Absent,
        };
        Signature { items, doc }
    }
}

impl SignatureItem {
    /// Identifier of the declaration, if the item declares exactly one.
    pub fn id(&self) -> Option<&Identifier> {
        match self {
            SignatureItem::Module(_, m) => Some(&m.id),
            SignatureItem::ModuleType(m) => Some(&m.id),
            SignatureItem::ModuleSubstitution(m) => Some(&m.id),
            SignatureItem::Type(_, t) | SignatureItem::TypeSubstitution(t) => Some(&t.id),
            SignatureItem::Exception(e) => Some(&e.id),
            SignatureItem::Value(v) => Some(&v.id),
            SignatureItem::External(e) => Some(&e.id),
            SignatureItem::Class(_, c) => Some(&c.id),
            SignatureItem::ClassType(_, c) => Some(&c.id),
            SignatureItem::TypExt(_) | SignatureItem::Include(_) | SignatureItem::Comment(_) => {
                None
            }
        }
    }

    pub fn doc(&self) -> Option<&Doc> {
        match self {
            SignatureItem::Module(_, m) => Some(&m.doc),
            SignatureItem::ModuleType(m) => Some(&m.doc),
            SignatureItem::ModuleSubstitution(m) => Some(&m.doc),
            SignatureItem::Type(_, t) | SignatureItem::TypeSubstitution(t) => Some(&t.doc),
            SignatureItem::TypExt(e) => Some(&e.doc),
            SignatureItem::Exception(e) => Some(&e.doc),
            SignatureItem::Value(v) => Some(&v.doc),
            SignatureItem::External(e) => Some(&e.doc),
            SignatureItem::Class(_, c) => Some(&c.doc),
            SignatureItem::ClassType(_, c) => Some(&c.doc),
            SignatureItem::Include(i) => Some(&i.doc),
            SignatureItem::Comment(CommentItem::Docs(d)) => Some(d),
            SignatureItem::Comment(CommentItem::Stop) => None,
        }
    }
}

// ============================================================================
// Modules
// ============================================================================

/// Marks a declaration whose type is already a plain signature, so no
/// later pass needs to expand it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expansion {
    AlreadyASig,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    pub id: Identifier,
    pub doc: Doc,
    pub type_: ModuleDeclType,
    /// Set from a `@canonical` tag.
    pub canonical: Option<Path>,
    pub hidden: bool,
    pub expansion: Option<Expansion>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ModuleDeclType {
    Alias(Path),
    ModuleType(ModuleTypeExpr),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModuleType {
    pub id: Identifier,
    pub doc: Doc,
    /// `None` for an abstract module type.
    pub expr: Option<ModuleTypeExpr>,
    pub canonical: Option<Path>,
    pub expansion: Option<Expansion>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModuleSubstitution {
    pub id: Identifier,
    pub doc: Doc,
    pub manifest: Path,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ModuleTypeExpr {
    Path(Path),
    Signature(Signature),
    Functor(FunctorParameter, Box<ModuleTypeExpr>),
    /// Constraints are kept in source order, not applied.
    With(Box<ModuleTypeExpr>, Vec<Substitution>),
    TypeOf(Box<ModuleDeclType>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum FunctorParameter {
    /// `functor () -> ...`
    Unit,
    Named(FunctorArgument),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctorArgument {
    pub id: Identifier,
    pub expr: Box<ModuleTypeExpr>,
    pub expansion: Option<Expansion>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Substitution {
    ModuleEq(Fragment, ModuleDeclType),
    TypeEq(Fragment, TypeEquation),
    ModuleSubst(Fragment, Path),
    TypeSubst(Fragment, TypeSubstitution),
}

/// Right-hand side of `with type t := ...`. The substituted type's
/// parameters are `equation.params`, one per position.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeSubstitution {
    /// Head constructor of the manifest, when it is an application.
    pub head: Option<Path>,
    pub equation: TypeEquation,
}

impl Module {
    /// Items of the module's own signature when it is already expanded.
    pub fn expanded_items(&self) -> Option<&[SignatureItem]> {
        match (&self.expansion, &self.type_) {
            (
                Some(Expansion::AlreadyASig),
                ModuleDeclType::ModuleType(ModuleTypeExpr::Signature(sg)),
            ) => Some(&sg.items),
            _ => None,
        }
    }
}

impl ModuleType {
    pub fn expanded_items(&self) -> Option<&[SignatureItem]> {
        match (&self.expansion, &self.expr) {
            (Some(Expansion::AlreadyASig), Some(ModuleTypeExpr::Signature(sg))) => {
                Some(&sg.items)
            }
            _ => None,
        }
    }
}

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct TypeDecl {
    pub id: Identifier,
    pub doc: Doc,
    pub canonical: Option<Path>,
    pub equation: TypeEquation,
    /// `None` for an abstract type.
    pub representation: Option<Representation>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TypeEquation {
    pub params: Vec<TypeParam>,
    pub private: bool,
    pub manifest: Option<TypeExpr>,
    /// `constraint t1 = t2`, in order
    pub constraints: Vec<(TypeExpr, TypeExpr)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeParamDesc {
    Any,
    Var(SmolStr),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variance {
    Pos,
    Neg,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeParam {
    pub desc: TypeParamDesc,
    pub variance: Option<Variance>,
    pub injective: bool,
}

impl TypeParam {
    pub fn name(&self) -> Option<&str> {
        match &self.desc {
            TypeParamDesc::Var(n) => Some(n),
            TypeParamDesc::Any => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Representation {
    Variant(Vec<Constructor>),
    Record(Vec<Field>),
    /// `type t = ..`
    Extensible,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Constructor {
    pub id: Identifier,
    pub doc: Doc,
    pub args: ConstructorArgs,
    pub res: Option<TypeExpr>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConstructorArgs {
    Tuple(Vec<TypeExpr>),
    Record(Vec<Field>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub id: Identifier,
    pub doc: Doc,
    pub mutable: bool,
    pub type_: TypeExpr,
}

// ============================================================================
// Extensions and exceptions
// ============================================================================

/// `type t += A | B`
#[derive(Debug, Clone, PartialEq)]
pub struct Extension {
    pub type_path: Path,
    pub doc: Doc,
    pub type_params: Vec<TypeParam>,
    pub private: bool,
    pub constructors: Vec<ExtensionConstructor>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExtensionConstructor {
    pub id: Identifier,
    pub doc: Doc,
    pub args: ConstructorArgs,
    pub res: Option<TypeExpr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Exception {
    pub id: Identifier,
    pub doc: Doc,
    pub args: ConstructorArgs,
    pub res: Option<TypeExpr>,
}

// ============================================================================
// Values
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Value {
    pub id: Identifier,
    pub doc: Doc,
    pub type_: TypeExpr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct External {
    pub id: Identifier,
    pub doc: Doc,
    pub type_: TypeExpr,
    pub primitives: Vec<SmolStr>,
}

// ============================================================================
// Classes
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Class {
    pub id: Identifier,
    pub doc: Doc,
    pub virtual_: bool,
    pub params: Vec<TypeParam>,
    pub type_: ClassDecl,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClassDecl {
    ClassType(ClassTypeExpr),
    Arrow(Option<Label>, TypeExpr, Box<ClassDecl>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassType {
    pub id: Identifier,
    pub doc: Doc,
    pub virtual_: bool,
    pub params: Vec<TypeParam>,
    pub expr: ClassTypeExpr,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClassTypeExpr {
    Constr(Path, Vec<TypeExpr>),
    Signature(ClassSignature),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassSignature {
    /// `None` when the self type is left anonymous.
    pub self_: Option<TypeExpr>,
    pub items: Vec<ClassSignatureItem>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClassSignatureItem {
    Method(Method),
    InstanceVariable(InstanceVariable),
    Constraint(TypeExpr, TypeExpr),
    Inherit(ClassTypeExpr),
    Comment(CommentItem),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Method {
    pub id: Identifier,
    pub doc: Doc,
    pub private_: bool,
    pub virtual_: bool,
    pub type_: TypeExpr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InstanceVariable {
    pub id: Identifier,
    pub doc: Doc,
    pub mutable: bool,
    pub virtual_: bool,
    pub type_: TypeExpr,
}

// ============================================================================
// Includes
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IncludeStatus {
    #[default]
    Default,
    Inline,
    Open,
    Closed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Include {
    /// The signature the content is included into.
    pub parent: Identifier,
    pub doc: Doc,
    pub decl: ModuleTypeExpr,
    pub status: IncludeStatus,
    pub expansion: IncludeExpansion,
}

/// Realized content of an include, merged with its parent by a later pass.
#[derive(Debug, Clone, PartialEq)]
pub struct IncludeExpansion {
    pub resolved: bool,
    pub content: Signature,
}

// ============================================================================
// Compilation units
// ============================================================================

/// The result of loading one interface.
#[derive(Debug, Clone, PartialEq)]
pub struct Interface {
    pub id: Identifier,
    pub doc: Doc,
    pub items: Vec<SignatureItem>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::comment::{Comment, DocElement};

    fn docs(text: &str) -> SignatureItem {
        SignatureItem::Comment(CommentItem::Docs(Doc::Parsed(Comment {
            elements: vec![DocElement::Paragraph(text.to_string())],
        })))
    }

    #[test]
    fn test_from_items_lifts_leading_comment() {
        let sg = Signature::from_items(vec![docs("top"), docs("second")], true);
        assert_eq!(sg.items.len(), 1);
        assert!(!sg.doc.is_absent());

        let sg = Signature::from_items(vec![docs("top")], false);
        assert_eq!(sg.items.len(), 1);
        assert!(sg.doc.is_absent());
    }

    #[test]
    fn test_from_items_keeps_stop() {
        let sg = Signature::from_items(
            vec![SignatureItem::Comment(CommentItem::Stop), docs("after")],
            true,
        );
        assert_eq!(sg.items.len(), 2);
        assert!(sg.doc.is_absent());
    }

    #[test]
    fn test_expanded_items() {
        let root = Identifier::root("pkg", "Unit");
        let m = Module {
            id: root.child(crate::model::IdentifierKind::Module, "M"),
            doc: Doc::Absent,
            type_: ModuleDeclType::ModuleType(ModuleTypeExpr::Signature(Signature::default())),
            canonical: None,
            hidden: false,
            expansion: Some(Expansion::AlreadyASig),
        };
        assert_eq!(m.expanded_items().map(|items| items.len()), Some(0));

        let alias = Module {
            type_: ModuleDeclType::Alias(Path::Root("Other".into())),
            expansion: None,
            ..m
        };
        assert!(alias.expanded_items().is_none());
    }
}
