//! Builders for loader fixtures.

use crate::config::LoaderConfig;
use crate::ident::{IdGenerator, Ident};
use crate::location::{Located, Location};
use crate::longident::Longident;
use crate::loader::LoadContext;
use crate::loader::cmi::CmiReader;
use crate::loader::doc_attr::PlainDocParser;
use crate::model::{Identifier, Interface};
use crate::types::decl;
use crate::types::typedtree::{
    ClassInfos, ClassType, ConstructorArguments, ConstructorDeclaration, CoreType, CoreTypeDesc,
    IncludeDescription, LabelDeclaration, ModuleDeclaration, ModuleType, ModuleTypeDeclaration,
    ModuleTypeDesc, Signature, SignatureItem, SignatureItemDesc, TypeDeclaration, TypeKind,
    ValueDescription, WithConstraint,
};
use crate::types::{
    self, ArgLabel, Attribute, AttributePayload, MutableFlag, PrivateFlag, RecFlag, VirtualFlag,
};

pub fn root() -> Identifier {
    Identifier::root("pkg", "Unit")
}

pub fn with_context<R>(f: impl FnOnce(&LoadContext<'_>) -> R) -> R {
    with_config(&LoaderConfig::default(), f)
}

pub fn with_config<R>(config: &LoaderConfig, f: impl FnOnce(&LoadContext<'_>) -> R) -> R {
    let cx = LoadContext::new(config, &PlainDocParser, &CmiReader);
    f(&cx)
}

/// Load `sig` as the interface of `pkg/Unit` with the default configuration.
pub fn load(sig: &Signature) -> crate::error::LoadResult<Interface> {
    with_context(|cx| crate::loader::read_interface(cx, "pkg", "Unit", sig))
}

// ============================================================================
// Attributes
// ============================================================================

pub fn doc_attr(text: &str) -> Attribute {
    Attribute::new("ocaml.doc", AttributePayload::Str(text.to_string()), Location::none())
}

pub fn text_attr(text: &str) -> Attribute {
    Attribute::new("ocaml.text", AttributePayload::Str(text.to_string()), Location::none())
}

// ============================================================================
// Core types
// ============================================================================

pub fn core(desc: CoreTypeDesc) -> CoreType {
    CoreType::new(desc)
}

pub fn tvar(name: &str) -> CoreType {
    core(CoreTypeDesc::Ttyp_var(name.to_string()))
}

pub fn tarrow(arg: CoreType, res: CoreType) -> CoreType {
    core(CoreTypeDesc::Ttyp_arrow(ArgLabel::Nolabel, Box::new(arg), Box::new(res)))
}

pub fn tconstr(path: types::Path, args: Vec<CoreType>) -> CoreType {
    core(CoreTypeDesc::Ttyp_constr(path, args))
}

pub fn pident(id: &Ident) -> types::Path {
    types::Path::pident(id.clone())
}

// ============================================================================
// Declarations
// ============================================================================

pub fn type_decl(id: &Ident) -> TypeDeclaration {
    TypeDeclaration {
        typ_id: id.clone(),
        typ_params: vec![],
        typ_cstrs: vec![],
        typ_kind: TypeKind::Ttype_abstract,
        typ_private: PrivateFlag::Public,
        typ_manifest: None,
        typ_loc: Location::none(),
        typ_attributes: vec![],
    }
}

pub fn type_decl_with_manifest(id: &Ident, manifest: CoreType) -> TypeDeclaration {
    TypeDeclaration {
        typ_manifest: Some(manifest),
        ..type_decl(id)
    }
}

pub fn label_decl(id: &Ident, ty: CoreType) -> LabelDeclaration {
    LabelDeclaration {
        ld_id: id.clone(),
        ld_mutable: MutableFlag::Immutable,
        ld_type: ty,
        ld_loc: Location::none(),
        ld_attributes: vec![],
    }
}

pub fn constructor_decl(id: &Ident, args: ConstructorArguments) -> ConstructorDeclaration {
    ConstructorDeclaration {
        cd_id: id.clone(),
        cd_args: args,
        cd_res: None,
        cd_loc: Location::none(),
        cd_attributes: vec![],
    }
}

pub fn value_desc(id: &Ident, ty: CoreType) -> ValueDescription {
    ValueDescription {
        val_id: id.clone(),
        val_desc: ty,
        val_prim: vec![],
        val_loc: Location::none(),
        val_attributes: vec![],
    }
}

pub fn class_infos(ids: &IdGenerator, name: &str, expr: ClassType) -> ClassInfos<ClassType> {
    ClassInfos {
        ci_virt: VirtualFlag::Concrete,
        ci_params: vec![],
        ci_id_class: ids.create(name),
        ci_id_class_type: ids.create(name),
        ci_id_object: ids.create(format!("#{}", name)),
        ci_expr: expr,
        ci_loc: Location::none(),
        ci_attributes: vec![],
    }
}

// ============================================================================
// Signatures and module types
// ============================================================================

pub fn signature(items: Vec<SignatureItem>) -> Signature {
    Signature::from(items)
}

pub fn item(desc: SignatureItemDesc) -> SignatureItem {
    SignatureItem::new(desc)
}

pub fn type_item(id: &Ident) -> SignatureItem {
    item(SignatureItemDesc::Tsig_type(RecFlag::Recursive, vec![type_decl(id)]))
}

pub fn value_item(id: &Ident, ty: CoreType) -> SignatureItem {
    item(SignatureItemDesc::Tsig_value(value_desc(id, ty)))
}

pub fn module_item(id: &Ident, mty: ModuleType) -> SignatureItem {
    item(SignatureItemDesc::Tsig_module(module_decl(id, mty)))
}

pub fn module_decl(id: &Ident, mty: ModuleType) -> ModuleDeclaration {
    ModuleDeclaration {
        md_id: id.clone(),
        md_type: mty,
        md_attributes: vec![],
        md_loc: Location::none(),
    }
}

pub fn modtype_item(id: &Ident, mty: Option<ModuleType>) -> SignatureItem {
    item(SignatureItemDesc::Tsig_modtype(ModuleTypeDeclaration {
        mtd_id: id.clone(),
        mtd_type: mty,
        mtd_attributes: vec![],
        mtd_loc: Location::none(),
    }))
}

pub fn include_item(mty: ModuleType, realized: decl::Signature) -> SignatureItem {
    item(SignatureItemDesc::Tsig_include(IncludeDescription {
        incl_mod: mty,
        incl_type: realized,
        incl_loc: Location::none(),
        incl_attributes: vec![],
    }))
}

pub fn signature_mty(items: Vec<SignatureItem>) -> ModuleType {
    ModuleType::new(ModuleTypeDesc::Tmty_signature(signature(items)))
}

pub fn ident_mty(path: types::Path) -> ModuleType {
    ModuleType::new(ModuleTypeDesc::Tmty_ident(path))
}

pub fn alias_mty(path: types::Path) -> ModuleType {
    ModuleType::new(ModuleTypeDesc::Tmty_alias(path))
}

pub fn with_mty(base: ModuleType, constraints: Vec<(Longident, WithConstraint)>) -> ModuleType {
    ModuleType::new(ModuleTypeDesc::Tmty_with(
        Box::new(base),
        constraints
            .into_iter()
            .map(|(lid, cstr)| (Located::mknoloc(lid), cstr))
            .collect(),
    ))
}

// ============================================================================
// Compiled signatures
// ============================================================================

pub fn compiled_type_decl() -> decl::TypeDeclaration {
    decl::TypeDeclaration {
        type_params: vec![],
        type_kind: decl::TypeKind::TypeAbstract,
        type_private: PrivateFlag::Public,
        type_manifest: None,
        type_variance: vec![],
        type_loc: Location::none(),
        type_attributes: vec![],
    }
}

pub fn compiled_type(id: &Ident, status: decl::RecStatus) -> decl::SignatureItem {
    decl::SignatureItem::SigType(id.clone(), compiled_type_decl(), status)
}

pub fn compiled_value(id: &Ident, ty: types::TypeExpr) -> decl::SignatureItem {
    decl::SignatureItem::SigValue(
        id.clone(),
        decl::ValueDescription {
            val_type: ty,
            val_kind: decl::ValueKind::ValReg,
            val_loc: Location::none(),
            val_attributes: vec![],
        },
    )
}

pub fn compiled_extension(type_path: types::Path) -> decl::ExtensionConstructor {
    decl::ExtensionConstructor {
        ext_type_path: type_path,
        ext_type_params: vec![],
        ext_args: decl::ConstructorArguments::CstrTuple(vec![]),
        ext_ret_type: None,
        ext_private: PrivateFlag::Public,
        ext_loc: Location::none(),
        ext_attributes: vec![],
    }
}
