//! Signatures, modules and module types of the typed tree.
//!
//! This is the recursive descent proper. Every item of a signature is bound
//! in the scope environment first; the items are then translated in order,
//! with standalone comments kept where they occur.

use super::LoadContext;
use super::class::{read_class_description, read_class_type_declaration};
use super::decl::{
    ValueDecl, read_exception, read_type_declaration, read_type_equation, read_type_extension,
    read_value_description,
};
use super::doc_attr::{read_doc, read_standalone, read_standalone_comments};
use super::env::{ScopeEnv, Subject};
use crate::error::{LoadError, LoadResult};
use crate::longident::Longident;
use crate::model::{
    Doc, Expansion, FunctorArgument, FunctorParameter, Identifier, IdentifierKind, Include,
    IncludeExpansion, IncludeStatus, Module, ModuleDeclType, ModuleSubstitution, ModuleType,
    ModuleTypeExpr, Path, PathKind, RecFlag, Signature, SignatureItem, Substitution, Tag,
    TypeSubstitution,
};
use crate::names;
use crate::types::typedtree::{self, CoreTypeDesc, ModuleExprDesc, ModuleTypeDesc, WithConstraint};
use crate::types;

/// Rec flag of the `index`-th member of a group.
fn group_flag(rec_flag: types::RecFlag, index: usize) -> RecFlag {
    match (index, rec_flag) {
        (0, types::RecFlag::Recursive) => RecFlag::Ordinary,
        (0, types::RecFlag::Nonrecursive) => RecFlag::Nonrec,
        _ => RecFlag::And,
    }
}

fn push_comments(cx: &LoadContext<'_>, items: &mut Vec<SignatureItem>, attrs: &types::Attributes) {
    items.extend(
        read_standalone_comments(cx, attrs)
            .into_iter()
            .map(SignatureItem::Comment),
    );
}

pub fn read_signature(
    cx: &LoadContext<'_>,
    env: &ScopeEnv,
    parent: &Identifier,
    sig: &typedtree::Signature,
) -> LoadResult<Signature> {
    log::debug!("Reading signature of {} ({} items)", parent, sig.sig_items.len());
    let env = env.add_signature_items(parent, sig);
    let mut items = Vec::with_capacity(sig.sig_items.len());
    for item in &sig.sig_items {
        read_signature_item(cx, &env, parent, item, &mut items)?;
    }
    Ok(Signature::from_items(items, cx.config.lift_top_comment))
}

fn read_signature_item(
    cx: &LoadContext<'_>,
    env: &ScopeEnv,
    parent: &Identifier,
    item: &typedtree::SignatureItem,
    items: &mut Vec<SignatureItem>,
) -> LoadResult<()> {
    use typedtree::SignatureItemDesc::*;
    match &item.sig_desc {
        Tsig_value(vd) => {
            push_comments(cx, items, &vd.val_attributes);
            items.push(match read_value_description(cx, env, parent, vd)? {
                ValueDecl::Value(v) => SignatureItem::Value(v),
                ValueDecl::External(e) => SignatureItem::External(e),
            });
        }
        Tsig_type(rec_flag, decls) => {
            for (index, decl) in decls.iter().enumerate() {
                push_comments(cx, items, &decl.typ_attributes);
                let decl = read_type_declaration(cx, env, parent, decl)?;
                items.push(SignatureItem::Type(group_flag(*rec_flag, index), decl));
            }
        }
        Tsig_typesubst(decls) => {
            for decl in decls {
                push_comments(cx, items, &decl.typ_attributes);
                let decl = read_type_declaration(cx, env, parent, decl)?;
                items.push(SignatureItem::TypeSubstitution(decl));
            }
        }
        Tsig_typext(tyext) => {
            push_comments(cx, items, &tyext.tyext_attributes);
            items.push(SignatureItem::TypExt(read_type_extension(cx, env, parent, tyext)?));
        }
        Tsig_exception(ext) => {
            push_comments(cx, items, &ext.ext_attributes);
            items.push(SignatureItem::Exception(read_exception(cx, env, parent, ext)?));
        }
        Tsig_module(md) => {
            push_comments(cx, items, &md.md_attributes);
            items.push(SignatureItem::Module(
                RecFlag::Ordinary,
                read_module_declaration(cx, env, parent, md)?,
            ));
        }
        Tsig_modsubst(ms) => {
            push_comments(cx, items, &ms.ms_attributes);
            let id = parent.child(IdentifierKind::Module, ms.ms_id.name());
            items.push(SignatureItem::ModuleSubstitution(ModuleSubstitution {
                doc: read_doc(cx, &id, &ms.ms_attributes),
                manifest: env.resolve_module_path(&ms.ms_manifest)?,
                id,
            }));
        }
        Tsig_recmodule(mds) => {
            for (index, md) in mds.iter().enumerate() {
                push_comments(cx, items, &md.md_attributes);
                let flag = if index == 0 { RecFlag::Ordinary } else { RecFlag::And };
                items.push(SignatureItem::Module(flag, read_module_declaration(cx, env, parent, md)?));
            }
        }
        Tsig_modtype(mtd) => {
            push_comments(cx, items, &mtd.mtd_attributes);
            items.push(SignatureItem::ModuleType(read_module_type_declaration(
                cx, env, parent, mtd,
            )?));
        }
        Tsig_open(_) => {}
        Tsig_include(incl) => {
            push_comments(cx, items, &incl.incl_attributes);
            items.push(SignatureItem::Include(read_include(cx, env, parent, incl)?));
        }
        Tsig_class(classes) => {
            for (index, cld) in classes.iter().enumerate() {
                push_comments(cx, items, &cld.ci_attributes);
                let flag = if index == 0 { RecFlag::Ordinary } else { RecFlag::And };
                items.push(SignatureItem::Class(flag, read_class_description(cx, env, parent, cld)?));
            }
        }
        Tsig_class_type(class_types) => {
            for (index, cltd) in class_types.iter().enumerate() {
                push_comments(cx, items, &cltd.ci_attributes);
                let flag = if index == 0 { RecFlag::Ordinary } else { RecFlag::And };
                items.push(SignatureItem::ClassType(
                    flag,
                    read_class_type_declaration(cx, env, parent, cltd)?,
                ));
            }
        }
        Tsig_attribute(attr) => {
            if let Some(comment) = read_standalone(cx, attr) {
                items.push(SignatureItem::Comment(comment));
            }
        }
    }
    Ok(())
}

// ============================================================================
// Modules
// ============================================================================

/// Canonical path declared by a `@canonical` tag.
pub(crate) fn read_canonical(doc: &Doc) -> Option<Path> {
    let canonical = doc.canonical()?;
    let path = Path::from_dotted(canonical);
    if path.is_none() {
        log::warn!("Ignoring malformed canonical path '{}'", canonical);
    }
    path
}

/// Hidden unless a canonical path says where the module really lives.
pub(crate) fn is_hidden(cx: &LoadContext<'_>, name: &str, canonical: &Option<Path>) -> bool {
    canonical.is_none() && names::is_internal(name, &cx.config.hidden_marker)
}

fn read_module_declaration(
    cx: &LoadContext<'_>,
    env: &ScopeEnv,
    parent: &Identifier,
    md: &typedtree::ModuleDeclaration,
) -> LoadResult<Module> {
    let name = md.md_id.name();
    let id = parent.child(IdentifierKind::Module, name);
    log::trace!("Reading module {}", id);
    let doc = read_doc(cx, &id, &md.md_attributes);
    let canonical = read_canonical(&doc);
    let type_ = match &md.md_type.mty_desc {
        ModuleTypeDesc::Tmty_alias(p) => ModuleDeclType::Alias(env.resolve_module_path(p)?),
        _ => ModuleDeclType::ModuleType(read_module_type(cx, env, &id, &md.md_type)?),
    };
    let expansion = match &md.md_type.mty_desc {
        ModuleTypeDesc::Tmty_signature(_) => Some(Expansion::AlreadyASig),
        _ => None,
    };
    Ok(Module {
        hidden: is_hidden(cx, name, &canonical),
        id,
        doc,
        type_,
        canonical,
        expansion,
    })
}

fn read_module_type_declaration(
    cx: &LoadContext<'_>,
    env: &ScopeEnv,
    parent: &Identifier,
    mtd: &typedtree::ModuleTypeDeclaration,
) -> LoadResult<ModuleType> {
    let id = parent.child(IdentifierKind::ModuleType, mtd.mtd_id.name());
    log::trace!("Reading module type {}", id);
    let doc = read_doc(cx, &id, &mtd.mtd_attributes);
    let expr = mtd
        .mtd_type
        .as_ref()
        .map(|mty| read_module_type(cx, env, &id, mty))
        .transpose()?;
    let expansion = match &mtd.mtd_type {
        Some(typedtree::ModuleType {
            mty_desc: ModuleTypeDesc::Tmty_signature(_),
            ..
        }) => Some(Expansion::AlreadyASig),
        _ => None,
    };
    Ok(ModuleType {
        canonical: read_canonical(&doc),
        id,
        doc,
        expr,
        expansion,
    })
}

/// Translate a module type. `owner` is the declaration any inline
/// signature belongs to.
pub fn read_module_type(
    cx: &LoadContext<'_>,
    env: &ScopeEnv,
    owner: &Identifier,
    mty: &typedtree::ModuleType,
) -> LoadResult<ModuleTypeExpr> {
    match &mty.mty_desc {
        ModuleTypeDesc::Tmty_ident(p) => Ok(ModuleTypeExpr::Path(env.resolve_module_type_path(p)?)),
        ModuleTypeDesc::Tmty_signature(sig) => {
            Ok(ModuleTypeExpr::Signature(read_signature(cx, env, owner, sig)?))
        }
        ModuleTypeDesc::Tmty_functor(param, result) => {
            read_functor(cx, env, owner, param, result)
        }
        ModuleTypeDesc::Tmty_with(body, constraints) => {
            let body_expr = read_module_type(cx, env, owner, body)?;
            let subject = env.subject_of(owner, body);
            let substitutions = constraints
                .iter()
                .map(|(lid, constraint)| read_with_constraint(cx, env, &subject, &lid.txt, constraint))
                .collect::<LoadResult<_>>()?;
            Ok(ModuleTypeExpr::With(Box::new(body_expr), substitutions))
        }
        ModuleTypeDesc::Tmty_typeof(mexpr) => {
            let decl = match &mexpr.mod_desc {
                ModuleExprDesc::Tmod_ident(p) => ModuleDeclType::Alias(env.resolve_module_path(p)?),
                _ => ModuleDeclType::ModuleType(cx.compiled.read_module_type(
                    cx,
                    env,
                    owner,
                    &mexpr.mod_type,
                )?),
            };
            Ok(ModuleTypeExpr::TypeOf(Box::new(decl)))
        }
        ModuleTypeDesc::Tmty_alias(p) => Err(LoadError::ModuleTypeAlias {
            path: p.name(),
            loc: mty.mty_loc.clone(),
        }),
    }
}

fn read_functor(
    cx: &LoadContext<'_>,
    env: &ScopeEnv,
    owner: &Identifier,
    param: &typedtree::FunctorParameter,
    result: &typedtree::ModuleType,
) -> LoadResult<ModuleTypeExpr> {
    match param {
        typedtree::FunctorParameter::Unit => Ok(ModuleTypeExpr::Functor(
            FunctorParameter::Unit,
            Box::new(read_module_type(cx, env, owner, result)?),
        )),
        typedtree::FunctorParameter::Named(ident, arg) => {
            let id = env.functor_argument(owner, ident.name());
            log::trace!("Reading functor parameter {}", id);
            let expr = read_module_type(cx, env, &id, arg)?;
            let expansion = match &arg.mty_desc {
                ModuleTypeDesc::Tmty_signature(_) => Some(Expansion::AlreadyASig),
                _ => None,
            };
            let shape = env.module_type_shape(&id, arg);
            let inner = env.add_functor_parameter(ident, id.clone(), shape);
            let result = read_module_type(cx, &inner, owner, result)?;
            Ok(ModuleTypeExpr::Functor(
                FunctorParameter::Named(FunctorArgument {
                    id,
                    expr: Box::new(expr),
                    expansion,
                }),
                Box::new(result),
            ))
        }
    }
}

fn read_with_constraint(
    cx: &LoadContext<'_>,
    env: &ScopeEnv,
    subject: &Subject,
    lid: &Longident,
    constraint: &WithConstraint,
) -> LoadResult<Substitution> {
    Ok(match constraint {
        WithConstraint::Twith_type(decl) => Substitution::TypeEq(
            env.resolve_fragment(subject, PathKind::Type, lid),
            read_type_equation(cx, env, decl)?,
        ),
        WithConstraint::Twith_module(p) => Substitution::ModuleEq(
            env.resolve_fragment(subject, PathKind::Module, lid),
            ModuleDeclType::Alias(env.resolve_module_path(p)?),
        ),
        WithConstraint::Twith_typesubst(decl) => {
            let fragment = env.resolve_fragment(subject, PathKind::Type, lid);
            let Some(manifest) = &decl.typ_manifest else {
                return Err(LoadError::MissingSubstitutionManifest {
                    fragment: fragment.to_string(),
                    loc: decl.typ_loc.clone(),
                });
            };
            let head = match &manifest.ctyp_desc {
                CoreTypeDesc::Ttyp_constr(p, _) => Some(env.resolve_type_path(p)?),
                _ => None,
            };
            Substitution::TypeSubst(
                fragment,
                TypeSubstitution {
                    head,
                    equation: read_type_equation(cx, env, decl)?,
                },
            )
        }
        WithConstraint::Twith_modsubst(p) => Substitution::ModuleSubst(
            env.resolve_fragment(subject, PathKind::Module, lid),
            env.resolve_module_path(p)?,
        ),
    })
}

// ============================================================================
// Includes
// ============================================================================

fn include_status(doc: &Doc) -> IncludeStatus {
    doc.tags()
        .find_map(|tag| match tag {
            Tag::Inline => Some(IncludeStatus::Inline),
            Tag::Open => Some(IncludeStatus::Open),
            Tag::Closed => Some(IncludeStatus::Closed),
            _ => None,
        })
        .unwrap_or_default()
}

fn read_include(
    cx: &LoadContext<'_>,
    env: &ScopeEnv,
    parent: &Identifier,
    incl: &typedtree::IncludeDescription,
) -> LoadResult<Include> {
    let doc = read_doc(cx, parent, &incl.incl_attributes);
    let decl = read_module_type(cx, env, parent, &incl.incl_mod)?;
    let content = cx.compiled.read_signature(cx, env, parent, &incl.incl_type)?;
    log::trace!("Include in {} realizes {} items", parent, content.items.len());
    Ok(Include {
        parent: parent.clone(),
        status: include_status(&doc),
        doc,
        decl,
        expansion: IncludeExpansion {
            resolved: false,
            content,
        },
    })
}
