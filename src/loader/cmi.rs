//! Compiled signatures to the documentation model.
//!
//! The typed tree does not carry a reusable signature for the realized
//! content of an `include` or for `module type of` an arbitrary module
//! expression. Both are read from the signature the type checker computed,
//! through the [`CompiledReader`] strategy held by the [`LoadContext`].

use super::LoadContext;
use super::doc_attr::read_doc;
use super::env::ScopeEnv;
use super::signature::{is_hidden, read_canonical};
use super::type_expr::read_label;
use crate::error::{LoadError, LoadResult};
use crate::ident::Ident;
use crate::location::Location;
use crate::model::{
    self, Class, ClassDecl, ClassSignature, ClassSignatureItem, ClassType, ClassTypeExpr,
    Constructor, ConstructorArgs, Doc, Exception, Expansion, Extension, ExtensionConstructor,
    External, Field, FunctorArgument, FunctorParameter, Identifier, IdentifierKind,
    InstanceVariable, Method, Module, ModuleDeclType, ModuleType, ModuleTypeExpr, Object,
    ObjectField, Package, PathKind, PolymorphicVariant, PolymorphicVariantElement,
    PolymorphicVariantKind, RecFlag, Representation, Signature, SignatureItem, TypeDecl,
    TypeEquation, TypeParam, TypeParamDesc, Value, VariantConstructor, Variance,
};
use crate::types::decl::{self, ExtStatus, RecStatus};
use crate::types::type_expr::{RowDesc, RowField};
use crate::types::{
    self, ArgLabel, Injectivity, MutableFlag, PrivateFlag, TypeExpr, VarianceAnnotation,
    VirtualFlag,
};
use ahash::{AHashMap, AHashSet};
use smol_str::SmolStr;

/// Reader for compiled signatures.
pub trait CompiledReader {
    /// Translate a compiled signature whose items belong to `parent`.
    fn read_signature(
        &self,
        cx: &LoadContext<'_>,
        env: &ScopeEnv,
        parent: &Identifier,
        sig: &decl::Signature,
    ) -> LoadResult<Signature>;

    /// Translate a compiled module type owned by `owner`.
    fn read_module_type(
        &self,
        cx: &LoadContext<'_>,
        env: &ScopeEnv,
        owner: &Identifier,
        mty: &decl::ModuleType,
    ) -> LoadResult<ModuleTypeExpr>;
}

/// The default [`CompiledReader`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CmiReader;

impl CompiledReader for CmiReader {
    fn read_signature(
        &self,
        cx: &LoadContext<'_>,
        env: &ScopeEnv,
        parent: &Identifier,
        sig: &decl::Signature,
    ) -> LoadResult<Signature> {
        read_signature(cx, env, parent, sig)
    }

    fn read_module_type(
        &self,
        cx: &LoadContext<'_>,
        env: &ScopeEnv,
        owner: &Identifier,
        mty: &decl::ModuleType,
    ) -> LoadResult<ModuleTypeExpr> {
        read_module_type(cx, env, owner, mty)
    }
}

// ============================================================================
// Type variables
// ============================================================================

/// Names of the type variables of one declaration. Anonymous variables are
/// named `a`, `b`, ... in order of appearance, skipping names in use.
#[derive(Debug, Default)]
struct VarNames {
    names: AHashMap<i32, SmolStr>,
}

fn fresh_name(n: usize) -> String {
    let letter = char::from(b'a' + (n % 26) as u8);
    match n / 26 {
        0 => letter.to_string(),
        suffix => format!("{}{}", letter, suffix),
    }
}

impl VarNames {
    fn collect<'t>(types: impl IntoIterator<Item = &'t TypeExpr>) -> Self {
        let mut used = AHashSet::new();
        let mut anonymous = Vec::new();
        for ty in types {
            ty.iter(&mut |t| match t {
                TypeExpr::Tvar { name: Some(name), .. }
                | TypeExpr::Tunivar { name: Some(name), .. }
                | TypeExpr::Talias(_, name) => {
                    used.insert(name.clone());
                }
                TypeExpr::Tvar { name: None, id } | TypeExpr::Tunivar { name: None, id } => {
                    if !anonymous.contains(id) {
                        anonymous.push(*id);
                    }
                }
                _ => {}
            });
        }
        let fresh = (0..).map(fresh_name).filter(|name| !used.contains(name));
        VarNames {
            names: anonymous
                .into_iter()
                .zip(fresh)
                .map(|(id, name)| (id, SmolStr::from(name)))
                .collect(),
        }
    }

    fn name(&self, name: Option<&str>, id: i32) -> SmolStr {
        match name {
            Some(name) => name.into(),
            None => self.names.get(&id).cloned().unwrap_or_else(|| SmolStr::new("_")),
        }
    }
}

fn constructor_types(args: &decl::ConstructorArguments) -> Vec<&TypeExpr> {
    match args {
        decl::ConstructorArguments::CstrTuple(types) => types.iter().collect(),
        decl::ConstructorArguments::CstrRecord(labels) => {
            labels.iter().map(|ld| &ld.ld_type).collect()
        }
    }
}

// ============================================================================
// Type expressions
// ============================================================================

fn is_predef_option(path: &types::Path) -> bool {
    matches!(path, types::Path::Pident(id) if id.is_predef() && id.name() == "option")
}

fn read_type_exprs(env: &ScopeEnv, names: &VarNames, types: &[TypeExpr]) -> LoadResult<Vec<model::TypeExpr>> {
    types.iter().map(|ty| read_type_expr(env, names, ty)).collect()
}

fn read_type_expr(env: &ScopeEnv, names: &VarNames, ty: &TypeExpr) -> LoadResult<model::TypeExpr> {
    Ok(match ty {
        TypeExpr::Tvar { name, id } | TypeExpr::Tunivar { name, id } => {
            model::TypeExpr::Var(names.name(name.as_deref(), *id))
        }
        TypeExpr::Tarrow(label, arg, res) => {
            // `?x:t -> u` is stored as `?x:t option -> u`.
            let arg = match (label, arg.as_ref()) {
                (ArgLabel::Optional(_), TypeExpr::Tconstr(p, args))
                    if is_predef_option(p) && args.len() == 1 =>
                {
                    &args[0]
                }
                (_, arg) => arg,
            };
            model::TypeExpr::arrow(
                read_label(label),
                read_type_expr(env, names, arg)?,
                read_type_expr(env, names, res)?,
            )
        }
        TypeExpr::Ttuple(types) => model::TypeExpr::Tuple(read_type_exprs(env, names, types)?),
        TypeExpr::Tconstr(p, args) => model::TypeExpr::Constr(
            env.resolve_type_path(p)?,
            read_type_exprs(env, names, args)?,
        ),
        TypeExpr::Tobject(methods, open) => model::TypeExpr::Object(Object {
            fields: methods
                .iter()
                .map(|(name, ty)| {
                    Ok(ObjectField::Method {
                        name: name.into(),
                        type_: read_type_expr(env, names, ty)?,
                    })
                })
                .collect::<LoadResult<_>>()?,
            open: *open,
        }),
        TypeExpr::Tvariant(row) => read_row(env, names, row)?,
        TypeExpr::Tpoly(body, vars) => {
            let vars = vars
                .iter()
                .filter_map(|v| match v {
                    TypeExpr::Tvar { name, id } | TypeExpr::Tunivar { name, id } => {
                        Some(names.name(name.as_deref(), *id))
                    }
                    _ => None,
                })
                .collect();
            model::TypeExpr::poly(vars, read_type_expr(env, names, body)?)
        }
        TypeExpr::Tpackage(p, lids, types) => {
            let (path, subject) = env.resolve_subject(p)?;
            let substitutions = lids
                .iter()
                .zip(types)
                .map(|(lid, ty)| {
                    Ok((
                        env.resolve_fragment(&subject, PathKind::Type, lid),
                        read_type_expr(env, names, ty)?,
                    ))
                })
                .collect::<LoadResult<_>>()?;
            model::TypeExpr::Package(Package {
                path,
                substitutions,
            })
        }
        TypeExpr::Talias(body, name) => {
            model::TypeExpr::Alias(Box::new(read_type_expr(env, names, body)?), name.into())
        }
    })
}

fn read_row(env: &ScopeEnv, names: &VarNames, row: &RowDesc) -> LoadResult<model::TypeExpr> {
    if let Some((path, args)) = &row.row_name {
        let constr = model::TypeExpr::Constr(
            env.resolve_type_path(path)?,
            read_type_exprs(env, names, args)?,
        );
        return Ok(if row.row_closed {
            constr
        } else {
            model::TypeExpr::PolymorphicVariant(PolymorphicVariant {
                kind: PolymorphicVariantKind::Open,
                elements: vec![PolymorphicVariantElement::Type(constr)],
            })
        });
    }

    let mut present = Vec::new();
    let mut conjunctive = false;
    let mut elements = Vec::with_capacity(row.row_fields.len());
    for (tag, field) in &row.row_fields {
        let (constant, arguments) = match field {
            RowField::Rpresent(None) => {
                present.push(SmolStr::from(tag));
                (true, Vec::new())
            }
            RowField::Rpresent(Some(ty)) => {
                present.push(SmolStr::from(tag));
                (false, vec![read_type_expr(env, names, ty)?])
            }
            RowField::Reither(constant, types) => {
                conjunctive = true;
                (*constant, read_type_exprs(env, names, types)?)
            }
            RowField::Rabsent => continue,
        };
        elements.push(PolymorphicVariantElement::Constructor(VariantConstructor {
            name: tag.into(),
            constant,
            arguments,
            doc: Doc::Absent,
        }));
    }

    let kind = if !row.row_closed {
        PolymorphicVariantKind::Open
    } else if conjunctive {
        PolymorphicVariantKind::Closed(present)
    } else {
        PolymorphicVariantKind::Fixed
    };
    Ok(model::TypeExpr::PolymorphicVariant(PolymorphicVariant { kind, elements }))
}

// ============================================================================
// Declarations
// ============================================================================

fn read_type_params(
    names: &VarNames,
    params: &[TypeExpr],
    variance: &[types::Variance],
) -> Vec<TypeParam> {
    params
        .iter()
        .enumerate()
        .map(|(i, param)| {
            let desc = match param {
                TypeExpr::Tvar { name, id } => TypeParamDesc::Var(names.name(name.as_deref(), *id)),
                _ => TypeParamDesc::Any,
            };
            let v = variance.get(i).copied().unwrap_or_default();
            TypeParam {
                desc,
                variance: match v.annotation() {
                    VarianceAnnotation::Covariant => Some(Variance::Pos),
                    VarianceAnnotation::Contravariant => Some(Variance::Neg),
                    VarianceAnnotation::NoVariance => None,
                },
                injective: v.injectivity() == Injectivity::Injective,
            }
        })
        .collect()
}

fn read_label_declaration(
    cx: &LoadContext<'_>,
    env: &ScopeEnv,
    names: &VarNames,
    parent: &Identifier,
    ld: &decl::LabelDeclaration,
) -> LoadResult<Field> {
    let id = parent.child(IdentifierKind::Field, ld.ld_id.name());
    Ok(Field {
        doc: read_doc(cx, &id, &ld.ld_attributes),
        mutable: ld.ld_mutable == MutableFlag::Mutable,
        type_: read_type_expr(env, names, &ld.ld_type)?,
        id,
    })
}

fn read_constructor_arguments(
    cx: &LoadContext<'_>,
    env: &ScopeEnv,
    names: &VarNames,
    parent: &Identifier,
    args: &decl::ConstructorArguments,
) -> LoadResult<ConstructorArgs> {
    Ok(match args {
        decl::ConstructorArguments::CstrTuple(types) => {
            ConstructorArgs::Tuple(read_type_exprs(env, names, types)?)
        }
        decl::ConstructorArguments::CstrRecord(labels) => ConstructorArgs::Record(
            labels
                .iter()
                .map(|ld| read_label_declaration(cx, env, names, parent, ld))
                .collect::<LoadResult<_>>()?,
        ),
    })
}

fn read_type_declaration(
    cx: &LoadContext<'_>,
    env: &ScopeEnv,
    parent: &Identifier,
    ident: &Ident,
    decl: &decl::TypeDeclaration,
) -> LoadResult<TypeDecl> {
    let id = parent.child(IdentifierKind::Type, ident.name());
    let mut types: Vec<&TypeExpr> = decl.type_params.iter().chain(&decl.type_manifest).collect();
    match &decl.type_kind {
        decl::TypeKind::TypeVariant(cds) => {
            for cd in cds {
                types.extend(constructor_types(&cd.cd_args));
                types.extend(&cd.cd_res);
            }
        }
        decl::TypeKind::TypeRecord(lds) => types.extend(lds.iter().map(|ld| &ld.ld_type)),
        decl::TypeKind::TypeAbstract | decl::TypeKind::TypeOpen => {}
    }
    let names = VarNames::collect(types);

    let representation = match &decl.type_kind {
        decl::TypeKind::TypeAbstract => None,
        decl::TypeKind::TypeVariant(cds) => Some(Representation::Variant(
            cds.iter()
                .map(|cd| {
                    let cid = id.child(IdentifierKind::Constructor, cd.cd_id.name());
                    Ok(Constructor {
                        doc: read_doc(cx, &cid, &cd.cd_attributes),
                        args: read_constructor_arguments(cx, env, &names, &cid, &cd.cd_args)?,
                        res: cd
                            .cd_res
                            .as_ref()
                            .map(|ty| read_type_expr(env, &names, ty))
                            .transpose()?,
                        id: cid,
                    })
                })
                .collect::<LoadResult<_>>()?,
        )),
        decl::TypeKind::TypeRecord(lds) => Some(Representation::Record(
            lds.iter()
                .map(|ld| read_label_declaration(cx, env, &names, &id, ld))
                .collect::<LoadResult<_>>()?,
        )),
        decl::TypeKind::TypeOpen => Some(Representation::Extensible),
    };

    let doc = read_doc(cx, &id, &decl.type_attributes);
    Ok(TypeDecl {
        canonical: read_canonical(&doc),
        equation: TypeEquation {
            params: read_type_params(&names, &decl.type_params, &decl.type_variance),
            private: decl.type_private == PrivateFlag::Private,
            manifest: decl
                .type_manifest
                .as_ref()
                .map(|ty| read_type_expr(env, &names, ty))
                .transpose()?,
            constraints: Vec::new(),
        },
        representation,
        id,
        doc,
    })
}

fn extension_names(ext: &decl::ExtensionConstructor) -> VarNames {
    let types = ext
        .ext_type_params
        .iter()
        .chain(constructor_types(&ext.ext_args))
        .chain(&ext.ext_ret_type);
    VarNames::collect(types)
}

fn read_extension_constructor(
    cx: &LoadContext<'_>,
    env: &ScopeEnv,
    names: &VarNames,
    id: Identifier,
    ext: &decl::ExtensionConstructor,
) -> LoadResult<ExtensionConstructor> {
    Ok(ExtensionConstructor {
        doc: read_doc(cx, &id, &ext.ext_attributes),
        args: read_constructor_arguments(cx, env, names, &id, &ext.ext_args)?,
        res: ext
            .ext_ret_type
            .as_ref()
            .map(|ty| read_type_expr(env, names, ty))
            .transpose()?,
        id,
    })
}

fn read_value(
    cx: &LoadContext<'_>,
    env: &ScopeEnv,
    parent: &Identifier,
    ident: &Ident,
    vd: &decl::ValueDescription,
) -> LoadResult<SignatureItem> {
    let id = parent.child(IdentifierKind::Value, ident.name());
    let names = VarNames::collect([&vd.val_type]);
    let doc = read_doc(cx, &id, &vd.val_attributes);
    let type_ = read_type_expr(env, &names, &vd.val_type)?;
    Ok(match &vd.val_kind {
        decl::ValueKind::ValReg => SignatureItem::Value(Value { id, doc, type_ }),
        decl::ValueKind::ValPrim(prim) => SignatureItem::External(External {
            id,
            doc,
            type_,
            primitives: prim.names().into_iter().map(SmolStr::from).collect(),
        }),
    })
}

// ============================================================================
// Classes
// ============================================================================

fn class_type_types<'t>(cty: &'t decl::ClassType, out: &mut Vec<&'t TypeExpr>) {
    match cty {
        decl::ClassType::CtyConstr(_, args) => out.extend(args),
        decl::ClassType::CtySignature(csig) => {
            out.extend(&csig.csig_self);
            out.extend(csig.csig_vars.iter().map(|(_, _, _, ty)| ty));
            out.extend(csig.csig_methods.iter().map(|(_, _, _, ty)| ty));
        }
        decl::ClassType::CtyArrow(_, arg, res) => {
            out.push(arg);
            class_type_types(res, out);
        }
    }
}

fn read_class_signature(
    env: &ScopeEnv,
    names: &VarNames,
    owner: &Identifier,
    csig: &decl::ClassSignature,
) -> LoadResult<ClassSignature> {
    let mut items = Vec::with_capacity(csig.csig_vars.len() + csig.csig_methods.len());
    for (name, mutable, virtual_, ty) in &csig.csig_vars {
        items.push(ClassSignatureItem::InstanceVariable(InstanceVariable {
            id: owner.child(IdentifierKind::InstanceVariable, name.as_str()),
            doc: Doc::Absent,
            mutable: *mutable == MutableFlag::Mutable,
            virtual_: *virtual_ == VirtualFlag::Virtual,
            type_: read_type_expr(env, names, ty)?,
        }));
    }
    for (name, private_, virtual_, ty) in &csig.csig_methods {
        items.push(ClassSignatureItem::Method(Method {
            id: owner.child(IdentifierKind::Method, name.as_str()),
            doc: Doc::Absent,
            private_: *private_ == PrivateFlag::Private,
            virtual_: *virtual_ == VirtualFlag::Virtual,
            type_: read_type_expr(env, names, ty)?,
        }));
    }
    Ok(ClassSignature {
        self_: csig
            .csig_self
            .as_ref()
            .map(|ty| read_type_expr(env, names, ty))
            .transpose()?,
        items,
    })
}

fn read_class_type_expr(
    env: &ScopeEnv,
    names: &VarNames,
    owner: &Identifier,
    cty: &decl::ClassType,
) -> LoadResult<ClassTypeExpr> {
    match cty {
        decl::ClassType::CtyConstr(p, args) => Ok(ClassTypeExpr::Constr(
            env.resolve_class_type_path(p)?,
            read_type_exprs(env, names, args)?,
        )),
        decl::ClassType::CtySignature(csig) => Ok(ClassTypeExpr::Signature(read_class_signature(
            env, names, owner, csig,
        )?)),
        decl::ClassType::CtyArrow(..) => Err(LoadError::ClassArrowInSignature {
            loc: Location::none(),
        }),
    }
}

fn read_class_decl(
    env: &ScopeEnv,
    names: &VarNames,
    owner: &Identifier,
    cty: &decl::ClassType,
) -> LoadResult<ClassDecl> {
    match cty {
        decl::ClassType::CtyArrow(label, arg, res) => {
            let arg = match (label, arg) {
                (ArgLabel::Optional(_), TypeExpr::Tconstr(p, args))
                    if is_predef_option(p) && args.len() == 1 =>
                {
                    &args[0]
                }
                (_, arg) => arg,
            };
            Ok(ClassDecl::Arrow(
                read_label(label),
                read_type_expr(env, names, arg)?,
                Box::new(read_class_decl(env, names, owner, res)?),
            ))
        }
        _ => Ok(ClassDecl::ClassType(read_class_type_expr(
            env, names, owner, cty,
        )?)),
    }
}

fn read_class(
    cx: &LoadContext<'_>,
    env: &ScopeEnv,
    parent: &Identifier,
    ident: &Ident,
    cd: &decl::ClassDeclaration,
) -> LoadResult<Class> {
    let id = parent.child(IdentifierKind::Class, ident.name());
    let mut types: Vec<&TypeExpr> = cd.cty_params.iter().collect();
    class_type_types(&cd.cty_type, &mut types);
    let names = VarNames::collect(types);
    Ok(Class {
        doc: read_doc(cx, &id, &cd.cty_attributes),
        virtual_: cd.cty_type.is_virtual(),
        params: read_type_params(&names, &cd.cty_params, &cd.cty_variance),
        type_: read_class_decl(env, &names, &id, &cd.cty_type)?,
        id,
    })
}

fn read_class_type(
    cx: &LoadContext<'_>,
    env: &ScopeEnv,
    parent: &Identifier,
    ident: &Ident,
    cltd: &decl::ClassTypeDeclaration,
) -> LoadResult<ClassType> {
    let id = parent.child(IdentifierKind::ClassType, ident.name());
    let mut types: Vec<&TypeExpr> = cltd.clty_params.iter().collect();
    class_type_types(&cltd.clty_type, &mut types);
    let names = VarNames::collect(types);
    Ok(ClassType {
        doc: read_doc(cx, &id, &cltd.clty_attributes),
        virtual_: cltd.clty_type.is_virtual(),
        params: read_type_params(&names, &cltd.clty_params, &cltd.clty_variance),
        expr: read_class_type_expr(env, &names, &id, &cltd.clty_type)?,
        id,
    })
}

// ============================================================================
// Modules and signatures
// ============================================================================

fn rec_flag(status: RecStatus) -> RecFlag {
    match status {
        RecStatus::TrecNot => RecFlag::Nonrec,
        RecStatus::TrecFirst => RecFlag::Ordinary,
        RecStatus::TrecNext => RecFlag::And,
    }
}

fn read_module(
    cx: &LoadContext<'_>,
    env: &ScopeEnv,
    parent: &Identifier,
    ident: &Ident,
    md: &decl::ModuleDeclaration,
) -> LoadResult<Module> {
    let id = parent.child(IdentifierKind::Module, ident.name());
    let doc = read_doc(cx, &id, &md.md_attributes);
    let canonical = read_canonical(&doc);
    let type_ = match &md.md_type {
        decl::ModuleType::MtyAlias(p) => ModuleDeclType::Alias(env.resolve_module_path(p)?),
        mty => ModuleDeclType::ModuleType(read_module_type(cx, env, &id, mty)?),
    };
    let expansion = match &md.md_type {
        decl::ModuleType::MtySignature(_) => Some(Expansion::AlreadyASig),
        _ => None,
    };
    Ok(Module {
        hidden: is_hidden(cx, ident.name(), &canonical),
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
    ident: &Ident,
    mtd: &decl::ModtypeDeclaration,
) -> LoadResult<ModuleType> {
    let id = parent.child(IdentifierKind::ModuleType, ident.name());
    let doc = read_doc(cx, &id, &mtd.mtd_attributes);
    let expr = mtd
        .mtd_type
        .as_ref()
        .map(|mty| read_module_type(cx, env, &id, mty))
        .transpose()?;
    let expansion = match &mtd.mtd_type {
        Some(decl::ModuleType::MtySignature(_)) => Some(Expansion::AlreadyASig),
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

pub fn read_module_type(
    cx: &LoadContext<'_>,
    env: &ScopeEnv,
    owner: &Identifier,
    mty: &decl::ModuleType,
) -> LoadResult<ModuleTypeExpr> {
    match mty {
        decl::ModuleType::MtyIdent(p) => Ok(ModuleTypeExpr::Path(env.resolve_module_type_path(p)?)),
        decl::ModuleType::MtySignature(sig) => {
            Ok(ModuleTypeExpr::Signature(read_signature(cx, env, owner, sig)?))
        }
        decl::ModuleType::MtyFunctor {
            param,
            param_type,
            result,
        } => match param_type {
            None => Ok(ModuleTypeExpr::Functor(
                FunctorParameter::Unit,
                Box::new(read_module_type(cx, env, owner, result)?),
            )),
            Some(arg) => {
                let id = env.functor_argument(owner, param.name());
                let expr = read_module_type(cx, env, &id, arg)?;
                let expansion = match arg.as_ref() {
                    decl::ModuleType::MtySignature(_) => Some(Expansion::AlreadyASig),
                    _ => None,
                };
                let shape = env.compiled_module_type_shape(&id, arg);
                let inner = env.add_functor_parameter(param, id.clone(), shape);
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
        },
        decl::ModuleType::MtyAlias(p) => Err(LoadError::ModuleTypeAlias {
            path: p.name(),
            loc: Location::none(),
        }),
    }
}

pub fn read_signature(
    cx: &LoadContext<'_>,
    env: &ScopeEnv,
    parent: &Identifier,
    sig: &decl::Signature,
) -> LoadResult<Signature> {
    log::debug!("Reading compiled signature of {} ({} items)", parent, sig.len());
    let env = env.add_compiled_items(parent, sig);
    let mut items: Vec<SignatureItem> = Vec::with_capacity(sig.len());

    for item in sig {
        match item {
            decl::SignatureItem::SigValue(ident, vd) => {
                items.push(read_value(cx, &env, parent, ident, vd)?);
            }
            decl::SignatureItem::SigType(ident, td, status) => {
                let decl = read_type_declaration(cx, &env, parent, ident, td)?;
                items.push(SignatureItem::Type(rec_flag(*status), decl));
            }
            decl::SignatureItem::SigTypext(ident, ext, status) => {
                let names = extension_names(ext);
                match status {
                    ExtStatus::TextException => {
                        let id = parent.child(IdentifierKind::Exception, ident.name());
                        let ctor = read_extension_constructor(cx, &env, &names, id, ext)?;
                        items.push(SignatureItem::Exception(Exception {
                            id: ctor.id,
                            doc: ctor.doc,
                            args: ctor.args,
                            res: ctor.res,
                        }));
                    }
                    ExtStatus::TextNext if matches!(items.last(), Some(SignatureItem::TypExt(_))) => {
                        let id = parent.child(IdentifierKind::Extension, ident.name());
                        let ctor = read_extension_constructor(cx, &env, &names, id, ext)?;
                        if let Some(SignatureItem::TypExt(extension)) = items.last_mut() {
                            extension.constructors.push(ctor);
                        }
                    }
                    ExtStatus::TextFirst | ExtStatus::TextNext => {
                        let id = parent.child(IdentifierKind::Extension, ident.name());
                        let ctor = read_extension_constructor(cx, &env, &names, id, ext)?;
                        items.push(SignatureItem::TypExt(Extension {
                            type_path: env.resolve_type_path(&ext.ext_type_path)?,
                            doc: Doc::Absent,
                            type_params: read_type_params(&names, &ext.ext_type_params, &[]),
                            private: ext.ext_private == PrivateFlag::Private,
                            constructors: vec![ctor],
                        }));
                    }
                }
            }
            decl::SignatureItem::SigModule(ident, md, status) => {
                let flag = match status {
                    RecStatus::TrecNext => RecFlag::And,
                    RecStatus::TrecNot | RecStatus::TrecFirst => RecFlag::Ordinary,
                };
                items.push(SignatureItem::Module(flag, read_module(cx, &env, parent, ident, md)?));
            }
            decl::SignatureItem::SigModtype(ident, mtd) => {
                items.push(SignatureItem::ModuleType(read_module_type_declaration(
                    cx, &env, parent, ident, mtd,
                )?));
            }
            decl::SignatureItem::SigClass(ident, cd, status) => {
                let class = read_class(cx, &env, parent, ident, cd)?;
                items.push(SignatureItem::Class(rec_flag(*status), class));
            }
            decl::SignatureItem::SigClassType(ident, cltd, status) => {
                let class_type = read_class_type(cx, &env, parent, ident, cltd)?;
                items.push(SignatureItem::ClassType(rec_flag(*status), class_type));
            }
        }
    }
    Ok(Signature::from_items(items, cx.config.lift_top_comment))
}
