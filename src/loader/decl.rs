//! Value, type, extension and exception declarations of the typed tree.

use super::LoadContext;
use super::doc_attr::read_doc;
use super::env::ScopeEnv;
use super::signature::read_canonical;
use super::type_expr::{read_core_type, read_core_types};
use crate::error::{LoadError, LoadResult};
use crate::model::{
    Constructor, ConstructorArgs, Exception, Extension, ExtensionConstructor, External, Field,
    Identifier, IdentifierKind, Representation, TypeDecl, TypeEquation, TypeParam,
    TypeParamDesc, Value, Variance,
};
use crate::types::typedtree::{
    self, ConstructorArguments, CoreTypeDesc, ExtensionConstructorKind, LabelDeclaration,
    TypeDeclaration, TypeKind,
};
use crate::types::{Injectivity, MutableFlag, PrivateFlag, VarianceAnnotation};

/// Either a [`Value`] or, when primitives are attached, an [`External`].
pub enum ValueDecl {
    Value(Value),
    External(External),
}

pub fn read_value_description(
    cx: &LoadContext<'_>,
    env: &ScopeEnv,
    parent: &Identifier,
    vd: &typedtree::ValueDescription,
) -> LoadResult<ValueDecl> {
    let id = parent.child(IdentifierKind::Value, vd.val_id.name());
    let doc = read_doc(cx, &id, &vd.val_attributes);
    let type_ = read_core_type(cx, env, &vd.val_desc)?;
    Ok(if vd.val_prim.is_empty() {
        ValueDecl::Value(Value { id, doc, type_ })
    } else {
        ValueDecl::External(External {
            id,
            doc,
            type_,
            primitives: vd.val_prim.iter().map(Into::into).collect(),
        })
    })
}

// ============================================================================
// Type declarations
// ============================================================================

pub fn read_type_parameter(owner: &str, param: &typedtree::TypeParam) -> LoadResult<TypeParam> {
    let (ty, variance, injectivity) = param;
    let desc = match &ty.ctyp_desc {
        CoreTypeDesc::Ttyp_any => TypeParamDesc::Any,
        CoreTypeDesc::Ttyp_var(name) => TypeParamDesc::Var(name.into()),
        _ => {
            return Err(LoadError::InvalidTypeParameter {
                name: owner.to_string(),
                loc: ty.ctyp_loc.clone(),
            });
        }
    };
    let variance = match variance {
        VarianceAnnotation::Covariant => Some(Variance::Pos),
        VarianceAnnotation::Contravariant => Some(Variance::Neg),
        VarianceAnnotation::NoVariance => None,
    };
    Ok(TypeParam {
        desc,
        variance,
        injective: *injectivity == Injectivity::Injective,
    })
}

fn read_type_parameters(owner: &str, params: &[typedtree::TypeParam]) -> LoadResult<Vec<TypeParam>> {
    params.iter().map(|p| read_type_parameter(owner, p)).collect()
}

pub fn read_type_equation(
    cx: &LoadContext<'_>,
    env: &ScopeEnv,
    decl: &TypeDeclaration,
) -> LoadResult<TypeEquation> {
    let manifest = decl
        .typ_manifest
        .as_ref()
        .map(|ty| read_core_type(cx, env, ty))
        .transpose()?;
    let constraints = decl
        .typ_cstrs
        .iter()
        .map(|(lhs, rhs, _)| Ok((read_core_type(cx, env, lhs)?, read_core_type(cx, env, rhs)?)))
        .collect::<LoadResult<_>>()?;
    Ok(TypeEquation {
        params: read_type_parameters(decl.typ_id.name(), &decl.typ_params)?,
        private: decl.typ_private == PrivateFlag::Private,
        manifest,
        constraints,
    })
}

fn read_label_declaration(
    cx: &LoadContext<'_>,
    env: &ScopeEnv,
    parent: &Identifier,
    ld: &LabelDeclaration,
) -> LoadResult<Field> {
    let id = parent.child(IdentifierKind::Field, ld.ld_id.name());
    Ok(Field {
        doc: read_doc(cx, &id, &ld.ld_attributes),
        mutable: ld.ld_mutable == MutableFlag::Mutable,
        type_: read_core_type(cx, env, &ld.ld_type)?,
        id,
    })
}

/// Arguments of a constructor; record fields are parented under `parent`.
pub fn read_constructor_arguments(
    cx: &LoadContext<'_>,
    env: &ScopeEnv,
    parent: &Identifier,
    args: &ConstructorArguments,
) -> LoadResult<ConstructorArgs> {
    Ok(match args {
        ConstructorArguments::Cstr_tuple(types) => {
            ConstructorArgs::Tuple(read_core_types(cx, env, types)?)
        }
        ConstructorArguments::Cstr_record(labels) => ConstructorArgs::Record(
            labels
                .iter()
                .map(|ld| read_label_declaration(cx, env, parent, ld))
                .collect::<LoadResult<_>>()?,
        ),
    })
}

fn read_constructor_declaration(
    cx: &LoadContext<'_>,
    env: &ScopeEnv,
    parent: &Identifier,
    cd: &typedtree::ConstructorDeclaration,
) -> LoadResult<Constructor> {
    let id = parent.child(IdentifierKind::Constructor, cd.cd_id.name());
    Ok(Constructor {
        doc: read_doc(cx, &id, &cd.cd_attributes),
        args: read_constructor_arguments(cx, env, &id, &cd.cd_args)?,
        res: cd.cd_res.as_ref().map(|ty| read_core_type(cx, env, ty)).transpose()?,
        id,
    })
}

fn read_representation(
    cx: &LoadContext<'_>,
    env: &ScopeEnv,
    id: &Identifier,
    kind: &TypeKind,
) -> LoadResult<Option<Representation>> {
    Ok(match kind {
        TypeKind::Ttype_abstract => None,
        TypeKind::Ttype_variant(constructors) => Some(Representation::Variant(
            constructors
                .iter()
                .map(|cd| read_constructor_declaration(cx, env, id, cd))
                .collect::<LoadResult<_>>()?,
        )),
        TypeKind::Ttype_record(labels) => Some(Representation::Record(
            labels
                .iter()
                .map(|ld| read_label_declaration(cx, env, id, ld))
                .collect::<LoadResult<_>>()?,
        )),
        TypeKind::Ttype_open => Some(Representation::Extensible),
    })
}

pub fn read_type_declaration(
    cx: &LoadContext<'_>,
    env: &ScopeEnv,
    parent: &Identifier,
    decl: &TypeDeclaration,
) -> LoadResult<TypeDecl> {
    let id = parent.child(IdentifierKind::Type, decl.typ_id.name());
    log::trace!("Reading type {}", id);
    let doc = read_doc(cx, &id, &decl.typ_attributes);
    let canonical = read_canonical(&doc);
    Ok(TypeDecl {
        equation: read_type_equation(cx, env, decl)?,
        representation: read_representation(cx, env, &id, &decl.typ_kind)?,
        id,
        doc,
        canonical,
    })
}

// ============================================================================
// Extensions and exceptions
// ============================================================================

fn read_extension_constructor(
    cx: &LoadContext<'_>,
    env: &ScopeEnv,
    parent: &Identifier,
    kind: IdentifierKind,
    ext: &typedtree::ExtensionConstructor,
) -> LoadResult<(Identifier, ConstructorArgs, Option<crate::model::TypeExpr>)> {
    match &ext.ext_kind {
        ExtensionConstructorKind::Text_decl(args, res) => {
            let id = parent.child(kind, ext.ext_id.name());
            let args = read_constructor_arguments(cx, env, &id, args)?;
            let res = res.as_ref().map(|ty| read_core_type(cx, env, ty)).transpose()?;
            Ok((id, args, res))
        }
        ExtensionConstructorKind::Text_rebind(_) => Err(LoadError::ExtensionRebind {
            name: ext.ext_id.name().to_string(),
            loc: ext.ext_loc.clone(),
        }),
    }
}

pub fn read_type_extension(
    cx: &LoadContext<'_>,
    env: &ScopeEnv,
    parent: &Identifier,
    tyext: &typedtree::TypeExtension,
) -> LoadResult<Extension> {
    let type_path = env.resolve_type_path(&tyext.tyext_path)?;
    let constructors = tyext
        .tyext_constructors
        .iter()
        .map(|ext| {
            let (id, args, res) =
                read_extension_constructor(cx, env, parent, IdentifierKind::Extension, ext)?;
            Ok(ExtensionConstructor {
                doc: read_doc(cx, &id, &ext.ext_attributes),
                id,
                args,
                res,
            })
        })
        .collect::<LoadResult<_>>()?;
    Ok(Extension {
        doc: read_doc(cx, parent, &tyext.tyext_attributes),
        type_params: read_type_parameters(tyext.tyext_path.last(), &tyext.tyext_params)?,
        private: tyext.tyext_private == PrivateFlag::Private,
        type_path,
        constructors,
    })
}

pub fn read_exception(
    cx: &LoadContext<'_>,
    env: &ScopeEnv,
    parent: &Identifier,
    ext: &typedtree::ExtensionConstructor,
) -> LoadResult<Exception> {
    let (id, args, res) = read_extension_constructor(cx, env, parent, IdentifierKind::Exception, ext)?;
    Ok(Exception {
        doc: read_doc(cx, &id, &ext.ext_attributes),
        id,
        args,
        res,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ident::{IdGenerator, Ident};
    use crate::testing::*;
    use crate::types;

    #[test]
    fn test_type_parameters() {
        let p = read_type_parameter(
            "t",
            &(tvar("a"), VarianceAnnotation::Covariant, Injectivity::Injective),
        )
        .unwrap();
        assert_eq!(p.name(), Some("a"));
        assert_eq!(p.variance, Some(Variance::Pos));
        assert!(p.injective);

        let any = read_type_parameter(
            "t",
            &(core(CoreTypeDesc::Ttyp_any), VarianceAnnotation::NoVariance, Injectivity::NoInjectivity),
        )
        .unwrap();
        assert_eq!(any.desc, TypeParamDesc::Any);

        let ids = IdGenerator::new();
        let bad = tconstr(types::Path::pident(ids.create_predef("int")), vec![]);
        assert!(matches!(
            read_type_parameter("t", &(bad, VarianceAnnotation::NoVariance, Injectivity::NoInjectivity)),
            Err(LoadError::InvalidTypeParameter { .. })
        ));
    }

    #[test]
    fn test_record_fields_parented_under_constructor() {
        let ids = IdGenerator::new();
        let t = ids.create("t");
        let int = tconstr(types::Path::pident(ids.create_predef("int")), vec![]);
        let field = |name: &str| label_decl(&ids.create(name), int.clone());
        let mut decl = type_decl(&t);
        decl.typ_kind = TypeKind::Ttype_variant(vec![
            constructor_decl(&ids.create("A"), ConstructorArguments::Cstr_record(vec![field("x")])),
            constructor_decl(&ids.create("B"), ConstructorArguments::Cstr_record(vec![field("x")])),
        ]);

        let root = root();
        let decl = with_context(|cx| read_type_declaration(cx, &ScopeEnv::new(), &root, &decl).unwrap());
        let ctors = match decl.representation {
            Some(Representation::Variant(ctors)) => ctors,
            other => panic!("expected variant, got {:?}", other),
        };
        let field_id = |c: &Constructor| match &c.args {
            ConstructorArgs::Record(fields) => fields[0].id.clone(),
            other => panic!("expected record, got {:?}", other),
        };
        assert_eq!(field_id(&ctors[0]).to_string(), "Unit.type-t.constructor-A.field-x");
        assert_ne!(field_id(&ctors[0]), field_id(&ctors[1]));
    }

    #[test]
    fn test_rebind_is_fatal() {
        let ids = IdGenerator::new();
        let ext = typedtree::ExtensionConstructor {
            ext_id: ids.create("E"),
            ext_kind: ExtensionConstructorKind::Text_rebind(types::Path::pident(
                Ident::create_persistent("Other"),
            )),
            ext_loc: Default::default(),
            ext_attributes: vec![],
        };
        let root = root();
        let res = with_context(|cx| read_exception(cx, &ScopeEnv::new(), &root, &ext).map(|_| ()));
        assert!(matches!(res, Err(LoadError::ExtensionRebind { ref name, .. }) if name == "E"));
    }

    #[test]
    fn test_external_primitives() {
        let ids = IdGenerator::new();
        let int = tconstr(types::Path::pident(ids.create_predef("int")), vec![]);
        let mut vd = value_desc(&ids.create("succ"), tarrow(int.clone(), int));
        vd.val_prim = vec!["%succint".to_string()];
        let root = root();
        let decl = with_context(|cx| read_value_description(cx, &ScopeEnv::new(), &root, &vd).unwrap());
        match decl {
            ValueDecl::External(ext) => {
                assert_eq!(ext.primitives.len(), 1);
                assert_eq!(ext.primitives[0].as_str(), "%succint");
                assert_eq!(ext.id.to_string(), "Unit.val-succ");
            }
            ValueDecl::Value(_) => panic!("expected external"),
        }
    }
}
