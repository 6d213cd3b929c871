//! Typed core types to documentation type expressions.

use super::LoadContext;
use super::doc_attr;
use super::env::ScopeEnv;
use crate::error::LoadResult;
use crate::model::{
    Label, Object, ObjectField, Package, PathKind, PolymorphicVariant, PolymorphicVariantElement,
    PolymorphicVariantKind, TypeExpr, VariantConstructor,
};
use crate::types::typedtree::{self, CoreType, CoreTypeDesc};
use crate::types::{ArgLabel, ClosedFlag};
use smol_str::SmolStr;

/// Normalize the front-end's argument label.
pub fn read_label(label: &ArgLabel) -> Option<Label> {
    match label {
        ArgLabel::Nolabel => None,
        ArgLabel::Labelled(name) => Some(Label::Label(name.into())),
        ArgLabel::Optional(name) => Some(Label::Optional(name.into())),
    }
}

pub fn read_core_type(cx: &LoadContext<'_>, env: &ScopeEnv, ty: &CoreType) -> LoadResult<TypeExpr> {
    let expr = match &ty.ctyp_desc {
        CoreTypeDesc::Ttyp_any => TypeExpr::Any,
        CoreTypeDesc::Ttyp_var(name) => TypeExpr::Var(name.into()),
        CoreTypeDesc::Ttyp_arrow(label, arg, res) => TypeExpr::arrow(
            read_label(label),
            read_core_type(cx, env, arg)?,
            read_core_type(cx, env, res)?,
        ),
        CoreTypeDesc::Ttyp_tuple(types) => TypeExpr::Tuple(read_core_types(cx, env, types)?),
        CoreTypeDesc::Ttyp_constr(path, args) => TypeExpr::Constr(
            env.resolve_type_path(path)?,
            read_core_types(cx, env, args)?,
        ),
        CoreTypeDesc::Ttyp_object(fields, closed) => read_object(cx, env, fields, *closed)?,
        CoreTypeDesc::Ttyp_class(path, args) => TypeExpr::Class(
            env.resolve_class_type_path(path)?,
            read_core_types(cx, env, args)?,
        ),
        CoreTypeDesc::Ttyp_alias(body, name) => {
            TypeExpr::Alias(Box::new(read_core_type(cx, env, body)?), name.into())
        }
        CoreTypeDesc::Ttyp_variant(fields, closed, present) => {
            read_polymorphic_variant(cx, env, fields, *closed, present.as_deref())?
        }
        CoreTypeDesc::Ttyp_poly(vars, body) => TypeExpr::poly(
            vars.iter().map(SmolStr::from).collect(),
            read_core_type(cx, env, body)?,
        ),
        CoreTypeDesc::Ttyp_package(pack) => read_package(cx, env, pack)?,
    };
    Ok(expr)
}

pub fn read_core_types(
    cx: &LoadContext<'_>,
    env: &ScopeEnv,
    types: &[CoreType],
) -> LoadResult<Vec<TypeExpr>> {
    types.iter().map(|ty| read_core_type(cx, env, ty)).collect()
}

fn read_object(
    cx: &LoadContext<'_>,
    env: &ScopeEnv,
    fields: &[typedtree::ObjectField],
    closed: ClosedFlag,
) -> LoadResult<TypeExpr> {
    let fields = fields
        .iter()
        .map(|field| {
            Ok(match field {
                typedtree::ObjectField::OTtag(name, _, ty) => ObjectField::Method {
                    name: name.txt.as_str().into(),
                    type_: read_core_type(cx, env, ty)?,
                },
                typedtree::ObjectField::OTinherit(ty) => {
                    ObjectField::Inherit(read_core_type(cx, env, ty)?)
                }
            })
        })
        .collect::<LoadResult<_>>()?;
    Ok(TypeExpr::Object(Object {
        fields,
        open: closed == ClosedFlag::Open,
    }))
}

fn read_polymorphic_variant(
    cx: &LoadContext<'_>,
    env: &ScopeEnv,
    fields: &[typedtree::RowField],
    closed: ClosedFlag,
    present: Option<&[String]>,
) -> LoadResult<TypeExpr> {
    let elements = fields
        .iter()
        .map(|field| {
            Ok(match field {
                typedtree::RowField::Rtag(name, attrs, constant, args) => {
                    PolymorphicVariantElement::Constructor(VariantConstructor {
                        name: name.txt.as_str().into(),
                        constant: *constant,
                        arguments: read_core_types(cx, env, args)?,
                        doc: doc_attr::read_anonymous_doc(cx, &name.txt, attrs),
                    })
                }
                typedtree::RowField::Rinherit(ty) => {
                    PolymorphicVariantElement::Type(read_core_type(cx, env, ty)?)
                }
            })
        })
        .collect::<LoadResult<_>>()?;

    let kind = match (closed, present) {
        (ClosedFlag::Open, _) => PolymorphicVariantKind::Open,
        (ClosedFlag::Closed, Some(tags)) => {
            PolymorphicVariantKind::Closed(tags.iter().map(SmolStr::from).collect())
        }
        (ClosedFlag::Closed, None) => PolymorphicVariantKind::Fixed,
    };
    Ok(TypeExpr::PolymorphicVariant(PolymorphicVariant { kind, elements }))
}

fn read_package(
    cx: &LoadContext<'_>,
    env: &ScopeEnv,
    pack: &typedtree::PackageType,
) -> LoadResult<TypeExpr> {
    let (path, subject) = env.resolve_subject(&pack.pack_path)?;
    let substitutions = pack
        .pack_fields
        .iter()
        .map(|(lid, ty)| {
            Ok((
                env.resolve_fragment(&subject, PathKind::Type, &lid.txt),
                read_core_type(cx, env, ty)?,
            ))
        })
        .collect::<LoadResult<_>>()?;
    Ok(TypeExpr::Package(Package {
        path,
        substitutions,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ident::IdGenerator;
    use crate::location::Located;
    use crate::longident::Longident;
    use crate::model::{Fragment, IdentifierKind, Path};
    use crate::testing::*;
    use crate::types;

    fn read(ty: &CoreType) -> TypeExpr {
        with_context(|cx| read_core_type(cx, &ScopeEnv::new(), ty).unwrap())
    }

    #[test]
    fn test_labels() {
        assert_eq!(read_label(&ArgLabel::Nolabel), None);
        assert_eq!(
            read_label(&ArgLabel::labelled("f")),
            Some(Label::Label("f".into()))
        );
        assert_eq!(
            read_label(&ArgLabel::optional("x")),
            Some(Label::Optional("x".into()))
        );
    }

    #[test]
    fn test_poly_without_variables_collapses() {
        let arrow = tarrow(tvar("a"), tvar("a"));
        let quantified = core(CoreTypeDesc::Ttyp_poly(vec![], Box::new(arrow.clone())));
        assert_eq!(read(&quantified), read(&arrow));

        let quantified = core(CoreTypeDesc::Ttyp_poly(vec!["a".into()], Box::new(arrow)));
        assert!(matches!(read(&quantified), TypeExpr::Poly(vars, _) if vars.len() == 1 && vars[0].as_str() == "a"));
    }

    #[test]
    fn test_object_openness() {
        let ids = IdGenerator::new();
        let int = tconstr(types::Path::pident(ids.create_predef("int")), vec![]);
        let method = typedtree::ObjectField::OTtag(Located::mknoloc("x".into()), vec![], int);
        let open = core(CoreTypeDesc::Ttyp_object(vec![method.clone()], ClosedFlag::Open));
        let closed = core(CoreTypeDesc::Ttyp_object(vec![method], ClosedFlag::Closed));

        assert!(matches!(read(&open), TypeExpr::Object(Object { open: true, .. })));
        match read(&closed) {
            TypeExpr::Object(obj) => {
                assert!(!obj.open);
                assert!(matches!(
                    &obj.fields[0],
                    ObjectField::Method { name, type_: TypeExpr::Constr(Path::Core(_), _) } if name.as_str() == "x"
                ));
            }
            other => panic!("expected object, got {:?}", other),
        }
    }

    #[test]
    fn test_polymorphic_variant_kinds() {
        let tag = |name: &str| {
            typedtree::RowField::Rtag(
                Located::mknoloc(name.to_string()),
                vec![doc_attr("A tag.")],
                true,
                vec![],
            )
        };
        let variant = |closed, present| {
            core(CoreTypeDesc::Ttyp_variant(vec![tag("A"), tag("B")], closed, present))
        };
        let kind = |ty: &CoreType| match read(ty) {
            TypeExpr::PolymorphicVariant(v) => v.kind,
            other => panic!("expected variant, got {:?}", other),
        };

        assert_eq!(kind(&variant(ClosedFlag::Open, None)), PolymorphicVariantKind::Open);
        assert_eq!(kind(&variant(ClosedFlag::Closed, None)), PolymorphicVariantKind::Fixed);
        assert_eq!(
            kind(&variant(ClosedFlag::Closed, Some(vec!["A".into()]))),
            PolymorphicVariantKind::Closed(vec!["A".into()])
        );

        match read(&variant(ClosedFlag::Closed, None)) {
            TypeExpr::PolymorphicVariant(v) => match &v.elements[0] {
                PolymorphicVariantElement::Constructor(c) => {
                    assert!(c.constant);
                    assert!(!c.doc.is_absent());
                }
                other => panic!("expected constructor, got {:?}", other),
            },
            other => panic!("expected variant, got {:?}", other),
        }
    }

    #[test]
    fn test_package_substitutions_resolve_against_module_type() {
        let ids = IdGenerator::new();
        let s = ids.create("S");
        let t = ids.create("t");
        let sig = signature(vec![modtype_item(&s, Some(signature_mty(vec![type_item(&t)])))]);
        let root = root();
        let env = ScopeEnv::new().add_signature_items(&root, &sig);
        let int = tconstr(types::Path::pident(ids.create_predef("int")), vec![]);
        let pack = core(CoreTypeDesc::Ttyp_package(typedtree::PackageType {
            pack_path: pident(&s),
            pack_fields: vec![(Located::mknoloc(Longident::lident("t")), int)],
            pack_loc: Default::default(),
        }));

        let s_id = root.child(IdentifierKind::ModuleType, "S");
        let ty = with_context(|cx| read_core_type(cx, &env, &pack).unwrap());
        match ty {
            TypeExpr::Package(p) => {
                assert_eq!(p.path, Path::Resolved(s_id.clone()));
                assert_eq!(
                    p.substitutions[0].0,
                    Fragment::Resolved(s_id.child(IdentifierKind::Type, "t"))
                );
            }
            other => panic!("expected package, got {:?}", other),
        }
    }
}
