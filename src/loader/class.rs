//! Class and class type declarations of the typed tree.

use super::LoadContext;
use super::decl::read_type_parameter;
use super::doc_attr::{read_doc, read_standalone};
use super::env::ScopeEnv;
use super::type_expr::{read_core_type, read_core_types, read_label};
use crate::error::{LoadError, LoadResult};
use crate::model::{
    Class, ClassDecl, ClassSignature, ClassSignatureItem, ClassType, ClassTypeExpr, Identifier,
    IdentifierKind, InstanceVariable, Method, TypeParam,
};
use crate::types::typedtree::{self, ClassTypeDesc, ClassTypeFieldDesc, CoreTypeDesc};
use crate::types::{MutableFlag, PrivateFlag, VirtualFlag};

fn read_class_parameters(
    owner: &str,
    params: &[typedtree::TypeParam],
) -> LoadResult<Vec<TypeParam>> {
    params.iter().map(|p| read_type_parameter(owner, p)).collect()
}

fn read_class_signature(
    cx: &LoadContext<'_>,
    env: &ScopeEnv,
    owner: &Identifier,
    csig: &typedtree::ClassSignature,
) -> LoadResult<ClassSignature> {
    let self_ = match &csig.csig_self.ctyp_desc {
        CoreTypeDesc::Ttyp_any => None,
        _ => Some(read_core_type(cx, env, &csig.csig_self)?),
    };
    let mut items = Vec::with_capacity(csig.csig_fields.len());
    for field in &csig.csig_fields {
        let item = match &field.ctf_desc {
            ClassTypeFieldDesc::Tctf_inherit(cltyp) => {
                ClassSignatureItem::Inherit(read_class_type_expr(cx, env, owner, cltyp)?)
            }
            ClassTypeFieldDesc::Tctf_val(name, mutable, virtual_, ty) => {
                let id = owner.child(IdentifierKind::InstanceVariable, name.as_str());
                ClassSignatureItem::InstanceVariable(InstanceVariable {
                    doc: read_doc(cx, &id, &field.ctf_attributes),
                    mutable: *mutable == MutableFlag::Mutable,
                    virtual_: *virtual_ == VirtualFlag::Virtual,
                    type_: read_core_type(cx, env, ty)?,
                    id,
                })
            }
            ClassTypeFieldDesc::Tctf_method(name, private_, virtual_, ty) => {
                let id = owner.child(IdentifierKind::Method, name.as_str());
                ClassSignatureItem::Method(Method {
                    doc: read_doc(cx, &id, &field.ctf_attributes),
                    private_: *private_ == PrivateFlag::Private,
                    virtual_: *virtual_ == VirtualFlag::Virtual,
                    type_: read_core_type(cx, env, ty)?,
                    id,
                })
            }
            ClassTypeFieldDesc::Tctf_constraint(lhs, rhs) => ClassSignatureItem::Constraint(
                read_core_type(cx, env, lhs)?,
                read_core_type(cx, env, rhs)?,
            ),
            ClassTypeFieldDesc::Tctf_attribute(attr) => match read_standalone(cx, attr) {
                Some(comment) => ClassSignatureItem::Comment(comment),
                None => continue,
            },
        };
        items.push(item);
    }
    Ok(ClassSignature { self_, items })
}

/// A class type in a position where only a path or a signature may appear.
pub fn read_class_type_expr(
    cx: &LoadContext<'_>,
    env: &ScopeEnv,
    owner: &Identifier,
    cltyp: &typedtree::ClassType,
) -> LoadResult<ClassTypeExpr> {
    match &cltyp.cltyp_desc {
        ClassTypeDesc::Tcty_constr(path, args) => Ok(ClassTypeExpr::Constr(
            env.resolve_class_type_path(path)?,
            read_core_types(cx, env, args)?,
        )),
        ClassTypeDesc::Tcty_signature(csig) => Ok(ClassTypeExpr::Signature(read_class_signature(
            cx, env, owner, csig,
        )?)),
        ClassTypeDesc::Tcty_arrow(..) => Err(LoadError::ClassArrowInSignature {
            loc: cltyp.cltyp_loc.clone(),
        }),
    }
}

fn read_class_decl(
    cx: &LoadContext<'_>,
    env: &ScopeEnv,
    owner: &Identifier,
    cltyp: &typedtree::ClassType,
) -> LoadResult<ClassDecl> {
    match &cltyp.cltyp_desc {
        ClassTypeDesc::Tcty_arrow(label, arg, res) => Ok(ClassDecl::Arrow(
            read_label(label),
            read_core_type(cx, env, arg)?,
            Box::new(read_class_decl(cx, env, owner, res)?),
        )),
        _ => Ok(ClassDecl::ClassType(read_class_type_expr(cx, env, owner, cltyp)?)),
    }
}

pub fn read_class_description(
    cx: &LoadContext<'_>,
    env: &ScopeEnv,
    parent: &Identifier,
    cld: &typedtree::ClassDescription,
) -> LoadResult<Class> {
    let name = cld.ci_id_class.name();
    let id = parent.child(IdentifierKind::Class, name);
    log::trace!("Reading class {}", id);
    Ok(Class {
        doc: read_doc(cx, &id, &cld.ci_attributes),
        virtual_: cld.ci_virt == VirtualFlag::Virtual,
        params: read_class_parameters(name, &cld.ci_params)?,
        type_: read_class_decl(cx, env, &id, &cld.ci_expr)?,
        id,
    })
}

pub fn read_class_type_declaration(
    cx: &LoadContext<'_>,
    env: &ScopeEnv,
    parent: &Identifier,
    cltd: &typedtree::ClassTypeDeclaration,
) -> LoadResult<ClassType> {
    let name = cltd.ci_id_class_type.name();
    let id = parent.child(IdentifierKind::ClassType, name);
    log::trace!("Reading class type {}", id);
    Ok(ClassType {
        doc: read_doc(cx, &id, &cltd.ci_attributes),
        virtual_: cltd.ci_virt == VirtualFlag::Virtual,
        params: read_class_parameters(name, &cltd.ci_params)?,
        expr: read_class_type_expr(cx, env, &id, &cltd.ci_expr)?,
        id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ident::IdGenerator;
    use crate::model::TypeExpr;
    use crate::loader::env::Shape;
    use crate::model::{CommentItem, Path};
    use crate::testing::*;
    use crate::types::{self, ArgLabel};

    fn method(name: &str, ty: typedtree::CoreType) -> typedtree::ClassTypeField {
        typedtree::ClassTypeField {
            ctf_desc: ClassTypeFieldDesc::Tctf_method(
                name.to_string(),
                PrivateFlag::Public,
                VirtualFlag::Virtual,
                ty,
            ),
            ctf_loc: Default::default(),
            ctf_attributes: vec![doc_attr("A method.")],
        }
    }

    fn field(desc: ClassTypeFieldDesc) -> typedtree::ClassTypeField {
        typedtree::ClassTypeField {
            ctf_desc: desc,
            ctf_loc: Default::default(),
            ctf_attributes: vec![],
        }
    }

    fn class_signature(fields: Vec<typedtree::ClassTypeField>) -> typedtree::ClassType {
        typedtree::ClassType::new(ClassTypeDesc::Tcty_signature(typedtree::ClassSignature {
            csig_self: core(CoreTypeDesc::Ttyp_any),
            csig_fields: fields,
        }))
    }

    #[test]
    fn test_class_with_arrow() {
        let ids = IdGenerator::new();
        let int = tconstr(types::Path::pident(ids.create_predef("int")), vec![]);
        let body = class_signature(vec![method("get", int.clone())]);
        let expr = typedtree::ClassType::new(ClassTypeDesc::Tcty_arrow(
            ArgLabel::Nolabel,
            int,
            Box::new(body),
        ));
        let cld = class_infos(&ids, "counter", expr);
        let root = root();

        let class = with_context(|cx| read_class_description(cx, &ScopeEnv::new(), &root, &cld).unwrap());
        assert_eq!(class.id.to_string(), "Unit.class-counter");
        match class.type_ {
            ClassDecl::Arrow(None, TypeExpr::Constr(..), body) => match *body {
                ClassDecl::ClassType(ClassTypeExpr::Signature(csig)) => {
                    assert!(csig.self_.is_none());
                    match &csig.items[0] {
                        ClassSignatureItem::Method(m) => {
                            assert_eq!(m.id.to_string(), "Unit.class-counter.method-get");
                            assert!(m.virtual_);
                            assert!(!m.doc.is_absent());
                        }
                        other => panic!("expected method, got {:?}", other),
                    }
                }
                other => panic!("expected signature, got {:?}", other),
            },
            other => panic!("expected arrow, got {:?}", other),
        }
    }

    #[test]
    fn test_class_type_arrow_is_fatal() {
        let ids = IdGenerator::new();
        let int = tconstr(types::Path::pident(ids.create_predef("int")), vec![]);
        let expr = typedtree::ClassType::new(ClassTypeDesc::Tcty_arrow(
            ArgLabel::Nolabel,
            int,
            Box::new(class_signature(vec![])),
        ));
        let cltd = class_infos(&ids, "ct", expr);
        let root = root();

        let res = with_context(|cx| {
            read_class_type_declaration(cx, &ScopeEnv::new(), &root, &cltd).map(|_| ())
        });
        assert!(matches!(res, Err(LoadError::ClassArrowInSignature { .. })));
    }

    #[test]
    fn test_class_signature_fields() {
        let ids = IdGenerator::new();
        let base = ids.create("base");
        let int = tconstr(types::Path::pident(ids.create_predef("int")), vec![]);
        let mut count = field(ClassTypeFieldDesc::Tctf_val(
            "count".to_string(),
            MutableFlag::Mutable,
            VirtualFlag::Concrete,
            int.clone(),
        ));
        count.ctf_attributes = vec![doc_attr("Current count.")];
        let body = class_signature(vec![
            field(ClassTypeFieldDesc::Tctf_inherit(typedtree::ClassType::new(
                ClassTypeDesc::Tcty_constr(types::Path::pident(base.clone()), vec![]),
            ))),
            field(ClassTypeFieldDesc::Tctf_attribute(text_attr("State"))),
            count,
            field(ClassTypeFieldDesc::Tctf_constraint(tvar("a"), int)),
            field(ClassTypeFieldDesc::Tctf_attribute(doc_attr("not standalone"))),
        ]);
        let cltd = class_infos(&ids, "counter", body);
        let root = root();
        let base_id = root.child(IdentifierKind::ClassType, "base");
        let env = ScopeEnv::new().add(&base, base_id.clone(), Shape::Opaque);

        let class_type = with_context(|cx| read_class_type_declaration(cx, &env, &root, &cltd).unwrap());
        let items = match class_type.expr {
            ClassTypeExpr::Signature(csig) => csig.items,
            other => panic!("expected signature, got {:?}", other),
        };
        assert_eq!(items.len(), 4);
        assert_eq!(
            items[0],
            ClassSignatureItem::Inherit(ClassTypeExpr::Constr(Path::Resolved(base_id), vec![]))
        );
        assert!(matches!(items[1], ClassSignatureItem::Comment(CommentItem::Docs(_))));
        match &items[2] {
            ClassSignatureItem::InstanceVariable(v) => {
                assert_eq!(v.id.to_string(), "Unit.class-type-counter.instance-variable-count");
                assert!(v.mutable);
                assert!(!v.virtual_);
                assert!(!v.doc.is_absent());
            }
            other => panic!("expected instance variable, got {:?}", other),
        }
        match &items[3] {
            ClassSignatureItem::Constraint(TypeExpr::Var(a), TypeExpr::Constr(..)) => {
                assert_eq!(a.as_str(), "a")
            }
            other => panic!("expected constraint, got {:?}", other),
        }
    }
}
