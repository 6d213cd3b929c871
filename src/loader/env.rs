//! Scope environment and path resolution.
//!
//! The environment maps compiler identifiers to documentation identifiers.
//! It is a persistent linked list: extending it returns a new `ScopeEnv`
//! sharing its tail with the old one, so sibling scopes never observe each
//! other's bindings.
//!
//! Next to each identifier the environment records a [`Shape`], the part of
//! a module's structure known without expanding anything. Projections like
//! `M.t` are resolved through it.

use crate::error::{LoadError, LoadResult};
use crate::ident::Ident;
use crate::longident::Longident;
use crate::model::{Fragment, Identifier, IdentifierKind, Path, PathKind};
use crate::types::{self, decl, typedtree};
use ahash::RandomState;
use indexmap::IndexMap;
use smol_str::SmolStr;
use std::sync::Arc;

// ============================================================================
// Shapes
// ============================================================================

/// Namespaces a module member can live in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    Module,
    ModuleType,
    Type,
    Class,
    ClassType,
}

impl Namespace {
    pub fn identifier_kind(self) -> IdentifierKind {
        match self {
            Namespace::Module => IdentifierKind::Module,
            Namespace::ModuleType => IdentifierKind::ModuleType,
            Namespace::Type => IdentifierKind::Type,
            Namespace::Class => IdentifierKind::Class,
            Namespace::ClassType => IdentifierKind::ClassType,
        }
    }

    /// Namespaces searched, in order, for the last component of a path.
    fn lookup_order(kind: PathKind) -> &'static [Namespace] {
        match kind {
            PathKind::Module => &[Namespace::Module],
            PathKind::ModuleType => &[Namespace::ModuleType],
            PathKind::Type => &[Namespace::Type, Namespace::Class, Namespace::ClassType],
            PathKind::ClassType => &[Namespace::Class, Namespace::ClassType],
        }
    }
}

pub type Members = IndexMap<(Namespace, SmolStr), Shape, RandomState>;

/// What is statically known about a module or module type.
#[derive(Debug, Clone, Default)]
pub enum Shape {
    #[default]
    Opaque,
    Signature(Arc<Members>),
    /// A module alias: members live under the target.
    Alias(Identifier, Arc<Shape>),
}

impl Shape {
    pub fn member_names(&self) -> Vec<(Namespace, SmolStr)> {
        match self {
            Shape::Opaque => Vec::new(),
            Shape::Signature(members) => members.keys().cloned().collect(),
            Shape::Alias(_, inner) => inner.member_names(),
        }
    }

    /// Drop members removed by a destructive substitution.
    fn without(self, removed: &[(Namespace, SmolStr)]) -> Shape {
        match self {
            Shape::Signature(members) if !removed.is_empty() => {
                let mut members = (*members).clone();
                for key in removed {
                    members.shift_remove(key);
                }
                Shape::Signature(Arc::new(members))
            }
            other => other,
        }
    }
}

/// Look `name` up among the members of `parent`, whose shape is `shape`.
fn project(
    parent: &Identifier,
    shape: &Shape,
    order: &[Namespace],
    name: &str,
) -> Option<(Identifier, Shape)> {
    match shape {
        Shape::Opaque => None,
        Shape::Alias(target, inner) => project(target, inner, order, name),
        Shape::Signature(members) => order.iter().find_map(|ns| {
            members
                .get(&(*ns, SmolStr::new(name)))
                .map(|shape| (parent.child(ns.identifier_kind(), name), shape.clone()))
        }),
    }
}

/// The signature a `with` constraint or package type is resolved against.
#[derive(Debug, Clone, Default)]
pub struct Subject {
    /// Identifier the subject's members are parented under, if known.
    pub origin: Option<Identifier>,
    pub shape: Shape,
}

// ============================================================================
// The Environment
// ============================================================================

#[derive(Debug)]
struct Binding {
    ident: Ident,
    id: Identifier,
    shape: Shape,
    next: Option<Arc<Binding>>,
}

#[derive(Debug, Clone, Default)]
pub struct ScopeEnv {
    head: Option<Arc<Binding>>,
    /// Set while translating the result of a functor.
    functor_parameter: Option<Identifier>,
}

impl ScopeEnv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `ident`, returning the extended environment.
    pub fn add(&self, ident: &Ident, id: Identifier, shape: Shape) -> ScopeEnv {
        ScopeEnv {
            head: Some(Arc::new(Binding {
                ident: ident.clone(),
                id,
                shape,
                next: self.head.clone(),
            })),
            functor_parameter: self.functor_parameter.clone(),
        }
    }

    /// Bind a functor parameter for the translation of the functor's result.
    pub fn add_functor_parameter(&self, ident: &Ident, id: Identifier, shape: Shape) -> ScopeEnv {
        let mut env = self.add(ident, id.clone(), shape);
        env.functor_parameter = Some(id);
        env
    }

    /// Identifier for the next parameter of a functor declared by `owner`.
    ///
    /// Inside the result of one of `owner`'s own parameters the numbering
    /// continues from that parameter; any other owner starts at 1.
    pub fn functor_argument(&self, owner: &Identifier, name: &str) -> Identifier {
        let position = match &self.functor_parameter {
            Some(param) if param.parent() == Some(owner) => param.position().map_or(1, |p| p + 1),
            _ => 1,
        };
        owner.argument(position, name)
    }

    fn find(&self, ident: &Ident) -> Option<&Binding> {
        let mut cursor = self.head.as_deref();
        while let Some(binding) = cursor {
            if binding.ident.same(ident) {
                return Some(binding);
            }
            cursor = binding.next.as_deref();
        }
        None
    }

    pub fn lookup(&self, ident: &Ident) -> Option<(&Identifier, &Shape)> {
        self.find(ident).map(|b| (&b.id, &b.shape))
    }

    // ------------------------------------------------------------------------
    // Paths
    // ------------------------------------------------------------------------

    pub fn resolve(&self, kind: PathKind, path: &types::Path) -> LoadResult<Path> {
        self.resolve_with_shape(kind, path).map(|(path, _)| path)
    }

    pub fn resolve_module_path(&self, path: &types::Path) -> LoadResult<Path> {
        self.resolve(PathKind::Module, path)
    }

    pub fn resolve_module_type_path(&self, path: &types::Path) -> LoadResult<Path> {
        self.resolve(PathKind::ModuleType, path)
    }

    pub fn resolve_type_path(&self, path: &types::Path) -> LoadResult<Path> {
        self.resolve(PathKind::Type, path)
    }

    pub fn resolve_class_type_path(&self, path: &types::Path) -> LoadResult<Path> {
        self.resolve(PathKind::ClassType, path)
    }

    fn resolve_with_shape(&self, kind: PathKind, path: &types::Path) -> LoadResult<(Path, Shape)> {
        match path {
            types::Path::Pident(ident) => {
                if ident.is_predef() {
                    return Ok((Path::Core(ident.name().into()), Shape::Opaque));
                }
                if ident.is_persistent() {
                    return Ok((Path::Root(ident.name().into()), Shape::Opaque));
                }
                match self.find(ident) {
                    Some(binding) => Ok((Path::Resolved(binding.id.clone()), binding.shape.clone())),
                    None => Err(LoadError::UnboundIdent {
                        ident: format!("{:?}", ident),
                    }),
                }
            }
            types::Path::Pdot(prefix, name) => {
                let (prefix, shape) = self.resolve_with_shape(PathKind::Module, prefix)?;
                let found = match &prefix {
                    Path::Resolved(parent) => {
                        project(parent, &shape, Namespace::lookup_order(kind), name)
                    }
                    _ => None,
                };
                Ok(match found {
                    Some((id, shape)) => (Path::Resolved(id), shape),
                    None => (prefix.dot(name.as_str()), Shape::Opaque),
                })
            }
            types::Path::Papply(functor, arg) => {
                let (functor, _) = self.resolve_with_shape(PathKind::Module, functor)?;
                let (arg, _) = self.resolve_with_shape(PathKind::Module, arg)?;
                Ok((Path::Apply(Box::new(functor), Box::new(arg)), Shape::Opaque))
            }
        }
    }

    // ------------------------------------------------------------------------
    // Fragments
    // ------------------------------------------------------------------------

    /// The subject named by a module type path, as in a package type.
    pub fn resolve_subject(&self, path: &types::Path) -> LoadResult<(Path, Subject)> {
        let (path, shape) = self.resolve_with_shape(PathKind::ModuleType, path)?;
        let origin = path.identifier().cloned();
        Ok((path, Subject { origin, shape }))
    }

    /// The subject of the constraints of `with`, for a body owned by `owner`.
    pub fn subject_of(&self, owner: &Identifier, mty: &typedtree::ModuleType) -> Subject {
        use typedtree::ModuleTypeDesc::*;
        match &mty.mty_desc {
            Tmty_ident(p) => match self.resolve_with_shape(PathKind::ModuleType, p) {
                Ok((path, shape)) => Subject {
                    origin: path.identifier().cloned(),
                    shape,
                },
                Err(_) => Subject::default(),
            },
            Tmty_signature(_) => Subject {
                origin: Some(owner.clone()),
                shape: self.module_type_shape(owner, mty),
            },
            Tmty_with(body, _) => self.subject_of(owner, body),
            _ => Subject {
                origin: None,
                shape: self.module_type_shape(owner, mty),
            },
        }
    }

    /// Resolve a constraint's left-hand side against its subject.
    pub fn resolve_fragment(&self, subject: &Subject, kind: PathKind, lid: &Longident) -> Fragment {
        let Some(parts) = lid.components() else {
            return Fragment::Root.dot(lid.last());
        };
        let dotted = || parts.iter().fold(Fragment::Root, |frag, part| frag.dot(*part));
        let (Some(origin), Some((last, prefix))) = (&subject.origin, parts.split_last()) else {
            return dotted();
        };

        let mut current = (origin.clone(), subject.shape.clone());
        for part in prefix {
            match project(&current.0, &current.1, &[Namespace::Module], part) {
                Some(next) => current = next,
                None => return dotted(),
            }
        }
        match project(&current.0, &current.1, Namespace::lookup_order(kind), last) {
            Some((id, _)) => Fragment::Resolved(id),
            None => dotted(),
        }
    }

    // ------------------------------------------------------------------------
    // Shapes of module types
    // ------------------------------------------------------------------------

    fn alias_shape(&self, path: &types::Path) -> Shape {
        match self.resolve_with_shape(PathKind::Module, path) {
            Ok((Path::Resolved(target), shape)) => Shape::Alias(target, Arc::new(shape)),
            _ => Shape::Opaque,
        }
    }

    /// Shape of a written module type. `parent` owns any inline signature.
    pub fn module_type_shape(&self, parent: &Identifier, mty: &typedtree::ModuleType) -> Shape {
        use typedtree::ModuleTypeDesc::*;
        match &mty.mty_desc {
            Tmty_ident(p) => self
                .resolve_with_shape(PathKind::ModuleType, p)
                .map(|(_, shape)| shape)
                .unwrap_or_default(),
            Tmty_signature(sig) => Shape::Signature(Arc::new(self.bind_signature(parent, sig).1)),
            Tmty_functor(_, _) => Shape::Opaque,
            Tmty_with(body, constraints) => {
                let removed: Vec<_> = constraints
                    .iter()
                    .filter_map(|(lid, constraint)| {
                        let ns = match constraint {
                            typedtree::WithConstraint::Twith_typesubst(_) => Namespace::Type,
                            typedtree::WithConstraint::Twith_modsubst(_) => Namespace::Module,
                            _ => return None,
                        };
                        match &lid.txt {
                            Longident::Lident(name) => Some((ns, SmolStr::new(name))),
                            _ => None,
                        }
                    })
                    .collect();
                self.module_type_shape(parent, body).without(&removed)
            }
            Tmty_typeof(mexpr) => self.compiled_module_type_shape(parent, &mexpr.mod_type),
            Tmty_alias(p) => self.alias_shape(p),
        }
    }

    /// Shape of a compiled module type.
    pub fn compiled_module_type_shape(&self, parent: &Identifier, mty: &decl::ModuleType) -> Shape {
        match mty {
            decl::ModuleType::MtyIdent(p) => self
                .resolve_with_shape(PathKind::ModuleType, p)
                .map(|(_, shape)| shape)
                .unwrap_or_default(),
            decl::ModuleType::MtySignature(sig) => {
                Shape::Signature(Arc::new(self.bind_compiled(parent, sig).1))
            }
            decl::ModuleType::MtyFunctor { .. } => Shape::Opaque,
            decl::ModuleType::MtyAlias(p) => self.alias_shape(p),
        }
    }

    // ------------------------------------------------------------------------
    // Binding signatures
    // ------------------------------------------------------------------------

    /// Bind every item `sig` declares under `parent`, before any of them is
    /// translated.
    pub fn add_signature_items(&self, parent: &Identifier, sig: &typedtree::Signature) -> ScopeEnv {
        self.bind_signature(parent, sig).0
    }

    /// Same as [`add_signature_items`](Self::add_signature_items) for a
    /// compiled signature.
    pub fn add_compiled_items(&self, parent: &Identifier, sig: &decl::Signature) -> ScopeEnv {
        self.bind_compiled(parent, sig).0
    }

    fn bind_signature(&self, parent: &Identifier, sig: &typedtree::Signature) -> (ScopeEnv, Members) {
        use typedtree::SignatureItemDesc::*;
        let mut env = self.clone();
        let mut members = Members::default();

        for item in &sig.sig_items {
            match &item.sig_desc {
                Tsig_type(_, decls) => {
                    for decl in decls {
                        let name = decl.typ_id.name();
                        env = env.add(&decl.typ_id, parent.child(IdentifierKind::Type, name), Shape::Opaque);
                        members.insert((Namespace::Type, name.into()), Shape::Opaque);
                    }
                }
                Tsig_typesubst(decls) => {
                    for decl in decls {
                        let id = parent.child(IdentifierKind::Type, decl.typ_id.name());
                        env = env.add(&decl.typ_id, id, Shape::Opaque);
                    }
                }
                Tsig_module(md) => {
                    let id = parent.child(IdentifierKind::Module, md.md_id.name());
                    let shape = env.module_type_shape(&id, &md.md_type);
                    env = env.add(&md.md_id, id, shape.clone());
                    members.insert((Namespace::Module, md.md_id.name().into()), shape);
                }
                Tsig_modsubst(ms) => {
                    let id = parent.child(IdentifierKind::Module, ms.ms_id.name());
                    let shape = env.alias_shape(&ms.ms_manifest);
                    env = env.add(&ms.ms_id, id, shape);
                }
                Tsig_recmodule(mds) => {
                    let ids: Vec<_> = mds
                        .iter()
                        .map(|md| parent.child(IdentifierKind::Module, md.md_id.name()))
                        .collect();
                    let group = mds
                        .iter()
                        .zip(&ids)
                        .fold(env.clone(), |group, (md, id)| group.add(&md.md_id, id.clone(), Shape::Opaque));
                    for (md, id) in mds.iter().zip(ids) {
                        let shape = group.module_type_shape(&id, &md.md_type);
                        env = env.add(&md.md_id, id, shape.clone());
                        members.insert((Namespace::Module, md.md_id.name().into()), shape);
                    }
                }
                Tsig_modtype(mtd) => {
                    let id = parent.child(IdentifierKind::ModuleType, mtd.mtd_id.name());
                    let shape = match &mtd.mtd_type {
                        Some(mty) => env.module_type_shape(&id, mty),
                        None => Shape::Opaque,
                    };
                    env = env.add(&mtd.mtd_id, id, shape.clone());
                    members.insert((Namespace::ModuleType, mtd.mtd_id.name().into()), shape);
                }
                Tsig_include(incl) => {
                    let (included, included_members) = env.bind_compiled(parent, &incl.incl_type);
                    env = included;
                    members.extend(included_members);
                }
                Tsig_class(classes) => {
                    for cls in classes {
                        let name = cls.ci_id_class.name();
                        let id = parent.child(IdentifierKind::Class, name);
                        for ident in [&cls.ci_id_class, &cls.ci_id_class_type, &cls.ci_id_object] {
                            env = env.add(ident, id.clone(), Shape::Opaque);
                        }
                        members.insert((Namespace::Class, name.into()), Shape::Opaque);
                    }
                }
                Tsig_class_type(class_types) => {
                    for clty in class_types {
                        let name = clty.ci_id_class_type.name();
                        let id = parent.child(IdentifierKind::ClassType, name);
                        for ident in [&clty.ci_id_class_type, &clty.ci_id_object] {
                            env = env.add(ident, id.clone(), Shape::Opaque);
                        }
                        members.insert((Namespace::ClassType, name.into()), Shape::Opaque);
                    }
                }
                Tsig_value(_) | Tsig_typext(_) | Tsig_exception(_) | Tsig_open(_)
                | Tsig_attribute(_) => {}
            }
        }
        (env, members)
    }

    fn bind_compiled(&self, parent: &Identifier, sig: &decl::Signature) -> (ScopeEnv, Members) {
        use decl::SignatureItem::*;
        let mut env = self.clone();
        let mut members = Members::default();

        for item in sig {
            let (ns, shape) = match item {
                SigType(..) => (Namespace::Type, Shape::Opaque),
                SigModule(ident, md, _) => {
                    let id = parent.child(IdentifierKind::Module, ident.name());
                    (Namespace::Module, env.compiled_module_type_shape(&id, &md.md_type))
                }
                SigModtype(ident, mtd) => {
                    let id = parent.child(IdentifierKind::ModuleType, ident.name());
                    let shape = match &mtd.mtd_type {
                        Some(mty) => env.compiled_module_type_shape(&id, mty),
                        None => Shape::Opaque,
                    };
                    (Namespace::ModuleType, shape)
                }
                SigClass(..) => (Namespace::Class, Shape::Opaque),
                SigClassType(..) => (Namespace::ClassType, Shape::Opaque),
                SigValue(..) | SigTypext(..) => continue,
            };
            let ident = item.ident();
            let id = parent.child(ns.identifier_kind(), ident.name());
            for companion in item.companion_idents() {
                env = env.add(companion, id.clone(), Shape::Opaque);
            }
            env = env.add(ident, id, shape.clone());
            members.insert((ns, ident.name().into()), shape);
        }
        (env, members)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ident::IdGenerator;
    use crate::testing::*;

    #[test]
    fn test_extension_leaves_parent_untouched() {
        let ids = IdGenerator::new();
        let t = ids.create("t");
        let root = root();
        let base = ScopeEnv::new();
        let extended = base.add(&t, root.child(IdentifierKind::Type, "t"), Shape::Opaque);

        assert!(base.lookup(&t).is_none());
        assert!(extended.lookup(&t).is_some());

        let u = ids.create("u");
        let sibling = base.add(&u, root.child(IdentifierKind::Type, "u"), Shape::Opaque);
        assert!(sibling.lookup(&t).is_none());
    }

    #[test]
    fn test_resolve_heads() {
        let ids = IdGenerator::new();
        let env = ScopeEnv::new();

        let int = types::Path::pident(ids.create_predef("int"));
        assert_eq!(env.resolve_type_path(&int).unwrap(), Path::Core("int".into()));

        let list_t = types::Path::pdot(
            types::Path::pident(Ident::create_persistent("List")),
            "t",
        );
        assert_eq!(
            env.resolve_type_path(&list_t).unwrap(),
            Path::Root("List".into()).dot("t")
        );

        let unbound = types::Path::pident(ids.create("t"));
        assert!(matches!(
            env.resolve_type_path(&unbound),
            Err(LoadError::UnboundIdent { .. })
        ));
    }

    #[test]
    fn test_resolve_through_module_shape() {
        let ids = IdGenerator::new();
        let m = ids.create("M");
        let t = ids.create("t");
        let sig = signature(vec![module_item(
            &m,
            signature_mty(vec![type_item(&t)]),
        )]);
        let root = root();
        let env = ScopeEnv::new().add_signature_items(&root, &sig);

        let path = types::Path::pdot(pident(&m), "t");
        let expected = root
            .child(IdentifierKind::Module, "M")
            .child(IdentifierKind::Type, "t");
        assert_eq!(env.resolve_type_path(&path).unwrap(), Path::Resolved(expected));

        let missing = types::Path::pdot(pident(&m), "u");
        assert_eq!(
            env.resolve_type_path(&missing).unwrap(),
            Path::Resolved(root.child(IdentifierKind::Module, "M")).dot("u")
        );
    }

    #[test]
    fn test_resolve_through_alias_and_module_type() {
        let ids = IdGenerator::new();
        let s = ids.create("S");
        let t = ids.create("t");
        let m = ids.create("M");
        let n = ids.create("N");
        let sig = signature(vec![
            modtype_item(&s, Some(signature_mty(vec![type_item(&t)]))),
            module_item(&m, ident_mty(pident(&s))),
            module_item(&n, alias_mty(pident(&m))),
        ]);
        let root = root();
        let env = ScopeEnv::new().add_signature_items(&root, &sig);
        let m_id = root.child(IdentifierKind::Module, "M");

        let via_m = types::Path::pdot(pident(&m), "t");
        assert_eq!(
            env.resolve_type_path(&via_m).unwrap(),
            Path::Resolved(m_id.child(IdentifierKind::Type, "t"))
        );

        let via_n = types::Path::pdot(pident(&n), "t");
        assert_eq!(
            env.resolve_type_path(&via_n).unwrap(),
            Path::Resolved(m_id.child(IdentifierKind::Type, "t"))
        );
    }

    #[test]
    fn test_resolve_fragment() {
        let ids = IdGenerator::new();
        let s = ids.create("S");
        let t = ids.create("t");
        let sig = signature(vec![modtype_item(&s, Some(signature_mty(vec![type_item(&t)])))]);
        let root = root();
        let env = ScopeEnv::new().add_signature_items(&root, &sig);
        let s_id = root.child(IdentifierKind::ModuleType, "S");

        let subject = env.subject_of(&root, &ident_mty(pident(&s)));
        assert_eq!(
            env.resolve_fragment(&subject, PathKind::Type, &Longident::lident("t")),
            Fragment::Resolved(s_id.child(IdentifierKind::Type, "t"))
        );
        assert_eq!(
            env.resolve_fragment(&subject, PathKind::Type, &Longident::parse("X.u")),
            Fragment::Root.dot("X").dot("u")
        );
        assert_eq!(
            env.resolve_fragment(&Subject::default(), PathKind::Type, &Longident::lident("t")),
            Fragment::Root.dot("t")
        );
    }

    #[test]
    fn test_functor_arguments_are_numbered_per_owner() {
        let ids = IdGenerator::new();
        let x = ids.create("X");
        let shadow = ids.create("X");
        let root = root();
        let f = root.child(IdentifierKind::Module, "F");
        let env = ScopeEnv::new();

        let outer = env.functor_argument(&f, "X");
        assert_eq!(outer, f.argument(1, "X"));
        let inner = env.add_functor_parameter(&x, outer.clone(), Shape::Opaque);
        assert_eq!(inner.resolve_module_path(&pident(&x)).unwrap(), Path::Resolved(outer.clone()));

        let second = inner.functor_argument(&f, "X");
        assert_eq!(second, f.argument(2, "X"));
        assert_ne!(second, outer);
        let innermost = inner.add_functor_parameter(&shadow, second.clone(), Shape::Opaque);
        assert_eq!(innermost.resolve_module_path(&pident(&shadow)).unwrap(), Path::Resolved(second));
        assert_eq!(innermost.resolve_module_path(&pident(&x)).unwrap(), Path::Resolved(outer));

        // a functor declared inside the result starts its own numbering
        let g = f.child(IdentifierKind::Module, "G");
        assert_eq!(innermost.functor_argument(&g, "Y"), g.argument(1, "Y"));
    }

    #[test]
    fn test_destructive_substitution_removes_member() {
        let ids = IdGenerator::new();
        let s = ids.create("S");
        let t = ids.create("t");
        let u = ids.create("u");
        let sig = signature(vec![modtype_item(
            &s,
            Some(signature_mty(vec![type_item(&t), type_item(&u)])),
        )]);
        let root = root();
        let env = ScopeEnv::new().add_signature_items(&root, &sig);

        let with = with_mty(
            ident_mty(pident(&s)),
            vec![(
                Longident::lident("t"),
                typedtree::WithConstraint::Twith_typesubst(type_decl_with_manifest(
                    &ids.create("t"),
                    tconstr(types::Path::pident(ids.create_predef("int")), vec![]),
                )),
            )],
        );
        let names = env.module_type_shape(&root, &with).member_names();
        assert_eq!(names, vec![(Namespace::Type, SmolStr::new("u"))]);
    }
}
