//! The signature loader.
//!
//! Translates the typed signature tree of one compilation unit into the
//! documentation model. The translation is a recursive descent that threads
//! a persistent [`ScopeEnv`] through every call:
//!
//! - [`env`] - scope environment and path/fragment resolution
//! - [`signature`] - signatures, modules, module types, includes
//! - [`decl`] - values, types, extensions, exceptions
//! - [`class`] - classes and class types
//! - [`type_expr`] - core types
//! - [`doc_attr`] - documentation attributes
//! - [`cmi`] - compiled signatures (`include` content, `module type of`)
//!
//! Documentation that fails to parse is kept in the output as
//! [`Doc::Failed`](crate::model::Doc::Failed). A malformed input tree aborts
//! the whole load with a [`LoadError`](crate::error::LoadError).

pub mod class;
pub mod cmi;
pub mod decl;
pub mod doc_attr;
pub mod env;
pub mod signature;
pub mod type_expr;

use crate::config::LoaderConfig;
use crate::error::LoadResult;
use crate::model::{Identifier, Interface};
use crate::types::typedtree;

pub use cmi::{CmiReader, CompiledReader};
pub use doc_attr::{DocParser, PlainDocParser};
pub use env::ScopeEnv;

/// Everything a translation needs besides the environment.
#[derive(Clone, Copy)]
pub struct LoadContext<'a> {
    pub config: &'a LoaderConfig,
    pub docs: &'a dyn DocParser,
    pub compiled: &'a dyn CompiledReader,
}

impl<'a> LoadContext<'a> {
    pub fn new(
        config: &'a LoaderConfig,
        docs: &'a dyn DocParser,
        compiled: &'a dyn CompiledReader,
    ) -> Self {
        LoadContext {
            config,
            docs,
            compiled,
        }
    }
}

/// Load the interface of `unit_name` in `root_name`.
pub fn read_interface(
    cx: &LoadContext<'_>,
    root_name: &str,
    unit_name: &str,
    sig: &typedtree::Signature,
) -> LoadResult<Interface> {
    log::debug!("Loading interface {}/{}", root_name, unit_name);
    let id = Identifier::root(root_name, unit_name);
    let sg = signature::read_signature(cx, &ScopeEnv::new(), &id, sig)?;
    Ok(Interface {
        id,
        doc: sg.doc,
        items: sg.items,
    })
}
