//! sigdoc - documentation model loader for typed signatures
//!
//! This crate turns the typed signature tree of one compilation unit, as
//! produced by a type checker, into a documentation model: every declaration
//! gets a stable hierarchical [`Identifier`], every reference is resolved to
//! one where the loader can tell statically, and documentation comments are
//! extracted and parsed.
//!
//! # Architecture
//!
//! - [`types`] - the input: typed signature tree and compiled signatures
//! - [`model`] - the output: identifiers, paths, type expressions, declarations
//! - [`loader`] - the translation, driven by an explicit [`LoadContext`]
//! - [`LoaderConfig`] - immutable configuration shared by all loads
//!
//! Loading is single-threaded and has no global state. The scope environment
//! is persistent, so nested scopes never observe each other's bindings.
//!
//! ```rust,ignore
//! use sigdoc::{CmiReader, LoadContext, LoaderConfig, PlainDocParser, read_interface};
//!
//! let config = LoaderConfig::default();
//! let cx = LoadContext::new(&config, &PlainDocParser, &CmiReader);
//! let interface = read_interface(&cx, "mylib", "Mylib", &signature)?;
//! ```

#![warn(rust_2018_idioms)]
#![allow(clippy::uninlined_format_args)]

pub mod config;
pub mod error;
pub mod ident;
pub mod loader;
pub mod location;
pub mod longident;
pub mod model;
pub mod names;
pub mod types;

#[cfg(test)]
mod testing;

// Re-exports for convenience
pub use config::LoaderConfig;
pub use error::{LoadError, LoadResult};
pub use loader::{
    CmiReader, CompiledReader, DocParser, LoadContext, PlainDocParser, read_interface,
};
pub use model::{Identifier, Interface};
