//! Compiler-internal identifiers.
//!
//! An [`Ident`] is what the front-end puts in its typed tree: a name plus a
//! stamp that disambiguates shadowed bindings. These are *not* the stable
//! documentation identifiers produced by the loader (see
//! [`crate::model::Identifier`]); the scope environment maps one to the other.
//!
//! # Example
//!
//! ```rust
//! use sigdoc::ident::{Ident, IdGenerator};
//!
//! let id_gen = IdGenerator::new();
//! let t1 = id_gen.create("t");
//! let t2 = id_gen.create("t");
//!
//! assert_eq!(t1.name(), t2.name());
//! assert!(!t1.same(&t2));
//! assert!(Ident::create_persistent("Stdlib").is_persistent());
//! ```

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicI32, Ordering};

/// Flags for identifier properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IdentFlags(u8);

impl IdentFlags {
    /// No flags set.
    pub const NONE: Self = Self(0);
    /// Identifier names a compilation unit.
    pub const GLOBAL: Self = Self(1);
    /// Identifier is a predefined type or exception (`int`, `list`, `Not_found`).
    pub const PREDEF: Self = Self(2);

    #[inline]
    pub fn is_global(self) -> bool {
        self.0 & Self::GLOBAL.0 != 0
    }

    #[inline]
    pub fn is_predef(self) -> bool {
        self.0 & Self::PREDEF.0 != 0
    }

    #[inline]
    pub fn with_global(self) -> Self {
        Self(self.0 | Self::GLOBAL.0)
    }

    #[inline]
    pub fn with_predef(self) -> Self {
        Self(self.0 | Self::PREDEF.0)
    }
}

/// A compiler-internal identifier with a name and stamp.
///
/// # Stamp Semantics
///
/// - `stamp > 0`: a local identifier bound somewhere in the typed tree
/// - `stamp = 0`: a persistent identifier naming another compilation unit
///
/// Two identifiers are the same when their non-zero stamps are equal, or
/// when both are persistent and have the same name.
#[derive(Clone, Serialize, Deserialize)]
pub struct Ident {
    name: SmolStr,
    stamp: i32,
    #[serde(default)]
    flags: IdentFlags,
}

impl Ident {
    /// Create an identifier with explicit stamp and flags.
    ///
    /// Prefer [`IdGenerator::create`] for fresh local identifiers.
    #[inline]
    pub fn new(name: impl Into<SmolStr>, stamp: i32, flags: IdentFlags) -> Self {
        Self {
            name: name.into(),
            stamp,
            flags,
        }
    }

    /// Create a persistent identifier (stamp 0) naming a compilation unit.
    #[inline]
    pub fn create_persistent(name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            stamp: 0,
            flags: IdentFlags::GLOBAL,
        }
    }

    /// Create the identifier of a predefined type or exception.
    ///
    /// Predefined identifiers carry a stamp like any local binding but are
    /// never bound in a signature; the loader maps them to core paths.
    #[inline]
    pub fn create_predef(name: impl Into<SmolStr>, stamp: i32) -> Self {
        Self {
            name: name.into(),
            stamp,
            flags: IdentFlags::PREDEF,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn stamp(&self) -> i32 {
        self.stamp
    }

    #[inline]
    pub fn flags(&self) -> IdentFlags {
        self.flags
    }

    /// Check if this is a persistent identifier (stamp = 0).
    #[inline]
    pub fn is_persistent(&self) -> bool {
        self.stamp == 0
    }

    #[inline]
    pub fn is_predef(&self) -> bool {
        self.flags.is_predef()
    }

    /// Check if two identifiers have the same name (ignoring stamp).
    #[inline]
    pub fn equal(&self, other: &Self) -> bool {
        self.name == other.name
    }

    /// Check if two identifiers denote the same binding.
    #[inline]
    pub fn same(&self, other: &Self) -> bool {
        if self.stamp != 0 {
            self.stamp == other.stamp
        } else {
            other.stamp == 0 && self.name == other.name
        }
    }
}

impl fmt::Debug for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.stamp {
            0 => write!(f, "{}!", self.name),
            n => {
                write!(f, "{}/{}", self.name, n)?;
                if self.is_predef() {
                    write!(f, "p")?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl PartialEq for Ident {
    fn eq(&self, other: &Self) -> bool {
        self.same(other)
    }
}

impl Eq for Ident {}

impl Hash for Ident {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Persistent identifiers are equal by name, local ones by stamp.
        if self.stamp == 0 {
            self.name.hash(state);
        } else {
            self.stamp.hash(state);
        }
    }
}

/// Thread-safe stamp generator for local identifiers.
///
/// Front-ends own one per compilation; tests use it to build fixtures.
#[derive(Debug)]
pub struct IdGenerator {
    next_stamp: AtomicI32,
}

impl IdGenerator {
    /// Create a generator with stamps starting at 1 (0 is reserved for persistent).
    pub fn new() -> Self {
        Self {
            next_stamp: AtomicI32::new(1),
        }
    }

    /// Create a generator starting at a specific stamp.
    pub fn with_start_stamp(start: i32) -> Self {
        Self {
            next_stamp: AtomicI32::new(start.max(1)),
        }
    }

    #[inline]
    pub fn next_stamp(&self) -> i32 {
        self.next_stamp.fetch_add(1, Ordering::Relaxed)
    }

    /// Create a fresh local identifier.
    pub fn create(&self, name: impl Into<SmolStr>) -> Ident {
        Ident::new(name, self.next_stamp(), IdentFlags::NONE)
    }

    /// Create a fresh predefined identifier.
    pub fn create_predef(&self, name: impl Into<SmolStr>) -> Ident {
        Ident::create_predef(name, self.next_stamp())
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_create_persistent() {
        let id = Ident::create_persistent("Stdlib");
        assert_eq!(id.name(), "Stdlib");
        assert!(id.is_persistent());
        assert!(id.flags().is_global());
        assert!(!id.is_predef());
    }

    #[test]
    fn test_create_with_generator() {
        let id_gen = IdGenerator::new();
        let id1 = id_gen.create("x");
        let id2 = id_gen.create("x");

        assert!(id1.equal(&id2));
        assert!(!id1.same(&id2));
        assert_ne!(id1.stamp(), id2.stamp());
    }

    #[test]
    fn test_same_persistent() {
        let id1 = Ident::create_persistent("Mod");
        let id2 = Ident::create_persistent("Mod");
        let id3 = Ident::create_persistent("Other");

        assert!(id1.same(&id2));
        assert!(!id1.same(&id3));
    }

    #[test]
    fn test_hash_agrees_with_eq() {
        let id_gen = IdGenerator::new();
        let x = id_gen.create("x");
        let mut set = HashSet::new();
        set.insert(x.clone());
        set.insert(Ident::create_persistent("M"));

        assert!(set.contains(&x));
        assert!(set.contains(&Ident::create_persistent("M")));
        assert!(!set.contains(&id_gen.create("x")));
    }

    #[test]
    fn test_debug_format() {
        let id_gen = IdGenerator::with_start_stamp(7);
        assert_eq!(format!("{:?}", id_gen.create("t")), "t/7");
        assert_eq!(format!("{:?}", id_gen.create_predef("int")), "int/8p");
        assert_eq!(format!("{:?}", Ident::create_persistent("M")), "M!");
    }
}
