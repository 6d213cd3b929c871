//! Variance of type parameters in a compiled signature.
//!
//! Compiled declarations record *computed* variance as a bitset rather than
//! the annotation the author wrote. The loader turns it back into an
//! annotation: a parameter that may only occur positively is shown as `+`,
//! one that may only occur negatively as `-`, anything else unannotated.

use super::asttypes::{Injectivity, VarianceAnnotation};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Variance flags stored as a bitfield.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Variance(u8);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarianceFlag {
    /// May appear in positive (covariant) positions
    MayPos,
    /// May appear in negative (contravariant) positions
    MayNeg,
    /// May be weakly polymorphic
    MayWeak,
    /// Injective
    Inj,
    /// Definitely appears in positive positions
    Pos,
    /// Definitely appears in negative positions
    Neg,
    /// Invariant
    Inv,
}

impl VarianceFlag {
    fn bit(self) -> u8 {
        match self {
            VarianceFlag::MayPos => 1,
            VarianceFlag::MayNeg => 2,
            VarianceFlag::MayWeak => 4,
            VarianceFlag::Inj => 8,
            VarianceFlag::Pos => 16,
            VarianceFlag::Neg => 32,
            VarianceFlag::Inv => 64,
        }
    }
}

impl Variance {
    pub const NULL: Variance = Variance(0);

    /// All flags set: what the type checker records for an invariant parameter.
    pub const FULL: Variance = Variance(127);

    pub fn covariant() -> Self {
        Variance(VarianceFlag::MayPos.bit() | VarianceFlag::Pos.bit() | VarianceFlag::Inj.bit())
    }

    pub fn contravariant() -> Self {
        Variance(VarianceFlag::MayNeg.bit() | VarianceFlag::Neg.bit() | VarianceFlag::Inj.bit())
    }

    #[inline]
    pub fn set(&self, flag: VarianceFlag, value: bool) -> Self {
        if value {
            Variance(self.0 | flag.bit())
        } else {
            Variance(self.0 & !flag.bit())
        }
    }

    #[inline]
    pub fn mem(&self, flag: VarianceFlag) -> bool {
        (self.0 & flag.bit()) != 0
    }

    /// The annotation an author would have written for this variance.
    pub fn annotation(&self) -> VarianceAnnotation {
        match (self.mem(VarianceFlag::MayPos), self.mem(VarianceFlag::MayNeg)) {
            (true, false) => VarianceAnnotation::Covariant,
            (false, true) => VarianceAnnotation::Contravariant,
            _ => VarianceAnnotation::NoVariance,
        }
    }

    pub fn injectivity(&self) -> Injectivity {
        if self.mem(VarianceFlag::Inj) {
            Injectivity::Injective
        } else {
            Injectivity::NoInjectivity
        }
    }

    #[inline]
    pub fn from_bits(bits: u8) -> Self {
        Variance(bits)
    }
}

impl fmt::Display for Variance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.annotation() {
            VarianceAnnotation::Covariant => write!(f, "+"),
            VarianceAnnotation::Contravariant => write!(f, "-"),
            VarianceAnnotation::NoVariance => Ok(()),
        }
    }
}
