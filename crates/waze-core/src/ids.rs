//! Strongly typed, zero-cost identifier wrappers.
//!
//! `NodeId`/`EdgeId` are `Copy + Ord + Hash` so they can be used as map keys
//! and `Vec` indices without ceremony. `CarId` is kept separate because its
//! wire sentinel is the signed value `-1` ("no car in this report slot"),
//! which an unsigned `u32::MAX`-style `INVALID` can't represent on the wire.

use std::fmt;

/// Generate a typed ID wrapper around an unsigned primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        $vis struct $name(pub $inner);

        impl $name {
            /// Sentinel meaning "no valid ID".
            pub const INVALID: $name = $name(<$inner>::MAX);

            /// Cast to `usize` for direct use as a `Vec` index.
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl Default for $name {
            #[inline(always)]
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<$name> for usize {
            #[inline(always)]
            fn from(id: $name) -> usize {
                id.0 as usize
            }
        }

        impl TryFrom<usize> for $name {
            type Error = std::num::TryFromIntError;
            fn try_from(n: usize) -> Result<$name, Self::Error> {
                <$inner>::try_from(n).map($name)
            }
        }
    };
}

typed_id! {
    /// Index of a road-network node.
    pub struct NodeId(u32);
}

typed_id! {
    /// Index of a directed road-network edge.
    pub struct EdgeId(u32);
}

/// A simulated car's identifier.
///
/// Signed so the wire sentinel `-1` ("this report slot has no active car")
/// is representable directly, matching the traffic-report schema.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct CarId(pub i64);

impl CarId {
    /// Sentinel used in traffic reports for a slot with no active car.
    pub const NONE: CarId = CarId(-1);

    #[inline(always)]
    pub fn is_none(self) -> bool {
        self == Self::NONE
    }
}

impl fmt::Display for CarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CarId({})", self.0)
    }
}
