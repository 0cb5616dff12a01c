//! Index types for mesh elements.
//!
//! Every mesh entity lives in an index-addressed arena and is referred to by a
//! type-safe id. Arena slots are never freed, so ids stay stable for the whole
//! lifetime of the mesh; deactivated entities keep their slot as a tombstone.
//! `u32::MAX` is reserved as the invalid/null sentinel, which stands in for
//! absent links such as the missing mate of a boundary half-edge.

use std::fmt::{self, Debug};

/// A type-safe vertex index.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct VertexId(u32);

/// A type-safe half-edge index.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct HalfEdgeId(u32);

/// A type-safe face index.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct FaceId(u32);

/// A type-safe edge index (for full edges, not half-edges).
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct EdgeId(u32);

macro_rules! impl_index_type {
    ($name:ident, $display:literal) => {
        impl $name {
            /// Create a new index from a raw value.
            #[inline]
            pub fn new(index: usize) -> Self {
                debug_assert!(index < u32::MAX as usize, "index {} too large", index);
                Self(index as u32)
            }

            /// Create an invalid/null index.
            #[inline]
            pub fn invalid() -> Self {
                Self(u32::MAX)
            }

            /// Get the raw index value.
            #[inline]
            pub fn index(self) -> usize {
                self.0 as usize
            }

            /// Check if this is a valid (non-null) index.
            #[inline]
            pub fn is_valid(self) -> bool {
                self.0 != u32::MAX
            }
        }

        impl Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.is_valid() {
                    write!(f, "{}({})", $display, self.index())
                } else {
                    write!(f, "{}(INVALID)", $display)
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::invalid()
            }
        }
    };
}

impl_index_type!(VertexId, "V");
impl_index_type!(HalfEdgeId, "HE");
impl_index_type!(FaceId, "F");
impl_index_type!(EdgeId, "E");
