//! Identifiers
//!
//! Every identifier is drawn from a process-wide counter owned by its type.
//! Identifiers are never reused and cannot be built from a raw integer.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(u64);

        impl $name {
            /// Generate a new unique ID.
            pub fn new() -> Self {
                static COUNTER: AtomicU64 = AtomicU64::new(0);
                Self(COUNTER.fetch_add(1, Ordering::Relaxed))
            }

            /// Get the raw ID value.
            pub fn raw(&self) -> u64 {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "#{}"), self.0)
            }
        }
    };
}

define_id!(
    /// Unique identifier of a graph element (node or link).
    ElementId,
    "e"
);

define_id!(
    /// Unique identifier of a mesh.
    MeshId,
    "mesh"
);

define_id!(
    /// Unique identifier of a connection point.
    CptId,
    "cpt"
);

define_id!(
    /// Opaque medium tag.
    ///
    /// Media only compare by identity: two tags are the same medium iff they
    /// came from the same `Medium::new()` call.
    Medium,
    "medium"
);
