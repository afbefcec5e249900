//! MeshError: unified error type for topomesh-core
//!
//! Most variants describe caller misuse (contract violations). Those are
//! never returned: the engine logs them and aborts through
//! [`contract_violation`], because a half-applied batch cannot be rolled back.
//! The remaining variants are ordinary recoverable errors.

use thiserror::Error;

use crate::element::{CptId, ElementId, MeshId};

/// Result type alias using MeshError.
pub type Result<T> = std::result::Result<T, MeshError>;

/// Unified error type for mesh operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MeshError {
    /// An element id that neither the change set nor the store knows.
    #[error("unknown element `{0}`")]
    UnknownElement(ElementId),

    /// The element was destroyed earlier in the same batch.
    #[error("element `{0}` no longer exists in this change set")]
    ElementDestroyed(ElementId),

    #[error("element `{0}` is not a node")]
    NotANode(ElementId),

    #[error("element `{0}` is not a link")]
    NotALink(ElementId),

    /// Links must join two distinct nodes.
    #[error("link would start and end at node `{0}`")]
    SelfLoop(ElementId),

    /// Two change records for different subjects were folded together.
    #[error("changes accumulate only over the same subject (`{expected}` vs `{found}`)")]
    MismatchedSubject { expected: String, found: String },

    /// Folded records do not chain (second previous state differs from first new state).
    #[error("cannot accumulate non-consecutive changes of `{0}`")]
    NonConsecutiveChange(String),

    /// An element that existed before the batch is not owned by any hinted mesh.
    #[error("element `{0}` existed before the batch but no hinted mesh owns it")]
    UnhintedElement(ElementId),

    /// A basic change set was committed to a store it was not computed against.
    #[error("change set was computed against store {expected_store} generation {expected_generation}, found store {found_store} generation {found_generation}")]
    StaleChangeSet {
        expected_store: u64,
        expected_generation: u64,
        found_store: u64,
        found_generation: u64,
    },

    /// Two live elements would hold the same connection point.
    #[error("connection point `{cpt}` is held by both `{first}` and `{second}`")]
    DuplicateConnectionPoint {
        cpt: CptId,
        first: ElementId,
        second: ElementId,
    },

    /// The connection point resolver had no entry for a live connection point.
    #[error("connection point `{0}` could not be resolved during commit")]
    ConnectionPointNotFound(CptId),

    /// A structural invariant of the committed partition does not hold.
    #[error("mesh `{mesh}` is invalid: {reason}")]
    InvalidMesh { mesh: MeshId, reason: String },

    /// The element locator disagrees with mesh membership.
    #[error("element `{element}` ownership is inconsistent: {reason}")]
    InvalidOwnership { element: ElementId, reason: String },

    /// Load state notifications are not handled by the mesher.
    #[error("load state handling is not implemented")]
    LoadStateUnsupported,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<serde_json::Error> for MeshError {
    fn from(err: serde_json::Error) -> Self {
        MeshError::InvalidConfig(err.to_string())
    }
}

/// Abort on caller misuse.
#[cold]
#[track_caller]
pub(crate) fn contract_violation(error: MeshError) -> ! {
    tracing::error!(%error, "mesh contract violated");
    panic!("{error}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_errors_convert() {
        let err: MeshError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, MeshError::InvalidConfig(_)));
    }

    #[test]
    #[should_panic(expected = "no longer exists")]
    fn contract_violations_panic_with_message() {
        contract_violation(MeshError::ElementDestroyed(ElementId::new()));
    }
}
