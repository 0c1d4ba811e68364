//! Registry error types.

use thiserror::Error;

/// Errors surfaced by [`ModuleContainer`](crate::ModuleContainer) operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModuleError {
    /// The call is not allowed in the container's current state.
    #[error("invalid module operation: {0}")]
    InvalidOperation(String),

    /// A required capability has no live or available provider.
    #[error("missing required module: {capability}")]
    MissingDependency { capability: &'static str },

    /// Registry bookkeeping is inconsistent; indicates a bug.
    #[error("module registry invariant violated: {0}")]
    InternalInvariant(String),
}

pub type ModuleResult<T> = Result<T, ModuleError>;
