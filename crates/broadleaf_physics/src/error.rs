//! Physics error types

use std::fmt;

use crate::dynamic_tree::ProxyId;

/// Error type for dynamic tree operations
#[derive(Debug, Clone, PartialEq)]
pub enum TreeError {
    /// The proxy id was removed, never issued, or its slot has been reused
    StaleProxy(ProxyId),
    /// A structural invariant does not hold (reported by `validate`)
    InvariantViolated(String),
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeError::StaleProxy(id) => write!(f, "Stale proxy id: {}", id),
            TreeError::InvariantViolated(msg) => write!(f, "Tree invariant violated: {}", msg),
        }
    }
}

impl std::error::Error for TreeError {}
