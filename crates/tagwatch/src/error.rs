//! Client errors.

#![allow(missing_docs)]

use smol_str::SmolStr;
use thiserror::Error;

/// Errors surfaced by the monitor core and its data-source adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// Node address failed to parse.
    #[error("invalid node id '{0}'")]
    InvalidNodeId(SmolStr),

    /// Adapter has no active session.
    #[error("not connected")]
    NotConnected,

    /// Transport-level read/write failure.
    #[error("transport error '{0}'")]
    Transport(SmolStr),

    /// Malformed caller input, rejected before it reaches the registry.
    #[error("invalid input '{0}'")]
    InvalidInput(SmolStr),

    /// Configuration error.
    #[error("invalid config '{0}'")]
    InvalidConfig(SmolStr),
}
