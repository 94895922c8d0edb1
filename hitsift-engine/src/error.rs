//! Error types for the suggestion engine.

use crate::address::{Address, AddressFamily};
use crate::attribute::AttributeKind;
use thiserror::Error;

/// Errors from a suggestion request.
///
/// Every variant is a caller error: the engine performs no I/O, so nothing
/// here is worth retrying.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SuggestError {
    #[error("hit #{index} has no {kind} attribute")]
    MissingAttribute { kind: AttributeKind, index: usize },

    #[error("{kind} value {value} is not an IP address")]
    NotAnAddress { kind: AttributeKind, value: String },

    #[error("cannot mix {expected} and {found} addresses in one {kind} column")]
    MixedAddressFamily {
        kind: AttributeKind,
        expected: AddressFamily,
        found: AddressFamily,
    },

    #[error("{kind} value {address} is a subnet, not a host address")]
    NotAHost { kind: AttributeKind, address: Address },

    #[error("address layer did not converge after {passes} passes ({nodes} nodes left)")]
    LayerDidNotConverge { passes: u32, nodes: usize },

    #[error("rule weight must be positive and finite, got {0}")]
    InvalidRuleWeight(f64),

    #[error("amount must not be negative, got {0}")]
    InvalidAmount(i64),

    #[error("max threads must be at least 1, got {0}")]
    InvalidMaxThreads(usize),

    #[error("unknown attribute: {0}")]
    UnknownAttribute(String),

    #[error("deadline exceeded after {passes} compression passes")]
    DeadlineExceeded { passes: u32 },
}

/// Result alias for engine operations.
pub type Result<T> = std::result::Result<T, SuggestError>;
