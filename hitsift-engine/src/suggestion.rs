//! Externally visible suggestion records.

use crate::attribute::{AttributeKind, AttributeValue};
use serde::Serialize;

/// One proposed rule value for an attribute.
///
/// For IP attributes `value` is a subnet and `score` the reciprocal of its
/// compression cost; for discrete attributes `score` is the share of hits
/// carrying `value`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Suggestion {
    pub attribute: AttributeKind,
    pub value: AttributeValue,
    pub size: u64,
    pub score: f64,
}

impl Suggestion {
    pub fn new(attribute: AttributeKind, value: AttributeValue, size: u64, score: f64) -> Self {
        Self {
            attribute,
            value,
            size,
            score,
        }
    }
}
