//! Typed SSA values and their use-lists.
//!
//! A [`Value`] is produced exactly once, as a result or an inward (block
//! argument) of its owning operation, and consumed by any number of
//! operands. Every consuming operand is recorded as a [`Use`] entry on the
//! value, keeping the def-use graph navigable in both directions.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::operation::OpId;
use crate::types::Type;

/// Stable value handle into an operation tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValueId(pub u32);

impl fmt::Display for ValueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One consumption of a value: which operation uses it, at which operand
/// slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Use {
    pub user: OpId,
    pub operand_number: usize,
}

/// Whether a value is a result or an inward of its owner, and at which
/// index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueOrigin {
    Result(usize),
    Inward(usize),
}

/// Storage record of a value inside the arena.
#[derive(Debug, Clone)]
pub struct Value {
    pub ty: Type,
    pub owner: OpId,
    pub origin: ValueOrigin,
    pub uses: Vec<Use>,
}

impl Value {
    pub(crate) fn new(ty: Type, owner: OpId, origin: ValueOrigin) -> Self {
        Value {
            ty,
            owner,
            origin,
            uses: Vec::new(),
        }
    }
}
