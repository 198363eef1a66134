//! Error types for record storage, migration and typed field access.
//!
//! Each failure mode gets a small, structured error. Low-level failures
//! (insufficient capacity, a typed access with the wrong element type) are
//! their own types and convert into the aggregate [`ECSError`] through `From`,
//! so engine code can use `?` throughout and callers still match on a single
//! enum.
//!
//! ## Taxonomy
//! * [`ECSError::UnknownRecord`]: the identifier's generation does not match
//!   live storage. Always recoverable; never corrupts world state.
//! * [`ECSError::FieldNotPresent`]: a field was addressed on an archetype
//!   whose layout does not carry it. Caller error.
//! * [`ECSError::OutOfRange`]: a row index past the end of an archetype.
//!   Indicates broken bookkeeping if it ever surfaces from the world.
//!
//! ## Display vs. Debug
//! `Display` messages are short and suitable for logs; the derived `Debug`
//! keeps the full structure.

use std::any::TypeId;

use thiserror::Error;

use crate::engine::entity::Entity;
use crate::engine::types::{ArchetypeID, ComponentID, RowID};

/// Convenience alias used across the engine.
pub type ECSResult<T> = Result<T, ECSError>;

/// Returned when a fixed-size pool (record slots, component ids) is exhausted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{what} limit reached ({needed} needed; capacity {capacity})")]
pub struct CapacityError {
    /// Which pool ran out.
    pub what: &'static str,

    /// Total the operation attempted to hold.
    pub needed: u64,

    /// Current upper bound that prevented the operation.
    pub capacity: u64,
}

/// Returned when a typed access names a type other than the column's element type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("type mismatch: column stores {expected_name}, got {actual_name}")]
pub struct TypeMismatchError {
    /// Element type declared by the column.
    pub expected: TypeId,

    /// Type supplied by the caller.
    pub actual: TypeId,

    /// Column element type name.
    pub expected_name: &'static str,

    /// Caller type name, when known.
    pub actual_name: &'static str,
}

/// Aggregate engine error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ECSError {
    /// The record was destroyed or never existed.
    #[error("stale or unknown record {0:?}")]
    UnknownRecord(Entity),

    /// The addressed field is not part of the archetype's layout.
    #[error("component {component_id} is not present in archetype {archetype_id}")]
    FieldNotPresent {
        /// Archetype that was addressed.
        archetype_id: ArchetypeID,

        /// Field that was requested.
        component_id: ComponentID,
    },

    /// A row index outside `0..length`.
    #[error("row {row} out of range (archetype length {length})")]
    OutOfRange {
        /// Row that was addressed.
        row: RowID,

        /// Number of rows in the archetype.
        length: usize,
    },

    /// Typed access with the wrong element type.
    #[error(transparent)]
    TypeMismatch(#[from] TypeMismatchError),

    /// No registry entry exists for this component id.
    #[error("component {0} is not registered")]
    UnregisteredComponent(ComponentID),

    /// The Rust type was never registered as a component.
    #[error("type {0} is not registered as a component")]
    UnregisteredType(&'static str),

    /// A fixed-size pool was exhausted.
    #[error(transparent)]
    Capacity(#[from] CapacityError),
}
