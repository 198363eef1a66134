//! Core identifiers, bit layouts, and value bundles.
//!
//! This module defines the small, copyable numeric types shared by every other
//! part of the engine: record identifiers, component identifiers, archetype
//! identifiers and row indices. It also defines [`Bundle`], the type-erased
//! container used to hand initial component values to the world.
//!
//! ## Record representation
//!
//! Records are encoded as a packed 64-bit integer:
//!
//! ```text
//! | version | index |
//! ```
//!
//! - **Index** identifies the slot in the record index.
//! - **Version** is bumped every time the slot is released so stale
//!   identifiers can be told apart from the record that reuses the slot.
//!
//! The bit widths are compile-time constants checked by static assertions.
//!
//! ## Configuration
//!
//! Capacities are fixed here rather than read at runtime:
//!
//! - [`COMPONENT_CAP`] bounds the number of registered component types,
//! - [`ENTITY_GROWTH`] is the number of record slots reserved at a time,
//! - [`INDEX_BITS`] bounds the number of simultaneously allocated slots.

use std::any::Any;

/// Bit-width type used for compile-time layout calculations.
pub type Bits = u8;

/// Packed record identifier (`version | index`).
pub type EntityID = u64;
/// Slot index inside the record index.
pub type IndexID = u32;
/// Generation counter used to detect stale records.
pub type VersionID = u32;

/// Total number of bits in an [`EntityID`].
pub const ENTITY_BITS: Bits = 64;
/// Number of bits reserved for the generation counter.
pub const VERSION_BITS: Bits = 32;
/// Number of bits reserved for the slot index.
pub const INDEX_BITS: Bits = ENTITY_BITS - VERSION_BITS;

const _: [(); 1] = [(); (VERSION_BITS < ENTITY_BITS) as usize];
const _: [(); 1] = [(); (INDEX_BITS > 0) as usize];
const _: [(); 1] = [(); (INDEX_BITS <= 32) as usize];

const fn mask(bits: Bits) -> EntityID {
    if bits == 0 { 0 } else if bits >= 64 { EntityID::MAX } else { ((1 as EntityID) << bits) - 1 }
}

/// Mask selecting the index portion of an [`EntityID`].
pub const INDEX_MASK: EntityID = mask(INDEX_BITS);
/// Largest slot index that can be handed out.
pub const INDEX_CAP: IndexID = INDEX_MASK as IndexID;

/// Number of record slots reserved whenever the free list runs dry.
pub const ENTITY_GROWTH: usize = 1024;

/// Position of an archetype in the world's append-only archetype list.
pub type ArchetypeID = u32;
/// Row index inside an archetype.
pub type RowID = u32;

/// Identifier for a registered component type or tag.
pub type ComponentID = u16;

/// Maximum number of registered component types and tags.
pub const COMPONENT_CAP: usize = 4096;

/// Type-erased source of component values.
pub trait DynamicBundle {
    /// Removes and returns the value for `component_id`, if present.
    fn take(&mut self, component_id: ComponentID) -> Option<Box<dyn Any + Send>>;

    /// Returns a reference to the value for `component_id`, if present.
    fn peek(&self, component_id: ComponentID) -> Option<&(dyn Any + Send)>;
}

/// Sparse set of initial component values used when creating a record.
///
/// Inserting the same component twice keeps the last value.
#[derive(Default)]
pub struct Bundle {
    values: Vec<(ComponentID, Box<dyn Any + Send>)>,
}

impl Bundle {
    /// Creates an empty bundle.
    #[inline]
    pub fn new() -> Self {
        Self { values: Vec::new() }
    }

    /// Inserts a component value, replacing any previous value for the same id.
    pub fn insert<T: Any + Send>(&mut self, component_id: ComponentID, value: T) {
        let boxed: Box<dyn Any + Send> = Box::new(value);
        match self.values.iter_mut().find(|(cid, _)| *cid == component_id) {
            Some(slot) => slot.1 = boxed,
            None => self.values.push((component_id, boxed)),
        }
    }

    /// Builder-style [`Bundle::insert`].
    #[inline]
    pub fn with<T: Any + Send>(mut self, component_id: ComponentID, value: T) -> Self {
        self.insert(component_id, value);
        self
    }

    /// Component ids carried by this bundle, in insertion order.
    pub fn component_ids(&self) -> impl Iterator<Item = ComponentID> + '_ {
        self.values.iter().map(|(cid, _)| *cid)
    }

    /// Number of values in the bundle.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if the bundle holds no values.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl DynamicBundle for Bundle {
    #[inline]
    fn take(&mut self, component_id: ComponentID) -> Option<Box<dyn Any + Send>> {
        let index = self.values.iter().position(|(cid, _)| *cid == component_id)?;
        let (_, value) = self.values.swap_remove(index);
        Some(value)
    }

    #[inline]
    fn peek(&self, component_id: ComponentID) -> Option<&(dyn Any + Send)> {
        self.values
            .iter()
            .find(|(cid, _)| *cid == component_id)
            .map(|(_, value)| value.as_ref())
    }
}

impl std::fmt::Debug for Bundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bundle")
            .field("components", &self.component_ids().collect::<Vec<_>>())
            .finish()
    }
}
