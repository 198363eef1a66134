//! Record identifiers and the record index.
//!
//! [`Entity`] packs a slot index and a generation counter into one `u64`.
//! [`Entities`] owns the per-slot state (generation, liveness, current
//! location) and recycles freed slots. A slot's generation is bumped whenever
//! the slot is released, so an identifier that outlives its record is rejected
//! by every lookup instead of silently resolving to whichever record reuses the
//! slot.

use crate::engine::error::CapacityError;
use crate::engine::types::{
    ArchetypeID, EntityID, IndexID, RowID, VersionID, ENTITY_GROWTH, INDEX_BITS, INDEX_CAP,
    INDEX_MASK,
};

/// Generation-checked record identifier.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Entity(pub EntityID);

#[inline]
const fn make_id(index: IndexID, version: VersionID) -> EntityID {
    ((version as EntityID) << INDEX_BITS) | (index as EntityID)
}

impl Entity {
    #[inline]
    pub(crate) fn new(index: IndexID, version: VersionID) -> Self {
        debug_assert!((index as EntityID) <= INDEX_MASK);
        Entity(make_id(index, version))
    }

    /// Slot index.
    #[inline]
    pub fn index(self) -> IndexID {
        (self.0 & INDEX_MASK) as IndexID
    }

    /// Generation of the slot when this identifier was issued.
    #[inline]
    pub fn version(self) -> VersionID {
        (self.0 >> INDEX_BITS) as VersionID
    }

    /// Raw packed value.
    #[inline]
    pub fn to_bits(self) -> EntityID {
        self.0
    }
}

impl std::fmt::Debug for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Entity({}v{})", self.index(), self.version())
    }
}

/// Where a live record is stored.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EntityLocation {
    /// Archetype holding the record.
    pub archetype: ArchetypeID,
    /// Row inside that archetype.
    pub row: RowID,
}

/// Record index: slot generations, liveness and locations.
///
/// ## Invariants
/// - `versions`, `alive` and `locations` always have the same length.
/// - A slot is in `free_store` iff it is not alive.
#[derive(Default, Debug)]
pub struct Entities {
    versions: Vec<VersionID>,
    alive: Vec<bool>,
    locations: Vec<EntityLocation>,
    free_store: Vec<IndexID>,
    live: usize,
}

impl Entities {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an index with `capacity` slots reserved up front.
    pub fn with_capacity(capacity: usize) -> Result<Self, CapacityError> {
        let mut entities = Self::default();
        entities.ensure_capacity(capacity)?;
        Ok(entities)
    }

    fn ensure_capacity(&mut self, additional: usize) -> Result<(), CapacityError> {
        if additional == 0 {
            return Ok(());
        }

        let current = self.versions.len() as u64;
        let needed = current + additional as u64;
        let capacity = INDEX_CAP as u64 + 1;
        if needed > capacity {
            return Err(CapacityError { what: "record", needed, capacity });
        }

        self.versions.resize(needed as usize, 0);
        self.alive.resize(needed as usize, false);
        self.locations.resize(needed as usize, EntityLocation::default());

        // Pushed in reverse so fresh slots are handed out in ascending order.
        self.free_store.extend((current..needed).rev().map(|index| index as IndexID));
        Ok(())
    }

    /// Allocates an identifier recorded at `location`.
    pub fn alloc(&mut self, location: EntityLocation) -> Result<Entity, CapacityError> {
        let index = match self.free_store.pop() {
            Some(index) => index,
            None => {
                let remaining = (INDEX_CAP as usize + 1).saturating_sub(self.versions.len());
                self.ensure_capacity(ENTITY_GROWTH.min(remaining).max(1))?;
                self.free_store.pop().ok_or(CapacityError {
                    what: "record",
                    needed: self.versions.len() as u64 + 1,
                    capacity: INDEX_CAP as u64 + 1,
                })?
            }
        };

        let slot = index as usize;
        self.alive[slot] = true;
        self.locations[slot] = location;
        self.live += 1;
        Ok(Entity::new(index, self.versions[slot]))
    }

    /// Releases `entity`'s slot. Returns `false` for stale or unknown identifiers.
    pub fn free(&mut self, entity: Entity) -> bool {
        if !self.is_alive(entity) {
            return false;
        }
        let slot = entity.index() as usize;
        self.versions[slot] = self.versions[slot].wrapping_add(1);
        self.alive[slot] = false;
        self.locations[slot] = EntityLocation::default();
        self.free_store.push(entity.index());
        self.live -= 1;
        true
    }

    /// Returns `true` if `entity` refers to a live record.
    #[inline]
    pub fn is_alive(&self, entity: Entity) -> bool {
        let slot = entity.index() as usize;
        self.alive.get(slot).copied().unwrap_or(false) && self.versions[slot] == entity.version()
    }

    /// Current location of `entity`, if it is live.
    #[inline]
    pub fn location(&self, entity: Entity) -> Option<EntityLocation> {
        self.is_alive(entity).then(|| self.locations[entity.index() as usize])
    }

    /// Records a new location for a live `entity`.
    pub fn set_location(&mut self, entity: Entity, location: EntityLocation) {
        debug_assert!(
            self.is_alive(entity),
            "set_location called on a dead or stale record {entity:?} -> {location:?}"
        );
        if self.is_alive(entity) {
            self.locations[entity.index() as usize] = location;
        }
    }

    /// Number of live records.
    #[inline]
    pub fn len(&self) -> usize {
        self.live
    }

    /// Returns `true` if no record is live.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }
}
