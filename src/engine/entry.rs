//! Record handles.
//!
//! An [`Entry`] or [`EntryMut`] is bound to a record identifier, not to a
//! storage position. Every access goes back through the world's record index,
//! so a handle stays usable across unrelated structural changes (other records
//! being destroyed or migrated, new archetypes appearing) and starts returning
//! `UnknownRecord` once its own record is destroyed.

use std::any::Any;

use crate::engine::archetype::Archetype;
use crate::engine::entity::Entity;
use crate::engine::error::ECSResult;
use crate::engine::layout::Layout;
use crate::engine::types::ComponentID;
use crate::engine::world::World;

/// Shared handle to one record.
#[derive(Clone, Copy)]
pub struct Entry<'w> {
    world: &'w World,
    entity: Entity,
}

impl<'w> Entry<'w> {
    pub(crate) fn new(world: &'w World, entity: Entity) -> Self {
        Self { world, entity }
    }

    /// The record identifier.
    #[inline]
    pub fn entity(&self) -> Entity {
        self.entity
    }

    /// Returns `true` while the record is alive.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.world.is_alive(self.entity)
    }

    /// Archetype currently holding the record.
    pub fn archetype(&self) -> ECSResult<&'w Archetype> {
        let location = self.world.location(self.entity)?;
        Ok(&self.world.archetypes()[location.archetype as usize])
    }

    /// Layout of the record.
    pub fn layout(&self) -> ECSResult<&'w Layout> {
        Ok(self.archetype()?.layout())
    }

    /// Returns `true` if the record carries `component_id`.
    pub fn has(&self, component_id: ComponentID) -> ECSResult<bool> {
        self.world.has(self.entity, component_id)
    }

    /// Reads field `component_id`.
    pub fn get<T: Any>(&self, component_id: ComponentID) -> ECSResult<&'w T> {
        self.world.get::<T>(self.entity, component_id)
    }
}

impl std::fmt::Debug for Entry<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Entry").field(&self.entity).finish()
    }
}

/// Exclusive handle to one record.
pub struct EntryMut<'w> {
    world: &'w mut World,
    entity: Entity,
}

impl<'w> EntryMut<'w> {
    pub(crate) fn new(world: &'w mut World, entity: Entity) -> Self {
        Self { world, entity }
    }

    /// The record identifier.
    #[inline]
    pub fn entity(&self) -> Entity {
        self.entity
    }

    /// Returns `true` while the record is alive.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.world.is_alive(self.entity)
    }

    /// Shared view of the same record.
    pub fn as_entry(&self) -> Entry<'_> {
        Entry::new(self.world, self.entity)
    }

    /// Layout of the record.
    pub fn layout(&self) -> ECSResult<&Layout> {
        let location = self.world.location(self.entity)?;
        Ok(self.world.archetypes()[location.archetype as usize].layout())
    }

    /// Returns `true` if the record carries `component_id`.
    pub fn has(&self, component_id: ComponentID) -> ECSResult<bool> {
        self.world.has(self.entity, component_id)
    }

    /// Reads field `component_id`.
    pub fn get<T: Any>(&self, component_id: ComponentID) -> ECSResult<&T> {
        self.world.get::<T>(self.entity, component_id)
    }

    /// Mutable access to field `component_id`.
    pub fn get_mut<T: Any>(&mut self, component_id: ComponentID) -> ECSResult<&mut T> {
        self.world.get_mut::<T>(self.entity, component_id)
    }

    /// Overwrites field `component_id`.
    pub fn set<T: Any>(&mut self, component_id: ComponentID, value: T) -> ECSResult<()> {
        self.world.set(self.entity, component_id, value)
    }

    /// Attaches `component_id` with `value`, migrating the record if needed.
    pub fn add<T: Any>(&mut self, component_id: ComponentID, value: T) -> ECSResult<()> {
        self.world.add_component(self.entity, component_id, value)
    }

    /// Detaches `component_id`.
    pub fn remove_component(&mut self, component_id: ComponentID) -> ECSResult<()> {
        self.world.remove_component(self.entity, component_id)
    }

    /// Adds and removes several fields in one migration.
    pub fn change_shape(&mut self, add: &[ComponentID], remove: &[ComponentID]) -> ECSResult<()> {
        self.world.change_shape(self.entity, add, remove)
    }

    /// Destroys the record.
    pub fn remove(self) -> ECSResult<()> {
        self.world.destroy(self.entity)
    }
}

impl std::fmt::Debug for EntryMut<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("EntryMut").field(&self.entity).finish()
    }
}
