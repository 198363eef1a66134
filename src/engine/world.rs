//! # World
//!
//! The [`World`] owns every archetype and the record index and is the single
//! point of structural truth. All structural changes (create, destroy, shape
//! change) go through it so the index and the archetype rows never disagree.
//!
//! ## Archetype list
//! Archetypes are created lazily the first time a layout is needed and are
//! never removed or reordered. An archetype's position in [`World::archetypes`]
//! is its [`ArchetypeID`], which lets queries cache matches by position and
//! only scan the tail that appeared since their last pass.
//!
//! ## Failure model
//! Every mutation validates its inputs (record liveness, registered fields,
//! value types) before touching storage, so an operation either completes
//! entirely or returns an error with the world unchanged.

use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, trace};

use crate::engine::archetype::Archetype;
use crate::engine::commands::{Command, CommandBuffer};
use crate::engine::component::ensure_element_type;
use crate::engine::entity::{Entities, Entity, EntityLocation};
use crate::engine::entry::{Entry, EntryMut};
use crate::engine::error::{ECSError, ECSResult};
use crate::engine::layout::Layout;
use crate::engine::types::{ArchetypeID, Bundle, ComponentID, DynamicBundle, RowID};

static NEXT_WORLD_ID: AtomicU64 = AtomicU64::new(0);

/// Process-unique identifier of a [`World`] instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorldId(u64);

/// Owner of all archetypes and the record index.
pub struct World {
    id: WorldId,
    archetypes: Vec<Archetype>,
    archetype_index: HashMap<Layout, ArchetypeID>,
    entities: Entities,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    /// Creates an empty world.
    pub fn new() -> Self {
        Self {
            id: WorldId(NEXT_WORLD_ID.fetch_add(1, Ordering::Relaxed)),
            archetypes: Vec::new(),
            archetype_index: HashMap::new(),
            entities: Entities::new(),
        }
    }

    /// Creates an empty world with `capacity` record slots reserved.
    pub fn with_capacity(capacity: usize) -> ECSResult<Self> {
        Ok(Self { entities: Entities::with_capacity(capacity)?, ..Self::new() })
    }

    /// Identifier used by queries to keep per-world caches apart.
    #[inline]
    pub fn id(&self) -> WorldId {
        self.id
    }

    /// Number of live records.
    #[inline]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns `true` if no record is live.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Returns `true` if `entity` refers to a live record.
    #[inline]
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.entities.is_alive(entity)
    }

    /// Current location of `entity`.
    pub fn location(&self, entity: Entity) -> ECSResult<EntityLocation> {
        self.entities.location(entity).ok_or(ECSError::UnknownRecord(entity))
    }

    /// Every archetype created so far, in creation order.
    ///
    /// The list is append-only: positions are stable for the world's lifetime.
    #[inline]
    pub fn archetypes(&self) -> &[Archetype] {
        &self.archetypes
    }

    /// Archetype at position `archetype_id`.
    #[inline]
    pub fn archetype(&self, archetype_id: ArchetypeID) -> Option<&Archetype> {
        self.archetypes.get(archetype_id as usize)
    }

    /// Archetype holding exactly `layout`, if one has been created.
    pub fn archetype_for_layout(&self, layout: &Layout) -> Option<&Archetype> {
        self.archetype_index.get(layout).and_then(|&id| self.archetype(id))
    }

    /// Finds or lazily creates the archetype for `layout`.
    fn archetype_id_for(&mut self, layout: &Layout) -> ECSResult<ArchetypeID> {
        if let Some(&archetype_id) = self.archetype_index.get(layout) {
            return Ok(archetype_id);
        }

        let archetype_id = self.archetypes.len() as ArchetypeID;
        let archetype = Archetype::new(archetype_id, layout.clone())?;
        self.archetypes.push(archetype);
        self.archetype_index.insert(layout.clone(), archetype_id);
        debug!(archetype = archetype_id, ?layout, "created archetype");
        Ok(archetype_id)
    }

    fn spawn_in(&mut self, layout: Layout, mut bundle: Bundle) -> ECSResult<Entity> {
        for component_id in bundle.component_ids() {
            if let Some(value) = bundle.peek(component_id) {
                ensure_element_type(component_id, (*value).type_id(), "<dynamic>")?;
            }
        }

        let archetype_id = self.archetype_id_for(&layout)?;
        let row = self.archetypes[archetype_id as usize].len() as RowID;
        let entity = self.entities.alloc(EntityLocation { archetype: archetype_id, row })?;

        match self.archetypes[archetype_id as usize].push_row(entity, &mut bundle) {
            Ok(pushed) => {
                debug_assert_eq!(pushed, row);
                trace!(?entity, archetype = archetype_id, row, "created record");
                Ok(entity)
            }
            Err(error) => {
                self.entities.free(entity);
                Err(error)
            }
        }
    }

    /// Creates a record carrying exactly `components`, each default-initialised.
    ///
    /// Duplicate ids are ignored.
    ///
    /// ## Errors
    /// `UnregisteredComponent` if any id has no registry entry.
    pub fn create(&mut self, components: &[ComponentID]) -> ECSResult<Entity> {
        self.spawn_in(Layout::new(components), Bundle::new())
    }

    /// Creates a record whose layout is the set of ids in `bundle`, initialised
    /// with the bundle's values.
    ///
    /// ## Errors
    /// `TypeMismatch` if a value's type differs from its column's element type.
    /// Checked against the registry before any archetype is created.
    pub fn create_with(&mut self, bundle: Bundle) -> ECSResult<Entity> {
        let layout: Layout = bundle.component_ids().collect();
        self.spawn_in(layout, bundle)
    }

    /// Destroys `entity`, recycling its slot under a new generation.
    ///
    /// ## Errors
    /// `UnknownRecord` if `entity` is stale or never existed.
    pub fn destroy(&mut self, entity: Entity) -> ECSResult<()> {
        let location = self.location(entity)?;
        let moved = self.archetypes[location.archetype as usize].remove_row(location.row as usize)?;
        if let Some(moved) = moved {
            self.entities.set_location(moved, location);
        }
        self.entities.free(entity);
        trace!(?entity, archetype = location.archetype, "destroyed record");
        Ok(())
    }

    /// Adds and removes fields on `entity`, migrating it to the archetype for
    /// `(layout ∪ add) \ remove`.
    ///
    /// Values of fields kept by the migration are moved; added fields are
    /// default-initialised. A field named in both `add` and `remove` ends up
    /// removed. Nothing happens if the target layout equals the current one.
    pub fn change_shape(&mut self, entity: Entity, add: &[ComponentID], remove: &[ComponentID]) -> ECSResult<()> {
        let location = self.location(entity)?;
        let source_id = location.archetype;
        let target = self.archetypes[source_id as usize].layout().with(add).without(remove);
        if &target == self.archetypes[source_id as usize].layout() {
            return Ok(());
        }

        let destination_id = self.archetype_id_for(&target)?;
        let (source, destination) = pair_mut(&mut self.archetypes, source_id as usize, destination_id as usize);
        let (new_row, moved) = source.move_row_to(location.row as usize, destination)?;

        self.entities.set_location(entity, EntityLocation { archetype: destination_id, row: new_row });
        if let Some(moved) = moved {
            self.entities.set_location(moved, location);
        }
        trace!(?entity, from = source_id, to = destination_id, "migrated record");
        Ok(())
    }

    /// Attaches `component_id` to `entity` with `value`, migrating the record
    /// if the field is new. Overwrites the value if the field already exists.
    pub fn add_component<T: Any>(&mut self, entity: Entity, component_id: ComponentID, value: T) -> ECSResult<()> {
        let location = self.location(entity)?;
        if !self.archetypes[location.archetype as usize].has_field(component_id) {
            ensure_element_type(component_id, TypeId::of::<T>(), type_name::<T>())?;
            self.change_shape(entity, &[component_id], &[])?;
        }
        self.set(entity, component_id, value)
    }

    /// Detaches `component_id` from `entity`. No-op if the field is absent.
    pub fn remove_component(&mut self, entity: Entity, component_id: ComponentID) -> ECSResult<()> {
        self.change_shape(entity, &[], &[component_id])
    }

    /// Reads field `component_id` of `entity`.
    pub fn get<T: Any>(&self, entity: Entity, component_id: ComponentID) -> ECSResult<&T> {
        let location = self.location(entity)?;
        self.archetypes[location.archetype as usize].get_field::<T>(location.row as usize, component_id)
    }

    /// Mutable access to field `component_id` of `entity`.
    pub fn get_mut<T: Any>(&mut self, entity: Entity, component_id: ComponentID) -> ECSResult<&mut T> {
        let location = self.location(entity)?;
        self.archetypes[location.archetype as usize].get_field_mut::<T>(location.row as usize, component_id)
    }

    /// Overwrites field `component_id` of `entity`.
    pub fn set<T: Any>(&mut self, entity: Entity, component_id: ComponentID, value: T) -> ECSResult<()> {
        let location = self.location(entity)?;
        self.archetypes[location.archetype as usize].set_field(location.row as usize, component_id, value)
    }

    /// Returns `true` if `entity` currently carries `component_id`.
    pub fn has(&self, entity: Entity, component_id: ComponentID) -> ECSResult<bool> {
        let location = self.location(entity)?;
        Ok(self.archetypes[location.archetype as usize].has_field(component_id))
    }

    /// Read-only handle to `entity`.
    pub fn entry(&self, entity: Entity) -> ECSResult<Entry<'_>> {
        self.location(entity)?;
        Ok(Entry::new(self, entity))
    }

    /// Mutable handle to `entity`.
    pub fn entry_mut(&mut self, entity: Entity) -> ECSResult<EntryMut<'_>> {
        self.location(entity)?;
        Ok(EntryMut::new(self, entity))
    }

    /// Applies every command in `buffer` in recording order and clears it.
    ///
    /// Returns the records created by `Create` commands. Stops at the first
    /// failing command; commands before it remain applied and the rest of the
    /// buffer is discarded.
    pub fn apply_commands(&mut self, buffer: &mut CommandBuffer) -> ECSResult<Vec<Entity>> {
        let commands = buffer.drain();
        debug!(commands = commands.len(), "applying deferred commands");

        let mut created = Vec::new();
        for command in commands {
            match command {
                Command::Create { bundle } => created.push(self.create_with(bundle)?),
                Command::Destroy { entity } => self.destroy(entity)?,
                Command::ChangeShape { entity, add, remove } => self.change_shape(entity, &add, &remove)?,
            }
        }
        Ok(created)
    }
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("id", &self.id)
            .field("records", &self.entities.len())
            .field("archetypes", &self.archetypes)
            .finish()
    }
}

/// Mutable references to two distinct elements of `items`.
fn pair_mut<T>(items: &mut [T], a: usize, b: usize) -> (&mut T, &mut T) {
    debug_assert_ne!(a, b, "pair_mut needs distinct indices");
    if a < b {
        let (left, right) = items.split_at_mut(b);
        (&mut left[a], &mut right[0])
    } else {
        let (left, right) = items.split_at_mut(a);
        (&mut right[0], &mut left[b])
    }
}
