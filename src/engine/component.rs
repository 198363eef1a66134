//! # Component Registry
//!
//! This module provides a process-global registry that assigns stable
//! `ComponentID` values to Rust component types and to data-less tags, and
//! exposes the type-erased column factories archetypes use to allocate storage.
//!
//! ## Design
//! - Components are registered once and assigned a compact `ComponentID` in
//!   `[0, COMPONENT_CAP)`. Registering the same type again returns the same id.
//! - Tags are allocated by name and always receive a fresh id. Their columns
//!   store the zero-sized [`Tag`], so they cost no memory per row.
//! - Each id carries a [`ComponentDesc`] and a factory producing an empty
//!   column. The factory is the only place where the element type is known
//!   statically; everything downstream works through `TypeErasedAttribute`.
//!
//! ## Invariants
//! - `ComponentID` values are unique and stable for the lifetime of the process.
//! - Every registered id has both a descriptor and a factory.
//!
//! ## Concurrency
//! The registry sits behind a `parking_lot::RwLock`; lookups take a shared lock.

use std::{
    any::{type_name, TypeId},
    collections::HashMap,
    mem::{align_of, size_of},
    sync::OnceLock,
};

use parking_lot::RwLock;

use crate::engine::error::{CapacityError, ECSError, ECSResult, TypeMismatchError};
use crate::engine::storage::{Attribute, TypeErasedAttribute};
use crate::engine::types::{ComponentID, COMPONENT_CAP};

/// Factory function for constructing an empty type-erased column.
pub type FactoryFn = fn() -> Box<dyn TypeErasedAttribute>;

/// Value stored in the column of a data-less tag.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tag;

/// Describes a registered component type or tag.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ComponentDesc {
    /// Runtime identifier assigned to this component.
    pub component_id: ComponentID,

    /// Rust type name, or the tag name for tags.
    pub name: &'static str,

    /// Runtime `TypeId` of the stored element type.
    pub type_id: TypeId,

    /// Size of the element type in bytes.
    pub size: usize,

    /// Alignment of the element type in bytes.
    pub align: usize,

    /// `true` for identifiers created by [`register_tag`].
    pub is_tag: bool,
}

impl ComponentDesc {
    /// Builds a descriptor for `T` with `component_id = 0`; finalize with [`ComponentDesc::with_id`].
    #[inline]
    pub fn of<T: 'static>() -> Self {
        Self {
            component_id: 0,
            name: type_name::<T>(),
            type_id: TypeId::of::<T>(),
            size: size_of::<T>(),
            align: align_of::<T>(),
            is_tag: false,
        }
    }

    /// Returns a copy with `component_id` set.
    #[inline]
    pub fn with_id(mut self, component_id: ComponentID) -> Self {
        self.component_id = component_id;
        self
    }

    /// Returns `true` if this descriptor's element type is `T`.
    #[inline]
    pub fn matches_type<T: 'static>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }
}

impl std::fmt::Display for ComponentDesc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ComponentDesc {{ id: {}, name: {}, size: {}, align: {}, tag: {} }}",
            self.component_id, self.name, self.size, self.align, self.is_tag
        )
    }
}

fn new_attribute_storage<T: Default + Send + Sync + 'static>() -> Box<dyn TypeErasedAttribute> {
    Box::new(Attribute::<T>::default())
}

struct Registration {
    desc: ComponentDesc,
    factory: FactoryFn,
}

/// Mapping between Rust types, tags and compact `ComponentID` values.
#[derive(Default)]
pub struct ComponentRegistry {
    by_type: HashMap<TypeId, ComponentID>,
    by_id: Vec<Registration>,
}

impl ComponentRegistry {
    fn alloc(&mut self, desc: ComponentDesc, factory: FactoryFn) -> ECSResult<ComponentID> {
        let next = self.by_id.len();
        if next >= COMPONENT_CAP {
            return Err(CapacityError {
                what: "component",
                needed: next as u64 + 1,
                capacity: COMPONENT_CAP as u64,
            }
            .into());
        }
        let component_id = next as ComponentID;
        self.by_id.push(Registration { desc: desc.with_id(component_id), factory });
        Ok(component_id)
    }

    /// Registers `T`, returning the existing id if it is already known.
    pub fn register<T: Default + Send + Sync + 'static>(&mut self) -> ECSResult<ComponentID> {
        let type_id = TypeId::of::<T>();
        if let Some(&existing) = self.by_type.get(&type_id) {
            return Ok(existing);
        }
        let component_id = self.alloc(ComponentDesc::of::<T>(), new_attribute_storage::<T>)?;
        self.by_type.insert(type_id, component_id);
        Ok(component_id)
    }

    /// Allocates a fresh tag identifier.
    pub fn register_tag(&mut self, name: &'static str) -> ECSResult<ComponentID> {
        let desc = ComponentDesc { name, is_tag: true, ..ComponentDesc::of::<Tag>() };
        self.alloc(desc, new_attribute_storage::<Tag>)
    }

    /// Returns the id registered for `type_id`.
    pub fn id_of_type_id(&self, type_id: TypeId) -> Option<ComponentID> {
        self.by_type.get(&type_id).copied()
    }

    /// Returns the descriptor for `component_id`.
    pub fn description(&self, component_id: ComponentID) -> Option<&ComponentDesc> {
        self.by_id.get(component_id as usize).map(|r| &r.desc)
    }

    /// Returns the column factory for `component_id`.
    pub fn factory(&self, component_id: ComponentID) -> Option<FactoryFn> {
        self.by_id.get(component_id as usize).map(|r| r.factory)
    }
}

static REGISTRY: OnceLock<RwLock<ComponentRegistry>> = OnceLock::new();

fn component_registry() -> &'static RwLock<ComponentRegistry> {
    REGISTRY.get_or_init(|| RwLock::new(ComponentRegistry::default()))
}

/// Registers component type `T` in the global registry and returns its id.
///
/// Idempotent: registering `T` again returns the same id.
pub fn register_component<T: Default + Send + Sync + 'static>() -> ECSResult<ComponentID> {
    component_registry().write().register::<T>()
}

/// Allocates a new data-less tag identifier.
///
/// Every call returns a distinct id, even for the same `name`.
pub fn register_tag(name: &'static str) -> ECSResult<ComponentID> {
    component_registry().write().register_tag(name)
}

/// Returns the registered id for `T`.
pub fn component_id_of<T: 'static>() -> ECSResult<ComponentID> {
    component_registry()
        .read()
        .id_of_type_id(TypeId::of::<T>())
        .ok_or(ECSError::UnregisteredType(type_name::<T>()))
}

/// Returns a copy of the descriptor for `component_id`.
pub fn component_description(component_id: ComponentID) -> ECSResult<ComponentDesc> {
    component_registry()
        .read()
        .description(component_id)
        .copied()
        .ok_or(ECSError::UnregisteredComponent(component_id))
}

/// Checks that values of type `actual` can be stored under `component_id`.
///
/// Lets the world reject a badly typed value before it allocates any
/// archetype for it.
pub fn ensure_element_type(component_id: ComponentID, actual: TypeId, actual_name: &'static str) -> ECSResult<()> {
    let desc = component_description(component_id)?;
    if desc.type_id == actual {
        return Ok(());
    }
    let expected_name = if desc.is_tag { type_name::<Tag>() } else { desc.name };
    Err(TypeMismatchError { expected: desc.type_id, actual, expected_name, actual_name }.into())
}

/// Creates an empty column for `component_id`.
pub fn make_empty_column(component_id: ComponentID) -> ECSResult<Box<dyn TypeErasedAttribute>> {
    let factory = component_registry()
        .read()
        .factory(component_id)
        .ok_or(ECSError::UnregisteredComponent(component_id))?;
    Ok(factory())
}
