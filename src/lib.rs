//! # Archetype Query
//!
//! In-memory record store that groups dynamically-typed records by their
//! exact set of components and retrieves them through composable, cached
//! layout filters.
//!
//! ## Design Goals
//! - Archetype-based columnar storage for cache-friendly scans
//! - Generation-checked record identifiers
//! - Append-only archetype list so query caches only ever grow
//! - Scans that stay sound while the callback mutates the world
//!
//! ```rust
//! use archetype_query::prelude::*;
//!
//! #[derive(Default)]
//! struct Health(u32);
//!
//! let health = register_component::<Health>().unwrap();
//! let enemy = register_tag("enemy").unwrap();
//!
//! let mut world = World::new();
//! world.create(&[health, enemy]).unwrap();
//! world.create(&[health]).unwrap();
//!
//! let mut enemies = Query::new(Filter::contains(&[enemy]));
//! assert_eq!(enemies.count(&world), 1);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod engine;

// ─────────────────────────────────────────────────────────────────────────────
// Re-exports (Public API)
// ─────────────────────────────────────────────────────────────────────────────

pub use engine::world::{World, WorldId};

pub use engine::entity::{Entity, EntityLocation};

pub use engine::entry::{Entry, EntryMut};

pub use engine::archetype::Archetype;

pub use engine::layout::Layout;

pub use engine::component::{
    ComponentDesc,
    Tag,
    register_component,
    register_tag,
    component_id_of,
    component_description,
};

pub use engine::filter::Filter;

pub use engine::query::{Query, QueryIter};

pub use engine::ordered::{Orderable, OrderedIter, OrderedQuery};

pub use engine::commands::{Command, CommandBuffer};

pub use engine::error::{
    ECSResult,
    ECSError,
    CapacityError,
    TypeMismatchError,
};

pub use engine::types::{
    ArchetypeID,
    Bundle,
    ComponentID,
    EntityID,
    RowID,
};

// ─────────────────────────────────────────────────────────────────────────────
// Prelude
// ─────────────────────────────────────────────────────────────────────────────

/// Commonly used types.
///
/// Import with:
/// ```rust
/// use archetype_query::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        World,
        Entity,
        Entry,
        EntryMut,
        Filter,
        Query,
        OrderedQuery,
        Orderable,
        Bundle,
        CommandBuffer,
        ComponentID,
        ECSError,
        ECSResult,
        register_component,
        register_tag,
        component_id_of,
    };
}
