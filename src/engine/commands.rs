//! # Commands
//!
//! Deferred structural mutations.
//!
//! A read-only pass ([`Query::iter`](crate::engine::query::Query::iter))
//! borrows the world immutably, so it cannot create, destroy or reshape
//! records directly. Instead it records [`Command`] values into a
//! [`CommandBuffer`], which [`World::apply_commands`](crate::engine::world::World::apply_commands)
//! replays once the pass is over.
//!
//! ## Invariants
//! - Commands are applied in the order they were recorded.
//! - Target records must still be alive when their command is applied,
//!   otherwise application stops with `UnknownRecord`.

use crate::engine::entity::Entity;
use crate::engine::types::{Bundle, ComponentID};

/// A deferred structural mutation.
#[derive(Debug)]
pub enum Command {
    /// Creates a record whose layout is the bundle's component set.
    Create {
        /// Initial values.
        bundle: Bundle,
    },

    /// Destroys a record.
    Destroy {
        /// Record to destroy.
        entity: Entity,
    },

    /// Adds and removes fields on a record.
    ChangeShape {
        /// Record to migrate.
        entity: Entity,
        /// Fields to attach, default-initialised.
        add: Vec<ComponentID>,
        /// Fields to detach.
        remove: Vec<ComponentID>,
    },
}

/// Ordered list of pending [`Command`]s.
#[derive(Debug, Default)]
pub struct CommandBuffer {
    commands: Vec<Command>,
}

impl CommandBuffer {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an arbitrary command.
    pub fn push(&mut self, command: Command) {
        self.commands.push(command);
    }

    /// Records a record creation.
    pub fn create(&mut self, bundle: Bundle) {
        self.push(Command::Create { bundle });
    }

    /// Records a record destruction.
    pub fn destroy(&mut self, entity: Entity) {
        self.push(Command::Destroy { entity });
    }

    /// Records a shape change.
    pub fn change_shape(&mut self, entity: Entity, add: &[ComponentID], remove: &[ComponentID]) {
        self.push(Command::ChangeShape { entity, add: add.to_vec(), remove: remove.to_vec() });
    }

    /// Number of pending commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Returns `true` if nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub(crate) fn drain(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.commands)
    }
}
