//! # Archetype storage
//!
//! An [`Archetype`] stores every record that shares one [`Layout`]. Storage is
//! column-major: one dense [`TypeErasedAttribute`] per field, all columns kept
//! in lock-step by row, plus a row→record array.
//!
//! ## Invariants
//! - `columns[i]` stores the field `layout.components()[i]`.
//! - Every column and `entities` have the same length.
//! - Rows are dense. Removing a row swaps the last row into the hole, so row
//!   order is only stable while nothing is removed.
//! - The layout never changes once the archetype exists.
//!
//! The archetype does not own the record index. Operations that move a record
//! into a different row report which record moved so the world can update the
//! index.

use std::any::{type_name, TypeId};

use crate::engine::component::make_empty_column;
use crate::engine::entity::Entity;
use crate::engine::error::{ECSError, ECSResult, TypeMismatchError};
use crate::engine::layout::Layout;
use crate::engine::storage::{Attribute, TypeErasedAttribute};
use crate::engine::types::{ArchetypeID, ComponentID, DynamicBundle, RowID};

/// Dense, column-oriented storage for all records with one layout.
pub struct Archetype {
    archetype_id: ArchetypeID,
    layout: Layout,
    columns: Vec<Box<dyn TypeErasedAttribute>>,
    entities: Vec<Entity>,
}

impl Archetype {
    /// Creates an empty archetype, allocating one column per field of `layout`.
    ///
    /// ## Errors
    /// `UnregisteredComponent` if any field has no registered column factory.
    pub fn new(archetype_id: ArchetypeID, layout: Layout) -> ECSResult<Self> {
        let columns = layout
            .components()
            .iter()
            .map(|&component_id| make_empty_column(component_id))
            .collect::<ECSResult<Vec<_>>>()?;

        Ok(Self { archetype_id, layout, columns, entities: Vec::new() })
    }

    /// Position of this archetype in the world's archetype list.
    #[inline]
    pub fn id(&self) -> ArchetypeID {
        self.archetype_id
    }

    /// The structural shape shared by every row.
    #[inline]
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Number of rows.
    #[inline]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns `true` if the archetype holds no rows.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Records in row order.
    #[inline]
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Record stored at `row`.
    #[inline]
    pub fn entity_at(&self, row: usize) -> Option<Entity> {
        self.entities.get(row).copied()
    }

    /// Returns `true` if `component_id` is part of the layout.
    #[inline]
    pub fn has_field(&self, component_id: ComponentID) -> bool {
        self.layout.has(component_id)
    }

    /// Type-erased column for `component_id`.
    pub fn column(&self, component_id: ComponentID) -> Option<&dyn TypeErasedAttribute> {
        let index = self.layout.index_of(component_id)?;
        Some(&*self.columns[index])
    }

    fn column_mut(&mut self, component_id: ComponentID) -> Option<&mut Box<dyn TypeErasedAttribute>> {
        let index = self.layout.index_of(component_id)?;
        Some(&mut self.columns[index])
    }

    fn field_not_present(&self, component_id: ComponentID) -> ECSError {
        ECSError::FieldNotPresent { archetype_id: self.archetype_id, component_id }
    }

    fn check_row(&self, row: usize) -> ECSResult<()> {
        if row < self.entities.len() {
            Ok(())
        } else {
            Err(ECSError::OutOfRange { row: row as RowID, length: self.entities.len() })
        }
    }

    /// Typed column view.
    ///
    /// ## Errors
    /// - `FieldNotPresent` if the field is not in the layout.
    /// - `TypeMismatch` if the column does not store `T`.
    pub fn column_slice<T: 'static>(&self, component_id: ComponentID) -> ECSResult<&[T]> {
        let column = self
            .column(component_id)
            .ok_or_else(|| self.field_not_present(component_id))?;
        column
            .as_any()
            .downcast_ref::<Attribute<T>>()
            .map(Attribute::as_slice)
            .ok_or_else(|| typed_mismatch::<T>(column).into())
    }

    fn typed_column_mut<T: 'static>(&mut self, component_id: ComponentID) -> ECSResult<&mut Attribute<T>> {
        let missing = self.field_not_present(component_id);
        let column = self.column_mut(component_id).ok_or(missing)?;
        let mismatch = typed_mismatch::<T>(&**column);
        column
            .as_any_mut()
            .downcast_mut::<Attribute<T>>()
            .ok_or(mismatch.into())
    }

    /// Reads the value of `component_id` at `row`.
    pub fn get_field<T: 'static>(&self, row: usize, component_id: ComponentID) -> ECSResult<&T> {
        let column = self.column_slice::<T>(component_id)?;
        self.check_row(row)?;
        Ok(&column[row])
    }

    /// Mutable access to the value of `component_id` at `row`.
    pub fn get_field_mut<T: 'static>(&mut self, row: usize, component_id: ComponentID) -> ECSResult<&mut T> {
        self.check_row(row)?;
        let column = self.typed_column_mut::<T>(component_id)?;
        let length = column.len();
        column
            .get_mut(row)
            .ok_or(ECSError::OutOfRange { row: row as RowID, length })
    }

    /// Overwrites the value of `component_id` at `row`.
    pub fn set_field<T: 'static>(&mut self, row: usize, component_id: ComponentID, value: T) -> ECSResult<()> {
        *self.get_field_mut::<T>(row, component_id)? = value;
        Ok(())
    }

    /// Appends a row for `entity` and returns its index.
    ///
    /// Fields with a value in `bundle` take that value; every other field is
    /// default-constructed. All bundle values are type-checked before any
    /// column is touched, so a failed push leaves the archetype unchanged.
    pub fn push_row<B: DynamicBundle>(&mut self, entity: Entity, bundle: &mut B) -> ECSResult<RowID> {
        for (index, &component_id) in self.layout.components().iter().enumerate() {
            if let Some(value) = bundle.peek(component_id) {
                self.columns[index].accepts(value)?;
            }
        }

        for (index, &component_id) in self.layout.components().iter().enumerate() {
            match bundle.take(component_id) {
                Some(value) => self.columns[index].push_dyn(value)?,
                None => self.columns[index].push_default(),
            }
        }

        self.entities.push(entity);
        self.debug_check_aligned();
        Ok((self.entities.len() - 1) as RowID)
    }

    /// Swap-removes `row`, dropping its values.
    ///
    /// Returns the record that was moved into `row`, if any; the caller must
    /// point that record's index entry at `row`.
    ///
    /// ## Errors
    /// `OutOfRange` if `row` is not a valid row.
    pub fn remove_row(&mut self, row: usize) -> ECSResult<Option<Entity>> {
        self.check_row(row)?;
        for column in &mut self.columns {
            column.swap_remove(row);
        }
        self.entities.swap_remove(row);
        self.debug_check_aligned();
        Ok(self.entities.get(row).copied())
    }

    /// Moves the record at `row` into `destination`.
    ///
    /// Fields present in both layouts are moved, fields only in `destination`
    /// are default-constructed, fields only in `self` are dropped.
    ///
    /// Returns the record's new row in `destination` and the record that was
    /// swapped into `row` here, if any.
    pub fn move_row_to(&mut self, row: usize, destination: &mut Archetype) -> ECSResult<(RowID, Option<Entity>)> {
        self.check_row(row)?;
        for (index, &component_id) in destination.layout.components().iter().enumerate() {
            if let Some(source) = self.layout.index_of(component_id) {
                let source_type = self.columns[source].element_type_id();
                let destination_type = destination.columns[index].element_type_id();
                if source_type != destination_type {
                    return Err(TypeMismatchError {
                        expected: destination_type,
                        actual: source_type,
                        expected_name: destination.columns[index].element_type_name(),
                        actual_name: self.columns[source].element_type_name(),
                    }
                    .into());
                }
            }
        }

        let entity = self.entities[row];
        for (index, &component_id) in destination.layout.components().iter().enumerate() {
            match self.layout.index_of(component_id) {
                Some(source) => self.columns[source].swap_remove_into(row, &mut *destination.columns[index])?,
                None => destination.columns[index].push_default(),
            }
        }
        for (index, &component_id) in self.layout.components().iter().enumerate() {
            if !destination.layout.has(component_id) {
                self.columns[index].swap_remove(row);
            }
        }

        self.entities.swap_remove(row);
        destination.entities.push(entity);
        self.debug_check_aligned();
        destination.debug_check_aligned();

        Ok(((destination.entities.len() - 1) as RowID, self.entities.get(row).copied()))
    }

    #[inline]
    fn debug_check_aligned(&self) {
        debug_assert!(
            self.columns.iter().all(|c| c.length() == self.entities.len()),
            "archetype {} columns out of lock-step",
            self.archetype_id
        );
    }
}

fn typed_mismatch<T: 'static>(column: &dyn TypeErasedAttribute) -> TypeMismatchError {
    TypeMismatchError {
        expected: column.element_type_id(),
        actual: TypeId::of::<T>(),
        expected_name: column.element_type_name(),
        actual_name: type_name::<T>(),
    }
}

impl std::fmt::Debug for Archetype {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Archetype")
            .field("id", &self.archetype_id)
            .field("layout", &self.layout)
            .field("len", &self.entities.len())
            .finish()
    }
}
