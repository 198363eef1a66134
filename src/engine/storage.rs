//! Dense column storage and its type-erased interface.
//!
//! Every field of an archetype is stored in an [`Attribute<T>`]: a contiguous,
//! densely packed column of `T` values addressed by row. Archetypes hold their
//! columns behind [`TypeErasedAttribute`] so a single archetype can own columns
//! of unrelated types without being generic.
//!
//! # Core operations
//!
//! - **Append**: `push`, `push_default`, `push_dyn` write one value at the end.
//! - **Remove**: `swap_remove` deletes a row in `O(1)` by moving the last value
//!   into the freed slot.
//! - **Transfer**: `swap_remove_into` moves a row into another column of the same
//!   element type, used when a record migrates between archetypes.
//!
//! These operations keep columns dense but do **not** preserve row order.
//!
//! # Type erasure
//!
//! Typed access goes through `as_any` / `as_any_mut` downcasting. Every dynamic
//! entry point verifies the element type before touching storage and reports a
//! [`TypeMismatchError`] instead of panicking.

use std::any::{type_name, Any, TypeId};

use crate::engine::error::TypeMismatchError;

/// Type-erased view of a single column.
///
/// ## Invariants
/// - The column holds exactly `length()` initialised values.
/// - Failed operations leave the column unchanged.
pub trait TypeErasedAttribute: Any + Send + Sync {
    /// Number of stored values.
    fn length(&self) -> usize;

    /// Immutable `Any` view, for downcasting to `Attribute<T>`.
    fn as_any(&self) -> &dyn Any;

    /// Mutable `Any` view, for downcasting to `Attribute<T>`.
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// `TypeId` of the element type.
    fn element_type_id(&self) -> TypeId;

    /// Name of the element type, for diagnostics.
    fn element_type_name(&self) -> &'static str;

    /// Appends a default-constructed value.
    fn push_default(&mut self);

    /// Appends a boxed value after checking its dynamic type.
    fn push_dyn(&mut self, value: Box<dyn Any + Send>) -> Result<(), TypeMismatchError>;

    /// Checks that `value` could be pushed into this column.
    fn accepts(&self, value: &(dyn Any + Send)) -> Result<(), TypeMismatchError>;

    /// Removes the value at `row`, moving the last value into its place.
    ///
    /// Returns `false` if `row` is out of bounds.
    fn swap_remove(&mut self, row: usize) -> bool;

    /// Swap-removes the value at `row` and appends it to `destination`.
    ///
    /// `destination` must store the same element type. Nothing is modified on error.
    fn swap_remove_into(
        &mut self,
        row: usize,
        destination: &mut dyn TypeErasedAttribute,
    ) -> Result<(), TypeMismatchError>;
}

/// Dense column of `T` values.
#[derive(Debug, Clone)]
pub struct Attribute<T> {
    values: Vec<T>,
}

impl<T> Default for Attribute<T> {
    fn default() -> Self {
        Self { values: Vec::new() }
    }
}

impl<T> Attribute<T> {
    /// Number of stored values.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if the column is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Appends `value` and returns its row.
    #[inline]
    pub fn push(&mut self, value: T) -> usize {
        self.values.push(value);
        self.values.len() - 1
    }

    /// Returns the value at `row`.
    #[inline]
    pub fn get(&self, row: usize) -> Option<&T> {
        self.values.get(row)
    }

    /// Returns the value at `row` mutably.
    #[inline]
    pub fn get_mut(&mut self, row: usize) -> Option<&mut T> {
        self.values.get_mut(row)
    }

    /// Removes and returns the value at `row`, filling the hole with the last value.
    #[inline]
    pub fn swap_remove(&mut self, row: usize) -> Option<T> {
        (row < self.values.len()).then(|| self.values.swap_remove(row))
    }

    /// Dense slice of every stored value, in row order.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.values
    }
}

fn mismatch<T: 'static>(actual: TypeId, actual_name: &'static str) -> TypeMismatchError {
    TypeMismatchError {
        expected: TypeId::of::<T>(),
        actual,
        expected_name: type_name::<T>(),
        actual_name,
    }
}

impl<T: Default + Send + Sync + 'static> TypeErasedAttribute for Attribute<T> {
    fn length(&self) -> usize { self.values.len() }

    fn as_any(&self) -> &dyn Any { self }
    fn as_any_mut(&mut self) -> &mut dyn Any { self }

    fn element_type_id(&self) -> TypeId { TypeId::of::<T>() }
    fn element_type_name(&self) -> &'static str { type_name::<T>() }

    fn push_default(&mut self) {
        self.values.push(T::default());
    }

    fn push_dyn(&mut self, value: Box<dyn Any + Send>) -> Result<(), TypeMismatchError> {
        let actual = (*value).type_id();
        match value.downcast::<T>() {
            Ok(value) => {
                self.values.push(*value);
                Ok(())
            }
            Err(_) => Err(mismatch::<T>(actual, "<dynamic>")),
        }
    }

    fn accepts(&self, value: &(dyn Any + Send)) -> Result<(), TypeMismatchError> {
        let actual = value.type_id();
        if actual == TypeId::of::<T>() {
            Ok(())
        } else {
            Err(mismatch::<T>(actual, "<dynamic>"))
        }
    }

    fn swap_remove(&mut self, row: usize) -> bool {
        Attribute::swap_remove(self, row).is_some()
    }

    fn swap_remove_into(
        &mut self,
        row: usize,
        destination: &mut dyn TypeErasedAttribute,
    ) -> Result<(), TypeMismatchError> {
        let destination_type = destination.element_type_id();
        let destination_name = destination.element_type_name();
        let Some(destination) = destination.as_any_mut().downcast_mut::<Attribute<T>>() else {
            return Err(mismatch::<T>(destination_type, destination_name));
        };
        if let Some(value) = Attribute::swap_remove(self, row) {
            destination.values.push(value);
        }
        Ok(())
    }
}
