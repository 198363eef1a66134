//! Structural shape of a record.
//!
//! A [`Layout`] is the exact set of component ids attached to a record, stored
//! sorted and deduplicated. Two layouts are equal iff they hold the same ids,
//! regardless of the order they were built from, which makes `Layout` usable
//! as the key that maps a shape to its archetype.

use std::fmt;

use crate::engine::types::ComponentID;

/// Immutable, sorted, deduplicated set of component ids.
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Layout {
    components: Box<[ComponentID]>,
}

impl Layout {
    /// Builds a layout from ids in any order, dropping duplicates.
    pub fn new(component_ids: &[ComponentID]) -> Self {
        Self::from_iter(component_ids.iter().copied())
    }

    /// The empty layout.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Component ids in ascending order.
    #[inline]
    pub fn components(&self) -> &[ComponentID] {
        &self.components
    }

    /// Number of component ids.
    #[inline]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Returns `true` for the empty layout.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Returns `true` if `component_id` is part of this layout.
    #[inline]
    pub fn has(&self, component_id: ComponentID) -> bool {
        self.components.binary_search(&component_id).is_ok()
    }

    /// Position of `component_id` in [`Layout::components`].
    #[inline]
    pub fn index_of(&self, component_id: ComponentID) -> Option<usize> {
        self.components.binary_search(&component_id).ok()
    }

    /// Returns `true` if every id of `other` is also in `self`.
    ///
    /// Linear merge walk over both sorted sets.
    pub fn contains_all(&self, other: &Layout) -> bool {
        if other.len() > self.len() {
            return false;
        }
        let mut mine = self.components.iter();
        'outer: for needed in other.components.iter() {
            for have in mine.by_ref() {
                if have == needed {
                    continue 'outer;
                }
                if have > needed {
                    return false;
                }
            }
            return false;
        }
        true
    }

    /// Returns `true` if every id of `self` is also in `other`.
    #[inline]
    pub fn is_subset_of(&self, other: &Layout) -> bool {
        other.contains_all(self)
    }

    /// Layout with `added` ids merged in.
    pub fn with(&self, added: &[ComponentID]) -> Layout {
        self.components.iter().chain(added.iter()).copied().collect()
    }

    /// Layout with `removed` ids taken out.
    pub fn without(&self, removed: &[ComponentID]) -> Layout {
        self.components
            .iter()
            .copied()
            .filter(|cid| !removed.contains(cid))
            .collect()
    }
}

impl FromIterator<ComponentID> for Layout {
    fn from_iter<I: IntoIterator<Item = ComponentID>>(iter: I) -> Self {
        let mut components: Vec<ComponentID> = iter.into_iter().collect();
        components.sort_unstable();
        components.dedup();
        Self { components: components.into_boxed_slice() }
    }
}

impl From<&[ComponentID]> for Layout {
    fn from(component_ids: &[ComponentID]) -> Self {
        Layout::new(component_ids)
    }
}

impl<const N: usize> From<[ComponentID; N]> for Layout {
    fn from(component_ids: [ComponentID; N]) -> Self {
        Layout::new(&component_ids)
    }
}

impl fmt::Debug for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.components.iter()).finish()
    }
}
