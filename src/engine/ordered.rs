//! Queries that yield records sorted by an integer key.
//!
//! The key comes from a designated field whose value type implements
//! [`Orderable`]. Sorting needs every match up front, so an ordered pass first
//! materializes `(key, record)` pairs from the underlying [`Query`] and then
//! stable-sorts them: records with equal keys keep their query order.

use std::marker::PhantomData;

use crate::engine::entity::Entity;
use crate::engine::entry::Entry;
use crate::engine::error::{ECSError, ECSResult};
use crate::engine::filter::Filter;
use crate::engine::query::Query;
use crate::engine::types::ComponentID;
use crate::engine::world::World;

/// Field values that expose an ordering key.
pub trait Orderable {
    /// Sort key; smaller keys come first.
    fn order(&self) -> i64;
}

macro_rules! impl_orderable_for_integers {
    ($($ty:ty),*) => {
        $(impl Orderable for $ty {
            #[inline]
            fn order(&self) -> i64 { i64::from(*self) }
        })*
    };
}

impl_orderable_for_integers!(i8, i16, i32, i64, u8, u16, u32);

/// A [`Query`] whose passes are sorted by the [`Orderable`] key of a field of type `T`.
#[derive(Clone, Debug)]
pub struct OrderedQuery<T> {
    query: Query,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Orderable + 'static> OrderedQuery<T> {
    /// Creates an ordered query over `filter`.
    ///
    /// The filter should require the ordering field; archetypes it admits
    /// without that field make ordered passes fail with `FieldNotPresent`.
    pub fn new(filter: Filter) -> Self {
        Self { query: Query::new(filter), _marker: PhantomData }
    }

    /// The underlying unordered query.
    pub fn query(&mut self) -> &mut Query {
        &mut self.query
    }

    /// Number of matching records.
    pub fn count(&mut self, world: &World) -> usize {
        self.query.count(world)
    }

    fn sorted(&mut self, world: &World, field: ComponentID) -> ECSResult<Vec<Entity>> {
        let mut keyed: Vec<(i64, Entity)> = Vec::new();
        for &archetype_id in self.query.refresh(world) {
            let Some(archetype) = world.archetype(archetype_id) else { continue };
            if !archetype.has_field(field) {
                return Err(ECSError::FieldNotPresent { archetype_id, component_id: field });
            }
            let values = archetype.column_slice::<T>(field)?;
            keyed.extend(
                values
                    .iter()
                    .zip(archetype.entities())
                    .map(|(value, &entity)| (value.order(), entity)),
            );
        }
        keyed.sort_by_key(|&(key, _)| key);
        Ok(keyed.into_iter().map(|(_, entity)| entity).collect())
    }

    /// Yields every matching record in ascending key order.
    ///
    /// ## Errors
    /// - `FieldNotPresent` if a matched archetype lacks `field`.
    /// - `TypeMismatch` if `field` does not store `T`.
    pub fn iter_ordered<'w>(&mut self, world: &'w World, field: ComponentID) -> ECSResult<OrderedIter<'w>> {
        #[cfg(feature = "profiling")]
        let _span = tracing::info_span!("ordered_query.iter").entered();

        let entities = self.sorted(world, field)?;
        Ok(OrderedIter { world, entities: entities.into_iter() })
    }

    /// Calls `f` for every matching record in ascending key order.
    ///
    /// The order is fixed before the first call. Records destroyed by an
    /// earlier call are skipped.
    pub fn each_ordered<F>(&mut self, world: &mut World, field: ComponentID, mut f: F) -> ECSResult<()>
    where
        F: FnMut(&mut World, Entity),
    {
        #[cfg(feature = "profiling")]
        let _span = tracing::info_span!("ordered_query.each").entered();

        for entity in self.sorted(world, field)? {
            if world.is_alive(entity) {
                f(world, entity);
            }
        }
        Ok(())
    }
}

/// Sorted pass produced by [`OrderedQuery::iter_ordered`].
pub struct OrderedIter<'w> {
    world: &'w World,
    entities: std::vec::IntoIter<Entity>,
}

impl<'w> Iterator for OrderedIter<'w> {
    type Item = Entry<'w>;

    fn next(&mut self) -> Option<Entry<'w>> {
        self.entities.next().map(|entity| Entry::new(self.world, entity))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entities.size_hint()
    }
}

impl ExactSizeIterator for OrderedIter<'_> {}
