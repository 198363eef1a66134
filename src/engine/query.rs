//! Cached, filter-bound queries.
//!
//! A [`Query`] binds a [`Filter`] and remembers, per world, which archetypes
//! matched plus how far into the world's archetype list it has looked. Since
//! archetypes are never removed and their layouts never change, that cache only
//! grows: each pass evaluates the filter against archetypes created since the
//! previous pass and nothing else.
//!
//! ## Execution model
//! 1. Refresh the cache against the world's archetype list.
//! 2. Copy the matched archetype ids (the snapshot for this pass).
//! 3. Visit archetypes in cache order, rows in row order.
//!
//! ## Re-entrancy
//! [`Query::iter`] borrows the world immutably, so the borrow checker already
//! rules out structural changes while it runs; nested read-only queries are
//! fine. [`Query::each`] hands its callback `&mut World` instead. It copies
//! the identifiers of every matching record before the first call and checks
//! liveness before each one, so migrations and swap-removals done by the
//! callback can neither repeat nor hide a record. Records that appear during
//! a pass are not visited by that pass.

use std::collections::HashMap;

use tracing::trace;

use crate::engine::archetype::Archetype;
use crate::engine::entity::Entity;
use crate::engine::entry::Entry;
use crate::engine::filter::Filter;
use crate::engine::types::ArchetypeID;
use crate::engine::world::{World, WorldId};

#[derive(Clone, Debug, Default)]
struct ArchetypeCache {
    matched: Vec<ArchetypeID>,
    next_unscanned: usize,
}

/// Filter plus per-world cache of matching archetypes.
#[derive(Clone, Debug)]
pub struct Query {
    filter: Filter,
    caches: HashMap<WorldId, ArchetypeCache>,
}

impl Query {
    /// Creates a query; no archetype is evaluated until first use.
    pub fn new(filter: Filter) -> Self {
        Self { filter, caches: HashMap::new() }
    }

    /// The bound filter.
    #[inline]
    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    /// Evaluates the filter against archetypes created since the last refresh
    /// for this world and returns every matching archetype id.
    ///
    /// Idempotent: with no new archetypes it does no filter work.
    pub fn refresh(&mut self, world: &World) -> &[ArchetypeID] {
        let cache = self.caches.entry(world.id()).or_default();
        let archetypes = world.archetypes();
        if cache.next_unscanned < archetypes.len() {
            let before = cache.matched.len();
            for archetype in &archetypes[cache.next_unscanned..] {
                if self.filter.matches(archetype.layout()) {
                    cache.matched.push(archetype.id());
                }
            }
            trace!(
                scanned = archetypes.len() - cache.next_unscanned,
                matched = cache.matched.len() - before,
                "refreshed query cache"
            );
            cache.next_unscanned = archetypes.len();
        }
        &cache.matched
    }

    /// Matching archetype ids, refreshed against `world`.
    pub fn matched_archetypes(&mut self, world: &World) -> &[ArchetypeID] {
        self.refresh(world)
    }

    /// Lazily yields a handle for every matching record.
    ///
    /// Each call is a fresh pass over a snapshot of the matched archetypes.
    pub fn iter<'w>(&mut self, world: &'w World) -> QueryIter<'w> {
        #[cfg(feature = "profiling")]
        let _span = tracing::info_span!("query.iter").entered();

        let archetypes = self.refresh(world).to_vec();
        QueryIter { world, archetypes: archetypes.into_iter(), rows: [].iter() }
    }

    /// Calls `f` once for every matching record, passing the world mutably.
    ///
    /// The callback may create, destroy or reshape records and run other
    /// queries. Every record that matched when the pass started is visited
    /// exactly once unless the callback destroys it first, regardless of
    /// where later migrations move it. Records created during the pass are
    /// not visited.
    pub fn each<F>(&mut self, world: &mut World, mut f: F)
    where
        F: FnMut(&mut World, Entity),
    {
        #[cfg(feature = "profiling")]
        let _span = tracing::info_span!("query.each").entered();

        for entity in self.snapshot(world) {
            if world.is_alive(entity) {
                f(world, entity);
            }
        }
    }

    /// Identifiers of every matching record, in archetype then row order.
    fn snapshot(&mut self, world: &World) -> Vec<Entity> {
        let matched = self.refresh(world);
        let mut entities = Vec::with_capacity(
            matched.iter().filter_map(|&id| world.archetype(id)).map(Archetype::len).sum(),
        );
        for archetype in matched.iter().filter_map(|&id| world.archetype(id)) {
            entities.extend_from_slice(archetype.entities());
        }
        entities
    }

    /// Number of matching records. Does not allocate.
    pub fn count(&mut self, world: &World) -> usize {
        self.refresh(world)
            .iter()
            .filter_map(|&id| world.archetype(id))
            .map(Archetype::len)
            .sum()
    }

    /// First row of the first non-empty matching archetype.
    pub fn first<'w>(&mut self, world: &'w World) -> Option<Entry<'w>> {
        self.refresh(world)
            .iter()
            .filter_map(|&id| world.archetype(id))
            .find_map(|archetype| archetype.entity_at(0))
            .map(|entity| Entry::new(world, entity))
    }

    /// Identifiers of every matching record, in iteration order.
    pub fn entities(&mut self, world: &World) -> Vec<Entity> {
        self.snapshot(world)
    }
}

/// Lazy pass over the records of a [`Query`].
pub struct QueryIter<'w> {
    world: &'w World,
    archetypes: std::vec::IntoIter<ArchetypeID>,
    rows: std::slice::Iter<'w, Entity>,
}

impl<'w> Iterator for QueryIter<'w> {
    type Item = Entry<'w>;

    fn next(&mut self) -> Option<Entry<'w>> {
        loop {
            if let Some(&entity) = self.rows.next() {
                return Some(Entry::new(self.world, entity));
            }
            let archetype_id = self.archetypes.next()?;
            self.rows = match self.world.archetype(archetype_id) {
                Some(archetype) => archetype.entities().iter(),
                None => [].iter(),
            };
        }
    }
}

impl std::iter::FusedIterator for QueryIter<'_> {}
