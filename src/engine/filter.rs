//! Layout filters.
//!
//! A [`Filter`] is a pure predicate over a [`Layout`]. Because an archetype's
//! layout never changes, a filter's verdict on an archetype never changes
//! either, which is what lets [`Query`](crate::engine::query::Query) cache
//! matching archetypes forever.
//!
//! ```ignore
//! let hungry_agents = Filter::contains(&[agent, hunger]) & !Filter::contains(&[dead]);
//! let movers = Filter::contains(&[velocity]) | Filter::contains(&[force]);
//! ```

use std::ops::{BitAnd, BitOr, Not};

use crate::engine::layout::Layout;
use crate::engine::types::ComponentID;

/// Composable predicate over a layout.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Filter {
    /// Layout is a superset of the given set. `Contains` of the empty set
    /// matches every layout.
    Contains(Layout),
    /// Negation.
    Not(Box<Filter>),
    /// Conjunction. Empty matches every layout.
    And(Vec<Filter>),
    /// Disjunction. Empty matches no layout.
    Or(Vec<Filter>),
}

impl Filter {
    /// Matches layouts carrying every id in `components`.
    pub fn contains(components: &[ComponentID]) -> Self {
        Filter::Contains(Layout::new(components))
    }

    /// Matches layouts `filter` rejects.
    #[allow(clippy::should_implement_trait)]
    pub fn not(filter: Filter) -> Self {
        Filter::Not(Box::new(filter))
    }

    /// Matches layouts every filter accepts.
    pub fn and(filters: impl IntoIterator<Item = Filter>) -> Self {
        Filter::And(filters.into_iter().collect())
    }

    /// Matches layouts at least one filter accepts.
    pub fn or(filters: impl IntoIterator<Item = Filter>) -> Self {
        Filter::Or(filters.into_iter().collect())
    }

    /// Evaluates the filter. Composites short-circuit.
    pub fn matches(&self, layout: &Layout) -> bool {
        match self {
            Filter::Contains(required) => layout.contains_all(required),
            Filter::Not(inner) => !inner.matches(layout),
            Filter::And(filters) => filters.iter().all(|f| f.matches(layout)),
            Filter::Or(filters) => filters.iter().any(|f| f.matches(layout)),
        }
    }
}

impl Not for Filter {
    type Output = Filter;

    fn not(self) -> Filter {
        Filter::Not(Box::new(self))
    }
}

impl BitAnd for Filter {
    type Output = Filter;

    fn bitand(self, rhs: Filter) -> Filter {
        match self {
            Filter::And(mut filters) => {
                filters.push(rhs);
                Filter::And(filters)
            }
            lhs => Filter::And(vec![lhs, rhs]),
        }
    }
}

impl BitOr for Filter {
    type Output = Filter;

    fn bitor(self, rhs: Filter) -> Filter {
        match self {
            Filter::Or(mut filters) => {
                filters.push(rhs);
                Filter::Or(filters)
            }
            lhs => Filter::Or(vec![lhs, rhs]),
        }
    }
}

impl From<Layout> for Filter {
    fn from(layout: Layout) -> Self {
        Filter::Contains(layout)
    }
}
