#![allow(dead_code)]

use std::sync::OnceLock;

use archetype_query::{register_component, register_tag, Bundle, ComponentID, ECSResult, World};

pub const RECORDS_SMALL: usize = 30_000;
pub const RECORDS_MED: usize = 300_000;

#[derive(Clone, Copy, Default)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

#[derive(Clone, Copy, Default)]
pub struct Wealth {
    pub value: f32,
}

/// Ordering key; assigned pseudo-randomly so ordered passes actually sort.
pub type Arrival = i64;

#[derive(Clone, Copy)]
pub struct Ids {
    pub position: ComponentID,
    pub wealth: ComponentID,
    pub arrival: ComponentID,
    pub agent: ComponentID,
}

static IDS: OnceLock<Ids> = OnceLock::new();

pub fn init_components() -> Ids {
    *IDS.get_or_init(|| Ids {
        position: register_component::<Position>().expect("register Position"),
        wealth: register_component::<Wealth>().expect("register Wealth"),
        arrival: register_component::<Arrival>().expect("register Arrival"),
        agent: register_tag("agent").expect("register agent tag"),
    })
}

/// Spreads `count` agents over four archetypes.
pub fn populate(world: &mut World, count: usize) -> ECSResult<()> {
    let ids = init_components();
    let mut key: u64 = 0x9E37_79B9_7F4A_7C15;
    for i in 0..count {
        key ^= key << 13;
        key ^= key >> 7;
        key ^= key << 17;

        let mut bundle = Bundle::new()
            .with(ids.agent, archetype_query::Tag)
            .with(ids.arrival, (key % 1_000_000) as Arrival);
        if i % 2 == 0 {
            bundle.insert(ids.position, Position { x: i as f32, y: 0.0 });
        }
        if i % 3 == 0 {
            bundle.insert(ids.wealth, Wealth { value: 1.0 });
        }
        world.create_with(bundle)?;
    }
    Ok(())
}
