#![allow(dead_code)]

use std::sync::OnceLock;

use archetype_query::{register_component, register_tag, ComponentID, World};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Velocity {
    pub dx: f32,
    pub dy: f32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Wealth(pub i64);

/// Field used as the ordering key in ordered-query tests.
pub type Rank = i32;

/// Identifiers shared by every test in one test binary.
#[derive(Clone, Copy, Debug)]
pub struct Ids {
    pub position: ComponentID,
    pub velocity: ComponentID,
    pub wealth: ComponentID,
    pub rank: ComponentID,
    pub tag_a: ComponentID,
    pub tag_b: ComponentID,
    pub tag_c: ComponentID,
}

static IDS: OnceLock<Ids> = OnceLock::new();

/// One-time component registration
pub fn ids() -> Ids {
    *IDS.get_or_init(|| Ids {
        position: register_component::<Position>().unwrap(),
        velocity: register_component::<Velocity>().unwrap(),
        wealth: register_component::<Wealth>().unwrap(),
        rank: register_component::<Rank>().unwrap(),
        tag_a: register_tag("a").unwrap(),
        tag_b: register_tag("b").unwrap(),
        tag_c: register_tag("c").unwrap(),
    })
}

/// World with one record each of `{A}`, `{C}` and `{A, B}`.
pub fn abc_world() -> World {
    let ids = ids();
    let mut world = World::new();
    world.create(&[ids.tag_a]).unwrap();
    world.create(&[ids.tag_c]).unwrap();
    world.create(&[ids.tag_a, ids.tag_b]).unwrap();
    world
}
