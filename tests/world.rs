mod common;

use common::*;

use archetype_query::{
    component_description, component_id_of, register_component, register_tag, Bundle, ECSError,
    Filter, Layout, Query, World,
};

#[test]
fn registry_is_idempotent_per_type() {
    let ids = ids();
    assert_eq!(register_component::<Position>().unwrap(), ids.position);
    assert_eq!(component_id_of::<Position>().unwrap(), ids.position);

    let desc = component_description(ids.position).unwrap();
    assert!(desc.matches_type::<Position>());
    assert_eq!(desc.size, std::mem::size_of::<Position>());
    assert!(!desc.is_tag);

    struct NeverRegistered;
    assert!(matches!(
        component_id_of::<NeverRegistered>(),
        Err(ECSError::UnregisteredType(_))
    ));
}

#[test]
fn tags_are_always_fresh() {
    let first = register_tag("marker").unwrap();
    let second = register_tag("marker").unwrap();
    assert_ne!(first, second);
    assert!(component_description(first).unwrap().is_tag);
}

#[test]
fn create_defaults_and_bundles() {
    let ids = ids();
    let mut world = World::new();

    let plain = world.create(&[ids.position, ids.wealth, ids.position]).unwrap();
    assert_eq!(world.get::<Position>(plain, ids.position).unwrap(), &Position::default());
    assert_eq!(world.entry(plain).unwrap().layout().unwrap(), &Layout::new(&[ids.wealth, ids.position]));

    let seeded = world
        .create_with(
            Bundle::new()
                .with(ids.position, Position { x: 1.0, y: 2.0 })
                .with(ids.wealth, Wealth(5)),
        )
        .unwrap();
    assert_eq!(world.get::<Wealth>(seeded, ids.wealth).unwrap(), &Wealth(5));

    // Same field set, same archetype.
    assert_eq!(world.location(plain).unwrap().archetype, world.location(seeded).unwrap().archetype);
    assert_eq!(world.archetypes().len(), 1);
    assert_eq!(world.len(), 2);
}

#[test]
fn create_rejects_bad_bundles_without_side_effects() {
    let ids = ids();
    let mut world = World::new();

    let result = world.create_with(Bundle::new().with(ids.tag_a, archetype_query::Tag).with(ids.position, Wealth(3)));
    assert!(matches!(result, Err(ECSError::TypeMismatch(_))));
    assert!(world.is_empty());
    assert!(world.archetypes().is_empty());
    assert!(world.archetype_for_layout(&Layout::new(&[ids.tag_a, ids.position])).is_none());

    let unregistered = u16::MAX - 1;
    assert!(matches!(
        world.create(&[unregistered]),
        Err(ECSError::UnregisteredComponent(id)) if id == unregistered
    ));
}

#[test]
fn stale_identifiers_after_slot_reuse() {
    let ids = ids();
    let mut world = World::new();
    let old = world.create(&[ids.tag_a]).unwrap();
    world.destroy(old).unwrap();

    let new = world.create(&[ids.tag_a]).unwrap();
    assert_eq!(old.index(), new.index());
    assert_ne!(old.version(), new.version());

    assert!(!world.is_alive(old));
    assert!(world.is_alive(new));
    assert_eq!(world.destroy(old), Err(ECSError::UnknownRecord(old)));
    assert!(matches!(world.entry(old), Err(ECSError::UnknownRecord(_))));
    assert!(matches!(world.get::<archetype_query::Tag>(old, ids.tag_a), Err(ECSError::UnknownRecord(_))));
}

#[test]
fn fresh_slots_ascend_and_freed_slots_are_reused_last_in_first_out() {
    let ids = ids();
    let mut world = World::new();
    let records: Vec<_> = (0..4).map(|_| world.create(&[ids.tag_a]).unwrap()).collect();
    let indices: Vec<_> = records.iter().map(|e| e.index()).collect();
    assert_eq!(indices, vec![0, 1, 2, 3]);

    world.destroy(records[1]).unwrap();
    world.destroy(records[2]).unwrap();
    assert_eq!(world.create(&[ids.tag_a]).unwrap().index(), 2);
    assert_eq!(world.create(&[ids.tag_a]).unwrap().index(), 1);
    assert_eq!(world.create(&[ids.tag_a]).unwrap().index(), 4);
}

#[test]
fn destroy_fixes_the_swapped_record() {
    let ids = ids();
    let mut world = World::new();
    let a = world.create_with(Bundle::new().with(ids.wealth, Wealth(1))).unwrap();
    let b = world.create_with(Bundle::new().with(ids.wealth, Wealth(2))).unwrap();
    let c = world.create_with(Bundle::new().with(ids.wealth, Wealth(3))).unwrap();

    world.destroy(a).unwrap();
    assert_eq!(world.location(c).unwrap().row, 0);
    assert_eq!(world.get::<Wealth>(c, ids.wealth).unwrap(), &Wealth(3));
    assert_eq!(world.get::<Wealth>(b, ids.wealth).unwrap(), &Wealth(2));
}

#[test]
fn change_shape_preserves_shared_values() {
    let ids = ids();
    let mut world = World::new();
    let entity = world
        .create_with(
            Bundle::new()
                .with(ids.position, Position { x: 3.0, y: 4.0 })
                .with(ids.wealth, Wealth(9)),
        )
        .unwrap();
    let neighbour = world.create_with(Bundle::new().with(ids.wealth, Wealth(7)).with(ids.position, Position::default())).unwrap();

    world.change_shape(entity, &[ids.velocity], &[ids.wealth]).unwrap();

    let entry = world.entry(entity).unwrap();
    assert_eq!(entry.layout().unwrap(), &Layout::new(&[ids.position, ids.velocity]));
    assert_eq!(entry.get::<Position>(ids.position).unwrap(), &Position { x: 3.0, y: 4.0 });
    assert_eq!(entry.get::<Velocity>(ids.velocity).unwrap(), &Velocity::default());
    assert!(matches!(
        entry.get::<Wealth>(ids.wealth),
        Err(ECSError::FieldNotPresent { component_id, .. }) if component_id == ids.wealth
    ));

    // The record swapped into the vacated row is still reachable.
    assert_eq!(world.get::<Wealth>(neighbour, ids.wealth).unwrap(), &Wealth(7));
    assert_eq!(world.location(neighbour).unwrap().row, 0);
}

#[test]
fn change_shape_to_the_same_layout_is_a_no_op() {
    let ids = ids();
    let mut world = World::new();
    let entity = world.create(&[ids.tag_a]).unwrap();
    let before = world.location(entity).unwrap();

    world.change_shape(entity, &[ids.tag_a], &[]).unwrap();
    world.change_shape(entity, &[], &[ids.tag_b]).unwrap();
    assert_eq!(world.location(entity).unwrap(), before);
    assert_eq!(world.archetypes().len(), 1);
}

#[test]
fn field_in_add_and_remove_ends_up_removed() {
    let ids = ids();
    let mut world = World::new();
    let entity = world.create(&[ids.tag_a]).unwrap();

    world.change_shape(entity, &[ids.tag_b], &[ids.tag_b]).unwrap();
    assert!(!world.has(entity, ids.tag_b).unwrap());
}

#[test]
fn entry_mut_round_trip() {
    let ids = ids();
    let mut world = World::new();
    let entity = world.create(&[ids.wealth]).unwrap();

    {
        let mut entry = world.entry_mut(entity).unwrap();
        entry.set(ids.wealth, Wealth(10)).unwrap();
        entry.get_mut::<Wealth>(ids.wealth).unwrap().0 += 1;
        entry.add(ids.position, Position { x: 1.0, y: 1.0 }).unwrap();
        assert!(entry.has(ids.position).unwrap());
        assert_eq!(entry.as_entry().get::<Wealth>(ids.wealth).unwrap(), &Wealth(11));
    }

    let mut movers = Query::new(Filter::contains(&[ids.position, ids.wealth]));
    assert_eq!(movers.count(&world), 1);

    world.entry_mut(entity).unwrap().remove_component(ids.position).unwrap();
    assert_eq!(movers.count(&world), 0);
    assert_eq!(world.get::<Wealth>(entity, ids.wealth).unwrap(), &Wealth(11));

    world.entry_mut(entity).unwrap().remove().unwrap();
    assert!(world.is_empty());
}

#[test]
fn add_component_with_wrong_type_leaves_the_record_in_place() {
    let ids = ids();
    let mut world = World::new();
    let entity = world.create(&[ids.tag_a]).unwrap();
    let before = world.location(entity).unwrap();

    let result = world.add_component(entity, ids.wealth, Position::default());
    assert!(matches!(result, Err(ECSError::TypeMismatch(_))));
    assert_eq!(world.location(entity).unwrap(), before);
    assert!(!world.has(entity, ids.wealth).unwrap());
    assert_eq!(world.archetypes().len(), 1);

    world.add_component(entity, ids.wealth, Wealth(2)).unwrap();
    let grown = world.archetype_for_layout(&Layout::new(&[ids.tag_a, ids.wealth])).unwrap();
    assert_eq!(grown.entities(), &[entity]);
}

#[test]
fn typed_access_errors() {
    let ids = ids();
    let mut world = World::new();
    let entity = world.create(&[ids.wealth]).unwrap();

    assert!(matches!(
        world.get::<Position>(entity, ids.wealth),
        Err(ECSError::TypeMismatch(_))
    ));
    assert!(matches!(
        world.set(entity, ids.position, Position::default()),
        Err(ECSError::FieldNotPresent { .. })
    ));

    let archetype = &world.archetypes()[0];
    assert!(matches!(
        archetype.get_field::<Wealth>(5, ids.wealth),
        Err(ECSError::OutOfRange { row: 5, length: 1 })
    ));
}

#[test]
fn with_capacity_reserves_record_slots() {
    let ids = ids();
    let mut world = World::with_capacity(16).unwrap();
    assert!(world.is_empty());
    let entity = world.create(&[ids.tag_c]).unwrap();
    assert_eq!(entity.index(), 0);
    assert_eq!(world.len(), 1);
}
