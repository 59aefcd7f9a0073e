use super::*;
use crate::ecs::SpawnDesc;

fn default_hash() -> SpatialHash {
    SpatialHash::new(&[150.0, 450.0, 1500.0], 4).unwrap()
}

#[test]
fn test_key_packing_is_injective_for_signs() {
    assert_ne!(pack_key(-1, 0), pack_key(0, -1));
    assert_ne!(pack_key(1, 2), pack_key(2, 1));
    assert_eq!(pack_key(-1, -1), u64::MAX);
    assert_eq!(pack_key(0, 1), 1);
    assert_eq!(pack_key(1, 0), 1 << 32);
}

#[test]
fn test_rejects_bad_layers() {
    assert!(SpatialHash::new(&[], 1).is_err());
    assert!(SpatialHash::new(&[100.0, 0.0], 1).is_err());
    assert!(SpatialHash::new(&[f32::NAN], 1).is_err());
}

#[test]
fn test_layers_sorted() {
    let hash = SpatialHash::new(&[1500.0, 150.0, 450.0], 0).unwrap();
    assert_eq!(hash.cell_sizes().collect::<Vec<_>>(), vec![150.0, 450.0, 1500.0]);
}

#[test]
fn test_layer_selection() {
    let hash = default_hash();
    // 2r * 0.75 <= 150
    assert_eq!(hash.select_layer(10.0), 0);
    assert_eq!(hash.select_layer(100.0), 0);
    // 2 * 101 * 0.75 = 151.5
    assert_eq!(hash.select_layer(101.0), 1);
    assert_eq!(hash.select_layer(300.0), 1);
    assert_eq!(hash.select_layer(301.0), 2);
    // Beyond every layer: coarsest.
    assert_eq!(hash.select_layer(5000.0), 2);
}

#[test]
fn test_insert_goes_into_every_layer() {
    let mut hash = default_hash();
    hash.insert(7, 10.0, 10.0, EntityFlags::ACTIVE);
    for layer in 0..hash.layer_count() {
        assert_eq!(hash.layer_entries(layer), 1);
    }
    assert_eq!(hash.len(), 1);
}

#[test]
fn test_query_filters_by_exact_distance() {
    let mut hash = default_hash();
    hash.insert(0, 0.0, 0.0, EntityFlags::ACTIVE);
    hash.insert(1, 30.0, 40.0, EntityFlags::ACTIVE); // d = 50
    hash.insert(2, 60.0, 0.0, EntityFlags::ACTIVE); // d = 60, same cell block

    let found = hash.query(0.0, 0.0, 55.0).to_vec();
    assert_eq!(found, vec![0, 1]);
}

#[test]
fn test_query_within_radius_is_complete() {
    // Sweep positions around cell borders and check every neighbour with
    // d < r is found at several radii.
    let radii = [20.0_f32, 75.0, 100.0, 200.0, 300.0, 700.0];
    let mut hash = default_hash();
    let mut out = Vec::new();
    for &r in &radii {
        for step in 0..16 {
            let angle = step as f32 * std::f32::consts::TAU / 16.0;
            let d = r * 0.99;
            let (qx, qy) = (149.0 - step as f32 * 13.0, -1.0 + step as f32 * 7.0);
            hash.clear();
            hash.insert(0, qx, qy, EntityFlags::ACTIVE);
            hash.insert(1, qx + d * angle.cos(), qy + d * angle.sin(), EntityFlags::ACTIVE);

            hash.query_into(qx, qy, r, &mut out);
            assert!(out.contains(&1), "r={r} step={step} missed neighbour");
        }
    }
}

#[test]
fn test_query_far_beyond_layer_reach_is_not_returned() {
    let mut hash = default_hash();
    hash.insert(0, 10.0, 10.0, EntityFlags::ACTIVE);
    hash.insert(1, 4610.0, 10.0, EntityFlags::ACTIVE);

    // r = 5000 selects the 1500 layer; its 3x3 block ends at 3000.
    assert_eq!(hash.select_layer(5000.0), 2);
    let found = hash.query(10.0, 10.0, 5000.0).to_vec();
    assert_eq!(found, vec![0]);
}

#[test]
fn test_query_filtered_and_nearest() {
    let mut hash = default_hash();
    hash.insert(0, 0.0, 0.0, EntityFlags::ACTIVE | EntityFlags::PLAYER);
    hash.insert(1, 20.0, 0.0, EntityFlags::ACTIVE | EntityFlags::FOOD);
    hash.insert(2, 10.0, 0.0, EntityFlags::ACTIVE | EntityFlags::FOOD);
    hash.insert(3, 5.0, 0.0, EntityFlags::ACTIVE | EntityFlags::BOT);

    let food = hash.query_filtered(0.0, 0.0, 50.0, EntityFlags::FOOD).to_vec();
    assert_eq!(food, vec![1, 2]);

    let (index, dist) = hash
        .nearest(0.0, 0.0, 50.0, EntityFlags::CONSUMABLES, None)
        .unwrap();
    assert_eq!(index, 2);
    assert!((dist - 10.0).abs() < 1e-4);

    let (index, _) = hash
        .nearest(0.0, 0.0, 50.0, EntityFlags::ACTORS, Some(0))
        .unwrap();
    assert_eq!(index, 3);

    assert!(hash.nearest(0.0, 0.0, 50.0, EntityFlags::PROJECTILE, None).is_none());
}

#[test]
fn test_rebuild_skips_inactive_and_sweeps() {
    let mut world = World::new(16);
    let a = world.spawn(&SpawnDesc::food(0.0, 0.0)).unwrap();
    let b = world.spawn(&SpawnDesc::food(1000.0, 1000.0)).unwrap();
    world.destroy(b);

    let mut hash = default_hash();
    hash.rebuild(&world);
    assert_eq!(hash.len(), 1);
    assert_eq!(hash.query(0.0, 0.0, 10.0), &[a.index()]);

    // Move the survivor far away; the old buckets empty out and get swept.
    world.transforms.get_mut(a.slot()).unwrap().x = -2900.0;
    for _ in 0..4 {
        hash.rebuild(&world);
    }
    let stats = hash.stats();
    assert_eq!(stats.rebuilds, 5);
    assert!(stats.swept > 0);
    for layer in &stats.layers {
        assert_eq!(layer.buckets, layer.occupied);
    }
    assert!(hash.query(0.0, 0.0, 10.0).is_empty());
}

#[test]
fn test_clear_keeps_buckets() {
    let mut hash = SpatialHash::new(&[100.0], 0).unwrap();
    hash.insert(0, 5.0, 5.0, EntityFlags::ACTIVE);
    hash.clear();
    let stats = hash.stats();
    assert_eq!(stats.entries, 0);
    assert_eq!(stats.layers[0].buckets, 1);
    assert_eq!(stats.layers[0].occupied, 0);
}

#[test]
fn test_negative_or_nan_radius_finds_nothing() {
    let mut hash = SpatialHash::new(&[150.0, 450.0, 1500.0], 0).unwrap();
    hash.insert(0, 0.0, 0.0, EntityFlags::ACTIVE | EntityFlags::FOOD);
    hash.insert(1, 3.0, 4.0, EntityFlags::ACTIVE | EntityFlags::FOOD);

    for r in [-10.0, f32::NAN] {
        assert!(hash.query(0.0, 0.0, r).is_empty());
        assert!(hash.query_filtered(0.0, 0.0, r, EntityFlags::FOOD).is_empty());
        assert!(hash.nearest(0.0, 0.0, r, EntityFlags::FOOD, None).is_none());
    }
    assert_eq!(hash.query(0.0, 0.0, 5.0).len(), 2);
}
