use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::Rng;
use static_octree::prelude::*;

const RANGE: usize = 4096;
const WORLD: f32 = 512.0;

fn random_objects() -> Vec<Aabb<f32>> {
    let mut rnd = rand::thread_rng();
    (0..RANGE)
        .map(|_| {
            let x = rnd.gen_range(-WORLD..WORLD);
            let y = rnd.gen_range(-WORLD..WORLD);
            let z = rnd.gen_range(-WORLD..WORLD);
            let half = rnd.gen_range(0.5..4.0);
            Aabb::new_unchecked(TVec3::new(x, y, z), TVec3::splat(half))
        })
        .collect()
}

fn random_queries() -> Vec<Aabb<f32>> {
    let mut rnd = rand::thread_rng();
    (0..RANGE)
        .map(|_| {
            let x = rnd.gen_range(-WORLD..WORLD);
            let y = rnd.gen_range(-WORLD..WORLD);
            let z = rnd.gen_range(-WORLD..WORLD);
            Aabb::new_unchecked(TVec3::new(x, y, z), TVec3::splat(16.0))
        })
        .collect()
}

fn indexed_tree(objects: &[Aabb<f32>]) -> Octree<f32> {
    let bounds = Aabb::new_unchecked(TVec3::zero(), TVec3::splat(WORLD + 8.0));
    let mut tree = Octree::from_config(OctreeConfig::new(bounds, 6, 8)).unwrap();
    for object in 0..objects.len() {
        tree.register(object.into());
    }
    tree.update_index(objects);
    tree
}

fn octree_rebuild(tree: &mut Octree<f32>, objects: &[Aabb<f32>]) {
    tree.mark_dirty();
    let _ = tree.update_index(objects);
}

fn octree_nearby(tree: &Octree<f32>, objects: &[Aabb<f32>]) -> usize {
    let mut found = 0;
    for object in 0..objects.len() {
        if let Ok(nearby) = tree.get_nearby(object.into(), objects) {
            found += nearby.len();
        }
    }
    found
}

fn octree_intersection(tree: &Octree<f32>, objects: &[Aabb<f32>], queries: &[Aabb<f32>]) {
    let mut found = Vec::with_capacity(64);
    for query in queries {
        found.clear();
        let _ = tree.extend_intersect_with(|aabb| aabb.overlaps(query), objects, &mut found);
    }
}

fn criterion_benchmark(c: &mut Criterion) {
    let objects = random_objects();
    let queries = random_queries();
    let mut tree = indexed_tree(&objects);

    c.bench_function("octree rebuild", |b| {
        b.iter(|| octree_rebuild(&mut tree, black_box(&objects)))
    });

    c.bench_function("octree nearby", |b| {
        b.iter(|| octree_nearby(&tree, black_box(&objects)))
    });

    c.bench_function("octree intersection", |b| {
        b.iter(|| octree_intersection(&tree, black_box(&objects), black_box(&queries)))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
