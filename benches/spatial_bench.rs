//! Benchmarks for octree insert/search/relocate and grid queries.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use glam::{DVec2, DVec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use spatial_stream::{Aabb3, ItemHandle, OctreeIndex, TreeConfig, WorldGrid};

const WORLD: f64 = 1000.0;

fn random_box(rng: &mut StdRng) -> Aabb3 {
  let origin = DVec3::new(
    rng.random_range(0.0..WORLD),
    rng.random_range(0.0..WORLD),
    rng.random_range(0.0..WORLD),
  );
  Aabb3::from_origin_size(origin, DVec3::splat(rng.random_range(0.5..8.0)))
}

fn world_bounds() -> Aabb3 {
  Aabb3::new(DVec3::ZERO, DVec3::splat(WORLD))
}

fn populated_index(count: usize, seed: u64) -> (OctreeIndex<u64>, Vec<ItemHandle>) {
  let mut rng = StdRng::seed_from_u64(seed);
  let mut index = OctreeIndex::new(world_bounds(), TreeConfig::default()).unwrap();
  let handles = (0..count)
    .map(|i| index.insert(i as u64, random_box(&mut rng)))
    .collect();
  (index, handles)
}

fn bench_insert(c: &mut Criterion) {
  let mut group = c.benchmark_group("octree_insert");
  for count in [1_000usize, 10_000, 100_000] {
    group.throughput(Throughput::Elements(count as u64));
    group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
      b.iter(|| {
        let (index, _) = populated_index(count, 42);
        black_box(index.len())
      });
    });
  }
  group.finish();
}

fn bench_search(c: &mut Criterion) {
  let mut group = c.benchmark_group("octree_search");
  for count in [10_000usize, 100_000] {
    let (index, _) = populated_index(count, 42);
    let mut rng = StdRng::seed_from_u64(7);
    let queries: Vec<Aabb3> = (0..64)
      .map(|_| {
        let origin = DVec3::new(
          rng.random_range(0.0..WORLD),
          rng.random_range(0.0..WORLD),
          rng.random_range(0.0..WORLD),
        );
        Aabb3::from_origin_size(origin, DVec3::splat(50.0))
      })
      .collect();

    group.bench_with_input(BenchmarkId::from_parameter(count), &queries, |b, queries| {
      b.iter(|| {
        let mut total = 0usize;
        for query in queries {
          total += index.search(black_box(query)).len();
        }
        black_box(total)
      });
    });
  }
  group.finish();
}

fn bench_relocate(c: &mut Criterion) {
  c.bench_function("octree_relocate_10k", |b| {
    let (mut index, handles) = populated_index(10_000, 42);
    let mut rng = StdRng::seed_from_u64(11);
    b.iter(|| {
      for handle in &handles {
        index.relocate(*handle, random_box(&mut rng)).unwrap();
      }
      black_box(index.len())
    });
  });
}

fn bench_grid_query(c: &mut Criterion) {
  let grid: WorldGrid<u64> = WorldGrid::new(DVec2::new(100.0, 100.0), 2).unwrap();
  let mut rng = StdRng::seed_from_u64(3);
  grid.insert((0..50_000u64).map(|i| {
    let origin = DVec3::new(
      rng.random_range(0.0..300.0),
      rng.random_range(0.0..300.0),
      rng.random_range(0.0..300.0),
    );
    (i, Aabb3::from_origin_size(origin, DVec3::splat(2.0)))
  }));
  grid.update(DVec3::new(150.0, 150.0, 0.0));
  while grid.pending_loads() > 0 {
    std::thread::sleep(std::time::Duration::from_millis(1));
  }

  c.bench_function("grid_query_window", |b| {
    let query = Aabb3::from_center_half_extents(DVec3::new(150.0, 150.0, 0.0), DVec3::splat(40.0));
    b.iter(|| black_box(grid.query(black_box(&query))).len());
  });
}

criterion_group!(
  benches,
  bench_insert,
  bench_search,
  bench_relocate,
  bench_grid_query
);
criterion_main!(benches);
