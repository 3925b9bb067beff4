#![forbid(unsafe_code)]

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion, Throughput};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use canopy::{Category, CategoryKey, CategoryStore, TreeCache};

const ROOTS: usize = 32;
const CHILDREN: usize = 16;
const GRANDCHILDREN: usize = 8;

fn build_store() -> (CategoryStore, Vec<CategoryKey>) {
    let mut store = CategoryStore::default();
    let mut leaves = Vec::with_capacity(ROOTS * CHILDREN * GRANDCHILDREN);
    for r in 0..ROOTS {
        let root = store
            .insert(Category::new(format!("root-{r:03}")))
            .expect("root");
        for c in 0..CHILDREN {
            let child = store
                .insert(Category::new(format!("child-{c:03}")).with_parent(root.key()))
                .expect("child");
            for g in 0..GRANDCHILDREN {
                let leaf = store
                    .insert(Category::new(format!("leaf-{g:03}")).with_parent(child.key()))
                    .expect("leaf");
                leaves.push(leaf.key());
            }
        }
    }
    (store, leaves)
}

fn walk_all<S: canopy::storage::CategorySource>(cache: &TreeCache<S>) -> usize {
    let mut visited = 0;
    let mut stack = cache.root_keys();
    while let Some(key) = stack.pop() {
        visited += 1;
        if let Ok(Some(children)) = cache.children_of(key) {
            stack.extend(children);
        }
    }
    visited
}

fn tree_navigation(c: &mut Criterion) {
    let (store, leaves) = build_store();
    let total = (ROOTS * (1 + CHILDREN * (1 + GRANDCHILDREN))) as u64;

    let mut group = c.benchmark_group("cache/navigation");
    group.sample_size(40);

    group.throughput(Throughput::Elements(total));
    group.bench_function("cold_walk", |b| {
        b.iter_batched(
            || {
                let cache = TreeCache::new(&store);
                cache.refresh().expect("refresh");
                cache
            },
            |cache| black_box(walk_all(&cache)),
            BatchSize::SmallInput,
        );
    });

    let warm = TreeCache::new(&store);
    warm.refresh().expect("refresh");
    walk_all(&warm);
    group.bench_function("warm_walk", |b| {
        b.iter(|| black_box(walk_all(&warm)));
    });

    group.throughput(Throughput::Elements(1));
    let mut rng = ChaCha8Rng::seed_from_u64(0xC0FFEE);
    group.bench_function("cold_parent_chain", |b| {
        b.iter_batched(
            || {
                let leaf = leaves[rng.gen_range(0..leaves.len())];
                (TreeCache::new(&store), leaf)
            },
            |(cache, leaf)| black_box(cache.parent_of(leaf).expect("parent")),
            BatchSize::SmallInput,
        );
    });

    group.bench_function("warm_property", |b| {
        b.iter(|| {
            let leaf = leaves[rng.gen_range(0..leaves.len())];
            black_box(warm.property(leaf, "name").expect("property"))
        });
    });

    group.finish();
}

criterion_group!(benches, tree_navigation);
criterion_main!(benches);
