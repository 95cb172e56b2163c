use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use event_expo::catalog::{sample_services, Category, Service};
use event_expo::filter::{apply, FilterCriteria};
use rand::{seq::SliceRandom, thread_rng, Rng};
use std::sync::Arc;

// Synthetic catalog built from the sample services with randomized attributes
fn synthetic_catalog(size: usize) -> Vec<Arc<Service>> {
    let templates = sample_services().expect("sample catalog");
    let locations = ["Chennai", "Bangalore", "Madurai", "Coimbatore"];
    let categories = [Category::DJ, Category::Photographer, Category::Caterer];
    let mut rng = thread_rng();

    (0..size)
        .map(|i| {
            let mut service = templates[i % templates.len()].clone();
            service.id = i as u32;
            service.name = format!("{} {}", service.name, i);
            service.location = locations.choose(&mut rng).unwrap().to_string();
            service.category = categories.choose(&mut rng).unwrap().clone();
            service.price = rng.gen_range(0..=20000);
            service.rating = rng.gen_range(0.0..=5.0);
            Arc::new(service)
        })
        .collect()
}

pub fn filter_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("catalog_filter");

    let mut criteria = FilterCriteria::default();
    criteria.set_location("Chennai");
    criteria.set_min_rating(3.5, 5.0);
    criteria.set_max_price(15000, 20000);

    for size in [10, 100, 1000].iter() {
        let catalog = synthetic_catalog(*size);

        group.bench_with_input(BenchmarkId::new("criteria_only", size), &catalog, |b, catalog| {
            b.iter(|| black_box(apply(catalog, "", &criteria)))
        });

        group.bench_with_input(BenchmarkId::new("term_and_criteria", size), &catalog, |b, catalog| {
            b.iter(|| black_box(apply(catalog, "dj", &criteria)))
        });
    }

    group.finish();
}

criterion_group!(benches, filter_benchmark);
criterion_main!(benches);
