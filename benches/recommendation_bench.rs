use chrono::Utc;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;
use shoprec::algorithms::similarity::SimilarityMatrix;
use shoprec::algorithms::{aggregation, matrix::UserItemMatrix, UserBasedCf, DEFAULT_NEIGHBORS};
use shoprec::services::recommendation::RecommendationService;
use shoprec::services::simulator::generate_interactions;
use shoprec::services::store::InMemoryStore;
use shoprec::services::training::TrainingService;
use shoprec::*;
use std::sync::Arc;

fn synthetic_log(users: i64, products: i64, interactions: usize) -> Vec<Interaction> {
    let mut rng = StdRng::seed_from_u64(42);
    let user_ids: Vec<UserId> = (1..=users).map(UserId).collect();
    let product_ids: Vec<ProductId> = (1..=products).map(ProductId).collect();
    generate_interactions(&mut rng, &user_ids, &product_ids, interactions, 90, Utc::now()).unwrap()
}

fn benchmark_training(c: &mut Criterion) {
    let log = synthetic_log(100, 50, 1000);

    c.bench_function("aggregate_1k_interactions", |b| {
        b.iter(|| black_box(aggregation::aggregate(&log)));
    });

    let affinities = aggregation::aggregate(&log);
    c.bench_function("build_user_item_matrix", |b| {
        b.iter(|| black_box(UserItemMatrix::build(&affinities)));
    });

    let matrix = UserItemMatrix::build(&affinities);
    if let Some(matrix) = matrix {
        c.bench_function("cosine_similarity_100_users", |b| {
            b.iter(|| black_box(SimilarityMatrix::compute(matrix.scores())));
        });
    }

    let large = synthetic_log(1000, 300, 20_000);
    c.bench_function("fit_1000_users", |b| {
        b.iter(|| black_box(UserBasedCf::fit(&large, DEFAULT_NEIGHBORS)));
    });
}

fn benchmark_recommendation(c: &mut Criterion) {
    let log = synthetic_log(500, 200, 10_000);

    if let Some(model) = UserBasedCf::fit(&log, DEFAULT_NEIGHBORS) {
        c.bench_function("recommend_top_5", |b| {
            b.iter(|| black_box(model.recommend(UserId(17), 5)));
        });
    }

    let rt = tokio::runtime::Runtime::new().unwrap();
    let catalog: Vec<Product> = (1..=200)
        .map(|i| Product::new(ProductId(i), format!("Product {}", i), "General", 9.99))
        .collect();
    let store = Arc::new(InMemoryStore::with_data(catalog, log));
    let training = Arc::new(TrainingService::new(store.clone(), Arc::new(Config::default())));
    rt.block_on(training.retrain()).unwrap();
    let service = RecommendationService::new(store, training);

    c.bench_function("recommend_with_catalog_lookup", |b| {
        b.to_async(&rt)
            .iter(|| async { black_box(service.recommend(UserId(17), 5).await.unwrap()) });
    });

    c.bench_function("popular_fallback", |b| {
        b.to_async(&rt)
            .iter(|| async { black_box(service.popular(5).await.unwrap()) });
    });
}

criterion_group!(benches, benchmark_training, benchmark_recommendation);
criterion_main!(benches);
