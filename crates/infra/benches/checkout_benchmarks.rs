use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use std::sync::Arc;

use bazaar_cart::CartLineId;
use bazaar_catalog::{NewProduct, ProductId};
use bazaar_core::UserId;
use bazaar_infra::{InMemoryStore, ServiceConfig, Services};
use bazaar_orders::{LineItem, OrderBuilder, OrderId, PlatformFee};
use chrono::Utc;
use tokio::runtime::Runtime;

fn runtime() -> Runtime {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
}

fn setup(rt: &Runtime, products: usize, stock: i64) -> (Services<Arc<InMemoryStore>>, Vec<ProductId>) {
    let services = Services::new(Arc::new(InMemoryStore::new()), ServiceConfig::default());
    let seller = UserId::new();
    let ids = rt.block_on(async {
        let mut ids = Vec::with_capacity(products);
        for i in 0..products {
            let product = services
                .catalog
                .create_product(
                    seller,
                    NewProduct {
                        name: format!("bench-{i}"),
                        description: String::new(),
                        price: 1_000,
                        stock,
                        image: None,
                    },
                )
                .await
                .unwrap();
            ids.push(product.id_typed());
        }
        ids
    });
    (services, ids)
}

fn bench_order_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("order_build");

    for lines in [1usize, 10, 100].iter() {
        group.throughput(Throughput::Elements(*lines as u64));
        group.bench_with_input(BenchmarkId::new("lines", lines), lines, |b, &n| {
            let builder = OrderBuilder::new(PlatformFee::new(2_000));
            let items: Vec<LineItem> = (0..n)
                .map(|i| LineItem {
                    product_id: ProductId::generate(),
                    unit_price: 100 + i as u64,
                    quantity: 3,
                })
                .collect();
            let buyer = UserId::new();
            b.iter(|| {
                black_box(
                    builder
                        .build(OrderId::generate(), buyer, items.clone(), Utc::now())
                        .unwrap(),
                );
            });
        });
    }

    group.finish();
}

fn bench_direct_checkout(c: &mut Criterion) {
    let mut group = c.benchmark_group("direct_checkout");
    let rt = runtime();

    group.bench_function("in_memory", |b| {
        let (services, ids) = setup(&rt, 1, i64::MAX / 2);
        let buyer = UserId::new();
        b.iter(|| {
            rt.block_on(async {
                black_box(
                    services
                        .checkout
                        .direct(buyer, ids[0], black_box(1))
                        .await
                        .unwrap(),
                );
            });
        });
    });

    group.finish();
}

fn bench_cart_checkout(c: &mut Criterion) {
    let mut group = c.benchmark_group("cart_checkout");
    group.sample_size(50);
    let rt = runtime();

    for lines in [1usize, 10, 50].iter() {
        group.throughput(Throughput::Elements(*lines as u64));
        group.bench_with_input(BenchmarkId::new("lines", lines), lines, |b, &n| {
            let (services, ids) = setup(&rt, n, i64::MAX / 2);
            let buyer = UserId::new();
            b.iter(|| {
                rt.block_on(async {
                    let mut cart: Vec<CartLineId> = Vec::with_capacity(n);
                    for id in &ids {
                        let line = services.carts.add(buyer, *id, 2).await.unwrap();
                        cart.push(line.id_typed());
                    }
                    black_box(services.checkout.by_cart(buyer, &cart).await.unwrap());
                });
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_order_build,
    bench_direct_checkout,
    bench_cart_checkout
);
criterion_main!(benches);
