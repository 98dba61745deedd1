//! Integration tests for the checkout pipeline over the in-memory store.
//!
//! Verifies:
//! - Totals and stock movements of direct and cart checkout
//! - All-or-nothing behavior when any step fails
//! - Concurrent checkouts never oversell
//! - Order lines keep their purchase-time prices
//! - Listings with orders against them are never deleted

use std::sync::Arc;

use bazaar_cart::{CartLine, CartLineId};
use bazaar_catalog::{NewProduct, Product, ProductId, ProductPatch};
use bazaar_core::UserId;
use bazaar_orders::{OrderStatus, PlatformFee, TransitionPolicy};
use chrono::Utc;

use crate::error::ServiceError;
use crate::services::{ServiceConfig, Services};
use crate::store::{CartRepository, CatalogRepository, InMemoryStore, OrderRepository};

const FEE: u64 = 50;

fn setup() -> (Arc<InMemoryStore>, Services<Arc<InMemoryStore>>) {
    setup_with_policy(TransitionPolicy::Permissive)
}

fn setup_with_policy(policy: TransitionPolicy) -> (Arc<InMemoryStore>, Services<Arc<InMemoryStore>>) {
    let store = Arc::new(InMemoryStore::new());
    let services = Services::new(
        store.clone(),
        ServiceConfig {
            platform_fee: PlatformFee::new(FEE),
            status_policy: policy,
        },
    );
    (store, services)
}

async fn list_product(
    services: &Services<Arc<InMemoryStore>>,
    seller: UserId,
    price: i64,
    stock: i64,
) -> Product {
    services
        .catalog
        .create_product(
            seller,
            NewProduct {
                name: format!("item-{price}-{stock}"),
                description: String::new(),
                price,
                stock,
                image: None,
            },
        )
        .await
        .unwrap()
}

async fn stock_of(store: &InMemoryStore, id: ProductId) -> i64 {
    store.get_product(id).await.unwrap().unwrap().stock()
}

#[tokio::test]
async fn direct_checkout_prices_order_and_decrements_stock() {
    let (store, services) = setup();
    let product = list_product(&services, UserId::new(), 1000, 10).await;
    let buyer = UserId::new();

    let order = services
        .checkout
        .direct(buyer, product.id_typed(), 3)
        .await
        .unwrap();

    assert_eq!(order.status(), OrderStatus::Pending);
    assert_eq!(order.lines().len(), 1);
    assert_eq!(order.lines()[0].subtotal, 3000);
    assert_eq!(order.grand_total(), 3000 + FEE);
    assert_eq!(stock_of(&store, product.id_typed()).await, 7);
    assert_eq!(store.orders_for_buyer(buyer).await.unwrap().len(), 1);
}

#[tokio::test]
async fn direct_checkout_over_stock_changes_nothing() {
    let (store, services) = setup();
    let product = list_product(&services, UserId::new(), 100, 2).await;
    let buyer = UserId::new();

    let err = services
        .checkout
        .direct(buyer, product.id_typed(), 3)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ServiceError::InsufficientStock { requested: 3, available: 2, .. }
    ));
    assert_eq!(stock_of(&store, product.id_typed()).await, 2);
    assert!(store.orders_for_buyer(buyer).await.unwrap().is_empty());
}

#[tokio::test]
async fn direct_checkout_of_unknown_product_is_not_found() {
    let (_, services) = setup();
    let err = services
        .checkout
        .direct(UserId::new(), ProductId::generate(), 1)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn direct_checkout_rejects_non_positive_quantity() {
    let (store, services) = setup();
    let product = list_product(&services, UserId::new(), 100, 2).await;
    let err = services
        .checkout
        .direct(UserId::new(), product.id_typed(), 0)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation { .. }));
    assert_eq!(stock_of(&store, product.id_typed()).await, 2);
}

#[tokio::test]
async fn cart_checkout_consumes_exactly_the_requested_lines() {
    let (store, services) = setup();
    let seller = UserId::new();
    let tea = list_product(&services, seller, 200, 10).await;
    let cup = list_product(&services, seller, 500, 5).await;
    let spoon = list_product(&services, seller, 30, 5).await;
    let buyer = UserId::new();

    let tea_line = services.carts.add(buyer, tea.id_typed(), 2).await.unwrap();
    let cup_line = services.carts.add(buyer, cup.id_typed(), 1).await.unwrap();
    let spoon_line = services.carts.add(buyer, spoon.id_typed(), 4).await.unwrap();

    let order = services
        .checkout
        .by_cart(buyer, &[tea_line.id_typed(), cup_line.id_typed()])
        .await
        .unwrap();

    assert_eq!(order.lines().len(), 2);
    assert_eq!(order.grand_total(), 2 * 200 + 500 + FEE);
    assert_eq!(stock_of(&store, tea.id_typed()).await, 8);
    assert_eq!(stock_of(&store, cup.id_typed()).await, 4);
    assert_eq!(stock_of(&store, spoon.id_typed()).await, 5);

    let remaining = services.carts.list(buyer).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].line.id_typed(), spoon_line.id_typed());
}

#[tokio::test]
async fn cart_checkout_failure_rolls_back_every_write() {
    let (store, services) = setup();
    let seller = UserId::new();
    let plenty = list_product(&services, seller, 100, 10).await;
    let scarce = list_product(&services, seller, 100, 1).await;
    let buyer = UserId::new();

    let a = services.carts.add(buyer, plenty.id_typed(), 3).await.unwrap();
    let b = services.carts.add(buyer, scarce.id_typed(), 2).await.unwrap();

    let err = services
        .checkout
        .by_cart(buyer, &[a.id_typed(), b.id_typed()])
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::InsufficientStock { .. }));
    assert_eq!(stock_of(&store, plenty.id_typed()).await, 10);
    assert_eq!(stock_of(&store, scarce.id_typed()).await, 1);
    assert_eq!(services.carts.list(buyer).await.unwrap().len(), 2);
    assert!(store.orders_for_buyer(buyer).await.unwrap().is_empty());
}

#[tokio::test]
async fn cart_checkout_with_no_matching_lines_is_not_found() {
    let (store, services) = setup();
    let product = list_product(&services, UserId::new(), 100, 10).await;
    let owner = UserId::new();
    let line = services.carts.add(owner, product.id_typed(), 1).await.unwrap();
    let intruder = UserId::new();

    let empty = services.checkout.by_cart(intruder, &[]).await.unwrap_err();
    assert!(matches!(empty, ServiceError::NotFound(_)));

    let foreign = services
        .checkout
        .by_cart(intruder, &[line.id_typed(), CartLineId::generate()])
        .await
        .unwrap_err();
    assert!(matches!(foreign, ServiceError::NotFound(_)));

    assert!(store.orders_for_buyer(intruder).await.unwrap().is_empty());
    assert_eq!(stock_of(&store, product.id_typed()).await, 10);
    assert_eq!(services.carts.list(owner).await.unwrap().len(), 1);
}

#[tokio::test]
async fn cart_checkout_skips_lines_owned_by_someone_else() {
    let (_, services) = setup();
    let product = list_product(&services, UserId::new(), 100, 10).await;
    let buyer = UserId::new();
    let other = UserId::new();
    let mine = services.carts.add(buyer, product.id_typed(), 1).await.unwrap();
    let theirs = services.carts.add(other, product.id_typed(), 2).await.unwrap();

    let order = services
        .checkout
        .by_cart(buyer, &[mine.id_typed(), theirs.id_typed(), mine.id_typed()])
        .await
        .unwrap();

    assert_eq!(order.lines().len(), 1);
    assert_eq!(order.lines()[0].quantity, 1);
    assert_eq!(services.carts.list(other).await.unwrap().len(), 1);
}

#[tokio::test]
async fn cart_checkout_charges_the_current_price() {
    let (_, services) = setup();
    let seller = UserId::new();
    let product = list_product(&services, seller, 100, 10).await;
    let buyer = UserId::new();
    let line = services.carts.add(buyer, product.id_typed(), 2).await.unwrap();

    services
        .catalog
        .update_product(
            seller,
            product.id_typed(),
            ProductPatch {
                price: Some(150),
                ..ProductPatch::default()
            },
        )
        .await
        .unwrap();

    let order = services
        .checkout
        .by_cart(buyer, &[line.id_typed()])
        .await
        .unwrap();
    assert_eq!(order.lines()[0].unit_price, 150);
    assert_eq!(order.grand_total(), 300 + FEE);
}

#[tokio::test]
async fn later_price_changes_never_touch_placed_orders() {
    let (store, services) = setup();
    let seller = UserId::new();
    let product = list_product(&services, seller, 1000, 10).await;
    let order = services
        .checkout
        .direct(UserId::new(), product.id_typed(), 3)
        .await
        .unwrap();

    services
        .catalog
        .update_product(
            seller,
            product.id_typed(),
            ProductPatch {
                price: Some(9999),
                ..ProductPatch::default()
            },
        )
        .await
        .unwrap();

    let stored = store.get_order(order.id_typed()).await.unwrap().unwrap();
    assert_eq!(stored.lines()[0].unit_price, 1000);
    assert_eq!(stored.lines()[0].subtotal, 3000);
    assert_eq!(stored.grand_total(), 3000 + FEE);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_checkouts_for_the_last_unit_sell_it_once() {
    let (store, services) = setup();
    let product = list_product(&services, UserId::new(), 100, 1).await;
    let checkout = services.checkout.clone();

    let mut handles = Vec::new();
    for _ in 0..2 {
        let checkout = checkout.clone();
        let product_id = product.id_typed();
        handles.push(tokio::spawn(async move {
            checkout.direct(UserId::new(), product_id, 1).await
        }));
    }

    let mut successes = 0;
    let mut out_of_stock = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => successes += 1,
            Err(ServiceError::InsufficientStock { .. }) => out_of_stock += 1,
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }

    assert_eq!(successes, 1);
    assert_eq!(out_of_stock, 1);
    assert_eq!(stock_of(&store, product.id_typed()).await, 0);
}

#[tokio::test]
async fn sellers_see_orders_containing_their_products() {
    let (_, services) = setup();
    let seller_a = UserId::new();
    let seller_b = UserId::new();
    let a = list_product(&services, seller_a, 100, 10).await;
    let b = list_product(&services, seller_b, 100, 10).await;
    let buyer = UserId::new();

    let first = services.checkout.direct(buyer, a.id_typed(), 1).await.unwrap();
    services.checkout.direct(buyer, b.id_typed(), 1).await.unwrap();

    let for_a = services.orders.for_seller(seller_a).await.unwrap();
    assert_eq!(for_a.len(), 1);
    assert_eq!(for_a[0].id_typed(), first.id_typed());
    assert_eq!(services.orders.for_buyer(buyer).await.unwrap().len(), 2);
    assert!(services.orders.for_seller(UserId::new()).await.unwrap().is_empty());
}

#[tokio::test]
async fn failed_orders_keep_their_stock_decrement() {
    let (store, services) = setup();
    let seller = UserId::new();
    let product = list_product(&services, seller, 100, 5).await;
    let order = services
        .checkout
        .direct(UserId::new(), product.id_typed(), 2)
        .await
        .unwrap();

    let updated = services
        .orders
        .update_status(seller, order.id_typed(), OrderStatus::Failed)
        .await
        .unwrap();

    assert_eq!(updated.status(), OrderStatus::Failed);
    assert_eq!(stock_of(&store, product.id_typed()).await, 3);
    let stored = store.get_order(order.id_typed()).await.unwrap().unwrap();
    assert_eq!(stored.status(), OrderStatus::Failed);
    assert_eq!(stored.grand_total(), order.grand_total());
}

#[tokio::test]
async fn strict_policy_refuses_to_reopen_orders() {
    let (_, services) = setup_with_policy(TransitionPolicy::Strict);
    let seller = UserId::new();
    let product = list_product(&services, seller, 100, 5).await;
    let order = services
        .checkout
        .direct(UserId::new(), product.id_typed(), 1)
        .await
        .unwrap();

    services
        .orders
        .update_status(seller, order.id_typed(), OrderStatus::Success)
        .await
        .unwrap();
    let err = services
        .orders
        .update_status(seller, order.id_typed(), OrderStatus::Pending)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Invariant(_)));
}

#[tokio::test]
async fn status_update_of_unknown_order_is_not_found() {
    let (_, services) = setup();
    let err = services
        .orders
        .update_status(UserId::new(), bazaar_orders::OrderId::generate(), OrderStatus::Success)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn only_the_owning_seller_edits_a_product() {
    let (_, services) = setup();
    let product = list_product(&services, UserId::new(), 100, 5).await;
    let err = services
        .catalog
        .update_product(
            UserId::new(),
            product.id_typed(),
            ProductPatch {
                stock: Some(0),
                ..ProductPatch::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Forbidden(_)));
}

#[tokio::test]
async fn cart_operations_are_scoped_to_the_buyer() {
    let (_, services) = setup();
    let product = list_product(&services, UserId::new(), 100, 5).await;
    let owner = UserId::new();
    let line = services.carts.add(owner, product.id_typed(), 1).await.unwrap();
    let merged = services.carts.add(owner, product.id_typed(), 2).await.unwrap();
    assert_eq!(merged.id_typed(), line.id_typed());
    assert_eq!(merged.quantity(), 3);

    let stranger = UserId::new();
    assert!(matches!(
        services.carts.update_quantity(stranger, line.id_typed(), 9).await,
        Err(ServiceError::NotFound(_))
    ));
    assert!(matches!(
        services.carts.remove(stranger, line.id_typed()).await,
        Err(ServiceError::NotFound(_))
    ));

    let updated = services
        .carts
        .update_quantity(owner, line.id_typed(), 4)
        .await
        .unwrap();
    assert_eq!(updated.quantity(), 4);
    services.carts.remove(owner, line.id_typed()).await.unwrap();
    assert!(services.carts.list(owner).await.unwrap().is_empty());
}

#[tokio::test]
async fn adding_unknown_product_to_cart_is_not_found() {
    let (_, services) = setup();
    let err = services
        .carts
        .add(UserId::new(), ProductId::generate(), 1)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}

/// Two lines for one product, stored directly since `add` would merge them.
async fn seed_split_lines(
    store: &InMemoryStore,
    buyer: UserId,
    product: ProductId,
    quantities: [i64; 2],
) -> Vec<CartLineId> {
    let mut ids = Vec::new();
    for quantity in quantities {
        let line = CartLine::new(CartLineId::generate(), buyer, product, quantity, Utc::now()).unwrap();
        ids.push(line.id_typed());
        store.seed_cart_line(line).await;
    }
    ids
}

#[tokio::test]
async fn cart_checkout_checks_stock_against_summed_lines() {
    let (store, services) = setup();
    let product = list_product(&services, UserId::new(), 100, 3).await;
    let buyer = UserId::new();
    let ids = seed_split_lines(&store, buyer, product.id_typed(), [2, 2]).await;

    let err = services.checkout.by_cart(buyer, &ids).await.unwrap_err();

    match err {
        ServiceError::InsufficientStock {
            product_id,
            requested,
            available,
        } => {
            assert_eq!(product_id, product.id_typed());
            assert_eq!(requested, 4);
            assert_eq!(available, 3);
        }
        other => panic!("expected insufficient stock, got {other:?}"),
    }
    assert_eq!(stock_of(&store, product.id_typed()).await, 3);
    assert_eq!(services.carts.list(buyer).await.unwrap().len(), 2);
    assert!(store.orders_for_buyer(buyer).await.unwrap().is_empty());
}

#[tokio::test]
async fn cart_checkout_orders_each_split_line() {
    let (store, services) = setup();
    let product = list_product(&services, UserId::new(), 100, 4).await;
    let buyer = UserId::new();
    let ids = seed_split_lines(&store, buyer, product.id_typed(), [2, 2]).await;

    let order = services.checkout.by_cart(buyer, &ids).await.unwrap();

    assert_eq!(order.lines().len(), 2);
    assert!(order.lines().iter().all(|l| l.quantity == 2 && l.unit_price == 100));
    assert_eq!(order.grand_total(), 400 + FEE);
    assert_eq!(stock_of(&store, product.id_typed()).await, 0);
    assert!(services.carts.list(buyer).await.unwrap().is_empty());
}

#[tokio::test]
async fn overflowing_cart_merge_is_an_invariant_violation() {
    let (store, services) = setup();
    let product = list_product(&services, UserId::new(), 100, 5).await;
    let buyer = UserId::new();
    services.carts.add(buyer, product.id_typed(), i64::MAX).await.unwrap();

    let err = services.carts.add(buyer, product.id_typed(), 1).await.unwrap_err();

    assert!(matches!(err, ServiceError::Invariant(_)));
    let lines = store.lines_for_buyer(buyer).await.unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].quantity(), i64::MAX);
}

#[tokio::test]
async fn sellers_delete_unordered_products_with_their_cart_lines() {
    let (store, services) = setup();
    let seller = UserId::new();
    let product = list_product(&services, seller, 100, 5).await;
    let buyer = UserId::new();
    services.carts.add(buyer, product.id_typed(), 2).await.unwrap();

    let err = services
        .catalog
        .delete_product(UserId::new(), product.id_typed())
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Forbidden(_)));
    assert!(store.get_product(product.id_typed()).await.unwrap().is_some());

    services.catalog.delete_product(seller, product.id_typed()).await.unwrap();
    assert!(store.get_product(product.id_typed()).await.unwrap().is_none());
    assert!(services.carts.list(buyer).await.unwrap().is_empty());
    assert!(store.lines_for_buyer(buyer).await.unwrap().is_empty());

    let err = services
        .catalog
        .delete_product(seller, product.id_typed())
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn ordered_products_are_kept_on_delete() {
    let (store, services) = setup();
    let seller = UserId::new();
    let product = list_product(&services, seller, 100, 5).await;
    let buyer = UserId::new();
    services.checkout.direct(buyer, product.id_typed(), 1).await.unwrap();

    let err = services
        .catalog
        .delete_product(seller, product.id_typed())
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::Conflict(_)));
    assert_eq!(stock_of(&store, product.id_typed()).await, 4);
    assert_eq!(services.orders.for_seller(seller).await.unwrap().len(), 1);
}
