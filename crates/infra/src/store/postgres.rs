//! Postgres-backed store.
//!
//! A unit of work is one SQL transaction. Product rows are read with
//! `SELECT ... FOR UPDATE`, so a second checkout touching the same product
//! blocks until the first commits or rolls back and then sees the new stock.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (serialization failure / deadlock) | `40001` / `40P01` | `Concurrency` |
//! | Database (unique, foreign key, check violation) | `23505` / `23503` / `23514` | `Constraint` |
//! | Database (other) | Any other | `Backend` |
//! | PoolClosed, network, other | N/A | `Backend` |

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{FromRow, PgPool, Postgres, Row, Transaction};
use tracing::instrument;
use uuid::Uuid;

use bazaar_cart::{CartLine, CartLineId};
use bazaar_catalog::{Product, ProductId, ProductRecord};
use bazaar_core::{AggregateRoot, UserId};
use bazaar_orders::{Order, OrderId, OrderLine, OrderLineId, OrderRecord, OrderStatus};

use super::{CartRepository, CatalogRepository, OrderRepository, Store, UnitOfWork};
use crate::error::StoreError;

const SCHEMA: &str = include_str!("../../migrations/0001_init.sql");

/// Postgres-backed store.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: Arc<PgPool>,
}

impl PostgresStore {
    /// Create a new PostgresStore with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Create the tables if they do not exist yet.
    #[instrument(skip(self), err)]
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::raw_sql(SCHEMA)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("migrate", e))?;
        Ok(())
    }

    async fn attach_lines(&self, rows: Vec<PgRow>) -> Result<Vec<Order>, StoreError> {
        let headers = rows
            .iter()
            .map(OrderRow::from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| StoreError::Corrupt(format!("order row: {e}")))?;
        if headers.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = headers.iter().map(|h| h.id).collect();
        let line_rows = sqlx::query(
            r#"
            SELECT id, order_id, line_no, product_id, unit_price, quantity, subtotal
            FROM order_lines
            WHERE order_id = ANY($1)
            ORDER BY order_id, line_no
            "#,
        )
        .bind(ids)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("load_order_lines", e))?;

        let mut lines: HashMap<Uuid, Vec<OrderLine>> = HashMap::new();
        for row in &line_rows {
            let line = OrderLineRow::from_row(row)
                .map_err(|e| StoreError::Corrupt(format!("order line row: {e}")))?;
            lines.entry(line.order_id).or_default().push(line.try_into()?);
        }

        headers
            .into_iter()
            .map(|h| {
                let order_lines = lines.remove(&h.id).unwrap_or_default();
                h.into_order(order_lines)
            })
            .collect()
    }
}

/// Unit of work over [`PostgresStore`]: one open transaction.
pub struct PostgresUnit {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl Store for PostgresStore {
    type Unit = PostgresUnit;

    async fn begin(&self) -> Result<Self::Unit, StoreError> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;
        Ok(PostgresUnit { tx })
    }
}

#[async_trait]
impl UnitOfWork for PostgresUnit {
    #[instrument(skip(self), fields(product_id = %id), err)]
    async fn lock_product(&mut self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, seller_id, name, description, price, stock, image, created_at, updated_at
            FROM products
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("lock_product", e))?;

        row.map(|r| product_from_row(&r)).transpose()
    }

    #[instrument(skip(self, product), fields(product_id = %product.id_typed()), err)]
    async fn save_product(&mut self, product: &Product) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE products
            SET name = $2, description = $3, price = $4, stock = $5, image = $6, updated_at = $7
            WHERE id = $1
            "#,
        )
        .bind(product.id_typed().as_uuid())
        .bind(product.name())
        .bind(product.description())
        .bind(to_db_amount(product.price(), "price")?)
        .bind(product.stock())
        .bind(product.image())
        .bind(product.updated_at())
        .execute(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("save_product", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("product {}", product.id_typed())));
        }
        Ok(())
    }

    #[instrument(skip(self, ids), fields(buyer_id = %buyer_id, requested = ids.len()), err)]
    async fn cart_lines(
        &mut self,
        buyer_id: UserId,
        ids: &[CartLineId],
    ) -> Result<Vec<CartLine>, StoreError> {
        let ids: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();
        let rows = sqlx::query(
            r#"
            SELECT id, buyer_id, product_id, quantity, created_at, updated_at
            FROM cart_lines
            WHERE buyer_id = $1 AND id = ANY($2)
            ORDER BY created_at, id
            FOR UPDATE
            "#,
        )
        .bind(buyer_id.as_uuid())
        .bind(ids)
        .fetch_all(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("cart_lines", e))?;

        rows.iter().map(cart_line_from_row).collect()
    }

    #[instrument(skip(self, ids), fields(buyer_id = %buyer_id, requested = ids.len()), err)]
    async fn delete_cart_lines(
        &mut self,
        buyer_id: UserId,
        ids: &[CartLineId],
    ) -> Result<u64, StoreError> {
        let ids: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();
        let result = sqlx::query("DELETE FROM cart_lines WHERE buyer_id = $1 AND id = ANY($2)")
            .bind(buyer_id.as_uuid())
            .bind(ids)
            .execute(&mut *self.tx)
            .await
            .map_err(|e| map_sqlx_error("delete_cart_lines", e))?;
        Ok(result.rows_affected())
    }

    #[instrument(skip(self, order), fields(order_id = %order.id_typed(), lines = order.lines().len()), err)]
    async fn insert_order(&mut self, order: &Order) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO orders (id, buyer_id, platform_fee, grand_total, status, version, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(order.id_typed().as_uuid())
        .bind(order.buyer_id().as_uuid())
        .bind(to_db_amount(order.platform_fee(), "platform_fee")?)
        .bind(to_db_amount(order.grand_total(), "grand_total")?)
        .bind(order.status().as_str())
        .bind(to_db_amount(order.version(), "version")?)
        .bind(order.created_at())
        .bind(order.updated_at())
        .execute(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("insert_order", e))?;

        for (idx, line) in order.lines().iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO order_lines (id, order_id, line_no, product_id, unit_price, quantity, subtotal)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(line.id.as_uuid())
            .bind(order.id_typed().as_uuid())
            .bind((idx + 1) as i32)
            .bind(line.product_id.as_uuid())
            .bind(to_db_amount(line.unit_price, "unit_price")?)
            .bind(line.quantity)
            .bind(to_db_amount(line.subtotal, "subtotal")?)
            .execute(&mut *self.tx)
            .await
            .map_err(|e| map_sqlx_error("insert_order_line", e))?;
        }
        Ok(())
    }

    async fn commit(self) -> Result<(), StoreError> {
        self.tx
            .commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))
    }

    async fn rollback(self) -> Result<(), StoreError> {
        self.tx
            .rollback()
            .await
            .map_err(|e| map_sqlx_error("rollback", e))
    }
}

#[async_trait]
impl CatalogRepository for PostgresStore {
    #[instrument(skip(self, product), fields(product_id = %product.id_typed()), err)]
    async fn insert_product(&self, product: &Product) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO products (id, seller_id, name, description, price, stock, image, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(product.id_typed().as_uuid())
        .bind(product.seller_id().as_uuid())
        .bind(product.name())
        .bind(product.description())
        .bind(to_db_amount(product.price(), "price")?)
        .bind(product.stock())
        .bind(product.image())
        .bind(product.created_at())
        .bind(product.updated_at())
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_product", e))?;
        Ok(())
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, seller_id, name, description, price, stock, image, created_at, updated_at
            FROM products
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_product", e))?;

        row.map(|r| product_from_row(&r)).transpose()
    }

    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, seller_id, name, description, price, stock, image, created_at, updated_at
            FROM products
            ORDER BY created_at, id
            "#,
        )
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_products", e))?;

        rows.iter().map(product_from_row).collect()
    }

    // Cart lines go with the product through `ON DELETE CASCADE`; order lines
    // have no cascade, so an ordered product trips the foreign key.
    #[instrument(skip(self), fields(seller_id = %seller_id, product_id = %id), err)]
    async fn delete_product(&self, seller_id: UserId, id: ProductId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1 AND seller_id = $2")
            .bind(id.as_uuid())
            .bind(seller_id.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(|e| {
                if is_foreign_key_violation(&e) {
                    StoreError::InUse(format!("product {id}"))
                } else {
                    map_sqlx_error("delete_product", e)
                }
            })?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl CartRepository for PostgresStore {
    #[instrument(skip(self, line), fields(buyer_id = %line.buyer_id(), product_id = %line.product_id()), err)]
    async fn add_or_merge_line(&self, line: CartLine) -> Result<CartLine, StoreError> {
        let row = sqlx::query(
            r#"
            INSERT INTO cart_lines (id, buyer_id, product_id, quantity, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (buyer_id, product_id) DO UPDATE
            SET quantity = cart_lines.quantity + EXCLUDED.quantity,
                updated_at = EXCLUDED.updated_at
            RETURNING id, buyer_id, product_id, quantity, created_at, updated_at
            "#,
        )
        .bind(line.id_typed().as_uuid())
        .bind(line.buyer_id().as_uuid())
        .bind(line.product_id().as_uuid())
        .bind(line.quantity())
        .bind(line.created_at())
        .bind(line.updated_at())
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("add_or_merge_line", e))?;

        cart_line_from_row(&row)
    }

    async fn get_line(
        &self,
        buyer_id: UserId,
        id: CartLineId,
    ) -> Result<Option<CartLine>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, buyer_id, product_id, quantity, created_at, updated_at
            FROM cart_lines
            WHERE id = $1 AND buyer_id = $2
            "#,
        )
        .bind(id.as_uuid())
        .bind(buyer_id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_line", e))?;

        row.map(|r| cart_line_from_row(&r)).transpose()
    }

    async fn save_line(&self, line: &CartLine) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE cart_lines SET quantity = $3, updated_at = $4 WHERE id = $1 AND buyer_id = $2",
        )
        .bind(line.id_typed().as_uuid())
        .bind(line.buyer_id().as_uuid())
        .bind(line.quantity())
        .bind(line.updated_at())
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("save_line", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("cart line {}", line.id_typed())));
        }
        Ok(())
    }

    async fn remove_line(&self, buyer_id: UserId, id: CartLineId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM cart_lines WHERE id = $1 AND buyer_id = $2")
            .bind(id.as_uuid())
            .bind(buyer_id.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("remove_line", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn lines_for_buyer(&self, buyer_id: UserId) -> Result<Vec<CartLine>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, buyer_id, product_id, quantity, created_at, updated_at
            FROM cart_lines
            WHERE buyer_id = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(buyer_id.as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("lines_for_buyer", e))?;

        rows.iter().map(cart_line_from_row).collect()
    }
}

#[async_trait]
impl OrderRepository for PostgresStore {
    async fn get_order(&self, id: OrderId) -> Result<Option<Order>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, buyer_id, platform_fee, grand_total, status, version, created_at, updated_at
            FROM orders
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_order", e))?;

        Ok(self.attach_lines(rows).await?.into_iter().next())
    }

    #[instrument(skip(self), fields(buyer_id = %buyer_id), err)]
    async fn orders_for_buyer(&self, buyer_id: UserId) -> Result<Vec<Order>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, buyer_id, platform_fee, grand_total, status, version, created_at, updated_at
            FROM orders
            WHERE buyer_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(buyer_id.as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("orders_for_buyer", e))?;

        self.attach_lines(rows).await
    }

    #[instrument(skip(self), fields(seller_id = %seller_id), err)]
    async fn orders_for_seller(&self, seller_id: UserId) -> Result<Vec<Order>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT o.id, o.buyer_id, o.platform_fee, o.grand_total, o.status, o.version,
                   o.created_at, o.updated_at
            FROM orders o
            WHERE EXISTS (
                SELECT 1
                FROM order_lines l
                JOIN products p ON p.id = l.product_id
                WHERE l.order_id = o.id AND p.seller_id = $1
            )
            ORDER BY o.created_at DESC, o.id DESC
            "#,
        )
        .bind(seller_id.as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("orders_for_seller", e))?;

        self.attach_lines(rows).await
    }

    #[instrument(
        skip(self, order),
        fields(order_id = %order.id_typed(), status = %order.status()),
        err
    )]
    async fn save_status(&self, order: &Order, expected_version: u64) -> Result<(), StoreError> {
        let id = order.id_typed();
        let result = sqlx::query(
            "UPDATE orders SET status = $2, updated_at = $3, version = $4 WHERE id = $1 AND version = $5",
        )
        .bind(id.as_uuid())
        .bind(order.status().as_str())
        .bind(order.updated_at())
        .bind(to_db_amount(order.version(), "version")?)
        .bind(to_db_amount(expected_version, "version")?)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("save_status", e))?;
        if result.rows_affected() > 0 {
            return Ok(());
        }

        let current: Option<i64> = sqlx::query("SELECT version FROM orders WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("save_status", e))?
            .map(|row| row.try_get("version"))
            .transpose()
            .map_err(|e| StoreError::Corrupt(format!("order version: {e}")))?;

        match current {
            None => Err(StoreError::NotFound(format!("order {id}"))),
            Some(found) => Err(StoreError::Concurrency(format!(
                "order {id}: expected version {expected_version}, found {found}"
            ))),
        }
    }
}

fn to_db_amount(value: u64, field: &str) -> Result<i64, StoreError> {
    i64::try_from(value)
        .map_err(|_| StoreError::Constraint(format!("{field} {value} does not fit in BIGINT")))
}

fn from_db_amount(value: i64, field: &str) -> Result<u64, StoreError> {
    u64::try_from(value).map_err(|_| StoreError::Corrupt(format!("{field} is negative ({value})")))
}

fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23503"))
}

/// Map SQLx errors to StoreError.
fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some("40001") | Some("40P01") => StoreError::Concurrency(msg),
                Some("23505") | Some("23503") | Some("23514") => StoreError::Constraint(msg),
                _ => StoreError::Backend(msg),
            }
        }
        sqlx::Error::PoolClosed => {
            StoreError::Backend(format!("connection pool closed in {}", operation))
        }
        sqlx::Error::RowNotFound => {
            StoreError::Backend(format!("unexpected row not found in {}", operation))
        }
        _ => StoreError::Backend(format!("sqlx error in {}: {}", operation, err)),
    }
}

// SQLx row types

#[derive(Debug)]
struct ProductRow {
    id: Uuid,
    seller_id: Uuid,
    name: String,
    description: String,
    price: i64,
    stock: i64,
    image: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl<'r> sqlx::FromRow<'r, PgRow> for ProductRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(ProductRow {
            id: row.try_get("id")?,
            seller_id: row.try_get("seller_id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            price: row.try_get("price")?,
            stock: row.try_get("stock")?,
            image: row.try_get("image")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

fn product_from_row(row: &PgRow) -> Result<Product, StoreError> {
    let row = ProductRow::from_row(row)
        .map_err(|e| StoreError::Corrupt(format!("product row: {e}")))?;
    let record = ProductRecord {
        id: ProductId::from(row.id),
        seller_id: UserId::from_uuid(row.seller_id),
        name: row.name,
        description: row.description,
        price: from_db_amount(row.price, "price")?,
        stock: row.stock,
        image: row.image,
        created_at: row.created_at,
        updated_at: row.updated_at,
    };
    Product::try_from(record).map_err(|e| StoreError::Corrupt(e.to_string()))
}

#[derive(Debug)]
struct CartLineRow {
    id: Uuid,
    buyer_id: Uuid,
    product_id: Uuid,
    quantity: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl<'r> sqlx::FromRow<'r, PgRow> for CartLineRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(CartLineRow {
            id: row.try_get("id")?,
            buyer_id: row.try_get("buyer_id")?,
            product_id: row.try_get("product_id")?,
            quantity: row.try_get("quantity")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

fn cart_line_from_row(row: &PgRow) -> Result<CartLine, StoreError> {
    let row = CartLineRow::from_row(row)
        .map_err(|e| StoreError::Corrupt(format!("cart line row: {e}")))?;
    CartLine::restore(
        CartLineId::from(row.id),
        UserId::from_uuid(row.buyer_id),
        ProductId::from(row.product_id),
        row.quantity,
        row.created_at,
        row.updated_at,
    )
    .map_err(|e| StoreError::Corrupt(e.to_string()))
}

#[derive(Debug)]
struct OrderRow {
    id: Uuid,
    buyer_id: Uuid,
    platform_fee: i64,
    grand_total: i64,
    status: String,
    version: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl<'r> sqlx::FromRow<'r, PgRow> for OrderRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(OrderRow {
            id: row.try_get("id")?,
            buyer_id: row.try_get("buyer_id")?,
            platform_fee: row.try_get("platform_fee")?,
            grand_total: row.try_get("grand_total")?,
            status: row.try_get("status")?,
            version: row.try_get("version")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl OrderRow {
    fn into_order(self, lines: Vec<OrderLine>) -> Result<Order, StoreError> {
        let status: OrderStatus = self
            .status
            .parse()
            .map_err(|e: bazaar_core::DomainError| StoreError::Corrupt(e.to_string()))?;
        Ok(Order::from(OrderRecord {
            id: OrderId::from(self.id),
            buyer_id: UserId::from_uuid(self.buyer_id),
            lines,
            platform_fee: from_db_amount(self.platform_fee, "platform_fee")?,
            grand_total: from_db_amount(self.grand_total, "grand_total")?,
            status,
            created_at: self.created_at,
            updated_at: self.updated_at,
            version: from_db_amount(self.version, "version")?,
        }))
    }
}

#[derive(Debug)]
struct OrderLineRow {
    id: Uuid,
    order_id: Uuid,
    product_id: Uuid,
    unit_price: i64,
    quantity: i64,
    subtotal: i64,
}

impl<'r> sqlx::FromRow<'r, PgRow> for OrderLineRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(OrderLineRow {
            id: row.try_get("id")?,
            order_id: row.try_get("order_id")?,
            product_id: row.try_get("product_id")?,
            unit_price: row.try_get("unit_price")?,
            quantity: row.try_get("quantity")?,
            subtotal: row.try_get("subtotal")?,
        })
    }
}

impl TryFrom<OrderLineRow> for OrderLine {
    type Error = StoreError;

    fn try_from(row: OrderLineRow) -> Result<Self, Self::Error> {
        Ok(OrderLine {
            id: OrderLineId::from(row.id),
            product_id: ProductId::from(row.product_id),
            unit_price: from_db_amount(row.unit_price, "unit_price")?,
            quantity: row.quantity,
            subtotal: from_db_amount(row.subtotal, "subtotal")?,
        })
    }
}
