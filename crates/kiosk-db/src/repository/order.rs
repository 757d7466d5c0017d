//! # Order Repository
//!
//! Transactional order writes. This is the checkout's [`OrderSink`].
//!
//! ## Write Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BEGIN                                                                  │
//! │   1. INSERT customer ... ON CONFLICT(email) DO UPDATE name, phone      │
//! │   2. INSERT orders (total = 0)                                          │
//! │   3. for each line:                                                     │
//! │        INSERT order_details                                             │
//! │        INSERT order_detail_sweeteners  (one row per sweetener)          │
//! │        INSERT order_detail_creamers    (one row per creamer)            │
//! │   4. UPDATE orders SET order_total_cents = Σ line totals               │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  Any failure ──► ROLLBACK. No customer, header, detail or addon row    │
//! │  from this attempt survives.                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};

use kiosk_core::checkout::AddonCharge;
use kiosk_core::{Money, NewOrder, OrderSink};

use crate::error::{DbError, DbResult};

// =============================================================================
// Read Models
// =============================================================================

/// A stored order header with its customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct OrderRecord {
    pub id: i64,
    pub customer_id: i64,
    pub customer_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub pickup_note: Option<String>,
    pub order_total: Money,
    pub created_at: DateTime<Utc>,
    #[sqlx(skip)]
    pub lines: Vec<OrderDetailRecord>,
}

/// A stored order line and the addons recorded against it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct OrderDetailRecord {
    pub id: i64,
    pub coffee_id: i64,
    pub size_id: i64,
    pub quantity: i64,
    pub unit_price: Money,
    pub line_total: Money,
    #[sqlx(skip)]
    pub sweetener_ids: Vec<i64>,
    #[sqlx(skip)]
    pub creamer_ids: Vec<i64>,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for orders and customers.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Writes a whole order in one transaction and returns its id.
    pub async fn create(&self, order: &NewOrder) -> DbResult<i64> {
        debug!(
            email = %order.customer.email,
            lines = order.lines.len(),
            total = %order.order_total,
            "Creating order"
        );

        let mut tx = self.pool.begin().await?;

        match write_order(&mut tx, order).await {
            Ok(order_id) => {
                tx.commit().await?;
                info!(order_id, total = %order.order_total, "Order persisted");
                Ok(order_id)
            }
            Err(e) => {
                if let Err(rollback_err) = tx.rollback().await {
                    warn!(error = %rollback_err, "Order rollback failed");
                }
                warn!(error = %e, "Order write failed; rolled back");
                Err(e)
            }
        }
    }

    /// Loads an order with its lines.
    pub async fn get(&self, order_id: i64) -> DbResult<OrderRecord> {
        let mut order = sqlx::query_as::<_, OrderRecord>(
            r#"
            SELECT o.id, o.customer_id, c.full_name AS customer_name, c.email, c.phone,
                   o.pickup_note, o.order_total_cents AS order_total, o.created_at
            FROM orders o
            INNER JOIN customers c ON c.id = o.customer_id
            WHERE o.id = ?1
            "#,
        )
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("Order", order_id))?;

        let mut lines = sqlx::query_as::<_, OrderDetailRecord>(
            r#"
            SELECT id, coffee_id, size_id, quantity,
                   unit_price_cents AS unit_price, line_total_cents AS line_total
            FROM order_details
            WHERE order_id = ?1
            ORDER BY id
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        for line in &mut lines {
            line.sweetener_ids = sqlx::query_scalar(
                "SELECT sweetener_id FROM order_detail_sweeteners WHERE order_detail_id = ?1 ORDER BY sweetener_id",
            )
            .bind(line.id)
            .fetch_all(&self.pool)
            .await?;

            line.creamer_ids = sqlx::query_scalar(
                "SELECT creamer_id FROM order_detail_creamers WHERE order_detail_id = ?1 ORDER BY creamer_id",
            )
            .bind(line.id)
            .fetch_all(&self.pool)
            .await?;
        }

        order.lines = lines;
        Ok(order)
    }

    /// Number of stored orders.
    pub async fn count(&self) -> DbResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Number of stored customers.
    pub async fn count_customers(&self) -> DbResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM customers")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

impl OrderSink for OrderRepository {
    type Error = DbError;

    async fn persist(&self, order: &NewOrder) -> Result<i64, DbError> {
        self.create(order).await
    }
}

// =============================================================================
// Transaction Body
// =============================================================================

async fn write_order(conn: &mut SqliteConnection, order: &NewOrder) -> DbResult<i64> {
    let customer_id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO customers (full_name, email, phone)
        VALUES (?1, ?2, ?3)
        ON CONFLICT(email) DO UPDATE SET
            full_name = excluded.full_name,
            phone = excluded.phone
        RETURNING id
        "#,
    )
    .bind(&order.customer.name)
    .bind(&order.customer.email)
    .bind(order.customer.phone.as_deref())
    .fetch_one(&mut *conn)
    .await?;

    let order_id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO orders (customer_id, pickup_note, order_total_cents, created_at)
        VALUES (?1, ?2, 0, ?3)
        RETURNING id
        "#,
    )
    .bind(customer_id)
    .bind(order.pickup_note.as_deref())
    .bind(Utc::now())
    .fetch_one(&mut *conn)
    .await?;

    for line in &order.lines {
        let detail_id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO order_details
                (order_id, coffee_id, size_id, quantity, unit_price_cents, line_total_cents)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            RETURNING id
            "#,
        )
        .bind(order_id)
        .bind(line.coffee_id)
        .bind(line.size_id)
        .bind(line.quantity.get())
        .bind(line.unit_price.cents())
        .bind(line.line_total.cents())
        .fetch_one(&mut *conn)
        .await?;

        insert_addons(
            conn,
            "INSERT INTO order_detail_sweeteners (order_detail_id, sweetener_id, quantity, additional_cost_cents) VALUES (?1, ?2, ?3, ?4)",
            detail_id,
            line.quantity.get(),
            &line.sweeteners,
        )
        .await?;

        insert_addons(
            conn,
            "INSERT INTO order_detail_creamers (order_detail_id, creamer_id, quantity, additional_cost_cents) VALUES (?1, ?2, ?3, ?4)",
            detail_id,
            line.quantity.get(),
            &line.creamers,
        )
        .await?;
    }

    sqlx::query("UPDATE orders SET order_total_cents = ?1 WHERE id = ?2")
        .bind(order.order_total.cents())
        .bind(order_id)
        .execute(&mut *conn)
        .await?;

    Ok(order_id)
}

async fn insert_addons(
    conn: &mut SqliteConnection,
    sql: &'static str,
    detail_id: i64,
    quantity: i64,
    addons: &[AddonCharge],
) -> DbResult<()> {
    for addon in addons {
        sqlx::query(sql)
            .bind(detail_id)
            .bind(addon.id)
            .bind(quantity)
            .bind(addon.additional_cost.cents())
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
