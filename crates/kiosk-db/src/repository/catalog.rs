//! # Catalog Repository
//!
//! Reads the menu as one consistent snapshot and writes menu rows for the
//! seeder.
//!
//! ## Snapshot Consistency
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BEGIN                                                                  │
//! │    SELECT ... FROM coffees    ORDER BY name                             │
//! │    SELECT ... FROM sizes      ORDER BY ounces, label                    │
//! │    SELECT ... FROM sweeteners ORDER BY name                             │
//! │    SELECT ... FROM creamers   ORDER BY name                             │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  All four reads see the same database state, so a menu edit running    │
//! │  at the same time shows up entirely or not at all.                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Prices live in `*_cents` columns and are aliased onto the domain field
//! names so rows decode straight into `kiosk_core` types.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use kiosk_core::{Catalog, Coffee, Creamer, Money, Size, Sweetener};

use crate::error::DbResult;

/// Repository for the menu tables.
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    pool: SqlitePool,
}

impl CatalogRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CatalogRepository { pool }
    }

    /// Loads the whole menu inside one read transaction.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let catalog = db.catalog().load().await?;
    /// let latte = catalog.coffee(2);
    /// ```
    pub async fn load(&self) -> DbResult<Catalog> {
        let mut tx = self.pool.begin().await?;

        let coffees = sqlx::query_as::<_, Coffee>(
            r#"
            SELECT id, name, description, base_price_cents AS base_price
            FROM coffees
            ORDER BY name
            "#,
        )
        .fetch_all(&mut *tx)
        .await?;

        let sizes = sqlx::query_as::<_, Size>(
            r#"
            SELECT id, label, ounces, price_modifier_cents AS price_modifier
            FROM sizes
            ORDER BY ounces, label
            "#,
        )
        .fetch_all(&mut *tx)
        .await?;

        let sweeteners = sqlx::query_as::<_, Sweetener>(
            r#"
            SELECT id, name, additional_cost_cents AS additional_cost
            FROM sweeteners
            ORDER BY name
            "#,
        )
        .fetch_all(&mut *tx)
        .await?;

        let creamers = sqlx::query_as::<_, Creamer>(
            r#"
            SELECT id, name, is_flavored, additional_cost_cents AS additional_cost
            FROM creamers
            ORDER BY name
            "#,
        )
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        debug!(
            coffees = coffees.len(),
            sizes = sizes.len(),
            sweeteners = sweeteners.len(),
            creamers = creamers.len(),
            "Loaded catalog snapshot"
        );

        Ok(Catalog::new(coffees, sizes, sweeteners, creamers))
    }

    pub async fn upsert_coffee(
        &self,
        name: &str,
        description: Option<&str>,
        base_price: Money,
    ) -> DbResult<i64> {
        let mut conn = self.pool.acquire().await?;
        upsert_coffee(&mut conn, name, description, base_price).await
    }

    pub async fn upsert_size(&self, label: &str, ounces: i64, price_modifier: Money) -> DbResult<i64> {
        let mut conn = self.pool.acquire().await?;
        upsert_size(&mut conn, label, ounces, price_modifier).await
    }

    pub async fn upsert_sweetener(&self, name: &str, additional_cost: Money) -> DbResult<i64> {
        let mut conn = self.pool.acquire().await?;
        upsert_sweetener(&mut conn, name, additional_cost).await
    }

    pub async fn upsert_creamer(
        &self,
        name: &str,
        is_flavored: bool,
        additional_cost: Money,
    ) -> DbResult<i64> {
        let mut conn = self.pool.acquire().await?;
        upsert_creamer(&mut conn, name, is_flavored, additional_cost).await
    }
}

// =============================================================================
// Upserts (keyed by the unique name / label)
// =============================================================================
// These take a bare connection so the seeder can run them inside one
// transaction. Costs are clamped at zero; sizes hold at least one ounce.

pub(crate) async fn upsert_coffee(
    conn: &mut SqliteConnection,
    name: &str,
    description: Option<&str>,
    base_price: Money,
) -> DbResult<i64> {
    let id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO coffees (name, description, base_price_cents)
        VALUES (?1, ?2, ?3)
        ON CONFLICT(name) DO UPDATE SET
            description = excluded.description,
            base_price_cents = excluded.base_price_cents
        RETURNING id
        "#,
    )
    .bind(name)
    .bind(description)
    .bind(base_price.non_negative().cents())
    .fetch_one(&mut *conn)
    .await?;

    Ok(id)
}

pub(crate) async fn upsert_size(
    conn: &mut SqliteConnection,
    label: &str,
    ounces: i64,
    price_modifier: Money,
) -> DbResult<i64> {
    let id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO sizes (label, ounces, price_modifier_cents)
        VALUES (?1, ?2, ?3)
        ON CONFLICT(label) DO UPDATE SET
            ounces = excluded.ounces,
            price_modifier_cents = excluded.price_modifier_cents
        RETURNING id
        "#,
    )
    .bind(label)
    .bind(ounces.max(1))
    .bind(price_modifier.non_negative().cents())
    .fetch_one(&mut *conn)
    .await?;

    Ok(id)
}

pub(crate) async fn upsert_sweetener(
    conn: &mut SqliteConnection,
    name: &str,
    additional_cost: Money,
) -> DbResult<i64> {
    let id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO sweeteners (name, additional_cost_cents)
        VALUES (?1, ?2)
        ON CONFLICT(name) DO UPDATE SET
            additional_cost_cents = excluded.additional_cost_cents
        RETURNING id
        "#,
    )
    .bind(name)
    .bind(additional_cost.non_negative().cents())
    .fetch_one(&mut *conn)
    .await?;

    Ok(id)
}

pub(crate) async fn upsert_creamer(
    conn: &mut SqliteConnection,
    name: &str,
    is_flavored: bool,
    additional_cost: Money,
) -> DbResult<i64> {
    let id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO creamers (name, is_flavored, additional_cost_cents)
        VALUES (?1, ?2, ?3)
        ON CONFLICT(name) DO UPDATE SET
            is_flavored = excluded.is_flavored,
            additional_cost_cents = excluded.additional_cost_cents
        RETURNING id
        "#,
    )
    .bind(name)
    .bind(is_flavored)
    .bind(additional_cost.non_negative().cents())
    .fetch_one(&mut *conn)
    .await?;

    Ok(id)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::{Database, DbConfig};
    use kiosk_core::Money;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_empty_catalog() {
        let db = test_db().await;
        let catalog = db.catalog().load().await.unwrap();
        assert!(catalog.is_empty());
    }

    #[tokio::test]
    async fn test_load_orders_and_decodes_money() {
        let db = test_db().await;
        let repo = db.catalog();

        repo.upsert_coffee("Mocha", None, Money::from_cents(395)).await.unwrap();
        let latte = repo
            .upsert_coffee("Latte", Some("Espresso with steamed milk"), Money::from_cents(340))
            .await
            .unwrap();
        repo.upsert_size("Large", 16, Money::from_cents(125)).await.unwrap();
        repo.upsert_size("Small", 8, Money::zero()).await.unwrap();
        repo.upsert_creamer("Vanilla Creamer", true, Money::from_cents(35))
            .await
            .unwrap();

        let catalog = repo.load().await.unwrap();

        let names: Vec<_> = catalog.coffees().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Latte", "Mocha"]);
        let labels: Vec<_> = catalog.sizes().iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, ["Small", "Large"]);

        let coffee = catalog.coffee(latte).unwrap();
        assert_eq!(coffee.base_price.cents(), 340);
        assert_eq!(coffee.description.as_deref(), Some("Espresso with steamed milk"));
        assert!(catalog.creamers()[0].is_flavored);
    }

    #[tokio::test]
    async fn test_upsert_keeps_id_and_clamps_costs() {
        let db = test_db().await;
        let repo = db.catalog();

        let first = repo.upsert_sweetener("Honey", Money::from_cents(25)).await.unwrap();
        let second = repo.upsert_sweetener("Honey", Money::from_cents(-5)).await.unwrap();
        assert_eq!(first, second);

        let size = repo.upsert_size("Tiny", 0, Money::from_cents(-10)).await.unwrap();

        let catalog = repo.load().await.unwrap();
        assert_eq!(catalog.sweetener(first).unwrap().additional_cost, Money::zero());
        assert_eq!(catalog.sweeteners().len(), 1);
        assert_eq!(catalog.size(size).unwrap().ounces, 1);
        assert_eq!(catalog.size(size).unwrap().price_modifier, Money::zero());
    }
}
