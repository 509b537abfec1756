use super::{InteractionStore, SalesStore};
use crate::config::PostgresConfig;
use crate::error::{RecError, RecResult};
use crate::models::*;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use tracing::{debug, info};

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS products (
        product_id BIGSERIAL PRIMARY KEY,
        name TEXT NOT NULL,
        category TEXT NOT NULL,
        price DOUBLE PRECISION NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS users (
        user_id BIGSERIAL PRIMARY KEY,
        email TEXT NOT NULL UNIQUE,
        age INTEGER NOT NULL,
        country TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS interactions (
        interaction_id BIGSERIAL PRIMARY KEY,
        user_id BIGINT NOT NULL REFERENCES users (user_id),
        product_id BIGINT NOT NULL REFERENCES products (product_id),
        event_type TEXT NOT NULL,
        timestamp TIMESTAMPTZ NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS sales_summary (
        sale_date DATE PRIMARY KEY,
        total_sales DOUBLE PRECISION NOT NULL,
        unique_customers BIGINT NOT NULL,
        total_products_sold BIGINT NOT NULL
    )
    "#,
];

/// PostgreSQL-backed store. Every statement binds its values.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(config: &PostgresConfig) -> RecResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.url)
            .await?;

        info!("Connected to PostgreSQL (max {} connections)", config.max_connections);
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn ensure_schema(&self) -> RecResult<()> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        debug!("Schema ensured");
        Ok(())
    }

    pub async fn insert_products(&self, products: &[NewProduct]) -> RecResult<Vec<ProductId>> {
        let mut ids = Vec::with_capacity(products.len());
        for product in products {
            let id: i64 = sqlx::query_scalar(
                "INSERT INTO products (name, category, price) VALUES ($1, $2, $3) RETURNING product_id",
            )
            .bind(&product.name)
            .bind(&product.category)
            .bind(product.price)
            .fetch_one(&self.pool)
            .await?;
            ids.push(ProductId(id));
        }
        Ok(ids)
    }

    pub async fn insert_users(&self, users: &[NewUser]) -> RecResult<Vec<UserId>> {
        let mut ids = Vec::with_capacity(users.len());
        for user in users {
            let id: i64 = sqlx::query_scalar(
                "INSERT INTO users (email, age, country) VALUES ($1, $2, $3) RETURNING user_id",
            )
            .bind(&user.email)
            .bind(user.age)
            .bind(&user.country)
            .fetch_one(&self.pool)
            .await?;
            ids.push(UserId(id));
        }
        Ok(ids)
    }

    pub async fn insert_interactions(&self, interactions: &[Interaction]) -> RecResult<()> {
        let mut tx = self.pool.begin().await?;
        for interaction in interactions {
            sqlx::query(
                "INSERT INTO interactions (user_id, product_id, event_type, timestamp) VALUES ($1, $2, $3, $4)",
            )
            .bind(interaction.user_id.0)
            .bind(interaction.product_id.0)
            .bind(interaction.event_type.as_str())
            .bind(interaction.timestamp)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }
}

fn interaction_from_row(row: &PgRow) -> RecResult<Interaction> {
    let event_type: String = row.try_get("event_type")?;
    Ok(Interaction {
        user_id: UserId(row.try_get("user_id")?),
        product_id: ProductId(row.try_get("product_id")?),
        event_type: event_type.parse()?,
        timestamp: row.try_get("timestamp")?,
    })
}

fn product_from_row(row: &PgRow) -> RecResult<Product> {
    Ok(Product {
        product_id: ProductId(row.try_get("product_id")?),
        name: row.try_get("name")?,
        category: row.try_get("category")?,
        price: row.try_get("price")?,
    })
}

fn summary_from_row(row: &PgRow) -> RecResult<SalesSummary> {
    Ok(SalesSummary {
        sale_date: row.try_get("sale_date")?,
        total_sales: row.try_get("total_sales")?,
        unique_customers: row.try_get("unique_customers")?,
        total_products_sold: row.try_get("total_products_sold")?,
    })
}

#[async_trait::async_trait]
impl InteractionStore for PgStore {
    async fn interactions(&self, since: Option<DateTime<Utc>>) -> RecResult<Vec<Interaction>> {
        let rows = sqlx::query(
            r#"
            SELECT user_id, product_id, event_type, timestamp
            FROM interactions
            WHERE $1::timestamptz IS NULL OR timestamp >= $1
            "#,
        )
        .bind(since)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(interaction_from_row).collect()
    }

    async fn products(&self, ids: &[ProductId]) -> RecResult<Vec<Product>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let raw: Vec<i64> = ids.iter().map(|id| id.0).collect();
        let rows = sqlx::query(
            "SELECT product_id, name, category, price FROM products WHERE product_id = ANY($1)",
        )
        .bind(raw)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(product_from_row).collect()
    }

    async fn purchase_counts(&self) -> RecResult<Vec<(ProductId, u64)>> {
        let rows = sqlx::query(
            r#"
            SELECT product_id, COUNT(*) AS purchases
            FROM interactions
            WHERE event_type = $1
            GROUP BY product_id
            "#,
        )
        .bind(EventType::Purchase.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> RecResult<(ProductId, u64)> {
                let product_id: i64 = row.try_get("product_id")?;
                let purchases: i64 = row.try_get("purchases")?;
                let purchases = u64::try_from(purchases)
                    .map_err(|_| RecError::DataUnavailable("negative purchase count".to_string()))?;
                Ok((ProductId(product_id), purchases))
            })
            .collect()
    }
}

#[async_trait::async_trait]
impl SalesStore for PgStore {
    async fn purchases(&self) -> RecResult<Vec<PurchaseRow>> {
        let rows = sqlx::query(
            r#"
            SELECT (i.timestamp AT TIME ZONE 'UTC')::date AS sale_date, p.price, i.user_id
            FROM interactions i
            JOIN products p ON i.product_id = p.product_id
            WHERE i.event_type = $1
            "#,
        )
        .bind(EventType::Purchase.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> RecResult<PurchaseRow> {
                let sale_date: NaiveDate = row.try_get("sale_date")?;
                Ok(PurchaseRow {
                    sale_date,
                    price: row.try_get("price")?,
                    user_id: UserId(row.try_get("user_id")?),
                })
            })
            .collect()
    }

    async fn upsert_sales_summaries(&self, summaries: &[SalesSummary]) -> RecResult<()> {
        let mut tx = self.pool.begin().await?;
        for summary in summaries {
            sqlx::query(
                r#"
                INSERT INTO sales_summary (sale_date, total_sales, unique_customers, total_products_sold)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (sale_date) DO UPDATE SET
                    total_sales = EXCLUDED.total_sales,
                    unique_customers = EXCLUDED.unique_customers,
                    total_products_sold = EXCLUDED.total_products_sold
                "#,
            )
            .bind(summary.sale_date)
            .bind(summary.total_sales)
            .bind(summary.unique_customers)
            .bind(summary.total_products_sold)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn sales_summaries(&self) -> RecResult<Vec<SalesSummary>> {
        let rows = sqlx::query(
            r#"
            SELECT sale_date, total_sales, unique_customers, total_products_sold
            FROM sales_summary
            ORDER BY sale_date
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(summary_from_row).collect()
    }
}
