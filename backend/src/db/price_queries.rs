use sqlx::PgPool;
use uuid::Uuid;
use crate::models::PricePoint;

/// Fetch price points ordered by date ascending (oldest first), optionally
/// restricted to one item.
pub async fn fetch_all(
    pool: &PgPool,
    item_id: Option<Uuid>,
) -> Result<Vec<PricePoint>, sqlx::Error> {
    sqlx::query_as::<_, PricePoint>(
        r#"
        SELECT id, item_id, price, date, created_at
        FROM prices
        WHERE ($1::uuid IS NULL OR item_id = $1)
        ORDER BY date ASC, id ASC
        "#,
    )
        .bind(item_id)
        .fetch_all(pool)
        .await
}

pub async fn fetch_latest_batch(pool: &PgPool) -> Result<Vec<PricePoint>, sqlx::Error> {
    // DISTINCT ON keeps the first row per item, i.e. the most recent date
    sqlx::query_as::<_, PricePoint>(
        r#"
        SELECT DISTINCT ON (item_id) id, item_id, price, date, created_at
        FROM prices
        ORDER BY item_id, date DESC
        "#,
    )
        .fetch_all(pool)
        .await
}

pub async fn insert(pool: &PgPool, point: PricePoint) -> Result<PricePoint, sqlx::Error> {
    sqlx::query_as::<_, PricePoint>(
        r#"
        INSERT INTO prices (id, item_id, price, date, created_at)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, item_id, price, date, created_at
        "#,
    )
        .bind(point.id)
        .bind(point.item_id)
        .bind(point.price)
        .bind(point.date)
        .bind(point.created_at)
        .fetch_one(pool)
        .await
}
