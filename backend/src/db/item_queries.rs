use sqlx::PgPool;
use crate::models::Item;

pub async fn fetch_all(pool: &PgPool) -> Result<Vec<Item>, sqlx::Error> {
    sqlx::query_as::<_, Item>(
        "SELECT id, name, created_at
         FROM items
         ORDER BY name ASC",
    )
        .fetch_all(pool)
        .await
}

pub async fn insert(pool: &PgPool, input: Item) -> Result<Item, sqlx::Error> {
    sqlx::query_as::<_, Item>(
        "INSERT INTO items (id, name, created_at)
         VALUES ($1, $2, $3)
         RETURNING id, name, created_at",
    )
        .bind(input.id)
        .bind(input.name)
        .bind(input.created_at)
        .fetch_one(pool)
        .await
}
