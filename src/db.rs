//! Postgres-backed repositories.

use anyhow::Context;
use async_trait::async_trait;
use log::{debug, info};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use uuid::Uuid;

use crate::errors::ShoppingResult;
use crate::ids::{CategoryId, ItemId, UserId};
use crate::model::{Category, Item, User};
use crate::repository::{CategoryRepository, ItemRepository, UserRepository};

/// Connect to Postgres and make sure the schema exists
pub async fn connect(database_url: &str, max_connections: u32) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
        .context("Failed to connect to database")?;

    init_database_schema(&pool).await?;
    Ok(pool)
}

/// Initialize the database schema
pub async fn init_database_schema(pool: &PgPool) -> anyhow::Result<()> {
    info!("Initializing database schema...");

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS users (
            id UUID PRIMARY KEY,
            telegram_id TEXT NOT NULL UNIQUE,
            username TEXT,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )",
    )
    .execute(pool)
    .await
    .context("Failed to create users table")?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS categories (
            id UUID PRIMARY KEY,
            name VARCHAR(255) NOT NULL,
            user_id TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )",
    )
    .execute(pool)
    .await
    .context("Failed to create categories table")?;

    // Items go away with their category even if the service-level cascade was interrupted
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS items (
            id UUID PRIMARY KEY,
            name TEXT NOT NULL,
            category_id UUID NOT NULL REFERENCES categories(id) ON DELETE CASCADE,
            user_id TEXT NOT NULL,
            is_completed BOOLEAN NOT NULL DEFAULT FALSE,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )",
    )
    .execute(pool)
    .await
    .context("Failed to create items table")?;

    sqlx::query("CREATE INDEX IF NOT EXISTS categories_user_id_idx ON categories(user_id)")
        .execute(pool)
        .await
        .context("Failed to create categories index")?;

    sqlx::query("CREATE INDEX IF NOT EXISTS items_category_id_idx ON items(category_id)")
        .execute(pool)
        .await
        .context("Failed to create items index")?;

    info!("Database schema initialized successfully");
    Ok(())
}

fn category_from_row(row: &PgRow) -> ShoppingResult<Category> {
    let owner: String = row.try_get("user_id")?;
    Ok(Category::reconstitute(
        CategoryId::from_uuid(row.try_get("id")?),
        row.try_get("name")?,
        owner.parse::<UserId>()?,
        row.try_get("created_at")?,
    ))
}

fn item_from_row(row: &PgRow) -> ShoppingResult<Item> {
    let owner: String = row.try_get("user_id")?;
    Ok(Item::reconstitute(
        ItemId::from_uuid(row.try_get("id")?),
        row.try_get("name")?,
        CategoryId::from_uuid(row.try_get("category_id")?),
        owner.parse::<UserId>()?,
        row.try_get("is_completed")?,
        row.try_get("created_at")?,
    ))
}

fn user_from_row(row: &PgRow) -> ShoppingResult<User> {
    let telegram_id: String = row.try_get("telegram_id")?;
    Ok(User::reconstitute(
        row.try_get::<Uuid, _>("id")?,
        telegram_id.parse::<UserId>()?,
        row.try_get("username")?,
        row.try_get("created_at")?,
    ))
}

#[derive(Debug, Clone)]
pub struct PgCategoryRepository {
    pool: PgPool,
}

impl PgCategoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CategoryRepository for PgCategoryRepository {
    async fn save(&self, category: &Category) -> ShoppingResult<()> {
        debug!("Saving category {}", category.id());

        sqlx::query(
            "INSERT INTO categories (id, name, user_id, created_at) VALUES ($1, $2, $3, $4)
             ON CONFLICT (id) DO UPDATE SET name = EXCLUDED.name",
        )
        .bind(*category.id().as_uuid())
        .bind(category.name())
        .bind(category.owner().as_str())
        .bind(category.created_at())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_id(&self, id: CategoryId) -> ShoppingResult<Option<Category>> {
        let row = sqlx::query("SELECT id, name, user_id, created_at FROM categories WHERE id = $1")
            .bind(*id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(category_from_row).transpose()
    }

    async fn find_by_user_id(&self, owner: &UserId) -> ShoppingResult<Vec<Category>> {
        let rows = sqlx::query(
            "SELECT id, name, user_id, created_at FROM categories
             WHERE user_id = $1 ORDER BY created_at",
        )
        .bind(owner.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(category_from_row).collect()
    }

    async fn delete(&self, id: CategoryId) -> ShoppingResult<bool> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(*id.as_uuid())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() > 0 {
            info!("Category deleted: {id}");
            Ok(true)
        } else {
            info!("No category found with ID: {id}");
            Ok(false)
        }
    }

    async fn exists(&self, id: CategoryId) -> ShoppingResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM categories WHERE id = $1)")
                .bind(*id.as_uuid())
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }
}

#[derive(Debug, Clone)]
pub struct PgItemRepository {
    pool: PgPool,
}

impl PgItemRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ItemRepository for PgItemRepository {
    async fn save(&self, item: &Item) -> ShoppingResult<()> {
        debug!("Saving item {}", item.id());

        sqlx::query(
            "INSERT INTO items (id, name, category_id, user_id, is_completed, created_at)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT (id) DO UPDATE
             SET name = EXCLUDED.name, is_completed = EXCLUDED.is_completed",
        )
        .bind(*item.id().as_uuid())
        .bind(item.name())
        .bind(*item.category_id().as_uuid())
        .bind(item.owner().as_str())
        .bind(item.is_completed())
        .bind(item.created_at())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_id(&self, id: ItemId) -> ShoppingResult<Option<Item>> {
        let row = sqlx::query(
            "SELECT id, name, category_id, user_id, is_completed, created_at FROM items
             WHERE id = $1",
        )
        .bind(*id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(item_from_row).transpose()
    }

    async fn find_by_category_id(&self, category_id: CategoryId) -> ShoppingResult<Vec<Item>> {
        let rows = sqlx::query(
            "SELECT id, name, category_id, user_id, is_completed, created_at FROM items
             WHERE category_id = $1 ORDER BY created_at",
        )
        .bind(*category_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(item_from_row).collect()
    }

    async fn delete(&self, id: ItemId) -> ShoppingResult<bool> {
        let result = sqlx::query("DELETE FROM items WHERE id = $1")
            .bind(*id.as_uuid())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_by_category_id(&self, category_id: CategoryId) -> ShoppingResult<u64> {
        let result = sqlx::query("DELETE FROM items WHERE category_id = $1")
            .bind(*category_id.as_uuid())
            .execute(&self.pool)
            .await?;

        info!(
            "Deleted {} items for category {category_id}",
            result.rows_affected()
        );
        Ok(result.rows_affected())
    }

    async fn exists(&self, id: ItemId) -> ShoppingResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM items WHERE id = $1)")
            .bind(*id.as_uuid())
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }
}

#[derive(Debug, Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn save(&self, user: &User) -> ShoppingResult<()> {
        sqlx::query(
            "INSERT INTO users (id, telegram_id, username, created_at) VALUES ($1, $2, $3, $4)
             ON CONFLICT (telegram_id) DO UPDATE SET username = EXCLUDED.username",
        )
        .bind(user.id())
        .bind(user.telegram_id().as_str())
        .bind(user.username())
        .bind(user.created_at())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_telegram_id(&self, telegram_id: &UserId) -> ShoppingResult<Option<User>> {
        let row = sqlx::query(
            "SELECT id, telegram_id, username, created_at FROM users WHERE telegram_id = $1",
        )
        .bind(telegram_id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn delete(&self, telegram_id: &UserId) -> ShoppingResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE telegram_id = $1")
            .bind(telegram_id.as_str())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn exists(&self, telegram_id: &UserId) -> ShoppingResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE telegram_id = $1)")
                .bind(telegram_id.as_str())
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }
}
