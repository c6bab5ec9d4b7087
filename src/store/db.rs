use std::str::FromStr;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use super::{NewRecipe, Recipe, RecipeStore, StoreError, User};

/// SQLite backend: one row per recipe, statement-level operations only.
pub struct SqlStore {
    pool: SqlitePool,
}

impl SqlStore {
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;
        let store = Self { pool };
        store.ensure_schema().await?;
        Ok(store)
    }

    async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS recipes (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                calories INTEGER NOT NULL,
                suitable_for_diet BOOLEAN NOT NULL DEFAULT TRUE
            )
            "#,
        )
        .execute(&self.pool)
        .await?;
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(
        e,
        sqlx::Error::Database(db) if db.kind() == sqlx::error::ErrorKind::UniqueViolation
    )
}

#[async_trait]
impl RecipeStore for SqlStore {
    async fn list(&self) -> Result<Vec<Recipe>, StoreError> {
        let rows = sqlx::query_as::<_, Recipe>(
            r#"
            SELECT id, name, calories, suitable_for_diet
            FROM recipes
            ORDER BY id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn create(&self, recipe: NewRecipe) -> Result<Recipe, StoreError> {
        let row = sqlx::query_as::<_, Recipe>(
            r#"
            INSERT INTO recipes (name, calories, suitable_for_diet)
            VALUES ($1, $2, $3)
            RETURNING id, name, calories, suitable_for_diet
            "#,
        )
        .bind(&recipe.name)
        .bind(recipe.calories)
        .bind(recipe.suitable_for_diet)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update(&self, id: i64, recipe: NewRecipe) -> Result<Recipe, StoreError> {
        let row = sqlx::query_as::<_, Recipe>(
            r#"
            UPDATE recipes
            SET name = $2, calories = $3, suitable_for_diet = $4
            WHERE id = $1
            RETURNING id, name, calories, suitable_for_diet
            "#,
        )
        .bind(id)
        .bind(&recipe.name)
        .bind(recipe.calories)
        .bind(recipe.suitable_for_diet)
        .fetch_optional(&self.pool)
        .await?;
        row.ok_or(StoreError::NotFound)
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM recipes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_user(&self, username: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password_hash)
            VALUES ($1, $2)
            RETURNING id, username, password_hash
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await;
        match user {
            Ok(u) => Ok(u),
            Err(e) if is_unique_violation(&e) => Err(StoreError::UserExists),
            Err(e) => Err(e.into()),
        }
    }
}
