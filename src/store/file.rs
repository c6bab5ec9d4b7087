use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::Mutex;
use tracing::warn;

use super::{NewRecipe, Recipe, RecipeStore, StoreError, User};

/// Flat-file backend: the recipes file is a single JSON array of recipe
/// objects; users live in a sibling `<data>.users.json`.
///
/// Every mutation re-reads the file, applies the change and rewrites the
/// whole document. The mutex covers reads as well as writes: concurrent
/// mutations cannot lose updates to each other, and a reader can never
/// observe a partially rewritten file.
pub struct FileStore {
    recipes_path: PathBuf,
    users_path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    pub fn open(path: &Path) -> Self {
        let mut users_path = path.as_os_str().to_owned();
        users_path.push(".users.json");
        Self {
            recipes_path: path.to_path_buf(),
            users_path: users_path.into(),
            lock: Mutex::new(()),
        }
    }

    /// A missing file is the initial empty state; a malformed file is
    /// treated the same way rather than surfaced as an error. The next
    /// successful write rebuilds a valid document.
    async fn load<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, StoreError> {
        let bytes = match tokio::fs::read(path).await {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        match serde_json::from_slice(&bytes) {
            Ok(items) => Ok(items),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "malformed store file, treating as empty");
                Ok(Vec::new())
            }
        }
    }

    async fn save<T: Serialize>(path: &Path, items: &[T]) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(items)?;
        tokio::fs::write(path, bytes).await?;
        Ok(())
    }
}

fn next_id<I: Iterator<Item = i64>>(ids: I) -> i64 {
    ids.max().unwrap_or(0) + 1
}

#[async_trait]
impl RecipeStore for FileStore {
    async fn list(&self) -> Result<Vec<Recipe>, StoreError> {
        let _guard = self.lock.lock().await;
        let mut recipes: Vec<Recipe> = Self::load(&self.recipes_path).await?;
        // Stored in insertion order; the API returns newest first.
        recipes.reverse();
        Ok(recipes)
    }

    async fn create(&self, recipe: NewRecipe) -> Result<Recipe, StoreError> {
        let _guard = self.lock.lock().await;
        let mut recipes: Vec<Recipe> = Self::load(&self.recipes_path).await?;
        let stored = Recipe {
            id: next_id(recipes.iter().map(|r| r.id)),
            name: recipe.name,
            calories: recipe.calories,
            suitable_for_diet: recipe.suitable_for_diet,
        };
        recipes.push(stored.clone());
        Self::save(&self.recipes_path, &recipes).await?;
        Ok(stored)
    }

    async fn update(&self, id: i64, recipe: NewRecipe) -> Result<Recipe, StoreError> {
        let _guard = self.lock.lock().await;
        let mut recipes: Vec<Recipe> = Self::load(&self.recipes_path).await?;
        let slot = recipes
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(StoreError::NotFound)?;
        slot.name = recipe.name;
        slot.calories = recipe.calories;
        slot.suitable_for_diet = recipe.suitable_for_diet;
        let updated = slot.clone();
        Self::save(&self.recipes_path, &recipes).await?;
        Ok(updated)
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let _guard = self.lock.lock().await;
        let mut recipes: Vec<Recipe> = Self::load(&self.recipes_path).await?;
        let before = recipes.len();
        recipes.retain(|r| r.id != id);
        if recipes.len() == before {
            return Ok(false);
        }
        Self::save(&self.recipes_path, &recipes).await?;
        Ok(true)
    }

    async fn find_user(&self, username: &str) -> Result<Option<User>, StoreError> {
        let _guard = self.lock.lock().await;
        let users: Vec<User> = Self::load(&self.users_path).await?;
        Ok(users.into_iter().find(|u| u.username == username))
    }

    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User, StoreError> {
        let _guard = self.lock.lock().await;
        let mut users: Vec<User> = Self::load(&self.users_path).await?;
        if users.iter().any(|u| u.username == username) {
            return Err(StoreError::UserExists);
        }
        let user = User {
            id: next_id(users.iter().map(|u| u.id)),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
        };
        users.push(user.clone());
        Self::save(&self.users_path, &users).await?;
        Ok(user)
    }
}
