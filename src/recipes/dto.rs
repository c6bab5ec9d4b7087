use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::store::NewRecipe;

pub const MAX_NAME_LEN: usize = 100;

/// Create/update body. Update is full-replace, so an omitted
/// `suitable_for_diet` resets to the default.
#[derive(Debug, Deserialize)]
pub struct RecipePayload {
    pub name: String,
    pub calories: i64,
    #[serde(default = "default_suitable")]
    pub suitable_for_diet: bool,
}

fn default_suitable() -> bool {
    true
}

impl RecipePayload {
    pub fn validate(self) -> Result<NewRecipe, ApiError> {
        if self.name.trim().is_empty() {
            return Err(ApiError::BadRequest("name must not be empty".into()));
        }
        if self.name.chars().count() > MAX_NAME_LEN {
            return Err(ApiError::BadRequest(format!(
                "name must be at most {MAX_NAME_LEN} characters"
            )));
        }
        Ok(NewRecipe {
            name: self.name,
            calories: self.calories,
            suitable_for_diet: self.suitable_for_diet,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct SavedAck {
    pub message: &'static str,
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct Ack {
    pub message: &'static str,
}
