//! Read-only upstream recipe sources.
//!
//! Every method returns an empty collection (or `None`) for "no results";
//! `Err` is reserved for transport and decoding failures.

pub mod cocktaildb;
pub mod mealdb;
pub mod regional;

use async_trait::async_trait;

use crate::api_connection::ApiConnectionError;
use crate::models::{Beverage, IngredientInfo, Recipe, RecipeStub, RegionalRecipe};

pub use cocktaildb::CocktailDbClient;
pub use mealdb::MealDbClient;
pub use regional::RegionalFoodClient;

/// The generic recipe directory.
#[async_trait]
pub trait RecipeDirectory: Send + Sync {
    async fn search_by_name(&self, term: &str) -> Result<Vec<Recipe>, ApiConnectionError>;
    async fn search_by_first_letter(&self, letter: char) -> Result<Vec<Recipe>, ApiConnectionError>;
    async fn filter_by_ingredient(&self, ingredient: &str) -> Result<Vec<RecipeStub>, ApiConnectionError>;
    async fn lookup_by_id(&self, id: &str) -> Result<Option<Recipe>, ApiConnectionError>;
    async fn random_one(&self) -> Result<Option<Recipe>, ApiConnectionError>;
    async fn list_categories(&self) -> Result<Vec<String>, ApiConnectionError>;
    async fn list_areas(&self) -> Result<Vec<String>, ApiConnectionError>;
    async fn list_ingredients(&self) -> Result<Vec<IngredientInfo>, ApiConnectionError>;
}

/// The regional-cuisine directory. It cannot filter by name server-side.
#[async_trait]
pub trait RegionalDirectory: Send + Sync {
    async fn list_all(&self) -> Result<Vec<RegionalRecipe>, ApiConnectionError>;
    /// Every dish the directory knows, across all of its cuisines.
    async fn list_all_cuisines(&self) -> Result<Vec<RegionalRecipe>, ApiConnectionError>;
    async fn filter_by_ingredient(&self, ingredient: &str) -> Result<Vec<RegionalRecipe>, ApiConnectionError>;
}

#[async_trait]
pub trait BeverageDirectory: Send + Sync {
    async fn filter_by_category(&self, tag: &str) -> Result<Vec<RecipeStub>, ApiConnectionError>;
    async fn lookup_by_id(&self, id: &str) -> Result<Option<Beverage>, ApiConnectionError>;
}
