use async_trait::async_trait;
use reqwest::Client;

use super::RecipeDirectory;
use crate::api_connection::connection::get_json;
use crate::api_connection::endpoints::{
    endpoint, MealEnvelope, MealSearchResponse, RawAreaEntry, RawCategoryEntry,
    RawIngredientEntry, RawMealStub, MEALDB_FILTER, MEALDB_LIST, MEALDB_LOOKUP, MEALDB_RANDOM,
    MEALDB_SEARCH,
};
use crate::api_connection::ApiConnectionError;
use crate::models::{IngredientInfo, Recipe, RecipeStub};
use crate::recipe_normalizer::normalize_meal;

#[derive(Debug, Clone)]
pub struct MealDbClient {
    client: Client,
    base_url: String,
}

impl MealDbClient {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    async fn fetch_meals(&self, path: &str, query: &[(&str, &str)]) -> Result<Vec<Recipe>, ApiConnectionError> {
        let response: MealSearchResponse =
            get_json(&self.client, &endpoint(&self.base_url, path), query).await?;
        Ok(response.into_vec().into_iter().map(normalize_meal).collect())
    }
}

#[async_trait]
impl RecipeDirectory for MealDbClient {
    async fn search_by_name(&self, term: &str) -> Result<Vec<Recipe>, ApiConnectionError> {
        self.fetch_meals(MEALDB_SEARCH, &[("s", term)]).await
    }

    async fn search_by_first_letter(&self, letter: char) -> Result<Vec<Recipe>, ApiConnectionError> {
        let letter = letter.to_string();
        self.fetch_meals(MEALDB_SEARCH, &[("f", letter.as_str())]).await
    }

    async fn filter_by_ingredient(&self, ingredient: &str) -> Result<Vec<RecipeStub>, ApiConnectionError> {
        let response: MealEnvelope<RawMealStub> = get_json(
            &self.client,
            &endpoint(&self.base_url, MEALDB_FILTER),
            &[("i", ingredient)],
        )
        .await?;

        Ok(response
            .into_vec()
            .into_iter()
            .map(|stub| RecipeStub {
                id: stub.id,
                name: stub.name,
                thumbnail: stub.thumbnail,
            })
            .collect())
    }

    async fn lookup_by_id(&self, id: &str) -> Result<Option<Recipe>, ApiConnectionError> {
        Ok(self.fetch_meals(MEALDB_LOOKUP, &[("i", id)]).await?.into_iter().next())
    }

    async fn random_one(&self) -> Result<Option<Recipe>, ApiConnectionError> {
        Ok(self.fetch_meals(MEALDB_RANDOM, &[]).await?.into_iter().next())
    }

    async fn list_categories(&self) -> Result<Vec<String>, ApiConnectionError> {
        let response: MealEnvelope<RawCategoryEntry> = get_json(
            &self.client,
            &endpoint(&self.base_url, MEALDB_LIST),
            &[("c", "list")],
        )
        .await?;
        Ok(response.into_vec().into_iter().map(|c| c.name).collect())
    }

    async fn list_areas(&self) -> Result<Vec<String>, ApiConnectionError> {
        let response: MealEnvelope<RawAreaEntry> = get_json(
            &self.client,
            &endpoint(&self.base_url, MEALDB_LIST),
            &[("a", "list")],
        )
        .await?;
        Ok(response.into_vec().into_iter().map(|a| a.name).collect())
    }

    async fn list_ingredients(&self) -> Result<Vec<IngredientInfo>, ApiConnectionError> {
        let response: MealEnvelope<RawIngredientEntry> = get_json(
            &self.client,
            &endpoint(&self.base_url, MEALDB_LIST),
            &[("i", "list")],
        )
        .await?;
        Ok(response
            .into_vec()
            .into_iter()
            .map(|i| IngredientInfo {
                name: i.name,
                description: i.description,
                kind: i.kind,
            })
            .collect())
    }
}
