use async_trait::async_trait;
use reqwest::Client;

use super::RegionalDirectory;
use crate::api_connection::connection::get_json;
use crate::api_connection::endpoints::{
    endpoint, REGIONAL_BY_INGREDIENT, REGIONAL_LIST_ALL, REGIONAL_LIST_ALL_CUISINES,
};
use crate::api_connection::ApiConnectionError;
use crate::models::RegionalRecipe;

/// Client for the regional (Indian) cuisine directory.
#[derive(Debug, Clone)]
pub struct RegionalFoodClient {
    client: Client,
    base_url: String,
}

impl RegionalFoodClient {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    async fn fetch_listing(&self, path: &str) -> Result<Vec<RegionalRecipe>, ApiConnectionError> {
        let recipes: Option<Vec<RegionalRecipe>> =
            get_json(&self.client, &endpoint(&self.base_url, path), &[]).await?;
        Ok(recipes.unwrap_or_default())
    }
}

#[async_trait]
impl RegionalDirectory for RegionalFoodClient {
    async fn list_all(&self) -> Result<Vec<RegionalRecipe>, ApiConnectionError> {
        self.fetch_listing(REGIONAL_LIST_ALL).await
    }

    async fn list_all_cuisines(&self) -> Result<Vec<RegionalRecipe>, ApiConnectionError> {
        self.fetch_listing(REGIONAL_LIST_ALL_CUISINES).await
    }

    async fn filter_by_ingredient(&self, ingredient: &str) -> Result<Vec<RegionalRecipe>, ApiConnectionError> {
        let recipes: Option<Vec<RegionalRecipe>> = get_json(
            &self.client,
            &endpoint(&self.base_url, REGIONAL_BY_INGREDIENT),
            &[("ingredient", ingredient)],
        )
        .await?;
        Ok(recipes.unwrap_or_default())
    }
}
