use async_trait::async_trait;
use reqwest::Client;

use super::BeverageDirectory;
use crate::api_connection::connection::get_json;
use crate::api_connection::endpoints::{
    endpoint, DrinkEnvelope, DrinkLookupResponse, RawDrinkStub, COCKTAILDB_FILTER,
    COCKTAILDB_LOOKUP,
};
use crate::api_connection::ApiConnectionError;
use crate::models::{Beverage, RecipeStub};
use crate::recipe_normalizer::normalize_drink;

#[derive(Debug, Clone)]
pub struct CocktailDbClient {
    client: Client,
    base_url: String,
}

impl CocktailDbClient {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl BeverageDirectory for CocktailDbClient {
    /// `tag` is an alcohol filter value such as `Non_Alcoholic`.
    async fn filter_by_category(&self, tag: &str) -> Result<Vec<RecipeStub>, ApiConnectionError> {
        let response: DrinkEnvelope<RawDrinkStub> = get_json(
            &self.client,
            &endpoint(&self.base_url, COCKTAILDB_FILTER),
            &[("a", tag)],
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

    async fn lookup_by_id(&self, id: &str) -> Result<Option<Beverage>, ApiConnectionError> {
        let response: DrinkLookupResponse = get_json(
            &self.client,
            &endpoint(&self.base_url, COCKTAILDB_LOOKUP),
            &[("i", id)],
        )
        .await?;
        Ok(response.into_vec().into_iter().next().map(normalize_drink))
    }
}
