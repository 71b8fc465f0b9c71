use futures_util::future::try_join_all;
use serde::Serialize;
use std::fmt::Display;
use tracing::warn;

use crate::api_connection::ApiConnectionError;
use crate::directories::{RecipeDirectory, RegionalDirectory};
use crate::models::{serialize_keyed, IngredientInfo, Recipe, RegionalRecipe};

const TRENDING_COUNT: usize = 3;
const REGIONAL_HIGHLIGHT_COUNT: usize = 6;
pub const FEATURED_REGIONAL_DISHES: [&str; 5] = ["butter chicken", "biryani", "dal", "tandoori", "korma"];

/// Landing page content. Each section loads independently and is empty if
/// its upstream failed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HomeFeed {
    pub daily_special: Option<Recipe>,
    pub trending: Vec<Recipe>,
    pub featured_regional: Vec<Recipe>,
    #[serde(serialize_with = "serialize_keyed")]
    pub regional_highlights: Vec<RegionalRecipe>,
}

impl HomeFeed {
    pub async fn load(generic: &dyn RecipeDirectory, regional: &dyn RegionalDirectory) -> Self {
        let (daily_special, trending, featured_regional, regional_highlights) = tokio::join!(
            generic.random_one(),
            try_join_all((0..TRENDING_COUNT).map(|_| generic.random_one())),
            try_join_all(FEATURED_REGIONAL_DISHES.iter().map(|term| generic.search_by_name(term))),
            regional.list_all_cuisines(),
        );

        Self {
            daily_special: or_empty("daily special", daily_special),
            trending: or_empty("trending", trending).into_iter().flatten().collect(),
            featured_regional: or_empty("featured regional", featured_regional)
                .into_iter()
                .filter_map(|hits| hits.into_iter().next())
                .collect(),
            regional_highlights: or_empty("regional highlights", regional_highlights)
                .into_iter()
                .take(REGIONAL_HIGHLIGHT_COUNT)
                .collect(),
        }
    }
}

fn or_empty<T: Default, E: Display>(section: &str, result: Result<T, E>) -> T {
    result.unwrap_or_else(|e| {
        warn!(section, error = %e, "home section unavailable");
        T::default()
    })
}

/// Browse lists for the search page.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Catalog {
    pub categories: Vec<String>,
    pub areas: Vec<String>,
    pub ingredients: Vec<IngredientInfo>,
}

impl Catalog {
    /// Fetches all three lists in parallel; any failure fails the whole load.
    pub async fn load(generic: &dyn RecipeDirectory) -> Result<Self, ApiConnectionError> {
        let (categories, areas, ingredients) = tokio::try_join!(
            generic.list_categories(),
            generic.list_areas(),
            generic.list_ingredients(),
        )?;
        Ok(Self {
            categories,
            areas,
            ingredients,
        })
    }
}

/// Detail view of one recipe: the record plus its instructions split into
/// steps.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecipeDetail {
    #[serde(flatten)]
    pub recipe: Recipe,
    pub steps: Vec<String>,
}

impl From<Recipe> for RecipeDetail {
    fn from(recipe: Recipe) -> Self {
        let steps = recipe.instruction_steps().into_iter().map(str::to_string).collect();
        Self { recipe, steps }
    }
}

pub async fn fetch_recipe(generic: &dyn RecipeDirectory, id: &str) -> Result<Option<RecipeDetail>, ApiConnectionError> {
    Ok(generic.lookup_by_id(id).await?.map(RecipeDetail::from))
}
