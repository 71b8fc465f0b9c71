use serde::Deserialize;

use crate::recipe_normalizer::{RawDrink, RawMeal};

pub const DEFAULT_MEALDB_BASE_URL: &str = "https://www.themealdb.com/api/json/v1/1";
pub const DEFAULT_COCKTAILDB_BASE_URL: &str = "https://www.thecocktaildb.com/api/json/v1/1";
pub const DEFAULT_REGIONAL_BASE_URL: &str = "https://indian-food-db.herokuapp.com";

pub const MEALDB_SEARCH: &str = "search.php";
pub const MEALDB_FILTER: &str = "filter.php";
pub const MEALDB_LOOKUP: &str = "lookup.php";
pub const MEALDB_RANDOM: &str = "random.php";
pub const MEALDB_LIST: &str = "list.php";

pub const COCKTAILDB_FILTER: &str = "filter.php";
pub const COCKTAILDB_LOOKUP: &str = "lookup.php";
/// Alcohol filter value the beverage directory uses for mocktails.
pub const NON_ALCOHOLIC_TAG: &str = "Non_Alcoholic";

pub const REGIONAL_LIST_ALL: &str = "api/cuisine/indian";
pub const REGIONAL_LIST_ALL_CUISINES: &str = "api/getallcuisine";
pub const REGIONAL_BY_INGREDIENT: &str = "api/getmealbyingredient";

/// Joins a base URL and an endpoint path without doubling slashes.
pub fn endpoint(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

/// Envelope of every meal directory response. `meals` is `null` when
/// nothing matched, which is not an error.
#[derive(Debug, Deserialize)]
pub struct MealEnvelope<T> {
    pub meals: Option<Vec<T>>,
}

impl<T> MealEnvelope<T> {
    pub fn into_vec(self) -> Vec<T> {
        self.meals.unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
pub struct DrinkEnvelope<T> {
    pub drinks: Option<Vec<T>>,
}

impl<T> DrinkEnvelope<T> {
    pub fn into_vec(self) -> Vec<T> {
        self.drinks.unwrap_or_default()
    }
}

pub type MealSearchResponse = MealEnvelope<RawMeal>;
pub type DrinkLookupResponse = DrinkEnvelope<RawDrink>;

#[derive(Debug, Deserialize)]
pub struct RawMealStub {
    #[serde(rename = "idMeal")]
    pub id: String,
    #[serde(rename = "strMeal")]
    pub name: String,
    #[serde(rename = "strMealThumb", default)]
    pub thumbnail: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawDrinkStub {
    #[serde(rename = "idDrink")]
    pub id: String,
    #[serde(rename = "strDrink")]
    pub name: String,
    #[serde(rename = "strDrinkThumb", default)]
    pub thumbnail: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawCategoryEntry {
    #[serde(rename = "strCategory")]
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct RawAreaEntry {
    #[serde(rename = "strArea")]
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct RawIngredientEntry {
    #[serde(rename = "strIngredient")]
    pub name: String,
    #[serde(rename = "strDescription", default)]
    pub description: Option<String>,
    #[serde(rename = "strType", default)]
    pub kind: Option<String>,
}
