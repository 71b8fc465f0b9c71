use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

use crate::models::{Beverage, NutritionSnapshot, Recipe};

/// Upstream records carry `strIngredient1..N` / `strMeasure1..N`.
pub const MAX_INGREDIENT_FIELDS: usize = 20;

const INGREDIENT_PREFIX: &str = "strIngredient";
const MEASURE_PREFIX: &str = "strMeasure";

/// Full meal record exactly as the meal directory returns it.
#[derive(Debug, Deserialize, Clone)]
pub struct RawMeal {
    #[serde(rename = "idMeal")]
    pub id: String,
    #[serde(rename = "strMeal")]
    pub name: String,
    #[serde(rename = "strCategory", default)]
    pub category: Option<String>,
    #[serde(rename = "strArea", default)]
    pub area: Option<String>,
    #[serde(rename = "strInstructions", default)]
    pub instructions: Option<String>,
    #[serde(rename = "strMealThumb", default)]
    pub thumbnail: Option<String>,
    #[serde(rename = "strYoutube", default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub nutrition: Option<NutritionSnapshot>,
    /// Everything else, including the numbered ingredient/measure fields.
    #[serde(flatten)]
    pub fields: HashMap<String, Value>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RawDrink {
    #[serde(rename = "idDrink")]
    pub id: String,
    #[serde(rename = "strDrink")]
    pub name: String,
    #[serde(rename = "strCategory", default)]
    pub category: Option<String>,
    #[serde(rename = "strInstructions", default)]
    pub instructions: Option<String>,
    #[serde(rename = "strDrinkThumb", default)]
    pub thumbnail: Option<String>,
    #[serde(flatten)]
    pub fields: HashMap<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct IngredientList {
    pub ingredients: Vec<String>,
    pub measures: Vec<String>,
}

fn numbered_text<'a>(fields: &'a HashMap<String, Value>, prefix: &str, index: usize) -> Option<&'a str> {
    fields
        .get(&format!("{prefix}{index}"))
        .and_then(Value::as_str)
}

/// Collects ingredient/measure pairs from numbered fields 1..=20.
///
/// Index `i` is kept iff its ingredient is present and non-empty; its
/// measure rides along at the same position, as an empty string when
/// absent. Every index is checked, gaps do not stop the scan.
pub fn normalize_ingredients(fields: &HashMap<String, Value>) -> IngredientList {
    let mut list = IngredientList::default();

    for index in 1..=MAX_INGREDIENT_FIELDS {
        let ingredient = match numbered_text(fields, INGREDIENT_PREFIX, index) {
            Some(text) if !text.is_empty() => text,
            _ => continue,
        };
        let measure = numbered_text(fields, MEASURE_PREFIX, index).unwrap_or_default();

        list.ingredients.push(ingredient.to_string());
        list.measures.push(measure.to_string());
    }

    list
}

pub fn normalize_meal(raw: RawMeal) -> Recipe {
    let IngredientList { ingredients, measures } = normalize_ingredients(&raw.fields);

    Recipe {
        id: raw.id,
        name: raw.name,
        category: raw.category.unwrap_or_default(),
        area: raw.area.unwrap_or_default(),
        instructions: raw.instructions.unwrap_or_default(),
        thumbnail: raw.thumbnail.unwrap_or_default(),
        video_url: raw.video_url.filter(|url| !url.is_empty()),
        ingredients,
        measures,
        nutrition: raw.nutrition,
    }
}

pub fn normalize_drink(raw: RawDrink) -> Beverage {
    let IngredientList { ingredients, measures } = normalize_ingredients(&raw.fields);

    Beverage {
        id: raw.id,
        name: raw.name,
        category: raw.category.unwrap_or_default(),
        instructions: raw.instructions.unwrap_or_default(),
        thumbnail: raw.thumbnail.unwrap_or_default(),
        ingredients,
        measures,
    }
}
