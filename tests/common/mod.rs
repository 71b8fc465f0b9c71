#![allow(dead_code)]

use async_trait::async_trait;
use reqwest::StatusCode;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use recipe_planner::api_connection::ApiConnectionError;
use recipe_planner::directories::{BeverageDirectory, RecipeDirectory, RegionalDirectory};
use recipe_planner::models::{
    Beverage, IngredientInfo, NutritionSnapshot, Recipe, RecipeStub, RegionalRecipe,
};

pub fn upstream_down() -> ApiConnectionError {
    ApiConnectionError::ApiError {
        status: StatusCode::SERVICE_UNAVAILABLE,
        error_body: "upstream unavailable".to_string(),
    }
}

pub fn recipe(id: &str, name: &str) -> Recipe {
    Recipe {
        id: id.to_string(),
        name: name.to_string(),
        category: "Chicken".to_string(),
        area: "Indian".to_string(),
        instructions: "Cook.\r\nServe.".to_string(),
        thumbnail: format!("https://img.test/{id}.jpg"),
        video_url: None,
        ingredients: vec!["chicken".to_string()],
        measures: vec!["500g".to_string()],
        nutrition: None,
    }
}

pub fn recipe_with_nutrition(id: &str, calories: f64, protein: f64) -> Recipe {
    Recipe {
        nutrition: Some(NutritionSnapshot {
            calories,
            protein,
            carbohydrates: 30.0,
            fat: 12.0,
            fiber: 4.0,
            sugar: 6.0,
            sodium: 800.0,
            vitamins: None,
            minerals: None,
        }),
        ..recipe(id, &format!("Recipe {id}"))
    }
}

pub fn stub(id: &str) -> RecipeStub {
    RecipeStub {
        id: id.to_string(),
        name: format!("Stub {id}"),
        thumbnail: None,
    }
}

pub fn regional(name: &str, ingredients: &[&str]) -> RegionalRecipe {
    RegionalRecipe {
        name: name.to_string(),
        ingredients: ingredients.iter().map(|i| i.to_string()).collect(),
        instructions: vec!["Cook it.".to_string()],
        cuisine: "Indian".to_string(),
        course: "main course".to_string(),
        diet: "vegetarian".to_string(),
        prep_time: "20 mins".to_string(),
        cook_time: "40 mins".to_string(),
        servings: 4,
        image: None,
        nutrition: None,
    }
}

pub fn beverage(id: &str) -> Beverage {
    Beverage {
        id: id.to_string(),
        name: format!("Mocktail {id}"),
        category: "Other / Unknown".to_string(),
        instructions: "Shake.".to_string(),
        thumbnail: String::new(),
        ingredients: vec!["Lime".to_string()],
        measures: vec!["1 oz".to_string()],
    }
}

#[derive(Default)]
pub struct FakeRecipes {
    pub by_name: Vec<Recipe>,
    pub by_letter: Vec<Recipe>,
    pub ingredient_stubs: Vec<RecipeStub>,
    pub details: HashMap<String, Recipe>,
    pub failing_lookups: HashSet<String>,
    pub fail_search: bool,
    pub fail_lists: bool,
    pub name_delay: Option<Duration>,
    pub categories: Vec<String>,
    pub calls: AtomicUsize,
}

impl FakeRecipes {
    pub fn with_details(recipes: impl IntoIterator<Item = Recipe>) -> Self {
        Self {
            details: recipes.into_iter().map(|r| (r.id.clone(), r)).collect(),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn record(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl RecipeDirectory for FakeRecipes {
    async fn search_by_name(&self, term: &str) -> Result<Vec<Recipe>, ApiConnectionError> {
        self.record();
        if let Some(delay) = self.name_delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_search {
            return Err(upstream_down());
        }
        let needle = term.to_lowercase();
        Ok(self
            .by_name
            .iter()
            .filter(|r| r.name.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    async fn search_by_first_letter(&self, letter: char) -> Result<Vec<Recipe>, ApiConnectionError> {
        self.record();
        Ok(self
            .by_letter
            .iter()
            .filter(|r| r.name.starts_with(letter))
            .cloned()
            .collect())
    }

    async fn filter_by_ingredient(&self, _ingredient: &str) -> Result<Vec<RecipeStub>, ApiConnectionError> {
        self.record();
        if self.fail_search {
            return Err(upstream_down());
        }
        Ok(self.ingredient_stubs.clone())
    }

    async fn lookup_by_id(&self, id: &str) -> Result<Option<Recipe>, ApiConnectionError> {
        self.record();
        if self.failing_lookups.contains(id) {
            return Err(upstream_down());
        }
        Ok(self.details.get(id).cloned())
    }

    async fn random_one(&self) -> Result<Option<Recipe>, ApiConnectionError> {
        self.record();
        Ok(self.details.values().next().cloned())
    }

    async fn list_categories(&self) -> Result<Vec<String>, ApiConnectionError> {
        self.record();
        Ok(self.categories.clone())
    }

    async fn list_areas(&self) -> Result<Vec<String>, ApiConnectionError> {
        self.record();
        if self.fail_lists {
            return Err(upstream_down());
        }
        Ok(vec!["Indian".to_string()])
    }

    async fn list_ingredients(&self) -> Result<Vec<IngredientInfo>, ApiConnectionError> {
        self.record();
        Ok(vec![IngredientInfo {
            name: "Chicken".to_string(),
            description: None,
            kind: None,
        }])
    }
}

#[derive(Default)]
pub struct FakeRegional {
    pub listing: Vec<RegionalRecipe>,
    pub all_cuisines: Vec<RegionalRecipe>,
    pub by_ingredient: Vec<RegionalRecipe>,
    pub fail: bool,
    pub calls: AtomicUsize,
}

impl FakeRegional {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RegionalDirectory for FakeRegional {
    async fn list_all(&self) -> Result<Vec<RegionalRecipe>, ApiConnectionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(upstream_down());
        }
        Ok(self.listing.clone())
    }

    async fn list_all_cuisines(&self) -> Result<Vec<RegionalRecipe>, ApiConnectionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(upstream_down());
        }
        Ok(self.all_cuisines.clone())
    }

    async fn filter_by_ingredient(&self, _ingredient: &str) -> Result<Vec<RegionalRecipe>, ApiConnectionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(upstream_down());
        }
        Ok(self.by_ingredient.clone())
    }
}

#[derive(Default)]
pub struct FakeBeverages {
    pub stubs: Vec<RecipeStub>,
    pub details: HashMap<String, Beverage>,
    pub failing_lookups: HashSet<String>,
    pub requested_tags: std::sync::Mutex<Vec<String>>,
    pub calls: AtomicUsize,
}

impl FakeBeverages {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BeverageDirectory for FakeBeverages {
    async fn filter_by_category(&self, tag: &str) -> Result<Vec<RecipeStub>, ApiConnectionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requested_tags.lock().unwrap().push(tag.to_string());
        Ok(self.stubs.clone())
    }

    async fn lookup_by_id(&self, id: &str) -> Result<Option<Beverage>, ApiConnectionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_lookups.contains(id) {
            return Err(upstream_down());
        }
        Ok(self.details.get(id).cloned())
    }
}
