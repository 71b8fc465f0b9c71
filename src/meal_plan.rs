use chrono::NaiveDate;
use futures_util::future::try_join_all;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::api_connection::ApiConnectionError;
use crate::directories::RecipeDirectory;
use crate::models::{MealPlan, MealSlot, MealSlots, PlannedMeal, Recipe};
use crate::nutrition::{total_nutrition, MealPortion};
use crate::store::{MealPlanRow, NewPlannedMeal, PlanStore, StoreError};

#[derive(Error, Debug)]
pub enum PlanError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("recipe lookup failed: {0}")]
    Directory(#[from] ApiConnectionError),

    #[error("{0} already has a meal planned")]
    SlotOccupied(MealSlot),

    #[error("servings must be at least 1")]
    InvalidServings,

    #[error("meal plan request timed out after {0:?}")]
    TimedOut(Duration),

    /// The meal was stored but the plan could not be reloaded afterwards.
    #[error("meal added but the plan could not be reloaded: {0}")]
    AddedNotRefreshed(#[source] Box<PlanError>),

    /// The meal was deleted but the plan could not be reloaded afterwards.
    #[error("meal removed but the plan could not be reloaded: {0}")]
    RemovedNotRefreshed(#[source] Box<PlanError>),
}

impl PlanError {
    pub fn notice(&self) -> &'static str {
        match self {
            PlanError::Store(StoreError::Unauthenticated) => "Please sign in to manage your meal plan",
            PlanError::SlotOccupied(_) => "Remove the current meal before adding another to this slot",
            PlanError::InvalidServings => "Servings must be at least 1",
            PlanError::AddedNotRefreshed(_) => "Meal added; failed to refresh plan",
            PlanError::RemovedNotRefreshed(_) => "Meal removed; failed to refresh plan",
            _ => "Meal plan update failed",
        }
    }
}

/// The last successfully loaded (user, date) view.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedPlan {
    pub user_id: String,
    pub date: NaiveDate,
    /// `None` means no plan exists yet for that date.
    pub plan: Option<MealPlan>,
    /// Recipes referenced by the plan, keyed by recipe id.
    pub recipes: HashMap<String, Recipe>,
}

/// Keeps one date-keyed plan in sync with the backend and its nutrition
/// rollup in sync with the plan.
pub struct MealPlanAssembler {
    store: Arc<dyn PlanStore>,
    recipes: Arc<dyn RecipeDirectory>,
    timeout: Duration,
    loaded: Option<LoadedPlan>,
}

impl MealPlanAssembler {
    pub fn new(store: Arc<dyn PlanStore>, recipes: Arc<dyn RecipeDirectory>, timeout: Duration) -> Self {
        Self {
            store,
            recipes,
            timeout,
            loaded: None,
        }
    }

    pub fn loaded(&self) -> Option<&LoadedPlan> {
        self.loaded.as_ref()
    }

    pub fn plan(&self) -> Option<&MealPlan> {
        self.loaded.as_ref().and_then(|l| l.plan.as_ref())
    }

    /// Fetches the plan and its meals, resolves the referenced recipes and
    /// recomputes the rollup. State is only replaced on full success.
    pub async fn load_plan(&mut self, user_id: &str, date: NaiveDate) -> Result<Option<&MealPlan>, PlanError> {
        let loaded = self.with_timeout(self.fetch_plan(user_id, date)).await?;
        Ok(self.install(loaded))
    }

    fn install(&mut self, loaded: LoadedPlan) -> Option<&MealPlan> {
        info!(
            user_id = %loaded.user_id,
            date = %loaded.date,
            meals = loaded.plan.as_ref().map_or(0, |p| p.meals.iter().count()),
            "meal plan loaded"
        );
        self.loaded = Some(loaded);
        self.plan()
    }

    /// Upserts the (user, date) plan, inserts the meal, then reloads. The
    /// store refuses a second meal in a filled breakfast, lunch or dinner
    /// slot, whatever this assembler last loaded.
    pub async fn add_meal(
        &mut self,
        user_id: &str,
        date: NaiveDate,
        recipe_id: &str,
        slot: MealSlot,
        servings: u32,
        notes: Option<String>,
    ) -> Result<Option<&MealPlan>, PlanError> {
        if servings == 0 {
            return Err(PlanError::InvalidServings);
        }
        let meal = NewPlannedMeal {
            recipe_id: recipe_id.to_string(),
            meal_type: slot,
            servings,
            notes,
        };
        let row = self
            .with_timeout(async {
                self.store
                    .add_planned_meal(user_id, date, &meal)
                    .await
                    .map_err(|e| match e {
                        StoreError::SlotOccupied(slot) => PlanError::SlotOccupied(slot),
                        other => PlanError::Store(other),
                    })
            })
            .await?;
        info!(meal_id = %row.id, recipe_id, %slot, %date, "meal added to plan");

        let reloaded = self.with_timeout(self.fetch_plan(user_id, date)).await;
        match reloaded {
            Ok(loaded) => Ok(self.install(loaded)),
            Err(e) => {
                warn!(error = %e, meal_id = %row.id, "plan reload after add failed");
                Err(PlanError::AddedNotRefreshed(Box::new(e)))
            }
        }
    }

    /// Deletes one planned meal. Unknown ids are treated as already removed.
    /// Reloads the current plan afterwards, if one is loaded.
    pub async fn remove_meal(&mut self, meal_id: &str) -> Result<Option<&MealPlan>, PlanError> {
        self.with_timeout(async {
            self.store
                .delete_planned_meal(meal_id)
                .await
                .map_err(PlanError::from)
        })
        .await?;
        info!(meal_id, "meal removed from plan");

        let Some((user_id, date)) = self.loaded.as_ref().map(|l| (l.user_id.clone(), l.date)) else {
            return Ok(None);
        };
        let reloaded = self.with_timeout(self.fetch_plan(&user_id, date)).await;
        match reloaded {
            Ok(loaded) => Ok(self.install(loaded)),
            Err(e) => {
                warn!(error = %e, meal_id, "plan reload after remove failed");
                Err(PlanError::RemovedNotRefreshed(Box::new(e)))
            }
        }
    }

    async fn with_timeout<T>(
        &self,
        operation: impl std::future::Future<Output = Result<T, PlanError>>,
    ) -> Result<T, PlanError> {
        tokio::time::timeout(self.timeout, operation)
            .await
            .map_err(|_| PlanError::TimedOut(self.timeout))?
    }

    async fn fetch_plan(&self, user_id: &str, date: NaiveDate) -> Result<LoadedPlan, PlanError> {
        let Some(row) = self.store.select_meal_plan(user_id, date).await? else {
            debug!(user_id, %date, "no plan for this date yet");
            return Ok(LoadedPlan {
                user_id: user_id.to_string(),
                date,
                plan: None,
                recipes: HashMap::new(),
            });
        };

        let recipe_ids: BTreeSet<&str> = row.planned_meals.iter().map(|m| m.recipe_id.as_str()).collect();
        let lookups = recipe_ids.into_iter().map(|id| async move {
            Ok::<_, ApiConnectionError>((id, self.recipes.lookup_by_id(id).await?))
        });
        let mut recipes = HashMap::new();
        for (id, recipe) in try_join_all(lookups).await? {
            match recipe {
                Some(recipe) => {
                    recipes.insert(id.to_string(), recipe);
                }
                None => warn!(recipe_id = id, "planned recipe no longer in directory"),
            }
        }

        let plan = assemble_plan(row, &recipes);
        Ok(LoadedPlan {
            user_id: user_id.to_string(),
            date,
            plan: Some(plan),
            recipes,
        })
    }
}

/// Places stored meals into their slots and computes the rollup over every
/// stored meal. A second meal in a filled fixed slot goes to `conflicts`.
pub fn assemble_plan(row: MealPlanRow, recipes: &HashMap<String, Recipe>) -> MealPlan {
    let mut meals = MealSlots::default();

    for stored in row.planned_meals {
        let meal = PlannedMeal {
            id: stored.id,
            recipe_id: stored.recipe_id,
            meal_type: stored.meal_type,
            servings: stored.servings,
            notes: stored.notes,
        };
        let slot = match meal.meal_type {
            MealSlot::Breakfast => &mut meals.breakfast,
            MealSlot::Lunch => &mut meals.lunch,
            MealSlot::Dinner => &mut meals.dinner,
            MealSlot::Snack => {
                meals.snacks.push(meal);
                continue;
            }
        };
        if slot.is_some() {
            warn!(meal_id = %meal.id, slot = %meal.meal_type, "slot already filled, listing meal as a conflict");
            meals.conflicts.push(meal);
            continue;
        }
        *slot = Some(meal);
    }

    let total_nutrition = total_nutrition(meals.iter().map(|meal| MealPortion {
        nutrition: recipes.get(&meal.recipe_id).and_then(|r| r.nutrition.as_ref()),
        servings: meal.servings,
    }));

    MealPlan {
        id: row.id,
        user_id: row.user_id,
        date: row.date,
        meals,
        total_nutrition,
    }
}
