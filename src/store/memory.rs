use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::StatusCode;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;

use super::{
    AuthUser, Identity, MealPlanRow, NewPlannedMeal, PlanStore, PlannedMealRow, PreferencesRow,
    ProfileRow, ProfileStore, StoreError,
};
use crate::api_connection::ApiConnectionError;
use crate::models::MealSlot;

#[derive(Debug, Default)]
struct Tables {
    next_id: u64,
    meal_plans: Vec<MealPlanRow>,
    planned_meals: Vec<PlannedMealRow>,
    profiles: HashMap<String, ProfileRow>,
    preferences: HashMap<String, PreferencesRow>,
}

impl Tables {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }

    fn upsert_plan(&mut self, user_id: &str, date: NaiveDate) -> MealPlanRow {
        if let Some(existing) = self
            .meal_plans
            .iter()
            .find(|p| p.user_id == user_id && p.date == date)
        {
            return existing.clone();
        }
        let row = MealPlanRow {
            id: self.next_id("plan"),
            user_id: user_id.to_string(),
            date,
            planned_meals: Vec::new(),
        };
        self.meal_plans.push(row.clone());
        row
    }

    fn slot_taken(&self, user_id: &str, date: NaiveDate, slot: MealSlot) -> bool {
        let Some(plan) = self
            .meal_plans
            .iter()
            .find(|p| p.user_id == user_id && p.date == date)
        else {
            return false;
        };
        slot.is_single_occupancy()
            && self
                .planned_meals
                .iter()
                .any(|m| m.meal_plan_id == plan.id && m.meal_type == slot)
    }

    fn insert_meal(&mut self, meal_plan_id: &str, meal: &NewPlannedMeal) -> Result<PlannedMealRow, StoreError> {
        if !self.meal_plans.iter().any(|p| p.id == meal_plan_id) {
            return Err(rejected(format!("meal_plan_id {meal_plan_id} violates foreign key")));
        }
        let row = PlannedMealRow {
            id: self.next_id("meal"),
            meal_plan_id: meal_plan_id.to_string(),
            recipe_id: meal.recipe_id.clone(),
            meal_type: meal.meal_type,
            servings: meal.servings,
            notes: meal.notes.clone(),
        };
        self.planned_meals.push(row.clone());
        Ok(row)
    }
}

fn rejected(message: String) -> StoreError {
    StoreError::Connection(ApiConnectionError::ApiError {
        status: StatusCode::CONFLICT,
        error_body: message,
    })
}

/// In-process backend with the same table layout as the hosted one.
/// Plan upsert and meal insert run under one lock, so adds are atomic.
#[derive(Debug, Default)]
pub struct MemoryStore {
    user: Option<AuthUser>,
    tables: Mutex<Tables>,
    reject_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn signed_in(user_id: impl Into<String>) -> Self {
        Self {
            user: Some(AuthUser {
                id: user_id.into(),
                email: None,
            }),
            ..Self::default()
        }
    }

    /// While set, every write fails as if the backend rejected it.
    pub fn set_reject_writes(&self, reject: bool) {
        self.reject_writes.store(reject, Ordering::SeqCst);
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if self.reject_writes.load(Ordering::SeqCst) {
            Err(rejected("writes are rejected".to_string()))
        } else {
            Ok(())
        }
    }

    pub async fn planned_meal_count(&self) -> usize {
        self.tables.lock().await.planned_meals.len()
    }
}

#[async_trait]
impl Identity for MemoryStore {
    async fn current_user(&self) -> Result<Option<AuthUser>, StoreError> {
        Ok(self.user.clone())
    }
}

#[async_trait]
impl PlanStore for MemoryStore {
    async fn upsert_meal_plan(&self, user_id: &str, date: NaiveDate) -> Result<MealPlanRow, StoreError> {
        self.check_writable()?;
        Ok(self.tables.lock().await.upsert_plan(user_id, date))
    }

    async fn insert_planned_meal(
        &self,
        meal_plan_id: &str,
        meal: &NewPlannedMeal,
    ) -> Result<PlannedMealRow, StoreError> {
        self.check_writable()?;
        self.tables.lock().await.insert_meal(meal_plan_id, meal)
    }

    async fn select_meal_plan(&self, user_id: &str, date: NaiveDate) -> Result<Option<MealPlanRow>, StoreError> {
        let tables = self.tables.lock().await;
        let Some(plan) = tables
            .meal_plans
            .iter()
            .find(|p| p.user_id == user_id && p.date == date)
        else {
            return Ok(None);
        };

        let mut row = plan.clone();
        row.planned_meals = tables
            .planned_meals
            .iter()
            .filter(|m| m.meal_plan_id == plan.id)
            .cloned()
            .collect();
        Ok(Some(row))
    }

    async fn delete_planned_meal(&self, meal_id: &str) -> Result<(), StoreError> {
        self.check_writable()?;
        self.tables
            .lock()
            .await
            .planned_meals
            .retain(|m| m.id != meal_id);
        Ok(())
    }

    async fn add_planned_meal(
        &self,
        user_id: &str,
        date: NaiveDate,
        meal: &NewPlannedMeal,
    ) -> Result<PlannedMealRow, StoreError> {
        self.check_writable()?;
        let mut tables = self.tables.lock().await;
        if tables.slot_taken(user_id, date, meal.meal_type) {
            return Err(StoreError::SlotOccupied(meal.meal_type));
        }
        let plan = tables.upsert_plan(user_id, date);
        tables.insert_meal(&plan.id, meal)
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn select_profile(&self, user_id: &str) -> Result<Option<ProfileRow>, StoreError> {
        Ok(self.tables.lock().await.profiles.get(user_id).cloned())
    }

    async fn upsert_profile(&self, profile: &ProfileRow) -> Result<(), StoreError> {
        self.check_writable()?;
        self.tables
            .lock()
            .await
            .profiles
            .insert(profile.id.clone(), profile.clone());
        Ok(())
    }

    async fn select_preferences(&self, user_id: &str) -> Result<Option<PreferencesRow>, StoreError> {
        Ok(self.tables.lock().await.preferences.get(user_id).cloned())
    }

    async fn upsert_preferences(&self, preferences: &PreferencesRow) -> Result<(), StoreError> {
        self.check_writable()?;
        self.tables
            .lock()
            .await
            .preferences
            .insert(preferences.user_id.clone(), preferences.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_meal(recipe_id: &str) -> NewPlannedMeal {
        NewPlannedMeal {
            recipe_id: recipe_id.into(),
            meal_type: MealSlot::Lunch,
            servings: 1,
            notes: None,
        }
    }

    #[tokio::test]
    async fn plan_upsert_is_keyed_on_user_and_date() {
        let store = MemoryStore::new();
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();

        let first = store.upsert_meal_plan("u1", date).await.unwrap();
        let second = store.upsert_meal_plan("u1", date).await.unwrap();
        let other_user = store.upsert_meal_plan("u2", date).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_ne!(first.id, other_user.id);
    }

    #[tokio::test]
    async fn insert_without_parent_is_rejected() {
        let store = MemoryStore::new();
        let result = store.insert_planned_meal("plan-404", &new_meal("52772")).await;
        assert!(matches!(result, Err(StoreError::Connection(_))));
    }

    #[tokio::test]
    async fn rejected_writes_leave_tables_untouched() {
        let store = MemoryStore::new();
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        store.set_reject_writes(true);

        assert!(store.add_planned_meal("u1", date, &new_meal("1")).await.is_err());
        assert_eq!(store.planned_meal_count().await, 0);
        assert_eq!(store.select_meal_plan("u1", date).await.unwrap(), None);
    }

    #[tokio::test]
    async fn filled_fixed_slot_rejects_another_meal() {
        let store = MemoryStore::new();
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        store.add_planned_meal("u1", date, &new_meal("1")).await.unwrap();

        let second = store.add_planned_meal("u1", date, &new_meal("2")).await;

        assert!(matches!(second, Err(StoreError::SlotOccupied(MealSlot::Lunch))));
        assert_eq!(store.planned_meal_count().await, 1);
    }

    #[tokio::test]
    async fn snacks_are_never_occupied() {
        let store = MemoryStore::new();
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let snack = NewPlannedMeal {
            meal_type: MealSlot::Snack,
            ..new_meal("1")
        };

        store.add_planned_meal("u1", date, &snack).await.unwrap();
        store.add_planned_meal("u1", date, &snack).await.unwrap();

        assert_eq!(store.planned_meal_count().await, 2);
    }
}
