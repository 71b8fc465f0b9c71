//! Durable state owned by the hosted backend: plans, planned meals,
//! profiles and preferences. The core only ever holds copies.

pub mod memory;
pub mod supabase;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::api_connection::ApiConnectionError;
use crate::models::{MealSlot, Preferences};

pub use memory::MemoryStore;
pub use supabase::SupabaseStore;

pub const PROFILES_TABLE: &str = "profiles";
pub const MEAL_PLANS_TABLE: &str = "meal_plans";
pub const PLANNED_MEALS_TABLE: &str = "planned_meals";
pub const USER_PREFERENCES_TABLE: &str = "user_preferences";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("backend request failed: {0}")]
    Connection(#[from] ApiConnectionError),

    #[error("no signed-in user")]
    Unauthenticated,

    #[error("backend returned no row from {0}")]
    EmptyResponse(&'static str),

    #[error("{0} already has a meal planned")]
    SlotOccupied(MealSlot),

    #[error("invalid email or password")]
    InvalidCredentials,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Token pair handed out by the auth service after a password sign-in.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    pub user: AuthUser,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SignUp {
    SignedIn(Session),
    /// The account exists but stays unusable until the emailed link is followed.
    ConfirmationPending(AuthUser),
}

/// `meal_plans` row, optionally with its `planned_meals` children embedded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MealPlanRow {
    pub id: String,
    pub user_id: String,
    pub date: NaiveDate,
    #[serde(default, skip_serializing)]
    pub planned_meals: Vec<PlannedMealRow>,
}

impl MealPlanRow {
    /// True when `slot` holds one meal at most and already has one.
    pub fn slot_taken(&self, slot: MealSlot) -> bool {
        slot.is_single_occupancy() && self.planned_meals.iter().any(|m| m.meal_type == slot)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlannedMealRow {
    pub id: String,
    pub meal_plan_id: String,
    pub recipe_id: String,
    pub meal_type: MealSlot,
    pub servings: u32,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Insert payload for `planned_meals`; the backend assigns the id.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NewPlannedMeal {
    pub recipe_id: String,
    pub meal_type: MealSlot,
    pub servings: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProfileRow {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub banner_url: Option<String>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PreferencesRow {
    pub user_id: String,
    #[serde(flatten)]
    pub preferences: Preferences,
}

#[async_trait]
pub trait Identity: Send + Sync {
    /// `Ok(None)` when nobody is signed in.
    async fn current_user(&self) -> Result<Option<AuthUser>, StoreError>;
}

#[async_trait]
pub trait PlanStore: Send + Sync {
    /// Creates the (user, date) plan if absent, returns it either way.
    async fn upsert_meal_plan(&self, user_id: &str, date: NaiveDate) -> Result<MealPlanRow, StoreError>;

    async fn insert_planned_meal(
        &self,
        meal_plan_id: &str,
        meal: &NewPlannedMeal,
    ) -> Result<PlannedMealRow, StoreError>;

    /// Plan row with its planned meals, `None` if no plan exists yet.
    async fn select_meal_plan(&self, user_id: &str, date: NaiveDate) -> Result<Option<MealPlanRow>, StoreError>;

    /// Deleting an id that does not exist succeeds.
    async fn delete_planned_meal(&self, meal_id: &str) -> Result<(), StoreError>;

    /// Ensures the parent plan and inserts the meal. Fails with
    /// `StoreError::SlotOccupied` before any write when a breakfast, lunch
    /// or dinner slot already holds a stored meal. The parent upsert always
    /// runs before the insert so the insert has a valid parent. Stores that
    /// can run the check and both writes in one transaction override this.
    async fn add_planned_meal(
        &self,
        user_id: &str,
        date: NaiveDate,
        meal: &NewPlannedMeal,
    ) -> Result<PlannedMealRow, StoreError> {
        if meal.meal_type.is_single_occupancy() {
            let current = self.select_meal_plan(user_id, date).await?;
            if current.is_some_and(|plan| plan.slot_taken(meal.meal_type)) {
                return Err(StoreError::SlotOccupied(meal.meal_type));
            }
        }
        let plan = self.upsert_meal_plan(user_id, date).await?;
        self.insert_planned_meal(&plan.id, meal).await
    }
}

#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn select_profile(&self, user_id: &str) -> Result<Option<ProfileRow>, StoreError>;
    async fn upsert_profile(&self, profile: &ProfileRow) -> Result<(), StoreError>;
    async fn select_preferences(&self, user_id: &str) -> Result<Option<PreferencesRow>, StoreError>;
    async fn upsert_preferences(&self, preferences: &PreferencesRow) -> Result<(), StoreError>;
}

/// Resolves the signed-in user or fails with `StoreError::Unauthenticated`.
pub async fn require_user(identity: &dyn Identity) -> Result<AuthUser, StoreError> {
    identity.current_user().await?.ok_or(StoreError::Unauthenticated)
}
