use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::debug;

use super::{
    AuthUser, Identity, MealPlanRow, NewPlannedMeal, PlanStore, PlannedMealRow, PreferencesRow,
    ProfileRow, ProfileStore, Session, SignUp, StoreError, MEAL_PLANS_TABLE, PLANNED_MEALS_TABLE, PROFILES_TABLE,
    USER_PREFERENCES_TABLE,
};
use crate::api_connection::connection::{send_empty, send_json};
use crate::api_connection::ApiConnectionError;
use crate::config::{AppConfig, SupabaseSettings, SUPABASE_ANON_KEY_ENV_VAR};

const REST_PATH: &str = "rest/v1";
const AUTH_USER_PATH: &str = "auth/v1/user";
const AUTH_TOKEN_PATH: &str = "auth/v1/token";
const AUTH_SIGNUP_PATH: &str = "auth/v1/signup";

const PREFER_UPSERT: &str = "resolution=merge-duplicates,return=representation";
const PREFER_REPRESENTATION: &str = "return=representation";

/// PostgREST/GoTrue client for the hosted backend.
#[derive(Debug, Clone)]
pub struct SupabaseStore {
    client: Client,
    settings: SupabaseSettings,
}

impl SupabaseStore {
    pub fn new(client: Client, settings: SupabaseSettings) -> Self {
        Self { client, settings }
    }

    pub fn from_config(client: Client, config: &AppConfig) -> Result<Self, ApiConnectionError> {
        let settings = config
            .supabase
            .clone()
            .ok_or_else(|| ApiConnectionError::MissingApiKey(SUPABASE_ANON_KEY_ENV_VAR.to_string()))?;
        Ok(Self::new(client, settings))
    }

    /// Same backend, with requests running as the holder of `access_token`.
    pub fn with_access_token(&self, access_token: impl Into<String>) -> Self {
        let mut settings = self.settings.clone();
        settings.access_token = Some(access_token.into());
        Self::new(self.client.clone(), settings)
    }

    /// Password grant. Rejected credentials map to `StoreError::InvalidCredentials`.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, StoreError> {
        debug!(email, "sign in");
        let request = self
            .client
            .post(self.url(AUTH_TOKEN_PATH))
            .query(&[("grant_type", "password")])
            .header("apikey", &self.settings.anon_key)
            .json(&json!({ "email": email, "password": password }));
        match send_json::<Session>(request).await {
            Ok(session) => Ok(session),
            Err(ApiConnectionError::ApiError { status, .. })
                if status == StatusCode::BAD_REQUEST || status == StatusCode::UNAUTHORIZED =>
            {
                Err(StoreError::InvalidCredentials)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Creates an account. Projects that confirm emails reply with the bare
    /// user and no session.
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<SignUp, StoreError> {
        debug!(email, "sign up");
        let request = self
            .client
            .post(self.url(AUTH_SIGNUP_PATH))
            .header("apikey", &self.settings.anon_key)
            .json(&json!({ "email": email, "password": password }));
        let reply: Value = send_json(request).await?;
        sign_up_from_reply(reply)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.settings.url.trim_end_matches('/'), path)
    }

    fn table_url(&self, table: &str) -> String {
        self.url(&format!("{REST_PATH}/{table}"))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let bearer = self
            .settings
            .access_token
            .as_deref()
            .unwrap_or(&self.settings.anon_key);
        request
            .header("apikey", &self.settings.anon_key)
            .bearer_auth(bearer)
    }

    async fn select<T: DeserializeOwned>(
        &self,
        table: &'static str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>, StoreError> {
        debug!(table, ?query, "select");
        let request = self.authorize(self.client.get(self.table_url(table)).query(query));
        Ok(send_json(request).await?)
    }

    async fn upsert<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        table: &'static str,
        on_conflict: &str,
        body: &B,
    ) -> Result<Vec<T>, StoreError> {
        debug!(table, on_conflict, "upsert");
        let request = self.authorize(
            self.client
                .post(self.table_url(table))
                .query(&[("on_conflict", on_conflict)])
                .header("Prefer", PREFER_UPSERT)
                .json(body),
        );
        Ok(send_json(request).await?)
    }
}

fn eq(value: impl std::fmt::Display) -> String {
    format!("eq.{value}")
}

fn sign_up_from_reply(reply: Value) -> Result<SignUp, StoreError> {
    let outcome = if reply.get("access_token").is_some() {
        SignUp::SignedIn(serde_json::from_value(reply).map_err(ApiConnectionError::from)?)
    } else {
        SignUp::ConfirmationPending(serde_json::from_value(reply).map_err(ApiConnectionError::from)?)
    };
    Ok(outcome)
}

fn first_row<T>(rows: Vec<T>, table: &'static str) -> Result<T, StoreError> {
    rows.into_iter().next().ok_or(StoreError::EmptyResponse(table))
}

#[async_trait]
impl Identity for SupabaseStore {
    async fn current_user(&self) -> Result<Option<AuthUser>, StoreError> {
        if self.settings.access_token.is_none() {
            return Ok(None);
        }
        let request = self.authorize(self.client.get(self.url(AUTH_USER_PATH)));
        match send_json::<AuthUser>(request).await {
            Ok(user) => Ok(Some(user)),
            Err(ApiConnectionError::ApiError { status, .. })
                if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN =>
            {
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl PlanStore for SupabaseStore {
    async fn upsert_meal_plan(&self, user_id: &str, date: NaiveDate) -> Result<MealPlanRow, StoreError> {
        let rows = self
            .upsert(
                MEAL_PLANS_TABLE,
                "user_id,date",
                &json!({ "user_id": user_id, "date": date }),
            )
            .await?;
        first_row(rows, MEAL_PLANS_TABLE)
    }

    async fn insert_planned_meal(
        &self,
        meal_plan_id: &str,
        meal: &NewPlannedMeal,
    ) -> Result<PlannedMealRow, StoreError> {
        let mut body = serde_json::to_value(meal).map_err(ApiConnectionError::from)?;
        if let Some(obj) = body.as_object_mut() {
            obj.insert("meal_plan_id".to_string(), json!(meal_plan_id));
        }

        debug!(table = PLANNED_MEALS_TABLE, meal_plan_id, "insert");
        let request = self.authorize(
            self.client
                .post(self.table_url(PLANNED_MEALS_TABLE))
                .header("Prefer", PREFER_REPRESENTATION)
                .json(&body),
        );
        let rows: Vec<PlannedMealRow> = send_json(request).await?;
        first_row(rows, PLANNED_MEALS_TABLE)
    }

    async fn select_meal_plan(&self, user_id: &str, date: NaiveDate) -> Result<Option<MealPlanRow>, StoreError> {
        let rows = self
            .select(
                MEAL_PLANS_TABLE,
                &[
                    ("select", "*,planned_meals(*)".to_string()),
                    ("user_id", eq(user_id)),
                    ("date", eq(date)),
                ],
            )
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn delete_planned_meal(&self, meal_id: &str) -> Result<(), StoreError> {
        debug!(table = PLANNED_MEALS_TABLE, meal_id, "delete");
        let request = self.authorize(
            self.client
                .delete(self.table_url(PLANNED_MEALS_TABLE))
                .query(&[("id", eq(meal_id))]),
        );
        Ok(send_empty(request).await?)
    }
}

#[async_trait]
impl ProfileStore for SupabaseStore {
    async fn select_profile(&self, user_id: &str) -> Result<Option<ProfileRow>, StoreError> {
        let rows = self
            .select(PROFILES_TABLE, &[("select", "*".to_string()), ("id", eq(user_id))])
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn upsert_profile(&self, profile: &ProfileRow) -> Result<(), StoreError> {
        let _: Vec<ProfileRow> = self.upsert(PROFILES_TABLE, "id", profile).await?;
        Ok(())
    }

    async fn select_preferences(&self, user_id: &str) -> Result<Option<PreferencesRow>, StoreError> {
        let rows = self
            .select(
                USER_PREFERENCES_TABLE,
                &[("select", "*".to_string()), ("user_id", eq(user_id))],
            )
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn upsert_preferences(&self, preferences: &PreferencesRow) -> Result<(), StoreError> {
        let _: Vec<PreferencesRow> = self
            .upsert(USER_PREFERENCES_TABLE, "user_id", preferences)
            .await?;
        Ok(())
    }
}
