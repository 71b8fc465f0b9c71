use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use serde::Serialize;
use std::sync::Arc;

use recipe_planner::api_connection::connection::build_http_client;
use recipe_planner::cli::{parse_args, Command, PlanCommand, ProfileCommand};
use recipe_planner::config::{AppConfig, SUPABASE_ACCESS_TOKEN_ENV_VAR};
use recipe_planner::directories::{CocktailDbClient, MealDbClient, RecipeDirectory, RegionalFoodClient};
use recipe_planner::home::{fetch_recipe, Catalog, HomeFeed};
use recipe_planner::logging::init_logging;
use recipe_planner::meal_plan::MealPlanAssembler;
use recipe_planner::order::{ABOUT, FOOD_SERVICES};
use recipe_planner::profile::ProfileService;
use recipe_planner::search::{SearchDispatcher, SearchOutcome};
use recipe_planner::store::{require_user, SignUp, StoreError, SupabaseStore};

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn notice(message: &str) {
    eprintln!("{message}");
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    init_logging();

    let cli_args = parse_args();
    let config = AppConfig::from_env();
    let client = build_http_client(&config).context("Failed to build HTTP client")?;

    let generic: Arc<dyn RecipeDirectory> =
        Arc::new(MealDbClient::new(client.clone(), config.mealdb_base_url.clone()));
    let regional = Arc::new(RegionalFoodClient::new(client.clone(), config.regional_base_url.clone()));
    let beverages = Arc::new(CocktailDbClient::new(client.clone(), config.cocktaildb_base_url.clone()));
    let today = || Local::now().date_naive();

    match cli_args.command {
        Command::Search { mode, term } => {
            let dispatcher = SearchDispatcher::new(generic, regional, beverages, config.request_timeout);
            match dispatcher.search(mode, &term).await {
                Ok(SearchOutcome::Skipped) => {}
                Ok(SearchOutcome::Degraded { failed }) => {
                    notice(&format!("Some sources failed and show no results: {failed:?}"));
                    print_json(&dispatcher.results().await)?;
                }
                Ok(_) => print_json(&dispatcher.results().await)?,
                Err(e) => notice(e.notice()),
            }
        }
        Command::Recipe { id } => match fetch_recipe(generic.as_ref(), &id).await {
            Ok(Some(recipe)) => print_json(&recipe)?,
            Ok(None) => notice("Recipe not found"),
            Err(e) => {
                tracing::warn!(error = %e, recipe_id = %id, "recipe lookup failed");
                notice("Failed to load recipe");
            }
        },
        Command::Home => {
            let feed = HomeFeed::load(generic.as_ref(), regional.as_ref()).await;
            print_json(&feed)?;
        }
        Command::Catalog => match Catalog::load(generic.as_ref()).await {
            Ok(catalog) => print_json(&catalog)?,
            Err(e) => {
                tracing::warn!(error = %e, "catalog load failed");
                notice("Failed to load recipe lists");
            }
        },
        Command::Plan(command) => {
            let store = Arc::new(
                SupabaseStore::from_config(client.clone(), &config)
                    .context("Meal planning needs the backend configured")?,
            );
            let user = match require_user(store.as_ref()).await {
                Ok(user) => user,
                Err(e) => {
                    tracing::warn!(error = %e, "no user for meal planning");
                    notice("Please sign in to create a meal plan");
                    return Ok(());
                }
            };
            let mut planner = MealPlanAssembler::new(store, generic, config.request_timeout);

            let (date, result) = match command {
                PlanCommand::Show { date } => {
                    let date = date.unwrap_or_else(today);
                    (date, planner.load_plan(&user.id, date).await.map(|_| ()))
                }
                PlanCommand::Add { recipe, slot, date, servings, note } => {
                    let date: NaiveDate = date.unwrap_or_else(today);
                    let loaded = planner.load_plan(&user.id, date).await.map(|_| ());
                    let result = match loaded {
                        Ok(()) => planner
                            .add_meal(&user.id, date, &recipe, slot, servings, note)
                            .await
                            .map(|_| ()),
                        Err(e) => Err(e),
                    };
                    (date, result)
                }
                PlanCommand::Remove { meal_id, date } => {
                    let date = date.unwrap_or_else(today);
                    let loaded = planner.load_plan(&user.id, date).await.map(|_| ());
                    let result = match loaded {
                        Ok(()) => planner.remove_meal(&meal_id).await.map(|_| ()),
                        Err(e) => Err(e),
                    };
                    (date, result)
                }
            };

            if let Err(e) = &result {
                tracing::warn!(error = %e, %date, "meal plan operation failed");
                notice(e.notice());
            }
            match planner.plan() {
                Some(plan) => print_json(plan)?,
                None if result.is_ok() => notice(&format!("No meals planned for {date}")),
                None => {}
            }
        }
        Command::Profile(command) => {
            let store = Arc::new(
                SupabaseStore::from_config(client.clone(), &config)
                    .context("Profiles need the backend configured")?,
            );
            let service = ProfileService::new(store.clone(), store);

            let result = match command {
                ProfileCommand::Show => service.load_profile().await.map(Some),
                ProfileCommand::Update { fields } => {
                    service.update_profile(fields.into()).await.map(|_| None)
                }
                ProfileCommand::Complete { fields, preferences } => service
                    .complete_profile(fields.into(), preferences.into())
                    .await
                    .map(|_| None),
            };

            match result {
                Ok(Some(Some(profile))) => print_json(&profile)?,
                Ok(Some(None)) => notice("No profile saved yet"),
                Ok(None) => notice("Profile updated successfully"),
                Err(e) => {
                    tracing::warn!(error = %e, "profile operation failed");
                    notice(e.notice());
                }
            }
        }
        Command::SignIn(credentials) => {
            let store = SupabaseStore::from_config(client.clone(), &config)
                .context("Signing in needs the backend configured")?;
            match store.sign_in(&credentials.email, &credentials.password).await {
                Ok(session) => {
                    print_json(&session)?;
                    notice(&format!("Signed in; export {SUPABASE_ACCESS_TOKEN_ENV_VAR} to stay signed in"));
                }
                Err(StoreError::InvalidCredentials) => notice("Invalid email or password"),
                Err(e) => {
                    tracing::warn!(error = %e, "sign in failed");
                    notice("Sign in failed");
                }
            }
        }
        Command::SignUp { credentials, preferences } => {
            let store = SupabaseStore::from_config(client.clone(), &config)
                .context("Signing up needs the backend configured")?;
            match store.sign_up(&credentials.email, &credentials.password).await {
                Ok(SignUp::SignedIn(session)) => {
                    let signed_in = Arc::new(store.with_access_token(&session.access_token));
                    let service = ProfileService::new(signed_in.clone(), signed_in);
                    if let Err(e) = service.save_preferences(preferences.into()).await {
                        tracing::warn!(error = %e, "saving sign-up preferences failed");
                        notice("Account created; failed to save preferences");
                    }
                    print_json(&session)?;
                    notice(&format!("Signed up; export {SUPABASE_ACCESS_TOKEN_ENV_VAR} to stay signed in"));
                }
                Ok(SignUp::ConfirmationPending(user)) => {
                    tracing::info!(user_id = %user.id, "sign up awaits email confirmation");
                    notice("Check your email to confirm the account, then sign in and complete your profile");
                }
                Err(e) => {
                    tracing::warn!(error = %e, "sign up failed");
                    notice("Sign up failed");
                }
            }
        }
        Command::Order => print_json(&FOOD_SERVICES)?,
        Command::About => println!("{ABOUT}"),
    }

    Ok(())
}
