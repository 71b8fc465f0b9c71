pub mod api_connection;
pub mod cli;
pub mod config;
pub mod directories;
pub mod home;
pub mod logging;
pub mod meal_plan;
pub mod models;
pub mod nutrition;
pub mod order;
pub mod profile;
pub mod recipe_normalizer;
pub mod search;
pub mod store;
