use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::models::{MealSlot, Preferences};
use crate::profile::ProfileChanges;
use crate::search::SearchMode;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Search recipes, regional dishes or mocktails
    Search {
        #[arg(short, long, value_enum, default_value_t = SearchMode::Name)]
        mode: SearchMode,
        term: String,
    },
    /// Show one recipe with its ingredients and steps
    Recipe { id: String },
    /// Daily special, trending and regional picks
    Home,
    /// Categories, areas and ingredients to browse by
    Catalog,
    /// Meal planner for the signed-in user
    #[command(subcommand)]
    Plan(PlanCommand),
    /// Profile of the signed-in user
    #[command(subcommand)]
    Profile(ProfileCommand),
    /// Sign in with email and password and print the session
    SignIn(Credentials),
    /// Create an account, saving dietary preferences when a session is granted
    SignUp {
        #[command(flatten)]
        credentials: Credentials,
        #[command(flatten)]
        preferences: PreferenceArgs,
    },
    /// Food delivery services
    Order,
    About,
}

#[derive(Subcommand, Debug)]
pub enum PlanCommand {
    Show {
        /// Plan date (YYYY-MM-DD), today if omitted
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },
    Add {
        #[arg(short, long)]
        recipe: String,
        #[arg(short, long)]
        slot: MealSlot,
        #[arg(short, long)]
        date: Option<NaiveDate>,
        #[arg(long, default_value_t = 1)]
        servings: u32,
        #[arg(long)]
        note: Option<String>,
    },
    Remove {
        meal_id: String,
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },
}

#[derive(Args, Debug, Default)]
pub struct ProfileFields {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub avatar: Option<String>,
    #[arg(long)]
    pub banner: Option<String>,
}

impl From<ProfileFields> for ProfileChanges {
    fn from(fields: ProfileFields) -> Self {
        ProfileChanges {
            name: fields.name,
            avatar_url: fields.avatar,
            banner_url: fields.banner,
        }
    }
}

#[derive(Args, Debug)]
pub struct Credentials {
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub password: String,
}

#[derive(Args, Debug, Default)]
pub struct PreferenceArgs {
    #[arg(long = "diet")]
    pub dietary_restrictions: Vec<String>,
    #[arg(long = "allergy")]
    pub allergies: Vec<String>,
    #[arg(long = "cuisine")]
    pub cuisine_preferences: Vec<String>,
}

impl From<PreferenceArgs> for Preferences {
    fn from(args: PreferenceArgs) -> Self {
        Preferences {
            dietary_restrictions: args.dietary_restrictions,
            allergies: args.allergies,
            cuisine_preferences: args.cuisine_preferences,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum ProfileCommand {
    Show,
    Update {
        #[command(flatten)]
        fields: ProfileFields,
    },
    /// Save profile fields together with dietary preferences
    Complete {
        #[command(flatten)]
        fields: ProfileFields,
        #[command(flatten)]
        preferences: PreferenceArgs,
    },
}

pub fn parse_args() -> Cli {
    Cli::parse()
}
