use chrono::{DateTime, NaiveDate, Utc};
use serde::ser::SerializeSeq;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Per-recipe nutrition as reported by the upstream source. Values are
/// passed through, never derived.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct NutritionSnapshot {
    #[serde(default)]
    pub calories: f64,
    #[serde(default)]
    pub protein: f64,
    #[serde(default)]
    pub carbohydrates: f64,
    #[serde(default)]
    pub fat: f64,
    #[serde(default)]
    pub fiber: f64,
    #[serde(default)]
    pub sugar: f64,
    #[serde(default)]
    pub sodium: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vitamins: Option<BTreeMap<String, f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minerals: Option<BTreeMap<String, f64>>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Recipe {
    pub id: String,
    pub name: String,
    pub category: String,
    pub area: String,
    pub instructions: String,
    pub thumbnail: String,
    pub video_url: Option<String>,
    /// Always the same length as `measures`; index `i` of one pairs with
    /// index `i` of the other.
    pub ingredients: Vec<String>,
    pub measures: Vec<String>,
    pub nutrition: Option<NutritionSnapshot>,
}

impl Recipe {
    /// Instruction text split into steps on line breaks, empty lines dropped.
    pub fn instruction_steps(&self) -> Vec<&str> {
        self.instructions
            .split('\n')
            .map(|step| step.trim_end_matches('\r').trim())
            .filter(|step| !step.is_empty())
            .collect()
    }
}

/// Summary record returned by filter endpoints; needs a lookup for details.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RecipeStub {
    pub id: String,
    pub name: String,
    pub thumbnail: Option<String>,
}

/// Record from the regional-cuisine directory. The source assigns no
/// identifier, so names may repeat.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RegionalRecipe {
    pub name: String,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub instructions: Vec<String>,
    #[serde(default)]
    pub cuisine: String,
    #[serde(default)]
    pub course: String,
    #[serde(default)]
    pub diet: String,
    #[serde(default)]
    pub prep_time: String,
    #[serde(default)]
    pub cook_time: String,
    #[serde(default)]
    pub servings: u32,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub nutrition: Option<NutritionSnapshot>,
}

impl RegionalRecipe {
    /// Key for rendering lists, derived from name and cuisine. Only stable
    /// within one build of this crate; never persist it.
    pub fn synthetic_key(&self) -> String {
        let mut hasher = DefaultHasher::new();
        self.name.hash(&mut hasher);
        self.cuisine.hash(&mut hasher);
        format!("{:016x}", hasher.finish())
    }

    pub fn matches_term(&self, needle_lowercase: &str) -> bool {
        self.name.to_lowercase().contains(needle_lowercase)
            || self
                .ingredients
                .iter()
                .any(|i| i.to_lowercase().contains(needle_lowercase))
    }
}

#[derive(Serialize)]
struct KeyedRegional<'a> {
    key: String,
    #[serde(flatten)]
    recipe: &'a RegionalRecipe,
}

/// Serializes regional rows with their `synthetic_key` as a `key` field.
pub fn serialize_keyed<S: Serializer>(rows: &[RegionalRecipe], serializer: S) -> Result<S::Ok, S::Error> {
    let mut seq = serializer.serialize_seq(Some(rows.len()))?;
    for recipe in rows {
        seq.serialize_element(&KeyedRegional {
            key: recipe.synthetic_key(),
            recipe,
        })?;
    }
    seq.end()
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Beverage {
    pub id: String,
    pub name: String,
    pub category: String,
    pub instructions: String,
    pub thumbnail: String,
    pub ingredients: Vec<String>,
    pub measures: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct IngredientInfo {
    pub name: String,
    pub description: Option<String>,
    pub kind: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum MealSlot {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealSlot {
    pub fn as_str(&self) -> &'static str {
        match self {
            MealSlot::Breakfast => "breakfast",
            MealSlot::Lunch => "lunch",
            MealSlot::Dinner => "dinner",
            MealSlot::Snack => "snack",
        }
    }

    /// Breakfast, lunch and dinner hold at most one meal; snacks are unbounded.
    pub fn is_single_occupancy(&self) -> bool {
        !matches!(self, MealSlot::Snack)
    }
}

impl fmt::Display for MealSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MealSlot {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "breakfast" => Ok(MealSlot::Breakfast),
            "lunch" => Ok(MealSlot::Lunch),
            "dinner" => Ok(MealSlot::Dinner),
            "snack" | "snacks" => Ok(MealSlot::Snack),
            other => Err(format!("unknown meal slot: {other}")),
        }
    }
}

/// A recipe placed in a plan. Holds the recipe id, not a copy of it.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PlannedMeal {
    pub id: String,
    pub recipe_id: String,
    pub meal_type: MealSlot,
    pub servings: u32,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct MealSlots {
    pub breakfast: Option<PlannedMeal>,
    pub lunch: Option<PlannedMeal>,
    pub dinner: Option<PlannedMeal>,
    #[serde(default)]
    pub snacks: Vec<PlannedMeal>,
    /// Stored meals found in a breakfast, lunch or dinner slot that was
    /// already filled. Kept visible and counted so they can be removed.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conflicts: Vec<PlannedMeal>,
}

impl MealSlots {
    pub fn get(&self, slot: MealSlot) -> Option<&PlannedMeal> {
        match slot {
            MealSlot::Breakfast => self.breakfast.as_ref(),
            MealSlot::Lunch => self.lunch.as_ref(),
            MealSlot::Dinner => self.dinner.as_ref(),
            MealSlot::Snack => self.snacks.first(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlannedMeal> {
        self.breakfast
            .iter()
            .chain(self.lunch.iter())
            .chain(self.dinner.iter())
            .chain(self.snacks.iter())
            .chain(self.conflicts.iter())
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}

/// One user's plan for one calendar date.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MealPlan {
    pub id: String,
    pub user_id: String,
    pub date: NaiveDate,
    pub meals: MealSlots,
    /// Recomputed from `meals` on every load; never authored directly.
    pub total_nutrition: NutritionSnapshot,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct Preferences {
    #[serde(default)]
    pub dietary_restrictions: Vec<String>,
    #[serde(default)]
    pub allergies: Vec<String>,
    #[serde(default)]
    pub cuisine_preferences: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub avatar_url: Option<String>,
    pub banner_url: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
    pub preferences: Option<Preferences>,
}
