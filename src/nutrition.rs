use std::collections::BTreeMap;

use crate::models::NutritionSnapshot;

/// One meal's contribution to a daily total.
#[derive(Debug, Clone, Copy)]
pub struct MealPortion<'a> {
    pub nutrition: Option<&'a NutritionSnapshot>,
    pub servings: u32,
}

fn add_scaled(total: &mut Option<BTreeMap<String, f64>>, part: &Option<BTreeMap<String, f64>>, factor: f64) {
    if let Some(part) = part {
        let total = total.get_or_insert_with(BTreeMap::new);
        for (name, amount) in part {
            *total.entry(name.clone()).or_insert(0.0) += amount * factor;
        }
    }
}

/// Sums `snapshot * servings` field by field. A missing snapshot adds zero.
///
/// Always computed from scratch; callers never patch a previous total.
pub fn total_nutrition<'a, I>(portions: I) -> NutritionSnapshot
where
    I: IntoIterator<Item = MealPortion<'a>>,
{
    let mut total = NutritionSnapshot::default();

    for portion in portions {
        let Some(snapshot) = portion.nutrition else {
            continue;
        };
        let factor = f64::from(portion.servings);

        macro_rules! add_scaled_field {
            ($field:ident) => {
                total.$field += snapshot.$field * factor;
            };
        }
        add_scaled_field!(calories);
        add_scaled_field!(protein);
        add_scaled_field!(carbohydrates);
        add_scaled_field!(fat);
        add_scaled_field!(fiber);
        add_scaled_field!(sugar);
        add_scaled_field!(sodium);

        add_scaled(&mut total.vitamins, &snapshot.vitamins, factor);
        add_scaled(&mut total.minerals, &snapshot.minerals, factor);
    }

    total
}
