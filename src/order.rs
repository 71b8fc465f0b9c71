use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FoodService {
    pub name: &'static str,
    pub logo_url: &'static str,
    pub url: &'static str,
}

/// Delivery services linked from the order page.
pub const FOOD_SERVICES: &[FoodService] = &[
    FoodService {
        name: "Zomato",
        logo_url: "https://b.zmtcdn.com/web_assets/b40b97e677bc7b2ca77c58c61db266fe1603954218.png",
        url: "https://www.zomato.com/",
    },
    FoodService {
        name: "Swiggy",
        logo_url: "https://upload.wikimedia.org/wikipedia/en/thumb/1/12/Swiggy_logo.svg/2560px-Swiggy_logo.svg.png",
        url: "https://www.swiggy.com/",
    },
    FoodService {
        name: "KFC",
        logo_url: "https://upload.wikimedia.org/wikipedia/en/thumb/b/bf/KFC_logo.svg/1024px-KFC_logo.svg.png",
        url: "https://online.kfc.co.in/",
    },
    FoodService {
        name: "Domino's",
        logo_url: "https://upload.wikimedia.org/wikipedia/commons/thumb/3/3e/Domino%27s_pizza_logo.svg/2036px-Domino%27s_pizza_logo.svg.png",
        url: "https://www.dominos.co.in/",
    },
    FoodService {
        name: "Starbucks",
        logo_url: "https://upload.wikimedia.org/wikipedia/en/thumb/d/d3/Starbucks_Corporation_Logo_2011.svg/1200px-Starbucks_Corporation_Logo_2011.svg.png",
        url: "https://www.starbucks.in/",
    },
    FoodService {
        name: "Burger King",
        logo_url: "https://upload.wikimedia.org/wikipedia/commons/thumb/8/85/Burger_King_logo_%281999%29.svg/2024px-Burger_King_logo_%281999%29.svg.png",
        url: "https://www.burgerking.in/",
    },
];

pub const ABOUT: &str = "Recipe Planner finds recipes across a general recipe directory, \
a regional Indian cuisine directory and a mocktail directory, and keeps a daily \
meal plan with a running nutrition total.";
