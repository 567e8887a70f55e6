use serde::Serialize;

use crate::models::DayLog;

/// Eating window shown alongside suggestions.
pub const EATING_WINDOW: &str = "11:00 am – 7:00 pm";

/// Smallest calorie budget used when filtering ideas, so a nearly-spent day
/// still offers a snack.
pub const MIN_IDEA_BUDGET: i64 = 250;
pub const MAX_IDEAS: usize = 12;

/// A meal idea with fixed calories and protein.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MealIdea {
    pub name: &'static str,
    pub calories: i64,
    pub protein_g: i64,
}

const fn idea(name: &'static str, calories: i64, protein_g: i64) -> MealIdea {
    MealIdea {
        name,
        calories,
        protein_g,
    }
}

/// A dashboard button: `label` is shown, `name` is what gets logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuickAddPreset {
    pub label: &'static str,
    pub name: &'static str,
    pub calories: i64,
    pub protein_g: i64,
}

const fn preset(
    label: &'static str,
    name: &'static str,
    calories: i64,
    protein_g: i64,
) -> QuickAddPreset {
    QuickAddPreset {
        label,
        name,
        calories,
        protein_g,
    }
}

pub const QUICK_ADD_PRESETS: [QuickAddPreset; 4] = [
    preset("Protein Shake", "Protein shake", 200, 30),
    preset("Greek Yogurt Bowl", "Greek yogurt + berries", 300, 35),
    preset("Chicken Bowl", "Chicken + veggies + rice (½ cup)", 500, 50),
    preset("Tuna Pack", "Tuna pack + apple", 250, 30),
];

pub const MEAL_IDEAS: [MealIdea; 10] = [
    idea("Whey shake + water", 180, 30),
    idea("0% Greek yogurt + berries", 280, 35),
    idea("Cottage cheese bowl", 260, 28),
    idea("Chicken salad (no croutons)", 450, 50),
    idea("Turkey lettuce wrap + side salad", 420, 40),
    idea("Tuna packet + apple", 250, 30),
    idea("Salmon + veggies", 520, 45),
    idea("Egg-white scramble + veggies", 350, 35),
    idea("Lean steak + veggies", 600, 55),
    idea("Protein oatmeal (½ cup oats + whey)", 420, 35),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlateHint {
    pub title: &'static str,
    pub detail: &'static str,
}

const fn hint(title: &'static str, detail: &'static str) -> PlateHint {
    PlateHint { title, detail }
}

const LARGE_PLATE: [PlateHint; 2] = [
    hint(
        "Big protein plate",
        "8–10 oz chicken/salmon/lean beef + 2 cups veggies + ½ cup rice/potato",
    ),
    hint(
        "Restaurant order",
        "double protein + veggies; sauces on side; skip bread/chips",
    ),
];

const MEDIUM_PLATE: [PlateHint; 2] = [
    hint("Medium plate", "6–8 oz protein + veggies; optional fruit"),
    hint(
        "Snack-proof",
        "finish with Greek yogurt or shake if protein is short",
    ),
];

const CLOSE_OUT: [PlateHint; 2] = [
    hint("Close-out snack", "shake OR Greek yogurt OR tuna packet"),
    hint("If hungry", "add veggies/salad (very low calorie)"),
];

#[derive(Debug, Clone, Serialize)]
pub struct MealSuggestions {
    pub cal_remaining: i64,
    pub prot_remaining: i64,
    pub ideas: Vec<MealIdea>,
    pub plate_hints: Vec<PlateHint>,
    pub eating_window: &'static str,
}

/// Rank ideas that fit the remaining calories by protein per calorie, best first.
#[must_use]
pub fn pick_ideas(cal_remaining: i64) -> Vec<MealIdea> {
    let budget = cal_remaining.max(MIN_IDEA_BUDGET);
    let mut ideas: Vec<MealIdea> = MEAL_IDEAS
        .iter()
        .copied()
        .filter(|i| i.calories <= budget)
        .collect();
    ideas.sort_by(|a, b| {
        protein_density(b)
            .total_cmp(&protein_density(a))
            .then(a.calories.cmp(&b.calories))
    });
    ideas.truncate(MAX_IDEAS);
    ideas
}

#[allow(clippy::cast_precision_loss)]
fn protein_density(idea: &MealIdea) -> f64 {
    idea.protein_g as f64 / idea.calories.max(1) as f64
}

#[must_use]
pub fn plate_hints(cal_remaining: i64) -> Vec<PlateHint> {
    let hints = if cal_remaining >= 650 {
        LARGE_PLATE
    } else if cal_remaining >= 400 {
        MEDIUM_PLATE
    } else {
        CLOSE_OUT
    };
    hints.to_vec()
}

/// Suggestions for what is left of `log`'s calorie and protein budget.
#[must_use]
pub fn meal_suggestions(log: &DayLog) -> MealSuggestions {
    let cal_remaining =
        log.cal_target.unwrap_or_default() - log.calories_total.unwrap_or_default();
    let prot_remaining =
        log.prot_target.unwrap_or_default() - log.protein_g_total.unwrap_or_default();

    MealSuggestions {
        cal_remaining,
        prot_remaining,
        ideas: pick_ideas(cal_remaining),
        plate_hints: plate_hints(cal_remaining),
        eating_window: EATING_WINDOW,
    }
}
