//! Imbalance analysis over a family's response history.
//!
//! Two views of the same data:
//! - `analyze` counts raw two-party answers per category and reports the
//!   percentage-point gap, which is what the allocator consumes.
//! - `weighted_balance` weighs each answer by its question's total weight and
//!   splits shared answers evenly, which is what dashboards render.

use crate::types::{Category, CategoryImbalance, Parent, Priorities, Question, ResponseMap};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Aggregate response history into per-category skew statistics, sorted by
/// imbalance descending (category order breaks ties).
///
/// Entries whose question id cannot be resolved against the catalog and
/// entries whose value is not one of the two recognized party labels are
/// skipped. Categories with no responses report imbalance 0 and count as
/// balanced for allocation.
pub fn analyze(responses: &ResponseMap, catalog: &[Question]) -> Vec<CategoryImbalance> {
    let by_id: HashMap<u32, &Question> = catalog.iter().map(|q| (q.id, q)).collect();

    let mut counts: BTreeMap<Category, (u64, u64)> = Category::ALL
        .iter()
        .map(|&category| (category, (0, 0)))
        .collect();

    for (key, value) in responses {
        let Some(question) = by_id.get(&key.question_id) else {
            debug!(question_id = key.question_id, "skipping unresolvable response");
            continue;
        };
        let Some(parent) = Parent::parse(value) else {
            continue;
        };
        let entry = counts.entry(question.category).or_default();
        match parent {
            Parent::A => entry.0 += 1,
            Parent::B => entry.1 += 1,
        }
    }

    let mut imbalances: Vec<CategoryImbalance> = counts
        .into_iter()
        .map(|(category, (parent_a, parent_b))| {
            let total = parent_a + parent_b;
            let (imbalance_percent, dominant) = if total == 0 {
                (0.0, None)
            } else {
                let a_percent = parent_a as f64 / total as f64 * 100.0;
                let b_percent = parent_b as f64 / total as f64 * 100.0;
                let dominant = if parent_a > parent_b {
                    Some(Parent::A)
                } else if parent_b > parent_a {
                    Some(Parent::B)
                } else {
                    None
                };
                ((a_percent - b_percent).abs(), dominant)
            };
            CategoryImbalance {
                category,
                parent_a,
                parent_b,
                total,
                imbalance_percent,
                dominant,
            }
        })
        .collect();

    imbalances.sort_by(|a, b| {
        b.imbalance_percent
            .partial_cmp(&a.imbalance_percent)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.category.cmp(&b.category))
    });
    imbalances
}

/// Weight-weighted balance for one category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryBalance {
    pub parent_a_percent: f64,
    pub parent_b_percent: f64,
    pub neutral_percent: f64,
    /// Percentage-point gap, damped when only a few of the category's
    /// questions have been answered.
    pub imbalance: f64,
    pub question_count: usize,
    pub possible_questions: usize,
    /// Answered share of the category's catalog, 0-1.
    pub coverage: f64,
}

/// Overall weighted roll-up across categories.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverallBalance {
    pub parent_a_percent: f64,
    pub parent_b_percent: f64,
    pub neutral_percent: f64,
    pub imbalance: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceReport {
    /// Only categories with at least one weighted response appear.
    pub categories: BTreeMap<Category, CategoryBalance>,
    pub overall: OverallBalance,
}

/// Answer labels that split a question's weight evenly between both parties.
fn is_shared_answer(value: &str) -> bool {
    matches!(value, "Both" | "Neutral" | "Neither")
}

fn category_base_weight(category: Category) -> f64 {
    match category {
        Category::VisibleHousehold => 1.0,
        Category::InvisibleHousehold => 1.2,
        Category::VisibleParental => 1.1,
        Category::InvisibleParental => 1.5,
        Category::RelationshipHealth => 1.2,
    }
}

fn category_weight(category: Category, priorities: Option<&Priorities>) -> f64 {
    if let Some(priorities) = priorities {
        if priorities.highest == Some(category) {
            return 1.5;
        }
        if priorities.secondary == Some(category) {
            return 1.3;
        }
        if priorities.tertiary == Some(category) {
            return 1.1;
        }
    }
    category_base_weight(category)
}

/// Compute the weighted balance report dashboards render.
///
/// Each response contributes its question's `total_weight` to the answering
/// party; shared answers ("Both"/"Neutral"/"Neither") split the weight
/// evenly. The per-category imbalance is damped when coverage is below half
/// the category's catalog, so a couple of lopsided answers don't read as a
/// crisis.
pub fn weighted_balance(
    responses: &ResponseMap,
    catalog: &[Question],
    priorities: Option<&Priorities>,
) -> BalanceReport {
    let by_id: HashMap<u32, &Question> = catalog.iter().map(|q| (q.id, q)).collect();

    struct Tally {
        parent_a: f64,
        parent_b: f64,
        neutral: f64,
        total: f64,
        question_count: usize,
    }

    let mut tallies: BTreeMap<Category, Tally> = BTreeMap::new();
    for (key, value) in responses {
        let Some(question) = by_id.get(&key.question_id) else {
            continue;
        };
        let recognized = Parent::parse(value).is_some() || is_shared_answer(value);
        if !recognized {
            continue;
        }

        let weight = if question.total_weight > 0.0 {
            question.total_weight
        } else {
            1.0
        };
        let tally = tallies.entry(question.category).or_insert(Tally {
            parent_a: 0.0,
            parent_b: 0.0,
            neutral: 0.0,
            total: 0.0,
            question_count: 0,
        });
        tally.question_count += 1;
        tally.total += weight;
        match Parent::parse(value) {
            Some(Parent::A) => tally.parent_a += weight,
            Some(Parent::B) => tally.parent_b += weight,
            None => {
                tally.parent_a += weight / 2.0;
                tally.parent_b += weight / 2.0;
                tally.neutral += weight;
            }
        }
    }

    let possible: BTreeMap<Category, usize> = Category::ALL
        .iter()
        .map(|&category| {
            (
                category,
                catalog.iter().filter(|q| q.category == category).count(),
            )
        })
        .collect();

    let mut categories = BTreeMap::new();
    for (category, tally) in &tallies {
        if tally.total <= 0.0 {
            continue;
        }
        let parent_a_percent = tally.parent_a / tally.total * 100.0;
        let parent_b_percent = tally.parent_b / tally.total * 100.0;
        let neutral_percent = tally.neutral / tally.total * 100.0;

        let possible_questions = possible.get(category).copied().unwrap_or(0);
        let coverage = if possible_questions > 0 {
            tally.question_count as f64 / possible_questions as f64
        } else {
            0.0
        };
        let damping = if coverage >= 0.5 { 1.0 } else { 0.5 + coverage };
        let imbalance = (parent_a_percent - parent_b_percent).abs() * damping;

        categories.insert(
            *category,
            CategoryBalance {
                parent_a_percent,
                parent_b_percent,
                neutral_percent,
                imbalance,
                question_count: tally.question_count,
                possible_questions,
                coverage,
            },
        );
    }

    // Overall roll-up, weighting each category by its configured importance
    // and how many of its questions were answered.
    let mut total_weight = 0.0;
    let mut weighted_a = 0.0;
    let mut weighted_b = 0.0;
    let mut weighted_neutral = 0.0;
    for (category, balance) in &categories {
        let combined = category_weight(*category, priorities) * balance.question_count as f64;
        weighted_a += balance.parent_a_percent * combined;
        weighted_b += balance.parent_b_percent * combined;
        weighted_neutral += balance.neutral_percent * combined;
        total_weight += combined;
    }

    let overall = if total_weight > 0.0 {
        OverallBalance {
            parent_a_percent: weighted_a / total_weight,
            parent_b_percent: weighted_b / total_weight,
            neutral_percent: weighted_neutral / total_weight,
            imbalance: ((weighted_a - weighted_b) / total_weight).abs(),
        }
    } else {
        OverallBalance {
            parent_a_percent: 50.0,
            parent_b_percent: 50.0,
            neutral_percent: 0.0,
            imbalance: 0.0,
        }
    };

    BalanceReport { categories, overall }
}
