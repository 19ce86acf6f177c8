//! Question allocation: turn imbalance and effectiveness statistics into a
//! per-category question count that sums exactly to the requested total.
//!
//! Policy, applied in order:
//! 1. Categories at or above the 20% imbalance threshold split a proportional
//!    pool; with no measured imbalance anywhere, every category starts from
//!    an even share.
//! 2. Balanced categories get a fixed monitoring allocation of 2 to catch
//!    regression.
//! 3. The two most effective categories get a +1 boost.
//! 4. Anything still unallocated gets a coverage floor of 1.
//! 5. The total is reconciled to the target by trimming the least imbalanced
//!    categories (never below 1) or topping up the most imbalanced.

use crate::error::{EngineError, Result};
use crate::types::{Category, CategoryEffectiveness, CategoryImbalance};
use std::collections::{BTreeMap, HashMap};

/// Fixed allocation given to balanced categories so regressions surface.
const MONITORING_ALLOCATION: usize = 2;

/// Imbalance below this many percentage points counts as balanced.
const BALANCED_THRESHOLD: f64 = 20.0;

/// Allocate `target` questions across `categories`.
///
/// Always returns a map containing every requested category with a positive
/// count. The counts sum to exactly `target` except in the degenerate case
/// `target < categories.len()`, where the one-per-category floor wins.
pub fn allocate(
    imbalances: &[CategoryImbalance],
    effectiveness: &[CategoryEffectiveness],
    target: usize,
    categories: &[Category],
) -> Result<BTreeMap<Category, usize>> {
    if target == 0 {
        return Err(EngineError::InvalidTarget);
    }
    if categories.is_empty() {
        return Err(EngineError::NoCategories);
    }

    let imbalance_of: HashMap<Category, f64> = imbalances
        .iter()
        .map(|i| (i.category, i.imbalance_percent))
        .collect();
    let skew = |category: Category| imbalance_of.get(&category).copied().unwrap_or(0.0);

    let mut allocation: BTreeMap<Category, usize> = BTreeMap::new();

    // 1. Proportional share for significantly imbalanced categories.
    let imbalanced: Vec<Category> = categories
        .iter()
        .copied()
        .filter(|&c| skew(c) >= BALANCED_THRESHOLD)
        .collect();
    let total_imbalance: f64 = imbalanced.iter().map(|&c| skew(c)).sum();

    if total_imbalance > 0.0 {
        for &category in &imbalanced {
            let share = (skew(category) / total_imbalance * 10.0).max(2.0).round() as usize;
            allocation.insert(category, share);
        }
    } else {
        let even = target / categories.len();
        for &category in categories {
            allocation.insert(category, even);
        }
    }

    // 2. Monitoring allocation for balanced categories not yet covered.
    for &category in categories {
        if skew(category) < BALANCED_THRESHOLD {
            allocation
                .entry(category)
                .or_insert(MONITORING_ALLOCATION);
        }
    }

    // 3. Boost the two categories where recommendations land best. Sorted
    // here so callers may pass rates in any order.
    let mut rates: Vec<&CategoryEffectiveness> = effectiveness
        .iter()
        .filter(|r| categories.contains(&r.category))
        .collect();
    rates.sort_by(|a, b| {
        b.effectiveness
            .partial_cmp(&a.effectiveness)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.category.cmp(&b.category))
    });
    for rate in rates.into_iter().take(2) {
        allocation
            .entry(rate.category)
            .and_modify(|count| *count += 1)
            .or_insert(2);
    }

    // 4. Coverage floor.
    for &category in categories {
        let count = allocation.entry(category).or_insert(1);
        if *count == 0 {
            *count = 1;
        }
    }

    // 5. Reconcile to the exact target.
    reconcile(&mut allocation, target, categories, &skew);

    Ok(allocation)
}

fn reconcile(
    allocation: &mut BTreeMap<Category, usize>,
    target: usize,
    categories: &[Category],
    skew: &dyn Fn(Category) -> f64,
) {
    let current: usize = allocation.values().sum();

    if current > target {
        // Trim from the least imbalanced categories, cycling, floor of 1.
        let mut order: Vec<Category> = categories.to_vec();
        order.sort_by(|&a, &b| {
            skew(a)
                .partial_cmp(&skew(b))
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.cmp(&b))
        });

        let mut excess = current - target;
        while excess > 0 {
            let mut trimmed = false;
            for &category in &order {
                if excess == 0 {
                    break;
                }
                if let Some(count) = allocation.get_mut(&category) {
                    if *count > 1 {
                        *count -= 1;
                        excess -= 1;
                        trimmed = true;
                    }
                }
            }
            if !trimmed {
                // Every category is at the floor; the target was smaller
                // than the category count.
                break;
            }
        }
    } else if current < target {
        // Top up the most imbalanced categories, cycling.
        let mut order: Vec<Category> = categories.to_vec();
        order.sort_by(|&a, &b| {
            skew(b)
                .partial_cmp(&skew(a))
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.cmp(&b))
        });

        let mut deficit = target - current;
        while deficit > 0 {
            for &category in &order {
                if deficit == 0 {
                    break;
                }
                *allocation.entry(category).or_insert(0) += 1;
                deficit -= 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Parent;
    use proptest::prelude::*;

    fn imbalance(category: Category, percent: f64) -> CategoryImbalance {
        CategoryImbalance {
            category,
            parent_a: 0,
            parent_b: 0,
            total: 10,
            imbalance_percent: percent,
            dominant: if percent > 0.0 { Some(Parent::A) } else { None },
        }
    }

    fn rate(category: Category, effectiveness: f64) -> CategoryEffectiveness {
        CategoryEffectiveness {
            category,
            completed: (effectiveness * 10.0) as u64,
            total: 10,
            effectiveness,
        }
    }

    const FOUR: [Category; 4] = [
        Category::VisibleHousehold,
        Category::InvisibleHousehold,
        Category::VisibleParental,
        Category::InvisibleParental,
    ];

    #[test]
    fn rejects_zero_target_and_empty_categories() {
        assert_eq!(
            allocate(&[], &[], 0, &FOUR).unwrap_err(),
            EngineError::InvalidTarget
        );
        assert_eq!(
            allocate(&[], &[], 20, &[]).unwrap_err(),
            EngineError::NoCategories
        );
    }

    #[test]
    fn sums_to_target_and_covers_every_category() {
        let imbalances = vec![
            imbalance(Category::VisibleHousehold, 60.0),
            imbalance(Category::InvisibleHousehold, 30.0),
            imbalance(Category::VisibleParental, 10.0),
            imbalance(Category::InvisibleParental, 0.0),
        ];
        let allocation = allocate(&imbalances, &[], 20, &FOUR).unwrap();

        assert_eq!(allocation.values().sum::<usize>(), 20);
        for category in FOUR {
            assert!(allocation[&category] >= 1, "{:?} missing floor", category);
        }
    }

    #[test]
    fn single_dominant_imbalance_gets_largest_share() {
        let imbalances = vec![
            imbalance(Category::VisibleHousehold, 80.0),
            imbalance(Category::InvisibleHousehold, 0.0),
            imbalance(Category::VisibleParental, 0.0),
            imbalance(Category::InvisibleParental, 0.0),
        ];
        let allocation = allocate(&imbalances, &[], 20, &FOUR).unwrap();

        assert_eq!(allocation.values().sum::<usize>(), 20);
        let dominant = allocation[&Category::VisibleHousehold];
        for category in FOUR.iter().skip(1) {
            assert!(
                dominant > allocation[category],
                "imbalanced category should get the largest single share"
            );
            assert!(allocation[category] >= 1);
        }
    }

    #[test]
    fn no_imbalance_data_spreads_evenly() {
        let allocation = allocate(&[], &[], 20, &FOUR).unwrap();
        assert_eq!(allocation.values().sum::<usize>(), 20);
        // 20 / 4 = 5 each; effectiveness and reconciliation leave it even.
        for category in FOUR {
            assert_eq!(allocation[&category], 5);
        }
    }

    #[test]
    fn balanced_categories_get_monitoring_allocation() {
        let imbalances = vec![
            imbalance(Category::VisibleHousehold, 90.0),
            imbalance(Category::InvisibleHousehold, 5.0),
        ];
        // Generous target so nothing gets trimmed back to the floor.
        let allocation = allocate(&imbalances, &[], 30, &FOUR).unwrap();
        assert!(
            allocation[&Category::InvisibleHousehold] >= MONITORING_ALLOCATION,
            "balanced category should keep its monitoring slots"
        );
    }

    #[test]
    fn effectiveness_boost_goes_to_top_two() {
        let rates = vec![
            rate(Category::VisibleParental, 0.9),
            rate(Category::InvisibleParental, 0.8),
            rate(Category::VisibleHousehold, 0.1),
        ];
        let boosted = allocate(&[], &rates, 22, &FOUR).unwrap();
        let plain = allocate(&[], &[], 22, &FOUR).unwrap();

        // 22/4 = 5 each, +1 to the top two, then reconciliation trims the
        // two extra slots from the least imbalanced (all tied, category
        // order). The boosted categories end no lower than the plain run.
        assert_eq!(boosted.values().sum::<usize>(), 22);
        assert!(boosted[&Category::VisibleParental] >= plain[&Category::VisibleParental]);
    }

    #[test]
    fn effectiveness_boost_ignores_input_order() {
        let sorted = vec![
            rate(Category::VisibleParental, 0.9),
            rate(Category::InvisibleParental, 0.8),
            rate(Category::VisibleHousehold, 0.1),
        ];
        let shuffled = vec![
            rate(Category::VisibleHousehold, 0.1),
            rate(Category::InvisibleParental, 0.8),
            rate(Category::VisibleParental, 0.9),
        ];
        assert_eq!(
            allocate(&[], &sorted, 22, &FOUR).unwrap(),
            allocate(&[], &shuffled, 22, &FOUR).unwrap(),
            "boost must go to the best rates regardless of slice order"
        );
    }

    #[test]
    fn floor_wins_when_target_is_smaller_than_category_count() {
        let allocation = allocate(&[], &[], 2, &FOUR).unwrap();
        for category in FOUR {
            assert!(allocation[&category] >= 1);
        }
        assert_eq!(allocation.values().sum::<usize>(), FOUR.len());
    }

    #[test]
    fn all_five_categories_supported() {
        let allocation = allocate(&[], &[], 72, &Category::ALL).unwrap();
        assert_eq!(allocation.values().sum::<usize>(), 72);
        assert_eq!(allocation.len(), 5);
    }

    proptest! {
        #[test]
        fn allocation_always_sums_to_target(
            target in 5usize..200,
            skews in proptest::collection::vec(0.0f64..100.0, 5),
        ) {
            let imbalances: Vec<CategoryImbalance> = Category::ALL
                .iter()
                .zip(&skews)
                .map(|(&category, &percent)| imbalance(category, percent))
                .collect();
            let allocation = allocate(&imbalances, &[], target, &Category::ALL).unwrap();

            prop_assert_eq!(allocation.values().sum::<usize>(), target);
            for category in Category::ALL {
                prop_assert!(allocation[&category] >= 1);
            }
        }
    }
}
