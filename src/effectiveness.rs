//! Task-effectiveness analysis: how well each category's recommended tasks
//! actually got done during a cycle.
//!
//! High completion means recommendations in that category land with the
//! family, so the allocator gives those categories a small boost to keep
//! measuring what works.

use crate::types::{Category, CategoryEffectiveness, TaskRecord};
use std::collections::BTreeMap;
use tracing::warn;

/// Aggregate completion records into per-category rates, sorted by
/// effectiveness descending (category order breaks ties).
///
/// Records with an unrecognized category label are skipped. A category with
/// no records at all does not appear; a category whose records are all
/// incomplete reports effectiveness 0.
pub fn analyze(completed_tasks: &[TaskRecord]) -> Vec<CategoryEffectiveness> {
    let mut counts: BTreeMap<Category, (u64, u64)> = BTreeMap::new();

    for record in completed_tasks {
        let Some(category) = Category::parse_label(&record.category) else {
            warn!(label = %record.category, "skipping task record with unknown category");
            continue;
        };
        let entry = counts.entry(category).or_default();
        entry.1 += 1;
        if record.completed {
            entry.0 += 1;
        }
    }

    let mut rates: Vec<CategoryEffectiveness> = counts
        .into_iter()
        .map(|(category, (completed, total))| CategoryEffectiveness {
            category,
            completed,
            total,
            effectiveness: if total == 0 {
                0.0
            } else {
                completed as f64 / total as f64
            },
        })
        .collect();

    rates.sort_by(|a, b| {
        b.effectiveness
            .partial_cmp(&a.effectiveness)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.category.cmp(&b.category))
    });
    rates
}
