//! Question exclusions: family-recorded "never ask this again" entries,
//! applied before selection.
//!
//! Exclusion lookup fails open. A storage error means the survey proceeds
//! with no exclusions rather than not at all; the failure is logged and the
//! caller can retry on the next cycle.

use crate::types::{ExclusionRecord, Question};
use anyhow::Result;
use std::collections::HashSet;
use tracing::warn;

/// Source of recorded exclusions. Implementations wrap whatever storage the
/// application uses.
pub trait ExclusionStore {
    /// Question ids excluded for a family, scoped to a child when one is
    /// named. Family-wide records (no child id) always apply; child-specific
    /// records apply only to that child.
    fn exclusions(&self, family_id: &str, child_id: Option<&str>) -> Result<HashSet<u32>>;
}

/// Store backed by an in-memory record list. Suitable for tests and for
/// callers that load records up front.
#[derive(Debug, Clone, Default)]
pub struct InMemoryExclusionStore {
    records: Vec<ExclusionRecord>,
}

impl InMemoryExclusionStore {
    pub fn new(records: Vec<ExclusionRecord>) -> Self {
        Self { records }
    }

    pub fn push(&mut self, record: ExclusionRecord) {
        self.records.push(record);
    }
}

impl ExclusionStore for InMemoryExclusionStore {
    fn exclusions(&self, family_id: &str, child_id: Option<&str>) -> Result<HashSet<u32>> {
        let ids = self
            .records
            .iter()
            .filter(|r| r.family_id == family_id)
            .filter(|r| match (&r.child_id, child_id) {
                (None, _) => true,
                (Some(scoped), Some(requested)) => scoped == requested,
                (Some(_), None) => false,
            })
            .map(|r| r.question_id)
            .collect();
        Ok(ids)
    }
}

/// Fetch exclusions, degrading to an empty set on storage failure.
pub fn fetch_exclusions(
    store: &dyn ExclusionStore,
    family_id: &str,
    child_id: Option<&str>,
) -> HashSet<u32> {
    match store.exclusions(family_id, child_id) {
        Ok(ids) => ids,
        Err(error) => {
            warn!(family_id, ?child_id, %error, "exclusion lookup failed, proceeding without");
            HashSet::new()
        }
    }
}

/// Drop excluded questions from a candidate list.
pub fn filter_excluded(questions: Vec<Question>, excluded: &HashSet<u32>) -> Vec<Question> {
    if excluded.is_empty() {
        return questions;
    }
    questions
        .into_iter()
        .filter(|q| !excluded.contains(&q.id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;
    use anyhow::anyhow;
    use chrono::Utc;

    fn record(family_id: &str, child_id: Option<&str>, question_id: u32) -> ExclusionRecord {
        ExclusionRecord {
            family_id: family_id.to_string(),
            child_id: child_id.map(str::to_string),
            question_id,
            recorded_at: Utc::now(),
        }
    }

    #[test]
    fn family_wide_records_apply_to_everyone() {
        let store = InMemoryExclusionStore::new(vec![
            record("f1", None, 7),
            record("f1", Some("c1"), 9),
            record("f2", None, 11),
        ]);

        let adult = store.exclusions("f1", None).unwrap();
        assert_eq!(adult, HashSet::from([7]));

        let child = store.exclusions("f1", Some("c1")).unwrap();
        assert_eq!(child, HashSet::from([7, 9]));

        let sibling = store.exclusions("f1", Some("c2")).unwrap();
        assert_eq!(sibling, HashSet::from([7]));
    }

    #[test]
    fn other_families_are_invisible() {
        let store = InMemoryExclusionStore::new(vec![record("f2", None, 11)]);
        assert!(store.exclusions("f1", None).unwrap().is_empty());
    }

    #[test]
    fn filter_removes_only_listed_ids() {
        let catalog = catalog::build();
        let excluded = HashSet::from([1, 2, 3]);
        let filtered = filter_excluded(catalog.clone(), &excluded);
        assert_eq!(filtered.len(), catalog.len() - 3);
        assert!(filtered.iter().all(|q| !excluded.contains(&q.id)));
    }

    #[test]
    fn fetch_fails_open_on_store_error() {
        struct Broken;
        impl ExclusionStore for Broken {
            fn exclusions(&self, _: &str, _: Option<&str>) -> Result<HashSet<u32>> {
                Err(anyhow!("storage offline"))
            }
        }

        let ids = fetch_exclusions(&Broken, "f1", Some("c1"));
        assert!(ids.is_empty(), "a failed lookup must not block the survey");
    }
}
