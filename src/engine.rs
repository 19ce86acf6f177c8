//! The survey engine: the facade tying catalog, weighting, analysis,
//! allocation, exclusion, and selection into the two survey-building entry
//! points the application calls.
//!
//! The engine owns the question catalog (including any feedback edits) but no
//! other state. Responses, task records, exclusions, and the selection cache
//! all belong to the caller, so one engine instance can serve any number of
//! families.

use crate::allocation;
use crate::catalog;
use crate::effectiveness;
use crate::error::Result;
use crate::exclusion::{self, ExclusionStore};
use crate::imbalance;
use crate::selection::{self, SelectionCache, SelectionRequest};
use crate::types::{
    Category, CategoryEffectiveness, CategoryImbalance, FamilyProfile, Priorities, Question,
    ResponseMap, TaskRecord,
};
use crate::weight::{self, AttributeFeedback, KeywordOverlap, SimilarityPolicy};
use tracing::info;

/// Question count of the one-time onboarding survey.
pub const INITIAL_SURVEY_LEN: usize = 72;

/// Default question count of a recurring check-in.
pub const CHECKIN_LEN: usize = 20;

pub struct SurveyEngine {
    catalog: Vec<Question>,
    similarity: Box<dyn SimilarityPolicy + Send + Sync>,
}

impl Default for SurveyEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SurveyEngine {
    /// Engine over the built-in question catalog.
    pub fn new() -> Self {
        Self {
            catalog: catalog::build(),
            similarity: Box::new(KeywordOverlap),
        }
    }

    /// Swap the similarity policy used for feedback propagation.
    pub fn with_similarity(
        mut self,
        similarity: Box<dyn SimilarityPolicy + Send + Sync>,
    ) -> Self {
        self.similarity = similarity;
        self
    }

    pub fn catalog(&self) -> &[Question] {
        &self.catalog
    }

    /// Apply a family's attribute feedback to one question and its
    /// similar neighbors. Returns the number of questions updated.
    pub fn customize_weights(
        &mut self,
        question_id: u32,
        feedback: &AttributeFeedback,
        profile: Option<&FamilyProfile>,
    ) -> usize {
        let priorities = profile.map(|p| &p.priorities);
        let updated = weight::apply_feedback(
            &mut self.catalog,
            question_id,
            feedback,
            self.similarity.as_ref(),
            priorities,
        );
        info!(question_id, updated, "applied weight feedback");
        updated
    }

    /// Recompute every catalog weight under a family's category priorities.
    /// Call once after onboarding or whenever the priorities change.
    pub fn apply_priorities(&mut self, priorities: &Priorities) {
        weight::recompute_weights(&mut self.catalog, Some(priorities));
    }

    pub fn analyze_imbalance(&self, responses: &ResponseMap) -> Vec<CategoryImbalance> {
        imbalance::analyze(responses, &self.catalog)
    }

    pub fn analyze_effectiveness(&self, completed_tasks: &[TaskRecord]) -> Vec<CategoryEffectiveness> {
        effectiveness::analyze(completed_tasks)
    }

    /// Build the onboarding survey for a family.
    ///
    /// With no response history yet, every category gets an even allocation;
    /// personalization happens in the ranking via the family profile. Passing
    /// a `child_id` builds that child's deterministic variant.
    pub fn initial_survey(
        &self,
        profile: &FamilyProfile,
        store: &dyn ExclusionStore,
        child_id: Option<&str>,
        target: usize,
    ) -> Result<Vec<Question>> {
        let allocation = allocation::allocate(&[], &[], target, &Category::ALL)?;
        let excluded = exclusion::fetch_exclusions(store, &profile.family_id, child_id);

        let request = SelectionRequest {
            allocation: &allocation,
            excluded: &excluded,
            profile: Some(profile),
            personalize: true,
            week_number: 0,
            child_id,
            target,
        };
        let selected = selection::select_questions(&self.catalog, &request);
        info!(
            family_id = %profile.family_id,
            count = selected.len(),
            "built initial survey"
        );
        Ok(selected)
    }

    /// Build a recurring check-in survey for one cycle.
    ///
    /// Pipeline:
    /// 1. Measure per-category workload imbalance from the response history.
    /// 2. Measure per-category task effectiveness from completion records.
    /// 3. Allocate the question budget across categories.
    /// 4. Fetch exclusions (failing open) and select under the allocation.
    ///
    /// Results are cached per `(week, audience)`; callers invalidate the
    /// cache when responses or exclusions change.
    #[allow(clippy::too_many_arguments)]
    pub fn recurring_survey(
        &self,
        profile: &FamilyProfile,
        responses: &ResponseMap,
        completed_tasks: &[TaskRecord],
        week_number: u32,
        child_id: Option<&str>,
        store: &dyn ExclusionStore,
        cache: &mut SelectionCache,
        target: usize,
    ) -> Result<Vec<Question>> {
        let key = SelectionCache::key(week_number, child_id);
        if let Some(cached) = cache.get(&key) {
            return Ok(cached.clone());
        }

        let imbalances = imbalance::analyze(responses, &self.catalog);
        let rates = effectiveness::analyze(completed_tasks);
        let allocation = allocation::allocate(&imbalances, &rates, target, &Category::ALL)?;
        let excluded = exclusion::fetch_exclusions(store, &profile.family_id, child_id);

        // Check-in ranking is history-driven; relevance scoring applies to
        // the initial survey only. The profile still supplies priorities.
        let request = SelectionRequest {
            allocation: &allocation,
            excluded: &excluded,
            profile: Some(profile),
            personalize: false,
            week_number,
            child_id,
            target,
        };
        let selected = selection::select_questions(&self.catalog, &request);
        info!(
            family_id = %profile.family_id,
            week_number,
            count = selected.len(),
            "built recurring survey"
        );

        cache.insert(key, selected.clone());
        Ok(selected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::exclusion::InMemoryExclusionStore;
    use crate::types::{
        CommunicationStyle, EmotionalLabor, ExclusionRecord, FamilyMember, MemberRole, ResponseKey,
    };
    use chrono::Utc;

    fn profile() -> FamilyProfile {
        FamilyProfile {
            family_id: "f1".into(),
            members: vec![
                FamilyMember {
                    id: "p1".into(),
                    name: "Alex".into(),
                    role: MemberRole::Parent {
                        role_type: "Mama".into(),
                    },
                },
                FamilyMember {
                    id: "p2".into(),
                    name: "Robin".into(),
                    role: MemberRole::Parent {
                        role_type: "Papa".into(),
                    },
                },
                FamilyMember {
                    id: "c1".into(),
                    name: "Sam".into(),
                    role: MemberRole::Child { age: Some(10) },
                },
            ],
            priorities: Default::default(),
            communication_style: None,
        }
    }

    fn empty_store() -> InMemoryExclusionStore {
        InMemoryExclusionStore::default()
    }

    #[test]
    fn initial_survey_is_full_size_and_display_ordered() {
        let engine = SurveyEngine::new();
        let survey = engine
            .initial_survey(&profile(), &empty_store(), None, INITIAL_SURVEY_LEN)
            .unwrap();

        assert_eq!(survey.len(), INITIAL_SURVEY_LEN);
        for pair in survey.windows(2) {
            assert!(
                pair[0]
                    .category
                    .ordinal()
                    .cmp(&pair[1].category.ordinal())
                    .then(pair[0].id.cmp(&pair[1].id))
                    .is_lt(),
                "survey must be grouped by category with ascending ids"
            );
        }
    }

    #[test]
    fn recurring_survey_skews_toward_imbalanced_category() {
        let engine = SurveyEngine::new();
        // One parent answers for every invisible-household question.
        let mut responses = ResponseMap::new();
        for question in engine
            .catalog()
            .iter()
            .filter(|q| q.category == Category::InvisibleHousehold)
        {
            responses.insert(ResponseKey::new(1, "p1", question.id), "Mama".into());
        }

        let mut cache = SelectionCache::new();
        let survey = engine
            .recurring_survey(
                &profile(),
                &responses,
                &[],
                2,
                None,
                &empty_store(),
                &mut cache,
                CHECKIN_LEN,
            )
            .unwrap();

        assert_eq!(survey.len(), CHECKIN_LEN);
        let invisible = survey
            .iter()
            .filter(|q| q.category == Category::InvisibleHousehold)
            .count();
        let others = Category::ALL
            .iter()
            .filter(|&&c| c != Category::InvisibleHousehold)
            .map(|&c| survey.iter().filter(|q| q.category == c).count())
            .max()
            .unwrap();
        assert!(
            invisible > others,
            "fully one-sided category should dominate the check-in"
        );
    }

    #[test]
    fn recurring_survey_hits_the_cache() {
        let engine = SurveyEngine::new();
        let mut cache = SelectionCache::new();
        let args = (ResponseMap::new(), Vec::<TaskRecord>::new());

        let first = engine
            .recurring_survey(
                &profile(),
                &args.0,
                &args.1,
                3,
                Some("c1"),
                &empty_store(),
                &mut cache,
                CHECKIN_LEN,
            )
            .unwrap();
        assert_eq!(cache.len(), 1);

        let second = engine
            .recurring_survey(
                &profile(),
                &args.0,
                &args.1,
                3,
                Some("c1"),
                &empty_store(),
                &mut cache,
                CHECKIN_LEN,
            )
            .unwrap();

        let first_ids: Vec<u32> = first.iter().map(|q| q.id).collect();
        let second_ids: Vec<u32> = second.iter().map(|q| q.id).collect();
        assert_eq!(first_ids, second_ids);
    }

    #[test]
    fn checkin_ranking_ignores_relevance_signals() {
        let engine = SurveyEngine::new();
        let quiet = profile();
        let mut expressive = profile();
        expressive.communication_style = Some(CommunicationStyle::Open);

        let survey_for = |p: &FamilyProfile| {
            let mut cache = SelectionCache::new();
            engine
                .recurring_survey(
                    p,
                    &ResponseMap::new(),
                    &[],
                    5,
                    None,
                    &empty_store(),
                    &mut cache,
                    CHECKIN_LEN,
                )
                .unwrap()
                .iter()
                .map(|q| q.id)
                .collect::<Vec<u32>>()
        };

        assert_eq!(
            survey_for(&quiet),
            survey_for(&expressive),
            "communication style must not reshape a check-in"
        );
    }

    #[test]
    fn exclusions_are_honored_end_to_end() {
        let engine = SurveyEngine::new();
        let excluded_id = engine.catalog()[0].id;
        let store = InMemoryExclusionStore::new(vec![ExclusionRecord {
            family_id: "f1".into(),
            child_id: None,
            question_id: excluded_id,
            recorded_at: Utc::now(),
        }]);

        let survey = engine
            .initial_survey(&profile(), &store, None, INITIAL_SURVEY_LEN)
            .unwrap();
        assert!(survey.iter().all(|q| q.id != excluded_id));
    }

    #[test]
    fn zero_target_is_rejected() {
        let engine = SurveyEngine::new();
        let result = engine.initial_survey(&profile(), &empty_store(), None, 0);
        assert_eq!(result.unwrap_err(), EngineError::InvalidTarget);
    }

    #[test]
    fn priorities_raise_the_chosen_categorys_weights() {
        let mut engine = SurveyEngine::new();
        let before: f64 = engine
            .catalog()
            .iter()
            .filter(|q| q.category == Category::VisibleHousehold)
            .map(|q| q.total_weight)
            .sum();

        engine.apply_priorities(&crate::types::Priorities {
            highest: Some(Category::VisibleHousehold),
            ..Default::default()
        });

        let after: f64 = engine
            .catalog()
            .iter()
            .filter(|q| q.category == Category::VisibleHousehold)
            .map(|q| q.total_weight)
            .sum();
        assert!((after / before - 1.5).abs() < 1e-9, "highest priority is a 1.5x factor");
    }

    #[test]
    fn feedback_changes_the_engines_catalog() {
        let mut engine = SurveyEngine::new();
        let target_id = engine.catalog()[0].id;
        let before = engine.catalog()[0].total_weight;

        let feedback = AttributeFeedback {
            emotional_labor: Some(EmotionalLabor::Extreme),
            base_time: Some(5),
            ..Default::default()
        };
        let updated = engine.customize_weights(target_id, &feedback, None);

        assert!(updated >= 1);
        let after = engine
            .catalog()
            .iter()
            .find(|q| q.id == target_id)
            .unwrap()
            .total_weight;
        assert!(after > before, "heavier attributes must raise the weight");
    }
}
