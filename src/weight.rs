//! Weight model: maps a question's categorical attributes to a scalar weight.
//!
//! The weight is a straight product of fixed multiplier tables over base
//! time. Missing attributes contribute the neutral multiplier 1.0 and a
//! missing base time counts as 1, so the result is always strictly positive
//! and the function never fails.
//!
//! Weight customization from user feedback also lives here: editing one
//! question's attributes propagates to every same-category question the
//! `SimilarityPolicy` considers similar, and every touched question gets its
//! `total_weight` recomputed.

use crate::types::{
    Category, ChildDevelopment, EmotionalLabor, Frequency, Invisibility, Priorities, Question,
    RelationshipImpact, ResearchImpact,
};
use std::collections::HashSet;

fn frequency_multiplier(frequency: Frequency) -> f64 {
    match frequency {
        Frequency::Daily => 1.5,
        Frequency::Several => 1.3,
        Frequency::Weekly => 1.2,
        Frequency::Monthly => 1.0,
        Frequency::Quarterly => 0.8,
    }
}

fn invisibility_multiplier(invisibility: Invisibility) -> f64 {
    match invisibility {
        Invisibility::Highly => 1.0,
        Invisibility::Partially => 1.2,
        Invisibility::Mostly => 1.35,
        Invisibility::Completely => 1.5,
    }
}

fn emotional_labor_multiplier(labor: EmotionalLabor) -> f64 {
    match labor {
        EmotionalLabor::Minimal => 1.0,
        EmotionalLabor::Low => 1.1,
        EmotionalLabor::Moderate => 1.2,
        EmotionalLabor::High => 1.3,
        EmotionalLabor::Extreme => 1.4,
    }
}

fn research_impact_multiplier(impact: ResearchImpact) -> f64 {
    match impact {
        ResearchImpact::Standard => 1.0,
        ResearchImpact::Medium => 1.15,
        ResearchImpact::High => 1.3,
    }
}

fn child_development_multiplier(development: ChildDevelopment) -> f64 {
    match development {
        ChildDevelopment::Limited => 1.0,
        ChildDevelopment::Moderate => 1.15,
        ChildDevelopment::High => 1.25,
    }
}

fn priority_multiplier(category: Category, priorities: Option<&Priorities>) -> f64 {
    let Some(priorities) = priorities else {
        return 1.0;
    };
    if priorities.highest == Some(category) {
        1.5
    } else if priorities.secondary == Some(category) {
        1.3
    } else if priorities.tertiary == Some(category) {
        1.1
    } else {
        1.0
    }
}

/// Compute a question's total weight.
///
/// `weight = base_time × frequency × invisibility × emotional_labor ×
/// research_impact × child_development × priority`. Deterministic, no side
/// effects, never fails.
pub fn compute_weight(question: &Question, priorities: Option<&Priorities>) -> f64 {
    let base_time = question.base_time.unwrap_or(1).clamp(1, 5) as f64;

    base_time
        * question.frequency.map_or(1.0, frequency_multiplier)
        * question.invisibility.map_or(1.0, invisibility_multiplier)
        * question.emotional_labor.map_or(1.0, emotional_labor_multiplier)
        * question.research_impact.map_or(1.0, research_impact_multiplier)
        * question
            .child_development
            .map_or(1.0, child_development_multiplier)
        * priority_multiplier(question.category, priorities)
}

/// Recompute and store `total_weight` for every question in the catalog.
pub fn recompute_weights(catalog: &mut [Question], priorities: Option<&Priorities>) {
    for question in catalog.iter_mut() {
        question.total_weight = compute_weight(question, priorities);
    }
}

/// Decides whether an attribute edit on one question should also apply to
/// another. Swappable so a stricter definition (shared tags, say) can replace
/// the keyword heuristic without touching weighting or allocation.
pub trait SimilarityPolicy {
    fn similar(&self, edited: &Question, candidate: &Question) -> bool;
}

/// Words too generic to signal that two questions describe the same task.
const STOPWORDS: &[&str] = &[
    "who", "what", "when", "where", "which", "the", "your", "their", "this", "that", "these",
    "those", "does", "with", "from", "about", "family", "household", "home", "each", "other",
    "takes", "handles", "manages", "usually", "regularly", "responsible", "responsibility",
];

fn keywords(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.len() > 4)
        .filter(|w| !STOPWORDS.contains(w))
        .map(str::to_string)
        .collect()
}

/// Default similarity: same category plus at least one shared content word
/// longer than four characters.
#[derive(Debug, Default)]
pub struct KeywordOverlap;

impl SimilarityPolicy for KeywordOverlap {
    fn similar(&self, edited: &Question, candidate: &Question) -> bool {
        if edited.category != candidate.category || edited.id == candidate.id {
            return false;
        }
        let edited_words = keywords(&edited.text);
        let candidate_words = keywords(&candidate.text);
        edited_words.intersection(&candidate_words).next().is_some()
    }
}

/// Attribute overrides from user feedback. `None` fields are left alone.
#[derive(Debug, Clone, Default)]
pub struct AttributeFeedback {
    pub base_time: Option<u8>,
    pub frequency: Option<Frequency>,
    pub invisibility: Option<Invisibility>,
    pub emotional_labor: Option<EmotionalLabor>,
    pub research_impact: Option<ResearchImpact>,
    pub child_development: Option<ChildDevelopment>,
    pub relationship_impact: Option<RelationshipImpact>,
}

impl AttributeFeedback {
    fn apply_to(&self, question: &mut Question) {
        if let Some(base_time) = self.base_time {
            question.base_time = Some(base_time.clamp(1, 5));
        }
        if let Some(frequency) = self.frequency {
            question.frequency = Some(frequency);
        }
        if let Some(invisibility) = self.invisibility {
            question.invisibility = Some(invisibility);
        }
        if let Some(labor) = self.emotional_labor {
            question.emotional_labor = Some(labor);
        }
        if let Some(impact) = self.research_impact {
            question.research_impact = Some(impact);
        }
        if let Some(development) = self.child_development {
            question.child_development = Some(development);
        }
        if let Some(impact) = self.relationship_impact {
            question.relationship_impact = Some(impact);
        }
    }
}

/// Apply an attribute edit to the named question and propagate it to similar
/// questions in the same category. Returns how many questions were updated;
/// 0 when the id is unknown.
pub fn apply_feedback(
    catalog: &mut [Question],
    question_id: u32,
    feedback: &AttributeFeedback,
    policy: &dyn SimilarityPolicy,
    priorities: Option<&Priorities>,
) -> usize {
    let Some(edited) = catalog.iter().find(|q| q.id == question_id).cloned() else {
        return 0;
    };

    let mut updated = 0;
    for question in catalog.iter_mut() {
        if question.id == question_id || policy.similar(&edited, question) {
            feedback.apply_to(question);
            question.total_weight = compute_weight(question, priorities);
            updated += 1;
        }
    }
    updated
}
