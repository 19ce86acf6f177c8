//! Core types for the fairshare weighting and personalization engine.
//!
//! Everything here is plain data: the survey question record with its weight
//! attributes, the family profile used for personalization, the response and
//! exclusion records consumed from external stores, and the derived
//! per-category statistics the allocator works from.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The fixed task domains every question belongs to.
///
/// Declaration order here is also the display order of a finished survey:
/// selected questions are grouped by this order regardless of how they were
/// ranked during selection.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    VisibleHousehold,
    InvisibleHousehold,
    VisibleParental,
    InvisibleParental,
    RelationshipHealth,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::VisibleHousehold,
        Category::InvisibleHousehold,
        Category::VisibleParental,
        Category::InvisibleParental,
        Category::RelationshipHealth,
    ];

    /// Human-readable label, matching the labels external stores use.
    pub fn label(&self) -> &'static str {
        match self {
            Category::VisibleHousehold => "Visible Household Tasks",
            Category::InvisibleHousehold => "Invisible Household Tasks",
            Category::VisibleParental => "Visible Parental Tasks",
            Category::InvisibleParental => "Invisible Parental Tasks",
            Category::RelationshipHealth => "Relationship Health",
        }
    }

    /// Resolve a label coming from an external record. Unknown labels are
    /// the caller's cue to skip the record and keep going.
    pub fn parse_label(label: &str) -> Option<Category> {
        Category::ALL.iter().copied().find(|c| c.label() == label)
    }

    /// Position in declaration order, used for stable display sorting.
    pub fn ordinal(&self) -> usize {
        Category::ALL.iter().position(|c| c == self).unwrap_or(0)
    }
}

/// How often a task recurs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    /// Several times a week.
    Several,
    Weekly,
    Monthly,
    Quarterly,
}

/// How visible the work is to the rest of the household.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Invisibility {
    /// Highly visible - everyone sees it happen.
    Highly,
    Partially,
    Mostly,
    /// Completely invisible mental load.
    Completely,
}

/// Emotional energy the task demands.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EmotionalLabor {
    Minimal,
    Low,
    Moderate,
    High,
    Extreme,
}

/// How strongly workload research flags this task type.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ResearchImpact {
    Standard,
    Medium,
    High,
}

/// How much the task's distribution shapes what children learn.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChildDevelopment {
    Limited,
    Moderate,
    High,
}

/// How much imbalance in this task strains the couple's relationship.
/// Carried for analytics and ranking; not a factor in the weight product.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RelationshipImpact {
    Moderate,
    High,
    Extreme,
}

/// A survey question about a household or parenting task.
///
/// Attributes are optional: a question missing an attribute behaves as if it
/// had the neutral value (1.0 multiplier, base time 1). `total_weight` is
/// derived and recomputed whenever attributes change; it is never the source
/// of truth.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: u32,
    pub text: String,
    pub category: Category,
    /// Raw time demand, 1-5.
    pub base_time: Option<u8>,
    pub frequency: Option<Frequency>,
    pub invisibility: Option<Invisibility>,
    pub emotional_labor: Option<EmotionalLabor>,
    pub research_impact: Option<ResearchImpact>,
    pub child_development: Option<ChildDevelopment>,
    pub relationship_impact: Option<RelationshipImpact>,
    /// Derived weight, populated by the weight model.
    pub total_weight: f64,
    /// Meta-level question about how the category's responsibility is shared.
    pub is_balance_question: bool,
    /// Why this question is asked, for rendering.
    pub explanation: String,
    /// Plain-language account of why the question weighs what it does.
    pub weight_explanation: String,
}

/// The two symmetric parties a response can name.
///
/// Historical data uses "Mama"/"Papa"; newer records use "ParentA"/"ParentB".
/// Any other value is not a party answer and is ignored by statistics.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Parent {
    A,
    B,
}

impl Parent {
    pub fn parse(label: &str) -> Option<Parent> {
        match label {
            "Mama" | "ParentA" => Some(Parent::A),
            "Papa" | "ParentB" => Some(Parent::B),
            _ => None,
        }
    }
}

/// Composite key of one survey response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ResponseKey {
    /// Survey period: 0 is the initial survey, check-ins count up from 1.
    pub cycle: u32,
    pub member_id: String,
    pub question_id: u32,
}

impl ResponseKey {
    pub fn new(cycle: u32, member_id: impl Into<String>, question_id: u32) -> Self {
        Self {
            cycle,
            member_id: member_id.into(),
            question_id,
        }
    }
}

/// Raw response store contents: composite key to the answer label as given.
pub type ResponseMap = HashMap<ResponseKey, String>;

/// Extract a question id from a legacy flat response key such as
/// `week-1-user-123-q45`. Bare `q45` keys also resolve.
pub fn parse_legacy_key(key: &str) -> Option<u32> {
    let tail = match key.rfind("-q") {
        Some(idx) => &key[idx + 2..],
        None => key.strip_prefix('q')?,
    };
    tail.parse().ok()
}

/// Role of a family member.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum MemberRole {
    Parent {
        /// Which parent slot this member fills, e.g. "Mama" or "Papa".
        role_type: String,
    },
    Child {
        age: Option<u8>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FamilyMember {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub role: MemberRole,
}

/// Ordered category priorities a family picked during onboarding, highest
/// first. Matching is by category, not by question.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Priorities {
    pub highest: Option<Category>,
    pub secondary: Option<Category>,
    pub tertiary: Option<Category>,
}

impl Priorities {
    pub fn is_empty(&self) -> bool {
        self.highest.is_none() && self.secondary.is_none() && self.tertiary.is_none()
    }
}

/// How the couple tends to communicate, from onboarding.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CommunicationStyle {
    Open,
    Reserved,
    Avoidant,
}

/// Everything the engine knows about a family. Absent fields simply mean
/// "no personalization" for the signals they would have fed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FamilyProfile {
    pub family_id: String,
    pub members: Vec<FamilyMember>,
    #[serde(default)]
    pub priorities: Priorities,
    pub communication_style: Option<CommunicationStyle>,
}

impl FamilyProfile {
    pub fn has_children(&self) -> bool {
        self.members
            .iter()
            .any(|m| matches!(m.role, MemberRole::Child { .. }))
    }

    /// True when the profile carries any signal the relevance scorer uses.
    pub fn personalizes(&self) -> bool {
        self.has_children() || self.communication_style.is_some() || !self.priorities.is_empty()
    }
}

/// A question marked inapplicable for a family, or for one child in it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExclusionRecord {
    pub family_id: String,
    /// `None` excludes the question family-wide.
    pub child_id: Option<String>,
    pub question_id: u32,
    pub recorded_at: DateTime<Utc>,
}

/// Derived workload-skew statistics for one category. Never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryImbalance {
    pub category: Category,
    pub parent_a: u64,
    pub parent_b: u64,
    pub total: u64,
    /// Absolute gap between the two parties' shares, in percentage points.
    pub imbalance_percent: f64,
    /// Party with the higher share; `None` when counts tie or no data.
    pub dominant: Option<Parent>,
}

impl CategoryImbalance {
    /// Categories under 20 points of skew count as balanced. They still get
    /// a small monitoring allocation to catch regression.
    pub fn is_balanced(&self) -> bool {
        self.imbalance_percent < 20.0
    }
}

/// One task-completion record from the cycle's task store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRecord {
    /// Category label as the store recorded it; unknown labels are skipped.
    pub category: String,
    pub completed: bool,
}

/// Completion-rate statistics for one category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryEffectiveness {
    pub category: Category,
    pub completed: u64,
    pub total: u64,
    /// `completed / total`, or 0 when there were no tasks.
    pub effectiveness: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_labels_round_trip() {
        for category in Category::ALL {
            assert_eq!(Category::parse_label(category.label()), Some(category));
        }
        assert_eq!(Category::parse_label("Chores"), None);
    }

    #[test]
    fn parent_parses_both_label_generations() {
        assert_eq!(Parent::parse("Mama"), Some(Parent::A));
        assert_eq!(Parent::parse("Papa"), Some(Parent::B));
        assert_eq!(Parent::parse("ParentA"), Some(Parent::A));
        assert_eq!(Parent::parse("ParentB"), Some(Parent::B));
        assert_eq!(Parent::parse("Both"), None);
        assert_eq!(Parent::parse(""), None);
    }

    #[test]
    fn legacy_keys_resolve_to_question_ids() {
        assert_eq!(parse_legacy_key("week-1-user-123-q45"), Some(45));
        assert_eq!(parse_legacy_key("q7"), Some(7));
        assert_eq!(parse_legacy_key("week-2-q3"), Some(3));
        assert_eq!(parse_legacy_key("not-a-key"), None);
        assert_eq!(parse_legacy_key(""), None);
    }

    #[test]
    fn profile_personalization_signals() {
        let mut profile = FamilyProfile::default();
        assert!(!profile.personalizes());

        profile.communication_style = Some(CommunicationStyle::Reserved);
        assert!(profile.personalizes());

        let mut with_child = FamilyProfile::default();
        with_child.members.push(FamilyMember {
            id: "c1".into(),
            name: "Sam".into(),
            role: MemberRole::Child { age: Some(8) },
        });
        assert!(with_child.has_children());
        assert!(with_child.personalizes());
    }

    #[test]
    fn question_serializes_with_lowercase_attributes() {
        let question = Question {
            id: 1,
            text: "Who plans meals for the week?".into(),
            category: Category::InvisibleHousehold,
            base_time: Some(4),
            frequency: Some(Frequency::Daily),
            invisibility: Some(Invisibility::Completely),
            emotional_labor: Some(EmotionalLabor::High),
            research_impact: Some(ResearchImpact::High),
            child_development: Some(ChildDevelopment::Moderate),
            relationship_impact: Some(RelationshipImpact::High),
            total_weight: 0.0,
            is_balance_question: false,
            explanation: String::new(),
            weight_explanation: String::new(),
        };
        let json = serde_json::to_string(&question).unwrap();
        assert!(json.contains("\"frequency\":\"daily\""));
        assert!(json.contains("\"invisibility\":\"completely\""));
    }
}
