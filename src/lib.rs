//! fairshare: weighting and personalization engine for household-workload
//! surveys.
//!
//! The crate turns a fixed question catalog plus a family's history into the
//! survey that family should answer next:
//!
//! - [`weight`] scores each question from its task attributes,
//! - [`imbalance`] and [`effectiveness`] read the family's response and
//!   task-completion history into per-category statistics,
//! - [`allocation`] splits the question budget across categories from those
//!   statistics,
//! - [`exclusion`] removes questions the family marked inapplicable, and
//! - [`selection`] ranks and draws the final, display-ordered question list.
//!
//! [`SurveyEngine`] wires the pipeline together; the individual modules stay
//! public for callers that only need one stage. The engine is deterministic
//! throughout: the same inputs always produce the same survey, including the
//! per-child question rotation.

pub mod allocation;
pub mod catalog;
pub mod effectiveness;
pub mod engine;
pub mod error;
pub mod exclusion;
pub mod imbalance;
pub mod selection;
pub mod types;
pub mod weight;

pub use engine::{SurveyEngine, CHECKIN_LEN, INITIAL_SURVEY_LEN};
pub use error::{EngineError, Result};
pub use exclusion::{ExclusionStore, InMemoryExclusionStore};
pub use selection::{SelectionCache, SelectionRequest};
pub use types::{
    Category, CategoryEffectiveness, CategoryImbalance, ExclusionRecord, FamilyMember,
    FamilyProfile, MemberRole, Parent, Priorities, Question, ResponseKey, ResponseMap, TaskRecord,
};
pub use weight::{AttributeFeedback, KeywordOverlap, SimilarityPolicy};
