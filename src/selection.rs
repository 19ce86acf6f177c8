//! Question selection: rank candidates per category under an allocation and
//! draw a personalized, size-bounded survey.
//!
//! Ranking decides *which* questions are asked; the returned list is always
//! re-grouped by category declaration order with ascending ids, so the UI
//! order is stable no matter how the ranking shook out.
//!
//! Child surveys add a deterministic pseudo-shuffle before truncation:
//! different children see different subsets of the same ranked candidates,
//! but the same child always sees the same subset for a given week. The
//! generator is a documented splitmix64 stream seeded from an FNV-1a hash of
//! the child id, so output never depends on the runtime's string hashing or
//! on any external crate's version behavior.

use crate::types::{
    Category, ChildDevelopment, CommunicationStyle, FamilyProfile, Invisibility, Question,
};
use crate::weight;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::debug;

/// Deterministic random stream for the child shuffle. Injectable so tests
/// can assert exact permutations.
pub trait ShuffleRng {
    fn next_u64(&mut self) -> u64;
}

/// splitmix64: tiny, well-studied, and stable across platforms and releases.
#[derive(Debug, Clone)]
pub struct SplitMix64 {
    state: u64,
}

impl SplitMix64 {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }
}

impl ShuffleRng for SplitMix64 {
    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }
}

/// FNV-1a over the raw bytes: a stable identifier hash.
pub fn stable_hash(value: &str) -> u64 {
    let mut hash: u64 = 0xCBF2_9CE4_8422_2325;
    for byte in value.as_bytes() {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01B3);
    }
    hash
}

/// Shuffle seed for a child's survey in a given week.
pub fn child_seed(child_id: &str, week_number: u32) -> u64 {
    stable_hash(child_id).wrapping_add(u64::from(week_number).wrapping_mul(31))
}

/// Fisher-Yates driven by the injected stream.
fn shuffle<T>(items: &mut [T], rng: &mut dyn ShuffleRng) {
    for i in (1..items.len()).rev() {
        let j = (rng.next_u64() % (i as u64 + 1)) as usize;
        items.swap(i, j);
    }
}

/// Inputs for one selection run.
#[derive(Debug, Clone, Copy)]
pub struct SelectionRequest<'a> {
    pub allocation: &'a BTreeMap<Category, usize>,
    /// Question ids excluded for this scope (family-wide plus, for a child
    /// survey, that child's own exclusions).
    pub excluded: &'a HashSet<u32>,
    /// Family profile, consulted for priority-adjusted weights.
    pub profile: Option<&'a FamilyProfile>,
    /// Apply initial-survey relevance scoring on top of the weight ranking.
    /// Check-ins leave this off; their ranking is history-driven.
    pub personalize: bool,
    pub week_number: u32,
    /// Selecting for a named child applies the deterministic shuffle.
    pub child_id: Option<&'a str>,
    /// Total question count the caller wants; the per-category allocation
    /// normally sums to this, and any shortfall is filled across categories.
    pub target: usize,
}

/// Select questions using the default splitmix64 shuffle stream.
pub fn select_questions(catalog: &[Question], request: &SelectionRequest) -> Vec<Question> {
    select_with_rng(catalog, request, SplitMix64::new)
}

/// Select questions with a caller-supplied shuffle stream factory.
///
/// Never fails: a catalog smaller than the target simply yields a shorter
/// list.
pub fn select_with_rng<R, F>(
    catalog: &[Question],
    request: &SelectionRequest,
    make_rng: F,
) -> Vec<Question>
where
    R: ShuffleRng,
    F: Fn(u64) -> R,
{
    let priorities = request.profile.map(|p| &p.priorities);
    let personalize =
        request.personalize && request.profile.map_or(false, |p| p.personalizes());

    let mut selected_ids: HashSet<u32> = HashSet::new();
    let mut picked: Vec<Question> = Vec::new();

    for category in Category::ALL {
        let want = request.allocation.get(&category).copied().unwrap_or(0);
        if want == 0 {
            continue;
        }

        let mut candidates: Vec<&Question> = catalog
            .iter()
            .filter(|q| q.category == category)
            .filter(|q| !selected_ids.contains(&q.id))
            .filter(|q| !request.excluded.contains(&q.id))
            .collect();

        // Rank: relevance first when personalizing, weight as tiebreak;
        // otherwise pure weight. Id breaks remaining ties so ranking is
        // total and reproducible.
        let mut ranked: Vec<(i32, f64, &Question)> = candidates
            .drain(..)
            .map(|q| {
                let question_weight = weight::compute_weight(q, priorities);
                let relevance = if personalize {
                    relevance_score(q, request.profile.unwrap(), question_weight)
                } else {
                    0
                };
                (relevance, question_weight, q)
            })
            .collect();
        ranked.sort_by(|a, b| {
            b.0.cmp(&a.0)
                .then(b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal))
                .then(a.2.id.cmp(&b.2.id))
        });

        if let Some(child_id) = request.child_id {
            let mut rng = make_rng(child_seed(child_id, request.week_number));
            shuffle(&mut ranked, &mut rng);
        }

        for (_, question_weight, question) in ranked.into_iter().take(want) {
            selected_ids.insert(question.id);
            let mut question = question.clone();
            question.total_weight = question_weight;
            picked.push(question);
        }
    }

    // Sparse catalog: fill the remainder from the highest-weight unselected
    // questions regardless of category.
    if picked.len() < request.target {
        let mut leftovers: Vec<(f64, &Question)> = catalog
            .iter()
            .filter(|q| !selected_ids.contains(&q.id))
            .filter(|q| !request.excluded.contains(&q.id))
            .map(|q| (weight::compute_weight(q, priorities), q))
            .collect();
        leftovers.sort_by(|a, b| {
            b.0.partial_cmp(&a.0)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.1.id.cmp(&b.1.id))
        });

        let missing = request.target - picked.len();
        if !leftovers.is_empty() {
            debug!(missing, "filling selection shortfall across categories");
        }
        for (question_weight, question) in leftovers.into_iter().take(missing) {
            selected_ids.insert(question.id);
            let mut question = question.clone();
            question.total_weight = question_weight;
            picked.push(question);
        }
    }

    // Stable display order: category declaration order, then ascending id.
    picked.sort_by(|a, b| {
        a.category
            .ordinal()
            .cmp(&b.category.ordinal())
            .then(a.id.cmp(&b.id))
    });
    picked
}

/// Initial-survey relevance score layered on top of the weight ranking.
fn relevance_score(question: &Question, profile: &FamilyProfile, question_weight: f64) -> i32 {
    let mut score = 0;

    if profile.has_children() {
        if question.child_development == Some(ChildDevelopment::High) {
            score += 5;
        }
        let text = question.text.to_lowercase();
        if text.contains("child") || text.contains("kid") || text.contains("school") {
            score += 3;
        }
    }

    if matches!(
        profile.communication_style,
        Some(CommunicationStyle::Reserved) | Some(CommunicationStyle::Avoidant)
    ) && matches!(
        question.invisibility,
        Some(Invisibility::Mostly) | Some(Invisibility::Completely)
    ) {
        score += 6;
    }

    // Weight-tier bonus keeps the heaviest tasks near the front even when
    // other signals are quiet.
    if question_weight >= 12.0 {
        score += 10;
    } else if question_weight >= 9.0 {
        score += 8;
    } else if question_weight >= 6.0 {
        score += 5;
    }

    score
}

/// Caller-owned cache of computed selections, keyed by cycle and audience.
///
/// Selection is deterministic for fixed inputs, so cache hits are exact and
/// concurrent last-write-wins refills converge on the same value. Callers
/// invalidate when responses or exclusions change.
#[derive(Debug, Clone, Default)]
pub struct SelectionCache {
    entries: HashMap<String, Vec<Question>>,
}

impl SelectionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache key for a cycle's selection: `"{week}-{child_id}"`, with
    /// `"adult"` standing in when no child is named.
    pub fn key(week_number: u32, child_id: Option<&str>) -> String {
        format!("{}-{}", week_number, child_id.unwrap_or("adult"))
    }

    pub fn get(&self, key: &str) -> Option<&Vec<Question>> {
        self.entries.get(key)
    }

    pub fn insert(&mut self, key: String, questions: Vec<Question>) {
        self.entries.insert(key, questions);
    }

    /// Drop one entry, e.g. after new responses arrive for that audience.
    pub fn invalidate(&mut self, key: &str) {
        self.entries.remove(key);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
