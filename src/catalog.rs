//! The fixed question catalog.
//!
//! Generated once per process: each task category carries 25 main questions
//! plus 5 meta-level balance questions, and the relationship category a
//! smaller dedicated set. Every question starts from its category's base
//! attribute profile and is then refined by keyword analysis of its text, so
//! "Who plans meals for the week?" ends up heavier than "Who dusts surfaces
//! around the house?" without hand-tuning each entry.

use crate::types::{
    Category, ChildDevelopment, EmotionalLabor, Frequency, Invisibility, Question,
    RelationshipImpact, ResearchImpact,
};
use crate::weight;

const VISIBLE_HOUSEHOLD: [&str; 25] = [
    "Who is responsible for cleaning floors in your home?",
    "Who usually washes the dishes after meals?",
    "Who typically cooks meals for the family?",
    "Who does the laundry in your household?",
    "Who does the grocery shopping?",
    "Who takes out the trash regularly?",
    "Who handles yard work like mowing and gardening?",
    "Who cleans the bathrooms?",
    "Who dusts surfaces around the house?",
    "Who makes the beds each day?",
    "Who irons clothes when needed?",
    "Who changes bed linens regularly?",
    "Who feeds the pets?",
    "Who walks the dog?",
    "Who handles small home repairs?",
    "Who washes the windows?",
    "Who sets the table for meals?",
    "Who shovels snow in winter?",
    "Who cleans the refrigerator?",
    "Who sets up new technology devices (TVs, computers, smart home devices) in your home?",
    "Who handles troubleshooting when household technology or appliances malfunction?",
    "Who installs software updates on family computers and devices?",
    "Who manages the home's internet network (router setup, addressing connectivity issues)?",
    "Who organizes and maintains digital equipment and accessories (cables, chargers, etc.)?",
    "Who organizes closets and storage spaces?",
];

const INVISIBLE_HOUSEHOLD: [&str; 25] = [
    "Who plans meals for the week?",
    "Who schedules family appointments?",
    "Who manages the family calendar?",
    "Who remembers birthdays and special occasions?",
    "Who makes shopping lists?",
    "Who handles paying bills on time?",
    "Who coordinates childcare arrangements?",
    "Who plans family vacations and trips?",
    "Who oversees children's educational needs?",
    "Who keeps track of household supplies?",
    "Who provides emotional support during tough times?",
    "Who maintains social relationships and family connections?",
    "Who anticipates family needs like seasonal clothing?",
    "Who decides on home organization systems?",
    "Who researches products before purchasing?",
    "Who maintains important documents?",
    "Who plans for holidays and special events?",
    "Who tracks maintenance schedules for appliances?",
    "Who manages family health needs?",
    "Who guides family values and addresses behavioral issues?",
    "Who researches and makes decisions about technology purchases for the home?",
    "Who manages digital subscriptions and accounts (Netflix, Spotify, utilities, etc.)?",
    "Who keeps track of digital passwords and login information for household accounts?",
    "Who monitors and manages the family's digital security (updates, antivirus, backups)?",
    "Who researches solutions when family members have technology questions or problems?",
];

const VISIBLE_PARENTAL: [&str; 25] = [
    "Who drives kids to school and activities?",
    "Who helps with homework?",
    "Who attends parent-teacher conferences?",
    "Who prepares school lunches?",
    "Who coordinates extracurricular activities?",
    "Who attends children's performances and games?",
    "Who organizes playdates?",
    "Who supervises bath time?",
    "Who manages bedtime routines?",
    "Who shops for school supplies and clothing?",
    "Who schedules children's medical appointments?",
    "Who prepares children for school each morning?",
    "Who volunteers at school functions?",
    "Who communicates with teachers and school staff?",
    "Who plans and hosts birthday parties?",
    "Who monitors screen time?",
    "Who teaches life skills?",
    "Who disciplines and sets behavioral expectations?",
    "Who assists with college or career preparation?",
    "Who helps children with technology homework or school digital platforms?",
    "Who supervises children's screen time and enforces technology boundaries?",
    "Who teaches children how to use new apps, devices, or digital tools?",
    "Who participates in virtual parent-teacher conferences or online school communications?",
    "Who helps children navigate social media or their online presence?",
    "Who engages in recreational activities with kids?",
];

const INVISIBLE_PARENTAL: [&str; 25] = [
    "Who coordinates children's schedules to prevent conflicts?",
    "Who provides emotional labor for the family?",
    "Who anticipates developmental needs?",
    "Who networks with other parents?",
    "Who monitors academic progress?",
    "Who develops strategies for behavioral issues?",
    "Who watches for signs of illness or stress?",
    "Who plans for future educational expenses?",
    "Who maintains family traditions?",
    "Who handles cultural and moral education?",
    "Who mediates conflicts between siblings?",
    "Who customizes parenting approaches for each child?",
    "Who coordinates with teachers and coaches?",
    "Who stays informed on child safety best practices?",
    "Who keeps track of details like clothing sizes and allergies?",
    "Who manages their own emotions to provide stability?",
    "Who encourages children's personal interests?",
    "Who decides on appropriate screen time rules?",
    "Who helps children navigate social relationships?",
    "Who supports the co-parent emotionally and practically?",
    "Who anticipates children's emotional needs before they're explicitly expressed?",
    "Who researches strategies for supporting children through emotional challenges?",
    "Who notices subtle changes in children's emotional wellbeing and follows up?",
    "Who coordinates the 'emotional climate' of the family during stressful periods?",
    "Who keeps mental track of each child's emotional triggers and coping mechanisms?",
];

const VISIBLE_HOUSEHOLD_BALANCE: [&str; 5] = [
    "Who takes responsibility for ensuring household cleanliness overall?",
    "Who notices when visible household tasks need to be done?",
    "Who initiates conversations about sharing visible household work?",
    "Who feels more stressed when visible household tasks pile up?",
    "Who receives more recognition for completing visible household tasks?",
];

const INVISIBLE_HOUSEHOLD_BALANCE: [&str; 5] = [
    "Who takes responsibility for the overall household planning?",
    "Who notices when invisible household tasks need attention?",
    "Who initiates conversations about sharing mental load?",
    "Who feels more stressed about household organization?",
    "Who receives recognition for household management?",
];

const VISIBLE_PARENTAL_BALANCE: [&str; 5] = [
    "Who takes primary responsibility for children's day-to-day needs?",
    "Who notices when children need active parental involvement?",
    "Who initiates conversations about sharing childcare duties?",
    "Who feels more stressed about direct childcare responsibilities?",
    "Who receives more recognition for parenting efforts?",
];

const INVISIBLE_PARENTAL_BALANCE: [&str; 5] = [
    "Who takes responsibility for children's emotional wellbeing?",
    "Who notices subtle changes in children's needs or development?",
    "Who initiates conversations about parenting approaches?",
    "Who feels more stressed about children's future?",
    "Who carries more of the emotional labor of parenting?",
];

const RELATIONSHIP_HEALTH: [&str; 10] = [
    "Who initiates conversations about the state of your relationship?",
    "Who plans date nights or dedicated couple time?",
    "Who notices when the relationship needs attention?",
    "Who brings up difficult topics that need discussing?",
    "Who makes time for daily check-ins with their partner?",
    "Who works to repair things after a disagreement?",
    "Who expresses appreciation for their partner's efforts?",
    "Who keeps track of relationship milestones and anniversaries?",
    "Who adjusts their own schedule so you can spend time together?",
    "Who supports their partner's personal goals and interests?",
];

/// A category's starting attribute set before per-question refinement.
#[derive(Debug, Clone, Copy)]
struct AttributeProfile {
    base_time: u8,
    frequency: Frequency,
    invisibility: Invisibility,
    emotional_labor: EmotionalLabor,
    research_impact: ResearchImpact,
    child_development: ChildDevelopment,
    relationship_impact: RelationshipImpact,
}

fn category_profile(category: Category) -> AttributeProfile {
    match category {
        Category::VisibleHousehold => AttributeProfile {
            base_time: 2,
            frequency: Frequency::Weekly,
            invisibility: Invisibility::Highly,
            emotional_labor: EmotionalLabor::Minimal,
            research_impact: ResearchImpact::Medium,
            child_development: ChildDevelopment::High,
            relationship_impact: RelationshipImpact::Moderate,
        },
        Category::InvisibleHousehold => AttributeProfile {
            base_time: 4,
            frequency: Frequency::Daily,
            invisibility: Invisibility::Completely,
            emotional_labor: EmotionalLabor::High,
            research_impact: ResearchImpact::High,
            child_development: ChildDevelopment::Moderate,
            relationship_impact: RelationshipImpact::High,
        },
        Category::VisibleParental => AttributeProfile {
            base_time: 3,
            frequency: Frequency::Daily,
            invisibility: Invisibility::Partially,
            emotional_labor: EmotionalLabor::Moderate,
            research_impact: ResearchImpact::High,
            child_development: ChildDevelopment::High,
            relationship_impact: RelationshipImpact::Moderate,
        },
        Category::InvisibleParental => AttributeProfile {
            base_time: 5,
            frequency: Frequency::Daily,
            invisibility: Invisibility::Completely,
            emotional_labor: EmotionalLabor::Extreme,
            research_impact: ResearchImpact::High,
            child_development: ChildDevelopment::High,
            relationship_impact: RelationshipImpact::Extreme,
        },
        Category::RelationshipHealth => AttributeProfile {
            base_time: 3,
            frequency: Frequency::Weekly,
            invisibility: Invisibility::Mostly,
            emotional_labor: EmotionalLabor::High,
            research_impact: ResearchImpact::Medium,
            child_development: ChildDevelopment::Limited,
            relationship_impact: RelationshipImpact::Extreme,
        },
    }
}

/// Planning-style verbs whose accumulation marks a complex task.
const COMPLEXITY_VERBS: [&str; 10] = [
    "manage",
    "coordinate",
    "research",
    "plan",
    "organize",
    "prepare",
    "arrange",
    "monitor",
    "maintain",
    "develop",
];

/// Refine a category profile using keywords in the question text.
fn refine_attributes(text: &str, profile: AttributeProfile) -> AttributeProfile {
    let t = text.to_lowercase();
    let mut attrs = profile;

    if t.contains("meal") || t.contains("cook") {
        attrs.frequency = Frequency::Daily;
        attrs.child_development = ChildDevelopment::High;
    }
    if t.contains("emotional") || t.contains("support") || t.contains("needs") {
        attrs.emotional_labor = EmotionalLabor::Extreme;
        attrs.invisibility = Invisibility::Completely;
        attrs.relationship_impact = RelationshipImpact::Extreme;
    }
    if t.contains("plan") || t.contains("research") || t.contains("anticipate") {
        attrs.invisibility = Invisibility::Completely;
        attrs.emotional_labor = EmotionalLabor::High;
        attrs.relationship_impact = RelationshipImpact::High;
    }
    if t.contains("track") || t.contains("schedule") || t.contains("coordinate") {
        attrs.invisibility = Invisibility::Mostly;
        attrs.emotional_labor = EmotionalLabor::Moderate;
        attrs.relationship_impact = RelationshipImpact::High;
    }
    if t.contains("children") || t.contains("kids") || t.contains("family") {
        attrs.child_development = ChildDevelopment::High;
    }
    if t.contains("emotion") || t.contains("stress") || t.contains("feeling") {
        attrs.relationship_impact = RelationshipImpact::Extreme;
        attrs.emotional_labor = EmotionalLabor::Extreme;
        attrs.base_time = 5;
    }
    if t.contains("conflict") || t.contains("mediate") || t.contains("argument") {
        attrs.relationship_impact = RelationshipImpact::Extreme;
        attrs.emotional_labor = EmotionalLabor::Extreme;
        attrs.base_time = 5;
    }
    if t.contains("tradition") || t.contains("value") || t.contains("culture") {
        attrs.child_development = ChildDevelopment::High;
        attrs.relationship_impact = RelationshipImpact::High;
    }
    if t.contains("future") || t.contains("college") || t.contains("career") {
        attrs.base_time = 4;
        attrs.emotional_labor = EmotionalLabor::High;
    }
    if t.contains("notice") || t.contains("anticipate") || t.contains("track") {
        attrs.invisibility = Invisibility::Completely;
        attrs.relationship_impact = RelationshipImpact::High;
    }

    // Stacked planning verbs mark a more time-consuming task.
    let verb_count = t
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| COMPLEXITY_VERBS.contains(word))
        .count();
    if verb_count >= 2 {
        attrs.base_time = (attrs.base_time + 1).min(5);
    }

    attrs
}

/// Plain-language account of why a question weighs what it does.
fn weight_explanation(attrs: &AttributeProfile) -> String {
    let mut explanation = String::from("This task is ");

    if attrs.base_time >= 4 {
        explanation.push_str("extremely time-intensive ");
    } else if attrs.base_time >= 3 {
        explanation.push_str("moderately time-consuming ");
    } else {
        explanation.push_str("relatively quick ");
    }

    match attrs.frequency {
        Frequency::Daily => explanation.push_str("and needs to be done every day. "),
        Frequency::Several => explanation.push_str("and needs to be done several times a week. "),
        Frequency::Weekly => explanation.push_str("and needs to be done weekly. "),
        Frequency::Monthly | Frequency::Quarterly => {
            explanation.push_str("but doesn't need to be done as frequently. ")
        }
    }

    if matches!(
        attrs.invisibility,
        Invisibility::Mostly | Invisibility::Completely
    ) {
        explanation.push_str(
            "It's largely invisible work that often goes unnoticed but creates mental load. ",
        );
    }

    if matches!(
        attrs.emotional_labor,
        EmotionalLabor::High | EmotionalLabor::Extreme
    ) {
        explanation.push_str("This task requires significant emotional energy. ");
    }

    if attrs.child_development == ChildDevelopment::High {
        explanation.push_str(
            "How this task is distributed teaches children important lessons about gender roles. ",
        );
    }

    match attrs.relationship_impact {
        RelationshipImpact::Extreme => explanation
            .push_str("Imbalance in this task can significantly impact relationship satisfaction."),
        RelationshipImpact::High => explanation
            .push_str("This task often contributes to relationship tension when imbalanced."),
        RelationshipImpact::Moderate => {}
    }

    explanation
}

fn make_question(
    id: u32,
    text: &str,
    category: Category,
    attrs: AttributeProfile,
    is_balance_question: bool,
) -> Question {
    let explanation = if is_balance_question {
        format!(
            "This question helps us assess the meta-level balance of responsibility for {} in your family.",
            category.label().to_lowercase()
        )
    } else {
        format!(
            "This question helps us understand who is primarily handling {} in your family and allows us to track changes over time.",
            category.label().to_lowercase()
        )
    };

    let mut question = Question {
        id,
        text: text.to_string(),
        category,
        base_time: Some(attrs.base_time),
        frequency: Some(attrs.frequency),
        invisibility: Some(attrs.invisibility),
        emotional_labor: Some(attrs.emotional_labor),
        research_impact: Some(attrs.research_impact),
        child_development: Some(attrs.child_development),
        relationship_impact: Some(attrs.relationship_impact),
        total_weight: 0.0,
        is_balance_question,
        explanation,
        weight_explanation: weight_explanation(&attrs),
    };
    question.total_weight = weight::compute_weight(&question, None);
    question
}

fn main_texts(category: Category) -> &'static [&'static str] {
    match category {
        Category::VisibleHousehold => &VISIBLE_HOUSEHOLD,
        Category::InvisibleHousehold => &INVISIBLE_HOUSEHOLD,
        Category::VisibleParental => &VISIBLE_PARENTAL,
        Category::InvisibleParental => &INVISIBLE_PARENTAL,
        Category::RelationshipHealth => &RELATIONSHIP_HEALTH,
    }
}

fn balance_texts(category: Category) -> &'static [&'static str] {
    match category {
        Category::VisibleHousehold => &VISIBLE_HOUSEHOLD_BALANCE,
        Category::InvisibleHousehold => &INVISIBLE_HOUSEHOLD_BALANCE,
        Category::VisibleParental => &VISIBLE_PARENTAL_BALANCE,
        Category::InvisibleParental => &INVISIBLE_PARENTAL_BALANCE,
        Category::RelationshipHealth => &[],
    }
}

/// Build the full question catalog with sequential ids and derived weights.
pub fn build() -> Vec<Question> {
    let mut questions = Vec::new();
    let mut next_id = 1u32;

    for category in Category::ALL {
        let profile = category_profile(category);

        for text in main_texts(category) {
            let attrs = refine_attributes(text, profile);
            questions.push(make_question(next_id, text, category, attrs, false));
            next_id += 1;
        }

        for text in balance_texts(category) {
            // Balance questions probe shared responsibility, which is heavier
            // on both time and relationship strain than the category default.
            let attrs = AttributeProfile {
                base_time: 4,
                emotional_labor: EmotionalLabor::High,
                relationship_impact: RelationshipImpact::Extreme,
                ..profile
            };
            questions.push(make_question(next_id, text, category, attrs, true));
            next_id += 1;
        }
    }

    questions
}
