//! Categorization: assign each participant to a (gender, age, weight) bucket.

use crate::models::{
    AgeCategory, CategoryKey, CompetitionError, Participant, TournamentConfig, UnusedParticipant,
    UnusedReason, WeightCategory,
};
use std::collections::HashMap;

/// Output of categorization: one bucket per division, plus the participants
/// that could not be placed anywhere (a statistic, not an error).
#[derive(Clone, Debug, Default)]
pub struct CategorizeOutcome {
    pub buckets: HashMap<CategoryKey, Vec<Participant>>,
    pub unused: Vec<UnusedParticipant>,
}

/// Assign every participant to exactly one category bucket.
///
/// Pure over its inputs. Participants with an unresolvable gender, age or
/// weight are reported in `unused` and excluded from all buckets. Only
/// structural problems (no participants, missing category config) error.
pub fn categorize(
    participants: &[Participant],
    config: &TournamentConfig,
) -> Result<CategorizeOutcome, CompetitionError> {
    config.validate()?;
    if participants.is_empty() {
        return Err(CompetitionError::NoParticipants);
    }

    let mut outcome = CategorizeOutcome::default();
    for participant in participants {
        let Some(gender) = participant.resolved_gender() else {
            outcome.unused.push(UnusedParticipant {
                id: participant.id,
                reason: UnusedReason::UnresolvedGender,
            });
            continue;
        };
        let Some(age_category) = resolve_age_category(participant, &config.age_categories) else {
            outcome.unused.push(UnusedParticipant {
                id: participant.id,
                reason: UnusedReason::NoAgeCategory,
            });
            continue;
        };
        let weight_categories = config.weight_categories.for_gender(gender);
        let Some(weight_category) = resolve_weight_category(participant.weight, weight_categories)
        else {
            outcome.unused.push(UnusedParticipant {
                id: participant.id,
                reason: UnusedReason::NoWeightCategory,
            });
            continue;
        };

        let key = CategoryKey {
            gender,
            age_category: age_category.name.clone(),
            weight_category: weight_category.name.clone(),
        };
        outcome.buckets.entry(key).or_default().push(participant.clone());
    }

    Ok(outcome)
}

/// Age category resolution. An explicit category tag (e.g. `"female-junior"`)
/// wins over recomputing from the raw age; the remainder after the gender
/// prefix is matched whole against configured names, so hyphens inside a
/// category name cannot split it. Without a usable tag, the first range
/// containing the age wins (ranges are configured non-overlapping).
fn resolve_age_category<'a>(
    participant: &Participant,
    age_categories: &'a [AgeCategory],
) -> Option<&'a AgeCategory> {
    if let Some(tag) = participant.category_tag.as_deref() {
        let label = tag
            .trim()
            .to_lowercase();
        let label = label
            .strip_prefix("female-")
            .or_else(|| label.strip_prefix("male-"))
            .unwrap_or(&label);
        if let Some(cat) = age_categories
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(label))
        {
            return Some(cat);
        }
    }
    age_categories.iter().find(|c| c.contains(participant.age))
}

/// First weight category (ascending by max) whose max admits the weight.
/// The "+" category carries an unbounded max, so it always matches last.
fn resolve_weight_category(weight: f64, categories: &[WeightCategory]) -> Option<&WeightCategory> {
    let mut ordered: Vec<&WeightCategory> = categories.iter().collect();
    ordered.sort_by(|a, b| {
        a.max_weight
            .partial_cmp(&b.max_weight)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    ordered.into_iter().find(|c| c.max_weight >= weight)
}
