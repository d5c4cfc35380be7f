//! Integration tests for categorization: gender/age/weight resolution.

use tkd_tournament_web::{
    categorize, AgeCategory, CompetitionError, Gender, Participant, TournamentConfig,
    UnusedReason, WeightCategories, WeightCategory, UNBOUNDED_WEIGHT,
};

fn test_config() -> TournamentConfig {
    TournamentConfig {
        age_categories: vec![
            AgeCategory { name: "cadet".into(), min_age: 12, max_age: 14 },
            AgeCategory { name: "junior".into(), min_age: 15, max_age: 17 },
            AgeCategory { name: "senior".into(), min_age: 18, max_age: 99 },
        ],
        weight_categories: WeightCategories {
            male: vec![
                WeightCategory { name: "-58kg".into(), max_weight: 58.0 },
                WeightCategory { name: "-68kg".into(), max_weight: 68.0 },
                WeightCategory { name: "-80kg".into(), max_weight: 80.0 },
                WeightCategory { name: "+80kg".into(), max_weight: UNBOUNDED_WEIGHT },
            ],
            female: vec![
                WeightCategory { name: "-49kg".into(), max_weight: 49.0 },
                WeightCategory { name: "-57kg".into(), max_weight: 57.0 },
                WeightCategory { name: "-67kg".into(), max_weight: 67.0 },
                WeightCategory { name: "+67kg".into(), max_weight: UNBOUNDED_WEIGHT },
            ],
        },
        ..TournamentConfig::default()
    }
}

fn participant(gender: &str, age: u32, weight: f64) -> Participant {
    Participant::new("Nom", format!("P{age}-{weight}"), gender, age, weight, "Ligue A")
}

#[test]
fn resolves_french_and_english_gender_spellings() {
    let config = test_config();
    let participants = vec![
        participant("Homme", 20, 70.0),
        participant("m", 20, 70.0),
        participant("masculin", 20, 70.0),
        participant("Femme", 20, 55.0),
        participant("f", 20, 55.0),
        participant("female", 20, 55.0),
    ];
    let outcome = categorize(&participants, &config).unwrap();
    assert!(outcome.unused.is_empty());

    let male_bucket = outcome
        .buckets
        .keys()
        .find(|k| k.gender == Gender::Male)
        .unwrap();
    let female_bucket = outcome
        .buckets
        .keys()
        .find(|k| k.gender == Gender::Female)
        .unwrap();
    assert_eq!(outcome.buckets[male_bucket].len(), 3);
    assert_eq!(outcome.buckets[female_bucket].len(), 3);
}

#[test]
fn unrecognized_gender_falls_back_to_category_tag_prefix() {
    let config = test_config();
    let mut p = participant("???", 16, 52.0);
    p.category_tag = Some("female-junior".into());
    let outcome = categorize(&[p], &config).unwrap();
    assert!(outcome.unused.is_empty());
    let key = outcome.buckets.keys().next().unwrap();
    assert_eq!(key.gender, Gender::Female);
    assert_eq!(key.age_category, "junior");
}

#[test]
fn unresolvable_gender_is_reported_unused() {
    let config = test_config();
    let p = participant("???", 16, 52.0);
    let id = p.id;
    let outcome = categorize(&[p], &config).unwrap();
    assert!(outcome.buckets.is_empty());
    assert_eq!(outcome.unused.len(), 1);
    assert_eq!(outcome.unused[0].id, id);
    assert_eq!(outcome.unused[0].reason, UnusedReason::UnresolvedGender);
}

#[test]
fn category_tag_wins_over_raw_age() {
    let config = test_config();
    // Age says junior, the precomputed tag says senior: the tag wins.
    let mut p = participant("m", 16, 70.0);
    p.category_tag = Some("male-senior".into());
    let outcome = categorize(&[p], &config).unwrap();
    let key = outcome.buckets.keys().next().unwrap();
    assert_eq!(key.age_category, "senior");
}

#[test]
fn unknown_tag_label_falls_back_to_age_range() {
    let config = test_config();
    let mut p = participant("m", 16, 70.0);
    p.category_tag = Some("male-veteran".into());
    let outcome = categorize(&[p], &config).unwrap();
    let key = outcome.buckets.keys().next().unwrap();
    assert_eq!(key.age_category, "junior");
}

#[test]
fn weight_resolves_to_tightest_category_and_plus_as_fallback() {
    let config = test_config();
    let participants = vec![
        participant("m", 20, 58.0),  // boundary: fits -58kg
        participant("m", 20, 58.5),  // next one up
        participant("m", 20, 95.0),  // over every bound: +80kg
    ];
    let outcome = categorize(&participants, &config).unwrap();
    let names: Vec<String> = outcome
        .buckets
        .keys()
        .map(|k| k.weight_category.clone())
        .collect();
    assert!(names.contains(&"-58kg".to_string()));
    assert!(names.contains(&"-68kg".to_string()));
    assert!(names.contains(&"+80kg".to_string()));
}

#[test]
fn every_resolvable_participant_lands_in_exactly_one_bucket() {
    let config = test_config();
    let participants: Vec<Participant> = (0..20u32)
        .map(|i| {
            participant(
                if i % 2 == 0 { "m" } else { "f" },
                13 + (i % 10),
                40.0 + f64::from(i) * 3.0,
            )
        })
        .collect();
    let outcome = categorize(&participants, &config).unwrap();

    let mut seen = std::collections::HashSet::new();
    let mut bucketed = 0;
    for members in outcome.buckets.values() {
        for p in members {
            assert!(seen.insert(p.id), "participant appears in two buckets");
            bucketed += 1;
        }
    }
    assert_eq!(bucketed + outcome.unused.len(), participants.len());
}

#[test]
fn age_outside_every_range_is_unused() {
    let config = test_config();
    let p = participant("m", 8, 30.0);
    let outcome = categorize(&[p], &config).unwrap();
    assert_eq!(outcome.unused.len(), 1);
    assert_eq!(outcome.unused[0].reason, UnusedReason::NoAgeCategory);
}

#[test]
fn missing_config_and_empty_input_are_structural_errors() {
    let empty_config = TournamentConfig::default();
    let p = participant("m", 20, 70.0);
    assert!(matches!(
        categorize(&[p], &empty_config),
        Err(CompetitionError::MissingConfig(_))
    ));
    assert!(matches!(
        categorize(&[], &test_config()),
        Err(CompetitionError::NoParticipants)
    ));
}
