//! Integration tests for scheduling: areas, interleaving, slots, delays.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use std::collections::{HashMap, HashSet};
use tkd_tournament_web::{
    area_delays, generate_pool_matches, schedule_matches, AgeCategory, CombatMatch, MatchStatus,
    Pool, SlotKind, TournamentConfig, WeightCategories, WeightCategory,
};
use uuid::Uuid;

fn start_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 3, 1).unwrap().and_hms_opt(9, 0, 0).unwrap()
}

fn test_config(num_areas: u32) -> TournamentConfig {
    TournamentConfig {
        age_categories: vec![AgeCategory { name: "senior".into(), min_age: 18, max_age: 99 }],
        weight_categories: WeightCategories {
            male: vec![WeightCategory { name: "-80kg".into(), max_weight: 80.0 }],
            female: vec![WeightCategory { name: "-67kg".into(), max_weight: 67.0 }],
        },
        num_areas,
        round_duration_secs: 120,
        break_duration_secs: 600,
        break_frequency: 10,
        start_time: start_time(),
        ..TournamentConfig::default()
    }
}

/// Fixtures for `n` fresh fighters in one pool.
fn pool_matches(n: usize, pool_index: usize) -> Vec<CombatMatch> {
    let pool = Pool::new((0..n).map(|_| Uuid::new_v4()).collect());
    let mut seen = HashSet::new();
    generate_pool_matches(Uuid::new_v4(), pool_index, &pool, &mut seen).matches
}

fn area_match_order(matches: &[CombatMatch], area: u32) -> Vec<&CombatMatch> {
    let mut on_area: Vec<&CombatMatch> = matches
        .iter()
        .filter(|m| m.area_number == Some(area))
        .collect();
    on_area.sort_by_key(|m| m.match_number);
    on_area
}

#[test]
fn slots_never_overlap_and_starts_strictly_increase() {
    let mut matches = pool_matches(5, 0);
    matches.extend(pool_matches(4, 0));
    matches.extend(pool_matches(3, 0));
    let out = schedule_matches(matches, &test_config(2)).unwrap();

    let mut by_area: HashMap<u32, Vec<_>> = HashMap::new();
    for slot in &out.slots {
        by_area.entry(slot.area_number).or_default().push(slot);
    }
    for slots in by_area.values() {
        for pair in slots.windows(2) {
            assert!(pair[0].end_time <= pair[1].start_time, "overlapping slots");
            assert!(pair[0].start_time < pair[1].start_time);
        }
    }
}

#[test]
fn round_interleaving_avoids_back_to_back_fighters() {
    // Two pools of 4 on a single area: breadth-first round interleaving
    // means no fighter ever appears in two consecutive slots.
    let mut matches = pool_matches(4, 0);
    matches.extend(pool_matches(4, 0));
    let out = schedule_matches(matches, &test_config(1)).unwrap();

    let ordered = area_match_order(&out.matches, 1);
    assert_eq!(ordered.len(), 12);
    for pair in ordered.windows(2) {
        let (m1, m2) = (pair[0], pair[1]);
        assert!(
            !m2.involves(m1.fighter_a) && !m2.involves(m1.fighter_b),
            "fighter scheduled in consecutive slots"
        );
    }
}

#[test]
fn standard_pools_balance_load_across_areas() {
    // Four pools of 4 (6 matches each) over two areas: 12 matches per area.
    let mut matches = Vec::new();
    for _ in 0..4 {
        matches.extend(pool_matches(4, 0));
    }
    let out = schedule_matches(matches, &test_config(2)).unwrap();
    assert_eq!(area_match_order(&out.matches, 1).len(), 12);
    assert_eq!(area_match_order(&out.matches, 2).len(), 12);
}

#[test]
fn trio_pools_are_spread_out_not_piled_up() {
    let mut matches = Vec::new();
    for _ in 0..4 {
        matches.extend(pool_matches(3, 0));
    }
    let out = schedule_matches(matches, &test_config(2)).unwrap();
    // Two trio pools per area, 3 fixtures each.
    assert_eq!(area_match_order(&out.matches, 1).len(), 6);
    assert_eq!(area_match_order(&out.matches, 2).len(), 6);
}

#[test]
fn trio_and_standard_streams_merge_alternating() {
    let standard = pool_matches(4, 0);
    let standard_group = standard[0].group_id;
    let mut matches = standard;
    matches.extend(pool_matches(3, 0));
    let out = schedule_matches(matches, &test_config(1)).unwrap();

    let ordered = area_match_order(&out.matches, 1);
    assert_eq!(ordered.len(), 9);
    // One from each stream while both last: s t s t s t, then the rest.
    let from_standard: Vec<bool> = ordered.iter().map(|m| m.group_id == standard_group).collect();
    assert_eq!(
        from_standard,
        vec![true, false, true, false, true, false, true, true, true]
    );
}

#[test]
fn breaks_are_inserted_periodically_but_not_after_the_last_match() {
    let mut config = test_config(1);
    config.break_frequency = 3;
    let mut matches = pool_matches(4, 0);
    matches.extend(pool_matches(4, 0));
    let out = schedule_matches(matches, &config).unwrap();

    let breaks: Vec<_> = out.slots.iter().filter(|s| s.is_break()).collect();
    // 12 matches, break after every 3rd, none trailing: 3 breaks.
    assert_eq!(breaks.len(), 3);
    for b in breaks {
        assert_eq!(b.end_time - b.start_time, Duration::seconds(600));
    }
}

#[test]
fn match_numbers_are_unique_per_area_and_slots_match_assignments() {
    let mut matches = pool_matches(4, 0);
    matches.extend(pool_matches(5, 0));
    let out = schedule_matches(matches, &test_config(2)).unwrap();

    for area in [1u32, 2] {
        let ordered = area_match_order(&out.matches, area);
        let numbers: Vec<u32> = ordered.iter().map(|m| m.match_number.unwrap()).collect();
        let expected: Vec<u32> = (1..=ordered.len() as u32).collect();
        assert_eq!(numbers, expected);
    }
    for slot in &out.slots {
        if let SlotKind::Match { match_id, .. } = slot.kind {
            let m = out.matches.iter().find(|m| m.id == match_id).unwrap();
            assert_eq!(m.start_time, Some(slot.start_time));
            assert_eq!(m.area_number, Some(slot.area_number));
        }
    }
}

#[test]
fn stats_estimate_follows_the_busiest_area() {
    let matches = pool_matches(4, 0);
    let out = schedule_matches(matches, &test_config(1)).unwrap();

    // 6 matches x (3x120s + 2x30s + 60s) = 6 x 8 min, no breaks at freq 10.
    assert_eq!(out.stats.total_matches, 6);
    assert_eq!(out.stats.busiest_area_matches, 6);
    assert_eq!(out.stats.busiest_area_breaks, 0);
    assert_eq!(out.stats.total_duration_minutes, 48);
    assert_eq!(
        out.stats.estimated_end_time,
        Some(start_time() + Duration::minutes(48))
    );
}

#[test]
fn delay_before_any_completion_tracks_elapsed_time_from_start() {
    let matches = pool_matches(4, 0);
    let out = schedule_matches(matches, &test_config(1)).unwrap();

    let now = start_time() + Duration::minutes(30);
    let delays = area_delays(&out.matches, &out.slots, now);
    assert_eq!(delays.len(), 1);
    assert_eq!(delays[0].area_number, 1);
    assert_eq!(delays[0].delay_minutes, 30);

    // Before the scheduled start there is no delay.
    let early = area_delays(&out.matches, &out.slots, start_time() - Duration::minutes(10));
    assert_eq!(early[0].delay_minutes, 0);
}

#[test]
fn delay_follows_the_most_recently_completed_match() {
    let matches = pool_matches(4, 0);
    let out = schedule_matches(matches, &test_config(1)).unwrap();

    let first_slot = out
        .slots
        .iter()
        .find(|s| !s.is_break())
        .expect("at least one match slot");
    let SlotKind::Match { match_id, .. } = first_slot.kind else {
        unreachable!()
    };
    let mut matches = out.matches.clone();
    let m = matches.iter_mut().find(|m| m.id == match_id).unwrap();
    m.status = MatchStatus::Completed;
    m.completed_at = Some(first_slot.end_time + Duration::minutes(10));

    let now = start_time() + Duration::minutes(60);
    let delays = area_delays(&matches, &out.slots, now);
    assert_eq!(delays[0].delay_minutes, 10);
    let last_end = out.slots.last().unwrap().end_time;
    assert_eq!(
        delays[0].estimated_end_time,
        Some(last_end + Duration::minutes(10))
    );
}
