//! Integration tests for pool building: remainder rules and affiliation balancing.

use std::collections::HashSet;
use tkd_tournament_web::{build_pools, Participant, MIN_POOL_SIZE};

fn participants(n: usize) -> Vec<Participant> {
    (0..n)
        .map(|i| Participant::new(format!("Nom{i}"), format!("Prenom{i}"), "m", 20, 70.0, "Ligue A"))
        .collect()
}

fn participants_with_affiliations(affiliations: &[&str]) -> Vec<Participant> {
    affiliations
        .iter()
        .enumerate()
        .map(|(i, a)| Participant::new(format!("Nom{i}"), format!("Prenom{i}"), "m", 20, 70.0, *a))
        .collect()
}

fn pool_sizes(pools: &[tkd_tournament_web::Pool]) -> Vec<usize> {
    pools.iter().map(|p| p.len()).collect()
}

#[test]
fn fewer_than_three_participants_creates_no_pool() {
    let ps = participants(2);
    let out = build_pools(&ps, 4);
    assert!(out.pools.is_empty());
    assert_eq!(out.unused.len(), 2);
}

#[test]
fn exact_multiple_creates_full_pools() {
    let ps = participants(8);
    let out = build_pools(&ps, 4);
    assert_eq!(pool_sizes(&out.pools), vec![4, 4]);
    assert!(out.unused.is_empty());
}

#[test]
fn remainder_of_three_becomes_its_own_pool() {
    // 7 participants, pool size 4 -> one pool of 4 plus one pool of 3,
    // nobody dropped.
    let ps = participants(7);
    let out = build_pools(&ps, 4);
    assert_eq!(pool_sizes(&out.pools), vec![4, 3]);
    assert!(out.unused.is_empty());
}

#[test]
fn small_remainder_replans_into_pools_of_three() {
    // 9 = 2x4 + 1: a lone leftover is not allowed, so re-plan as 3 pools of 3.
    let ps = participants(9);
    let out = build_pools(&ps, 4);
    assert_eq!(pool_sizes(&out.pools), vec![3, 3, 3]);
    assert!(out.unused.is_empty());
}

#[test]
fn small_remainder_leftovers_are_dealt_round_robin() {
    // 13 = 3x4 + 1 -> 4 pools of 3 with the leftover dealt onto the first.
    let ps = participants(13);
    let out = build_pools(&ps, 4);
    assert_eq!(pool_sizes(&out.pools), vec![4, 3, 3, 3]);
    assert!(out.unused.is_empty());
}

#[test]
fn category_smaller_than_target_forms_a_single_pool() {
    let ps = participants(3);
    let out = build_pools(&ps, 4);
    assert_eq!(pool_sizes(&out.pools), vec![3]);
}

#[test]
fn no_pool_is_ever_undersized_and_no_one_is_duplicated() {
    for n in 3..40 {
        let ps = participants(n);
        let out = build_pools(&ps, 4);
        let mut seen = HashSet::new();
        for pool in &out.pools {
            assert!(pool.len() >= MIN_POOL_SIZE, "undersized pool for n={n}");
            for id in &pool.members {
                assert!(seen.insert(*id), "duplicate id in pools for n={n}");
            }
        }
        assert_eq!(seen.len() + out.unused.len(), n);
    }
}

#[test]
fn affiliation_balancing_mixes_clubs_across_pools() {
    let ps = participants_with_affiliations(&["X", "X", "X", "Y", "Y", "Y"]);
    let out = build_pools(&ps, 3);
    assert_eq!(pool_sizes(&out.pools), vec![3, 3]);
    for pool in &out.pools {
        let affiliations: HashSet<&str> = pool
            .members
            .iter()
            .map(|id| {
                ps.iter()
                    .find(|p| p.id == *id)
                    .map(|p| p.affiliation.as_str())
                    .unwrap()
            })
            .collect();
        assert_eq!(affiliations.len(), 2, "pool is single-affiliation");
    }
}

#[test]
fn dominant_affiliation_still_terminates_with_full_pools() {
    // Best-effort heuristic: one club dominating the category cannot avoid
    // same-club pairings, but everyone is still placed.
    let ps = participants_with_affiliations(&["X", "X", "X", "X", "X", "X", "X", "Y"]);
    let out = build_pools(&ps, 4);
    assert_eq!(pool_sizes(&out.pools), vec![4, 4]);
    assert!(out.unused.is_empty());
}
