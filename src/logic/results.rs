//! Results: per-pool stat aggregation and rank resolution.

use crate::models::{CombatMatch, Competition, Group, MatchStatus, ParticipantId, Position};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;

/// Per-participant aggregate within one pool.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingEntry {
    pub participant_id: ParticipantId,
    /// Win count x 3.
    pub points: u32,
    pub rounds_won: u32,
    /// Sum of the participant's per-round scores.
    pub score_total: u32,
    /// 1-based position after sorting.
    pub rank: u32,
}

/// Resolved standings of one pool.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PoolResult {
    pub group_id: crate::models::GroupId,
    pub pool_index: usize,
    pub rankings: Vec<RankingEntry>,
}

/// Compute standings for every pool of every group.
///
/// Only completed matches with a winner contribute. The comparator is
/// layered: points, then rounds won, then total score, all descending; a
/// completed direct match between two otherwise-equal participants puts its
/// winner above its loser; remaining ties keep pool order (stable sort).
pub fn pool_results(groups: &[Group], matches: &[CombatMatch]) -> Vec<PoolResult> {
    let mut results = Vec::new();
    for group in groups {
        for (pool_index, pool) in group.pools.iter().enumerate() {
            let pool_matches: Vec<&CombatMatch> = matches
                .iter()
                .filter(|m| m.group_id == group.id && m.pool_index == pool_index)
                .collect();

            let mut entries: Vec<RankingEntry> = pool
                .members
                .iter()
                .map(|&id| RankingEntry {
                    participant_id: id,
                    ..RankingEntry::default()
                })
                .collect();
            // Direct results as (winner, loser) pairs for head-to-head lookup.
            let mut beat: HashSet<(ParticipantId, ParticipantId)> = HashSet::new();

            for m in &pool_matches {
                if m.status != MatchStatus::Completed {
                    continue;
                }
                let Some(winner) = m.winner else { continue };
                let winner_id = m.fighter(winner);
                let loser_id = match winner {
                    Position::A => m.fighter_b,
                    Position::B => m.fighter_a,
                };
                beat.insert((winner_id, loser_id));

                if let Some(e) = entries.iter_mut().find(|e| e.participant_id == winner_id) {
                    e.points += 3;
                }
                for round in &m.rounds {
                    if let Some(e) = entries.iter_mut().find(|e| e.participant_id == m.fighter_a) {
                        e.score_total += round.score_a;
                    }
                    if let Some(e) = entries.iter_mut().find(|e| e.participant_id == m.fighter_b) {
                        e.score_total += round.score_b;
                    }
                    if let Some(round_winner) = round.winner {
                        let id = m.fighter(round_winner);
                        if let Some(e) = entries.iter_mut().find(|e| e.participant_id == id) {
                            e.rounds_won += 1;
                        }
                    }
                }
            }

            entries.sort_by(|a, b| {
                b.points
                    .cmp(&a.points)
                    .then(b.rounds_won.cmp(&a.rounds_won))
                    .then(b.score_total.cmp(&a.score_total))
                    .then_with(|| {
                        if beat.contains(&(a.participant_id, b.participant_id)) {
                            Ordering::Less
                        } else if beat.contains(&(b.participant_id, a.participant_id)) {
                            Ordering::Greater
                        } else {
                            Ordering::Equal
                        }
                    })
            });
            for (idx, entry) in entries.iter_mut().enumerate() {
                entry.rank = idx as u32 + 1;
            }

            results.push(PoolResult {
                group_id: group.id,
                pool_index,
                rankings: entries,
            });
        }
    }
    results
}

/// Standings for the whole competition. Pool members missing from the
/// participant list are a data-integrity warning, not an error.
pub fn calculate_results(competition: &Competition) -> Vec<PoolResult> {
    let known: HashSet<ParticipantId> = competition.participants.iter().map(|p| p.id).collect();
    for group in &competition.groups {
        for id in &group.participants {
            if !known.contains(id) {
                log::warn!("Pool references unknown participant {}", id);
            }
        }
    }
    pool_results(&competition.groups, &competition.matches)
}
