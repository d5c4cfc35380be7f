//! Scheduling: area assignment, round interleaving, time slots, delays.

use crate::models::{
    AreaDelay, CombatMatch, Competition, CompetitionError, CompetitionState, GroupId,
    ScheduleSlot, ScheduleStats, SlotKind, TournamentConfig,
};
use chrono::{Duration, NaiveDateTime};
use std::collections::{HashMap, HashSet};

/// Rest between the scoring rounds of a match, in seconds.
const INTER_ROUND_BREAK_SECS: i64 = 30;
/// Changeover buffer folded into every match's footprint, in seconds.
const CHANGEOVER_SECS: i64 = 60;
/// Gap between consecutive matches on the same area, in seconds.
const MATCH_GAP_SECS: i64 = 60;

/// Output of scheduling: ordered slots, matches with their assignments,
/// and aggregate estimates.
#[derive(Clone, Debug)]
pub struct ScheduleOutcome {
    pub slots: Vec<ScheduleSlot>,
    pub matches: Vec<CombatMatch>,
    pub stats: ScheduleStats,
}

/// One pool's fixtures, regrouped from the flat match list.
struct PoolUnit {
    matches: Vec<CombatMatch>,
    participant_count: usize,
}

impl PoolUnit {
    /// Pools of exactly 3 fighters have only 3 fixtures and no disjoint
    /// pairs, so they get a dedicated interleaving path. Counted by
    /// distinct fighters, not fixtures, so a dedup-truncated pool is not
    /// misclassified.
    fn is_trio(&self) -> bool {
        self.participant_count == 3
    }
}

fn wall_clock_footprint_secs(config: &TournamentConfig) -> i64 {
    3 * i64::from(config.round_duration_secs) + 2 * INTER_ROUND_BREAK_SECS + CHANGEOVER_SECS
}

/// Assign matches to areas and time slots.
///
/// Pools are spread across areas by load; within an area, rounds are
/// interleaved breadth-first across pools so no fighter appears in two
/// consecutive slots; 3-person pools are interleaved among themselves and
/// merged in alternating with the standard stream; a break slot is inserted
/// after every `break_frequency` matches. All areas start at the configured
/// start time. Areas that end up with no pools are simply skipped.
pub fn schedule_matches(
    matches: Vec<CombatMatch>,
    config: &TournamentConfig,
) -> Result<ScheduleOutcome, CompetitionError> {
    config.validate()?;

    let units = regroup_into_pool_units(matches);
    let areas = assign_units_to_areas(units, config.num_areas as usize);

    let match_duration = Duration::seconds(wall_clock_footprint_secs(config));
    let gap = Duration::seconds(MATCH_GAP_SECS);
    let break_duration = Duration::seconds(i64::from(config.break_duration_secs));

    let mut slots = Vec::new();
    let mut scheduled = Vec::new();
    let mut per_area_counts: Vec<(usize, usize)> = Vec::new();

    for (area_idx, area_units) in areas.into_iter().enumerate() {
        if area_units.is_empty() {
            continue;
        }
        let area_number = area_idx as u32 + 1;
        let ordered = order_area_matches(area_units);

        let mut t = config.start_time;
        let mut match_number = 1u32;
        let mut since_break = 0u32;
        let mut breaks = 0usize;
        let total = ordered.len();

        for (idx, mut m) in ordered.into_iter().enumerate() {
            m.area_number = Some(area_number);
            m.match_number = Some(match_number);
            m.start_time = Some(t);
            let end = t + match_duration;
            slots.push(ScheduleSlot {
                area_number,
                start_time: t,
                end_time: end,
                kind: SlotKind::Match {
                    match_id: m.id,
                    match_number,
                },
            });
            t = end + gap;
            match_number += 1;
            since_break += 1;

            if config.break_frequency > 0
                && since_break == config.break_frequency
                && idx + 1 < total
            {
                slots.push(ScheduleSlot {
                    area_number,
                    start_time: t,
                    end_time: t + break_duration,
                    kind: SlotKind::Break,
                });
                t = t + break_duration;
                breaks += 1;
                since_break = 0;
            }
            scheduled.push(m);
        }
        per_area_counts.push((match_number as usize - 1, breaks));
    }

    slots.sort_by(|a, b| (a.area_number, a.start_time).cmp(&(b.area_number, b.start_time)));

    let stats = compute_stats(&scheduled, &per_area_counts, config);
    Ok(ScheduleOutcome {
        slots,
        matches: scheduled,
        stats,
    })
}

/// Regroup the flat match list by (group, pool), preserving first-seen
/// order, and count each pool's distinct fighters.
fn regroup_into_pool_units(matches: Vec<CombatMatch>) -> Vec<PoolUnit> {
    let mut order: Vec<(GroupId, usize)> = Vec::new();
    let mut by_pool: HashMap<(GroupId, usize), Vec<CombatMatch>> = HashMap::new();
    for m in matches {
        let key = (m.group_id, m.pool_index);
        if !by_pool.contains_key(&key) {
            order.push(key);
        }
        by_pool.entry(key).or_default().push(m);
    }

    order
        .into_iter()
        .map(|key| {
            let matches = by_pool.remove(&key).unwrap_or_default();
            let mut fighters = HashSet::new();
            for m in &matches {
                fighters.insert(m.fighter_a);
                fighters.insert(m.fighter_b);
            }
            PoolUnit {
                matches,
                participant_count: fighters.len(),
            }
        })
        .collect()
}

/// Distribute pool units over areas. Standard pools go first, largest
/// match count first, each onto the least loaded area. Trio pools follow
/// in a separate pass that minimizes the trio count per area, so the
/// awkward pools are spread out instead of piling up on one surface.
fn assign_units_to_areas(units: Vec<PoolUnit>, num_areas: usize) -> Vec<Vec<PoolUnit>> {
    let mut areas: Vec<Vec<PoolUnit>> = (0..num_areas.max(1)).map(|_| Vec::new()).collect();
    let mut loads = vec![0usize; areas.len()];
    let mut trio_counts = vec![0usize; areas.len()];

    let (trios, mut standard): (Vec<PoolUnit>, Vec<PoolUnit>) =
        units.into_iter().partition(|u| u.is_trio());

    standard.sort_by(|a, b| b.matches.len().cmp(&a.matches.len()));
    for unit in standard {
        let target = least_loaded(&loads, |i| loads[i]);
        loads[target] += unit.matches.len();
        areas[target].push(unit);
    }
    for unit in trios {
        let target = least_loaded(&trio_counts, |i| (trio_counts[i], loads[i]));
        trio_counts[target] += 1;
        loads[target] += unit.matches.len();
        areas[target].push(unit);
    }
    areas
}

/// Index minimizing the given key, lowest index on ties.
fn least_loaded<K: Ord>(slots: &[usize], key: impl Fn(usize) -> K) -> usize {
    (0..slots.len())
        .min_by_key(|&i| (key(i), i))
        .unwrap_or(0)
}

/// Order one area's matches: breadth-first round interleaving for standard
/// pools, fixture interleaving for trio pools, then an alternating merge of
/// the two streams.
fn order_area_matches(units: Vec<PoolUnit>) -> Vec<CombatMatch> {
    let mut standard_rounds: Vec<Vec<Vec<CombatMatch>>> = Vec::new();
    let mut trio_fixtures: Vec<Vec<CombatMatch>> = Vec::new();
    for unit in units {
        if unit.is_trio() {
            trio_fixtures.push(unit.matches);
        } else {
            standard_rounds.push(partition_rounds(unit.matches));
        }
    }

    // Round 0 of every pool, then round 1 of every pool, and so on.
    let mut standard_stream = Vec::new();
    let max_rounds = standard_rounds.iter().map(|r| r.len()).max().unwrap_or(0);
    for round in 0..max_rounds {
        for pool_rounds in &mut standard_rounds {
            if round < pool_rounds.len() {
                standard_stream.append(&mut pool_rounds[round]);
            }
        }
    }

    // Trio pools have no rounds; interleave fixture-by-fixture instead.
    let mut trio_stream = Vec::new();
    let max_fixtures = trio_fixtures.iter().map(|f| f.len()).max().unwrap_or(0);
    for i in 0..max_fixtures {
        for fixtures in &mut trio_fixtures {
            if i < fixtures.len() {
                trio_stream.push(fixtures[i].clone());
            }
        }
    }

    merge_alternating(standard_stream, trio_stream)
}

/// Partition a pool's fixtures into scheduling rounds: maximal sets of
/// matches touching disjoint fighters, built greedily in fixture order.
/// A fixture that fits no round on its own becomes a singleton round, so
/// this always terminates.
fn partition_rounds(matches: Vec<CombatMatch>) -> Vec<Vec<CombatMatch>> {
    let mut rounds = Vec::new();
    let mut remaining = matches;
    while !remaining.is_empty() {
        let mut round = Vec::new();
        let mut busy = HashSet::new();
        let mut rest = Vec::new();
        for m in remaining {
            if !busy.contains(&m.fighter_a) && !busy.contains(&m.fighter_b) {
                busy.insert(m.fighter_a);
                busy.insert(m.fighter_b);
                round.push(m);
            } else {
                rest.push(m);
            }
        }
        if round.is_empty() && !rest.is_empty() {
            round.push(rest.remove(0));
        }
        remaining = rest;
        rounds.push(round);
    }
    rounds
}

/// Merge two match streams by alternating one from each, appending
/// whichever runs longer.
fn merge_alternating(a: Vec<CombatMatch>, b: Vec<CombatMatch>) -> Vec<CombatMatch> {
    let mut merged = Vec::with_capacity(a.len() + b.len());
    let mut a = a.into_iter();
    let mut b = b.into_iter();
    loop {
        match (a.next(), b.next()) {
            (Some(x), Some(y)) => {
                merged.push(x);
                merged.push(y);
            }
            (Some(x), None) => {
                merged.push(x);
                merged.extend(a);
                break;
            }
            (None, Some(y)) => {
                merged.push(y);
                merged.extend(b);
                break;
            }
            (None, None) => break,
        }
    }
    merged
}

/// Aggregate estimates: the busiest area drives the duration estimate
/// (matches x average match minutes + breaks x break minutes).
fn compute_stats(
    scheduled: &[CombatMatch],
    per_area_counts: &[(usize, usize)],
    config: &TournamentConfig,
) -> ScheduleStats {
    let (busiest_area_matches, busiest_area_breaks) = per_area_counts
        .iter()
        .max_by_key(|(m, _)| *m)
        .copied()
        .unwrap_or((0, 0));
    let total_secs = busiest_area_matches as i64 * wall_clock_footprint_secs(config)
        + busiest_area_breaks as i64 * i64::from(config.break_duration_secs);
    let total_duration_minutes = total_secs / 60;
    let estimated_end_time = if scheduled.is_empty() {
        None
    } else {
        Some(config.start_time + Duration::minutes(total_duration_minutes))
    };
    ScheduleStats {
        total_matches: scheduled.len(),
        busiest_area_matches,
        busiest_area_breaks,
        total_duration_minutes,
        estimated_end_time,
    }
}

/// Per-area delay estimates, recomputed from scratch on every call.
///
/// Idempotent and side-effect free: reads only match-completion state, so
/// it is safe to re-invoke whenever new results arrive. `now` is an
/// explicit "current virtual time" input; the caller decides what clock to
/// use.
pub fn area_delays(
    matches: &[CombatMatch],
    slots: &[ScheduleSlot],
    now: NaiveDateTime,
) -> Vec<AreaDelay> {
    let mut area_numbers: Vec<u32> = slots.iter().map(|s| s.area_number).collect();
    area_numbers.sort_unstable();
    area_numbers.dedup();

    let scheduled_end: HashMap<_, _> = slots
        .iter()
        .filter_map(|s| match s.kind {
            SlotKind::Match { match_id, .. } => Some((match_id, s.end_time)),
            SlotKind::Break => None,
        })
        .collect();

    area_numbers
        .into_iter()
        .map(|area_number| {
            let area_slots: Vec<&ScheduleSlot> = slots
                .iter()
                .filter(|s| s.area_number == area_number)
                .collect();

            // Most recently completed match on this area, by actual end time.
            let last_completed = matches
                .iter()
                .filter(|m| m.area_number == Some(area_number))
                .filter_map(|m| m.completed_at.map(|at| (m.id, at)))
                .max_by_key(|(_, at)| *at);

            let delay_minutes = match last_completed {
                Some((match_id, actual_end)) => scheduled_end
                    .get(&match_id)
                    .map(|planned| (actual_end - *planned).num_minutes())
                    .unwrap_or(0),
                None => {
                    // Nothing finished yet: elapsed time past the area's
                    // scheduled start is the best available estimate.
                    let start = area_slots.first().map(|s| s.start_time);
                    start
                        .map(|s| (now - s).num_minutes().max(0))
                        .unwrap_or(0)
                }
            };

            let estimated_end_time = area_slots
                .last()
                .map(|s| s.end_time + Duration::minutes(delay_minutes));

            AreaDelay {
                area_number,
                delay_minutes,
                estimated_end_time,
            }
        })
        .collect()
}

/// Compute the schedule on the aggregate (MatchesDrawn -> Scheduled).
///
/// Compute-if-absent: when a schedule already exists this is a no-op, so
/// callers can invoke it on every read path without churning assignments.
pub fn build_schedule(competition: &mut Competition) -> Result<(), CompetitionError> {
    if competition.state == CompetitionState::Scheduled && !competition.schedule.is_empty() {
        return Ok(());
    }
    if competition.state != CompetitionState::MatchesDrawn {
        return Err(CompetitionError::InvalidState);
    }

    // Schedule from a copy so a failed attempt (bad config) leaves the
    // generated matches and the MatchesDrawn state untouched.
    let outcome = schedule_matches(competition.matches.clone(), &competition.config)?;
    log::debug!(
        "Scheduled {} match(es) across {} slot(s)",
        outcome.matches.len(),
        outcome.slots.len()
    );
    competition.matches = outcome.matches;
    competition.schedule = outcome.slots;
    competition.schedule_stats = Some(outcome.stats);
    competition.state = CompetitionState::Scheduled;
    Ok(())
}
