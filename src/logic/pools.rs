//! Pool building: split category buckets into balanced pools of >= 3.

use crate::logic::categorize::categorize;
use crate::models::{
    Competition, CompetitionError, CompetitionState, Gender, Group, Participant, ParticipantId,
    Pool, UnusedParticipant, UnusedReason, MIN_POOL_SIZE,
};
use std::collections::HashMap;

/// Safety cap on greedy selection steps per pool.
const MAX_ATTEMPTS: usize = 100;

/// Output of pool building for one category bucket.
#[derive(Clone, Debug, Default)]
pub struct PoolBuildOutcome {
    pub pools: Vec<Pool>,
    /// Members of the bucket that ended up in no pool.
    pub unused: Vec<ParticipantId>,
}

/// Split one category's participants into pools of roughly
/// `target_pool_size`, never creating a pool smaller than 3.
///
/// Remainder handling:
/// - remainder 0: full pools only.
/// - remainder >= 3: full pools plus one short pool of the remainder.
/// - remainder 1 or 2: re-plan as `n / 3` pools of 3 and deal the leftover
///   participants round-robin onto them, so no pool is undersized.
///
/// Within a pool, members are picked by a greedy affiliation-balancing
/// heuristic. Best effort only: when one affiliation dominates a category,
/// same-affiliation pairings remain possible.
pub fn build_pools(participants: &[Participant], target_pool_size: usize) -> PoolBuildOutcome {
    let n = participants.len();
    if n < MIN_POOL_SIZE {
        return PoolBuildOutcome {
            pools: Vec::new(),
            unused: participants.iter().map(|p| p.id).collect(),
        };
    }

    let sizes = plan_pool_sizes(n, target_pool_size.max(MIN_POOL_SIZE));
    let mut remaining: Vec<&Participant> = participants.iter().collect();
    let mut pools = Vec::with_capacity(sizes.len());
    for size in sizes {
        pools.push(fill_pool(&mut remaining, size));
    }

    PoolBuildOutcome {
        pools,
        unused: remaining.into_iter().map(|p| p.id).collect(),
    }
}

/// Decide pool sizes for `n` participants (n >= 3, target >= 3).
fn plan_pool_sizes(n: usize, target: usize) -> Vec<usize> {
    let full = n / target;
    let rem = n % target;

    if rem == 0 {
        return vec![target; full];
    }
    if rem >= MIN_POOL_SIZE {
        let mut sizes = vec![target; full];
        sizes.push(rem);
        return sizes;
    }
    // Remainder of 1 or 2.
    if full == 0 {
        return vec![n];
    }
    let pool_count = n / MIN_POOL_SIZE;
    let mut sizes = vec![MIN_POOL_SIZE; pool_count];
    let leftover = n - MIN_POOL_SIZE * pool_count;
    for i in 0..leftover {
        sizes[i % pool_count] += 1;
    }
    sizes
}

/// Greedily pick `size` members from `remaining` into a new pool, scoring
/// each candidate by affiliation: +10 when its affiliation is absent from
/// the pool, -5 per same-affiliation member already placed. Ties break by
/// input order. The attempt cap guarantees termination; any slots still
/// open past it are filled in input order.
fn fill_pool(remaining: &mut Vec<&Participant>, size: usize) -> Pool {
    let mut members: Vec<ParticipantId> = Vec::with_capacity(size);
    let mut affiliations: HashMap<String, i32> = HashMap::new();
    let mut attempts = 0;

    while members.len() < size && !remaining.is_empty() && attempts < MAX_ATTEMPTS {
        attempts += 1;
        let mut best_idx = 0;
        let mut best_score = i32::MIN;
        for (idx, candidate) in remaining.iter().enumerate() {
            let placed = affiliations.get(&candidate.affiliation).copied().unwrap_or(0);
            let score = if placed == 0 { 10 } else { -5 * placed };
            if score > best_score {
                best_score = score;
                best_idx = idx;
            }
        }
        let picked = remaining.remove(best_idx);
        *affiliations.entry(picked.affiliation.clone()).or_insert(0) += 1;
        members.push(picked.id);
    }
    while members.len() < size && !remaining.is_empty() {
        members.push(remaining.remove(0).id);
    }

    Pool::new(members)
}

/// Run categorization and pool building on the competition aggregate
/// (Registration -> GroupsBuilt). Categories with fewer than 3 members are
/// skipped entirely; their participants are reported unused.
pub fn build_groups(competition: &mut Competition) -> Result<(), CompetitionError> {
    if competition.state != CompetitionState::Registration {
        return Err(CompetitionError::InvalidState);
    }

    let outcome = categorize(&competition.participants, &competition.config)?;
    let mut unused = outcome.unused;

    // Deterministic group order regardless of map iteration.
    let mut buckets: Vec<_> = outcome.buckets.into_iter().collect();
    buckets.sort_by(|(a, _), (b, _)| {
        let rank = |g: Gender| match g {
            Gender::Male => 0u8,
            Gender::Female => 1u8,
        };
        (rank(a.gender), &a.age_category, &a.weight_category).cmp(&(
            rank(b.gender),
            &b.age_category,
            &b.weight_category,
        ))
    });

    let mut groups = Vec::new();
    for (key, members) in buckets {
        let built = build_pools(&members, competition.config.pool_size);
        unused.extend(built.unused.into_iter().map(|id| UnusedParticipant {
            id,
            reason: UnusedReason::UndersizedCategory,
        }));
        if built.pools.is_empty() {
            continue;
        }
        let placed: Vec<ParticipantId> = built
            .pools
            .iter()
            .flat_map(|p| p.members.iter().copied())
            .collect();
        groups.push(Group::new(key, placed, built.pools));
    }

    log::debug!(
        "Built {} group(s); {} participant(s) unused",
        groups.len(),
        unused.len()
    );
    competition.groups = groups;
    competition.unused_participants = unused;
    competition.state = CompetitionState::GroupsBuilt;
    Ok(())
}
