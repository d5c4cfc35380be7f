//! Round-robin match generation per pool, with global fixture dedup.

use crate::models::{
    CombatMatch, Competition, CompetitionError, CompetitionState, GroupId, ParticipantId, Pool,
};
use std::collections::HashSet;

/// Unordered participant pair, canonicalized for dedup lookups.
pub type FixtureKey = (ParticipantId, ParticipantId);

pub fn fixture_key(a: ParticipantId, b: ParticipantId) -> FixtureKey {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Fixture order for a pool of 4: two disjoint pairs per scheduling round.
/// This exact order is what lets the scheduler interleave rounds cleanly.
const POOL_OF_4_FIXTURES: [(usize, usize); 6] = [(0, 1), (2, 3), (0, 2), (1, 3), (0, 3), (1, 2)];

/// Output of match generation.
#[derive(Clone, Debug, Default)]
pub struct MatchGenOutcome {
    pub matches: Vec<CombatMatch>,
    /// Fixtures silently dropped because the pair was already emitted.
    pub duplicates_dropped: u32,
}

/// Generate the complete round-robin fixture list for one pool.
///
/// Pure and deterministic. `seen` is the caller-owned set of already
/// emitted pairs; a pair present there (even from another pool) is dropped,
/// which guards against upstream re-invocation producing duplicate
/// fixtures.
pub fn generate_pool_matches(
    group_id: GroupId,
    pool_index: usize,
    pool: &Pool,
    seen: &mut HashSet<FixtureKey>,
) -> MatchGenOutcome {
    let members = &pool.members;
    let pairs: Vec<(usize, usize)> = if members.len() == 4 {
        POOL_OF_4_FIXTURES.to_vec()
    } else {
        let mut pairs = Vec::new();
        for i in 0..members.len() {
            for j in (i + 1)..members.len() {
                pairs.push((i, j));
            }
        }
        pairs
    };

    let mut outcome = MatchGenOutcome::default();
    for (i, j) in pairs {
        let (a, b) = (members[i], members[j]);
        if !seen.insert(fixture_key(a, b)) {
            outcome.duplicates_dropped += 1;
            continue;
        }
        outcome
            .matches
            .push(CombatMatch::new(group_id, pool_index, a, b));
    }
    outcome
}

/// Generate fixtures for every pool of every group
/// (GroupsBuilt -> MatchesDrawn). Each match starts pending with 3 empty
/// rounds and no winner.
pub fn generate_matches(competition: &mut Competition) -> Result<(), CompetitionError> {
    if competition.state != CompetitionState::GroupsBuilt {
        return Err(CompetitionError::InvalidState);
    }

    let mut seen: HashSet<FixtureKey> = HashSet::new();
    let mut matches = Vec::new();
    let mut duplicates_dropped = 0;
    for group in &competition.groups {
        for (pool_index, pool) in group.pools.iter().enumerate() {
            let outcome = generate_pool_matches(group.id, pool_index, pool, &mut seen);
            duplicates_dropped += outcome.duplicates_dropped;
            matches.extend(outcome.matches);
        }
    }

    if duplicates_dropped > 0 {
        log::warn!("Dropped {} duplicate fixture(s)", duplicates_dropped);
    }
    competition.matches = matches;
    competition.duplicate_fixtures_dropped = duplicates_dropped;
    competition.state = CompetitionState::MatchesDrawn;
    Ok(())
}
