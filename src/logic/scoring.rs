//! Live scoring: round score entry and match lifecycle on the aggregate.

use crate::models::{
    Competition, CompetitionError, CompetitionState, MatchId, Position,
};
use chrono::NaiveDateTime;

/// Transition a match to in_progress (Scheduled competitions only).
pub fn start_match(competition: &mut Competition, match_id: MatchId) -> Result<(), CompetitionError> {
    if competition.state != CompetitionState::Scheduled {
        return Err(CompetitionError::InvalidState);
    }
    competition
        .get_match_mut(match_id)
        .ok_or(CompetitionError::MatchNotFound(match_id))?
        .start()
}

/// Record one round's scores for a match. `winner` is the explicit
/// tie-break selection for drawn rounds; decisive scores need none.
pub fn record_round_score(
    competition: &mut Competition,
    match_id: MatchId,
    round_index: usize,
    score_a: u32,
    score_b: u32,
    winner: Option<Position>,
) -> Result<(), CompetitionError> {
    if competition.state != CompetitionState::Scheduled {
        return Err(CompetitionError::InvalidState);
    }
    competition
        .get_match_mut(match_id)
        .ok_or(CompetitionError::MatchNotFound(match_id))?
        .record_round_score(round_index, score_a, score_b, winner)
}

/// Finalize a match at the given completion time. Rejected while any
/// counted round is undecided; the caller must resolve ties first.
pub fn finalize_match(
    competition: &mut Competition,
    match_id: MatchId,
    completed_at: NaiveDateTime,
) -> Result<(), CompetitionError> {
    if competition.state != CompetitionState::Scheduled {
        return Err(CompetitionError::InvalidState);
    }
    competition
        .get_match_mut(match_id)
        .ok_or(CompetitionError::MatchNotFound(match_id))?
        .finalize(completed_at)
}
