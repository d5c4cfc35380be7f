//! Match, rounds, positions and the match lifecycle.

use crate::models::category::GroupId;
use crate::models::competition::CompetitionError;
use crate::models::participant::ParticipantId;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a match.
pub type MatchId = Uuid;

/// Which side of the match a fighter occupies (and which side won).
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Position {
    A,
    B,
}

/// Match lifecycle. Transitions are `pending → in_progress → completed`;
/// enforcement of single-writer semantics per match is the caller's job.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

/// One scoring period (up to 3 per match). A drawn round keeps `winner`
/// unset until an explicit tie-break selection arrives; the engine never
/// breaks ties on its own.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RoundScore {
    pub score_a: u32,
    pub score_b: u32,
    pub winner: Option<Position>,
}

impl RoundScore {
    /// The round's winner: the explicit selection if present, otherwise
    /// derived from an unequal score. `None` means the round is undecided.
    pub fn decisive_winner(&self) -> Option<Position> {
        if self.winner.is_some() {
            return self.winner;
        }
        if self.score_a > self.score_b {
            Some(Position::A)
        } else if self.score_b > self.score_a {
            Some(Position::B)
        } else {
            None
        }
    }
}

/// A single fixture between two fighters of the same pool.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CombatMatch {
    pub id: MatchId,
    pub group_id: GroupId,
    pub pool_index: usize,
    pub fighter_a: ParticipantId,
    pub fighter_b: ParticipantId,
    pub status: MatchStatus,
    /// Unique within the assigned area; set by the scheduler.
    pub match_number: Option<u32>,
    pub area_number: Option<u32>,
    pub start_time: Option<NaiveDateTime>,
    /// Always 3 slots while pending; truncated to 2 at finalization when the
    /// same side wins rounds 1 and 2.
    pub rounds: Vec<RoundScore>,
    pub winner: Option<Position>,
    /// Actual completion time, recorded at finalization (delay tracking).
    pub completed_at: Option<NaiveDateTime>,
}

impl CombatMatch {
    pub fn new(group_id: GroupId, pool_index: usize, fighter_a: ParticipantId, fighter_b: ParticipantId) -> Self {
        Self {
            id: Uuid::new_v4(),
            group_id,
            pool_index,
            fighter_a,
            fighter_b,
            status: MatchStatus::Pending,
            match_number: None,
            area_number: None,
            start_time: None,
            rounds: vec![RoundScore::default(); 3],
            winner: None,
            completed_at: None,
        }
    }

    pub fn involves(&self, id: ParticipantId) -> bool {
        self.fighter_a == id || self.fighter_b == id
    }

    pub fn fighter(&self, position: Position) -> ParticipantId {
        match position {
            Position::A => self.fighter_a,
            Position::B => self.fighter_b,
        }
    }

    /// Transition `pending → in_progress`.
    pub fn start(&mut self) -> Result<(), CompetitionError> {
        if self.status != MatchStatus::Pending {
            return Err(CompetitionError::InvalidMatchStatus {
                match_id: self.id,
                status: self.status,
            });
        }
        self.status = MatchStatus::InProgress;
        Ok(())
    }

    /// Record one round's scores and optional explicit winner (the tie-break
    /// selection for drawn rounds). Valid while the match is not completed.
    pub fn record_round_score(
        &mut self,
        round_index: usize,
        score_a: u32,
        score_b: u32,
        winner: Option<Position>,
    ) -> Result<(), CompetitionError> {
        if self.status == MatchStatus::Completed {
            return Err(CompetitionError::InvalidMatchStatus {
                match_id: self.id,
                status: self.status,
            });
        }
        if round_index >= 3 {
            return Err(CompetitionError::InvalidRoundIndex(round_index));
        }
        self.rounds[round_index] = RoundScore {
            score_a,
            score_b,
            winner,
        };
        Ok(())
    }

    /// Transition `in_progress → completed`.
    ///
    /// Rounds 1 and 2 must both be decided. If the same side won both, the
    /// match ends 2-0 and round 3 is dropped (re-derived here rather than
    /// trusted from the caller). Otherwise round 3 must also be decided and
    /// settles the match 2-1. Round-win counts can never tie at
    /// finalization; the guard stays as a structural check.
    pub fn finalize(&mut self, completed_at: NaiveDateTime) -> Result<(), CompetitionError> {
        if self.status != MatchStatus::InProgress {
            return Err(CompetitionError::InvalidMatchStatus {
                match_id: self.id,
                status: self.status,
            });
        }
        let r1 = self.rounds[0]
            .decisive_winner()
            .ok_or(CompetitionError::UndecidedRound { match_id: self.id, round: 0 })?;
        let r2 = self.rounds[1]
            .decisive_winner()
            .ok_or(CompetitionError::UndecidedRound { match_id: self.id, round: 1 })?;

        let decided: Vec<Position> = if r1 == r2 {
            // Round 3 is not needed; drop it so a completed match carries
            // exactly the rounds that counted.
            self.rounds.truncate(2);
            vec![r1, r2]
        } else {
            let r3 = self.rounds[2]
                .decisive_winner()
                .ok_or(CompetitionError::UndecidedRound { match_id: self.id, round: 2 })?;
            vec![r1, r2, r3]
        };

        let wins_a = decided.iter().filter(|w| **w == Position::A).count();
        let wins_b = decided.len() - wins_a;
        if wins_a == wins_b {
            return Err(CompetitionError::TiedRoundWins(self.id));
        }
        for (round, winner) in self.rounds.iter_mut().zip(decided) {
            round.winner = Some(winner);
        }
        self.winner = Some(if wins_a > wins_b { Position::A } else { Position::B });
        self.completed_at = Some(completed_at);
        self.status = MatchStatus::Completed;
        Ok(())
    }
}
