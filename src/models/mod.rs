//! Data structures for the taekwondo tournament: participants, categories,
//! matches, schedule, configuration and the competition aggregate.

mod category;
mod combat;
mod competition;
mod config;
mod participant;
mod schedule;

pub use category::{
    AgeCategory, CategoryKey, Group, GroupId, Pool, WeightCategory, MIN_POOL_SIZE, UNBOUNDED_WEIGHT,
};
pub use combat::{CombatMatch, MatchId, MatchStatus, Position, RoundScore};
pub use competition::{
    Competition, CompetitionError, CompetitionId, CompetitionState, UnusedParticipant, UnusedReason,
};
pub use config::{RawWeightCategory, TournamentConfig, WeightCategories};
pub use participant::{Gender, Participant, ParticipantId};
pub use schedule::{AreaDelay, ScheduleSlot, ScheduleStats, SlotKind};
