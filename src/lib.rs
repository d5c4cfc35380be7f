//! Taekwondo tournament web app: library with models and pipeline logic.

pub mod logic;
pub mod models;

pub use logic::{
    area_delays, build_groups, build_pools, build_schedule, calculate_results, categorize,
    finalize_match, fixture_key, generate_matches, generate_pool_matches, pool_results, record_round_score,
    schedule_matches, start_match, CategorizeOutcome, FixtureKey, MatchGenOutcome,
    PoolBuildOutcome, PoolResult, RankingEntry, ScheduleOutcome,
};
pub use models::{
    AgeCategory, AreaDelay, CategoryKey, CombatMatch, Competition, CompetitionError, CompetitionId,
    CompetitionState, Gender, Group, GroupId, MatchId, MatchStatus, Participant, ParticipantId,
    Pool, Position, RawWeightCategory, RoundScore, ScheduleSlot, ScheduleStats, SlotKind,
    TournamentConfig, UnusedParticipant, UnusedReason, WeightCategories, WeightCategory,
    MIN_POOL_SIZE, UNBOUNDED_WEIGHT,
};
