//! Tournament pipeline: categorization, pools, fixtures, schedule, results.

mod categorize;
mod matches;
mod pools;
mod results;
mod schedule;
mod scoring;

pub use categorize::{categorize, CategorizeOutcome};
pub use matches::{fixture_key, generate_matches, generate_pool_matches, FixtureKey, MatchGenOutcome};
pub use pools::{build_groups, build_pools, PoolBuildOutcome};
pub use results::{calculate_results, pool_results, PoolResult, RankingEntry};
pub use schedule::{area_delays, build_schedule, schedule_matches, ScheduleOutcome};
pub use scoring::{finalize_match, record_round_score, start_match};
