//! Schedule slots, aggregate schedule stats and per-area delay estimates.

use crate::models::combat::MatchId;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// What a slot holds: a match or a scheduled break.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SlotKind {
    Match { match_id: MatchId, match_number: u32 },
    Break,
}

/// One entry of an area's timeline. Slots of the same area never overlap
/// and are strictly increasing in start time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScheduleSlot {
    pub area_number: u32,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    #[serde(flatten)]
    pub kind: SlotKind,
}

impl ScheduleSlot {
    pub fn is_break(&self) -> bool {
        matches!(self.kind, SlotKind::Break)
    }
}

/// Aggregate schedule estimates for the whole competition.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheduleStats {
    pub total_matches: usize,
    /// Matches on the busiest area (drives the duration estimate).
    pub busiest_area_matches: usize,
    pub busiest_area_breaks: usize,
    pub total_duration_minutes: i64,
    pub estimated_end_time: Option<NaiveDateTime>,
}

/// Running delay estimate for one area, derived from completed matches
/// versus their scheduled end times.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AreaDelay {
    pub area_number: u32,
    /// Positive when the area runs late, negative when ahead.
    pub delay_minutes: i64,
    /// Scheduled end of the area's last slot, shifted by the current delay.
    pub estimated_end_time: Option<NaiveDateTime>,
}
