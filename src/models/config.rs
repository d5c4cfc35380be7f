//! Tournament configuration, normalized at ingestion.

use crate::models::category::{AgeCategory, WeightCategory, UNBOUNDED_WEIGHT};
use crate::models::competition::CompetitionError;
use crate::models::participant::Gender;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Weight category as it may arrive from the outside: either a full object
/// or a shorthand string such as `"-58"` / `"+87"`. Normalized once on
/// ingestion; internal stages only ever see [`WeightCategory`].
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum RawWeightCategory {
    Shorthand(String),
    Full { name: String, max_weight: f64 },
}

impl RawWeightCategory {
    pub fn normalize(&self) -> Result<WeightCategory, CompetitionError> {
        match self {
            RawWeightCategory::Full { name, max_weight } => Ok(WeightCategory {
                name: name.clone(),
                max_weight: *max_weight,
            }),
            RawWeightCategory::Shorthand(s) => {
                let t = s.trim();
                if let Some(rest) = t.strip_prefix('+') {
                    // Open-ended category: always matches as fallback.
                    rest.trim_end_matches("kg").parse::<f64>().map_err(|_| {
                        CompetitionError::InvalidConfig(format!("bad weight category '{s}'"))
                    })?;
                    Ok(WeightCategory {
                        name: t.to_string(),
                        max_weight: UNBOUNDED_WEIGHT,
                    })
                } else {
                    let max = t
                        .trim_start_matches('-')
                        .trim_end_matches("kg")
                        .parse::<f64>()
                        .map_err(|_| {
                            CompetitionError::InvalidConfig(format!("bad weight category '{s}'"))
                        })?;
                    Ok(WeightCategory {
                        name: t.to_string(),
                        max_weight: max,
                    })
                }
            }
        }
    }
}

/// Weight category lists per gender.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WeightCategories {
    pub male: Vec<WeightCategory>,
    pub female: Vec<WeightCategory>,
}

impl WeightCategories {
    pub fn for_gender(&self, gender: Gender) -> &[WeightCategory] {
        match gender {
            Gender::Male => &self.male,
            Gender::Female => &self.female,
        }
    }
}

fn default_pool_size() -> usize {
    4
}

fn default_num_areas() -> u32 {
    2
}

fn default_round_duration() -> u32 {
    120
}

fn default_break_duration() -> u32 {
    600
}

fn default_break_frequency() -> u32 {
    10
}

fn default_start_time() -> NaiveDateTime {
    // Placeholder until the organizer sets the competition day.
    NaiveDate::from_ymd_opt(2000, 1, 1)
        .and_then(|d| d.and_hms_opt(9, 0, 0))
        .unwrap_or_default()
}

/// Canonical competition configuration. Weight categories are kept sorted
/// ascending by max weight so the first match during categorization is the
/// tightest one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TournamentConfig {
    pub age_categories: Vec<AgeCategory>,
    pub weight_categories: WeightCategories,
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,
    #[serde(default = "default_num_areas")]
    pub num_areas: u32,
    /// Duration of one scoring round, in seconds.
    #[serde(default = "default_round_duration")]
    pub round_duration_secs: u32,
    /// Duration of a scheduled break slot, in seconds.
    #[serde(default = "default_break_duration")]
    pub break_duration_secs: u32,
    /// A break is inserted after every this many matches on an area.
    #[serde(default = "default_break_frequency")]
    pub break_frequency: u32,
    /// Shared start time for every area.
    #[serde(default = "default_start_time")]
    pub start_time: NaiveDateTime,
}

impl Default for TournamentConfig {
    fn default() -> Self {
        Self {
            age_categories: Vec::new(),
            weight_categories: WeightCategories::default(),
            pool_size: default_pool_size(),
            num_areas: default_num_areas(),
            round_duration_secs: default_round_duration(),
            break_duration_secs: default_break_duration(),
            break_frequency: default_break_frequency(),
            start_time: default_start_time(),
        }
    }
}

impl TournamentConfig {
    /// Structural validation: categorization cannot run without age and
    /// weight categories for both genders.
    pub fn validate(&self) -> Result<(), CompetitionError> {
        if self.age_categories.is_empty() {
            return Err(CompetitionError::MissingConfig("age_categories"));
        }
        if self.weight_categories.male.is_empty() || self.weight_categories.female.is_empty() {
            return Err(CompetitionError::MissingConfig("weight_categories"));
        }
        if self.num_areas == 0 {
            return Err(CompetitionError::InvalidConfig("num_areas must be at least 1".into()));
        }
        if self.pool_size < 3 {
            return Err(CompetitionError::InvalidConfig("pool_size must be at least 3".into()));
        }
        Ok(())
    }

    /// Sort both weight category lists ascending by max weight. Called once
    /// at ingestion so lookups can rely on the order.
    pub fn sort_weight_categories(&mut self) {
        let by_max = |a: &WeightCategory, b: &WeightCategory| {
            a.max_weight.partial_cmp(&b.max_weight).unwrap_or(std::cmp::Ordering::Equal)
        };
        self.weight_categories.male.sort_by(by_max);
        self.weight_categories.female.sort_by(by_max);
    }
}
