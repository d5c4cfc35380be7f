//! Age/weight categories, category keys, groups and pools.

use crate::models::participant::{Gender, ParticipantId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Sentinel max weight for open-ended "+" categories (e.g. "+87kg").
pub const UNBOUNDED_WEIGHT: f64 = 999.0;

/// Minimum number of participants for a pool to exist.
pub const MIN_POOL_SIZE: usize = 3;

/// An age bracket, inclusive on both ends. Ranges are expected to be
/// non-overlapping; the first matching range wins.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AgeCategory {
    pub name: String,
    pub min_age: u32,
    pub max_age: u32,
}

impl AgeCategory {
    pub fn contains(&self, age: u32) -> bool {
        age >= self.min_age && age <= self.max_age
    }
}

/// A weight bracket, bounded above. "+" categories use [`UNBOUNDED_WEIGHT`]
/// so they always match as the fallback.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeightCategory {
    pub name: String,
    pub max_weight: f64,
}

/// One competition division: (gender, age category, weight category).
/// A value type rather than a joined string, so hyphens in category names
/// can never corrupt the key.
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct CategoryKey {
    pub gender: Gender,
    pub age_category: String,
    pub weight_category: String,
}

impl std::fmt::Display for CategoryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let g = match self.gender {
            Gender::Male => "male",
            Gender::Female => "female",
        };
        write!(f, "{} / {} / {}", g, self.age_category, self.weight_category)
    }
}

/// Unique identifier for a group.
pub type GroupId = Uuid;

/// An ordered set of at least [`MIN_POOL_SIZE`] participant ids inside one
/// group; matches are round-robin within the pool.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pool {
    pub members: Vec<ParticipantId>,
}

impl Pool {
    pub fn new(members: Vec<ParticipantId>) -> Self {
        Self { members }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// A competition division with its assigned participants, split into pools.
/// Immutable once scheduling begins.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub key: CategoryKey,
    pub participants: Vec<ParticipantId>,
    pub pools: Vec<Pool>,
}

impl Group {
    pub fn new(key: CategoryKey, participants: Vec<ParticipantId>, pools: Vec<Pool>) -> Self {
        Self {
            id: Uuid::new_v4(),
            key,
            participants,
            pools,
        }
    }
}
