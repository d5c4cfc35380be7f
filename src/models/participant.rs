//! Participant identity and gender normalization.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a participant (used in pools, matches and lookups).
pub type ParticipantId = Uuid;

/// Resolved competition gender (participants enter with free-text values).
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// Normalize a free-text gender value. Accepts the usual French and
    /// English spellings; returns `None` for anything unrecognized.
    pub fn parse(raw: &str) -> Option<Gender> {
        let v = raw.trim().to_lowercase();
        match v.as_str() {
            "m" | "h" | "homme" | "male" | "masculin" | "garcon" | "garçon" => Some(Gender::Male),
            "f" | "femme" | "female" | "feminin" | "féminin" | "fille" => Some(Gender::Female),
            _ => None,
        }
    }

    /// Fallback resolution from an explicit category tag such as
    /// `"male-cadet"` or `"female-junior"`.
    pub fn from_category_tag(tag: &str) -> Option<Gender> {
        let t = tag.trim().to_lowercase();
        if t.starts_with("female-") {
            Some(Gender::Female)
        } else if t.starts_with("male-") {
            Some(Gender::Male)
        } else {
            None
        }
    }
}

/// A participant in the competition. Immutable once entered; everything
/// downstream references it by id.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    /// Family name ("nom").
    pub last_name: String,
    /// Given name ("prenom").
    pub first_name: String,
    /// Raw gender value as entered ("sexe"); normalized during categorization.
    pub gender: String,
    pub age: u32,
    /// Weight in kilograms ("poids").
    pub weight: f64,
    /// Club / region affiliation ("ligue"); soft constraint when building pools.
    pub affiliation: String,
    /// Optional precomputed category hint, e.g. `"female-junior"`.
    pub category_tag: Option<String>,
}

impl Participant {
    pub fn new(
        last_name: impl Into<String>,
        first_name: impl Into<String>,
        gender: impl Into<String>,
        age: u32,
        weight: f64,
        affiliation: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            last_name: last_name.into(),
            first_name: first_name.into(),
            gender: gender.into(),
            age,
            weight,
            affiliation: affiliation.into(),
            category_tag: None,
        }
    }

    /// Resolved gender: normalized raw value first, category tag prefix as
    /// fallback. `None` means the participant cannot be categorized.
    pub fn resolved_gender(&self) -> Option<Gender> {
        Gender::parse(&self.gender)
            .or_else(|| self.category_tag.as_deref().and_then(Gender::from_category_tag))
    }

    /// Display name for logs and API payloads.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
