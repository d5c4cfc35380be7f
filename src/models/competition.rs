//! Competition aggregate and error type.

use crate::models::category::Group;
use crate::models::combat::{CombatMatch, MatchId, MatchStatus};
use crate::models::config::TournamentConfig;
use crate::models::participant::{Participant, ParticipantId};
use crate::models::schedule::{ScheduleSlot, ScheduleStats};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Errors that can occur during competition operations.
#[derive(Clone, Debug, PartialEq)]
pub enum CompetitionError {
    /// A required config section is absent (age or weight categories).
    MissingConfig(&'static str),
    /// Config present but unusable (bad weight shorthand, zero areas, ...).
    InvalidConfig(String),
    /// The pipeline was run with no participants at all.
    NoParticipants,
    /// Competition is not in a state that allows this action.
    InvalidState,
    /// A participant with this name already exists (case-insensitive).
    DuplicateParticipantName,
    /// Participant data rejected at entry (e.g. blank name).
    InvalidParticipant(String),
    /// Participant id not found in the competition.
    ParticipantNotFound(ParticipantId),
    /// Match id not found in the competition.
    MatchNotFound(MatchId),
    /// The match is not in a status that allows this transition.
    InvalidMatchStatus { match_id: MatchId, status: MatchStatus },
    /// Round index outside 0..3.
    InvalidRoundIndex(usize),
    /// Finalization rejected: a counted round has no decisive winner.
    UndecidedRound { match_id: MatchId, round: usize },
    /// Finalization rejected: round-win counts tie.
    TiedRoundWins(MatchId),
}

impl std::fmt::Display for CompetitionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompetitionError::MissingConfig(what) => write!(f, "Missing configuration: {}", what),
            CompetitionError::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
            CompetitionError::NoParticipants => write!(f, "No participants registered"),
            CompetitionError::InvalidState => write!(f, "Invalid state for this action"),
            CompetitionError::DuplicateParticipantName => {
                write!(f, "A participant with this name already exists")
            }
            CompetitionError::InvalidParticipant(msg) => write!(f, "Invalid participant: {}", msg),
            CompetitionError::ParticipantNotFound(_) => write!(f, "Participant not found"),
            CompetitionError::MatchNotFound(_) => write!(f, "Match not found"),
            CompetitionError::InvalidMatchStatus { status, .. } => {
                write!(f, "Match status {:?} does not allow this action", status)
            }
            CompetitionError::InvalidRoundIndex(i) => write!(f, "Round index {} out of range", i),
            CompetitionError::UndecidedRound { round, .. } => {
                write!(f, "Round {} has no winner; resolve the tie before finalizing", round + 1)
            }
            CompetitionError::TiedRoundWins(_) => {
                write!(f, "Round wins are tied; a winner cannot be determined")
            }
        }
    }
}

impl std::error::Error for CompetitionError {}

/// Unique identifier for a competition.
pub type CompetitionId = Uuid;

/// Why a participant ended up outside every pool. Not an error, a statistic;
/// surfaced so the UI can render an actionable message.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnusedReason {
    /// Gender could not be resolved from the raw value or category tag.
    UnresolvedGender,
    /// No configured age category contains the participant's age.
    NoAgeCategory,
    /// No configured weight category admits the participant's weight.
    NoWeightCategory,
    /// The whole category had fewer than 3 participants.
    UndersizedCategory,
}

/// A participant left out of pool assignment, with the reason.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UnusedParticipant {
    pub id: ParticipantId,
    pub reason: UnusedReason,
}

/// Current phase of the competition.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompetitionState {
    /// Entering participants and configuration.
    #[default]
    Registration,
    /// Categorization and pool building done; groups exist.
    GroupsBuilt,
    /// Round-robin fixtures generated for every pool.
    MatchesDrawn,
    /// Matches assigned to areas and time slots; live scoring allowed.
    Scheduled,
}

/// Full competition state: participants, config, groups, matches, schedule.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Competition {
    pub id: CompetitionId,
    pub participants: Vec<Participant>,
    pub config: TournamentConfig,
    pub groups: Vec<Group>,
    pub matches: Vec<CombatMatch>,
    pub schedule: Vec<ScheduleSlot>,
    pub schedule_stats: Option<ScheduleStats>,
    /// Participants excluded from every pool, with reasons.
    pub unused_participants: Vec<UnusedParticipant>,
    /// Duplicate fixtures silently dropped during match generation.
    pub duplicate_fixtures_dropped: u32,
    pub state: CompetitionState,
}

impl Competition {
    /// Create a new competition in Registration state with no participants.
    pub fn new(config: TournamentConfig) -> Self {
        Self {
            id: Uuid::new_v4(),
            participants: Vec::new(),
            config,
            groups: Vec::new(),
            matches: Vec::new(),
            schedule: Vec::new(),
            schedule_stats: None,
            unused_participants: Vec::new(),
            duplicate_fixtures_dropped: 0,
            state: CompetitionState::Registration,
        }
    }

    /// Create a competition with initial participants (e.g. from import).
    pub fn with_participants(participants: Vec<Participant>, config: TournamentConfig) -> Self {
        Self {
            participants,
            ..Self::new(config)
        }
    }

    /// Replace the configuration (Registration only). Weight categories are
    /// sorted ascending on ingestion so lookups can rely on the order.
    pub fn set_config(&mut self, mut config: TournamentConfig) -> Result<(), CompetitionError> {
        if self.state != CompetitionState::Registration {
            return Err(CompetitionError::InvalidState);
        }
        config.sort_weight_categories();
        self.config = config;
        Ok(())
    }

    /// Add a participant (Registration only). Full names must be unique
    /// (case-insensitive).
    pub fn add_participant(&mut self, participant: Participant) -> Result<(), CompetitionError> {
        if self.state != CompetitionState::Registration {
            return Err(CompetitionError::InvalidState);
        }
        let name = participant.full_name();
        let name = name.trim();
        if name.is_empty() {
            return Err(CompetitionError::InvalidParticipant("name is empty".into()));
        }
        let is_duplicate = self
            .participants
            .iter()
            .any(|p| p.full_name().eq_ignore_ascii_case(name));
        if is_duplicate {
            return Err(CompetitionError::DuplicateParticipantName);
        }
        self.participants.push(participant);
        Ok(())
    }

    /// Remove a participant by id (Registration only).
    pub fn remove_participant(&mut self, id: ParticipantId) -> Result<(), CompetitionError> {
        if self.state != CompetitionState::Registration {
            return Err(CompetitionError::InvalidState);
        }
        let idx = self
            .participants
            .iter()
            .position(|p| p.id == id)
            .ok_or(CompetitionError::ParticipantNotFound(id))?;
        self.participants.remove(idx);
        Ok(())
    }

    /// Look up a participant by id.
    pub fn get_participant(&self, id: ParticipantId) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == id)
    }

    /// Mutable reference to a match by id.
    pub fn get_match_mut(&mut self, id: MatchId) -> Option<&mut CombatMatch> {
        self.matches.iter_mut().find(|m| m.id == id)
    }

    /// Reference to a match by id.
    pub fn get_match(&self, id: MatchId) -> Option<&CombatMatch> {
        self.matches.iter().find(|m| m.id == id)
    }

    /// Restart: back to Registration keeping participants and config.
    /// Clears groups, matches, schedule and diagnostics.
    pub fn restart(&mut self) -> Result<(), CompetitionError> {
        if self.state == CompetitionState::Registration {
            return Err(CompetitionError::InvalidState);
        }
        self.groups.clear();
        self.matches.clear();
        self.schedule.clear();
        self.schedule_stats = None;
        self.unused_participants.clear();
        self.duplicate_fixtures_dropped = 0;
        self.state = CompetitionState::Registration;
        Ok(())
    }
}
