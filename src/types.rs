use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque ID types for type safety
pub type LobbyCode = String;
pub type PlayerId = String;
pub type ViewerId = String;
pub type EventId = String;
pub type SectionId = String;
pub type HighlightId = String;
pub type NoteId = String;
pub type DraftId = String;
pub type QuestionId = String;

/// Maximum players per lobby (bots included)
pub const MAX_PLAYERS: usize = 5;
/// Timeline keeps the most recent entries, oldest dropped first
pub const TIMELINE_CAP: usize = 300;
pub const SECTION_CAP: usize = 120;
pub const HIGHLIGHT_CAP: usize = 120;
pub const NOTE_CAP: usize = 40;
pub const DRAFT_CAP: usize = 100;
pub const APPROVED_PHRASE_CAP: usize = 30;
/// Chat follows the same trailing-cap discipline as the timeline
pub const CHAT_CAP: usize = 200;

/// Per-round indicator budget, all three colors
pub const INDICATORS_PER_ROUND: u32 = 3;

/// Seed list for players who never configured their own trusted sources
pub const DEFAULT_TRUSTED_SOURCES: &[&str] =
    &["Encyclopaedia Britannica", "Reuters", "Associated Press"];

/// Minimum number of trusted sources a player may save
pub const MIN_TRUSTED_SOURCES: usize = 3;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Conversationalist,
    Referee,
    TimeKeeper,
}

impl Role {
    /// Referee and Time Keeper are each held by at most one player per lobby
    pub fn is_exclusive(&self) -> bool {
        matches!(self, Role::Referee | Role::TimeKeeper)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Conversationalist => write!(f, "Conversationalist"),
            Role::Referee => write!(f, "Referee"),
            Role::TimeKeeper => write!(f, "Time Keeper"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GamePhase {
    RoundStart,
    Conversation,
    GameOver,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ViolationKind {
    Red,
    Yellow,
    Green,
}

impl std::fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ViolationKind::Red => write!(f, "red"),
            ViolationKind::Yellow => write!(f, "yellow"),
            ViolationKind::Green => write!(f, "green"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LifelineKind {
    TrustedSourcing,
    SecondOpinion,
    TimeExtension,
}

impl std::fmt::Display for LifelineKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LifelineKind::TrustedSourcing => write!(f, "trusted sourcing"),
            LifelineKind::SecondOpinion => write!(f, "second opinion"),
            LifelineKind::TimeExtension => write!(f, "time extension"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    Topic,
    Question,
    Summary,
    Answer,
    FactCheck,
    Violation,
    RoundStart,
    TurnStart,
    TurnEnd,
    GameEnd,
    Lifeline,
    ModerationNote,
    Highlight,
    ScoreAward,
    AudioDraft,
    AudioApproved,
    AudioRejected,
    Indicator,
}

/// Lifetime violation tally, never reset between rounds
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ViolationCounts {
    pub red: u32,
    pub yellow: u32,
    pub green: u32,
}

/// Per-round indicator budget. The `round` tag marks which round the budget
/// belongs to; every access path reconciles a stale tag before reading.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Indicators {
    pub round: u32,
    pub red: u32,
    pub yellow: u32,
    pub green: u32,
}

impl Indicators {
    pub fn fresh(round: u32) -> Self {
        Self {
            round,
            red: INDICATORS_PER_ROUND,
            yellow: INDICATORS_PER_ROUND,
            green: INDICATORS_PER_ROUND,
        }
    }
}

/// One-shot-per-round lifeline usage flags
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Lifelines {
    pub round: u32,
    pub trusted_sourcing: bool,
    pub second_opinion: bool,
    pub time_extension: bool,
}

impl Lifelines {
    pub fn fresh(round: u32) -> Self {
        Self {
            round,
            trusted_sourcing: false,
            second_opinion: false,
            time_extension: false,
        }
    }

    pub fn is_used(&self, kind: LifelineKind) -> bool {
        match kind {
            LifelineKind::TrustedSourcing => self.trusted_sourcing,
            LifelineKind::SecondOpinion => self.second_opinion,
            LifelineKind::TimeExtension => self.time_extension,
        }
    }

    pub fn mark_used(&mut self, kind: LifelineKind) {
        match kind {
            LifelineKind::TrustedSourcing => self.trusted_sourcing = true,
            LifelineKind::SecondOpinion => self.second_opinion = true,
            LifelineKind::TimeExtension => self.time_extension = true,
        }
    }
}

/// Raw scoring counters plus the derived total. `total` is never patched
/// incrementally; it is recomputed across the whole cohort whenever any
/// counter changes.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Score {
    pub replies: u32,
    pub direct_answers: u32,
    pub verified_points: u32,
    pub red_flags_received: u32,
    pub yellow_flags_received: u32,
    pub yellow_used: u32,
    pub green_used: u32,
    pub lifelines_used: u32,
    pub efficiency_bonus: i64,
    pub total: i64,
}

/// One entry in a Conversationalist's private question bank
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuestionEntry {
    pub id: QuestionId,
    pub text: String,
    pub revealed: bool,
    pub revealed_at: Option<String>,
}

/// Trailing history of approved audio-draft transcripts
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DraftLearning {
    pub approved_phrases: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub role: Option<Role>,
    pub violations: ViolationCounts,
    pub score: Score,
    pub indicators: Indicators,
    pub lifelines: Lifelines,
    pub trusted_sources: Vec<String>,
    pub selected_trusted_source: Option<String>,
    pub question_bank: Vec<QuestionEntry>,
    pub draft_learning: DraftLearning,
}

impl Player {
    /// Fully-populated player value; no substructure is ever filled in lazily
    pub fn new(id: PlayerId, name: String, round: u32) -> Self {
        Self {
            id,
            name,
            role: None,
            violations: ViolationCounts::default(),
            score: Score::default(),
            indicators: Indicators::fresh(round),
            lifelines: Lifelines::fresh(round),
            trusted_sources: DEFAULT_TRUSTED_SOURCES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            selected_trusted_source: None,
            question_bank: Vec::new(),
            draft_learning: DraftLearning::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Viewer {
    pub id: ViewerId,
    pub name: String,
}

/// Violation details attached to a Violation timeline event
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ViolationDetail {
    pub kind: ViolationKind,
    pub reason: String,
    pub assigned_by: PlayerId,
}

/// Type-specific extras carried by some timeline events
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EventMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lifeline: Option<LifelineKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shortcut_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlight_id: Option<HighlightId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub draft_id: Option<DraftId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_source: Option<String>,
}

/// Actor id recorded on events the engine emits on its own behalf
pub const SYSTEM_ACTOR: &str = "system";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimelineEvent {
    pub id: EventId,
    pub kind: EventKind,
    pub text: String,
    /// Acting player, or the literal `"system"`
    pub player_id: String,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub violation: Option<ViolationDetail>,
    /// Fact-check voter ids, append-only, deduplicated
    #[serde(default)]
    pub fact_check_votes: Vec<ViewerId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<EventMetadata>,
}

/// A speaking turn that has been opened but not yet closed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActiveSection {
    pub id: SectionId,
    pub speaker_id: PlayerId,
    pub started_at: DateTime<Utc>,
}

/// Closed record of one completed speaking turn
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimelineSection {
    pub id: SectionId,
    pub speaker_id: PlayerId,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub duration_seconds: f64,
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimelineHighlight {
    pub id: HighlightId,
    pub event_id: EventId,
    pub label: String,
    pub by_player_id: PlayerId,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModerationNote {
    pub id: NoteId,
    pub text: String,
    pub shortcut_key: Option<String>,
    pub referee_id: PlayerId,
    pub timestamp: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DraftStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AudioDraft {
    pub id: DraftId,
    pub player_id: PlayerId,
    pub transcript: String,
    /// Opaque encoded audio payload supplied by the client, if any
    pub audio_payload: Option<String>,
    pub status: DraftStatus,
    pub learning_hint: Option<String>,
    pub submitted_at: String,
    pub reviewed_at: Option<String>,
    pub reviewer_id: Option<PlayerId>,
    pub review_note: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub id: String,
    pub player_id: PlayerId,
    pub text: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WinnerSummary {
    pub player_id: PlayerId,
    pub player_name: String,
    pub score: i64,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub current_round: u32,
    pub active_topic: String,
    pub active_question: Option<String>,
    pub game_phase: GamePhase,
    pub speaker_id: Option<PlayerId>,
    pub chat_messages: Vec<ChatMessage>,
    pub turn_start_time: Option<DateTime<Utc>>,
    pub is_timer_running: bool,
    pub turn_remaining_seconds: f64,
    pub active_section: Option<ActiveSection>,
    pub timeline: Vec<TimelineEvent>,
    pub sections: Vec<TimelineSection>,
    pub highlights: Vec<TimelineHighlight>,
    pub moderation_notes: Vec<ModerationNote>,
    pub audio_drafts: Vec<AudioDraft>,
    pub winner: Option<WinnerSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LobbySettings {
    pub topic: String,
    pub total_rounds: u32,
    pub turn_seconds: u32,
    pub public: bool,
}

impl Default for LobbySettings {
    fn default() -> Self {
        Self {
            topic: String::new(),
            total_rounds: 3,
            turn_seconds: 60,
            public: true,
        }
    }
}

/// One game session's complete state, keyed by a short shareable code
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lobby {
    pub code: LobbyCode,
    pub settings: LobbySettings,
    pub players: Vec<Player>,
    pub viewers: Vec<Viewer>,
    pub game_state: GameState,
    pub game_started: bool,
    pub created_at: DateTime<Utc>,
}
