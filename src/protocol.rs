use crate::types::*;
use serde::{Deserialize, Serialize};

/// One state-mutating action against a lobby. Actor ids travel inside the
/// action payload; the transport performs no identity checks of its own.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum Action {
    JoinPlayer {
        player_id: PlayerId,
        name: String,
    },
    JoinViewer {
        viewer_id: ViewerId,
        name: String,
    },
    StartGame,
    AddBot {
        role: Option<Role>,
    },
    SetRole {
        player_id: PlayerId,
        role: Option<Role>,
    },
    RemovePlayer {
        player_id: PlayerId,
    },
    AddTimelineEvent {
        kind: EventKind,
        text: String,
        player_id: String,
        violation: Option<ViolationDetail>,
        metadata: Option<EventMetadata>,
    },
    AssignViolation {
        target_player_id: PlayerId,
        kind: ViolationKind,
        reason: String,
        assigner_id: PlayerId,
    },
    SendMessage {
        player_id: PlayerId,
        text: String,
    },
    StartTurn {
        speaker_id: PlayerId,
    },
    EndTurn,
    PauseTurn {
        pause: bool,
    },
    CastVote {
        event_id: EventId,
        viewer_id: ViewerId,
    },
    SetTrustedSources {
        player_id: PlayerId,
        sources: Vec<String>,
    },
    UpdateQuestionBank {
        player_id: PlayerId,
        questions: Vec<String>,
    },
    RevealQuestion {
        player_id: PlayerId,
        question_id: QuestionId,
    },
    UseLifeline {
        player_id: PlayerId,
        kind: LifelineKind,
        selected_source: Option<String>,
        details: Option<String>,
    },
    UseGreenIndicator {
        player_id: PlayerId,
        reason: Option<String>,
    },
    AddModerationNote {
        referee_id: PlayerId,
        text: String,
        shortcut_key: Option<String>,
    },
    HighlightTimelineEvent {
        time_keeper_id: PlayerId,
        event_id: EventId,
        label: String,
    },
    UpdateTimelineSectionSummary {
        time_keeper_id: PlayerId,
        section_id: SectionId,
        summary: String,
    },
    AwardScore {
        player_id: PlayerId,
        points: i64,
        reason: String,
        assigner_id: PlayerId,
    },
    AdvanceRound {
        time_keeper_id: PlayerId,
    },
    SubmitAudioDraft {
        player_id: PlayerId,
        transcript: String,
        audio_payload: Option<String>,
    },
    ReviewAudioDraft {
        reviewer_id: PlayerId,
        draft_id: DraftId,
        status: DraftStatus,
        review_note: Option<String>,
    },
    EndGame {
        reason: Option<String>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateLobbyRequest {
    #[serde(default)]
    pub settings: LobbySettings,
    pub host_id: PlayerId,
    pub host_name: String,
}

/// Compact lobby listing for the join screen
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LobbySummary {
    pub code: LobbyCode,
    pub topic: String,
    pub player_count: usize,
    pub total_rounds: u32,
}

impl From<&Lobby> for LobbySummary {
    fn from(lobby: &Lobby) -> Self {
        Self {
            code: lobby.code.clone(),
            topic: lobby.settings.topic.clone(),
            player_count: lobby.players.len(),
            total_rounds: lobby.settings.total_rounds,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactCheckRequestBody {
    pub statement: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactCheckResponseBody {
    pub verdict: String,
}
