//! HTTP API endpoints.
//!
//! The transport stays thin: it resolves the lobby, hands the action to the
//! domain layer, and sanitizes whatever it returns for the requester named
//! in the `as` query parameter. No identity means no special access.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::error::{FactCheckError, GameError, GameResult};
use crate::factcheck::FactCheckProvider;
use crate::protocol::{
    Action, CreateLobbyRequest, FactCheckRequestBody, FactCheckResponseBody, LobbySummary,
};
use crate::state::AppState;
use crate::types::*;

#[derive(Clone)]
pub struct ApiContext {
    pub state: AppState,
    pub fact_checker: Option<Arc<dyn FactCheckProvider>>,
}

pub fn router(ctx: ApiContext) -> Router {
    Router::new()
        .route("/api/lobbies", post(create_lobby).get(list_lobbies))
        .route("/api/lobbies/{code}", get(lobby_state))
        .route("/api/lobbies/{code}/actions", post(apply_action))
        .route("/api/lobbies/{code}/fact-check", post(fact_check))
        .with_state(ctx)
}

impl IntoResponse for GameError {
    fn into_response(self) -> Response {
        let status = match &self {
            GameError::NotFound(_) => StatusCode::NOT_FOUND,
            GameError::Unauthorized(_) => StatusCode::FORBIDDEN,
            GameError::Conflict(_) => StatusCode::CONFLICT,
            GameError::Exhausted(_) => StatusCode::UNPROCESSABLE_ENTITY,
            GameError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        };
        (status, self.to_string()).into_response()
    }
}

impl IntoResponse for FactCheckError {
    fn into_response(self) -> Response {
        let status = match &self {
            FactCheckError::NotConfigured => StatusCode::SERVICE_UNAVAILABLE,
            FactCheckError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            FactCheckError::Request(_) | FactCheckError::Parse(_) => StatusCode::BAD_GATEWAY,
        };
        (status, self.to_string()).into_response()
    }
}

/// Requester identity for read sanitization
#[derive(Debug, Deserialize)]
struct ViewerQuery {
    #[serde(rename = "as")]
    as_id: Option<String>,
}

/// POST /api/lobbies
async fn create_lobby(
    State(ctx): State<ApiContext>,
    Json(req): Json<CreateLobbyRequest>,
) -> Json<Lobby> {
    let host_id = req.host_id.clone();
    let lobby = ctx
        .state
        .create_lobby(req.settings, req.host_id, req.host_name)
        .await;
    tracing::info!(code = %lobby.code, "Created lobby");
    Json(lobby.sanitized_for(Some(&host_id)))
}

/// GET /api/lobbies
async fn list_lobbies(State(ctx): State<ApiContext>) -> Json<Vec<LobbySummary>> {
    let lobbies = ctx.state.open_lobbies().await;
    Json(lobbies.iter().map(LobbySummary::from).collect())
}

/// GET /api/lobbies/{code}?as={playerId}
async fn lobby_state(
    State(ctx): State<ApiContext>,
    Path(code): Path<String>,
    Query(viewer): Query<ViewerQuery>,
) -> Result<Json<Lobby>, GameError> {
    let lobby = ctx.state.lobby(&code).await?;
    Ok(Json(lobby.sanitized_for(viewer.as_id.as_deref())))
}

/// POST /api/lobbies/{code}/actions?as={playerId}
async fn apply_action(
    State(ctx): State<ApiContext>,
    Path(code): Path<String>,
    Query(viewer): Query<ViewerQuery>,
    Json(action): Json<Action>,
) -> Result<Json<Lobby>, GameError> {
    ctx.state
        .with_lobby(&code, |lobby| dispatch(lobby, action))
        .await?;
    let lobby = ctx.state.lobby(&code).await?;
    Ok(Json(lobby.sanitized_for(viewer.as_id.as_deref())))
}

/// POST /api/lobbies/{code}/fact-check
///
/// Calls the external provider and records the verdict on the timeline.
async fn fact_check(
    State(ctx): State<ApiContext>,
    Path(code): Path<String>,
    Json(body): Json<FactCheckRequestBody>,
) -> Response {
    let Some(checker) = &ctx.fact_checker else {
        return FactCheckError::NotConfigured.into_response();
    };

    match checker.check(&body.statement).await {
        Ok(verdict) => {
            let recorded = ctx
                .state
                .with_lobby(&code, |lobby| {
                    lobby.add_timeline_event(
                        EventKind::FactCheck,
                        verdict.clone(),
                        SYSTEM_ACTOR.to_string(),
                        None,
                        None,
                    )
                })
                .await;
            match recorded {
                Ok(_) => Json(FactCheckResponseBody { verdict }).into_response(),
                Err(e) => e.into_response(),
            }
        }
        Err(e) => {
            tracing::error!("Fact check failed: {}", e);
            e.into_response()
        }
    }
}

/// Route one action to its domain mutation
fn dispatch(lobby: &mut Lobby, action: Action) -> GameResult<()> {
    match action {
        Action::JoinPlayer { player_id, name } => lobby.join_player(player_id, name),
        Action::JoinViewer { viewer_id, name } => {
            lobby.join_viewer(viewer_id, name);
            Ok(())
        }
        Action::StartGame => lobby.start_game(),
        Action::AddBot { role } => lobby.add_bot(role).map(|_| ()),
        Action::SetRole { player_id, role } => lobby.set_role(&player_id, role),
        Action::RemovePlayer { player_id } => lobby.remove_player(&player_id),
        Action::AddTimelineEvent {
            kind,
            text,
            player_id,
            violation,
            metadata,
        } => lobby
            .add_timeline_event(kind, text, player_id, violation, metadata)
            .map(|_| ()),
        Action::AssignViolation {
            target_player_id,
            kind,
            reason,
            assigner_id,
        } => lobby.assign_violation(&target_player_id, kind, reason, &assigner_id),
        Action::SendMessage { player_id, text } => lobby.send_message(&player_id, text),
        Action::StartTurn { speaker_id } => lobby.start_turn(&speaker_id),
        Action::EndTurn => lobby.end_turn(),
        Action::PauseTurn { pause } => lobby.pause_turn(pause),
        Action::CastVote { event_id, viewer_id } => lobby.cast_vote(&event_id, &viewer_id),
        Action::SetTrustedSources { player_id, sources } => {
            lobby.set_trusted_sources(&player_id, sources)
        }
        Action::UpdateQuestionBank {
            player_id,
            questions,
        } => lobby.update_question_bank(&player_id, questions),
        Action::RevealQuestion {
            player_id,
            question_id,
        } => lobby.reveal_question(&player_id, &question_id),
        Action::UseLifeline {
            player_id,
            kind,
            selected_source,
            details,
        } => lobby.use_lifeline(&player_id, kind, selected_source, details),
        Action::UseGreenIndicator { player_id, reason } => {
            lobby.use_green_indicator(&player_id, reason)
        }
        Action::AddModerationNote {
            referee_id,
            text,
            shortcut_key,
        } => lobby
            .add_moderation_note(&referee_id, text, shortcut_key)
            .map(|_| ()),
        Action::HighlightTimelineEvent {
            time_keeper_id,
            event_id,
            label,
        } => lobby
            .highlight_timeline_event(&time_keeper_id, &event_id, label)
            .map(|_| ()),
        Action::UpdateTimelineSectionSummary {
            time_keeper_id,
            section_id,
            summary,
        } => lobby.update_timeline_section_summary(&time_keeper_id, &section_id, summary),
        Action::AwardScore {
            player_id,
            points,
            reason,
            assigner_id,
        } => lobby.award_score(&player_id, points, reason, &assigner_id),
        Action::AdvanceRound { time_keeper_id } => lobby.advance_round(&time_keeper_id),
        Action::SubmitAudioDraft {
            player_id,
            transcript,
            audio_payload,
        } => lobby
            .submit_audio_draft(&player_id, transcript, audio_payload)
            .map(|_| ()),
        Action::ReviewAudioDraft {
            reviewer_id,
            draft_id,
            status,
            review_note,
        } => lobby.review_audio_draft(&reviewer_id, &draft_id, status, review_note),
        Action::EndGame { reason } => lobby.end_game(reason),
    }
}
