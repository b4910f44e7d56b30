use crate::error::{GameError, GameResult};
use crate::types::*;
use chrono::Utc;

impl Lobby {
    /// Append an event to the capped timeline, dropping the oldest entry
    /// once the cap is reached. Returns the new event's id.
    pub(crate) fn push_event(
        &mut self,
        kind: EventKind,
        text: impl Into<String>,
        actor: impl Into<String>,
        violation: Option<ViolationDetail>,
        metadata: Option<EventMetadata>,
    ) -> EventId {
        let event = TimelineEvent {
            id: ulid::Ulid::new().to_string(),
            kind,
            text: text.into(),
            player_id: actor.into(),
            timestamp: Utc::now().to_rfc3339(),
            violation,
            fact_check_votes: Vec::new(),
            metadata,
        };
        let id = event.id.clone();
        let timeline = &mut self.game_state.timeline;
        if timeline.len() >= TIMELINE_CAP {
            timeline.remove(0);
        }
        timeline.push(event);
        id
    }

    /// Generic event append. Question and Answer events from a known player
    /// count as replies (Answer additionally as a direct answer) and trigger
    /// a rescore; a Question event also becomes the active question.
    pub fn add_timeline_event(
        &mut self,
        kind: EventKind,
        text: String,
        actor: String,
        violation: Option<ViolationDetail>,
        metadata: Option<EventMetadata>,
    ) -> GameResult<EventId> {
        if kind == EventKind::Question {
            self.game_state.active_question = Some(text.clone());
        }

        let known_player = self.players.iter().any(|p| p.id == actor);
        if known_player && matches!(kind, EventKind::Question | EventKind::Answer) {
            self.ensure_round_resources(&actor)?;
            let player = self.player_mut(&actor)?;
            player.score.replies += 1;
            if kind == EventKind::Answer {
                player.score.direct_answers += 1;
            }
            self.rescore();
        }

        Ok(self.push_event(kind, text, actor, violation, metadata))
    }

    /// Append to the capped chat log
    pub fn send_message(&mut self, player_id: &str, text: String) -> GameResult<()> {
        self.player(player_id)?;
        let messages = &mut self.game_state.chat_messages;
        if messages.len() >= CHAT_CAP {
            messages.remove(0);
        }
        messages.push(ChatMessage {
            id: ulid::Ulid::new().to_string(),
            player_id: player_id.to_string(),
            text,
            timestamp: Utc::now().to_rfc3339(),
        });
        Ok(())
    }

    /// Idempotent fact-check vote on an existing timeline event
    pub fn cast_vote(&mut self, event_id: &str, voter_id: &str) -> GameResult<()> {
        let event = self
            .game_state
            .timeline
            .iter_mut()
            .find(|e| e.id == event_id)
            .ok_or_else(|| GameError::NotFound(format!("event '{event_id}'")))?;
        if !event.fact_check_votes.iter().any(|v| v == voter_id) {
            event.fact_check_votes.push(voter_id.to_string());
        }
        Ok(())
    }
}
