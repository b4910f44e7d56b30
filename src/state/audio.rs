use crate::error::{GameError, GameResult};
use crate::types::*;
use chrono::Utc;

/// Average word count across a player's approved transcripts, rounded
fn average_word_count(phrases: &[String]) -> usize {
    if phrases.is_empty() {
        return 0;
    }
    let words: usize = phrases.iter().map(|p| p.split_whitespace().count()).sum();
    (words as f64 / phrases.len() as f64).round() as usize
}

impl Lobby {
    /// Queue an audio draft for Referee review. The learning hint summarizes
    /// the player's approved history, when there is any.
    pub fn submit_audio_draft(
        &mut self,
        player_id: &str,
        transcript: String,
        audio_payload: Option<String>,
    ) -> GameResult<DraftId> {
        self.require_role(player_id, Role::Conversationalist)?;
        let transcript = transcript.trim().to_string();
        if transcript.is_empty() {
            return Err(GameError::InvalidInput(
                "audio draft transcript must not be empty".to_string(),
            ));
        }

        let player = self.player(player_id)?;
        let name = player.name.clone();
        let history = &player.draft_learning.approved_phrases;
        let learning_hint = if history.is_empty() {
            None
        } else {
            Some(format!(
                "Recent approved drafts average {} words",
                average_word_count(history)
            ))
        };

        let draft = AudioDraft {
            id: ulid::Ulid::new().to_string(),
            player_id: player_id.to_string(),
            transcript,
            audio_payload,
            status: DraftStatus::Pending,
            learning_hint,
            submitted_at: Utc::now().to_rfc3339(),
            reviewed_at: None,
            reviewer_id: None,
            review_note: None,
        };
        let id = draft.id.clone();
        let drafts = &mut self.game_state.audio_drafts;
        if drafts.len() >= DRAFT_CAP {
            drafts.remove(0);
        }
        drafts.push(draft);

        // The transcript stays out of the event text; pending drafts are
        // private until reviewed
        self.push_event(
            EventKind::AudioDraft,
            format!("{name} submitted an audio draft for review"),
            player_id,
            None,
            Some(EventMetadata {
                draft_id: Some(id.clone()),
                ..EventMetadata::default()
            }),
        );
        Ok(id)
    }

    /// Referee resolves a pending draft exactly once. Approval publishes the
    /// transcript on the timeline, feeds the author's learning history, and
    /// counts as a reply plus a direct answer; rejection only records the
    /// review note.
    pub fn review_audio_draft(
        &mut self,
        reviewer_id: &str,
        draft_id: &str,
        status: DraftStatus,
        review_note: Option<String>,
    ) -> GameResult<()> {
        self.require_role(reviewer_id, Role::Referee)?;
        if status == DraftStatus::Pending {
            return Err(GameError::InvalidInput(
                "review status must be approved or rejected".to_string(),
            ));
        }

        let idx = self
            .game_state
            .audio_drafts
            .iter()
            .position(|d| d.id == draft_id)
            .ok_or_else(|| GameError::NotFound(format!("audio draft '{draft_id}'")))?;
        if self.game_state.audio_drafts[idx].status != DraftStatus::Pending {
            return Err(GameError::Conflict(
                "audio draft has already been reviewed".to_string(),
            ));
        }
        let author_id = self.game_state.audio_drafts[idx].player_id.clone();
        let transcript = self.game_state.audio_drafts[idx].transcript.clone();

        // Resolve the author before any field is written
        if status == DraftStatus::Approved {
            self.ensure_round_resources(&author_id)?;
        }

        let draft = &mut self.game_state.audio_drafts[idx];
        draft.status = status;
        draft.reviewed_at = Some(Utc::now().to_rfc3339());
        draft.reviewer_id = Some(reviewer_id.to_string());
        draft.review_note = review_note.clone();

        if status == DraftStatus::Approved {
            let author = self.player_mut(&author_id)?;
            let phrases = &mut author.draft_learning.approved_phrases;
            if phrases.len() >= APPROVED_PHRASE_CAP {
                phrases.remove(0);
            }
            phrases.push(transcript.clone());
            author.score.replies += 1;
            author.score.direct_answers += 1;
            self.rescore();

            self.push_event(
                EventKind::AudioApproved,
                transcript,
                reviewer_id,
                None,
                Some(EventMetadata {
                    draft_id: Some(draft_id.to_string()),
                    ..EventMetadata::default()
                }),
            );
        } else {
            self.push_event(
                EventKind::AudioRejected,
                review_note.unwrap_or_else(|| "Audio draft rejected".to_string()),
                reviewer_id,
                None,
                Some(EventMetadata {
                    draft_id: Some(draft_id.to_string()),
                    ..EventMetadata::default()
                }),
            );
        }
        Ok(())
    }
}
