use crate::error::{GameError, GameResult};
use crate::types::*;
use chrono::Utc;

/// Trim entries, drop empties, dedupe while preserving order
fn normalize_sources(items: Vec<String>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for item in items {
        let trimmed = item.trim();
        if !trimmed.is_empty() && !seen.iter().any(|s| s == trimmed) {
            seen.push(trimmed.to_string());
        }
    }
    seen
}

/// Questions are only trimmed and dropped when empty; duplicates are the
/// player's own business
fn normalize_questions(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty())
        .collect()
}

impl Lobby {
    /// Replace a player's trusted source list. Requires at least three
    /// usable entries; a selection that is no longer listed is cleared.
    pub fn set_trusted_sources(
        &mut self,
        player_id: &str,
        sources: Vec<String>,
    ) -> GameResult<()> {
        let sources = normalize_sources(sources);
        if sources.len() < MIN_TRUSTED_SOURCES {
            return Err(GameError::InvalidInput(format!(
                "at least {MIN_TRUSTED_SOURCES} trusted sources are required"
            )));
        }
        let player = self.player_mut(player_id)?;
        if let Some(selected) = &player.selected_trusted_source {
            if !sources.iter().any(|s| s == selected) {
                player.selected_trusted_source = None;
            }
        }
        player.trusted_sources = sources;
        Ok(())
    }

    /// Save a Conversationalist's private question bank. The first save
    /// fixes the question count permanently; later saves edit text only.
    pub fn update_question_bank(
        &mut self,
        player_id: &str,
        questions: Vec<String>,
    ) -> GameResult<()> {
        self.require_role(player_id, Role::Conversationalist)?;

        let questions = normalize_questions(questions);
        if questions.is_empty() {
            return Err(GameError::InvalidInput(
                "question bank needs at least one question".to_string(),
            ));
        }

        let player = self.player_mut(player_id)?;
        if player.question_bank.is_empty() {
            player.question_bank = questions
                .into_iter()
                .map(|text| QuestionEntry {
                    id: ulid::Ulid::new().to_string(),
                    text,
                    revealed: false,
                    revealed_at: None,
                })
                .collect();
            return Ok(());
        }

        if questions.len() != player.question_bank.len() {
            return Err(GameError::InvalidInput(format!(
                "question count is fixed at {} after the first save",
                player.question_bank.len()
            )));
        }
        for (entry, text) in player.question_bank.iter_mut().zip(questions) {
            entry.text = text;
        }
        Ok(())
    }

    /// Reveal one question from the caller's own bank: it becomes the
    /// active question, counts as a reply, and lands on the timeline.
    pub fn reveal_question(&mut self, player_id: &str, question_id: &str) -> GameResult<()> {
        self.ensure_round_resources(player_id)?;

        let player = self.player_mut(player_id)?;
        let entry = player
            .question_bank
            .iter_mut()
            .find(|q| q.id == question_id)
            .ok_or_else(|| GameError::NotFound(format!("question '{question_id}'")))?;
        if entry.revealed {
            return Err(GameError::Conflict(
                "question has already been revealed".to_string(),
            ));
        }
        entry.revealed = true;
        entry.revealed_at = Some(Utc::now().to_rfc3339());
        let text = entry.text.clone();

        player.score.replies += 1;
        self.game_state.active_question = Some(text.clone());
        self.rescore();

        self.push_event(EventKind::Question, text, player_id, None, None);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lobby() -> Lobby {
        let mut lobby = Lobby::create(
            "TEST1".to_string(),
            LobbySettings::default(),
            "host".to_string(),
            "Host".to_string(),
        );
        lobby.set_role("host", Some(Role::Conversationalist)).unwrap();
        lobby
    }

    #[test]
    fn test_trusted_sources_normalization() {
        let mut lobby = lobby();
        let err = lobby
            .set_trusted_sources(
                "host",
                vec!["  ".to_string(), "A".to_string(), "A ".to_string(), "B".to_string()],
            )
            .unwrap_err();
        assert!(matches!(err, GameError::InvalidInput(_)));

        lobby
            .set_trusted_sources(
                "host",
                vec![" A ".to_string(), "B".to_string(), "C".to_string(), "B".to_string()],
            )
            .unwrap();
        assert_eq!(
            lobby.player("host").unwrap().trusted_sources,
            vec!["A", "B", "C"]
        );
    }

    #[test]
    fn test_trusted_sources_clears_stale_selection() {
        let mut lobby = lobby();
        lobby.player_mut("host").unwrap().selected_trusted_source = Some("Reuters".to_string());

        lobby
            .set_trusted_sources(
                "host",
                vec!["X".to_string(), "Y".to_string(), "Z".to_string()],
            )
            .unwrap();
        assert!(lobby.player("host").unwrap().selected_trusted_source.is_none());

        // A selection that survives the new list is kept
        lobby.player_mut("host").unwrap().selected_trusted_source = Some("Y".to_string());
        lobby
            .set_trusted_sources(
                "host",
                vec!["Y".to_string(), "P".to_string(), "Q".to_string()],
            )
            .unwrap();
        assert_eq!(
            lobby.player("host").unwrap().selected_trusted_source.as_deref(),
            Some("Y")
        );
    }

    #[test]
    fn test_question_bank_requires_conversationalist() {
        let mut lobby = lobby();
        lobby.join_player("p2".to_string(), "Bea".to_string()).unwrap();
        let err = lobby
            .update_question_bank("p2", vec!["Q?".to_string()])
            .unwrap_err();
        assert!(matches!(err, GameError::Unauthorized(_)));
    }

    #[test]
    fn test_question_count_fixed_after_first_save() {
        let mut lobby = lobby();
        lobby
            .update_question_bank("host", vec!["Q1".to_string(), "Q2".to_string()])
            .unwrap();
        let ids: Vec<_> = lobby
            .player("host")
            .unwrap()
            .question_bank
            .iter()
            .map(|q| q.id.clone())
            .collect();

        // Editing text keeps ids and reveal state
        lobby
            .update_question_bank("host", vec!["Q1 revised".to_string(), "Q2".to_string()])
            .unwrap();
        let bank = &lobby.player("host").unwrap().question_bank;
        assert_eq!(bank[0].text, "Q1 revised");
        assert_eq!(bank[0].id, ids[0]);
        assert_eq!(bank[1].id, ids[1]);

        // Changing the count fails
        let err = lobby
            .update_question_bank("host", vec!["only one".to_string()])
            .unwrap_err();
        assert!(matches!(err, GameError::InvalidInput(_)));
    }

    #[test]
    fn test_question_bank_rejects_empty() {
        let mut lobby = lobby();
        let err = lobby
            .update_question_bank("host", vec!["  ".to_string()])
            .unwrap_err();
        assert!(matches!(err, GameError::InvalidInput(_)));
    }

    #[test]
    fn test_reveal_question() {
        let mut lobby = lobby();
        lobby
            .update_question_bank("host", vec!["What changed?".to_string()])
            .unwrap();
        let qid = lobby.player("host").unwrap().question_bank[0].id.clone();

        lobby.reveal_question("host", &qid).unwrap();

        let entry = &lobby.player("host").unwrap().question_bank[0];
        assert!(entry.revealed);
        assert!(entry.revealed_at.is_some());
        assert_eq!(
            lobby.game_state.active_question.as_deref(),
            Some("What changed?")
        );
        assert_eq!(lobby.player("host").unwrap().score.replies, 1);
        let event = lobby.game_state.timeline.last().unwrap();
        assert_eq!(event.kind, EventKind::Question);
        assert_eq!(event.player_id, "host");

        // Revealing twice fails
        let err = lobby.reveal_question("host", &qid).unwrap_err();
        assert!(matches!(err, GameError::Conflict(_)));
    }

    #[test]
    fn test_reveal_question_must_own_bank() {
        let mut lobby = lobby();
        lobby.join_player("p2".to_string(), "Bea".to_string()).unwrap();
        lobby.set_role("p2", Some(Role::Conversationalist)).unwrap();
        lobby
            .update_question_bank("host", vec!["Mine".to_string()])
            .unwrap();
        let qid = lobby.player("host").unwrap().question_bank[0].id.clone();

        let err = lobby.reveal_question("p2", &qid).unwrap_err();
        assert!(matches!(err, GameError::NotFound(_)));
    }
}
