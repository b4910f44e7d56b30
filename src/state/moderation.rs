use crate::error::{GameError, GameResult};
use crate::types::*;
use chrono::Utc;

impl Lobby {
    /// Record a violation against a player: lifetime counter, matching
    /// score penalty, and for red violations one of the target's remaining
    /// red indicators (Conversationalists only, floored at zero).
    pub fn assign_violation(
        &mut self,
        target_player_id: &str,
        kind: ViolationKind,
        reason: String,
        assigner_id: &str,
    ) -> GameResult<()> {
        self.ensure_round_resources(target_player_id)?;
        let target = self.player_mut(target_player_id)?;
        let target_name = target.name.clone();
        let is_conversationalist = target.role == Some(Role::Conversationalist);

        match kind {
            ViolationKind::Red => {
                target.violations.red += 1;
                target.score.red_flags_received += 1;
                if is_conversationalist {
                    target.indicators.red = target.indicators.red.saturating_sub(1);
                }
            }
            ViolationKind::Yellow => {
                target.violations.yellow += 1;
                target.score.yellow_flags_received += 1;
            }
            ViolationKind::Green => {
                // No score penalty counter for green; lifetime tally only
                target.violations.green += 1;
            }
        }
        self.rescore();

        self.push_event(
            EventKind::Violation,
            format!("{target_name} received a {kind} violation: {reason}"),
            assigner_id,
            Some(ViolationDetail {
                kind,
                reason,
                assigned_by: assigner_id.to_string(),
            }),
            None,
        );
        Ok(())
    }

    /// Referee-only note, kept in a capped log and mirrored to the timeline
    pub fn add_moderation_note(
        &mut self,
        referee_id: &str,
        text: String,
        shortcut_key: Option<String>,
    ) -> GameResult<NoteId> {
        self.require_role(referee_id, Role::Referee)?;

        let note = ModerationNote {
            id: ulid::Ulid::new().to_string(),
            text: text.clone(),
            shortcut_key: shortcut_key.clone(),
            referee_id: referee_id.to_string(),
            timestamp: Utc::now().to_rfc3339(),
        };
        let id = note.id.clone();
        let notes = &mut self.game_state.moderation_notes;
        if notes.len() >= NOTE_CAP {
            notes.remove(0);
        }
        notes.push(note);

        self.push_event(
            EventKind::ModerationNote,
            text,
            referee_id,
            None,
            Some(EventMetadata {
                shortcut_key,
                ..EventMetadata::default()
            }),
        );
        Ok(id)
    }

    /// Time Keeper marks an existing timeline event as notable. The target
    /// event itself is never mutated.
    pub fn highlight_timeline_event(
        &mut self,
        time_keeper_id: &str,
        event_id: &str,
        label: String,
    ) -> GameResult<HighlightId> {
        self.require_role(time_keeper_id, Role::TimeKeeper)?;
        if !self.game_state.timeline.iter().any(|e| e.id == event_id) {
            return Err(GameError::NotFound(format!("event '{event_id}'")));
        }

        let highlight = TimelineHighlight {
            id: ulid::Ulid::new().to_string(),
            event_id: event_id.to_string(),
            label: label.clone(),
            by_player_id: time_keeper_id.to_string(),
            timestamp: Utc::now().to_rfc3339(),
        };
        let id = highlight.id.clone();
        let highlights = &mut self.game_state.highlights;
        if highlights.len() >= HIGHLIGHT_CAP {
            highlights.remove(0);
        }
        highlights.push(highlight);

        self.push_event(
            EventKind::Highlight,
            label,
            time_keeper_id,
            None,
            Some(EventMetadata {
                highlight_id: Some(id.clone()),
                ..EventMetadata::default()
            }),
        );
        Ok(id)
    }

    /// Time Keeper sets or replaces a closed section's summary; an empty
    /// string clears it.
    pub fn update_timeline_section_summary(
        &mut self,
        time_keeper_id: &str,
        section_id: &str,
        summary: String,
    ) -> GameResult<()> {
        self.require_role(time_keeper_id, Role::TimeKeeper)?;
        let section = self
            .game_state
            .sections
            .iter_mut()
            .find(|s| s.id == section_id)
            .ok_or_else(|| GameError::NotFound(format!("section '{section_id}'")))?;

        let trimmed = summary.trim();
        section.summary = if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        };
        Ok(())
    }

    /// Grant verified points to a player
    pub fn award_score(
        &mut self,
        player_id: &str,
        points: i64,
        reason: String,
        assigner_id: &str,
    ) -> GameResult<()> {
        if points <= 0 {
            return Err(GameError::InvalidInput(
                "award points must be a positive integer".to_string(),
            ));
        }
        self.ensure_round_resources(player_id)?;
        let player = self.player_mut(player_id)?;
        player.score.verified_points += points as u32;
        self.rescore();

        self.push_event(
            EventKind::ScoreAward,
            reason,
            assigner_id,
            None,
            None,
        );
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
        lobby.join_player("ref".to_string(), "Ref".to_string()).unwrap();
        lobby.join_player("tk".to_string(), "Keeper".to_string()).unwrap();
        lobby.set_role("host", Some(Role::Conversationalist)).unwrap();
        lobby.set_role("ref", Some(Role::Referee)).unwrap();
        lobby.set_role("tk", Some(Role::TimeKeeper)).unwrap();
        lobby.start_game().unwrap();
        lobby
    }

    #[test]
    fn test_red_violation_consumes_indicator() {
        let mut lobby = lobby();
        lobby
            .assign_violation("host", ViolationKind::Red, "ad hominem".to_string(), "ref")
            .unwrap();

        let host = lobby.player("host").unwrap();
        assert_eq!(host.violations.red, 1);
        assert_eq!(host.score.red_flags_received, 1);
        assert_eq!(host.indicators.red, INDICATORS_PER_ROUND - 1);
        assert_eq!(host.score.total, -8 + 5);

        let event = lobby.game_state.timeline.last().unwrap();
        assert_eq!(event.kind, EventKind::Violation);
        let detail = event.violation.as_ref().unwrap();
        assert_eq!(detail.kind, ViolationKind::Red);
        assert_eq!(detail.assigned_by, "ref");
    }

    #[test]
    fn test_red_indicator_floors_at_zero() {
        let mut lobby = lobby();
        for _ in 0..INDICATORS_PER_ROUND + 2 {
            lobby
                .assign_violation("host", ViolationKind::Red, "again".to_string(), "ref")
                .unwrap();
        }
        assert_eq!(lobby.player("host").unwrap().indicators.red, 0);
        assert_eq!(
            lobby.player("host").unwrap().violations.red,
            INDICATORS_PER_ROUND + 2
        );
    }

    #[test]
    fn test_red_violation_on_non_conversationalist_keeps_indicators() {
        let mut lobby = lobby();
        lobby
            .assign_violation("tk", ViolationKind::Red, "late".to_string(), "ref")
            .unwrap();
        let tk = lobby.player("tk").unwrap();
        assert_eq!(tk.score.red_flags_received, 1);
        assert_eq!(tk.indicators.red, INDICATORS_PER_ROUND);
    }

    #[test]
    fn test_green_violation_has_no_score_penalty() {
        let mut lobby = lobby();
        lobby
            .assign_violation("host", ViolationKind::Green, "elaborating".to_string(), "ref")
            .unwrap();
        let host = lobby.player("host").unwrap();
        assert_eq!(host.violations.green, 1);
        assert_eq!(host.score.total, 5); // efficiency bonus only
    }

    #[test]
    fn test_violation_unknown_target() {
        let mut lobby = lobby();
        let err = lobby
            .assign_violation("ghost", ViolationKind::Red, "x".to_string(), "ref")
            .unwrap_err();
        assert!(matches!(err, GameError::NotFound(_)));
    }

    #[test]
    fn test_moderation_note_requires_referee() {
        let mut lobby = lobby();
        let err = lobby
            .add_moderation_note("tk", "note".to_string(), None)
            .unwrap_err();
        assert!(matches!(err, GameError::Unauthorized(_)));

        lobby
            .add_moderation_note("ref", "keep it civil".to_string(), Some("k".to_string()))
            .unwrap();
        assert_eq!(lobby.game_state.moderation_notes.len(), 1);
        let event = lobby.game_state.timeline.last().unwrap();
        assert_eq!(event.kind, EventKind::ModerationNote);
        assert_eq!(
            event.metadata.as_ref().unwrap().shortcut_key.as_deref(),
            Some("k")
        );
    }

    #[test]
    fn test_moderation_note_cap() {
        let mut lobby = lobby();
        for i in 0..NOTE_CAP + 3 {
            lobby
                .add_moderation_note("ref", format!("note {i}"), None)
                .unwrap();
        }
        assert_eq!(lobby.game_state.moderation_notes.len(), NOTE_CAP);
        assert_eq!(lobby.game_state.moderation_notes[0].text, "note 3");
    }

    #[test]
    fn test_highlight_requires_time_keeper_and_existing_event() {
        let mut lobby = lobby();
        let event_id = lobby.game_state.timeline[0].id.clone();

        let err = lobby
            .highlight_timeline_event("ref", &event_id, "big moment".to_string())
            .unwrap_err();
        assert!(matches!(err, GameError::Unauthorized(_)));

        let err = lobby
            .highlight_timeline_event("tk", "missing", "big moment".to_string())
            .unwrap_err();
        assert!(matches!(err, GameError::NotFound(_)));

        let id = lobby
            .highlight_timeline_event("tk", &event_id, "big moment".to_string())
            .unwrap();
        assert_eq!(lobby.game_state.highlights.len(), 1);
        assert_eq!(lobby.game_state.highlights[0].id, id);
        assert_eq!(lobby.game_state.highlights[0].event_id, event_id);
    }

    #[test]
    fn test_section_summary_is_replaceable() {
        let mut lobby = lobby();
        lobby.start_turn("host").unwrap();
        lobby.end_turn().unwrap();
        let section_id = lobby.game_state.sections[0].id.clone();

        lobby
            .update_timeline_section_summary("tk", &section_id, "opening remarks".to_string())
            .unwrap();
        assert_eq!(
            lobby.game_state.sections[0].summary.as_deref(),
            Some("opening remarks")
        );

        lobby
            .update_timeline_section_summary("tk", &section_id, "revised".to_string())
            .unwrap();
        assert_eq!(lobby.game_state.sections[0].summary.as_deref(), Some("revised"));

        // Empty string normalizes to None
        lobby
            .update_timeline_section_summary("tk", &section_id, "  ".to_string())
            .unwrap();
        assert!(lobby.game_state.sections[0].summary.is_none());
    }

    #[test]
    fn test_award_score() {
        let mut lobby = lobby();
        let err = lobby
            .award_score("host", 0, "nice".to_string(), "ref")
            .unwrap_err();
        assert!(matches!(err, GameError::InvalidInput(_)));
        let err = lobby
            .award_score("host", -3, "nice".to_string(), "ref")
            .unwrap_err();
        assert!(matches!(err, GameError::InvalidInput(_)));

        lobby.award_score("host", 2, "verified claim".to_string(), "ref").unwrap();
        let host = lobby.player("host").unwrap();
        assert_eq!(host.score.verified_points, 2);
        assert_eq!(host.score.total, 25); // 20 + efficiency bonus 5
        assert_eq!(
            lobby.game_state.timeline.last().unwrap().kind,
            EventKind::ScoreAward
        );
    }
}
