use crate::types::*;

/// Shown in place of unrevealed question text for non-owners
pub const HIDDEN_QUESTION_PLACEHOLDER: &str = "[hidden until revealed]";
/// Shown in place of a pending draft transcript for non-owners
pub const HIDDEN_TRANSCRIPT_PLACEHOLDER: &str = "[pending review]";

impl Lobby {
    /// Build the view a specific requester may see. Referees see
    /// everything; everyone else gets unrevealed question text and pending
    /// draft contents replaced with placeholders unless they own them.
    ///
    /// Strictly a read-boundary transform on a clone; the canonical state
    /// is never the sanitized copy.
    pub fn sanitized_for(&self, requester: Option<&str>) -> Lobby {
        let mut view = self.clone();

        let is_referee = requester.is_some_and(|id| {
            self.players
                .iter()
                .any(|p| p.id == id && p.role == Some(Role::Referee))
        });
        if is_referee {
            return view;
        }

        for player in &mut view.players {
            if requester == Some(player.id.as_str()) {
                continue;
            }
            for question in &mut player.question_bank {
                if !question.revealed {
                    question.text = HIDDEN_QUESTION_PLACEHOLDER.to_string();
                }
            }
        }

        for draft in &mut view.game_state.audio_drafts {
            if draft.status == DraftStatus::Pending
                && requester != Some(draft.player_id.as_str())
            {
                draft.transcript = HIDDEN_TRANSCRIPT_PLACEHOLDER.to_string();
                draft.audio_payload = None;
            }
        }

        view
    }
}
