use super::score;
use crate::error::{GameError, GameResult};
use crate::types::*;
use chrono::Utc;

/// Reset a player's per-round budgets to a fresh allocation for `round`.
/// This is the single copy of the reset logic; the lazy reconciliation in
/// [`Lobby::ensure_round_resources`] and the explicit resets in
/// `start_game`/`advance_round` both go through it.
pub(crate) fn reset_round_resources(player: &mut Player, round: u32) {
    player.indicators = Indicators::fresh(round);
    player.lifelines = Lifelines::fresh(round);
}

impl Lobby {
    /// Seed a brand-new lobby with its host as the first player
    pub fn create(
        code: LobbyCode,
        settings: LobbySettings,
        host_id: PlayerId,
        host_name: String,
    ) -> Self {
        let topic = settings.topic.clone();
        let mut lobby = Self {
            code,
            settings,
            players: vec![Player::new(host_id, host_name, 1)],
            viewers: Vec::new(),
            game_state: GameState {
                current_round: 1,
                active_topic: topic.clone(),
                active_question: None,
                game_phase: GamePhase::RoundStart,
                speaker_id: None,
                chat_messages: Vec::new(),
                turn_start_time: None,
                is_timer_running: false,
                turn_remaining_seconds: 0.0,
                active_section: None,
                timeline: Vec::new(),
                sections: Vec::new(),
                highlights: Vec::new(),
                moderation_notes: Vec::new(),
                audio_drafts: Vec::new(),
                winner: None,
            },
            game_started: false,
            created_at: Utc::now(),
        };
        lobby.push_event(EventKind::Topic, topic, SYSTEM_ACTOR, None, None);
        lobby
    }

    pub(crate) fn player(&self, id: &str) -> GameResult<&Player> {
        self.players
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| GameError::NotFound(format!("player '{id}'")))
    }

    pub(crate) fn player_mut(&mut self, id: &str) -> GameResult<&mut Player> {
        self.players
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| GameError::NotFound(format!("player '{id}'")))
    }

    /// Look up the acting player and check they hold the required role
    pub(crate) fn require_role(&self, id: &str, role: Role) -> GameResult<&Player> {
        let player = self.player(id)?;
        if player.role != Some(role) {
            return Err(GameError::Unauthorized(format!(
                "this action requires the {role} role"
            )));
        }
        Ok(player)
    }

    /// Reconcile a player's round-tagged budgets with the current round.
    /// Idempotent; every mutation entry point calls this before touching a
    /// player, since players can join mid-round.
    pub(crate) fn ensure_round_resources(&mut self, player_id: &str) -> GameResult<()> {
        let round = self.game_state.current_round;
        let player = self.player_mut(player_id)?;
        if player.indicators.round != round || player.lifelines.round != round {
            reset_round_resources(player, round);
        }
        Ok(())
    }

    pub(crate) fn rescore(&mut self) {
        score::recompute_scores(&mut self.players);
    }

    pub(crate) fn clear_turn_state(&mut self) {
        let gs = &mut self.game_state;
        gs.speaker_id = None;
        gs.is_timer_running = false;
        gs.turn_start_time = None;
        gs.turn_remaining_seconds = 0.0;
        gs.active_section = None;
    }

    /// Begin play: fresh round budgets for everyone, phase moves to
    /// CONVERSATION, and the first RoundStart lands on the timeline.
    pub fn start_game(&mut self) -> GameResult<()> {
        if self.game_started {
            return Err(GameError::Conflict("game has already started".to_string()));
        }
        self.game_started = true;
        let round = self.game_state.current_round;
        for player in &mut self.players {
            reset_round_resources(player, round);
        }
        self.game_state.game_phase = GamePhase::Conversation;
        self.push_event(
            EventKind::RoundStart,
            format!("Round {round} begins"),
            SYSTEM_ACTOR,
            None,
            None,
        );
        Ok(())
    }

    /// Move to the next round, or end the game if the final configured
    /// round is already in play. Time Keeper only.
    pub fn advance_round(&mut self, time_keeper_id: &str) -> GameResult<()> {
        self.require_role(time_keeper_id, Role::TimeKeeper)?;

        if self.game_state.current_round >= self.settings.total_rounds {
            return self.end_game(Some("final round complete".to_string()));
        }

        self.game_state.current_round += 1;
        self.game_state.active_question = None;
        let round = self.game_state.current_round;
        for player in &mut self.players {
            reset_round_resources(player, round);
        }
        self.push_event(
            EventKind::RoundStart,
            format!("Round {round} begins"),
            SYSTEM_ACTOR,
            None,
            None,
        );
        Ok(())
    }

    /// Terminal transition: freeze the timer, settle scores, and record the
    /// winner.
    pub fn end_game(&mut self, reason: Option<String>) -> GameResult<()> {
        self.game_state.game_phase = GamePhase::GameOver;
        self.clear_turn_state();
        self.rescore();
        self.game_state.winner = score::determine_winner(&self.players);
        self.push_event(
            EventKind::GameEnd,
            reason.unwrap_or_else(|| "Game over".to_string()),
            SYSTEM_ACTOR,
            None,
            None,
        );
        Ok(())
    }
}
