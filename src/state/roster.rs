use crate::error::{GameError, GameResult};
use crate::types::*;

impl Lobby {
    /// Add a player to the roster. Re-joining with a known id is a no-op,
    /// so reconnecting clients can replay the join safely.
    pub fn join_player(&mut self, id: PlayerId, name: String) -> GameResult<()> {
        if self.players.iter().any(|p| p.id == id) {
            return Ok(());
        }
        if self.game_started {
            return Err(GameError::Conflict("game has already started".to_string()));
        }
        if self.players.len() >= MAX_PLAYERS {
            return Err(GameError::Conflict("lobby is full".to_string()));
        }
        let round = self.game_state.current_round;
        self.players.push(Player::new(id, name, round));
        Ok(())
    }

    /// Idempotent add to the spectator list
    pub fn join_viewer(&mut self, id: ViewerId, name: String) {
        if !self.viewers.iter().any(|v| v.id == id) {
            self.viewers.push(Viewer { id, name });
        }
    }

    /// Add a bot player with a generated display name, optionally holding a
    /// role. Exclusivity is checked before the roster changes.
    pub fn add_bot(&mut self, role: Option<Role>) -> GameResult<Player> {
        if self.players.len() >= MAX_PLAYERS {
            return Err(GameError::Conflict("lobby is full".to_string()));
        }
        if let Some(r) = role {
            if r.is_exclusive() && self.players.iter().any(|p| p.role == Some(r)) {
                return Err(GameError::Conflict(format!(
                    "the {r} role is already taken"
                )));
            }
        }
        let name = petname::petname(2, " ").unwrap_or_else(|| "bot".to_string());
        let mut bot = Player::new(
            ulid::Ulid::new().to_string(),
            name,
            self.game_state.current_round,
        );
        bot.role = role;
        self.players.push(bot.clone());
        self.rescore();
        Ok(bot)
    }

    /// Assign, change, or clear a player's role. Referee and Time Keeper
    /// are each exclusive: assigning one that a *different* player holds
    /// fails, re-assigning to its current holder is a no-op success.
    pub fn set_role(&mut self, player_id: &str, role: Option<Role>) -> GameResult<()> {
        self.player(player_id)?;
        if let Some(r) = role {
            if r.is_exclusive()
                && self
                    .players
                    .iter()
                    .any(|p| p.role == Some(r) && p.id != player_id)
            {
                return Err(GameError::Conflict(format!(
                    "the {r} role is already taken"
                )));
            }
        }
        self.player_mut(player_id)?.role = role;
        // The Conversationalist cohort may have changed, which moves the
        // efficiency bonus
        self.rescore();
        Ok(())
    }

    /// Remove a player. If they were the active speaker the turn state is
    /// forcibly cleared, and remaining players are rescored since the
    /// efficiency-bonus cohort shrank.
    pub fn remove_player(&mut self, player_id: &str) -> GameResult<()> {
        let idx = self
            .players
            .iter()
            .position(|p| p.id == player_id)
            .ok_or_else(|| GameError::NotFound(format!("player '{player_id}'")))?;
        self.players.remove(idx);

        if self.game_state.speaker_id.as_deref() == Some(player_id) {
            self.clear_turn_state();
        }
        self.rescore();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lobby() -> Lobby {
        Lobby::create(
            "TEST1".to_string(),
            LobbySettings::default(),
            "host".to_string(),
            "Host".to_string(),
        )
    }

    #[test]
    fn test_join_is_idempotent() {
        let mut lobby = lobby();
        lobby.join_player("p2".to_string(), "Bea".to_string()).unwrap();
        lobby.join_player("p2".to_string(), "Bea".to_string()).unwrap();
        assert_eq!(lobby.players.len(), 2);
    }

    #[test]
    fn test_join_after_start_rejected_but_rejoin_allowed() {
        let mut lobby = lobby();
        lobby.join_player("p2".to_string(), "Bea".to_string()).unwrap();
        lobby.start_game().unwrap();

        let err = lobby
            .join_player("p3".to_string(), "Cal".to_string())
            .unwrap_err();
        assert!(matches!(err, GameError::Conflict(_)));

        // Known id still no-ops after start
        lobby.join_player("p2".to_string(), "Bea".to_string()).unwrap();
        assert_eq!(lobby.players.len(), 2);
    }

    #[test]
    fn test_lobby_capacity() {
        let mut lobby = lobby();
        for i in 2..=MAX_PLAYERS {
            lobby
                .join_player(format!("p{i}"), format!("Player {i}"))
                .unwrap();
        }
        let err = lobby
            .join_player("overflow".to_string(), "Too Many".to_string())
            .unwrap_err();
        assert!(matches!(err, GameError::Conflict(_)));
    }

    #[test]
    fn test_join_viewer_idempotent() {
        let mut lobby = lobby();
        lobby.join_viewer("v1".to_string(), "Watcher".to_string());
        lobby.join_viewer("v1".to_string(), "Watcher".to_string());
        assert_eq!(lobby.viewers.len(), 1);
    }

    #[test]
    fn test_role_exclusivity() {
        let mut lobby = lobby();
        lobby.join_player("p2".to_string(), "Bea".to_string()).unwrap();

        lobby.set_role("host", Some(Role::Referee)).unwrap();
        let err = lobby.set_role("p2", Some(Role::Referee)).unwrap_err();
        assert!(matches!(err, GameError::Conflict(_)));

        // Re-assigning the same role to its holder is a no-op success
        lobby.set_role("host", Some(Role::Referee)).unwrap();

        // Clearing frees the role
        lobby.set_role("host", None).unwrap();
        lobby.set_role("p2", Some(Role::Referee)).unwrap();
    }

    #[test]
    fn test_conversationalist_is_unrestricted() {
        let mut lobby = lobby();
        lobby.join_player("p2".to_string(), "Bea".to_string()).unwrap();
        lobby.set_role("host", Some(Role::Conversationalist)).unwrap();
        lobby.set_role("p2", Some(Role::Conversationalist)).unwrap();
    }

    #[test]
    fn test_add_bot_respects_exclusivity() {
        let mut lobby = lobby();
        lobby.set_role("host", Some(Role::TimeKeeper)).unwrap();

        let err = lobby.add_bot(Some(Role::TimeKeeper)).unwrap_err();
        assert!(matches!(err, GameError::Conflict(_)));

        let bot = lobby.add_bot(Some(Role::Conversationalist)).unwrap();
        assert!(!bot.name.is_empty());
        assert_eq!(bot.role, Some(Role::Conversationalist));
        assert_eq!(lobby.players.len(), 2);
    }

    #[test]
    fn test_remove_speaker_clears_turn_state() {
        let mut lobby = lobby();
        lobby.join_player("p2".to_string(), "Bea".to_string()).unwrap();
        lobby.start_game().unwrap();
        lobby.start_turn("p2").unwrap();

        lobby.remove_player("p2").unwrap();

        assert!(lobby.game_state.speaker_id.is_none());
        assert!(!lobby.game_state.is_timer_running);
        assert!(lobby.game_state.active_section.is_none());
        assert_eq!(lobby.players.len(), 1);
    }

    #[test]
    fn test_remove_player_rescores_survivors() {
        let mut lobby = lobby();
        lobby.join_player("p2".to_string(), "Bea".to_string()).unwrap();
        lobby.set_role("host", Some(Role::Conversationalist)).unwrap();
        lobby.set_role("p2", Some(Role::Conversationalist)).unwrap();
        lobby.players[0].score.replies = 5;
        lobby.players[1].score.replies = 1;
        lobby.rescore();
        assert_eq!(lobby.players[0].score.efficiency_bonus, 0);

        lobby.remove_player("p2").unwrap();

        // Host is now the sole Conversationalist and takes the +5
        assert_eq!(lobby.players[0].score.efficiency_bonus, 5);
    }

    #[test]
    fn test_remove_unknown_player() {
        let mut lobby = lobby();
        let err = lobby.remove_player("ghost").unwrap_err();
        assert!(matches!(err, GameError::NotFound(_)));
    }
}
