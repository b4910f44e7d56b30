use crate::error::{GameError, GameResult};
use crate::types::*;

impl Lobby {
    /// Spend a lifeline. Each of the three types is one-shot per round and
    /// every use costs a yellow indicator, a lifetime yellow violation, and
    /// the matching score counters. Trusted sourcing additionally resolves
    /// a source: the explicit argument, else the player's selection, else
    /// their first configured source.
    pub fn use_lifeline(
        &mut self,
        player_id: &str,
        kind: LifelineKind,
        selected_source: Option<String>,
        details: Option<String>,
    ) -> GameResult<()> {
        self.require_role(player_id, Role::Conversationalist)?;
        self.ensure_round_resources(player_id)?;

        let player = self.player_mut(player_id)?;
        if player.indicators.yellow == 0 {
            return Err(GameError::Exhausted(
                "no yellow indicators remaining this round".to_string(),
            ));
        }
        if player.lifelines.is_used(kind) {
            return Err(GameError::Conflict(format!(
                "the {kind} lifeline has already been used this round"
            )));
        }

        let mut resolved_source = None;
        if kind == LifelineKind::TrustedSourcing {
            let source = selected_source
                .or_else(|| player.selected_trusted_source.clone())
                .or_else(|| player.trusted_sources.first().cloned())
                .ok_or_else(|| {
                    GameError::Exhausted("no trusted source configured".to_string())
                })?;
            player.selected_trusted_source = Some(source.clone());
            resolved_source = Some(source);
        }

        player.indicators.yellow -= 1;
        player.violations.yellow += 1;
        player.score.yellow_used += 1;
        player.score.lifelines_used += 1;
        player.lifelines.mark_used(kind);
        let name = player.name.clone();
        self.rescore();

        self.push_event(
            EventKind::Lifeline,
            details.unwrap_or_else(|| format!("{name} used the {kind} lifeline")),
            player_id,
            None,
            Some(EventMetadata {
                lifeline: Some(kind),
                selected_source: resolved_source,
                ..EventMetadata::default()
            }),
        );
        Ok(())
    }

    /// Spend a green indicator, the "process/elaborate" signal. If the
    /// caller is the current speaker with a running timer, the clock stops.
    pub fn use_green_indicator(
        &mut self,
        player_id: &str,
        reason: Option<String>,
    ) -> GameResult<()> {
        self.require_role(player_id, Role::Conversationalist)?;
        self.ensure_round_resources(player_id)?;

        let player = self.player_mut(player_id)?;
        if player.indicators.green == 0 {
            return Err(GameError::Exhausted(
                "no green indicators remaining this round".to_string(),
            ));
        }
        player.indicators.green -= 1;
        player.violations.green += 1;
        player.score.green_used += 1;
        let name = player.name.clone();
        self.rescore();

        if self.game_state.speaker_id.as_deref() == Some(player_id)
            && self.game_state.is_timer_running
        {
            self.pause_turn(true)?;
        }

        self.push_event(
            EventKind::Indicator,
            reason.unwrap_or_else(|| format!("{name} raised a green indicator")),
            player_id,
            None,
            None,
        );
        Ok(())
    }
}
