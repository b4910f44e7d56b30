use crate::error::GameResult;
use crate::types::*;
use chrono::Utc;

impl Lobby {
    /// Open a speaking turn: full time budget, running timer, and a fresh
    /// in-progress section for the speaker.
    pub fn start_turn(&mut self, speaker_id: &str) -> GameResult<()> {
        let speaker_name = self.player(speaker_id)?.name.clone();
        let now = Utc::now();

        let gs = &mut self.game_state;
        gs.speaker_id = Some(speaker_id.to_string());
        gs.turn_remaining_seconds = f64::from(self.settings.turn_seconds);
        gs.is_timer_running = true;
        gs.turn_start_time = Some(now);
        gs.active_section = Some(ActiveSection {
            id: ulid::Ulid::new().to_string(),
            speaker_id: speaker_id.to_string(),
            started_at: now,
        });

        self.push_event(
            EventKind::TurnStart,
            format!("{speaker_name} takes the floor"),
            speaker_id,
            None,
            None,
        );
        Ok(())
    }

    /// Close the current turn. Archives the open section (if any) with its
    /// wall-clock duration, then clears all timer and speaker state.
    /// Safe to call when no turn is active.
    pub fn end_turn(&mut self) -> GameResult<()> {
        if let Some(section) = self.game_state.active_section.take() {
            let now = Utc::now();
            let duration_seconds =
                ((now - section.started_at).num_milliseconds() as f64 / 1000.0).max(0.0);

            let sections = &mut self.game_state.sections;
            if sections.len() >= SECTION_CAP {
                sections.remove(0);
            }
            sections.push(TimelineSection {
                id: section.id,
                speaker_id: section.speaker_id.clone(),
                started_at: section.started_at,
                ended_at: now,
                duration_seconds,
                summary: None,
            });

            self.push_event(
                EventKind::TurnEnd,
                "Turn ended".to_string(),
                section.speaker_id,
                None,
                None,
            );
        }
        self.clear_turn_state();
        Ok(())
    }

    /// Pause or resume the turn timer.
    ///
    /// Pausing freezes the remaining seconds at
    /// `max(0, remaining - elapsed_since_start)`; resuming restamps the
    /// start time and counts down from the frozen value. Remaining time
    /// only ever decreases from real elapsed wall-clock while running, and
    /// never while paused. Both directions no-op when already in the
    /// requested state; resuming a fully expired timer also no-ops.
    pub fn pause_turn(&mut self, pause: bool) -> GameResult<()> {
        let gs = &mut self.game_state;
        if pause {
            if !gs.is_timer_running {
                return Ok(());
            }
            let elapsed = gs
                .turn_start_time
                .map(|start| (Utc::now() - start).num_milliseconds() as f64 / 1000.0)
                .unwrap_or(0.0);
            gs.turn_remaining_seconds = (gs.turn_remaining_seconds - elapsed).max(0.0);
            gs.turn_start_time = None;
            gs.is_timer_running = false;
        } else {
            if gs.is_timer_running || gs.turn_remaining_seconds <= 0.0 {
                return Ok(());
            }
            gs.turn_start_time = Some(Utc::now());
            gs.is_timer_running = true;
        }
        Ok(())
    }
}
