mod audio;
mod game;
mod lifeline;
mod moderation;
mod question;
mod roster;
pub mod sanitize;
mod score;
mod timeline;
mod turn;

use crate::error::{GameError, GameResult};
use crate::types::*;
use rand::Rng;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Safe character set for lobby codes (excludes 0/O, 1/I/L to avoid confusion)
const CODE_CHARS: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";
const CODE_LENGTH: usize = 5;

/// Lobbies are reclaimed this long after creation, regardless of activity
pub const LOBBY_TTL_HOURS: i64 = 2;

/// How often the background sweep looks for expired lobbies
const SWEEP_INTERVAL_SECS: u64 = 300;

/// Generate a random shareable lobby code (5 characters)
fn generate_code() -> String {
    let mut rng = rand::rng();
    (0..CODE_LENGTH)
        .map(|_| CODE_CHARS[rng.random_range(0..CODE_CHARS.len())] as char)
        .collect()
}

/// Shared application state: every live lobby, keyed by its code.
///
/// Mutations never run against the stored value directly. `with_lobby`
/// hands the mutation closure a detached clone and commits it only on
/// success, so a failed validation can never leave a half-written lobby.
#[derive(Clone)]
pub struct AppState {
    lobbies: Arc<RwLock<HashMap<LobbyCode, Lobby>>>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            lobbies: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Create a lobby under a fresh code (collision-checked against live
    /// codes) with the host as its first player
    pub async fn create_lobby(
        &self,
        settings: LobbySettings,
        host_id: PlayerId,
        host_name: String,
    ) -> Lobby {
        let mut lobbies = self.lobbies.write().await;
        let code = loop {
            let code = generate_code();
            if !lobbies.contains_key(&code) {
                break code;
            }
            // Collision - try again (extremely rare with 28M combinations)
        };
        let lobby = Lobby::create(code.clone(), settings, host_id, host_name);
        lobbies.insert(code, lobby.clone());
        lobby
    }

    /// Detached snapshot of a lobby for reads
    pub async fn lobby(&self, code: &str) -> GameResult<Lobby> {
        self.lobbies
            .read()
            .await
            .get(code)
            .cloned()
            .ok_or_else(|| GameError::NotFound(format!("lobby '{code}'")))
    }

    /// Run a mutation against an exclusive clone of the lobby and commit
    /// the result atomically. The closure's error is returned as-is and
    /// leaves the stored snapshot untouched.
    pub async fn with_lobby<T>(
        &self,
        code: &str,
        mutate: impl FnOnce(&mut Lobby) -> GameResult<T>,
    ) -> GameResult<T> {
        let mut lobbies = self.lobbies.write().await;
        let stored = lobbies
            .get(code)
            .ok_or_else(|| GameError::NotFound(format!("lobby '{code}'")))?;
        let mut draft = stored.clone();
        let result = mutate(&mut draft)?;
        lobbies.insert(code.to_string(), draft);
        Ok(result)
    }

    /// Public lobbies still waiting for players, for the join screen
    pub async fn open_lobbies(&self) -> Vec<Lobby> {
        self.lobbies
            .read()
            .await
            .values()
            .filter(|l| l.settings.public && !l.game_started)
            .cloned()
            .collect()
    }

    /// Drop every lobby past the TTL. Returns how many were removed.
    pub async fn evict_expired(&self) -> usize {
        let cutoff = chrono::Utc::now() - chrono::Duration::hours(LOBBY_TTL_HOURS);
        let mut lobbies = self.lobbies.write().await;
        let before = lobbies.len();
        lobbies.retain(|_, lobby| lobby.created_at > cutoff);
        before - lobbies.len()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

/// Spawn the background task that reclaims idle lobbies
pub fn spawn_eviction_sweeper(state: AppState) {
    tokio::spawn(async move {
        let mut interval =
            tokio::time::interval(std::time::Duration::from_secs(SWEEP_INTERVAL_SECS));
        loop {
            interval.tick().await;
            let evicted = state.evict_expired().await;
            if evicted > 0 {
                tracing::info!("Evicted {} expired lobbies", evicted);
            }
        }
    });
}
