//! Per-player session state
//!
//! Only what the round loop needs: identity, name, ready/alive flags, health
//! and gold. Connection handles live in the transport layer.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::core::config::ArenaConfig;
use crate::core::types::OwnerId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerSession {
    pub id: OwnerId,
    pub name: String,
    pub ready: bool,
    pub alive: bool,
    pub health: i32,
    pub gold: u32,
    /// Left the lobby screen and joined the board
    pub in_game: bool,
}

impl PlayerSession {
    pub fn new(id: OwnerId, config: &ArenaConfig) -> Self {
        Self {
            id,
            name: format!("Player{}", id.0 + 1),
            ready: false,
            alive: true,
            health: config.player_start_health,
            gold: config.starting_gold,
            in_game: false,
        }
    }

    /// Lose a round. Returns true if this eliminated the player.
    pub fn apply_loss(&mut self, penalty: i32) -> bool {
        if !self.alive {
            return false;
        }
        self.health -= penalty;
        if self.health <= 0 {
            self.alive = false;
            self.ready = false;
            return true;
        }
        false
    }

    pub fn to_view(&self) -> PlayerView {
        PlayerView {
            id: self.id,
            ready: self.ready,
            name: self.name.clone(),
            health: self.health,
            alive: self.alive,
            gold: self.gold,
            in_game: self.in_game,
        }
    }
}

/// Serialized player row for lobby and state broadcasts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerView {
    pub id: OwnerId,
    pub ready: bool,
    pub name: String,
    pub health: i32,
    pub alive: bool,
    pub gold: u32,
    pub in_game: bool,
}

/// Connected players keyed by slot id
#[derive(Debug, Clone, Default)]
pub struct SessionRegistry {
    sessions: BTreeMap<OwnerId, PlayerSession>,
    capacity: usize,
}

impl SessionRegistry {
    pub fn new(capacity: usize) -> Self {
        Self {
            sessions: BTreeMap::new(),
            capacity,
        }
    }

    /// Lowest free slot, or `None` when full
    pub fn next_player_id(&self) -> Option<OwnerId> {
        (0..self.capacity as i32)
            .map(OwnerId)
            .find(|id| !self.sessions.contains_key(id))
    }

    pub fn insert(&mut self, session: PlayerSession) {
        self.sessions.insert(session.id, session);
    }

    pub fn remove(&mut self, id: OwnerId) -> Option<PlayerSession> {
        self.sessions.remove(&id)
    }

    pub fn get(&self, id: OwnerId) -> Option<&PlayerSession> {
        self.sessions.get(&id)
    }

    pub fn get_mut(&mut self, id: OwnerId) -> Option<&mut PlayerSession> {
        self.sessions.get_mut(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlayerSession> {
        self.sessions.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut PlayerSession> {
        self.sessions.values_mut()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Alive players who are ready, in slot order
    pub fn ready_alive(&self) -> Vec<OwnerId> {
        self.iter().filter(|s| s.ready && s.alive).map(|s| s.id).collect()
    }

    /// Every alive player has entered the game (and at least one is alive)
    pub fn all_alive_in_game(&self) -> bool {
        let mut alive = self.iter().filter(|s| s.alive).peekable();
        alive.peek().is_some() && alive.all(|s| s.in_game)
    }

    /// Every alive in-game player is ready (and at least one exists)
    pub fn all_in_game_ready(&self) -> bool {
        let mut active = self.iter().filter(|s| s.alive && s.in_game).peekable();
        active.peek().is_some() && active.all(|s| s.ready)
    }

    pub fn clear_ready(&mut self) {
        for session in self.iter_mut() {
            session.ready = false;
        }
    }

    pub fn views(&self) -> Vec<PlayerView> {
        self.iter().map(|s| s.to_view()).collect()
    }
}
