//! The round loop: sessions, commands, pairing and resolution around one engine
//!
//! `Arena` is driven from a single task. Commands arrive through [`Arena::handle`]
//! between ticks and [`Arena::advance`] is called once per tick. Both return the
//! messages to send; delivery is the transport's job.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::str::FromStr;

use crate::core::config::ArenaConfig;
use crate::core::error::CommandError;
use crate::core::types::{OwnerId, Tick, UnitId};
use crate::net::protocol::{ClientMsg, ServerMsg, StatePayload};
use crate::orchestrator::clock::{ClockEvent, CombatClock, Timers};
use crate::orchestrator::pairing::make_pairs;
use crate::orchestrator::session::{PlayerSession, SessionRegistry};
use crate::simulation::{BattleSimulation, MatchResult, Phase};
use crate::units::UnitType;

/// A message and who should get it
#[derive(Debug, Clone, PartialEq)]
pub enum Outbound {
    All(ServerMsg),
    To(OwnerId, ServerMsg),
}

type CommandResult = std::result::Result<Vec<Outbound>, CommandError>;

pub struct Arena {
    config: ArenaConfig,
    sim: BattleSimulation,
    sessions: SessionRegistry,
    rng: ChaCha8Rng,
    round: u32,
    clock: Option<CombatClock>,
    idle_ticks: Tick,
    last_results: Vec<MatchResult>,
}

impl Arena {
    pub fn new(config: ArenaConfig) -> Self {
        let seed = config.seed.unwrap_or_else(rand::random);
        tracing::debug!(seed, "arena rng seeded");
        Self {
            sim: BattleSimulation::new(config.clone()),
            sessions: SessionRegistry::new(config.max_players),
            rng: ChaCha8Rng::seed_from_u64(seed),
            round: 1,
            clock: None,
            idle_ticks: 0,
            last_results: Vec::new(),
            config,
        }
    }

    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    pub fn sim(&self) -> &BattleSimulation {
        &self.sim
    }

    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    pub fn session(&self, id: OwnerId) -> Option<&PlayerSession> {
        self.sessions.get(id)
    }

    pub fn phase(&self) -> Phase {
        self.sim.phase()
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    /// Results of the most recently resolved round
    pub fn last_results(&self) -> &[MatchResult] {
        &self.last_results
    }

    // === CONNECTIONS ===

    /// Allocate the lowest free slot for a new client
    pub fn connect(&mut self) -> Result<(OwnerId, Vec<Outbound>), CommandError> {
        let id = self.sessions.next_player_id().ok_or(CommandError::ServerFull)?;
        self.sessions.insert(PlayerSession::new(id, &self.config));
        tracing::info!(player = %id, players = self.sessions.len(), "player connected");

        let out = vec![
            Outbound::To(id, ServerMsg::Welcome { player_id: id }),
            Outbound::All(self.lobby_message()),
            Outbound::All(self.state_message()),
        ];
        Ok((id, out))
    }

    /// Drop a session and every unit it owns, mid-combat included
    pub fn disconnect(&mut self, id: OwnerId) -> Vec<Outbound> {
        if self.sessions.remove(id).is_none() {
            return Vec::new();
        }
        let removed = self.sim.remove_owner_units(id);
        tracing::info!(player = %id, units_removed = removed, "player disconnected");
        vec![
            Outbound::All(self.lobby_message()),
            Outbound::All(self.state_message()),
        ]
    }

    // === COMMANDS ===

    /// Apply one client command. Rejections come back as an error to that player only.
    pub fn handle(&mut self, owner: OwnerId, msg: ClientMsg) -> Vec<Outbound> {
        let result = match msg {
            ClientMsg::Ready { ready } => self.set_ready(owner, ready),
            ClientMsg::Spawn { unit_type } => self.spawn(owner, &unit_type),
            ClientMsg::PlaceUnit { unit_id, tile } => self.place(owner, unit_id, tile.row, tile.col),
            ClientMsg::BenchUnit { unit_id } => self.bench(owner, unit_id),
            ClientMsg::SellUnit { unit_id } => self.sell(owner, unit_id),
            ClientMsg::EnterGame => self.enter_game(owner),
            ClientMsg::SetName { name } => self.set_name(owner, &name),
            ClientMsg::ForceStart => self.request_start(owner),
        };
        result.unwrap_or_else(|err| {
            tracing::debug!(player = %owner, error = %err, "command rejected");
            vec![Outbound::To(owner, ServerMsg::error(err.to_string()))]
        })
    }

    fn session_mut(&mut self, owner: OwnerId) -> Result<&mut PlayerSession, CommandError> {
        self.sessions
            .get_mut(owner)
            .ok_or(CommandError::UnknownPlayer(owner))
    }

    fn request_start(&mut self, owner: OwnerId) -> CommandResult {
        self.session_mut(owner)?;
        Ok(self.force_start())
    }

    fn set_ready(&mut self, owner: OwnerId, ready: bool) -> CommandResult {
        self.session_mut(owner)?.ready = ready;
        let mut out = vec![Outbound::All(self.lobby_message())];
        out.extend(self.maybe_start());
        Ok(out)
    }

    fn spawn(&mut self, owner: OwnerId, unit_type: &str) -> CommandResult {
        let unit_type = UnitType::from_str(unit_type)
            .map_err(|_| CommandError::UnknownUnitType(unit_type.to_string()))?;
        let session = self.session_mut(owner)?;
        if !session.alive {
            return Err(CommandError::Eliminated);
        }
        let cost = unit_type.cost();
        if session.gold < cost {
            return Err(CommandError::NotEnoughGold {
                needed: cost,
                available: session.gold,
            });
        }
        session.gold -= cost;
        self.sim.spawn_unit(owner, unit_type);
        Ok(vec![Outbound::All(self.state_message())])
    }

    fn place(&mut self, owner: OwnerId, unit_id: UnitId, row: i32, col: i32) -> CommandResult {
        self.session_mut(owner)?;
        if !self.sim.owns(owner, unit_id) {
            return Err(CommandError::NotOwner(unit_id));
        }
        self.sim.place_unit(owner, unit_id, row, col)?;
        Ok(vec![Outbound::All(self.state_message())])
    }

    fn bench(&mut self, owner: OwnerId, unit_id: UnitId) -> CommandResult {
        self.session_mut(owner)?;
        if !self.sim.owns(owner, unit_id) {
            return Err(CommandError::NotOwner(unit_id));
        }
        if self.sim.phase() != Phase::Placement {
            return Err(CommandError::CombatInProgress("bench"));
        }
        self.sim.bench_unit(owner, unit_id)?;
        Ok(vec![Outbound::All(self.state_message())])
    }

    fn sell(&mut self, owner: OwnerId, unit_id: UnitId) -> CommandResult {
        self.session_mut(owner)?;
        if self.sim.phase() != Phase::Placement {
            return Err(CommandError::CombatInProgress("sell"));
        }
        if !self.sim.owns(owner, unit_id) {
            return Err(CommandError::NotOwner(unit_id));
        }
        let unit = self
            .sim
            .remove_unit(unit_id)
            .ok_or(CommandError::NotOwner(unit_id))?;
        let refund = unit.unit_type.sell_refund();
        self.session_mut(owner)?.gold += refund;
        tracing::debug!(player = %owner, unit = %unit_id, refund, "unit sold");
        Ok(vec![Outbound::All(self.state_message())])
    }

    fn enter_game(&mut self, owner: OwnerId) -> CommandResult {
        self.session_mut(owner)?.in_game = true;
        Ok(vec![
            Outbound::All(self.lobby_message()),
            Outbound::All(self.state_message()),
        ])
    }

    fn set_name(&mut self, owner: OwnerId, name: &str) -> CommandResult {
        let max_len = self.config.max_name_len;
        let session = self.session_mut(owner)?;
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Ok(Vec::new());
        }
        session.name = trimmed.chars().take(max_len).collect();
        Ok(vec![
            Outbound::All(self.lobby_message()),
            Outbound::All(self.state_message()),
        ])
    }

    // === PHASES ===

    /// Start combat once enough players are ready and every in-game player is
    fn maybe_start(&mut self) -> Vec<Outbound> {
        if self.sim.phase() != Phase::Placement {
            return Vec::new();
        }
        if self.sessions.ready_alive().len() < self.config.min_players_to_start() {
            return Vec::new();
        }
        if !self.sessions.all_in_game_ready() {
            return Vec::new();
        }
        self.force_start()
    }

    /// Pair ready players and enter combat. Stays in placement when nobody can be paired.
    pub fn force_start(&mut self) -> Vec<Outbound> {
        if self.sim.phase() != Phase::Placement || !self.sessions.all_alive_in_game() {
            return Vec::new();
        }
        let pairs = make_pairs(&self.sessions.ready_alive(), &mut self.rng);
        if !self.sim.start_combat(&pairs) {
            tracing::debug!("no pairs available, staying in placement");
            return Vec::new();
        }
        self.clock = Some(CombatClock::start(&self.config));
        tracing::info!(round = self.round, pairs = ?pairs, "round started");
        vec![Outbound::All(self.state_message())]
    }

    /// One scheduler tick
    ///
    /// Combat: step the engine, broadcast, then check the deadline, early
    /// resolution and acceleration in that order. Placement: periodic idle
    /// broadcasts only.
    pub fn advance(&mut self) -> Vec<Outbound> {
        match self.sim.phase() {
            Phase::Combat => self.advance_combat(),
            Phase::Placement => {
                self.idle_ticks += 1;
                if self.idle_ticks < self.config.idle_broadcast_ticks() {
                    return Vec::new();
                }
                self.idle_ticks = 0;
                vec![
                    Outbound::All(self.lobby_message()),
                    Outbound::All(self.state_message()),
                ]
            }
        }
    }

    fn advance_combat(&mut self) -> Vec<Outbound> {
        let outcome = self.sim.step();
        let mut out = vec![Outbound::All(self.state_message())];

        let event = match self.clock.as_mut() {
            Some(clock) => clock.check(outcome.tick),
            None => ClockEvent::Deadline,
        };
        // Every tagged unit may be gone after disconnects
        let nothing_left = self.sim.match_snapshots().is_empty();

        if event == ClockEvent::Deadline {
            out.extend(self.resolve(true));
        } else if outcome.all_resolved || nothing_left {
            out.extend(self.resolve(false));
        } else if event == ClockEvent::Accelerate {
            self.sim.set_accelerated(true);
            tracing::info!(tick = outcome.tick, "combat accelerated");
            out.push(Outbound::All(self.state_message()));
        }
        out
    }

    /// Score the round, apply health losses and return to placement
    fn resolve(&mut self, forced: bool) -> Vec<Outbound> {
        let results = self.sim.resolve_matches(forced);
        let penalty = self.config.loss_health_penalty;

        for result in &results {
            tracing::info!(
                round = self.round,
                match_id = %result.match_id.0,
                winner = ?result.winner,
                losers = ?result.losers,
                by_timeout = result.by_timeout,
                "match resolved"
            );
            for &loser in &result.losers {
                let Some(session) = self.sessions.get_mut(loser) else {
                    continue;
                };
                if session.apply_loss(penalty) {
                    let removed = self.sim.remove_owner_units(loser);
                    tracing::info!(player = %loser, units_removed = removed, "player eliminated");
                }
            }
        }

        self.sim.end_combat();
        self.clock = None;
        self.idle_ticks = 0;
        self.sessions.clear_ready();
        self.round += 1;
        self.last_results = results;

        vec![
            Outbound::All(self.state_message()),
            Outbound::All(self.lobby_message()),
        ]
    }

    // === MESSAGES ===

    pub fn timers(&self) -> Timers {
        match &self.clock {
            Some(clock) if self.sim.phase() == Phase::Combat => clock.timers(self.sim.tick()),
            _ => CombatClock::placement_timers(&self.config),
        }
    }

    pub fn state_message(&self) -> ServerMsg {
        ServerMsg::State(Box::new(StatePayload {
            snapshot: self.sim.snapshot(),
            players: self.sessions.views(),
            timers: self.timers(),
            round: self.round,
        }))
    }

    pub fn lobby_message(&self) -> ServerMsg {
        ServerMsg::Lobby {
            players: self.sessions.views(),
            phase: self.sim.phase(),
            timers: self.timers(),
            round: self.round,
        }
    }
}
