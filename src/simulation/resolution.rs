//! Round resolution queries
//!
//! Outcomes are decided from a per-match snapshot of which owners still have
//! living board units and how much hp they have left.

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::core::types::{MatchId, OwnerId};
use crate::simulation::engine::{BattleSimulation, MatchPair};

/// Survivors and hp totals for one match
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchSnapshot {
    /// Owners with at least one living board unit
    pub alive: BTreeSet<OwnerId>,
    /// Remaining hp of living board units per owner. Zero for wiped owners.
    pub hp_totals: BTreeMap<OwnerId, f32>,
    /// Everyone taking part, including owners with no units left
    pub participants: BTreeSet<OwnerId>,
}

/// How a match ended
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub match_id: MatchId,
    /// `None` on mutual destruction
    pub winner: Option<OwnerId>,
    pub losers: Vec<OwnerId>,
    /// Decided by the hp tiebreak after the deadline
    pub by_timeout: bool,
}

impl BattleSimulation {
    /// Snapshot every match that has at least one tagged unit
    pub fn match_snapshots(&self) -> BTreeMap<MatchId, MatchSnapshot> {
        let mut snapshots: BTreeMap<MatchId, MatchSnapshot> = BTreeMap::new();
        for unit in self.units.values() {
            let Some(match_id) = unit.match_id else {
                continue;
            };
            let snap = snapshots.entry(match_id).or_default();
            snap.participants.insert(unit.owner);
            let total = snap.hp_totals.entry(unit.owner).or_insert(0.0);
            if unit.is_active() {
                snap.alive.insert(unit.owner);
                *total += unit.hp.max(0.0);
            }
        }
        snapshots
    }

    /// True when every match has at most one owner left standing
    pub fn is_combat_resolved(&self) -> bool {
        let snapshots = self.match_snapshots();
        !snapshots.is_empty() && snapshots.values().all(|s| s.alive.len() <= 1)
    }

    /// Decide every match of the current round
    pub fn resolve_matches(&self, forced: bool) -> Vec<MatchResult> {
        let snapshots = self.match_snapshots();
        self.pairs
            .iter()
            .filter_map(|pair| {
                let snapshot = snapshots.get(&pair.match_id)?;
                decide_match(pair, snapshot, forced)
            })
            .collect()
    }
}

/// Outcome of one match, or `None` if it is still undecided and not forced
///
/// Both paired owners always count as participants. On a forced timeout with
/// several survivors the highest hp total wins; equal totals go to the lowest
/// owner id.
pub fn decide_match(pair: &MatchPair, snapshot: &MatchSnapshot, forced: bool) -> Option<MatchResult> {
    let mut participants = snapshot.participants.clone();
    participants.insert(pair.bottom);
    participants.insert(pair.top);

    let losers_except = |winner: Option<OwnerId>| -> Vec<OwnerId> {
        participants.iter().copied().filter(|&p| Some(p) != winner).collect()
    };

    match snapshot.alive.len() {
        0 => Some(MatchResult {
            match_id: pair.match_id,
            winner: None,
            losers: losers_except(None),
            by_timeout: false,
        }),
        1 => {
            let winner = snapshot.alive.iter().next().copied();
            Some(MatchResult {
                match_id: pair.match_id,
                winner,
                losers: losers_except(winner),
                by_timeout: false,
            })
        }
        _ if forced => {
            let winner = participants
                .iter()
                .map(|&p| (p, snapshot.hp_totals.get(&p).copied().unwrap_or(0.0)))
                .max_by(|a, b| OrderedFloat(a.1).cmp(&OrderedFloat(b.1)).then(b.0.cmp(&a.0)))
                .map(|(owner, _)| owner);
            Some(MatchResult {
                match_id: pair.match_id,
                winner,
                losers: losers_except(winner),
                by_timeout: true,
            })
        }
        _ => None,
    }
}
