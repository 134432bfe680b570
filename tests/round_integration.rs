//! Round scenarios: melee trades, timeouts, mutual destruction, economy and elimination

use hex_arena::core::config::ArenaConfig;
use hex_arena::core::types::{OwnerId, UnitId};
use hex_arena::net::{ClientMsg, ServerMsg, TileRef};
use hex_arena::orchestrator::{Arena, Outbound, TimerPhase};
use hex_arena::simulation::{BattleSimulation, MatchResult, Phase};
use hex_arena::units::{UnitStatus, UnitType};

const A: OwnerId = OwnerId(0);
const B: OwnerId = OwnerId(1);

fn long_combat() -> ArenaConfig {
    ArenaConfig {
        combat_seconds: 300,
        accel_seconds: 10,
        ..ArenaConfig::default()
    }
}

fn place(sim: &mut BattleSimulation, owner: OwnerId, unit_type: UnitType, row: i32, col: i32) -> UnitId {
    let id = sim.spawn_unit(owner, unit_type);
    sim.place_unit(owner, id, row, col).unwrap();
    id
}

/// Step until every match is settled or the deadline passes, then resolve
fn run_round(sim: &mut BattleSimulation) -> Vec<MatchResult> {
    let deadline = sim.config().deadline_ticks();
    while sim.tick() < deadline {
        if sim.step().all_resolved {
            return sim.resolve_matches(false);
        }
    }
    sim.resolve_matches(true)
}

#[test]
fn test_vanguard_melee_trade() {
    let mut sim = BattleSimulation::new(long_combat());
    let lone = place(&mut sim, A, UnitType::Vanguard, 4, 3);
    // Both mirror next to A's vanguard: (4,3) -> (3,3), (4,4) -> (3,2)
    let left = place(&mut sim, B, UnitType::Vanguard, 4, 3);
    let right = place(&mut sim, B, UnitType::Vanguard, 4, 4);
    assert!(sim.start_combat(&[(A, B)]));

    let results = run_round(&mut sim);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].winner, Some(B));
    assert_eq!(results[0].losers, vec![A]);
    assert!(!results[0].by_timeout);

    assert_eq!(sim.unit(lone).unwrap().status, UnitStatus::Dead);
    for id in [left, right] {
        assert!(sim.unit(id).unwrap().is_active());
    }
    // Melee swings never show up as visible projectiles
    assert!(sim.projectiles().iter().all(|p| !p.visible));
}

#[test]
fn test_mutual_destruction() {
    let mut sim = BattleSimulation::new(long_combat());
    let a = place(&mut sim, A, UnitType::Vanguard, 4, 3);
    let b = place(&mut sim, B, UnitType::Vanguard, 4, 3);
    sim.start_combat(&[(A, B)]);

    let results = run_round(&mut sim);
    assert_eq!(results[0].winner, None);
    assert_eq!(results[0].losers, vec![A, B]);
    assert!(!results[0].by_timeout);
    assert_eq!(sim.unit(a).unwrap().status, UnitStatus::Dead);
    assert_eq!(sim.unit(b).unwrap().status, UnitStatus::Dead);
}

#[test]
fn test_timeout_goes_to_higher_hp() {
    let config = ArenaConfig {
        combat_seconds: 1,
        accel_seconds: 0,
        ..ArenaConfig::default()
    };
    let mut sim = BattleSimulation::new(config);
    place(&mut sim, A, UnitType::Vanguard, 7, 0);
    place(&mut sim, A, UnitType::Vanguard, 7, 1);
    place(&mut sim, B, UnitType::Vanguard, 7, 6);
    sim.start_combat(&[(A, B)]);

    let results = run_round(&mut sim);
    assert_eq!(sim.tick(), 20);
    assert!(results[0].by_timeout);
    assert_eq!(results[0].winner, Some(A));
    assert_eq!(results[0].losers, vec![B]);
}

#[test]
fn test_timeout_tie_goes_to_lowest_owner() {
    let config = ArenaConfig {
        combat_seconds: 1,
        accel_seconds: 0,
        ..ArenaConfig::default()
    };
    let mut sim = BattleSimulation::new(config);
    place(&mut sim, OwnerId(3), UnitType::Vanguard, 7, 0);
    place(&mut sim, OwnerId(5), UnitType::Vanguard, 7, 0);
    sim.start_combat(&[(OwnerId(5), OwnerId(3))]);

    let results = run_round(&mut sim);
    assert!(results[0].by_timeout);
    assert_eq!(results[0].winner, Some(OwnerId(3)));
}

#[test]
fn test_sell_refund_floor() {
    for unit_type in UnitType::all() {
        let expected = (unit_type.cost() / 2).max(1);
        assert_eq!(unit_type.sell_refund(), expected);
    }
    assert_eq!(UnitType::Vanguard.sell_refund(), 1);
    assert_eq!(UnitType::Ranger.sell_refund(), 1);
    assert_eq!(UnitType::Mage.sell_refund(), 1);
}

// === Arena-level rounds ===

fn join(arena: &mut Arena) -> OwnerId {
    let (id, _) = arena.connect().unwrap();
    arena.handle(id, ClientMsg::EnterGame);
    id
}

fn buy_and_place(arena: &mut Arena, owner: OwnerId, unit_type: &str, row: i32, col: i32) -> UnitId {
    arena.handle(owner, ClientMsg::Spawn { unit_type: unit_type.into() });
    let unit_id = arena.sim().units_of(owner).map(|u| u.id).max().unwrap();
    let out = arena.handle(
        owner,
        ClientMsg::PlaceUnit {
            unit_id,
            tile: TileRef { row, col },
        },
    );
    assert!(!out.iter().any(|o| matches!(o, Outbound::To(_, ServerMsg::Error { .. }))));
    unit_id
}

fn ready_all(arena: &mut Arena, players: &[OwnerId]) {
    for &p in players {
        arena.handle(p, ClientMsg::Ready { ready: true });
    }
}

#[test]
fn test_timeout_round_through_the_arena() {
    let mut arena = Arena::new(ArenaConfig {
        combat_seconds: 1,
        accel_seconds: 1,
        seed: Some(21),
        ..ArenaConfig::default()
    });
    let a = join(&mut arena);
    let b = join(&mut arena);
    buy_and_place(&mut arena, a, "Vanguard", 7, 0);
    buy_and_place(&mut arena, b, "Vanguard", 7, 0);
    ready_all(&mut arena, &[a, b]);
    assert_eq!(arena.phase(), Phase::Combat);

    for _ in 0..20 {
        arena.advance();
    }
    assert!(arena.sim().is_accelerated());
    assert_eq!(arena.timers().phase, TimerPhase::Accelerated);

    for _ in 0..20 {
        arena.advance();
    }
    assert_eq!(arena.phase(), Phase::Placement);
    assert_eq!(arena.round(), 2);
    let result = &arena.last_results()[0];
    assert!(result.by_timeout);
    // Equal hp: the lower player id takes it
    assert_eq!(result.winner, Some(a));
    assert_eq!(arena.session(a).unwrap().health, 20);
    assert_eq!(arena.session(b).unwrap().health, 18);
}

#[test]
fn test_odd_player_sits_out_and_keeps_layout() {
    let mut arena = Arena::new(ArenaConfig {
        seed: Some(4),
        ..ArenaConfig::default()
    });
    let players: Vec<OwnerId> = (0..3).map(|_| join(&mut arena)).collect();
    let units: Vec<UnitId> = players
        .iter()
        .map(|&p| buy_and_place(&mut arena, p, "Ranger", 7, 3))
        .collect();
    ready_all(&mut arena, &players);
    assert_eq!(arena.phase(), Phase::Combat);
    assert_eq!(arena.sim().pairs().len(), 1);

    let benched: Vec<UnitId> = units
        .iter()
        .copied()
        .filter(|&id| arena.sim().unit(id).unwrap().match_id.is_none())
        .collect();
    assert_eq!(benched.len(), 1);
    assert_eq!(arena.sim().unit(benched[0]).unwrap().status, UnitStatus::Bench);

    while arena.phase() == Phase::Combat {
        arena.advance();
    }
    let unit = arena.sim().unit(benched[0]).unwrap();
    assert_eq!(unit.status, UnitStatus::Board);
    assert_eq!(unit.tile_id, unit.home_tile_id);
}

#[test]
fn test_elimination_after_repeated_losses() {
    let mut arena = Arena::new(ArenaConfig {
        player_start_health: 4,
        seed: Some(8),
        ..ArenaConfig::default()
    });
    let a = join(&mut arena);
    let b = join(&mut arena);
    buy_and_place(&mut arena, a, "Mage", 6, 3);
    arena.handle(b, ClientMsg::Spawn { unit_type: "Vanguard".into() });

    for round in 1..=2 {
        assert_eq!(arena.round(), round);
        ready_all(&mut arena, &[a, b]);
        assert_eq!(arena.phase(), Phase::Combat);
        arena.advance();
        assert_eq!(arena.phase(), Phase::Placement);
    }

    let loser = arena.session(b).unwrap();
    assert!(!loser.alive);
    assert_eq!(loser.health, 0);
    assert_eq!(arena.sim().units_of(b).count(), 0);
    assert_eq!(arena.sim().units_of(a).count(), 1);

    // A lone survivor cannot be paired
    ready_all(&mut arena, &[a, b]);
    assert_eq!(arena.phase(), Phase::Placement);
}

#[test]
fn test_disconnect_during_combat_leaves_other_matches_running() {
    let mut arena = Arena::new(ArenaConfig {
        seed: Some(2),
        ..ArenaConfig::default()
    });
    let players: Vec<OwnerId> = (0..4).map(|_| join(&mut arena)).collect();
    for &p in &players {
        buy_and_place(&mut arena, p, "Vanguard", 7, 0);
    }
    ready_all(&mut arena, &players);
    assert_eq!(arena.sim().pairs().len(), 2);
    arena.advance();

    let leaving = arena.sim().pairs()[0].top;
    let orphan = arena.sim().pairs()[0].bottom;
    let other = arena.sim().pairs()[1];
    arena.disconnect(leaving);
    assert_eq!(arena.sim().units_of(leaving).count(), 0);

    arena.advance();
    // The orphaned match is decided, but the round waits for the other one
    assert_eq!(arena.phase(), Phase::Combat);
    let snapshots = arena.sim().match_snapshots();
    assert_eq!(snapshots[&other.match_id].alive.len(), 2);
    assert!(!arena.sim().is_combat_resolved());
    assert!(arena.session(orphan).unwrap().alive);
}

#[test]
fn test_sell_only_during_placement() {
    let mut arena = Arena::new(ArenaConfig {
        seed: Some(6),
        ..ArenaConfig::default()
    });
    let a = join(&mut arena);
    let b = join(&mut arena);
    let mage = buy_and_place(&mut arena, a, "Mage", 7, 3);
    buy_and_place(&mut arena, b, "Mage", 7, 3);
    assert_eq!(arena.session(a).unwrap().gold, 7);

    ready_all(&mut arena, &[a, b]);
    let out = arena.handle(a, ClientMsg::SellUnit { unit_id: mage });
    assert!(matches!(&out[..], [Outbound::To(id, ServerMsg::Error { .. })] if *id == a));
    assert_eq!(arena.session(a).unwrap().gold, 7);

    while arena.phase() == Phase::Combat {
        arena.advance();
    }
    arena.handle(a, ClientMsg::SellUnit { unit_id: mage });
    assert_eq!(arena.session(a).unwrap().gold, 8);
    assert!(arena.sim().unit(mage).is_none());
}
