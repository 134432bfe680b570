//! Engine integration tests: placement, mirroring, targeting and termination

use hex_arena::board::{TileId, TileSide};
use hex_arena::core::config::ArenaConfig;
use hex_arena::core::error::PlacementError;
use hex_arena::core::types::{OwnerId, UnitId};
use hex_arena::simulation::{BattleSimulation, Phase, PlacementRule};
use hex_arena::units::{UnitStatus, UnitType};

const A: OwnerId = OwnerId(0);
const B: OwnerId = OwnerId(1);

fn sim() -> BattleSimulation {
    BattleSimulation::new(ArenaConfig::default())
}

fn place(sim: &mut BattleSimulation, owner: OwnerId, unit_type: UnitType, row: i32, col: i32) -> UnitId {
    let id = sim.spawn_unit(owner, unit_type);
    sim.place_unit(owner, id, row, col).unwrap();
    id
}

#[test]
fn test_rejected_placement_leaves_state_unchanged() {
    let mut sim = sim();
    let placed = place(&mut sim, A, UnitType::Vanguard, 5, 2);
    let benched = sim.spawn_unit(A, UnitType::Ranger);
    let foreign = place(&mut sim, B, UnitType::Mage, 6, 6);

    let before = sim.snapshot();
    let occupancy_before = sim.occupancy().clone();

    let attempts = [
        (A, benched, 5, 2),   // occupied by own unit
        (A, benched, 0, 0),   // enemy side
        (A, benched, 8, 3),   // bench row
        (A, benched, 99, 99), // no such tile
        (A, foreign, 4, 4),   // not the owner
        (A, UnitId(999), 4, 4),
    ];
    for (owner, unit, row, col) in attempts {
        assert!(sim.place_unit(owner, unit, row, col).is_err());
    }

    assert_eq!(sim.snapshot(), before);
    assert_eq!(sim.occupancy(), &occupancy_before);
    assert_eq!(sim.unit(placed).unwrap().tile_id, Some(TileId::new(5, 2)));
}

#[test]
fn test_placement_closed_during_combat() {
    let mut sim = sim();
    let a = place(&mut sim, A, UnitType::Ranger, 7, 0);
    place(&mut sim, B, UnitType::Ranger, 7, 0);
    assert!(sim.start_combat(&[(A, B)]));

    let before = sim.snapshot();
    assert_eq!(sim.place_unit(A, a, 6, 0), Err(PlacementError::WrongPhase));
    assert_eq!(sim.bench_unit(A, a), Err(PlacementError::WrongPhase));
    assert_eq!(sim.snapshot(), before);
}

#[test]
fn test_mirror_round_trip_every_tile() {
    let sim = sim();
    let board = sim.board();
    for tile in board.tiles() {
        match tile.side {
            TileSide::Friendly | TileSide::Enemy => {
                let other = tile.side.opposite();
                let there = board.mirror(tile, other).unwrap();
                assert_eq!(there.side, other);
                let back = board.mirror(there, tile.side).unwrap();
                assert_eq!(back.id, tile.id);
            }
            _ => assert_eq!(board.mirror(tile, TileSide::Enemy).unwrap().id, tile.id),
        }
    }
}

#[test]
fn test_mirror_collision_falls_back_to_top_back_line() {
    let mut sim = sim();
    place(&mut sim, A, UnitType::Vanguard, 7, 0);
    // B parks one unit on (0,6) directly, then homes another on (7,0), whose mirror is (0,6)
    let squatter = sim.spawn_unit(B, UnitType::Ranger);
    sim.place_unit_with(B, squatter, 0, 6, PlacementRule::AllowEnemy).unwrap();
    let mirrored = place(&mut sim, B, UnitType::Vanguard, 7, 0);

    sim.prepare_pairs(&[(A, B)]);

    assert_eq!(sim.unit(squatter).unwrap().tile_id, Some(TileId::new(0, 6)));
    assert_eq!(sim.unit(mirrored).unwrap().tile_id, Some(TileId::new(0, 0)));
    assert_eq!(sim.unit(mirrored).unwrap().status, UnitStatus::Board);
    assert_eq!(sim.occupancy().get(TileId::new(0, 6), B), Some(squatter));
    assert_eq!(sim.occupancy().get(TileId::new(0, 0), B), Some(mirrored));

    // The override unit has no home and goes back to the bench afterwards
    sim.restore_home_positions();
    assert_eq!(sim.unit(squatter).unwrap().status, UnitStatus::Bench);
    assert_eq!(sim.unit(mirrored).unwrap().tile_id, Some(TileId::new(7, 0)));
}

#[test]
fn test_occupancy_matches_units_through_a_round() {
    let mut sim = sim();
    for (col, unit_type) in [(0, UnitType::Vanguard), (3, UnitType::Ranger), (6, UnitType::Mage)] {
        place(&mut sim, A, unit_type, 6, col);
        place(&mut sim, B, unit_type, 5, col);
    }
    place(&mut sim, OwnerId(2), UnitType::Mage, 4, 4);

    let check = |sim: &BattleSimulation| {
        for unit in sim.units() {
            if let Some(tile) = unit.tile_id {
                assert_eq!(sim.occupancy().get(tile, unit.owner), Some(unit.id));
            }
        }
        for (tile, owner, id) in sim.occupancy().iter() {
            let unit = sim.unit(id).unwrap();
            assert_eq!((unit.tile_id, unit.owner), (Some(tile), owner));
        }
    };

    check(&sim);
    sim.start_combat(&[(A, B)]);
    check(&sim);
    for _ in 0..50 {
        sim.step();
    }
    check(&sim);
    sim.end_combat();
    check(&sim);
    assert_eq!(sim.occupancy().len(), 7);
}

#[test]
fn test_sitting_out_owner_returns_home() {
    let mut sim = sim();
    place(&mut sim, A, UnitType::Ranger, 6, 1);
    place(&mut sim, B, UnitType::Ranger, 6, 1);
    let idle = place(&mut sim, OwnerId(2), UnitType::Mage, 5, 5);

    sim.start_combat(&[(A, B)]);
    let unit = sim.unit(idle).unwrap();
    assert_eq!(unit.status, UnitStatus::Bench);
    assert_eq!(unit.match_id, None);
    assert_eq!(unit.home_tile_id, Some(TileId::new(5, 5)));

    sim.end_combat();
    assert_eq!(sim.unit(idle).unwrap().tile_id, Some(TileId::new(5, 5)));
}

#[test]
fn test_targeting_is_deterministic() {
    let mut first = sim();
    for (row, col) in [(7, 1), (6, 3), (5, 5)] {
        place(&mut first, A, UnitType::Mage, row, col);
        place(&mut first, B, UnitType::Ranger, row, col);
    }
    place(&mut first, A, UnitType::Vanguard, 4, 3);
    place(&mut first, B, UnitType::Vanguard, 4, 3);
    let mut second = first.clone();

    first.start_combat(&[(A, B)]);
    second.start_combat(&[(A, B)]);
    for _ in 0..300 {
        let a = first.step();
        let b = second.step();
        assert_eq!(a, b);
        assert_eq!(first.snapshot(), second.snapshot());
    }
}

/// Upper bound on ticks for `attacker` to kill `defender` from `distance` apart
///
/// Walk into range, land enough hits at the normal attack cadence, plus the
/// flight time of the last shot. In a duel both units only ever close in, so
/// the gap never grows.
fn kill_bound(config: &ArenaConfig, attacker: UnitType, defender: UnitType, distance: f32) -> u64 {
    let a = attacker.stats();
    let step = a.speed * config.speed_scale();
    let approach = ((distance - a.range).max(0.0) / step).ceil() as u64 + 1;
    let hits = (defender.stats().hp / a.damage).ceil() as u64;
    let firing = hits * u64::from(config.attack_delay_ticks);
    let flight = (a.range / config.projectile_speed()).ceil() as u64 + 2;
    approach + firing + flight
}

#[test]
fn test_combat_kills_within_bound() {
    let config = ArenaConfig {
        combat_seconds: 600,
        ..ArenaConfig::default()
    };
    let duels = [
        // (4,3) mirrors to (3,3): one hex apart, just outside melee range
        (UnitType::Vanguard, (4, 3), UnitType::Vanguard, (4, 3)),
        (UnitType::Ranger, (7, 0), UnitType::Mage, (7, 3)),
        (UnitType::Mage, (6, 2), UnitType::Vanguard, (7, 6)),
    ];

    for (a_type, (a_row, a_col), b_type, (b_row, b_col)) in duels {
        let mut sim = BattleSimulation::new(config.clone());
        let a = place(&mut sim, A, a_type, a_row, a_col);
        let b = place(&mut sim, B, b_type, b_row, b_col);
        assert!(sim.start_combat(&[(A, B)]));

        let distance = sim.unit(a).unwrap().position.distance(&sim.unit(b).unwrap().position);
        let bound = kill_bound(&config, a_type, b_type, distance)
            .min(kill_bound(&config, b_type, a_type, distance));
        assert!(bound < config.combat_ticks(), "{a_type} vs {b_type}: bound {bound}");

        while sim.tick() < bound && sim.units().all(|u| u.hp > 0.0) {
            sim.step();
        }
        assert!(
            sim.units().any(|u| u.hp <= 0.0),
            "{a_type} vs {b_type}: nobody died within {bound} ticks"
        );

        let results = sim.resolve_matches(false);
        assert_eq!(results.len(), 1);
        assert!(!results[0].by_timeout);
        sim.end_combat();
        assert_eq!(sim.phase(), Phase::Placement);
    }
}

#[test]
fn test_zero_pairs_is_a_no_op() {
    let mut sim = sim();
    let a = place(&mut sim, A, UnitType::Ranger, 6, 1);
    let before = sim.snapshot();
    assert!(!sim.start_combat(&[]));
    assert_eq!(sim.snapshot(), before);
    assert_eq!(sim.unit(a).unwrap().match_id, None);
}
