//! Hex Arena - authoritative server for a multiplayer hex-grid auto-battler
//!
//! Players buy units, arrange them on their half of a hex board, and are
//! paired each round into mirrored matches that play out tick by tick.

pub mod board;
pub mod core;
pub mod net;
pub mod orchestrator;
pub mod simulation;
pub mod units;
