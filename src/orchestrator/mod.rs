//! Phase orchestration
//!
//! Sessions, pairing, combat deadlines and the `Arena` round loop that ties
//! them to one `BattleSimulation`.

pub mod arena;
pub mod clock;
pub mod pairing;
pub mod session;

pub use arena::{Arena, Outbound};
pub use clock::{ClockEvent, CombatClock, TimerPhase, Timers};
pub use pairing::make_pairs;
pub use session::{PlayerSession, PlayerView, SessionRegistry};
