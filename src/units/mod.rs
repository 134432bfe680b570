//! Units and projectiles: per-entity state and snapshot views

pub mod projectile;
pub mod unit;
pub mod unit_type;

pub use projectile::{Projectile, ProjectileView};
pub use unit::{Unit, UnitStatus, UnitView};
pub use unit_type::{UnitStats, UnitType};
