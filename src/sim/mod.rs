//! Two-puck simulation module
//!
//! All physics lives here. This module must stay deterministic for a seed:
//! - One unit step per frame
//! - Seeded RNG only (restitution draws and mass variation)
//! - No rendering or platform dependencies

pub mod collision;
pub mod state;
pub mod tick;

pub use collision::{detect, reflect_off_walls, resolve_collision};
pub use state::{Body, Capture, CollisionMode, Restitution, Simulation, SparkDot};
pub use tick::step;
