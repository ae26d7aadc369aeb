//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by spawn order / entity bits)
//! - No rendering or platform dependencies

pub mod action;
pub mod collision;
pub mod obstacles;
pub mod physics;
pub mod scene;
pub mod state;
pub mod texture;
pub mod tick;
pub mod timer;

pub use action::Action;
pub use collision::{CollisionResult, Shape, shapes_collision};
pub use obstacles::{ObstaclePair, PairLayout, roll_pair, spawn_pair};
pub use physics::{Body, Contact, Physics, category};
pub use scene::{Drawable, Role, Scene};
pub use state::{GameEvent, GamePhase, GameState, Handles, Trigger};
pub use texture::Texture;
pub use tick::{TickInput, handle, tick};
pub use timer::Timer;
