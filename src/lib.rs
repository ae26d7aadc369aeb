//! Flappy Dragon - a side-scrolling flap-through-the-gaps arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (scene arena, physics, game loop controller)
//! - `session`: Fixed-timestep driver between the frame clock and the simulation
//! - `renderer`: WebGPU rendering pipeline
//! - `audio`: Sound effects and background music
//! - `tuning`: Data-driven game balance

pub mod audio;
pub mod highscores;
pub mod renderer;
pub mod session;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use highscores::HighScores;
pub use session::Session;
pub use settings::Settings;
pub use tuning::{Tuning, TuningError};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz for smooth physics)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Largest frame delta accepted by the session driver
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Draw order, back to front
    pub const Z_BACKGROUND: i32 = 0;
    pub const Z_OBSTACLE: i32 = 1;
    pub const Z_FLOOR: i32 = 2;
    pub const Z_INTRO: i32 = 3;
    pub const Z_PLAYER: i32 = 4;
    pub const Z_LABEL: i32 = 5;

    /// Score label font size
    pub const SCORE_FONT_SIZE: f32 = 94.0;
    /// Game over label font size
    pub const GAME_OVER_FONT_SIZE: f32 = 40.0;
}
