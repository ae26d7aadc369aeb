//! Data-driven game balance
//!
//! Every gameplay constant lives here under a name. A `Tuning` can be loaded
//! from JSON (missing fields fall back to the defaults) and must pass
//! [`Tuning::validate`] before a session is built from it.

use std::path::PathBuf;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sim::texture::{OBSTACLE_VARIANTS, Texture};

/// Startup-time configuration failures
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("`{field}` must be a positive finite number, got {value}")]
    NotPositive { field: &'static str, value: f32 },
    #[error("`{field}` must be zero or a positive finite number, got {value}")]
    Negative { field: &'static str, value: f32 },
    #[error("`{field}` must be finite, got {value}")]
    NotFinite { field: &'static str, value: f32 },
    #[error("gap offset range {min}..{max} is empty")]
    EmptyGapRange { min: u32, max: u32 },
    #[error("gap offset up to {max_offset} with a {gap}pt gap does not fit in a {game_area}pt game area")]
    GapOutOfBounds {
        max_offset: u32,
        gap: f32,
        game_area: f32,
    },
    #[error("game area {game_area} must be smaller than the scene height {scene_height}")]
    GameAreaTooTall { game_area: f32, scene_height: f32 },
    #[error("{requested} obstacle variants requested but only {available} textures exist")]
    MissingObstacleTextures { requested: u8, available: u8 },
    #[error("player hitbox inset {inset} leaves no hitbox")]
    HitboxTooSmall { inset: f32 },
    #[error("invalid tuning JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read tuning file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Game balance and layout parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Scene ===
    pub scene_width: f32,
    pub scene_height: f32,
    /// Height of the playable band above the floor
    pub game_area: f32,
    /// Player's fixed horizontal position
    pub player_x: f32,
    /// Score label distance below the top edge
    pub score_label_offset: f32,
    /// Intro banner distance below the top edge
    pub intro_offset: f32,

    // === Player physics ===
    /// Vertical gravity (points/s², negative pulls down)
    pub gravity: f32,
    pub player_mass: f32,
    /// Upward impulse applied on every flap
    pub fly_force: f32,
    /// Rotation (radians) per point/s of vertical velocity
    pub rotation_factor: f32,
    /// Shrinks the player's circular hitbox relative to half its sprite width
    pub player_hitbox_inset: f32,
    /// Seconds per player animation frame
    pub player_frame_time: f32,

    // === Obstacles ===
    /// Leftward obstacle speed (points/s)
    pub obstacle_velocity: f32,
    /// Seconds between obstacle pairs
    pub spawn_interval: f32,
    /// Lowest distance from the top edge to the gap (inclusive)
    pub gap_offset_min: u32,
    /// Highest distance from the top edge to the gap (exclusive)
    pub gap_offset_max: u32,
    /// Gap height as a multiple of the player's height
    pub gap_factor: f32,
    pub obstacle_variants: u8,

    // === Presentation ===
    /// Seconds for the floor to slide half its width
    pub floor_scroll_duration: f32,
    /// Seconds between the crash and the "Game Over" label
    pub game_over_delay: f32,
    /// Whether a tap after game over starts a new session
    pub allow_restart: bool,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            scene_width: 320.0,
            scene_height: 568.0,
            game_area: 410.0,
            player_x: 60.0,
            score_label_offset: 100.0,
            intro_offset: 210.0,

            gravity: -1000.0,
            player_mass: 0.1,
            fly_force: 30.0,
            rotation_factor: 0.001,
            player_hitbox_inset: 10.0,
            player_frame_time: 0.09,

            obstacle_velocity: 100.0,
            spawn_interval: 2.5,
            gap_offset_min: 74,
            gap_offset_max: 206,
            gap_factor: 2.5,
            obstacle_variants: OBSTACLE_VARIANTS,

            floor_scroll_duration: 4.0,
            game_over_delay: 0.5,
            allow_restart: true,
        }
    }
}

impl Tuning {
    /// Parse and validate a JSON tuning document
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load and validate a tuning file
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, TuningError> {
        let path = path.into();
        let json = std::fs::read_to_string(&path).map_err(|source| TuningError::Io {
            path: path.clone(),
            source,
        })?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    /// Check every constraint the simulation relies on
    pub fn validate(&self) -> Result<(), TuningError> {
        let positive = [
            ("scene_width", self.scene_width),
            ("scene_height", self.scene_height),
            ("game_area", self.game_area),
            ("player_mass", self.player_mass),
            ("fly_force", self.fly_force),
            ("player_frame_time", self.player_frame_time),
            ("obstacle_velocity", self.obstacle_velocity),
            ("spawn_interval", self.spawn_interval),
            ("gap_factor", self.gap_factor),
            ("floor_scroll_duration", self.floor_scroll_duration),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(TuningError::NotPositive { field, value });
            }
        }

        let finite = [
            ("player_x", self.player_x),
            ("score_label_offset", self.score_label_offset),
            ("intro_offset", self.intro_offset),
            ("gravity", self.gravity),
            ("rotation_factor", self.rotation_factor),
            ("player_hitbox_inset", self.player_hitbox_inset),
        ];
        for (field, value) in finite {
            if !value.is_finite() {
                return Err(TuningError::NotFinite { field, value });
            }
        }

        // A zero delay shows the game over label on the next tick
        let non_negative = [("game_over_delay", self.game_over_delay)];
        for (field, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(TuningError::Negative { field, value });
            }
        }

        if self.game_area >= self.scene_height {
            return Err(TuningError::GameAreaTooTall {
                game_area: self.game_area,
                scene_height: self.scene_height,
            });
        }

        if self.gap_offset_min >= self.gap_offset_max {
            return Err(TuningError::EmptyGapRange {
                min: self.gap_offset_min,
                max: self.gap_offset_max,
            });
        }

        // The lowest possible gap must still end above the floor
        let gap = self.gap_height();
        let deepest = (self.gap_offset_max - 1) as f32 + gap;
        if deepest >= self.game_area {
            return Err(TuningError::GapOutOfBounds {
                max_offset: self.gap_offset_max,
                gap,
                game_area: self.game_area,
            });
        }

        if self.obstacle_variants == 0 || self.obstacle_variants > OBSTACLE_VARIANTS {
            return Err(TuningError::MissingObstacleTextures {
                requested: self.obstacle_variants,
                available: OBSTACLE_VARIANTS,
            });
        }

        if self.player_hitbox_radius() <= 0.0 {
            return Err(TuningError::HitboxTooSmall {
                inset: self.player_hitbox_inset,
            });
        }

        Ok(())
    }

    pub fn scene_size(&self) -> Vec2 {
        Vec2::new(self.scene_width, self.scene_height)
    }

    /// Y of the floor's top edge (where the ground boundary sits)
    pub fn floor_top(&self) -> f32 {
        self.scene_height - self.game_area
    }

    /// Player's spawn position, centered in the game area
    pub fn player_start(&self) -> Vec2 {
        Vec2::new(self.player_x, self.scene_height - self.game_area / 2.0)
    }

    /// Vertical size of every obstacle gap
    pub fn gap_height(&self) -> f32 {
        Texture::Player(0).size().y * self.gap_factor
    }

    pub fn player_hitbox_radius(&self) -> f32 {
        Texture::Player(0).size().x / 2.0 - self.player_hitbox_inset
    }

    /// Vertical velocity right after a flap
    pub fn flap_velocity(&self) -> f32 {
        self.fly_force / self.player_mass
    }
}
