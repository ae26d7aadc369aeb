//! Obstacle pair generation
//!
//! Each pair is a top sprite, a bottom sprite and an invisible score trigger
//! filling the gap between them. All three enter just past the right edge and
//! slide left at the same constant speed until they are fully off-screen.

use glam::Vec2;
use hecs::Entity;
use rand::Rng;

use super::action::Action;
use super::collision::Shape;
use super::physics::{Body, category};
use super::scene::{Role, Scene};
use super::texture::Texture;
use crate::consts::Z_OBSTACLE;
use crate::tuning::Tuning;

/// Where the three parts of a pair start
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairLayout {
    pub top: Vec2,
    pub bottom: Vec2,
    pub trigger: Vec2,
    pub obstacle_size: Vec2,
    pub trigger_size: Vec2,
}

impl PairLayout {
    /// Compute a pair's layout for a gap `offset` points below the top edge
    pub fn new(tuning: &Tuning, offset: f32, variant: u8) -> Self {
        let obstacle_size = Texture::ObstacleTop(variant).size();
        let gap = tuning.gap_height();
        let x = tuning.scene_width + obstacle_size.x / 2.0;

        let top = Vec2::new(x, tuning.scene_height - offset + obstacle_size.y / 2.0);
        let bottom = Vec2::new(x, top.y - obstacle_size.y - gap);
        let trigger = Vec2::new(x, top.y - obstacle_size.y / 2.0 - gap / 2.0);

        Self {
            top,
            bottom,
            trigger,
            obstacle_size,
            trigger_size: Vec2::new(1.0, gap),
        }
    }

    /// Lower edge of the top obstacle
    pub fn gap_top(&self) -> f32 {
        self.top.y - self.obstacle_size.y / 2.0
    }

    /// Upper edge of the bottom obstacle
    pub fn gap_bottom(&self) -> f32 {
        self.bottom.y + self.obstacle_size.y / 2.0
    }

    /// Horizontal distance from spawn until fully off the left edge
    pub fn travel_distance(&self, tuning: &Tuning) -> f32 {
        tuning.scene_width + self.obstacle_size.x
    }

    pub fn travel_duration(&self, tuning: &Tuning) -> f32 {
        self.travel_distance(tuning) / tuning.obstacle_velocity
    }
}

/// Handles of one spawned pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObstaclePair {
    pub top: Entity,
    pub bottom: Entity,
    pub trigger: Entity,
    pub offset: f32,
    pub variant: u8,
}

/// Pick a random gap offset and art variant
pub fn roll_pair<R: Rng>(tuning: &Tuning, rng: &mut R) -> (f32, u8) {
    let offset = rng.random_range(tuning.gap_offset_min..tuning.gap_offset_max) as f32;
    let variant = rng.random_range(0..tuning.obstacle_variants);
    (offset, variant)
}

/// Add a pair to the scene and start it moving
pub fn spawn_pair(scene: &mut Scene, tuning: &Tuning, offset: f32, variant: u8) -> ObstaclePair {
    let layout = PairLayout::new(tuning, offset, variant);
    let obstacle_shape = Shape::Rect {
        size: layout.obstacle_size,
    };

    let top = scene.spawn_sprite(Role::ObstacleTop, Texture::ObstacleTop(variant), layout.top, Z_OBSTACLE);
    scene.attach_body(top, Body::sensor(obstacle_shape, category::OBSTACLE));

    let bottom = scene.spawn_sprite(
        Role::ObstacleBottom,
        Texture::ObstacleBottom(variant),
        layout.bottom,
        Z_OBSTACLE,
    );
    scene.attach_body(bottom, Body::sensor(obstacle_shape, category::OBSTACLE));

    let trigger = scene.spawn_node(Role::ScoreTrigger, layout.trigger);
    scene.attach_body(
        trigger,
        Body::sensor(
            Shape::Rect {
                size: layout.trigger_size,
            },
            category::SCORE,
        ),
    );

    let distance = layout.travel_distance(tuning);
    let duration = layout.travel_duration(tuning);
    for entity in [top, bottom, trigger] {
        scene.run_action(
            entity,
            Action::sequence(vec![
                Action::move_by(Vec2::new(-distance, 0.0), duration),
                Action::remove_from_parent(),
            ]),
        );
    }

    ObstaclePair {
        top,
        bottom,
        trigger,
        offset,
        variant,
    }
}
