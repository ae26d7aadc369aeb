//! Texture catalog
//!
//! Textures are identified by name and carry a fixed point size; the
//! simulation only needs sizes, the renderer maps each texture to a color.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Number of player animation frames
pub const PLAYER_FRAMES: u8 = 4;
/// Number of obstacle art variants
pub const OBSTACLE_VARIANTS: u8 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Texture {
    Background,
    Floor,
    Intro,
    /// Flying animation frame, 0-based
    Player(u8),
    PlayerDead,
    /// Top obstacle art variant, 0-based
    ObstacleTop(u8),
    /// Bottom obstacle art variant, 0-based
    ObstacleBottom(u8),
}

impl Texture {
    /// Asset name, matching the original image names
    pub fn name(&self) -> String {
        match self {
            Texture::Background => "background".to_string(),
            Texture::Floor => "floor".to_string(),
            Texture::Intro => "intro".to_string(),
            Texture::Player(frame) => format!("player{}", frame + 1),
            Texture::PlayerDead => "playerDead".to_string(),
            Texture::ObstacleTop(variant) => format!("enemytop{}", variant + 1),
            Texture::ObstacleBottom(variant) => format!("enemybottom{}", variant + 1),
        }
    }

    /// Size in scene points
    pub fn size(&self) -> Vec2 {
        match self {
            Texture::Background => Vec2::new(320.0, 568.0),
            Texture::Floor => Vec2::new(640.0, 80.0),
            Texture::Intro => Vec2::new(250.0, 150.0),
            Texture::Player(_) | Texture::PlayerDead => Vec2::new(56.0, 40.0),
            Texture::ObstacleTop(_) | Texture::ObstacleBottom(_) => Vec2::new(60.0, 420.0),
        }
    }

    /// The flying animation cycle
    pub fn player_frames() -> Vec<Texture> {
        (0..PLAYER_FRAMES).map(Texture::Player).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_are_one_based() {
        assert_eq!(Texture::Player(0).name(), "player1");
        assert_eq!(Texture::ObstacleTop(3).name(), "enemytop4");
        assert_eq!(Texture::ObstacleBottom(0).name(), "enemybottom1");
    }

    #[test]
    fn test_player_frames_cycle() {
        let frames = Texture::player_frames();
        assert_eq!(frames.len(), PLAYER_FRAMES as usize);
        assert_eq!(frames[3], Texture::Player(3));
    }
}
