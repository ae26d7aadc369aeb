//! Shape generation for 2D primitives

use glam::Vec2;

use super::vertex::{Vertex, texture_color};
use crate::sim::{Drawable, Scene};

/// Map a scene point (origin bottom-left, y up) to normalized device coordinates
pub fn scene_to_ndc(point: Vec2, scene_size: Vec2) -> Vec2 {
    Vec2::new(
        point.x / scene_size.x * 2.0 - 1.0,
        point.y / scene_size.y * 2.0 - 1.0,
    )
}

/// Largest viewport `(x, y, width, height)` with the scene's aspect ratio,
/// centered in a `target` pixel area
pub fn letterbox(target: (u32, u32), scene_size: Vec2) -> (f32, f32, f32, f32) {
    let target = Vec2::new(target.0 as f32, target.1 as f32);
    let scale = (target.x / scene_size.x).min(target.y / scene_size.y);
    let size = scene_size * scale;
    let offset = (target - size) / 2.0;
    (offset.x, offset.y, size.x, size.y)
}

/// Two triangles covering a sprite, rotated about its center (scene coordinates)
pub fn sprite_quad(sprite: &Drawable) -> [Vertex; 6] {
    let half = sprite.size / 2.0;
    let rotation = Vec2::from_angle(sprite.rotation);
    let color = texture_color(sprite.texture);

    let corner = |x: f32, y: f32| {
        let p = sprite.position + rotation.rotate(Vec2::new(x, y));
        Vertex::new(p.x, p.y, color)
    };

    let bottom_left = corner(-half.x, -half.y);
    let bottom_right = corner(half.x, -half.y);
    let top_right = corner(half.x, half.y);
    let top_left = corner(-half.x, half.y);

    [
        bottom_left,
        bottom_right,
        top_right,
        bottom_left,
        top_right,
        top_left,
    ]
}

/// Every sprite in the scene, back to front, in scene coordinates
pub fn scene_vertices(scene: &Scene) -> Vec<Vertex> {
    let drawables = scene.drawables();
    let mut vertices = Vec::with_capacity(drawables.len() * 6);
    for sprite in &drawables {
        vertices.extend_from_slice(&sprite_quad(sprite));
    }
    vertices
}
