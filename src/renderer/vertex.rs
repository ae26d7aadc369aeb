//! Vertex types for 2D rendering

use bytemuck::{Pod, Zeroable};

use crate::sim::Texture;

/// Simple 2D vertex with position and color
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub const fn new(x: f32, y: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// Colors for game elements
pub mod colors {
    pub const SKY: [f32; 4] = [0.31, 0.75, 0.79, 1.0];
    pub const GROUND: [f32; 4] = [0.87, 0.85, 0.58, 1.0];
    pub const INTRO: [f32; 4] = [1.0, 1.0, 1.0, 0.85];
    pub const DRAGON: [f32; 4] = [0.93, 0.42, 0.18, 1.0];
    pub const DRAGON_DEAD: [f32; 4] = [0.45, 0.45, 0.5, 1.0];
    /// One per obstacle variant
    pub const OBSTACLES: [[f32; 4]; 4] = [
        [0.45, 0.75, 0.18, 1.0],
        [0.36, 0.62, 0.76, 1.0],
        [0.74, 0.42, 0.66, 1.0],
        [0.82, 0.64, 0.22, 1.0],
    ];
    pub const BACKGROUND: [f32; 4] = [0.02, 0.02, 0.05, 1.0];
}

/// Flat color standing in for a texture
pub fn texture_color(texture: Texture) -> [f32; 4] {
    match texture {
        Texture::Background => colors::SKY,
        Texture::Floor => colors::GROUND,
        Texture::Intro => colors::INTRO,
        Texture::Player(frame) => {
            // Wing beat shows as a slight brightness pulse
            let shade = 1.0 - 0.06 * f32::from(frame);
            let [r, g, b, a] = colors::DRAGON;
            [r * shade, g * shade, b * shade, a]
        }
        Texture::PlayerDead => colors::DRAGON_DEAD,
        Texture::ObstacleTop(variant) | Texture::ObstacleBottom(variant) => {
            colors::OBSTACLES[usize::from(variant) % colors::OBSTACLES.len()]
        }
    }
}
