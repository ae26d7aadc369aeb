//! Overlap tests between body shapes
//!
//! Bodies are circles or axis-aligned rectangles. Contacts are informational
//! only, so these tests report whether and where shapes touch, never how to
//! push them apart.

use glam::Vec2;

/// Collision shape, centered on the node position
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Circle { radius: f32 },
    Rect { size: Vec2 },
}

/// Result of an overlap check
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether the shapes overlap
    pub hit: bool,
    /// Point on the boundary of the second shape closest to the first (if hit)
    pub point: Vec2,
    /// Penetration depth
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            point: Vec2::ZERO,
            penetration: 0.0,
        }
    }
}

/// Circle against axis-aligned rectangle
pub fn circle_rect_collision(
    center: Vec2,
    radius: f32,
    rect_center: Vec2,
    rect_size: Vec2,
) -> CollisionResult {
    let half = rect_size / 2.0;
    let closest = center.clamp(rect_center - half, rect_center + half);
    let dist = center.distance(closest);

    if dist > radius {
        return CollisionResult::miss();
    }

    CollisionResult {
        hit: true,
        point: closest,
        penetration: radius - dist,
    }
}

/// Circle against circle
pub fn circle_circle_collision(a: Vec2, a_radius: f32, b: Vec2, b_radius: f32) -> CollisionResult {
    let dist = a.distance(b);
    let reach = a_radius + b_radius;
    if dist > reach {
        return CollisionResult::miss();
    }

    let point = b + (a - b).normalize_or_zero() * b_radius;
    CollisionResult {
        hit: true,
        point,
        penetration: reach - dist,
    }
}

/// Rectangle against rectangle
pub fn rect_rect_collision(a: Vec2, a_size: Vec2, b: Vec2, b_size: Vec2) -> CollisionResult {
    let overlap = (a_size + b_size) / 2.0 - (a - b).abs();
    if overlap.x < 0.0 || overlap.y < 0.0 {
        return CollisionResult::miss();
    }

    let half = b_size / 2.0;
    CollisionResult {
        hit: true,
        point: a.clamp(b - half, b + half),
        penetration: overlap.x.min(overlap.y),
    }
}

/// Dispatch on shape pair
pub fn shapes_collision(a_pos: Vec2, a: Shape, b_pos: Vec2, b: Shape) -> CollisionResult {
    match (a, b) {
        (Shape::Circle { radius: ra }, Shape::Circle { radius: rb }) => {
            circle_circle_collision(a_pos, ra, b_pos, rb)
        }
        (Shape::Circle { radius }, Shape::Rect { size }) => {
            circle_rect_collision(a_pos, radius, b_pos, size)
        }
        (Shape::Rect { size }, Shape::Circle { radius }) => {
            let mut result = circle_rect_collision(b_pos, radius, a_pos, size);
            if result.hit {
                // Report the point on the circle, not on the rectangle
                result.point = b_pos + (a_pos - b_pos).normalize_or_zero() * radius;
            }
            result
        }
        (Shape::Rect { size: sa }, Shape::Rect { size: sb }) => {
            rect_rect_collision(a_pos, sa, b_pos, sb)
        }
    }
}
