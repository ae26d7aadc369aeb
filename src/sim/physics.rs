//! Rigid bodies, gravity and contact reporting
//!
//! Bodies never push each other apart: contacts are reported once when two
//! matching bodies start overlapping and it is up to the game loop to react.

use std::collections::HashSet;

use glam::Vec2;
use hecs::{Entity, World};

use super::collision::{Shape, shapes_collision};
use super::scene::Transform;

/// Bitmask tags partitioning bodies for contact filtering
pub mod category {
    pub const NONE: u32 = 0;
    pub const PLAYER: u32 = 1 << 0;
    /// Obstacles and the ground boundary
    pub const OBSTACLE: u32 = 1 << 1;
    pub const SCORE: u32 = 1 << 2;
}

/// A physics body attached to a scene node
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub shape: Shape,
    pub category: u32,
    /// Categories this body reports contacts with
    pub contact_mask: u32,
    /// Integrated by the physics step
    pub dynamic: bool,
    pub affected_by_gravity: bool,
    pub mass: f32,
    pub velocity: Vec2,
}

impl Body {
    /// Static, contact-only body
    pub fn sensor(shape: Shape, category: u32) -> Self {
        Self {
            shape,
            category,
            contact_mask: category::NONE,
            dynamic: false,
            affected_by_gravity: false,
            mass: 1.0,
            velocity: Vec2::ZERO,
        }
    }

    /// Body that can be enabled for simulation (starts non-dynamic)
    pub fn simulated(shape: Shape, category: u32, contact_mask: u32, mass: f32) -> Self {
        Self {
            shape,
            category,
            contact_mask,
            dynamic: false,
            affected_by_gravity: true,
            mass,
            velocity: Vec2::ZERO,
        }
    }

    /// Instant change in momentum
    pub fn apply_impulse(&mut self, impulse: Vec2) {
        self.velocity += impulse / self.mass;
    }

    fn reports(&self, other: &Body) -> bool {
        self.contact_mask & other.category != 0
    }
}

/// Two bodies started touching
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub a: Entity,
    pub b: Entity,
    pub a_category: u32,
    pub b_category: u32,
    pub point: Vec2,
}

impl Contact {
    /// Whether either side carries any of the given category bits
    pub fn involves(&self, mask: u32) -> bool {
        (self.a_category | self.b_category) & mask != 0
    }

    /// The entity on the side carrying `mask`, if any
    pub fn entity_with(&self, mask: u32) -> Option<Entity> {
        if self.a_category & mask != 0 {
            Some(self.a)
        } else if self.b_category & mask != 0 {
            Some(self.b)
        } else {
            None
        }
    }
}

/// Physics world settings and contact bookkeeping
#[derive(Debug, Clone, Default)]
pub struct Physics {
    pub gravity: Vec2,
    /// Pairs currently overlapping, ordered by entity bits
    touching: HashSet<(Entity, Entity)>,
}

impl Physics {
    pub fn new(gravity: Vec2) -> Self {
        Self {
            gravity,
            touching: HashSet::new(),
        }
    }

    /// Integrate dynamic bodies, then report new contacts (sorted for determinism)
    pub fn step(&mut self, world: &mut World, dt: f32) -> Vec<Contact> {
        for (_entity, (transform, body)) in world.query_mut::<(&mut Transform, &mut Body)>() {
            if !body.dynamic {
                continue;
            }
            if body.affected_by_gravity {
                body.velocity += self.gravity * dt;
            }
            transform.position += body.velocity * dt;
        }

        let mut bodies: Vec<(Entity, Vec2, Body)> = world
            .query::<(&Transform, &Body)>()
            .iter()
            .map(|(e, (t, b))| (e, t.position, b.clone()))
            .collect();
        bodies.sort_by_key(|(e, _, _)| e.to_bits());

        let mut now_touching = HashSet::new();
        let mut contacts = Vec::new();

        for (i, (ea, pa, ba)) in bodies.iter().enumerate() {
            for (eb, pb, bb) in &bodies[i + 1..] {
                if !(ba.reports(bb) || bb.reports(ba)) {
                    continue;
                }
                let result = shapes_collision(*pa, ba.shape, *pb, bb.shape);
                if !result.hit {
                    continue;
                }
                let key = (*ea, *eb);
                now_touching.insert(key);
                if !self.touching.contains(&key) {
                    contacts.push(Contact {
                        a: *ea,
                        b: *eb,
                        a_category: ba.category,
                        b_category: bb.category,
                        point: result.point,
                    });
                }
            }
        }

        // Separated or despawned pairs are forgotten
        self.touching = now_touching;
        contacts
    }

    /// Drop all contact history (scene teardown)
    pub fn reset(&mut self) {
        self.touching.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spawn_player(world: &mut World, pos: Vec2) -> Entity {
        let mut body = Body::simulated(
            Shape::Circle { radius: 10.0 },
            category::PLAYER,
            category::OBSTACLE | category::SCORE,
            1.0,
        );
        body.dynamic = true;
        world.spawn((Transform::new(pos, 0), body))
    }

    fn spawn_wall(world: &mut World, pos: Vec2, category: u32) -> Entity {
        world.spawn((
            Transform::new(pos, 0),
            Body::sensor(
                Shape::Rect {
                    size: Vec2::new(10.0, 100.0),
                },
                category,
            ),
        ))
    }

    #[test]
    fn test_gravity_integrates_dynamic_bodies_only() {
        let mut world = World::new();
        let mut physics = Physics::new(Vec2::new(0.0, -100.0));
        let player = spawn_player(&mut world, Vec2::new(0.0, 500.0));
        let wall = spawn_wall(&mut world, Vec2::new(300.0, 300.0), category::OBSTACLE);

        physics.step(&mut world, 0.5);

        let body = world.get::<&Body>(player).unwrap();
        assert_eq!(body.velocity, Vec2::new(0.0, -50.0));
        assert_eq!(world.get::<&Transform>(player).unwrap().position.y, 475.0);
        assert_eq!(
            world.get::<&Transform>(wall).unwrap().position,
            Vec2::new(300.0, 300.0)
        );
    }

    #[test]
    fn test_contact_reported_once_until_separation() {
        let mut world = World::new();
        let mut physics = Physics::default();
        let player = spawn_player(&mut world, Vec2::new(0.0, 0.0));
        spawn_wall(&mut world, Vec2::new(12.0, 0.0), category::OBSTACLE);

        assert_eq!(physics.step(&mut world, 0.01).len(), 1);
        assert!(physics.step(&mut world, 0.01).is_empty());

        world.get::<&mut Transform>(player).unwrap().position.x = -100.0;
        assert!(physics.step(&mut world, 0.01).is_empty());

        world.get::<&mut Transform>(player).unwrap().position.x = 0.0;
        assert_eq!(physics.step(&mut world, 0.01).len(), 1);
    }

    #[test]
    fn test_unmatched_categories_do_not_contact() {
        let mut world = World::new();
        let mut physics = Physics::default();
        spawn_wall(&mut world, Vec2::ZERO, category::OBSTACLE);
        spawn_wall(&mut world, Vec2::new(5.0, 0.0), category::SCORE);

        assert!(physics.step(&mut world, 0.01).is_empty());
    }

    #[test]
    fn test_contact_helpers() {
        let mut world = World::new();
        let mut physics = Physics::default();
        let player = spawn_player(&mut world, Vec2::ZERO);
        let trigger = spawn_wall(&mut world, Vec2::new(5.0, 0.0), category::SCORE);

        let contacts = physics.step(&mut world, 0.01);
        let contact = contacts[0];
        assert!(contact.involves(category::SCORE));
        assert!(!contact.involves(category::OBSTACLE));
        assert_eq!(contact.entity_with(category::SCORE), Some(trigger));
        assert_eq!(contact.entity_with(category::PLAYER), Some(player));
    }

    #[test]
    fn test_impulse_divides_by_mass() {
        let mut body = Body::simulated(Shape::Circle { radius: 1.0 }, category::PLAYER, 0, 0.5);
        body.apply_impulse(Vec2::new(0.0, 30.0));
        assert_eq!(body.velocity, Vec2::new(0.0, 60.0));
    }
}
