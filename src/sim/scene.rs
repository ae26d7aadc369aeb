//! Scene graph as an entity arena
//!
//! Every visual or physical thing in a session is an entity in a
//! `hecs::World`. The game loop keeps `Entity` handles to the nodes it cares
//! about and talks to them through the methods here; nothing holds references
//! between nodes.

use glam::Vec2;
use hecs::{Entity, Ref, RefMut, World};

use super::action::{Action, ActionTarget, Progress};
use super::physics::{Body, Contact, Physics};
use super::texture::Texture;

/// Position, rotation and draw layer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec2,
    /// Radians, counter-clockwise
    pub rotation: f32,
    pub z: i32,
}

impl Transform {
    pub fn new(position: Vec2, z: i32) -> Self {
        Self {
            position,
            rotation: 0.0,
            z,
        }
    }
}

/// Textured quad
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sprite {
    pub texture: Texture,
    pub size: Vec2,
}

/// Text node
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub text: String,
    pub font_size: f32,
}

/// Running actions on a node
#[derive(Debug, Clone, Default)]
pub struct Actions(pub Vec<Action>);

/// What a node is, from the game's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Background,
    Floor,
    Intro,
    Player,
    ScoreLabel,
    GameOverLabel,
    ObstacleTop,
    ObstacleBottom,
    ScoreTrigger,
    Ground,
}

/// Spawn sequence number, breaks z ties
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct SpawnOrder(u64);

/// A sprite ready to draw
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Drawable {
    pub position: Vec2,
    pub size: Vec2,
    pub rotation: f32,
    pub texture: Texture,
    pub z: i32,
}

pub struct Scene {
    pub world: World,
    pub physics: Physics,
    size: Vec2,
    next_order: u64,
}

impl Scene {
    pub fn new(size: Vec2, gravity: Vec2) -> Self {
        Self {
            world: World::new(),
            physics: Physics::new(gravity),
            size,
            next_order: 0,
        }
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    fn order(&mut self) -> SpawnOrder {
        let order = SpawnOrder(self.next_order);
        self.next_order += 1;
        order
    }

    /// Add a textured node sized to its texture
    pub fn spawn_sprite(&mut self, role: Role, texture: Texture, position: Vec2, z: i32) -> Entity {
        let order = self.order();
        let sprite = Sprite {
            texture,
            size: texture.size(),
        };
        self.world.spawn((
            Transform::new(position, z),
            sprite,
            role,
            Actions::default(),
            order,
        ))
    }

    pub fn spawn_label(
        &mut self,
        role: Role,
        text: impl Into<String>,
        font_size: f32,
        position: Vec2,
        z: i32,
    ) -> Entity {
        let order = self.order();
        let label = Label {
            text: text.into(),
            font_size,
        };
        self.world.spawn((
            Transform::new(position, z),
            label,
            role,
            Actions::default(),
            order,
        ))
    }

    /// Add an invisible node (typically to carry a body)
    pub fn spawn_node(&mut self, role: Role, position: Vec2) -> Entity {
        let order = self.order();
        self.world
            .spawn((Transform::new(position, 0), role, Actions::default(), order))
    }

    pub fn attach_body(&mut self, entity: Entity, body: Body) -> bool {
        self.world.insert_one(entity, body).is_ok()
    }

    pub fn remove_body(&mut self, entity: Entity) -> Option<Body> {
        self.world.remove_one::<Body>(entity).ok()
    }

    pub fn body(&self, entity: Entity) -> Option<Ref<'_, Body>> {
        self.world.get::<&Body>(entity).ok()
    }

    pub fn body_mut(&mut self, entity: Entity) -> Option<RefMut<'_, Body>> {
        self.world.get::<&mut Body>(entity).ok()
    }

    pub fn despawn(&mut self, entity: Entity) -> bool {
        self.world.despawn(entity).is_ok()
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.world.contains(entity)
    }

    /// Remove every node and forget contact history
    pub fn clear(&mut self) {
        self.world.clear();
        self.physics.reset();
    }

    pub fn len(&self) -> usize {
        self.world.len() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.world.is_empty()
    }

    pub fn run_action(&mut self, entity: Entity, action: Action) {
        if let Ok(mut actions) = self.world.get::<&mut Actions>(entity) {
            actions.0.push(action);
        }
    }

    pub fn remove_all_actions(&mut self, entity: Entity) {
        if let Ok(mut actions) = self.world.get::<&mut Actions>(entity) {
            actions.0.clear();
        }
    }

    /// Freeze the whole scene
    pub fn remove_all_actions_everywhere(&mut self) {
        for (_entity, actions) in self.world.query_mut::<&mut Actions>() {
            actions.0.clear();
        }
    }

    pub fn action_count(&self, entity: Entity) -> usize {
        self.world
            .get::<&Actions>(entity)
            .map(|actions| actions.0.len())
            .unwrap_or(0)
    }

    pub fn position(&self, entity: Entity) -> Option<Vec2> {
        self.world.get::<&Transform>(entity).ok().map(|t| t.position)
    }

    pub fn set_position(&mut self, entity: Entity, position: Vec2) {
        if let Ok(mut transform) = self.world.get::<&mut Transform>(entity) {
            transform.position = position;
        }
    }

    pub fn rotation(&self, entity: Entity) -> Option<f32> {
        self.world.get::<&Transform>(entity).ok().map(|t| t.rotation)
    }

    pub fn set_rotation(&mut self, entity: Entity, rotation: f32) {
        if let Ok(mut transform) = self.world.get::<&mut Transform>(entity) {
            transform.rotation = rotation;
        }
    }

    pub fn texture(&self, entity: Entity) -> Option<Texture> {
        self.world.get::<&Sprite>(entity).ok().map(|s| s.texture)
    }

    pub fn set_texture(&mut self, entity: Entity, texture: Texture) {
        if let Ok(mut sprite) = self.world.get::<&mut Sprite>(entity) {
            sprite.texture = texture;
        }
    }

    pub fn label_text(&self, entity: Entity) -> Option<String> {
        self.world.get::<&Label>(entity).ok().map(|l| l.text.clone())
    }

    pub fn set_label_text(&mut self, entity: Entity, text: impl Into<String>) {
        if let Ok(mut label) = self.world.get::<&mut Label>(entity) {
            label.text = text.into();
        }
    }

    /// Step every node's actions, then drop nodes that asked to be removed
    pub fn advance_actions(&mut self, dt: f32) {
        let mut removed = Vec::new();

        for (entity, (transform, actions, sprite)) in
            self.world
                .query_mut::<(&mut Transform, &mut Actions, Option<&mut Sprite>)>()
        {
            if actions.0.is_empty() {
                continue;
            }

            let mut remove = false;
            let mut target = ActionTarget {
                position: &mut transform.position,
                texture: sprite.map(|s| &mut s.texture),
                remove: &mut remove,
            };
            actions
                .0
                .retain_mut(|action| matches!(action.step(&mut target, dt), Progress::Running));

            if remove {
                removed.push(entity);
            }
        }

        for entity in removed {
            let _ = self.world.despawn(entity);
        }
    }

    /// Integrate bodies and collect new contacts
    pub fn step_physics(&mut self, dt: f32) -> Vec<Contact> {
        self.physics.step(&mut self.world, dt)
    }

    /// Entities with a role, in spawn order
    pub fn entities_with(&self, role: Role) -> Vec<Entity> {
        let mut found: Vec<(SpawnOrder, Entity)> = self
            .world
            .query::<(&Role, &SpawnOrder)>()
            .iter()
            .filter(|(_e, (r, _))| **r == role)
            .map(|(e, (_, order))| (*order, e))
            .collect();
        found.sort_by_key(|(order, _)| *order);
        found.into_iter().map(|(_, e)| e).collect()
    }

    pub fn count(&self, role: Role) -> usize {
        self.world
            .query::<&Role>()
            .iter()
            .filter(|(_e, r)| **r == role)
            .count()
    }

    /// Sprites back to front
    pub fn drawables(&self) -> Vec<Drawable> {
        let mut sprites: Vec<(SpawnOrder, Drawable)> = self
            .world
            .query::<(&Transform, &Sprite, &SpawnOrder)>()
            .iter()
            .map(|(_e, (t, s, order))| {
                (
                    *order,
                    Drawable {
                        position: t.position,
                        size: s.size,
                        rotation: t.rotation,
                        texture: s.texture,
                        z: t.z,
                    },
                )
            })
            .collect();
        sprites.sort_by_key(|(order, d)| (d.z, *order));
        sprites.into_iter().map(|(_, d)| d).collect()
    }
}
