//! Game state and session layout
//!
//! One `GameState` owns everything about the current play session: the
//! scene, the phase, the score and the handles to the nodes the game loop
//! drives directly.

use std::collections::VecDeque;

use glam::Vec2;
use hecs::Entity;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::action::Action;
use super::collision::Shape;
use super::physics::{Body, Contact, category};
use super::scene::{Role, Scene};
use super::texture::Texture;
use super::timer::Timer;
use crate::consts::*;
use crate::tuning::{Tuning, TuningError};

/// Current phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Scene laid out, waiting for the first tap
    Starting,
    /// Active gameplay (the player may already be dead, waiting for game over)
    Running,
    /// "Game Over" shown
    Finished,
}

/// Inputs consumed by the game loop, one at a time
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Trigger {
    Tap,
    Contact(Contact),
    SpawnTimer,
    GameOverTimer,
}

/// Things that happened, for audio, HUD and bookkeeping
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// A fresh scene was laid out
    SessionStarted { session: u32 },
    /// Background music should be playing
    MusicRequested,
    RunStarted,
    Flapped { velocity: f32 },
    ObstacleSpawned { offset: f32, variant: u8 },
    Scored { score: u32 },
    Crashed { score: u32 },
    GameOverShown { score: u32 },
}

/// Nodes the game loop keeps handles to
#[derive(Debug, Clone, Copy)]
pub struct Handles {
    pub floor: Entity,
    /// Gone once the run starts
    pub intro: Option<Entity>,
    pub player: Entity,
    pub score_label: Entity,
    pub ground: Entity,
    pub game_over_label: Option<Entity>,
}

/// Complete state of the game
pub struct GameState {
    pub tuning: Tuning,
    /// Seed the RNG was created from
    pub seed: u64,
    pub(crate) rng: Pcg32,
    pub scene: Scene,
    pub phase: GamePhase,
    pub score: u32,
    /// 1-based session counter, bumped on every restart
    pub session: u32,
    /// Seconds of simulation since the session was laid out
    pub time: f32,
    pub handles: Handles,
    pub player_alive: bool,
    /// At most one spawn timer exists
    pub spawn_timer: Option<Timer>,
    pub game_over_timer: Option<Timer>,
    pub obstacles_spawned: u32,
    pub(crate) pending: VecDeque<Trigger>,
    events: Vec<GameEvent>,
}

impl GameState {
    /// New game with default tuning
    pub fn new(seed: u64) -> Self {
        Self::build(Tuning::default(), seed)
    }

    /// New game with custom tuning, rejected if it is inconsistent
    pub fn with_tuning(tuning: Tuning, seed: u64) -> Result<Self, TuningError> {
        tuning.validate()?;
        Ok(Self::build(tuning, seed))
    }

    fn build(tuning: Tuning, seed: u64) -> Self {
        let mut scene = Scene::new(tuning.scene_size(), Vec2::new(0.0, tuning.gravity));
        let mut events = Vec::new();
        let handles = lay_out(&mut scene, &tuning);
        events.push(GameEvent::SessionStarted { session: 1 });
        events.push(GameEvent::MusicRequested);
        log::info!("Session 1 laid out (seed {seed})");

        Self {
            tuning,
            seed,
            rng: Pcg32::seed_from_u64(seed),
            scene,
            phase: GamePhase::Starting,
            score: 0,
            session: 1,
            time: 0.0,
            handles,
            player_alive: true,
            spawn_timer: None,
            game_over_timer: None,
            obstacles_spawned: 0,
            pending: VecDeque::new(),
            events,
        }
    }

    /// Tear everything down and lay out a fresh `Starting` scene
    pub fn restart(&mut self) {
        self.scene.clear();
        self.handles = lay_out(&mut self.scene, &self.tuning);
        self.phase = GamePhase::Starting;
        self.score = 0;
        self.session += 1;
        self.time = 0.0;
        self.player_alive = true;
        self.spawn_timer = None;
        self.game_over_timer = None;
        self.obstacles_spawned = 0;
        self.pending.clear();
        self.events.push(GameEvent::SessionStarted {
            session: self.session,
        });
        self.events.push(GameEvent::MusicRequested);
        log::info!("Session {} laid out", self.session);
    }

    /// Queue a trigger for the next drain
    pub fn push_trigger(&mut self, trigger: Trigger) {
        self.pending.push_back(trigger);
    }

    pub(crate) fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Events since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn player_position(&self) -> Vec2 {
        self.scene
            .position(self.handles.player)
            .unwrap_or_else(|| self.tuning.player_start())
    }

    pub fn player_velocity(&self) -> Vec2 {
        self.scene
            .body(self.handles.player)
            .map(|body| body.velocity)
            .unwrap_or(Vec2::ZERO)
    }

    /// Obstacle pairs currently in the scene
    pub fn obstacle_count(&self) -> usize {
        self.scene.count(Role::ObstacleTop)
    }
}

/// Background, floor, intro banner, idle player, score label and ground
fn lay_out(scene: &mut Scene, tuning: &Tuning) -> Handles {
    let width = tuning.scene_width;
    let height = tuning.scene_height;

    scene.spawn_sprite(
        Role::Background,
        Texture::Background,
        Vec2::new(width / 2.0, height / 2.0),
        Z_BACKGROUND,
    );

    let floor_size = Texture::Floor.size();
    let floor_start = Vec2::new(width / 2.0, tuning.floor_top() - floor_size.y / 2.0);
    let floor = scene.spawn_sprite(Role::Floor, Texture::Floor, floor_start, Z_FLOOR);
    scene.run_action(
        floor,
        Action::repeat_forever(Action::sequence(vec![
            Action::move_by(Vec2::new(-floor_size.x / 2.0, 0.0), tuning.floor_scroll_duration),
            Action::move_to(floor_start, 0.0),
        ])),
    );

    let intro = scene.spawn_sprite(
        Role::Intro,
        Texture::Intro,
        Vec2::new(width / 2.0, height - tuning.intro_offset),
        Z_INTRO,
    );

    let player = scene.spawn_sprite(
        Role::Player,
        Texture::Player(0),
        tuning.player_start(),
        Z_PLAYER,
    );
    scene.run_action(
        player,
        Action::repeat_forever(Action::animate(
            Texture::player_frames(),
            tuning.player_frame_time,
        )),
    );
    scene.attach_body(
        player,
        Body::simulated(
            Shape::Circle {
                radius: tuning.player_hitbox_radius(),
            },
            category::PLAYER,
            category::OBSTACLE | category::SCORE,
            tuning.player_mass,
        ),
    );

    let score_label = scene.spawn_label(
        Role::ScoreLabel,
        "0",
        SCORE_FONT_SIZE,
        Vec2::new(width / 2.0, height - tuning.score_label_offset),
        Z_LABEL,
    );

    let ground = scene.spawn_node(Role::Ground, Vec2::new(width / 2.0, tuning.floor_top()));
    scene.attach_body(
        ground,
        Body::sensor(
            Shape::Rect {
                size: Vec2::new(width, 1.0),
            },
            category::OBSTACLE,
        ),
    );

    Handles {
        floor,
        intro: Some(intro),
        player,
        score_label,
        ground,
        game_over_label: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_is_starting_with_layout() {
        let state = GameState::new(1);
        assert_eq!(state.phase, GamePhase::Starting);
        assert_eq!(state.score, 0);
        assert!(state.spawn_timer.is_none());
        assert_eq!(state.scene.count(Role::Background), 1);
        assert_eq!(state.scene.count(Role::Floor), 1);
        assert_eq!(state.scene.count(Role::Intro), 1);
        assert_eq!(state.scene.count(Role::Player), 1);
        assert_eq!(state.scene.count(Role::ScoreLabel), 1);
        assert_eq!(state.scene.count(Role::Ground), 1);
        assert_eq!(
            state.scene.label_text(state.handles.score_label).as_deref(),
            Some("0")
        );
        assert_eq!(state.player_position(), Vec2::new(60.0, 363.0));
    }

    #[test]
    fn test_player_body_starts_inactive() {
        let state = GameState::new(1);
        let body = state.scene.body(state.handles.player).unwrap();
        assert!(!body.dynamic);
        assert_eq!(body.category, category::PLAYER);
    }

    #[test]
    fn test_new_session_requests_music() {
        let mut state = GameState::new(1);
        let events = state.drain_events();
        assert_eq!(
            events,
            vec![
                GameEvent::SessionStarted { session: 1 },
                GameEvent::MusicRequested
            ]
        );
        assert!(state.events().is_empty());
    }

    #[test]
    fn test_invalid_tuning_is_rejected() {
        let tuning = Tuning {
            spawn_interval: -1.0,
            ..Default::default()
        };
        assert!(GameState::with_tuning(tuning, 1).is_err());
    }

    #[test]
    fn test_restart_lays_out_fresh_scene() {
        let mut state = GameState::new(1);
        state.score = 7;
        state.phase = GamePhase::Finished;
        state.spawn_timer = Some(Timer::repeating(2.5));

        state.restart();

        assert_eq!(state.phase, GamePhase::Starting);
        assert_eq!(state.score, 0);
        assert_eq!(state.session, 2);
        assert!(state.spawn_timer.is_none());
        assert_eq!(state.scene.count(Role::Player), 1);
        assert_eq!(state.scene.count(Role::Intro), 1);
    }
}
