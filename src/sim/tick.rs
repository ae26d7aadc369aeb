//! Fixed timestep simulation tick
//!
//! Core game loop: taps, contacts and timer firings all become `Trigger`s and
//! are handled one at a time, in order, by the state machine below.

use glam::Vec2;
use hecs::Entity;

use super::obstacles::{roll_pair, spawn_pair};
use super::physics::{Contact, category};
use super::scene::Role;
use super::state::{GameEvent, GamePhase, GameState, Trigger};
use super::texture::Texture;
use super::timer::Timer;
use crate::consts::*;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Tap/click/flap key this tick
    pub tap: bool,
    /// Idle/demo mode - the game taps for itself
    pub idle_mode: bool,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    let tap = input.tap || (input.idle_mode && autopilot_wants_tap(state));
    if tap {
        state.push_trigger(Trigger::Tap);
    }
    drain(state);

    state.time += dt;
    state.scene.advance_actions(dt);

    for contact in state.scene.step_physics(dt) {
        state.push_trigger(Trigger::Contact(contact));
    }

    if let Some(timer) = state.spawn_timer.as_mut() {
        for _ in 0..timer.advance(dt) {
            state.pending.push_back(Trigger::SpawnTimer);
        }
    }
    if let Some(timer) = state.game_over_timer.as_mut() {
        if timer.advance(dt) > 0 {
            state.pending.push_back(Trigger::GameOverTimer);
        }
    }
    drain(state);

    // Pitch follows vertical speed
    if state.player_alive {
        let vy = state.player_velocity().y;
        let player = state.handles.player;
        state
            .scene
            .set_rotation(player, vy * state.tuning.rotation_factor);
    }
}

/// Handle every queued trigger, including ones queued while handling
fn drain(state: &mut GameState) {
    while let Some(trigger) = state.pending.pop_front() {
        handle(state, trigger);
    }
}

/// Apply one trigger to the state machine
pub fn handle(state: &mut GameState, trigger: Trigger) {
    match trigger {
        Trigger::Tap => match state.phase {
            GamePhase::Starting => start_run(state),
            GamePhase::Running => {
                // Dead players wait for the game over label
                if state.player_alive {
                    flap(state);
                }
            }
            GamePhase::Finished => {
                if state.tuning.allow_restart {
                    state.restart();
                }
            }
        },
        Trigger::Contact(contact) => {
            if state.phase != GamePhase::Running || !state.player_alive {
                return;
            }
            if !contact.involves(category::PLAYER) {
                return;
            }
            if contact.involves(category::OBSTACLE) {
                crash(state, &contact);
            } else if let Some(trigger) = contact.entity_with(category::SCORE) {
                score(state, trigger);
            }
        }
        Trigger::SpawnTimer => {
            if state.phase == GamePhase::Running
                && state.player_alive
                && state.spawn_timer.is_some()
            {
                spawn_obstacles(state);
            }
        }
        Trigger::GameOverTimer => {
            if state.phase == GamePhase::Running && !state.player_alive {
                show_game_over(state);
            }
        }
    }
}

fn start_run(state: &mut GameState) {
    if let Some(intro) = state.handles.intro.take() {
        state.scene.despawn(intro);
    }
    if let Some(mut body) = state.scene.body_mut(state.handles.player) {
        body.dynamic = true;
    }
    state.phase = GamePhase::Running;
    state.spawn_timer = Some(Timer::repeating(state.tuning.spawn_interval));
    state.emit(GameEvent::RunStarted);
    log::info!("Run started (session {})", state.session);

    flap(state);
}

/// Zero the player's velocity, then kick it upward
fn flap(state: &mut GameState) {
    let velocity = {
        let Some(mut body) = state.scene.body_mut(state.handles.player) else {
            return;
        };
        body.velocity = Vec2::ZERO;
        body.apply_impulse(Vec2::new(0.0, state.tuning.fly_force));
        body.velocity.y
    };
    state.emit(GameEvent::Flapped { velocity });
}

fn spawn_obstacles(state: &mut GameState) {
    let (offset, variant) = roll_pair(&state.tuning, &mut state.rng);
    spawn_pair(&mut state.scene, &state.tuning, offset, variant);
    state.obstacles_spawned += 1;
    state.emit(GameEvent::ObstacleSpawned { offset, variant });
    log::debug!(
        "Obstacle pair {} at offset {offset} (variant {variant})",
        state.obstacles_spawned
    );
}

fn score(state: &mut GameState, trigger: Entity) {
    // A trigger pays out once
    if state.scene.remove_body(trigger).is_none() {
        return;
    }
    state.score += 1;
    let label = state.handles.score_label;
    state.scene.set_label_text(label, state.score.to_string());
    state.emit(GameEvent::Scored { score: state.score });
    log::debug!("Scored {}", state.score);
}

/// Freeze the world and schedule the game over label
fn crash(state: &mut GameState, contact: &Contact) {
    state.spawn_timer = None;
    state.scene.remove_all_actions_everywhere();

    let player = state.handles.player;
    state.scene.set_texture(player, Texture::PlayerDead);
    state.scene.set_rotation(player, 0.0);
    if let Some(mut body) = state.scene.body_mut(player) {
        body.dynamic = false;
        body.velocity = Vec2::ZERO;
        body.contact_mask = category::NONE;
    }

    state.player_alive = false;
    state.game_over_timer = Some(Timer::once(state.tuning.game_over_delay));
    state.emit(GameEvent::Crashed { score: state.score });
    log::info!(
        "Crashed at ({:.1}, {:.1}) with score {}",
        contact.point.x,
        contact.point.y,
        state.score
    );
}

fn show_game_over(state: &mut GameState) {
    let center = state.scene.size() / 2.0;
    let label = state.scene.spawn_label(
        Role::GameOverLabel,
        "Game Over",
        GAME_OVER_FONT_SIZE,
        center,
        Z_LABEL,
    );
    state.handles.game_over_label = Some(label);
    state.game_over_timer = None;
    state.phase = GamePhase::Finished;
    state.emit(GameEvent::GameOverShown { score: state.score });
    log::info!("Game over, final score {}", state.score);
}

/// Demo player: start right away, then hover around the next gap
fn autopilot_wants_tap(state: &GameState) -> bool {
    match state.phase {
        GamePhase::Starting => true,
        GamePhase::Running if state.player_alive => {
            let position = state.player_position();
            let target = next_gap_center(state, position.x)
                .unwrap_or((state.tuning.floor_top() + state.tuning.scene_height) / 2.0);
            state.player_velocity().y < 0.0
                && position.y < target - 0.2 * state.tuning.gap_height()
        }
        _ => false,
    }
}

/// Height of the first gap the player hasn't fully cleared yet
fn next_gap_center(state: &GameState, player_x: f32) -> Option<f32> {
    let clearance = Texture::ObstacleTop(0).size().x / 2.0 + state.tuning.player_hitbox_radius();
    state
        .scene
        .entities_with(Role::ScoreTrigger)
        .into_iter()
        .filter_map(|trigger| state.scene.position(trigger))
        .find(|position| position.x + clearance > player_x)
        .map(|position| position.y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::Tuning;

    fn tap() -> TickInput {
        TickInput {
            tap: true,
            ..Default::default()
        }
    }

    fn idle() -> TickInput {
        TickInput {
            tap: false,
            idle_mode: true,
        }
    }

    fn run_for(state: &mut GameState, input: &TickInput, seconds: f32) {
        let ticks = (seconds / SIM_DT).round() as usize;
        for _ in 0..ticks {
            tick(state, input, SIM_DT);
        }
    }

    fn ground_contact(state: &GameState) -> Contact {
        Contact {
            a: state.handles.player,
            b: state.handles.ground,
            a_category: category::PLAYER,
            b_category: category::OBSTACLE,
            point: state.player_position(),
        }
    }

    #[test]
    fn test_tick_starting_to_running() {
        let mut state = GameState::new(12345);

        // No tap - stays in Starting, player doesn't fall
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.phase, GamePhase::Starting);
        assert_eq!(state.player_position(), state.tuning.player_start());

        tick(&mut state, &tap(), SIM_DT);
        assert_eq!(state.phase, GamePhase::Running);
        assert!(state.handles.intro.is_none());
        assert_eq!(state.scene.count(Role::Intro), 0);
        assert!(state.spawn_timer.is_some());
        assert!(state.player_position().y > state.tuning.player_start().y);
    }

    #[test]
    fn test_start_creates_a_single_spawn_timer() {
        let mut state = GameState::new(1);
        state.push_trigger(Trigger::Tap);
        state.push_trigger(Trigger::Tap);
        tick(&mut state, &tap(), SIM_DT);

        let started = state
            .drain_events()
            .iter()
            .filter(|e| matches!(e, GameEvent::RunStarted))
            .count();
        assert_eq!(started, 1);

        // Extra taps flapped; still one pair per interval
        run_for(&mut state, &idle(), 2.6);
        assert_eq!(state.obstacles_spawned, 1);
        assert_eq!(state.obstacle_count(), 1);
    }

    #[test]
    fn test_flap_replaces_falling_velocity() {
        let mut state = GameState::new(1);
        tick(&mut state, &tap(), SIM_DT);
        run_for(&mut state, &TickInput::default(), 0.5);
        assert!(state.player_velocity().y < 0.0);

        handle(&mut state, Trigger::Tap);
        assert_eq!(
            state.player_velocity(),
            Vec2::new(0.0, state.tuning.flap_velocity())
        );
        assert_eq!(state.player_velocity().y, 300.0);
    }

    #[test]
    fn test_flap_with_unit_mass_is_fly_force() {
        let tuning = Tuning {
            player_mass: 1.0,
            ..Default::default()
        };
        let mut state = GameState::with_tuning(tuning, 1).unwrap();
        handle(&mut state, Trigger::Tap);
        run_for(&mut state, &TickInput::default(), 0.3);

        handle(&mut state, Trigger::Tap);
        assert_eq!(state.player_velocity().y, state.tuning.fly_force);
    }

    #[test]
    fn test_rotation_follows_vertical_velocity() {
        let mut state = GameState::new(1);
        tick(&mut state, &tap(), SIM_DT);
        let vy = state.player_velocity().y;
        let rotation = state.scene.rotation(state.handles.player).unwrap();
        assert_eq!(rotation, vy * state.tuning.rotation_factor);
        assert!(rotation > 0.0);
    }

    #[test]
    fn test_score_only_while_running() {
        let mut state = GameState::new(1);
        let tuning = state.tuning.clone();
        let pair = spawn_pair(&mut state.scene, &tuning, 120.0, 0);
        let contact = Contact {
            a: state.handles.player,
            b: pair.trigger,
            a_category: category::PLAYER,
            b_category: category::SCORE,
            point: Vec2::ZERO,
        };

        handle(&mut state, Trigger::Contact(contact));
        assert_eq!(state.score, 0);

        handle(&mut state, Trigger::Tap);
        handle(&mut state, Trigger::Contact(contact));
        assert_eq!(state.score, 1);
        assert_eq!(state.phase, GamePhase::Running);
        assert_eq!(
            state.scene.label_text(state.handles.score_label).as_deref(),
            Some("1")
        );

        // Same trigger again pays nothing
        handle(&mut state, Trigger::Contact(contact));
        assert_eq!(state.score, 1);
    }

    #[test]
    fn test_obstacle_contact_takes_precedence() {
        let mut state = GameState::new(1);
        handle(&mut state, Trigger::Tap);
        let tuning = state.tuning.clone();
        let pair = spawn_pair(&mut state.scene, &tuning, 120.0, 0);
        let contact = Contact {
            a: state.handles.player,
            b: pair.trigger,
            a_category: category::PLAYER,
            b_category: category::SCORE | category::OBSTACLE,
            point: Vec2::ZERO,
        };

        handle(&mut state, Trigger::Contact(contact));
        assert_eq!(state.score, 0);
        assert!(!state.player_alive);
    }

    #[test]
    fn test_crash_freezes_and_finishes_after_delay() {
        let mut state = GameState::new(7);
        run_for(&mut state, &idle(), 3.0);
        assert_eq!(state.obstacles_spawned, 1);
        let obstacle = state.scene.entities_with(Role::ObstacleTop)[0];
        let floor_before = state.scene.position(state.handles.floor);

        let contact = ground_contact(&state);
        handle(&mut state, Trigger::Contact(contact));

        assert!(state.spawn_timer.is_none());
        assert!(!state.player_alive);
        assert_eq!(state.phase, GamePhase::Running);
        assert_eq!(
            state.scene.texture(state.handles.player),
            Some(Texture::PlayerDead)
        );
        {
            let body = state.scene.body(state.handles.player).unwrap();
            assert!(!body.dynamic);
            assert_eq!(body.contact_mask, category::NONE);
        }

        let frozen_at = state.scene.position(obstacle);
        let player_at = state.player_position();

        // Taps while dead are ignored
        tick(&mut state, &tap(), SIM_DT);
        assert_eq!(state.player_velocity(), Vec2::ZERO);

        run_for(&mut state, &TickInput::default(), 0.4);
        assert_eq!(state.phase, GamePhase::Running);
        assert_eq!(state.scene.position(obstacle), frozen_at);
        assert_eq!(state.scene.position(state.handles.floor), floor_before);
        assert_eq!(state.player_position(), player_at);

        run_for(&mut state, &TickInput::default(), 0.2);
        assert_eq!(state.phase, GamePhase::Finished);
        assert_eq!(state.scene.count(Role::GameOverLabel), 1);

        run_for(&mut state, &TickInput::default(), 10.0);
        assert_eq!(state.obstacles_spawned, 1);
    }

    #[test]
    fn test_falling_to_the_ground_ends_the_run() {
        let mut state = GameState::new(3);
        tick(&mut state, &tap(), SIM_DT);
        run_for(&mut state, &TickInput::default(), 3.0);

        assert_eq!(state.phase, GamePhase::Finished);
        assert_eq!(state.score, 0);
        // Crash came before the first spawn
        assert_eq!(state.obstacles_spawned, 0);
        let events = state.drain_events();
        assert!(events.contains(&GameEvent::Crashed { score: 0 }));
        assert!(events.contains(&GameEvent::GameOverShown { score: 0 }));
    }

    #[test]
    fn test_tap_after_game_over_restarts() {
        let mut state = GameState::new(3);
        tick(&mut state, &tap(), SIM_DT);
        run_for(&mut state, &TickInput::default(), 3.0);
        assert_eq!(state.phase, GamePhase::Finished);

        tick(&mut state, &tap(), SIM_DT);
        assert_eq!(state.phase, GamePhase::Starting);
        assert_eq!(state.score, 0);
        assert_eq!(state.session, 2);
        assert!(state.spawn_timer.is_none());
        assert!(state.game_over_timer.is_none());
        assert_eq!(state.scene.count(Role::GameOverLabel), 0);
        assert_eq!(state.scene.count(Role::Intro), 1);
        assert_ne!(
            state.scene.texture(state.handles.player),
            Some(Texture::PlayerDead)
        );
    }

    #[test]
    fn test_finished_is_terminal_without_restart() {
        let tuning = Tuning {
            allow_restart: false,
            ..Default::default()
        };
        let mut state = GameState::with_tuning(tuning, 3).unwrap();
        tick(&mut state, &tap(), SIM_DT);
        run_for(&mut state, &TickInput::default(), 3.0);
        assert_eq!(state.phase, GamePhase::Finished);

        tick(&mut state, &tap(), SIM_DT);
        assert_eq!(state.phase, GamePhase::Finished);
        assert_eq!(state.session, 1);
    }

    #[test]
    fn test_floor_scroll_is_periodic() {
        let mut state = GameState::new(1);
        let start = state.scene.position(state.handles.floor).unwrap();
        let dt = 1.0 / 64.0;
        let cycle_ticks = (state.tuning.floor_scroll_duration / dt) as usize;

        for _ in 0..cycle_ticks / 2 {
            tick(&mut state, &TickInput::default(), dt);
        }
        let halfway = state.scene.position(state.handles.floor).unwrap();
        assert_eq!(halfway.x, start.x - Texture::Floor.size().x / 4.0);

        for _ in cycle_ticks / 2..cycle_ticks {
            tick(&mut state, &TickInput::default(), dt);
        }
        assert_eq!(state.scene.position(state.handles.floor).unwrap(), start);
    }

    #[test]
    fn test_idle_mode_flies_until_first_obstacle() {
        let mut state = GameState::new(99);
        run_for(&mut state, &idle(), 5.0);
        assert_eq!(state.phase, GamePhase::Running);
        assert!(state.player_alive);
        let y = state.player_position().y;
        assert!(y > state.tuning.floor_top() && y < state.tuning.scene_height);
    }

    #[test]
    fn test_determinism() {
        let mut a = GameState::new(2024);
        let mut b = GameState::new(2024);
        run_for(&mut a, &idle(), 8.0);
        run_for(&mut b, &idle(), 8.0);

        assert_eq!(a.score, b.score);
        assert_eq!(a.player_position(), b.player_position());
        assert_eq!(a.drain_events(), b.drain_events());
        let obstacles = |s: &GameState| -> Vec<Vec2> {
            s.scene
                .entities_with(Role::ObstacleTop)
                .into_iter()
                .filter_map(|e| s.scene.position(e))
                .collect()
        };
        assert_eq!(obstacles(&a), obstacles(&b));
    }
}
