//! Integration test: whole play sessions driven through `Session`
//!
//! Covers the paths a front end sees: tap to start, obstacles scrolling past,
//! scoring through a gap, crashing into an obstacle or the ground, the game
//! over delay, restarting, and feeding the drained events into audio and the
//! leaderboard.

use flappy_dragon::audio::AudioManager;
use flappy_dragon::consts::SIM_DT;
use flappy_dragon::sim::{GameEvent, GamePhase, Role, spawn_pair};
use flappy_dragon::{HighScores, Session, Tuning};
use glam::Vec2;

const FRAME_DT: f32 = 1.0 / 60.0;

/// Gap offset whose score trigger is level with the player's start height
const LEVEL_OFFSET: f32 = 155.0;
/// Gap offset high enough that a hovering player hits the bottom obstacle
const HIGH_OFFSET: f32 = 74.0;

/// Advance in 60 Hz frames, collecting every drained event
fn run(session: &mut Session, seconds: f32) -> Vec<GameEvent> {
    let frames = (seconds / FRAME_DT).ceil() as u32;
    let mut events = Vec::new();
    for _ in 0..frames {
        session.advance(FRAME_DT);
        events.extend(session.drain_events());
    }
    events
}

/// Start a run, then pin the player at its start height with no timed spawns
fn start_hovering(session: &mut Session) {
    session.tap();
    session.advance(SIM_DT);
    session.drain_events();

    let state = &mut session.state;
    assert_eq!(state.phase, GamePhase::Running);
    state.spawn_timer = None;

    let player = state.handles.player;
    if let Some(mut body) = state.scene.body_mut(player) {
        body.dynamic = false;
        body.velocity = Vec2::ZERO;
    }
    let start = state.tuning.player_start();
    state.scene.set_position(player, start);
}

fn count(events: &[GameEvent], pred: impl Fn(&GameEvent) -> bool) -> usize {
    events.iter().filter(|e| pred(e)).count()
}

// =============================================================================
// Scoring
// =============================================================================

#[test]
fn test_flying_through_a_gap_scores_once() {
    let mut session = Session::new(11);
    start_hovering(&mut session);

    let tuning = session.state.tuning.clone();
    spawn_pair(&mut session.state.scene, &tuning, LEVEL_OFFSET, 0);
    assert_eq!(session.state.obstacle_count(), 1);

    let events = run(&mut session, 4.0);

    assert_eq!(session.state.score, 1);
    assert_eq!(
        count(&events, |e| matches!(e, GameEvent::Scored { .. })),
        1
    );
    assert!(session.state.player_alive);
    assert_eq!(session.state.phase, GamePhase::Running);

    let label = session.state.handles.score_label;
    assert_eq!(session.state.scene.label_text(label).as_deref(), Some("1"));

    // The pair is gone once it has fully left the screen
    assert_eq!(session.state.obstacle_count(), 0);
    assert_eq!(session.state.scene.count(Role::ScoreTrigger), 0);
}

#[test]
fn test_obstacles_spawn_on_the_timer() {
    let mut session = Session::new(5);
    session.set_idle_mode(true);

    let events = run(&mut session, 2.4);
    assert_eq!(session.state.obstacle_count(), 0);
    assert_eq!(
        count(&events, |e| matches!(e, GameEvent::ObstacleSpawned { .. })),
        0
    );

    let events = run(&mut session, 0.2);
    assert_eq!(session.state.obstacle_count(), 1);
    let spawned: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            GameEvent::ObstacleSpawned { offset, variant } => Some((*offset, *variant)),
            _ => None,
        })
        .collect();
    assert_eq!(spawned.len(), 1);
    let (offset, variant) = spawned[0];
    assert!((74.0..206.0).contains(&offset));
    assert!(variant < 4);
}

// =============================================================================
// Crashing
// =============================================================================

#[test]
fn test_hitting_an_obstacle_freezes_then_finishes() {
    let mut session = Session::new(3);
    start_hovering(&mut session);

    let tuning = session.state.tuning.clone();
    let pair = spawn_pair(&mut session.state.scene, &tuning, HIGH_OFFSET, 1);

    let events = run(&mut session, 2.6);
    assert!(!session.state.player_alive);
    assert_eq!(session.state.phase, GamePhase::Running);
    assert_eq!(
        count(&events, |e| matches!(e, GameEvent::Crashed { score: 0 })),
        1
    );
    assert!(session.state.spawn_timer.is_none());

    // Everything holds still while the game over label is pending
    let scene = &session.state.scene;
    let obstacle_at = scene.position(pair.bottom);
    let floor_at = scene.position(session.state.handles.floor);

    let events = run(&mut session, 0.6);
    assert_eq!(session.state.phase, GamePhase::Finished);
    assert_eq!(events, vec![GameEvent::GameOverShown { score: 0 }]);
    let scene = &session.state.scene;
    assert_eq!(scene.position(pair.bottom), obstacle_at);
    assert_eq!(scene.position(session.state.handles.floor), floor_at);
    assert_eq!(scene.count(Role::GameOverLabel), 1);
}

#[test]
fn test_falling_onto_the_ground() {
    let mut session = Session::new(8);
    session.tap();

    let events = run(&mut session, 2.0);
    assert_eq!(session.state.phase, GamePhase::Finished);
    assert!(session.state.player_position().y > session.state.tuning.floor_top());
    assert_eq!(
        count(&events, |e| matches!(e, GameEvent::Crashed { .. })),
        1
    );
    assert_eq!(
        count(&events, |e| matches!(e, GameEvent::ObstacleSpawned { .. })),
        0
    );
}

#[test]
fn test_taps_after_crash_do_nothing_until_game_over() {
    let mut session = Session::new(8);
    session.tap();
    run(&mut session, 1.2);
    assert!(!session.state.player_alive);

    session.tap();
    let events = run(&mut session, FRAME_DT);
    assert_eq!(
        count(&events, |e| matches!(e, GameEvent::Flapped { .. })),
        0
    );
}

// =============================================================================
// Restarting
// =============================================================================

#[test]
fn test_restart_after_game_over_clears_the_session() {
    let mut session = Session::new(21);
    start_hovering(&mut session);
    let tuning = session.state.tuning.clone();
    spawn_pair(&mut session.state.scene, &tuning, LEVEL_OFFSET, 2);
    run(&mut session, 3.0);
    assert_eq!(session.state.score, 1);

    // Let the player drop once the gap has been passed
    let player = session.state.handles.player;
    if let Some(mut body) = session.state.scene.body_mut(player) {
        body.dynamic = true;
    }
    run(&mut session, 2.5);
    assert_eq!(session.state.phase, GamePhase::Finished);
    assert_eq!(session.state.score, 1);

    session.tap();
    let events = run(&mut session, FRAME_DT);

    let state = &session.state;
    assert_eq!(state.phase, GamePhase::Starting);
    assert_eq!(state.score, 0);
    assert_eq!(state.session, 2);
    assert_eq!(state.obstacle_count(), 0);
    assert!(state.spawn_timer.is_none());
    assert!(state.game_over_timer.is_none());
    assert_eq!(state.scene.count(Role::Intro), 1);
    assert_eq!(state.scene.count(Role::GameOverLabel), 0);
    assert_eq!(
        events,
        vec![
            GameEvent::SessionStarted { session: 2 },
            GameEvent::MusicRequested
        ]
    );
}

#[test]
fn test_finished_stays_put_when_restart_is_disabled() {
    let tuning = Tuning {
        allow_restart: false,
        ..Default::default()
    };
    let mut session = Session::with_tuning(tuning, 8).unwrap();
    session.tap();
    run(&mut session, 2.0);
    assert_eq!(session.state.phase, GamePhase::Finished);

    session.tap();
    run(&mut session, 1.0);
    assert_eq!(session.state.phase, GamePhase::Finished);
    assert_eq!(session.state.session, 1);
}

// =============================================================================
// Front end bookkeeping
// =============================================================================

#[test]
fn test_events_drive_audio_and_leaderboard() {
    let mut session = Session::new(13);
    let mut audio = AudioManager::new();
    let mut highscores = HighScores::new();

    for event in session.drain_events() {
        audio.handle_event(&event);
    }
    assert!(audio.is_music_playing());

    start_hovering(&mut session);
    let tuning = session.state.tuning.clone();
    spawn_pair(&mut session.state.scene, &tuning, LEVEL_OFFSET, 3);
    run(&mut session, 3.0);

    let player = session.state.handles.player;
    if let Some(mut body) = session.state.scene.body_mut(player) {
        body.dynamic = true;
    }

    let mut ranks = Vec::new();
    for event in run(&mut session, 2.5) {
        audio.handle_event(&event);
        if let GameEvent::GameOverShown { score } = event {
            ranks.push(highscores.add_score(score, 1_000.0));
        }
    }

    assert_eq!(ranks, vec![Some(1)]);
    assert_eq!(highscores.top_score(), Some(1));

    // A restart asks for music again, but it keeps playing as one loop
    session.tap();
    for event in run(&mut session, FRAME_DT) {
        audio.handle_event(&event);
    }
    assert!(audio.is_music_playing());
    assert!(!audio.start_music());
}

#[test]
fn test_same_seed_same_session() {
    let play = |seed: u64| {
        let mut session = Session::new(seed);
        session.set_idle_mode(true);
        let events = run(&mut session, 6.0);
        (events, session.state.player_position(), session.state.score)
    };

    assert_eq!(play(77), play(77));
}
