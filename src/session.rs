//! Fixed-timestep driver
//!
//! Turns variable frame deltas into whole `SIM_DT` ticks and carries one-shot
//! input (taps) to the first tick that runs.

use crate::consts::{MAX_FRAME_DT, MAX_SUBSTEPS, SIM_DT};
use crate::sim::{GameEvent, GameState, TickInput, tick};
use crate::tuning::{Tuning, TuningError};

pub struct Session {
    pub state: GameState,
    accumulator: f32,
    input: TickInput,
}

impl Session {
    pub fn new(seed: u64) -> Self {
        Self::from_state(GameState::new(seed))
    }

    pub fn with_tuning(tuning: Tuning, seed: u64) -> Result<Self, TuningError> {
        Ok(Self::from_state(GameState::with_tuning(tuning, seed)?))
    }

    fn from_state(state: GameState) -> Self {
        Self {
            state,
            accumulator: 0.0,
            input: TickInput::default(),
        }
    }

    /// Queue a tap for the next tick
    pub fn tap(&mut self) {
        self.input.tap = true;
    }

    /// Let the game play itself
    pub fn set_idle_mode(&mut self, idle: bool) {
        self.input.idle_mode = idle;
    }

    pub fn idle_mode(&self) -> bool {
        self.input.idle_mode
    }

    /// Run as many ticks as `frame_dt` covers; returns how many ran
    pub fn advance(&mut self, frame_dt: f32) -> u32 {
        let dt = frame_dt.clamp(0.0, MAX_FRAME_DT);
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            let input = self.input.clone();
            tick(&mut self.state, &input, SIM_DT);
            self.accumulator -= SIM_DT;
            substeps += 1;

            // Clear one-shot inputs after processing
            self.input.tap = false;
        }

        // Drop time we couldn't catch up on
        if substeps == MAX_SUBSTEPS {
            self.accumulator = self.accumulator.min(SIM_DT);
        }
        substeps
    }

    /// Interpolation factor between the last tick and the next
    pub fn alpha(&self) -> f32 {
        self.accumulator / SIM_DT
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.state.drain_events()
    }

    /// Throw the current game away and start over with a new seed
    pub fn reset(&mut self, seed: u64) {
        let tuning = self.state.tuning.clone();
        let idle = self.input.idle_mode;
        self.state = match GameState::with_tuning(tuning, seed) {
            Ok(state) => state,
            Err(e) => {
                log::warn!("Tuning rejected on reset, using defaults: {e}");
                GameState::new(seed)
            }
        };
        self.accumulator = 0.0;
        self.input = TickInput {
            tap: false,
            idle_mode: idle,
        };
    }
}
