//! Player preferences
//!
//! Held in memory for as long as the page is open; every load starts from
//! the defaults.

use crate::audio::AudioManager;

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    // === HUD ===
    /// Show FPS counter
    pub show_fps: bool,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Music volume (0.0 - 1.0)
    pub music_volume: f32,
    /// Everything silent
    pub muted: bool,
    /// Mute when window loses focus
    pub mute_on_blur: bool,

    // === Demo ===
    /// Let the autopilot play until the first real tap
    pub attract_mode: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            // HUD
            show_fps: false,

            // Audio
            master_volume: 0.8,
            sfx_volume: 1.0,
            music_volume: 0.7,
            muted: false,
            mute_on_blur: true,

            attract_mode: false,
        }
    }
}

impl Settings {
    /// Push the audio preferences into the mixer
    pub fn apply_to(&self, audio: &mut AudioManager) {
        audio.set_master_volume(self.master_volume);
        audio.set_sfx_volume(self.sfx_volume);
        audio.set_music_volume(self.music_volume);
        audio.set_muted(self.muted);
    }

    /// Whether audio should be silenced right now
    pub fn should_mute(&self, focused: bool) -> bool {
        self.muted || (self.mute_on_blur && !focused)
    }
}
