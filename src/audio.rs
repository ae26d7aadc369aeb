//! Audio system using Web Audio API
//!
//! Procedurally generated sound effects and music - no external files needed!
//! Native builds have no audio output and log the cues instead.

#[cfg(target_arch = "wasm32")]
use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

use crate::sim::GameEvent;

/// Music plays this much quieter than the music volume setting
pub const MUSIC_LEVEL: f32 = 0.1;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Passed through a gap
    Score,
    /// Crashed into an obstacle or the ground
    Hit,
}

impl SoundEffect {
    /// The cue a game event should make, if any
    pub fn for_event(event: &GameEvent) -> Option<Self> {
        match event {
            GameEvent::Scored { .. } => Some(SoundEffect::Score),
            GameEvent::Crashed { .. } => Some(SoundEffect::Hit),
            _ => None,
        }
    }
}

/// Oscillators making up the background loop
#[cfg(target_arch = "wasm32")]
struct MusicNodes {
    oscillators: Vec<OscillatorNode>,
    gain: GainNode,
}

/// Audio manager for the game
pub struct AudioManager {
    #[cfg(target_arch = "wasm32")]
    ctx: Option<AudioContext>,
    #[cfg(target_arch = "wasm32")]
    music: Option<MusicNodes>,
    master_volume: f32,
    sfx_volume: f32,
    music_volume: f32,
    muted: bool,
    music_playing: bool,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioManager {
    pub fn new() -> Self {
        Self {
            #[cfg(target_arch = "wasm32")]
            ctx: {
                // May fail outside a secure context
                let ctx = AudioContext::new().ok();
                if ctx.is_none() {
                    log::warn!("Failed to create AudioContext - audio disabled");
                }
                ctx
            },
            #[cfg(target_arch = "wasm32")]
            music: None,
            master_volume: 0.8,
            sfx_volume: 1.0,
            music_volume: 0.5,
            muted: false,
            music_playing: false,
        }
    }

    /// Resume audio context (required after user gesture)
    #[cfg(target_arch = "wasm32")]
    pub fn resume(&self) {
        if let Some(ctx) = &self.ctx {
            let _ = ctx.resume();
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn resume(&self) {}

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
        self.update_music_gain();
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    /// Set music volume (0.0 - 1.0)
    pub fn set_music_volume(&mut self, vol: f32) {
        self.music_volume = vol.clamp(0.0, 1.0);
        self.update_music_gain();
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        self.update_music_gain();
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn is_music_playing(&self) -> bool {
        self.music_playing
    }

    /// Effective sound effect volume
    pub fn effect_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    /// Effective background music volume
    pub fn music_gain(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.music_volume * MUSIC_LEVEL
        }
    }

    /// React to one game event
    pub fn handle_event(&mut self, event: &GameEvent) {
        if matches!(event, GameEvent::MusicRequested) {
            self.start_music();
        } else if let Some(effect) = SoundEffect::for_event(event) {
            self.play(effect);
        }
    }

    /// Play a sound effect
    pub fn play(&self, effect: SoundEffect) {
        let vol = self.effect_volume();
        if vol <= 0.0 {
            return;
        }

        self.output(effect, vol);
    }

    #[cfg(target_arch = "wasm32")]
    fn output(&self, effect: SoundEffect, vol: f32) {
        let Some(ctx) = &self.ctx else { return };

        // Resume context if suspended (browsers require user gesture)
        if ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = ctx.resume();
        }

        match effect {
            SoundEffect::Score => self.play_score(ctx, vol),
            SoundEffect::Hit => self.play_hit(ctx, vol),
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn output(&self, effect: SoundEffect, vol: f32) {
        log::debug!("sfx {effect:?} at volume {vol:.2}");
    }

    /// Start the background loop; returns false if it was already playing
    pub fn start_music(&mut self) -> bool {
        if self.music_playing {
            return false;
        }

        if !self.output_music() {
            return false;
        }
        self.music_playing = true;
        true
    }

    #[cfg(target_arch = "wasm32")]
    fn output_music(&mut self) -> bool {
        let Some(ctx) = &self.ctx else { return false };
        let Some(nodes) = self.create_music(ctx) else {
            log::warn!("Failed to start background music");
            return false;
        };
        self.music = Some(nodes);
        true
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn output_music(&mut self) -> bool {
        log::debug!("music loop started at volume {:.3}", self.music_gain());
        true
    }

    pub fn stop_music(&mut self) {
        #[cfg(target_arch = "wasm32")]
        if let Some(music) = self.music.take() {
            for osc in &music.oscillators {
                osc.stop().ok();
            }
        }
        self.music_playing = false;
    }

    #[cfg(target_arch = "wasm32")]
    fn update_music_gain(&self) {
        if let Some(music) = &self.music {
            music.gain.gain().set_value(self.music_gain());
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn update_music_gain(&self) {}

    // === Sound generators ===

    /// Create an oscillator with gain envelope
    #[cfg(target_arch = "wasm32")]
    fn create_osc(
        &self,
        ctx: &AudioContext,
        freq: f32,
        osc_type: OscillatorType,
    ) -> Option<(OscillatorNode, GainNode)> {
        let osc = ctx.create_oscillator().ok()?;
        let gain = ctx.create_gain().ok()?;

        osc.set_type(osc_type);
        osc.frequency().set_value(freq);
        osc.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(&ctx.destination()).ok()?;

        Some((osc, gain))
    }

    /// Score - bright rising two-note chime
    #[cfg(target_arch = "wasm32")]
    fn play_score(&self, ctx: &AudioContext, vol: f32) {
        for (i, freq) in [880.0, 1320.0].iter().enumerate() {
            let delay = i as f64 * 0.07;
            if let Some((osc, gain)) = self.create_osc(ctx, *freq, OscillatorType::Triangle) {
                let t = ctx.current_time() + delay;
                gain.gain().set_value_at_time(vol * 0.3, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.15)
                    .ok();
                osc.start_with_when(t).ok();
                osc.stop_with_when(t + 0.2).ok();
            }
        }
    }

    /// Hit - heavy thud with a short crunch
    #[cfg(target_arch = "wasm32")]
    fn play_hit(&self, ctx: &AudioContext, vol: f32) {
        let t = ctx.current_time();

        if let Some((osc, gain)) = self.create_osc(ctx, 160.0, OscillatorType::Sine) {
            gain.gain().set_value_at_time(vol * 0.6, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.3)
                .ok();
            osc.frequency().set_value_at_time(160.0, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(40.0, t + 0.3)
                .ok();
            osc.start().ok();
            osc.stop_with_when(t + 0.35).ok();
        }

        if let Some((osc, gain)) = self.create_osc(ctx, 900.0, OscillatorType::Sawtooth) {
            gain.gain().set_value_at_time(vol * 0.2, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.08)
                .ok();
            osc.frequency().set_value_at_time(900.0, t).ok();
            osc.frequency().set_value_at_time(300.0, t + 0.03).ok();
            osc.frequency().set_value_at_time(600.0, t + 0.05).ok();
            osc.start().ok();
            osc.stop_with_when(t + 0.1).ok();
        }
    }

    /// Background drone: root and fifth, quietly, until stopped
    #[cfg(target_arch = "wasm32")]
    fn create_music(&self, ctx: &AudioContext) -> Option<MusicNodes> {
        let gain = ctx.create_gain().ok()?;
        gain.gain().set_value(self.music_gain());
        gain.connect_with_audio_node(&ctx.destination()).ok()?;

        let mut oscillators = Vec::new();
        for (freq, osc_type) in [(110.0, OscillatorType::Sine), (165.0, OscillatorType::Triangle)] {
            let osc = ctx.create_oscillator().ok()?;
            osc.set_type(osc_type);
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).ok()?;
            osc.start().ok()?;
            oscillators.push(osc);
        }

        Some(MusicNodes { oscillators, gain })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effects_for_events() {
        assert_eq!(
            SoundEffect::for_event(&GameEvent::Scored { score: 3 }),
            Some(SoundEffect::Score)
        );
        assert_eq!(
            SoundEffect::for_event(&GameEvent::Crashed { score: 3 }),
            Some(SoundEffect::Hit)
        );
        assert_eq!(SoundEffect::for_event(&GameEvent::RunStarted), None);
        assert_eq!(
            SoundEffect::for_event(&GameEvent::Flapped { velocity: 300.0 }),
            None
        );
    }

    #[test]
    fn test_music_starts_once() {
        let mut audio = AudioManager::new();
        assert!(audio.start_music());
        assert!(!audio.start_music());
        audio.handle_event(&GameEvent::MusicRequested);
        assert!(audio.is_music_playing());

        audio.stop_music();
        assert!(!audio.is_music_playing());
        assert!(audio.start_music());
    }

    #[test]
    fn test_music_is_quiet() {
        let mut audio = AudioManager::new();
        audio.set_master_volume(1.0);
        audio.set_music_volume(1.0);
        assert_eq!(audio.music_gain(), MUSIC_LEVEL);
    }

    #[test]
    fn test_mute_silences_everything() {
        let mut audio = AudioManager::new();
        audio.set_muted(true);
        assert_eq!(audio.effect_volume(), 0.0);
        assert_eq!(audio.music_gain(), 0.0);
        audio.set_muted(false);
        assert!(audio.effect_volume() > 0.0);
    }

    #[test]
    fn test_volumes_are_clamped() {
        let mut audio = AudioManager::new();
        audio.set_master_volume(2.0);
        audio.set_sfx_volume(-1.0);
        assert_eq!(audio.effect_volume(), 0.0);
        audio.set_sfx_volume(1.0);
        assert_eq!(audio.effect_volume(), 1.0);
    }
}
