//! Transport State Machine
//!
//! Play/stop, the momentary cue trigger and tempo. Looping itself runs inside
//! the engine; the transport only switches it on and off.
//!
//! Cue is orthogonal to play state: it can be pressed while stopped or
//! playing.

use std::fmt;

use tracing::debug;

use crate::engine::command::EngineCommand;
use crate::engine::gateway::{AudioOutput, EngineHandle};
use crate::error::{KicklabError, Result};

/// Lowest committed tempo
pub const BPM_MIN: u16 = 110;

/// Highest committed tempo
pub const BPM_MAX: u16 = 365;

pub const DEFAULT_BPM: u16 = 140;

/// Clamp a tempo into `[BPM_MIN, BPM_MAX]`
pub fn clamp_bpm(bpm: u16) -> u16 {
    bpm.clamp(BPM_MIN, BPM_MAX)
}

/// Transport states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportState {
    #[default]
    Stopped,
    Playing,
}

impl fmt::Display for TransportState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportState::Stopped => write!(f, "Stopped"),
            TransportState::Playing => write!(f, "Playing"),
        }
    }
}

/// Play state, cue flag and tempo
///
/// Tempo and loop state follow the same readiness gating as layer
/// parameters: held while the engine is not ready, delivered on flush.
/// Cue triggers are momentary and are dropped while not ready.
#[derive(Debug, Clone)]
pub struct TransportController {
    engine: EngineHandle,
    state: TransportState,
    cue_pressed: bool,
    bpm: u16,
    bpm_pending: bool,
    loop_pending: bool,
}

impl TransportController {
    pub fn new(engine: EngineHandle) -> Self {
        Self {
            engine,
            state: TransportState::Stopped,
            cue_pressed: false,
            bpm: DEFAULT_BPM,
            bpm_pending: true,
            loop_pending: true,
        }
    }

    // ========================================================================
    // Play / Stop
    // ========================================================================

    /// Toggle `Stopped <-> Playing` from a user gesture
    ///
    /// Audio output is resumed first; if that fails the state is unchanged.
    pub fn handle_play_click(&mut self, output: &mut impl AudioOutput) -> Result<TransportState> {
        output.resume()?;
        self.state = match self.state {
            TransportState::Stopped => TransportState::Playing,
            TransportState::Playing => TransportState::Stopped,
        };
        debug!("[TRANSPORT] {}", self.state);
        self.send_loop();
        Ok(self.state)
    }

    /// Force `Stopped`; no-op when already stopped
    pub fn stop(&mut self) {
        if self.state == TransportState::Stopped {
            return;
        }
        self.state = TransportState::Stopped;
        debug!("[TRANSPORT] Stopped");
        self.send_loop();
    }

    fn send_loop(&mut self) {
        if self.engine.is_ready() {
            self.loop_pending = false;
            self.engine.post(EngineCommand::Loop {
                enabled: self.is_playing(),
            });
        } else {
            self.loop_pending = true;
        }
    }

    // ========================================================================
    // Cue
    // ========================================================================

    /// One-shot trigger; dropped while the engine is not ready
    pub fn cue_press(&mut self) {
        if !self.engine.is_ready() {
            debug!("[TRANSPORT] Cue ignored, engine not ready");
            return;
        }
        self.cue_pressed = true;
        self.engine.post(EngineCommand::Cue);
    }

    pub fn cue_release(&mut self) {
        if !self.cue_pressed {
            return;
        }
        self.cue_pressed = false;
        if self.engine.is_ready() {
            self.engine.post(EngineCommand::CueRelease);
        }
    }

    // ========================================================================
    // Tempo
    // ========================================================================

    /// Set the tempo, clamped; returns the stored value
    pub fn set_bpm(&mut self, bpm: u16) -> u16 {
        let bpm = clamp_bpm(bpm);
        if bpm == self.bpm {
            return bpm;
        }
        self.bpm = bpm;
        if self.engine.is_ready() {
            self.bpm_pending = false;
            self.engine.post(EngineCommand::Bpm { value: bpm as f32 });
        } else {
            self.bpm_pending = true;
        }
        bpm
    }

    /// Deliver held tempo and loop state
    pub fn flush(&mut self) {
        if !self.engine.is_ready() {
            return;
        }
        if self.bpm_pending {
            self.bpm_pending = false;
            self.engine.post(EngineCommand::Bpm {
                value: self.bpm as f32,
            });
        }
        if self.loop_pending {
            self.loop_pending = false;
            self.engine.post(EngineCommand::Loop {
                enabled: self.is_playing(),
            });
        }
    }

    // ========================================================================
    // State Queries
    // ========================================================================

    pub fn state(&self) -> TransportState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == TransportState::Playing
    }

    pub fn is_cue_pressed(&self) -> bool {
        self.cue_pressed
    }

    pub fn bpm(&self) -> u16 {
        self.bpm
    }
}

/// Text state of the tempo field
///
/// Keystrokes update the text freely. A keystroke that parses to an in-range
/// tempo is applied live; anything else waits for commit (blur or enter),
/// which clamps a number or reverts unparsable text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TempoEntry {
    text: String,
}

impl TempoEntry {
    pub fn new(bpm: u16) -> Self {
        Self {
            text: bpm.to_string(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replace the field text; returns the tempo applied live, if any
    pub fn input(&mut self, text: &str, transport: &mut TransportController) -> Option<u16> {
        self.text = text.to_string();
        let bpm = parse_bpm(text)?;
        if (BPM_MIN..=BPM_MAX).contains(&bpm) {
            Some(transport.set_bpm(bpm))
        } else {
            None
        }
    }

    /// Commit the field text
    pub fn commit(&mut self, transport: &mut TransportController) -> Result<u16> {
        match parse_bpm(&self.text) {
            Some(bpm) => {
                let bpm = transport.set_bpm(bpm);
                self.text = bpm.to_string();
                Ok(bpm)
            }
            None => {
                let input = std::mem::replace(&mut self.text, transport.bpm().to_string());
                Err(KicklabError::InvalidTempo { input })
            }
        }
    }

    /// Show the transport's current tempo (after a preset load)
    pub fn sync(&mut self, transport: &TransportController) {
        self.text = transport.bpm().to_string();
    }
}

fn parse_bpm(text: &str) -> Option<u16> {
    let value: f64 = text.trim().parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    Some(value.round().clamp(0.0, u16::MAX as f64) as u16)
}
