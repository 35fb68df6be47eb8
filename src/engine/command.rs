//! Engine command protocol
//!
//! Every message posted to the audio engine is one variant of
//! [`EngineCommand`], so a malformed payload cannot be constructed. The serde
//! representation matches the worklet's `{ "type": ..., ...payload }` shape.

use serde::{Deserialize, Serialize};

/// Outbound, fire-and-forget message to the audio engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EngineCommand {
    /// Engine bytecode handed over during the startup handshake
    Init {
        #[serde(rename = "scriptCode")]
        script_code: String,
    },

    /// Append a mono kick sample to the kick bank
    LoadKickSample { samples: Vec<f32> },

    /// Append a mono noise sample to the noise bank
    LoadNoiseSample { samples: Vec<f32> },

    /// Append an impulse response; stereo IRs are interleaved
    #[serde(rename = "loadIR")]
    LoadIr {
        #[serde(rename = "irSamples")]
        ir_samples: Vec<f32>,
        #[serde(rename = "irLength")]
        ir_length: usize,
        #[serde(rename = "numChannels")]
        num_channels: usize,
    },

    SelectKickSample { index: usize },
    SelectNoiseSample { index: usize },
    #[serde(rename = "selectIR")]
    SelectIr { index: usize },

    KickLength { value: f32 },
    KickDistortion { value: f32 },
    #[serde(rename = "kickOTT")]
    KickOtt { value: f32 },

    NoiseVolume { value: f32 },
    NoiseLowPass { value: f32 },
    NoiseHighPass { value: f32 },

    ReverbLowPass { value: f32 },
    ReverbHighPass { value: f32 },
    ReverbVolume { value: f32 },

    #[serde(rename = "masterOTT")]
    MasterOtt { value: f32 },
    MasterDistortion { value: f32 },
    MasterLimiter { value: f32 },

    Bpm { value: f32 },
    Loop { enabled: bool },
    Cue,
    CueRelease,
}

impl EngineCommand {
    /// Wire name of the command, used for logging
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Init { .. } => "init",
            Self::LoadKickSample { .. } => "loadKickSample",
            Self::LoadNoiseSample { .. } => "loadNoiseSample",
            Self::LoadIr { .. } => "loadIR",
            Self::SelectKickSample { .. } => "selectKickSample",
            Self::SelectNoiseSample { .. } => "selectNoiseSample",
            Self::SelectIr { .. } => "selectIR",
            Self::KickLength { .. } => "kickLength",
            Self::KickDistortion { .. } => "kickDistortion",
            Self::KickOtt { .. } => "kickOTT",
            Self::NoiseVolume { .. } => "noiseVolume",
            Self::NoiseLowPass { .. } => "noiseLowPass",
            Self::NoiseHighPass { .. } => "noiseHighPass",
            Self::ReverbLowPass { .. } => "reverbLowPass",
            Self::ReverbHighPass { .. } => "reverbHighPass",
            Self::ReverbVolume { .. } => "reverbVolume",
            Self::MasterOtt { .. } => "masterOTT",
            Self::MasterDistortion { .. } => "masterDistortion",
            Self::MasterLimiter { .. } => "masterLimiter",
            Self::Bpm { .. } => "bpm",
            Self::Loop { .. } => "loop",
            Self::Cue => "cue",
            Self::CueRelease => "cueRelease",
        }
    }

    /// True for commands that move a sample buffer into the engine
    pub fn carries_buffer(&self) -> bool {
        matches!(
            self,
            Self::LoadKickSample { .. } | Self::LoadNoiseSample { .. } | Self::LoadIr { .. }
        )
    }
}

/// Inbound message from the audio engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EngineEvent {
    /// Handshake acknowledgement after `init`
    Ready,
}
