//! Preset model
//!
//! A preset is a named snapshot of every layer plus tempo. On the wire the
//! layer states are flattened into one object:
//!
//! ```json
//! {"id": 4, "preset_name": "Init", "is_shared": true, "bpm": 140,
//!  "kick_sample": "Punch", "kick_len": 1.0, ...}
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{KicklabError, Result};
use crate::layers::kick::KickState;
use crate::layers::master::MasterState;
use crate::layers::noise::NoiseState;
use crate::layers::reverb::ReverbState;

/// Longest accepted preset name, in characters
pub const MAX_PRESET_NAME_LEN: usize = 32;

/// Name of the shared preset applied after every load
pub const DEFAULT_PRESET_NAME: &str = "Init";

/// Full snapshot of all layers and tempo
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresetParams {
    pub bpm: u16,
    #[serde(flatten)]
    pub kick: KickState,
    #[serde(flatten)]
    pub noise: NoiseState,
    #[serde(flatten)]
    pub reverb: ReverbState,
    #[serde(flatten)]
    pub master: MasterState,
}

/// Address of a preset
///
/// Shared and user presets are numbered independently, so the id alone is
/// ambiguous.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PresetKey {
    pub id: u64,
    pub shared: bool,
}

impl PresetKey {
    pub fn shared(id: u64) -> Self {
        Self { id, shared: true }
    }

    pub fn user(id: u64) -> Self {
        Self { id, shared: false }
    }
}

/// A stored preset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub preset_name: String,
    #[serde(default)]
    pub is_shared: bool,
    #[serde(flatten)]
    pub params: PresetParams,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Preset {
    pub fn key(&self) -> Option<PresetKey> {
        self.id.map(|id| PresetKey {
            id,
            shared: self.is_shared,
        })
    }
}

/// Request body for creating or updating a user preset
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PresetDraft {
    pub preset_name: String,
    pub is_shared: bool,
    #[serde(flatten)]
    pub params: PresetParams,
}

impl PresetDraft {
    pub fn new(preset_name: impl Into<String>, params: PresetParams) -> Self {
        Self {
            preset_name: preset_name.into(),
            is_shared: false,
            params,
        }
    }
}

/// Validate a preset name, returning it trimmed
///
/// Accepts 1 to 32 characters made of letters, digits and spaces.
pub fn validate_preset_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    let invalid = |reason: &str| KicklabError::InvalidPresetName {
        name: name.to_string(),
        reason: reason.to_string(),
    };

    if trimmed.is_empty() {
        return Err(invalid("name is empty"));
    }
    if trimmed.chars().count() > MAX_PRESET_NAME_LEN {
        return Err(invalid("name is longer than 32 characters"));
    }
    if !trimmed.chars().all(|c| c.is_alphanumeric() || c == ' ') {
        return Err(invalid("only letters, digits and spaces are allowed"));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    pub(crate) fn sample_params() -> PresetParams {
        PresetParams {
            bpm: 150,
            kick: KickState {
                kick_sample: "Thud".to_string(),
                kick_len: 0.5,
                kick_dist_amt: 0.2,
                kick_ott_amt: 0.1,
            },
            noise: NoiseState {
                noise_sample: "Hiss".to_string(),
                noise_low_pass_freq: 8000.0,
                noise_high_pass_freq: 120.0,
                noise_volume: -30.0,
            },
            reverb: ReverbState {
                reverb_sample: "Plate".to_string(),
                reverb_low_pass_freq: 6000.0,
                reverb_high_pass_freq: 300.0,
                reverb_volume: -12.0,
            },
            master: MasterState {
                master_ott_amt: 0.3,
                master_dist_amt: 0.0,
                master_limiter_amt: 2.0,
            },
        }
    }

    #[test_case("Init" ; "simple")]
    #[test_case("  Big Room 2  " ; "trimmed")]
    #[test_case("Überbass" ; "unicode letters")]
    fn test_valid_names(name: &str) {
        assert_eq!(validate_preset_name(name).unwrap(), name.trim());
    }

    #[test_case("" ; "empty")]
    #[test_case("   " ; "blank")]
    #[test_case("My Kick!!" ; "punctuation")]
    #[test_case("under_score" ; "underscore")]
    #[test_case("abcdefghijklmnopqrstuvwxyz1234567" ; "thirty three chars")]
    fn test_invalid_names(name: &str) {
        assert!(matches!(
            validate_preset_name(name),
            Err(KicklabError::InvalidPresetName { .. })
        ));
    }

    #[test]
    fn test_thirty_two_chars_allowed() {
        let name = "a".repeat(32);
        assert_eq!(validate_preset_name(&name).unwrap(), name);
    }

    #[test]
    fn test_wire_shape_is_flat() {
        let raw = serde_json::json!({
            "id": 3,
            "preset_name": "Drop",
            "is_shared": false,
            "bpm": 150,
            "kick_sample": "Thud",
            "kick_len": 0.5,
            "kick_dist_amt": 0.2,
            "kick_ott_amt": 0.1,
            "noise_sample": "Hiss",
            "noise_low_pass_freq": 8000.0,
            "noise_high_pass_freq": 120.0,
            "noise_volume": -30.0,
            "reverb_sample": "Plate",
            "reverb_low_pass_freq": 6000.0,
            "reverb_high_pass_freq": 300.0,
            "reverb_volume": -12.0,
            "master_ott_amt": 0.3,
            "master_dist_amt": 0.0,
            "master_limiter_amt": 2.0,
            "created_at": "2025-03-01T12:00:00Z",
            "updated_at": "2025-03-02T08:30:00Z"
        });

        let preset: Preset = serde_json::from_value(raw).unwrap();
        assert_eq!(preset.key(), Some(PresetKey::user(3)));
        assert_eq!(preset.params, sample_params());
        assert!(preset.updated_at.is_some());

        let draft = serde_json::to_value(PresetDraft::new("Drop", sample_params())).unwrap();
        assert_eq!(draft["kick_sample"], "Thud");
        assert_eq!(draft["is_shared"], false);
        assert!(draft.get("kick").is_none());
    }
}
