//! Built-in sample banks and name→index registries
//!
//! Built-in registries are computed once from configuration and never change
//! for the session. Playback indices follow bank order, so generated kicks are
//! addressed from `kick_bank.len()` upwards.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One built-in sample: display name and location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankEntry {
    pub name: String,
    pub url: String,
}

impl BankEntry {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// Which engine bank a sample belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BankKind {
    Kick,
    Noise,
    ImpulseResponse,
}

impl BankKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Kick => "kick",
            Self::Noise => "noise",
            Self::ImpulseResponse => "impulse response",
        }
    }
}

pub fn default_kick_bank() -> Vec<BankEntry> {
    ["Punch", "Rumble", "Thud", "Boom", "Click"]
        .iter()
        .map(|name| {
            BankEntry::new(*name, format!("/samples/kicks/{}.wav", name.to_lowercase()))
        })
        .collect()
}

pub fn default_noise_bank() -> Vec<BankEntry> {
    ["Vinyl", "Hiss", "Rain", "Tape"]
        .iter()
        .map(|name| {
            BankEntry::new(*name, format!("/samples/noise/{}.wav", name.to_lowercase()))
        })
        .collect()
}

pub fn default_ir_bank() -> Vec<BankEntry> {
    ["Hall", "Plate", "Room", "Spring"]
        .iter()
        .map(|name| BankEntry::new(*name, format!("/samples/irs/{}.wav", name.to_lowercase())))
        .collect()
}

/// Immutable name→index map for one bank
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SampleRegistry {
    names: Vec<String>,
    indices: HashMap<String, usize>,
}

impl SampleRegistry {
    /// Build from bank entries; the first occurrence of a name wins
    pub fn from_entries(entries: &[BankEntry]) -> Self {
        let mut names = Vec::with_capacity(entries.len());
        let mut indices = HashMap::with_capacity(entries.len());
        for (index, entry) in entries.iter().enumerate() {
            names.push(entry.name.clone());
            indices.entry(entry.name.clone()).or_insert(index);
        }
        Self { names, indices }
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.indices.get(name).copied()
    }

    /// Names in bank order
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn first(&self) -> Option<&str> {
        self.names.first().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Registries for all three built-in banks
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuiltinRegistries {
    pub kicks: SampleRegistry,
    pub noises: SampleRegistry,
    pub impulse_responses: SampleRegistry,
}

impl BuiltinRegistries {
    pub fn new(kick_bank: &[BankEntry], noise_bank: &[BankEntry], ir_bank: &[BankEntry]) -> Self {
        Self {
            kicks: SampleRegistry::from_entries(kick_bank),
            noises: SampleRegistry::from_entries(noise_bank),
            impulse_responses: SampleRegistry::from_entries(ir_bank),
        }
    }

    pub fn get(&self, kind: BankKind) -> &SampleRegistry {
        match kind {
            BankKind::Kick => &self.kicks,
            BankKind::Noise => &self.noises,
            BankKind::ImpulseResponse => &self.impulse_responses,
        }
    }
}
