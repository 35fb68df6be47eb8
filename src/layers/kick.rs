//! Kick layer: sample selection across built-in and generated kicks, plus
//! length, distortion and OTT.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::engine::command::EngineCommand;
use crate::engine::gateway::EngineHandle;
use crate::engine::samples::{BankKind, SampleRegistry};
use crate::layers::LayerController;
use crate::layers::param::{LayerParam, ParamBank, SampleSlot};
use crate::mapping::ParamMapping;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KickParam {
    /// Playback length as a ratio of the sample
    Length,
    Distortion,
    Ott,
}

impl LayerParam for KickParam {
    const ALL: &'static [Self] = &[KickParam::Length, KickParam::Distortion, KickParam::Ott];

    fn key(self) -> &'static str {
        match self {
            KickParam::Length => "kick_len",
            KickParam::Distortion => "kick_dist_amt",
            KickParam::Ott => "kick_ott_amt",
        }
    }

    fn mapping(self) -> ParamMapping {
        match self {
            KickParam::Length => ParamMapping::power(0.1, 1.0),
            KickParam::Distortion | KickParam::Ott => ParamMapping::linear(0.0, 1.0),
        }
    }

    fn default_native(self) -> f64 {
        match self {
            KickParam::Length => 1.0,
            KickParam::Distortion | KickParam::Ott => 0.0,
        }
    }

    fn command(self, value: f32) -> EngineCommand {
        match self {
            KickParam::Length => EngineCommand::KickLength { value },
            KickParam::Distortion => EngineCommand::KickDistortion { value },
            KickParam::Ott => EngineCommand::KickOtt { value },
        }
    }
}

/// Snapshot of the kick layer under its flattened preset names
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KickState {
    pub kick_sample: String,
    pub kick_len: f64,
    pub kick_dist_amt: f64,
    pub kick_ott_amt: f64,
}

pub struct KickLayer {
    params: ParamBank<KickParam>,
    sample: SampleSlot,
    builtin: SampleRegistry,
    generated: BTreeMap<String, usize>,
}

impl KickLayer {
    pub fn new(engine: EngineHandle, builtin: SampleRegistry) -> Self {
        let initial = builtin.first().unwrap_or_default().to_string();
        Self {
            params: ParamBank::new(engine.clone()),
            sample: SampleSlot::new(engine, BankKind::Kick, initial),
            builtin,
            generated: BTreeMap::new(),
        }
    }

    /// Playback index for a kick name; built-ins shadow generated names
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.builtin
            .index_of(name)
            .or_else(|| self.generated.get(name).copied())
    }

    /// Selectable names: built-ins in bank order, then generated names sorted
    pub fn available_samples(&self) -> Vec<String> {
        self.builtin
            .names()
            .iter()
            .cloned()
            .chain(
                self.generated
                    .keys()
                    .filter(|name| self.builtin.index_of(name).is_none())
                    .cloned(),
            )
            .collect()
    }

    /// Add or replace generated name→index entries
    ///
    /// A pending selection naming one of them is delivered right away.
    pub fn merge_generated(&mut self, entries: impl IntoIterator<Item = (String, usize)>) {
        for (name, index) in entries {
            debug!("[KICK] Generated sample '{}' at index {}", name, index);
            self.generated.insert(name, index);
        }
        let index = self.index_of(self.sample.selected());
        self.sample.flush(index);
    }

    pub fn remove_generated(&mut self, name: &str) -> Option<usize> {
        self.generated.remove(name)
    }

    /// Forget every generated kick (session change)
    pub fn clear_generated(&mut self) {
        self.generated.clear();
    }

    pub fn generated(&self) -> &BTreeMap<String, usize> {
        &self.generated
    }

    pub fn set_kick_sample(&mut self, name: &str) {
        let index = self.index_of(name);
        self.sample.select(name, index);
    }

    pub fn set(&mut self, param: KickParam, native: f64) -> f64 {
        self.params.set_native(param, native)
    }

    pub fn set_normalized(&mut self, param: KickParam, normalized: f64) -> f64 {
        self.params.set_normalized(param, normalized)
    }

    pub fn get(&self, param: KickParam) -> f64 {
        self.params.native(param)
    }

    pub fn normalized(&self, param: KickParam) -> f64 {
        self.params.normalized(param)
    }

    pub fn kick_sample(&self) -> &str {
        self.sample.selected()
    }
}

impl LayerController for KickLayer {
    type State = KickState;

    fn state(&self) -> KickState {
        KickState {
            kick_sample: self.sample.selected().to_string(),
            kick_len: self.get(KickParam::Length),
            kick_dist_amt: self.get(KickParam::Distortion),
            kick_ott_amt: self.get(KickParam::Ott),
        }
    }

    fn apply(&mut self, state: &KickState) {
        self.set_kick_sample(&state.kick_sample);
        self.set(KickParam::Length, state.kick_len);
        self.set(KickParam::Distortion, state.kick_dist_amt);
        self.set(KickParam::Ott, state.kick_ott_amt);
    }

    fn flush(&mut self) {
        let index = self.index_of(self.sample.selected());
        self.sample.flush(index);
        self.params.flush();
    }
}
