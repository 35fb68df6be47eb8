//! Reverb layer: impulse-response selection, filters and send volume

use serde::{Deserialize, Serialize};

use crate::engine::command::EngineCommand;
use crate::engine::gateway::EngineHandle;
use crate::engine::samples::{BankKind, SampleRegistry};
use crate::layers::LayerController;
use crate::layers::param::{LayerParam, ParamBank, SampleSlot};
use crate::mapping::ParamMapping;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReverbParam {
    LowPass,
    HighPass,
    Volume,
}

impl LayerParam for ReverbParam {
    const ALL: &'static [Self] = &[ReverbParam::LowPass, ReverbParam::HighPass, ReverbParam::Volume];

    fn key(self) -> &'static str {
        match self {
            ReverbParam::LowPass => "reverb_low_pass_freq",
            ReverbParam::HighPass => "reverb_high_pass_freq",
            ReverbParam::Volume => "reverb_volume",
        }
    }

    fn mapping(self) -> ParamMapping {
        match self {
            ReverbParam::LowPass => ParamMapping::logarithmic(200.0, 20_000.0),
            ReverbParam::HighPass => ParamMapping::logarithmic(30.0, 7_000.0),
            ReverbParam::Volume => ParamMapping::linear(-60.0, 0.0),
        }
    }

    fn default_native(self) -> f64 {
        match self {
            ReverbParam::LowPass => 20_000.0,
            ReverbParam::HighPass => 30.0,
            ReverbParam::Volume => -18.0,
        }
    }

    fn command(self, value: f32) -> EngineCommand {
        match self {
            ReverbParam::LowPass => EngineCommand::ReverbLowPass { value },
            ReverbParam::HighPass => EngineCommand::ReverbHighPass { value },
            ReverbParam::Volume => EngineCommand::ReverbVolume { value },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReverbState {
    pub reverb_sample: String,
    pub reverb_low_pass_freq: f64,
    pub reverb_high_pass_freq: f64,
    pub reverb_volume: f64,
}

pub struct ReverbLayer {
    params: ParamBank<ReverbParam>,
    sample: SampleSlot,
    registry: SampleRegistry,
}

impl ReverbLayer {
    pub fn new(engine: EngineHandle, registry: SampleRegistry) -> Self {
        let initial = registry.first().unwrap_or_default().to_string();
        Self {
            params: ParamBank::new(engine.clone()),
            sample: SampleSlot::new(engine, BankKind::ImpulseResponse, initial),
            registry,
        }
    }

    pub fn available_samples(&self) -> &[String] {
        self.registry.names()
    }

    pub fn set_reverb_sample(&mut self, name: &str) {
        let index = self.registry.index_of(name);
        self.sample.select(name, index);
    }

    pub fn set(&mut self, param: ReverbParam, native: f64) -> f64 {
        self.params.set_native(param, native)
    }

    pub fn set_normalized(&mut self, param: ReverbParam, normalized: f64) -> f64 {
        self.params.set_normalized(param, normalized)
    }

    pub fn get(&self, param: ReverbParam) -> f64 {
        self.params.native(param)
    }

    pub fn normalized(&self, param: ReverbParam) -> f64 {
        self.params.normalized(param)
    }

    pub fn reverb_sample(&self) -> &str {
        self.sample.selected()
    }
}

impl LayerController for ReverbLayer {
    type State = ReverbState;

    fn state(&self) -> ReverbState {
        ReverbState {
            reverb_sample: self.sample.selected().to_string(),
            reverb_low_pass_freq: self.get(ReverbParam::LowPass),
            reverb_high_pass_freq: self.get(ReverbParam::HighPass),
            reverb_volume: self.get(ReverbParam::Volume),
        }
    }

    fn apply(&mut self, state: &ReverbState) {
        self.set_reverb_sample(&state.reverb_sample);
        self.set(ReverbParam::LowPass, state.reverb_low_pass_freq);
        self.set(ReverbParam::HighPass, state.reverb_high_pass_freq);
        self.set(ReverbParam::Volume, state.reverb_volume);
    }

    fn flush(&mut self) {
        let index = self.registry.index_of(self.sample.selected());
        self.sample.flush(index);
        self.params.flush();
    }
}
