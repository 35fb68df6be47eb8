//! Noise layer

use serde::{Deserialize, Serialize};

use crate::engine::command::EngineCommand;
use crate::engine::gateway::EngineHandle;
use crate::engine::samples::{BankKind, SampleRegistry};
use crate::layers::LayerController;
use crate::layers::param::{LayerParam, ParamBank, SampleSlot};
use crate::mapping::ParamMapping;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoiseParam {
    Volume,
    LowPass,
    HighPass,
}

impl LayerParam for NoiseParam {
    const ALL: &'static [Self] = &[NoiseParam::Volume, NoiseParam::LowPass, NoiseParam::HighPass];

    fn key(self) -> &'static str {
        match self {
            NoiseParam::Volume => "noise_volume",
            NoiseParam::LowPass => "noise_low_pass_freq",
            NoiseParam::HighPass => "noise_high_pass_freq",
        }
    }

    fn mapping(self) -> ParamMapping {
        match self {
            NoiseParam::Volume => ParamMapping::linear(-60.0, 0.0),
            NoiseParam::LowPass => ParamMapping::logarithmic(200.0, 20_000.0),
            NoiseParam::HighPass => ParamMapping::logarithmic(30.0, 7_000.0),
        }
    }

    fn default_native(self) -> f64 {
        match self {
            NoiseParam::Volume => -24.0,
            NoiseParam::LowPass => 20_000.0,
            NoiseParam::HighPass => 30.0,
        }
    }

    fn command(self, value: f32) -> EngineCommand {
        match self {
            NoiseParam::Volume => EngineCommand::NoiseVolume { value },
            NoiseParam::LowPass => EngineCommand::NoiseLowPass { value },
            NoiseParam::HighPass => EngineCommand::NoiseHighPass { value },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoiseState {
    pub noise_sample: String,
    pub noise_low_pass_freq: f64,
    pub noise_high_pass_freq: f64,
    pub noise_volume: f64,
}

pub struct NoiseLayer {
    params: ParamBank<NoiseParam>,
    sample: SampleSlot,
    registry: SampleRegistry,
}

impl NoiseLayer {
    pub fn new(engine: EngineHandle, registry: SampleRegistry) -> Self {
        let initial = registry.first().unwrap_or_default().to_string();
        Self {
            params: ParamBank::new(engine.clone()),
            sample: SampleSlot::new(engine, BankKind::Noise, initial),
            registry,
        }
    }

    pub fn available_samples(&self) -> &[String] {
        self.registry.names()
    }

    pub fn set_noise_sample(&mut self, name: &str) {
        let index = self.registry.index_of(name);
        self.sample.select(name, index);
    }

    pub fn set(&mut self, param: NoiseParam, native: f64) -> f64 {
        self.params.set_native(param, native)
    }

    pub fn set_normalized(&mut self, param: NoiseParam, normalized: f64) -> f64 {
        self.params.set_normalized(param, normalized)
    }

    pub fn get(&self, param: NoiseParam) -> f64 {
        self.params.native(param)
    }

    pub fn normalized(&self, param: NoiseParam) -> f64 {
        self.params.normalized(param)
    }

    pub fn noise_sample(&self) -> &str {
        self.sample.selected()
    }
}

impl LayerController for NoiseLayer {
    type State = NoiseState;

    fn state(&self) -> NoiseState {
        NoiseState {
            noise_sample: self.sample.selected().to_string(),
            noise_low_pass_freq: self.get(NoiseParam::LowPass),
            noise_high_pass_freq: self.get(NoiseParam::HighPass),
            noise_volume: self.get(NoiseParam::Volume),
        }
    }

    fn apply(&mut self, state: &NoiseState) {
        self.set_noise_sample(&state.noise_sample);
        self.set(NoiseParam::LowPass, state.noise_low_pass_freq);
        self.set(NoiseParam::HighPass, state.noise_high_pass_freq);
        self.set(NoiseParam::Volume, state.noise_volume);
    }

    fn flush(&mut self) {
        let index = self.registry.index_of(self.sample.selected());
        self.sample.flush(index);
        self.params.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::gateway::Readiness;
    use crate::engine::samples::default_noise_bank;
    use approx::assert_relative_eq;

    #[test]
    fn test_high_pass_log_endpoints() {
        let (engine, _rx) = EngineHandle::loopback();
        let mut layer = NoiseLayer::new(engine, SampleRegistry::from_entries(&default_noise_bank()));

        assert_relative_eq!(layer.set_normalized(NoiseParam::HighPass, 0.0), 30.0);
        assert_relative_eq!(
            layer.set_normalized(NoiseParam::HighPass, 100.0),
            7000.0,
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_flush_sends_sample_then_params() {
        let (engine, rx) = EngineHandle::loopback();
        let mut layer = NoiseLayer::new(
            engine.clone(),
            SampleRegistry::from_entries(&default_noise_bank()),
        );
        layer.set_noise_sample("Rain");
        layer.set(NoiseParam::Volume, -6.0);

        engine.set_readiness(Readiness::Ready);
        layer.flush();

        assert_eq!(
            rx.try_iter().collect::<Vec<_>>(),
            vec![
                EngineCommand::SelectNoiseSample { index: 2 },
                EngineCommand::NoiseVolume { value: -6.0 },
                EngineCommand::NoiseLowPass { value: 20000.0 },
                EngineCommand::NoiseHighPass { value: 30.0 },
            ]
        );
    }
}
