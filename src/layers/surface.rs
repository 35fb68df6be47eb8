//! Control surface: every layer plus the transport
//!
//! The surface is what presets are captured from and applied to. Applying a
//! snapshot goes through each layer's setters, so the values reach the engine
//! through the usual readiness-gated path.

use crate::engine::gateway::EngineHandle;
use crate::engine::samples::BuiltinRegistries;
use crate::layers::kick::KickLayer;
use crate::layers::master::MasterLayer;
use crate::layers::noise::NoiseLayer;
use crate::layers::reverb::ReverbLayer;
use crate::layers::LayerController;
use crate::state::preset::PresetParams;
use crate::transport::TransportController;

/// Something a preset can be captured from and applied to
pub trait SnapshotTarget {
    fn capture(&self) -> PresetParams;

    /// Overwrite every parameter with the snapshot
    fn apply(&mut self, params: &PresetParams);
}

pub struct ControlSurface {
    pub kick: KickLayer,
    pub noise: NoiseLayer,
    pub reverb: ReverbLayer,
    pub master: MasterLayer,
    pub transport: TransportController,
}

impl ControlSurface {
    pub fn new(engine: EngineHandle, registries: &BuiltinRegistries) -> Self {
        Self {
            kick: KickLayer::new(engine.clone(), registries.kicks.clone()),
            noise: NoiseLayer::new(engine.clone(), registries.noises.clone()),
            reverb: ReverbLayer::new(engine.clone(), registries.impulse_responses.clone()),
            master: MasterLayer::new(engine.clone()),
            transport: TransportController::new(engine),
        }
    }

    /// Deliver everything held back while the engine was not ready
    pub fn flush_pending(&mut self) {
        self.kick.flush();
        self.noise.flush();
        self.reverb.flush();
        self.master.flush();
        self.transport.flush();
    }
}

impl SnapshotTarget for ControlSurface {
    fn capture(&self) -> PresetParams {
        PresetParams {
            bpm: self.transport.bpm(),
            kick: self.kick.state(),
            noise: self.noise.state(),
            reverb: self.reverb.state(),
            master: self.master.state(),
        }
    }

    fn apply(&mut self, params: &PresetParams) {
        self.kick.apply(&params.kick);
        self.noise.apply(&params.noise);
        self.reverb.apply(&params.reverb);
        self.master.apply(&params.master);
        self.transport.set_bpm(params.bpm);
    }
}
