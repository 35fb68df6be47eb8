//! Master bus: OTT, distortion and limiter drive

use serde::{Deserialize, Serialize};

use crate::engine::command::EngineCommand;
use crate::engine::gateway::EngineHandle;
use crate::layers::LayerController;
use crate::layers::param::{LayerParam, ParamBank};
use crate::mapping::ParamMapping;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MasterParam {
    Ott,
    Distortion,
    /// Input gain into the limiter
    Limiter,
}

impl LayerParam for MasterParam {
    const ALL: &'static [Self] = &[MasterParam::Ott, MasterParam::Distortion, MasterParam::Limiter];

    fn key(self) -> &'static str {
        match self {
            MasterParam::Ott => "master_ott_amt",
            MasterParam::Distortion => "master_dist_amt",
            MasterParam::Limiter => "master_limiter_amt",
        }
    }

    fn mapping(self) -> ParamMapping {
        match self {
            MasterParam::Ott | MasterParam::Distortion => ParamMapping::linear(0.0, 1.0),
            MasterParam::Limiter => ParamMapping::linear(1.0, 4.0),
        }
    }

    fn default_native(self) -> f64 {
        match self {
            MasterParam::Ott | MasterParam::Distortion => 0.0,
            MasterParam::Limiter => 1.0,
        }
    }

    fn command(self, value: f32) -> EngineCommand {
        match self {
            MasterParam::Ott => EngineCommand::MasterOtt { value },
            MasterParam::Distortion => EngineCommand::MasterDistortion { value },
            MasterParam::Limiter => EngineCommand::MasterLimiter { value },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MasterState {
    pub master_ott_amt: f64,
    pub master_dist_amt: f64,
    pub master_limiter_amt: f64,
}

pub struct MasterLayer {
    params: ParamBank<MasterParam>,
}

impl MasterLayer {
    pub fn new(engine: EngineHandle) -> Self {
        Self {
            params: ParamBank::new(engine),
        }
    }

    pub fn set(&mut self, param: MasterParam, native: f64) -> f64 {
        self.params.set_native(param, native)
    }

    pub fn set_normalized(&mut self, param: MasterParam, normalized: f64) -> f64 {
        self.params.set_normalized(param, normalized)
    }

    pub fn get(&self, param: MasterParam) -> f64 {
        self.params.native(param)
    }

    pub fn normalized(&self, param: MasterParam) -> f64 {
        self.params.normalized(param)
    }
}

impl LayerController for MasterLayer {
    type State = MasterState;

    fn state(&self) -> MasterState {
        MasterState {
            master_ott_amt: self.get(MasterParam::Ott),
            master_dist_amt: self.get(MasterParam::Distortion),
            master_limiter_amt: self.get(MasterParam::Limiter),
        }
    }

    fn apply(&mut self, state: &MasterState) {
        self.set(MasterParam::Ott, state.master_ott_amt);
        self.set(MasterParam::Distortion, state.master_dist_amt);
        self.set(MasterParam::Limiter, state.master_limiter_amt);
    }

    fn flush(&mut self) {
        self.params.flush();
    }
}
