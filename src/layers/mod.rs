//! Layer Controllers
//!
//! One controller per sound layer:
//! - Kick: sample (built-in or generated), length, distortion, OTT
//! - Noise: sample, volume, low/high-pass
//! - Reverb: impulse response, low/high-pass, volume
//! - Master: OTT, distortion, limiter
//!
//! Each owns its values and exposes setters plus a [`LayerController::state`]
//! snapshot under the flattened preset field names.

pub mod kick;
pub mod master;
pub mod noise;
pub mod param;
pub mod reverb;
pub mod surface;

pub use kick::{KickLayer, KickParam, KickState};
pub use master::{MasterLayer, MasterParam, MasterState};
pub use noise::{NoiseLayer, NoiseParam, NoiseState};
pub use param::{LayerParam, ParamBank, SampleSlot};
pub use reverb::{ReverbLayer, ReverbParam, ReverbState};
pub use surface::{ControlSurface, SnapshotTarget};

/// Uniform snapshot access shared by all layers
pub trait LayerController {
    type State;

    /// Copy of every current value
    fn state(&self) -> Self::State;

    /// Set every value from a snapshot through the regular setters
    fn apply(&mut self, state: &Self::State);

    /// Deliver values held back while the engine was not ready
    fn flush(&mut self);
}
