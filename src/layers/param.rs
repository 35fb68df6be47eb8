//! Readiness-gated parameter forwarding
//!
//! Every parameter keeps its latest native value and a pending flag. A change
//! is posted immediately when the engine is ready; otherwise it stays pending
//! and [`ParamBank::flush`] delivers the latest value once, in declaration
//! order, when readiness arrives. Unchanged values are never re-posted.

use std::fmt;
use std::marker::PhantomData;

use tracing::debug;

use crate::engine::command::EngineCommand;
use crate::engine::gateway::EngineHandle;
use crate::engine::samples::BankKind;
use crate::mapping::{clamp_normalized, ParamMapping};

/// A continuous parameter owned by one layer
pub trait LayerParam: Copy + Eq + fmt::Debug + 'static {
    /// Every parameter of the layer, in declaration order
    const ALL: &'static [Self];

    /// Flattened snapshot key, e.g. `noise_low_pass_freq`
    fn key(self) -> &'static str;

    fn mapping(self) -> ParamMapping;

    fn default_native(self) -> f64;

    /// Engine command carrying a native value for this parameter
    fn command(self, value: f32) -> EngineCommand;

    fn position(self) -> usize {
        Self::ALL.iter().position(|p| *p == self).unwrap_or(0)
    }
}

/// Current values of one layer's continuous parameters
#[derive(Debug, Clone)]
pub struct ParamBank<P: LayerParam> {
    engine: EngineHandle,
    values: Vec<f64>,
    pending: Vec<bool>,
    _params: PhantomData<P>,
}

impl<P: LayerParam> ParamBank<P> {
    /// Start at defaults, all pending until the first flush
    pub fn new(engine: EngineHandle) -> Self {
        Self {
            engine,
            values: P::ALL.iter().map(|p| p.default_native()).collect(),
            pending: vec![true; P::ALL.len()],
            _params: PhantomData,
        }
    }

    pub fn native(&self, param: P) -> f64 {
        self.values[param.position()]
    }

    /// Knob position derived from the native value
    pub fn normalized(&self, param: P) -> f64 {
        param.mapping().to_normalized(self.native(param))
    }

    /// Set a native value (clamped to the parameter's range)
    ///
    /// Returns the value stored.
    pub fn set_native(&mut self, param: P, native: f64) -> f64 {
        let native = if native.is_nan() {
            param.default_native()
        } else {
            param.mapping().clamp_native(native)
        };
        let slot = param.position();
        if self.values[slot] == native {
            return native;
        }
        self.values[slot] = native;

        if self.engine.is_ready() {
            self.pending[slot] = false;
            self.engine.post(param.command(native as f32));
        } else {
            self.pending[slot] = true;
        }
        native
    }

    /// Set from a knob position in `[0, 100]`
    pub fn set_normalized(&mut self, param: P, normalized: f64) -> f64 {
        let native = param.mapping().to_native(clamp_normalized(normalized));
        self.set_native(param, native)
    }

    pub fn is_pending(&self, param: P) -> bool {
        self.pending[param.position()]
    }

    /// Deliver every pending value, in declaration order
    ///
    /// No-op while the engine is not ready.
    pub fn flush(&mut self) -> usize {
        if !self.engine.is_ready() {
            return 0;
        }
        let mut sent = 0;
        for param in P::ALL {
            let slot = param.position();
            if self.pending[slot] {
                self.pending[slot] = false;
                self.engine.post(param.command(self.values[slot] as f32));
                sent += 1;
            }
        }
        if sent > 0 {
            debug!("[LAYERS] Flushed {} pending values", sent);
        }
        sent
    }
}

/// Selected sample of a layer (a dropdown), addressed by name
///
/// The name is resolved to a playback index by the owning layer. A name with
/// no index is kept but not sent; it stays pending until it resolves.
#[derive(Debug, Clone)]
pub struct SampleSlot {
    engine: EngineHandle,
    bank: BankKind,
    selected: String,
    pending: bool,
}

impl SampleSlot {
    pub fn new(engine: EngineHandle, bank: BankKind, initial: impl Into<String>) -> Self {
        Self {
            engine,
            bank,
            selected: initial.into(),
            pending: true,
        }
    }

    pub fn selected(&self) -> &str {
        &self.selected
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Select a sample; `index` is the resolved playback index, if any
    pub fn select(&mut self, name: &str, index: Option<usize>) {
        if self.selected == name && !self.pending {
            return;
        }
        self.selected = name.to_string();
        self.pending = true;
        match index {
            Some(index) => {
                self.send(index);
            }
            None => {
                debug!(
                    "[LAYERS] Unknown {} sample '{}', not sent",
                    self.bank.as_str(),
                    name
                );
            }
        }
    }

    /// Deliver the selection if it is pending and resolvable
    pub fn flush(&mut self, index: Option<usize>) -> bool {
        match index {
            Some(index) if self.pending => self.send(index),
            _ => false,
        }
    }

    fn send(&mut self, index: usize) -> bool {
        if !self.engine.is_ready() {
            return false;
        }
        let command = match self.bank {
            BankKind::Kick => EngineCommand::SelectKickSample { index },
            BankKind::Noise => EngineCommand::SelectNoiseSample { index },
            BankKind::ImpulseResponse => EngineCommand::SelectIr { index },
        };
        self.engine.post(command);
        self.pending = false;
        true
    }
}
