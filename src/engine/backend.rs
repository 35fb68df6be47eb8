//! Audio output seam
//!
//! The audio context and the rendering worklet are external collaborators.
//! [`AudioBackend`] is the narrow interface the gateway needs from them;
//! [`HeadlessBackend`] implements it without any audio device, exposing the
//! engine end of the channel through an [`EngineProbe`].

use std::sync::{Arc, Mutex, MutexGuard};

use crossbeam_channel::{Receiver, Sender};

use crate::engine::command::{EngineCommand, EngineEvent};
use crate::error::{KicklabError, Result};

/// Audio context + rendering worklet
pub trait AudioBackend: Send {
    /// Create the audio output context (it may start suspended)
    fn open(&mut self) -> Result<()>;

    /// Load the rendering worklet and hand it the receiving end of the
    /// command channel. Returns the inbound event stream.
    fn connect(
        &mut self,
        worklet_url: &str,
        commands: Receiver<EngineCommand>,
    ) -> Result<Receiver<EngineEvent>>;

    /// Resume audible output; no-op if already running
    fn resume(&mut self) -> Result<()>;

    /// Check if the context is producing output
    fn is_running(&self) -> bool;

    /// Disconnect the worklet and close the context
    fn close(&mut self);
}

#[derive(Debug, Default)]
struct ProbeState {
    commands: Option<Receiver<EngineCommand>>,
    events: Option<Sender<EngineEvent>>,
    worklet_url: Option<String>,
    opened: bool,
    running: bool,
    closed: bool,
    resume_calls: usize,
}

/// Backend without an audio device
///
/// With auto-ready enabled the fake engine acknowledges the handshake as soon
/// as the worklet is connected.
#[derive(Debug)]
pub struct HeadlessBackend {
    state: Arc<Mutex<ProbeState>>,
    auto_ready: bool,
}

impl HeadlessBackend {
    /// Create a backend and the probe observing it
    pub fn new() -> (Self, EngineProbe) {
        let state = Arc::new(Mutex::new(ProbeState::default()));
        let probe = EngineProbe {
            state: Arc::clone(&state),
        };
        (
            Self {
                state,
                auto_ready: true,
            },
            probe,
        )
    }

    /// Disable the automatic `ready` acknowledgement
    pub fn without_auto_ready(mut self) -> Self {
        self.auto_ready = false;
        self
    }

    fn lock(&self) -> MutexGuard<'_, ProbeState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl AudioBackend for HeadlessBackend {
    fn open(&mut self) -> Result<()> {
        let mut state = self.lock();
        if state.closed {
            return Err(KicklabError::ChannelClosed);
        }
        state.opened = true;
        Ok(())
    }

    fn connect(
        &mut self,
        worklet_url: &str,
        commands: Receiver<EngineCommand>,
    ) -> Result<Receiver<EngineEvent>> {
        let (event_tx, event_rx) = crossbeam_channel::unbounded();
        if self.auto_ready {
            event_tx
                .send(EngineEvent::Ready)
                .map_err(|_| KicklabError::ChannelClosed)?;
        }

        let mut state = self.lock();
        state.worklet_url = Some(worklet_url.to_string());
        state.commands = Some(commands);
        state.events = Some(event_tx);
        Ok(event_rx)
    }

    fn resume(&mut self) -> Result<()> {
        let mut state = self.lock();
        if state.closed {
            return Err(KicklabError::ChannelClosed);
        }
        state.resume_calls += 1;
        state.running = true;
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.lock().running
    }

    fn close(&mut self) {
        let mut state = self.lock();
        state.commands = None;
        state.events = None;
        state.running = false;
        state.closed = true;
    }
}

/// Engine-side view of a [`HeadlessBackend`]
#[derive(Debug, Clone)]
pub struct EngineProbe {
    state: Arc<Mutex<ProbeState>>,
}

impl EngineProbe {
    fn lock(&self) -> MutexGuard<'_, ProbeState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Take every command delivered so far, in post order
    pub fn drain(&self) -> Vec<EngineCommand> {
        let receiver = self.lock().commands.clone();
        match receiver {
            Some(rx) => rx.try_iter().collect(),
            None => Vec::new(),
        }
    }

    /// Send the handshake acknowledgement manually
    pub fn send_ready(&self) -> bool {
        match &self.lock().events {
            Some(tx) => tx.send(EngineEvent::Ready).is_ok(),
            None => false,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.lock().commands.is_some()
    }

    pub fn worklet_url(&self) -> Option<String> {
        self.lock().worklet_url.clone()
    }

    pub fn is_open(&self) -> bool {
        self.lock().opened
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    pub fn resume_calls(&self) -> usize {
        self.lock().resume_calls
    }
}
