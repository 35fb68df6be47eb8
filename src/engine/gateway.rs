//! Engine Gateway
//!
//! Owns the single ordered command channel to the audio engine and the
//! readiness state machine:
//!
//! ```text
//! Uninitialized -> Initializing -> Ready
//!        \               \          \
//!         +---------------+----------+--> Disposed
//! ```
//!
//! Initialization opens the audio context, fetches the engine bytecode,
//! connects the worklet, waits for the `ready` handshake and then loads every
//! built-in sample one at a time. A failure leaves the gateway `Initializing`
//! for good; callers observe a loading state that never completes.
//!
//! The gateway takes ownership of its [`AudioBackend`], so one rendering
//! context can never be driven by two gateways.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::engine::backend::AudioBackend;
use crate::engine::command::{EngineCommand, EngineEvent};
use crate::engine::decode::decode_wav;
use crate::engine::fetch::AssetFetcher;
use crate::engine::samples::{BankEntry, BankKind, BuiltinRegistries};
use crate::error::{KicklabError, Result};

/// Granularity of cancellation checks while waiting for the handshake
const HANDSHAKE_POLL: Duration = Duration::from_millis(50);

/// Engine lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Readiness {
    #[default]
    Uninitialized,
    Initializing,
    Ready,
    Disposed,
}

impl Readiness {
    fn as_u8(self) -> u8 {
        match self {
            Readiness::Uninitialized => 0,
            Readiness::Initializing => 1,
            Readiness::Ready => 2,
            Readiness::Disposed => 3,
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            1 => Readiness::Initializing,
            2 => Readiness::Ready,
            3 => Readiness::Disposed,
            _ => Readiness::Uninitialized,
        }
    }
}

impl fmt::Display for Readiness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Readiness::Uninitialized => write!(f, "Uninitialized"),
            Readiness::Initializing => write!(f, "Initializing"),
            Readiness::Ready => write!(f, "Ready"),
            Readiness::Disposed => write!(f, "Disposed"),
        }
    }
}

/// Shared, read-only view of the gateway for controllers
///
/// Controllers check readiness and post commands; only the gateway changes
/// readiness.
#[derive(Debug, Clone)]
pub struct EngineHandle {
    commands: Sender<EngineCommand>,
    readiness: Arc<AtomicU8>,
}

impl EngineHandle {
    fn new(commands: Sender<EngineCommand>) -> Self {
        Self {
            commands,
            readiness: Arc::new(AtomicU8::new(Readiness::Uninitialized.as_u8())),
        }
    }

    /// Handle wired to a bare receiver, for exercising controllers alone
    pub fn loopback() -> (Self, Receiver<EngineCommand>) {
        let (tx, rx) = crossbeam_channel::unbounded();
        (Self::new(tx), rx)
    }

    pub fn readiness(&self) -> Readiness {
        Readiness::from_u8(self.readiness.load(Ordering::SeqCst))
    }

    pub fn is_ready(&self) -> bool {
        self.readiness() == Readiness::Ready
    }

    /// Fire-and-forget, delivered in post order
    ///
    /// Buffers inside the command move to the engine; the sender keeps no copy.
    pub fn post(&self, command: EngineCommand) {
        let kind = command.kind();
        if self.commands.send(command).is_err() {
            debug!("[ENGINE] Dropped '{}': channel closed", kind);
        } else {
            debug!("[ENGINE] Posted '{}'", kind);
        }
    }

    pub(crate) fn set_readiness(&self, readiness: Readiness) {
        self.readiness.store(readiness.as_u8(), Ordering::SeqCst);
    }
}

/// Cancellation flag checked after every suspension point of initialization
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Something that can start audible output from a user gesture
pub trait AudioOutput {
    fn resume(&mut self) -> Result<()>;
}

/// Owner of the engine command channel and readiness
pub struct EngineGateway {
    config: EngineConfig,
    backend: Box<dyn AudioBackend>,
    fetcher: Arc<dyn AssetFetcher>,
    handle: EngineHandle,
    unconnected: Option<Receiver<EngineCommand>>,
    events: Option<Receiver<EngineEvent>>,
    registries: BuiltinRegistries,
    next_kick_index: usize,
    cancel: CancelToken,
}

impl EngineGateway {
    /// Create a gateway; built-in registries are computed here, eagerly
    pub fn new(
        config: EngineConfig,
        backend: Box<dyn AudioBackend>,
        fetcher: Arc<dyn AssetFetcher>,
    ) -> Self {
        let (tx, rx) = crossbeam_channel::unbounded();
        let registries =
            BuiltinRegistries::new(&config.kick_bank, &config.noise_bank, &config.ir_bank);
        let next_kick_index = registries.kicks.len();

        Self {
            config,
            backend,
            fetcher,
            handle: EngineHandle::new(tx),
            unconnected: Some(rx),
            events: None,
            registries,
            next_kick_index,
            cancel: CancelToken::default(),
        }
    }

    pub fn handle(&self) -> EngineHandle {
        self.handle.clone()
    }

    pub fn readiness(&self) -> Readiness {
        self.handle.readiness()
    }

    pub fn is_ready(&self) -> bool {
        self.handle.is_ready()
    }

    pub fn registries(&self) -> &BuiltinRegistries {
        &self.registries
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Index the next registered sample will receive
    pub fn next_kick_index(&self) -> usize {
        self.next_kick_index
    }

    pub fn post(&self, command: EngineCommand) {
        self.handle.post(command);
    }

    /// Run the startup sequence: context, bytecode, worklet, handshake, banks
    ///
    /// Runs once; calling again once `Ready` is a no-op. Errors leave the
    /// gateway `Initializing`, and later calls fail with `EngineNotReady`.
    pub fn initialize(&mut self) -> Result<()> {
        match self.readiness() {
            Readiness::Uninitialized => {}
            Readiness::Ready => {
                debug!("[ENGINE] initialize() ignored, already ready");
                return Ok(());
            }
            Readiness::Initializing => {
                debug!("[ENGINE] initialize() refused, engine stuck initializing");
                return Err(KicklabError::EngineNotReady);
            }
            Readiness::Disposed => return Err(KicklabError::InitCancelled),
        }

        let started = Instant::now();
        self.handle.set_readiness(Readiness::Initializing);
        info!("[ENGINE] Initializing");

        self.backend.open()?;
        self.checkpoint()?;

        let script_url = self.config.resolve(&self.config.script_url);
        let script = self.fetcher.fetch(&script_url)?;
        self.checkpoint()?;
        let script_code = String::from_utf8(script).map_err(|e| KicklabError::Decode {
            reason: format!("engine script is not UTF-8: {e}"),
        })?;

        let commands = self.unconnected.take().ok_or(KicklabError::ChannelClosed)?;
        let worklet_url = self.config.resolve(&self.config.worklet_url);
        let events = self.backend.connect(&worklet_url, commands)?;
        self.events = Some(events);
        self.checkpoint()?;

        self.handle.post(EngineCommand::Init { script_code });
        self.wait_for_ready()?;
        self.checkpoint()?;

        self.load_bank(BankKind::Kick)?;
        self.load_bank(BankKind::Noise)?;
        self.load_bank(BankKind::ImpulseResponse)?;

        self.handle.set_readiness(Readiness::Ready);
        info!(
            "[ENGINE] Ready in {}ms ({} kicks, {} noises, {} IRs)",
            started.elapsed().as_millis(),
            self.registries.kicks.len(),
            self.registries.noises.len(),
            self.registries.impulse_responses.len()
        );
        Ok(())
    }

    fn checkpoint(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            debug!("[ENGINE] Initialization cancelled");
            return Err(KicklabError::InitCancelled);
        }
        Ok(())
    }

    fn wait_for_ready(&self) -> Result<()> {
        let events = self.events.as_ref().ok_or(KicklabError::ChannelClosed)?;
        let timeout = self.config.handshake_timeout();
        let deadline = Instant::now() + timeout;

        loop {
            self.checkpoint()?;
            let now = Instant::now();
            if now >= deadline {
                return Err(KicklabError::HandshakeTimeout {
                    timeout_ms: self.config.handshake_timeout_ms,
                });
            }
            match events.recv_timeout(HANDSHAKE_POLL.min(deadline - now)) {
                Ok(EngineEvent::Ready) => {
                    debug!("[ENGINE] Handshake acknowledged");
                    return Ok(());
                }
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => return Err(KicklabError::ChannelClosed),
            }
        }
    }

    fn load_bank(&mut self, kind: BankKind) -> Result<()> {
        let entries: Vec<BankEntry> = match kind {
            BankKind::Kick => self.config.kick_bank.clone(),
            BankKind::Noise => self.config.noise_bank.clone(),
            BankKind::ImpulseResponse => self.config.ir_bank.clone(),
        };

        for entry in entries {
            let url = self.config.resolve(&entry.url);
            let bytes = self.fetcher.fetch(&url)?;
            self.checkpoint()?;
            let audio = decode_wav(&bytes)?;

            let command = match kind {
                BankKind::Kick => EngineCommand::LoadKickSample {
                    samples: audio.into_mono(),
                },
                BankKind::Noise => EngineCommand::LoadNoiseSample {
                    samples: audio.into_mono(),
                },
                BankKind::ImpulseResponse => {
                    let ir_length = audio.len();
                    let num_channels = audio.num_channels();
                    EngineCommand::LoadIr {
                        ir_samples: audio.into_interleaved(),
                        ir_length,
                        num_channels,
                    }
                }
            };
            self.handle.post(command);
            debug!("[ENGINE] Loaded {} sample '{}'", kind.as_str(), entry.name);
        }
        Ok(())
    }

    /// Fetch, decode and hand a kick sample to the engine
    ///
    /// Returns the newly assigned playback index. Indices are never reused.
    /// A failure here leaves readiness untouched.
    pub fn register_sample(&mut self, audio_url: &str) -> Result<usize> {
        if !self.is_ready() {
            return Err(KicklabError::EngineNotReady);
        }

        let bytes = self.fetcher.fetch(&self.config.resolve(audio_url))?;
        let samples = decode_wav(&bytes)?.into_mono();

        let index = self.next_kick_index;
        self.next_kick_index += 1;
        self.handle.post(EngineCommand::LoadKickSample { samples });
        debug!("[ENGINE] Registered {} at index {}", audio_url, index);
        Ok(index)
    }

    /// Tear down: cancel pending initialization, close channel and context
    pub fn dispose(&mut self) {
        if self.readiness() == Readiness::Disposed {
            return;
        }
        self.cancel.cancel();
        self.handle.set_readiness(Readiness::Disposed);
        self.events = None;
        self.unconnected = None;
        self.backend.close();
        info!("[ENGINE] Disposed");
    }
}

impl AudioOutput for EngineGateway {
    /// Must run inside a user-gesture handler before audible output
    fn resume(&mut self) -> Result<()> {
        if self.readiness() == Readiness::Disposed {
            warn!("[ENGINE] resume() after dispose ignored");
            return Ok(());
        }
        if self.backend.is_running() {
            return Ok(());
        }
        self.backend.resume()
    }
}

impl Drop for EngineGateway {
    fn drop(&mut self) {
        self.dispose();
    }
}
