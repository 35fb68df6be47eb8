//! Audio Engine Module
//!
//! Everything between the controllers and the real-time audio engine:
//! - Closed command protocol
//! - Audio context / worklet seam and asset fetching
//! - WAV decoding and built-in sample banks
//! - The gateway owning readiness and the command channel

pub mod backend;
pub mod command;
pub mod decode;
pub mod fetch;
pub mod gateway;
pub mod samples;

pub use backend::{AudioBackend, EngineProbe, HeadlessBackend};
pub use command::{EngineCommand, EngineEvent};
pub use decode::{decode_wav, encode_wav, DecodedAudio};
pub use fetch::{AssetFetcher, HttpFetcher, MemoryFetcher};
pub use gateway::{AudioOutput, CancelToken, EngineGateway, EngineHandle, Readiness};
pub use samples::{BankEntry, BankKind, BuiltinRegistries, SampleRegistry};
