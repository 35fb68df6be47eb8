//! Kicklab - drum workstation control plane
//!
//! Translates knob and dropdown gestures into engine commands, keeps presets
//! and the user's generated kicks in sync with the backend.
//!
//! # Architecture
//!
//! - [`mapping`]: knob positions `[0, 100]` to native ranges and back
//! - [`engine`]: readiness machine and ordered command channel to the engine
//! - [`layers`]: kick, noise, reverb and master controllers
//! - [`transport`]: play/stop, cue and tempo
//! - [`state`]: session context, preset store, generated kick catalog
//! - [`workstation`]: everything wired to one backend and one session

pub mod api;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod layers;
pub mod mapping;
pub mod state;
pub mod transport;
pub mod workstation;

pub use error::{KicklabError, Result};
pub use workstation::Workstation;
