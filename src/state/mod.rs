//! State Management Module
//!
//! Session context, presets and the generated kick catalog.

pub mod catalog;
pub mod preset;
pub mod session;
pub mod store;

pub use catalog::{AssetCatalog, CatalogEntry, SampleRegistrar, DAILY_GEN_LIMIT, TOTAL_GEN_CAP};
pub use preset::{
    validate_preset_name, Preset, PresetDraft, PresetKey, PresetParams, DEFAULT_PRESET_NAME,
    MAX_PRESET_NAME_LEN,
};
pub use session::{AuthStatus, LoadTicket, Session};
pub use store::{PresetStore, StoreStatus};
