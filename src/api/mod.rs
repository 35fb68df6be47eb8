//! Backend REST API
//!
//! [`BackendApi`] is the surface the stores consume:
//!
//! | Call | Endpoint |
//! |---|---|
//! | `obtain_token` | `POST /token/` |
//! | `register` | `POST /register/` |
//! | `shared_presets` | `GET /presets/shared/` |
//! | `user_presets` / `create_preset` | `GET` / `POST /presets/` |
//! | `update_preset` / `delete_preset` | `PUT` / `DELETE /presets/{id}/` |
//! | `list_kicks` | `GET /kicks/` |
//! | `generate_kick` | `POST /kicks/generate/` |
//! | `delete_kick` | `DELETE /kicks/{id}/?confirm=` |
//!
//! Every call is a single attempt. Non-2xx responses are mapped to
//! [`KicklabError`] by [`error_from_status`].

pub mod http;
pub mod mock;

use serde::{Deserialize, Serialize};

use crate::error::{KicklabError, Result};
use crate::state::preset::{Preset, PresetDraft};

pub use http::HttpBackend;
pub use mock::MockBackend;

/// Access/refresh token pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Credentials for `/token/` and `/register/`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// A generated kick as listed by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KickAsset {
    pub id: u64,
    pub name: String,
    pub audio_url: String,
}

/// `GET /kicks/` response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KickList {
    pub kicks: Vec<KickAsset>,
    pub remaining_gens_today: u32,
    pub total_gens_count: u32,
}

/// `POST /kicks/generate/` response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedKick {
    pub id: u64,
    pub name: String,
    pub audio_url: String,
    pub remaining_gens_today: u32,
    pub total_gens_count: u32,
}

impl GeneratedKick {
    pub fn asset(&self) -> KickAsset {
        KickAsset {
            id: self.id,
            name: self.name.clone(),
            audio_url: self.audio_url.clone(),
        }
    }
}

/// `DELETE /kicks/{id}/` response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KickDeleted {
    pub total_count: u32,
}

/// The REST backend
pub trait BackendApi: Send + Sync {
    fn obtain_token(&self, credentials: &Credentials) -> Result<TokenPair>;

    fn register(&self, credentials: &Credentials) -> Result<()>;

    /// Shared presets; `token` is sent when present
    fn shared_presets(&self, token: Option<&str>) -> Result<Vec<Preset>>;

    fn user_presets(&self, token: &str) -> Result<Vec<Preset>>;

    fn create_preset(&self, token: &str, draft: &PresetDraft) -> Result<Preset>;

    fn update_preset(&self, token: &str, id: u64, draft: &PresetDraft) -> Result<Preset>;

    fn delete_preset(&self, token: &str, id: u64) -> Result<()>;

    fn list_kicks(&self, token: &str) -> Result<KickList>;

    fn generate_kick(&self, token: &str) -> Result<GeneratedKick>;

    /// Without `confirm`, a kick referenced by presets yields
    /// [`KicklabError::AssetConflict`]
    fn delete_kick(&self, token: &str, id: u64, confirm: bool) -> Result<KickDeleted>;
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    detail: Option<String>,
    #[serde(default)]
    presets: Vec<String>,
}

/// Map a non-2xx status and its body to an error
pub fn error_from_status(status: u16, body: &str) -> KicklabError {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    let message = parsed
        .error
        .or(parsed.detail)
        .unwrap_or_else(|| body.trim().to_string());

    match status {
        409 => KicklabError::AssetConflict {
            presets: parsed.presets,
        },
        429 => KicklabError::DailyLimitReached { message },
        404 => KicklabError::NotFound { what: message },
        _ => KicklabError::Server { status, message },
    }
}
