//! In-memory backend for testing
//!
//! Behaves like the real server for the rules the client depends on:
//! per-user presets, generation quotas, and kick deletion that conflicts
//! with (or, when confirmed, cascades to) presets referencing the kick.
//! Every call is recorded so tests can assert that no request was issued.

use std::sync::{Mutex, MutexGuard};

use chrono::Utc;

use crate::error::{KicklabError, Result};
use crate::state::preset::{Preset, PresetDraft};

use super::{
    BackendApi, Credentials, GeneratedKick, KickAsset, KickDeleted, KickList, TokenPair,
};

/// Server-side cap on generated kicks per user
pub const MOCK_TOTAL_GEN_CAP: u32 = 30;

/// Server-side generations per day
pub const MOCK_DAILY_GEN_LIMIT: u32 = 10;

const KICK_NAMES: &[&str] = &[
    "Donnerschlag",
    "Brummbass",
    "Paukenhieb",
    "Erdbeben",
    "Wummer",
    "Herzschlag",
];

#[derive(Debug, Default)]
struct MockState {
    shared: Vec<Preset>,
    user: Vec<Preset>,
    kicks: Vec<KickAsset>,
    next_preset_id: u64,
    next_kick_id: u64,
    gens_today: u32,
    requests: Vec<String>,
    fail_next: Option<KicklabError>,
}

/// Mock REST backend
#[derive(Debug, Default)]
pub struct MockBackend {
    state: Mutex<MockState>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a shared preset; ids are assigned when missing
    pub fn with_shared_preset(self, mut preset: Preset) -> Self {
        {
            let mut state = self.lock();
            preset.is_shared = true;
            if preset.id.is_none() {
                preset.id = Some(state.shared.len() as u64 + 1);
            }
            state.shared.push(preset);
        }
        self
    }

    /// Add a preset owned by the user
    pub fn with_user_preset(self, mut preset: Preset) -> Self {
        {
            let mut state = self.lock();
            state.next_preset_id += 1;
            preset.is_shared = false;
            preset.id = Some(state.next_preset_id);
            state.user.push(preset);
        }
        self
    }

    /// Add an existing generated kick; ids count up from 1
    pub fn with_kick(self, name: &str, audio_url: &str) -> Self {
        {
            let mut state = self.lock();
            state.next_kick_id += 1;
            let id = state.next_kick_id;
            state.kicks.push(KickAsset {
                id,
                name: name.to_string(),
                audio_url: audio_url.to_string(),
            });
        }
        self
    }

    /// Pretend `count` kicks were generated today
    pub fn with_generations_today(self, count: u32) -> Self {
        self.lock().gens_today = count;
        self
    }

    /// URL the mock assigns to the kick generated with `id`
    pub fn generated_url(id: u64) -> String {
        format!("/generated/{id}.wav")
    }

    /// Make the next call fail with `error`
    pub fn fail_next(&self, error: KicklabError) {
        self.lock().fail_next = Some(error);
    }

    /// Every call so far, as `"METHOD path"`
    pub fn requests(&self) -> Vec<String> {
        self.lock().requests.clone()
    }

    pub fn request_count(&self) -> usize {
        self.lock().requests.len()
    }

    pub fn user_preset_names(&self) -> Vec<String> {
        self.lock()
            .user
            .iter()
            .map(|p| p.preset_name.clone())
            .collect()
    }

    pub fn kick_ids(&self) -> Vec<u64> {
        self.lock().kicks.iter().map(|k| k.id).collect()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Record the call and consume an injected failure
    fn begin(&self, request: String) -> Result<MutexGuard<'_, MockState>> {
        let mut state = self.lock();
        state.requests.push(request);
        match state.fail_next.take() {
            Some(error) => Err(error),
            None => Ok(state),
        }
    }
}

fn require_token(token: &str) -> Result<()> {
    if token.is_empty() {
        return Err(KicklabError::Server {
            status: 401,
            message: "Authentication credentials were not provided.".to_string(),
        });
    }
    Ok(())
}

impl BackendApi for MockBackend {
    fn obtain_token(&self, credentials: &Credentials) -> Result<TokenPair> {
        let _state = self.begin("POST /token/".to_string())?;
        if credentials.password.is_empty() {
            return Err(KicklabError::Server {
                status: 401,
                message: "No active account found with the given credentials".to_string(),
            });
        }
        Ok(TokenPair {
            access: format!("access-{}", credentials.username),
            refresh: format!("refresh-{}", credentials.username),
        })
    }

    fn register(&self, credentials: &Credentials) -> Result<()> {
        let _state = self.begin("POST /register/".to_string())?;
        if credentials.username.is_empty() {
            return Err(KicklabError::Server {
                status: 400,
                message: "username is required".to_string(),
            });
        }
        Ok(())
    }

    fn shared_presets(&self, _token: Option<&str>) -> Result<Vec<Preset>> {
        let state = self.begin("GET /presets/shared/".to_string())?;
        Ok(state.shared.clone())
    }

    fn user_presets(&self, token: &str) -> Result<Vec<Preset>> {
        let state = self.begin("GET /presets/".to_string())?;
        require_token(token)?;
        Ok(state.user.clone())
    }

    fn create_preset(&self, token: &str, draft: &PresetDraft) -> Result<Preset> {
        let mut state = self.begin("POST /presets/".to_string())?;
        require_token(token)?;
        state.next_preset_id += 1;
        let now = Utc::now();
        let preset = Preset {
            id: Some(state.next_preset_id),
            preset_name: draft.preset_name.clone(),
            is_shared: false,
            params: draft.params.clone(),
            created_at: Some(now),
            updated_at: Some(now),
        };
        state.user.push(preset.clone());
        Ok(preset)
    }

    fn update_preset(&self, token: &str, id: u64, draft: &PresetDraft) -> Result<Preset> {
        let mut state = self.begin(format!("PUT /presets/{id}/"))?;
        require_token(token)?;
        let preset = state
            .user
            .iter_mut()
            .find(|p| p.id == Some(id))
            .ok_or_else(|| KicklabError::NotFound {
                what: "Permission to update is denied".to_string(),
            })?;
        preset.preset_name = draft.preset_name.clone();
        preset.params = draft.params.clone();
        preset.updated_at = Some(Utc::now());
        Ok(preset.clone())
    }

    fn delete_preset(&self, token: &str, id: u64) -> Result<()> {
        let mut state = self.begin(format!("DELETE /presets/{id}/"))?;
        require_token(token)?;
        let before = state.user.len();
        state.user.retain(|p| p.id != Some(id));
        if state.user.len() == before {
            return Err(KicklabError::NotFound {
                what: "Permission to delete is denied".to_string(),
            });
        }
        Ok(())
    }

    fn list_kicks(&self, token: &str) -> Result<KickList> {
        let state = self.begin("GET /kicks/".to_string())?;
        require_token(token)?;
        Ok(KickList {
            kicks: state.kicks.clone(),
            remaining_gens_today: MOCK_DAILY_GEN_LIMIT.saturating_sub(state.gens_today),
            total_gens_count: state.kicks.len() as u32,
        })
    }

    fn generate_kick(&self, token: &str) -> Result<GeneratedKick> {
        let mut state = self.begin("POST /kicks/generate/".to_string())?;
        require_token(token)?;

        let total = state.kicks.len() as u32;
        if total >= MOCK_TOTAL_GEN_CAP {
            return Err(KicklabError::Server {
                status: 400,
                message: format!("Delete kicks to generate more ({total}/{MOCK_TOTAL_GEN_CAP})"),
            });
        }
        if state.gens_today >= MOCK_DAILY_GEN_LIMIT {
            return Err(KicklabError::DailyLimitReached {
                message: format!("Daily generation limit reached {MOCK_DAILY_GEN_LIMIT}"),
            });
        }

        state.next_kick_id += 1;
        let id = state.next_kick_id;
        let base = KICK_NAMES[(id as usize - 1) % KICK_NAMES.len()];
        let mut name = base.to_string();
        let mut suffix = 2;
        while state.kicks.iter().any(|k| k.name == name) {
            name = format!("{base}{suffix}");
            suffix += 1;
        }

        let asset = KickAsset {
            id,
            name,
            audio_url: Self::generated_url(id),
        };
        state.kicks.push(asset.clone());
        state.gens_today += 1;

        Ok(GeneratedKick {
            id: asset.id,
            name: asset.name,
            audio_url: asset.audio_url,
            remaining_gens_today: MOCK_DAILY_GEN_LIMIT - state.gens_today,
            total_gens_count: state.kicks.len() as u32,
        })
    }

    fn delete_kick(&self, token: &str, id: u64, confirm: bool) -> Result<KickDeleted> {
        let path = if confirm {
            format!("DELETE /kicks/{id}/?confirm=true")
        } else {
            format!("DELETE /kicks/{id}/")
        };
        let mut state = self.begin(path)?;
        require_token(token)?;

        let name = state
            .kicks
            .iter()
            .find(|k| k.id == id)
            .map(|k| k.name.clone())
            .ok_or_else(|| KicklabError::NotFound {
                what: "Kick not found".to_string(),
            })?;

        let affected: Vec<String> = state
            .user
            .iter()
            .filter(|p| p.params.kick.kick_sample == name)
            .map(|p| p.preset_name.clone())
            .collect();
        if !affected.is_empty() && !confirm {
            return Err(KicklabError::AssetConflict { presets: affected });
        }

        state.user.retain(|p| p.params.kick.kick_sample != name);
        state.kicks.retain(|k| k.id != id);
        Ok(KickDeleted {
            total_count: state.kicks.len() as u32,
        })
    }
}
