//! Preset Store
//!
//! Holds the shared and user preset collections for the current session and
//! the current-preset pointer.
//!
//! ```text
//! Loading --finish_load--> Idle(current = Some(key) | None)
//!    ^                          |
//!    +------ session change ----+
//! ```
//!
//! Display order is shared presets then user presets, each sorted by name.
//! The current pointer is either `None` or the key of a loaded preset.

use std::cmp::Ordering;

use tracing::{debug, info, warn};

use crate::api::BackendApi;
use crate::error::{KicklabError, Result};
use crate::layers::surface::SnapshotTarget;
use crate::state::preset::{
    validate_preset_name, Preset, PresetDraft, PresetKey, PresetParams, DEFAULT_PRESET_NAME,
};
use crate::state::session::{LoadTicket, Session};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreStatus {
    #[default]
    Loading,
    Idle,
}

#[derive(Debug, Clone, Default)]
pub struct PresetStore {
    status: StoreStatus,
    epoch: u64,
    shared: Vec<Preset>,
    user: Vec<Preset>,
    current: Option<PresetKey>,
}

fn by_name(a: &Preset, b: &Preset) -> Ordering {
    a.preset_name
        .to_lowercase()
        .cmp(&b.preset_name.to_lowercase())
        .then_with(|| a.preset_name.cmp(&b.preset_name))
}

impl PresetStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Loading
    // ========================================================================

    /// Drop everything and start loading for `session`
    ///
    /// Returns `None` while the auth status is unknown; the store then stays
    /// `Loading` until the next session change.
    pub fn begin_load(&mut self, session: &Session) -> Option<LoadTicket> {
        self.status = StoreStatus::Loading;
        self.epoch = session.epoch();
        self.shared.clear();
        self.user.clear();
        self.current = None;

        match session.status() {
            crate::state::session::AuthStatus::Unknown => {
                debug!("[PRESETS] Auth status unknown, waiting");
                None
            }
            _ => Some(session.ticket()),
        }
    }

    /// Install fetched collections and apply the default shared preset
    ///
    /// Returns false (and changes nothing) for a stale ticket.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        shared: Vec<Preset>,
        user: Vec<Preset>,
        target: &mut impl SnapshotTarget,
    ) -> bool {
        if ticket.epoch() != self.epoch {
            warn!(
                "[PRESETS] Discarding stale preset load (epoch {} < {})",
                ticket.epoch(),
                self.epoch
            );
            return false;
        }

        self.shared = shared
            .into_iter()
            .filter(|p| p.id.is_some())
            .map(|mut p| {
                p.is_shared = true;
                p
            })
            .collect();
        self.user = user
            .into_iter()
            .filter(|p| p.id.is_some())
            .map(|mut p| {
                p.is_shared = false;
                p
            })
            .collect();
        self.shared.sort_by(by_name);
        self.user.sort_by(by_name);
        self.status = StoreStatus::Idle;
        self.current = None;

        info!(
            "[PRESETS] Loaded {} shared and {} user presets",
            self.shared.len(),
            self.user.len()
        );

        let default = self
            .shared
            .iter()
            .find(|p| p.preset_name == DEFAULT_PRESET_NAME)
            .or_else(|| self.shared.first())
            .and_then(Preset::key);
        if let Some(key) = default {
            self.load_preset(key, target);
        }
        true
    }

    /// Settle a failed load: idle with whatever is loaded (nothing)
    pub fn fail_load(&mut self, ticket: LoadTicket) {
        if ticket.epoch() == self.epoch {
            self.status = StoreStatus::Idle;
        }
    }

    /// Fetch shared (and, when signed in, user) presets and apply the default
    pub fn load(
        &mut self,
        api: &dyn BackendApi,
        session: &Session,
        target: &mut impl SnapshotTarget,
    ) -> Result<()> {
        let Some(ticket) = self.begin_load(session) else {
            return Ok(());
        };
        let token = session.status().access_token();

        let fetched = api.shared_presets(token).and_then(|shared| {
            let user = match token {
                Some(token) => api.user_presets(token)?,
                None => Vec::new(),
            };
            Ok((shared, user))
        });

        match fetched {
            Ok((shared, user)) => {
                self.finish_load(ticket, shared, user, target);
                Ok(())
            }
            Err(e) => {
                self.fail_load(ticket);
                Err(e)
            }
        }
    }

    // ========================================================================
    // Operations
    // ========================================================================

    /// Apply a preset's full snapshot and make it current
    ///
    /// Returns false (no-op) if the key is unknown.
    pub fn load_preset(&mut self, key: PresetKey, target: &mut impl SnapshotTarget) -> bool {
        let Some(preset) = self.get(key) else {
            debug!("[PRESETS] load_preset: {:?} not found", key);
            return false;
        };
        target.apply(&preset.params);
        debug!("[PRESETS] Applied '{}'", preset.preset_name);
        self.current = Some(key);
        true
    }

    /// Save the given snapshot under `name`, creating or updating a user preset
    pub fn save_preset(
        &mut self,
        api: &dyn BackendApi,
        session: &Session,
        name: &str,
        params: PresetParams,
    ) -> Result<PresetKey> {
        let token = session
            .status()
            .access_token()
            .ok_or(KicklabError::NotAuthenticated)?;
        let name = validate_preset_name(name)?;
        if self.shared.iter().any(|p| p.preset_name == name) {
            return Err(KicklabError::CannotUpdateShared { name });
        }

        let draft = PresetDraft::new(name.clone(), params);
        let existing = self
            .user
            .iter()
            .position(|p| p.preset_name == name)
            .and_then(|pos| self.user[pos].id.map(|id| (pos, id)));

        let key = match existing {
            Some((pos, id)) => {
                let mut saved = api.update_preset(token, id, &draft)?;
                saved.id = Some(id);
                saved.is_shared = false;
                self.user[pos] = saved;
                info!("[PRESETS] Updated '{}'", name);
                PresetKey::user(id)
            }
            None => {
                let mut saved = api.create_preset(token, &draft)?;
                saved.is_shared = false;
                let id = saved.id.ok_or_else(|| KicklabError::Server {
                    status: 201,
                    message: "created preset has no id".to_string(),
                })?;
                self.user.push(saved);
                self.user.sort_by(by_name);
                info!("[PRESETS] Created '{}'", name);
                PresetKey::user(id)
            }
        };

        self.current = Some(key);
        Ok(key)
    }

    /// Delete the current preset; it must be a user preset
    pub fn delete_current_preset(&mut self, api: &dyn BackendApi, session: &Session) -> Result<()> {
        let key = self.current.ok_or(KicklabError::NoCurrentPreset)?;
        let preset = self.get(key).ok_or(KicklabError::NoCurrentPreset)?;
        if key.shared {
            return Err(KicklabError::CannotDeleteShared {
                name: preset.preset_name.clone(),
            });
        }
        let token = session
            .status()
            .access_token()
            .ok_or(KicklabError::NotAuthenticated)?;

        api.delete_preset(token, key.id)?;
        self.user.retain(|p| p.id != Some(key.id));
        self.current = None;
        info!("[PRESETS] Deleted preset {}", key.id);
        Ok(())
    }

    /// Step forward through the display list, wrapping around
    ///
    /// With no current preset this goes to the first entry.
    pub fn next_preset(&mut self, target: &mut impl SnapshotTarget) -> Option<PresetKey> {
        self.step(target, true)
    }

    /// Step backward through the display list, wrapping around
    ///
    /// With no current preset this goes to the last entry.
    pub fn prev_preset(&mut self, target: &mut impl SnapshotTarget) -> Option<PresetKey> {
        self.step(target, false)
    }

    fn step(&mut self, target: &mut impl SnapshotTarget, forward: bool) -> Option<PresetKey> {
        let keys: Vec<PresetKey> = self.display_list().filter_map(Preset::key).collect();
        let len = keys.len();
        if len == 0 {
            return None;
        }

        let position = self
            .current
            .and_then(|current| keys.iter().position(|k| *k == current));
        let next = match (position, forward) {
            (Some(i), true) => (i + 1) % len,
            (Some(i), false) => (i + len - 1) % len,
            (None, true) => 0,
            (None, false) => len - 1,
        };

        let key = keys[next];
        self.load_preset(key, target);
        Some(key)
    }

    /// Forget user presets whose kick sample is `name`
    ///
    /// Mirrors the backend's cascade on a confirmed kick deletion. Returns the
    /// removed preset names.
    pub fn purge_kick_sample(&mut self, name: &str) -> Vec<String> {
        let mut removed = Vec::new();
        let current = self.current;
        let mut current_removed = false;
        self.user.retain(|p| {
            if p.params.kick.kick_sample != name {
                return true;
            }
            removed.push(p.preset_name.clone());
            if p.key() == current {
                current_removed = true;
            }
            false
        });
        if current_removed {
            self.current = None;
        }
        if !removed.is_empty() {
            info!("[PRESETS] Removed {} presets using '{}'", removed.len(), name);
        }
        removed
    }

    /// Mark the state as unsaved (after a manual parameter edit)
    pub fn clear_current(&mut self) {
        self.current = None;
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn status(&self) -> StoreStatus {
        self.status
    }

    pub fn is_loading(&self) -> bool {
        self.status == StoreStatus::Loading
    }

    /// Shared presets then user presets, each sorted by name
    pub fn display_list(&self) -> impl Iterator<Item = &Preset> {
        self.shared.iter().chain(self.user.iter())
    }

    pub fn shared(&self) -> &[Preset] {
        &self.shared
    }

    pub fn user(&self) -> &[Preset] {
        &self.user
    }

    pub fn len(&self) -> usize {
        self.shared.len() + self.user.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, key: PresetKey) -> Option<&Preset> {
        let list = if key.shared { &self.shared } else { &self.user };
        list.iter().find(|p| p.id == Some(key.id))
    }

    pub fn current_key(&self) -> Option<PresetKey> {
        self.current
    }

    pub fn current(&self) -> Option<&Preset> {
        self.current.and_then(|key| self.get(key))
    }

    /// Look a preset up by name; shared presets win
    pub fn find_by_name(&self, name: &str) -> Option<&Preset> {
        self.display_list().find(|p| p.preset_name == name)
    }
}
