//! Generated kick catalog
//!
//! Quota-limited list of the user's generated kicks. Each kick is decoded
//! and registered with the engine for a playback index; the resulting
//! name to index pairs feed the kick layer's sample list.

use tracing::{debug, info, warn};

use crate::api::{BackendApi, KickAsset, KickList};
use crate::engine::EngineGateway;
use crate::error::{KicklabError, Result};
use crate::state::session::{LoadTicket, Session};

/// Lifetime cap on generated kicks, checked before any request
pub const TOTAL_GEN_CAP: u32 = 30;

/// Generations allowed per day; enforced by the backend
pub const DAILY_GEN_LIMIT: u32 = 10;

/// Something that turns an asset URL into a playback index
pub trait SampleRegistrar {
    fn register_sample(&mut self, audio_url: &str) -> Result<usize>;

    fn is_ready(&self) -> bool;
}

impl SampleRegistrar for EngineGateway {
    fn register_sample(&mut self, audio_url: &str) -> Result<usize> {
        EngineGateway::register_sample(self, audio_url)
    }

    fn is_ready(&self) -> bool {
        EngineGateway::is_ready(self)
    }
}

/// A catalog row; `index` is `None` until the engine has the audio
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub asset: KickAsset,
    pub index: Option<usize>,
}

impl CatalogEntry {
    fn unindexed(asset: KickAsset) -> Self {
        Self { asset, index: None }
    }

    pub fn name(&self) -> &str {
        &self.asset.name
    }
}

#[derive(Debug, Clone, Default)]
pub struct AssetCatalog {
    entries: Vec<CatalogEntry>,
    remaining_today: u32,
    total_count: u32,
    loaded_epoch: Option<u64>,
    pending_epoch: Option<u64>,
}

impl AssetCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget everything; the next authenticated session loads again
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    // ========================================================================
    // Loading
    // ========================================================================

    /// Start a catalog load for `session`
    ///
    /// Only authenticated sessions have a catalog, and it is fetched at most
    /// once per session epoch.
    pub fn begin_load(&mut self, session: &Session) -> Option<LoadTicket> {
        if !session.status().is_authenticated() {
            return None;
        }
        let epoch = session.epoch();
        if self.loaded_epoch == Some(epoch) || self.pending_epoch == Some(epoch) {
            debug!("[CATALOG] Already loaded for epoch {}", epoch);
            return None;
        }
        self.entries.clear();
        self.pending_epoch = Some(epoch);
        Some(session.ticket())
    }

    /// Install a fetched list and register every kick that can be
    ///
    /// Returns the `(name, index)` pairs registered now. A stale ticket is
    /// discarded and yields nothing.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        list: KickList,
        registrar: &mut impl SampleRegistrar,
    ) -> Vec<(String, usize)> {
        if self.pending_epoch != Some(ticket.epoch()) {
            warn!("[CATALOG] Discarding stale kick list (epoch {})", ticket.epoch());
            return Vec::new();
        }
        self.pending_epoch = None;
        self.loaded_epoch = Some(ticket.epoch());
        self.remaining_today = list.remaining_gens_today;
        self.total_count = list.total_gens_count;
        self.entries = list.kicks.into_iter().map(CatalogEntry::unindexed).collect();

        info!(
            "[CATALOG] {} kicks, {} generations left today, {}/{} total",
            self.entries.len(),
            self.remaining_today,
            self.total_count,
            TOTAL_GEN_CAP
        );
        self.register_pending(registrar)
    }

    /// Settle a failed fetch so a later session change can retry
    pub fn fail_load(&mut self, ticket: LoadTicket) {
        if self.pending_epoch == Some(ticket.epoch()) {
            self.pending_epoch = None;
        }
    }

    /// Fetch the catalog for an authenticated session
    pub fn load(
        &mut self,
        api: &dyn BackendApi,
        session: &Session,
        registrar: &mut impl SampleRegistrar,
    ) -> Result<Vec<(String, usize)>> {
        let Some(ticket) = self.begin_load(session) else {
            return Ok(Vec::new());
        };
        let Some(token) = session.status().access_token() else {
            return Ok(Vec::new());
        };

        match api.list_kicks(token) {
            Ok(list) => Ok(self.finish_load(ticket, list, registrar)),
            Err(e) => {
                self.fail_load(ticket);
                Err(e)
            }
        }
    }

    /// Register every entry still missing an index
    ///
    /// A no-op while the engine is not ready. Failures are logged and the
    /// entry stays unindexed.
    pub fn register_pending(&mut self, registrar: &mut impl SampleRegistrar) -> Vec<(String, usize)> {
        if !registrar.is_ready() {
            debug!("[CATALOG] Engine not ready, deferring registration");
            return Vec::new();
        }

        let mut registered = Vec::new();
        for entry in self.entries.iter_mut().filter(|e| e.index.is_none()) {
            match registrar.register_sample(&entry.asset.audio_url) {
                Ok(index) => {
                    entry.index = Some(index);
                    registered.push((entry.asset.name.clone(), index));
                }
                Err(e) => {
                    warn!("[CATALOG] Could not register '{}': {}", entry.asset.name, e);
                }
            }
        }
        registered
    }

    // ========================================================================
    // Operations
    // ========================================================================

    /// Generate a new kick
    ///
    /// Refused locally with [`KicklabError::CapacityReached`] once the total
    /// cap is hit. When the engine is not ready the kick is kept without an
    /// index and registered later by [`Self::register_pending`].
    pub fn generate(
        &mut self,
        api: &dyn BackendApi,
        session: &Session,
        registrar: &mut impl SampleRegistrar,
    ) -> Result<CatalogEntry> {
        let token = session
            .status()
            .access_token()
            .ok_or(KicklabError::NotAuthenticated)?;
        if self.total_count >= TOTAL_GEN_CAP {
            return Err(KicklabError::CapacityReached {
                total: self.total_count,
                cap: TOTAL_GEN_CAP,
            });
        }

        let generated = api.generate_kick(token)?;
        self.remaining_today = generated.remaining_gens_today;
        self.total_count = generated.total_gens_count;

        let mut entry = CatalogEntry::unindexed(generated.asset());
        let registration = if registrar.is_ready() {
            registrar.register_sample(&entry.asset.audio_url).map(Some)
        } else {
            Ok(None)
        };

        match registration {
            Ok(index) => {
                entry.index = index;
                self.entries.push(entry.clone());
                info!(
                    "[CATALOG] Generated '{}' ({}/{} total)",
                    entry.asset.name, self.total_count, TOTAL_GEN_CAP
                );
                Ok(entry)
            }
            Err(e) => {
                warn!("[CATALOG] Generated '{}' but could not register it", entry.asset.name);
                self.entries.push(entry);
                Err(e)
            }
        }
    }

    /// Delete a kick
    ///
    /// Without `confirm`, a kick still used by presets fails with
    /// [`KicklabError::AssetConflict`] naming those presets and nothing is
    /// deleted. Returns the removed entry.
    pub fn remove(
        &mut self,
        api: &dyn BackendApi,
        session: &Session,
        id: u64,
        confirm: bool,
    ) -> Result<CatalogEntry> {
        let token = session
            .status()
            .access_token()
            .ok_or(KicklabError::NotAuthenticated)?;
        let position = self
            .entries
            .iter()
            .position(|e| e.asset.id == id)
            .ok_or_else(|| KicklabError::NotFound {
                what: format!("kick {id}"),
            })?;

        let deleted = api.delete_kick(token, id, confirm)?;
        self.total_count = deleted.total_count;
        let entry = self.entries.remove(position);
        info!("[CATALOG] Deleted '{}'", entry.asset.name);
        Ok(entry)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn get(&self, id: u64) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.asset.id == id)
    }

    pub fn find_by_name(&self, name: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.asset.name == name)
    }

    /// Registered kicks as `(name, index)`
    pub fn name_index(&self) -> Vec<(String, usize)> {
        self.entries
            .iter()
            .filter_map(|e| e.index.map(|index| (e.asset.name.clone(), index)))
            .collect()
    }

    pub fn remaining_today(&self) -> u32 {
        self.remaining_today
    }

    pub fn total_count(&self) -> u32 {
        self.total_count
    }

    pub fn is_at_capacity(&self) -> bool {
        self.total_count >= TOTAL_GEN_CAP
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded_epoch.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockBackend;
    use crate::state::session::AuthStatus;
    use pretty_assertions::assert_eq;

    /// Hands out indices from 5 upwards; fails URLs containing "broken"
    struct FakeRegistrar {
        ready: bool,
        next: usize,
        urls: Vec<String>,
    }

    impl FakeRegistrar {
        fn ready() -> Self {
            Self {
                ready: true,
                next: 5,
                urls: Vec::new(),
            }
        }
    }

    impl SampleRegistrar for FakeRegistrar {
        fn register_sample(&mut self, audio_url: &str) -> Result<usize> {
            if audio_url.contains("broken") {
                return Err(KicklabError::Decode {
                    reason: "not a wav".to_string(),
                });
            }
            self.urls.push(audio_url.to_string());
            self.next += 1;
            Ok(self.next - 1)
        }

        fn is_ready(&self) -> bool {
            self.ready
        }
    }

    fn signed_in() -> Session {
        Session::with_status(AuthStatus::Authenticated {
            username: "mara".to_string(),
            access_token: "token".to_string(),
        })
    }

    #[test]
    fn test_load_registers_in_order() {
        let api = MockBackend::new()
            .with_kick("Donnerschlag", "/k/1.wav")
            .with_kick("Brummbass", "/k/2.wav")
            .with_generations_today(3);
        let mut catalog = AssetCatalog::new();
        let mut registrar = FakeRegistrar::ready();

        let pairs = catalog.load(&api, &signed_in(), &mut registrar).unwrap();

        assert_eq!(
            pairs,
            vec![("Donnerschlag".to_string(), 5), ("Brummbass".to_string(), 6)]
        );
        assert_eq!(catalog.remaining_today(), DAILY_GEN_LIMIT - 3);
        assert_eq!(catalog.total_count(), 2);
    }

    #[test]
    fn test_load_once_per_session() {
        let api = MockBackend::new().with_kick("Donnerschlag", "/k/1.wav");
        let mut catalog = AssetCatalog::new();
        let mut registrar = FakeRegistrar::ready();
        let mut session = signed_in();

        catalog.load(&api, &session, &mut registrar).unwrap();
        catalog.load(&api, &session, &mut registrar).unwrap();
        assert_eq!(api.request_count(), 1);

        session.transition(AuthStatus::Authenticated {
            username: "mara".to_string(),
            access_token: "token2".to_string(),
        });
        catalog.load(&api, &session, &mut registrar).unwrap();
        assert_eq!(api.request_count(), 2);
    }

    #[test]
    fn test_guest_has_no_catalog() {
        let api = MockBackend::new();
        let mut catalog = AssetCatalog::new();
        catalog
            .load(
                &api,
                &Session::with_status(AuthStatus::Guest),
                &mut FakeRegistrar::ready(),
            )
            .unwrap();
        assert_eq!(api.request_count(), 0);
        assert!(!catalog.is_loaded());
    }

    #[test]
    fn test_registration_deferred_until_ready() {
        let api = MockBackend::new()
            .with_kick("Donnerschlag", "/k/1.wav")
            .with_kick("Kaputt", "/k/broken.wav");
        let mut catalog = AssetCatalog::new();
        let mut registrar = FakeRegistrar {
            ready: false,
            next: 5,
            urls: Vec::new(),
        };

        let pairs = catalog.load(&api, &signed_in(), &mut registrar).unwrap();
        assert!(pairs.is_empty());
        assert!(catalog.name_index().is_empty());

        registrar.ready = true;
        let pairs = catalog.register_pending(&mut registrar);
        assert_eq!(pairs, vec![("Donnerschlag".to_string(), 5)]);
        assert_eq!(catalog.find_by_name("Kaputt").unwrap().index, None);
        assert_eq!(catalog.entries().len(), 2);
    }

    #[test]
    fn test_stale_list_discarded() {
        let mut catalog = AssetCatalog::new();
        let mut session = signed_in();
        let ticket = catalog.begin_load(&session).unwrap();
        session.transition(AuthStatus::SignedOut);
        catalog.reset();

        let list = KickList {
            kicks: vec![KickAsset {
                id: 1,
                name: "Alt".to_string(),
                audio_url: "/k/1.wav".to_string(),
            }],
            remaining_gens_today: 10,
            total_gens_count: 1,
        };
        assert!(catalog
            .finish_load(ticket, list, &mut FakeRegistrar::ready())
            .is_empty());
        assert!(catalog.entries().is_empty());
    }

    #[test]
    fn test_generate_updates_counters() {
        let api = MockBackend::new();
        let session = signed_in();
        let mut catalog = AssetCatalog::new();
        let mut registrar = FakeRegistrar::ready();
        catalog.load(&api, &session, &mut registrar).unwrap();

        let entry = catalog.generate(&api, &session, &mut registrar).unwrap();
        assert_eq!(entry.index, Some(5));
        assert_eq!(entry.asset.audio_url, MockBackend::generated_url(1));
        assert_eq!(catalog.total_count(), 1);
        assert_eq!(catalog.remaining_today(), DAILY_GEN_LIMIT - 1);
    }

    #[test]
    fn test_generate_at_cap_makes_no_request() {
        let mut api = MockBackend::new();
        for i in 0..TOTAL_GEN_CAP {
            api = api.with_kick(&format!("Kick{i}"), &format!("/k/{i}.wav"));
        }
        let session = signed_in();
        let mut catalog = AssetCatalog::new();
        let mut registrar = FakeRegistrar::ready();
        catalog.load(&api, &session, &mut registrar).unwrap();
        let before = api.request_count();

        let err = catalog.generate(&api, &session, &mut registrar).unwrap_err();
        assert!(matches!(
            err,
            KicklabError::CapacityReached { total: 30, cap: 30 }
        ));
        assert_eq!(api.request_count(), before);
        assert!(catalog.is_at_capacity());
    }

    #[test]
    fn test_generate_daily_limit_from_server() {
        let api = MockBackend::new().with_generations_today(DAILY_GEN_LIMIT);
        let session = signed_in();
        let mut catalog = AssetCatalog::new();
        let mut registrar = FakeRegistrar::ready();
        catalog.load(&api, &session, &mut registrar).unwrap();

        let err = catalog.generate(&api, &session, &mut registrar).unwrap_err();
        assert!(matches!(err, KicklabError::DailyLimitReached { .. }));
        assert!(catalog.entries().is_empty());
    }

    #[test]
    fn test_generate_while_engine_down_keeps_entry() {
        let api = MockBackend::new();
        let session = signed_in();
        let mut catalog = AssetCatalog::new();
        let mut registrar = FakeRegistrar {
            ready: false,
            next: 5,
            urls: Vec::new(),
        };
        catalog.load(&api, &session, &mut registrar).unwrap();

        let entry = catalog.generate(&api, &session, &mut registrar).unwrap();
        assert_eq!(entry.index, None);
        assert!(registrar.urls.is_empty());

        registrar.ready = true;
        let pairs = catalog.register_pending(&mut registrar);
        assert_eq!(pairs, vec![(entry.asset.name.clone(), 5)]);
    }

    #[test]
    fn test_remove_conflict_then_confirm() {
        use crate::state::preset::Preset;

        let mut intro: Preset = serde_json::from_value(serde_json::json!({
            "preset_name": "Intro",
            "bpm": 140,
            "kick_sample": "Wummer",
            "kick_len": 1.0,
            "kick_dist_amt": 0.0,
            "kick_ott_amt": 0.0,
            "noise_sample": "Vinyl",
            "noise_low_pass_freq": 20000.0,
            "noise_high_pass_freq": 30.0,
            "noise_volume": -24.0,
            "reverb_sample": "Hall",
            "reverb_low_pass_freq": 20000.0,
            "reverb_high_pass_freq": 30.0,
            "reverb_volume": -18.0,
            "master_ott_amt": 0.0,
            "master_dist_amt": 0.0,
            "master_limiter_amt": 1.0
        }))
        .unwrap();
        intro.id = None;

        let api = MockBackend::new()
            .with_kick("Wummer", "/k/w.wav")
            .with_user_preset(intro);
        let session = signed_in();
        let mut catalog = AssetCatalog::new();
        let mut registrar = FakeRegistrar::ready();
        catalog.load(&api, &session, &mut registrar).unwrap();

        let err = catalog.remove(&api, &session, 1, false).unwrap_err();
        assert_eq!(err.conflicting_presets(), Some(&["Intro".to_string()][..]));
        assert_eq!(catalog.entries().len(), 1);

        let removed = catalog.remove(&api, &session, 1, true).unwrap();
        assert_eq!(removed.index, Some(5));
        assert!(catalog.entries().is_empty());
        assert_eq!(catalog.total_count(), 0);
        assert!(api.user_preset_names().is_empty());
    }

    #[test]
    fn test_remove_unknown_id() {
        let api = MockBackend::new();
        let session = signed_in();
        let mut catalog = AssetCatalog::new();
        assert!(matches!(
            catalog.remove(&api, &session, 42, false),
            Err(KicklabError::NotFound { .. })
        ));
        assert_eq!(api.request_count(), 0);
    }
}
