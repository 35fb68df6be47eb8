//! Workstation
//!
//! Wires the engine gateway, the control surface, the preset store and the
//! kick catalog to one backend and one session.
//!
//! ```text
//! knob ─► layer ─► mapping ─► EngineHandle::post ─► engine
//! preset ─► ControlSurface::apply ─► layers ─► (same path)
//! catalog ─► register_sample ─► kick layer sample list
//! ```

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::api::{BackendApi, Credentials};
use crate::config::KicklabConfig;
use crate::engine::{AssetFetcher, AudioBackend, EngineGateway, Readiness};
use crate::error::Result;
use crate::layers::{ControlSurface, SnapshotTarget};
use crate::state::{AssetCatalog, AuthStatus, CatalogEntry, PresetKey, PresetStore, Session};
use crate::transport::{TempoEntry, TransportState};

pub struct Workstation {
    api: Arc<dyn BackendApi>,
    gateway: EngineGateway,
    surface: ControlSurface,
    session: Session,
    presets: PresetStore,
    catalog: AssetCatalog,
    tempo: TempoEntry,
}

impl Workstation {
    pub fn new(
        config: KicklabConfig,
        api: Arc<dyn BackendApi>,
        backend: Box<dyn AudioBackend>,
        fetcher: Arc<dyn AssetFetcher>,
    ) -> Self {
        let gateway = EngineGateway::new(config.engine, backend, fetcher);
        let surface = ControlSurface::new(gateway.handle(), gateway.registries());
        let tempo = TempoEntry::new(surface.transport.bpm());

        Self {
            api,
            gateway,
            surface,
            session: Session::new(),
            presets: PresetStore::new(),
            catalog: AssetCatalog::new(),
            tempo,
        }
    }

    // ========================================================================
    // Engine
    // ========================================================================

    /// Bring the engine up, then deliver everything set in the meantime
    ///
    /// On failure the engine stays `Initializing` and the error is logged;
    /// controllers keep holding their values. Starting again after a failure
    /// returns `EngineNotReady`.
    pub fn start_engine(&mut self) -> Result<()> {
        if let Err(e) = self.gateway.initialize() {
            error!("[WORKSTATION] Engine initialization failed: {}", e);
            return Err(e);
        }

        self.surface.flush_pending();
        let registered = self.catalog.register_pending(&mut self.gateway);
        self.surface.kick.merge_generated(registered);
        Ok(())
    }

    pub fn readiness(&self) -> Readiness {
        self.gateway.readiness()
    }

    pub fn gateway(&self) -> &EngineGateway {
        &self.gateway
    }

    /// Cancel a running initialization and close the engine
    pub fn dispose(&mut self) {
        self.surface.transport.stop();
        self.gateway.dispose();
    }

    // ========================================================================
    // Session
    // ========================================================================

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Switch the auth status and reload everything that depends on it
    ///
    /// Leaving an authenticated session stops playback. Generated kicks from
    /// the previous session are forgotten.
    pub fn set_session(&mut self, status: AuthStatus) -> Result<()> {
        if self.session.status().is_authenticated() && !status.is_authenticated() {
            self.surface.transport.stop();
        }
        info!("[WORKSTATION] Session: {}", status);
        self.session.transition(status);
        self.surface.kick.clear_generated();
        self.catalog.reset();

        let presets = self
            .presets
            .load(&*self.api, &self.session, &mut self.surface);
        self.tempo.sync(&self.surface.transport);

        let catalog = self
            .catalog
            .load(&*self.api, &self.session, &mut self.gateway)
            .map(|registered| self.surface.kick.merge_generated(registered));

        if let Err(e) = &catalog {
            warn!("[WORKSTATION] Kick catalog load failed: {}", e);
        }
        presets.and(catalog)
    }

    /// Exchange credentials for a token and switch to an authenticated session
    pub fn sign_in(&mut self, username: &str, password: &str) -> Result<()> {
        let tokens = self.api.obtain_token(&Credentials {
            username: username.to_string(),
            password: password.to_string(),
        })?;
        self.set_session(AuthStatus::Authenticated {
            username: username.to_string(),
            access_token: tokens.access,
        })
    }

    /// Create an account; does not sign in
    pub fn register(&self, username: &str, password: &str) -> Result<()> {
        self.api.register(&Credentials {
            username: username.to_string(),
            password: password.to_string(),
        })?;
        info!("[WORKSTATION] Registered {}", username);
        Ok(())
    }

    pub fn sign_out(&mut self) -> Result<()> {
        self.set_session(AuthStatus::SignedOut)
    }

    // ========================================================================
    // Controls
    // ========================================================================

    pub fn surface(&self) -> &ControlSurface {
        &self.surface
    }

    /// Direct access to the layers; edits here mark the state unsaved
    pub fn surface_mut(&mut self) -> &mut ControlSurface {
        self.presets.clear_current();
        &mut self.surface
    }

    pub fn play_click(&mut self) -> Result<TransportState> {
        self.surface.transport.handle_play_click(&mut self.gateway)
    }

    pub fn stop(&mut self) {
        self.surface.transport.stop();
    }

    pub fn cue_press(&mut self) {
        self.surface.transport.cue_press();
    }

    pub fn cue_release(&mut self) {
        self.surface.transport.cue_release();
    }

    pub fn tempo_text(&self) -> &str {
        self.tempo.text()
    }

    /// Keystroke in the tempo field
    pub fn tempo_input(&mut self, text: &str) -> Option<u16> {
        self.tempo.input(text, &mut self.surface.transport)
    }

    /// Blur or enter in the tempo field
    pub fn tempo_commit(&mut self) -> Result<u16> {
        self.tempo.commit(&mut self.surface.transport)
    }

    // ========================================================================
    // Presets
    // ========================================================================

    pub fn presets(&self) -> &PresetStore {
        &self.presets
    }

    pub fn load_preset(&mut self, key: PresetKey) -> bool {
        let applied = self.presets.load_preset(key, &mut self.surface);
        self.tempo.sync(&self.surface.transport);
        applied
    }

    /// Save the current control values under `name`
    pub fn save_preset(&mut self, name: &str) -> Result<PresetKey> {
        let params = self.surface.capture();
        self.presets
            .save_preset(&*self.api, &self.session, name, params)
    }

    pub fn delete_current_preset(&mut self) -> Result<()> {
        self.presets.delete_current_preset(&*self.api, &self.session)
    }

    pub fn next_preset(&mut self) -> Option<PresetKey> {
        let key = self.presets.next_preset(&mut self.surface);
        self.tempo.sync(&self.surface.transport);
        key
    }

    pub fn prev_preset(&mut self) -> Option<PresetKey> {
        let key = self.presets.prev_preset(&mut self.surface);
        self.tempo.sync(&self.surface.transport);
        key
    }

    // ========================================================================
    // Generated kicks
    // ========================================================================

    pub fn catalog(&self) -> &AssetCatalog {
        &self.catalog
    }

    /// Generate a kick and make it selectable
    pub fn generate_kick(&mut self) -> Result<CatalogEntry> {
        let entry = self
            .catalog
            .generate(&*self.api, &self.session, &mut self.gateway)?;
        if let Some(index) = entry.index {
            self.surface
                .kick
                .merge_generated([(entry.asset.name.clone(), index)]);
        }
        Ok(entry)
    }

    /// Delete a generated kick
    ///
    /// Returns the names of presets removed along with it (only with
    /// `confirm`). Without `confirm`, a kick used by presets fails with
    /// `AssetConflict` and nothing changes.
    pub fn delete_kick(&mut self, id: u64, confirm: bool) -> Result<Vec<String>> {
        let entry = self
            .catalog
            .remove(&*self.api, &self.session, id, confirm)?;
        self.surface.kick.remove_generated(entry.name());
        Ok(self.presets.purge_kick_sample(entry.name()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockBackend;
    use crate::engine::{EngineCommand, EngineProbe, HeadlessBackend, MemoryFetcher};
    use crate::error::KicklabError;

    fn workstation(api: MockBackend) -> (Workstation, EngineProbe, Arc<MockBackend>) {
        let api = Arc::new(api);
        let (backend, probe) = HeadlessBackend::new();
        let station = Workstation::new(
            KicklabConfig::default(),
            api.clone(),
            Box::new(backend),
            Arc::new(MemoryFetcher::new()),
        );
        (station, probe, api)
    }

    #[test]
    fn test_failed_engine_start_stays_initializing() {
        let (mut station, probe, _) = workstation(MockBackend::new());
        assert!(matches!(
            station.start_engine(),
            Err(KicklabError::Fetch { .. })
        ));
        assert_eq!(station.readiness(), Readiness::Initializing);
        assert!(!probe
            .drain()
            .iter()
            .any(|c| matches!(c, EngineCommand::Bpm { .. })));

        assert!(matches!(
            station.start_engine(),
            Err(KicklabError::EngineNotReady)
        ));
        assert_eq!(station.readiness(), Readiness::Initializing);
    }

    #[test]
    fn test_unknown_session_fetches_nothing() {
        let (mut station, _, api) = workstation(MockBackend::new());
        station.set_session(AuthStatus::Unknown).unwrap();
        assert!(station.presets().is_loading());
        assert_eq!(api.request_count(), 0);
    }

    #[test]
    fn test_sign_out_stops_transport() {
        let (mut station, _, _) = workstation(MockBackend::new());
        station.sign_in("mara", "secret").unwrap();
        station.play_click().unwrap();
        assert!(station.surface().transport.is_playing());

        station.sign_out().unwrap();
        assert!(!station.surface().transport.is_playing());
        assert!(station.catalog().entries().is_empty());
    }

    #[test]
    fn test_guest_save_is_rejected() {
        let (mut station, _, api) = workstation(MockBackend::new());
        station.set_session(AuthStatus::Guest).unwrap();
        let before = api.request_count();
        assert!(matches!(
            station.save_preset("Mine"),
            Err(KicklabError::NotAuthenticated)
        ));
        assert_eq!(api.request_count(), before);
    }

    #[test]
    fn test_tempo_entry_follows_transport() {
        let (mut station, _, _) = workstation(MockBackend::new());
        assert_eq!(station.tempo_input("17"), None);
        assert_eq!(station.tempo_input("172"), Some(172));
        station.tempo_input("500");
        assert_eq!(station.tempo_commit().unwrap(), 365);
        assert_eq!(station.tempo_text(), "365");
    }
}
