//! Shared fixtures for the integration tests

#![allow(dead_code)]

use std::sync::Arc;

use kicklab::api::MockBackend;
use kicklab::config::KicklabConfig;
use kicklab::engine::{encode_wav, EngineProbe, HeadlessBackend, MemoryFetcher};
use kicklab::layers::{KickState, MasterState, NoiseState, ReverbState};
use kicklab::state::{AuthStatus, Preset, PresetParams};
use kicklab::Workstation;

/// Fetcher serving the engine script, every built-in sample and `extra`
pub fn fetcher(config: &KicklabConfig, extra: &[&str]) -> MemoryFetcher {
    let engine = &config.engine;
    let mut fetcher = MemoryFetcher::new().with_asset(engine.script_url.clone(), b"engine()".to_vec());

    let banks = engine
        .kick_bank
        .iter()
        .chain(engine.noise_bank.iter())
        .map(|entry| (entry.url.clone(), 1u16));
    let irs = engine.ir_bank.iter().map(|entry| (entry.url.clone(), 2u16));
    for (url, channels) in banks.chain(irs) {
        let samples = vec![0.25; channels as usize * 4];
        fetcher.insert(url, encode_wav(&samples, channels, 48_000).unwrap());
    }
    for url in extra {
        fetcher.insert(*url, encode_wav(&[0.5, -0.5], 1, 48_000).unwrap());
    }
    fetcher
}

pub struct Rig {
    pub station: Workstation,
    pub probe: EngineProbe,
    pub api: Arc<MockBackend>,
}

/// Workstation over a mock backend, headless engine and in-memory assets
pub fn rig(api: MockBackend, extra_assets: &[&str]) -> Rig {
    let config = KicklabConfig::default();
    let fetcher = Arc::new(fetcher(&config, extra_assets));
    let api = Arc::new(api);
    let (backend, probe) = HeadlessBackend::new();
    let station = Workstation::new(config, api.clone(), Box::new(backend), fetcher);
    Rig {
        station,
        probe,
        api,
    }
}

pub fn signed_in() -> AuthStatus {
    AuthStatus::Authenticated {
        username: "mara".to_string(),
        access_token: "token".to_string(),
    }
}

pub fn params(bpm: u16, kick_sample: &str) -> PresetParams {
    PresetParams {
        bpm,
        kick: KickState {
            kick_sample: kick_sample.to_string(),
            kick_len: 0.6,
            kick_dist_amt: 0.3,
            kick_ott_amt: 0.2,
        },
        noise: NoiseState {
            noise_sample: "Rain".to_string(),
            noise_low_pass_freq: 6000.0,
            noise_high_pass_freq: 80.0,
            noise_volume: -20.0,
        },
        reverb: ReverbState {
            reverb_sample: "Plate".to_string(),
            reverb_low_pass_freq: 12000.0,
            reverb_high_pass_freq: 100.0,
            reverb_volume: -12.0,
        },
        master: MasterState {
            master_ott_amt: 0.4,
            master_dist_amt: 0.1,
            master_limiter_amt: 2.0,
        },
    }
}

pub fn preset(name: &str, bpm: u16, kick_sample: &str) -> Preset {
    Preset {
        id: None,
        preset_name: name.to_string(),
        is_shared: false,
        params: params(bpm, kick_sample),
        created_at: None,
        updated_at: None,
    }
}
