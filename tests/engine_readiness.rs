//! Engine readiness: values set early reach the engine exactly once

mod common;

use std::sync::Arc;

use approx::assert_relative_eq;
use kicklab::api::MockBackend;
use kicklab::config::KicklabConfig;
use kicklab::engine::{EngineCommand, HeadlessBackend, Readiness};
use kicklab::layers::{KickParam, NoiseParam};
use kicklab::{KicklabError, Workstation};

use common::{fetcher, rig, signed_in};

/// Init plus every built-in sample of the default banks
const STARTUP_COMMANDS: usize = 1 + 5 + 4 + 4;

#[test]
fn test_early_values_flush_once_after_startup() {
    let mut rig = rig(MockBackend::new(), &[]);
    {
        let surface = rig.station.surface_mut();
        surface.kick.set(KickParam::Distortion, 0.3);
        surface.kick.set(KickParam::Distortion, 0.7);
        surface.noise.set_noise_sample("Rain");
    }
    assert_eq!(rig.station.tempo_input("150"), Some(150));

    rig.station.start_engine().unwrap();
    assert_eq!(rig.station.readiness(), Readiness::Ready);

    let commands = rig.probe.drain();
    assert!(matches!(commands[0], EngineCommand::Init { .. }));
    let flushed = &commands[STARTUP_COMMANDS..];
    assert_eq!(flushed.len(), 17);

    let distortion: Vec<f32> = flushed
        .iter()
        .filter_map(|c| match c {
            EngineCommand::KickDistortion { value } => Some(*value),
            _ => None,
        })
        .collect();
    assert_eq!(distortion.len(), 1);
    assert_relative_eq!(distortion[0], 0.7, epsilon = 1e-6);

    assert!(flushed.contains(&EngineCommand::SelectNoiseSample { index: 2 }));
    assert_eq!(flushed[0], EngineCommand::SelectKickSample { index: 0 });
    assert_eq!(
        &flushed[15..],
        &[
            EngineCommand::Bpm { value: 150.0 },
            EngineCommand::Loop { enabled: false }
        ]
    );
}

#[test]
fn test_changes_after_ready_post_immediately_and_dedupe() {
    let mut rig = rig(MockBackend::new(), &[]);
    rig.station.start_engine().unwrap();
    rig.probe.drain();

    let surface = rig.station.surface_mut();
    surface.noise.set(NoiseParam::Volume, -30.0);
    surface.noise.set(NoiseParam::Volume, -30.0);
    surface.noise.set_normalized(NoiseParam::LowPass, 100.0);

    assert_eq!(
        rig.probe.drain(),
        vec![EngineCommand::NoiseVolume { value: -30.0 }]
    );
}

#[test]
fn test_play_click_resumes_output_and_toggles_loop() {
    let mut rig = rig(MockBackend::new(), &[]);
    rig.station.start_engine().unwrap();
    rig.probe.drain();

    rig.station.play_click().unwrap();
    rig.station.play_click().unwrap();
    rig.station.stop();

    assert_eq!(rig.probe.resume_calls(), 1);
    assert_eq!(
        rig.probe.drain(),
        vec![
            EngineCommand::Loop { enabled: true },
            EngineCommand::Loop { enabled: false },
        ]
    );
}

#[test]
fn test_cue_before_ready_is_dropped() {
    let mut rig = rig(MockBackend::new(), &[]);
    rig.station.cue_press();
    rig.station.cue_release();
    rig.station.start_engine().unwrap();

    let commands = rig.probe.drain();
    assert!(!commands
        .iter()
        .any(|c| matches!(c, EngineCommand::Cue | EngineCommand::CueRelease)));

    rig.station.cue_press();
    rig.station.cue_release();
    assert_eq!(
        rig.probe.drain(),
        vec![EngineCommand::Cue, EngineCommand::CueRelease]
    );
}

#[test]
fn test_cue_held_across_startup_sends_no_release() {
    let mut rig = rig(MockBackend::new(), &[]);
    rig.station.cue_press();
    rig.station.start_engine().unwrap();
    rig.probe.drain();

    rig.station.cue_release();
    assert!(rig.probe.drain().is_empty());
    assert!(!rig.station.surface().transport.is_cue_pressed());
}

#[test]
fn test_generated_kick_selected_early_resolves_after_startup() {
    let api = MockBackend::new().with_kick("Donnerschlag", "/k/donner.wav");
    let mut rig = rig(api, &["/k/donner.wav"]);
    rig.station.set_session(signed_in()).unwrap();
    assert_eq!(rig.station.catalog().entries()[0].index, None);

    rig.station
        .surface_mut()
        .kick
        .set_kick_sample("Donnerschlag");
    rig.station.start_engine().unwrap();

    let commands = rig.probe.drain();
    assert_eq!(
        commands.last(),
        Some(&EngineCommand::SelectKickSample { index: 5 })
    );
    assert_eq!(
        rig.station.surface().kick.available_samples().last().map(String::as_str),
        Some("Donnerschlag")
    );
    assert_eq!(rig.station.catalog().entries()[0].index, Some(5));
}

#[test]
fn test_missing_handshake_leaves_engine_initializing() {
    let mut config = KicklabConfig::default();
    config.engine.handshake_timeout_ms = 60;
    let assets = Arc::new(fetcher(&config, &[]));
    let (backend, probe) = HeadlessBackend::new();
    let mut station = Workstation::new(
        config,
        Arc::new(MockBackend::new()),
        Box::new(backend.without_auto_ready()),
        assets,
    );

    assert!(matches!(
        station.start_engine(),
        Err(KicklabError::HandshakeTimeout { timeout_ms: 60 })
    ));
    assert_eq!(station.readiness(), Readiness::Initializing);

    station.surface_mut().kick.set(KickParam::Ott, 0.5);
    let commands = probe.drain();
    assert_eq!(commands.len(), 1);
    assert!(matches!(commands[0], EngineCommand::Init { .. }));

    assert!(matches!(
        station.start_engine(),
        Err(KicklabError::EngineNotReady)
    ));
    assert_eq!(station.readiness(), Readiness::Initializing);
    assert!(probe.drain().is_empty());
}

#[test]
fn test_dispose_closes_and_blocks_restart() {
    let mut rig = rig(MockBackend::new(), &[]);
    rig.station.start_engine().unwrap();
    rig.station.dispose();
    rig.station.dispose();

    assert!(rig.probe.is_closed());
    assert!(!rig.probe.is_connected());
    assert_eq!(rig.station.readiness(), Readiness::Disposed);
    assert!(matches!(
        rig.station.start_engine(),
        Err(KicklabError::InitCancelled)
    ));
}
