//! Generated kicks: quota, registration and conflicting deletes

mod common;

use kicklab::api::MockBackend;
use kicklab::engine::EngineCommand;
use kicklab::state::{AuthStatus, Preset, DAILY_GEN_LIMIT, TOTAL_GEN_CAP};
use kicklab::KicklabError;
use pretty_assertions::assert_eq;

use common::{preset, rig, signed_in, Rig};

fn started(api: MockBackend, assets: &[&str]) -> Rig {
    let mut rig = rig(api, assets);
    rig.station.start_engine().unwrap();
    rig.station.set_session(signed_in()).unwrap();
    rig.probe.drain();
    rig
}

fn kick_names(rig: &Rig) -> Vec<String> {
    rig.station.surface().kick.available_samples()
}

#[test]
fn test_generate_registers_and_exposes_kick() {
    let mut rig = started(MockBackend::new(), &["/generated/1.wav"]);

    let entry = rig.station.generate_kick().unwrap();
    assert_eq!(entry.index, Some(5));
    assert!(kick_names(&rig).contains(&entry.asset.name));
    assert_eq!(rig.station.catalog().total_count(), 1);
    assert_eq!(rig.station.catalog().remaining_today(), DAILY_GEN_LIMIT - 1);

    let commands = rig.probe.drain();
    assert_eq!(commands.len(), 1);
    assert!(matches!(commands[0], EngineCommand::LoadKickSample { .. }));
}

#[test]
fn test_indices_are_never_reused() {
    let mut rig = started(
        MockBackend::new(),
        &["/generated/1.wav", "/generated/2.wav", "/generated/3.wav"],
    );

    let first = rig.station.generate_kick().unwrap();
    let second = rig.station.generate_kick().unwrap();
    rig.station.delete_kick(first.asset.id, false).unwrap();
    let third = rig.station.generate_kick().unwrap();

    assert_eq!(
        [first.index, second.index, third.index],
        [Some(5), Some(6), Some(7)]
    );
    assert!(!kick_names(&rig).contains(&first.asset.name));
}

#[test]
fn test_capacity_is_checked_before_request() {
    let mut api = MockBackend::new();
    for i in 0..TOTAL_GEN_CAP {
        api = api.with_kick(&format!("Kick{i}"), &format!("/k/{i}.wav"));
    }
    let mut rig = started(api, &[]);
    let before = rig.api.request_count();

    assert!(matches!(
        rig.station.generate_kick(),
        Err(KicklabError::CapacityReached { .. })
    ));
    assert_eq!(rig.api.request_count(), before);
}

#[test]
fn test_daily_limit_comes_from_backend() {
    let mut rig = started(MockBackend::new().with_generations_today(DAILY_GEN_LIMIT), &[]);
    assert_eq!(rig.station.catalog().remaining_today(), 0);

    let err = rig.station.generate_kick().unwrap_err();
    assert!(matches!(err, KicklabError::DailyLimitReached { .. }));
}

#[test]
fn test_guest_cannot_generate() {
    let mut rig = rig(MockBackend::new(), &[]);
    rig.station.set_session(AuthStatus::Guest).unwrap();
    assert!(matches!(
        rig.station.generate_kick(),
        Err(KicklabError::NotAuthenticated)
    ));
    assert_eq!(rig.api.request_count(), 1);
}

#[test]
fn test_generate_before_engine_is_registered_at_startup() {
    let mut rig = rig(MockBackend::new(), &["/generated/1.wav"]);
    rig.station.set_session(signed_in()).unwrap();

    let entry = rig.station.generate_kick().unwrap();
    assert_eq!(entry.index, None);
    assert!(!kick_names(&rig).contains(&entry.asset.name));

    rig.station.start_engine().unwrap();
    assert!(kick_names(&rig).contains(&entry.asset.name));
    assert_eq!(rig.station.catalog().entries()[0].index, Some(5));
}

#[test]
fn test_referenced_kick_needs_confirmation() {
    let api = MockBackend::new()
        .with_kick("Wummer", "/k/wummer.wav")
        .with_shared_preset(preset("Init", 140, "Punch"))
        .with_user_preset(preset("Intro", 150, "Wummer"))
        .with_user_preset(preset("Outro", 130, "Thud"));
    let mut rig = started(api, &["/k/wummer.wav"]);
    assert!(kick_names(&rig).contains(&"Wummer".to_string()));

    let intro = rig
        .station
        .presets()
        .find_by_name("Intro")
        .and_then(Preset::key)
        .unwrap();
    rig.station.load_preset(intro);

    let err = rig.station.delete_kick(1, false).unwrap_err();
    assert_eq!(err.conflicting_presets(), Some(&["Intro".to_string()][..]));
    assert_eq!(rig.station.catalog().entries().len(), 1);
    assert_eq!(rig.station.presets().current_key(), Some(intro));

    let removed = rig.station.delete_kick(1, true).unwrap();
    assert_eq!(removed, vec!["Intro"]);
    assert!(rig.station.catalog().entries().is_empty());
    assert!(!kick_names(&rig).contains(&"Wummer".to_string()));
    assert_eq!(rig.station.presets().current_key(), None);
    assert!(rig.station.presets().find_by_name("Intro").is_none());
    assert_eq!(rig.api.user_preset_names(), vec!["Outro"]);
}
