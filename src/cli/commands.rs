//! CLI Command Implementations
//!
//! Session-bound commands run a headless [`Workstation`]: presets and kicks
//! come from the backend, the engine is never started.

use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use crate::api::HttpBackend;
use crate::config::KicklabConfig;
use crate::engine::{HeadlessBackend, HttpFetcher};
use crate::error::{KicklabError, Result};
use crate::layers::{KickParam, LayerParam, MasterParam, NoiseParam, ReverbParam};
use crate::mapping::ParamMapping;
use crate::state::{AuthStatus, TOTAL_GEN_CAP};
use crate::transport::{BPM_MAX, BPM_MIN, DEFAULT_BPM};
use crate::workstation::Workstation;

/// Credentials from the command line
#[derive(Debug, Clone, Default)]
pub struct Login {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Load config from `path` if given, else defaults; env overrides apply
pub fn load_config(path: Option<&Path>) -> Result<KicklabConfig> {
    match path {
        Some(path) => KicklabConfig::load(path),
        None => KicklabConfig::from_env(),
    }
}

/// Every continuous parameter as `(key, mapping, default)`
pub fn parameter_table() -> Vec<(&'static str, ParamMapping, f64)> {
    fn rows<P: LayerParam>() -> impl Iterator<Item = (&'static str, ParamMapping, f64)> {
        P::ALL.iter().map(|p| (p.key(), p.mapping(), p.default_native()))
    }

    rows::<KickParam>()
        .chain(rows::<NoiseParam>())
        .chain(rows::<ReverbParam>())
        .chain(rows::<MasterParam>())
        .collect()
}

fn find_mapping(key: &str) -> Result<ParamMapping> {
    parameter_table()
        .into_iter()
        .find(|(k, _, _)| *k == key)
        .map(|(_, mapping, _)| mapping)
        .ok_or_else(|| KicklabError::NotFound {
            what: format!("parameter '{key}'"),
        })
}

/// Evaluate a mapping in either direction.
pub fn map_value(param: &str, value: f64, reverse: bool) -> Result<f64> {
    let mapping = find_mapping(param)?;
    Ok(if reverse {
        mapping.to_normalized(value)
    } else {
        mapping.to_native(value)
    })
}

/// Print a mapped value.
pub fn map(param: &str, value: f64, reverse: bool) -> Result<()> {
    let mapped = map_value(param, value, reverse)?;
    if reverse {
        println!("{param} = {value} -> knob {mapped:.2}");
    } else {
        println!("{param} knob {value} -> {mapped:.4}");
    }
    Ok(())
}

/// Print the parameter table.
pub fn params() -> Result<()> {
    println!("{:<24} {:<12} {:>10} {:>10} {:>10}", "PARAM", "CURVE", "MIN", "MAX", "DEFAULT");
    for (key, mapping, default) in parameter_table() {
        println!(
            "{:<24} {:<12} {:>10} {:>10} {:>10}",
            key,
            mapping.kind.as_str(),
            mapping.min,
            mapping.max,
            default
        );
    }
    println!(
        "{:<24} {:<12} {:>10} {:>10} {:>10}",
        "bpm", "-", BPM_MIN, BPM_MAX, DEFAULT_BPM
    );
    Ok(())
}

/// Build a headless workstation and open a session
///
/// With credentials the session is authenticated, otherwise it is a guest.
pub fn open_workstation(config: KicklabConfig, login: &Login) -> Result<Workstation> {
    let api = Arc::new(HttpBackend::new(&config.backend)?);
    let fetcher = Arc::new(HttpFetcher::new(config.backend.timeout()));
    let (backend, _probe) = HeadlessBackend::new();
    let mut station = Workstation::new(config, api, Box::new(backend), fetcher);

    match (&login.username, &login.password) {
        (Some(username), Some(password)) => {
            info!("Signing in as {}", username);
            station.sign_in(username, password)?;
        }
        (Some(_), None) | (None, Some(_)) => {
            return Err(KicklabError::Config {
                reason: "--username and --password must be given together".to_string(),
            });
        }
        (None, None) => station.set_session(AuthStatus::Guest)?,
    }
    Ok(station)
}

fn require_login(login: &Login) -> Result<()> {
    if login.username.is_none() || login.password.is_none() {
        return Err(KicklabError::NotAuthenticated);
    }
    Ok(())
}

/// List presets in display order.
pub fn presets(config: KicklabConfig, login: &Login) -> Result<()> {
    let station = open_workstation(config, login)?;
    let store = station.presets();
    let current = store.current_key();

    println!("{} presets ({})", store.len(), station.session().status());
    for preset in store.display_list() {
        let marker = if preset.key() == current { "*" } else { " " };
        let scope = if preset.is_shared { "shared" } else { "user" };
        println!(
            "{} {:<32} {:<6} {:>3} bpm  kick {}",
            marker, preset.preset_name, scope, preset.params.bpm, preset.params.kick.kick_sample
        );
    }
    Ok(())
}

/// List generated kicks and quota.
pub fn kicks(config: KicklabConfig, login: &Login) -> Result<()> {
    require_login(login)?;
    let station = open_workstation(config, login)?;
    let catalog = station.catalog();

    println!(
        "{}/{} kicks, {} generations left today",
        catalog.total_count(),
        TOTAL_GEN_CAP,
        catalog.remaining_today()
    );
    for entry in catalog.entries() {
        println!("{:>5}  {:<24} {}", entry.asset.id, entry.asset.name, entry.asset.audio_url);
    }
    Ok(())
}

/// Generate one kick.
pub fn generate(config: KicklabConfig, login: &Login) -> Result<()> {
    require_login(login)?;
    let mut station = open_workstation(config, login)?;
    let entry = station.generate_kick()?;

    println!("Generated '{}' (id {})", entry.asset.name, entry.asset.id);
    println!(
        "{}/{} kicks, {} generations left today",
        station.catalog().total_count(),
        TOTAL_GEN_CAP,
        station.catalog().remaining_today()
    );
    Ok(())
}

/// Delete one kick, reporting presets that block or follow the deletion.
pub fn delete_kick(config: KicklabConfig, login: &Login, id: u64, confirm: bool) -> Result<()> {
    require_login(login)?;
    let mut station = open_workstation(config, login)?;

    match station.delete_kick(id, confirm) {
        Ok(removed) => {
            println!("Deleted kick {id}");
            for name in removed {
                println!("  removed preset '{name}'");
            }
            Ok(())
        }
        Err(KicklabError::AssetConflict { presets }) => {
            warn!("Kick {} is used by {} presets", id, presets.len());
            println!("Kick {id} is used by these presets:");
            for name in &presets {
                println!("  {name}");
            }
            println!("Run again with --confirm to delete them too");
            Err(KicklabError::AssetConflict { presets })
        }
        Err(e) => Err(e),
    }
}
