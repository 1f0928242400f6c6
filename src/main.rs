//! # volctl - Volumio Remote
//!
//! Command-line remote for a Volumio music player on the local network.
//!
//! ## Architecture
//!
//! - `cli`: Command-line interface definitions
//! - `config`: YAML configuration file (host, radio series)
//! - `controls`: Transport, volume, mode, status and browse commands
//! - `radio`: Random episode selection and queuing
//! - `volumio_client`: Volumio REST API client
//!
//! ## Usage
//!
//! ```bash
//! # Toggle playback
//! volctl toggle
//!
//! # Show what's playing on another player
//! volctl -H 192.168.1.20 status
//!
//! # Queue five random episodes of a configured series
//! volctl radio asot 5
//! ```

use anyhow::{bail, Context, Result};
use clap::{CommandFactory, Parser};
use log::{debug, info, warn};
use std::io;
use std::path::{Path, PathBuf};
use volctl::cli::{self, Command, ConfigAction};
use volctl::completion;
use volctl::config::{self, Config, HOST_ENV_VAR};
use volctl::controls::{self, Mode, Transport};
use volctl::player::VolumioPlayer;
use volctl::radio::{self, RadioError, SelectionRequest};
use volctl::volumio_client::Client;

/// Loads the config file; a missing location or broken file yields defaults.
fn load_config(path: Option<&Path>) -> Config {
    let Some(path) = path else {
        return Config::default();
    };
    config::load_from(path).unwrap_or_else(|err| {
        warn!("{err:#}");
        eprintln!("Warning: {err:#}; using default configuration");
        Config::default()
    })
}

/// Builds a client from a bare host or a full `http(s)://` base URL.
fn client_for(host: &str) -> Client {
    if host.starts_with("http://") || host.starts_with("https://") {
        Client::new(host)
    } else {
        Client::with_host(host)
    }
}

fn display_path(path: Option<&Path>) -> String {
    path.map(|path| path.display().to_string())
        .unwrap_or_else(|| "<unknown>".to_string())
}

/// Creates the example config file.
fn init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "Config file already exists at {} (use --force to overwrite)",
            path.display()
        );
    }
    config::save_to(&Config::example(), path)?;
    println!("Wrote example configuration to {}", path.display());
    Ok(())
}

fn list_series(config: &Config, path: Option<&Path>) {
    if config.radio.is_empty() {
        println!(
            "No radio series configured. Add one to {} (or run `volctl config init`)",
            display_path(path)
        );
        return;
    }
    for (key, series) in &config.radio {
        let name = if series.name.is_empty() { key } else { &series.name };
        println!("{key}\t{name}\t{}", series.pattern);
    }
}

/// Queues random episodes of a configured series and describes the result.
fn play_radio(
    client: &Client,
    config: &Config,
    config_path: Option<&Path>,
    series: &str,
    count: u64,
) -> Result<String> {
    let entry = config.series(series).with_context(|| {
        format!(
            "unknown radio series: {series} (check your config file at {})",
            display_path(config_path)
        )
    })?;
    let label = if entry.name.is_empty() { series } else { entry.name.as_str() };
    let count = usize::try_from(count).context("count is too large")?;

    info!("Playing {count} random {label} episodes from {}", client.base_url());
    let player = VolumioPlayer::new(client, config.library.clone());
    let request = SelectionRequest::new(&entry.search_query, &entry.pattern, count);
    let outcome = match radio::play_random_episodes(&player, &request) {
        Ok(outcome) => outcome,
        Err(err) => {
            if let RadioError::Queue { queued, .. } = &err {
                eprintln!("{queued} {label} episode(s) stay queued on the player");
            }
            return Err(err).with_context(|| format!("Could not play {label}"));
        }
    };

    Ok(format!(
        "Queued {} of {} requested {label} episodes ({} matched)",
        outcome.queued, outcome.requested, outcome.matched
    ))
}

/// Main entry point for volctl.
///
/// Initializes logging, parses command-line arguments, and routes commands
/// to the appropriate module functions.
///
/// # Logging
///
/// Initializes environment logger which can be controlled via `RUST_LOG`:
/// - `RUST_LOG=debug volctl radio asot` - Show requests and sequencer steps
/// - `RUST_LOG=volctl::volumio_client=debug volctl status` - Module-specific logging
fn main() -> Result<()> {
    env_logger::init();

    let args = cli::Args::parse();

    let config_path: Option<PathBuf> = match args.config {
        Some(path) => Some(path),
        None => match config::get_config_path() {
            Ok(path) => Some(path),
            Err(err) => {
                warn!("{err:#}");
                None
            }
        },
    };

    let host_flag = args.host;
    let load = || load_config(config_path.as_deref());
    let connect = |config: &Config| {
        let env_host = std::env::var(HOST_ENV_VAR).ok();
        let host = config.resolve_host(host_flag.as_deref(), env_host.as_deref());
        debug!("Using Volumio host {host}");
        client_for(&host)
    };
    let player = || connect(&load());

    match args.command {
        Command::Play => println!("{}", controls::transport(&player(), Transport::Play)?),
        Command::Pause => println!("{}", controls::transport(&player(), Transport::Pause)?),
        Command::Toggle => println!("{}", controls::transport(&player(), Transport::Toggle)?),
        Command::Stop => println!("{}", controls::transport(&player(), Transport::Stop)?),
        Command::Next => println!("{}", controls::transport(&player(), Transport::Next)?),
        Command::Prev => println!("{}", controls::transport(&player(), Transport::Previous)?),
        Command::Volume { level } => println!("{}", controls::volume(&player(), level)?),
        Command::Mute => println!("{}", controls::toggle_mute(&player())?),
        Command::Shuffle => println!("{}", controls::toggle_mode(&player(), Mode::Shuffle)?),
        Command::Repeat => println!("{}", controls::toggle_mode(&player(), Mode::Repeat)?),
        Command::Status => println!("{}", controls::status(&player())?),
        Command::Browse { uri } => {
            println!("{}", controls::browse(&player(), uri.as_deref().unwrap_or(""))?);
        }
        Command::Radio { series, count } => {
            let config = load();
            let client = connect(&config);
            println!(
                "{}",
                play_radio(&client, &config, config_path.as_deref(), &series, count)?
            );
        }
        Command::Series => list_series(&load(), config_path.as_deref()),
        Command::Config { action } => {
            let path = config_path
                .as_deref()
                .context("Could not determine the config file location; pass --config")?;
            match action {
                ConfigAction::Path => println!("{}", path.display()),
                ConfigAction::Init { force } => init_config(path, force)?,
            }
        }
        Command::Completion { shell } => {
            let mut cmd = cli::Args::command();
            completion::generate_completions(completion::shell_to_completion_shell(&shell), &mut cmd);
        }
        Command::CompletionEnhanced { shell } => match shell {
            cli::Shell::Bash => completion::generate_enhanced_bash_completion(),
            _ => bail!("Enhanced completions only supported for bash"),
        },
        Command::CompleteSeries => {
            completion::print_series_completions(&load(), &mut io::stdout().lock())?;
        }
    }

    Ok(())
}
