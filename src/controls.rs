//! # Controls Module
//!
//! Everyday remote-control commands: transport, volume, modes, status and
//! library browsing. Each function performs the remote call(s) and returns a
//! short line describing the result for the CLI to print.
//!
//! Commands whose effect is worth confirming (next track, new volume, shuffle
//! state) wait a moment and re-read the player state, because Volumio
//! acknowledges commands before its state catches up.

use crate::volumio_client::{CatalogEntry, Client, PlayerState};
use anyhow::{Context, Result};
use log::{debug, info};
use std::fmt;
use std::str::FromStr;
use std::thread;
use std::time::Duration;

/// Wait before re-reading state after a mode or volume change.
pub const STATE_SETTLE: Duration = Duration::from_millis(300);

/// Wait before re-reading state after a track change.
pub const TRACK_SETTLE: Duration = Duration::from_millis(500);

/// Relative volume step for `volume up` / `volume down`.
pub const VOLUME_STEP: i32 = 10;

/// Transport commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    Play,
    Pause,
    Toggle,
    Stop,
    Next,
    Previous,
}

/// Argument of the `volume` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeAction {
    Up,
    Down,
    Set(i32),
}

impl FromStr for VolumeAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "up" => Ok(VolumeAction::Up),
            "down" => Ok(VolumeAction::Down),
            level => level
                .parse()
                .map(VolumeAction::Set)
                .map_err(|_| format!("invalid volume level: {s} (use 'up', 'down', or 0-100)")),
        }
    }
}

/// A playback mode that can be toggled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Shuffle,
    Repeat,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Shuffle => f.write_str("Shuffle"),
            Mode::Repeat => f.write_str("Repeat"),
        }
    }
}

/// Runs a transport command and describes what the player is doing now.
pub fn transport(client: &Client, action: Transport) -> Result<String> {
    info!("Transport command: {action:?}");
    match action {
        Transport::Play => {
            client.play().context("Could not start playback")?;
            Ok("Playing".to_string())
        }
        Transport::Pause => {
            client.pause().context("Could not pause playback")?;
            Ok("Paused".to_string())
        }
        Transport::Stop => {
            client.stop().context("Could not stop playback")?;
            Ok("Stopped".to_string())
        }
        Transport::Toggle => {
            client
                .toggle_play_pause()
                .context("Could not toggle playback")?;
            thread::sleep(STATE_SETTLE);
            Ok(match client.get_state() {
                Ok(state) => {
                    let status = if state.status == "pause" { "Paused" } else { "Playing" };
                    match track_line(&state) {
                        Some(track) => format!("{status}: {track}"),
                        None => status.to_string(),
                    }
                }
                Err(err) => {
                    debug!("State read after toggle failed: {err}");
                    "Toggled playback".to_string()
                }
            })
        }
        Transport::Next | Transport::Previous => {
            let label = if action == Transport::Next {
                client.next().context("Could not skip to next track")?;
                "Next track"
            } else {
                client
                    .previous()
                    .context("Could not go to previous track")?;
                "Previous track"
            };
            thread::sleep(TRACK_SETTLE);
            Ok(match client.get_state().ok().as_ref().and_then(track_line) {
                Some(track) => format!("{label}: {track}"),
                None => label.to_string(),
            })
        }
    }
}

/// Applies a volume change and reports the resulting level.
pub fn volume(client: &Client, action: VolumeAction) -> Result<String> {
    let changed = match action {
        VolumeAction::Up => client.volume_up(VOLUME_STEP),
        VolumeAction::Down => client.volume_down(VOLUME_STEP),
        VolumeAction::Set(level) => client.set_volume(level),
    };
    changed.context("Could not change volume")?;

    thread::sleep(STATE_SETTLE);
    let state = client
        .get_state()
        .context("Volume changed, but the new level could not be read")?;
    Ok(volume_line(&state))
}

/// Mutes when unmuted and vice versa.
pub fn toggle_mute(client: &Client) -> Result<String> {
    client.toggle_mute().context("Could not toggle mute")?;
    thread::sleep(STATE_SETTLE);
    let state = client.get_state().context("Could not read mute state")?;
    Ok(if state.mute { "Muted" } else { "Unmuted" }.to_string())
}

/// Flips a playback mode and reports its new state.
pub fn toggle_mode(client: &Client, mode: Mode) -> Result<String> {
    let toggled = match mode {
        Mode::Shuffle => client.toggle_random(),
        Mode::Repeat => client.toggle_repeat(),
    };
    toggled.with_context(|| format!("Could not toggle {}", mode.to_string().to_lowercase()))?;

    thread::sleep(STATE_SETTLE);
    let state = client
        .get_state()
        .with_context(|| format!("Could not read {} state", mode.to_string().to_lowercase()))?;
    let enabled = match mode {
        Mode::Shuffle => state.random,
        Mode::Repeat => state.repeat,
    };
    Ok(format!(
        "{mode} {}",
        if enabled { "enabled" } else { "disabled" }
    ))
}

/// Reads the player state and renders it as plain text lines.
pub fn status(client: &Client) -> Result<String> {
    let state = client.get_state().context("Failed to get status")?;
    Ok(format_status(&state))
}

/// Lists library entries below `uri`, one per line.
pub fn browse(client: &Client, uri: &str) -> Result<String> {
    let entries = client
        .browse(uri)
        .with_context(|| format!("Failed to browse {:?}", uri))?;
    if entries.is_empty() {
        return Ok("No items found".to_string());
    }
    Ok(entries
        .iter()
        .map(format_entry)
        .collect::<Vec<_>>()
        .join("\n"))
}

/// `Artist - Title`, or just the title, or nothing when idle.
fn track_line(state: &PlayerState) -> Option<String> {
    match (state.artist.as_str(), state.title.as_str()) {
        (_, "") => None,
        ("", title) => Some(title.to_string()),
        (artist, title) => Some(format!("{artist} - {title}")),
    }
}

fn volume_line(state: &PlayerState) -> String {
    let muted = if state.mute { " (Muted)" } else { "" };
    format!("Volume: {}%{muted}", state.volume)
}

/// Formats seconds as `M:SS`.
pub fn format_time(seconds: i64) -> String {
    let seconds = seconds.max(0);
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

pub fn format_status(state: &PlayerState) -> String {
    let mut lines = vec![format!("Status: {}", state.status)];

    let fields = [
        ("Title", &state.title),
        ("Artist", &state.artist),
        ("Album", &state.album),
        ("Service", &state.service),
    ];
    lines.extend(
        fields
            .iter()
            .filter(|(_, value)| !value.is_empty())
            .map(|(label, value)| format!("{label}: {value}")),
    );

    lines.push(volume_line(state));

    if state.duration > 0 {
        lines.push(format!(
            "Position: {} / {}",
            format_time(state.position),
            format_time(state.duration)
        ));
    }

    let modes: Vec<String> = [(state.random, Mode::Shuffle), (state.repeat, Mode::Repeat)]
        .into_iter()
        .filter(|(enabled, _)| *enabled)
        .map(|(_, mode)| mode.to_string())
        .collect();
    if !modes.is_empty() {
        lines.push(format!("Modes: {}", modes.join(", ")));
    }

    lines.join("\n")
}

/// One browse line: kind, name, URI (and service when playable).
pub fn format_entry(entry: &CatalogEntry) -> String {
    let kind = if entry.item_type.is_empty() {
        "item"
    } else {
        entry.item_type.as_str()
    };
    let mut line = format!("[{kind}] {}  {}", entry.display_name(), entry.uri);
    if entry.is_playable() && !entry.service.is_empty() {
        line.push_str(&format!(" ({})", entry.service));
    }
    line
}
