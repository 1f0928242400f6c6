//! # Command-Line Interface Module
//!
//! This module defines the command-line interface for volctl using Clap derive
//! macros. It provides a type-safe way to parse command-line arguments and
//! route them to the appropriate functionality.
//!
//! ## Commands
//!
//! - `play`, `pause`, `toggle`, `stop`, `next`/`skip`, `prev`: transport
//! - `volume`, `mute`: volume control
//! - `shuffle`, `repeat`: playback mode toggles
//! - `status`: current track and player state
//! - `browse`: walk the music library
//! - `radio`: queue random episodes of a configured radio series
//!
//! ## Examples
//!
//! ```bash
//! volctl toggle
//! volctl volume up
//! volctl radio asot 3
//! volctl -H 192.168.1.20 status
//! ```

use crate::controls::VolumeAction;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Episodes queued by `radio` when no count is given.
pub const DEFAULT_RADIO_COUNT: u64 = 10;

/// Shell types supported for completion generation
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    /// Bash shell
    Bash,
    /// Zsh shell
    Zsh,
    /// Fish shell
    Fish,
    /// PowerShell
    PowerShell,
    /// Elvish shell
    Elvish,
}

/// Main application arguments structure.
///
/// Global options select the player and the configuration file; everything
/// else is a subcommand.
#[derive(Parser, Debug)]
#[command(name = "volctl")]
#[command(about = "Control your Volumio music player from the command line")]
#[command(version)]
pub struct Args {
    /// Volumio host [default: config file, $VOLUMIO_HOST, or volumio.local]
    #[arg(short = 'H', long, global = true)]
    pub host: Option<String>,

    /// Path to the configuration file
    #[arg(short, long, global = true, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Enumeration of all available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start playback
    Play,

    /// Pause playback
    Pause,

    /// Toggle play/pause
    Toggle,

    /// Stop playback
    Stop,

    /// Skip to next track
    #[command(visible_alias = "skip")]
    Next,

    /// Go to previous track
    Prev,

    /// Control volume
    ///
    /// Accepts `up` or `down` (steps of 10%) or an absolute level. Levels
    /// outside 0-100 are clamped.
    Volume {
        /// `up`, `down`, or a level between 0 and 100
        #[arg(allow_hyphen_values = true)]
        level: VolumeAction,
    },

    /// Toggle mute
    Mute,

    /// Toggle shuffle mode
    Shuffle,

    /// Toggle repeat mode
    Repeat,

    /// Show current playback status
    Status,

    /// List library entries
    ///
    /// Without a URI, lists the library root. Pass the URI printed next to a
    /// folder to descend into it.
    Browse {
        /// Library URI to list
        uri: Option<String>,
    },

    /// Play random episodes from a radio series
    ///
    /// Searches for albums matching the series pattern, randomly selects COUNT
    /// of them and queues them for playback. Shuffle is switched off so the
    /// episodes play in the chosen order.
    ///
    /// Series are defined in the config file (see `volctl config path`).
    ///
    /// Example: volctl radio asot 3
    Radio {
        /// Series key from the config file
        #[arg(value_hint = clap::ValueHint::Other)]
        series: String,

        /// Number of episodes to queue
        #[arg(default_value_t = DEFAULT_RADIO_COUNT, value_parser = clap::value_parser!(u64).range(1..))]
        count: u64,
    },

    /// List configured radio series
    Series,

    /// Inspect or create the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    ///
    /// Usage: volctl completion bash > ~/.local/share/bash-completion/completions/volctl
    Completion {
        /// Shell to generate completions for
        shell: Shell,
    },

    /// Generate bash completion that also completes radio series names
    ///
    /// Usage: volctl completion-enhanced bash > ~/.local/share/bash-completion/completions/volctl
    CompletionEnhanced {
        /// Shell to generate enhanced completions for (currently bash only)
        shell: Shell,
    },

    /// List radio series names for completion (hidden command)
    #[command(hide = true)]
    CompleteSeries,
}

/// Configuration file actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the configuration file location
    Path,

    /// Write a default configuration with an example radio series
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
