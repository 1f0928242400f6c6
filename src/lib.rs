//! Command-line remote for the Volumio music player.
//!
//! Core modules:
//! - [`volumio_client`] - Volumio REST API client
//! - [`player`] - Player abstraction used by the radio sequencer
//! - [`radio`] - Random episode selection and queuing
//! - [`pattern`] - Episode name matching
//! - [`sampler`] - Unbiased random selection
//!
//! ### Supporting Modules
//!
//! - [`controls`] - Transport, volume, mode, status and browse commands
//! - [`config`] - YAML configuration file (host, radio series, album scope)
//! - [`cli`] - Command-line interface definitions with clap integration
//! - [`completion`] - Shell completion generation
//!
//! ## Quick Start Example
//!
//! ```no_run
//! use volctl::player::VolumioPlayer;
//! use volctl::radio::{play_random_episodes, SelectionRequest};
//! use volctl::volumio_client::{AlbumScope, Client};
//!
//! let client = Client::with_host("volumio.local");
//! let player = VolumioPlayer::new(&client, AlbumScope::default());
//!
//! // Queue three random episodes, first one starts playing
//! let request = SelectionRequest::new("A State of Trance", r"^A State [Oo]f Trance \d+", 3);
//! let outcome = play_random_episodes(&player, &request)?;
//! println!("Queued {} of {} matching episodes", outcome.queued, outcome.matched);
//!
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Radio Episodes
//!
//! A radio series is a set of albums with numbered names. A run searches the
//! library, keeps albums whose name matches the series pattern, picks some at
//! random, switches shuffle off, then plays the first pick and queues the rest
//! behind it. Nothing on the player changes until a match is found.
//!
//! ## Error Handling
//!
//! Library modules return typed errors built with `thiserror`
//! ([`volumio_client::ClientError`], [`radio::RadioError`]). The command layer
//! ([`controls`], [`config`]) and the binary use `anyhow` with context
//! messages.
//!
//! ## Logging
//!
//! Uses the `log` facade; the binary installs `env_logger`, so
//! `RUST_LOG=debug volctl radio asot` shows every request and sequencer step.

pub mod cli;
pub mod completion;
pub mod config;
pub mod controls;
pub mod pattern;
pub mod player;
pub mod radio;
pub mod sampler;
pub mod volumio_client;
