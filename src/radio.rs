//! # Radio Module
//!
//! Plays random episodes of a "radio series": albums whose names follow a
//! numbering scheme, such as `A State of Trance 900`, `A State of Trance 901`, ...
//!
//! ## Flow
//!
//! ```text
//! Searching → Filtering → Sampling → EnforcingMode → Queuing → Done
//!     └───────────┴───────────┴────────────┴────────────┴──────→ Failed
//! ```
//!
//! 1. **Searching**: catalog search with the series' search query
//! 2. **Filtering**: keep albums whose display name matches the series pattern;
//!    no match stops the run before anything on the player changes
//! 3. **Sampling**: pick `min(count, matches)` albums at random
//! 4. **EnforcingMode**: turn shuffle off and wait until the player reports it
//! 5. **Queuing**: replace-and-play the first album, append the rest
//!
//! ## Failure Semantics
//!
//! Every error is terminal and nothing is retried. A queuing failure stops the
//! remaining appends immediately; albums already queued stay queued and the
//! error reports how many made it.
//!
//! ## Timing
//!
//! The player acknowledges commands before its state reflects them and offers
//! no notification channel, so the sequencer waits fixed intervals between
//! dependent calls (see [`SequencerTiming`]).

use crate::pattern::EpisodePattern;
use crate::player::PlayerClient;
use crate::sampler::Sampler;
use crate::volumio_client::{CatalogEntry, ClientError};
use log::{debug, info};
use std::fmt;
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;

/// What to look for and how many episodes to queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionRequest {
    pub search_query: String,
    pub pattern: String,
    pub count: usize,
}

impl SelectionRequest {
    pub fn new(search_query: impl Into<String>, pattern: impl Into<String>, count: usize) -> Self {
        Self {
            search_query: search_query.into(),
            pattern: pattern.into(),
            count,
        }
    }
}

/// Result of a successful run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RadioOutcome {
    /// Episodes asked for
    pub requested: usize,
    /// Albums that matched the pattern
    pub matched: usize,
    /// Episodes now on the queue, `min(requested, matched)`
    pub queued: usize,
}

/// Terminal failure of a radio run.
#[derive(Debug, Error)]
pub enum RadioError {
    #[error("count must be at least 1 (got {0})")]
    InvalidCount(usize),

    #[error("invalid regex pattern {pattern:?}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("search for albums failed")]
    Search(#[source] ClientError),

    #[error("no albums found matching pattern: {pattern}")]
    NoMatch { pattern: String },

    #[error("failed to disable shuffle: {detail}")]
    ModeEnforcement {
        detail: String,
        #[source]
        source: Option<ClientError>,
    },

    #[error("failed to queue album {name:?} at position {position} ({queued} already queued)")]
    Queue {
        name: String,
        position: usize,
        queued: usize,
        #[source]
        source: ClientError,
    },
}

/// Where the sequencer currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencerState {
    Idle,
    Searching,
    Filtering,
    Sampling,
    EnforcingMode,
    Queuing,
    Done,
    Failed,
}

impl fmt::Display for SequencerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SequencerState::Idle => "idle",
            SequencerState::Searching => "searching",
            SequencerState::Filtering => "filtering",
            SequencerState::Sampling => "sampling",
            SequencerState::EnforcingMode => "enforcing mode",
            SequencerState::Queuing => "queuing",
            SequencerState::Done => "done",
            SequencerState::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// Fixed waits between dependent remote calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequencerTiming {
    /// Wait after toggling shuffle, and between re-reads of the mode.
    pub mode_settle: Duration,
    /// Give up on seeing shuffle off after this long.
    pub mode_timeout: Duration,
    /// Wait after replace-and-play; playback start makes this the slow one.
    pub first_item_settle: Duration,
    /// Wait after each append.
    pub inter_item_delay: Duration,
}

impl Default for SequencerTiming {
    fn default() -> Self {
        Self {
            mode_settle: Duration::from_millis(300),
            mode_timeout: Duration::from_secs(2),
            first_item_settle: Duration::from_millis(500),
            inter_item_delay: Duration::from_millis(100),
        }
    }
}

impl SequencerTiming {
    /// No waiting at all.
    pub fn immediate() -> Self {
        Self {
            mode_settle: Duration::ZERO,
            mode_timeout: Duration::ZERO,
            first_item_settle: Duration::ZERO,
            inter_item_delay: Duration::ZERO,
        }
    }
}

/// Drives one radio run against a [`PlayerClient`].
///
/// One sequencer per run; it is not meant to be shared across threads.
pub struct EpisodeSequencer<'a, P: PlayerClient> {
    player: &'a P,
    sampler: Sampler,
    timing: SequencerTiming,
    state: SequencerState,
}

impl<'a, P: PlayerClient> EpisodeSequencer<'a, P> {
    /// Sequencer with default timing and a time-seeded sampler.
    pub fn new(player: &'a P) -> Self {
        Self::with_parts(player, Sampler::from_time(), SequencerTiming::default())
    }

    pub fn with_parts(player: &'a P, sampler: Sampler, timing: SequencerTiming) -> Self {
        Self {
            player,
            sampler,
            timing,
            state: SequencerState::Idle,
        }
    }

    pub fn state(&self) -> SequencerState {
        self.state
    }

    fn enter(&mut self, state: SequencerState) {
        debug!("Radio sequencer: {} -> {}", self.state, state);
        self.state = state;
    }

    /// Searches, filters, samples and queues episodes for `request`.
    ///
    /// # Errors
    ///
    /// - [`RadioError::InvalidCount`] when `count` is 0, before any remote call
    /// - [`RadioError::InvalidPattern`] when the pattern does not compile
    /// - [`RadioError::Search`] when the catalog search fails
    /// - [`RadioError::NoMatch`] when nothing matches; the player is untouched
    /// - [`RadioError::ModeEnforcement`] when shuffle cannot be turned off
    /// - [`RadioError::Queue`] when a queue call fails; earlier entries stay queued
    pub fn run(&mut self, request: &SelectionRequest) -> Result<RadioOutcome, RadioError> {
        match self.drive(request) {
            Ok(outcome) => {
                self.enter(SequencerState::Done);
                info!(
                    "Queued {} of {} requested episodes ({} matched)",
                    outcome.queued, outcome.requested, outcome.matched
                );
                Ok(outcome)
            }
            Err(err) => {
                self.enter(SequencerState::Failed);
                Err(err)
            }
        }
    }

    fn drive(&mut self, request: &SelectionRequest) -> Result<RadioOutcome, RadioError> {
        if request.count < 1 {
            return Err(RadioError::InvalidCount(request.count));
        }

        // Compiled up front so a typo never costs a search round trip.
        let pattern =
            EpisodePattern::compile(&request.pattern).map_err(|source| RadioError::InvalidPattern {
                pattern: request.pattern.clone(),
                source,
            })?;

        self.enter(SequencerState::Searching);
        let albums = self
            .player
            .search(&request.search_query)
            .map_err(RadioError::Search)?;
        debug!("Search {:?} returned {} albums", request.search_query, albums.len());

        self.enter(SequencerState::Filtering);
        let matching = pattern.filter(&albums);
        if matching.is_empty() {
            return Err(RadioError::NoMatch {
                pattern: request.pattern.clone(),
            });
        }
        debug!("{} albums match {:?}", matching.len(), request.pattern);

        self.enter(SequencerState::Sampling);
        let selected = self.sampler.select(&matching, request.count);

        self.enter(SequencerState::EnforcingMode);
        self.ensure_shuffle_off()?;

        self.enter(SequencerState::Queuing);
        let queued = self.queue_albums(&selected)?;

        Ok(RadioOutcome {
            requested: request.count,
            matched: matching.len(),
            queued,
        })
    }

    fn ensure_shuffle_off(&self) -> Result<(), RadioError> {
        let read_failed = |source: ClientError| RadioError::ModeEnforcement {
            detail: "could not read playback mode".to_string(),
            source: Some(source),
        };

        if !self.player.playback_mode().map_err(read_failed)?.shuffle_enabled {
            debug!("Shuffle already off");
            return Ok(());
        }

        info!("Disabling shuffle");
        self.player
            .toggle_shuffle()
            .map_err(|source| RadioError::ModeEnforcement {
                detail: "toggle command failed".to_string(),
                source: Some(source),
            })?;

        let started = Instant::now();
        loop {
            thread::sleep(self.timing.mode_settle);
            if !self.player.playback_mode().map_err(read_failed)?.shuffle_enabled {
                return Ok(());
            }
            let waited = started.elapsed();
            if waited >= self.timing.mode_timeout {
                return Err(RadioError::ModeEnforcement {
                    detail: format!("shuffle still enabled after {waited:?}"),
                    source: None,
                });
            }
        }
    }

    /// Queues `albums` in order and returns how many were queued.
    fn queue_albums(&self, albums: &[CatalogEntry]) -> Result<usize, RadioError> {
        let queue_failed = |position: usize, album: &CatalogEntry, source: ClientError| {
            RadioError::Queue {
                name: album.display_name().to_string(),
                position,
                queued: position,
                source,
            }
        };

        let Some((first, rest)) = albums.split_first() else {
            return Ok(0);
        };

        info!("Playing {}", first.display_name());
        self.player
            .replace_and_play(&first.uri, &first.service)
            .map_err(|source| queue_failed(0, first, source))?;
        thread::sleep(self.timing.first_item_settle);

        for (offset, album) in rest.iter().enumerate() {
            let position = offset + 1;
            debug!("Queuing {} at position {position}", album.display_name());
            self.player
                .enqueue(&album.uri, &album.service)
                .map_err(|source| queue_failed(position, album, source))?;
            thread::sleep(self.timing.inter_item_delay);
        }

        Ok(albums.len())
    }
}

/// Convenience wrapper: one run with default timing.
pub fn play_random_episodes<P: PlayerClient>(
    player: &P,
    request: &SelectionRequest,
) -> Result<RadioOutcome, RadioError> {
    EpisodeSequencer::new(player).run(request)
}
