//! # Player Module
//!
//! The narrow view of the player that radio queuing needs. The sequencer in
//! [`crate::radio`] only talks to a [`PlayerClient`], so it can be driven by the
//! real Volumio client or by an in-memory double in tests.

use crate::volumio_client::{AlbumScope, CatalogEntry, Client, ClientError};

/// The part of the player state that decides whether shuffle must be turned off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackMode {
    pub shuffle_enabled: bool,
}

/// Remote operations used by the radio sequencer.
///
/// Every method is one blocking round trip. Implementations are not expected
/// to be shared between concurrent runs.
pub trait PlayerClient {
    /// Searches the catalog; results are already scoped to local albums.
    fn search(&self, query: &str) -> Result<Vec<CatalogEntry>, ClientError>;

    fn playback_mode(&self) -> Result<PlaybackMode, ClientError>;

    /// Flips shuffle on or off.
    fn toggle_shuffle(&self) -> Result<(), ClientError>;

    /// Clears the queue, inserts one entry and starts playing it.
    fn replace_and_play(&self, uri: &str, service: &str) -> Result<(), ClientError>;

    /// Appends one entry to the queue.
    fn enqueue(&self, uri: &str, service: &str) -> Result<(), ClientError>;
}

/// [`PlayerClient`] backed by a Volumio instance.
pub struct VolumioPlayer<'a> {
    client: &'a Client,
    scope: AlbumScope,
}

impl<'a> VolumioPlayer<'a> {
    pub fn new(client: &'a Client, scope: AlbumScope) -> Self {
        Self { client, scope }
    }
}

impl PlayerClient for VolumioPlayer<'_> {
    fn search(&self, query: &str) -> Result<Vec<CatalogEntry>, ClientError> {
        self.client.search_albums(query, &self.scope)
    }

    fn playback_mode(&self) -> Result<PlaybackMode, ClientError> {
        let state = self.client.get_state()?;
        Ok(PlaybackMode {
            shuffle_enabled: state.random,
        })
    }

    fn toggle_shuffle(&self) -> Result<(), ClientError> {
        self.client.toggle_random()
    }

    fn replace_and_play(&self, uri: &str, service: &str) -> Result<(), ClientError> {
        self.client.replace_and_play(uri, service)
    }

    fn enqueue(&self, uri: &str, service: &str) -> Result<(), ClientError> {
        self.client.add_to_queue(uri, service)
    }
}
