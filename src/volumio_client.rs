//! # Volumio Client Module
//!
//! This module wraps the Volumio REST API (`/api/v1/...`) in a small blocking
//! client. Every remote call is a single HTTP round trip bounded by the agent's
//! timeout; nothing is retried here.
//!
//! ## Capabilities
//!
//! - **State**: `get_state` reads the full player state
//! - **Playback**: play, pause, toggle, stop, next, previous
//! - **Volume**: absolute level, relative steps, mute handling
//! - **Modes**: shuffle (`random`) and repeat toggles
//! - **Library**: browse by URI, free-text search, album-scoped search
//! - **Queue**: replace-and-play, append, clear
//!
//! ## Response Shapes
//!
//! The browse endpoint is not consistent about where it puts its entries, so
//! [`Client::browse`] walks several known layouts and takes the first one that
//! yields entries.

use log::debug;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Host used when neither flag, config, nor environment provides one.
pub const DEFAULT_HOST: &str = "volumio.local";

/// Port the Volumio web API listens on.
pub const DEFAULT_PORT: u16 = 3000;

/// Upper bound for a single remote call.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

const COMMANDS_ENDPOINT: &str = "/api/v1/commands/";

/// Failure of a single remote call.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Connection refused, DNS failure, timeout and friends.
    #[error("request to {endpoint} failed: {message}")]
    Transport { endpoint: String, message: String },

    /// The player answered with something other than 200.
    #[error("unexpected status code {code} from {endpoint}")]
    Status { endpoint: String, code: u16 },

    /// The body could not be read or decoded.
    #[error("failed to parse response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },
}

impl ClientError {
    fn from_ureq(endpoint: &str, err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(code, _) => ClientError::Status {
                endpoint: endpoint.to_string(),
                code,
            },
            ureq::Error::Transport(transport) => ClientError::Transport {
                endpoint: endpoint.to_string(),
                message: transport.to_string(),
            },
        }
    }

    fn decode(endpoint: &str, err: impl std::fmt::Display) -> Self {
        ClientError::Decode {
            endpoint: endpoint.to_string(),
            message: err.to_string(),
        }
    }
}

/// Treats JSON `null` like a missing field.
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Snapshot of the player as reported by `getState`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    /// "play", "pause" or "stop"
    #[serde(default, deserialize_with = "nullable")]
    pub status: String,
    /// Elapsed seconds in the current track
    #[serde(default, deserialize_with = "nullable")]
    pub position: i64,
    #[serde(default, deserialize_with = "nullable")]
    pub title: String,
    #[serde(default, deserialize_with = "nullable")]
    pub artist: String,
    #[serde(default, deserialize_with = "nullable")]
    pub album: String,
    #[serde(default, deserialize_with = "nullable")]
    pub albumart: String,
    /// Track length in seconds, 0 for streams
    #[serde(default, deserialize_with = "nullable")]
    pub duration: i64,
    #[serde(default, deserialize_with = "nullable")]
    pub volume: i32,
    #[serde(default, deserialize_with = "nullable")]
    pub mute: bool,
    #[serde(default, deserialize_with = "nullable")]
    pub service: String,
    /// Shuffle mode
    #[serde(default, deserialize_with = "nullable")]
    pub random: bool,
    #[serde(default, deserialize_with = "nullable")]
    pub repeat: bool,
}

/// One browsable or playable unit of the music library.
///
/// Returned by browse and search. `item_type` decides what a caller may do
/// with the entry; note that `"folder"` is both playable and browsable, the
/// call site picks which interpretation applies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    #[serde(default, deserialize_with = "nullable")]
    pub uri: String,
    #[serde(default, deserialize_with = "nullable")]
    pub title: String,
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub service: String,
    #[serde(rename = "type", default, deserialize_with = "nullable")]
    pub item_type: String,
    #[serde(default, deserialize_with = "nullable")]
    pub artist: String,
    #[serde(default, deserialize_with = "nullable")]
    pub album: String,
    #[serde(default, deserialize_with = "nullable")]
    pub albumart: String,
    #[serde(default, deserialize_with = "nullable")]
    pub plugin_type: String,
    #[serde(default, deserialize_with = "nullable")]
    pub plugin_name: String,
}

impl CatalogEntry {
    /// Best human-readable label: title, else name, else the URI.
    pub fn display_name(&self) -> &str {
        [&self.title, &self.name]
            .into_iter()
            .find(|candidate| !candidate.is_empty())
            .unwrap_or(&self.uri)
    }

    pub fn is_playable(&self) -> bool {
        matches!(
            self.item_type.as_str(),
            "song" | "track" | "webradio" | "folder"
        )
    }

    pub fn is_browsable(&self) -> bool {
        matches!(
            self.item_type.as_str(),
            "folder" | "playlist-category" | "category" | ""
        )
    }
}

/// A titled group of results ("Artists", "Albums", "TIDAL Albums", ...).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchList {
    #[serde(default, deserialize_with = "nullable")]
    pub title: String,
    #[serde(default, deserialize_with = "nullable")]
    pub items: Vec<CatalogEntry>,
}

#[derive(Debug, Default, Deserialize)]
struct SearchNavigation {
    #[serde(default, deserialize_with = "nullable")]
    lists: Vec<SearchList>,
}

#[derive(Debug, Default, Deserialize)]
struct SearchResponse {
    #[serde(default, deserialize_with = "nullable")]
    navigation: SearchNavigation,
}

/// Which part of a search response counts as "albums from the local library".
///
/// Search results mix local results with streaming-service results. The first
/// list whose title mentions `list_title` but not `excluded_title` is used,
/// and only its entries of `item_type` served by `service` are kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlbumScope {
    pub list_title: String,
    pub excluded_title: String,
    pub item_type: String,
    pub service: String,
}

impl Default for AlbumScope {
    fn default() -> Self {
        Self {
            list_title: "Albums".to_string(),
            excluded_title: "TIDAL".to_string(),
            item_type: "folder".to_string(),
            service: "mpd".to_string(),
        }
    }
}

impl AlbumScope {
    fn accepts_list(&self, title: &str) -> bool {
        contains_ignore_case(title, &self.list_title)
            && (self.excluded_title.is_empty() || !contains_ignore_case(title, &self.excluded_title))
    }

    fn accepts_entry(&self, entry: &CatalogEntry) -> bool {
        entry.item_type == self.item_type && entry.service == self.service
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack
        .to_ascii_lowercase()
        .contains(&needle.to_ascii_lowercase())
}

/// Blocking Volumio REST client.
#[derive(Clone)]
pub struct Client {
    base_url: String,
    agent: ureq::Agent,
}

fn build_agent(timeout: Duration) -> ureq::Agent {
    ureq::AgentBuilder::new().timeout(timeout).build()
}

impl Client {
    /// Creates a client for a full base URL such as `http://10.0.0.5:3000`.
    ///
    /// An empty base URL falls back to the default host and port.
    pub fn new(base_url: &str) -> Self {
        let base_url = if base_url.is_empty() {
            format!("http://{DEFAULT_HOST}:{DEFAULT_PORT}")
        } else {
            base_url.trim_end_matches('/').to_string()
        };
        Self {
            base_url,
            agent: build_agent(REQUEST_TIMEOUT),
        }
    }

    /// Creates a client for a bare hostname or IP on the default port.
    pub fn with_host(host: &str) -> Self {
        Self::new(&format!("http://{host}:{DEFAULT_PORT}"))
    }

    /// Replaces the per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.agent = build_agent(timeout);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn get(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<ureq::Response, ClientError> {
        let url = format!("{}{}", self.base_url, endpoint);
        debug!("GET {url} {params:?}");

        let request = params
            .iter()
            .fold(self.agent.get(&url), |request, (key, value)| request.query(key, value));
        let response = request
            .call()
            .map_err(|err| ClientError::from_ureq(endpoint, err))?;
        expect_ok(endpoint, response)
    }

    fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> Result<T, ClientError> {
        self.get(endpoint, params)?
            .into_json::<T>()
            .map_err(|err| ClientError::decode(endpoint, err))
    }

    fn post_entry(&self, endpoint: &str, uri: &str, service: &str) -> Result<(), ClientError> {
        let url = format!("{}{}", self.base_url, endpoint);
        let mut payload = serde_json::Map::new();
        payload.insert("uri".to_string(), Value::from(uri));
        if !service.is_empty() {
            payload.insert("service".to_string(), Value::from(service));
        }
        debug!("POST {url} {payload:?}");

        let response = self
            .agent
            .post(&url)
            .send_json(Value::Object(payload))
            .map_err(|err| ClientError::from_ureq(endpoint, err))?;
        expect_ok(endpoint, response).map(|_| ())
    }

    fn command(&self, cmd: &str) -> Result<(), ClientError> {
        self.command_with(cmd, &[])
    }

    fn command_with(&self, cmd: &str, extra: &[(&str, &str)]) -> Result<(), ClientError> {
        let mut params = vec![("cmd", cmd)];
        params.extend_from_slice(extra);
        self.get(COMMANDS_ENDPOINT, &params).map(|_| ())
    }

    /// Reads the current player state.
    ///
    /// # Errors
    ///
    /// Returns an error if the player is unreachable, answers with a non-200
    /// status, or returns a body that is not a state object.
    pub fn get_state(&self) -> Result<PlayerState, ClientError> {
        self.get_json("/api/v1/getState", &[])
    }

    pub fn play(&self) -> Result<(), ClientError> {
        self.command("play")
    }

    pub fn pause(&self) -> Result<(), ClientError> {
        self.command("pause")
    }

    /// Toggles between play and pause.
    pub fn toggle_play_pause(&self) -> Result<(), ClientError> {
        self.command("toggle")
    }

    pub fn stop(&self) -> Result<(), ClientError> {
        self.command("stop")
    }

    pub fn next(&self) -> Result<(), ClientError> {
        self.command("next")
    }

    pub fn previous(&self) -> Result<(), ClientError> {
        self.command("prev")
    }

    /// Sets the volume, clamped to 0-100.
    pub fn set_volume(&self, volume: i32) -> Result<(), ClientError> {
        let level = volume.clamp(0, 100).to_string();
        self.command_with("volume", &[("volume", &level)])
    }

    /// Raises the volume by `step` relative to the current level.
    pub fn volume_up(&self, step: i32) -> Result<(), ClientError> {
        let state = self.get_state()?;
        self.set_volume(state.volume.saturating_add(step))
    }

    /// Lowers the volume by `step` relative to the current level.
    pub fn volume_down(&self, step: i32) -> Result<(), ClientError> {
        let state = self.get_state()?;
        self.set_volume(state.volume.saturating_sub(step))
    }

    pub fn mute(&self) -> Result<(), ClientError> {
        self.command("mute")
    }

    pub fn unmute(&self) -> Result<(), ClientError> {
        self.command("unmute")
    }

    /// Mutes when unmuted and vice versa, based on a fresh state read.
    pub fn toggle_mute(&self) -> Result<(), ClientError> {
        if self.get_state()?.mute {
            self.unmute()
        } else {
            self.mute()
        }
    }

    /// Toggles shuffle. The API has no "set", only "flip".
    pub fn toggle_random(&self) -> Result<(), ClientError> {
        self.command("random")
    }

    pub fn toggle_repeat(&self) -> Result<(), ClientError> {
        self.command("repeat")
    }

    pub fn clear_queue(&self) -> Result<(), ClientError> {
        self.command("clearQueue")
    }

    /// Lists the library entries below `uri` (the root when empty).
    ///
    /// # Errors
    ///
    /// Transport, status and JSON errors are returned as-is. A well-formed
    /// response without recognisable entries yields an empty vector.
    pub fn browse(&self, uri: &str) -> Result<Vec<CatalogEntry>, ClientError> {
        let params: Vec<(&str, &str)> = if uri.is_empty() {
            Vec::new()
        } else {
            vec![("uri", uri)]
        };
        let body: Value = self.get_json("/api/v1/browse", &params)?;
        Ok(extract_browse_entries(&body))
    }

    /// Runs a library search and returns every result list.
    pub fn search(&self, query: &str) -> Result<Vec<SearchList>, ClientError> {
        let response: SearchResponse = self.get_json("/api/v1/search", &[("query", query)])?;
        Ok(response.navigation.lists)
    }

    /// Searches and keeps only the album entries selected by `scope`.
    pub fn search_albums(
        &self,
        query: &str,
        scope: &AlbumScope,
    ) -> Result<Vec<CatalogEntry>, ClientError> {
        Ok(select_albums(self.search(query)?, scope))
    }

    /// Clears the queue, inserts `uri` and starts playing it.
    pub fn replace_and_play(&self, uri: &str, service: &str) -> Result<(), ClientError> {
        self.post_entry("/api/v1/replaceAndPlay", uri, service)
    }

    /// Appends `uri` to the end of the queue.
    pub fn add_to_queue(&self, uri: &str, service: &str) -> Result<(), ClientError> {
        self.post_entry("/api/v1/addToQueue", uri, service)
    }

    /// Resolves an `albumart` value to a fetchable URL.
    pub fn album_art_url(&self, albumart: &str) -> String {
        if albumart.is_empty() {
            String::new()
        } else if albumart.starts_with("http://") || albumart.starts_with("https://") {
            albumart.to_string()
        } else {
            format!("{}{}", self.base_url, albumart)
        }
    }
}

fn expect_ok(endpoint: &str, response: ureq::Response) -> Result<ureq::Response, ClientError> {
    match response.status() {
        200 => Ok(response),
        code => Err(ClientError::Status {
            endpoint: endpoint.to_string(),
            code,
        }),
    }
}

fn select_albums(lists: Vec<SearchList>, scope: &AlbumScope) -> Vec<CatalogEntry> {
    lists
        .into_iter()
        .find(|list| scope.accepts_list(&list.title))
        .map(|list| {
            list.items
                .into_iter()
                .filter(|entry| scope.accepts_entry(entry))
                .collect()
        })
        .unwrap_or_default()
}

fn parse_entries(value: &Value) -> Vec<CatalogEntry> {
    serde_json::from_value(value.clone()).unwrap_or_default()
}

/// A list is either `{"items": [...]}` or a bare array.
fn entries_from_list(list: &Value) -> Vec<CatalogEntry> {
    match list.get("items") {
        Some(items) => parse_entries(items),
        None => parse_entries(list),
    }
}

fn extract_browse_entries(body: &Value) -> Vec<CatalogEntry> {
    let nested = ["/navigation/lists/0", "/lists/0"]
        .into_iter()
        .filter_map(|pointer| body.pointer(pointer))
        .map(entries_from_list);
    let flat = ["list", "items"]
        .into_iter()
        .filter_map(|key| body.get(key))
        .map(parse_entries);

    nested
        .chain(flat)
        .find(|entries| !entries.is_empty())
        .unwrap_or_default()
}
