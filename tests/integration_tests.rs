//! # Integration Tests for volctl
//!
//! End-to-end tests against a mock Volumio server: the radio flow through the
//! real HTTP client, configuration files on disk, and the compiled binary.

use anyhow::Result;
use mockito::{Matcher, Mock, Server, ServerGuard};
use serde_json::json;
use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

/// Search response with three matching episodes, one non-episode album, and
/// a streaming list that must be ignored.
fn search_body() -> String {
    json!({"navigation": {"isSearchResult": true, "lists": [
        {"title": "TIDAL Albums", "items": [
            {"uri": "tidal://album/1", "title": "ASOT 1000", "type": "folder", "service": "tidal"}
        ]},
        {"title": "Found 4 Albums 'ASOT'", "items": [
            {"uri": "albums://ASOT 900", "title": "ASOT 900", "type": "folder", "service": "mpd"},
            {"uri": "albums://ASOT 901", "title": "ASOT 901", "type": "folder", "service": "mpd"},
            {"uri": "albums://ASOT Classics", "title": "ASOT Classics", "type": "folder", "service": "mpd"},
            {"uri": "albums://ASOT 902", "title": "ASOT 902", "type": "folder", "service": "mpd"}
        ]}
    ]}})
    .to_string()
}

fn mock_search(server: &mut ServerGuard) -> Mock {
    server
        .mock("GET", "/api/v1/search")
        .match_query(Matcher::UrlEncoded("query".into(), "ASOT".into()))
        .with_status(200)
        .with_body(search_body())
        .create()
}

fn mock_state(server: &mut ServerGuard, random: bool) -> Mock {
    server
        .mock("GET", "/api/v1/getState")
        .with_status(200)
        .with_body(json!({"status": "play", "random": random}).to_string())
        .create()
}

/// Writes a config with one series pointing at the mock server's episodes.
fn write_config(dir: &TempDir) -> Result<PathBuf> {
    let path = dir.path().join("config.yaml");
    fs::write(
        &path,
        r#"
radio:
  asot:
    name: A State of Trance
    search_query: ASOT
    pattern: '^ASOT \d+'
"#,
    )?;
    Ok(path)
}

fn volctl(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_volctl"))
        .args(args)
        .env_remove("VOLUMIO_HOST")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to run volctl")
}

#[cfg(test)]
mod radio_integration_tests {
    use super::*;
    use volctl::player::VolumioPlayer;
    use volctl::radio::{EpisodeSequencer, RadioError, SelectionRequest, SequencerState, SequencerTiming};
    use volctl::sampler::Sampler;
    use volctl::volumio_client::{AlbumScope, Client};

    fn sequencer<'a>(player: &'a VolumioPlayer<'a>) -> EpisodeSequencer<'a, VolumioPlayer<'a>> {
        EpisodeSequencer::with_parts(player, Sampler::with_seed(11), SequencerTiming::immediate())
    }

    #[test]
    fn test_radio_queues_sampled_episodes() {
        let mut server = Server::new();
        let search = mock_search(&mut server);
        let _state = mock_state(&mut server, false);
        let play = server
            .mock("POST", "/api/v1/replaceAndPlay")
            .match_body(Matcher::Regex(r#""uri":"albums://ASOT 90\d""#.to_string()))
            .with_status(200)
            .expect(1)
            .create();
        let append = server
            .mock("POST", "/api/v1/addToQueue")
            .match_body(Matcher::Regex(r#""service":"mpd""#.to_string()))
            .with_status(200)
            .expect(1)
            .create();
        let toggle = server
            .mock("GET", "/api/v1/commands/")
            .match_query(Matcher::Any)
            .expect(0)
            .create();

        let client = Client::new(&server.url());
        let player = VolumioPlayer::new(&client, AlbumScope::default());
        let mut sequencer = sequencer(&player);

        let outcome = sequencer.run(&SelectionRequest::new("ASOT", r"^ASOT \d+", 2)).unwrap();
        assert_eq!(outcome.requested, 2);
        assert_eq!(outcome.matched, 3);
        assert_eq!(outcome.queued, 2);
        assert_eq!(sequencer.state(), SequencerState::Done);

        search.assert();
        play.assert();
        append.assert();
        toggle.assert();
    }

    #[test]
    fn test_radio_count_above_matches_queues_everything() {
        let mut server = Server::new();
        let _search = mock_search(&mut server);
        let _state = mock_state(&mut server, false);
        let play = server
            .mock("POST", "/api/v1/replaceAndPlay")
            .with_status(200)
            .expect(1)
            .create();
        let append = server
            .mock("POST", "/api/v1/addToQueue")
            .with_status(200)
            .expect(2)
            .create();

        let client = Client::new(&server.url());
        let player = VolumioPlayer::new(&client, AlbumScope::default());

        let outcome = sequencer(&player)
            .run(&SelectionRequest::new("ASOT", r"^ASOT \d+", 10))
            .unwrap();
        assert_eq!(outcome.queued, 3);
        play.assert();
        append.assert();
    }

    #[test]
    fn test_radio_no_match_leaves_player_untouched() {
        let mut server = Server::new();
        let _search = mock_search(&mut server);
        let state = server.mock("GET", "/api/v1/getState").expect(0).create();
        let play = server.mock("POST", "/api/v1/replaceAndPlay").expect(0).create();
        let append = server.mock("POST", "/api/v1/addToQueue").expect(0).create();

        let client = Client::new(&server.url());
        let player = VolumioPlayer::new(&client, AlbumScope::default());
        let mut sequencer = sequencer(&player);

        let err = sequencer
            .run(&SelectionRequest::new("ASOT", r"^Group Therapy \d+", 3))
            .unwrap_err();
        assert!(matches!(err, RadioError::NoMatch { .. }), "{err}");
        assert_eq!(sequencer.state(), SequencerState::Failed);

        state.assert();
        play.assert();
        append.assert();
    }

    #[test]
    fn test_radio_append_failure_reports_partial_queue() {
        let mut server = Server::new();
        let _search = mock_search(&mut server);
        let _state = mock_state(&mut server, false);
        let _play = server
            .mock("POST", "/api/v1/replaceAndPlay")
            .with_status(200)
            .create();
        let append = server
            .mock("POST", "/api/v1/addToQueue")
            .with_status(500)
            .expect(1)
            .create();

        let client = Client::new(&server.url());
        let player = VolumioPlayer::new(&client, AlbumScope::default());

        let err = sequencer(&player)
            .run(&SelectionRequest::new("ASOT", r"^ASOT \d+", 3))
            .unwrap_err();
        match err {
            RadioError::Queue { position, queued, .. } => {
                assert_eq!(position, 1);
                assert_eq!(queued, 1);
            }
            other => panic!("expected queue error, got {other}"),
        }
        // Stops at the first failure
        append.assert();
    }

    #[test]
    fn test_radio_search_failure() {
        let mut server = Server::new();
        let _search = server
            .mock("GET", "/api/v1/search")
            .match_query(Matcher::Any)
            .with_status(502)
            .create();

        let client = Client::new(&server.url());
        let player = VolumioPlayer::new(&client, AlbumScope::default());

        let err = sequencer(&player)
            .run(&SelectionRequest::new("ASOT", r"^ASOT \d+", 1))
            .unwrap_err();
        assert!(matches!(err, RadioError::Search(_)), "{err}");
    }
}

#[cfg(test)]
mod configuration_tests {
    use super::*;
    use volctl::config::{self, Config};

    #[test]
    fn test_config_file_round_trip() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("volctl").join("config.yaml");

        config::save_to(&Config::example(), &path)?;
        let loaded = config::load_from(&path)?;
        assert_eq!(loaded, Config::example());
        assert!(loaded.series("asot").is_some());
        Ok(())
    }

    #[test]
    fn test_handwritten_config_is_understood() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = write_config(&temp_dir)?;

        let loaded = config::load_from(&path)?;
        let series = loaded.series("asot").expect("series should load");
        assert_eq!(series.search_query, "ASOT");
        assert_eq!(loaded.resolve_host(None, Some("10.1.1.1")), "10.1.1.1");
        Ok(())
    }
}

#[cfg(test)]
mod cli_tests {
    use super::*;

    #[test]
    fn test_cli_help_displays_correctly() {
        let output = volctl(&["--help"]);
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(output.status.success());
        assert!(stdout.contains("volctl"));
        assert!(stdout.contains("radio"));
        assert!(stdout.contains("status"));
        assert!(stdout.contains("--host"));
    }

    #[test]
    fn test_completion_generation() {
        let output = volctl(&["completion", "bash"]);
        assert!(output.status.success());
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("_volctl"));
        assert!(stdout.contains("complete"));
    }

    #[test]
    fn test_config_init_respects_existing_file() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("config.yaml");
        let path_arg = path.to_string_lossy().to_string();

        let first = volctl(&["config", "init", "--config", &path_arg]);
        assert!(first.status.success());
        assert!(path.exists());

        let second = volctl(&["config", "init", "--config", &path_arg]);
        assert!(!second.status.success());
        assert!(String::from_utf8_lossy(&second.stderr).contains("already exists"));

        let forced = volctl(&["config", "init", "--force", "--config", &path_arg]);
        assert!(forced.status.success());
        Ok(())
    }

    #[test]
    fn test_series_listing_and_completion() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = write_config(&temp_dir)?;
        let path_arg = path.to_string_lossy().to_string();

        let listing = volctl(&["series", "--config", &path_arg]);
        assert!(listing.status.success());
        assert!(String::from_utf8_lossy(&listing.stdout).contains("A State of Trance"));

        let names = volctl(&["complete-series", "--config", &path_arg]);
        assert_eq!(String::from_utf8_lossy(&names.stdout), "asot\n");
        Ok(())
    }

    #[test]
    fn test_unknown_series_is_reported() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = write_config(&temp_dir)?;
        let path_arg = path.to_string_lossy().to_string();

        let output = volctl(&["radio", "nope", "--config", &path_arg, "-H", "127.0.0.1"]);
        assert!(!output.status.success());
        assert!(String::from_utf8_lossy(&output.stderr).contains("unknown radio series: nope"));
        Ok(())
    }

    #[test]
    fn test_malformed_config_warns_on_stderr() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("config.yaml");
        fs::write(&path, "radio: [not, a, map")?;
        let path_arg = path.to_string_lossy().to_string();

        let listing = volctl(&["series", "--config", &path_arg]);
        let stderr = String::from_utf8_lossy(&listing.stderr);
        assert!(listing.status.success(), "stderr: {stderr}");
        assert!(stderr.contains("Warning:"), "stderr: {stderr}");
        assert!(stderr.contains("Failed to parse config file"), "stderr: {stderr}");
        assert!(String::from_utf8_lossy(&listing.stdout).contains("No radio series configured"));

        let radio = volctl(&["radio", "asot", "--config", &path_arg, "-H", "127.0.0.1"]);
        let stderr = String::from_utf8_lossy(&radio.stderr);
        assert!(!radio.status.success());
        assert!(stderr.contains("Failed to parse config file"), "stderr: {stderr}");
        assert!(stderr.contains("unknown radio series: asot"), "stderr: {stderr}");
        Ok(())
    }

    #[test]
    fn test_radio_zero_count_rejected() {
        let output = volctl(&["radio", "asot", "0"]);
        assert!(!output.status.success());
    }

    #[test]
    fn test_radio_command_against_mock_player() -> Result<()> {
        let mut server = Server::new();
        let _search = mock_search(&mut server);
        let _state = mock_state(&mut server, false);
        let play = server
            .mock("POST", "/api/v1/replaceAndPlay")
            .with_status(200)
            .expect(1)
            .create();
        let append = server.mock("POST", "/api/v1/addToQueue").expect(0).create();

        let temp_dir = TempDir::new()?;
        let path = write_config(&temp_dir)?;
        let path_arg = path.to_string_lossy().to_string();
        let host = server.url();

        let output = volctl(&["radio", "asot", "1", "--config", &path_arg, "-H", &host]);
        assert!(
            output.status.success(),
            "stderr: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        assert_eq!(
            String::from_utf8_lossy(&output.stdout).trim(),
            "Queued 1 of 1 requested A State of Trance episodes (3 matched)"
        );
        play.assert();
        append.assert();
        Ok(())
    }
}
