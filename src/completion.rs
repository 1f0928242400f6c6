//! # Shell Completion Module
//!
//! This module provides shell completion functionality for volctl, including:
//! - Generation of completion scripts for various shells
//! - Custom completion for radio series names from the config file
//! - Integration with clap's completion system
//!
//! ## Usage
//!
//! ```bash
//! # Generate bash completions
//! volctl completion bash > ~/.local/share/bash-completion/completions/volctl
//!
//! # Bash completions that also complete `volctl radio <TAB>`
//! volctl completion-enhanced bash > ~/.local/share/bash-completion/completions/volctl
//! ```

use crate::config::Config;
use clap::Command;
use clap_complete::{generate, Generator, Shell as CompletionShell};
use std::io::{self, Write};

/// Generate shell completions for the given shell
pub fn generate_completions<G: Generator>(gen: G, cmd: &mut Command) {
    generate(gen, cmd, cmd.get_name().to_string(), &mut io::stdout());
}

/// Bash completion script with radio series completion.
///
/// Series names come from `volctl complete-series` at completion time, so
/// editing the config file needs no reinstall.
pub const ENHANCED_BASH_COMPLETION: &str = r#"#!/bin/bash
# Enhanced volctl completion script with radio series completion
# Install with: volctl completion-enhanced bash > ~/.local/share/bash-completion/completions/volctl

_volctl_complete_series() {
    if command -v volctl >/dev/null 2>&1; then
        volctl complete-series 2>/dev/null
    fi
}

_volctl() {
    local cur prev words cword
    _init_completion || return

    case "${prev}" in
        radio)
            mapfile -t COMPREPLY < <(compgen -W "$(_volctl_complete_series)" -- "${cur}")
            return 0
            ;;
        volume)
            COMPREPLY=($(compgen -W "up down 0 25 50 75 100" -- "${cur}"))
            return 0
            ;;
        config)
            COMPREPLY=($(compgen -W "path init" -- "${cur}"))
            return 0
            ;;
        completion|completion-enhanced)
            COMPREPLY=($(compgen -W "bash zsh fish power-shell elvish" -- "${cur}"))
            return 0
            ;;
        -c|--config)
            _filedir
            return 0
            ;;
        -H|--host)
            _known_hosts_real -- "${cur}"
            return 0
            ;;
    esac

    local subcommands="play pause toggle stop next skip prev volume mute shuffle repeat status browse radio series config completion completion-enhanced help"

    if [[ $cword -eq 1 ]]; then
        COMPREPLY=($(compgen -W "$subcommands --host --config --help --version" -- "${cur}"))
    else
        case "${words[1]}" in
            init)
                COMPREPLY=($(compgen -W "--force --help" -- "${cur}"))
                ;;
            *)
                COMPREPLY=($(compgen -W "--host --config --help" -- "${cur}"))
                ;;
        esac
    fi
} &&
complete -F _volctl volctl

# ex: filetype=sh
"#;

/// Print the enhanced bash completion script
pub fn generate_enhanced_bash_completion() {
    print!("{ENHANCED_BASH_COMPLETION}");
}

/// Convert our Shell enum to clap_complete's Shell enum
pub fn shell_to_completion_shell(shell: &crate::cli::Shell) -> CompletionShell {
    match shell {
        crate::cli::Shell::Bash => CompletionShell::Bash,
        crate::cli::Shell::Zsh => CompletionShell::Zsh,
        crate::cli::Shell::Fish => CompletionShell::Fish,
        crate::cli::Shell::PowerShell => CompletionShell::PowerShell,
        crate::cli::Shell::Elvish => CompletionShell::Elvish,
    }
}

/// Radio series keys, sorted.
pub fn get_series_completions(config: &Config) -> Vec<String> {
    // BTreeMap keys are already ordered
    config.radio.keys().cloned().collect()
}

/// Print one series key per line for shell completion scripts.
pub fn print_series_completions<W: Write>(config: &Config, out: &mut W) -> io::Result<()> {
    for key in get_series_completions(config) {
        writeln!(out, "{key}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RadioSeries;

    fn series(query: &str) -> RadioSeries {
        RadioSeries {
            name: String::new(),
            search_query: query.to_string(),
            pattern: format!("^{query}"),
        }
    }

    #[test]
    fn test_shell_conversion() {
        assert_eq!(
            shell_to_completion_shell(&crate::cli::Shell::Bash),
            CompletionShell::Bash
        );
        assert_eq!(
            shell_to_completion_shell(&crate::cli::Shell::Zsh),
            CompletionShell::Zsh
        );
        assert_eq!(
            shell_to_completion_shell(&crate::cli::Shell::PowerShell),
            CompletionShell::PowerShell
        );
    }

    #[test]
    fn test_series_completions_sorted() {
        let mut config = Config::default();
        config.radio.insert("gt".to_string(), series("Group Therapy"));
        config.radio.insert("asot".to_string(), series("A State of Trance"));

        assert_eq!(get_series_completions(&config), vec!["asot", "gt"]);

        let mut out = Vec::new();
        print_series_completions(&config, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "asot\ngt\n");
    }

    #[test]
    fn test_series_completions_empty_config() {
        assert!(get_series_completions(&Config::default()).is_empty());
    }

    #[test]
    fn test_enhanced_script_mentions_hidden_command() {
        assert!(ENHANCED_BASH_COMPLETION.contains("volctl complete-series"));
        assert!(ENHANCED_BASH_COMPLETION.contains("complete -F _volctl volctl"));
    }
}
