//! Completion of the tabtab command line itself
//!
//! `tabtab install` registers a script that calls back into
//! `tabtab completion -- <words>`. The request is decoded from the
//! completion environment and answered with subcommands or flags.

use std::io::Write;

use tracing::debug;

use crate::error::Result;
use crate::protocol::{self, CompletionState, MatchInput};
use crate::shell::ShellKind;

/// Subcommands offered after the program name, as `name:description`
const SUBCOMMANDS: &[&str] = &[
    "install:Install the completion script of a package",
    "uninstall:Remove the completion script of a package",
    "completion:Answer a completion request",
    "log:Format completion candidates for the current shell",
    "state:Print the decoded completion request",
];

/// Options accepted before the subcommand
const GLOBAL_FLAGS: &[&str] = &[
    "--config:Configuration file path",
    "--quiet:Only log errors",
    "--verbose:Log debug messages",
    "--vv:Log trace messages",
    "--help:Print help",
    "--version:Print version",
];

/// Flags followed by a value, which is not completed
const VALUE_FLAGS: &[&str] = &["-c", "--config", "--name", "--completer"];

/// Flags accepted by one subcommand
fn subcommand_flags(subcommand: &str) -> &'static [&'static str] {
    match subcommand {
        "install" => &[
            "--name:Package to complete",
            "--completer:Program answering completion requests",
        ],
        "uninstall" => &["--name:Package to remove"],
        "log" => &["--json:Read a JSON array from stdin"],
        _ => &[],
    }
}

fn flag_name(entry: &str) -> &str {
    entry.split(':').next().unwrap_or(entry)
}

/// Candidates for the word being typed in `state`
///
/// Only words before the cursor are considered. Nothing is offered right
/// after a flag expecting a value.
pub fn candidates(state: &CompletionState) -> Vec<MatchInput> {
    let partial = state.partial();
    let mut typed: Vec<&str> = partial.split_whitespace().collect();
    if !partial.is_empty() && !partial.ends_with(char::is_whitespace) {
        typed.pop();
    }

    // the first word is the program itself
    let before = typed.get(1..).unwrap_or_default();
    if before.last().is_some_and(|w| VALUE_FLAGS.contains(w)) {
        return Vec::new();
    }

    let mut skip_value = false;
    let mut subcommand = None;
    for word in before {
        if skip_value {
            skip_value = false;
        } else if VALUE_FLAGS.contains(word) {
            skip_value = true;
        } else if !word.starts_with('-') {
            subcommand = Some(*word);
            break;
        }
    }

    let entries: Vec<&str> = match subcommand {
        None => SUBCOMMANDS.iter().chain(GLOBAL_FLAGS).copied().collect(),
        Some(sub) => subcommand_flags(sub)
            .iter()
            .copied()
            .filter(|entry| !before.contains(&flag_name(entry)))
            .collect(),
    };

    entries.into_iter().map(MatchInput::from).collect()
}

/// Answer the completion request found in the process environment
///
/// Prints nothing when not invoked by a completion script.
pub fn complete<W: Write>(out: &mut W, words: &[String]) -> Result<()> {
    let state = CompletionState::from_process_env();
    debug!("Completing {:?} with state {:?}", words, state);

    if !state.is_complete() {
        debug!("Not a completion request, nothing to do");
        return Ok(());
    }

    protocol::log(out, candidates(&state), ShellKind::detect(), &state)
}
