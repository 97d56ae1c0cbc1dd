//! Shell-specific rendering of completion candidates
//!
//! Each shell's completion subsystem reads one candidate per line from
//! stdout, but they disagree on how a description is attached:
//!
//! | shell | line |
//! |-------|------|
//! | zsh   | `name` with `:` escaped, then `:description` |
//! | fish  | `name\tdescription` |
//! | bash  | `name` only, filtered on the word before the cursor |
//! | other | `name` only |

use std::io::Write;

use tracing::debug;

use super::matches::{Match, MatchInput};
use super::state::CompletionState;
use crate::error::Result;
use crate::shell::ShellKind;

/// Render candidates as output lines for `shell`
///
/// Input order is preserved and nothing is deduplicated. Candidates with an
/// empty name are dropped. The state is only consulted for the bash prefix
/// filter.
pub fn format_matches<I, M>(matches: I, shell: ShellKind, state: &CompletionState) -> Vec<String>
where
    I: IntoIterator<Item = M>,
    M: Into<MatchInput>,
{
    let lines = matches
        .into_iter()
        .map(|m| m.into().normalize(shell))
        .filter(|m| !m.name.is_empty())
        .map(|m| format_line(&m, shell));

    match shell {
        ShellKind::Bash => {
            let prefix = state.current_word();
            lines.filter(|line| line.starts_with(prefix)).collect()
        }
        _ => lines.collect(),
    }
}

/// Render one normalized candidate
pub fn format_line(m: &Match, shell: ShellKind) -> String {
    match (shell, m.description()) {
        (ShellKind::Zsh, Some(description)) => {
            format!("{}:{}", m.name.replace(':', "\\:"), description)
        }
        (ShellKind::Fish, Some(description)) => format!("{}\t{}", m.name, description),
        _ => m.name.clone(),
    }
}

/// Write formatted candidates to `out`, one per line
pub fn log<W, I, M>(out: &mut W, matches: I, shell: ShellKind, state: &CompletionState) -> Result<()>
where
    W: Write,
    I: IntoIterator<Item = M>,
    M: Into<MatchInput>,
{
    let lines = format_matches(matches, shell, state);
    debug!("Logging {} completion candidate(s) for {}", lines.len(), shell);

    for line in lines {
        writeln!(out, "{line}")?;
    }
    out.flush()?;
    Ok(())
}
