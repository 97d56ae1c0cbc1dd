//! Marker blocks
//!
//! A marker block is the group of lines appended to a profile (or a file in a
//! completions directory) that loads a managed script:
//!
//! ```text
//!
//! # tabtab source for foo package
//! # uninstall by removing these lines or running `tabtab uninstall foo`
//! . /home/me/.config/tabtab/completions/foo
//! ```
//!
//! The block is always appended and removed as a unit. Removal matches the
//! marker comment line exactly and restores the file byte for byte.

use std::path::Path;

use crate::shell::ShellKind;

const UNINSTALL_PREFIX: &str = "# uninstall by removing these lines";

/// The comment line identifying the block of `name`
pub fn marker_line(name: &str) -> String {
    format!("# tabtab source for {name} package")
}

/// Render the block loading `script` for package `name`
pub fn render(name: &str, tool: &str, script: &Path, shell: ShellKind) -> String {
    format!(
        "\n{}\n{UNINSTALL_PREFIX} or running `{tool} uninstall {name}`\n{} {}\n",
        marker_line(name),
        shell.source_command(),
        script.display()
    )
}

/// Whether `content` holds a block for `name`
pub fn contains(content: &str, name: &str) -> bool {
    find_line(content, &marker_line(name)).is_some()
}

/// Remove every block for `name` from `content`
///
/// Returns `None` when no block was found.
pub fn strip(content: &str, name: &str) -> Option<String> {
    let marker = marker_line(name);
    let mut out = content.to_string();
    let mut found = false;

    while let Some(start) = find_line(&out, &marker) {
        found = true;

        let mut end = line_end(&out, start);
        if out[end..].starts_with(UNINSTALL_PREFIX) {
            end = line_end(&out, end);
        }
        if is_source_line(&out[end..]) {
            end = line_end(&out, end);
        }

        // the separator in front of the marker belongs to the block
        let begin = start.saturating_sub(1);
        out.replace_range(begin..end, "");
    }

    found.then_some(out)
}

fn find_line(content: &str, line: &str) -> Option<usize> {
    content.match_indices(line).map(|(i, _)| i).find(|&i| {
        let starts_line = i == 0 || content[..i].ends_with('\n');
        let rest = &content[i + line.len()..];
        let ends_line = rest.is_empty() || rest.starts_with('\n') || rest.starts_with("\r\n");
        starts_line && ends_line
    })
}

fn line_end(content: &str, from: usize) -> usize {
    content[from..]
        .find('\n')
        .map_or(content.len(), |i| from + i + 1)
}

fn is_source_line(line: &str) -> bool {
    line.starts_with(". ") || line.starts_with("source ")
}
