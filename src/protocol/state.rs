//! Completion-request state
//!
//! A shell asking for completions passes the command line, the cursor offset
//! and its own word count through `COMP_LINE`, `COMP_POINT` and `COMP_CWORD`.
//! [`CompletionState::from_env`] decodes them into an immutable record.

use serde::Serialize;
use tracing::debug;

/// Variable carrying the full command line
pub const COMP_LINE: &str = "COMP_LINE";
/// Variable carrying the cursor offset within the command line
pub const COMP_POINT: &str = "COMP_POINT";
/// Variable carrying the shell's index of the word being completed
pub const COMP_CWORD: &str = "COMP_CWORD";

/// Immutable state of a single completion request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletionState {
    /// Input split on runs of whitespace
    words: Vec<String>,

    /// The raw command line
    input: String,

    /// Cursor offset within `input`
    cursor: usize,

    /// Index of the word ending at the cursor
    word: Option<usize>,

    /// True when all three protocol variables were supplied
    complete: bool,

    /// Word count as reported by the shell
    cword: usize,
}

impl CompletionState {
    /// Build the state for `input` with the cursor at `cursor`
    ///
    /// The state is not marked complete; use [`CompletionState::from_env`]
    /// to decode an actual completion request.
    pub fn new(input: impl Into<String>, cursor: usize) -> Self {
        let input = input.into();
        let words: Vec<String> = input.split_whitespace().map(str::to_owned).collect();
        let word = locate_word(&words, &input, cursor);

        Self {
            words,
            input,
            cursor,
            word,
            complete: false,
            cword: 0,
        }
    }

    /// Decode a completion request from environment variables
    ///
    /// Never fails: absent or non-numeric values fall back to an empty line
    /// and zero offsets, and the state is then marked incomplete.
    pub fn from_env<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut line = None;
        let mut point = None;
        let mut cword = None;

        for (key, value) in vars {
            match key.as_ref() {
                COMP_LINE => line = Some(value.into()),
                COMP_POINT => point = Some(value.into()),
                COMP_CWORD => cword = Some(value.into()),
                _ => {}
            }
        }

        debug!(
            "Parsing env. CWORD: {:?}, POINT: {:?}, LINE: {:?}",
            cword, point, line
        );

        let point = parse_number(point.as_deref());
        let cword = parse_number(cword.as_deref());
        let complete = line.as_deref().is_some_and(|s| !s.is_empty()) && point.is_some() && cword.is_some();

        let mut state = Self::new(line.unwrap_or_default(), point.unwrap_or(0));
        state.cword = cword.unwrap_or(0);
        state.complete = complete;
        state
    }

    /// Decode a completion request from the current process environment
    pub fn from_process_env() -> Self {
        Self::from_env(std::env::vars())
    }

    /// Words of the input, in order
    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// The raw command line
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Cursor offset within the input
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Index of the word preceding the cursor
    ///
    /// `None` when the cursor sits inside a word, or past the end of the
    /// input without a trailing separator.
    pub fn word(&self) -> Option<usize> {
        self.word
    }

    /// [`CompletionState::word`] as a signed index, `-1` when absent
    pub fn word_index(&self) -> isize {
        self.word.map_or(-1, |i| i as isize)
    }

    /// Whether the state came from a full completion request
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Word count reported by the shell (`COMP_CWORD`)
    pub fn cword(&self) -> usize {
        self.cword
    }

    /// The word preceding the cursor, or `""` when there is none
    pub fn current_word(&self) -> &str {
        self.word
            .and_then(|i| self.words.get(i))
            .map_or("", String::as_str)
    }

    /// Input up to the cursor
    pub fn partial(&self) -> &str {
        let mut end = self.cursor.min(self.input.len());
        while !self.input.is_char_boundary(end) {
            end -= 1;
        }
        &self.input[..end]
    }

    /// Last space-separated fragment of the input; empty after a trailing space
    pub fn last(&self) -> &str {
        self.input.rsplit(' ').next().unwrap_or("")
    }

    /// Last space-separated fragment of [`CompletionState::partial`]
    pub fn last_partial(&self) -> &str {
        self.partial().rsplit(' ').next().unwrap_or("")
    }

    /// Fragment before [`CompletionState::last`], if any
    pub fn prev(&self) -> Option<&str> {
        let mut parts = self.input.rsplit(' ');
        parts.next();
        parts.next()
    }
}

impl Default for CompletionState {
    fn default() -> Self {
        Self::new(String::new(), 0)
    }
}

/// Walk the words accumulating their offsets until the cursor is reached.
///
/// Separators are counted as a single character each.
fn locate_word(words: &[String], input: &str, cursor: usize) -> Option<usize> {
    let mut ch = 0;

    for (index, word) in words.iter().enumerate() {
        ch += word.len();

        if cursor < ch {
            return None;
        }
        if cursor <= ch {
            return Some(index);
        }

        ch += 1;
        if ch == cursor && cursor == input.len() {
            return Some(index);
        }
    }

    None
}

/// Offset or count, `None` when absent or not a number
fn parse_number(value: Option<&str>) -> Option<usize> {
    value.and_then(|v| v.trim().parse::<usize>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(line: &str, point: &str, cword: &str) -> CompletionState {
        CompletionState::from_env([
            (COMP_LINE, line),
            (COMP_POINT, point),
            (COMP_CWORD, cword),
        ])
    }

    #[test]
    fn test_empty_line() {
        let state = request("", "0", "0");
        assert!(state.words().is_empty());
        assert_eq!(state.word_index(), -1);
        assert_eq!(state.current_word(), "");
    }

    #[test]
    fn test_cursor_at_end_of_last_word() {
        let state = request("git commit -m", "13", "2");
        assert_eq!(state.words(), ["git", "commit", "-m"]);
        assert_eq!(state.word_index(), 2);
        assert_eq!(state.current_word(), "-m");
        assert!(state.is_complete());
    }

    #[test]
    fn test_cursor_inside_word() {
        let state = request("git comm", "4", "1");
        assert_eq!(state.word(), None);
        assert_eq!(state.word_index(), -1);
    }

    #[test]
    fn test_cursor_after_trailing_space() {
        let state = request("git commit ", "11", "2");
        assert_eq!(state.words(), ["git", "commit"]);
        assert_eq!(state.word_index(), 1);
        assert_eq!(state.last(), "");
        assert_eq!(state.prev(), Some("commit"));
    }

    #[test]
    fn test_cursor_at_end_of_first_word() {
        let state = request("git commit", "3", "0");
        assert_eq!(state.word_index(), 0);
        assert_eq!(state.partial(), "git");
    }

    #[test]
    fn test_cursor_past_end_without_separator() {
        let state = request("git", "10", "0");
        assert_eq!(state.word_index(), -1);
    }

    #[test]
    fn test_missing_variables_are_incomplete() {
        let state = CompletionState::from_env([(COMP_LINE, "git")]);
        assert!(!state.is_complete());
        assert_eq!(state.cursor(), 0);
        assert_eq!(state.cword(), 0);
        assert_eq!(state.words(), ["git"]);

        let empty: [(&str, &str); 0] = [];
        let state = CompletionState::from_env(empty);
        assert!(!state.is_complete());
        assert!(state.words().is_empty());
        assert_eq!(state.input(), "");
    }

    #[test]
    fn test_non_numeric_fields_default_to_zero() {
        let state = request("git", "abc", "-1");
        assert_eq!(state.cursor(), 0);
        assert_eq!(state.cword(), 0);
        assert_eq!(state.word_index(), -1);
        assert!(!state.is_complete());
    }

    #[test]
    fn test_malformed_point_is_incomplete() {
        let state = request("git", "abc", "1");
        assert_eq!(state.cursor(), 0);
        assert!(!state.is_complete());

        // zero is a valid offset
        assert!(request("git", "0", "0").is_complete());
    }

    #[test]
    fn test_empty_values_are_incomplete() {
        let state = request("git", "", "0");
        assert!(!state.is_complete());
    }

    #[test]
    fn test_unrelated_variables_ignored() {
        let state = CompletionState::from_env([
            ("HOME", "/root"),
            (COMP_LINE, "ls -l"),
            (COMP_POINT, "5"),
            (COMP_CWORD, "1"),
        ]);
        assert_eq!(state.words(), ["ls", "-l"]);
        assert_eq!(state.word_index(), 1);
    }

    #[test]
    fn test_words_stable_under_reparse() {
        let first = CompletionState::new("  cargo   build  --release ", 5);
        let second = CompletionState::new(first.input().to_string(), 5);
        assert_eq!(first.words(), second.words());
        assert_eq!(first.words(), ["cargo", "build", "--release"]);
    }

    #[test]
    fn test_word_index_always_valid() {
        let line = "a bb ccc dddd";
        for cursor in 0..=line.len() + 3 {
            let state = CompletionState::new(line, cursor);
            if let Some(i) = state.word() {
                assert!(i < state.words().len());
            }
        }
    }

    #[test]
    fn test_partial_fragments() {
        let state = request("npm run bu", "9", "2");
        assert_eq!(state.partial(), "npm run b");
        assert_eq!(state.last_partial(), "b");
        assert_eq!(state.last(), "bu");
        assert_eq!(state.prev(), Some("run"));
    }

    #[test]
    fn test_partial_clamped_to_char_boundary() {
        let state = CompletionState::new("é", 1);
        assert_eq!(state.partial(), "");
    }
}
