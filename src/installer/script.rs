//! Completion script templates
//!
//! The generated script registers a completion function with the shell.
//! On every completion request the function exports the protocol variables
//! and runs `<completer> completion -- <words>`, reading candidates back one
//! per line.

use crate::shell::ShellKind;

const BASH_TEMPLATE: &str = r#"###-begin-{name}-completion-###
if type complete &>/dev/null; then
  _{fn}_completion () {
    local words cword
    if type _get_comp_words_by_ref &>/dev/null; then
      _get_comp_words_by_ref -n = -n @ -n : -w words -i cword
    else
      cword="$COMP_CWORD"
      words=("${COMP_WORDS[@]}")
    fi

    local si="$IFS"
    IFS=$'\n' COMPREPLY=($(COMP_CWORD="$cword" \
                           COMP_LINE="$COMP_LINE" \
                           COMP_POINT="$COMP_POINT" \
                           {completer} completion -- "${words[@]}" \
                           2>/dev/null)) || return $?
    IFS="$si"
    if type __ltrim_colon_completions &>/dev/null; then
      __ltrim_colon_completions "${words[cword]}"
    fi
  }
  complete -o default -F _{fn}_completion {name}
fi
###-end-{name}-completion-###
"#;

const ZSH_TEMPLATE: &str = r#"###-begin-{name}-completion-###
if type compdef &>/dev/null; then
  _{fn}_completion () {
    local reply
    local si=$IFS

    IFS=$'\n' reply=($(COMP_CWORD="$((CURRENT-1))" COMP_LINE="$BUFFER" COMP_POINT="$CURSOR" {completer} completion -- "${words[@]}" 2>/dev/null))
    IFS=$si

    if [[ -n "$reply" ]]; then
      _describe 'values' reply
    else
      _files
    fi
  }
  compdef _{fn}_completion {name}
fi
###-end-{name}-completion-###
"#;

const FISH_TEMPLATE: &str = r#"###-begin-{name}-completion-###
function _{fn}_completion
  set -l cmd (commandline -o)
  set -l cursor (commandline -C)
  set -l words (count $cmd)

  set -l completions (env COMP_CWORD="$words" COMP_LINE="$cmd " COMP_POINT="$cursor" {completer} completion -- $cmd 2>/dev/null)

  for completion in $completions
    echo -e $completion
  end
end

complete -f -d '{name}' -c {name} -a "(_{fn}_completion)"
###-end-{name}-completion-###
"#;

/// Render the completion script of package `name` for `shell`
///
/// `completer` is the command invoked to produce candidates. Shells without
/// a template of their own get the bash script.
pub fn render(name: &str, completer: &str, shell: ShellKind) -> String {
    let template = match shell {
        ShellKind::Zsh => ZSH_TEMPLATE,
        ShellKind::Fish => FISH_TEMPLATE,
        ShellKind::Bash | ShellKind::Other => BASH_TEMPLATE,
    };

    template
        .replace("{fn}", &function_name(name))
        .replace("{completer}", completer)
        .replace("{name}", name)
}

/// Shell function identifier derived from a package name
fn function_name(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bash_script() {
        let script = render("my-tool", "my-tool", ShellKind::Bash);
        assert!(script.starts_with("###-begin-my-tool-completion-###\n"));
        assert!(script.ends_with("###-end-my-tool-completion-###\n"));
        assert!(script.contains("complete -o default -F _my_tool_completion my-tool"));
        assert!(script.contains("my-tool completion -- \"${words[@]}\""));
        assert!(!script.contains("{name}"));
        assert!(!script.contains("{completer}"));
    }

    #[test]
    fn test_completer_differs_from_name() {
        let script = render("foo", "foo-complete", ShellKind::Zsh);
        assert!(script.contains("compdef _foo_completion foo"));
        assert!(script.contains("foo-complete completion --"));
    }

    #[test]
    fn test_fish_script() {
        let script = render("foo", "foo", ShellKind::Fish);
        assert!(script.contains("complete -f -d 'foo' -c foo -a \"(_foo_completion)\""));
        assert!(script.contains("COMP_POINT=\"$cursor\""));
    }

    #[test]
    fn test_other_shell_falls_back_to_bash() {
        assert_eq!(
            render("foo", "foo", ShellKind::Other),
            render("foo", "foo", ShellKind::Bash)
        );
    }
}
