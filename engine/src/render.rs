//! Shell completion script rendering.
//!
//! Renderers receive exactly two inputs: the program name and the
//! [`CompletionMap`]. They complete subcommand names in first position,
//! flag names after a subcommand, and restricted values after a
//! choice-constrained flag.

use std::fmt::Write;

use fncli_core::{CompletionMap, CompletionShell};

/// Turns a completion map into a script for one shell.
pub trait CompletionRenderer {
    fn render(&self, program: &str, map: &CompletionMap) -> String;
}

/// Returns the renderer for `shell`.
pub fn renderer_for(shell: CompletionShell) -> Box<dyn CompletionRenderer> {
    match shell {
        CompletionShell::Bash => Box::new(BashCompletion),
        CompletionShell::Fish => Box::new(FishCompletion),
    }
}

/// Bash script built around `complete -F`.
#[derive(Debug, Default, Clone, Copy)]
pub struct BashCompletion;

impl CompletionRenderer for BashCompletion {
    fn render(&self, program: &str, map: &CompletionMap) -> String {
        let program = program.to_lowercase();
        let func_name = format!("_fncli_{}_complete", program.replace(['-', '.'], "_"));
        let commands: Vec<&str> = map.subcommands().collect();
        let mut out = String::new();

        let _ = writeln!(out, "# bash completion for {program}");
        let _ = writeln!(out, "{func_name}()");
        let _ = writeln!(out, "{{");
        let _ = writeln!(out, "  local cur prev command");
        let _ = writeln!(out);
        let _ = writeln!(out, "  COMPREPLY=()");
        let _ = writeln!(out, "  cur=\"${{COMP_WORDS[COMP_CWORD]}}\"");
        let _ = writeln!(out, "  prev=\"${{COMP_WORDS[COMP_CWORD-1]}}\"");
        let _ = writeln!(out, "  command=\"${{COMP_WORDS[1]}}\"");
        let _ = writeln!(out);
        let _ = writeln!(out, "  if [ \"$COMP_CWORD\" -eq 1 ]; then");
        let _ = writeln!(out, "    COMPREPLY=( $(compgen -W '{}' -- \"$cur\") )", words(&commands));
        let _ = writeln!(out, "    return 0");

        for (command, flags) in map.iter() {
            for (flag, values) in flags {
                if let Some(items) = values.choices() {
                    let items: Vec<&str> = items.iter().map(String::as_str).collect();
                    let _ = writeln!(
                        out,
                        "  elif [ \"$command\" == \"{command}\" ] && [ \"$prev\" == \"{flag}\" ]; then"
                    );
                    let _ = writeln!(out, "    COMPREPLY=( $(compgen -W '{}' -- \"$cur\") )", words(&items));
                    let _ = writeln!(out, "    return 0");
                }
            }
            let names: Vec<&str> = flags.keys().map(String::as_str).collect();
            let _ = writeln!(out, "  elif [ \"$command\" == \"{command}\" ]; then");
            let _ = writeln!(out, "    COMPREPLY=( $(compgen -W '{}' -- \"$cur\") )", words(&names));
            let _ = writeln!(out, "    return 0");
        }

        let _ = writeln!(out, "  fi");
        let _ = writeln!(out, "}} &&");
        let _ = writeln!(out, "complete -F {func_name} {program}");
        out
    }
}

/// Fish script made of `complete -c` lines.
#[derive(Debug, Default, Clone, Copy)]
pub struct FishCompletion;

impl CompletionRenderer for FishCompletion {
    fn render(&self, program: &str, map: &CompletionMap) -> String {
        let program = program.to_lowercase();
        let mut out = String::new();

        let _ = writeln!(out, "# fish completion for {program}");
        let _ = writeln!(out, "complete -c {program} -f");
        for command in map.subcommands() {
            let _ = writeln!(
                out,
                "complete -c {program} -n '__fish_use_subcommand' -a '{}'",
                escape_single(command)
            );
        }

        for (command, flags) in map.iter() {
            for (flag, values) in flags {
                let long = flag.trim_start_matches('-');
                let mut line = format!(
                    "complete -c {program} -n '__fish_seen_subcommand_from {command}' -l '{}'",
                    escape_single(long)
                );
                match values.choices() {
                    Some(items) => {
                        let items: Vec<&str> = items.iter().map(String::as_str).collect();
                        let _ = write!(line, " -x -a '{}'", words(&items));
                    }
                    None => line.push_str(" -r"),
                }
                let _ = writeln!(out, "{line}");
            }
        }
        out
    }
}

fn words(items: &[&str]) -> String {
    items
        .iter()
        .map(|item| escape_single(item))
        .collect::<Vec<_>>()
        .join(" ")
}

fn escape_single(s: &str) -> String {
    s.replace('\'', "'\\''")
}

#[cfg(test)]
mod tests {
    use fncli_core::{Choice, Operation, Parameter, Registry, build_completion_map};

    use super::*;

    fn sample_map() -> CompletionMap {
        let registry = Registry::new()
            .with_operation(
                Operation::new("function_deploy", |_| Ok(()))
                    .with_param(Parameter::positional("target"))
                    .with_param(Parameter::choice("env", Choice::new(["dev", "prod"]).unwrap()))
                    .with_param(Parameter::env_or_ask("token", true)),
            )
            .with_operation(
                Operation::new("function_greet", |_| Ok(())).with_param(Parameter::literal("greeting", "Hi")),
            );
        build_completion_map(&registry)
    }

    #[test]
    fn test_bash_completes_subcommands_first() {
        let script = BashCompletion.render("Toolbox", &sample_map());
        assert!(script.contains("_fncli_toolbox_complete()"), "{script}");
        assert!(script.contains("compgen -W 'deploy greet'"), "{script}");
        assert!(script.ends_with("complete -F _fncli_toolbox_complete toolbox\n"), "{script}");
    }

    #[test]
    fn test_bash_completes_choice_values_after_flag() {
        let script = BashCompletion.render("toolbox", &sample_map());
        let choice_branch = "[ \"$command\" == \"deploy\" ] && [ \"$prev\" == \"--env\" ]";
        let choice_at = script.find(choice_branch).expect("choice branch present");
        let flags_at = script.find("compgen -W '--env --token'").expect("flag branch present");
        assert!(choice_at < flags_at, "choice branch must precede the flag list");
        assert!(script.contains("compgen -W 'dev prod'"), "{script}");
        assert!(script.contains("compgen -W '--greeting'"), "{script}");
    }

    #[test]
    fn test_bash_function_name_is_sanitized() {
        let script = BashCompletion.render("my-tool.sh", &CompletionMap::default());
        assert!(script.contains("_fncli_my_tool_sh_complete()"), "{script}");
        assert!(script.contains("compgen -W ''"), "{script}");
    }

    #[test]
    fn test_fish_lines() {
        let script = FishCompletion.render("toolbox", &sample_map());
        assert!(script.contains("complete -c toolbox -n '__fish_use_subcommand' -a 'deploy'"));
        assert!(script.contains(
            "complete -c toolbox -n '__fish_seen_subcommand_from deploy' -l 'env' -x -a 'dev prod'"
        ));
        assert!(script.contains(
            "complete -c toolbox -n '__fish_seen_subcommand_from greet' -l 'greeting' -r"
        ));
    }

    #[test]
    fn test_single_quotes_are_escaped() {
        assert_eq!(escape_single("it's"), "it'\\''s");
    }

    #[test]
    fn test_renderer_for_shell() {
        let map = sample_map();
        assert!(renderer_for(CompletionShell::Bash).render("t", &map).starts_with("# bash"));
        assert!(renderer_for(CompletionShell::Fish).render("t", &map).starts_with("# fish"));
    }
}
