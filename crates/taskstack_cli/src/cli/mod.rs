use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, Subcommand};
use taskstack_core::config::{self, Config, ConfigOverrides};
use taskstack_core::error::AppError;
use taskstack_core::history::RedoPolicy;

/// Process-level options. Commands themselves are read line by line from stdin.
#[derive(Parser, Debug)]
#[command(name = "taskstack", author, version, about, long_about = None)]
pub struct Cli {
    /// Print `view` output as JSON
    #[arg(long)]
    pub json: bool,

    /// What a new change does to undone states: retain or clear
    #[arg(long, value_name = "POLICY", value_parser = config::parse_redo_policy)]
    pub redo_policy: Option<RedoPolicy>,

    /// Log verbosity: off, error, warn, info, debug or trace
    #[arg(long, value_name = "LEVEL", value_parser = config::parse_log_level)]
    pub log_level: Option<String>,

    /// Override configuration values (format KEY=VALUE)
    #[arg(long = "config-override", value_name = "KEY=VALUE")]
    pub config_override: Vec<String>,
}

impl Cli {
    /// Flag values first, then `--config-override` pairs on top.
    pub fn config(&self) -> Result<Config, AppError> {
        let mut base = Config::default();
        if let Some(policy) = self.redo_policy {
            base.redo_policy = policy;
        }
        if let Some(level) = self.log_level.as_ref() {
            base.log_level = level.clone();
        }

        let overrides = ConfigOverrides::from_raw(&self.config_override)?;
        Ok(config::merge_overrides(&base, &overrides))
    }
}

/// Grammar of a single interactive line.
#[derive(Parser, Debug)]
#[command(name = "taskstack", disable_version_flag = true)]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Add a new task
    ///
    /// Example: add "Buy milk"
    /// Example: add "Call mom" Due: Friday
    Add {
        #[arg(allow_hyphen_values = true)]
        description: String,
        /// Optional `Due: <date>`; anything after the date is ignored
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        rest: Vec<String>,
    },
    /// Mark a task as completed
    ///
    /// Example: complete "Buy milk"
    Complete {
        #[arg(allow_hyphen_values = true)]
        description: String,
    },
    /// Mark a completed task as pending again
    ///
    /// Example: reopen "Buy milk"
    Reopen {
        #[arg(allow_hyphen_values = true)]
        description: String,
    },
    /// Delete every task with this description
    ///
    /// Example: delete "Buy milk"
    Delete {
        #[arg(allow_hyphen_values = true)]
        description: String,
    },
    /// List tasks
    ///
    /// Example: view
    /// Example: view completed
    /// Example: view pending
    View { filter: Option<String> },
    /// Revert the last change
    Undo,
    /// Reapply the last undone change
    Redo,
}

#[derive(Debug, PartialEq, Eq)]
pub enum LineAction {
    Empty,
    Exit,
    Usage(String),
    Run(Command),
}

/// One input line broken into its command word and the tokens after it.
#[derive(Debug, PartialEq, Eq)]
pub struct CommandWords {
    pub verb: String,
    pub args: Vec<String>,
}

impl CommandWords {
    /// Builds the argv handed to clap. Tokens past the ones a command reads
    /// are dropped, so `complete Buy milk` completes `Buy`.
    pub fn into_argv(self) -> Vec<String> {
        let mut args = self.args;
        if let Some(limit) = operand_limit(&self.verb) {
            args.truncate(limit);
        }

        let mut argv = Vec::with_capacity(args.len() + 2);
        argv.push("taskstack".to_string());
        argv.push(self.verb);
        argv.extend(args);
        argv
    }
}

fn operand_limit(verb: &str) -> Option<usize> {
    match verb {
        "complete" | "reopen" | "delete" | "view" => Some(1),
        "undo" | "redo" => Some(0),
        _ => None,
    }
}

pub fn parse_line(line: &str) -> Result<LineAction, AppError> {
    let Some(words) = tokenize(line)? else {
        return Ok(LineAction::Empty);
    };

    match words.verb.to_ascii_lowercase().as_str() {
        "exit" | "quit" => return Ok(LineAction::Exit),
        "help" | "?" => return Ok(LineAction::Usage(usage())),
        _ => {}
    }

    match CommandLine::try_parse_from(words.into_argv()) {
        Ok(parsed) => Ok(LineAction::Run(parsed.command)),
        Err(err) if err.kind() == ErrorKind::DisplayHelp => {
            Ok(LineAction::Usage(err.to_string()))
        }
        Err(err) => Err(malformed(err)),
    }
}

pub fn usage() -> String {
    let mut cmd = CommandLine::command();
    cmd.render_help().to_string()
}

/// Reads the `Due: <date>` suffix of an `add` line.
pub fn due_date(rest: &[String]) -> Option<&str> {
    match rest {
        [marker, date, ..] if marker.eq_ignore_ascii_case("due:") => Some(date.as_str()),
        _ => None,
    }
}

/// Keeps the one-line summary of a clap error.
pub fn malformed(err: clap::Error) -> AppError {
    let rendered = err.render().to_string();
    let summary = rendered
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("invalid command");
    AppError::malformed_command(summary.trim_start_matches("error: "))
}

/// Splits a line on whitespace. Double quotes group words (`""` is an empty
/// token) and, inside quotes, `\"` and `\\` escape a quote or a backslash.
/// Returns `None` for a blank line.
pub fn tokenize(line: &str) -> Result<Option<CommandWords>, AppError> {
    let mut tokens = Vec::new();
    let mut token: Option<String> = None;
    let mut quoted = false;
    let mut chars = line.chars();

    while let Some(ch) = chars.next() {
        match ch {
            '"' => {
                quoted = !quoted;
                token.get_or_insert_with(String::new);
            }
            '\\' if quoted => {
                let current = token.get_or_insert_with(String::new);
                match chars.next() {
                    Some(escaped @ ('"' | '\\')) => current.push(escaped),
                    Some(other) => {
                        current.push('\\');
                        current.push(other);
                    }
                    None => current.push('\\'),
                }
            }
            ch if ch.is_whitespace() && !quoted => tokens.extend(token.take()),
            ch => token.get_or_insert_with(String::new).push(ch),
        }
    }

    if quoted {
        return Err(AppError::malformed_command("unterminated quote in command"));
    }
    tokens.extend(token);

    let mut tokens = tokens.into_iter();
    Ok(tokens.next().map(|verb| CommandWords {
        verb,
        args: tokens.collect(),
    }))
}

#[cfg(test)]
mod tests {
    use super::{Cli, Command, CommandWords, LineAction, due_date, parse_line, tokenize};
    use clap::Parser;
    use taskstack_core::history::RedoPolicy;

    fn run(line: &str) -> Command {
        match parse_line(line).unwrap() {
            LineAction::Run(command) => command,
            other => panic!("unexpected action: {other:?}"),
        }
    }

    fn words(line: &str) -> CommandWords {
        tokenize(line).unwrap().expect("non-blank line")
    }

    #[test]
    fn tokenize_separates_verb_from_quoted_args() {
        let parsed = words(r#"  add "Call mom"   Due: Friday "#);
        assert_eq!(parsed.verb, "add");
        assert_eq!(parsed.args, ["Call mom", "Due:", "Friday"]);
    }

    #[test]
    fn tokenize_handles_escapes_inside_quotes() {
        let parsed = words(r#"add "say \"hi\" to C:\temp\\""#);
        assert_eq!(parsed.args, [r#"say "hi" to C:\temp\"#]);
    }

    #[test]
    fn tokenize_keeps_empty_quoted_token() {
        assert_eq!(words(r#"add """#).args, [""]);
    }

    #[test]
    fn tokenize_blank_line_has_no_words() {
        assert_eq!(tokenize(" \t ").unwrap(), None);
    }

    #[test]
    fn tokenize_rejects_unterminated_quote() {
        let err = tokenize(r#"add "Buy milk"#).unwrap_err();
        assert_eq!(err.code(), "malformed_command");
    }

    #[test]
    fn add_reads_due_suffix() {
        match run("add Report Due: 2024-05-01 ignored") {
            Command::Add { description, rest } => {
                assert_eq!(description, "Report");
                assert_eq!(due_date(&rest), Some("2024-05-01"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn add_without_marker_has_no_due_date() {
        match run("add Buy milk") {
            Command::Add { description, rest } => {
                assert_eq!(description, "Buy");
                assert_eq!(due_date(&rest), None);
            }
            other => panic!("unexpected command: {other:?}"),
        }

        match run("add Report Due:") {
            Command::Add { rest, .. } => assert_eq!(due_date(&rest), None),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn extra_tokens_after_operands_are_ignored() {
        assert_eq!(
            run("complete Buy milk"),
            Command::Complete {
                description: "Buy".to_string()
            }
        );
        assert_eq!(
            run("delete Buy milk now"),
            Command::Delete {
                description: "Buy".to_string()
            }
        );
        assert_eq!(
            run("view completed now"),
            Command::View {
                filter: Some("completed".to_string())
            }
        );
        assert_eq!(run("undo please"), Command::Undo);
        assert_eq!(run("redo it twice"), Command::Redo);
    }

    #[test]
    fn hyphenated_descriptions_are_values() {
        match run("add -x") {
            Command::Add { description, .. } => assert_eq!(description, "-x"),
            other => panic!("unexpected command: {other:?}"),
        }
        match run("add --json Due: soon") {
            Command::Add { description, rest } => {
                assert_eq!(description, "--json");
                assert_eq!(due_date(&rest), Some("soon"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert_eq!(
            run("complete -x"),
            Command::Complete {
                description: "-x".to_string()
            }
        );
    }

    #[test]
    fn missing_description_is_malformed() {
        let err = parse_line("complete").unwrap_err();
        assert_eq!(err.code(), "malformed_command");
    }

    #[test]
    fn unknown_command_is_malformed() {
        let err = parse_line("nope").unwrap_err();
        assert_eq!(err.code(), "malformed_command");
        assert!(err.to_string().contains("nope"));
    }

    #[test]
    fn view_filter_is_optional() {
        assert_eq!(run("view"), Command::View { filter: None });
        assert_eq!(
            run("view completed"),
            Command::View {
                filter: Some("completed".to_string())
            }
        );
    }

    #[test]
    fn control_words_match_on_first_token() {
        assert_eq!(parse_line("   ").unwrap(), LineAction::Empty);
        assert_eq!(parse_line("EXIT").unwrap(), LineAction::Exit);
        assert_eq!(parse_line("exit now").unwrap(), LineAction::Exit);
        assert_eq!(parse_line("quit please").unwrap(), LineAction::Exit);
        assert_eq!(parse_line("undo").unwrap(), LineAction::Run(Command::Undo));
        assert!(matches!(parse_line("?").unwrap(), LineAction::Usage(_)));
        assert!(matches!(parse_line("help add").unwrap(), LineAction::Usage(_)));
        assert!(matches!(
            parse_line("add --help").unwrap(),
            LineAction::Usage(_)
        ));
    }

    #[test]
    fn config_merges_flags_and_overrides() {
        let cli = Cli::try_parse_from([
            "taskstack",
            "--redo-policy",
            "clear",
            "--log-level",
            "debug",
            "--config-override",
            "log_level=warn",
        ])
        .unwrap();

        let config = cli.config().unwrap();
        assert_eq!(config.redo_policy, RedoPolicy::ClearOnRecord);
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn invalid_redo_policy_flag_is_rejected() {
        assert!(Cli::try_parse_from(["taskstack", "--redo-policy", "maybe"]).is_err());
    }

    #[test]
    fn invalid_override_surfaces_from_config() {
        let cli =
            Cli::try_parse_from(["taskstack", "--config-override", "colour=blue"]).unwrap();
        let err = cli.config().unwrap_err();
        assert_eq!(err.code(), "invalid_input");
    }
}
