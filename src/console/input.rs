//! Input handling - parse console lines into commands

use anyhow::{bail, Result};
use regex::Regex;
use std::sync::LazyLock;

/// A double-quoted argument or a run of non-whitespace
static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#""([^"]*)"|(\S+)"#).unwrap());

/// Parsed console line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedInput {
    /// Blank line
    Empty,

    /// `# ...` line, ignored
    Comment,

    /// `command arg1 "quoted arg" ...`
    Command { command: String, args: Vec<String> },
}

/// Parse a line of user input
pub fn parse_input(line: &str) -> Result<ParsedInput> {
    let line = line.trim();

    if line.is_empty() {
        return Ok(ParsedInput::Empty);
    }
    if line.starts_with('#') {
        return Ok(ParsedInput::Comment);
    }
    if line.matches('"').count() % 2 != 0 {
        bail!("Unterminated quote in: {}", line);
    }

    let mut tokens = TOKEN_RE.captures_iter(line).filter_map(|caps| {
        caps.get(1)
            .or_else(|| caps.get(2))
            .map(|m| m.as_str().to_string())
    });

    // A line consisting only of `""` has no command word
    let command = match tokens.next() {
        Some(command) if !command.is_empty() => command.to_lowercase(),
        _ => bail!("Missing command in: {}", line),
    };

    Ok(ParsedInput::Command {
        command,
        args: tokens.collect(),
    })
}
