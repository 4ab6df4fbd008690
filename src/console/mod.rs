//! Console - line-oriented front end over the trackers
//!
//! The console plays the presentation layer: it turns lines into tracker
//! calls, renders the results, and listens to both trackers' change
//! notifications through a tokio channel.

mod commands;
mod input;
mod render;

pub use commands::{parse_date, CommandResult, COMMANDS};
pub use input::{parse_input, ParsedInput};

use crate::config::{Config, ConsoleConfig};
use crate::context::AppContext;
use anyhow::Result;
use chrono::Duration;
use std::fmt;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;

/// Which tracker reported a change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeSource {
    Session,
    Attendance,
}

impl fmt::Display for ChangeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeSource::Session => f.write_str("session"),
            ChangeSource::Attendance => f.write_str("attendance"),
        }
    }
}

/// Console state for one session
pub struct Console {
    ctx: AppContext,

    settings: ConsoleConfig,

    /// Change notifications forwarded by the tracker observers
    changes: mpsc::UnboundedReceiver<ChangeSource>,
}

impl Console {
    /// Start a session and subscribe to both trackers
    pub fn new(config: &Config) -> Self {
        let mut ctx = AppContext::start(config);
        let (change_tx, changes) = mpsc::unbounded_channel();

        let session_tx = change_tx.clone();
        ctx.session.subscribe(move || {
            let _ = session_tx.send(ChangeSource::Session);
        });
        ctx.attendance.subscribe(move || {
            let _ = change_tx.send(ChangeSource::Attendance);
        });

        Self {
            ctx,
            settings: config.console.clone(),
            changes,
        }
    }

    pub fn context(&self) -> &AppContext {
        &self.ctx
    }

    /// Execute one line and return its rendered output.
    ///
    /// Input mistakes are rendered, not returned as errors.
    pub fn execute_line(&mut self, line: &str) -> Result<(Vec<String>, CommandResult)> {
        let mut out = Vec::new();

        let result = match parse_input(line) {
            Ok(ParsedInput::Command { command, args }) => {
                tracing::debug!(command = %command, ?args, "Executing command");
                commands::handle_command(&command, &args, &mut self.ctx, &mut out)?
            }
            Ok(ParsedInput::Empty | ParsedInput::Comment) => CommandResult::Continue,
            Err(e) => {
                out.push(e.to_string());
                CommandResult::Continue
            }
        };

        for source in self.drain_changes() {
            if self.settings.echo_notifications {
                out.push(format!("~ {} changed", source));
            }
        }

        Ok((out, result))
    }

    /// Pending change notifications, oldest first
    fn drain_changes(&mut self) -> Vec<ChangeSource> {
        let mut drained = Vec::new();
        while let Ok(source) = self.changes.try_recv() {
            drained.push(source);
        }
        drained
    }

    /// Drive the console from `reader` until end of input or `quit`.
    ///
    /// Consumes the console and ends its session, returning the session
    /// duration.
    pub async fn run<R, W>(mut self, reader: R, mut writer: W, interactive: bool) -> Result<Duration>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();

        loop {
            if interactive {
                writer.write_all(self.settings.prompt.as_bytes()).await?;
                writer.flush().await?;
            }

            let Some(line) = lines.next_line().await? else {
                break;
            };

            let (out, result) = self.execute_line(&line)?;
            for text in out {
                writer.write_all(text.as_bytes()).await?;
                writer.write_all(b"\n").await?;
            }
            writer.flush().await?;

            if result == CommandResult::Exit {
                break;
            }
        }

        Ok(self.ctx.end())
    }
}
