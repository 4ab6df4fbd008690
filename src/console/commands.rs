//! Command handling for console commands

use super::render;
use crate::attendance::{AttendanceStatus, EventConfig};
use crate::context::AppContext;
use crate::EventId;
use anyhow::{anyhow, Result};
use chrono::{DateTime, NaiveDate, Utc};

/// Available commands, shown by `help`
pub const COMMANDS: &[(&str, &str)] = &[
    ("login <user-id> [name]", "identify the current user"),
    ("logout", "clear the session"),
    ("whoami", "show the session"),
    ("create <id> <name> <date> [capacity]", "create an event"),
    ("events", "list events"),
    ("register <id> <user-id> <name> <email>", "register an attendee"),
    ("join <id> <email>", "register the current user"),
    ("leave <id>", "cancel the current user's registration"),
    ("checkin <id> <user-id>", "check an attendee in"),
    ("cancel <id> <user-id>", "cancel a registration"),
    ("noshow <id> <user-id>", "mark an attendee as no-show"),
    ("note <id> <user-id> [text]", "set or clear attendee notes"),
    ("attendees <id> [status]", "list attendees"),
    ("stats <id> [--json]", "show event statistics"),
    ("set <key> <value>", "store session data"),
    ("get <key>", "read session data"),
    ("unset <key>", "remove session data"),
    ("help", "show this help"),
    ("quit", "leave the console"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandResult {
    Continue,
    Exit,
}

/// Handle a parsed command, appending rendered output to `out`.
///
/// Rejected tracker operations and usage mistakes are reported in `out`;
/// only unexpected failures (e.g. JSON encoding) are returned as errors.
pub fn handle_command(
    command: &str,
    args: &[String],
    ctx: &mut AppContext,
    out: &mut Vec<String>,
) -> Result<CommandResult> {
    match command {
        "login" => {
            let Some(user_id) = args.first() else {
                out.push("Usage: login <user-id> [name]".to_string());
                return Ok(CommandResult::Continue);
            };
            let name = (args.len() > 1).then(|| args[1..].join(" "));
            // Another user's registrations and data must not carry over
            if ctx.session.user_id().is_some_and(|id| id != user_id) {
                ctx.session.clear_session();
            }
            ctx.session.set_user_id(Some(user_id.as_str()));
            ctx.session.set_user_name(name.as_deref());
            if ctx.session.is_authenticated() {
                out.push(format!("Logged in as {}", user_id));
            } else {
                out.push("Empty user id, session stays anonymous".to_string());
            }
        }
        "logout" => {
            ctx.session.clear_session();
            out.push("Session cleared".to_string());
        }
        "whoami" => {
            out.extend(render::render_session(&ctx.session));
        }
        "create" => {
            if args.len() < 3 || args.len() > 4 {
                out.push("Usage: create <id> <name> <date> [capacity]".to_string());
                return Ok(CommandResult::Continue);
            }
            let event_id = match parse_event_id(&args[0]) {
                Ok(id) => id,
                Err(e) => return report(out, e),
            };
            let date = match parse_date(&args[2]) {
                Ok(date) => date,
                Err(e) => return report(out, e),
            };
            let mut config = EventConfig::new(event_id, args[1].clone(), date);
            if let Some(capacity) = args.get(3) {
                match capacity.parse::<u32>() {
                    Ok(capacity) => config = config.with_capacity(capacity),
                    Err(_) => return report(out, anyhow!("Invalid capacity: {}", capacity)),
                }
            }
            if ctx.attendance.create_event(config) {
                out.push(format!("Created event {}", event_id));
            } else {
                out.push(format!("Event {} already exists", event_id));
            }
        }
        "events" => {
            out.extend(render::render_events(&ctx.attendance.get_all_events()));
        }
        "register" => {
            if args.len() != 4 {
                out.push("Usage: register <id> <user-id> <name> <email>".to_string());
                return Ok(CommandResult::Continue);
            }
            let event_id = match parse_event_id(&args[0]) {
                Ok(id) => id,
                Err(e) => return report(out, e),
            };
            match ctx
                .attendance
                .register_attendee(event_id, &args[1], &args[2], &args[3])
            {
                Ok(status) => out.push(format!("{} is {} for event {}", args[1], status, event_id)),
                Err(e) => out.push(format!("Rejected: {}", e)),
            }
        }
        "join" => {
            if args.len() != 2 {
                out.push("Usage: join <id> <email>".to_string());
                return Ok(CommandResult::Continue);
            }
            let event_id = match parse_event_id(&args[0]) {
                Ok(id) => id,
                Err(e) => return report(out, e),
            };
            let Some(user_id) = current_user(ctx, out) else {
                return Ok(CommandResult::Continue);
            };
            let user_name = ctx.session.user_name().unwrap_or(user_id.as_str()).to_string();
            match ctx
                .attendance
                .register_attendee(event_id, &user_id, &user_name, &args[1])
            {
                Ok(status) => {
                    ctx.session.register_for_event(event_id);
                    out.push(format!("You are {} for event {}", status, event_id));
                }
                Err(e) => out.push(format!("Rejected: {}", e)),
            }
        }
        "leave" => {
            if args.len() != 1 {
                out.push("Usage: leave <id>".to_string());
                return Ok(CommandResult::Continue);
            }
            let event_id = match parse_event_id(&args[0]) {
                Ok(id) => id,
                Err(e) => return report(out, e),
            };
            let Some(user_id) = current_user(ctx, out) else {
                return Ok(CommandResult::Continue);
            };
            match ctx.attendance.cancel_registration(event_id, &user_id) {
                Ok(()) => {
                    // Cancellation hits the first record; a later one may still be active
                    let still_active = ctx
                        .attendance
                        .get_event_attendance(event_id)
                        .is_some_and(|event| event.has_active_record(&user_id));
                    if still_active {
                        out.push(format!(
                            "Could not leave event {}: an earlier cancelled registration shadows the active one",
                            event_id
                        ));
                    } else {
                        ctx.session.unregister_from_event(event_id);
                        out.push(format!("Left event {}", event_id));
                    }
                }
                Err(e) => out.push(format!("Rejected: {}", e)),
            }
        }
        "checkin" | "cancel" | "noshow" => {
            if args.len() != 2 {
                out.push(format!("Usage: {} <id> <user-id>", command));
                return Ok(CommandResult::Continue);
            }
            let event_id = match parse_event_id(&args[0]) {
                Ok(id) => id,
                Err(e) => return report(out, e),
            };
            let user_id = args[1].as_str();
            let (result, done) = match command {
                "checkin" => (
                    ctx.attendance.check_in_attendee(event_id, user_id),
                    "checked in",
                ),
                "cancel" => (
                    ctx.attendance.cancel_registration(event_id, user_id),
                    "cancelled",
                ),
                _ => (ctx.attendance.mark_no_show(event_id, user_id), "marked as no-show"),
            };
            match result {
                Ok(()) => out.push(format!("{} {} for event {}", user_id, done, event_id)),
                Err(e) => out.push(format!("Rejected: {}", e)),
            }
        }
        "note" => {
            if args.len() < 2 {
                out.push("Usage: note <id> <user-id> [text]".to_string());
                return Ok(CommandResult::Continue);
            }
            let event_id = match parse_event_id(&args[0]) {
                Ok(id) => id,
                Err(e) => return report(out, e),
            };
            let notes = Some(args[2..].join(" ")).filter(|n| !n.is_empty());
            match ctx.attendance.set_attendee_notes(event_id, &args[1], notes) {
                Ok(()) => out.push(format!("Notes updated for {}", args[1])),
                Err(e) => out.push(format!("Rejected: {}", e)),
            }
        }
        "attendees" => {
            if args.is_empty() || args.len() > 2 {
                out.push("Usage: attendees <id> [status]".to_string());
                return Ok(CommandResult::Continue);
            }
            let event_id = match parse_event_id(&args[0]) {
                Ok(id) => id,
                Err(e) => return report(out, e),
            };
            let status = match args.get(1).map(|s| s.parse::<AttendanceStatus>()) {
                Some(Ok(status)) => Some(status),
                Some(Err(e)) => return report(out, anyhow!(e)),
                None => None,
            };
            out.extend(render::render_attendees(
                &ctx.attendance.get_attendees(event_id, status),
            ));
        }
        "stats" => {
            let event_id = match args.first().map(|a| parse_event_id(a)) {
                Some(Ok(id)) => id,
                Some(Err(e)) => return report(out, e),
                None => {
                    out.push("Usage: stats <id> [--json]".to_string());
                    return Ok(CommandResult::Continue);
                }
            };
            let json = args.iter().skip(1).any(|a| a == "--json");
            match ctx.attendance.get_event_statistics(event_id) {
                Some(stats) if json => out.push(serde_json::to_string_pretty(&stats)?),
                Some(stats) => out.extend(render::render_statistics(&stats)),
                None => out.push(format!("Event {} not found", event_id)),
            }
        }
        "set" => {
            if args.len() < 2 {
                out.push("Usage: set <key> <value>".to_string());
                return Ok(CommandResult::Continue);
            }
            let key = args[0].clone();
            let value = args[1..].join(" ");
            // Store numbers and booleans with their own type
            if let Ok(n) = value.parse::<i64>() {
                ctx.session.set_session_data(key.clone(), n);
            } else if let Ok(b) = value.parse::<bool>() {
                ctx.session.set_session_data(key.clone(), b);
            } else {
                ctx.session.set_session_data(key.clone(), value);
            }
            out.push(format!("Set {}", key));
        }
        "get" => {
            let Some(key) = args.first() else {
                out.push("Usage: get <key>".to_string());
                return Ok(CommandResult::Continue);
            };
            let session = &ctx.session;
            let value = session
                .try_get_session_data::<i64>(key)
                .map(|n| format!("{} (integer)", n))
                .or_else(|| {
                    session
                        .try_get_session_data::<bool>(key)
                        .map(|b| format!("{} (boolean)", b))
                })
                .or_else(|| {
                    session
                        .try_get_session_data::<String>(key)
                        .map(|s| format!("{} (text)", s))
                });
            match value {
                Some(value) => out.push(format!("{} = {}", key, value)),
                None => out.push(format!("{} is not set", key)),
            }
        }
        "unset" => {
            let Some(key) = args.first() else {
                out.push("Usage: unset <key>".to_string());
                return Ok(CommandResult::Continue);
            };
            if ctx.session.remove_session_data(key) {
                out.push(format!("Removed {}", key));
            } else {
                out.push(format!("{} is not set", key));
            }
        }
        "help" | "?" => {
            out.push("Commands:".to_string());
            for (usage, description) in COMMANDS {
                out.push(format!("  {:<40} {}", usage, description));
            }
        }
        "quit" | "exit" => return Ok(CommandResult::Exit),
        _ => {
            out.push(format!("Unknown command: {}", command));
        }
    }

    Ok(CommandResult::Continue)
}

fn report(out: &mut Vec<String>, error: anyhow::Error) -> Result<CommandResult> {
    out.push(error.to_string());
    Ok(CommandResult::Continue)
}

/// The authenticated user's id, or a message in `out`
fn current_user(ctx: &AppContext, out: &mut Vec<String>) -> Option<String> {
    if !ctx.session.is_authenticated() {
        out.push("Not logged in, use: login <user-id> [name]".to_string());
        return None;
    }
    ctx.session.user_id().map(String::from)
}

fn parse_event_id(arg: &str) -> Result<EventId> {
    arg.parse::<EventId>()
        .map_err(|_| anyhow!("Invalid event id: {}", arg))
}

/// Accepts `YYYY-MM-DD` (midnight UTC) or RFC 3339
pub fn parse_date(arg: &str) -> Result<DateTime<Utc>> {
    if let Ok(date) = NaiveDate::parse_from_str(arg, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }
    DateTime::parse_from_rfc3339(arg)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| anyhow!("Invalid date: {} (expected YYYY-MM-DD or RFC 3339)", arg))
}
