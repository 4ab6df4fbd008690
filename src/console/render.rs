//! Plain-text rendering of tracker state

use crate::attendance::{AttendeeRecord, EventAttendance, EventStatistics};
use crate::session::SessionTracker;

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

/// One line per event
pub fn render_events(events: &[EventAttendance]) -> Vec<String> {
    if events.is_empty() {
        return vec!["No events".to_string()];
    }

    events
        .iter()
        .map(|e| {
            format!(
                "[{}] {} on {} - {}/{} seats taken, {} waitlisted",
                e.event_id,
                e.event_name,
                e.event_date.format("%Y-%m-%d"),
                e.active_count() - e.waitlist_count(),
                e.capacity,
                e.waitlist_count()
            )
        })
        .collect()
}

/// Attendee roster in registration order
pub fn render_attendees(attendees: &[AttendeeRecord]) -> Vec<String> {
    if attendees.is_empty() {
        return vec!["No attendees".to_string()];
    }

    attendees
        .iter()
        .enumerate()
        .map(|(i, a)| {
            let mut line = format!(
                "{:>3}. {:<12} {:<20} {:<28} {:<11} registered {}",
                i + 1,
                a.user_id,
                a.user_name,
                a.email,
                a.status.to_string(),
                a.registration_date.format(DATE_FORMAT)
            );
            if let Some(time) = a.check_in_time {
                line.push_str(&format!(", checked in {}", time.format(DATE_FORMAT)));
            }
            if let Some(notes) = &a.notes {
                line.push_str(&format!(" ({})", notes));
            }
            line
        })
        .collect()
}

pub fn render_statistics(stats: &EventStatistics) -> Vec<String> {
    vec![
        format!("Event {}: {}", stats.event_id, stats.event_name),
        format!("  Capacity:        {}", stats.capacity),
        format!("  Registered:      {}", stats.registered),
        format!("  Checked in:      {}", stats.checked_in),
        format!("  No-show:         {}", stats.no_show),
        format!("  Cancelled:       {}", stats.cancelled),
        format!("  Waitlisted:      {}", stats.waitlisted),
        format!("  Available spots: {}", stats.available_spots),
        format!("  Attendance rate: {}", stats.attendance_rate),
    ]
}

pub fn render_session(session: &SessionTracker) -> Vec<String> {
    let user = match (session.user_id(), session.user_name()) {
        (Some(id), Some(name)) if session.is_authenticated() => format!("{} ({})", id, name),
        (Some(id), None) if session.is_authenticated() => id.to_string(),
        _ => "anonymous".to_string(),
    };

    let events = session.registered_event_ids();
    let events = if events.is_empty() {
        "none".to_string()
    } else {
        events
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    };

    vec![
        format!("User: {}", user),
        format!("Registered events: {}", events),
        format!(
            "Session data keys: {}",
            session.session_data_keys().join(", ")
        ),
        format!(
            "Session started {} ({}s ago)",
            session.session_start_time().format(DATE_FORMAT),
            session.session_duration().num_seconds()
        ),
    ]
}
