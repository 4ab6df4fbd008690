//! Per-event attendance statistics

use super::EventAttendance;
use crate::EventId;
use serde::{Deserialize, Serialize};

/// Snapshot of an event's counts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventStatistics {
    pub event_id: EventId,
    pub event_name: String,
    pub capacity: u32,
    /// Every record, cancelled ones included
    pub total_records: usize,
    /// Confirmed seats: registered, checked in or no-show
    pub registered: usize,
    pub checked_in: usize,
    pub no_show: usize,
    pub cancelled: usize,
    pub waitlisted: usize,
    pub available_spots: usize,
    /// One decimal place with a `%` suffix, e.g. `"66.7%"`
    pub attendance_rate: String,
}

impl From<&EventAttendance> for EventStatistics {
    fn from(event: &EventAttendance) -> Self {
        Self {
            event_id: event.event_id,
            event_name: event.event_name.clone(),
            capacity: event.capacity,
            total_records: event.attendees.len(),
            registered: event.registered_count(),
            checked_in: event.checked_in_count(),
            no_show: event.no_show_count(),
            cancelled: event.cancelled_count(),
            waitlisted: event.waitlist_count(),
            available_spots: event.available_spots(),
            attendance_rate: format_rate(event.attendance_rate()),
        }
    }
}

pub(crate) fn format_rate(rate: f64) -> String {
    format!("{:.1}%", rate)
}
