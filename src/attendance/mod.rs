//! Attendance tracking - event rosters, check-in, cancellation, waitlist

mod stats;
mod tracker;

pub use stats::EventStatistics;
pub use tracker::AttendanceTracker;

use crate::EventId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Capacity used when neither the event nor the configuration sets one
pub const DEFAULT_CAPACITY: u32 = 100;

/// Why an attendance operation was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttendanceError {
    #[error("Event {0} not found")]
    EventNotFound(EventId),

    #[error("No attendee '{user_id}' for event {event_id}")]
    AttendeeNotFound { event_id: EventId, user_id: String },

    #[error("'{user_id}' already has an active registration for event {event_id}")]
    AlreadyRegistered { event_id: EventId, user_id: String },

    #[error("Registration of '{user_id}' for event {event_id} is cancelled")]
    AttendeeCancelled { event_id: EventId, user_id: String },

    #[error("'{user_id}' is already checked in for event {event_id}")]
    AlreadyCheckedIn { event_id: EventId, user_id: String },
}

/// Status of one attendee record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttendanceStatus {
    /// Holds a seat, not yet checked in
    Registered,
    /// Arrived at the event
    CheckedIn,
    /// Held a seat but did not show up
    NoShow,
    /// Withdrew; the seat is free again
    Cancelled,
    /// Registered after capacity was exhausted
    Waitlisted,
}

impl AttendanceStatus {
    pub const ALL: [AttendanceStatus; 5] = [
        AttendanceStatus::Registered,
        AttendanceStatus::CheckedIn,
        AttendanceStatus::NoShow,
        AttendanceStatus::Cancelled,
        AttendanceStatus::Waitlisted,
    ];

    /// Every status except `Cancelled` counts against capacity
    pub fn is_active(&self) -> bool {
        !matches!(self, AttendanceStatus::Cancelled)
    }

    /// Statuses that occupy a confirmed seat
    pub fn is_confirmed(&self) -> bool {
        matches!(
            self,
            AttendanceStatus::Registered | AttendanceStatus::CheckedIn | AttendanceStatus::NoShow
        )
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AttendanceStatus::Registered => "registered",
            AttendanceStatus::CheckedIn => "checked-in",
            AttendanceStatus::NoShow => "no-show",
            AttendanceStatus::Cancelled => "cancelled",
            AttendanceStatus::Waitlisted => "waitlisted",
        };
        f.write_str(name)
    }
}

impl FromStr for AttendanceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "registered" => Ok(AttendanceStatus::Registered),
            "checked-in" | "checkedin" => Ok(AttendanceStatus::CheckedIn),
            "no-show" | "noshow" => Ok(AttendanceStatus::NoShow),
            "cancelled" => Ok(AttendanceStatus::Cancelled),
            "waitlisted" => Ok(AttendanceStatus::Waitlisted),
            other => Err(format!("unknown attendance status '{}'", other)),
        }
    }
}

/// One registration attempt of a user for an event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendeeRecord {
    pub user_id: String,
    pub user_name: String,
    pub email: String,
    pub registration_date: DateTime<Utc>,
    pub check_in_time: Option<DateTime<Utc>>,
    pub status: AttendanceStatus,
    pub notes: Option<String>,
}

/// Parameters for creating an event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventConfig {
    pub event_id: EventId,

    pub name: String,

    pub date: DateTime<Utc>,

    /// Seats available (defaults to the tracker's default capacity)
    pub capacity: Option<u32>,
}

impl EventConfig {
    pub fn new(event_id: EventId, name: impl Into<String>, date: DateTime<Utc>) -> Self {
        Self {
            event_id,
            name: name.into(),
            date,
            capacity: None,
        }
    }

    pub fn with_capacity(mut self, capacity: u32) -> Self {
        self.capacity = Some(capacity);
        self
    }
}

/// Roster of one event. All counts are derived from `attendees`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventAttendance {
    pub event_id: EventId,
    pub event_name: String,
    pub event_date: DateTime<Utc>,
    pub capacity: u32,
    /// In registration order
    pub attendees: Vec<AttendeeRecord>,
}

impl EventAttendance {
    fn count(&self, pred: impl Fn(AttendanceStatus) -> bool) -> usize {
        self.attendees.iter().filter(|a| pred(a.status)).count()
    }

    /// Records that are not cancelled
    pub fn active_count(&self) -> usize {
        self.count(|s| s.is_active())
    }

    /// Records holding a confirmed seat (registered, checked in or no-show)
    pub fn registered_count(&self) -> usize {
        self.count(|s| s.is_confirmed())
    }

    pub fn checked_in_count(&self) -> usize {
        self.count(|s| s == AttendanceStatus::CheckedIn)
    }

    pub fn no_show_count(&self) -> usize {
        self.count(|s| s == AttendanceStatus::NoShow)
    }

    pub fn cancelled_count(&self) -> usize {
        self.count(|s| s == AttendanceStatus::Cancelled)
    }

    pub fn waitlist_count(&self) -> usize {
        self.count(|s| s == AttendanceStatus::Waitlisted)
    }

    pub fn available_spots(&self) -> usize {
        (self.capacity as usize).saturating_sub(self.active_count())
    }

    /// Percentage of confirmed seats that checked in; 0 without registrations
    pub fn attendance_rate(&self) -> f64 {
        let registered = self.registered_count();
        if registered == 0 {
            return 0.0;
        }
        self.checked_in_count() as f64 / registered as f64 * 100.0
    }

    /// First record of the user, in registration order
    pub fn find_attendee(&self, user_id: &str) -> Option<&AttendeeRecord> {
        self.attendees.iter().find(|a| a.user_id == user_id)
    }

    fn find_attendee_mut(&mut self, user_id: &str) -> Option<&mut AttendeeRecord> {
        self.attendees.iter_mut().find(|a| a.user_id == user_id)
    }

    /// Whether the user currently holds a non-cancelled record
    pub fn has_active_record(&self, user_id: &str) -> bool {
        self.attendees
            .iter()
            .any(|a| a.user_id == user_id && a.status.is_active())
    }
}
