//! Integration tests for AttendanceTracker

use chrono::{TimeZone, Utc};
use rollcall::attendance::{AttendanceError, AttendanceStatus, AttendanceTracker, EventConfig};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn launch(event_id: i64, capacity: u32) -> EventConfig {
    let date = Utc.with_ymd_and_hms(2026, 11, 1, 18, 0, 0).unwrap();
    EventConfig::new(event_id, "Launch", date).with_capacity(capacity)
}

/// Tracker plus a counter of change notifications
fn counted_tracker() -> (AttendanceTracker, Arc<AtomicUsize>) {
    let mut tracker = AttendanceTracker::new();
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hits);
    tracker.subscribe(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    (tracker, hits)
}

#[test]
fn test_create_event_is_idempotent() {
    let (mut tracker, hits) = counted_tracker();

    assert!(tracker.create_event(launch(1, 10)));
    assert!(!tracker.create_event(launch(1, 99)));

    assert_eq!(tracker.get_all_events().len(), 1);
    assert_eq!(tracker.get_event_attendance(1).unwrap().capacity, 10);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[test]
fn test_create_event_uses_default_capacity() {
    let date = Utc.with_ymd_and_hms(2026, 11, 1, 0, 0, 0).unwrap();

    let mut tracker = AttendanceTracker::new();
    tracker.create_event(EventConfig::new(1, "Meetup", date));
    assert_eq!(tracker.get_event_attendance(1).unwrap().capacity, 100);

    let mut tracker = AttendanceTracker::with_default_capacity(5);
    tracker.create_event(EventConfig::new(1, "Meetup", date));
    assert_eq!(tracker.get_event_attendance(1).unwrap().capacity, 5);
}

#[test]
fn test_get_all_events_is_a_snapshot() {
    let mut tracker = AttendanceTracker::new();
    tracker.create_event(launch(2, 10));
    tracker.create_event(launch(1, 10));

    let snapshot = tracker.get_all_events();
    tracker.register_attendee(1, "u1", "User One", "u1@example.com").unwrap();

    let ids: Vec<i64> = snapshot.iter().map(|e| e.event_id).collect();
    assert_eq!(ids, vec![1, 2]);
    assert!(snapshot[0].attendees.is_empty());
}

#[test]
fn test_launch_scenario() {
    let (mut tracker, hits) = counted_tracker();
    tracker.create_event(launch(1, 1));

    let status = tracker.register_attendee(1, "u1", "User One", "u1@example.com");
    assert_eq!(status, Ok(AttendanceStatus::Registered));
    assert_eq!(tracker.get_event_attendance(1).unwrap().available_spots(), 0);

    let status = tracker.register_attendee(1, "u2", "User Two", "u2@example.com");
    assert_eq!(status, Ok(AttendanceStatus::Waitlisted));

    tracker.check_in_attendee(1, "u1").unwrap();
    let event = tracker.get_event_attendance(1).unwrap();
    assert_eq!(event.checked_in_count(), 1);
    assert!(event.find_attendee("u1").unwrap().check_in_time.is_some());

    let before = hits.load(Ordering::SeqCst);
    let result = tracker.mark_no_show(1, "u1");
    assert!(matches!(result, Err(AttendanceError::AlreadyCheckedIn { .. })));
    assert_eq!(hits.load(Ordering::SeqCst), before);
}

#[test]
fn test_register_unknown_event() {
    let (mut tracker, hits) = counted_tracker();

    let result = tracker.register_attendee(42, "u1", "User One", "u1@example.com");
    assert_eq!(result, Err(AttendanceError::EventNotFound(42)));
    assert!(result.unwrap_err().to_string().contains("not found"));
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[test]
fn test_duplicate_active_registration_rejected() {
    let mut tracker = AttendanceTracker::new();
    tracker.create_event(launch(1, 10));

    tracker.register_attendee(1, "u1", "User One", "u1@example.com").unwrap();
    let result = tracker.register_attendee(1, "u1", "User One", "u1@example.com");
    assert!(matches!(result, Err(AttendanceError::AlreadyRegistered { .. })));

    // Checked-in records are still active
    tracker.check_in_attendee(1, "u1").unwrap();
    assert!(tracker
        .register_attendee(1, "u1", "User One", "u1@example.com")
        .is_err());
    assert_eq!(tracker.get_attendees(1, None).len(), 1);
}

#[test]
fn test_reregister_after_cancel_appends_record() {
    let mut tracker = AttendanceTracker::new();
    tracker.create_event(launch(1, 10));

    tracker.register_attendee(1, "u1", "User One", "u1@example.com").unwrap();
    tracker.cancel_registration(1, "u1").unwrap();
    let status = tracker.register_attendee(1, "u1", "User One", "u1@example.com");
    assert_eq!(status, Ok(AttendanceStatus::Registered));

    let records = tracker.get_attendees(1, None);
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].status, AttendanceStatus::Cancelled);
    assert_eq!(records[1].status, AttendanceStatus::Registered);
}

#[test]
fn test_operations_act_on_first_matching_record() {
    let mut tracker = AttendanceTracker::new();
    tracker.create_event(launch(1, 10));

    tracker.register_attendee(1, "u1", "User One", "u1@example.com").unwrap();
    tracker.cancel_registration(1, "u1").unwrap();
    tracker.register_attendee(1, "u1", "User One", "u1@example.com").unwrap();

    // The first record is the cancelled one
    let result = tracker.check_in_attendee(1, "u1");
    assert!(matches!(result, Err(AttendanceError::AttendeeCancelled { .. })));

    let records = tracker.get_attendees(1, None);
    assert_eq!(records[1].status, AttendanceStatus::Registered);
}

#[test]
fn test_check_in_rejections() {
    let (mut tracker, hits) = counted_tracker();
    tracker.create_event(launch(1, 10));
    tracker.register_attendee(1, "u1", "User One", "u1@example.com").unwrap();
    tracker.cancel_registration(1, "u1").unwrap();
    let before = hits.load(Ordering::SeqCst);

    assert_eq!(
        tracker.check_in_attendee(9, "u1"),
        Err(AttendanceError::EventNotFound(9))
    );
    assert!(matches!(
        tracker.check_in_attendee(1, "nobody"),
        Err(AttendanceError::AttendeeNotFound { .. })
    ));
    assert!(matches!(
        tracker.check_in_attendee(1, "u1"),
        Err(AttendanceError::AttendeeCancelled { .. })
    ));
    assert_eq!(hits.load(Ordering::SeqCst), before);
}

#[test]
fn test_check_in_waitlisted_attendee() {
    let mut tracker = AttendanceTracker::new();
    tracker.create_event(launch(1, 0));

    let status = tracker.register_attendee(1, "u1", "User One", "u1@example.com");
    assert_eq!(status, Ok(AttendanceStatus::Waitlisted));
    assert!(tracker.check_in_attendee(1, "u1").is_ok());
}

#[test]
fn test_cancel_is_unconditional() {
    let mut tracker = AttendanceTracker::new();
    tracker.create_event(launch(1, 10));
    tracker.register_attendee(1, "u1", "User One", "u1@example.com").unwrap();
    tracker.check_in_attendee(1, "u1").unwrap();

    assert!(tracker.cancel_registration(1, "u1").is_ok());
    assert!(tracker.cancel_registration(1, "u1").is_ok());
    assert_eq!(
        tracker.get_attendees(1, None)[0].status,
        AttendanceStatus::Cancelled
    );
}

#[test]
fn test_cancel_rejections() {
    let mut tracker = AttendanceTracker::new();
    tracker.create_event(launch(1, 10));

    assert_eq!(
        tracker.cancel_registration(2, "u1"),
        Err(AttendanceError::EventNotFound(2))
    );
    assert!(matches!(
        tracker.cancel_registration(1, "u1"),
        Err(AttendanceError::AttendeeNotFound { .. })
    ));
}

#[test]
fn test_cancel_does_not_promote_waitlist() {
    let mut tracker = AttendanceTracker::new();
    tracker.create_event(launch(1, 1));
    tracker.register_attendee(1, "u1", "User One", "u1@example.com").unwrap();
    tracker.register_attendee(1, "u2", "User Two", "u2@example.com").unwrap();

    tracker.cancel_registration(1, "u1").unwrap();

    let event = tracker.get_event_attendance(1).unwrap();
    assert_eq!(event.waitlist_count(), 1);
    assert_eq!(event.find_attendee("u2").unwrap().status, AttendanceStatus::Waitlisted);
    // The waitlisted record still occupies the only seat
    assert_eq!(event.available_spots(), 0);
}

#[test]
fn test_cancel_frees_a_spot() {
    let mut tracker = AttendanceTracker::new();
    tracker.create_event(launch(1, 1));
    tracker.register_attendee(1, "u1", "User One", "u1@example.com").unwrap();
    tracker.cancel_registration(1, "u1").unwrap();

    assert_eq!(tracker.get_event_attendance(1).unwrap().available_spots(), 1);
    let status = tracker.register_attendee(1, "u2", "User Two", "u2@example.com");
    assert_eq!(status, Ok(AttendanceStatus::Registered));
}

#[test]
fn test_mark_no_show() {
    let (mut tracker, hits) = counted_tracker();
    tracker.create_event(launch(1, 10));
    tracker.register_attendee(1, "u1", "User One", "u1@example.com").unwrap();
    let before = hits.load(Ordering::SeqCst);

    tracker.mark_no_show(1, "u1").unwrap();
    assert_eq!(hits.load(Ordering::SeqCst), before + 1);
    assert_eq!(
        tracker.get_attendees(1, None)[0].status,
        AttendanceStatus::NoShow
    );

    assert_eq!(
        tracker.mark_no_show(3, "u1"),
        Err(AttendanceError::EventNotFound(3))
    );
    assert!(matches!(
        tracker.mark_no_show(1, "u9"),
        Err(AttendanceError::AttendeeNotFound { .. })
    ));
}

#[test]
fn test_no_show_after_reregister_keeps_one_active_record() {
    let (mut tracker, hits) = counted_tracker();
    tracker.create_event(launch(1, 1));

    tracker.register_attendee(1, "u1", "User One", "u1@example.com").unwrap();
    tracker.cancel_registration(1, "u1").unwrap();
    tracker.register_attendee(1, "u1", "User One", "u1@example.com").unwrap();
    let before = hits.load(Ordering::SeqCst);

    // The first record is the cancelled one and must stay inactive
    let result = tracker.mark_no_show(1, "u1");
    assert!(matches!(result, Err(AttendanceError::AttendeeCancelled { .. })));
    assert_eq!(hits.load(Ordering::SeqCst), before);

    let event = tracker.get_event_attendance(1).unwrap();
    let statuses: Vec<AttendanceStatus> = event.attendees.iter().map(|a| a.status).collect();
    assert_eq!(
        statuses,
        vec![AttendanceStatus::Cancelled, AttendanceStatus::Registered]
    );
    assert_eq!(event.active_count(), 1);
    assert_eq!(event.available_spots(), 0);
}

#[test]
fn test_set_attendee_notes() {
    let mut tracker = AttendanceTracker::new();
    tracker.create_event(launch(1, 10));
    tracker.register_attendee(1, "u1", "User One", "u1@example.com").unwrap();

    tracker
        .set_attendee_notes(1, "u1", Some("vegetarian".to_string()))
        .unwrap();
    assert_eq!(
        tracker.get_attendees(1, None)[0].notes.as_deref(),
        Some("vegetarian")
    );

    tracker.set_attendee_notes(1, "u1", None).unwrap();
    assert!(tracker.get_attendees(1, None)[0].notes.is_none());

    assert!(tracker.set_attendee_notes(1, "u2", None).is_err());
}

#[test]
fn test_get_attendees_filter_and_order() {
    let mut tracker = AttendanceTracker::new();
    tracker.create_event(launch(1, 2));
    for user in ["a", "b", "c", "d"] {
        tracker
            .register_attendee(1, user, user, &format!("{}@example.com", user))
            .unwrap();
    }

    let all: Vec<String> = tracker
        .get_attendees(1, None)
        .into_iter()
        .map(|a| a.user_id)
        .collect();
    assert_eq!(all, vec!["a", "b", "c", "d"]);

    let waitlisted: Vec<String> = tracker
        .get_attendees(1, Some(AttendanceStatus::Waitlisted))
        .into_iter()
        .map(|a| a.user_id)
        .collect();
    assert_eq!(waitlisted, vec!["c", "d"]);

    assert!(tracker.get_attendees(1, Some(AttendanceStatus::NoShow)).is_empty());
    assert!(tracker.get_attendees(7, None).is_empty());
}

#[test]
fn test_event_statistics() {
    let mut tracker = AttendanceTracker::new();
    tracker.create_event(launch(1, 3));
    for user in ["a", "b", "c", "d", "e"] {
        tracker
            .register_attendee(1, user, user, &format!("{}@example.com", user))
            .unwrap();
    }
    tracker.check_in_attendee(1, "a").unwrap();
    tracker.check_in_attendee(1, "b").unwrap();
    tracker.mark_no_show(1, "c").unwrap();
    tracker.cancel_registration(1, "e").unwrap();

    let stats = tracker.get_event_statistics(1).unwrap();
    assert_eq!(stats.event_name, "Launch");
    assert_eq!(stats.capacity, 3);
    assert_eq!(stats.total_records, 5);
    assert_eq!(stats.registered, 3);
    assert_eq!(stats.checked_in, 2);
    assert_eq!(stats.no_show, 1);
    assert_eq!(stats.cancelled, 1);
    assert_eq!(stats.waitlisted, 1);
    assert_eq!(stats.available_spots, 0);
    assert_eq!(stats.attendance_rate, "66.7%");
}

#[test]
fn test_event_statistics_empty_and_unknown() {
    let mut tracker = AttendanceTracker::new();
    tracker.create_event(launch(1, 3));

    let stats = tracker.get_event_statistics(1).unwrap();
    assert_eq!(stats.attendance_rate, "0.0%");
    assert_eq!(stats.available_spots, 3);

    assert!(tracker.get_event_statistics(2).is_none());
}

#[test]
fn test_unsubscribe_stops_notifications() {
    let (mut tracker, hits) = counted_tracker();
    let extra = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&extra);
    let subscription = tracker.subscribe(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    tracker.create_event(launch(1, 1));
    assert!(tracker.unsubscribe(&subscription));
    tracker.create_event(launch(2, 1));

    assert_eq!(extra.load(Ordering::SeqCst), 1);
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}
