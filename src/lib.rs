//! rollcall - In-memory session and event attendance tracking
//!
//! This crate provides the state layer behind an event check-in front end:
//! - Session tracking (current user, registered events, typed session data)
//! - Attendance tracking (rosters, check-in, cancellation, waitlist, statistics)
//! - Change notification for both trackers
//! - Configuration management and a line-oriented console front end
//!
//! # Architecture
//!
//! The two trackers are independent state holders. Every effective mutation
//! fires a synchronous "changed" notification to the subscribed observers,
//! after the mutation has been applied. The presentation layer (here, the
//! `rollcall` console) owns both through an [`AppContext`] and re-renders in
//! response to those notifications.

pub mod attendance;
pub mod config;
pub mod console;
pub mod context;
pub mod notify;
pub mod session;

pub use context::AppContext;

/// Identifier of an event, shared by both trackers
pub type EventId = i64;
