//! Session tracking - current user identity, registrations and session data

mod data;
mod tracker;

pub use data::SessionData;
pub use tracker::SessionTracker;
