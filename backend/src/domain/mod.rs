//! Domain logic for the pet vaccine tracker.
//!
//! Both derivation engines in here are pure: they take pre-fetched record
//! snapshots plus an explicit "today" and return derived worklists or
//! notification lists. Nothing in this module touches the clock or storage.

pub mod calendar;
pub mod notification_service;
pub mod recommendation_service;
pub mod vaccine_matcher;

pub use notification_service::NotificationService;
pub use recommendation_service::RecommendationService;

use thiserror::Error;

/// Errors produced while deriving results from stored records.
#[derive(Debug, Error, PartialEq)]
pub enum DomainError {
    /// A stored date could not be parsed. The engines never coerce bad
    /// dates to "now" or epoch; the caller decides how to surface this.
    #[error("invalid date value: '{0}'")]
    InvalidDate(String),
}
