use serde::{Deserialize, Serialize};
use std::fmt;

/// Represents a pet profile owned by exactly one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pet {
    pub id: i64,
    /// ID of the user who owns this pet
    pub user_id: i64,
    pub name: String,
    pub breed: Option<String>,
    pub gender: Option<String>,
    /// ISO 8601 date (YYYY-MM-DD); recommendations cannot be computed without it
    pub birth_date: Option<String>,
    pub color: Option<String>,
    pub weight: Option<f64>,
    pub microchip_id: Option<String>,
    pub notes: Option<String>,
    /// RFC 3339 timestamp
    pub created_at: String,
    pub updated_at: String,
}

/// A catalog row defining the age window and recurrence rule for one vaccine.
/// Created by an administrator, read-only to the derivation engines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VaccineSchedule {
    pub id: i64,
    pub vaccine_name: String,
    /// Earliest age (in whole weeks) at which this vaccine is given
    pub age_weeks_min: i64,
    /// Latest age in weeks, or None for no upper bound
    pub age_weeks_max: Option<i64>,
    /// Recurring booster rather than a one-time puppy/kitten dose
    pub is_booster: bool,
    /// Recurrence cadence in years; only meaningful for boosters (defaults to 1)
    pub frequency_years: Option<i64>,
    pub description: Option<String>,
}

/// A logged vaccine dose for a pet.
///
/// `vaccine_name` is free text matched against schedule names by containment,
/// not a strict foreign key. Never mutated after insert except `is_read`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VaccinationRecord {
    pub id: i64,
    pub pet_id: i64,
    pub vaccine_name: String,
    pub vaccine_type: Option<String>,
    /// ISO 8601 date the dose was given
    pub vaccination_date: String,
    /// Next due date as set by the recording clinic or user
    pub next_due_date: Option<String>,
    pub veterinarian: Option<String>,
    pub clinic_name: Option<String>,
    pub batch_number: Option<String>,
    pub notes: Option<String>,
    /// Optional link back to the schedule entry this dose fulfilled
    pub schedule_id: Option<i64>,
    /// Notification-read flag, the only field mutated after insert
    pub is_read: bool,
    pub created_at: String,
}

/// Status of a pet's relationship to one schedule entry at a point in time.
/// The four values are mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VaccineStatus {
    Overdue,
    Due,
    Upcoming,
    Completed,
}

impl VaccineStatus {
    /// Sort priority: overdue entries surface first, completed last.
    pub fn priority(&self) -> u8 {
        match self {
            VaccineStatus::Overdue => 1,
            VaccineStatus::Due => 2,
            VaccineStatus::Upcoming => 3,
            VaccineStatus::Completed => 4,
        }
    }
}

impl fmt::Display for VaccineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            VaccineStatus::Overdue => "overdue",
            VaccineStatus::Due => "due",
            VaccineStatus::Upcoming => "upcoming",
            VaccineStatus::Completed => "completed",
        };
        write!(f, "{}", s)
    }
}

/// One schedule entry annotated with the pet's current standing against it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationItem {
    #[serde(flatten)]
    pub schedule: VaccineSchedule,
    pub status: VaccineStatus,
    /// ISO 8601 date the dose is (or was) due
    pub due_date: Option<String>,
    /// Negative means overdue, zero means due today
    pub days_until_due: Option<i64>,
    pub is_completed: bool,
    pub pet_age_weeks: i64,
    /// Human-readable pet age, e.g. "1 year 2 months"
    pub pet_age_text: String,
    /// Human-readable age window for this entry, e.g. "6 weeks - 8 weeks"
    pub age_range_text: String,
}

/// Annotated vaccine worklist for one pet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationResponse {
    pub pet_age_weeks: i64,
    /// Sorted active entries followed by sorted completed entries
    pub vaccines: Vec<RecommendationItem>,
    pub active_count: usize,
    pub completed_count: usize,
    /// Advisory text when recommendations could not be computed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Urgency class for per-pet notification alerts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertType {
    Urgent,
    Warning,
    Info,
}

impl AlertType {
    pub fn priority(&self) -> u8 {
        match self {
            AlertType::Urgent => 0,
            AlertType::Warning => 1,
            AlertType::Info => 2,
        }
    }
}

/// A single urgency-classified vaccine alert for a user's pet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertItem {
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    pub pet_id: i64,
    pub pet_name: String,
    pub vaccine_name: String,
    pub message: String,
    pub due_date: Option<String>,
    /// Days until the due date; informational alerts carry 0 for sorting
    pub days_left: i64,
}

/// Calendar-day classification used by the account-wide notification feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedStatus {
    Overdue,
    Today,
    Upcoming,
    Future,
}

/// One vaccination row joined to its pet, as fetched for the feed: every
/// record across the user's pets that carries a next due date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DueVaccination {
    pub id: i64,
    pub pet_id: i64,
    pub pet_name: String,
    pub vaccine_name: String,
    pub next_due_date: String,
    pub is_read: bool,
}

/// One vaccination row joined to its pet, as surfaced by the feed endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedItem {
    /// Vaccination record ID (used to mark the notification read)
    pub id: i64,
    pub pet_id: i64,
    pub pet_name: String,
    pub vaccine_name: String,
    pub next_due_date: String,
    pub is_read: bool,
    pub status: FeedStatus,
}

/// Account-wide notification feed: at most 50 rows, ascending due date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationFeedResponse {
    pub notifications: Vec<FeedItem>,
    /// Count of returned rows not yet marked read
    pub unread_count: usize,
}

/// Request for creating or updating a pet profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PetRequest {
    pub name: String,
    pub breed: Option<String>,
    pub gender: Option<String>,
    pub birth_date: Option<String>,
    pub color: Option<String>,
    pub weight: Option<f64>,
    pub microchip_id: Option<String>,
    pub notes: Option<String>,
}

/// Request for logging a vaccine dose.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordVaccinationRequest {
    pub vaccine_name: String,
    pub vaccine_type: Option<String>,
    pub vaccination_date: String,
    pub next_due_date: Option<String>,
    pub veterinarian: Option<String>,
    pub clinic_name: Option<String>,
    pub batch_number: Option<String>,
    pub notes: Option<String>,
    pub schedule_id: Option<i64>,
}

/// Request for creating or updating a vaccine schedule entry (admin only).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRequest {
    pub vaccine_name: String,
    pub age_weeks_min: i64,
    pub age_weeks_max: Option<i64>,
    pub is_booster: bool,
    pub frequency_years: Option<i64>,
    pub description: Option<String>,
}

/// Generic success acknowledgement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Acknowledgement carrying the ID of a newly created row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedResponse {
    pub message: String,
    pub id: i64,
}
