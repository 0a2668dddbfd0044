//! Vaccine notification aggregation.
//!
//! Two entry points over the same data shapes:
//!
//! * [`NotificationService::aggregate`] walks a user's pets and their
//!   vaccination histories, emitting urgency-classified alerts (overdue,
//!   due soon, recommended by age).
//! * [`NotificationService::feed`] is the account-wide feed: it classifies
//!   vaccination rows already joined to pets by calendar-day distance from
//!   the reference date, without replaying per-pet recommendations.
//!
//! Both are pure single-pass derivations over pre-fetched snapshots; the
//! reference date is always an explicit argument.

use chrono::NaiveDate;
use shared::{
    AlertItem, AlertType, DueVaccination, FeedItem, FeedStatus, NotificationFeedResponse, Pet,
    VaccinationRecord, VaccineSchedule,
};
use tracing::info;

use super::calendar::{age_in_weeks, days_until, parse_date};
use super::DomainError;

/// Records due within this many days produce a "due soon" warning.
const WARNING_WINDOW_DAYS: i64 = 30;

/// The feed drops records whose due date is further in the past than this.
const FEED_PAST_WINDOW_DAYS: i64 = 30;

/// Feed rows due within this many days classify as "upcoming".
const FEED_UPCOMING_DAYS: i64 = 7;

/// The feed returns at most this many rows.
const FEED_LIMIT: usize = 50;

/// Service deriving vaccine notifications. Stateless; safe to share.
#[derive(Clone, Default)]
pub struct NotificationService;

impl NotificationService {
    pub fn new() -> Self {
        Self
    }

    /// Urgency-classified alerts across all of one user's pets.
    ///
    /// Each vaccination record with a next due date contributes an `urgent`
    /// alert once past due or a `warning` within 30 days; records further
    /// out stay silent. Each pet whose current age falls inside a schedule
    /// entry's window and has no record under that exact vaccine name
    /// contributes an `info` alert. Results are sorted by urgency, ties
    /// broken by days left.
    pub fn aggregate(
        &self,
        pets_with_history: &[(Pet, Vec<VaccinationRecord>)],
        schedules: &[VaccineSchedule],
        today: NaiveDate,
    ) -> Result<Vec<AlertItem>, DomainError> {
        let mut alerts = Vec::new();

        for (pet, history) in pets_with_history {
            for record in history {
                let Some(due_raw) = record.next_due_date.as_deref() else {
                    continue;
                };
                if due_raw.is_empty() {
                    continue;
                }
                let days_left = days_until(parse_date(due_raw)?, today);

                if days_left < 0 {
                    alerts.push(AlertItem {
                        alert_type: AlertType::Urgent,
                        pet_id: pet.id,
                        pet_name: pet.name.clone(),
                        vaccine_name: record.vaccine_name.clone(),
                        message: format!("Vaccine overdue by {} days", days_left.abs()),
                        due_date: Some(due_raw.to_string()),
                        days_left,
                    });
                } else if days_left <= WARNING_WINDOW_DAYS {
                    alerts.push(AlertItem {
                        alert_type: AlertType::Warning,
                        pet_id: pet.id,
                        pet_name: pet.name.clone(),
                        vaccine_name: record.vaccine_name.clone(),
                        message: format!("Vaccine due in {} days", days_left),
                        due_date: Some(due_raw.to_string()),
                        days_left,
                    });
                }
            }

            // Age-based recommendations: exact name match only on this path.
            let Some(birth_raw) = pet.birth_date.as_deref() else {
                continue;
            };
            let age_weeks = age_in_weeks(parse_date(birth_raw)?, today);

            for schedule in schedules {
                let in_window = age_weeks >= schedule.age_weeks_min
                    && schedule.age_weeks_max.map_or(true, |max| age_weeks <= max);
                if !in_window {
                    continue;
                }
                let already_logged = history
                    .iter()
                    .any(|v| v.vaccine_name == schedule.vaccine_name);
                if already_logged {
                    continue;
                }
                alerts.push(AlertItem {
                    alert_type: AlertType::Info,
                    pet_id: pet.id,
                    pet_name: pet.name.clone(),
                    vaccine_name: schedule.vaccine_name.clone(),
                    message: format!("Vaccine recommended at this age ({} weeks)", age_weeks),
                    due_date: None,
                    days_left: 0,
                });
            }
        }

        alerts.sort_by(|a, b| {
            a.alert_type
                .priority()
                .cmp(&b.alert_type.priority())
                .then(a.days_left.cmp(&b.days_left))
        });

        info!("Aggregated {} vaccine alerts across {} pets", alerts.len(), pets_with_history.len());
        Ok(alerts)
    }

    /// Account-wide notification feed over joined vaccination rows.
    ///
    /// Keeps rows due no more than 30 days in the past, classifies them by
    /// calendar-day distance (overdue / today / upcoming within 7 days /
    /// future), orders by ascending due date, and caps the result at 50
    /// rows. The unread count covers returned rows only.
    pub fn feed(
        &self,
        rows: Vec<DueVaccination>,
        today: NaiveDate,
    ) -> Result<NotificationFeedResponse, DomainError> {
        let mut items = Vec::new();

        for row in rows {
            // Legacy rows sometimes carry an empty string instead of NULL.
            if row.next_due_date.is_empty() {
                continue;
            }
            let due = parse_date(&row.next_due_date)?;
            let days = days_until(due, today);
            if days < -FEED_PAST_WINDOW_DAYS {
                continue;
            }

            let status = if days < 0 {
                FeedStatus::Overdue
            } else if days == 0 {
                FeedStatus::Today
            } else if days <= FEED_UPCOMING_DAYS {
                FeedStatus::Upcoming
            } else {
                FeedStatus::Future
            };

            items.push((due, FeedItem {
                id: row.id,
                pet_id: row.pet_id,
                pet_name: row.pet_name,
                vaccine_name: row.vaccine_name,
                next_due_date: row.next_due_date,
                is_read: row.is_read,
                status,
            }));
        }

        items.sort_by(|a, b| a.0.cmp(&b.0));
        items.truncate(FEED_LIMIT);

        let notifications: Vec<FeedItem> = items.into_iter().map(|(_, item)| item).collect();
        let unread_count = notifications.iter().filter(|n| !n.is_read).count();

        Ok(NotificationFeedResponse {
            notifications,
            unread_count,
        })
    }
}
