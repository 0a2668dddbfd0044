//! Vaccine recommendation engine.
//!
//! Given one pet's birth date, the schedule catalog, and the pet's
//! vaccination history, derives an ordered worklist of schedule entries
//! annotated with status, due date, and days-until-due. The derivation is
//! a pure function of its inputs and the supplied reference date; nothing
//! is persisted and nothing reads the clock.

use chrono::{Months, NaiveDate};
use shared::{Pet, RecommendationItem, RecommendationResponse, VaccinationRecord, VaccineSchedule, VaccineStatus};
use std::collections::HashSet;
use tracing::info;

use super::calendar::{age_in_weeks, age_weeks_to_text, days_until, format_date, parse_date};
use super::vaccine_matcher::{base_name, names_match};
use super::DomainError;

/// One-time (non-booster) entries are hidden once the pet is older than a
/// year; catch-up dosing for adults is out of scope.
const KITTEN_CUTOFF_WEEKS: i64 = 52;

/// Boosters count as due within 30 days of the target date and overdue
/// once more than 30 days past it.
const DUE_WINDOW_DAYS: i64 = 30;

/// Service deriving per-pet vaccine worklists. Stateless; safe to share.
#[derive(Clone, Default)]
pub struct RecommendationService;

impl RecommendationService {
    pub fn new() -> Self {
        Self
    }

    /// Derive the annotated vaccine worklist for one pet.
    ///
    /// A pet without a birth date yields an empty list with an advisory
    /// message rather than an error; missing data is not fatal. Malformed
    /// stored dates do fail, with `DomainError::InvalidDate`.
    pub fn recommend(
        &self,
        pet: &Pet,
        schedules: &[VaccineSchedule],
        history: &[VaccinationRecord],
        today: NaiveDate,
    ) -> Result<RecommendationResponse, DomainError> {
        let Some(birth_raw) = pet.birth_date.as_deref() else {
            return Ok(RecommendationResponse {
                pet_age_weeks: 0,
                vaccines: Vec::new(),
                active_count: 0,
                completed_count: 0,
                message: Some(
                    "Add a birth date for this pet to calculate its vaccine schedule".to_string(),
                ),
            });
        };

        let birth_date = parse_date(birth_raw)?;
        let pet_age_weeks = age_in_weeks(birth_date, today);

        info!(
            "Deriving recommendations for pet {} ({} weeks old, {} schedule entries, {} records)",
            pet.id,
            pet_age_weeks,
            schedules.len(),
            history.len()
        );

        // Records that explicitly link a schedule entry mark it completed.
        let completed_ids: HashSet<i64> = history.iter().filter_map(|r| r.schedule_id).collect();

        let mut items = Vec::new();
        for schedule in schedules {
            let is_completed = completed_ids.contains(&schedule.id);

            let classified = if schedule.is_booster {
                self.classify_booster(schedule, history, birth_date, pet_age_weeks, today)?
            } else {
                self.classify_one_time(schedule, is_completed, birth_date, pet_age_weeks, today)
            };

            // Suppressed entries are dropped entirely, not flagged.
            let Some((status, due_date, days)) = classified else {
                continue;
            };

            items.push(RecommendationItem {
                schedule: schedule.clone(),
                status,
                due_date: Some(format_date(due_date)),
                days_until_due: Some(days),
                is_completed,
                pet_age_weeks,
                pet_age_text: age_weeks_to_text(pet_age_weeks),
                age_range_text: age_range_text(schedule),
            });
        }

        items.sort_by(|a, b| {
            a.status
                .priority()
                .cmp(&b.status.priority())
                .then(a.schedule.age_weeks_min.cmp(&b.schedule.age_weeks_min))
        });

        // Completed entries always trail the active list, whatever the sort says.
        let (active, completed): (Vec<_>, Vec<_>) = items
            .into_iter()
            .partition(|item| item.status != VaccineStatus::Completed);

        let active_count = active.len();
        let completed_count = completed.len();
        let mut vaccines = active;
        vaccines.extend(completed);

        Ok(RecommendationResponse {
            pet_age_weeks,
            vaccines,
            active_count,
            completed_count,
            message: None,
        })
    }

    /// Classify a one-time, age-windowed entry. Returns None when the entry
    /// should not be shown at all.
    fn classify_one_time(
        &self,
        schedule: &VaccineSchedule,
        is_completed: bool,
        birth_date: NaiveDate,
        pet_age_weeks: i64,
        today: NaiveDate,
    ) -> Option<(VaccineStatus, NaiveDate, i64)> {
        if pet_age_weeks > KITTEN_CUTOFF_WEEKS {
            return None;
        }

        let due_date = birth_date + chrono::Duration::days(schedule.age_weeks_min * 7);
        let days = days_until(due_date, today);

        let status = if is_completed {
            VaccineStatus::Completed
        } else if pet_age_weeks < schedule.age_weeks_min {
            VaccineStatus::Upcoming
        } else if schedule.age_weeks_max.map_or(true, |max| pet_age_weeks <= max) {
            VaccineStatus::Due
        } else {
            VaccineStatus::Overdue
        };

        Some((status, due_date, days))
    }

    /// Classify a recurring booster entry. The next due date comes from the
    /// most recent matching dose plus the recurrence cadence; a pet that has
    /// never received the vaccine is targeted at its first-dose age instead.
    fn classify_booster(
        &self,
        schedule: &VaccineSchedule,
        history: &[VaccinationRecord],
        birth_date: NaiveDate,
        pet_age_weeks: i64,
        today: NaiveDate,
    ) -> Result<Option<(VaccineStatus, NaiveDate, i64)>, DomainError> {
        // Too young for the first dose; not worth surfacing yet.
        if pet_age_weeks < schedule.age_weeks_min {
            return Ok(None);
        }

        let base = base_name(&schedule.vaccine_name);
        let mut related: Vec<(NaiveDate, &VaccinationRecord)> = Vec::new();
        for record in history {
            if names_match(base, &record.vaccine_name) {
                related.push((parse_date(&record.vaccination_date)?, record));
            }
        }
        related.sort_by(|a, b| b.0.cmp(&a.0));

        if let Some(&(last_dose, _)) = related.first() {
            let frequency_years = schedule.frequency_years.unwrap_or(1);
            let next_due = last_dose
                .checked_add_months(Months::new(frequency_years as u32 * 12))
                .unwrap_or(last_dose);
            let days = days_until(next_due, today);

            let status = if days < -DUE_WINDOW_DAYS {
                VaccineStatus::Overdue
            } else if days <= DUE_WINDOW_DAYS {
                VaccineStatus::Due
            } else {
                // More than a month out: nothing to surface.
                return Ok(None);
            };
            Ok(Some((status, next_due, days)))
        } else {
            // Never dosed: target the first-ever dose and always show it.
            let due_date = birth_date + chrono::Duration::days(schedule.age_weeks_min * 7);
            let days = days_until(due_date, today);

            let status = if days < -DUE_WINDOW_DAYS {
                VaccineStatus::Overdue
            } else if days <= 0 {
                VaccineStatus::Due
            } else {
                VaccineStatus::Upcoming
            };
            Ok(Some((status, due_date, days)))
        }
    }
}

/// Display text for an entry's age window: "1+ years" for boosters,
/// otherwise the window endpoints ("6 weeks - 8 weeks", "1 year+").
fn age_range_text(schedule: &VaccineSchedule) -> String {
    if schedule.is_booster {
        return "1+ years".to_string();
    }
    match schedule.age_weeks_max {
        Some(max) => format!(
            "{} - {}",
            age_weeks_to_text(schedule.age_weeks_min),
            age_weeks_to_text(max)
        ),
        None => format!("{}+", age_weeks_to_text(schedule.age_weeks_min)),
    }
}
