//! Spaced-review scheduling over the question repository.
//!
//! All reminders fire at the start of a day: the target is local midnight of
//! today plus the requested interval, stored as a UTC instant. Invalid
//! input is silently ignored rather than surfaced as an error.

use anyhow::Result;
use chrono::{DateTime, Days, Local, NaiveDate, Utc};
use log::info;

use crate::questions::QuestionRepository;

pub struct ReviewScheduler {
    questions: QuestionRepository,
}

impl ReviewScheduler {
    pub fn new(questions: QuestionRepository) -> Self {
        Self { questions }
    }

    /// Schedules a reminder `days` from today at local midnight. Negative
    /// day counts are silently ignored; zero yields an immediately-due
    /// reminder.
    pub fn set_review(&self, id: &str, days: i64) -> Result<()> {
        if days < 0 {
            return Ok(());
        }

        let Some(target) = midnight_after(Local::now().date_naive(), days as u64) else {
            return Ok(());
        };

        let updated = self.questions.update(id, |question| {
            question.review_date = Some(target);
        })?;

        if updated {
            info!("Review for {id} scheduled at {target}");
        }
        Ok(())
    }

    /// Custom-interval variant taking the host's raw text input. Anything
    /// that does not parse to a strictly positive day count is silently
    /// ignored.
    pub fn set_custom_review(&self, id: &str, input: &str) -> Result<()> {
        match parse_custom_interval(input) {
            Some(days) => self.set_review(id, days),
            None => Ok(()),
        }
    }
}

/// Local midnight of `today + days`, expressed as a UTC instant. `None` only
/// on calendar overflow or a midnight erased by a DST transition; ambiguous
/// midnights resolve to the earliest valid instant.
pub fn midnight_after(today: NaiveDate, days: u64) -> Option<DateTime<Utc>> {
    let date = today.checked_add_days(Days::new(days))?;
    date.and_hms_opt(0, 0, 0)?
        .and_local_timezone(Local)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Parses the custom review interval: trimmed integer, strictly positive.
pub fn parse_custom_interval(input: &str) -> Option<i64> {
    input.trim().parse::<i64>().ok().filter(|days| *days > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::NaiveTime;
    use std::sync::Arc;

    fn scheduler() -> (QuestionRepository, ReviewScheduler) {
        let store = Arc::new(MemoryStore::new());
        let repo = QuestionRepository::open(store).expect("open");
        (repo.clone(), ReviewScheduler::new(repo))
    }

    #[test]
    fn midnight_after_lands_on_local_midnight() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 20).unwrap();
        let target = midnight_after(date, 7).expect("valid date");

        let local = target.with_timezone(&Local);
        assert_eq!(
            local.date_naive(),
            NaiveDate::from_ymd_opt(2024, 5, 27).unwrap()
        );
        assert_eq!(local.time(), NaiveTime::MIN);
    }

    #[test]
    fn schedules_local_midnight_days_ahead() {
        let (repo, scheduler) = scheduler();
        let id = repo.all()[0].id.clone();

        let before = Local::now().date_naive();
        scheduler.set_review(&id, 7).expect("set review");
        let after = Local::now().date_naive();

        let review_date = repo.all()[0].review_date.expect("scheduled");
        let local = review_date.with_timezone(&Local);
        assert_eq!(local.time(), NaiveTime::MIN);
        assert!([before, after]
            .iter()
            .any(|today| local.date_naive() == *today + Days::new(7)));
    }

    #[test]
    fn negative_day_counts_are_ignored() {
        let (repo, scheduler) = scheduler();
        let id = repo.all()[0].id.clone();

        scheduler.set_review(&id, -1).expect("set review");

        assert_eq!(repo.all()[0].review_date, None);
    }

    #[test]
    fn zero_days_is_due_immediately() {
        let (repo, scheduler) = scheduler();
        let id = repo.all()[0].id.clone();

        scheduler.set_review(&id, 0).expect("set review");

        assert!(repo.all()[0].is_due(Utc::now()));
    }

    #[test]
    fn custom_interval_parses_strict_positive_integers() {
        assert_eq!(parse_custom_interval("7"), Some(7));
        assert_eq!(parse_custom_interval(" 14 "), Some(14));
        assert_eq!(parse_custom_interval("0"), None);
        assert_eq!(parse_custom_interval("-3"), None);
        assert_eq!(parse_custom_interval("weekly"), None);
        assert_eq!(parse_custom_interval(""), None);
    }

    #[test]
    fn custom_review_silently_ignores_invalid_input() {
        let (repo, scheduler) = scheduler();
        let id = repo.all()[0].id.clone();

        scheduler.set_custom_review(&id, "weekly").expect("custom");
        scheduler.set_custom_review(&id, "0").expect("custom");
        scheduler.set_custom_review(&id, "-2").expect("custom");
        assert_eq!(repo.all()[0].review_date, None);

        scheduler.set_custom_review(&id, "3").expect("custom");
        assert!(repo.all()[0].review_date.is_some());
    }
}
