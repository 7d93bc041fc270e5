use crate::domain::models::booking::{frequency, RecurringPattern};
use crate::error::AppError;
use chrono::{DateTime, Datelike, Duration, Months, Utc};

/// Hard cap on expansion when the pattern carries no end_date.
pub const MAX_OCCURRENCES: usize = 365;

pub fn validate_pattern(pattern: &RecurringPattern) -> Result<(), AppError> {
    if !frequency::ALL.contains(&pattern.frequency.as_str()) {
        return Err(AppError::Unprocessable(format!(
            "Invalid frequency: {}. Must be daily, weekly or monthly",
            pattern.frequency
        )));
    }
    if pattern.interval < 1 || pattern.interval > 52 {
        return Err(AppError::Unprocessable(format!(
            "Interval must be between 1 and 52, got {}",
            pattern.interval
        )));
    }
    if let Some(days) = &pattern.days_of_week {
        if days.is_empty() || days.iter().any(|d| *d > 6) {
            return Err(AppError::Unprocessable(
                "days_of_week must contain values between 0 (Monday) and 6 (Sunday)".into(),
            ));
        }
    }
    Ok(())
}

/// Expands a pattern into the full occurrence list, first occurrence
/// included. Pure: callers gate and persist the result as one batch.
pub fn expand(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    pattern: &RecurringPattern,
) -> Result<Vec<(DateTime<Utc>, DateTime<Utc>)>, AppError> {
    validate_pattern(pattern)?;

    let duration = end - start;
    let interval = pattern.interval as i64;
    let days_of_week = pattern.days_of_week.as_deref().filter(|_| pattern.frequency == frequency::WEEKLY);

    let mut occurrences = Vec::new();
    let mut current = start;
    let max_iterations = if pattern.end_date.is_none() { MAX_OCCURRENCES } else { 1000 };

    for _ in 0..max_iterations {
        if let Some(end_date) = pattern.end_date {
            if current > end_date {
                break;
            }
        }

        match days_of_week {
            Some(days) => {
                let weekday = current.weekday().num_days_from_monday() as u8;
                if days.contains(&weekday) {
                    occurrences.push((current, current + duration));
                }
            }
            None => occurrences.push((current, current + duration)),
        }
        if pattern.end_date.is_none() && occurrences.len() >= MAX_OCCURRENCES {
            break;
        }

        current = match pattern.frequency.as_str() {
            frequency::DAILY => current + Duration::days(interval),
            frequency::WEEKLY => match days_of_week {
                Some(days) => next_weekday_occurrence(current, days, interval),
                None => current + Duration::weeks(interval),
            },
            frequency::MONTHLY => current
                .checked_add_months(Months::new(pattern.interval))
                .ok_or_else(|| AppError::Unprocessable("Recurrence overflows the calendar".into()))?,
            _ => unreachable!("validated above"),
        };
    }

    Ok(occurrences)
}

/// Weekly pattern with explicit days: advance to the next listed day, jumping
/// `interval - 1` extra weeks when wrapping into a new week.
fn next_weekday_occurrence(current: DateTime<Utc>, days: &[u8], interval: i64) -> DateTime<Utc> {
    let current_weekday = current.weekday().num_days_from_monday() as i64;
    let mut sorted: Vec<i64> = days.iter().map(|d| *d as i64).collect();
    sorted.sort_unstable();

    for day in &sorted {
        if *day > current_weekday {
            return current + Duration::days(day - current_weekday);
        }
    }

    let days_until_next_week = 7 - current_weekday + sorted[0];
    let weeks_to_add = if interval > 1 { interval - 1 } else { 0 };
    current + Duration::days(days_until_next_week + weeks_to_add * 7)
}
