use crate::domain::models::resource::WeekSchedule;
use crate::domain::ports::BookingWindow;
use crate::domain::services::policy::{parse_time_of_day, SchedulingPolicy};
use crate::error::AppError;
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::{max, min};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Slot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

pub fn parse_range(entry: &str) -> Result<(NaiveTime, NaiveTime), AppError> {
    let (start_raw, end_raw) = entry
        .split_once('-')
        .ok_or_else(|| AppError::InternalWithMsg(format!("Invalid availability window: {}", entry)))?;
    let start = parse_time_of_day(start_raw.trim())
        .map_err(|_| AppError::InternalWithMsg(format!("Invalid availability window: {}", entry)))?;
    let end = parse_time_of_day(end_raw.trim())
        .map_err(|_| AppError::InternalWithMsg(format!("Invalid availability window: {}", entry)))?;
    if end <= start {
        return Err(AppError::InternalWithMsg(format!(
            "Invalid availability window: {}",
            entry
        )));
    }
    Ok((start, end))
}

/// Projects the bookable slots of one local calendar day.
///
/// Each schedule window is intersected with the tenant's working hours, cut
/// into `booking_interval` slots aligned to the intersected window's start
/// (tail fragments dropped), converted to UTC with the zone's rules for that
/// date, then filtered against the active bookings and the current instant.
pub fn project_slots(
    schedule: &WeekSchedule,
    date: NaiveDate,
    policy: &SchedulingPolicy,
    bookings: &[BookingWindow],
    now: DateTime<Utc>,
) -> Result<Vec<Slot>, AppError> {
    let Some(windows) = schedule.for_weekday(date.weekday()) else {
        return Ok(Vec::new());
    };

    let interval = Duration::minutes(policy.booking_interval);
    let mut slots: Vec<Slot> = Vec::new();

    for entry in windows {
        let (win_start, win_end) = parse_range(entry)?;

        let start = max(win_start, policy.working_hours_start);
        let end = min(win_end, policy.working_hours_end);
        if end <= start {
            continue;
        }

        let mut cursor = date.and_time(start);
        let window_end = date.and_time(end);

        while cursor + interval <= window_end {
            // A slot whose boundary falls into a DST gap cannot be offered.
            let bounds = policy
                .localize_naive(cursor)
                .and_then(|s| policy.localize_naive(cursor + interval).map(|e| (s, e)));
            if let Ok((slot_start, slot_end)) = bounds {
                let occupied = bookings
                    .iter()
                    .any(|b| b.start_time < slot_end && b.end_time > slot_start);
                if slot_start >= now && !occupied {
                    slots.push(Slot {
                        start: slot_start,
                        end: slot_end,
                    });
                }
            }
            cursor += interval;
        }
    }

    slots.sort_by_key(|s| s.start);
    slots.dedup_by_key(|s| s.start);
    Ok(slots)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::services::policy::SchedulingPolicy;
    use chrono::TimeZone;

    fn policy() -> SchedulingPolicy {
        SchedulingPolicy {
            tz: chrono_tz::America::Sao_Paulo,
            working_hours_start: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            working_hours_end: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
            booking_interval: 30,
            advance_booking_days: 30,
            cancellation_hours: 24,
        }
    }

    fn schedule(windows: &[&str]) -> WeekSchedule {
        WeekSchedule {
            monday: Some(windows.iter().map(|s| s.to_string()).collect()),
            ..Default::default()
        }
    }

    // 2025-12-08 is a Monday; Sao Paulo is UTC-3 on that date.
    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 12, 8).unwrap()
    }

    fn long_before() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn cuts_windows_into_interval_slots() {
        let slots = project_slots(&schedule(&["09:00-11:00"]), monday(), &policy(), &[], long_before()).unwrap();
        assert_eq!(slots.len(), 4);
        assert_eq!(slots[0].start, Utc.with_ymd_and_hms(2025, 12, 8, 12, 0, 0).unwrap());
        assert_eq!(slots[3].end, Utc.with_ymd_and_hms(2025, 12, 8, 14, 0, 0).unwrap());
    }

    #[test]
    fn clamps_to_working_hours_and_drops_tail() {
        // 07:00 start is clamped to 08:00; 12:45 end leaves a 15-minute tail.
        let slots = project_slots(&schedule(&["07:00-12:45"]), monday(), &policy(), &[], long_before()).unwrap();
        assert_eq!(slots.first().unwrap().start, Utc.with_ymd_and_hms(2025, 12, 8, 11, 0, 0).unwrap());
        assert_eq!(slots.last().unwrap().end, Utc.with_ymd_and_hms(2025, 12, 8, 15, 30, 0).unwrap());
    }

    #[test]
    fn closed_day_yields_no_slots() {
        let sched = schedule(&["09:00-11:00"]);
        let tuesday = NaiveDate::from_ymd_opt(2025, 12, 9).unwrap();
        let slots = project_slots(&sched, tuesday, &policy(), &[], long_before()).unwrap();
        assert!(slots.is_empty());
    }

    #[test]
    fn removes_slots_overlapping_bookings() {
        let booked = vec![BookingWindow {
            start_time: Utc.with_ymd_and_hms(2025, 12, 8, 12, 30, 0).unwrap(),
            end_time: Utc.with_ymd_and_hms(2025, 12, 8, 13, 0, 0).unwrap(),
        }];
        let slots = project_slots(&schedule(&["09:00-11:00"]), monday(), &policy(), &booked, long_before()).unwrap();
        assert_eq!(slots.len(), 3);
        assert!(slots.iter().all(|s| {
            s.end <= booked[0].start_time || s.start >= booked[0].end_time
        }));
    }

    #[test]
    fn misaligned_window_starts_on_its_own_grid() {
        let slots = project_slots(&schedule(&["09:15-10:45"]), monday(), &policy(), &[], long_before()).unwrap();
        assert_eq!(slots.len(), 3);
        assert_eq!(slots[0].start, Utc.with_ymd_and_hms(2025, 12, 8, 12, 15, 0).unwrap());
    }

    #[test]
    fn past_slots_are_hidden() {
        let now = Utc.with_ymd_and_hms(2025, 12, 8, 12, 40, 0).unwrap();
        let slots = project_slots(&schedule(&["09:00-11:00"]), monday(), &policy(), &[], now).unwrap();
        assert_eq!(slots.len(), 2);
        assert!(slots.iter().all(|s| s.start >= now));
    }
}
