use crate::domain::models::tenant::OrganizationSettings;
use crate::error::AppError;
use chrono::{DateTime, Duration, LocalResult, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Typed view of a tenant's `OrganizationSettings`, parsed once per request.
/// All window checks happen in tenant-local time; only the storage boundary
/// speaks UTC.
#[derive(Debug, Clone)]
pub struct SchedulingPolicy {
    pub tz: Tz,
    pub working_hours_start: NaiveTime,
    pub working_hours_end: NaiveTime,
    pub booking_interval: i64,
    pub advance_booking_days: i64,
    pub cancellation_hours: i64,
}

pub fn parse_time_of_day(raw: &str) -> Result<NaiveTime, AppError> {
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map_err(|_| AppError::Validation(format!("Invalid time of day: {}", raw)))
}

impl SchedulingPolicy {
    pub fn from_settings(settings: &OrganizationSettings) -> Result<Self, AppError> {
        let tz: Tz = settings.timezone.parse().unwrap_or(chrono_tz::UTC);
        let working_hours_start = parse_time_of_day(&settings.working_hours_start)?;
        let working_hours_end = parse_time_of_day(&settings.working_hours_end)?;

        if working_hours_end <= working_hours_start {
            return Err(AppError::Unprocessable(
                "working_hours_end must be after working_hours_start".into(),
            ));
        }
        if settings.booking_interval <= 0 {
            return Err(AppError::Unprocessable("booking_interval must be positive".into()));
        }

        Ok(Self {
            tz,
            working_hours_start,
            working_hours_end,
            booking_interval: settings.booking_interval as i64,
            advance_booking_days: settings.advance_booking_days as i64,
            cancellation_hours: settings.cancellation_hours as i64,
        })
    }

    /// Resolves a local wall-clock literal with the zone's rules for that
    /// date. A nonexistent time (spring-forward gap) is rejected; an
    /// ambiguous one takes the earlier offset.
    pub fn localize_naive(&self, naive: NaiveDateTime) -> Result<DateTime<Utc>, AppError> {
        match self.tz.from_local_datetime(&naive) {
            LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
            LocalResult::Ambiguous(earlier, _) => Ok(earlier.with_timezone(&Utc)),
            LocalResult::None => Err(AppError::Unprocessable(
                "Local time does not exist on that date (DST gap)".into(),
            )),
        }
    }

    /// Accepts RFC 3339 timestamps (converted to UTC) or naive
    /// `YYYY-MM-DDTHH:MM[:SS]` literals interpreted in the tenant timezone.
    pub fn resolve_input(&self, raw: &str) -> Result<DateTime<Utc>, AppError> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Ok(dt.with_timezone(&Utc));
        }
        let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
            .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M"))
            .map_err(|_| AppError::Validation(format!("Invalid timestamp: {}", raw)))?;
        self.localize_naive(naive)
    }

    /// Future start within the advance window, duration on the interval
    /// grid, both endpoints inside working hours on the same local day.
    pub fn validate_booking_window(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<(), AppError> {
        if end <= start {
            return Err(AppError::Unprocessable("end_time must be after start_time".into()));
        }
        if start <= now {
            return Err(AppError::Unprocessable("Bookings must start in the future".into()));
        }
        if start > now + Duration::days(self.advance_booking_days) {
            return Err(AppError::Unprocessable(format!(
                "Bookings are limited to {} days in advance",
                self.advance_booking_days
            )));
        }

        let duration_minutes = (end - start).num_minutes();
        if duration_minutes <= 0 || duration_minutes % self.booking_interval != 0 {
            return Err(AppError::Unprocessable(format!(
                "Duration must be a multiple of {} minutes",
                self.booking_interval
            )));
        }

        let start_local = start.with_timezone(&self.tz);
        let end_local = end.with_timezone(&self.tz);

        if start_local.date_naive() != end_local.date_naive() {
            return Err(AppError::Unprocessable(
                "Booking must start and end on the same day".into(),
            ));
        }
        if start_local.time() < self.working_hours_start || end_local.time() > self.working_hours_end {
            return Err(AppError::Unprocessable("Booking is outside working hours".into()));
        }

        Ok(())
    }

    pub fn validate_cancellation_window(
        &self,
        start: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<(), AppError> {
        if !self.can_cancel(start, now) {
            return Err(AppError::Unprocessable(format!(
                "Cancellation is only allowed up to {} hours before the start",
                self.cancellation_hours
            )));
        }
        Ok(())
    }

    pub fn can_cancel(&self, start: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        if self.cancellation_hours <= 0 {
            return true;
        }
        start >= now + Duration::hours(self.cancellation_hours)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

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

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    #[test]
    fn accepts_slot_inside_working_hours() {
        // 14:00Z is 11:00 in Sao Paulo (-03:00).
        let now = utc(2025, 12, 1, 12, 0);
        let p = policy();
        p.validate_booking_window(utc(2025, 12, 8, 14, 0), utc(2025, 12, 8, 15, 0), now)
            .unwrap();
    }

    #[test]
    fn rejects_outside_working_hours() {
        // 22:00Z is 19:00 local, past the 18:00 close.
        let now = utc(2025, 12, 1, 12, 0);
        let err = policy()
            .validate_booking_window(utc(2025, 12, 8, 22, 0), utc(2025, 12, 8, 23, 0), now)
            .unwrap_err();
        assert!(matches!(err, AppError::Unprocessable(_)));
    }

    #[test]
    fn rejects_non_multiple_duration() {
        let now = utc(2025, 12, 1, 12, 0);
        let err = policy()
            .validate_booking_window(utc(2025, 12, 8, 14, 0), utc(2025, 12, 8, 14, 25), now)
            .unwrap_err();
        assert!(matches!(err, AppError::Unprocessable(_)));
    }

    #[test]
    fn rejects_past_and_beyond_advance_window() {
        let now = utc(2025, 12, 1, 12, 0);
        let p = policy();
        assert!(p
            .validate_booking_window(utc(2025, 11, 30, 14, 0), utc(2025, 11, 30, 15, 0), now)
            .is_err());
        assert!(p
            .validate_booking_window(utc(2026, 1, 15, 14, 0), utc(2026, 1, 15, 15, 0), now)
            .is_err());
    }

    #[test]
    fn cancellation_window_tracks_start() {
        let p = policy();
        let now = utc(2025, 12, 1, 12, 0);
        assert!(p.can_cancel(utc(2025, 12, 8, 14, 0), now));
        assert!(!p.can_cancel(utc(2025, 12, 1, 20, 0), now));
        assert!(p.validate_cancellation_window(utc(2025, 12, 1, 20, 0), now).is_err());
    }

    #[test]
    fn dst_gap_is_rejected() {
        // America/New_York 2025-03-09 02:30 does not exist.
        let p = SchedulingPolicy {
            tz: chrono_tz::America::New_York,
            ..policy()
        };
        let naive = NaiveDate::from_ymd_opt(2025, 3, 9)
            .unwrap()
            .and_hms_opt(2, 30, 0)
            .unwrap();
        assert!(matches!(p.localize_naive(naive), Err(AppError::Unprocessable(_))));
    }

    #[test]
    fn resolve_input_reads_naive_literals_in_tenant_zone() {
        let p = policy();
        let resolved = p.resolve_input("2025-12-08T11:00:00").unwrap();
        assert_eq!(resolved, utc(2025, 12, 8, 14, 0));
        let explicit = p.resolve_input("2025-12-08T14:00:00Z").unwrap();
        assert_eq!(explicit, utc(2025, 12, 8, 14, 0));
    }
}
