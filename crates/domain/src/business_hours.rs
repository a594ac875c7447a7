// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Business-hours predicate used to pick an order's initial status.
//!
//! ## Invariants
//!
//! - The window is a wall-clock interval in the declared timezone
//! - The opening time is inclusive, the closing time exclusive
//! - A window whose closing time precedes its opening time wraps midnight
//! - Equal opening and closing times mean the business never closes
//! - The predicate is pure: the caller supplies the instant

use crate::error::DomainError;
use crate::status::OrderStatus;
use chrono::{NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use time::OffsetDateTime;

/// A daily operating window in a declared timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusinessHours {
    timezone: Tz,
    opens_at: NaiveTime,
    closes_at: NaiveTime,
}

impl BusinessHours {
    /// Creates a window from an IANA timezone name and `HH:MM` times.
    ///
    /// # Errors
    ///
    /// Returns an error if the timezone is unknown or a time cannot be parsed.
    pub fn new(timezone: &str, opens_at: &str, closes_at: &str) -> Result<Self, DomainError> {
        let tz: Tz = timezone
            .parse()
            .map_err(|_| DomainError::InvalidTimezone(timezone.to_string()))?;
        Ok(Self {
            timezone: tz,
            opens_at: parse_time_of_day(opens_at)?,
            closes_at: parse_time_of_day(closes_at)?,
        })
    }

    /// The declared timezone.
    #[must_use]
    pub const fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Returns true if `at` falls inside the operating window.
    #[must_use]
    pub fn is_open_at(&self, at: OffsetDateTime) -> bool {
        let Some(utc) = Utc
            .timestamp_opt(at.unix_timestamp(), at.nanosecond())
            .single()
        else {
            return false;
        };
        let local: NaiveTime = utc.with_timezone(&self.timezone).time();

        if self.opens_at == self.closes_at {
            true
        } else if self.opens_at < self.closes_at {
            local >= self.opens_at && local < self.closes_at
        } else {
            local >= self.opens_at || local < self.closes_at
        }
    }

    /// The status a new order placed at `at` starts in.
    #[must_use]
    pub fn initial_status(&self, at: OffsetDateTime) -> OrderStatus {
        if self.is_open_at(at) {
            OrderStatus::Pending
        } else {
            OrderStatus::PendingOutOfHours
        }
    }
}

/// Parses `HH:MM` or `HH:MM:SS`.
fn parse_time_of_day(value: &str) -> Result<NaiveTime, DomainError> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .map_err(|e| DomainError::InvalidBusinessHours(format!("'{value}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn test_inside_and_outside_utc_window() {
        let hours = BusinessHours::new("UTC", "09:00", "21:00").unwrap();
        assert!(hours.is_open_at(datetime!(2026-03-02 09:00 UTC)));
        assert!(hours.is_open_at(datetime!(2026-03-02 12:30 UTC)));
        assert!(!hours.is_open_at(datetime!(2026-03-02 21:00 UTC)));
        assert!(!hours.is_open_at(datetime!(2026-03-02 03:00 UTC)));
    }

    #[test]
    fn test_initial_status() {
        let hours = BusinessHours::new("UTC", "09:00", "21:00").unwrap();
        assert_eq!(
            hours.initial_status(datetime!(2026-03-02 12:00 UTC)),
            OrderStatus::Pending
        );
        assert_eq!(
            hours.initial_status(datetime!(2026-03-02 23:30 UTC)),
            OrderStatus::PendingOutOfHours
        );
    }

    #[test]
    fn test_window_is_evaluated_in_declared_timezone() {
        // Buenos Aires is UTC-3 with no DST.
        let hours = BusinessHours::new("America/Argentina/Buenos_Aires", "09:00", "21:00").unwrap();
        // 10:00 UTC is 07:00 local: closed.
        assert!(!hours.is_open_at(datetime!(2026-03-02 10:00 UTC)));
        // 23:00 UTC is 20:00 local: open.
        assert!(hours.is_open_at(datetime!(2026-03-02 23:00 UTC)));
    }

    #[test]
    fn test_window_wrapping_midnight() {
        let hours = BusinessHours::new("UTC", "20:00", "02:00").unwrap();
        assert!(hours.is_open_at(datetime!(2026-03-02 23:00 UTC)));
        assert!(hours.is_open_at(datetime!(2026-03-03 01:59 UTC)));
        assert!(!hours.is_open_at(datetime!(2026-03-03 02:00 UTC)));
        assert!(!hours.is_open_at(datetime!(2026-03-03 12:00 UTC)));
    }

    #[test]
    fn test_equal_bounds_never_close() {
        let hours = BusinessHours::new("UTC", "00:00", "00:00").unwrap();
        assert!(hours.is_open_at(datetime!(2026-03-02 04:00 UTC)));
    }

    #[test]
    fn test_invalid_configuration() {
        assert!(matches!(
            BusinessHours::new("Mars/Olympus", "09:00", "21:00"),
            Err(DomainError::InvalidTimezone(_))
        ));
        assert!(matches!(
            BusinessHours::new("UTC", "9am", "21:00"),
            Err(DomainError::InvalidBusinessHours(_))
        ));
    }
}
