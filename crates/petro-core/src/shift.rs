//! # Shift Windows
//!
//! The day is split into two 12-hour windows, but the two call paths that
//! open shifts split it differently:
//!
//! ```text
//!  local hour   00    06    12    18    24
//!               │     │     │     │     │
//!  MidnightNoon ├── DAY ────┼─ NIGHT ───┤   inventory path (readings, sales)
//!  SixToSix     ┤NIGHT├── DAY ────┼ NIGHT   cash-entry path
//! ```
//!
//! Both are kept as named policies and chosen by the caller; they are not
//! interchangeable. Before 06:00 the six-to-six policy belongs to the NIGHT
//! window that started at 18:00 on the previous day.

use chrono::{DateTime, Duration, FixedOffset, NaiveDateTime, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::types::ShiftType;
use crate::SHIFT_WINDOW_HOURS;

/// How wall-clock time is bucketed into DAY/NIGHT windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShiftWindowPolicy {
    /// DAY 00:00–12:00, NIGHT 12:00–24:00. Used when resolving the
    /// inventory shift for readings and sales.
    MidnightNoon,
    /// DAY 06:00–18:00, NIGHT 18:00–06:00. Used by cash entry.
    SixToSix,
}

/// A resolved window: its type and UTC bounds (`start` inclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftWindow {
    pub shift_type: ShiftType,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl ShiftWindow {
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant < self.end
    }
}

impl ShiftWindowPolicy {
    /// Returns the window containing `now`, bucketed in the station's local time.
    ///
    /// ## Example
    /// ```rust
    /// use chrono::{FixedOffset, TimeZone, Utc};
    /// use petro_core::{ShiftType, ShiftWindowPolicy};
    ///
    /// let utc = FixedOffset::east_opt(0).unwrap();
    /// let at = Utc.with_ymd_and_hms(2024, 5, 2, 3, 30, 0).unwrap();
    ///
    /// let inventory = ShiftWindowPolicy::MidnightNoon.window_at(at, utc);
    /// assert_eq!(inventory.shift_type, ShiftType::Day);
    ///
    /// let cash = ShiftWindowPolicy::SixToSix.window_at(at, utc);
    /// assert_eq!(cash.shift_type, ShiftType::Night);
    /// assert_eq!(cash.start, Utc.with_ymd_and_hms(2024, 5, 1, 18, 0, 0).unwrap());
    /// ```
    pub fn window_at(&self, now: DateTime<Utc>, offset: FixedOffset) -> ShiftWindow {
        let local = now.with_timezone(&offset);
        let hour = local.hour() as i64;
        let midnight = local.date_naive().and_time(NaiveTime::default());

        let (shift_type, start_local) = match self {
            ShiftWindowPolicy::MidnightNoon => {
                if hour < 12 {
                    (ShiftType::Day, midnight)
                } else {
                    (ShiftType::Night, midnight + Duration::hours(12))
                }
            }
            ShiftWindowPolicy::SixToSix => {
                if (6..18).contains(&hour) {
                    (ShiftType::Day, midnight + Duration::hours(6))
                } else if hour >= 18 {
                    (ShiftType::Night, midnight + Duration::hours(18))
                } else {
                    (ShiftType::Night, midnight - Duration::hours(6))
                }
            }
        };

        let start = local_to_utc(start_local, offset);
        ShiftWindow {
            shift_type,
            start,
            end: start + Duration::hours(SHIFT_WINDOW_HOURS),
        }
    }

    /// Shorthand for `window_at(now, offset).shift_type`.
    pub fn shift_type_at(&self, now: DateTime<Utc>, offset: FixedOffset) -> ShiftType {
        self.window_at(now, offset).shift_type
    }
}

fn local_to_utc(local: NaiveDateTime, offset: FixedOffset) -> DateTime<Utc> {
    let naive_utc = local - Duration::seconds(offset.local_minus_utc() as i64);
    DateTime::from_naive_utc_and_offset(naive_utc, Utc)
}

// =============================================================================
// Unit Tests
// =============================================================================
