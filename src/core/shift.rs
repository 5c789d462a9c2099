//! Shift evaluation - Pure time-window arithmetic shared by daily and overtime shifts.
//!
//! Both kinds of shift are judged by [`evaluate_shift`] against a [`ShiftWindow`]:
//! the employee's work schedule for daily shifts, or the window copied onto an
//! overtime application for overtime shifts.

use crate::entities::{overtime_application, work_schedule};
use chrono::{Duration, NaiveDateTime, NaiveTime};

/// Start, end and late tolerance of a shift, independent of where they came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShiftWindow {
    /// Scheduled start time of day
    pub start: NaiveTime,
    /// Scheduled end time of day
    pub end: NaiveTime,
    /// Grace minutes after `start`
    pub late_tolerance_minutes: i32,
}

impl From<&work_schedule::Model> for ShiftWindow {
    fn from(schedule: &work_schedule::Model) -> Self {
        Self {
            start: schedule.start_time,
            end: schedule.end_time,
            late_tolerance_minutes: schedule.late_tolerance_minutes,
        }
    }
}

impl From<&overtime_application::Model> for ShiftWindow {
    fn from(application: &overtime_application::Model) -> Self {
        Self {
            start: application.start_time,
            end: application.end_time,
            late_tolerance_minutes: application.late_tolerance_minutes,
        }
    }
}

/// Verdict reached at clock-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShiftOutcome {
    /// Clocked in after the shift had already ended
    AbsentAfterShiftEnd,
    /// Clocked out before the shift ended
    EarlyClockOut,
    /// Clocked in after start plus tolerance
    Late {
        /// Minutes past the end of the tolerance window
        late_minutes: i64,
        /// Minutes past the scheduled start, tolerance included
        minutes_after_start: i64,
    },
    /// Clocked in within tolerance and stayed until the end
    Present,
}

/// Decides the outcome of a shift. The day of the shift is the day of `clock_out`.
///
/// Precedence: clocked in after the end, then early clock-out, then late, then present.
#[must_use]
pub fn evaluate_shift(
    clock_in: NaiveDateTime,
    clock_out: NaiveDateTime,
    window: &ShiftWindow,
) -> ShiftOutcome {
    let day = clock_out.date();
    let scheduled_end = day.and_time(window.end);
    let scheduled_start = day.and_time(window.start);
    let tolerance_end =
        scheduled_start + Duration::minutes(i64::from(window.late_tolerance_minutes));

    if clock_in > scheduled_end {
        ShiftOutcome::AbsentAfterShiftEnd
    } else if clock_out < scheduled_end {
        ShiftOutcome::EarlyClockOut
    } else if clock_in > tolerance_end {
        ShiftOutcome::Late {
            late_minutes: (clock_in - tolerance_end).num_minutes(),
            minutes_after_start: (clock_in - scheduled_start).num_minutes(),
        }
    } else {
        ShiftOutcome::Present
    }
}

/// Minutes a break ran over the allowance, if it exceeded allowance plus tolerance.
///
/// The tolerance only decides whether the break is penalized; the reported
/// overrun is measured from the plain allowance.
#[must_use]
pub fn break_overrun(
    break_in: NaiveDateTime,
    break_out: NaiveDateTime,
    allowed_minutes: i32,
    tolerance_minutes: i32,
) -> Option<i64> {
    let taken = (break_out - break_in).num_minutes();
    let allowed = i64::from(allowed_minutes);

    (taken > allowed + i64::from(tolerance_minutes)).then_some(taken - allowed)
}

/// Appends a note line to an attendance description.
pub(crate) fn append_note(description: &mut String, note: &str) {
    if !description.is_empty() {
        description.push('\n');
    }
    description.push_str(note);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 6)
            .and_then(|d| d.and_hms_opt(hour, minute, 0))
            .unwrap_or_default()
    }

    fn nine_to_five() -> ShiftWindow {
        ShiftWindow {
            start: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default(),
            end: NaiveTime::from_hms_opt(17, 0, 0).unwrap_or_default(),
            late_tolerance_minutes: 15,
        }
    }

    #[test]
    fn test_late_after_tolerance() {
        let outcome = evaluate_shift(at(9, 20), at(17, 30), &nine_to_five());
        assert_eq!(
            outcome,
            ShiftOutcome::Late {
                late_minutes: 5,
                minutes_after_start: 20
            }
        );
    }

    #[test]
    fn test_present_within_tolerance() {
        assert_eq!(evaluate_shift(at(8, 50), at(17, 30), &nine_to_five()), ShiftOutcome::Present);
        assert_eq!(evaluate_shift(at(9, 15), at(17, 0), &nine_to_five()), ShiftOutcome::Present);
    }

    #[test]
    fn test_early_clock_out_beats_late() {
        assert_eq!(
            evaluate_shift(at(9, 5), at(16, 30), &nine_to_five()),
            ShiftOutcome::EarlyClockOut
        );
        assert_eq!(
            evaluate_shift(at(10, 0), at(16, 59), &nine_to_five()),
            ShiftOutcome::EarlyClockOut
        );
    }

    #[test]
    fn test_clock_in_after_shift_end_is_absent() {
        assert_eq!(
            evaluate_shift(at(17, 1), at(18, 0), &nine_to_five()),
            ShiftOutcome::AbsentAfterShiftEnd
        );
    }

    #[test]
    fn test_break_overrun() {
        // 60 minute allowance, 15 minute tolerance
        assert_eq!(break_overrun(at(12, 0), at(13, 15), 60, 15), None);
        assert_eq!(break_overrun(at(12, 0), at(13, 16), 60, 15), Some(16));
        assert_eq!(break_overrun(at(12, 0), at(12, 30), 60, 0), None);
    }

    #[test]
    fn test_append_note() {
        let mut description = String::new();
        append_note(&mut description, "Absent");
        append_note(&mut description, "Break exceeded");
        assert_eq!(description, "Absent\nBreak exceeded");
    }
}
