//! Storefront availability from weekly business hours
//!
//! A restaurant is open now if today's window covers the current minute or
//! yesterday's overnight window has not closed yet.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike};
use std::collections::HashSet;

use crate::error::{AppError, ErrorCode};
use crate::models::{BusinessHour, BusinessHourInput};

/// Date that stored windows are anchored on (1970-01-01). Only its
/// difference to the close date matters.
fn reference_date() -> NaiveDate {
    NaiveDate::default()
}

fn minutes_of_day(t: NaiveTime) -> u32 {
    t.hour() * 60 + t.minute()
}

impl BusinessHour {
    /// Build a window from wall-clock times; a close at or before the open
    /// lands on the next calendar day
    pub fn from_clock(weekday: u8, open: NaiveTime, close: NaiveTime) -> Result<Self, AppError> {
        if weekday > 6 {
            return Err(AppError::with_message(
                ErrorCode::InvalidBusinessHours,
                format!("Weekday must be between 0 and 6, got {weekday}"),
            ));
        }
        if open == close {
            return Err(AppError::with_message(
                ErrorCode::InvalidBusinessHours,
                "Opening and closing times must differ",
            ));
        }
        let date = reference_date();
        let close_date = if close < open {
            date.succ_opt()
                .ok_or_else(|| AppError::internal("reference date overflow"))?
        } else {
            date
        };
        Ok(Self {
            weekday,
            open_time: date.and_time(open),
            close_time: close_date.and_time(close),
        })
    }

    /// Close falls on a later calendar day than open
    pub fn is_overnight(&self) -> bool {
        self.close_time.date() != self.open_time.date()
    }

    fn open_minutes(&self) -> u32 {
        minutes_of_day(self.open_time.time())
    }

    fn close_minutes(&self) -> u32 {
        minutes_of_day(self.close_time.time())
    }
}

/// Evaluate the week against a local wall-clock instant
pub fn is_open(hours: &[BusinessHour], now: NaiveDateTime) -> bool {
    let today = now.weekday().num_days_from_sunday() as u8;
    let yesterday = (today + 6) % 7;
    let minutes_now = minutes_of_day(now.time());

    let window = |day: u8| hours.iter().find(|h| h.weekday == day);

    let open_today = window(today).is_some_and(|w| {
        if w.is_overnight() {
            minutes_now >= w.open_minutes()
        } else {
            w.open_minutes() <= minutes_now && minutes_now < w.close_minutes()
        }
    });

    let spillover = window(yesterday)
        .is_some_and(|w| w.is_overnight() && minutes_now < w.close_minutes());

    open_today || spillover
}

/// Evaluate the week at `now` in the time zone `now` carries
pub fn is_open_at<Tz: TimeZone>(hours: &[BusinessHour], now: &DateTime<Tz>) -> bool {
    is_open(hours, now.naive_local())
}

fn parse_clock(value: &str) -> Result<NaiveTime, AppError> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M").map_err(|_| {
        AppError::with_message(
            ErrorCode::InvalidBusinessHours,
            format!("Invalid time '{value}', expected HH:MM"),
        )
    })
}

/// Validate a weekly hours replacement
///
/// Days with neither time set are closed and produce no window. Setting
/// only one of the two times, or listing a weekday twice, is rejected.
pub fn parse_week(inputs: &[BusinessHourInput]) -> Result<Vec<BusinessHour>, AppError> {
    let mut seen = HashSet::new();
    let mut week = Vec::with_capacity(inputs.len());

    for input in inputs {
        if !seen.insert(input.weekday) {
            return Err(AppError::with_message(
                ErrorCode::InvalidBusinessHours,
                format!("Weekday {} listed more than once", input.weekday),
            ));
        }
        match (input.open.as_deref(), input.close.as_deref()) {
            (None, None) => {
                if input.weekday > 6 {
                    return Err(AppError::with_message(
                        ErrorCode::InvalidBusinessHours,
                        format!("Weekday must be between 0 and 6, got {}", input.weekday),
                    ));
                }
            }
            (Some(open), Some(close)) => {
                week.push(BusinessHour::from_clock(
                    input.weekday,
                    parse_clock(open)?,
                    parse_clock(close)?,
                )?);
            }
            _ => {
                return Err(AppError::with_message(
                    ErrorCode::InvalidBusinessHours,
                    format!("Weekday {} needs both opening and closing time", input.weekday),
                ));
            }
        }
    }

    week.sort_by_key(|h| h.weekday);
    Ok(week)
}
