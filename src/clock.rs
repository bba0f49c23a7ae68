//! Time keeping helpers: label formatting and time sync parsing

use core::fmt::{self, Write};

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Timelike, Weekday};

/// Length of a Current Time Service record
pub const CTS_LEN: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimeError {
    /// Fewer bytes than a full record
    Truncated,
    /// Fields do not form a valid calendar date and time
    InvalidDate,
}

/// Write the 12 hour clock text, e.g. `" 9:05"`.
///
/// The hour is padded with a space to two columns and there is no AM/PM marker.
pub fn write_time<W: Write>(out: &mut W, time: &NaiveDateTime) -> fmt::Result {
    let (_, hour) = time.hour12();
    write!(out, "{:>2}:{:02}", hour, time.minute())
}

/// Write the long date text, e.g. `"Tuesday, January 2"`.
pub fn write_date<W: Write>(out: &mut W, time: &NaiveDateTime) -> fmt::Result {
    write!(
        out,
        "{}, {} {}",
        weekday_name(time.weekday()),
        month_name(time.month()),
        time.day()
    )
}

fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

fn month_name(month: u32) -> &'static str {
    match month {
        1 => "January",
        2 => "February",
        3 => "March",
        4 => "April",
        5 => "May",
        6 => "June",
        7 => "July",
        8 => "August",
        9 => "September",
        10 => "October",
        11 => "November",
        _ => "December",
    }
}

/// Local wall clock time for a UTC epoch timestamp.
pub fn local_from_timestamp(utc_secs: i64, offset_secs: i32) -> Option<NaiveDateTime> {
    DateTime::from_timestamp(utc_secs.checked_add(i64::from(offset_secs))?, 0)
        .map(|time| time.naive_utc())
}

/// Parse a Current Time Service record (Bluetooth SIG 0x2A2B) into local time.
pub fn from_cts_bytes(bytes: &[u8]) -> Result<NaiveDateTime, TimeError> {
    let &[year_lo, year_hi, month, day, hour, min, sec, _weekday, fractions, _reason, ..] = bytes
    else {
        return Err(TimeError::Truncated);
    };

    let year = i32::from(u16::from_le_bytes([year_lo, year_hi]));
    // fractions are in 1/256 s
    let milli = u32::from(fractions) * 1000 / 256;

    NaiveDate::from_ymd_opt(year, u32::from(month), u32::from(day))
        .and_then(|date| {
            date.and_hms_milli_opt(u32::from(hour), u32::from(min), u32::from(sec), milli)
        })
        .ok_or(TimeError::InvalidDate)
}
