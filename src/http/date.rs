//! Conversion between epoch milliseconds and HTTP date strings.
//!
//! Dates are written in the RFC 1123 form (`Sun, 06 Nov 1994 08:49:37 GMT`).
//! On the way back, [`httpdate`] tries RFC 1123, then the obsolete RFC 850
//! form, then the ANSI C `asctime` form, and stops at the first one that
//! matches. `httpdate` stops at the epoch, so earlier instants go through
//! [`time`] with the RFC 1123 and `asctime` layouts.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};

use crate::http::error::HeaderError;

/// Seconds since the epoch of `0001-01-01T00:00:00Z`.
const MIN_HTTP_DATE_SECS: i64 = -62_135_596_800;

/// Seconds since the epoch of `9999-12-31T23:59:59Z`, the last instant a
/// four digit year can represent.
const MAX_HTTP_DATE_SECS: i64 = 253_402_300_799;

/// Values shorter than this ("0", "-1") are never HTTP dates.
const MIN_DATE_LEN: usize = 3;

const RFC_1123: &[BorrowedFormatItem<'static>] = format_description!(
    "[weekday repr:short], [day] [month repr:short] [year] [hour]:[minute]:[second] GMT"
);

const ASCTIME: &[BorrowedFormatItem<'static>] = format_description!(
    "[weekday repr:short] [month repr:short] [day padding:space] [hour]:[minute]:[second] [year]"
);

/// Formats `millis` as an RFC 1123 date. Sub-second precision is dropped,
/// rounding towards the past.
pub fn format_http_date(millis: i64) -> Result<String, HeaderError> {
    let secs = millis.div_euclid(1000);
    if !(MIN_HTTP_DATE_SECS..=MAX_HTTP_DATE_SECS).contains(&secs) {
        return Err(HeaderError::DateOutOfRange(millis));
    }
    if let Ok(after_epoch) = u64::try_from(secs) {
        return Ok(httpdate::fmt_http_date(
            UNIX_EPOCH + Duration::from_secs(after_epoch),
        ));
    }

    OffsetDateTime::from_unix_timestamp(secs)
        .ok()
        .and_then(|time| time.format(RFC_1123).ok())
        .ok_or(HeaderError::DateOutOfRange(millis))
}

/// Parses `value` into milliseconds since the epoch, or `None` when no known
/// format matches.
pub fn parse_http_date(value: &str) -> Option<i64> {
    if value.len() < MIN_DATE_LEN {
        return None;
    }
    if let Ok(time) = httpdate::parse_http_date(value) {
        return to_millis(time);
    }

    [RFC_1123, ASCTIME]
        .into_iter()
        .find_map(|layout| PrimitiveDateTime::parse(value, layout).ok())
        .map(|time| time.assume_utc().unix_timestamp() * 1000)
}

fn to_millis(time: SystemTime) -> Option<i64> {
    match time.duration_since(UNIX_EPOCH) {
        Ok(after) => i64::try_from(after.as_millis()).ok(),
        Err(before) => i64::try_from(before.duration().as_millis())
            .ok()
            .map(|millis| -millis),
    }
}
