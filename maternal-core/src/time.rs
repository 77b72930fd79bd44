//! Chuyển đổi giữa mốc thời gian lưu trữ (nano giây) và chuỗi hiển thị ISO-8601.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};

use crate::CareError;

/// Số nano giây kể từ Unix epoch.
pub type Timestamp = u64;

pub const NANOS_PER_MILLI: u64 = 1_000_000;

/// `mili giây × 1_000_000`. Ngày trước epoch không lưu được.
pub fn store_time(date: &DateTime<Utc>) -> Result<Timestamp, CareError> {
    let millis = u64::try_from(date.timestamp_millis()).map_err(|_| {
        CareError::Internal(format!("{} precedes the Unix epoch", date.to_rfc3339()))
    })?;
    millis.checked_mul(NANOS_PER_MILLI).ok_or_else(|| {
        CareError::Internal(format!("{} overflows nanosecond storage", date.to_rfc3339()))
    })
}

/// Chuyển ngược về `DateTime<Utc>`, bỏ phần dưới mili giây.
pub fn to_datetime(stored: Timestamp) -> Result<DateTime<Utc>, CareError> {
    let millis = i64::try_from(stored / NANOS_PER_MILLI)
        .map_err(|_| CareError::Internal(format!("timestamp {stored} out of range")))?;
    DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| CareError::Internal(format!("timestamp {stored} out of range")))
}

/// Chuỗi hiển thị dạng `2024-05-01T10:00:00.000Z`.
pub fn display_time(stored: Timestamp) -> Result<String, CareError> {
    Ok(to_datetime(stored)?.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Nhận `YYYY-MM-DD` (nửa đêm UTC) hoặc RFC 3339.
pub fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
