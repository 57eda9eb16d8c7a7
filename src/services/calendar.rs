//! # 달력 키 / 시각 유틸리티
//!
//! 상태가 없는 순수 함수들입니다.
//! - `day_key()`: 시각 + 시간대 → `YYYY-MM-DD`
//! - `iso_week_key()`: 시각 + 시간대 → `YYYY-Www` (ISO-8601, 목요일 기준 연도 경계)
//! - `format_timestamp()` / `parse_timestamp()`: DB에 저장하는 RFC 3339 문자열 변환
//!
//! 시간대를 지정하지 않으면 UTC 기준으로 계산합니다.

use crate::error::AppError;
use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use chrono_tz::Tz;

/// DB 저장용 타임스탬프 포맷 (밀리초 포함, UTC)
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// 선택적 IANA 시간대 이름을 `Tz`로 변환합니다.
///
/// - `None` 또는 공백 문자열 → UTC
/// - 알 수 없는 이름 → `AppError::Validation`
pub fn resolve_time_zone(name: Option<&str>) -> Result<Tz, AppError> {
    match name.map(str::trim).filter(|n| !n.is_empty()) {
        None => Ok(Tz::UTC),
        Some(n) => n
            .parse::<Tz>()
            .map_err(|_| AppError::Validation(format!("Unknown time zone: {}", n))),
    }
}

/// 주어진 시간대에서의 달력 날짜
pub fn local_date(now: DateTime<Utc>, tz: Tz) -> NaiveDate {
    now.with_timezone(&tz).date_naive()
}

/// `YYYY-MM-DD` 형식의 day-key
pub fn day_key(now: DateTime<Utc>, tz: Tz) -> String {
    local_date(now, tz).format("%Y-%m-%d").to_string()
}

/// `YYYY-Www` 형식의 ISO-8601 week-key
///
/// 연도는 달력 연도가 아니라 ISO 주차 연도입니다.
/// 예: 2021-01-01(금)은 2020-W53에 속합니다.
pub fn iso_week_key(now: DateTime<Utc>, tz: Tz) -> String {
    let week = local_date(now, tz).iso_week();
    format!("{:04}-W{:02}", week.year(), week.week())
}

/// 오늘을 포함한 최근 `days`일의 첫 번째/마지막 day-key
///
/// day-key는 사전순 정렬이 날짜순과 같으므로 SQL `BETWEEN`에 그대로 쓸 수 있습니다.
pub fn recent_day_range(now: DateTime<Utc>, tz: Tz, days: u32) -> (String, String) {
    let today = local_date(now, tz);
    let first = today - Duration::days(i64::from(days.max(1)) - 1);
    (
        first.format("%Y-%m-%d").to_string(),
        today.format("%Y-%m-%d").to_string(),
    )
}

pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// DB에 저장된 타임스탬프를 다시 `DateTime<Utc>`로 읽습니다.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, AppError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| AppError::Internal(format!("Invalid stored timestamp {:?}: {}", raw, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn day_key_defaults_to_utc() {
        let tz = resolve_time_zone(None).unwrap();
        assert_eq!(day_key(utc(2024, 1, 1, 23, 30), tz), "2024-01-01");
    }

    #[test]
    fn day_key_follows_time_zone() {
        let seoul = resolve_time_zone(Some("Asia/Seoul")).unwrap();
        // 2024-01-01 23:30 UTC == 2024-01-02 08:30 KST
        assert_eq!(day_key(utc(2024, 1, 1, 23, 30), seoul), "2024-01-02");

        let la = resolve_time_zone(Some("America/Los_Angeles")).unwrap();
        assert_eq!(day_key(utc(2024, 1, 2, 3, 0), la), "2024-01-01");
    }

    #[test]
    fn iso_week_key_uses_iso_year_boundaries() {
        let tz = Tz::UTC;
        assert_eq!(iso_week_key(utc(2021, 1, 1, 12, 0), tz), "2020-W53");
        assert_eq!(iso_week_key(utc(2024, 12, 30, 12, 0), tz), "2025-W01");
        assert_eq!(iso_week_key(utc(2024, 1, 8, 12, 0), tz), "2024-W02");
    }

    #[test]
    fn unknown_time_zone_is_a_validation_error() {
        let err = resolve_time_zone(Some("Mars/Olympus")).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(resolve_time_zone(Some("  ")).unwrap(), Tz::UTC);
    }

    #[test]
    fn recent_day_range_includes_today() {
        let (first, last) = recent_day_range(utc(2024, 3, 1, 10, 0), Tz::UTC, 14);
        assert_eq!(first, "2024-02-17");
        assert_eq!(last, "2024-03-01");

        let (first, last) = recent_day_range(utc(2024, 3, 1, 10, 0), Tz::UTC, 1);
        assert_eq!(first, last);
    }

    #[test]
    fn timestamps_survive_storage_format() {
        let at = Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap();
        let raw = format_timestamp(at);
        assert_eq!(raw, "2024-05-06T07:08:09.000Z");
        assert_eq!(parse_timestamp(&raw).unwrap(), at);
    }
}
