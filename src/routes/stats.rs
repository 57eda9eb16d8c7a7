//! # 집계 조회 핸들러
//!
//! - `GET /api/v1/stats/daily?days=14&time_zone=Asia/Seoul` → `{ "days": [...] }`
//! - `GET /api/v1/stats/weekly/{week_key}` → `WeeklyStat` (없으면 0)
//! - `GET /api/v1/stats/global` → `GlobalStat` (없으면 0)

use crate::{
    db,
    error::AppError,
    middleware::auth::AuthUser,
    models::*,
    routes::AppState,
    services::calendar::{recent_day_range, resolve_time_zone},
};
use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::{json, Value};

const DEFAULT_DAILY_WINDOW: u32 = 14;
const MAX_DAILY_WINDOW: u32 = 366;

/// 최근 N일(오늘 포함)의 일별 집계. 세션이 없던 날은 빠집니다.
pub async fn get_daily_totals(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(query): Query<DailyTotalsQuery>,
) -> Result<Json<Value>, AppError> {
    let tz = resolve_time_zone(query.time_zone.as_deref())?;
    let days = query
        .days
        .unwrap_or(DEFAULT_DAILY_WINDOW)
        .clamp(1, MAX_DAILY_WINDOW);
    let (first, last) = recent_day_range(state.clock.now(), tz, days);

    let totals = db::daily_totals(&state.pool, &auth_user.uid, &first, &last).await?;
    Ok(Json(json!({ "days": totals })))
}

pub async fn get_weekly_stat(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(week_key): Path<String>,
) -> Result<Json<WeeklyStat>, AppError> {
    if !is_week_key(&week_key) {
        return Err(AppError::Validation(
            "week_key must look like 2024-W05".to_string(),
        ));
    }
    let stat = db::weekly_stat(&state.pool, &auth_user.uid, &week_key).await?;
    Ok(Json(stat))
}

pub async fn get_global_stat(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<GlobalStat>, AppError> {
    let stat = db::global_stat(&state.pool, &auth_user.uid).await?;
    Ok(Json(stat))
}

/// `YYYY-Www` 형식 검사 (주차 01~53)
fn is_week_key(raw: &str) -> bool {
    let Some((year, week)) = raw.split_once("-W") else {
        return false;
    };
    year.len() == 4
        && year.chars().all(|c| c.is_ascii_digit())
        && week.len() == 2
        && week.parse::<u32>().is_ok_and(|w| (1..=53).contains(&w))
}

#[cfg(test)]
mod tests {
    use super::is_week_key;

    #[test]
    fn week_key_format() {
        assert!(is_week_key("2024-W01"));
        assert!(is_week_key("2020-W53"));
        assert!(!is_week_key("2024-W00"));
        assert!(!is_week_key("2024-W54"));
        assert!(!is_week_key("2024-1"));
        assert!(!is_week_key("24-W01"));
    }
}
