//! # 세션 기록 / 집계 조회 쿼리
//!
//! 읽기 전용입니다. 집계 값은 `aggregation` 모듈이 증분으로 유지하므로
//! 여기서는 저장된 행을 그대로 읽기만 합니다.

use crate::error::AppError;
use crate::models::*;
use sqlx::SqlitePool;

/// 한 번에 조회할 수 있는 세션 기록 최대 개수
pub const MAX_SESSION_PAGE: i64 = 500;

/// 세션 기록을 최신순으로 조회합니다. `day_key`가 있으면 그 날짜만.
pub async fn list_sessions(
    pool: &SqlitePool,
    uid: &str,
    day_key: Option<&str>,
    limit: i64,
) -> Result<Vec<FocusSessionRecord>, AppError> {
    let limit = limit.clamp(1, MAX_SESSION_PAGE);

    let sessions = if let Some(day) = day_key {
        sqlx::query_as::<_, FocusSessionRecord>(
            r#"
            SELECT id, owner_uid, career_id, start_at, duration_sec, day_key, created_at
            FROM focus_sessions
            WHERE owner_uid = ? AND day_key = ?
            ORDER BY start_at DESC
            LIMIT ?
            "#,
        )
        .bind(uid)
        .bind(day)
        .bind(limit)
        .fetch_all(pool)
        .await?
    } else {
        sqlx::query_as::<_, FocusSessionRecord>(
            r#"
            SELECT id, owner_uid, career_id, start_at, duration_sec, day_key, created_at
            FROM focus_sessions
            WHERE owner_uid = ?
            ORDER BY start_at DESC
            LIMIT ?
            "#,
        )
        .bind(uid)
        .bind(limit)
        .fetch_all(pool)
        .await?
    };

    Ok(sessions)
}

/// `[first_day, last_day]` 범위의 일별 집계 (날짜 오름차순).
/// 세션이 없었던 날은 결과에 없습니다.
pub async fn daily_totals(
    pool: &SqlitePool,
    uid: &str,
    first_day: &str,
    last_day: &str,
) -> Result<Vec<DailyStat>, AppError> {
    let stats = sqlx::query_as::<_, DailyStat>(
        r#"
        SELECT day_key, total_focus_sec, total_sessions, updated_at
        FROM daily_stats
        WHERE uid = ? AND day_key BETWEEN ? AND ?
        ORDER BY day_key ASC
        "#,
    )
    .bind(uid)
    .bind(first_day)
    .bind(last_day)
    .fetch_all(pool)
    .await?;

    Ok(stats)
}

/// 한 ISO 주차의 집계. 없으면 0으로 채운 값을 돌려줍니다.
pub async fn weekly_stat(pool: &SqlitePool, uid: &str, week_key: &str) -> Result<WeeklyStat, AppError> {
    let stat = sqlx::query_as::<_, WeeklyStat>(
        r#"
        SELECT week_key, total_focus_sec, total_sessions, updated_at
        FROM weekly_stats
        WHERE uid = ? AND week_key = ?
        "#,
    )
    .bind(uid)
    .bind(week_key)
    .fetch_optional(pool)
    .await?;

    Ok(stat.unwrap_or_else(|| WeeklyStat {
        week_key: week_key.to_string(),
        total_focus_sec: 0,
        total_sessions: 0,
        updated_at: None,
    }))
}

/// 사용자 전체 집계. 없으면 0.
pub async fn global_stat(pool: &SqlitePool, uid: &str) -> Result<GlobalStat, AppError> {
    let stat = sqlx::query_as::<_, GlobalStat>(
        r#"
        SELECT total_focus_sec, total_sessions, updated_at
        FROM global_stats
        WHERE uid = ?
        "#,
    )
    .bind(uid)
    .fetch_optional(pool)
    .await?;

    Ok(stat.unwrap_or(GlobalStat {
        total_focus_sec: 0,
        total_sessions: 0,
        updated_at: None,
    }))
}
