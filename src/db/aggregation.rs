//! # 세션 집계 트랜잭션
//!
//! 세션 종료 시 하나의 트랜잭션 안에서 다음을 모두 수행합니다.
//!
//! 1. 잠금/계정/커리어를 다시 읽어 시작 이후 동시 변경이 없었는지 확인 (`StaleState`)
//! 2. `적립 시간 = min(max(0, now - start_at), duration_sec)`
//! 3. 시간대 기준 day-key, ISO week-key 계산
//! 4. 불변 세션 기록 삽입
//! 5. 일/주/전체 집계와 커리어 카운터를 같은 값만큼 증가
//! 6. 계정 누적/오늘 카운터 갱신 (날짜가 바뀌었으면 오늘 카운터를 리셋)
//! 7. 잠금을 `ended`로 전환
//!
//! 모든 단계는 호출자가 넘긴 같은 연결(트랜잭션) 위에서 실행되며,
//! 커밋은 호출자(`sessions::end_session`)가 한 번만 합니다.
//! 중간에 실패하면 트랜잭션이 롤백되어 집계만 반영되고 잠금은 `active`로 남는 상태는 생기지 않습니다.

use crate::db::{accounts::require_account, careers::find_career};
use crate::error::AppError;
use crate::models::*;
use crate::services::calendar::{day_key, format_timestamp, iso_week_key, parse_timestamp};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use sqlx::SqliteConnection;

/// 잠금 검사를 통과한 세션을 정산합니다 (단계 1~7).
pub(crate) async fn settle(
    conn: &mut SqliteConnection,
    lock: &ActiveSessionLock,
    tz: Tz,
    now: DateTime<Utc>,
) -> Result<EndSessionOutcome, AppError> {
    let account = verify_pinned_career(&mut *conn, lock).await?;

    let duration_sec = credited_duration(lock, now)?;
    let day = day_key(now, tz);
    let week = iso_week_key(now, tz);

    let session_id = record_session(&mut *conn, lock, duration_sec, &day, now).await?;
    credit_aggregates(&mut *conn, lock, duration_sec, &day, &week, now).await?;
    credit_account(&mut *conn, &account, duration_sec, &day).await?;
    release_lock(&mut *conn, &lock.uid, now).await?;

    Ok(EndSessionOutcome {
        duration_sec,
        session_id,
        day_key: day,
        week_key: week,
    })
}

/// 단계 1: 시작 시점에 고정된 커리어가 여전히 계정의 활성 커리어인지 확인합니다.
async fn verify_pinned_career(
    conn: &mut SqliteConnection,
    lock: &ActiveSessionLock,
) -> Result<Account, AppError> {
    let account = require_account(&mut *conn, &lock.uid).await?;
    if account.active_career_id.as_deref() != Some(lock.career_id.as_str()) {
        tracing::warn!(uid = %lock.uid, career_id = %lock.career_id, "active career changed mid-session");
        return Err(AppError::StaleState(
            "The active career changed since the session started".to_string(),
        ));
    }

    match find_career(&mut *conn, &lock.uid, &lock.career_id).await? {
        Some(career) if career.is_active() => Ok(account),
        _ => {
            tracing::warn!(uid = %lock.uid, career_id = %lock.career_id, "pinned career no longer active");
            Err(AppError::StaleState(
                "The session's career is no longer active".to_string(),
            ))
        }
    }
}

/// 단계 2: 경과 시간을 할당 시간으로 자르고, 음수(시계 오차)는 0으로 올립니다.
pub(crate) fn credited_duration(
    lock: &ActiveSessionLock,
    now: DateTime<Utc>,
) -> Result<i64, AppError> {
    let started = parse_timestamp(&lock.start_at)?;
    let elapsed_sec = (now - started).num_seconds().max(0);
    Ok(elapsed_sec.min(lock.duration_sec))
}

/// 단계 4: 불변 세션 기록을 삽입하고 새 기록 ID를 돌려줍니다.
async fn record_session(
    conn: &mut SqliteConnection,
    lock: &ActiveSessionLock,
    duration_sec: i64,
    day: &str,
    now: DateTime<Utc>,
) -> Result<String, AppError> {
    let id = uuid::Uuid::now_v7().to_string();
    sqlx::query(
        r#"
        INSERT INTO focus_sessions (id, owner_uid, career_id, start_at, duration_sec, day_key, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(&lock.uid)
    .bind(&lock.career_id)
    .bind(&lock.start_at)
    .bind(duration_sec)
    .bind(day)
    .bind(format_timestamp(now))
    .execute(&mut *conn)
    .await?;

    Ok(id)
}

/// 단계 5: 일/주/전체 집계와 커리어 카운터를 증분 갱신합니다.
async fn credit_aggregates(
    conn: &mut SqliteConnection,
    lock: &ActiveSessionLock,
    duration_sec: i64,
    day: &str,
    week: &str,
    now: DateTime<Utc>,
) -> Result<(), AppError> {
    let updated_at = format_timestamp(now);

    sqlx::query(
        r#"
        INSERT INTO daily_stats (uid, day_key, total_focus_sec, total_sessions, updated_at)
        VALUES (?, ?, ?, 1, ?)
        ON CONFLICT(uid, day_key) DO UPDATE SET
            total_focus_sec = daily_stats.total_focus_sec + excluded.total_focus_sec,
            total_sessions = daily_stats.total_sessions + 1,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(&lock.uid)
    .bind(day)
    .bind(duration_sec)
    .bind(&updated_at)
    .execute(&mut *conn)
    .await?;

    sqlx::query(
        r#"
        INSERT INTO weekly_stats (uid, week_key, total_focus_sec, total_sessions, updated_at)
        VALUES (?, ?, ?, 1, ?)
        ON CONFLICT(uid, week_key) DO UPDATE SET
            total_focus_sec = weekly_stats.total_focus_sec + excluded.total_focus_sec,
            total_sessions = weekly_stats.total_sessions + 1,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(&lock.uid)
    .bind(week)
    .bind(duration_sec)
    .bind(&updated_at)
    .execute(&mut *conn)
    .await?;

    sqlx::query(
        r#"
        INSERT INTO global_stats (uid, total_focus_sec, total_sessions, updated_at)
        VALUES (?, ?, 1, ?)
        ON CONFLICT(uid) DO UPDATE SET
            total_focus_sec = global_stats.total_focus_sec + excluded.total_focus_sec,
            total_sessions = global_stats.total_sessions + 1,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(&lock.uid)
    .bind(duration_sec)
    .bind(&updated_at)
    .execute(&mut *conn)
    .await?;

    sqlx::query(
        r#"
        UPDATE careers
        SET total_focus_sec = total_focus_sec + ?,
            total_sessions = total_sessions + 1
        WHERE id = ? AND owner_uid = ? AND status = 'active'
        "#,
    )
    .bind(duration_sec)
    .bind(&lock.career_id)
    .bind(&lock.uid)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// 단계 6: 계정 누적 카운터와 "오늘" 카운터를 갱신합니다.
///
/// `today_key`가 이번 day-key와 다르면 누적하지 않고 이번 적립 시간으로 덮어씁니다.
async fn credit_account(
    conn: &mut SqliteConnection,
    account: &Account,
    duration_sec: i64,
    day: &str,
) -> Result<(), AppError> {
    let (today_focus_sec, today_key) = rolled_today(account, duration_sec, day);

    sqlx::query(
        r#"
        UPDATE accounts
        SET lifetime_focus_sec = lifetime_focus_sec + ?,
            today_focus_sec = ?,
            today_key = ?
        WHERE uid = ?
        "#,
    )
    .bind(duration_sec)
    .bind(today_focus_sec)
    .bind(&today_key)
    .bind(&account.uid)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// 날짜 변경을 반영한 새 (오늘 카운터, today_key)
fn rolled_today(account: &Account, duration_sec: i64, day: &str) -> (i64, String) {
    if account.today_key == day {
        (account.today_focus_sec + duration_sec, day.to_string())
    } else {
        (duration_sec, day.to_string())
    }
}

/// 단계 7: 잠금을 `ended`로 전환합니다. 행은 감사 기록으로 남깁니다.
async fn release_lock(
    conn: &mut SqliteConnection,
    uid: &str,
    now: DateTime<Utc>,
) -> Result<(), AppError> {
    sqlx::query(
        r#"
        UPDATE active_sessions
        SET status = 'ended', heartbeat_at = ?
        WHERE uid = ? AND status = 'active'
        "#,
    )
    .bind(format_timestamp(now))
    .bind(uid)
    .execute(&mut *conn)
    .await?;

    Ok(())
}
