//! # 활성 세션 잠금 쿼리 모듈
//!
//! 사용자당 하나의 `active_sessions` 행이 뮤텍스 역할을 합니다.
//!
//! ## 잠금 상태 기계
//! ```text
//! NONE ──start()──▶ ACTIVE ──end()──▶ ENDED ──start()──▶ ACTIVE ...
//!                    │  ▲
//!                    └──┘ heartbeat()  (heartbeat_at만 갱신)
//! ```
//!
//! - 시작: 어느 기기든 `ACTIVE` 잠금이 있으면 `Conflict` (계정당 하나, 기기당 하나가 아님)
//! - 하트비트/종료: 잠금 없음 → `NotFound`, 다른 기기 → `Ownership`, 종료됨 → `InvalidState`
//! - 소유권은 `device_id` 문자열 비교만으로 결정합니다 (토큰 회전/펜싱 없음).
//! - 응답이 끊긴 잠금을 자동으로 회수하지 않습니다.

use crate::db::{accounts::require_account, aggregation, store::begin_write};
use crate::error::AppError;
use crate::models::*;
use crate::services::calendar::{format_timestamp, parse_timestamp};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use sqlx::{Executor, Sqlite, SqlitePool};

/// 기기 ID 최대 길이 (문자 수)
pub const DEVICE_ID_MAX_CHARS: usize = 128;

/// 사용자의 잠금 행을 조회합니다 (상태와 무관).
pub async fn find_lock<'e, E>(executor: E, uid: &str) -> Result<Option<ActiveSessionLock>, AppError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let lock = sqlx::query_as::<_, ActiveSessionLock>(
        r#"
        SELECT uid, career_id, start_at, duration_sec, device_id, heartbeat_at, status
        FROM active_sessions
        WHERE uid = ?
        "#,
    )
    .bind(uid)
    .fetch_optional(executor)
    .await?;

    Ok(lock)
}

/// 현재 잠금과 남은 시간/하트비트 경과 시간을 조회합니다.
///
/// 읽기 전용이며, 응답이 끊긴 기기를 감지하는 용도입니다.
pub async fn current_lock(
    pool: &SqlitePool,
    uid: &str,
    now: DateTime<Utc>,
) -> Result<Option<LockView>, AppError> {
    let Some(lock) = find_lock(pool, uid).await? else {
        return Ok(None);
    };

    let elapsed = (now - parse_timestamp(&lock.start_at)?).num_seconds().max(0);
    let remaining_sec = if lock.is_active() {
        (lock.duration_sec - elapsed).max(0)
    } else {
        0
    };
    let heartbeat_age_sec = (now - parse_timestamp(&lock.heartbeat_at)?)
        .num_seconds()
        .max(0);

    Ok(Some(LockView {
        lock,
        remaining_sec,
        heartbeat_age_sec,
    }))
}

/// 집중 세션을 시작합니다 (잠금 획득).
///
/// ## 실패
/// - `Conflict`: 이미 `ACTIVE` 잠금이 있음 (보유 기기와 무관)
/// - `InvalidState`: 활성 커리어가 없거나, 요청한 커리어가 현재 활성 커리어가 아님
/// - `Validation`: 기기 ID가 비었거나 너무 김, 집중 시간이 0 이하
pub async fn start_session(
    pool: &SqlitePool,
    uid: &str,
    career_id: &str,
    device_id: &str,
    duration_sec: i64,
    now: DateTime<Utc>,
) -> Result<ActiveSessionLock, AppError> {
    validate_device_id(device_id)?;
    if duration_sec <= 0 {
        return Err(AppError::Validation(
            "duration_sec must be positive".to_string(),
        ));
    }

    let mut tx = begin_write(pool, uid, now).await?;

    if let Some(existing) = find_lock(&mut *tx, uid).await? {
        if existing.is_active() {
            tracing::warn!(
                uid = %uid,
                device_id = %device_id,
                holder = %existing.device_id,
                "start rejected: session already active"
            );
            return Err(AppError::Conflict(
                "A focus session is already running for this account".to_string(),
            ));
        }
    }

    let account = require_account(&mut *tx, uid).await?;
    match account.active_career_id.as_deref() {
        None => {
            return Err(AppError::InvalidState(
                "No active career to focus on".to_string(),
            ))
        }
        Some(active) if active != career_id => {
            return Err(AppError::InvalidState(
                "Requested career is no longer the active career".to_string(),
            ))
        }
        Some(_) => {}
    }

    let at = format_timestamp(now);
    // 이전 ENDED 잠금은 덮어씁니다.
    sqlx::query(
        r#"
        INSERT INTO active_sessions (uid, career_id, start_at, duration_sec, device_id, heartbeat_at, status)
        VALUES (?, ?, ?, ?, ?, ?, 'active')
        ON CONFLICT(uid) DO UPDATE SET
            career_id = excluded.career_id,
            start_at = excluded.start_at,
            duration_sec = excluded.duration_sec,
            device_id = excluded.device_id,
            heartbeat_at = excluded.heartbeat_at,
            status = 'active'
        "#,
    )
    .bind(uid)
    .bind(career_id)
    .bind(&at)
    .bind(duration_sec)
    .bind(device_id)
    .bind(&at)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!(
        uid = %uid,
        device_id = %device_id,
        career_id = %career_id,
        duration_sec,
        "focus session started"
    );

    Ok(ActiveSessionLock {
        uid: uid.to_string(),
        career_id: career_id.to_string(),
        start_at: at.clone(),
        duration_sec,
        device_id: device_id.to_string(),
        heartbeat_at: at,
        status: LockStatus::Active,
    })
}

/// 잠금 보유 기기의 생존 신호. `heartbeat_at`만 갱신합니다.
///
/// 멱등이며, 호출자는 실패를 최선 노력(best-effort)으로 다룰 수 있습니다.
pub async fn heartbeat(
    pool: &SqlitePool,
    uid: &str,
    device_id: &str,
    now: DateTime<Utc>,
) -> Result<String, AppError> {
    let mut tx = begin_write(pool, uid, now).await?;
    let lock = find_lock(&mut *tx, uid).await?;
    owned_active_lock(lock, device_id)?;

    let at = format_timestamp(now);
    sqlx::query("UPDATE active_sessions SET heartbeat_at = ? WHERE uid = ?")
        .bind(&at)
        .bind(uid)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    tracing::debug!(uid = %uid, device_id = %device_id, "heartbeat");
    Ok(at)
}

/// 집중 세션을 종료합니다.
///
/// 잠금 검사를 통과하면 `aggregation::settle()`이 세션 기록, 4개 집계,
/// 계정 카운터, 잠금 해제를 같은 트랜잭션에서 수행하고 한 번에 커밋합니다.
pub async fn end_session(
    pool: &SqlitePool,
    uid: &str,
    device_id: &str,
    tz: Tz,
    now: DateTime<Utc>,
) -> Result<EndSessionOutcome, AppError> {
    let mut tx = begin_write(pool, uid, now).await?;
    let lock = find_lock(&mut *tx, uid).await?;
    let lock = owned_active_lock(lock, device_id)?;

    let outcome = aggregation::settle(&mut tx, &lock, tz, now).await?;
    tx.commit().await?;

    tracing::info!(
        uid = %uid,
        device_id = %device_id,
        career_id = %lock.career_id,
        credited_sec = outcome.duration_sec,
        session_id = %outcome.session_id,
        "focus session ended"
    );
    Ok(outcome)
}

/// 하트비트/종료 공통 검사: 존재 → 소유 기기 → 활성 순서
pub(crate) fn owned_active_lock(
    lock: Option<ActiveSessionLock>,
    device_id: &str,
) -> Result<ActiveSessionLock, AppError> {
    let lock = lock.ok_or_else(|| AppError::NotFound("No focus session to act on".to_string()))?;
    if lock.device_id != device_id {
        tracing::warn!(uid = %lock.uid, device_id = %device_id, "session owned by another device");
        return Err(AppError::Ownership(
            "The focus session belongs to another device".to_string(),
        ));
    }
    if !lock.is_active() {
        return Err(AppError::InvalidState(
            "The focus session has already ended".to_string(),
        ));
    }
    Ok(lock)
}

fn validate_device_id(device_id: &str) -> Result<(), AppError> {
    let trimmed = device_id.trim();
    if trimmed.is_empty() || trimmed.chars().count() > DEVICE_ID_MAX_CHARS {
        return Err(AppError::Validation(format!(
            "device_id must be 1 to {} characters",
            DEVICE_ID_MAX_CHARS
        )));
    }
    Ok(())
}
