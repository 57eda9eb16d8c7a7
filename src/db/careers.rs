//! # 커리어 수명주기 쿼리 모듈
//!
//! 커리어 생성/활성화/보관/이름 변경을 담당합니다.
//!
//! ## 불변 조건
//! - 사용자당 `active` 커리어는 최대 하나 (`idx_careers_one_active` 부분 유니크 인덱스로도 강제)
//! - 세션이 진행 중(`active_sessions.status = 'active'`)이면 어떤 수명주기 연산도 거부
//!   → 집계 트랜잭션은 시작 시점에 고정된 커리어를 신뢰하기 때문입니다.
//! - 생성+활성화/활성화는 이전 활성 커리어의 보관과 같은 트랜잭션에서 커밋됩니다.
//!   성공한 호출 이후 활성 커리어가 0개이거나 2개인 순간은 관찰되지 않습니다.

use crate::db::{accounts::require_account, sessions::find_lock, store::begin_write};
use crate::error::AppError;
use crate::models::*;
use crate::services::calendar::format_timestamp;
use chrono::{DateTime, Utc};
use sqlx::{Executor, Sqlite, SqliteConnection, SqlitePool};

/// 사용자의 모든 커리어를 조회합니다 (활성 커리어 먼저, 이후 최근 생성순).
pub async fn list_careers(pool: &SqlitePool, uid: &str) -> Result<Vec<Career>, AppError> {
    let careers = sqlx::query_as::<_, Career>(
        r#"
        SELECT id, owner_uid, title, status, created_at, activated_at, archived_at,
               total_focus_sec, total_sessions
        FROM careers
        WHERE owner_uid = ?
        ORDER BY status = 'active' DESC, created_at DESC
        "#,
    )
    .bind(uid)
    .fetch_all(pool)
    .await?;

    Ok(careers)
}

/// 사용자 소유의 커리어 하나를 조회합니다. 다른 사용자의 커리어는 None으로 보입니다.
pub async fn find_career<'e, E>(
    executor: E,
    uid: &str,
    id: &str,
) -> Result<Option<Career>, AppError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let career = sqlx::query_as::<_, Career>(
        r#"
        SELECT id, owner_uid, title, status, created_at, activated_at, archived_at,
               total_focus_sec, total_sessions
        FROM careers
        WHERE id = ? AND owner_uid = ?
        "#,
    )
    .bind(id)
    .bind(uid)
    .fetch_optional(executor)
    .await?;

    Ok(career)
}

/// 새 커리어를 만들고 활성화합니다. 기존 활성 커리어는 같은 커밋에서 보관됩니다.
pub async fn create_and_activate(
    pool: &SqlitePool,
    uid: &str,
    raw_title: &str,
    now: DateTime<Utc>,
) -> Result<Career, AppError> {
    // 제목 검증은 트랜잭션 밖에서: 검증 실패는 트랜잭션 실패가 아닙니다.
    let title = normalize_title(raw_title)?;

    let mut tx = begin_write(pool, uid, now).await?;
    ensure_no_active_session(&mut tx, uid).await?;
    let career = activate_new(&mut tx, uid, &title, now).await?;
    tx.commit().await?;

    tracing::info!(uid = %uid, career_id = %career.id, "career created and activated");
    Ok(career)
}

/// 활성 커리어를 돌려주고, 없으면 기본 제목으로 새로 만들어 활성화합니다.
pub async fn ensure_primary_career(
    pool: &SqlitePool,
    uid: &str,
    default_title: &str,
    now: DateTime<Utc>,
) -> Result<Career, AppError> {
    let title = normalize_title(default_title)?;

    let mut tx = begin_write(pool, uid, now).await?;
    let account = require_account(&mut *tx, uid).await?;
    if let Some(active_id) = account.active_career_id.as_deref() {
        if let Some(career) = find_career(&mut *tx, uid, active_id).await? {
            if career.is_active() {
                tx.commit().await?;
                return Ok(career);
            }
        }
    }

    ensure_no_active_session(&mut tx, uid).await?;
    let career = activate_new(&mut tx, uid, &title, now).await?;
    tx.commit().await?;

    tracing::info!(uid = %uid, career_id = %career.id, "primary career bootstrapped");
    Ok(career)
}

/// 기존(보관된) 커리어를 다시 활성화합니다.
///
/// 이미 활성 상태면 아무것도 바꾸지 않고 그대로 돌려줍니다.
pub async fn activate_career(
    pool: &SqlitePool,
    uid: &str,
    id: &str,
    now: DateTime<Utc>,
) -> Result<Career, AppError> {
    let mut tx = begin_write(pool, uid, now).await?;
    ensure_no_active_session(&mut tx, uid).await?;

    let mut career = find_career(&mut *tx, uid, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Career {}", id)))?;

    if career.is_active() {
        // 포인터가 어긋나 있었다면 바로잡습니다.
        set_active_pointer(&mut tx, uid, Some(&career.id)).await?;
        tx.commit().await?;
        return Ok(career);
    }

    archive_current(&mut tx, uid, now).await?;

    let activated_at = format_timestamp(now);
    sqlx::query(
        r#"
        UPDATE careers
        SET status = 'active', activated_at = ?, archived_at = NULL
        WHERE id = ? AND owner_uid = ?
        "#,
    )
    .bind(&activated_at)
    .bind(id)
    .bind(uid)
    .execute(&mut *tx)
    .await?;
    set_active_pointer(&mut tx, uid, Some(id)).await?;

    tx.commit().await?;

    career.status = CareerStatus::Active;
    career.activated_at = activated_at;
    career.archived_at = None;
    tracing::info!(uid = %uid, career_id = %id, "career activated");
    Ok(career)
}

/// 활성 커리어를 보관합니다. 이후 계정에는 활성 커리어가 없습니다.
pub async fn archive_career(
    pool: &SqlitePool,
    uid: &str,
    id: &str,
    now: DateTime<Utc>,
) -> Result<Career, AppError> {
    let mut tx = begin_write(pool, uid, now).await?;
    ensure_no_active_session(&mut tx, uid).await?;

    let mut career = find_career(&mut *tx, uid, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Career {}", id)))?;
    if !career.is_active() {
        return Err(AppError::InvalidState(
            "Only the active career can be archived".to_string(),
        ));
    }

    archive_current(&mut tx, uid, now).await?;
    tx.commit().await?;

    career.status = CareerStatus::Archived;
    career.archived_at = Some(format_timestamp(now));
    tracing::info!(uid = %uid, career_id = %id, "career archived");
    Ok(career)
}

/// 커리어 이름을 바꿉니다. 보관된 커리어는 바꿀 수 없습니다.
pub async fn rename_career(
    pool: &SqlitePool,
    uid: &str,
    id: &str,
    raw_title: &str,
    now: DateTime<Utc>,
) -> Result<Career, AppError> {
    let title = normalize_title(raw_title)?;

    let mut tx = begin_write(pool, uid, now).await?;
    ensure_no_active_session(&mut tx, uid).await?;

    let mut career = find_career(&mut *tx, uid, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Career {}", id)))?;
    if !career.is_active() {
        return Err(AppError::InvalidState(
            "Archived careers cannot be renamed".to_string(),
        ));
    }

    sqlx::query("UPDATE careers SET title = ? WHERE id = ? AND owner_uid = ?")
        .bind(&title)
        .bind(id)
        .bind(uid)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    career.title = title;
    Ok(career)
}

// ── 트랜잭션 내부 헬퍼 ──

/// 진행 중인 세션이 있으면 `SessionInProgress`로 거부합니다.
async fn ensure_no_active_session(conn: &mut SqliteConnection, uid: &str) -> Result<(), AppError> {
    match find_lock(&mut *conn, uid).await? {
        Some(lock) if lock.is_active() => {
            tracing::warn!(uid = %uid, "career change rejected: session in progress");
            Err(AppError::SessionInProgress)
        }
        _ => Ok(()),
    }
}

/// 현재 활성 커리어(있다면)를 보관하고 계정 포인터를 비웁니다.
async fn archive_current(conn: &mut SqliteConnection, uid: &str, now: DateTime<Utc>) -> Result<(), AppError> {
    sqlx::query(
        r#"
        UPDATE careers
        SET status = 'archived', archived_at = ?
        WHERE owner_uid = ? AND status = 'active'
        "#,
    )
    .bind(format_timestamp(now))
    .bind(uid)
    .execute(&mut *conn)
    .await?;

    set_active_pointer(conn, uid, None).await
}

/// 기존 활성 커리어를 보관한 뒤 새 커리어를 활성 상태로 삽입합니다.
async fn activate_new(
    conn: &mut SqliteConnection,
    uid: &str,
    title: &str,
    now: DateTime<Utc>,
) -> Result<Career, AppError> {
    archive_current(&mut *conn, uid, now).await?;

    let id = uuid::Uuid::now_v7().to_string();
    let at = format_timestamp(now);
    sqlx::query(
        r#"
        INSERT INTO careers (id, owner_uid, title, status, created_at, activated_at)
        VALUES (?, ?, ?, 'active', ?, ?)
        "#,
    )
    .bind(&id)
    .bind(uid)
    .bind(title)
    .bind(&at)
    .bind(&at)
    .execute(&mut *conn)
    .await?;
    set_active_pointer(&mut *conn, uid, Some(&id)).await?;

    Ok(Career {
        id,
        owner_uid: uid.to_string(),
        title: title.to_string(),
        status: CareerStatus::Active,
        created_at: at.clone(),
        activated_at: at,
        archived_at: None,
        total_focus_sec: 0,
        total_sessions: 0,
    })
}

async fn set_active_pointer(
    conn: &mut SqliteConnection,
    uid: &str,
    career_id: Option<&str>,
) -> Result<(), AppError> {
    sqlx::query("UPDATE accounts SET active_career_id = ? WHERE uid = ?")
        .bind(career_id)
        .bind(uid)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{find_account, sessions::start_session, test_support::*};

    #[tokio::test]
    async fn create_and_activate_archives_previous_career() {
        let pool = memory_pool().await;
        let now = at(2024, 1, 1, 9, 0, 0);

        let first = create_and_activate(&pool, "u1", "Novelist", now).await.unwrap();
        let second = create_and_activate(&pool, "u1", "Painter", now).await.unwrap();

        let careers = list_careers(&pool, "u1").await.unwrap();
        assert_eq!(careers.len(), 2);
        assert_eq!(careers[0].id, second.id);
        assert!(careers[0].is_active());
        let old = careers.iter().find(|c| c.id == first.id).unwrap();
        assert_eq!(old.status, CareerStatus::Archived);
        assert!(old.archived_at.is_some());

        let account = find_account(&pool, "u1").await.unwrap().unwrap();
        assert_eq!(account.active_career_id.as_deref(), Some(second.id.as_str()));
    }

    #[tokio::test]
    async fn lifecycle_is_blocked_while_a_session_runs() {
        let pool = memory_pool().await;
        let now = at(2024, 1, 1, 9, 0, 0);
        let career = create_and_activate(&pool, "u1", "Novelist", now).await.unwrap();
        start_session(&pool, "u1", &career.id, "laptop", 1500, now).await.unwrap();

        let err = create_and_activate(&pool, "u1", "Painter", now).await.unwrap_err();
        assert!(matches!(err, AppError::SessionInProgress));
        let err = rename_career(&pool, "u1", &career.id, "Poet", now).await.unwrap_err();
        assert!(matches!(err, AppError::SessionInProgress));
        let err = archive_career(&pool, "u1", &career.id, now).await.unwrap_err();
        assert!(matches!(err, AppError::SessionInProgress));

        // 커리어 집합은 그대로
        let careers = list_careers(&pool, "u1").await.unwrap();
        assert_eq!(careers.len(), 1);
        assert_eq!(careers[0].title, "Novelist");
        assert!(careers[0].is_active());
    }

    #[tokio::test]
    async fn activate_restores_archived_career() {
        let pool = memory_pool().await;
        let now = at(2024, 1, 1, 9, 0, 0);
        let first = create_and_activate(&pool, "u1", "Novelist", now).await.unwrap();
        let second = create_and_activate(&pool, "u1", "Painter", now).await.unwrap();

        let restored = activate_career(&pool, "u1", &first.id, at(2024, 1, 2, 9, 0, 0))
            .await
            .unwrap();
        assert!(restored.is_active());
        assert!(restored.archived_at.is_none());

        let other = find_career(&pool, "u1", &second.id).await.unwrap().unwrap();
        assert_eq!(other.status, CareerStatus::Archived);
        let active: Vec<_> = list_careers(&pool, "u1")
            .await
            .unwrap()
            .into_iter()
            .filter(Career::is_active)
            .collect();
        assert_eq!(active.len(), 1);
    }

    #[tokio::test]
    async fn archive_leaves_no_active_career() {
        let pool = memory_pool().await;
        let now = at(2024, 1, 1, 9, 0, 0);
        let career = create_and_activate(&pool, "u1", "Novelist", now).await.unwrap();

        let archived = archive_career(&pool, "u1", &career.id, now).await.unwrap();
        assert_eq!(archived.status, CareerStatus::Archived);

        let account = find_account(&pool, "u1").await.unwrap().unwrap();
        assert!(account.active_career_id.is_none());

        let err = archive_career(&pool, "u1", &career.id, now).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidState(_)));
    }

    #[tokio::test]
    async fn rename_rejects_archived_and_invalid_titles() {
        let pool = memory_pool().await;
        let now = at(2024, 1, 1, 9, 0, 0);
        let first = create_and_activate(&pool, "u1", "Novelist", now).await.unwrap();
        let second = create_and_activate(&pool, "u1", "Painter", now).await.unwrap();

        let err = rename_career(&pool, "u1", &first.id, "Poet", now).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidState(_)));

        let err = rename_career(&pool, "u1", &second.id, "x", now).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let renamed = rename_career(&pool, "u1", &second.id, "  Illustrator ", now)
            .await
            .unwrap();
        assert_eq!(renamed.title, "Illustrator");
    }

    #[tokio::test]
    async fn careers_of_other_users_are_invisible() {
        let pool = memory_pool().await;
        let now = at(2024, 1, 1, 9, 0, 0);
        let career = create_and_activate(&pool, "u1", "Novelist", now).await.unwrap();

        let err = activate_career(&pool, "u2", &career.id, now).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert!(list_careers(&pool, "u2").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn ensure_primary_is_idempotent() {
        let pool = memory_pool().await;
        let now = at(2024, 1, 1, 9, 0, 0);

        let first = ensure_primary_career(&pool, "u1", "My main career", now).await.unwrap();
        let again = ensure_primary_career(&pool, "u1", "My main career", now).await.unwrap();
        assert_eq!(first.id, again.id);
        assert_eq!(list_careers(&pool, "u1").await.unwrap().len(), 1);
    }
}
