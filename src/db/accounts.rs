//! # 계정 조회 쿼리
//!
//! 계정 행은 `store::begin_write()`가 처음 쓰기 연산 때 만들고,
//! 카운터는 `aggregation` 모듈만 변경합니다.

use crate::error::AppError;
use crate::models::Account;
use sqlx::{Executor, Sqlite};

/// 계정 하나를 조회합니다. 아직 한 번도 쓰기 연산을 하지 않은 사용자면 None.
///
/// `executor`에는 `&SqlitePool`이나 트랜잭션 안의 `&mut *tx`를 모두 넘길 수 있습니다.
pub async fn find_account<'e, E>(executor: E, uid: &str) -> Result<Option<Account>, AppError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let account = sqlx::query_as::<_, Account>(
        r#"
        SELECT uid, active_career_id, lifetime_focus_sec, today_focus_sec, today_key, created_at
        FROM accounts
        WHERE uid = ?
        "#,
    )
    .bind(uid)
    .fetch_optional(executor)
    .await?;

    Ok(account)
}

/// 트랜잭션 안에서 계정을 읽습니다. `begin_write()` 이후에는 항상 존재해야 합니다.
pub(crate) async fn require_account<'e, E>(executor: E, uid: &str) -> Result<Account, AppError>
where
    E: Executor<'e, Database = Sqlite>,
{
    find_account(executor, uid)
        .await?
        .ok_or_else(|| AppError::Internal(format!("Account {} missing inside write claim", uid)))
}
