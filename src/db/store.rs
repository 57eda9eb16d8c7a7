//! # 원자적 쓰기 트랜잭션
//!
//! 모든 변경 연산(세션 시작/하트비트/종료, 커리어 수명주기)은
//! `begin_write()`로 시작한 하나의 트랜잭션 안에서 읽기와 쓰기를 모두 수행합니다.
//!
//! ## 쓰기 선점(write claim)
//! SQLite의 기본 `BEGIN`(DEFERRED)은 첫 읽기에서 공유 잠금만 잡습니다.
//! 두 트랜잭션이 같은 잠금 행을 읽은 뒤 동시에 쓰려고 하면 한쪽이 즉시 `SQLITE_BUSY`로 실패하고,
//! 최악의 경우 둘 다 "잠금 없음"을 관찰할 수 있습니다.
//!
//! 그래서 트랜잭션의 **첫 문장을 계정 행 upsert(쓰기)**로 시작합니다.
//! 쓰기 문장은 시작과 동시에 DB 쓰기 잠금을 얻어야 하므로,
//! 다른 쓰기 트랜잭션은 `busy_timeout` 동안 기다렸다가 커밋된 최신 상태를 읽게 됩니다.
//! 결과적으로 같은 사용자에 대한 잠금 전환은 커밋 순서대로 완전히 직렬화됩니다.
//!
//! ```text
//! begin_write(uid) ─▶ 읽기(잠금/계정/커리어) ─▶ 검사 ─▶ 쓰기들 ─▶ commit()
//!                                             └─ Err ─▶ drop(tx) = ROLLBACK
//! ```

use crate::error::AppError;
use crate::services::calendar::format_timestamp;
use chrono::{DateTime, Utc};
use sqlx::{Sqlite, SqlitePool, Transaction};

/// 한 번의 원자적 read-modify-write 단위
pub type WriteTx = Transaction<'static, Sqlite>;

/// 사용자 `uid`에 대한 쓰기 트랜잭션을 시작합니다.
///
/// 계정 행이 없으면 이 자리에서 만들어지므로,
/// 이후 쿼리는 항상 계정이 존재한다고 가정할 수 있습니다.
/// 반환된 트랜잭션을 `commit()`하지 않고 drop하면 모든 변경이 롤백됩니다.
pub async fn begin_write(
    pool: &SqlitePool,
    uid: &str,
    now: DateTime<Utc>,
) -> Result<WriteTx, AppError> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO accounts (uid, created_at)
        VALUES (?, ?)
        ON CONFLICT(uid) DO NOTHING
        "#,
    )
    .bind(uid)
    .bind(format_timestamp(now))
    .execute(&mut *tx)
    .await?;

    Ok(tx)
}
