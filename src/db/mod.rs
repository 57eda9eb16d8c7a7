//! # 데이터베이스 접근 계층 (Data Access Layer)
//!
//! 트랜잭션 키-문서 저장소(SQLite)와 직접 상호작용하는 함수들을 모아둔 모듈입니다.
//! 라우트 핸들러(routes/)에서 이 모듈의 함수를 호출합니다.
//!
//! 각 하위 모듈:
//! - `store`: 쓰기 선점 트랜잭션 (`begin_write`)
//! - `accounts`: 계정 조회
//! - `careers`: 커리어 수명주기 (생성+활성화, 활성화, 보관, 이름 변경)
//! - `sessions`: 활성 세션 잠금 (시작, 하트비트, 종료)
//! - `aggregation`: 세션 종료 시 기록 + 4개 집계 + 계정 카운터를 한 번에 커밋
//! - `stats`: 세션 기록과 집계 조회

pub mod accounts;
pub mod aggregation;
pub mod careers;
pub mod sessions;
pub mod stats;
pub mod store;

pub use accounts::*;
pub use careers::*;
pub use sessions::*;
pub use stats::*;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::time::Duration;

/// 다른 쓰기 트랜잭션이 끝나기를 기다리는 최대 시간
const BUSY_TIMEOUT: Duration = Duration::from_secs(10);

/// SQLite 연결 풀을 생성합니다.
///
/// - 파일이 없으면 새로 만듭니다.
/// - WAL 저널 모드: 읽기는 쓰기를 막지 않습니다.
/// - `busy_timeout`: 쓰기 잠금 경합 시 즉시 실패하지 않고 대기합니다.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true)
        .busy_timeout(BUSY_TIMEOUT);

    SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await
}

/// 아직 적용되지 않은 마이그레이션을 순서대로 실행합니다.
pub async fn migrate(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
