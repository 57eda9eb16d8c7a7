//! # 라우트 핸들러 모듈
//!
//! HTTP 요청을 처리하는 핸들러 함수들을 모아둔 모듈입니다.
//! 핸들러는 요청에서 `uid`(AuthUser)와 본문을 추출하고, 시계에서 현재 시각을 얻어
//! `db` 모듈의 코어 연산에 명시적으로 넘깁니다. 핸들러 자신은 상태를 갖지 않습니다.
//!
//! 각 하위 모듈:
//! - `account`: 계정 요약 (`/me`)
//! - `careers`: 커리어 수명주기
//! - `health`: 서버 상태 확인 (헬스체크)
//! - `sessions`: 집중 세션 시작/하트비트/종료
//! - `stats`: 세션 기록과 집계 조회

pub mod account;
pub mod careers;
pub mod health;
pub mod sessions;
pub mod stats;

pub use account::*;
pub use careers::*;
pub use health::*;
pub use sessions::*;
pub use stats::*;

use crate::config::SessionPolicy;
use crate::services::Clock;
use sqlx::SqlitePool;
use std::sync::Arc;

/// 애플리케이션 공유 상태
///
/// 모든 요청 핸들러가 `State(state): State<AppState>`로 접근합니다.
/// SqlitePool과 Arc는 clone해도 같은 대상을 가리킵니다.
#[derive(Clone)]
pub struct AppState {
    /// SQLite 연결 풀
    pub pool: SqlitePool,
    /// JWT 검증용 비밀키
    pub jwt_secret: String,
    /// 현재 시각 제공자
    pub clock: Arc<dyn Clock>,
    /// 세션 길이 기본값/상한, 기본 커리어 이름
    pub session: SessionPolicy,
}
