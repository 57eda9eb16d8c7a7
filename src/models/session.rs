//! # 집중 세션 모델 정의
//!
//! 활성 세션 잠금(사용자당 한 행)과 완료된 집중 세션 기록을 정의합니다.
//!
//! ## 세션 흐름
//! 1. `StartSessionRequest`로 잠금 획득 (status = active)
//! 2. 잠금을 보유한 기기가 `HeartbeatRequest`로 주기적으로 생존 신호 전송
//! 3. `EndSessionRequest`로 종료 → 세션 기록 생성 + 집계 갱신 + 잠금 해제(status = ended)

use serde::{Deserialize, Serialize};

/// 잠금 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum LockStatus {
    Active,
    Ended,
}

/// 활성 세션 잠금 — DB의 `active_sessions` 테이블 한 행에 대응합니다.
///
/// 사용자별 뮤텍스 역할을 합니다. `status = active`인 행이 있으면
/// 그 사용자는 세션이 진행 중이며, `device_id`가 잠금 소유자 토큰입니다.
/// 종료 시 삭제하지 않고 `ended`로 전환하여 감사 기록으로 남깁니다.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ActiveSessionLock {
    pub uid: String,
    /// 시작 시점에 고정된 커리어
    pub career_id: String,
    pub start_at: String,
    /// 할당된 집중 시간 (초). 종료 시 이 값을 넘겨 적립하지 않습니다.
    pub duration_sec: i64,
    pub device_id: String,
    pub heartbeat_at: String,
    pub status: LockStatus,
}

impl ActiveSessionLock {
    pub fn is_active(&self) -> bool {
        self.status == LockStatus::Active
    }
}

/// `GET /api/v1/session` 응답 — 잠금과 파생 값
///
/// `heartbeat_age_sec`로 응답이 끊긴 기기를 감지할 수 있지만,
/// 서버는 잠금을 자동으로 회수하지 않습니다.
#[derive(Debug, Clone, Serialize)]
pub struct LockView {
    #[serde(flatten)]
    pub lock: ActiveSessionLock,
    pub remaining_sec: i64,
    pub heartbeat_age_sec: i64,
}

/// 완료된 집중 세션 기록 — DB의 `focus_sessions` 테이블 한 행 (불변)
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct FocusSessionRecord {
    pub id: String,
    pub owner_uid: String,
    pub career_id: String,
    pub start_at: String,
    /// 실제 적립된 시간 = min(경과 시간, 할당 시간)
    pub duration_sec: i64,
    pub day_key: String,
    pub created_at: String,
}

/// 세션 시작 요청 — `POST /api/v1/session/start`
#[derive(Debug, Deserialize)]
pub struct StartSessionRequest {
    /// 클라이언트가 알고 있는 활성 커리어 ID (커리어 전환 경쟁 감지용)
    pub career_id: String,
    pub device_id: String,
    /// 선택 — 없으면 서버 기본값 (1500초)
    pub duration_sec: Option<i64>,
}

/// 하트비트 요청 — `POST /api/v1/session/heartbeat`
#[derive(Debug, Deserialize)]
pub struct HeartbeatRequest {
    pub device_id: String,
}

#[derive(Debug, Serialize)]
pub struct HeartbeatResponse {
    pub heartbeat_at: String,
}

/// 세션 종료 요청 — `POST /api/v1/session/end`
#[derive(Debug, Deserialize)]
pub struct EndSessionRequest {
    pub device_id: String,
    /// IANA 시간대 이름 (예: "Asia/Seoul"). 없으면 UTC 기준으로 day-key를 계산합니다.
    pub time_zone: Option<String>,
}

/// 세션 종료 결과
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EndSessionOutcome {
    pub duration_sec: i64,
    pub session_id: String,
    pub day_key: String,
    pub week_key: String,
}

/// `GET /api/v1/sessions` 쿼리 파라미터
#[derive(Debug, Default, Deserialize)]
pub struct ListSessionsQuery {
    pub day_key: Option<String>,
    pub limit: Option<i64>,
}
