//! # 집중 세션 API 라우트 핸들러
//!
//! ## 엔드포인트 목록
//! | 메서드 | 경로 | 핸들러 | 설명 |
//! |--------|------|--------|------|
//! | GET | /api/v1/session | `get_current_session` | 현재 잠금 (없으면 null) |
//! | POST | /api/v1/session/start | `start_focus_session` | 세션 시작 (잠금 획득) |
//! | POST | /api/v1/session/heartbeat | `heartbeat_focus_session` | 생존 신호 |
//! | POST | /api/v1/session/end | `end_focus_session` | 종료 + 집계 |
//! | GET | /api/v1/sessions | `list_focus_sessions` | 완료된 세션 기록 |
//!
//! ## 클라이언트 사용 흐름
//! ```text
//! 1. POST /session/start      → 409 conflict면 다른 기기(또는 탭)에서 진행 중
//! 2. 45초마다 POST /session/heartbeat (실패는 무시해도 됨)
//! 3. 남은 시간 = duration_sec - 경과 시간, 0이 되면 POST /session/end
//! ```

use crate::{
    db,
    error::AppError,
    middleware::auth::AuthUser,
    models::*,
    routes::AppState,
    services::calendar::resolve_time_zone,
};
use axum::{
    extract::{Query, State},
    Json,
};
use serde_json::{json, Value};

/// 세션 기록 목록 기본 개수
const DEFAULT_SESSION_PAGE: i64 = 100;

/// `GET /session` → `LockView` 또는 `null`
pub async fn get_current_session(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Option<LockView>>, AppError> {
    let view = db::current_lock(&state.pool, &auth_user.uid, state.clock.now()).await?;
    Ok(Json(view))
}

/// `POST /session/start` + `{ "career_id": "...", "device_id": "...", "duration_sec": 1500 }`
///
/// `duration_sec`가 없으면 서버 기본값을 사용합니다.
pub async fn start_focus_session(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(req): Json<StartSessionRequest>,
) -> Result<Json<ActiveSessionLock>, AppError> {
    let duration_sec = req
        .duration_sec
        .unwrap_or(state.session.default_duration_sec);
    if duration_sec > state.session.max_duration_sec {
        return Err(AppError::Validation(format!(
            "duration_sec must not exceed {}",
            state.session.max_duration_sec
        )));
    }

    let lock = db::start_session(
        &state.pool,
        &auth_user.uid,
        &req.career_id,
        &req.device_id,
        duration_sec,
        state.clock.now(),
    )
    .await?;

    Ok(Json(lock))
}

/// `POST /session/heartbeat` + `{ "device_id": "..." }`
pub async fn heartbeat_focus_session(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(req): Json<HeartbeatRequest>,
) -> Result<Json<HeartbeatResponse>, AppError> {
    let heartbeat_at =
        db::heartbeat(&state.pool, &auth_user.uid, &req.device_id, state.clock.now()).await?;
    Ok(Json(HeartbeatResponse { heartbeat_at }))
}

/// `POST /session/end` + `{ "device_id": "...", "time_zone": "Asia/Seoul" }`
///
/// → `{ "duration_sec": 1500, "session_id": "...", "day_key": "...", "week_key": "..." }`
pub async fn end_focus_session(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(req): Json<EndSessionRequest>,
) -> Result<Json<EndSessionOutcome>, AppError> {
    // 알 수 없는 시간대는 트랜잭션을 시작하기 전에 거부합니다.
    let tz = resolve_time_zone(req.time_zone.as_deref())?;

    let outcome = db::end_session(
        &state.pool,
        &auth_user.uid,
        &req.device_id,
        tz,
        state.clock.now(),
    )
    .await?;

    Ok(Json(outcome))
}

/// `GET /sessions?day_key=2024-01-02&limit=50` → `{ "sessions": [...] }`
pub async fn list_focus_sessions(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(query): Query<ListSessionsQuery>,
) -> Result<Json<Value>, AppError> {
    let sessions = db::list_sessions(
        &state.pool,
        &auth_user.uid,
        query.day_key.as_deref(),
        query.limit.unwrap_or(DEFAULT_SESSION_PAGE),
    )
    .await?;

    Ok(Json(json!({ "sessions": sessions })))
}
