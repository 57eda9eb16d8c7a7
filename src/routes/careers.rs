//! # 커리어 API 라우트 핸들러
//!
//! ## 엔드포인트 목록
//! | 메서드 | 경로 | 핸들러 | 설명 |
//! |--------|------|--------|------|
//! | GET | /api/v1/careers | `list_careers` | 내 커리어 목록 (활성 먼저) |
//! | POST | /api/v1/careers | `create_career` | 새 커리어 생성 + 활성화 |
//! | POST | /api/v1/careers/primary | `ensure_primary_career` | 활성 커리어 조회, 없으면 기본 커리어 생성 |
//! | PATCH | /api/v1/careers/{id} | `rename_career` | 이름 변경 |
//! | POST | /api/v1/careers/{id}/activate | `activate_career` | 보관된 커리어 재활성화 |
//! | POST | /api/v1/careers/{id}/archive | `archive_career` | 활성 커리어 보관 |
//!
//! 세션이 진행 중이면 생성/활성화/보관/이름 변경은 모두 409 `session_in_progress`로 거부됩니다.

use crate::{db, error::AppError, middleware::auth::AuthUser, models::*, routes::AppState};
use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};

/// `GET /careers` → `{ "careers": [...] }`
pub async fn list_careers(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Value>, AppError> {
    let careers = db::list_careers(&state.pool, &auth_user.uid).await?;
    Ok(Json(json!({ "careers": careers })))
}

/// `POST /careers` + `{ "title": "소설 쓰기" }`
pub async fn create_career(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(req): Json<CareerTitleRequest>,
) -> Result<Json<Career>, AppError> {
    let career =
        db::create_and_activate(&state.pool, &auth_user.uid, &req.title, state.clock.now()).await?;
    Ok(Json(career))
}

/// `POST /careers/primary` — 앱 첫 진입 시 호출합니다.
pub async fn ensure_primary_career(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Career>, AppError> {
    let career = db::ensure_primary_career(
        &state.pool,
        &auth_user.uid,
        &state.session.default_career_title,
        state.clock.now(),
    )
    .await?;
    Ok(Json(career))
}

/// `PATCH /careers/{id}` + `{ "title": "..." }`
pub async fn rename_career(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
    Json(req): Json<CareerTitleRequest>,
) -> Result<Json<Career>, AppError> {
    let career =
        db::rename_career(&state.pool, &auth_user.uid, &id, &req.title, state.clock.now()).await?;
    Ok(Json(career))
}

/// `POST /careers/{id}/activate`
pub async fn activate_career(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Career>, AppError> {
    let career = db::activate_career(&state.pool, &auth_user.uid, &id, state.clock.now()).await?;
    Ok(Json(career))
}

/// `POST /careers/{id}/archive`
pub async fn archive_career(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Career>, AppError> {
    let career = db::archive_career(&state.pool, &auth_user.uid, &id, state.clock.now()).await?;
    Ok(Json(career))
}
