//! # 계정 요약 핸들러
//!
//! - `GET /api/v1/me?time_zone=Asia/Seoul` → 누적/오늘 집중 시간과 활성 커리어
//!
//! 오늘 카운터는 요청 시간대의 day-key와 `today_key`가 다르면 0으로 보여줍니다.

use crate::{
    db,
    error::AppError,
    middleware::auth::AuthUser,
    models::*,
    routes::AppState,
    services::calendar::{day_key, resolve_time_zone},
};
use axum::{
    extract::{Query, State},
    Json,
};

pub async fn get_account_summary(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(query): Query<TimeZoneQuery>,
) -> Result<Json<AccountSummary>, AppError> {
    let tz = resolve_time_zone(query.time_zone.as_deref())?;
    let today = day_key(state.clock.now(), tz);

    let summary = match db::find_account(&state.pool, &auth_user.uid).await? {
        Some(account) => AccountSummary::new(account, today),
        // 아직 한 번도 쓰기 연산을 하지 않은 사용자
        None => AccountSummary {
            uid: auth_user.uid,
            active_career_id: None,
            lifetime_focus_sec: 0,
            today_focus_sec: 0,
            today_key: today,
        },
    };

    Ok(Json(summary))
}
