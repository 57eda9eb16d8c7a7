//! # 집계 통계 모델
//!
//! 일/주/전체 집계는 모두 같은 카운터 모양(`total_focus_sec`, `total_sessions`)을 가지며
//! 세션 종료 트랜잭션에서만 증분 갱신됩니다. 원본 기록으로부터 재계산하지 않습니다.

use serde::{Deserialize, Serialize};

/// 사용자×날짜 집계
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct DailyStat {
    pub day_key: String,
    pub total_focus_sec: i64,
    pub total_sessions: i64,
    pub updated_at: String,
}

/// 사용자×ISO 주차 집계
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct WeeklyStat {
    pub week_key: String,
    pub total_focus_sec: i64,
    pub total_sessions: i64,
    /// 아직 집계가 없으면 None
    pub updated_at: Option<String>,
}

/// 사용자 전체 집계
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct GlobalStat {
    pub total_focus_sec: i64,
    pub total_sessions: i64,
    pub updated_at: Option<String>,
}

/// `GET /api/v1/stats/daily` 쿼리 파라미터
#[derive(Debug, Default, Deserialize)]
pub struct DailyTotalsQuery {
    pub days: Option<u32>,
    pub time_zone: Option<String>,
}
