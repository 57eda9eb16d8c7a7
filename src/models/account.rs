//! # 사용자 계정 모델
//!
//! 계정은 활성 커리어 포인터와 누적 집중 시간 카운터를 가집니다.
//! `today_focus_sec`는 `today_key`가 오늘의 day-key와 같을 때만 유효합니다.

use serde::{Deserialize, Serialize};

/// 계정 엔티티 — DB의 `accounts` 테이블 한 행에 대응합니다.
///
/// 세션 잠금 하위 시스템이 소유하며,
/// 집계 트랜잭션과 커리어 수명주기 전환만 이 행을 변경합니다.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Account {
    /// 외부 인증 서버가 발급한 사용자 식별자 (불투명 문자열)
    pub uid: String,
    /// 현재 활성 커리어 ID — 없으면 None
    pub active_career_id: Option<String>,
    /// 평생 누적 집중 시간 (초)
    pub lifetime_focus_sec: i64,
    /// `today_key` 날짜의 누적 집중 시간 (초)
    pub today_focus_sec: i64,
    /// `today_focus_sec`가 가리키는 day-key (아직 세션이 없으면 빈 문자열)
    pub today_key: String,
    pub created_at: String,
}

impl Account {
    /// "오늘" 카운터를 읽습니다. `today_key`가 지난 날이면 0으로 취급합니다.
    pub fn focus_sec_on(&self, day_key: &str) -> i64 {
        if self.today_key == day_key {
            self.today_focus_sec
        } else {
            0
        }
    }
}

/// `GET /api/v1/me` 응답
#[derive(Debug, Clone, Serialize)]
pub struct AccountSummary {
    pub uid: String,
    pub active_career_id: Option<String>,
    pub lifetime_focus_sec: i64,
    /// 요청 시간대 기준 오늘의 집중 시간 (날짜가 바뀌었으면 0)
    pub today_focus_sec: i64,
    pub today_key: String,
}

impl AccountSummary {
    pub fn new(account: Account, today_key: String) -> Self {
        let today_focus_sec = account.focus_sec_on(&today_key);
        Self {
            uid: account.uid,
            active_career_id: account.active_career_id,
            lifetime_focus_sec: account.lifetime_focus_sec,
            today_focus_sec,
            today_key,
        }
    }
}

/// 시간대만 받는 공통 쿼리 파라미터 (`?time_zone=Asia/Seoul`)
#[derive(Debug, Default, Deserialize)]
pub struct TimeZoneQuery {
    pub time_zone: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(today_key: &str, today_focus_sec: i64) -> Account {
        Account {
            uid: "u1".into(),
            active_career_id: None,
            lifetime_focus_sec: 900,
            today_focus_sec,
            today_key: today_key.into(),
            created_at: "2024-01-01T00:00:00.000Z".into(),
        }
    }

    #[test]
    fn stale_today_counter_reads_as_zero() {
        let summary = AccountSummary::new(account("2024-01-01", 500), "2024-01-02".into());
        assert_eq!(summary.today_focus_sec, 0);
        assert_eq!(summary.lifetime_focus_sec, 900);
    }

    #[test]
    fn current_today_counter_is_kept() {
        let summary = AccountSummary::new(account("2024-01-02", 500), "2024-01-02".into());
        assert_eq!(summary.today_focus_sec, 500);
    }
}
