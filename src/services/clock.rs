//! # 시계(Clock) 추상화
//!
//! 코어 연산은 "현재 시각"을 직접 읽지 않고 매개변수로 받습니다.
//! 라우트 핸들러가 `AppState`의 시계에서 시각을 얻어 전달합니다.

use chrono::{DateTime, Utc};

/// 현재 시각을 제공하는 외부 협력자
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// 시스템 시계 (운영 환경)
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
