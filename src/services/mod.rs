//! # 서비스 모듈
//!
//! DB나 HTTP에 의존하지 않는 순수 로직을 모아둔 모듈입니다.
//! - `calendar`: day-key / ISO week-key 계산과 타임스탬프 변환
//! - `clock`: 현재 시각을 제공하는 `Clock` 트레이트

pub mod calendar;
pub mod clock;

pub use clock::{Clock, SystemClock};
