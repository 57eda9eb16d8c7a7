//! # 데이터 모델 모듈
//!
//! 애플리케이션에서 사용하는 데이터 구조체(struct)들을 정의합니다.
//! 각 하위 모듈은 특정 도메인의 데이터 타입을 담당합니다:
//! - `account`: 사용자 계정과 오늘/누적 카운터
//! - `career`: 커리어(주력 목표)와 제목 검증
//! - `session`: 활성 세션 잠금과 완료된 집중 세션 기록
//! - `stats`: 일/주/전체 집계
//!
//! `pub use X::*;`로 재공개하여 `crate::models::Career`처럼 짧게 접근합니다.

pub mod account;
pub mod career;
pub mod session;
pub mod stats;

pub use account::*;
pub use career::*;
pub use session::*;
pub use stats::*;
