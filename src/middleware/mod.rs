//! # 미들웨어 / 추출기
//!
//! - `auth`: Bearer JWT를 검증하여 `AuthUser { uid }`를 추출

pub mod auth;
