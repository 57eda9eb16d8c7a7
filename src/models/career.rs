//! # 커리어(주력 목표) 모델 정의
//!
//! 집중 시간이 누적되는 장기 목표입니다.
//! 사용자당 `active` 상태의 커리어는 최대 하나입니다.
//!
//! ## 구조체 역할
//! - `Career`: DB의 `careers` 테이블 한 행
//! - `CareerStatus`: active / archived
//! - `CareerTitleRequest`: 생성/이름 변경 요청 본문

use crate::error::AppError;
use serde::{Deserialize, Serialize};

/// 커리어 제목 길이 제한 (공백 제거 후, 문자 단위)
pub const TITLE_MIN_CHARS: usize = 2;
pub const TITLE_MAX_CHARS: usize = 30;

/// 커리어 상태
///
/// SQLite에는 enum 타입이 없으므로 소문자 TEXT('active', 'archived')로 저장합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum CareerStatus {
    Active,
    Archived,
}

/// 커리어 엔티티
///
/// `total_focus_sec`/`total_sessions`는 단조 증가하며
/// 집계 트랜잭션만 변경합니다.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Career {
    pub id: String,
    pub owner_uid: String,
    pub title: String,
    pub status: CareerStatus,
    pub created_at: String,
    pub activated_at: String,
    /// 보관 시각 — 활성 상태면 None
    pub archived_at: Option<String>,
    pub total_focus_sec: i64,
    pub total_sessions: i64,
}

impl Career {
    pub fn is_active(&self) -> bool {
        self.status == CareerStatus::Active
    }
}

/// `POST /careers`, `PATCH /careers/{id}` 요청 본문
#[derive(Debug, Deserialize)]
pub struct CareerTitleRequest {
    pub title: String,
}

/// 제목을 검증하고 앞뒤 공백을 제거한 값을 돌려줍니다.
///
/// 길이는 바이트가 아니라 문자(char) 수로 셉니다. "집중하기"는 4자입니다.
pub fn normalize_title(raw: &str) -> Result<String, AppError> {
    let title = raw.trim();
    let len = title.chars().count();
    if !(TITLE_MIN_CHARS..=TITLE_MAX_CHARS).contains(&len) {
        return Err(AppError::Validation(format!(
            "Title must be between {} and {} characters",
            TITLE_MIN_CHARS, TITLE_MAX_CHARS
        )));
    }
    Ok(title.to_string())
}
