//! # 에러 처리 모듈
//!
//! 집중 세션 코어에서 발생할 수 있는 모든 에러 타입을 정의합니다.
//!
//! 이 모듈의 핵심:
//! - `AppError` 열거형(enum): 잠금/수명주기/검증/인프라 에러를 하나의 타입으로 통합
//!   (인증 실패 401은 `middleware::auth::AuthError`가 따로 응답합니다)
//! - `IntoResponse` 구현: 에러를 HTTP 응답으로 자동 변환
//!
//! 모든 에러는 하나의 트랜잭션 시도에만 국한됩니다.
//! 에러가 반환되면 트랜잭션은 커밋되지 않으므로 부분 적용된 상태는 남지 않습니다.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// 애플리케이션에서 발생할 수 있는 모든 에러 종류
///
/// 핸들러에서 `Result<T, AppError>`를 반환하면,
/// Axum이 자동으로 `IntoResponse`를 호출하여 HTTP 응답으로 변환합니다.
#[derive(Debug, Error)]
pub enum AppError {
    /// 잠금/커리어/세션이 존재하지 않음 (HTTP 404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// 이미 다른 활성 세션이 존재함 (HTTP 409)
    /// 기존 세션이 끝난 뒤에는 다시 시도할 수 있습니다.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// 잠금을 다른 기기가 보유 중 (HTTP 403)
    /// 재시도 대상이 아니며, UI에서 "다른 기기에서 사용 중"으로 안내합니다.
    #[error("Locked by another device: {0}")]
    Ownership(String),

    /// 잘못된 상태에서 호출된 연산 (HTTP 422)
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// 세션 종료 중 동시 변경이 감지됨 (HTTP 409)
    /// 호출자는 상태를 새로 읽은 뒤 다시 시도해야 합니다.
    #[error("Stale state: {0}")]
    StaleState(String),

    /// 세션 진행 중에는 커리어 구성을 바꿀 수 없음 (HTTP 409)
    #[error("A focus session is in progress")]
    SessionInProgress,

    /// 입력값 검증 실패 (HTTP 400)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// 서버 내부 오류 (HTTP 500)
    #[error("Internal error: {0}")]
    Internal(String),

    /// 데이터베이스 오류 (HTTP 500)
    /// #[from]: sqlx 함수에서 `?`를 쓰면 자동으로 AppError::Database로 변환됩니다.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl AppError {
    /// 응답 본문의 `error.code` 값과 HTTP 상태 코드
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            AppError::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
            AppError::Ownership(_) => (StatusCode::FORBIDDEN, "locked_by_other_device"),
            AppError::InvalidState(_) => (StatusCode::UNPROCESSABLE_ENTITY, "invalid_state"),
            AppError::StaleState(_) => (StatusCode::CONFLICT, "stale_state"),
            AppError::SessionInProgress => (StatusCode::CONFLICT, "session_in_progress"),
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
            AppError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "database_error"),
        }
    }
}

impl IntoResponse for AppError {
    /// AppError를 HTTP 응답으로 변환합니다.
    ///
    /// 내부 에러(Database, Internal)는 실제 에러 내용을 로그에만 기록하고,
    /// 클라이언트에는 일반적인 메시지만 반환합니다.
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let message = match self {
            AppError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                "An internal error occurred".to_string()
            }
            AppError::Database(ref e) => {
                tracing::error!("Database error: {}", e);
                "A database error occurred".to_string()
            }
            // 나머지는 사용자 안내용 메시지이므로 그대로 노출합니다.
            ref other => other.to_string(),
        };

        // 결과: { "error": { "code": "conflict", "message": "..." } }
        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lock_errors_map_to_distinct_statuses() {
        assert_eq!(
            AppError::Conflict("x".into()).into_response().status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::Ownership("x".into()).into_response().status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::NotFound("x".into()).into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::InvalidState("x".into()).into_response().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            AppError::Validation("x".into()).into_response().status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn session_in_progress_and_stale_state_share_conflict_status() {
        let (status, code) = AppError::SessionInProgress.status_and_code();
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(code, "session_in_progress");

        let (status, code) = AppError::StaleState("career switched".into()).status_and_code();
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(code, "stale_state");
    }

    #[test]
    fn database_errors_hide_details() {
        let err = AppError::Database(sqlx::Error::RowNotFound);
        let (status, code) = err.status_and_code();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(code, "database_error");
    }
}
