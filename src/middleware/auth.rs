//! # 인증 추출기 (JWT → uid)
//!
//! 신원 발급은 이 서비스의 범위 밖입니다. 외부 인증 서버가 HS256으로 서명한
//! Bearer 토큰을 검증하고, `sub` 클레임을 불투명한 `uid`로 사용합니다.
//! 핸들러는 `auth_user: AuthUser` 매개변수로 uid를 받아 코어 연산에 명시적으로 넘깁니다.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::routes::AppState;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String, // uid
    pub exp: i64,
    /// 외부 발급자가 생략할 수 있으므로 선택 항목입니다.
    #[serde(default)]
    pub iat: Option<i64>,
}

/// 인증된 사용자
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub uid: String,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(AuthError::MissingToken)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AuthError::InvalidToken)?;

        let claims = verify_access_token(token, &state.jwt_secret)?;
        if claims.sub.trim().is_empty() {
            return Err(AuthError::InvalidToken);
        }

        Ok(AuthUser { uid: claims.sub })
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
    ExpiredToken,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (code, message) = match self {
            AuthError::MissingToken => ("missing_token", "Authorization token is required"),
            AuthError::InvalidToken => ("invalid_token", "Invalid authorization token"),
            AuthError::ExpiredToken => ("expired_token", "Authorization token has expired"),
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (StatusCode::UNAUTHORIZED, body).into_response()
    }
}

pub fn verify_access_token(token: &str, secret: &str) -> Result<Claims, AuthError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
        _ => AuthError::InvalidToken,
    })?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn token_for(uid: &str, secret: &str, lifetime: Duration) -> String {
        let now = Utc::now();
        let claims = Claims {
            sub: uid.to_string(),
            iat: Some(now.timestamp()),
            exp: (now + lifetime).timestamp(),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn valid_token_yields_uid() {
        let token = token_for("anon-42", "secret", Duration::minutes(15));
        let claims = verify_access_token(&token, "secret").unwrap();
        assert_eq!(claims.sub, "anon-42");
    }

    #[test]
    fn wrong_secret_is_invalid() {
        let token = token_for("anon-42", "secret", Duration::minutes(15));
        assert_eq!(
            verify_access_token(&token, "other").unwrap_err(),
            AuthError::InvalidToken
        );
    }

    #[test]
    fn expired_token_is_reported_as_expired() {
        // 기본 leeway(60초)보다 충분히 과거
        let token = token_for("anon-42", "secret", Duration::hours(-1));
        assert_eq!(
            verify_access_token(&token, "secret").unwrap_err(),
            AuthError::ExpiredToken
        );
    }

    #[test]
    fn token_without_iat_is_accepted() {
        #[derive(Serialize)]
        struct SubAndExp {
            sub: String,
            exp: i64,
        }

        let claims = SubAndExp {
            sub: "anon-7".to_string(),
            exp: (Utc::now() + Duration::minutes(15)).timestamp(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"secret"),
        )
        .unwrap();

        let verified = verify_access_token(&token, "secret").unwrap();
        assert_eq!(verified.sub, "anon-7");
        assert!(verified.iat.is_none());
    }
}
