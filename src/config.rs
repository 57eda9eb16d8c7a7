//! # 애플리케이션 설정(Configuration) 모듈
//!
//! 환경변수에서 서버 설정값을 읽어오는 모듈입니다.
//! `.env` 파일이나 시스템 환경변수에서 값을 가져옵니다.
//!
//! 설정 항목:
//! - `DATABASE_URL`: SQLite 데이터베이스 경로 (필수)
//! - `JWT_SECRET`: 외부 인증 서버와 공유하는 JWT 검증 키 (필수)
//! - `HOST`, `PORT`: 서버 바인딩 주소
//! - `DEFAULT_SESSION_SECONDS`: 시작 요청에 길이가 없을 때 쓰는 집중 시간 (기본 1500초)
//! - `MAX_SESSION_SECONDS`: 요청 가능한 최대 집중 시간
//! - `DEFAULT_CAREER_TITLE`: 주력 커리어가 없을 때 자동 생성하는 커리어 이름
//! - `FRONTEND_DIST`: 프론트엔드 빌드 결과물 디렉토리

use std::env;

/// 기본 집중 시간: 25분
pub const DEFAULT_SESSION_SECONDS: i64 = 25 * 60;

/// 애플리케이션 전체 설정을 담는 구조체
///
/// 서버 시작 시 환경변수에서 한 번 읽어온 후,
/// 애플리케이션 전체에서 공유됩니다.
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite 데이터베이스 URL (예: "sqlite:data/focusline.db")
    pub database_url: String,
    /// JWT 서명 검증에 사용하는 비밀키
    pub jwt_secret: String,
    /// 서버가 바인딩할 호스트 주소 (기본값: "0.0.0.0")
    pub host: String,
    /// 서버 포트 번호 (기본값: 3000)
    pub port: u16,
    /// 세션 정책 (길이 기본값/상한, 기본 커리어 이름)
    pub session: SessionPolicy,
    /// 프론트엔드 정적 파일 디렉토리
    pub frontend_dist: String,
}

/// 세션 시작과 커리어 부트스트랩에 쓰이는 기본값 모음
#[derive(Debug, Clone)]
pub struct SessionPolicy {
    pub default_duration_sec: i64,
    pub max_duration_sec: i64,
    pub default_career_title: String,
}

impl SessionPolicy {
    /// 기본 집중 시간은 항상 상한 이하로 잘라냅니다.
    pub fn new(default_duration_sec: i64, max_duration_sec: i64, default_career_title: String) -> Self {
        if default_duration_sec > max_duration_sec {
            tracing::warn!(
                default_duration_sec,
                max_duration_sec,
                "DEFAULT_SESSION_SECONDS exceeds MAX_SESSION_SECONDS, clamping to the maximum"
            );
        }
        Self {
            default_duration_sec: default_duration_sec.min(max_duration_sec),
            max_duration_sec,
            default_career_title,
        }
    }
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self::new(
            DEFAULT_SESSION_SECONDS,
            4 * 60 * 60,
            "My main career".to_string(),
        )
    }
}

impl Config {
    /// 환경변수에서 설정값을 읽어 Config 인스턴스를 생성합니다.
    ///
    /// # 에러
    /// `DATABASE_URL`과 `JWT_SECRET`은 필수이며, 없으면 에러가 발생합니다.
    /// 나머지 설정은 기본값이 있어 환경변수가 없어도 동작합니다.
    pub fn from_env() -> Result<Self, env::VarError> {
        let defaults = SessionPolicy::default();

        Ok(Self {
            database_url: env::var("DATABASE_URL")?,
            jwt_secret: env::var("JWT_SECRET")?,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .unwrap_or(3000),
            session: SessionPolicy::new(
                parse_positive("DEFAULT_SESSION_SECONDS").unwrap_or(defaults.default_duration_sec),
                parse_positive("MAX_SESSION_SECONDS").unwrap_or(defaults.max_duration_sec),
                env::var("DEFAULT_CAREER_TITLE").unwrap_or(defaults.default_career_title),
            ),
            frontend_dist: env::var("FRONTEND_DIST")
                .unwrap_or_else(|_| "../frontend/dist".to_string()),
        })
    }
}

/// 양의 정수 환경변수를 읽습니다. 없거나 파싱에 실패하거나 0 이하면 None.
fn parse_positive(key: &str) -> Option<i64> {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<i64>().ok())
        .filter(|v| *v > 0)
}
