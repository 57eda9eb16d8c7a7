//! # Focusline 웹 서버 진입점
//!
//! 계정당 하나의 주력 커리어에 대해 집중 세션을 실행하고,
//! 한 번에 한 기기만 세션을 보유하도록 보장하는 API 서버입니다.
//!
//! 이 파일이 수행하는 작업:
//! 1. 환경변수(.env) 로딩
//! 2. 로깅(tracing) 초기화
//! 3. SQLite 데이터베이스 연결 풀 생성 (WAL, busy_timeout)
//! 4. 데이터베이스 마이그레이션 실행
//! 5. API 라우터 설정
//! 6. HTTP 서버 시작

mod config;
mod db;
mod error;
mod middleware;
mod models;
mod routes;
mod services;

use anyhow::Result;
use axum::{
    routing::{get, patch, post},
    Router,
};
use config::Config;
use routes::*;
use services::SystemClock;
use std::{path::Path, sync::Arc};
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1단계: 환경변수 로딩 ──
    // .env 파일이 없어도 에러 없이 넘어갑니다.
    dotenvy::dotenv().ok();

    // ── 2단계: 로깅(tracing) 초기화 ──
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "focusline=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // ── 3단계: 설정 로딩 ──
    let config = Config::from_env()?;
    tracing::info!("Starting Focusline server on {}:{}", config.host, config.port);

    // ── 4단계: SQLite 연결 풀 생성 + 마이그레이션 ──
    let pool = db::connect(&config.database_url, 5).await?;
    tracing::info!("Running database migrations...");
    db::migrate(&pool).await?;

    // ── 5단계: 애플리케이션 상태(State) 생성 ──
    let state = AppState {
        pool: pool.clone(),
        jwt_secret: config.jwt_secret.clone(),
        clock: Arc::new(SystemClock),
        session: config.session.clone(),
    };

    // ── 6단계: API 라우터 설정 ──
    // axum 0.8부터 경로 파라미터는 `{id}` 문법을 사용합니다.
    let career_routes = Router::new()
        .route("/careers", get(list_careers).post(create_career))
        .route("/careers/primary", post(ensure_primary_career))
        .route("/careers/{id}", patch(rename_career))
        .route("/careers/{id}/activate", post(activate_career))
        .route("/careers/{id}/archive", post(archive_career));

    // 집중 세션 잠금 (시작/하트비트/종료)
    let session_routes = Router::new()
        .route("/session", get(get_current_session))
        .route("/session/start", post(start_focus_session))
        .route("/session/heartbeat", post(heartbeat_focus_session))
        .route("/session/end", post(end_focus_session))
        .route("/sessions", get(list_focus_sessions));

    let stats_routes = Router::new()
        .route("/stats/daily", get(get_daily_totals))
        .route("/stats/weekly/{week_key}", get(get_weekly_stat))
        .route("/stats/global", get(get_global_stat));

    let api_routes = Router::new()
        .merge(career_routes)
        .merge(session_routes)
        .merge(stats_routes)
        .route("/me", get(get_account_summary))
        .route("/health", get(health_check))
        .with_state(state);

    // ── 7단계: CORS 미들웨어 설정 ──
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // ── 8단계: 프론트엔드 정적 파일 서빙 설정 ──
    // 빌드된 프론트엔드가 있으면 같은 서버에서 서빙합니다 (SPA 폴백은 index.html).
    let frontend_dist = Path::new(&config.frontend_dist);
    let app = if frontend_dist.exists() {
        tracing::info!("Serving frontend static files from {}", config.frontend_dist);

        let serve_dir = ServeDir::new(frontend_dist)
            .not_found_service(ServeFile::new(frontend_dist.join("index.html")));

        Router::new()
            .nest("/api/v1", api_routes)
            .fallback_service(serve_dir)
            .layer(cors)
            .layer(TraceLayer::new_for_http())
    } else {
        tracing::warn!("Frontend dist directory not found, serving API only");

        Router::new()
            .nest("/api/v1", api_routes)
            .layer(cors)
            .layer(TraceLayer::new_for_http())
    };

    // ── 9단계: 서버 시작 ──
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
