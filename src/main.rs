//! # pagewright 웹 서버 진입점
//!
//! 브라우저 리치 텍스트 에디터의 서버 측 세션 엔진을 띄웁니다.
//! 브라우저는 렌더링과 입력만 맡고, 문서 상태(페이지, 댓글, 오버레이, 받아쓰기)는
//! 이 서버의 편집 세션이 들고 있습니다.
//!
//! 이 파일이 수행하는 작업:
//! 1. 환경변수(.env) 로딩
//! 2. 로깅(tracing) 초기화
//! 3. SQLite 연결 풀 생성과 마이그레이션
//! 4. 업로드 디렉토리 생성
//! 5. API 라우터 설정
//! 6. HTTP 서버 시작

// ── 모듈 선언 ──
mod config;
mod db;
mod editor;
mod error;
mod middleware;
mod models;
mod routes;
mod services;

use std::{path::Path, sync::Arc};

use anyhow::Result; // main에서만 쓰는 범용 에러 타입
use axum::Router;
use config::Config;
use editor::session::SessionRegistry;
use routes::documents::AppState;
use services::store::SqliteStore;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tower_http::{
    cors::{Any, CorsLayer},         // CORS 설정
    services::{ServeDir, ServeFile}, // 프론트엔드 정적 파일 서빙
    trace::TraceLayer,               // HTTP 요청/응답 로깅
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1단계: 환경변수 로딩 ──
    // .env 파일이 없어도 에러 없이 넘어갑니다.
    dotenvy::dotenv().ok();

    // ── 2단계: 로깅 초기화 ──
    // RUST_LOG가 없으면 pagewright, tower_http, axum을 debug 레벨로 출력합니다.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pagewright=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // ── 3단계: 설정 로딩 ──
    let config = Config::from_env()?;
    tracing::info!("Starting pagewright server on {}:{}", config.host, config.port);

    // ── 4단계: SQLite 연결 풀 생성 ──
    // 데이터베이스 파일이 없으면 새로 만듭니다.
    let connect_options = config
        .database_url
        .parse::<SqliteConnectOptions>()?
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(connect_options)
        .await?;

    // ── 5단계: 마이그레이션 ──
    // ./migrations 폴더의 SQL 파일이 컴파일 타임에 포함됩니다.
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(&pool).await?;

    // ── 6단계: 업로드 디렉토리 생성 ──
    let uploads_path = Path::new(&config.uploads_path);
    if !uploads_path.exists() {
        tokio::fs::create_dir_all(uploads_path).await?;
        tracing::info!("Created uploads directory: {}", config.uploads_path);
    }

    // ── 7단계: 애플리케이션 상태 ──
    // 저장소는 트레이트 객체로 넣습니다. 세션 레지스트리는 비어 있는 상태로 시작합니다.
    let settings = config.session_settings();
    tracing::info!(
        page_height = settings.page_height,
        autosave_secs = settings.autosave_interval.as_secs(),
        "Editor session settings loaded"
    );
    let state = AppState {
        store: Arc::new(SqliteStore::new(pool)),
        sessions: SessionRegistry::new(),
        settings,
        uploads_path: config.uploads_path.clone(),
        jwt_secret: config.jwt_secret.clone(),
    };

    // ── 8단계: 라우터 ──
    let api_routes = routes::api_router(state);

    // 개발 환경이라 모든 출처를 허용합니다.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // 빌드된 프론트엔드가 있으면 같은 서버에서 서빙합니다.
    // 찾을 수 없는 경로는 index.html로 돌려보냅니다 (SPA 라우팅).
    let frontend_dist = Path::new("../frontend/dist");
    let app = if frontend_dist.exists() {
        tracing::info!("Serving frontend static files from ../frontend/dist");

        let serve_dir = ServeDir::new("../frontend/dist")
            .not_found_service(ServeFile::new("../frontend/dist/index.html"));

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
