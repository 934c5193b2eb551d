//! # 애플리케이션 설정(Configuration) 모듈
//!
//! 환경변수에서 서버 설정값을 읽어오는 모듈입니다.
//! `.env` 파일이나 시스템 환경변수에서 값을 가져옵니다.
//!
//! 설정 항목:
//! - `DATABASE_URL`: SQLite 데이터베이스 경로 (필수)
//! - `JWT_SECRET`: 인증 서비스가 발급한 JWT를 검증할 비밀키 (필수)
//! - `UPLOADS_PATH`: 업로드 파일 저장 디렉토리
//! - `HOST` / `PORT`: 서버 바인딩 주소
//! - `AUTOSAVE_INTERVAL_SECS`: 자동 버전 저장 주기 (기본 30초)
//! - `PAGE_HEIGHT_PX`: 페이지 분할 기준 높이 (기본 1123px, 96DPI A4)
//! - `OVERLAY_MAX_WIDTH_PX`: 오버레이 이미지 최대 너비 (기본 400px)

use std::env;
use std::time::Duration;

use crate::editor::session::SessionSettings;

/// A4 용지(297mm)를 96DPI로 환산한 픽셀 높이
pub const DEFAULT_PAGE_HEIGHT_PX: f64 = 1123.0;

/// 자동 저장 기본 주기(초)
pub const DEFAULT_AUTOSAVE_INTERVAL_SECS: u64 = 30;

/// 오버레이에 배치할 때 이미지를 축소하는 기본 최대 너비
pub const DEFAULT_OVERLAY_MAX_WIDTH_PX: u32 = 400;

/// 애플리케이션 전체 설정을 담는 구조체
///
/// 서버 시작 시 환경변수에서 한 번 읽어온 후,
/// 애플리케이션 전체에서 공유됩니다.
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite 데이터베이스 파일 경로 (예: "sqlite:data/pagewright.db")
    pub database_url: String,
    /// JWT 토큰 검증에 사용하는 비밀키
    pub jwt_secret: String,
    /// 업로드 파일이 저장되는 디렉토리 경로
    pub uploads_path: String,
    /// 서버가 바인딩할 호스트 주소 (기본값: "0.0.0.0")
    pub host: String,
    /// 서버 포트 번호 (기본값: 3000)
    pub port: u16,
    /// 자동 저장 주기 (초)
    pub autosave_interval_secs: u64,
    /// 페이지 분할 기준 높이 (픽셀)
    pub page_height_px: f64,
    /// 오버레이 이미지 최대 너비 (픽셀)
    pub overlay_max_width_px: u32,
}

impl Config {
    /// 환경변수에서 설정값을 읽어 Config 인스턴스를 생성합니다.
    ///
    /// # 에러
    /// `DATABASE_URL`과 `JWT_SECRET`은 필수이며, 없으면 에러가 발생합니다.
    /// 나머지 설정은 기본값이 있고, 숫자 파싱에 실패해도 기본값을 사용합니다.
    pub fn from_env() -> Result<Self, env::VarError> {
        Ok(Self {
            database_url: env::var("DATABASE_URL")?,
            jwt_secret: env::var("JWT_SECRET")?,
            uploads_path: env::var("UPLOADS_PATH")
                .unwrap_or_else(|_| "data/uploads".to_string()),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_or("PORT", 3000),
            autosave_interval_secs: parse_or(
                "AUTOSAVE_INTERVAL_SECS",
                DEFAULT_AUTOSAVE_INTERVAL_SECS,
            ),
            page_height_px: parse_or("PAGE_HEIGHT_PX", DEFAULT_PAGE_HEIGHT_PX),
            overlay_max_width_px: parse_or("OVERLAY_MAX_WIDTH_PX", DEFAULT_OVERLAY_MAX_WIDTH_PX),
        })
    }

    /// 에디터 세션이 사용하는 설정만 추려냅니다.
    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            page_height: self.page_height_px,
            autosave_interval: Duration::from_secs(self.autosave_interval_secs.max(1)),
            overlay_max_width: self.overlay_max_width_px,
        }
    }
}

/// 환경변수를 읽어 파싱하고, 없거나 잘못된 값이면 기본값을 돌려줍니다.
fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(default)
}
