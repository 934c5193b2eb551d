//! # 에러 처리 모듈
//!
//! 애플리케이션에서 발생할 수 있는 모든 에러 타입을 정의합니다.
//!
//! 에러는 세 갈래로 나뉩니다:
//! - 검증(validation) 에러: 선택 영역/댓글/찾을 텍스트 누락 등. 즉시 알림 후 작업 중단
//! - 백엔드 에러: 저장/조회/수정 중 DB·파일 실패. 로그 후 일반 실패 메시지
//! - 명령 실행 에러: 편집 명령 적용 실패. 디스패처 경계에서 잡아 로그 후 알림
//!
//! 재시도나 롤백은 없습니다. 어떤 에러도 프로세스를 종료시키지 않습니다.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::editor::dictation::DictationError;
use crate::editor::overlay::OverlayError;
use crate::editor::platform::CommandError;
use crate::services::export::ExportError;

/// 애플리케이션에서 발생할 수 있는 모든 에러 종류
///
/// 핸들러에서 `Result<T, AppError>`를 반환하면,
/// Axum이 자동으로 `IntoResponse`를 호출하여 HTTP 응답으로 변환합니다.
#[derive(Debug, Error)]
pub enum AppError {
    /// 요청한 리소스를 찾을 수 없음 (HTTP 404)
    #[error("Resource not found")]
    NotFound,

    /// 잘못된 요청 (HTTP 400)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// 필수 입력 누락 등 검증 실패 (HTTP 422)
    /// 메시지는 그대로 사용자 알림에 표시됩니다.
    #[error("{0}")]
    Validation(String),

    /// 편집 명령 실행 실패 (HTTP 400)
    #[error("Command failed: {0}")]
    CommandFailed(String),

    /// 서버 내부 오류 (HTTP 500)
    #[error("Internal error: {0}")]
    Internal(String),

    /// 데이터베이스 오류 (HTTP 500)
    /// #[from]: sqlx 함수의 에러에 `?`를 쓰면 자동으로 이 variant로 변환됩니다.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// 파일 입출력 오류 (HTTP 500)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// 리소스 충돌 (HTTP 409)
    #[error("Conflict: {0}")]
    Conflict(String),
}

impl AppError {
    /// 검증 에러를 만드는 단축 함수
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation(message.into())
    }
}

impl From<CommandError> for AppError {
    fn from(err: CommandError) -> Self {
        AppError::CommandFailed(err.to_string())
    }
}

impl From<OverlayError> for AppError {
    fn from(err: OverlayError) -> Self {
        match err {
            // 선택된 객체 없음/이미지 아님은 사용자 입력 문제이므로 검증 에러로 취급
            OverlayError::NothingSelected | OverlayError::NotAnImage(_) => {
                AppError::Validation(err.to_string())
            }
            OverlayError::UnknownObject(_) => AppError::NotFound,
            OverlayError::Decode(_) | OverlayError::Encode(_) => {
                AppError::Validation(err.to_string())
            }
        }
    }
}

impl From<ExportError> for AppError {
    fn from(err: ExportError) -> Self {
        match err {
            ExportError::NoSnapshot => AppError::Conflict(err.to_string()),
            ExportError::Image(_) => AppError::Validation(err.to_string()),
            ExportError::Pdf(_) => AppError::Internal(err.to_string()),
        }
    }
}

impl From<DictationError> for AppError {
    fn from(err: DictationError) -> Self {
        match err {
            DictationError::UnsupportedLanguage(_) | DictationError::NotActive => {
                AppError::Validation(err.to_string())
            }
            // 인식기가 지금 상태에서 요청을 받지 않음
            DictationError::Session(_) => AppError::Conflict(err.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    /// AppError를 HTTP 응답으로 변환합니다.
    ///
    /// 내부 에러(Database, IO, Internal)는 실제 에러 내용을 로그에만 기록하고,
    /// 클라이언트에는 일반적인 메시지만 반환합니다.
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::NotFound => (StatusCode::NOT_FOUND, "not_found", self.to_string()),
            AppError::BadRequest(ref msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", msg.clone())
            }
            AppError::Validation(ref msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "validation_error", msg.clone())
            }
            AppError::CommandFailed(ref msg) => {
                tracing::error!("Command failed: {}", msg);
                (
                    StatusCode::BAD_REQUEST,
                    "command_failed",
                    "There was an error executing the command".to_string(),
                )
            }
            AppError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
            AppError::Database(ref e) => {
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "database_error",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Io(ref e) => {
                tracing::error!("IO error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "io_error",
                    "An IO error occurred".to_string(),
                )
            }
            AppError::Conflict(ref msg) => (StatusCode::CONFLICT, "conflict", msg.clone()),
        };

        // 결과: { "error": { "code": "not_found", "message": "Resource not found" } }
        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
