//! # 내보내기 라우트 핸들러
//!
//! ## 엔드포인트
//! - `GET /api/v1/documents/{id}/export/pdf`  → `document.pdf` (세션과 스냅샷 필요)
//! - `GET /api/v1/documents/{id}/export/word` → `document.doc`
//!
//! Word 내보내기는 세션이 열려 있으면 세션의 최신 내용을, 아니면 저장된 내용을 씁니다.

use axum::{
    extract::{Path, State},
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::{IntoResponse, Response},
};

use super::documents::{owned_document, AppState};
use super::session::open_session_for;
use crate::{
    error::AppError,
    middleware::auth::AuthUser,
    services::export::{export_pdf, export_word},
};

/// 파일을 다운로드(첨부)로 내려보내는 응답
pub(crate) fn download(filename: &str, mime: &str, bytes: Vec<u8>) -> Response {
    (
        [
            (CONTENT_TYPE, mime.to_string()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        bytes,
    )
        .into_response()
}

pub async fn export_pdf_file(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let session = open_session_for(&state, &id, &auth_user).await?;
    let session = session.lock().await;

    let file = export_pdf(session.rasterizer(), &session.document_content())?;
    tracing::info!(document_id = %id, bytes = file.bytes.len(), "Exported PDF");
    Ok(download(file.filename, file.mime, file.bytes))
}

pub async fn export_word_file(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let document = owned_document(&state, &id, &auth_user).await?;

    let content = match state.sessions.get(&id).await {
        Some(session) => session.lock().await.document_content(),
        None => document.content,
    };
    let file = export_word(&content);
    Ok(download(file.filename, file.mime, file.bytes))
}
