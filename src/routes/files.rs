//! # 파일 업로드 라우트 핸들러
//!
//! ## 엔드포인트
//! - `GET  /api/v1/documents/{id}/files` → 문서에 첨부된 파일 목록
//! - `POST /api/v1/documents/{id}/files` → multipart `file` 필드 업로드 (uploadFile)
//! - `GET  /api/v1/documents/{id}/files/{file_id}` → 원본 파일 다운로드

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::Response,
    Json,
};
use serde_json::{json, Value};

use super::documents::{owned_document, AppState};
use super::export::download;
use crate::{error::AppError, middleware::auth::AuthUser, models::FileRecord, services};

/// multipart에서 꺼낸 파일 하나
pub(crate) struct UploadedFile {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// 이름이 `field_name`인 첫 파일 필드를 읽습니다. 다른 필드는 건너뜁니다.
pub(crate) async fn read_file_field(
    form: &mut Multipart,
    field_name: &str,
) -> Result<UploadedFile, AppError> {
    while let Some(field) = form
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() != Some(field_name) {
            continue;
        }
        let filename = field.file_name().unwrap_or("upload").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?
            .to_vec();
        return Ok(UploadedFile {
            filename,
            content_type,
            bytes,
        });
    }
    Err(AppError::validation(format!(
        "Missing multipart field '{}'",
        field_name
    )))
}

pub async fn list_files(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    owned_document(&state, &id, &auth_user).await?;
    let files = state.store.list_files(&id).await?;
    Ok(Json(json!({ "files": files })))
}

pub async fn upload_file(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
    mut form: Multipart,
) -> Result<(StatusCode, Json<FileRecord>), AppError> {
    owned_document(&state, &id, &auth_user).await?;
    let file = read_file_field(&mut form, "file").await?;

    let record = services::files::upload_file(
        state.store.as_ref(),
        &state.uploads_path,
        &id,
        &file.filename,
        &file.content_type,
        &file.bytes,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn download_file(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path((id, file_id)): Path<(String, String)>,
) -> Result<Response, AppError> {
    owned_document(&state, &id, &auth_user).await?;
    let record = state
        .store
        .list_files(&id)
        .await?
        .into_iter()
        .find(|file| file.id == file_id)
        .ok_or(AppError::NotFound)?;

    let bytes = services::files::read_upload(&state.uploads_path, &record.file_path).await?;
    Ok(download(&record.filename, &record.file_type, bytes))
}
