//! # 업로드 파일 I/O 서비스
//!
//! 업로드된 파일을 블롭 저장 디렉토리(`UPLOADS_PATH`)에 쓰고,
//! `files` 테이블에 메타데이터를 기록합니다.
//!
//! 이 모듈의 함수들:
//! - `upload_file()`: 파일 저장 + 메타데이터 기록 (uploadFile)
//! - `read_upload()`: 저장된 파일 읽기
//! - `generate_file_path()`: `<document_id>/<uuid>.<ext>` 형태의 저장 경로 생성

use std::path::PathBuf;

use tokio::fs;

use crate::error::AppError;
use crate::models::{FileRecord, NewFile};
use crate::services::store::DocumentStore;

/// 파일 이름에서 확장자를 뽑아 저장 경로를 만듭니다.
///
/// 원래 이름은 메타데이터에만 남기고, 디스크에는 UUID 이름으로 저장합니다.
/// 확장자가 없으면 `bin`을 사용합니다.
///
/// # 예시
/// ```text
/// generate_file_path("doc-1", "photo.PNG") → "doc-1/0190....png"
/// ```
pub fn generate_file_path(document_id: &str, filename: &str) -> String {
    let ext = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or_else(|| "bin".to_string());
    format!("{}/{}.{}", document_id, uuid::Uuid::now_v7(), ext)
}

/// 저장 루트 기준 상대 경로를 실제 경로로 바꿉니다.
/// `..` 등으로 루트를 벗어나는 경로는 거부합니다.
fn resolve(uploads_path: &str, file_path: &str) -> Result<PathBuf, AppError> {
    if file_path.split('/').any(|part| part == ".." || part.is_empty()) {
        return Err(AppError::BadRequest(format!("Invalid file path: {}", file_path)));
    }
    Ok(PathBuf::from(uploads_path).join(file_path))
}

/// 파일을 업로드합니다 (uploadFile).
///
/// 1. 바이트를 `UPLOADS_PATH/<document_id>/<uuid>.<ext>`에 씁니다.
/// 2. `files` 테이블에 원래 이름과 MIME 타입을 기록합니다.
///
/// 어느 단계든 실패하면 로그를 남기고 에러를 전파합니다. 재시도는 없습니다.
pub async fn upload_file(
    store: &dyn DocumentStore,
    uploads_path: &str,
    document_id: &str,
    filename: &str,
    file_type: &str,
    bytes: &[u8],
) -> Result<FileRecord, AppError> {
    let file_path = generate_file_path(document_id, filename);
    let full_path = resolve(uploads_path, &file_path)?;

    if let Some(parent) = full_path.parent() {
        fs::create_dir_all(parent).await?;
    }
    if let Err(err) = fs::write(&full_path, bytes).await {
        tracing::error!("Error uploading file {}: {}", filename, err);
        return Err(err.into());
    }

    store
        .record_file(&NewFile {
            document_id: document_id.to_string(),
            filename: filename.to_string(),
            file_path,
            file_type: file_type.to_string(),
        })
        .await
}

/// 저장된 업로드 파일을 읽습니다.
pub async fn read_upload(uploads_path: &str, file_path: &str) -> Result<Vec<u8>, AppError> {
    let full_path = resolve(uploads_path, file_path)?;
    Ok(fs::read(&full_path).await?)
}
