use serde::{Deserialize, Serialize};

/// 업로드 파일 메타데이터 — DB의 `files` 테이블 한 행에 대응합니다.
/// file_path는 `UPLOADS_PATH` 기준 상대 경로(`<document_id>/<uuid>.<ext>`)입니다.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct FileRecord {
    pub id: String,
    pub document_id: String,
    pub filename: String,
    pub file_path: String,
    pub file_type: String,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct NewFile {
    pub document_id: String,
    pub filename: String,
    pub file_path: String,
    pub file_type: String,
}
