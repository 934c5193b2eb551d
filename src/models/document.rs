use serde::{Deserialize, Serialize};

/// 새 문서의 기본 제목
pub const DEFAULT_TITLE: &str = "Untitled Document";

/// 문서 엔티티 — DB의 `documents` 테이블 한 행에 대응합니다.
///
/// content는 직렬화된 리치 텍스트 마크업(HTML)입니다.
/// 저장할 때마다 갱신되며, 구조적인 버전 관리는 `DocumentVersion`이 맡습니다.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Document {
    pub id: String,
    pub title: String,
    pub content: String,
    pub user_id: String,
    pub created_at: String,
    pub updated_at: String,
}

/// `POST /documents` 요청 본문 (saveDocument)
#[derive(Debug, Deserialize)]
pub struct SaveDocumentRequest {
    #[serde(default)]
    pub content: String,
    pub title: Option<String>,
}

/// `PUT /documents/{id}` 요청 본문
#[derive(Debug, Deserialize)]
pub struct UpdateDocumentRequest {
    pub content: String,
    pub title: Option<String>,
}
