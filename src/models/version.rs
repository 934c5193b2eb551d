use serde::{Deserialize, Serialize};

/// 버전 스냅샷 — 생성 후 변경되지 않습니다.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct DocumentVersion {
    pub id: String,
    pub document_id: String,
    pub version_number: i64,
    pub version_name: Option<String>,
    pub version_description: Option<String>,
    pub is_major_version: bool,
    pub content: String,
    pub created_at: String,
}

/// 버전 목록용 요약 (본문 제외)
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct DocumentVersionSummary {
    pub id: String,
    pub document_id: String,
    pub version_number: i64,
    pub version_name: Option<String>,
    pub version_description: Option<String>,
    pub is_major_version: bool,
    pub created_at: String,
}

impl From<&DocumentVersion> for DocumentVersionSummary {
    fn from(version: &DocumentVersion) -> Self {
        Self {
            id: version.id.clone(),
            document_id: version.document_id.clone(),
            version_number: version.version_number,
            version_name: version.version_name.clone(),
            version_description: version.version_description.clone(),
            is_major_version: version.is_major_version,
            created_at: version.created_at.clone(),
        }
    }
}

/// 버전 생성 시 붙이는 메타데이터.
/// 모두 선택 항목이며, 자동 저장은 기본값(이름 없음, minor)을 사용합니다.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewVersion {
    pub version_name: Option<String>,
    pub version_description: Option<String>,
    #[serde(default)]
    pub is_major_version: bool,
}

impl NewVersion {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            version_name: Some(name.into()),
            ..Self::default()
        }
    }
}
