use crate::error::AppError;
use crate::models::{DocumentVersion, DocumentVersionSummary, NewVersion};
use sqlx::SqlitePool;

/// 다음 버전 번호(MAX + 1)로 새 스냅샷을 저장하고, 저장된 행을 반환합니다.
///
/// 수동 저장과 자동 저장이 동시에 들어오면 같은 번호를 계산할 수 있습니다.
/// 이 경우 UNIQUE(document_id, version_number) 제약 위반이 그대로 에러로 전파됩니다.
pub async fn create_version(
    pool: &SqlitePool,
    document_id: &str,
    content: &str,
    meta: &NewVersion,
) -> Result<DocumentVersion, AppError> {
    let id = uuid::Uuid::now_v7().to_string();
    let next_version: i64 = sqlx::query_scalar(
        "SELECT COALESCE(MAX(version_number), 0) + 1 FROM document_versions WHERE document_id = ?",
    )
    .bind(document_id)
    .fetch_one(pool)
    .await?;

    sqlx::query(
        r#"
        INSERT INTO document_versions
            (id, document_id, content, version_number, version_name, version_description, is_major_version)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(document_id)
    .bind(content)
    .bind(next_version)
    .bind(&meta.version_name)
    .bind(&meta.version_description)
    .bind(meta.is_major_version)
    .execute(pool)
    .await?;

    get_version(pool, &id)
        .await?
        .ok_or(AppError::Internal("Failed to retrieve created version".to_string()))
}

/// 문서의 버전 목록 (최신 버전이 먼저)
pub async fn list_versions(
    pool: &SqlitePool,
    document_id: &str,
) -> Result<Vec<DocumentVersionSummary>, AppError> {
    let versions = sqlx::query_as::<_, DocumentVersionSummary>(
        r#"
        SELECT id, document_id, version_number, version_name, version_description,
               is_major_version, created_at
        FROM document_versions
        WHERE document_id = ?
        ORDER BY version_number DESC
        "#,
    )
    .bind(document_id)
    .fetch_all(pool)
    .await?;

    Ok(versions)
}

pub async fn get_version(
    pool: &SqlitePool,
    version_id: &str,
) -> Result<Option<DocumentVersion>, AppError> {
    let version = sqlx::query_as::<_, DocumentVersion>(
        r#"
        SELECT id, document_id, version_number, version_name, version_description,
               is_major_version, content, created_at
        FROM document_versions
        WHERE id = ?
        "#,
    )
    .bind(version_id)
    .fetch_optional(pool)
    .await?;

    Ok(version)
}
