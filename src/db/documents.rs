//! # 문서 데이터베이스 쿼리 모듈
//!
//! `documents` 테이블에 대한 생성/조회/수정 쿼리 함수들입니다.
//! 모든 함수는 `async`이며 `SqlitePool`을 빌려(&) 사용합니다.

use crate::error::AppError;
use crate::models::*;
use sqlx::SqlitePool;

/// 사용자의 문서 목록을 최근 수정 순으로 조회합니다.
pub async fn list_documents(pool: &SqlitePool, user_id: &str) -> Result<Vec<Document>, AppError> {
    let docs = sqlx::query_as::<_, Document>(
        r#"
        SELECT id, title, content, user_id, created_at, updated_at
        FROM documents
        WHERE user_id = ?
        ORDER BY updated_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(docs)
}

/// ID로 단일 문서를 조회합니다.
///
/// # 반환값
/// - `Ok(Some(Document))`: 문서를 찾은 경우
/// - `Ok(None)`: 해당 ID의 문서가 없는 경우
pub async fn get_document(pool: &SqlitePool, id: &str) -> Result<Option<Document>, AppError> {
    let doc = sqlx::query_as::<_, Document>(
        r#"
        SELECT id, title, content, user_id, created_at, updated_at
        FROM documents
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(doc)
}

/// 새 문서를 생성합니다 (첫 저장).
///
/// 삽입 후 생성된 행을 다시 조회하여 DB 기본값(created_at 등)이 채워진 문서를 반환합니다.
pub async fn create_document(
    pool: &SqlitePool,
    user_id: &str,
    title: &str,
    content: &str,
) -> Result<Document, AppError> {
    let id = uuid::Uuid::now_v7().to_string();

    sqlx::query(
        r#"
        INSERT INTO documents (id, title, content, user_id)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(title)
    .bind(content)
    .bind(user_id)
    .execute(pool)
    .await?;

    get_document(pool, &id)
        .await?
        .ok_or(AppError::Internal("Failed to retrieve created document".to_string()))
}

/// 문서 내용을 저장합니다. title이 None이면 제목은 그대로 둡니다.
///
/// # 반환값
/// - `Ok(None)`: 해당 ID의 문서가 없음 (라우트에서 404로 변환)
pub async fn update_document(
    pool: &SqlitePool,
    id: &str,
    content: &str,
    title: Option<&str>,
) -> Result<Option<Document>, AppError> {
    // COALESCE(?, title): 바인딩 값이 NULL이면 기존 제목 유지
    let result = sqlx::query(
        r#"
        UPDATE documents
        SET content = ?, title = COALESCE(?, title),
            updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        WHERE id = ?
        "#,
    )
    .bind(content)
    .bind(title)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }

    get_document(pool, id).await
}
