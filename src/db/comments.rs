//! # 댓글 데이터베이스 쿼리 모듈
//!
//! `document_comments` 테이블 쿼리입니다.
//! 행(`CommentRow`)의 position은 JSON 텍스트라서 `Comment`로 변환하며,
//! 변환 실패는 내부 에러로 처리합니다.

use crate::error::AppError;
use crate::models::{Comment, CommentRow, NewComment};
use sqlx::SqlitePool;

fn into_comment(row: CommentRow) -> Result<Comment, AppError> {
    Comment::try_from(row).map_err(|e| AppError::Internal(format!("Malformed comment position: {}", e)))
}

/// 문서의 모든 댓글을 생성 시각 오름차순으로 조회합니다.
/// 같은 시각이면 삽입 순서(rowid)를 따릅니다.
pub async fn list_comments(pool: &SqlitePool, document_id: &str) -> Result<Vec<Comment>, AppError> {
    let rows = sqlx::query_as::<_, CommentRow>(
        r#"
        SELECT id, document_id, content, selected_text, position, resolved,
               user_id, parent_comment_id, created_at
        FROM document_comments
        WHERE document_id = ?
        ORDER BY created_at ASC, rowid ASC
        "#,
    )
    .bind(document_id)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(into_comment).collect()
}

pub async fn get_comment(pool: &SqlitePool, id: &str) -> Result<Option<Comment>, AppError> {
    let row = sqlx::query_as::<_, CommentRow>(
        r#"
        SELECT id, document_id, content, selected_text, position, resolved,
               user_id, parent_comment_id, created_at
        FROM document_comments
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    row.map(into_comment).transpose()
}

pub async fn create_comment(pool: &SqlitePool, comment: &NewComment) -> Result<Comment, AppError> {
    let id = uuid::Uuid::now_v7().to_string();
    let position = serde_json::to_string(&comment.position)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    sqlx::query(
        r#"
        INSERT INTO document_comments
            (id, document_id, content, selected_text, position, user_id, parent_comment_id)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(&comment.document_id)
    .bind(&comment.content)
    .bind(&comment.selected_text)
    .bind(position)
    .bind(&comment.user_id)
    .bind(&comment.parent_comment_id)
    .execute(pool)
    .await?;

    get_comment(pool, &id)
        .await?
        .ok_or(AppError::Internal("Failed to retrieve created comment".to_string()))
}

/// resolved 플래그를 지정한 값으로 설정합니다. 댓글이 없으면 `Ok(None)`.
pub async fn set_comment_resolved(
    pool: &SqlitePool,
    id: &str,
    resolved: bool,
) -> Result<Option<Comment>, AppError> {
    let result = sqlx::query("UPDATE document_comments SET resolved = ? WHERE id = ?")
        .bind(resolved)
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }

    get_comment(pool, id).await
}
