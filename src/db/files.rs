use crate::error::AppError;
use crate::models::{FileRecord, NewFile};
use sqlx::SqlitePool;

pub async fn create_file(pool: &SqlitePool, file: &NewFile) -> Result<FileRecord, AppError> {
    let id = uuid::Uuid::now_v7().to_string();

    sqlx::query(
        r#"
        INSERT INTO files (id, document_id, filename, file_path, file_type)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(&file.document_id)
    .bind(&file.filename)
    .bind(&file.file_path)
    .bind(&file.file_type)
    .execute(pool)
    .await?;

    let record = sqlx::query_as::<_, FileRecord>(
        r#"
        SELECT id, document_id, filename, file_path, file_type, created_at
        FROM files
        WHERE id = ?
        "#,
    )
    .bind(&id)
    .fetch_one(pool)
    .await?;

    Ok(record)
}

pub async fn list_files(pool: &SqlitePool, document_id: &str) -> Result<Vec<FileRecord>, AppError> {
    let files = sqlx::query_as::<_, FileRecord>(
        r#"
        SELECT id, document_id, filename, file_path, file_type, created_at
        FROM files
        WHERE document_id = ?
        ORDER BY created_at ASC
        "#,
    )
    .bind(document_id)
    .fetch_all(pool)
    .await?;

    Ok(files)
}
