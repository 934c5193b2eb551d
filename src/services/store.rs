//! # 문서 저장소 (Document Persistence Client)
//!
//! 문서/버전/댓글/파일 저장을 하나의 트레이트로 추상화합니다.
//! 세션과 라우트는 전역 DB 풀을 직접 가져다 쓰지 않고,
//! `Arc<dyn DocumentStore>`로 주입받습니다. 테스트에서는 메모리 저장소로 바꿔 끼웁니다.
//!
//! 모든 작업은 네트워크/DB 호출 한 번으로 끝나며,
//! 캐싱·재시도·오프라인 큐는 없습니다. 실패는 로그를 남기고 그대로 전파합니다.

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::db;
use crate::error::AppError;
use crate::models::*;

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// 새 문서를 만듭니다. title이 없으면 `"Untitled Document"`.
    async fn save_document(
        &self,
        user_id: &str,
        content: &str,
        title: Option<&str>,
    ) -> Result<Document, AppError>;

    async fn update_document(
        &self,
        id: &str,
        content: &str,
        title: Option<&str>,
    ) -> Result<Option<Document>, AppError>;

    async fn get_document(&self, id: &str) -> Result<Option<Document>, AppError>;

    async fn list_documents(&self, user_id: &str) -> Result<Vec<Document>, AppError>;

    async fn save_version(
        &self,
        document_id: &str,
        content: &str,
        meta: &NewVersion,
    ) -> Result<DocumentVersion, AppError>;

    /// 최신 버전이 먼저 오도록 정렬된 목록
    async fn list_versions(&self, document_id: &str)
        -> Result<Vec<DocumentVersionSummary>, AppError>;

    async fn get_version(&self, id: &str) -> Result<Option<DocumentVersion>, AppError>;

    /// 생성 시각 오름차순
    async fn load_comments(&self, document_id: &str) -> Result<Vec<Comment>, AppError>;

    async fn get_comment(&self, id: &str) -> Result<Option<Comment>, AppError>;

    async fn add_comment(&self, comment: &NewComment) -> Result<Comment, AppError>;

    async fn set_comment_resolved(
        &self,
        id: &str,
        resolved: bool,
    ) -> Result<Option<Comment>, AppError>;

    async fn record_file(&self, file: &NewFile) -> Result<FileRecord, AppError>;

    async fn list_files(&self, document_id: &str) -> Result<Vec<FileRecord>, AppError>;
}

/// SQLite 연결 풀 기반 저장소
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// 실패한 저장소 호출을 로그로 남기고 에러를 그대로 돌려줍니다.
fn logged<T>(operation: &str, result: Result<T, AppError>) -> Result<T, AppError> {
    if let Err(err) = &result {
        tracing::error!(operation, "store call failed: {}", err);
    }
    result
}

#[async_trait]
impl DocumentStore for SqliteStore {
    async fn save_document(
        &self,
        user_id: &str,
        content: &str,
        title: Option<&str>,
    ) -> Result<Document, AppError> {
        let title = title.unwrap_or(DEFAULT_TITLE);
        let document = logged(
            "save_document",
            db::create_document(&self.pool, user_id, title, content).await,
        )?;
        tracing::info!(document_id = %document.id, "Document saved");
        Ok(document)
    }

    async fn update_document(
        &self,
        id: &str,
        content: &str,
        title: Option<&str>,
    ) -> Result<Option<Document>, AppError> {
        logged(
            "update_document",
            db::update_document(&self.pool, id, content, title).await,
        )
    }

    async fn get_document(&self, id: &str) -> Result<Option<Document>, AppError> {
        logged("get_document", db::get_document(&self.pool, id).await)
    }

    async fn list_documents(&self, user_id: &str) -> Result<Vec<Document>, AppError> {
        logged("list_documents", db::list_documents(&self.pool, user_id).await)
    }

    async fn save_version(
        &self,
        document_id: &str,
        content: &str,
        meta: &NewVersion,
    ) -> Result<DocumentVersion, AppError> {
        let version = logged(
            "save_version",
            db::create_version(&self.pool, document_id, content, meta).await,
        )?;
        tracing::info!(
            document_id,
            version_number = version.version_number,
            "Version saved"
        );
        Ok(version)
    }

    async fn list_versions(
        &self,
        document_id: &str,
    ) -> Result<Vec<DocumentVersionSummary>, AppError> {
        logged("list_versions", db::list_versions(&self.pool, document_id).await)
    }

    async fn get_version(&self, id: &str) -> Result<Option<DocumentVersion>, AppError> {
        logged("get_version", db::get_version(&self.pool, id).await)
    }

    async fn load_comments(&self, document_id: &str) -> Result<Vec<Comment>, AppError> {
        logged("load_comments", db::list_comments(&self.pool, document_id).await)
    }

    async fn get_comment(&self, id: &str) -> Result<Option<Comment>, AppError> {
        logged("get_comment", db::get_comment(&self.pool, id).await)
    }

    async fn add_comment(&self, comment: &NewComment) -> Result<Comment, AppError> {
        logged("add_comment", db::create_comment(&self.pool, comment).await)
    }

    async fn set_comment_resolved(
        &self,
        id: &str,
        resolved: bool,
    ) -> Result<Option<Comment>, AppError> {
        logged(
            "set_comment_resolved",
            db::set_comment_resolved(&self.pool, id, resolved).await,
        )
    }

    async fn record_file(&self, file: &NewFile) -> Result<FileRecord, AppError> {
        let record = logged("record_file", db::create_file(&self.pool, file).await)?;
        tracing::info!(document_id = %record.document_id, file_path = %record.file_path, "File uploaded");
        Ok(record)
    }

    async fn list_files(&self, document_id: &str) -> Result<Vec<FileRecord>, AppError> {
        logged("list_files", db::list_files(&self.pool, document_id).await)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    /// 마이그레이션이 적용된 인메모리 SQLite 저장소.
    /// `:memory:`는 연결마다 별도 DB이므로 연결을 하나로 제한합니다.
    pub(crate) async fn memory_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::migrate!("./migrations").run(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn save_document_uses_default_title() {
        let store = SqliteStore::new(memory_pool().await);
        let doc = store.save_document("user-1", "<p>hi</p>", None).await.unwrap();

        assert_eq!(doc.title, DEFAULT_TITLE);
        assert_eq!(doc.content, "<p>hi</p>");
        assert_eq!(doc.user_id, "user-1");
    }

    #[tokio::test]
    async fn update_document_keeps_title_when_absent() {
        let store = SqliteStore::new(memory_pool().await);
        let doc = store.save_document("u", "a", Some("Report")).await.unwrap();

        let updated = store.update_document(&doc.id, "b", None).await.unwrap().unwrap();
        assert_eq!(updated.title, "Report");
        assert_eq!(updated.content, "b");

        assert!(store.update_document("missing", "x", None).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn versions_are_numbered_and_listed_newest_first() {
        let store = SqliteStore::new(memory_pool().await);
        let doc = store.save_document("u", "", None).await.unwrap();

        let v1 = store.save_version(&doc.id, "one", &NewVersion::default()).await.unwrap();
        let v2 = store
            .save_version(&doc.id, "two", &NewVersion::named("Draft"))
            .await
            .unwrap();

        assert_eq!(v1.version_number, 1);
        assert_eq!(v2.version_number, 2);
        assert_eq!(v2.version_name.as_deref(), Some("Draft"));

        let listed = store.list_versions(&doc.id).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, v2.id);

        let full = store.get_version(&v1.id).await.unwrap().unwrap();
        assert_eq!(full.content, "one");
    }

    #[tokio::test]
    async fn comments_round_trip_position_and_resolved_flag() {
        let store = SqliteStore::new(memory_pool().await);
        let doc = store.save_document("u", "hello world", None).await.unwrap();

        let root = store
            .add_comment(&NewComment {
                document_id: doc.id.clone(),
                user_id: "u".into(),
                content: "planet".into(),
                selected_text: "world".into(),
                position: Position { top: 12.5, left: 40.0 },
                parent_comment_id: None,
            })
            .await
            .unwrap();
        let reply = store
            .add_comment(&NewComment {
                document_id: doc.id.clone(),
                user_id: "u".into(),
                content: "agreed".into(),
                selected_text: "world".into(),
                position: Position::default(),
                parent_comment_id: Some(root.id.clone()),
            })
            .await
            .unwrap();

        assert_eq!(root.position, Position { top: 12.5, left: 40.0 });
        assert!(!root.resolved);

        let loaded = store.load_comments(&doc.id).await.unwrap();
        let ids: Vec<_> = loaded.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec![root.id.as_str(), reply.id.as_str()]);

        let resolved = store.set_comment_resolved(&root.id, true).await.unwrap().unwrap();
        assert!(resolved.resolved);
    }

    #[tokio::test]
    async fn files_are_recorded_per_document() {
        let store = SqliteStore::new(memory_pool().await);
        let doc = store.save_document("u", "", None).await.unwrap();

        let record = store
            .record_file(&NewFile {
                document_id: doc.id.clone(),
                filename: "notes.txt".into(),
                file_path: format!("{}/abc.txt", doc.id),
                file_type: "text/plain".into(),
            })
            .await
            .unwrap();

        let files = store.list_files(&doc.id).await.unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].id, record.id);
        assert_eq!(files[0].filename, "notes.txt");
    }
}
