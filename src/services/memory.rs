//! 테스트용 메모리 저장소.
//!
//! `DocumentStore`의 가짜 구현입니다. 타임스탬프는 호출할 때마다
//! 엄격히 증가하도록 만들어, 버전 순서를 검증하는 테스트가 시계 해상도에 흔들리지 않게 합니다.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Duration, Utc};

use crate::error::AppError;
use crate::models::*;
use crate::services::store::DocumentStore;

#[derive(Default)]
struct Inner {
    documents: Vec<Document>,
    versions: Vec<DocumentVersion>,
    comments: Vec<Comment>,
    files: Vec<FileRecord>,
    ticks: i64,
    /// true이면 모든 호출이 실패합니다 (백엔드 장애 흉내).
    failing: bool,
}

impl Inner {
    fn now(&mut self) -> String {
        self.ticks += 1;
        (Utc::now() + Duration::milliseconds(self.ticks))
            .format("%Y-%m-%dT%H:%M:%S%.3fZ")
            .to_string()
    }

    fn check(&self) -> Result<(), AppError> {
        if self.failing {
            return Err(AppError::Internal("store unavailable".to_string()));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.inner.lock().unwrap().failing = failing;
    }

    pub fn version_count(&self, document_id: &str) -> usize {
        let inner = self.inner.lock().unwrap();
        inner
            .versions
            .iter()
            .filter(|v| v.document_id == document_id)
            .count()
    }
}

fn new_id() -> String {
    uuid::Uuid::now_v7().to_string()
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn save_document(
        &self,
        user_id: &str,
        content: &str,
        title: Option<&str>,
    ) -> Result<Document, AppError> {
        let mut inner = self.inner.lock().unwrap();
        inner.check()?;
        let now = inner.now();
        let doc = Document {
            id: new_id(),
            title: title.unwrap_or(DEFAULT_TITLE).to_string(),
            content: content.to_string(),
            user_id: user_id.to_string(),
            created_at: now.clone(),
            updated_at: now,
        };
        inner.documents.push(doc.clone());
        Ok(doc)
    }

    async fn update_document(
        &self,
        id: &str,
        content: &str,
        title: Option<&str>,
    ) -> Result<Option<Document>, AppError> {
        let mut inner = self.inner.lock().unwrap();
        inner.check()?;
        let now = inner.now();
        let Some(doc) = inner.documents.iter_mut().find(|d| d.id == id) else {
            return Ok(None);
        };
        doc.content = content.to_string();
        if let Some(title) = title {
            doc.title = title.to_string();
        }
        doc.updated_at = now;
        Ok(Some(doc.clone()))
    }

    async fn get_document(&self, id: &str) -> Result<Option<Document>, AppError> {
        let inner = self.inner.lock().unwrap();
        inner.check()?;
        Ok(inner.documents.iter().find(|d| d.id == id).cloned())
    }

    async fn list_documents(&self, user_id: &str) -> Result<Vec<Document>, AppError> {
        let inner = self.inner.lock().unwrap();
        inner.check()?;
        let mut docs: Vec<_> = inner
            .documents
            .iter()
            .filter(|d| d.user_id == user_id)
            .cloned()
            .collect();
        docs.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(docs)
    }

    async fn save_version(
        &self,
        document_id: &str,
        content: &str,
        meta: &NewVersion,
    ) -> Result<DocumentVersion, AppError> {
        let mut inner = self.inner.lock().unwrap();
        inner.check()?;
        let next = inner
            .versions
            .iter()
            .filter(|v| v.document_id == document_id)
            .map(|v| v.version_number)
            .max()
            .unwrap_or(0)
            + 1;
        let version = DocumentVersion {
            id: new_id(),
            document_id: document_id.to_string(),
            version_number: next,
            version_name: meta.version_name.clone(),
            version_description: meta.version_description.clone(),
            is_major_version: meta.is_major_version,
            content: content.to_string(),
            created_at: inner.now(),
        };
        inner.versions.push(version.clone());
        Ok(version)
    }

    async fn list_versions(
        &self,
        document_id: &str,
    ) -> Result<Vec<DocumentVersionSummary>, AppError> {
        let inner = self.inner.lock().unwrap();
        inner.check()?;
        let mut versions: Vec<DocumentVersionSummary> = inner
            .versions
            .iter()
            .filter(|v| v.document_id == document_id)
            .map(DocumentVersionSummary::from)
            .collect();
        versions.sort_by(|a, b| b.version_number.cmp(&a.version_number));
        Ok(versions)
    }

    async fn get_version(&self, id: &str) -> Result<Option<DocumentVersion>, AppError> {
        let inner = self.inner.lock().unwrap();
        inner.check()?;
        Ok(inner.versions.iter().find(|v| v.id == id).cloned())
    }

    async fn load_comments(&self, document_id: &str) -> Result<Vec<Comment>, AppError> {
        let inner = self.inner.lock().unwrap();
        inner.check()?;
        Ok(inner
            .comments
            .iter()
            .filter(|c| c.document_id == document_id)
            .cloned()
            .collect())
    }

    async fn get_comment(&self, id: &str) -> Result<Option<Comment>, AppError> {
        let inner = self.inner.lock().unwrap();
        inner.check()?;
        Ok(inner.comments.iter().find(|c| c.id == id).cloned())
    }

    async fn add_comment(&self, comment: &NewComment) -> Result<Comment, AppError> {
        let mut inner = self.inner.lock().unwrap();
        inner.check()?;
        let created = Comment {
            id: new_id(),
            document_id: comment.document_id.clone(),
            content: comment.content.clone(),
            selected_text: comment.selected_text.clone(),
            position: comment.position,
            resolved: false,
            user_id: comment.user_id.clone(),
            parent_comment_id: comment.parent_comment_id.clone(),
            created_at: inner.now(),
        };
        inner.comments.push(created.clone());
        Ok(created)
    }

    async fn set_comment_resolved(
        &self,
        id: &str,
        resolved: bool,
    ) -> Result<Option<Comment>, AppError> {
        let mut inner = self.inner.lock().unwrap();
        inner.check()?;
        let Some(comment) = inner.comments.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };
        comment.resolved = resolved;
        Ok(Some(comment.clone()))
    }

    async fn record_file(&self, file: &NewFile) -> Result<FileRecord, AppError> {
        let mut inner = self.inner.lock().unwrap();
        inner.check()?;
        let record = FileRecord {
            id: new_id(),
            document_id: file.document_id.clone(),
            filename: file.filename.clone(),
            file_path: file.file_path.clone(),
            file_type: file.file_type.clone(),
            created_at: inner.now(),
        };
        inner.files.push(record.clone());
        Ok(record)
    }

    async fn list_files(&self, document_id: &str) -> Result<Vec<FileRecord>, AppError> {
        let inner = self.inner.lock().unwrap();
        inner.check()?;
        Ok(inner
            .files
            .iter()
            .filter(|f| f.document_id == document_id)
            .cloned()
            .collect())
    }
}
