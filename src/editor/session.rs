//! # 편집 세션
//!
//! 문서 하나를 열어 둔 동안의 모든 상태를 묶습니다.
//! 편집 표면은 항상 "현재 페이지"의 내용을 보여주고,
//! 문서 전체 내용은 페이지들을 순서대로 이어 붙인 것입니다.
//!
//! 세션은 `SessionRegistry`에 `Arc<tokio::sync::Mutex<_>>`로 보관되어
//! 한 세션에 대한 명령은 하나씩 처리되고, 다른 세션끼리는 동시에 진행됩니다.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{Mutex, RwLock};

use super::autosave::{spawn_autosave, AutoSave};
use super::comments::CommentThreads;
use super::dictation::{Dictation, DictationStatus};
use super::overlay::{OverlayCanvas, OverlayObject};
use super::pagination::{LayoutEstimate, Page, Paginator};
use super::platform::EditingPlatform;
use super::surface::HtmlSurface;
use crate::config::{
    DEFAULT_AUTOSAVE_INTERVAL_SECS, DEFAULT_OVERLAY_MAX_WIDTH_PX, DEFAULT_PAGE_HEIGHT_PX,
};
use crate::error::AppError;
use crate::models::{Document, DocumentVersion, NewVersion};
use crate::services::export::{ExportError, MissingSnapshot, Rasterizer, SnapshotRasterizer};
use crate::services::store::DocumentStore;

pub type SharedSession = Arc<Mutex<EditorSession>>;

/// 세션마다 쓰는 설정값 (`Config`에서 추려냄)
#[derive(Debug, Clone, Copy)]
pub struct SessionSettings {
    pub page_height: f64,
    pub autosave_interval: Duration,
    pub overlay_max_width: u32,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            page_height: DEFAULT_PAGE_HEIGHT_PX,
            autosave_interval: Duration::from_secs(DEFAULT_AUTOSAVE_INTERVAL_SECS),
            overlay_max_width: DEFAULT_OVERLAY_MAX_WIDTH_PX,
        }
    }
}

/// 댓글/버전 사이드 패널 표시 여부
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct Panels {
    pub comments: bool,
    pub versions: bool,
}

/// `GET /documents/{id}/session` 응답
#[derive(Debug, Serialize)]
pub struct SessionState {
    pub document_id: String,
    pub title: String,
    pub content: String,
    pub selection: Option<(usize, usize)>,
    pub page_count: usize,
    pub current_page: usize,
    pub panels: Panels,
    pub dictation: DictationStatus,
    pub unresolved_comments: usize,
    pub overlay: Vec<OverlayObject>,
    pub has_snapshot: bool,
}

pub struct EditorSession {
    pub document_id: String,
    pub title: String,
    pub surface: Box<dyn EditingPlatform>,
    pub paginator: Paginator,
    pub comments: CommentThreads,
    pub overlay: OverlayCanvas,
    pub dictation: Dictation,
    pub panels: Panels,
    pub autosave: AutoSave,
    pub layout: LayoutEstimate,
    snapshot: Option<SnapshotRasterizer>,
    closed: bool,
}

impl EditorSession {
    /// 주어진 편집 표면으로 세션을 만듭니다. 댓글은 비어 있는 상태입니다.
    pub fn with_surface(
        document: &Document,
        mut surface: Box<dyn EditingPlatform>,
        settings: SessionSettings,
    ) -> Self {
        surface.set_content(document.content.clone());
        Self {
            document_id: document.id.clone(),
            title: document.title.clone(),
            surface,
            paginator: Paginator::new(document.content.clone(), settings.page_height),
            comments: CommentThreads::new(document.id.clone()),
            overlay: OverlayCanvas::new(settings.overlay_max_width),
            dictation: Dictation::default(),
            panels: Panels::default(),
            autosave: AutoSave::new(Some(document.content.clone())),
            layout: LayoutEstimate::default(),
            snapshot: None,
            closed: false,
        }
    }

    /// 저장소에서 문서와 댓글을 읽어 세션을 엽니다.
    pub async fn open(
        store: &dyn DocumentStore,
        document_id: &str,
        settings: SessionSettings,
    ) -> Result<Self, AppError> {
        let document = store
            .get_document(document_id)
            .await?
            .ok_or(AppError::NotFound)?;
        let mut session =
            Self::with_surface(&document, Box::new(HtmlSurface::default()), settings);
        session.comments.load(store).await?;
        Ok(session)
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// 세션을 닫습니다. 자동 저장 작업은 다음 주기에 멈춥니다.
    pub fn close(&mut self) {
        self.dictation.stop();
        self.closed = true;
    }

    /// 문서 전체 내용. 현재 페이지는 편집 표면의 최신 내용을 씁니다.
    pub fn document_content(&self) -> String {
        let current = self.paginator.current();
        self.paginator
            .pages()
            .iter()
            .enumerate()
            .map(|(i, page)| {
                if i == current {
                    self.surface.content()
                } else {
                    page.content.as_str()
                }
            })
            .collect()
    }

    /// 편집 표면의 내용을 현재 페이지에 반영합니다.
    pub fn sync_page(&mut self) {
        self.paginator.set_current_content(self.surface.content());
    }

    /// 페이지 넘침을 검사합니다. 높이를 모르면 추정값을 씁니다.
    /// 나눴으면 편집 표면은 새 현재 페이지를 보여줍니다.
    pub fn check_overflow(&mut self, rendered_height: Option<f64>) -> Option<String> {
        self.sync_page();
        let height =
            rendered_height.unwrap_or_else(|| self.layout.height(self.surface.content()));
        let created = self.paginator.on_content_changed(height)?;
        let content = self.paginator.current_page().content.clone();
        self.surface.set_content(content);
        Some(created)
    }

    pub fn pages(&self) -> Vec<Page> {
        let mut pages = self.paginator.pages().to_vec();
        pages[self.paginator.current()].content = self.surface.content().to_string();
        pages
    }

    pub fn select_page(&mut self, index: usize) -> Result<Page, AppError> {
        self.sync_page();
        let page = self
            .paginator
            .select(index)
            .cloned()
            .ok_or(AppError::NotFound)?;
        self.surface.set_content(page.content.clone());
        Ok(page)
    }

    /// 클라이언트에서 직접 편집한 현재 페이지 내용을 받습니다.
    pub fn set_page_content(&mut self, content: String) {
        self.surface.set_content(content);
        self.sync_page();
    }

    /// 문서 내용을 통째로 바꿉니다 (버전 복원). 페이지는 하나로 돌아갑니다.
    pub fn replace_document(&mut self, content: String) {
        self.paginator.reset(content.clone());
        self.surface.set_content(content);
    }

    /// 댓글의 제안을 적용합니다. 대상 텍스트가 처음 나오는 페이지로 이동한 뒤 바꿉니다.
    pub fn apply_suggestion(&mut self, comment_id: &str) -> Result<bool, AppError> {
        let needle = self
            .comments
            .comments()
            .iter()
            .find(|c| c.id == comment_id)
            .map(|c| c.selected_text.clone())
            .ok_or(AppError::NotFound)?;

        let target = self
            .pages()
            .iter()
            .position(|page| page.content.contains(&needle));
        if let Some(index) = target {
            if index != self.paginator.current() {
                self.select_page(index)?;
            }
        }

        let applied = self
            .comments
            .apply_suggestion(self.surface.as_mut(), comment_id)?;
        self.sync_page();
        Ok(applied)
    }

    pub fn set_snapshot(&mut self, bytes: &[u8]) -> Result<(), ExportError> {
        self.snapshot = Some(SnapshotRasterizer::from_bytes(bytes)?);
        Ok(())
    }

    /// PDF 내보내기에 쓸 래스터라이저. 스냅샷이 없으면 항상 실패하는 것을 돌려줍니다.
    pub fn rasterizer(&self) -> &dyn Rasterizer {
        match &self.snapshot {
            Some(snapshot) => snapshot as &dyn Rasterizer,
            None => &MissingSnapshot,
        }
    }

    /// 현재 내용으로 문서를 저장합니다.
    pub async fn save_document(&mut self, store: &dyn DocumentStore) -> Result<Document, AppError> {
        let content = self.document_content();
        let document = store
            .update_document(&self.document_id, &content, Some(self.title.as_str()))
            .await?
            .ok_or(AppError::NotFound)?;
        tracing::info!(document_id = %self.document_id, "Document saved");
        Ok(document)
    }

    /// 현재 내용으로 버전을 만듭니다. 자동 저장 기준점도 갱신합니다.
    pub async fn save_version(
        &mut self,
        store: &dyn DocumentStore,
        meta: &NewVersion,
    ) -> Result<DocumentVersion, AppError> {
        let content = self.document_content();
        let version = store.save_version(&self.document_id, &content, meta).await?;
        self.autosave.mark(&content);
        Ok(version)
    }

    pub fn state(&self) -> SessionState {
        SessionState {
            document_id: self.document_id.clone(),
            title: self.title.clone(),
            content: self.surface.content().to_string(),
            selection: self.surface.selection().map(|r| (r.start, r.end)),
            page_count: self.paginator.pages().len(),
            current_page: self.paginator.current(),
            panels: self.panels,
            dictation: self.dictation.status(),
            unresolved_comments: self.comments.unresolved().count(),
            overlay: self.overlay.objects().to_vec(),
            has_snapshot: self.snapshot.is_some(),
        }
    }
}

/// 열려 있는 세션들 (문서 id → 세션)
#[derive(Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<String, SharedSession>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, document_id: &str) -> Option<SharedSession> {
        self.sessions.read().await.get(document_id).cloned()
    }

    /// 세션을 엽니다. 이미 열려 있으면 그 세션을 돌려줍니다.
    /// 새로 열면 자동 저장 작업도 시작합니다.
    pub async fn open(
        &self,
        store: Arc<dyn DocumentStore>,
        document_id: &str,
        settings: SessionSettings,
    ) -> Result<SharedSession, AppError> {
        if let Some(existing) = self.get(document_id).await {
            return Ok(existing);
        }

        let session = EditorSession::open(store.as_ref(), document_id, settings).await?;

        let mut sessions = self.sessions.write().await;
        // 읽기 잠금을 푼 사이에 다른 요청이 먼저 열었을 수 있습니다.
        if let Some(existing) = sessions.get(document_id) {
            return Ok(existing.clone());
        }
        let shared = Arc::new(Mutex::new(session));
        sessions.insert(document_id.to_string(), shared.clone());
        drop(sessions);

        spawn_autosave(&shared, store, settings.autosave_interval);
        tracing::info!(document_id, "Editor session opened");
        Ok(shared)
    }

    /// 세션을 닫고 목록에서 뺍니다. 열려 있지 않았으면 `false`.
    pub async fn close(&self, document_id: &str) -> bool {
        let Some(session) = self.sessions.write().await.remove(document_id) else {
            return false;
        };
        session.lock().await.close();
        tracing::info!(document_id, "Editor session closed");
        true
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}
