//! # 댓글 스레드
//!
//! 세션이 열려 있는 동안의 댓글 목록을 들고 있습니다.
//! 저장은 모두 `DocumentStore`를 거치고, 스레드 구조는 저장하지 않고
//! `parent_comment_id`로 그때그때 재구성합니다.

use std::collections::HashMap;

use serde::Serialize;

use super::platform::EditingPlatform;
use crate::error::AppError;
use crate::models::{Comment, NewComment, Position};
use crate::services::store::DocumentStore;

pub const EMPTY_COMMENT_MESSAGE: &str = "Please select text and enter a comment";

pub const UNKNOWN_PARENT_MESSAGE: &str = "The comment being replied to does not exist";

/// 루트 댓글 하나와 그 답글들 (루트가 맨 앞)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentThread {
    pub root_id: String,
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone)]
pub struct CommentThreads {
    document_id: String,
    comments: Vec<Comment>,
}

impl CommentThreads {
    pub fn new(document_id: impl Into<String>) -> Self {
        Self {
            document_id: document_id.into(),
            comments: Vec::new(),
        }
    }

    /// 생성 순서대로 정렬된 활성 댓글 목록
    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    /// 화면에 보여줄 미해결 댓글
    pub fn unresolved(&self) -> impl Iterator<Item = &Comment> {
        self.comments.iter().filter(|c| !c.resolved)
    }

    /// 저장소에서 문서의 댓글을 모두 다시 읽어 활성 목록을 바꿉니다.
    pub async fn load(&mut self, store: &dyn DocumentStore) -> Result<(), AppError> {
        self.comments = store.load_comments(&self.document_id).await?;
        Ok(())
    }

    /// 선택한 텍스트에 댓글을 답니다.
    ///
    /// 선택 텍스트나 본문이 비어 있으면(공백만 있어도) 검증 에러이고 아무것도 만들지 않습니다.
    /// 답글의 부모는 같은 문서의 댓글이어야 합니다.
    pub async fn add(
        &mut self,
        store: &dyn DocumentStore,
        author: &str,
        content: &str,
        selected_text: &str,
        position: Position,
        parent_comment_id: Option<String>,
    ) -> Result<Comment, AppError> {
        if selected_text.trim().is_empty() || content.trim().is_empty() {
            return Err(AppError::validation(EMPTY_COMMENT_MESSAGE));
        }
        if let Some(parent_id) = parent_comment_id.as_deref() {
            let parent = store.get_comment(parent_id).await?;
            if !parent.is_some_and(|p| p.document_id == self.document_id) {
                return Err(AppError::validation(UNKNOWN_PARENT_MESSAGE));
            }
        }

        let comment = store
            .add_comment(&NewComment {
                document_id: self.document_id.clone(),
                user_id: author.to_string(),
                content: content.to_string(),
                selected_text: selected_text.to_string(),
                position,
                parent_comment_id,
            })
            .await?;

        self.comments.push(comment.clone());
        Ok(comment)
    }

    /// 해결 여부를 뒤집습니다. 저장소 갱신은 한 번뿐입니다.
    /// 활성 목록에 없는 댓글(제안을 적용한 댓글 등)은 저장소에서 찾습니다.
    pub async fn toggle_resolved(
        &mut self,
        store: &dyn DocumentStore,
        id: &str,
    ) -> Result<Comment, AppError> {
        let current = match self.comments.iter().find(|c| c.id == id) {
            Some(comment) => comment.resolved,
            None => store
                .get_comment(id)
                .await?
                .filter(|c| c.document_id == self.document_id)
                .map(|c| c.resolved)
                .ok_or(AppError::NotFound)?,
        };

        let updated = store
            .set_comment_resolved(id, !current)
            .await?
            .ok_or(AppError::NotFound)?;

        if let Some(local) = self.comments.iter_mut().find(|c| c.id == id) {
            local.resolved = updated.resolved;
        }
        Ok(updated)
    }

    /// 댓글 본문을 제안으로 보고 적용합니다.
    ///
    /// 편집 표면에서 `selected_text`가 처음 나오는 곳(대소문자 구분) 하나를 댓글 본문으로 바꾸고,
    /// 댓글은 활성 목록에서 뺍니다. 텍스트를 못 찾아도 댓글은 빠집니다.
    /// 바꿨으면 `true`.
    pub fn apply_suggestion(
        &mut self,
        surface: &mut dyn EditingPlatform,
        id: &str,
    ) -> Result<bool, AppError> {
        let index = self
            .comments
            .iter()
            .position(|c| c.id == id)
            .ok_or(AppError::NotFound)?;
        let comment = self.comments.remove(index);

        let Some(byte_start) = surface.content().find(&comment.selected_text) else {
            tracing::warn!(comment_id = %comment.id, "Suggested text no longer present");
            return Ok(false);
        };
        let start = surface.content()[..byte_start].chars().count();
        let end = start + comment.selected_text.chars().count();

        surface.select(start..end)?;
        surface.insert_html(&comment.content)?;
        Ok(true)
    }

    /// 댓글을 스레드로 묶습니다.
    ///
    /// 루트 댓글이 도착 순서대로 스레드가 되고, 답글은 도착 순서대로 자기 루트 뒤에 붙습니다.
    /// 답글의 답글은 거슬러 올라가 루트 스레드에 붙습니다.
    /// 부모를 찾을 수 없는 답글은 자기 id로 된 스레드가 되어 맨 뒤에 옵니다.
    pub fn threads(&self) -> Vec<CommentThread> {
        let by_id: HashMap<&str, &Comment> =
            self.comments.iter().map(|c| (c.id.as_str(), c)).collect();

        let mut threads: Vec<CommentThread> = self
            .comments
            .iter()
            .filter(|c| c.is_root())
            .map(|root| CommentThread {
                root_id: root.id.clone(),
                comments: vec![root.clone()],
            })
            .collect();
        let mut orphans = Vec::new();

        for reply in self.comments.iter().filter(|c| !c.is_root()) {
            let root = root_of(reply, &by_id);
            match root.and_then(|id| threads.iter_mut().find(|t| t.root_id == id)) {
                Some(thread) => thread.comments.push(reply.clone()),
                None => orphans.push(CommentThread {
                    root_id: reply.id.clone(),
                    comments: vec![reply.clone()],
                }),
            }
        }

        threads.extend(orphans);
        threads
    }
}

/// 부모를 따라 올라가 루트 id를 찾습니다. 끊기거나 순환하면 `None`.
fn root_of<'a>(comment: &'a Comment, by_id: &HashMap<&str, &'a Comment>) -> Option<&'a str> {
    let mut current = comment;
    for _ in 0..=by_id.len() {
        match current.parent_comment_id.as_deref() {
            None => return Some(current.id.as_str()),
            Some(parent) => current = *by_id.get(parent)?,
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::surface::HtmlSurface;
    use crate::services::memory::MemoryStore;

    fn comment(id: &str, parent: Option<&str>) -> Comment {
        Comment {
            id: id.into(),
            document_id: "doc".into(),
            content: format!("comment {}", id),
            selected_text: "text".into(),
            position: Position::default(),
            resolved: false,
            user_id: "u".into(),
            parent_comment_id: parent.map(str::to_string),
            created_at: String::new(),
        }
    }

    fn threads_of(comments: Vec<Comment>) -> Vec<(String, Vec<String>)> {
        let manager = CommentThreads {
            document_id: "doc".into(),
            comments,
        };
        manager
            .threads()
            .into_iter()
            .map(|t| (t.root_id, t.comments.into_iter().map(|c| c.id).collect()))
            .collect()
    }

    #[test]
    fn replies_group_under_their_root() {
        let threads = threads_of(vec![
            comment("1", None),
            comment("2", Some("1")),
            comment("3", None),
        ]);
        assert_eq!(
            threads,
            vec![
                ("1".to_string(), vec!["1".to_string(), "2".to_string()]),
                ("3".to_string(), vec!["3".to_string()]),
            ]
        );
    }

    #[test]
    fn reply_arriving_before_root_still_joins_it() {
        let threads = threads_of(vec![comment("2", Some("1")), comment("1", None)]);
        assert_eq!(threads.len(), 1);
        assert_eq!(threads[0].1, vec!["1".to_string(), "2".to_string()]);
    }

    #[test]
    fn nested_and_orphan_replies() {
        let threads = threads_of(vec![
            comment("1", None),
            comment("2", Some("1")),
            comment("3", Some("2")),
            comment("4", Some("gone")),
        ]);
        assert_eq!(threads.len(), 2);
        assert_eq!(threads[0].1, vec!["1", "2", "3"]);
        assert_eq!(threads[1].0, "4");
    }

    #[tokio::test]
    async fn add_rejects_blank_selection_or_content() {
        let store = MemoryStore::new();
        let mut manager = CommentThreads::new("doc");

        for (content, selected) in [("note", ""), ("note", "   "), ("  ", "word")] {
            let err = manager
                .add(&store, "u", content, selected, Position::default(), None)
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::Validation(ref m) if m == EMPTY_COMMENT_MESSAGE));
        }
        assert!(manager.comments().is_empty());
        assert!(store.load_comments("doc").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn toggle_twice_restores_state() {
        let store = MemoryStore::new();
        let mut manager = CommentThreads::new("doc");
        let added = manager
            .add(&store, "u", "fix", "typo", Position::default(), None)
            .await
            .unwrap();

        assert!(manager.toggle_resolved(&store, &added.id).await.unwrap().resolved);
        assert_eq!(manager.unresolved().count(), 0);
        assert!(!manager.toggle_resolved(&store, &added.id).await.unwrap().resolved);
        assert_eq!(manager.unresolved().count(), 1);

        assert!(matches!(
            manager.toggle_resolved(&store, "missing").await,
            Err(AppError::NotFound)
        ));
    }

    #[tokio::test]
    async fn reply_parent_must_exist_in_same_document() {
        let store = MemoryStore::new();
        let mut other = CommentThreads::new("other-doc");
        let foreign_root = other
            .add(&store, "u", "elsewhere", "text", Position::default(), None)
            .await
            .unwrap();

        let mut manager = CommentThreads::new("doc");
        for parent in ["nope".to_string(), foreign_root.id.clone()] {
            let err = manager
                .add(&store, "u", "reply", "text", Position::default(), Some(parent))
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::Validation(ref m) if m == UNKNOWN_PARENT_MESSAGE));
        }
        assert!(manager.comments().is_empty());

        let root = manager
            .add(&store, "u", "root", "text", Position::default(), None)
            .await
            .unwrap();
        let reply = manager
            .add(&store, "u", "reply", "text", Position::default(), Some(root.id.clone()))
            .await
            .unwrap();
        assert_eq!(reply.parent_comment_id.as_deref(), Some(root.id.as_str()));
        assert_eq!(manager.threads().len(), 1);
    }

    #[tokio::test]
    async fn applied_suggestion_can_still_be_resolved() {
        let store = MemoryStore::new();
        let mut manager = CommentThreads::new("doc");
        let suggestion = manager
            .add(&store, "u", "planet", "world", Position::default(), None)
            .await
            .unwrap();
        let mut surface = HtmlSurface::new("hello world");
        manager.apply_suggestion(&mut surface, &suggestion.id).unwrap();
        assert!(manager.comments().is_empty());

        let resolved = manager.toggle_resolved(&store, &suggestion.id).await.unwrap();
        assert!(resolved.resolved);

        let mut foreign = CommentThreads::new("other-doc");
        assert!(matches!(
            foreign.toggle_resolved(&store, &suggestion.id).await,
            Err(AppError::NotFound)
        ));
    }

    #[tokio::test]
    async fn load_replaces_active_list() {
        let store = MemoryStore::new();
        let mut writer = CommentThreads::new("doc");
        writer
            .add(&store, "u", "a", "x", Position::default(), None)
            .await
            .unwrap();

        let mut reader = CommentThreads::new("doc");
        reader.load(&store).await.unwrap();
        assert_eq!(reader.comments().len(), 1);
    }

    #[tokio::test]
    async fn apply_suggestion_replaces_first_match_only() {
        let store = MemoryStore::new();
        let mut manager = CommentThreads::new("doc");
        let suggestion = manager
            .add(&store, "u", "planet", "world", Position::default(), None)
            .await
            .unwrap();
        let mut surface = HtmlSurface::new("hello world, World, world");

        assert!(manager.apply_suggestion(&mut surface, &suggestion.id).unwrap());

        assert_eq!(surface.content(), "hello planet, World, world");
        assert!(manager.comments().is_empty());
    }

    #[tokio::test]
    async fn apply_suggestion_without_match_still_removes_comment() {
        let store = MemoryStore::new();
        let mut manager = CommentThreads::new("doc");
        let suggestion = manager
            .add(&store, "u", "planet", "world", Position::default(), None)
            .await
            .unwrap();
        let mut surface = HtmlSurface::new("hello there");

        assert!(!manager.apply_suggestion(&mut surface, &suggestion.id).unwrap());

        assert_eq!(surface.content(), "hello there");
        assert!(manager.comments().is_empty());
    }
}
