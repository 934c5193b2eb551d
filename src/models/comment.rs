//! # 댓글 모델 정의
//!
//! 댓글은 `parent_comment_id`로 자기 자신을 참조합니다.
//! 부모가 없는 댓글이 스레드 루트이고, 답글은 한 단계만 사용됩니다.
//! 스레드는 저장하지 않고 읽을 때 재구성합니다 (`editor::comments`).

use serde::{Deserialize, Serialize};

/// 댓글을 만들 당시의 화면 좌표.
/// 본문 위치가 아니라 스크롤을 더한 뷰포트 좌표입니다.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub top: f64,
    pub left: f64,
}

/// 댓글 엔티티 — DB의 `document_comments` 테이블 한 행에 대응합니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub document_id: String,
    /// 댓글 본문. "제안 적용" 시 대체 텍스트로 사용됩니다.
    pub content: String,
    /// 댓글을 단 선택 영역의 텍스트
    pub selected_text: String,
    pub position: Position,
    pub resolved: bool,
    pub user_id: String,
    pub parent_comment_id: Option<String>,
    pub created_at: String,
}

impl Comment {
    pub fn is_root(&self) -> bool {
        self.parent_comment_id.is_none()
    }
}

/// DB 행. position은 JSON 텍스트로 저장되어 있어 `Comment`로 변환이 필요합니다.
#[derive(Debug, sqlx::FromRow)]
pub struct CommentRow {
    pub id: String,
    pub document_id: String,
    pub content: String,
    pub selected_text: String,
    pub position: String,
    pub resolved: bool,
    pub user_id: String,
    pub parent_comment_id: Option<String>,
    pub created_at: String,
}

impl TryFrom<CommentRow> for Comment {
    type Error = serde_json::Error;

    fn try_from(row: CommentRow) -> Result<Self, Self::Error> {
        Ok(Self {
            position: serde_json::from_str(&row.position)?,
            id: row.id,
            document_id: row.document_id,
            content: row.content,
            selected_text: row.selected_text,
            resolved: row.resolved,
            user_id: row.user_id,
            parent_comment_id: row.parent_comment_id,
            created_at: row.created_at,
        })
    }
}

/// 저장 계층에 넘기는 새 댓글
#[derive(Debug, Clone)]
pub struct NewComment {
    pub document_id: String,
    pub user_id: String,
    pub content: String,
    pub selected_text: String,
    pub position: Position,
    pub parent_comment_id: Option<String>,
}

/// `POST /documents/{id}/comments` 요청 본문
#[derive(Debug, Deserialize)]
pub struct AddCommentRequest {
    pub content: String,
    /// 없으면 현재 세션의 선택 영역을 사용합니다.
    pub selected_text: Option<String>,
    #[serde(default)]
    pub position: Position,
    pub parent_comment_id: Option<String>,
}
