//! # 댓글(Comment) 라우트 핸들러
//!
//! ## 엔드포인트
//! - `GET  /api/v1/documents/{id}/comments`         → 댓글 목록 (생성 순)
//! - `POST /api/v1/documents/{id}/comments`         → 선택한 텍스트에 댓글 달기
//! - `GET  /api/v1/documents/{id}/comments/threads` → 스레드로 묶은 댓글
//! - `POST /api/v1/comments/{id}/resolve`           → 해결 여부 뒤집기
//! - `POST /api/v1/comments/{id}/apply`             → 댓글 제안 적용 (세션 필요)
//!
//! 편집 세션이 열려 있으면 세션의 활성 댓글 목록을 쓰고, 아니면 저장소에서 바로 읽습니다.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use super::documents::{owned_document, AppState};
use super::session::open_session_for;
use crate::{
    editor::comments::CommentThreads,
    error::AppError,
    middleware::auth::AuthUser,
    models::*,
};

/// 세션이 없을 때 쓰는 일회용 댓글 목록
async fn load_threads(state: &AppState, document_id: &str) -> Result<CommentThreads, AppError> {
    let mut threads = CommentThreads::new(document_id);
    threads.load(state.store.as_ref()).await?;
    Ok(threads)
}

pub async fn list_comments(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    owned_document(&state, &id, &auth_user).await?;

    let comments = match state.sessions.get(&id).await {
        Some(session) => session.lock().await.comments.comments().to_vec(),
        None => load_threads(&state, &id).await?.comments().to_vec(),
    };
    Ok(Json(json!({ "comments": comments })))
}

pub async fn list_threads(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    owned_document(&state, &id, &auth_user).await?;

    let threads = match state.sessions.get(&id).await {
        Some(session) => session.lock().await.comments.threads(),
        None => load_threads(&state, &id).await?.threads(),
    };
    Ok(Json(json!({ "threads": threads })))
}

/// 선택 텍스트를 주지 않으면 열린 세션의 현재 선택 영역을 씁니다.
/// 선택 텍스트나 본문이 비어 있으면 422.
pub async fn add_comment(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
    Json(req): Json<AddCommentRequest>,
) -> Result<(StatusCode, Json<Comment>), AppError> {
    owned_document(&state, &id, &auth_user).await?;

    let comment = match state.sessions.get(&id).await {
        Some(session) => {
            let mut session = session.lock().await;
            let selected = req
                .selected_text
                .clone()
                .unwrap_or_else(|| session.surface.selected_text().to_string());
            session
                .comments
                .add(
                    state.store.as_ref(),
                    &auth_user.user_id,
                    &req.content,
                    &selected,
                    req.position,
                    req.parent_comment_id.clone(),
                )
                .await?
        }
        None => {
            CommentThreads::new(&id)
                .add(
                    state.store.as_ref(),
                    &auth_user.user_id,
                    &req.content,
                    req.selected_text.as_deref().unwrap_or_default(),
                    req.position,
                    req.parent_comment_id.clone(),
                )
                .await?
        }
    };

    Ok((StatusCode::CREATED, Json(comment)))
}

pub async fn resolve_comment(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Comment>, AppError> {
    let comment = state.store.get_comment(&id).await?.ok_or(AppError::NotFound)?;
    owned_document(&state, &comment.document_id, &auth_user).await?;

    let updated = match state.sessions.get(&comment.document_id).await {
        Some(session) => {
            session
                .lock()
                .await
                .comments
                .toggle_resolved(state.store.as_ref(), &id)
                .await?
        }
        None => {
            load_threads(&state, &comment.document_id)
                .await?
                .toggle_resolved(state.store.as_ref(), &id)
                .await?
        }
    };
    Ok(Json(updated))
}

/// 댓글 본문으로 대상 텍스트를 바꾸고 댓글을 목록에서 뺍니다.
///
/// 응답: `{ "applied": true, "content": "..." }`
pub async fn apply_suggestion(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let comment = state.store.get_comment(&id).await?.ok_or(AppError::NotFound)?;
    let session = open_session_for(&state, &comment.document_id, &auth_user).await?;
    let mut session = session.lock().await;

    let applied = session.apply_suggestion(&id)?;
    Ok(Json(json!({
        "applied": applied,
        "content": session.surface.content(),
        "current_page": session.paginator.current(),
    })))
}
