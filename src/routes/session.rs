//! # 편집 세션 라우트 핸들러
//!
//! ## 엔드포인트
//! - `POST   /api/v1/documents/{id}/session`            → 세션 열기 (이미 열려 있으면 그대로)
//! - `GET    /api/v1/documents/{id}/session`            → 세션 상태
//! - `DELETE /api/v1/documents/{id}/session`            → 세션 닫기
//! - `POST   /api/v1/documents/{id}/session/commands`   → 툴바 명령 실행
//! - `POST   /api/v1/documents/{id}/session/selection`  → 선택 영역 지정 (문자 오프셋)
//! - `POST   /api/v1/documents/{id}/session/content`    → 클라이언트에서 편집한 현재 페이지 내용
//! - `POST   /api/v1/documents/{id}/session/transcript` → 음성 인식 결과 전달
//! - `POST   /api/v1/documents/{id}/session/snapshot`   → PDF 내보내기용 렌더링 스냅샷(PNG)

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;

use super::documents::{owned_document, AppState};
use super::export::download;
use crate::{
    editor::{
        dispatcher::{dispatch, DispatchContext, Effect},
        session::{SessionState, SharedSession},
    },
    error::AppError,
    middleware::auth::AuthUser,
};

#[derive(Debug, Deserialize)]
pub struct CommandRequest {
    pub command: String,
    pub value: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SelectionRequest {
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Deserialize)]
pub struct ContentRequest {
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct TranscriptRequest {
    pub text: String,
}

/// 내 문서의 열린 세션을 찾습니다. 열려 있지 않으면 409.
pub(crate) async fn open_session_for(
    state: &AppState,
    document_id: &str,
    user: &AuthUser,
) -> Result<SharedSession, AppError> {
    owned_document(state, document_id, user).await?;
    state
        .sessions
        .get(document_id)
        .await
        .ok_or_else(|| AppError::Conflict("No editor session is open for this document".into()))
}

pub async fn open_session(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<SessionState>, AppError> {
    owned_document(&state, &id, &auth_user).await?;
    let session = state
        .sessions
        .open(state.store.clone(), &id, state.settings)
        .await?;
    let state = session.lock().await.state();
    Ok(Json(state))
}

pub async fn get_session(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<SessionState>, AppError> {
    let session = open_session_for(&state, &id, &auth_user).await?;
    let state = session.lock().await.state();
    Ok(Json(state))
}

pub async fn close_session(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    owned_document(&state, &id, &auth_user).await?;
    if state.sessions.close(&id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}

/// 명령을 실행합니다.
///
/// 내보내기 명령은 파일을 첨부(attachment)로 바로 내려주고,
/// 나머지는 `DispatchOutcome` JSON을 돌려줍니다. 명령이 실패해도 HTTP는 200이고
/// 실패 내용은 `notifications`에 담깁니다.
pub async fn run_command(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
    Json(req): Json<CommandRequest>,
) -> Result<Response, AppError> {
    let session = open_session_for(&state, &id, &auth_user).await?;
    let mut session = session.lock().await;

    let ctx = DispatchContext {
        store: state.store.as_ref(),
        user_id: &auth_user.user_id,
    };
    let outcome = dispatch(&mut session, &ctx, &req.command, req.value.as_deref()).await;

    match outcome.effect {
        Effect::Download {
            filename,
            mime,
            bytes,
        } => Ok(download(filename, mime, bytes)),
        _ => Ok(Json(outcome).into_response()),
    }
}

pub async fn set_selection(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
    Json(req): Json<SelectionRequest>,
) -> Result<Json<SessionState>, AppError> {
    let session = open_session_for(&state, &id, &auth_user).await?;
    let mut session = session.lock().await;

    session
        .surface
        .select(req.start..req.end)
        .map_err(|e| AppError::validation(e.to_string()))?;
    Ok(Json(session.state()))
}

/// 현재 페이지 내용을 바꿉니다. 넘침 검사는 클라이언트가 높이를 알려줄 때 따로 합니다.
pub async fn set_content(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
    Json(req): Json<ContentRequest>,
) -> Result<Json<SessionState>, AppError> {
    let session = open_session_for(&state, &id, &auth_user).await?;
    let mut session = session.lock().await;

    session.set_page_content(req.content);
    Ok(Json(session.state()))
}

pub async fn push_transcript(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
    Json(req): Json<TranscriptRequest>,
) -> Result<Json<SessionState>, AppError> {
    let session = open_session_for(&state, &id, &auth_user).await?;
    let mut session = session.lock().await;

    let session = &mut *session;
    session
        .dictation
        .on_transcript(session.surface.as_mut(), &req.text)?;
    session.sync_page();
    Ok(Json(session.state()))
}

/// 본문은 PNG(또는 JPEG) 바이트 그대로입니다.
pub async fn upload_snapshot(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<StatusCode, AppError> {
    let session = open_session_for(&state, &id, &auth_user).await?;
    session.lock().await.set_snapshot(&body)?;
    Ok(StatusCode::NO_CONTENT)
}
