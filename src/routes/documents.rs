//! # 문서(Document) 라우트 핸들러
//!
//! 문서의 생성/조회/수정을 처리하는 HTTP 핸들러 함수들입니다.
//!
//! ## 엔드포인트
//! - `GET  /api/v1/documents`      → 내 문서 목록 조회
//! - `POST /api/v1/documents`      → 새 문서 저장 (saveDocument)
//! - `GET  /api/v1/documents/{id}` → 단일 문서 조회
//! - `PUT  /api/v1/documents/{id}` → 문서 내용/제목 수정 (updateDocument)
//!
//! 모든 핸들러는 `AuthUser`로 요청한 사용자를 확인하고,
//! 다른 사람의 문서는 존재하지 않는 것처럼 404로 응답합니다.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use crate::{
    editor::session::{SessionRegistry, SessionSettings},
    error::AppError,
    middleware::auth::AuthUser,
    models::*,
    services::store::DocumentStore,
};

/// 애플리케이션 공유 상태
///
/// 모든 요청 핸들러가 `State(state): State<AppState>`로 접근합니다.
/// 저장소는 트레이트 객체로 주입되어, 테스트에서는 메모리 저장소를 씁니다.
#[derive(Clone)]
pub struct AppState {
    /// 문서/버전/댓글/파일 저장소
    pub store: Arc<dyn DocumentStore>,
    /// 열려 있는 편집 세션들
    pub sessions: SessionRegistry,
    /// 새 세션에 적용할 설정
    pub settings: SessionSettings,
    /// 업로드 파일 저장 디렉토리 경로
    pub uploads_path: String,
    /// JWT 토큰 검증용 비밀키
    pub jwt_secret: String,
}

/// 문서를 읽고 요청한 사용자의 것인지 확인합니다.
/// 남의 문서는 `NotFound`로 숨깁니다.
pub(crate) async fn owned_document(
    state: &AppState,
    id: &str,
    user: &AuthUser,
) -> Result<Document, AppError> {
    state
        .store
        .get_document(id)
        .await?
        .filter(|doc| doc.user_id == user.user_id)
        .ok_or(AppError::NotFound)
}

/// `GET /documents` — 내 문서 목록을 최근 수정 순으로 조회합니다.
///
/// 응답: `{ "documents": [...] }`
pub async fn list_documents(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Value>, AppError> {
    let documents = state.store.list_documents(&auth_user.user_id).await?;
    Ok(Json(json!({ "documents": documents })))
}

/// `GET /documents/{id}` — 단일 문서를 조회합니다.
pub async fn get_document(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Document>, AppError> {
    Ok(Json(owned_document(&state, &id, &auth_user).await?))
}

/// `POST /documents` — 새 문서를 저장합니다.
///
/// 제목이 없으면 `"Untitled Document"`가 됩니다.
/// 성공 시 HTTP 201 Created와 생성된 문서를 반환합니다.
pub async fn create_document(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(req): Json<SaveDocumentRequest>,
) -> Result<(StatusCode, Json<Document>), AppError> {
    let document = state
        .store
        .save_document(&auth_user.user_id, &req.content, req.title.as_deref())
        .await?;
    Ok((StatusCode::CREATED, Json(document)))
}

/// `PUT /documents/{id}` — 문서 내용(과 제목)을 덮어씁니다.
///
/// 편집 세션이 열려 있으면 세션 내용도 새 내용으로 바꿉니다.
/// 동시에 두 번 저장하면 나중에 도착한 쪽이 남습니다.
pub async fn update_document(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
    Json(req): Json<UpdateDocumentRequest>,
) -> Result<Json<Document>, AppError> {
    owned_document(&state, &id, &auth_user).await?;

    let document = state
        .store
        .update_document(&id, &req.content, req.title.as_deref())
        .await?
        .ok_or(AppError::NotFound)?;

    if let Some(session) = state.sessions.get(&id).await {
        let mut session = session.lock().await;
        session.title = document.title.clone();
        session.replace_document(document.content.clone());
        session.autosave.mark(&document.content);
    }

    Ok(Json(document))
}
