//! # 버전(Version) 라우트 핸들러
//!
//! ## 엔드포인트
//! - `GET  /api/v1/documents/{id}/versions` → 버전 목록 (최신 순, 본문 제외)
//! - `POST /api/v1/documents/{id}/versions` → 현재 내용으로 버전 저장 (saveVersion)
//! - `GET  /api/v1/versions/{id}`           → 버전 하나 (본문 포함)
//! - `POST /api/v1/versions/{id}/restore`   → 버전 내용으로 문서 되돌리기

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use super::documents::{owned_document, AppState};
use crate::{error::AppError, middleware::auth::AuthUser, models::*};

pub async fn list_document_versions(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    // 소유권 확인
    owned_document(&state, &id, &auth_user).await?;

    let versions = state.store.list_versions(&id).await?;
    Ok(Json(json!({ "versions": versions })))
}

/// 세션이 열려 있으면 세션의 최신 내용(모든 페이지)을, 아니면 저장된 문서 내용을 버전으로 남깁니다.
/// 이름/설명/주 버전 여부는 모두 선택 항목입니다.
pub async fn create_version(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
    Json(meta): Json<NewVersion>,
) -> Result<(StatusCode, Json<DocumentVersion>), AppError> {
    let document = owned_document(&state, &id, &auth_user).await?;

    let version = match state.sessions.get(&id).await {
        Some(session) => {
            session
                .lock()
                .await
                .save_version(state.store.as_ref(), &meta)
                .await?
        }
        None => {
            state
                .store
                .save_version(&id, &document.content, &meta)
                .await?
        }
    };

    Ok((StatusCode::CREATED, Json(version)))
}

pub async fn get_version(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<DocumentVersion>, AppError> {
    let version = state.store.get_version(&id).await?.ok_or(AppError::NotFound)?;

    // 문서 소유권 확인
    owned_document(&state, &version.document_id, &auth_user).await?;

    Ok(Json(version))
}

/// 버전 내용을 문서에 덮어씁니다. 열린 세션은 한 페이지로 다시 시작합니다.
pub async fn restore_version(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Document>, AppError> {
    let version = state.store.get_version(&id).await?.ok_or(AppError::NotFound)?;
    owned_document(&state, &version.document_id, &auth_user).await?;

    let document = state
        .store
        .update_document(&version.document_id, &version.content, None)
        .await?
        .ok_or(AppError::NotFound)?;

    if let Some(session) = state.sessions.get(&version.document_id).await {
        let mut session = session.lock().await;
        session.replace_document(version.content.clone());
        session.autosave.mark(&version.content);
    }

    tracing::info!(
        document_id = %version.document_id,
        version_number = version.version_number,
        "Version restored"
    );
    Ok(Json(document))
}
