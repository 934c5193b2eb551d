//! # 페이지 라우트 핸들러
//!
//! ## 엔드포인트
//! - `GET  /api/v1/documents/{id}/pages`                → 페이지 목록과 현재 페이지
//! - `POST /api/v1/documents/{id}/pages/overflow`       → 렌더링 높이로 넘침 검사
//! - `POST /api/v1/documents/{id}/pages/{index}/select` → 다른 페이지로 이동
//!
//! 클라이언트는 현재 페이지를 그린 뒤 높이를 `overflow`로 알려줍니다.
//! 높이를 빼면 서버가 추정합니다.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use super::documents::AppState;
use super::session::open_session_for;
use crate::{editor::pagination::Page, error::AppError, middleware::auth::AuthUser};

#[derive(Debug, Deserialize)]
pub struct OverflowRequest {
    pub rendered_height: Option<f64>,
}

pub async fn list_pages(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let session = open_session_for(&state, &id, &auth_user).await?;
    let session = session.lock().await;

    Ok(Json(json!({
        "pages": session.pages(),
        "current": session.paginator.current(),
        "page_height": session.paginator.page_height(),
    })))
}

/// 응답: `{ "page_created": "..." | null, "current": 1, "page_count": 2 }`
pub async fn check_overflow(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
    Json(req): Json<OverflowRequest>,
) -> Result<Json<Value>, AppError> {
    let session = open_session_for(&state, &id, &auth_user).await?;
    let mut session = session.lock().await;

    let created = session.check_overflow(req.rendered_height);
    Ok(Json(json!({
        "page_created": created,
        "current": session.paginator.current(),
        "page_count": session.paginator.pages().len(),
    })))
}

pub async fn select_page(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path((id, index)): Path<(String, usize)>,
) -> Result<Json<Page>, AppError> {
    let session = open_session_for(&state, &id, &auth_user).await?;
    let page = session.lock().await.select_page(index)?;
    Ok(Json(page))
}
