//! # 이미지 오버레이 라우트 핸들러
//!
//! ## 엔드포인트
//! - `GET    /api/v1/documents/{id}/overlay`                   → 그리기 목록과 선택된 객체
//! - `POST   /api/v1/documents/{id}/overlay/images`            → multipart `image` 업로드 (uploadImage)
//! - `GET    /api/v1/documents/{id}/overlay/images/{image_id}` → 축소된 PNG
//! - `DELETE /api/v1/documents/{id}/overlay/images/{image_id}` → 객체 삭제
//! - `POST   /api/v1/documents/{id}/overlay/select`            → `{ "id": ... }`
//! - `POST   /api/v1/documents/{id}/overlay/layer`             → `{ "direction": "front" | "back" }`
//! - `POST   /api/v1/documents/{id}/overlay/wrap`              → `{ "mode": "inline" | "float" }`

use axum::{
    extract::{Multipart, Path, State},
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use super::documents::AppState;
use super::files::read_file_field;
use super::session::open_session_for;
use crate::{
    editor::overlay::{LayerDirection, OverlayCanvas, OverlayObject, WrapMode},
    error::AppError,
    middleware::auth::AuthUser,
};

#[derive(Debug, Deserialize)]
pub struct SelectObjectRequest {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct LayerRequest {
    pub direction: LayerDirection,
}

#[derive(Debug, Deserialize)]
pub struct WrapRequest {
    pub mode: WrapMode,
}

fn canvas_json(canvas: &OverlayCanvas) -> Json<Value> {
    Json(json!({
        "objects": canvas.objects(),
        "selected": canvas.selected(),
    }))
}

pub async fn get_overlay(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let session = open_session_for(&state, &id, &auth_user).await?;
    let session = session.lock().await;
    Ok(canvas_json(&session.overlay))
}

pub async fn upload_image(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
    mut form: Multipart,
) -> Result<(StatusCode, Json<OverlayObject>), AppError> {
    let session = open_session_for(&state, &id, &auth_user).await?;
    let file = read_file_field(&mut form, "image").await?;

    let mut session = session.lock().await;
    let object = session
        .overlay
        .upload_image(&file.filename, &file.bytes)?
        .clone();
    Ok((StatusCode::CREATED, Json(object)))
}

pub async fn get_image(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path((id, image_id)): Path<(String, String)>,
) -> Result<Response, AppError> {
    let session = open_session_for(&state, &id, &auth_user).await?;
    let session = session.lock().await;
    let object = session.overlay.get(&image_id).ok_or(AppError::NotFound)?;
    Ok(([(CONTENT_TYPE, "image/png")], object.png.clone()).into_response())
}

pub async fn remove_image(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path((id, image_id)): Path<(String, String)>,
) -> Result<StatusCode, AppError> {
    let session = open_session_for(&state, &id, &auth_user).await?;
    session.lock().await.overlay.remove(&image_id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn select_object(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
    Json(req): Json<SelectObjectRequest>,
) -> Result<Json<Value>, AppError> {
    let session = open_session_for(&state, &id, &auth_user).await?;
    let mut session = session.lock().await;
    session.overlay.select(&req.id)?;
    Ok(canvas_json(&session.overlay))
}

/// 선택된 객체가 없으면 422 ("Nothing selected"), 그리기 목록은 그대로입니다.
pub async fn change_layer(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
    Json(req): Json<LayerRequest>,
) -> Result<Json<Value>, AppError> {
    let session = open_session_for(&state, &id, &auth_user).await?;
    let mut session = session.lock().await;
    session.overlay.change_layer(req.direction)?;
    Ok(canvas_json(&session.overlay))
}

pub async fn set_wrap(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
    Json(req): Json<WrapRequest>,
) -> Result<Json<Value>, AppError> {
    let session = open_session_for(&state, &id, &auth_user).await?;
    let mut session = session.lock().await;
    session.overlay.set_wrap(req.mode)?;
    Ok(canvas_json(&session.overlay))
}
