//! # 라우트 핸들러 모듈
//!
//! HTTP 요청을 처리하는 핸들러 함수들과 `/api/v1` 라우터를 모아둔 모듈입니다.
//!
//! 각 하위 모듈:
//! - `documents`: 문서 저장/조회/수정, 공유 상태 `AppState`
//! - `versions`: 버전 저장/조회/복원
//! - `comments`: 댓글, 스레드, 제안 적용
//! - `session`: 편집 세션 열기/닫기, 툴바 명령, 선택 영역, 받아쓰기
//! - `pages`: 페이지 목록과 넘침 검사
//! - `overlay`: 이미지 오버레이 캔버스
//! - `export`: PDF/Word 다운로드
//! - `files`: 파일 업로드
//! - `health`: 헬스체크

pub mod comments;
pub mod documents;
pub mod export;
pub mod files;
pub mod health;
pub mod overlay;
pub mod pages;
pub mod session;
pub mod versions;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use documents::AppState;

/// 업로드(파일, 오버레이 이미지, PDF 스냅샷) 요청 본문 최대 크기
const UPLOAD_BODY_LIMIT: usize = 20 * 1024 * 1024;

/// `/api/v1` 아래에 붙는 라우터를 만듭니다.
pub fn api_router(state: AppState) -> Router {
    let upload_routes = Router::new()
        .route(
            "/documents/{id}/files",
            get(files::list_files).post(files::upload_file),
        )
        .route("/documents/{id}/overlay/images", post(overlay::upload_image))
        .route("/documents/{id}/session/snapshot", post(session::upload_snapshot))
        .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT));

    Router::new()
        .merge(upload_routes)
        // 문서
        .route(
            "/documents",
            get(documents::list_documents).post(documents::create_document),
        )
        .route(
            "/documents/{id}",
            get(documents::get_document).put(documents::update_document),
        )
        .route("/documents/{id}/files/{file_id}", get(files::download_file))
        // 버전
        .route(
            "/documents/{id}/versions",
            get(versions::list_document_versions).post(versions::create_version),
        )
        .route("/versions/{id}", get(versions::get_version))
        .route("/versions/{id}/restore", post(versions::restore_version))
        // 댓글
        .route(
            "/documents/{id}/comments",
            get(comments::list_comments).post(comments::add_comment),
        )
        .route("/documents/{id}/comments/threads", get(comments::list_threads))
        .route("/comments/{id}/resolve", post(comments::resolve_comment))
        .route("/comments/{id}/apply", post(comments::apply_suggestion))
        // 편집 세션
        .route(
            "/documents/{id}/session",
            get(session::get_session)
                .post(session::open_session)
                .delete(session::close_session),
        )
        .route("/documents/{id}/session/commands", post(session::run_command))
        .route("/documents/{id}/session/selection", post(session::set_selection))
        .route("/documents/{id}/session/content", post(session::set_content))
        .route("/documents/{id}/session/transcript", post(session::push_transcript))
        // 페이지
        .route("/documents/{id}/pages", get(pages::list_pages))
        .route("/documents/{id}/pages/overflow", post(pages::check_overflow))
        .route("/documents/{id}/pages/{index}/select", post(pages::select_page))
        // 오버레이
        .route("/documents/{id}/overlay", get(overlay::get_overlay))
        .route(
            "/documents/{id}/overlay/images/{image_id}",
            get(overlay::get_image).delete(overlay::remove_image),
        )
        .route("/documents/{id}/overlay/select", post(overlay::select_object))
        .route("/documents/{id}/overlay/layer", post(overlay::change_layer))
        .route("/documents/{id}/overlay/wrap", post(overlay::set_wrap))
        // 내보내기
        .route("/documents/{id}/export/pdf", get(export::export_pdf_file))
        .route("/documents/{id}/export/word", get(export::export_word_file))
        .route("/health", get(health::health_check))
        .with_state(state)
}
