//! # 헬스체크 핸들러
//!
//! ## 엔드포인트
//! - `GET /api/v1/health` → `{ "status": "ok", "open_sessions": 0 }`

use axum::{extract::State, Json};
use serde_json::{json, Value};

use super::documents::AppState;

/// 인증 없이 호출할 수 있습니다. 열린 편집 세션 수를 함께 알려줍니다.
pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "open_sessions": state.sessions.len().await,
    }))
}
