//! # 에디터 코어
//!
//! 문서 하나를 편집하는 세션의 구성 요소들입니다.
//! 렌더링은 클라이언트(브라우저)가 맡고, 서버는 문서 모델과 명령 처리를 맡습니다.
//!
//! - `platform` / `surface`: 편집 원시 명령(bold, insertHTML, undo 등)과 메모리 구현
//! - `command` / `dispatcher`: 툴바 명령 해석과 실행
//! - `markup`: 표/차트 마크업 생성
//! - `pagination`: 페이지 넘침 감지와 분할
//! - `comments`: 댓글 스레드 관리
//! - `overlay`: 이미지 오버레이 캔버스
//! - `dictation`: 음성 입력 상태
//! - `autosave`: 주기적 버전 저장
//! - `session`: 위 구성 요소를 묶은 편집 세션과 세션 레지스트리

pub mod autosave;
pub mod command;
pub mod comments;
pub mod dictation;
pub mod dispatcher;
pub mod markup;
pub mod overlay;
pub mod pagination;
pub mod platform;
pub mod session;
pub mod surface;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Info,
    Error,
}

/// 사용자에게 잠깐 보여줄 알림 (토스트)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub title: String,
    pub message: String,
}

impl Notification {
    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Info,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            title: title.into(),
            message: message.into(),
        }
    }
}
