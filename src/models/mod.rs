//! # 데이터 모델 모듈
//!
//! 애플리케이션에서 사용하는 데이터 구조체(struct)들을 정의합니다.
//! - `document`: 문서(Document)
//! - `version`: 버전 스냅샷(DocumentVersion)
//! - `comment`: 댓글(Comment)과 화면 좌표(Position)
//! - `file`: 업로드 파일 메타데이터(FileRecord)
//!
//! 페이지(Page)와 오버레이 객체는 저장되지 않으므로 `editor` 모듈에 있습니다.

pub mod comment;
pub mod document;
pub mod file;
pub mod version;

pub use comment::*;
pub use document::*;
pub use file::*;
pub use version::*;
