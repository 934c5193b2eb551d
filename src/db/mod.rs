//! # 데이터베이스 접근 계층 (Data Access Layer)
//!
//! 데이터베이스와 직접 상호작용하는 함수들을 모아둔 모듈입니다.
//! 라우트와 세션은 이 함수들을 직접 부르지 않고,
//! `services::store::SqliteStore`를 통해 사용합니다.
//!
//! 각 하위 모듈:
//! - `documents`: 문서 생성/조회/수정
//! - `versions`: 버전 스냅샷
//! - `comments`: 댓글과 resolved 플래그
//! - `files`: 업로드 파일 메타데이터

pub mod comments;
pub mod documents;
pub mod files;
pub mod versions;

pub use comments::*;
pub use documents::*;
pub use files::*;
pub use versions::*;
