//! # 서비스 모듈
//!
//! - `store`: 문서/버전/댓글/파일 저장소 트레이트와 SQLite 구현
//! - `files`: 업로드 파일 저장
//! - `export`: PDF/Word 내보내기 어댑터

pub mod export;
pub mod files;
#[cfg(test)]
pub mod memory;
pub mod store;
