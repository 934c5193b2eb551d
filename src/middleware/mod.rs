//! # 미들웨어 모듈
//!
//! - `auth`: Bearer 토큰을 검증해 요청한 사용자를 꺼내는 추출기

pub mod auth;
