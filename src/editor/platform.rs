//! # 편집 플랫폼 추상화
//!
//! 브라우저의 `execCommand`에 해당하는 편집 원시 명령들의 경계입니다.
//! 디스패처는 이 트레이트만 보고 명령을 적용하므로,
//! 서버의 `HtmlSurface` 대신 다른 구현(테스트용 기록기 등)을 끼울 수 있습니다.

use std::ops::Range;

use thiserror::Error;

/// 편집 원시 명령 적용 실패
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommandError {
    #[error("Unsupported editing command: {0}")]
    Unsupported(String),

    #[error("Command {0} requires a value")]
    MissingArgument(String),

    #[error("Invalid value for {command}: {value}")]
    InvalidArgument { command: String, value: String },

    #[error("Selection is out of range")]
    InvalidSelection,

    #[error("Editing platform failure: {0}")]
    Platform(String),
}

/// 편집 표면이 제공해야 하는 기능
///
/// 선택 영역은 문자(char) 단위 오프셋입니다.
/// 선택이 없으면 삽입 명령은 본문 끝에 덧붙입니다.
pub trait EditingPlatform: Send {
    /// 이름으로 편집 원시 명령을 적용합니다 (`execCommand(name, false, arg)`).
    fn apply_command(&mut self, name: &str, arg: Option<&str>) -> Result<(), CommandError>;

    /// 현재 본문 마크업
    fn content(&self) -> &str;

    /// 본문을 통째로 바꿉니다. 선택과 실행 취소 기록은 초기화됩니다.
    fn set_content(&mut self, html: String);

    fn selection(&self) -> Option<Range<usize>>;

    fn select(&mut self, range: Range<usize>) -> Result<(), CommandError>;

    /// 선택 영역의 원본 마크업. 선택이 없으면 빈 문자열.
    fn selected_text(&self) -> &str;

    fn clipboard(&self) -> Option<&str>;

    fn insert_html(&mut self, html: &str) -> Result<(), CommandError> {
        self.apply_command("insertHTML", Some(html))
    }

    fn insert_text(&mut self, text: &str) -> Result<(), CommandError> {
        self.apply_command("insertText", Some(text))
    }
}
