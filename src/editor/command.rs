//! # 툴바 명령 어휘
//!
//! 클라이언트가 보내는 `(command, value?)` 쌍을 `Command`로 해석합니다.
//! 목록에 없는 이름은 모두 `Native`가 되어 같은 이름의 편집 원시 명령으로 넘어갑니다.

/// 편집 원시 명령에 그대로 넘기는 서식/클립보드/기록 명령들
pub const FORMATTING_COMMANDS: &[&str] = &[
    "bold",
    "italic",
    "underline",
    "strikethrough",
    "superscript",
    "subscript",
    "justifyLeft",
    "justifyCenter",
    "justifyRight",
    "justifyFull",
    "indent",
    "outdent",
    "cut",
    "copy",
    "undo",
    "redo",
    "fontName",
    "fontSize",
    "removeFormat",
];

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// 이름과 값을 그대로 편집 표면에 적용
    Native { name: String, value: Option<String> },
    Paste,
    Find(Option<String>),
    /// 값은 `"찾을말=>바꿀말"`
    Replace(Option<String>),
    /// 값은 `"RxC"`, 없으면 3x3
    InsertTable(Option<String>),
    /// 값은 `[{name, value}]` JSON, 없으면 샘플 데이터
    InsertChart(Option<String>),
    InsertImage(Option<String>),
    CreateLink(Option<String>),
    ExportPdf,
    ExportWord,
    Print,
    ToggleComments,
    ToggleVersions,
    Save,
    /// 값은 버전 이름
    SaveVersion(Option<String>),
    StartDictation(Option<String>),
    StopDictation,
    SetLanguage(Option<String>),
    /// 값은 댓글 본문, 대상 텍스트는 현재 선택 영역
    AddComment(Option<String>),
}

impl Command {
    /// 빈 문자열 값은 값이 없는 것으로 취급합니다.
    pub fn parse(name: &str, value: Option<&str>) -> Self {
        let value = value.filter(|v| !v.is_empty()).map(str::to_string);
        match name {
            "paste" => Command::Paste,
            "find" => Command::Find(value),
            "replace" => Command::Replace(value),
            "insertTable" => Command::InsertTable(value),
            "insertChart" => Command::InsertChart(value),
            "insertImage" => Command::InsertImage(value),
            "createLink" => Command::CreateLink(value),
            "exportPDF" => Command::ExportPdf,
            "exportWord" => Command::ExportWord,
            "print" => Command::Print,
            "toggleComments" => Command::ToggleComments,
            "toggleVersions" => Command::ToggleVersions,
            "save" => Command::Save,
            "saveVersion" => Command::SaveVersion(value),
            "startDictation" => Command::StartDictation(value),
            "stopDictation" => Command::StopDictation,
            "setLanguage" => Command::SetLanguage(value),
            "addComment" => Command::AddComment(value),
            _ => Command::Native {
                name: name.to_string(),
                value,
            },
        }
    }

    /// 편집 표면을 바꿀 수 있는 명령인지. 바꿨다면 페이지 넘침 검사를 합니다.
    pub fn edits_content(&self) -> bool {
        matches!(
            self,
            Command::Native { .. }
                | Command::Paste
                | Command::Replace(_)
                | Command::InsertTable(_)
                | Command::InsertChart(_)
                | Command::InsertImage(_)
                | Command::CreateLink(_)
        )
    }
}
