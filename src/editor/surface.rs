//! # 메모리 편집 표면 (`HtmlSurface`)
//!
//! 브라우저 편집 영역을 대신하는 서버 쪽 구현입니다.
//! 마크업 문자열, 선택 영역, 클립보드, 실행 취소 스택만 가지고 있으며
//! DOM은 없습니다. 명령은 선택 영역을 태그로 감싸거나 문자열을 끼워 넣는 수준이고,
//! 결과 마크업이 올바른지는 보장하지 않습니다.
//!
//! 선택 영역은 내부적으로 바이트 범위이고 항상 문자 경계에 놓입니다.
//! 바깥으로는 문자 오프셋으로 주고받습니다.

use std::ops::Range;

use super::markup::{escape_html, plain_text, strip_tags};
use super::platform::{CommandError, EditingPlatform};

/// 실행 취소 기록 최대 개수. 넘치면 가장 오래된 것부터 버립니다.
pub const MAX_UNDO_STEPS: usize = 100;

const BLOCKQUOTE_OPEN: &str = "<blockquote>";
const BLOCKQUOTE_CLOSE: &str = "</blockquote>";

#[derive(Debug, Clone)]
struct Snapshot {
    content: String,
    selection: Option<Range<usize>>,
}

#[derive(Debug, Clone, Default)]
pub struct HtmlSurface {
    content: String,
    selection: Option<Range<usize>>,
    clipboard: Option<String>,
    undo_stack: Vec<Snapshot>,
    redo_stack: Vec<Snapshot>,
}

impl HtmlSurface {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            content: self.content.clone(),
            selection: self.selection.clone(),
        }
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.content = snapshot.content;
        self.selection = snapshot.selection;
    }

    /// 내용을 바꾸기 직전에 호출합니다.
    fn record(&mut self) {
        self.redo_stack.clear();
        self.undo_stack.push(self.snapshot());
        while self.undo_stack.len() > MAX_UNDO_STEPS {
            self.undo_stack.remove(0);
        }
    }

    fn undo(&mut self) {
        if let Some(previous) = self.undo_stack.pop() {
            self.redo_stack.push(self.snapshot());
            self.restore(previous);
        }
    }

    fn redo(&mut self) {
        if let Some(next) = self.redo_stack.pop() {
            self.undo_stack.push(self.snapshot());
            self.restore(next);
        }
    }

    /// 비어 있지 않은 선택 영역
    fn non_empty_selection(&self) -> Option<Range<usize>> {
        self.selection.clone().filter(|r| !r.is_empty())
    }

    fn replace_range(&mut self, range: Range<usize>, with: &str) {
        self.content.replace_range(range.clone(), with);
        self.selection = Some(range.start..range.start + with.len());
    }

    /// 인라인 서식. 선택이 없으면 아무것도 하지 않습니다.
    fn wrap_inline(&mut self, open: &str, close: &str) {
        if let Some(range) = self.non_empty_selection() {
            self.wrap(range, open, close);
        }
    }

    /// 블록 서식. 선택이 없으면 본문 전체에 적용합니다.
    fn wrap_block(&mut self, open: &str, close: &str) {
        let range = self
            .non_empty_selection()
            .unwrap_or(0..self.content.len());
        self.wrap(range, open, close);
    }

    fn wrap(&mut self, range: Range<usize>, open: &str, close: &str) {
        self.record();
        let wrapped = format!("{}{}{}", open, &self.content[range.clone()], close);
        self.replace_range(range, &wrapped);
    }

    /// 선택 영역을 바꾸거나, 선택이 없으면 끝에 덧붙입니다. 커서는 삽입한 뒤로 갑니다.
    fn insert(&mut self, html: &str) {
        self.record();
        let range = self
            .selection
            .clone()
            .unwrap_or(self.content.len()..self.content.len());
        self.content.replace_range(range.clone(), html);
        let caret = range.start + html.len();
        self.selection = Some(caret..caret);
    }

    fn outdent(&mut self) {
        let range = self
            .non_empty_selection()
            .unwrap_or(0..self.content.len());

        let enclosed = self.content[..range.start].ends_with(BLOCKQUOTE_OPEN)
            && self.content[range.end..].starts_with(BLOCKQUOTE_CLOSE);
        if enclosed {
            self.record();
            let outer = range.start - BLOCKQUOTE_OPEN.len()..range.end + BLOCKQUOTE_CLOSE.len();
            let inner = self.content[range].to_string();
            self.replace_range(outer, &inner);
            return;
        }

        let selected = &self.content[range.clone()];
        if selected.len() >= BLOCKQUOTE_OPEN.len() + BLOCKQUOTE_CLOSE.len()
            && selected.starts_with(BLOCKQUOTE_OPEN)
            && selected.ends_with(BLOCKQUOTE_CLOSE)
        {
            let inner =
                selected[BLOCKQUOTE_OPEN.len()..selected.len() - BLOCKQUOTE_CLOSE.len()].to_string();
            self.record();
            self.replace_range(range, &inner);
        }
    }

    fn list(&mut self, tag: &str) {
        match self.non_empty_selection() {
            Some(range) => self.wrap(range, &format!("<{}><li>", tag), &format!("</li></{}>", tag)),
            None => self.insert(&format!("<{0}><li></li></{0}>", tag)),
        }
    }

    fn create_link(&mut self, url: &str) {
        let href = escape_html(url);
        match self.non_empty_selection() {
            Some(range) => self.wrap(range, &format!("<a href=\"{}\">", href), "</a>"),
            None => self.insert(&format!("<a href=\"{0}\">{0}</a>", href)),
        }
    }

    fn transform_selection(&mut self, f: impl FnOnce(&str) -> String) {
        if let Some(range) = self.non_empty_selection() {
            let replaced = f(&self.content[range.clone()]);
            if replaced != self.content[range.clone()] {
                self.record();
                self.replace_range(range, &replaced);
            }
        }
    }

    /// 선택 영역을 지우거나, 커서만 있으면 앞 글자 하나를 지웁니다.
    fn delete(&mut self) {
        let Some(range) = self.selection.clone() else {
            return;
        };
        if !range.is_empty() {
            self.record();
            self.content.replace_range(range.clone(), "");
            self.selection = Some(range.start..range.start);
            return;
        }
        if let Some((prev, _)) = self.content[..range.start].char_indices().next_back() {
            self.record();
            self.content.replace_range(prev..range.start, "");
            self.selection = Some(prev..prev);
        }
    }

    fn copy(&mut self) {
        if let Some(range) = self.non_empty_selection() {
            self.clipboard = Some(plain_text(&self.content[range]));
        }
    }

    fn paste(&mut self) {
        if let Some(text) = self.clipboard.clone() {
            self.insert(&escape_html(&text));
        }
    }
}

fn required<'a>(name: &str, arg: Option<&'a str>) -> Result<&'a str, CommandError> {
    arg.ok_or_else(|| CommandError::MissingArgument(name.to_string()))
}

/// `<a ...>`와 `</a>` 태그만 지웁니다.
fn strip_anchors(markup: &str) -> String {
    let mut out = String::with_capacity(markup.len());
    let mut rest = markup;
    while let Some(pos) = rest.find('<') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        let is_anchor =
            tail.starts_with("</a>") || tail.starts_with("<a>") || tail.starts_with("<a ");
        match (is_anchor, tail.find('>')) {
            (true, Some(end)) => rest = &tail[end + 1..],
            _ => {
                out.push('<');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// 문자 오프셋을 바이트 오프셋으로. 끝(문자 개수)도 허용합니다.
fn byte_offset(text: &str, chars: usize) -> Option<usize> {
    text.char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .nth(chars)
}

fn char_offset(text: &str, bytes: usize) -> usize {
    text[..bytes].chars().count()
}

impl EditingPlatform for HtmlSurface {
    fn apply_command(&mut self, name: &str, arg: Option<&str>) -> Result<(), CommandError> {
        match name {
            "bold" => self.wrap_inline("<b>", "</b>"),
            "italic" => self.wrap_inline("<i>", "</i>"),
            "underline" => self.wrap_inline("<u>", "</u>"),
            "strikethrough" => self.wrap_inline("<s>", "</s>"),
            "superscript" => self.wrap_inline("<sup>", "</sup>"),
            "subscript" => self.wrap_inline("<sub>", "</sub>"),
            "justifyLeft" | "justifyCenter" | "justifyRight" | "justifyFull" => {
                let align = match name {
                    "justifyLeft" => "left",
                    "justifyCenter" => "center",
                    "justifyRight" => "right",
                    _ => "justify",
                };
                self.wrap_block(&format!("<div style=\"text-align:{}\">", align), "</div>");
            }
            "indent" => self.wrap_block(BLOCKQUOTE_OPEN, BLOCKQUOTE_CLOSE),
            "outdent" => self.outdent(),
            "fontName" => {
                let font = escape_html(required(name, arg)?);
                self.wrap_inline(&format!("<span style=\"font-family:{}\">", font), "</span>");
            }
            "fontSize" => {
                let size = required(name, arg)?;
                if !matches!(size.trim().parse::<u8>(), Ok(1..=7)) {
                    return Err(CommandError::InvalidArgument {
                        command: name.to_string(),
                        value: size.to_string(),
                    });
                }
                self.wrap_inline(&format!("<font size=\"{}\">", size.trim()), "</font>");
            }
            "foreColor" => {
                let color = escape_html(required(name, arg)?);
                self.wrap_inline(&format!("<span style=\"color:{}\">", color), "</span>");
            }
            "hiliteColor" | "backColor" => {
                let color = escape_html(required(name, arg)?);
                self.wrap_inline(
                    &format!("<span style=\"background-color:{}\">", color),
                    "</span>",
                );
            }
            "createLink" => self.create_link(required(name, arg)?),
            "unlink" => self.transform_selection(strip_anchors),
            "insertImage" => {
                let src = escape_html(required(name, arg)?);
                self.insert(&format!("<img src=\"{}\">", src));
            }
            "insertHTML" => self.insert(required(name, arg)?),
            "insertText" => self.insert(&escape_html(required(name, arg)?)),
            "insertParagraph" => self.insert("<p><br></p>"),
            "insertHorizontalRule" => self.insert("<hr>"),
            "insertOrderedList" => self.list("ol"),
            "insertUnorderedList" => self.list("ul"),
            "removeFormat" => self.transform_selection(strip_tags),
            "delete" => self.delete(),
            "selectAll" => self.selection = Some(0..self.content.len()),
            "undo" => self.undo(),
            "redo" => self.redo(),
            "copy" => self.copy(),
            "cut" => {
                if self.non_empty_selection().is_some() {
                    self.copy();
                    self.delete();
                }
            }
            "paste" => self.paste(),
            other => return Err(CommandError::Unsupported(other.to_string())),
        }
        Ok(())
    }

    fn content(&self) -> &str {
        &self.content
    }

    fn set_content(&mut self, html: String) {
        self.content = html;
        self.selection = None;
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    fn selection(&self) -> Option<Range<usize>> {
        self.selection
            .as_ref()
            .map(|r| char_offset(&self.content, r.start)..char_offset(&self.content, r.end))
    }

    fn select(&mut self, range: Range<usize>) -> Result<(), CommandError> {
        if range.start > range.end {
            return Err(CommandError::InvalidSelection);
        }
        let start = byte_offset(&self.content, range.start).ok_or(CommandError::InvalidSelection)?;
        let end = byte_offset(&self.content, range.end).ok_or(CommandError::InvalidSelection)?;
        self.selection = Some(start..end);
        Ok(())
    }

    fn selected_text(&self) -> &str {
        self.selection
            .as_ref()
            .map(|r| &self.content[r.clone()])
            .unwrap_or("")
    }

    fn clipboard(&self) -> Option<&str> {
        self.clipboard.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn surface_with_selection(content: &str, range: Range<usize>) -> HtmlSurface {
        let mut surface = HtmlSurface::new(content);
        surface.select(range).unwrap();
        surface
    }

    #[test]
    fn bold_wraps_selection() {
        let mut surface = surface_with_selection("hello world", 6..11);
        surface.apply_command("bold", None).unwrap();
        assert_eq!(surface.content(), "hello <b>world</b>");
        assert_eq!(surface.selected_text(), "<b>world</b>");
    }

    #[test]
    fn inline_format_without_selection_is_noop() {
        let mut surface = HtmlSurface::new("hello");
        surface.apply_command("italic", None).unwrap();
        assert_eq!(surface.content(), "hello");
        assert!(!surface.can_undo());
    }

    #[test]
    fn alignment_without_selection_applies_to_everything() {
        let mut surface = HtmlSurface::new("<p>x</p>");
        surface.apply_command("justifyCenter", None).unwrap();
        assert_eq!(surface.content(), "<div style=\"text-align:center\"><p>x</p></div>");
    }

    #[test]
    fn indent_then_outdent_restores_content() {
        let mut surface = surface_with_selection("a b c", 2..3);
        surface.apply_command("indent", None).unwrap();
        assert_eq!(surface.content(), "a <blockquote>b</blockquote> c");

        surface.apply_command("outdent", None).unwrap();
        assert_eq!(surface.content(), "a b c");
    }

    #[test]
    fn insert_appends_without_selection_and_replaces_with_one() {
        let mut surface = HtmlSurface::new("<p>a</p>");
        surface.insert_html("<hr>").unwrap();
        assert_eq!(surface.content(), "<p>a</p><hr>");

        surface.select(3..4).unwrap();
        surface.insert_text("<b>").unwrap();
        assert_eq!(surface.content(), "<p>&lt;b&gt;</p><hr>");
    }

    #[test]
    fn selection_uses_char_offsets() {
        let mut surface = surface_with_selection("한글 text", 0..2);
        assert_eq!(surface.selected_text(), "한글");
        assert_eq!(surface.selection(), Some(0..2));

        surface.apply_command("underline", None).unwrap();
        assert_eq!(surface.content(), "<u>한글</u> text");
        assert_eq!(surface.select(0..100), Err(CommandError::InvalidSelection));
    }

    #[test]
    fn undo_and_redo_walk_history() {
        let mut surface = surface_with_selection("abc", 0..3);
        surface.apply_command("bold", None).unwrap();
        surface.apply_command("undo", None).unwrap();
        assert_eq!(surface.content(), "abc");
        assert!(surface.can_redo());

        surface.apply_command("redo", None).unwrap();
        assert_eq!(surface.content(), "<b>abc</b>");
    }

    #[test]
    fn undo_history_is_capped() {
        let mut surface = HtmlSurface::new("");
        for _ in 0..(MAX_UNDO_STEPS + 20) {
            surface.insert_text("x").unwrap();
        }
        for _ in 0..(MAX_UNDO_STEPS + 20) {
            surface.apply_command("undo", None).unwrap();
        }
        assert_eq!(surface.content().len(), 20);
    }

    #[test]
    fn cut_and_paste_move_plain_text() {
        let mut surface = surface_with_selection("<b>bold</b> tail", 0..11);
        surface.apply_command("cut", None).unwrap();
        assert_eq!(surface.content(), " tail");
        assert_eq!(surface.clipboard(), Some("bold"));

        surface.apply_command("paste", None).unwrap();
        assert_eq!(surface.content(), "bold tail");
    }

    #[test]
    fn remove_format_and_unlink_strip_tags() {
        let mut surface = surface_with_selection("<a href=\"x\"><b>go</b></a>", 0..25);
        surface.apply_command("unlink", None).unwrap();
        assert_eq!(surface.content(), "<b>go</b>");

        surface.apply_command("selectAll", None).unwrap();
        surface.apply_command("removeFormat", None).unwrap();
        assert_eq!(surface.content(), "go");
    }

    #[test]
    fn delete_with_caret_removes_previous_char() {
        let mut surface = surface_with_selection("abç", 3..3);
        surface.apply_command("delete", None).unwrap();
        assert_eq!(surface.content(), "ab");
    }

    #[test]
    fn argument_errors() {
        let mut surface = HtmlSurface::new("x");
        assert_eq!(
            surface.apply_command("createLink", None),
            Err(CommandError::MissingArgument("createLink".into()))
        );
        assert!(matches!(
            surface.apply_command("fontSize", Some("12")),
            Err(CommandError::InvalidArgument { .. })
        ));
        assert_eq!(
            surface.apply_command("explode", None),
            Err(CommandError::Unsupported("explode".into()))
        );
    }

    #[test]
    fn set_content_resets_selection_and_history() {
        let mut surface = surface_with_selection("abc", 0..1);
        surface.apply_command("bold", None).unwrap();
        surface.set_content("new".into());
        assert!(surface.selection().is_none());
        assert!(!surface.can_undo());
    }
}
