//! # 페이지 나누기
//!
//! 편집이 끝날 때마다 현재 페이지의 렌더링 높이를 검사해서,
//! 페이지 높이를 넘으면 현재 페이지 내용을 문자열 길이 기준으로 반으로 잘라
//! 뒷부분을 새 페이지로 옮깁니다.
//!
//! - 한 번 검사에 새 페이지는 최대 하나입니다. 여전히 넘치면 다음 편집 때 또 나눕니다.
//! - 내용이 줄어도 페이지를 합치거나 다시 흘려 넣지 않습니다.
//! - 자르는 위치는 마크업을 보지 않으므로 태그 중간이 잘릴 수 있습니다.
//!
//! 렌더링 높이는 클라이언트가 알려주고, 알려주지 않으면 `LayoutEstimate`로 추정합니다.

use serde::Serialize;

use super::markup::plain_text;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page {
    pub id: String,
    pub content: String,
}

impl Page {
    fn new(content: String) -> Self {
        Self {
            id: uuid::Uuid::now_v7().to_string(),
            content,
        }
    }
}

/// 렌더링 높이가 페이지 높이를 "넘는" 경우에만 나눕니다. 같으면 나누지 않습니다.
pub fn should_split(rendered_height: f64, page_height: f64) -> bool {
    rendered_height > page_height
}

/// 문자 수의 절반(내림)에 해당하는 바이트 위치
fn char_midpoint(text: &str) -> usize {
    let half = text.chars().count() / 2;
    text.char_indices()
        .nth(half)
        .map_or(text.len(), |(index, _)| index)
}

#[derive(Debug, Clone)]
pub struct Paginator {
    pages: Vec<Page>,
    current: usize,
    page_height: f64,
}

impl Paginator {
    /// 내용 전체를 담은 페이지 하나로 시작합니다.
    pub fn new(content: impl Into<String>, page_height: f64) -> Self {
        Self {
            pages: vec![Page::new(content.into())],
            current: 0,
            page_height,
        }
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn pages_mut(&mut self) -> &mut [Page] {
        &mut self.pages
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn page_height(&self) -> f64 {
        self.page_height
    }

    pub fn current_page(&self) -> &Page {
        &self.pages[self.current]
    }

    /// 편집 표면의 내용을 현재 페이지에 반영합니다.
    pub fn set_current_content(&mut self, content: &str) {
        let page = &mut self.pages[self.current];
        if page.content != content {
            page.content = content.to_string();
        }
    }

    /// 다른 페이지로 이동합니다. 범위를 벗어나면 `None`.
    pub fn select(&mut self, index: usize) -> Option<&Page> {
        if index >= self.pages.len() {
            return None;
        }
        self.current = index;
        Some(&self.pages[index])
    }

    /// 페이지를 모두 버리고 내용 하나로 다시 시작합니다 (버전 복원 등).
    pub fn reset(&mut self, content: impl Into<String>) {
        self.pages = vec![Page::new(content.into())];
        self.current = 0;
    }

    /// 편집 직후 호출합니다. 나눴으면 새 페이지 id를 돌려줍니다.
    pub fn on_content_changed(&mut self, rendered_height: f64) -> Option<String> {
        if !should_split(rendered_height, self.page_height) {
            return None;
        }

        let page = &mut self.pages[self.current];
        let mid = char_midpoint(&page.content);
        let tail = page.content.split_off(mid);

        let next = Page::new(tail);
        let id = next.id.clone();
        self.pages.insert(self.current + 1, next);
        self.current += 1;

        tracing::debug!(
            page_id = %id,
            pages = self.pages.len(),
            rendered_height,
            "Page overflow, split current page"
        );
        Some(id)
    }

    /// 모든 페이지를 순서대로 이어 붙인 문서 내용
    pub fn document_content(&self) -> String {
        self.pages.iter().map(|p| p.content.as_str()).collect()
    }
}

/// 클라이언트가 높이를 알려주지 않을 때 쓰는 대략적인 레이아웃 추정
#[derive(Debug, Clone, Copy)]
pub struct LayoutEstimate {
    pub line_height: f64,
    pub chars_per_line: usize,
    /// 페이지 위아래 여백 합
    pub padding: f64,
}

impl Default for LayoutEstimate {
    fn default() -> Self {
        Self {
            line_height: 24.0,
            chars_per_line: 90,
            padding: 64.0,
        }
    }
}

const BLOCK_BREAKS: &[&str] = &[
    "</p>", "<br>", "<br/>", "<br />", "</div>", "</li>", "</tr>", "<hr>", "</h1>", "</h2>",
    "</h3>", "</h4>", "</h5>", "</h6>", "</blockquote>",
];

impl LayoutEstimate {
    /// 블록 단위로 줄 수를 세어 높이를 추정합니다. 빈 블록도 한 줄을 차지합니다.
    pub fn height(&self, markup: &str) -> f64 {
        let mut text = markup.to_string();
        for tag in BLOCK_BREAKS {
            text = text.replace(tag, "\n");
        }
        let per_line = self.chars_per_line.max(1);
        let lines: usize = plain_text(&text)
            .split('\n')
            .map(|block| block.chars().count().div_ceil(per_line).max(1))
            .sum();
        lines as f64 * self.line_height + self.padding
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A4: f64 = 1123.0;

    #[test]
    fn split_threshold_is_strict() {
        assert!(!should_split(1123.0, A4));
        assert!(should_split(1124.0, A4));
        assert!(!should_split(0.0, A4));
    }

    #[test]
    fn overflow_moves_second_half_to_new_page() {
        let mut paginator = Paginator::new("abcdef", A4);

        let id = paginator.on_content_changed(1200.0).unwrap();

        assert_eq!(paginator.pages().len(), 2);
        assert_eq!(paginator.pages()[0].content, "abc");
        assert_eq!(paginator.pages()[1].content, "def");
        assert_eq!(paginator.pages()[1].id, id);
        assert_eq!(paginator.current(), 1);
        assert_eq!(paginator.document_content(), "abcdef");
    }

    #[test]
    fn no_split_at_or_below_page_height() {
        let mut paginator = Paginator::new("abcdef", A4);
        assert!(paginator.on_content_changed(A4).is_none());
        assert_eq!(paginator.pages().len(), 1);
    }

    #[test]
    fn one_page_per_check_even_when_far_over() {
        let mut paginator = Paginator::new("x".repeat(1000), A4);
        paginator.on_content_changed(A4 * 5.0);
        assert_eq!(paginator.pages().len(), 2);
    }

    #[test]
    fn new_page_goes_right_after_current() {
        let mut paginator = Paginator::new("aabb", A4);
        paginator.on_content_changed(2000.0);
        paginator.select(0).unwrap();

        paginator.on_content_changed(2000.0);

        let contents: Vec<_> = paginator.pages().iter().map(|p| p.content.as_str()).collect();
        assert_eq!(contents, vec!["a", "a", "bb"]);
        assert_eq!(paginator.current(), 1);
    }

    #[test]
    fn split_respects_char_boundaries() {
        let mut paginator = Paginator::new("가나다", A4);
        paginator.on_content_changed(2000.0);
        assert_eq!(paginator.pages()[0].content, "가");
        assert_eq!(paginator.pages()[1].content, "나다");
    }

    #[test]
    fn split_counts_characters_not_bytes() {
        // 8문자(16바이트). 바이트 절반이면 "abcd가"에서 잘립니다.
        let mut paginator = Paginator::new("abcd가나다라", A4);
        paginator.on_content_changed(2000.0);
        assert_eq!(paginator.pages()[0].content, "abcd");
        assert_eq!(paginator.pages()[1].content, "가나다라");
    }

    #[test]
    fn select_out_of_range_keeps_current() {
        let mut paginator = Paginator::new("abc", A4);
        assert!(paginator.select(3).is_none());
        assert_eq!(paginator.current(), 0);
    }

    #[test]
    fn estimate_grows_with_blocks_and_long_lines() {
        let layout = LayoutEstimate::default();
        let short = layout.height("<p>hello</p>");
        let long = layout.height(&format!("<p>{}</p>", "x".repeat(900)));
        assert!(long > short);
        assert!(!should_split(short, A4));
        assert!(should_split(layout.height(&"<p>line</p>".repeat(60)), A4));
    }
}
