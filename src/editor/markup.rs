//! # 마크업 유틸리티
//!
//! 표와 차트 삽입에 쓰는 마크업 생성기, 그리고 편집 표면이 쓰는
//! 간단한 이스케이프/태그 제거 함수들입니다.
//! 파서가 아니므로 마크업이 올바른지 검사하지 않습니다.

use serde::Deserialize;

/// 표 크기를 주지 않았을 때의 기본값
pub const DEFAULT_TABLE_SIZE: (usize, usize) = (3, 3);

/// 표 한 변의 최대 칸 수
pub const MAX_TABLE_DIMENSION: usize = 100;

const CHART_WIDTH: f64 = 500.0;
const CHART_HEIGHT: f64 = 300.0;
const CHART_PAD_LEFT: f64 = 40.0;
const CHART_PAD_RIGHT: f64 = 20.0;
const CHART_PAD_TOP: f64 = 20.0;
const CHART_PAD_BOTTOM: f64 = 40.0;
const CHART_STROKE: &str = "#8884d8";

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn unescape_html(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

/// `<...>` 구간을 모두 지웁니다. 닫히지 않은 `<`는 끝까지 지웁니다.
pub fn strip_tags(markup: &str) -> String {
    let mut out = String::with_capacity(markup.len());
    let mut in_tag = false;
    for c in markup.chars() {
        match (in_tag, c) {
            (false, '<') => in_tag = true,
            (true, '>') => in_tag = false,
            (false, _) => out.push(c),
            (true, _) => {}
        }
    }
    out
}

/// 마크업에서 사람이 읽는 텍스트만 뽑아냅니다 (클립보드의 text/plain).
pub fn plain_text(markup: &str) -> String {
    unescape_html(&strip_tags(markup))
}

/// `"RxC"` 형태의 표 크기를 읽습니다. 값이 없으면 3x3.
///
/// 0이나 `MAX_TABLE_DIMENSION`보다 큰 수가 들어가거나 숫자가 아니면 `None`.
pub fn parse_dimensions(value: Option<&str>) -> Option<(usize, usize)> {
    let Some(value) = value else {
        return Some(DEFAULT_TABLE_SIZE);
    };
    let (rows, cols) = value.trim().split_once(['x', 'X'])?;
    let rows: usize = rows.trim().parse().ok()?;
    let cols: usize = cols.trim().parse().ok()?;
    let allowed = 1..=MAX_TABLE_DIMENSION;
    if !allowed.contains(&rows) || !allowed.contains(&cols) {
        return None;
    }
    Some((rows, cols))
}

/// 편집 가능한 셀로 채운 표 마크업.
/// 셀 내용은 1부터 시작하는 `Cell r-c`입니다. 머리글 행은 없습니다.
pub fn table_markup(rows: usize, cols: usize) -> String {
    let mut html = String::from("<table>");
    for r in 1..=rows {
        html.push_str("<tr>");
        for c in 1..=cols {
            html.push_str(&format!("<td contenteditable=\"true\">Cell {}-{}</td>", r, c));
        }
        html.push_str("</tr>");
    }
    html.push_str("</table>");
    html
}

/// 차트 데이터 한 점
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChartPoint {
    pub name: String,
    pub value: f64,
}

impl ChartPoint {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// 데이터 없이 차트를 넣을 때 쓰는 샘플
pub fn default_chart_data() -> Vec<ChartPoint> {
    vec![
        ChartPoint::new("A", 400.0),
        ChartPoint::new("B", 300.0),
        ChartPoint::new("C", 200.0),
    ]
}

/// 꺾은선 차트를 인라인 SVG로 그립니다.
///
/// 데이터가 비었거나 유한하지 않은 값이 있으면 `None`.
/// 최댓값과 최솟값의 차가 f64 범위를 넘어도 `None`.
/// y축은 0(또는 더 작은 최솟값)에서 시작합니다.
pub fn chart_markup(points: &[ChartPoint]) -> Option<String> {
    if points.is_empty() || points.iter().any(|p| !p.value.is_finite()) {
        return None;
    }

    let low = points.iter().map(|p| p.value).fold(0.0_f64, f64::min);
    let high = points.iter().map(|p| p.value).fold(low, f64::max);
    let span = if high > low { high - low } else { 1.0 };
    if !span.is_finite() {
        return None;
    }

    let plot_w = CHART_WIDTH - CHART_PAD_LEFT - CHART_PAD_RIGHT;
    let plot_h = CHART_HEIGHT - CHART_PAD_TOP - CHART_PAD_BOTTOM;
    let step = if points.len() > 1 {
        plot_w / (points.len() - 1) as f64
    } else {
        0.0
    };

    let coords: Vec<(f64, f64)> = points
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let x = if points.len() > 1 {
                CHART_PAD_LEFT + step * i as f64
            } else {
                CHART_PAD_LEFT + plot_w / 2.0
            };
            let y = CHART_PAD_TOP + plot_h * (1.0 - (p.value - low) / span);
            (x, y)
        })
        .collect();

    let polyline = coords
        .iter()
        .map(|(x, y)| format!("{:.1},{:.1}", x, y))
        .collect::<Vec<_>>()
        .join(" ");

    let mut svg = format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" class=\"chart\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">",
        w = CHART_WIDTH,
        h = CHART_HEIGHT
    );
    svg.push_str(&format!(
        "<polyline fill=\"none\" stroke=\"{}\" stroke-width=\"2\" points=\"{}\"/>",
        CHART_STROKE, polyline
    ));
    for (point, (x, y)) in points.iter().zip(&coords) {
        svg.push_str(&format!(
            "<circle cx=\"{:.1}\" cy=\"{:.1}\" r=\"4\" fill=\"{}\"/>",
            x, y, CHART_STROKE
        ));
        svg.push_str(&format!(
            "<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\">{}</text>",
            x,
            CHART_HEIGHT - CHART_PAD_BOTTOM / 2.0,
            escape_html(&point.name)
        ));
    }
    svg.push_str("</svg>");
    Some(svg)
}
