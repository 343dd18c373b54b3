//! Markdown layout with comrak.

use std::collections::HashMap;
use std::sync::LazyLock;

use anyhow::Result;
use comrak::nodes::{AstNode, ListDelimType, ListType, NodeValue, TableAlignment};
use comrak::{Arena, Options, parse_document};
use regex::Regex;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use super::types::{
    DisclosureRef, Document, HeadingRef, ImageRef, InlineSpan, InlineStyle, LineType,
    RenderedLine,
};

/// `<details ...>`, `<summary>..</summary>` or `</details>` inside raw HTML.
static DISCLOSURE_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<details\b([^>]*)>|<summary\b[^>]*>(.*?)</summary\s*>|</details\s*>")
        .expect("disclosure tag pattern is valid")
});
static HTML_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("html tag pattern is valid"));

impl Document {
    pub fn parse(source: &str) -> Result<Self> {
        parse_with_layout(source, 80, &HashMap::new())
    }
}

/// Lay `source` out at `width` columns.
///
/// `image_heights` holds the rows to reserve per image source; unknown
/// images get a one-row placeholder.
pub fn parse_with_layout(
    source: &str,
    width: u16,
    image_heights: &HashMap<String, usize>,
) -> Result<Document> {
    let arena = Arena::new();
    let root = parse_document(&arena, source, &create_options());

    let mut layout = Layout {
        width: usize::from(width.max(1)),
        image_heights,
        lines: Vec::new(),
        headings: Vec::new(),
        images: Vec::new(),
        disclosures: Vec::new(),
        open: Vec::new(),
        awaiting_summary: false,
    };
    layout.block(root, 0);
    while matches!(layout.lines.last().map(RenderedLine::line_type), Some(LineType::Empty)) {
        layout.lines.pop();
    }

    Ok(Document::new(
        source.to_string(),
        layout.lines,
        layout.headings,
        layout.images,
        layout.disclosures,
    ))
}

fn create_options() -> Options {
    let mut options = Options::default();
    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.autolink = true;
    options.extension.tasklist = true;
    options.extension.footnotes = true;
    options
}

struct Layout<'h> {
    width: usize,
    image_heights: &'h HashMap<String, usize>,
    lines: Vec<RenderedLine>,
    headings: Vec<HeadingRef>,
    images: Vec<ImageRef>,
    disclosures: Vec<DisclosureRef>,
    /// Disclosures whose closing tag has not been seen yet.
    open: Vec<usize>,
    awaiting_summary: bool,
}

impl Layout<'_> {
    fn push(&mut self, line: RenderedLine) {
        let inside = self.open.last().copied();
        self.lines.push(line.inside(inside));
    }

    fn push_text(&mut self, content: String, line_type: LineType) {
        self.push(RenderedLine::new(content, line_type));
    }

    fn push_wrapped(&mut self, wrapped: Vec<Vec<InlineSpan>>, line_type: LineType) {
        for spans in wrapped {
            let content = spans_to_string(&spans);
            self.push(RenderedLine::with_spans(content, line_type, spans));
        }
    }

    fn blank(&mut self) {
        self.push_text(String::new(), LineType::Empty);
    }

    fn ensure_blank_lines(&mut self, count: usize) {
        if self.lines.is_empty() {
            return;
        }
        let existing = self
            .lines
            .iter()
            .rev()
            .take_while(|line| matches!(line.line_type(), LineType::Empty))
            .count();
        for _ in existing..count {
            self.blank();
        }
    }

    fn block<'a>(&mut self, node: &'a AstNode<'a>, depth: usize) {
        match &node.data.borrow().value {
            NodeValue::Heading(heading) => {
                let text = extract_text(node);
                self.ensure_blank_lines(1);
                self.headings.push(HeadingRef {
                    level: heading.level,
                    text: text.clone(),
                    line: self.lines.len(),
                });
                let marker = "#".repeat(usize::from(heading.level));
                self.push_text(format!("{marker} {text}"), LineType::Heading(heading.level));
                self.blank();
            }

            NodeValue::Paragraph => {
                self.paragraph(node, "", LineType::Paragraph);
                self.blank();
            }

            NodeValue::CodeBlock(code) => {
                let language = code.info.split_whitespace().next().unwrap_or("code");
                self.code_block(language, &code.literal);
                self.blank();
            }

            NodeValue::List(_) => {
                self.list(node, depth + 1);
                if depth == 0 {
                    self.blank();
                }
            }

            NodeValue::BlockQuote => {
                self.block_quote(node, 1);
                self.blank();
            }

            NodeValue::ThematicBreak => {
                self.push_text("─".repeat(self.width), LineType::HorizontalRule);
                self.blank();
            }

            NodeValue::Table(table) => {
                for row in render_table(node, &table.alignments, self.width) {
                    self.push_text(row, LineType::Table);
                }
                self.blank();
            }

            NodeValue::FootnoteDefinition(def) => {
                let label = format!("[^{}]: ", def.name);
                let next = " ".repeat(label.width());
                let spans = collect_inline_spans(node);
                let wrapped = wrap_spans(&spans, self.width, &label, &next);
                self.push_wrapped(wrapped, LineType::Paragraph);
                self.blank();
            }

            NodeValue::HtmlBlock(html) => self.html_block(&html.literal),

            _ => {
                for child in node.children() {
                    self.block(child, depth);
                }
            }
        }
    }

    /// A paragraph of text, or a run of block images.
    fn paragraph<'a>(&mut self, node: &'a AstNode<'a>, prefix: &str, line_type: LineType) {
        if let Some(images) = paragraph_images(node) {
            for (alt, src) in images {
                self.image(alt, src);
            }
            return;
        }
        let start = self.lines.len();
        let spans = collect_inline_spans(node);
        let next = " ".repeat(prefix.width());
        self.push_wrapped(wrap_spans(&spans, self.width, prefix, &next), line_type);
        for (alt, src) in inline_images(node) {
            self.images.push(ImageRef {
                alt,
                src,
                line_range: start..start + 1,
            });
        }
    }

    fn image(&mut self, alt: String, src: String) {
        let rows = self.image_heights.get(&src).copied().unwrap_or(1).max(1);
        let start = self.lines.len();
        let label = if alt.is_empty() { &src } else { &alt };
        self.push_text(format!("[image: {label}]"), LineType::Image);
        for _ in 1..rows {
            self.push_text(String::new(), LineType::Image);
        }
        self.images.push(ImageRef {
            alt,
            src,
            line_range: start..start + rows,
        });
    }

    fn code_block(&mut self, language: &str, literal: &str) {
        let inner = self.width.saturating_sub(4).max(1);
        let label = format!("─ {language} ");
        let top_rule = "─".repeat(inner.saturating_sub(label.width()) + 2);
        self.push_text(format!("┌{label}{top_rule}"), LineType::CodeBlock);
        for raw in literal.lines() {
            self.push_text(format!("│ {}", truncate_text(raw, inner)), LineType::CodeBlock);
        }
        self.push_text(format!("└{}", "─".repeat(inner + 2)), LineType::CodeBlock);
    }

    fn list<'a>(&mut self, node: &'a AstNode<'a>, depth: usize) {
        let (list_type, start, delimiter) = match &node.data.borrow().value {
            NodeValue::List(list) => (list.list_type, list.start, list.delimiter),
            _ => return,
        };
        let delimiter = match delimiter {
            ListDelimType::Paren => ')',
            ListDelimType::Period => '.',
        };
        for (index, item) in node.children().enumerate() {
            let marker = match &item.data.borrow().value {
                NodeValue::TaskItem(Some(_)) => "☑ ".to_string(),
                NodeValue::TaskItem(None) => "☐ ".to_string(),
                _ if list_type == ListType::Bullet => "• ".to_string(),
                _ => format!("{}{delimiter} ", start + index),
            };
            self.list_item(item, depth, &marker);
        }
    }

    fn list_item<'a>(&mut self, item: &'a AstNode<'a>, depth: usize, marker: &str) {
        let first = format!("{}{marker}", "  ".repeat(depth - 1));
        let next = " ".repeat(first.width());
        let mut prefix = first.as_str();
        let start = self.lines.len();
        for child in item.children() {
            let is_paragraph = matches!(child.data.borrow().value, NodeValue::Paragraph);
            let is_list = matches!(child.data.borrow().value, NodeValue::List(_));
            if is_paragraph {
                self.paragraph(child, prefix, LineType::ListItem(depth));
                prefix = &next;
            } else if is_list {
                self.list(child, depth + 1);
            } else {
                self.block(child, depth);
            }
        }
        if self.lines.len() == start {
            self.push_text(first.clone(), LineType::ListItem(depth));
        }
    }

    fn block_quote<'a>(&mut self, node: &'a AstNode<'a>, quote_depth: usize) {
        let prefix = "│ ".repeat(quote_depth);
        for child in node.children() {
            let is_paragraph = matches!(child.data.borrow().value, NodeValue::Paragraph);
            let is_quote = matches!(child.data.borrow().value, NodeValue::BlockQuote);
            let heading_level = match &child.data.borrow().value {
                NodeValue::Heading(heading) => Some(heading.level),
                _ => None,
            };
            if let Some(level) = heading_level {
                // Still a heading for anchoring, drawn inside the quote.
                let text = extract_text(child);
                self.headings.push(HeadingRef {
                    level,
                    text: text.clone(),
                    line: self.lines.len(),
                });
                let marker = "#".repeat(usize::from(level));
                self.push_text(format!("{prefix}{marker} {text}"), LineType::Heading(level));
            } else if is_quote {
                self.block_quote(child, quote_depth + 1);
            } else if is_paragraph {
                let spans = collect_inline_spans(child);
                let wrapped = wrap_spans(&spans, self.width, &prefix, &prefix);
                self.push_wrapped(wrapped, LineType::BlockQuote);
            } else {
                for raw in extract_text(child).lines() {
                    self.push_text(format!("{prefix}{raw}"), LineType::BlockQuote);
                }
            }
        }
    }

    /// Track `<details>` structure. Other raw HTML is not shown.
    fn html_block(&mut self, literal: &str) {
        for caps in DISCLOSURE_TAG.captures_iter(literal) {
            let tag = caps.get(0).map_or("", |m| m.as_str());
            if let Some(attrs) = caps.get(1) {
                let index = self.disclosures.len();
                self.ensure_blank_lines(1);
                self.disclosures.push(DisclosureRef {
                    summary: "Details".to_string(),
                    line: self.lines.len(),
                    parent: self.open.last().copied(),
                    open: attrs.as_str().to_ascii_lowercase().contains("open"),
                });
                self.push_text("Details".to_string(), LineType::Summary(index));
                self.open.push(index);
                self.awaiting_summary = true;
            } else if let Some(summary) = caps.get(2) {
                if !self.awaiting_summary {
                    continue;
                }
                self.awaiting_summary = false;
                let text = HTML_TAG.replace_all(summary.as_str(), "").trim().to_string();
                if let Some(disclosure) = self.open.last().and_then(|&i| self.disclosures.get_mut(i)) {
                    if let Some(line) = self.lines.get_mut(disclosure.line) {
                        line.set_content(text.clone());
                    }
                    disclosure.summary = text;
                }
            } else if tag.starts_with("</") {
                self.awaiting_summary = false;
                self.open.pop();
                self.ensure_blank_lines(1);
            }
        }
    }
}

fn extract_text<'a>(node: &'a AstNode<'a>) -> String {
    let mut text = String::new();
    extract_text_recursive(node, &mut text);
    text
}

fn extract_text_recursive<'a>(node: &'a AstNode<'a>, text: &mut String) {
    match &node.data.borrow().value {
        NodeValue::Text(t) => text.push_str(t),
        NodeValue::Code(code) => text.push_str(&code.literal),
        NodeValue::CodeBlock(code) => text.push_str(&code.literal),
        NodeValue::SoftBreak | NodeValue::LineBreak => text.push('\n'),
        _ => {
            for child in node.children() {
                extract_text_recursive(child, text);
            }
        }
    }
}

fn collect_inline_spans<'a>(node: &'a AstNode<'a>) -> Vec<InlineSpan> {
    let mut spans = Vec::new();
    collect_inline_spans_recursive(node, InlineStyle::default(), &mut spans);
    spans
}

fn collect_inline_spans_recursive<'a>(
    node: &'a AstNode<'a>,
    style: InlineStyle,
    spans: &mut Vec<InlineSpan>,
) {
    let mut next = style;
    match &node.data.borrow().value {
        NodeValue::List(_) | NodeValue::Item(_) => return,
        NodeValue::Text(t) => {
            spans.push(InlineSpan::new(t.clone(), style));
            return;
        }
        NodeValue::Code(code) => {
            let code_style = InlineStyle {
                code: true,
                ..InlineStyle::default()
            };
            spans.push(InlineSpan::new(code.literal.clone(), code_style));
            return;
        }
        NodeValue::Image(image) => {
            let alt = extract_text(node);
            let label = if alt.is_empty() { image.url.clone() } else { alt };
            spans.push(InlineSpan::new(format!("[image: {label}]"), style));
            return;
        }
        NodeValue::FootnoteReference(reference) => {
            spans.push(InlineSpan::new(format!("[^{}]", reference.name), style));
            return;
        }
        NodeValue::SoftBreak | NodeValue::LineBreak => {
            spans.push(InlineSpan::new(" ".to_string(), style));
            return;
        }
        NodeValue::Emph => next.emphasis = true,
        NodeValue::Strong => next.strong = true,
        NodeValue::Strikethrough => next.strikethrough = true,
        NodeValue::Link(_) => next.link = true,
        _ => {}
    }
    for child in node.children() {
        collect_inline_spans_recursive(child, next, spans);
    }
}

/// The images of a paragraph made of nothing but images and whitespace.
fn paragraph_images<'a>(node: &'a AstNode<'a>) -> Option<Vec<(String, String)>> {
    let mut images = Vec::new();
    for child in node.children() {
        match &child.data.borrow().value {
            NodeValue::Image(image) => images.push((extract_text(child), image.url.clone())),
            NodeValue::SoftBreak | NodeValue::LineBreak => {}
            NodeValue::Text(t) if t.trim().is_empty() => {}
            _ => return None,
        }
    }
    (!images.is_empty()).then_some(images)
}

fn inline_images<'a>(node: &'a AstNode<'a>) -> Vec<(String, String)> {
    node.descendants()
        .filter_map(|n| match &n.data.borrow().value {
            NodeValue::Image(image) => Some((extract_text(n), image.url.clone())),
            _ => None,
        })
        .collect()
}

/// Greedy word wrap. `prefix_first` starts the first row, `prefix_next`
/// every following one.
fn wrap_spans(
    spans: &[InlineSpan],
    width: usize,
    prefix_first: &str,
    prefix_next: &str,
) -> Vec<Vec<InlineSpan>> {
    let start_row = |prefix: &str| {
        let row = if prefix.is_empty() {
            Vec::new()
        } else {
            vec![InlineSpan::new(prefix.to_string(), InlineStyle::default())]
        };
        (row, prefix.width())
    };

    let mut rows = Vec::new();
    let (mut row, mut used) = start_row(prefix_first);
    let mut has_word = false;
    let mut pending_space: Option<InlineSpan> = None;
    for token in spans.iter().flat_map(split_inline_tokens) {
        if token.text().chars().all(char::is_whitespace) {
            if has_word {
                pending_space = Some(token);
            }
            continue;
        }
        let token_width = token.text().width();
        let space_width = pending_space.as_ref().map_or(0, |s| s.text().width());
        if has_word && used + space_width + token_width > width {
            rows.push(std::mem::take(&mut row));
            (row, used) = start_row(prefix_next);
            has_word = false;
            pending_space = None;
        }
        if let Some(space) = pending_space.take() {
            used += space_width;
            row.push(space);
        }
        used += token_width;
        row.push(token);
        has_word = true;
    }
    rows.push(row);
    rows
}

/// Split a span into alternating runs of whitespace and non-whitespace.
fn split_inline_tokens(span: &InlineSpan) -> Vec<InlineSpan> {
    let mut out = Vec::new();
    let mut buf = String::new();
    let mut in_space = None;
    for ch in span.text().chars() {
        let is_space = ch.is_whitespace();
        if in_space.is_some_and(|s| s != is_space) {
            out.push(InlineSpan::new(std::mem::take(&mut buf), span.style()));
        }
        buf.push(ch);
        in_space = Some(is_space);
    }
    if !buf.is_empty() {
        out.push(InlineSpan::new(buf, span.style()));
    }
    out
}

fn spans_to_string(spans: &[InlineSpan]) -> String {
    spans.iter().map(InlineSpan::text).collect()
}

fn truncate_text(text: &str, max_width: usize) -> String {
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > max_width {
            break;
        }
        out.push(ch);
        used += w;
    }
    out
}

fn render_table<'a>(node: &'a AstNode<'a>, alignments: &[TableAlignment], width: usize) -> Vec<String> {
    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut has_header = false;
    for row in node.children() {
        if let NodeValue::TableRow(header) = row.data.borrow().value {
            has_header |= header;
        } else {
            continue;
        }
        let cells = row
            .children()
            .map(|cell| extract_text(cell).split_whitespace().collect::<Vec<_>>().join(" "))
            .collect();
        rows.push(cells);
    }
    let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
    if columns == 0 {
        return Vec::new();
    }

    let mut widths = vec![1_usize; columns];
    for row in &rows {
        for (idx, cell) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(cell.width());
        }
    }
    // A row is 1 + sum(width + 3) columns wide.
    while 1 + widths.iter().sum::<usize>() + 3 * columns > width.max(4) {
        let Some(widest) = (0..columns).max_by_key(|&i| widths[i]) else {
            break;
        };
        if widths[widest] <= 1 {
            break;
        }
        widths[widest] -= 1;
    }

    let border = |left: char, middle: char, right: char| {
        let inner: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
        format!("{left}{}{right}", inner.join(&middle.to_string()))
    };

    let mut out = vec![border('┌', '┬', '┐')];
    for (idx, row) in rows.iter().enumerate() {
        let mut line = String::from("│");
        for (col, &w) in widths.iter().enumerate() {
            let cell = truncate_text(row.get(col).map_or("", String::as_str), w);
            let pad = w.saturating_sub(cell.width());
            let (left, right) = match alignments.get(col).copied().unwrap_or(TableAlignment::None) {
                TableAlignment::Right => (pad, 0),
                TableAlignment::Center => (pad / 2, pad - pad / 2),
                TableAlignment::Left | TableAlignment::None => (0, pad),
            };
            line.push_str(&format!(" {}{cell}{} │", " ".repeat(left), " ".repeat(right)));
        }
        out.push(line);
        if has_header && idx == 0 {
            out.push(border('├', '┼', '┤'));
        }
    }
    out.push(border('└', '┴', '┘'));
    out
}
