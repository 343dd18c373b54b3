use std::ops::Range;

/// A markdown document laid out as terminal rows for the preview pane.
///
/// Every row is kept, including those inside `<details>` bodies; which of
/// them are shown depends on the open state the pane tracks (see
/// [`Document::visible_lines`]).
#[derive(Debug, Clone, Default)]
pub struct Document {
    source: String,
    lines: Vec<RenderedLine>,
    headings: Vec<HeadingRef>,
    images: Vec<ImageRef>,
    disclosures: Vec<DisclosureRef>,
}

impl Document {
    pub(crate) const fn new(
        source: String,
        lines: Vec<RenderedLine>,
        headings: Vec<HeadingRef>,
        images: Vec<ImageRef>,
        disclosures: Vec<DisclosureRef>,
    ) -> Self {
        Self {
            source,
            lines,
            headings,
            images,
            disclosures,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// The markdown this document was rendered from.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn line_at(&self, index: usize) -> Option<&RenderedLine> {
        self.lines.get(index)
    }

    pub fn headings(&self) -> &[HeadingRef] {
        &self.headings
    }

    pub fn images(&self) -> &[ImageRef] {
        &self.images
    }

    pub fn disclosures(&self) -> &[DisclosureRef] {
        &self.disclosures
    }

    /// Open state each disclosure starts with.
    pub fn initial_open_state(&self) -> Vec<bool> {
        self.disclosures.iter().map(|d| d.open).collect()
    }

    /// Indices of the lines shown when disclosure `i` is open iff `open[i]`.
    ///
    /// A line is hidden when any disclosure around it is closed. Missing
    /// entries in `open` count as closed.
    pub fn visible_lines(&self, open: &[bool]) -> Vec<usize> {
        self.lines
            .iter()
            .enumerate()
            .filter(|(_, line)| self.is_shown(line.disclosure, open))
            .map(|(idx, _)| idx)
            .collect()
    }

    fn is_shown(&self, mut disclosure: Option<usize>, open: &[bool]) -> bool {
        while let Some(idx) = disclosure {
            if !open.get(idx).copied().unwrap_or(false) {
                return false;
            }
            disclosure = self.disclosures.get(idx).and_then(|d| d.parent);
        }
        true
    }
}

/// A single rendered row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedLine {
    content: String,
    line_type: LineType,
    spans: Vec<InlineSpan>,
    /// Innermost disclosure whose body holds this row.
    disclosure: Option<usize>,
}

impl RenderedLine {
    pub const fn new(content: String, line_type: LineType) -> Self {
        Self {
            content,
            line_type,
            spans: Vec::new(),
            disclosure: None,
        }
    }

    pub const fn with_spans(content: String, line_type: LineType, spans: Vec<InlineSpan>) -> Self {
        Self {
            content,
            line_type,
            spans,
            disclosure: None,
        }
    }

    #[must_use]
    pub const fn inside(mut self, disclosure: Option<usize>) -> Self {
        self.disclosure = disclosure;
        self
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub(crate) fn set_content(&mut self, content: String) {
        self.content = content;
    }

    pub const fn line_type(&self) -> &LineType {
        &self.line_type
    }

    pub fn spans(&self) -> Option<&[InlineSpan]> {
        if self.spans.is_empty() {
            None
        } else {
            Some(&self.spans)
        }
    }

    pub const fn disclosure(&self) -> Option<usize> {
        self.disclosure
    }
}

/// Inline style flags for a text span.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InlineStyle {
    pub emphasis: bool,
    pub strong: bool,
    pub code: bool,
    pub strikethrough: bool,
    pub link: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineSpan {
    text: String,
    style: InlineStyle,
}

impl InlineSpan {
    pub const fn new(text: String, style: InlineStyle) -> Self {
        Self { text, style }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub const fn style(&self) -> InlineStyle {
        self.style
    }
}

/// Type of a rendered line, used for styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineType {
    Paragraph,
    /// Heading with level (1-6)
    Heading(u8),
    CodeBlock,
    BlockQuote,
    /// List item with nesting level
    ListItem(usize),
    Table,
    HorizontalRule,
    /// Image placeholder or reserved image row
    Image,
    /// Summary row of disclosure *n*; toggles it when clicked
    Summary(usize),
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingRef {
    pub level: u8,
    pub text: String,
    /// Index into the document's lines.
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    pub alt: String,
    pub src: String,
    /// Rows reserved for the image.
    pub line_range: Range<usize>,
}

/// A `<details>` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisclosureRef {
    pub summary: String,
    /// Index of the summary row.
    pub line: usize,
    /// Enclosing disclosure, for nested blocks.
    pub parent: Option<usize>,
    /// Whether the block was written with the `open` attribute.
    pub open: bool,
}
