//! Styled rendering of annotated summaries into paginated documents.
//!
//! Styles are rows in an immutable table; adding one does not touch the layout code. Layout is
//! computed as a plain value first ([`DocumentLayout`]) and only then encoded to PDF, so two
//! renders of the same text and style always place the same runs at the same positions.

mod pdf;

use crate::processing::AnnotatedSummary;
use crate::storage::{StorageError, unique_token};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// A4 portrait width.
pub const PAGE_WIDTH_MM: f32 = 210.0;
/// A4 portrait height.
pub const PAGE_HEIGHT_MM: f32 = 297.0;
const TOP_MARGIN_MM: f32 = 10.0;
const BOTTOM_MARGIN_MM: f32 = 20.0;
const CELL_PADDING_MM: f32 = 1.0;
const PT_TO_MM: f32 = 25.4 / 72.0;
const TAB_SPACES: &str = "    ";

/// Errors raised while rendering or persisting a summary document.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The PDF encoder failed.
    #[error("PDF encoding failed: {0}")]
    Pdf(String),
    /// The rendered document could not be persisted.
    #[error("Failed to persist rendered document: {0}")]
    Persist(#[source] StorageError),
    /// The blocking render task panicked or was cancelled.
    #[error("Render task failed: {0}")]
    Task(String),
}

/// Built-in font faces available to styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontFace {
    /// Helvetica regular.
    Helvetica,
    /// Helvetica bold.
    HelveticaBold,
    /// Times italic.
    TimesItalic,
    /// Courier regular.
    Courier,
    /// Courier bold.
    CourierBold,
}

// Glyph advances in 1/1000 em for ASCII 32..=126, from the standard 14 font metrics.
#[rustfmt::skip]
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

#[rustfmt::skip]
const TIMES_ITALIC_WIDTHS: [u16; 95] = [
    250, 333, 420, 500, 500, 833, 778, 214, 333, 333, 500, 675, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 333, 333, 675, 675, 675, 500,
    920, 611, 611, 667, 722, 611, 611, 722, 722, 333, 444, 667, 556, 833, 667, 722,
    611, 722, 611, 500, 556, 722, 611, 833, 611, 556, 556, 389, 278, 389, 422, 500,
    333, 500, 500, 444, 500, 444, 278, 500, 500, 278, 278, 444, 278, 722, 500, 500,
    500, 500, 389, 389, 278, 500, 444, 667, 444, 444, 389, 400, 275, 400, 541,
];

const COURIER_WIDTH: u16 = 600;
// Characters outside the table are measured as a full em so rows never overflow.
const UNKNOWN_GLYPH_WIDTH: u16 = 1000;

impl FontFace {
    /// Advance of `c` in 1/1000 em.
    fn glyph_width(self, c: char) -> u16 {
        let table = match self {
            Self::Courier | Self::CourierBold => return COURIER_WIDTH,
            Self::Helvetica => &HELVETICA_WIDTHS,
            Self::HelveticaBold => &HELVETICA_BOLD_WIDTHS,
            Self::TimesItalic => &TIMES_ITALIC_WIDTHS,
        };
        (c as usize)
            .checked_sub(32)
            .and_then(|slot| table.get(slot))
            .copied()
            .unwrap_or(UNKNOWN_GLYPH_WIDTH)
    }

    fn text_width_mm(self, text: &str, size_pt: f32) -> f32 {
        let units: u32 = text.chars().map(|c| u32::from(self.glyph_width(c))).sum();
        units as f32 / 1000.0 * size_pt * PT_TO_MM
    }
}

/// 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb8(pub u8, pub u8, pub u8);

/// Centered heading printed before the body.
#[derive(Debug, Clone, PartialEq)]
pub struct TitleBlock {
    /// Heading text.
    pub text: &'static str,
    /// Heading face.
    pub font: FontFace,
    /// Heading size in points.
    pub size_pt: f32,
    /// Height of the heading cell.
    pub cell_height_mm: f32,
    /// Gap between the heading and the body.
    pub gap_mm: f32,
}

/// Immutable typography and layout settings of one style.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleConfig {
    /// Style name used in requests and output names.
    pub name: &'static str,
    /// Body face.
    pub font: FontFace,
    /// Body size in points.
    pub size_pt: f32,
    /// Body text color.
    pub color: Rgb8,
    /// Height of each wrapped body row.
    pub line_height_mm: f32,
    /// Left and right page margins.
    pub side_margin_mm: f32,
    /// Optional heading printed before the body.
    pub title: Option<TitleBlock>,
}

// Row order matches `RenderStyle::ALL`.
static STYLE_TABLE: [StyleConfig; 5] = [
    StyleConfig {
        name: "minimal",
        font: FontFace::Helvetica,
        size_pt: 11.0,
        color: Rgb8(0, 0, 0),
        line_height_mm: 8.0,
        side_margin_mm: 10.0,
        title: None,
    },
    StyleConfig {
        name: "aesthetic",
        font: FontFace::HelveticaBold,
        size_pt: 12.0,
        color: Rgb8(60, 60, 60),
        line_height_mm: 9.0,
        side_margin_mm: 10.0,
        title: None,
    },
    StyleConfig {
        name: "elegant",
        font: FontFace::TimesItalic,
        size_pt: 12.0,
        color: Rgb8(40, 40, 80),
        line_height_mm: 10.0,
        side_margin_mm: 10.0,
        title: None,
    },
    StyleConfig {
        name: "academic",
        font: FontFace::Courier,
        size_pt: 11.0,
        color: Rgb8(20, 20, 20),
        line_height_mm: 7.0,
        side_margin_mm: 15.0,
        title: Some(TitleBlock {
            text: "Academic Summary",
            font: FontFace::CourierBold,
            size_pt: 14.0,
            cell_height_mm: 10.0,
            gap_mm: 5.0,
        }),
    },
    StyleConfig {
        name: "default",
        font: FontFace::Helvetica,
        size_pt: 11.0,
        color: Rgb8(0, 0, 0),
        line_height_mm: 8.0,
        side_margin_mm: 10.0,
        title: None,
    },
];

/// Named visual style of the rendered document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderStyle {
    /// Plain black Helvetica.
    #[default]
    Minimal,
    /// Bold gray Helvetica.
    Aesthetic,
    /// Italic blue-gray Times.
    Elegant,
    /// Courier with narrow margins and a title block.
    Academic,
    /// Minimal layout used for unrecognised style names.
    #[serde(rename = "default")]
    Fallback,
}

impl RenderStyle {
    /// Every style, in table order.
    pub const ALL: [Self; 5] = [
        Self::Minimal,
        Self::Aesthetic,
        Self::Elegant,
        Self::Academic,
        Self::Fallback,
    ];

    /// Resolve a style name; unknown names fall back instead of failing.
    pub fn parse(name: &str) -> Self {
        let normalized = name.trim().to_ascii_lowercase();
        STYLE_TABLE
            .iter()
            .position(|config| config.name == normalized)
            .map_or(Self::Fallback, |row| Self::ALL[row])
    }

    /// Configuration row of this style.
    pub fn config(self) -> &'static StyleConfig {
        &STYLE_TABLE[self as usize]
    }

    /// Name used in output document names.
    pub fn name(self) -> &'static str {
        self.config().name
    }
}

impl fmt::Display for RenderStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Text run positioned on a page. Coordinates are measured from the page's top-left corner.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedText {
    /// Text of one wrapped row.
    pub text: String,
    /// Face used for the run.
    pub font: FontFace,
    /// Size in points.
    pub size_pt: f32,
    /// Fill color.
    pub color: Rgb8,
    /// Left edge of the run.
    pub x_mm: f32,
    /// Baseline position.
    pub baseline_mm: f32,
}

/// Runs placed on one page, in writing order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageLayout {
    /// Positioned runs.
    pub runs: Vec<PlacedText>,
}

/// Complete page layout of a rendered summary.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentLayout {
    /// Style the layout was computed with.
    pub style: RenderStyle,
    /// Pages in order; never empty.
    pub pages: Vec<PageLayout>,
}

/// Rendered summary ready for storage.
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    /// Unique storage name: `summary_<token>_<style>.pdf`.
    pub name: String,
    /// Style used for rendering.
    pub style: RenderStyle,
    /// Number of pages written.
    pub page_count: usize,
    /// Encoded PDF bytes.
    pub bytes: Vec<u8>,
}

/// Render the annotated summary with the given style.
pub fn render(
    annotated: &AnnotatedSummary,
    style: RenderStyle,
) -> Result<RenderedDocument, RenderError> {
    let layout = layout_document(annotated.as_str(), style);
    let bytes = pdf::encode(&layout)?;
    let name = format!("summary_{}_{}.pdf", unique_token(8), style.name());
    tracing::debug!(
        name = %name,
        style = %style,
        pages = layout.pages.len(),
        bytes = bytes.len(),
        "Rendered summary document"
    );
    Ok(RenderedDocument {
        name,
        style,
        page_count: layout.pages.len(),
        bytes,
    })
}

/// Lay out every line of `text` verbatim with the style's typography.
pub fn layout_document(text: &str, style: RenderStyle) -> DocumentLayout {
    let config = style.config();
    let mut cursor = PageCursor::new();

    if let Some(title) = &config.title {
        let width = title.font.text_width_mm(title.text, title.size_pt);
        cursor.place(
            PlacedText {
                text: title.text.to_string(),
                font: title.font,
                size_pt: title.size_pt,
                color: config.color,
                x_mm: ((PAGE_WIDTH_MM - width) / 2.0).max(config.side_margin_mm),
                baseline_mm: 0.0,
            },
            title.cell_height_mm,
        );
        cursor.advance(title.gap_mm);
    }

    let usable_width = PAGE_WIDTH_MM - 2.0 * (config.side_margin_mm + CELL_PADDING_MM);
    for line in text.split('\n') {
        for row in wrap_line(line, usable_width, config.font, config.size_pt) {
            cursor.place(
                PlacedText {
                    text: row,
                    font: config.font,
                    size_pt: config.size_pt,
                    color: config.color,
                    x_mm: config.side_margin_mm + CELL_PADDING_MM,
                    baseline_mm: 0.0,
                },
                config.line_height_mm,
            );
        }
    }

    DocumentLayout {
        style,
        pages: cursor.finish(),
    }
}

struct PageCursor {
    pages: Vec<PageLayout>,
    current: PageLayout,
    y_mm: f32,
}

impl PageCursor {
    fn new() -> Self {
        Self {
            pages: Vec::new(),
            current: PageLayout::default(),
            y_mm: TOP_MARGIN_MM,
        }
    }

    /// Place a run in a cell of `height`, breaking the page first if the cell would cross the
    /// bottom margin. Empty runs only consume vertical space.
    fn place(&mut self, mut run: PlacedText, height: f32) {
        let page_is_fresh = self.y_mm <= TOP_MARGIN_MM;
        if self.y_mm + height > PAGE_HEIGHT_MM - BOTTOM_MARGIN_MM && !page_is_fresh {
            self.pages.push(std::mem::take(&mut self.current));
            self.y_mm = TOP_MARGIN_MM;
        }
        // Vertically centered in the cell, like a single-line text cell.
        run.baseline_mm = self.y_mm + height / 2.0 + 0.3 * run.size_pt * PT_TO_MM;
        if !run.text.is_empty() {
            self.current.runs.push(run);
        }
        self.y_mm += height;
    }

    fn advance(&mut self, gap: f32) {
        self.y_mm += gap;
    }

    fn finish(mut self) -> Vec<PageLayout> {
        self.pages.push(self.current);
        self.pages
    }
}

/// Greedy word wrap. Always yields at least one row; words wider than a row are split.
///
/// Leading indentation and the spacing between words on a row are kept; tabs count as four
/// spaces. Whitespace at a row break is dropped.
fn wrap_line(line: &str, width_mm: f32, font: FontFace, size_pt: f32) -> Vec<String> {
    let fits = |candidate: &str| font.text_width_mm(candidate, size_pt) <= width_mm;
    let line = line.replace('\t', TAB_SPACES);
    let mut rows = Vec::new();
    let mut row = String::new();

    for (gap, word) in words_with_gaps(&line) {
        let candidate = if !row.is_empty() {
            format!("{row}{gap}{word}")
        } else if rows.is_empty() {
            format!("{gap}{word}")
        } else {
            word.to_string()
        };
        if fits(&candidate) {
            row = candidate;
            continue;
        }
        if !row.is_empty() {
            rows.push(std::mem::take(&mut row));
        }
        if fits(word) {
            row = word.to_string();
            continue;
        }
        for c in word.chars() {
            row.push(c);
            if !fits(&row) {
                row.pop();
                rows.push(std::mem::take(&mut row));
                row.push(c);
            }
        }
    }

    if !row.is_empty() || rows.is_empty() {
        rows.push(row);
    }
    rows
}

/// Split a line into `(preceding whitespace, word)` pairs. Trailing whitespace is ignored.
fn words_with_gaps(line: &str) -> Vec<(&str, &str)> {
    let mut pieces = Vec::new();
    let mut rest = line;
    loop {
        let word_start = rest.find(|c: char| !c.is_whitespace()).unwrap_or(rest.len());
        let (gap, tail) = rest.split_at(word_start);
        if tail.is_empty() {
            break;
        }
        let word_end = tail.find(char::is_whitespace).unwrap_or(tail.len());
        let (word, remaining) = tail.split_at(word_end);
        pieces.push((gap, word));
        rest = remaining;
    }
    pieces
}
