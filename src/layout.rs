//! Page model used by the renderer: a vertical cursor over A4 pages, drawing
//! primitives emitted as lopdf content operations, and the metrics of the
//! standard Type1 fonts needed to wrap text.

use lopdf::content::Operation;
use lopdf::{Object, StringFormat};

pub(crate) const PAGE_WIDTH: f32 = 595.28;
pub(crate) const PAGE_HEIGHT: f32 = 841.89;
/// 2 cm.
pub(crate) const MARGIN_X: f32 = 56.69;
/// 2.5 cm.
pub(crate) const MARGIN_Y: f32 = 70.87;
pub(crate) const CONTENT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN_X;
pub(crate) const CONTENT_TOP: f32 = PAGE_HEIGHT - MARGIN_Y;

// ── Colours and fonts ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Rgb(f32, f32, f32);

impl Rgb {
    pub(crate) const fn hex(value: u32) -> Self {
        Rgb(
            ((value >> 16) & 0xFF) as f32 / 255.0,
            ((value >> 8) & 0xFF) as f32 / 255.0,
            (value & 0xFF) as f32 / 255.0,
        )
    }

    fn operands(self) -> Vec<Object> {
        vec![Object::Real(self.0), Object::Real(self.1), Object::Real(self.2)]
    }
}

/// The standard fonts every page resource dictionary declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Font {
    Regular,
    Bold,
    Italic,
    Mono,
}

impl Font {
    pub(crate) const ALL: [Font; 4] = [Font::Regular, Font::Bold, Font::Italic, Font::Mono];

    pub(crate) fn resource_name(self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
            Font::Italic => "F3",
            Font::Mono => "F4",
        }
    }

    pub(crate) fn base_font(self) -> &'static str {
        match self {
            Font::Regular => "Helvetica",
            Font::Bold => "Helvetica-Bold",
            Font::Italic => "Helvetica-Oblique",
            Font::Mono => "Courier",
        }
    }

    /// Advance width in 1/1000 em.
    fn glyph_width(self, c: char) -> u16 {
        let table = match self {
            Font::Mono => return 600,
            Font::Bold => &HELVETICA_BOLD_WIDTHS,
            Font::Regular | Font::Italic => &HELVETICA_WIDTHS,
        };
        match c {
            ' '..='~' => table[c as usize - 0x20],
            _ => 556,
        }
    }
}

// Helvetica AFM widths for 0x20..=0x7E (Oblique shares them).
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

#[derive(Debug, Clone, Copy)]
pub(crate) struct TextStyle {
    pub(crate) font: Font,
    pub(crate) size: f32,
    pub(crate) color: Rgb,
}

impl TextStyle {
    pub(crate) const fn new(font: Font, size: f32, color: Rgb) -> Self {
        Self { font, size, color }
    }

    /// Baseline-to-baseline distance.
    pub(crate) fn leading(&self) -> f32 {
        self.size * 1.4
    }

    pub(crate) fn width_of(&self, text: &str) -> f32 {
        text_width(text, self.font, self.size)
    }
}

// ── Text helpers ──────────────────────────────────────────────────────────────

pub(crate) fn text_width(text: &str, font: Font, size: f32) -> f32 {
    let units: u32 = text.chars().map(|c| u32::from(font.glyph_width(c))).sum();
    units as f32 * size / 1000.0
}

/// Greedy word wrap on collapsed whitespace. Always returns at least one
/// line; words wider than `max_width` are split between characters.
pub(crate) fn wrap(text: &str, style: &TextStyle, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };

        if style.width_of(&candidate) <= max_width {
            current = candidate;
            continue;
        }

        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }

        for c in word.chars() {
            current.push(c);
            if style.width_of(&current) > max_width && current.chars().count() > 1 {
                current.pop();
                lines.push(std::mem::take(&mut current));
                current.push(c);
            }
        }
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

/// Encode text for a standard font declared with `/WinAnsiEncoding`.
/// Characters outside the code page become `?`.
pub(crate) fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\t' => b' ',
            ' '..='~' | '\u{A0}'..='\u{FF}' => c as u8,
            '€' => 0x80,
            '‚' => 0x82,
            'ƒ' => 0x83,
            '„' => 0x84,
            '…' => 0x85,
            '†' => 0x86,
            '‡' => 0x87,
            'ˆ' => 0x88,
            '‰' => 0x89,
            'Š' => 0x8A,
            '‹' => 0x8B,
            'Œ' => 0x8C,
            'Ž' => 0x8E,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            '˜' => 0x98,
            '™' => 0x99,
            'š' => 0x9A,
            '›' => 0x9B,
            'œ' => 0x9C,
            'ž' => 0x9E,
            'Ÿ' => 0x9F,
            _ => b'?',
        })
        .collect()
}

// ── Drawing primitives ────────────────────────────────────────────────────────

pub(crate) fn text_ops(x: f32, baseline: f32, style: &TextStyle, text: &str) -> Vec<Operation> {
    vec![
        Operation::new("BT", vec![]),
        Operation::new(
            "Tf",
            vec![style.font.resource_name().into(), Object::Real(style.size)],
        ),
        Operation::new("rg", style.color.operands()),
        Operation::new("Td", vec![Object::Real(x), Object::Real(baseline)]),
        Operation::new(
            "Tj",
            vec![Object::String(encode_win_ansi(text), StringFormat::Literal)],
        ),
        Operation::new("ET", vec![]),
    ]
}

fn rect_operands(x: f32, y: f32, width: f32, height: f32) -> Vec<Object> {
    vec![
        Object::Real(x),
        Object::Real(y),
        Object::Real(width),
        Object::Real(height),
    ]
}

// ── Layout ────────────────────────────────────────────────────────────────────

/// Accumulates page content top-down. `cursor` is the y coordinate of the
/// top of the next block on the current page.
pub(crate) struct Layout {
    pages: Vec<Vec<Operation>>,
    cursor: f32,
}

impl Layout {
    pub(crate) fn new() -> Self {
        Self {
            pages: vec![Vec::new()],
            cursor: CONTENT_TOP,
        }
    }

    pub(crate) fn cursor(&self) -> f32 {
        self.cursor
    }

    pub(crate) fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub(crate) fn at_page_top(&self) -> bool {
        self.cursor >= CONTENT_TOP
    }

    /// Space left above the bottom margin on the current page.
    pub(crate) fn remaining(&self) -> f32 {
        self.cursor - MARGIN_Y
    }

    pub(crate) fn new_page(&mut self) {
        self.pages.push(Vec::new());
        self.cursor = CONTENT_TOP;
    }

    /// Start a new page unless `height` fits below the cursor. A block that
    /// does not fit on an empty page is placed anyway. Returns `true` when a
    /// page break was inserted.
    pub(crate) fn ensure_space(&mut self, height: f32) -> bool {
        if height > self.remaining() && !self.at_page_top() {
            self.new_page();
            return true;
        }
        false
    }

    /// Move the cursor down. Vertical gaps are dropped at the top of a page.
    pub(crate) fn gap(&mut self, height: f32) {
        if !self.at_page_top() {
            self.cursor = (self.cursor - height).max(MARGIN_Y);
        }
    }

    pub(crate) fn advance(&mut self, height: f32) {
        self.cursor -= height;
    }

    fn ops(&mut self) -> &mut Vec<Operation> {
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    pub(crate) fn text(&mut self, x: f32, baseline: f32, style: &TextStyle, text: &str) {
        let ops = text_ops(x, baseline, style, text);
        self.ops().extend(ops);
    }

    /// Draw `lines` top-down from the cursor and advance past them.
    pub(crate) fn text_lines(&mut self, x: f32, style: &TextStyle, lines: &[String]) {
        for line in lines {
            self.ensure_space(style.leading());
            let baseline = self.cursor - style.size;
            self.text(x, baseline, style, line);
            self.advance(style.leading());
        }
    }

    pub(crate) fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Rgb) {
        self.ops().extend([
            Operation::new("q", vec![]),
            Operation::new("rg", color.operands()),
            Operation::new("re", rect_operands(x, y, width, height)),
            Operation::new("f", vec![]),
            Operation::new("Q", vec![]),
        ]);
    }

    pub(crate) fn stroke_rect(
        &mut self,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Rgb,
        line_width: f32,
    ) {
        self.ops().extend([
            Operation::new("q", vec![]),
            Operation::new("RG", color.operands()),
            Operation::new("w", vec![Object::Real(line_width)]),
            Operation::new("re", rect_operands(x, y, width, height)),
            Operation::new("S", vec![]),
            Operation::new("Q", vec![]),
        ]);
    }

    pub(crate) fn hline(&mut self, x1: f32, x2: f32, y: f32, color: Rgb, line_width: f32) {
        self.ops().extend([
            Operation::new("q", vec![]),
            Operation::new("RG", color.operands()),
            Operation::new("w", vec![Object::Real(line_width)]),
            Operation::new("m", vec![Object::Real(x1), Object::Real(y)]),
            Operation::new("l", vec![Object::Real(x2), Object::Real(y)]),
            Operation::new("S", vec![]),
            Operation::new("Q", vec![]),
        ]);
    }

    pub(crate) fn into_pages(self) -> Vec<Vec<Operation>> {
        self.pages
    }
}
