use crate::catalog::{Field, SelectionSet, UseCase};
use crate::layout::{
    text_ops, wrap, Font, Layout, Rgb, TextStyle, CONTENT_TOP, CONTENT_WIDTH, MARGIN_X, MARGIN_Y,
    PAGE_HEIGHT, PAGE_WIDTH,
};
use crate::{GeneratorConfig, Result};
use chrono::NaiveDateTime;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, text_string, Dictionary, Document, Object, Stream};

const PRODUCER: &str = concat!("cahier-des-charges ", env!("CARGO_PKG_VERSION"));

// ── Palette and text styles ───────────────────────────────────────────────────

const INK: Rgb = Rgb::hex(0x333333);
const NAVY: Rgb = Rgb::hex(0x2C3E50);
const SLATE: Rgb = Rgb::hex(0x34495E);
const GREY: Rgb = Rgb::hex(0x7F8C8D);
const MUTED: Rgb = Rgb::hex(0x666666);
const BLUE: Rgb = Rgb::hex(0x3498DB);
const WHITE: Rgb = Rgb::hex(0xFFFFFF);
const ZEBRA: Rgb = Rgb::hex(0xF8F9FA);
const RULE: Rgb = Rgb::hex(0xDDDDDD);
const RED: Rgb = Rgb::hex(0xE74C3C);
const SILVER: Rgb = Rgb::hex(0x95A5A6);
const NOTE_FILL: Rgb = Rgb::hex(0xE8F4F8);
const GREEN: Rgb = Rgb::hex(0x27AE60);

const COVER_TITLE: TextStyle = TextStyle::new(Font::Bold, 36.0, NAVY);
const COVER_SUBTITLE: TextStyle = TextStyle::new(Font::Regular, 18.0, GREY);
const METADATA: TextStyle = TextStyle::new(Font::Regular, 11.0, GREY);
const HEADING: TextStyle = TextStyle::new(Font::Bold, 20.0, NAVY);
const SUBHEADING: TextStyle = TextStyle::new(Font::Bold, 14.0, SLATE);
const BODY: TextStyle = TextStyle::new(Font::Regular, 11.0, INK);
const LABEL: TextStyle = TextStyle::new(Font::Bold, 11.0, INK);
const TABLE_HEAD: TextStyle = TextStyle::new(Font::Bold, 10.0, WHITE);
const CELL: TextStyle = TextStyle::new(Font::Regular, 10.0, INK);
const CELL_NAME: TextStyle = TextStyle::new(Font::Bold, 10.0, INK);
const CELL_TYPE: TextStyle = TextStyle::new(Font::Mono, 9.5, INK);
const MANDATORY_YES: TextStyle = TextStyle::new(Font::Bold, 10.0, RED);
const MANDATORY_NO: TextStyle = TextStyle::new(Font::Regular, 10.0, SILVER);
const NOTE_TITLE: TextStyle = TextStyle::new(Font::Bold, 11.0, NAVY);
const NOTE_ITEM: TextStyle = TextStyle::new(Font::Bold, 11.0, GREEN);
const NOTE_TEXT: TextStyle = TextStyle::new(Font::Italic, 10.0, SLATE);
const RUNNING_HEADER: TextStyle = TextStyle::new(Font::Regular, 10.0, MUTED);
const FOOTER: TextStyle = TextStyle::new(Font::Regular, 9.0, MUTED);

// ── Fixed wording ─────────────────────────────────────────────────────────────

const TABLE_HEADERS: [&str; 4] = ["Nom du champ", "Type", "Obligatoire", "Description"];
const COLUMN_SHARES: [f32; 4] = [0.20, 0.15, 0.12, 0.53];
const ATTACHMENT_TITLE: &str = "Template Excel inclus dans ce PDF";
const ATTACHMENT_NOTE: [&str; 2] = [
    "Ce fichier est joint en tant que pièce jointe au PDF.",
    "Ouvrez le PDF avec Adobe Acrobat Reader pour extraire le fichier Excel.",
];

const CELL_PADDING_X: f32 = 6.0;
const CELL_PADDING_Y: f32 = 7.0;
const BOX_PADDING: f32 = 12.0;
const ACCENT_BAR: f32 = 3.0;
const LIST_PADDING: f32 = 8.0;

// ── Renderer ──────────────────────────────────────────────────────────────────

/// Lays out the cover page and one section per selected use case, and writes
/// the result as an uncompressed PDF.
///
/// The cover always ends its page and every section starts on a page of its
/// own, so section `i` begins on page `i + 1` whenever sections fit on a page.
/// Output depends only on the selection, the timestamp and the configuration.
pub struct Renderer<'a> {
    config: &'a GeneratorConfig,
}

impl<'a> Renderer<'a> {
    pub fn new(config: &'a GeneratorConfig) -> Self {
        Self { config }
    }

    pub fn render(&self, selection: &SelectionSet<'_>, generated_at: &NaiveDateTime) -> Result<Vec<u8>> {
        let mut layout = Layout::new();
        self.cover(&mut layout, selection.len(), generated_at);

        for (index, uc) in selection.iter().enumerate() {
            layout.new_page();
            self.section(&mut layout, index + 1, uc);
        }

        let page_count = layout.page_count();
        let pages = layout.into_pages();
        let bytes = self.write_document(pages, generated_at)?;
        tracing::debug!(
            use_cases = selection.len(),
            pages = page_count,
            bytes = bytes.len(),
            "rendered document"
        );
        Ok(bytes)
    }

    // ── Cover ─────────────────────────────────────────────────────────────────

    fn cover(&self, layout: &mut Layout, use_case_count: usize, generated_at: &NaiveDateTime) {
        layout.advance(150.0);
        centered_lines(layout, &COVER_TITLE, &wrap(&self.config.title, &COVER_TITLE, CONTENT_WIDTH));

        layout.advance(6.0);
        let rule_y = layout.cursor();
        layout.hline(MARGIN_X, MARGIN_X + CONTENT_WIDTH, rule_y, BLUE, 3.0);
        layout.advance(24.0);

        centered_lines(
            layout,
            &COVER_SUBTITLE,
            &wrap(&self.config.subtitle, &COVER_SUBTITLE, CONTENT_WIDTH),
        );

        layout.advance(100.0);
        let metadata = [
            format!("Date de génération : {}", generated_at.format("%d/%m/%Y")),
            format!("Nombre de use cases : {use_case_count}"),
        ];
        centered_lines(layout, &METADATA, &metadata);
    }

    // ── Use case section ──────────────────────────────────────────────────────

    fn section(&self, layout: &mut Layout, number: usize, uc: &UseCase) {
        let heading = wrap(&format!("{number}. {}", uc.title), &HEADING, CONTENT_WIDTH);
        layout.text_lines(MARGIN_X, &HEADING, &heading);
        layout.advance(4.0);

        // "Référence :" in bold, the id as its own string.
        let label = "Référence : ";
        layout.ensure_space(BODY.leading());
        let baseline = layout.cursor() - BODY.size;
        layout.text(MARGIN_X, baseline, &LABEL, label);
        layout.text(MARGIN_X + LABEL.width_of(label), baseline, &BODY, &uc.id);
        layout.advance(BODY.leading());

        subheading(layout, "Description");
        description_box(layout, &uc.description);

        subheading(layout, "Format attendu");
        field_table(layout, &uc.fields);

        attachment_box(layout, &uc.attachment_filename);
    }

    // ── Document assembly ─────────────────────────────────────────────────────

    fn write_document(&self, pages: Vec<Vec<Operation>>, generated_at: &NaiveDateTime) -> Result<Vec<u8>> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let mut fonts = Dictionary::new();
        for font in Font::ALL {
            let font_id = doc.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => font.base_font(),
                "Encoding" => "WinAnsiEncoding",
            });
            fonts.set(font.resource_name(), font_id);
        }
        let resources_id = doc.add_object(dictionary! { "Font" => fonts });

        let total = pages.len();
        let mut kids: Vec<Object> = Vec::with_capacity(total);
        for (index, mut operations) in pages.into_iter().enumerate() {
            operations.extend(self.page_furniture(index + 1, total));
            let content = Content { operations };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        // Resources and MediaBox live on the page tree node and are inherited.
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => total as i64,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), Object::Real(PAGE_WIDTH), Object::Real(PAGE_HEIGHT)],
            }),
        );

        let info_id = doc.add_object(dictionary! {
            "Title" => text_string(&self.config.title),
            "Producer" => Object::string_literal(PRODUCER),
            "CreationDate" => Object::string_literal(pdf_date(generated_at)),
        });
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.trailer.set("Info", info_id);

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer)?;
        Ok(buffer)
    }

    /// Running header and `Page i / N` footer.
    fn page_furniture(&self, page_number: usize, page_total: usize) -> Vec<Operation> {
        let header = &self.config.running_header;
        let header_x = (PAGE_WIDTH - RUNNING_HEADER.width_of(header)) / 2.0;
        let footer = format!("Page {page_number} / {page_total}");
        let footer_x = PAGE_WIDTH - MARGIN_X - FOOTER.width_of(&footer);

        let mut ops = text_ops(header_x, PAGE_HEIGHT - 40.0, &RUNNING_HEADER, header);
        ops.extend(text_ops(footer_x, 35.0, &FOOTER, &footer));
        ops
    }
}

// ── Blocks ────────────────────────────────────────────────────────────────────

fn centered_lines(layout: &mut Layout, style: &TextStyle, lines: &[String]) {
    for line in lines {
        let x = MARGIN_X + (CONTENT_WIDTH - style.width_of(line)) / 2.0;
        let baseline = layout.cursor() - style.size;
        layout.text(x, baseline, style, line);
        layout.advance(style.leading());
    }
}

/// Headings keep at least two body lines with them.
fn subheading(layout: &mut Layout, text: &str) {
    layout.gap(16.0);
    layout.ensure_space(SUBHEADING.leading() + 2.0 * BODY.leading());
    layout.text_lines(MARGIN_X, &SUBHEADING, &[text.to_string()]);
    layout.advance(4.0);
}

fn description_box(layout: &mut Layout, description: &str) {
    let text_x = MARGIN_X + ACCENT_BAR + BOX_PADDING;
    let lines = wrap(description, &BODY, CONTENT_WIDTH - ACCENT_BAR - 2.0 * BOX_PADDING);
    let height = lines.len() as f32 * BODY.leading() + 2.0 * BOX_PADDING;

    layout.gap(6.0);
    if height > CONTENT_TOP - MARGIN_Y {
        // Too tall for any page: flow as plain text.
        layout.text_lines(text_x, &BODY, &lines);
        return;
    }

    layout.ensure_space(height);
    let top = layout.cursor();
    layout.fill_rect(MARGIN_X, top - height, CONTENT_WIDTH, height, ZEBRA);
    layout.fill_rect(MARGIN_X, top - height, ACCENT_BAR, height, BLUE);

    layout.advance(BOX_PADDING);
    for line in &lines {
        let baseline = layout.cursor() - BODY.size;
        layout.text(text_x, baseline, &BODY, line);
        layout.advance(BODY.leading());
    }
    layout.advance(BOX_PADDING);
}

struct Row {
    cells: Vec<(TextStyle, Vec<String>)>,
    height: f32,
}

impl Row {
    fn new(cells: [(TextStyle, &str); 4], widths: &[f32; 4]) -> Self {
        let cells: Vec<(TextStyle, Vec<String>)> = cells
            .iter()
            .zip(widths)
            .map(|((style, text), width)| (*style, wrap(text, style, width - 2.0 * CELL_PADDING_X)))
            .collect();
        let content = cells
            .iter()
            .map(|(style, lines)| lines.len() as f32 * style.leading())
            .fold(0.0, f32::max);
        Self {
            cells,
            height: content + 2.0 * CELL_PADDING_Y,
        }
    }

    fn for_field(field: &Field, widths: &[f32; 4]) -> Self {
        let (mandatory_style, mandatory) = if field.mandatory {
            (MANDATORY_YES, "Oui")
        } else {
            (MANDATORY_NO, "Non")
        };
        Self::new(
            [
                (CELL_NAME, field.name.as_str()),
                (CELL_TYPE, field.declared_type.as_str()),
                (mandatory_style, mandatory),
                (CELL, field.description.as_str()),
            ],
            widths,
        )
    }

    fn draw(&self, layout: &mut Layout, widths: &[f32; 4], fill: Option<Rgb>, rule: bool) {
        let top = layout.cursor();
        if let Some(color) = fill {
            layout.fill_rect(MARGIN_X, top - self.height, CONTENT_WIDTH, self.height, color);
        }

        let mut x = MARGIN_X;
        for ((style, lines), width) in self.cells.iter().zip(widths) {
            let mut baseline = top - CELL_PADDING_Y - style.size;
            for line in lines {
                layout.text(x + CELL_PADDING_X, baseline, style, line);
                baseline -= style.leading();
            }
            x += width;
        }

        if rule {
            layout.hline(MARGIN_X, MARGIN_X + CONTENT_WIDTH, top - self.height, RULE, 0.75);
        }
        layout.advance(self.height);
    }
}

/// The table stays on one page when it fits there; otherwise it breaks
/// between rows and repeats its header row.
fn field_table(layout: &mut Layout, fields: &[Field]) {
    let widths = COLUMN_SHARES.map(|share| share * CONTENT_WIDTH);
    let header = Row::new(TABLE_HEADERS.map(|h| (TABLE_HEAD, h)), &widths);
    let rows: Vec<Row> = fields.iter().map(|f| Row::for_field(f, &widths)).collect();

    let total: f32 = header.height + rows.iter().map(|r| r.height).sum::<f32>();
    let first = header.height + rows.first().map_or(0.0, |r| r.height);

    layout.gap(8.0);
    if total <= CONTENT_TOP - MARGIN_Y {
        layout.ensure_space(total);
    } else {
        layout.ensure_space(first);
    }
    header.draw(layout, &widths, Some(BLUE), false);

    for (index, row) in rows.iter().enumerate() {
        if layout.ensure_space(row.height) {
            header.draw(layout, &widths, Some(BLUE), false);
        }
        let fill = (index % 2 == 1).then_some(ZEBRA);
        row.draw(layout, &widths, fill, true);
    }
}

fn attachment_box(layout: &mut Layout, filename: &str) {
    let inner_x = MARGIN_X + BOX_PADDING;
    let inner_width = CONTENT_WIDTH - 2.0 * BOX_PADDING;
    let item_x = inner_x + ACCENT_BAR + BOX_PADDING;

    let items = wrap(filename, &NOTE_ITEM, inner_width - ACCENT_BAR - 2.0 * BOX_PADDING);
    let notes: Vec<String> = ATTACHMENT_NOTE
        .iter()
        .flat_map(|line| wrap(line, &NOTE_TEXT, inner_width))
        .collect();

    let list_height = items.len() as f32 * NOTE_ITEM.leading() + 2.0 * LIST_PADDING;
    let height = BOX_PADDING
        + NOTE_TITLE.leading()
        + list_height
        + LIST_PADDING
        + notes.len() as f32 * NOTE_TEXT.leading()
        + BOX_PADDING;

    layout.gap(14.0);
    layout.ensure_space(height);
    let top = layout.cursor();
    layout.fill_rect(MARGIN_X, top - height, CONTENT_WIDTH, height, NOTE_FILL);
    layout.stroke_rect(MARGIN_X, top - height, CONTENT_WIDTH, height, BLUE, 1.5);

    layout.advance(BOX_PADDING);
    let baseline = layout.cursor() - NOTE_TITLE.size;
    layout.text(inner_x, baseline, &NOTE_TITLE, ATTACHMENT_TITLE);
    layout.advance(NOTE_TITLE.leading());

    let list_top = layout.cursor();
    layout.fill_rect(inner_x, list_top - list_height, inner_width, list_height, WHITE);
    layout.fill_rect(inner_x, list_top - list_height, ACCENT_BAR, list_height, GREEN);
    layout.advance(LIST_PADDING);
    for item in &items {
        let baseline = layout.cursor() - NOTE_ITEM.size;
        layout.text(item_x, baseline, &NOTE_ITEM, item);
        layout.advance(NOTE_ITEM.leading());
    }
    layout.advance(2.0 * LIST_PADDING);

    for note in &notes {
        let baseline = layout.cursor() - NOTE_TEXT.size;
        layout.text(inner_x, baseline, &NOTE_TEXT, note);
        layout.advance(NOTE_TEXT.leading());
    }
    layout.advance(BOX_PADDING);
}

/// PDF date string (`D:YYYYMMDDHHmmSS`).
fn pdf_date(t: &NaiveDateTime) -> String {
    t.format("D:%Y%m%d%H%M%S").to_string()
}
