//! Empty, styled XLSX templates: one header row, no data rows.

use crate::catalog::Field;
use crate::Result;
use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use rust_xlsxwriter::{
    Color, DocProperties, ExcelDateTime, Format, FormatAlign, FormatPattern, Workbook, Worksheet,
    XlsxError,
};

/// Name of the single worksheet in every template.
pub const SHEET_NAME: &str = "Template";

const HEADER_FILL: u32 = 0x3498DB;
const MAX_COLUMN_WIDTH: usize = 50;

/// Width, in character units, of a column whose only content is `header`.
///
/// ```
/// use cahier_des_charges::column_width;
///
/// assert_eq!(column_width("client_id"), 11.0);
/// assert_eq!(column_width(&"x".repeat(80)), 50.0);
/// ```
pub fn column_width(header: &str) -> f64 {
    (header.chars().count() + 2).min(MAX_COLUMN_WIDTH) as f64
}

/// Build a template with a fixed creation timestamp (1980-01-01 00:00:00).
///
/// Equal inputs always produce equal bytes.
pub fn build_template(fields: &[Field]) -> Result<Vec<u8>> {
    SpreadsheetBuilder::default().build(fields)
}

// ── SpreadsheetBuilder ───────────────────────────────────────────────────────

/// Writes spreadsheet templates stamped with an injected creation time.
///
/// rust_xlsxwriter stamps `docProps/core.xml` with the wall clock unless a
/// creation time is set, so the builder always sets one.
#[derive(Debug, Clone, Copy)]
pub struct SpreadsheetBuilder {
    created_at: NaiveDateTime,
}

impl Default for SpreadsheetBuilder {
    fn default() -> Self {
        let epoch = NaiveDate::from_ymd_opt(1980, 1, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .unwrap_or_default();
        Self::new(epoch)
    }
}

impl SpreadsheetBuilder {
    pub fn new(created_at: NaiveDateTime) -> Self {
        Self { created_at }
    }

    /// Produce the XLSX bytes for one use case's field list.
    ///
    /// An empty field list yields a valid workbook with an empty sheet.
    pub fn build(&self, fields: &[Field]) -> Result<Vec<u8>> {
        let mut workbook = Workbook::new();
        workbook.set_properties(&DocProperties::new().set_creation_datetime(&self.excel_created_at()?));

        let header_format = Format::new()
            .set_bold()
            .set_font_color(Color::White)
            .set_pattern(FormatPattern::Solid)
            .set_background_color(Color::RGB(HEADER_FILL))
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter);

        let sheet = workbook.add_worksheet();
        sheet.set_name(SHEET_NAME)?;
        write_header(sheet, fields, &header_format)?;

        tracing::debug!(columns = fields.len(), "built spreadsheet template");
        Ok(workbook.save_to_buffer()?)
    }

    fn excel_created_at(&self) -> Result<ExcelDateTime> {
        let t = self.created_at;
        let year = u16::try_from(t.year()).map_err(|_| {
            XlsxError::DateTimeRangeError(format!("year {} is outside the Excel date range", t.year()))
        })?;
        let date = ExcelDateTime::from_ymd(year, t.month() as u8, t.day() as u8)?;
        Ok(date.and_hms(t.hour() as u16, t.minute() as u8, t.second())?)
    }
}

fn write_header(sheet: &mut Worksheet, fields: &[Field], format: &Format) -> Result<()> {
    for (col, field) in fields.iter().enumerate() {
        let col = col as u16;
        sheet.write_string_with_format(0, col, &field.name, format)?;
        sheet.set_column_width(col, column_width(&field.name))?;
    }
    Ok(())
}
