//! End-to-end generation: selection, rendering, templates, assembly.

use crate::assembler::assemble_selection;
use crate::catalog::{Catalog, SelectionSet};
use crate::render::Renderer;
use crate::spreadsheet::SpreadsheetBuilder;
use crate::{GenerateError, GeneratorConfig, Result};
use chrono::NaiveDateTime;
use std::path::{Path, PathBuf};

pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// `cahier_des_charges_<YYYYMMDD>_<HHMMSS>.pdf`
///
/// ```
/// use cahier_des_charges::output_filename;
/// use chrono::NaiveDate;
///
/// let t = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap().and_hms_opt(10, 0, 0).unwrap();
/// assert_eq!(output_filename(&t), "cahier_des_charges_20240115_100000.pdf");
/// ```
pub fn output_filename(generated_at: &NaiveDateTime) -> String {
    format!("cahier_des_charges_{}.pdf", generated_at.format("%Y%m%d_%H%M%S"))
}

// ── GeneratedDocument ─────────────────────────────────────────────────────────

/// A finished document ready to be written or served.
#[derive(Debug, Clone)]
pub struct GeneratedDocument {
    pub filename: String,
    pub content_type: &'static str,
    pub data: Vec<u8>,
    /// Attachment filenames, in selection order.
    pub attachments: Vec<String>,
}

impl GeneratedDocument {
    /// Write the PDF into `dir` (created if needed) and return its path.
    pub fn save_to_dir<P: AsRef<Path>>(&self, dir: P) -> std::io::Result<PathBuf> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        let path = dir.join(&self.filename);
        std::fs::write(&path, &self.data)?;
        Ok(path)
    }
}

// ── Generator ─────────────────────────────────────────────────────────────────

pub struct Generator<'a> {
    catalog: &'a Catalog,
    config: GeneratorConfig,
}

impl<'a> Generator<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self::with_config(catalog, GeneratorConfig::default())
    }

    pub fn with_config(catalog: &'a Catalog, config: GeneratorConfig) -> Self {
        Self { catalog, config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn select<I, S>(&self, ids: I) -> Result<SelectionSet<'a>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.catalog.select(ids)
    }

    /// Render `selection`, build one template per use case and embed them.
    ///
    /// Every timestamp in the output comes from `generated_at`, so two calls
    /// with equal arguments return identical bytes.
    pub fn generate(
        &self,
        selection: &SelectionSet<'_>,
        generated_at: NaiveDateTime,
    ) -> Result<GeneratedDocument> {
        if selection.is_empty() {
            return Err(GenerateError::EmptySelection);
        }

        let rendered = Renderer::new(&self.config).render(selection, &generated_at)?;

        let builder = SpreadsheetBuilder::new(generated_at);
        let data = assemble_selection(&rendered, selection, &self.config, |uc| {
            builder.build(&uc.fields)
        })?;

        let document = GeneratedDocument {
            filename: output_filename(&generated_at),
            content_type: PDF_CONTENT_TYPE,
            data,
            attachments: selection
                .attachment_filenames()
                .into_iter()
                .map(String::from)
                .collect(),
        };

        tracing::info!(
            filename = %document.filename,
            attachments = document.attachments.len(),
            bytes = document.data.len(),
            "generated document"
        );
        Ok(document)
    }

    /// Look `ids` up, then [`generate`](Self::generate). Unknown ids fail
    /// before anything is rendered.
    pub fn generate_ids<I, S>(&self, ids: I, generated_at: NaiveDateTime) -> Result<GeneratedDocument>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let selection = self.select(ids)?;
        self.generate(&selection, generated_at)
    }
}
