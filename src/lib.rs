//! # cahier-des-charges
//!
//! Generates a specification document ("cahier des charges") for file-exchange
//! use cases as a PDF, with an empty, styled Excel template embedded as a file
//! attachment for every use case it describes.
//!
//! ## What this crate does
//!
//! 1. **Select use cases**: looks the requested ids up in the [`Catalog`]
//!    and keeps them in catalog order.
//! 2. **Render**: lays out a cover page and one section per use case
//!    (description, expected field table, attachment note) as a PDF.
//! 3. **Build templates**: writes one single-sheet XLSX per use case whose
//!    only row is the styled header of field names.
//! 4. **Assemble**: copies every rendered page into a new PDF container and
//!    embeds each template under its attachment filename.
//!
//! ## Quick example
//!
//! ```no_run
//! use cahier_des_charges::{Catalog, Generator};
//! use chrono::NaiveDate;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let catalog = Catalog::builtin()?;
//! let generator = Generator::new(&catalog);
//!
//! let at = NaiveDate::from_ymd_opt(2024, 1, 15)
//!     .and_then(|d| d.and_hms_opt(10, 0, 0))
//!     .ok_or("invalid date")?;
//! let document = generator.generate_ids(["UC001", "UC003"], at)?;
//!
//! println!("{}: {} bytes", document.filename, document.data.len());
//! for name in &document.attachments {
//!     println!("  attached: {name}");
//! }
//! # Ok(())
//! # }
//! ```

use thiserror::Error;

mod assembler;
mod catalog;
mod embedded;
mod inspect;
mod layout;
mod pdf_utils;
mod pipeline;
mod render;
mod spreadsheet;
mod validator;

pub use assembler::{assemble, assemble_selection, PdfAssembler};
pub use catalog::{Catalog, Field, SelectionSet, UseCase};
pub use embedded::{EmbeddedFile, EmbeddedFileMetadata, XLSX_MIME_TYPE};
pub use inspect::PdfInspector;
pub use pipeline::{output_filename, GeneratedDocument, Generator, PDF_CONTENT_TYPE};
pub use render::Renderer;
pub use spreadsheet::{build_template, column_width, SpreadsheetBuilder, SHEET_NAME};
// PdfValidator and the layout engine are internal details shared by the
// renderer, assembler and inspector.

// ── Configuration ────────────────────────────────────────────────────────────

/// Runtime configuration for [`Generator`], [`Renderer`] and [`PdfAssembler`].
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Title printed on the cover page and stored in the PDF `/Info`.
    pub title: String,

    /// Subtitle printed under the cover title.
    pub subtitle: String,

    /// Text repeated at the top of every page.
    pub running_header: String,

    /// When `true`, every attachment's file specification carries a `/Desc`
    /// naming the use case it belongs to.
    pub describe_attachments: bool,

    /// When `true`, the final document asks the viewer to open its
    /// attachments panel (`/PageMode /UseAttachments`).
    pub open_attachments_panel: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            title: "Cahier des Charges".into(),
            subtitle: "Spécifications des Échanges de Fichiers".into(),
            running_header: "Cahier des Charges - Échanges de Fichiers".into(),
            describe_attachments: true,
            open_attachments_panel: true,
        }
    }
}

// ── Error type ───────────────────────────────────────────────────────────────

/// Every error that this crate can produce.
#[derive(Error, Debug)]
pub enum GenerateError {
    /// A filesystem I/O error occurred (e.g. when loading a catalog or saving
    /// a document).
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// A selection referenced a use case id that is not in the catalog.
    #[error("Unknown use case '{0}'")]
    CatalogLookup(String),

    /// The catalog data could not be read.
    #[error("Invalid catalog: {0}")]
    CatalogParse(String),

    /// Generation was requested with no use case selected.
    #[error("At least one use case must be selected")]
    EmptySelection,

    /// The rendered document is not a PDF the assembler can read.
    #[error("Invalid rendered document: {0}")]
    Format(String),

    /// lopdf failed while building or serialising a document.
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// rust_xlsxwriter failed while building a template.
    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] rust_xlsxwriter::XlsxError),

    /// The inspected document contains no embedded files.
    #[error("No embedded files found in this PDF")]
    NoEmbeddedFiles,

    /// An embedded file was found but its stream could not be decoded.
    #[error("Failed to extract embedded file '{0}': {1}")]
    ExtractionError(String, String),
}

impl From<toml::de::Error> for GenerateError {
    fn from(e: toml::de::Error) -> Self {
        GenerateError::CatalogParse(e.to_string())
    }
}

/// Convenience alias used throughout this crate.
pub type Result<T> = std::result::Result<T, GenerateError>;
