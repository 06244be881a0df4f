use std::path::Path;

/// MIME type of the spreadsheet templates (Office Open XML workbook).
pub const XLSX_MIME_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

// ── EmbeddedFile ─────────────────────────────────────────────────────────────

/// A named binary blob stored inside a PDF, outside its visible pages.
///
/// The assembler takes these as input ([`crate::PdfAssembler::attach`]) and
/// the inspector returns them ([`crate::PdfInspector::extract_embedded_files`]).
/// The bytes are opaque to both: nothing checks that a `.xlsx` really is one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedFile {
    /// The filename shown by PDF viewers (`/UF`, falling back to `/F`).
    pub filename: String,

    /// The raw, decompressed file content.
    pub data: Vec<u8>,

    pub metadata: EmbeddedFileMetadata,
}

impl EmbeddedFile {
    pub fn new(filename: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            data,
            metadata: EmbeddedFileMetadata::default(),
        }
    }

    /// A spreadsheet template attachment, tagged with [`XLSX_MIME_TYPE`].
    pub fn xlsx(filename: impl Into<String>, data: Vec<u8>) -> Self {
        Self::new(filename, data).with_mime_type(XLSX_MIME_TYPE)
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.metadata.mime_type = Some(mime_type.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.metadata.description = Some(description.into());
        self
    }

    /// Write this file into `output_dir`, creating the directory if necessary.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use cahier_des_charges::PdfInspector;
    ///
    /// let inspector = PdfInspector::from_path("cahier_des_charges.pdf").unwrap();
    /// for file in inspector.extract_embedded_files().unwrap() {
    ///     file.save_to_disk("./templates").unwrap();
    /// }
    /// ```
    pub fn save_to_disk<P: AsRef<Path>>(&self, output_dir: P) -> std::io::Result<()> {
        let dir = output_dir.as_ref();
        std::fs::create_dir_all(dir)?;
        std::fs::write(dir.join(&self.filename), &self.data)
    }

    /// Returns the file extension, or `None` if the filename has none.
    ///
    /// ```
    /// # use cahier_des_charges::EmbeddedFile;
    /// let file = EmbeddedFile::new("template_clients.xlsx", vec![]);
    /// assert_eq!(file.extension(), Some("xlsx"));
    /// ```
    pub fn extension(&self) -> Option<&str> {
        Path::new(&self.filename)
            .extension()
            .and_then(|e| e.to_str())
    }

    /// Returns `true` when the file's extension matches `ext`
    /// (case-insensitive comparison).
    ///
    /// ```
    /// # use cahier_des_charges::EmbeddedFile;
    /// let file = EmbeddedFile::new("Template_Clients.XLSX", vec![]);
    /// assert!(file.has_extension("xlsx"));
    /// ```
    pub fn has_extension(&self, ext: &str) -> bool {
        self.extension()
            .map(|e| e.eq_ignore_ascii_case(ext))
            .unwrap_or(false)
    }
}

// ── EmbeddedFileMetadata ──────────────────────────────────────────────────────

/// Optional metadata carried by the file specification (`/Desc`) and the
/// embedded stream (`/Subtype`, `/Params`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmbeddedFileMetadata {
    /// MIME type stored as the embedded stream's `/Subtype`.
    pub mime_type: Option<String>,

    /// Human-readable description from the `/Desc` entry.
    pub description: Option<String>,

    /// Modification date in PDF date format (`D:YYYYMMDDHHmmSS`), stored as
    /// `/Params/ModDate`.
    pub modification_date: Option<String>,

    /// Uncompressed size in bytes from `/Params/Size`. Filled in on
    /// extraction; the assembler always writes the actual data length.
    pub size: Option<usize>,
}

impl EmbeddedFileMetadata {
    /// Returns `true` when the declared MIME type matches `mime_type`
    /// (case-insensitive).
    pub fn has_mime_type(&self, mime_type: &str) -> bool {
        self.mime_type
            .as_deref()
            .map(|m| m.eq_ignore_ascii_case(mime_type))
            .unwrap_or(false)
    }
}
