use crate::{GenerateError, Result};
use lopdf::Document;

// ── PdfValidator ──────────────────────────────────────────────────────────────
//
// This is an internal type. The assembler runs it on the rendered document
// before copying pages; PdfInspector::is_pdf exposes it to callers.

pub(crate) struct PdfValidator<'a> {
    document: &'a Document,
}

impl<'a> PdfValidator<'a> {
    pub(crate) fn new(document: &'a Document) -> Self {
        Self { document }
    }

    /// Returns `Ok(true)` when the parsed document looks structurally valid.
    /// We rely on lopdf having already parsed the cross-reference table and
    /// object graph; here we just assert the mandatory elements are present.
    pub(crate) fn validate_pdf_structure(&self) -> Result<bool> {
        // Catalog must exist
        self.document
            .catalog()
            .map_err(|e| GenerateError::Format(format!("missing or invalid catalog: {e}")))?;

        // At least one page must exist
        if self.document.get_pages().is_empty() {
            return Err(GenerateError::Format("document has no pages".into()));
        }

        // Trailer must not be empty
        if self.document.trailer.is_empty() {
            return Err(GenerateError::Format("missing trailer dictionary".into()));
        }

        if self.document.encryption_state.is_some() {
            return Err(GenerateError::Format("document is encrypted".into()));
        }

        Ok(true)
    }
}
