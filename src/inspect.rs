use crate::pdf_utils::{extract_string_from_dict, resolve_dict};
use crate::validator::PdfValidator;
use crate::{EmbeddedFile, EmbeddedFileMetadata, GenerateError, Result};
use lopdf::{decode_text_string, Dictionary, Document, Object, ObjectId, Stream};
use std::path::Path;

const MAX_TREE_DEPTH: usize = 32;

// ── PdfInspector ──────────────────────────────────────────────────────────────

/// Read-only view over a generated document: page text and attachments.
///
/// ```no_run
/// use cahier_des_charges::PdfInspector;
///
/// let inspector = PdfInspector::from_path("cahier_des_charges_20240115_100000.pdf").unwrap();
/// println!("{} pages", inspector.page_count());
/// for name in inspector.attachment_names() {
///     println!("  {name}");
/// }
/// ```
pub struct PdfInspector {
    document: Document,
}

impl PdfInspector {
    // ── Constructors ──────────────────────────────────────────────────────────

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    /// Parse an in-memory PDF. Unparseable input is a
    /// [`GenerateError::Format`] error.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let document = Document::load_mem(data)
            .map_err(|e| GenerateError::Format(format!("cannot parse PDF: {e}")))?;
        Ok(Self { document })
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    // ── Structure ─────────────────────────────────────────────────────────────

    /// Returns `Ok(true)` when the document has a catalog, at least one page
    /// and a trailer.
    pub fn is_pdf(&self) -> Result<bool> {
        PdfValidator::new(&self.document).validate_pdf_structure()
    }

    pub fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }

    /// Decoded content stream of the 1-based page `page_number`.
    pub fn page_content(&self, page_number: u32) -> Result<Vec<u8>> {
        let page_id = self
            .document
            .get_pages()
            .get(&page_number)
            .copied()
            .ok_or_else(|| {
                GenerateError::Format(format!(
                    "page {page_number} out of range (document has {} pages)",
                    self.page_count()
                ))
            })?;
        Ok(self.document.get_page_content(page_id)?)
    }

    /// The effective `/MediaBox` of a page, looked up through the page tree.
    pub fn media_box(&self, page_number: u32) -> Option<[f32; 4]> {
        let page_id = *self.document.get_pages().get(&page_number)?;
        let mut node = self.document.get_dictionary(page_id).ok()?;

        for _ in 0..MAX_TREE_DEPTH {
            if let Ok(value) = node.get(b"MediaBox") {
                let array = match value.as_reference() {
                    Ok(id) => self.document.get_object(id).ok()?.as_array().ok()?,
                    Err(_) => value.as_array().ok()?,
                };
                let coords: Vec<f32> = array.iter().filter_map(|o| o.as_float().ok()).collect();
                return coords.try_into().ok();
            }
            let parent = node.get(b"Parent").and_then(Object::as_reference).ok()?;
            node = self.document.get_dictionary(parent).ok()?;
        }
        None
    }

    // ── Attachments ───────────────────────────────────────────────────────────

    pub fn has_embedded_files(&self) -> bool {
        !self.collect_file_specs().is_empty()
    }

    pub fn count_embedded_files(&self) -> usize {
        self.collect_file_specs().len()
    }

    /// Name-tree keys of every attachment, in tree order.
    pub fn attachment_names(&self) -> Vec<String> {
        self.collect_file_specs()
            .into_iter()
            .map(|(name, _)| name)
            .collect()
    }

    /// Extract every attachment listed in `/Names/EmbeddedFiles`.
    ///
    /// Malformed file specifications are skipped with a warning. Returns
    /// [`GenerateError::NoEmbeddedFiles`] when nothing could be extracted.
    pub fn extract_embedded_files(&self) -> Result<Vec<EmbeddedFile>> {
        let specs = self.collect_file_specs();
        if specs.is_empty() {
            return Err(GenerateError::NoEmbeddedFiles);
        }

        let mut files = Vec::with_capacity(specs.len());
        for (name, spec_id) in specs {
            match self.parse_file_spec(&name, spec_id) {
                Ok(file) => files.push(file),
                Err(e) => tracing::warn!(%name, error = %e, "skipping attachment"),
            }
        }

        if files.is_empty() {
            return Err(GenerateError::NoEmbeddedFiles);
        }
        Ok(files)
    }

    // ── Name tree ─────────────────────────────────────────────────────────────

    fn collect_file_specs(&self) -> Vec<(String, ObjectId)> {
        let Ok(catalog) = self.document.catalog() else {
            return Vec::new();
        };
        let Some(names) = catalog
            .get(b"Names")
            .ok()
            .and_then(|v| resolve_dict(&self.document, v))
        else {
            return Vec::new();
        };
        let Some(root) = names
            .get(b"EmbeddedFiles")
            .ok()
            .and_then(|v| resolve_dict(&self.document, v))
        else {
            return Vec::new();
        };

        let mut out = Vec::new();
        self.walk_name_tree(root, 0, &mut out);
        out
    }

    /// Leaves carry `/Names [key value ...]`, intermediate nodes `/Kids`.
    fn walk_name_tree(&self, node: &Dictionary, depth: usize, out: &mut Vec<(String, ObjectId)>) {
        if depth > MAX_TREE_DEPTH {
            return;
        }

        if let Ok(names) = node.get(b"Names").and_then(Object::as_array) {
            for pair in names.chunks_exact(2) {
                if let (Some(name), Ok(spec_id)) = (decode_key(&pair[0]), pair[1].as_reference()) {
                    out.push((name, spec_id));
                }
            }
        }

        if let Ok(kids) = node.get(b"Kids").and_then(Object::as_array) {
            for kid in kids {
                if let Some(child) = resolve_dict(&self.document, kid) {
                    self.walk_name_tree(child, depth + 1, out);
                }
            }
        }
    }

    // ── File specifications ───────────────────────────────────────────────────

    fn parse_file_spec(&self, name: &str, spec_id: ObjectId) -> Result<EmbeddedFile> {
        let spec = self
            .document
            .get_dictionary(spec_id)
            .map_err(|_| extraction_error(name, "file spec is not a dictionary"))?;

        let ef = spec
            .get(b"EF")
            .ok()
            .and_then(|v| resolve_dict(&self.document, v))
            .ok_or_else(|| extraction_error(name, "missing /EF dictionary"))?;

        // /UF preferred over /F
        let stream_id = ef
            .get(b"UF")
            .or_else(|_| ef.get(b"F"))
            .and_then(Object::as_reference)
            .map_err(|_| extraction_error(name, "/EF has no stream reference"))?;
        let stream = self
            .document
            .get_object(stream_id)
            .and_then(Object::as_stream)
            .map_err(|_| extraction_error(name, "embedded stream object is not a stream"))?;

        let data = stream
            .decompressed_content()
            .unwrap_or_else(|_| stream.content.clone());

        let filename = extract_string_from_dict(spec, b"UF")
            .or_else(|| extract_string_from_dict(spec, b"F"))
            .unwrap_or_else(|| name.to_string());

        Ok(EmbeddedFile {
            filename,
            data,
            metadata: read_metadata(spec, stream),
        })
    }
}

fn extraction_error(name: &str, message: &str) -> GenerateError {
    GenerateError::ExtractionError(name.into(), message.into())
}

fn decode_key(key: &Object) -> Option<String> {
    decode_text_string(key).ok().or_else(|| {
        key.as_str()
            .ok()
            .map(|s| String::from_utf8_lossy(s).into_owned())
    })
}

fn read_metadata(spec: &Dictionary, stream: &Stream) -> EmbeddedFileMetadata {
    let mut metadata = EmbeddedFileMetadata {
        description: extract_string_from_dict(spec, b"Desc"),
        ..Default::default()
    };

    if let Ok(subtype) = stream.dict.get(b"Subtype").and_then(Object::as_name) {
        metadata.mime_type = Some(String::from_utf8_lossy(subtype).into_owned());
    }

    if let Ok(params) = stream.dict.get(b"Params").and_then(Object::as_dict) {
        metadata.modification_date = extract_string_from_dict(params, b"ModDate");
        metadata.size = params
            .get(b"Size")
            .and_then(Object::as_i64)
            .ok()
            .and_then(|n| usize::try_from(n).ok());
    }

    metadata
}
