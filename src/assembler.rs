use crate::catalog::{SelectionSet, UseCase};
use crate::pdf_utils::inherit_page_attributes;
use crate::validator::PdfValidator;
use crate::{EmbeddedFile, GenerateError, GeneratorConfig, Result};
use lopdf::{dictionary, text_string, Dictionary, Document, Object, ObjectId, Stream};

// ── PdfAssembler ──────────────────────────────────────────────────────────────

/// Copies the pages of a rendered PDF into a fresh container and embeds
/// files in it as attachments.
///
/// Pages are carried over object-for-object: content streams, resources and
/// page size are not touched. Only the page tree and the catalog are rebuilt,
/// the latter with a `/Names/EmbeddedFiles` name tree listing every attached
/// file.
///
/// ```no_run
/// use cahier_des_charges::{EmbeddedFile, PdfAssembler};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let rendered = std::fs::read("rendered.pdf")?;
/// let mut assembler = PdfAssembler::from_bytes(&rendered)?;
/// assembler.attach(&EmbeddedFile::xlsx("template_clients.xlsx", std::fs::read("t.xlsx")?));
/// let pdf = assembler.finish()?;
/// # Ok(())
/// # }
/// ```
pub struct PdfAssembler {
    output: Document,
    pages_id: ObjectId,
    page_count: usize,
    /// `(filename, file spec id)` in attachment order.
    attachments: Vec<(String, ObjectId)>,
    open_attachments_panel: bool,
}

impl PdfAssembler {
    // ── Constructors ──────────────────────────────────────────────────────────

    /// Parse `rendered` and copy its pages, with the default configuration.
    pub fn from_bytes(rendered: &[u8]) -> Result<Self> {
        Self::with_config(rendered, &GeneratorConfig::default())
    }

    /// Parse `rendered` and copy its pages.
    ///
    /// Returns [`GenerateError::Format`] when the bytes are not a readable
    /// PDF with a catalog and at least one page.
    pub fn with_config(rendered: &[u8], config: &GeneratorConfig) -> Result<Self> {
        let source = Document::load_mem(rendered)
            .map_err(|e| GenerateError::Format(format!("cannot parse rendered PDF: {e}")))?;
        PdfValidator::new(&source).validate_pdf_structure()?;

        let catalog_id = source
            .trailer
            .get(b"Root")
            .and_then(Object::as_reference)
            .map_err(|_| GenerateError::Format("trailer has no /Root reference".into()))?;

        // Flatten inherited attributes first: the old page tree nodes are
        // not carried over.
        let page_ids: Vec<ObjectId> = source.get_pages().into_values().collect();
        let mut pages = Vec::with_capacity(page_ids.len());
        for &page_id in &page_ids {
            let mut page = source
                .get_dictionary(page_id)
                .map_err(|e| GenerateError::Format(format!("page {page_id:?} is unreadable: {e}")))?
                .clone();
            inherit_page_attributes(&source, &mut page);
            pages.push((page_id, page));
        }

        let mut output = Document::with_version(source.version.clone());
        for (&id, object) in &source.objects {
            if id == catalog_id || is_structural(object) {
                continue;
            }
            output.objects.insert(id, object.clone());
        }
        output.max_id = source.max_id;

        let pages_id = output.new_object_id();
        for (page_id, mut page) in pages {
            page.set("Parent", pages_id);
            output.objects.insert(page_id, Object::Dictionary(page));
        }
        let kids: Vec<Object> = page_ids.iter().map(|&id| id.into()).collect();
        output.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => page_ids.len() as i64,
            }),
        );

        if let Ok(info) = source.trailer.get(b"Info") {
            output.trailer.set("Info", info.clone());
        }

        tracing::debug!(pages = page_ids.len(), "copied rendered pages");

        Ok(Self {
            output,
            pages_id,
            page_count: page_ids.len(),
            attachments: Vec::new(),
            open_attachments_panel: config.open_attachments_panel,
        })
    }

    // ── Accessors ─────────────────────────────────────────────────────────────

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    pub fn attachment_count(&self) -> usize {
        self.attachments.len()
    }

    // ── Attachments ───────────────────────────────────────────────────────────

    /// Embed `file` and return the id of its file specification.
    ///
    /// The bytes are stored verbatim in an uncompressed `/EmbeddedFile`
    /// stream. Names are not deduplicated: attaching two files with the same
    /// filename embeds both.
    pub fn attach(&mut self, file: &EmbeddedFile) -> ObjectId {
        let mut params = dictionary! { "Size" => file.data.len() as i64 };
        if let Some(date) = &file.metadata.modification_date {
            params.set("ModDate", Object::string_literal(date.as_str()));
        }

        let mut stream_dict = dictionary! {
            "Type" => "EmbeddedFile",
            "Params" => params,
        };
        if let Some(mime) = &file.metadata.mime_type {
            stream_dict.set("Subtype", Object::Name(mime.as_bytes().to_vec()));
        }
        let stream_id = self
            .output
            .add_object(Stream::new(stream_dict, file.data.clone()).with_compression(false));

        let mut spec = dictionary! {
            "Type" => "Filespec",
            "F" => text_string(&file.filename),
            "UF" => text_string(&file.filename),
            "AFRelationship" => "Supplement",
            "EF" => dictionary! {
                "F" => stream_id,
                "UF" => stream_id,
            },
        };
        if let Some(description) = &file.metadata.description {
            spec.set("Desc", text_string(description));
        }
        let spec_id = self.output.add_object(spec);

        tracing::debug!(filename = %file.filename, bytes = file.data.len(), "embedded file");
        self.attachments.push((file.filename.clone(), spec_id));
        spec_id
    }

    // ── Output ────────────────────────────────────────────────────────────────

    /// Write the catalog and serialise the document.
    pub fn finish(mut self) -> Result<Vec<u8>> {
        let mut catalog = dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        };

        if !self.attachments.is_empty() {
            let tree_id = self.output.add_object(self.name_tree());
            catalog.set("Names", dictionary! { "EmbeddedFiles" => tree_id });

            let associated: Vec<Object> = self.attachments.iter().map(|(_, id)| (*id).into()).collect();
            catalog.set("AF", associated);

            if self.open_attachments_panel {
                catalog.set("PageMode", "UseAttachments");
            }
        }

        let catalog_id = self.output.add_object(catalog);
        self.output.trailer.set("Root", catalog_id);

        let mut buffer = Vec::new();
        self.output.save_to(&mut buffer)?;
        tracing::debug!(
            pages = self.page_count,
            attachments = self.attachments.len(),
            bytes = buffer.len(),
            "assembled document"
        );
        Ok(buffer)
    }

    /// Single-leaf name tree. Keys are ordered by their encoded bytes; the
    /// sort is stable so files sharing a name keep their attachment order.
    fn name_tree(&self) -> Dictionary {
        let mut entries: Vec<(Object, ObjectId)> = self
            .attachments
            .iter()
            .map(|(name, id)| (text_string(name), *id))
            .collect();
        entries.sort_by(|a, b| a.0.as_str().ok().cmp(&b.0.as_str().ok()));

        let names: Vec<Object> = entries
            .into_iter()
            .flat_map(|(key, id)| [key, Object::Reference(id)])
            .collect();

        dictionary! { "Names" => names }
    }
}

/// Page tree nodes and cross-reference machinery are rebuilt, never copied.
fn is_structural(object: &Object) -> bool {
    object
        .type_name()
        .map(|name| matches!(name, b"Pages" | b"XRef" | b"ObjStm"))
        .unwrap_or(false)
}

// ── Convenience entry points ──────────────────────────────────────────────────

/// Copy the pages of `rendered` and embed every file of `attachments`, in
/// order.
pub fn assemble(rendered: &[u8], attachments: &[EmbeddedFile]) -> Result<Vec<u8>> {
    let mut assembler = PdfAssembler::from_bytes(rendered)?;
    for file in attachments {
        assembler.attach(file);
    }
    assembler.finish()
}

/// Embed one spreadsheet per selected use case, named by its attachment
/// filename, in selection order.
///
/// `rendered` is parsed before any artifact is requested, so an unreadable
/// document fails without calling `artifact_of`.
pub fn assemble_selection<F>(
    rendered: &[u8],
    selection: &SelectionSet<'_>,
    config: &GeneratorConfig,
    mut artifact_of: F,
) -> Result<Vec<u8>>
where
    F: FnMut(&UseCase) -> Result<Vec<u8>>,
{
    let mut assembler = PdfAssembler::with_config(rendered, config)?;

    for uc in selection.iter() {
        let mut file = EmbeddedFile::xlsx(uc.attachment_filename.as_str(), artifact_of(uc)?);
        if config.describe_attachments {
            file = file.with_description(format!("Template Excel - {}", uc.title));
        }
        assembler.attach(&file);
    }

    assembler.finish()
}
