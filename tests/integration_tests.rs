// Integration tests for cahier-des-charges.
//
// Everything here goes through the public API: documents are generated with
// the built-in catalog (or a small inline one) at a pinned timestamp, then
// read back with PdfInspector.

use cahier_des_charges::{
    assemble, build_template, Catalog, EmbeddedFile, EmbeddedFileMetadata, Field, GenerateError,
    Generator, GeneratorConfig, PdfAssembler, PdfInspector, Renderer, SelectionSet,
    SpreadsheetBuilder, XLSX_MIME_TYPE,
};
use chrono::{NaiveDate, NaiveDateTime};
use std::io::Read;

fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, min, s)
        .unwrap()
}

fn t0() -> NaiveDateTime {
    at(2024, 1, 15, 10, 0, 0)
}

fn builtin() -> Catalog {
    Catalog::builtin().unwrap()
}

fn render(selection: &SelectionSet<'_>) -> Vec<u8> {
    Renderer::new(&GeneratorConfig::default())
        .render(selection, &t0())
        .unwrap()
}

fn field(name: &str) -> Field {
    Field {
        name: name.into(),
        declared_type: "string".into(),
        mandatory: true,
        description: format!("{name} description"),
    }
}

fn contains(haystack: &[u8], needle: &str) -> bool {
    haystack
        .windows(needle.len())
        .any(|w| w == needle.as_bytes())
}

/// Every non-empty subset of `ids`.
fn subsets<'a>(ids: &[&'a str]) -> Vec<Vec<&'a str>> {
    (1u32..(1 << ids.len()))
        .map(|mask| {
            ids.iter()
                .enumerate()
                .filter(|(i, _)| mask & (1 << i) != 0)
                .map(|(_, id)| *id)
                .collect()
        })
        .collect()
}

// ── GeneratorConfig ───────────────────────────────────────────────────────────

#[test]
fn default_config_matches_document_wording() {
    let cfg = GeneratorConfig::default();
    assert_eq!(cfg.title, "Cahier des Charges");
    assert_eq!(cfg.subtitle, "Spécifications des Échanges de Fichiers");
    assert_eq!(cfg.running_header, "Cahier des Charges - Échanges de Fichiers");
    assert!(cfg.describe_attachments);
    assert!(cfg.open_attachments_panel);
}

// ── GenerateError display ─────────────────────────────────────────────────────

#[test]
fn error_display_is_non_empty() {
    let errors: &[GenerateError] = &[
        GenerateError::CatalogLookup("UC999".into()),
        GenerateError::CatalogParse("bad".into()),
        GenerateError::EmptySelection,
        GenerateError::Format("junk".into()),
        GenerateError::NoEmbeddedFiles,
        GenerateError::ExtractionError("f".into(), "reason".into()),
    ];
    for e in errors {
        assert!(!e.to_string().is_empty(), "empty display for {e:?}");
    }
    assert!(GenerateError::CatalogLookup("UC999".into())
        .to_string()
        .contains("UC999"));
}

// ── Catalog ───────────────────────────────────────────────────────────────────

#[test]
fn builtin_catalog_has_five_use_cases() {
    let catalog = builtin();
    assert_eq!(catalog.len(), 5);

    let uc001 = catalog.get("UC001").unwrap();
    assert_eq!(uc001.title, "Import des données clients");
    assert_eq!(uc001.attachment_filename, "template_clients.xlsx");
    assert_eq!(
        uc001.field_names().collect::<Vec<_>>(),
        ["client_id", "nom", "email", "telephone", "date_creation"]
    );
    assert!(!uc001.fields[3].mandatory);
}

#[test]
fn selection_follows_catalog_order_and_collapses_repeats() {
    let catalog = builtin();
    let selection = catalog.select(["UC003", "UC001", "UC003"]).unwrap();
    assert_eq!(selection.ids(), ["UC001", "UC003"]);
}

#[test]
fn unknown_id_is_a_lookup_error() {
    let catalog = builtin();
    match catalog.select(["UC001", "UC999"]) {
        Err(GenerateError::CatalogLookup(id)) => assert_eq!(id, "UC999"),
        other => panic!("expected CatalogLookup, got {other:?}"),
    }
}

#[test]
fn duplicate_catalog_ids_are_rejected() {
    let toml = r#"
        [[usecase]]
        id = "UC001"
        title = "A"
        description = "a"
        attachment_filename = "a.xlsx"

        [[usecase]]
        id = "UC001"
        title = "B"
        description = "b"
        attachment_filename = "b.xlsx"
    "#;
    assert!(matches!(
        Catalog::from_toml_str(toml),
        Err(GenerateError::CatalogParse(_))
    ));
}

#[test]
fn malformed_catalog_is_a_parse_error() {
    assert!(matches!(
        Catalog::from_toml_str("[[usecase]]\nid = 3"),
        Err(GenerateError::CatalogParse(_))
    ));
}

// ── Spreadsheet templates ─────────────────────────────────────────────────────

fn zip_entry(xlsx: &[u8], name: &str) -> String {
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(xlsx)).unwrap();
    let mut entry = archive.by_name(name).unwrap();
    let mut text = String::new();
    entry.read_to_string(&mut text).unwrap();
    text
}

#[test]
fn template_has_exactly_one_header_row() {
    let fields = [field("client_id"), field("nom"), field("email")];
    let xlsx = build_template(&fields).unwrap();

    let sheet = zip_entry(&xlsx, "xl/worksheets/sheet1.xml");
    assert_eq!(sheet.matches("<row ").count(), 1);
    assert!(sheet.contains(r#"<row r="1""#));

    let strings = zip_entry(&xlsx, "xl/sharedStrings.xml");
    let positions: Vec<usize> = ["client_id", "nom", "email"]
        .iter()
        .map(|name| strings.find(&format!(">{name}<")).unwrap())
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));

    let workbook = zip_entry(&xlsx, "xl/workbook.xml");
    assert!(workbook.contains(r#"name="Template""#));
}

#[test]
fn template_without_fields_is_an_empty_sheet() {
    let xlsx = build_template(&[]).unwrap();
    let sheet = zip_entry(&xlsx, "xl/worksheets/sheet1.xml");
    assert_eq!(sheet.matches("<row ").count(), 0);
}

#[test]
fn template_bytes_depend_only_on_inputs() {
    let fields = [field("client_id"), field("nom")];
    assert_eq!(build_template(&fields).unwrap(), build_template(&fields).unwrap());

    let builder = SpreadsheetBuilder::new(t0());
    assert_eq!(builder.build(&fields).unwrap(), builder.build(&fields).unwrap());
}

#[test]
fn template_header_is_styled_and_columns_fit_their_names() {
    let fields = [field("client_id"), field(&"y".repeat(80))];
    let xlsx = build_template(&fields).unwrap();

    let sheet = zip_entry(&xlsx, "xl/worksheets/sheet1.xml");
    assert!(sheet.contains("<cols>"));
    assert!(sheet.contains(r#"width="11.7"#), "client_id column: {sheet}");
    assert!(sheet.contains(r#"width="50.7"#), "long column not capped: {sheet}");

    let styles = zip_entry(&xlsx, "xl/styles.xml");
    assert!(styles.contains("<b/>"));
    assert!(styles.contains(r#"rgb="FFFFFFFF""#));
    assert!(styles.contains(r#"patternType="solid""#));
    assert!(styles.contains(r#"rgb="FF3498DB""#));
    assert!(styles.contains(r#"horizontal="center" vertical="center""#));
}

#[test]
fn template_rejects_years_outside_the_excel_range() {
    let fields = [field("client_id")];
    for year in [70_000, 65_536] {
        let builder = SpreadsheetBuilder::new(at(year, 1, 1, 0, 0, 0));
        assert!(
            matches!(builder.build(&fields), Err(GenerateError::Spreadsheet(_))),
            "year {year} accepted"
        );
    }
}

// ── Renderer ──────────────────────────────────────────────────────────────────

#[test]
fn single_use_case_starts_right_after_the_cover() {
    let catalog = builtin();
    let selection = catalog.select(["UC001"]).unwrap();
    let inspector = PdfInspector::from_bytes(&render(&selection)).unwrap();

    assert_eq!(inspector.page_count(), 2);
    assert!(!contains(&inspector.page_content(1).unwrap(), "UC001"));
    assert!(contains(&inspector.page_content(2).unwrap(), "UC001"));
}

#[test]
fn second_use_case_starts_on_a_new_page() {
    let catalog = builtin();
    let selection = catalog.select(["UC001", "UC002"]).unwrap();
    let inspector = PdfInspector::from_bytes(&render(&selection)).unwrap();

    assert_eq!(inspector.page_count(), 3);
    let page2 = inspector.page_content(2).unwrap();
    let page3 = inspector.page_content(3).unwrap();
    assert!(contains(&page2, "UC001") && !contains(&page2, "UC002"));
    assert!(contains(&page3, "UC002"));
}

#[test]
fn cover_shows_date_and_use_case_count() {
    let catalog = builtin();
    let selection = catalog.select(["UC001", "UC004"]).unwrap();
    let inspector = PdfInspector::from_bytes(&render(&selection)).unwrap();

    let cover = inspector.page_content(1).unwrap();
    assert!(contains(&cover, "15/01/2024"));
    assert!(contains(&cover, "Nombre de use cases : 2"));
    let footer = format!("Page 1 / {}", inspector.page_count());
    assert!(contains(&cover, &footer));
}

#[test]
fn long_table_repeats_its_header_on_the_next_page() {
    let fields: Vec<Field> = (0..80).map(|i| field(&format!("champ_{i:02}"))).collect();
    let uc = cahier_des_charges::UseCase {
        id: "UC100".into(),
        title: "Long".into(),
        description: "Beaucoup de champs.".into(),
        attachment_filename: "long.xlsx".into(),
        fields,
    };
    let selection = SelectionSet::from_use_cases(vec![&uc]);
    let inspector = PdfInspector::from_bytes(&render(&selection)).unwrap();

    assert!(inspector.page_count() > 2);
    for page in 2..=inspector.page_count() as u32 {
        let content = inspector.page_content(page).unwrap();
        if contains(&content, "champ_") {
            assert!(contains(&content, "Nom du champ"), "page {page} lacks the table header");
        }
    }
}

// ── Assembler ─────────────────────────────────────────────────────────────────

#[test]
fn assemble_rejects_junk() {
    assert!(matches!(assemble(b"not a pdf", &[]), Err(GenerateError::Format(_))));
    assert!(matches!(assemble(&[], &[]), Err(GenerateError::Format(_))));
    assert!(matches!(
        PdfAssembler::from_bytes(b"%PDF-1.7\n%%EOF"),
        Err(GenerateError::Format(_))
    ));
}

#[test]
fn attachment_bytes_survive_unchanged() {
    let catalog = builtin();
    let rendered = render(&catalog.select(["UC001"]).unwrap());

    let payload: Vec<u8> = (0..=255u8).cycle().take(4096).collect();
    let file = EmbeddedFile::new("blob.bin", payload.clone()).with_description("raw bytes");
    let pdf = assemble(&rendered, &[file]).unwrap();

    let files = PdfInspector::from_bytes(&pdf)
        .unwrap()
        .extract_embedded_files()
        .unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].filename, "blob.bin");
    assert_eq!(files[0].data, payload);
    assert_eq!(files[0].metadata.description.as_deref(), Some("raw bytes"));
    assert_eq!(files[0].metadata.size, Some(4096));
}

#[test]
fn assembler_keeps_page_count_and_media_box() {
    let catalog = builtin();
    let rendered = render(&catalog.select(["UC001", "UC002"]).unwrap());

    let assembler = PdfAssembler::from_bytes(&rendered).unwrap();
    assert_eq!(assembler.page_count(), 3);
    assert_eq!(assembler.attachment_count(), 0);
    let pdf = assembler.finish().unwrap();

    let inspector = PdfInspector::from_bytes(&pdf).unwrap();
    assert!(inspector.is_pdf().unwrap());
    assert_eq!(inspector.page_count(), 3);
    assert!(!inspector.has_embedded_files());
    for page in 1..=3 {
        let media_box = inspector.media_box(page).unwrap();
        assert!((media_box[2] - 595.28).abs() < 0.01);
        assert!((media_box[3] - 841.89).abs() < 0.01);
    }
}

#[test]
fn rendered_page_content_is_carried_over_unchanged() {
    let catalog = builtin();
    let selection = catalog.select(["UC001", "UC002", "UC005"]).unwrap();
    let rendered = render(&selection);
    let pdf = assemble(&rendered, &[EmbeddedFile::xlsx("t.xlsx", vec![7; 32])]).unwrap();

    let before = PdfInspector::from_bytes(&rendered).unwrap();
    let after = PdfInspector::from_bytes(&pdf).unwrap();
    assert_eq!(after.page_count(), before.page_count());
    for page in 1..=before.page_count() as u32 {
        assert_eq!(
            after.page_content(page).unwrap(),
            before.page_content(page).unwrap(),
            "page {page} changed"
        );
    }
}

#[test]
fn nested_page_tree_is_flattened_with_inherited_attributes() {
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Document, Object, Stream};

    let mut doc = Document::with_version("1.7");
    let root_pages = doc.new_object_id();
    let inner_pages = doc.new_object_id();
    let content = Content {
        operations: vec![Operation::new("re", vec![0.into(), 0.into(), 10.into(), 10.into()])],
    };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => inner_pages,
        "Contents" => content_id,
    });
    doc.objects.insert(
        inner_pages,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Parent" => root_pages,
            "Kids" => vec![Object::from(page_id)],
            "Count" => 1,
        }),
    );
    doc.objects.insert(
        root_pages,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::from(inner_pages)],
            "Count" => 1,
            "MediaBox" => vec![Object::from(0), 0.into(), 200.into(), 300.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => root_pages });
    doc.trailer.set("Root", catalog_id);
    let mut source = Vec::new();
    doc.save_to(&mut source).unwrap();

    let pdf = assemble(&source, &[EmbeddedFile::new("a.txt", b"a".to_vec())]).unwrap();
    let inspector = PdfInspector::from_bytes(&pdf).unwrap();
    assert_eq!(inspector.page_count(), 1);
    assert_eq!(inspector.media_box(1), Some([0.0, 0.0, 200.0, 300.0]));
    assert_eq!(inspector.page_content(1).unwrap(), content.encode().unwrap());
}

#[test]
fn name_tree_is_sorted_and_keeps_duplicates() {
    let catalog = builtin();
    let rendered = render(&catalog.select(["UC001"]).unwrap());
    let files = [
        EmbeddedFile::new("b.xlsx", b"first b".to_vec()),
        EmbeddedFile::new("a.xlsx", b"a".to_vec()),
        EmbeddedFile::new("b.xlsx", b"second b".to_vec()),
    ];
    let pdf = assemble(&rendered, &files).unwrap();

    let inspector = PdfInspector::from_bytes(&pdf).unwrap();
    assert_eq!(inspector.attachment_names(), ["a.xlsx", "b.xlsx", "b.xlsx"]);

    let data: Vec<Vec<u8>> = inspector
        .extract_embedded_files()
        .unwrap()
        .into_iter()
        .map(|f| f.data)
        .collect();
    assert_eq!(data, [b"a".to_vec(), b"first b".to_vec(), b"second b".to_vec()]);
}

#[test]
fn name_tree_keys_are_in_encoded_byte_order() {
    let catalog = builtin();
    let rendered = render(&catalog.select(["UC001"]).unwrap());
    let files = [
        EmbeddedFile::new("b.xlsx", b"b".to_vec()),
        EmbeddedFile::new("aé.xlsx", b"a".to_vec()),
        EmbeddedFile::new("c.xlsx", b"c".to_vec()),
    ];
    let pdf = assemble(&rendered, &files).unwrap();

    let inspector = PdfInspector::from_bytes(&pdf).unwrap();
    let doc = inspector.document();
    let names = doc.catalog().unwrap().get(b"Names").unwrap().as_dict().unwrap();
    let tree_id = names.get(b"EmbeddedFiles").unwrap().as_reference().unwrap();
    let leaf = doc
        .get_dictionary(tree_id)
        .unwrap()
        .get(b"Names")
        .unwrap()
        .as_array()
        .unwrap();

    let keys: Vec<Vec<u8>> = leaf
        .iter()
        .step_by(2)
        .map(|key| key.as_str().unwrap().to_vec())
        .collect();
    let mut sorted = keys.clone();
    sorted.sort();
    assert_eq!(keys.len(), 3);
    assert_eq!(keys, sorted);

    let mut found = inspector.attachment_names();
    found.sort();
    assert_eq!(found, ["aé.xlsx", "b.xlsx", "c.xlsx"]);
}

#[test]
fn attachments_panel_follows_config() {
    let catalog = builtin();
    let rendered = render(&catalog.select(["UC001"]).unwrap());
    let file = EmbeddedFile::xlsx("t.xlsx", vec![1, 2, 3]);

    let page_mode = |config: &GeneratorConfig| {
        let mut assembler = PdfAssembler::with_config(&rendered, config).unwrap();
        assembler.attach(&file);
        let pdf = assembler.finish().unwrap();
        let inspector = PdfInspector::from_bytes(&pdf).unwrap();
        inspector
            .document()
            .catalog()
            .unwrap()
            .get(b"PageMode")
            .and_then(|o| o.as_name())
            .map(|n| n.to_vec())
            .ok()
    };

    assert_eq!(page_mode(&GeneratorConfig::default()), Some(b"UseAttachments".to_vec()));
    let closed = GeneratorConfig {
        open_attachments_panel: false,
        ..Default::default()
    };
    assert_eq!(page_mode(&closed), None);
}

// ── Generator ─────────────────────────────────────────────────────────────────

#[test]
fn every_selection_keeps_pages_and_attachment_names() {
    let catalog = builtin();
    let generator = Generator::new(&catalog);
    let ids: Vec<&str> = catalog.iter().map(|uc| uc.id.as_str()).collect();

    for subset in subsets(&ids) {
        let selection = catalog.select(&subset).unwrap();
        let rendered_pages = PdfInspector::from_bytes(&render(&selection))
            .unwrap()
            .page_count();

        let document = generator.generate(&selection, t0()).unwrap();
        let inspector = PdfInspector::from_bytes(&document.data).unwrap();
        assert_eq!(inspector.page_count(), rendered_pages, "pages for {subset:?}");

        let mut names = inspector.attachment_names();
        names.sort();
        let mut expected: Vec<String> = selection
            .attachment_filenames()
            .into_iter()
            .map(String::from)
            .collect();
        expected.sort();
        assert_eq!(names, expected, "attachments for {subset:?}");
    }
}

#[test]
fn generation_is_byte_identical_for_a_fixed_timestamp() {
    let catalog = builtin();
    let generator = Generator::new(&catalog);
    let first = generator.generate_ids(["UC001", "UC003", "UC005"], t0()).unwrap();
    let second = generator.generate_ids(["UC001", "UC003", "UC005"], t0()).unwrap();
    assert_eq!(first.data, second.data);

    let later = generator
        .generate_ids(["UC001", "UC003", "UC005"], at(2024, 1, 16, 10, 0, 0))
        .unwrap();
    assert_ne!(first.data, later.data);
}

#[test]
fn uc001_end_to_end() {
    let catalog = builtin();
    let document = Generator::new(&catalog)
        .generate_ids(["UC001"], t0())
        .unwrap();

    assert_eq!(document.filename, "cahier_des_charges_20240115_100000.pdf");
    assert_eq!(document.content_type, "application/pdf");
    assert_eq!(document.attachments, ["template_clients.xlsx"]);

    let inspector = PdfInspector::from_bytes(&document.data).unwrap();
    assert!(inspector.is_pdf().unwrap());
    assert_eq!(inspector.count_embedded_files(), 1);

    let files = inspector.extract_embedded_files().unwrap();
    assert_eq!(files[0].filename, "template_clients.xlsx");
    assert!(files[0].has_extension("xlsx"));
    assert!(files[0].metadata.has_mime_type(XLSX_MIME_TYPE));
    assert_eq!(
        files[0].metadata.description.as_deref(),
        Some("Template Excel - Import des données clients")
    );

    let strings = zip_entry(&files[0].data, "xl/sharedStrings.xml");
    for name in ["client_id", "nom", "email", "telephone", "date_creation"] {
        assert!(strings.contains(&format!(">{name}<")), "{name} missing from template");
    }

    let section = inspector.page_content(2).unwrap();
    assert!(contains(&section, "UC001"));
    assert!(contains(&section, "client_id"));
    assert!(contains(&section, "template_clients.xlsx"));
}

#[test]
fn unknown_id_fails_before_rendering() {
    let catalog = builtin();
    match Generator::new(&catalog).generate_ids(["UC999"], t0()) {
        Err(GenerateError::CatalogLookup(id)) => assert_eq!(id, "UC999"),
        other => panic!("expected CatalogLookup, got {other:?}"),
    }
}

#[test]
fn empty_selection_is_rejected() {
    let catalog = builtin();
    let generator = Generator::new(&catalog);
    assert!(matches!(
        generator.generate(&SelectionSet::default(), t0()),
        Err(GenerateError::EmptySelection)
    ));
    assert!(matches!(
        generator.generate_ids(Vec::<&str>::new(), t0()),
        Err(GenerateError::EmptySelection)
    ));
}

#[test]
fn duplicate_attachment_filenames_are_both_embedded() {
    let toml = r#"
        [[usecase]]
        id = "UC001"
        title = "Premier"
        description = "Premier flux."
        attachment_filename = "template.xlsx"
        [[usecase.fields]]
        name = "a"
        type = "string"
        mandatory = true
        description = "A"

        [[usecase]]
        id = "UC002"
        title = "Second"
        description = "Second flux."
        attachment_filename = "template.xlsx"
        [[usecase.fields]]
        name = "b"
        type = "integer"
        mandatory = false
        description = "B"
    "#;
    let catalog = Catalog::from_toml_str(toml).unwrap();
    let document = Generator::new(&catalog)
        .generate_ids(["UC001", "UC002"], t0())
        .unwrap();

    let inspector = PdfInspector::from_bytes(&document.data).unwrap();
    assert_eq!(inspector.attachment_names(), ["template.xlsx", "template.xlsx"]);

    let files = inspector.extract_embedded_files().unwrap();
    assert_eq!(
        files[0].metadata.description.as_deref(),
        Some("Template Excel - Premier")
    );
    assert!(zip_entry(&files[0].data, "xl/sharedStrings.xml").contains(">a<"));
    assert!(zip_entry(&files[1].data, "xl/sharedStrings.xml").contains(">b<"));
}

#[test]
fn use_case_without_fields_still_generates() {
    let toml = r#"
        [[usecase]]
        id = "UC010"
        title = "Sans champs"
        description = "Aucun champ attendu."
        attachment_filename = "vide.xlsx"
    "#;
    let catalog = Catalog::from_toml_str(toml).unwrap();
    let document = Generator::new(&catalog)
        .generate_ids(["UC010"], t0())
        .unwrap();

    let inspector = PdfInspector::from_bytes(&document.data).unwrap();
    assert_eq!(inspector.page_count(), 2);
    let files = inspector.extract_embedded_files().unwrap();
    assert_eq!(files[0].filename, "vide.xlsx");
    let sheet = zip_entry(&files[0].data, "xl/worksheets/sheet1.xml");
    assert_eq!(sheet.matches("<row ").count(), 0);
}

#[test]
fn descriptions_can_be_turned_off() {
    let catalog = builtin();
    let config = GeneratorConfig {
        describe_attachments: false,
        ..Default::default()
    };
    let document = Generator::with_config(&catalog, config)
        .generate_ids(["UC002"], t0())
        .unwrap();
    let files = PdfInspector::from_bytes(&document.data)
        .unwrap()
        .extract_embedded_files()
        .unwrap();
    assert_eq!(files[0].metadata.description, None);
}

// ── Inspector ─────────────────────────────────────────────────────────────────

#[test]
fn inspector_rejects_non_pdf() {
    assert!(matches!(PdfInspector::from_bytes(&[]), Err(GenerateError::Format(_))));
    assert!(matches!(
        PdfInspector::from_bytes(b"not a pdf"),
        Err(GenerateError::Format(_))
    ));
}

#[test]
fn document_without_attachments_reports_none() {
    let catalog = builtin();
    let rendered = render(&catalog.select(["UC001"]).unwrap());
    let inspector = PdfInspector::from_bytes(&rendered).unwrap();

    assert!(!inspector.has_embedded_files());
    assert_eq!(inspector.count_embedded_files(), 0);
    assert!(matches!(
        inspector.extract_embedded_files(),
        Err(GenerateError::NoEmbeddedFiles)
    ));
    assert!(matches!(inspector.page_content(9), Err(GenerateError::Format(_))));
}

// ── Disk output ───────────────────────────────────────────────────────────────

fn make_file(filename: &str, data: &[u8]) -> EmbeddedFile {
    EmbeddedFile {
        filename: filename.into(),
        data: data.to_vec(),
        metadata: EmbeddedFileMetadata::default(),
    }
}

#[test]
fn extension_none_when_no_dot() {
    assert_eq!(make_file("readme", b"").extension(), None);
}

#[test]
fn save_to_disk_creates_file() {
    let dir = tempfile::tempdir().unwrap();
    let file = make_file("test.txt", b"hello world");
    file.save_to_disk(dir.path().join("nested")).unwrap();

    let written = std::fs::read(dir.path().join("nested").join("test.txt")).unwrap();
    assert_eq!(written, b"hello world");
}

#[test]
fn generated_document_saves_under_its_filename() {
    let catalog = builtin();
    let document = Generator::new(&catalog)
        .generate_ids(["UC004"], at(2023, 12, 31, 23, 59, 58))
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = document.save_to_dir(dir.path()).unwrap();
    assert_eq!(
        path.file_name().unwrap().to_str(),
        Some("cahier_des_charges_20231231_235958.pdf")
    );
    assert_eq!(std::fs::read(&path).unwrap(), document.data);
}
