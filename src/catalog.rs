use crate::{GenerateError, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

const BUILTIN_CATALOG: &str = include_str!("../data/usecases.toml");

// ── Field / UseCase ──────────────────────────────────────────────────────────

/// One expected column of a use case's exchange file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Field {
    /// Column name, used verbatim as the spreadsheet header.
    pub name: String,

    /// Free-form declared type (e.g. `"Integer"`, `"String(100)"`).
    #[serde(rename = "type")]
    pub declared_type: String,

    pub mandatory: bool,

    pub description: String,
}

/// A named data-exchange contract: description plus ordered field list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UseCase {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Name under which the spreadsheet template is embedded in the PDF.
    pub attachment_filename: String,
    #[serde(default)]
    pub fields: Vec<Field>,
}

impl UseCase {
    /// Field names in declaration order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }
}

// ── Catalog ──────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct CatalogFile {
    #[serde(default, rename = "usecase")]
    use_cases: Vec<UseCase>,
}

/// The read-only table of known use cases, in display order.
///
/// ```
/// use cahier_des_charges::Catalog;
///
/// let catalog = Catalog::builtin().unwrap();
/// assert_eq!(catalog.len(), 5);
/// assert_eq!(catalog.get("UC001").unwrap().attachment_filename, "template_clients.xlsx");
/// ```
#[derive(Debug, Clone)]
pub struct Catalog {
    use_cases: Vec<UseCase>,
}

impl Catalog {
    /// The catalog bundled with the crate (UC001 to UC005).
    pub fn builtin() -> Result<Self> {
        Self::from_toml_str(BUILTIN_CATALOG)
    }

    /// Parse a catalog from TOML (`[[usecase]]` tables with nested
    /// `[[usecase.fields]]`).
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let file: CatalogFile = toml::from_str(source)?;
        Self::from_use_cases(file.use_cases)
    }

    /// Load a catalog file from the file system.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Build a catalog from use cases already in memory. Ids must be unique.
    pub fn from_use_cases(use_cases: Vec<UseCase>) -> Result<Self> {
        let mut seen = HashSet::new();
        for uc in &use_cases {
            if !seen.insert(uc.id.as_str()) {
                return Err(GenerateError::CatalogParse(format!(
                    "duplicate use case id '{}'",
                    uc.id
                )));
            }
        }
        Ok(Self { use_cases })
    }

    pub fn get(&self, id: &str) -> Option<&UseCase> {
        self.use_cases.iter().find(|uc| uc.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &UseCase> {
        self.use_cases.iter()
    }

    pub fn len(&self) -> usize {
        self.use_cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.use_cases.is_empty()
    }

    /// Resolve requested ids into a [`SelectionSet`].
    ///
    /// Every id must exist; the first unknown one is reported as
    /// [`GenerateError::CatalogLookup`]. Repeated ids collapse, and the
    /// result follows catalog order whatever order the ids came in.
    pub fn select<I, S>(&self, ids: I) -> Result<SelectionSet<'_>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut wanted = HashSet::new();
        for id in ids {
            let id = id.as_ref();
            let uc = self
                .get(id)
                .ok_or_else(|| GenerateError::CatalogLookup(id.to_string()))?;
            wanted.insert(uc.id.as_str());
        }

        let use_cases = self
            .use_cases
            .iter()
            .filter(|uc| wanted.contains(uc.id.as_str()))
            .collect();

        Ok(SelectionSet { use_cases })
    }
}

// ── SelectionSet ─────────────────────────────────────────────────────────────

/// The use cases chosen for one generation request, in catalog order.
#[derive(Debug, Clone, Default)]
pub struct SelectionSet<'a> {
    use_cases: Vec<&'a UseCase>,
}

impl<'a> SelectionSet<'a> {
    /// Wrap use cases the caller already holds. Order is kept as given.
    pub fn from_use_cases(use_cases: Vec<&'a UseCase>) -> Self {
        Self { use_cases }
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a UseCase> + '_ {
        self.use_cases.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.use_cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.use_cases.is_empty()
    }

    pub fn ids(&self) -> Vec<&'a str> {
        self.use_cases.iter().map(|uc| uc.id.as_str()).collect()
    }

    /// Attachment filenames in embedding order (duplicates kept).
    pub fn attachment_filenames(&self) -> Vec<&'a str> {
        self.use_cases
            .iter()
            .map(|uc| uc.attachment_filename.as_str())
            .collect()
    }
}
