//! Batch parsing of many documents into pages plus one backlink index.

use blockweave_config::Config;
use relative_path::RelativePathBuf;
use std::collections::BTreeMap;

use crate::index::BacklinkIndex;
use crate::io::{DocumentSource, FsSource, IoError, document_name};
use crate::models::Page;
use crate::parsing::{Diagnostic, ParseOptions, parse_document};

/// A problem with one document. The rest of the batch is unaffected.
#[derive(Debug, thiserror::Error)]
pub enum CollectionError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: RelativePathBuf,
        source: IoError,
    },
    #[error("page '{name}' from {document} replaces an earlier page with the same name")]
    DuplicatePage { name: String, document: String },
}

#[derive(Debug, Default)]
pub struct Collection {
    /// Keyed by page name (title, or document name without one).
    pub pages: BTreeMap<String, Page>,
    /// Source path of each page loaded through a [`DocumentSource`].
    pub paths: BTreeMap<String, RelativePathBuf>,
    pub backlinks: BacklinkIndex,
    /// Only documents with something to report.
    pub diagnostics: BTreeMap<String, Vec<Diagnostic>>,
    pub errors: Vec<CollectionError>,
}

impl Collection {
    /// Page by name, falling back to a case-insensitive match.
    pub fn page(&self, name: &str) -> Option<&Page> {
        self.pages.get(name).or_else(|| {
            let lower = name.to_lowercase();
            self.pages
                .iter()
                .find(|(k, _)| k.to_lowercase() == lower)
                .map(|(_, page)| page)
        })
    }

    /// Loads the notes directory named in `config`.
    pub fn from_config(config: &Config) -> Result<Self, IoError> {
        let source = FsSource::from_config(config)?;
        load_collection(&source, &ParseOptions::from(config))
    }

    fn add(&mut self, document: &str, text: &str, options: &ParseOptions) -> String {
        let result = parse_document(document, text, options);
        let name = result.page.page_name().to_string();

        if !result.diagnostics.is_empty() {
            self.diagnostics
                .insert(document.to_string(), result.diagnostics);
        }
        if self.pages.insert(name.clone(), result.page).is_some() {
            log::warn!("duplicate page name '{name}' in {document}");
            self.errors.push(CollectionError::DuplicatePage {
                name: name.clone(),
                document: document.to_string(),
            });
        }
        name
    }

    fn index(&mut self) {
        self.backlinks.rebuild(self.pages.values());
    }
}

/// Parses `(document name, text)` pairs.
pub fn parse_collection<I, N, T>(documents: I, options: &ParseOptions) -> Collection
where
    I: IntoIterator<Item = (N, T)>,
    N: AsRef<str>,
    T: AsRef<str>,
{
    let mut collection = Collection::default();
    for (name, text) in documents {
        collection.add(name.as_ref(), text.as_ref(), options);
    }
    collection.index();
    collection
}

/// Lists and parses every document of `source`.
///
/// Documents that cannot be read are reported in [`Collection::errors`] and skipped.
/// Only a failure to list the source is returned as `Err`.
pub fn load_collection(
    source: &impl DocumentSource,
    options: &ParseOptions,
) -> Result<Collection, IoError> {
    let mut collection = Collection::default();

    for path in source.list()? {
        let text = match source.read(&path) {
            Ok(text) => text,
            Err(err) => {
                log::warn!("skipping {path}: {err}");
                collection
                    .errors
                    .push(CollectionError::Read { path, source: err });
                continue;
            }
        };
        let name = collection.add(&document_name(&path), &text, options);
        collection.paths.insert(name, path);
    }

    collection.index();
    log::debug!(
        "loaded {} pages with {} references, {} errors",
        collection.pages.len(),
        collection.backlinks.reference_count(),
        collection.errors.len()
    );
    Ok(collection)
}
