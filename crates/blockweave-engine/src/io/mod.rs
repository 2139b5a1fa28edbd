use blockweave_config::{Config, ConfigError};
use relative_path::{RelativePath, RelativePathBuf};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid notes directory: {0}")]
    InvalidNotesDir(String),
    #[error("Path is not inside the notes directory: {0}")]
    OutsideRoot(PathBuf),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Where documents come from. The engine only lists and reads; it never writes.
pub trait DocumentSource {
    /// Every document path, sorted.
    fn list(&self) -> Result<Vec<RelativePathBuf>, IoError>;

    fn read(&self, path: &RelativePath) -> Result<String, IoError>;

    fn modified(&self, path: &RelativePath) -> Result<SystemTime, IoError>;
}

/// Markdown files under a notes directory.
#[derive(Debug, Clone)]
pub struct FsSource {
    root: PathBuf,
    exclude: Vec<glob::Pattern>,
}

impl FsSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            exclude: Vec::new(),
        }
    }

    /// Uses the configured notes path and exclusion globs.
    pub fn from_config(config: &Config) -> Result<Self, IoError> {
        Ok(Self {
            root: config.notes_path.clone(),
            exclude: config.exclude_patterns()?,
        })
    }

    #[must_use]
    pub fn with_exclude(mut self, patterns: Vec<glob::Pattern>) -> Self {
        self.exclude = patterns;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn is_excluded(&self, path: &RelativePath) -> bool {
        self.exclude.iter().any(|p| p.matches(path.as_str()))
    }
}

impl DocumentSource for FsSource {
    fn list(&self) -> Result<Vec<RelativePathBuf>, IoError> {
        let mut documents = Vec::new();
        for file in scan_markdown_files(&self.root)? {
            let relative = file
                .strip_prefix(&self.root)
                .ok()
                .and_then(|p| RelativePathBuf::from_path(p).ok())
                .ok_or_else(|| IoError::OutsideRoot(file.clone()))?;
            if self.is_excluded(&relative) {
                log::debug!("excluded {relative}");
                continue;
            }
            documents.push(relative);
        }
        Ok(documents)
    }

    fn read(&self, path: &RelativePath) -> Result<String, IoError> {
        read_file(path, &self.root)
    }

    fn modified(&self, path: &RelativePath) -> Result<SystemTime, IoError> {
        let absolute_path = path.to_path(&self.root);
        if !absolute_path.exists() {
            return Err(IoError::NotFound(absolute_path));
        }
        Ok(fs::metadata(&absolute_path)?.modified()?)
    }
}

/// Documents held in memory, for embedders and tests.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    documents: BTreeMap<RelativePathBuf, (String, SystemTime)>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<RelativePathBuf>, text: impl Into<String>) {
        self.documents
            .insert(path.into(), (text.into(), SystemTime::now()));
    }

    #[must_use]
    pub fn with(mut self, path: impl Into<RelativePathBuf>, text: impl Into<String>) -> Self {
        self.insert(path, text);
        self
    }
}

impl DocumentSource for MemorySource {
    fn list(&self) -> Result<Vec<RelativePathBuf>, IoError> {
        Ok(self.documents.keys().cloned().collect())
    }

    fn read(&self, path: &RelativePath) -> Result<String, IoError> {
        self.documents
            .get(path)
            .map(|(text, _)| text.clone())
            .ok_or_else(|| IoError::NotFound(path.to_path("")))
    }

    fn modified(&self, path: &RelativePath) -> Result<SystemTime, IoError> {
        self.documents
            .get(path)
            .map(|(_, modified)| *modified)
            .ok_or_else(|| IoError::NotFound(path.to_path("")))
    }
}

/// Read a markdown file and return its content
pub fn read_file(relative_path: &RelativePath, notes_root: &Path) -> Result<String, IoError> {
    let absolute_path = relative_path.to_path(notes_root);
    if !absolute_path.exists() {
        return Err(IoError::NotFound(absolute_path));
    }
    fs::read_to_string(&absolute_path).map_err(IoError::Io)
}

/// Scan for markdown files in the notes directory
pub fn scan_markdown_files(notes_root: &Path) -> Result<Vec<PathBuf>, IoError> {
    validate_notes_dir(notes_root)?;

    let mut files = Vec::new();
    scan_directory_recursive(notes_root, &mut files)?;
    files.sort();
    Ok(files)
}

fn scan_directory_recursive(dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), IoError> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();

        if path.is_dir() {
            scan_directory_recursive(&path, files)?;
        } else if let Some(ext) = path.extension()
            && ext == "md"
        {
            files.push(path);
        }
    }

    Ok(())
}

pub fn validate_notes_dir(path: &Path) -> Result<(), IoError> {
    if !path.is_dir() {
        return Err(IoError::InvalidNotesDir(format!(
            "notes directory not found: {}",
            path.display()
        )));
    }
    Ok(())
}

/// Document name for a path: the file name without `.md`.
pub fn document_name(path: &RelativePath) -> String {
    path.file_name()
        .map(|name| name.strip_suffix(".md").unwrap_or(name))
        .unwrap_or("Untitled")
        .to_string()
}

/// File name a page with `title` is stored under.
///
/// Lowercased, with spaces and `/ \ :` replaced by `-`.
pub fn title_to_filename(title: &str) -> String {
    let stem: String = title
        .to_lowercase()
        .chars()
        .map(|c| match c {
            ' ' | '/' | '\\' | ':' => '-',
            other => other,
        })
        .collect();
    format!("{stem}.md")
}
