use std::path::PathBuf;

/// Outcome of writing a bundle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportReport {
    /// Bundle directory or zip archive that was written.
    pub path: PathBuf,
    /// File name and number of data rows written, in bundle order.
    pub files: Vec<(&'static str, usize)>,
}

impl ExportReport {
    pub fn total_rows(&self) -> usize {
        self.files.iter().map(|(_, rows)| rows).sum()
    }
}

/// Per-file import counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileImport {
    pub file: &'static str,
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
    /// False when the file was absent or its header did not match.
    pub read: bool,
}

impl FileImport {
    pub(crate) fn new(file: &'static str) -> Self {
        Self {
            file,
            ..Self::default()
        }
    }
}

/// Outcome of importing a bundle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub files: Vec<FileImport>,
    pub warnings: Vec<String>,
}

impl ImportReport {
    pub fn file(&self, name: &str) -> Option<&FileImport> {
        self.files.iter().find(|entry| entry.file == name)
    }

    pub fn created(&self) -> usize {
        self.files.iter().map(|entry| entry.created).sum()
    }

    pub fn updated(&self) -> usize {
        self.files.iter().map(|entry| entry.updated).sum()
    }

    pub fn skipped(&self) -> usize {
        self.files.iter().map(|entry| entry.skipped).sum()
    }
}
