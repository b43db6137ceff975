use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("table file changed on disk since it was loaded")]
    RevisionMismatch,

    #[error("unknown column: {0}")]
    UnknownColumn(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed table file: {0}")]
    Malformed(#[from] csv::Error),
}

/// Row-oriented table held fully in memory. Empty string means an
/// empty cell.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn cell(&self, row: usize, column: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn set_cell(&mut self, row: usize, column: usize, value: impl Into<String>) {
        if let Some(r) = self.rows.get_mut(row) {
            if let Some(c) = r.get_mut(column) {
                *c = value.into();
            }
        }
    }

    /// Append a row, padded or truncated to the header width.
    pub fn push_row(&mut self, mut row: Vec<String>) {
        row.resize(self.headers.len(), String::new());
        self.rows.push(row);
    }

    /// Index of the first row whose cell in `column` equals `value`.
    pub fn find_row(&self, column: &str, value: &str) -> Option<usize> {
        let col = self.column_index(column)?;
        (0..self.rows.len()).find(|&i| self.cell(i, col) == value)
    }
}

/// Fingerprint of a table file's on-disk bytes at load time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Revision {
    Missing,
    Present([u8; 32]),
}

fn fingerprint(path: &Path) -> Result<(Revision, Option<Vec<u8>>), StoreError> {
    match fs::read(path) {
        Ok(bytes) => {
            let digest = Sha256::digest(&bytes);
            Ok((Revision::Present(digest.into()), Some(bytes)))
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok((Revision::Missing, None)),
        Err(e) => Err(e.into()),
    }
}

/// A [`Table`] bound to a CSV file. The whole file is read on load and
/// rewritten on save; `save` refuses to write if the file changed since
/// the table was loaded.
pub struct TableFile {
    path: PathBuf,
}

impl TableFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole file into a [`Table`]. A missing file loads as an
    /// empty table with [`Revision::Missing`] so a first save succeeds.
    pub fn load(&self) -> Result<(Table, Revision), StoreError> {
        debug!("Loading table file: {}", self.path.display());

        let (revision, bytes) = fingerprint(&self.path)?;
        let bytes = match bytes {
            Some(b) => b,
            None => return Ok((Table::new(Vec::new()), revision)),
        };

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(bytes.as_slice());

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(str::to_string)
            .collect();

        let mut table = Table::new(headers);
        for record in reader.records() {
            let record = record?;
            table.push_row(record.iter().map(str::to_string).collect());
        }

        Ok((table, revision))
    }

    /// Rewrite the whole file from `table`. The file's current
    /// fingerprint must still match `loaded_at`, otherwise nothing is
    /// written and [`StoreError::RevisionMismatch`] is returned.
    pub fn save(&self, table: &Table, loaded_at: &Revision) -> Result<Revision, StoreError> {
        let (current, _) = fingerprint(&self.path)?;
        if current != *loaded_at {
            return Err(StoreError::RevisionMismatch);
        }

        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(table.headers())?;
        for i in 0..table.row_count() {
            let row: Vec<&str> = (0..table.headers().len())
                .map(|c| table.cell(i, c))
                .collect();
            writer.write_record(&row)?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| std::io::Error::other(e.to_string()))?;

        fs::write(&self.path, &bytes)?;
        debug!("Saved table file: {}", self.path.display());

        Ok(Revision::Present(Sha256::digest(&bytes).into()))
    }
}
