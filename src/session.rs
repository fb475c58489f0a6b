//! The single "file selected" entry point: ingest → analyze → store, run serially.

use std::path::Path;

use thiserror::Error;

use crate::analysis::sentiment::Lexicon;
use crate::analysis::{compute_breakdown, AnalysisOptions, Breakdown};
use crate::db::models::Dataset;
use crate::db::{Database, DbError};
use crate::ingest::{self, IngestError};

#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Ingest(#[from] IngestError),
    #[error("Store error: {0}")]
    Db(#[from] DbError),
    #[error("No data found. Upload your CSV file first.")]
    NoData,
}

pub type Result<T> = std::result::Result<T, SessionError>;

/// Owns the store plus the analysis settings for one run of the tool.
pub struct Session {
    db: Database,
    options: AnalysisOptions,
    lexicon: Lexicon,
}

impl Session {
    pub fn new(db: Database, options: AnalysisOptions, lexicon: Lexicon) -> Self {
        Self { db, options, lexicon }
    }

    pub fn options(&self) -> &AnalysisOptions {
        &self.options
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    /// Read a CSV file and process it as a fresh upload.
    pub fn upload_file(&mut self, path: &Path) -> Result<Breakdown> {
        log::info!("Uploading {}", path.display());
        let text = ingest::read_file(path)?;
        self.upload_text(&text)
    }

    /// Replace the dataset with the contents of `text` and return its breakdown.
    ///
    /// The previously stored dataset is only replaced once parsing and analysis
    /// have succeeded. An upload with no titled rows is rejected and leaves it untouched.
    pub fn upload_text(&mut self, text: &str) -> Result<Breakdown> {
        let dataset = ingest::ingest_text(text);
        if dataset.is_empty() {
            return Err(IngestError::NoSongs.into());
        }

        let breakdown = self.analyze(&dataset);
        self.db.store_dataset(&dataset)?;
        Ok(breakdown)
    }

    /// The dataset stored by the last successful upload.
    pub fn stored_dataset(&self) -> Result<Option<Dataset>> {
        Ok(self.db.load_dataset()?)
    }

    /// Rebuild the breakdown from the stored dataset, without re-uploading.
    pub fn report(&self) -> Result<Breakdown> {
        let dataset = self.stored_dataset()?.ok_or(SessionError::NoData)?;
        if dataset.is_empty() {
            return Err(SessionError::NoData);
        }
        Ok(self.analyze(&dataset))
    }

    pub fn analyze(&self, dataset: &Dataset) -> Breakdown {
        compute_breakdown(dataset, &self.options, &self.lexicon)
    }
}
