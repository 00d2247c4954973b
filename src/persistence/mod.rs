use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

use crate::models::SignalRecord;
use crate::Result;

/// Append-only sink for signal events
///
/// Rows are written once and never read back by the running process.
#[async_trait]
pub trait SignalJournal: Send + Sync {
    async fn append(&self, record: &SignalRecord) -> Result<()>;
}

/// CSV journal: one line per event, no header, no rotation
///
/// Columns: timestamp, instrument, direction, entry, take_profit, stop_loss, outcome
#[derive(Debug, Clone)]
pub struct CsvJournal {
    path: PathBuf,
}

impl CsvJournal {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SignalJournal for CsvJournal {
    async fn append(&self, record: &SignalRecord) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;

        let line = format!("{}\n", record.to_csv_line());
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;

        tracing::debug!(
            path = %self.path.display(),
            outcome = %record.outcome,
            "Appended signal record"
        );

        Ok(())
    }
}
