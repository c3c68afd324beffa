use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;

use crate::conversion::ConversionSummary;

/// Summary row stored after each conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionRecord {
    pub playlist_name: Option<String>,
    pub source_url: Option<String>,
    pub total_tracks: usize,
    pub successful_conversions: usize,
    pub converted_at: DateTime<Utc>,
}

impl ConversionRecord {
    pub fn new(
        summary: &ConversionSummary,
        playlist_name: Option<String>,
        source_url: Option<String>,
    ) -> Self {
        Self {
            playlist_name,
            source_url,
            total_tracks: summary.total_tracks,
            successful_conversions: summary.successful_conversions,
            converted_at: Utc::now(),
        }
    }
}

pub trait RecordStore {
    async fn save(&self, record: &ConversionRecord) -> Result<()>;
}

/// Appends each record as one JSON line.
pub struct JsonlRecordStore {
    path: PathBuf,
}

impl JsonlRecordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RecordStore for JsonlRecordStore {
    async fn save(&self, record: &ConversionRecord) -> Result<()> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .with_context(|| format!("failed to open {}", self.path.display()))?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}
