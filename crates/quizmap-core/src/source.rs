//! Response sources.
//!
//! The statistics functions only ever see a materialized slice of records.
//! Whoever owns storage implements [`ResponseSource`] to hand that slice over.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::model::ResponseRecord;

/// Something that can produce the stored responses for a quiz.
#[async_trait]
pub trait ResponseSource: Send + Sync {
    /// Human-readable source name for logs.
    fn name(&self) -> &str;

    /// All stored responses, across quizzes.
    async fn load_all(&self) -> Result<Vec<ResponseRecord>>;

    /// Responses for one quiz.
    async fn load_for_quiz(&self, quiz_id: &str) -> Result<Vec<ResponseRecord>> {
        let mut records = self.load_all().await?;
        records.retain(|r| r.quiz_id == quiz_id);
        Ok(records)
    }
}

/// Records held in memory, mostly for tests and embedding callers.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    records: Vec<ResponseRecord>,
}

impl InMemorySource {
    pub fn new(records: Vec<ResponseRecord>) -> Self {
        Self { records }
    }

    pub fn push(&mut self, record: ResponseRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl ResponseSource for InMemorySource {
    fn name(&self) -> &str {
        "memory"
    }

    async fn load_all(&self) -> Result<Vec<ResponseRecord>> {
        Ok(self.records.clone())
    }
}

/// JSON arrays of records, from one file or every `.json` file in a directory.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
    label: String,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let label = path.display().to_string();
        Self { path, label }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ResponseSource for JsonFileSource {
    fn name(&self) -> &str {
        &self.label
    }

    async fn load_all(&self) -> Result<Vec<ResponseRecord>> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || load_responses(&path))
            .await
            .context("response loader task panicked")?
    }
}

/// Parse a JSON array of response records.
pub fn parse_responses_str(content: &str, source_path: &Path) -> Result<Vec<ResponseRecord>> {
    serde_json::from_str(content)
        .with_context(|| format!("failed to parse responses: {}", source_path.display()))
}

/// Load records from a JSON file, or from every `.json` file under a directory.
pub fn load_responses(path: &Path) -> Result<Vec<ResponseRecord>> {
    if !path.is_dir() {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read responses from {}", path.display()))?;
        return parse_responses_str(&content, path);
    }

    let mut files = std::fs::read_dir(path)
        .with_context(|| format!("failed to read directory: {}", path.display()))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()?;
    files.sort();

    let mut records = Vec::new();
    for file in files {
        if file.is_dir() {
            records.extend(load_responses(&file)?);
        } else if file.extension().is_some_and(|ext| ext == "json") {
            match load_responses(&file) {
                Ok(batch) => records.extend(batch),
                Err(e) => tracing::warn!("skipping {}: {e:#}", file.display()),
            }
        }
    }
    Ok(records)
}
