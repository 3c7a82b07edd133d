//! Saved generations.
//!
//! A [`GenerationRecord`] is what the host writes when the user saves a run and
//! reads back to resume or replay it: a set of genomes plus the generation
//! counter and current generation length.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::Result;
use super::genome::Genome;

/// Genomes and bookkeeping for one saved generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRecord {
    /// Saved genomes, usually the fittest part of a population.
    pub genomes: Vec<Genome>,
    /// Generation counter at save time.
    pub generation_count: u32,
    /// Length of a generation in seconds at save time.
    pub generation_length: f32,
    /// When the record was written.
    #[serde(default)]
    pub saved_at: Option<DateTime<Utc>>,
}

impl GenerationRecord {
    /// Creates an unsaved record.
    pub fn new(genomes: Vec<Genome>, generation_count: u32, generation_length: f32) -> Self {
        Self {
            genomes,
            generation_count,
            generation_length,
            saved_at: None,
        }
    }

    /// A fresh run: no genomes, first generation.
    pub fn fresh(generation_length: f32) -> Self {
        Self::new(Vec::new(), 1, generation_length)
    }

    /// Writes the record as pretty JSON, stamping `saved_at`.
    pub fn save_to_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.saved_at = Some(Utc::now());
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Reads a record written by [`GenerationRecord::save_to_file`].
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let record = serde_json::from_str(&json)?;
        Ok(record)
    }

    /// Reads a record, falling back to `default` when the file is missing or
    /// cannot be decoded.
    pub fn load_or<P: AsRef<Path>>(path: P, default: GenerationRecord) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            log::info!("no saved generation at {}; starting fresh", path.display());
            return default;
        }

        match Self::load_from_file(path) {
            Ok(record) => record,
            Err(e) => {
                log::warn!(
                    "could not read saved generation {}: {}; starting fresh",
                    path.display(),
                    e
                );
                default
            }
        }
    }
}
