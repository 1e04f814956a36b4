//! Output aggregation: grouping, summary metadata, and the four JSON
//! artifacts (`all_places.json`, `places_by_city.json`,
//! `places_by_category.json`, `metadata.json`).
//!
//! Writing is all-or-nothing per artifact: a failure surfaces the
//! attempted path and leaves previously written artifacts in place,
//! so a partial write can be retried by calling [`OutputBundle::write`]
//! again with the same in-memory bundle.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::OutputError;
use crate::types::PlaceRecord;

/// Summary metadata written alongside the grouped artifacts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputMetadata {
    pub total_places: usize,
    /// Number of distinct cities with at least one record.
    pub cities: usize,
    /// Number of distinct categories with at least one record.
    pub categories: usize,
    pub generated_at: DateTime<Utc>,
    pub places_by_city: BTreeMap<String, usize>,
    pub places_by_category: BTreeMap<String, usize>,
}

/// Aggregated view over one run's collected records. Built once at
/// the end of a run; owned exclusively until written.
#[derive(Debug, Serialize)]
pub struct OutputBundle {
    pub all_places: Vec<PlaceRecord>,
    pub by_city: BTreeMap<String, Vec<PlaceRecord>>,
    pub by_category: BTreeMap<String, Vec<PlaceRecord>>,
    pub metadata: OutputMetadata,
}

impl OutputBundle {
    /// Groups `records` by city and by category (first-seen order
    /// preserved within each group) and computes summary counts.
    #[must_use]
    pub fn build(records: Vec<PlaceRecord>) -> Self {
        let mut by_city: BTreeMap<String, Vec<PlaceRecord>> = BTreeMap::new();
        let mut by_category: BTreeMap<String, Vec<PlaceRecord>> = BTreeMap::new();
        for record in &records {
            by_city
                .entry(record.city.clone())
                .or_default()
                .push(record.clone());
            by_category
                .entry(record.category.clone())
                .or_default()
                .push(record.clone());
        }

        let metadata = OutputMetadata {
            total_places: records.len(),
            cities: by_city.len(),
            categories: by_category.len(),
            generated_at: Utc::now(),
            places_by_city: by_city
                .iter()
                .map(|(city, list)| (city.clone(), list.len()))
                .collect(),
            places_by_category: by_category
                .iter()
                .map(|(category, list)| (category.clone(), list.len()))
                .collect(),
        };

        Self {
            all_places: records,
            by_city,
            by_category,
            metadata,
        }
    }

    /// Writes the four artifacts into `dir`, creating it if absent.
    ///
    /// # Errors
    ///
    /// Returns [`OutputError`] carrying the attempted path. Artifacts
    /// written before the failure are left in place.
    pub fn write(&self, dir: &Path) -> Result<(), OutputError> {
        fs::create_dir_all(dir).map_err(|source| OutputError::CreateDir {
            path: dir.to_path_buf(),
            source,
        })?;

        write_artifact(dir, "all_places.json", &self.all_places)?;
        write_artifact(dir, "places_by_city.json", &self.by_city)?;
        write_artifact(dir, "places_by_category.json", &self.by_category)?;
        write_artifact(dir, "metadata.json", &self.metadata)?;

        tracing::info!(
            dir = %dir.display(),
            total_places = self.metadata.total_places,
            cities = self.metadata.cities,
            categories = self.metadata.categories,
            "wrote output artifacts"
        );
        Ok(())
    }
}

fn write_artifact<T: Serialize>(
    dir: &Path,
    artifact: &'static str,
    value: &T,
) -> Result<(), OutputError> {
    let json = serde_json::to_vec_pretty(value)
        .map_err(|source| OutputError::Serialize { artifact, source })?;
    let path = dir.join(artifact);
    fs::write(&path, json).map_err(|source| OutputError::WriteArtifact { path, source })
}
