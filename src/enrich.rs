//! Photo lookup boundary and per-record enrichment
//!
//! `enrich_record` turns one dataset record into a serialized photo record by
//! querying a [`PhotoSource`]. Every failure mode is a typed [`EnrichError`]
//! so the pipeline can route it as a per-record failure instead of aborting
//! the run.

use std::fs;
use std::path::Path;

use anyhow::Context;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::record::{DatasetRecord, RecordError};

/// One photo as stored in the catalog. The tag fields are space-separated
/// strings, the shape the upstream service uses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogPhoto {
    pub id: String,
    pub owner: String,
    pub taken: NaiveDateTime,
    #[serde(default)]
    pub secret: String,
    #[serde(default)]
    pub server: String,
    #[serde(default)]
    pub farm: u32,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: String,
    #[serde(default)]
    pub machine_tags: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub height: u32,
    #[serde(default)]
    pub width: u32,
}

/// The enriched record emitted for each success. Tag strings are split into
/// ordered token lists before serialization.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhotoRecord {
    pub id: String,
    pub owner: String,
    pub secret: String,
    pub server: String,
    pub farm: u32,
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub machine_tags: Vec<String>,
    pub url: String,
    pub height: u32,
    pub width: u32,
}

impl From<CatalogPhoto> for PhotoRecord {
    fn from(photo: CatalogPhoto) -> Self {
        let tags = photo.tags.split_whitespace().map(str::to_string).collect();
        let machine_tags = photo
            .machine_tags
            .split_whitespace()
            .map(str::to_string)
            .collect();

        Self {
            id: photo.id,
            owner: photo.owner,
            secret: photo.secret,
            server: photo.server,
            farm: photo.farm,
            title: photo.title,
            description: photo.description,
            tags,
            machine_tags,
            url: photo.url,
            height: photo.height,
            width: photo.width,
        }
    }
}

/// Why one record could not be enriched. Every variant is recoverable for
/// the run: the record is reported and counted, processing continues.
#[derive(Debug, Error)]
pub enum EnrichError {
    #[error("malformed record: {0}")]
    InvalidRecord(#[from] RecordError),
    #[error("not found for {owner} at {taken}")]
    NotFound {
        id: String,
        owner: String,
        taken: NaiveDateTime,
    },
    #[error("[{url}]: tags list empty")]
    EmptyTags { id: String, url: String },
    #[error("error while serializing: {source}")]
    Serialize {
        id: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("search failed: {0}")]
    Transport(String),
}

/// The external search boundary. Implementations may block on I/O for the
/// duration of one call; a failed call must surface as
/// [`EnrichError::Transport`] so it stays scoped to the record being
/// processed.
pub trait PhotoSource: Send + Sync {
    fn search(
        &self,
        owner: &str,
        taken: NaiveDateTime,
    ) -> Result<Vec<CatalogPhoto>, EnrichError>;
}

/// Catalog-backed [`PhotoSource`] answering searches from a local JSON
/// snapshot of the photo service.
pub struct CatalogLookup {
    photos: Vec<CatalogPhoto>,
}

impl CatalogLookup {
    /// Load a catalog file. Failure here is a startup error, not a
    /// per-record one.
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("cannot read catalog {}", path.display()))?;
        let photos = serde_json::from_str(&raw)
            .with_context(|| format!("invalid catalog {}", path.display()))?;
        Ok(Self { photos })
    }

    pub fn len(&self) -> usize {
        self.photos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.photos.is_empty()
    }
}

impl PhotoSource for CatalogLookup {
    fn search(
        &self,
        owner: &str,
        taken: NaiveDateTime,
    ) -> Result<Vec<CatalogPhoto>, EnrichError> {
        Ok(self
            .photos
            .iter()
            .filter(|p| p.owner == owner && p.taken == taken)
            .cloned()
            .collect())
    }
}

/// Enrich one record: search the source, select the photo with the matching
/// id, reject empty tag lists and serialize the result to one JSON line.
pub fn enrich_record(
    source: &dyn PhotoSource,
    record: &DatasetRecord,
) -> Result<String, EnrichError> {
    let photos = source.search(&record.owner, record.taken)?;

    let photo = photos
        .into_iter()
        .find(|p| p.id == record.id)
        .ok_or_else(|| EnrichError::NotFound {
            id: record.id.clone(),
            owner: record.owner.clone(),
            taken: record.taken,
        })?;

    if photo.tags.split_whitespace().next().is_none() {
        return Err(EnrichError::EmptyTags {
            id: photo.id,
            url: photo.url,
        });
    }

    serde_json::to_string(&PhotoRecord::from(photo)).map_err(|err| EnrichError::Serialize {
        id: record.id.clone(),
        source: err,
    })
}
