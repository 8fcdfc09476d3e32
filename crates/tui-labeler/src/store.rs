//! JSON spot files.
//!
//! One file per capture, `p{person:03}g{gesture:02}_spots.json`, holding the
//! canonical spot list. Written pretty-printed so label files stay reviewable
//! by hand.

use std::fs;
use std::path::PathBuf;

use labeler_core::{Spot, SpotStore, StoreError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
struct SpotFile {
    spots: Vec<Spot>,
}

/// File-backed [`SpotStore`] for one capture.
#[derive(Debug, Clone)]
pub struct JsonSpotStore {
    path: PathBuf,
}

impl JsonSpotStore {
    /// Bind a store to the capture's spot file path.
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl SpotStore for JsonSpotStore {
    fn load(&mut self) -> Result<Option<Vec<Spot>>, StoreError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let text = fs::read_to_string(&self.path).map_err(|err| StoreError::Io(err.to_string()))?;
        let file: SpotFile =
            serde_json::from_str(&text).map_err(|err| StoreError::Malformed(err.to_string()))?;
        Ok(Some(file.spots))
    }

    fn save(&mut self, spots: &[Spot]) -> Result<(), StoreError> {
        let file = SpotFile {
            spots: spots.to_vec(),
        };
        let text = serde_json::to_string_pretty(&file)
            .map_err(|err| StoreError::Malformed(err.to_string()))?;
        fs::write(&self.path, text).map_err(|err| StoreError::Io(err.to_string()))
    }
}
