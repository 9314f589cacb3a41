//! JSON snapshot files for the in-memory store.
//!
//! A snapshot is the full content of the three collections. Writes go to a
//! sibling temp file first and are renamed into place, so a crash mid-write
//! leaves the previous snapshot intact.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::error::Result;
use crate::types::{Profile, Reading, Recommendation};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    pub profiles: Vec<Profile>,
    #[serde(rename = "bp_readings")]
    pub readings: Vec<Reading>,
    pub recommendations: Vec<Recommendation>,
}

impl Snapshot {
    /// Load a snapshot. A missing file is an empty snapshot.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No snapshot at {:?}, starting empty", path);
            return Ok(Self::default());
        }

        let bytes = fs::read(path)?;
        let snapshot: Snapshot = serde_json::from_slice(&bytes)?;
        info!(
            "Loaded snapshot from {:?}: {} profiles, {} readings, {} recommendations",
            path,
            snapshot.profiles.len(),
            snapshot.readings.len(),
            snapshot.recommendations.len()
        );
        Ok(snapshot)
    }

    /// Write the snapshot, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(self)?)?;
        fs::rename(&tmp, path)?;
        debug!("Saved snapshot to {:?}", path);
        Ok(())
    }
}
