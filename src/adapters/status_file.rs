//! Status/alarm JSON file for an external dashboard.
//!
//! Written once per tick.  Readers never observe a half-written file:
//! the document goes to a sibling `.tmp` file first and is then renamed
//! over the target.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::alarms::Alarm;
use crate::app::status::{StatusDocument, StatusReport};

pub struct StatusFile {
    path: PathBuf,
}

impl StatusFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write(&self, status: &StatusReport, alarms: &[Alarm]) -> Result<()> {
        let json = serde_json::to_string_pretty(&StatusDocument { status, alarms })
            .context("Failed to serialize status document")?;

        let tmp_path = self.path.with_extension("tmp");
        {
            let mut tmp = File::create(&tmp_path)
                .with_context(|| format!("Failed to create {}", tmp_path.display()))?;
            tmp.write_all(json.as_bytes())
                .context("Failed to write status document")?;
            tmp.sync_all().context("Failed to sync status file")?;
        }

        fs::rename(&tmp_path, &self.path)
            .with_context(|| format!("Failed to move status file into {}", self.path.display()))?;
        Ok(())
    }
}
