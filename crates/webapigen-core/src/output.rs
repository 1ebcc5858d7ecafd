//! Destinations for generated units.

// Internal imports (std, crate)
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::{Error, Result};

// External imports (alphabetized)
use serde::Serialize;
use tokio::fs;

/// One rendered output file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedUnit {
    /// Logical unit name, e.g. `IUserApi.Wrap`
    pub name: String,
    /// File name relative to the output directory
    pub file_name: String,
    pub text: String,
}

/// Receiver of generated units. Implementations must tolerate concurrent emits.
pub trait OutputSink: Send + Sync {
    /// Accept `unit`. A second unit with an already emitted name is rejected.
    fn emit(&self, unit: GeneratedUnit) -> Result<()>;
}

/// Collects units in memory, keyed by file name.
#[derive(Debug, Default)]
pub struct MemoryOutput {
    units: Mutex<BTreeMap<String, GeneratedUnit>>,
}

impl MemoryOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the collected units, ordered by file name.
    pub fn units(&self) -> Vec<GeneratedUnit> {
        self.units
            .lock()
            .map(|units| units.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Unit with logical name `name`
    pub fn get(&self, name: &str) -> Option<GeneratedUnit> {
        self.units
            .lock()
            .ok()?
            .values()
            .find(|unit| unit.name == name)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.units.lock().map(|units| units.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Write every collected unit below `dir`, creating it if needed.
    pub async fn write_to(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(dir).await?;

        let mut written = Vec::new();
        for unit in self.units() {
            let path = dir.join(&unit.file_name);
            log::debug!("Writing {} to {}", unit.name, path.display());
            fs::write(&path, &unit.text).await?;
            written.push(path);
        }
        Ok(written)
    }
}

impl OutputSink for MemoryOutput {
    fn emit(&self, unit: GeneratedUnit) -> Result<()> {
        let mut units = self
            .units
            .lock()
            .map_err(|_| Error::generation(&unit.name, "output sink is poisoned"))?;
        if units.contains_key(&unit.file_name) {
            return Err(Error::generation(
                &unit.name,
                format!("{} is already emitted", unit.file_name),
            ));
        }
        units.insert(unit.file_name.clone(), unit);
        Ok(())
    }
}
