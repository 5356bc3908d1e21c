//! Per-table memory of column filters.
//!
//! When enabled, every recompute records each column's fragment for the bound
//! table. Rebinding the same table later replays the recorded fragments.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::TableId;
use crate::error::Result;

/// Column fragments recorded for one table, in column order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableFilterSnapshot {
    pub table: TableId,
    pub filters: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableFilterMemory {
    enabled: bool,
    snapshots: BTreeMap<TableId, Vec<String>>,
}

impl TableFilterMemory {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            snapshots: BTreeMap::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Disabling forgets every snapshot
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.snapshots.clear();
        }
    }

    /// Overwrite the snapshot for `table`; ignored while disabled
    pub fn record(&mut self, table: &TableId, filters: Vec<String>) {
        if self.enabled {
            self.snapshots.insert(table.clone(), filters);
        }
    }

    pub fn snapshot(&self, table: &TableId) -> Option<TableFilterSnapshot> {
        if !self.enabled {
            return None;
        }
        self.snapshots.get(table).map(|filters| TableFilterSnapshot {
            table: table.clone(),
            filters: filters.clone(),
        })
    }

    pub fn forget(&mut self, table: &TableId) -> bool {
        self.snapshots.remove(table).is_some()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Write all snapshots as a JSON object of table name to fragment array
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.snapshots)?;
        fs::write(path, json)?;
        debug!("Saved {} filter snapshot(s) to {}", self.len(), path.display());
        Ok(())
    }

    /// Replace the snapshots with those stored at `path`
    pub fn load(&mut self, path: &Path) -> Result<()> {
        let json = fs::read_to_string(path)?;
        self.snapshots = serde_json::from_str(&json)?;
        debug!("Loaded {} filter snapshot(s) from {}", self.len(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn filters() -> Vec<String> {
        vec!["[a] LIKE 'x*'".to_string(), String::new()]
    }

    #[test]
    fn test_record_only_when_enabled() {
        let table = TableId::new("inbox");
        let mut memory = TableFilterMemory::new(false);
        memory.record(&table, filters());
        assert!(memory.is_empty());

        memory.set_enabled(true);
        memory.record(&table, filters());
        assert_eq!(memory.snapshot(&table).unwrap().filters, filters());
    }

    #[test]
    fn test_disabling_clears() {
        let table = TableId::new("inbox");
        let mut memory = TableFilterMemory::new(true);
        memory.record(&table, filters());
        memory.set_enabled(false);
        memory.set_enabled(true);
        assert!(memory.snapshot(&table).is_none());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("snapshots").join("filters.json");
        let table = TableId::new("inbox");

        let mut memory = TableFilterMemory::new(true);
        memory.record(&table, filters());
        memory.save(&path).unwrap();

        let mut restored = TableFilterMemory::new(true);
        restored.load(&path).unwrap();
        assert_eq!(restored, memory);
    }
}
