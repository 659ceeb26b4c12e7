use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use log::debug;

use crate::core::{NodeId, Result, SimError};

use super::{NodeRecord, NodeStore};

/// JSON-snapshot store.
///
/// The whole record list is rewritten on every mutation through a temp file
/// in the target directory followed by an atomic rename, so readers never
/// observe a half-written snapshot. Suitable for the simulator's small
/// topologies; not a general-purpose database.
#[derive(Debug)]
pub struct FileNodeStore {
    path: PathBuf,
    records: RwLock<Vec<NodeRecord>>,
}

impl FileNodeStore {
    /// Open (or create) a snapshot file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let records = if path.exists() {
            let bytes = fs::read(&path)?;
            serde_json::from_slice(&bytes)?
        } else {
            Vec::new()
        };
        debug!(
            "opened node store at {} with {} records",
            path.display(),
            records.len()
        );
        Ok(Self {
            path,
            records: RwLock::new(records),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self, records: &[NodeRecord]) -> Result<()> {
        let json = serde_json::to_vec_pretty(records)?;
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(&json)?;
        tmp.persist(&self.path)
            .map_err(|e| SimError::Io(e.to_string()))?;
        Ok(())
    }
}

impl NodeStore for FileNodeStore {
    fn get_all(&self) -> Result<Vec<NodeRecord>> {
        Ok(self.records.read()?.clone())
    }

    fn insert(&self, record: NodeRecord) -> Result<()> {
        let mut records = self.records.write()?;
        match records.iter_mut().find(|r| r.id == record.id) {
            Some(existing) => *existing = record,
            None => records.push(record),
        }
        self.save(&records)
    }

    fn remove(&self, id: NodeId) -> Result<()> {
        let mut records = self.records.write()?;
        let before = records.len();
        records.retain(|r| r.id != id);
        if records.len() == before {
            return Ok(());
        }
        self.save(&records)
    }

    fn add_cluster_relationship(&self, parent: NodeId, child: NodeId) -> Result<()> {
        let mut records = self.records.write()?;
        match records.iter_mut().find(|r| r.id == child) {
            Some(record) => {
                record.parent_id = Some(parent);
            }
            None => {
                return Err(SimError::Store(format!(
                    "cannot record relationship: unknown child '{child}'"
                )));
            }
        }
        self.save(&records)
    }

    fn get_cluster_children(&self, parent_id: NodeId) -> Result<Vec<NodeRecord>> {
        Ok(self
            .records
            .read()?
            .iter()
            .filter(|r| r.parent_id == Some(parent_id))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::NodeType;

    #[test]
    fn snapshot_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("topology.json");

        let record = NodeRecord::new(NodeId::new(), NodeType::Database);
        {
            let store = FileNodeStore::open(&path).unwrap();
            store.insert(record.clone()).unwrap();
        }

        let reopened = FileNodeStore::open(&path).unwrap();
        assert_eq!(reopened.get_all().unwrap(), vec![record]);
    }

    #[test]
    fn missing_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileNodeStore::open(dir.path().join("fresh.json")).unwrap();
        assert!(store.get_all().unwrap().is_empty());
    }

    #[test]
    fn remove_persists_and_tolerates_missing_ids() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("topology.json");
        let store = FileNodeStore::open(&path).unwrap();

        let record = NodeRecord::new(NodeId::new(), NodeType::Cache);
        store.insert(record.clone()).unwrap();
        store.remove(record.id).unwrap();
        store.remove(record.id).unwrap();

        let reopened = FileNodeStore::open(&path).unwrap();
        assert!(reopened.get_all().unwrap().is_empty());
    }
}
