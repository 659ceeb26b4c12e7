use std::collections::HashMap;
use std::sync::RwLock;

use crate::core::{NodeId, Result, SimError};

use super::{NodeRecord, NodeStore};

#[derive(Debug, Default)]
struct Records {
    by_id: HashMap<NodeId, NodeRecord>,
    /// Insertion order, kept so replay is deterministic
    order: Vec<NodeId>,
}

impl Records {
    fn all(&self) -> Vec<NodeRecord> {
        self.order
            .iter()
            .filter_map(|id| self.by_id.get(id).cloned())
            .collect()
    }

    fn upsert(&mut self, record: NodeRecord) {
        if !self.by_id.contains_key(&record.id) {
            self.order.push(record.id);
        }
        self.by_id.insert(record.id, record);
    }

    fn remove(&mut self, id: NodeId) {
        if self.by_id.remove(&id).is_some() {
            self.order.retain(|existing| *existing != id);
        }
    }
}

/// In-memory store; the default backend for tests and demos
#[derive(Debug, Default)]
pub struct MemoryNodeStore {
    inner: RwLock<Records>,
}

impl MemoryNodeStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl NodeStore for MemoryNodeStore {
    fn get_all(&self) -> Result<Vec<NodeRecord>> {
        Ok(self.inner.read()?.all())
    }

    fn insert(&self, record: NodeRecord) -> Result<()> {
        self.inner.write()?.upsert(record);
        Ok(())
    }

    fn remove(&self, id: NodeId) -> Result<()> {
        self.inner.write()?.remove(id);
        Ok(())
    }

    fn add_cluster_relationship(&self, parent: NodeId, child: NodeId) -> Result<()> {
        let mut inner = self.inner.write()?;
        match inner.by_id.get_mut(&child) {
            Some(record) => {
                record.parent_id = Some(parent);
                Ok(())
            }
            None => Err(SimError::Store(format!(
                "cannot record relationship: unknown child '{child}'"
            ))),
        }
    }

    fn get_cluster_children(&self, parent_id: NodeId) -> Result<Vec<NodeRecord>> {
        Ok(self
            .inner
            .read()?
            .all()
            .into_iter()
            .filter(|record| record.parent_id == Some(parent_id))
            .collect())
    }
}
