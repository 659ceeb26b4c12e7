//! Reversible topology mutations.
//!
//! Every add/remove of a server flows through a [`TopologyCommand`] recorded
//! in a [`CommandLog`]. Commands write through the store first and then
//! mutate the live cluster; add and remove are mutual inverses, so undo and
//! redo are just the opposite write-through. Store failures never block the
//! in-memory mutation: writes are retried once and then logged (the store is
//! best-effort, the topology is authoritative).

use std::sync::Arc;

use log::{error, warn};

use crate::core::Result;
use crate::store::{NodeRecord, NodeStore};
use crate::topology::NodeHandle;

/// Direction of a recorded mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandAction {
    Add,
    Remove,
}

/// A reversible add/remove of a node within a target cluster
pub struct TopologyCommand {
    action: CommandAction,
    node: NodeHandle,
    cluster: NodeHandle,
    store: Arc<dyn NodeStore>,
}

impl TopologyCommand {
    pub fn add(node: NodeHandle, cluster: NodeHandle, store: Arc<dyn NodeStore>) -> Self {
        Self {
            action: CommandAction::Add,
            node,
            cluster,
            store,
        }
    }

    pub fn remove(node: NodeHandle, cluster: NodeHandle, store: Arc<dyn NodeStore>) -> Self {
        Self {
            action: CommandAction::Remove,
            node,
            cluster,
            store,
        }
    }

    pub fn action(&self) -> CommandAction {
        self.action
    }

    pub fn node(&self) -> &NodeHandle {
        &self.node
    }

    /// Run the command's forward effect
    pub fn apply(&self) -> Result<()> {
        match self.action {
            CommandAction::Add => self.attach(),
            CommandAction::Remove => self.detach(),
        }
    }

    /// Run the command's inverse effect
    pub fn revert(&self) -> Result<()> {
        match self.action {
            CommandAction::Add => self.detach(),
            CommandAction::Remove => self.attach(),
        }
    }

    /// Re-run the forward effect.
    ///
    /// Safe when the state already reflects the command: membership is
    /// checked before re-adding, and removes of absent nodes are no-ops.
    pub fn reapply(&self) -> Result<()> {
        self.apply()
    }

    fn attach(&self) -> Result<()> {
        let (node_id, node_type) = {
            let node = self.node.read()?;
            (node.id(), node.node_type())
        };
        let cluster_id = self.cluster.read()?.id();

        let record = NodeRecord::new(node_id, node_type).with_parent(cluster_id);
        persist_with_retry("insert", || self.store.insert(record.clone()));
        persist_with_retry("relate", || {
            self.store.add_cluster_relationship(cluster_id, node_id)
        });

        self.cluster.write()?.add_child(self.node.clone())?;
        Ok(())
    }

    fn detach(&self) -> Result<()> {
        let node_id = self.node.read()?.id();
        persist_with_retry("remove", || self.store.remove(node_id));
        self.cluster.write()?.remove_child(node_id)?;
        Ok(())
    }
}

/// Best-effort store write: one retry, then log and continue in memory
fn persist_with_retry(what: &str, mut write: impl FnMut() -> Result<()>) {
    if let Err(first) = write() {
        warn!("store {what} failed, retrying once: {first}");
        if let Err(second) = write() {
            error!("store {what} failed after retry, continuing in-memory only: {second}");
        }
    }
}

/// Linear undo/redo log with a cursor.
///
/// Invariant: `0 <= position <= commands.len()`. Commands to the right of
/// the cursor are the redo tail and are discarded by a new `execute`.
#[derive(Default)]
pub struct CommandLog {
    commands: Vec<TopologyCommand>,
    position: usize,
}

impl CommandLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_undo(&self) -> bool {
        self.position > 0
    }

    pub fn has_redo(&self) -> bool {
        self.position < self.commands.len()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// Truncate the redo tail, run the command, and record it
    pub fn execute(&mut self, command: TopologyCommand) -> Result<()> {
        if self.has_redo() {
            self.commands.truncate(self.position);
        }
        command.apply()?;
        self.commands.push(command);
        self.position += 1;
        Ok(())
    }

    /// Revert the command left of the cursor, if any
    pub fn undo(&mut self) -> Result<()> {
        if self.has_undo() {
            self.commands[self.position - 1].revert()?;
            self.position -= 1;
        }
        Ok(())
    }

    /// Re-run the command right of the cursor, if any
    pub fn redo(&mut self) -> Result<()> {
        if self.has_redo() {
            self.commands[self.position].reapply()?;
            self.position += 1;
        }
        Ok(())
    }

    /// Seed the log from persisted history without running the commands.
    ///
    /// Used for replay only, where the commands' effects already exist in
    /// storage; the cursor lands at the end so the whole history is
    /// undoable.
    pub fn load_commands(&mut self, commands: Vec<TopologyCommand>) {
        self.commands = commands;
        self.position = self.commands.len();
    }
}
