//! In-memory workflow store backed by `DashMap`.
//!
//! The store is an explicit object: the host constructs one and hands it to
//! the service, and tests build isolated instances instead of resetting a
//! shared global.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use maestro_types::workflow::{Workflow, WorkflowId};

use crate::repository::workflow::WorkflowRepository;

#[derive(Debug)]
struct Entry {
    /// Insertion sequence, used for stable listing order.
    seq: u64,
    workflow: Workflow,
}

/// Process-lifetime workflow store.
#[derive(Debug, Default)]
pub struct InMemoryWorkflowStore {
    workflows: DashMap<WorkflowId, Entry>,
    next_seq: AtomicU64,
}

impl InMemoryWorkflowStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl WorkflowRepository for InMemoryWorkflowStore {
    fn insert(&self, workflow: Workflow) {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        self.workflows.insert(workflow.id, Entry { seq, workflow });
    }

    fn get(&self, id: &WorkflowId) -> Option<Workflow> {
        self.workflows.get(id).map(|entry| entry.workflow.clone())
    }

    fn update<T>(&self, id: &WorkflowId, f: impl FnOnce(&mut Workflow) -> T) -> Option<T> {
        self.workflows
            .get_mut(id)
            .map(|mut entry| f(&mut entry.workflow))
    }

    fn remove(&self, id: &WorkflowId) -> Option<Workflow> {
        self.workflows.remove(id).map(|(_, entry)| entry.workflow)
    }

    fn list(&self) -> Vec<Workflow> {
        let mut entries: Vec<(u64, Workflow)> = self
            .workflows
            .iter()
            .map(|entry| (entry.seq, entry.workflow.clone()))
            .collect();
        entries.sort_by_key(|(seq, _)| *seq);
        entries.into_iter().map(|(_, workflow)| workflow).collect()
    }

    fn clear(&self) {
        self.workflows.clear();
    }

    fn len(&self) -> usize {
        self.workflows.len()
    }
}
