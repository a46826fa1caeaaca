//! Workflow repository trait definition.
//!
//! Defines the storage interface for workflow entities (steps and execution
//! history travel with the workflow). `InMemoryWorkflowStore` in
//! `crate::workflow::store` is the process-lifetime implementation.

use maestro_types::workflow::{Workflow, WorkflowId};

/// Repository trait for workflow persistence.
///
/// Implementations must apply `update` atomically with respect to other
/// calls on the same id: the closure sees and mutates one consistent
/// snapshot.
pub trait WorkflowRepository: Send + Sync {
    /// Insert a new workflow. Ids are never reused, so this never replaces.
    fn insert(&self, workflow: Workflow);

    /// Get a snapshot of a workflow by id.
    fn get(&self, id: &WorkflowId) -> Option<Workflow>;

    /// Mutate a workflow in place. Returns `None` if the id is unknown.
    fn update<T>(&self, id: &WorkflowId, f: impl FnOnce(&mut Workflow) -> T) -> Option<T>;

    /// Remove a workflow and its history. Returns the removed workflow.
    fn remove(&self, id: &WorkflowId) -> Option<Workflow>;

    /// All workflows ordered by creation.
    fn list(&self) -> Vec<Workflow>;

    /// Drop every workflow.
    fn clear(&self);

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
