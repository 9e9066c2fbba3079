//! Progress Store: per-task step completion and points.
//!
//! The store owns the single in-memory mapping of task name -> progress and
//! mirrors the whole mapping to storage after every mutation. Storage is never
//! authoritative during a session: if a write fails the in-memory state wins.

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{Result, bail};

use crate::step::{POINTS_PER_STEP, ProgressPatch, TaskProgress};
use crate::storage::{KEY_PROGRESS, KeyValueStore, load_json, save_json};

pub type ProgressMap = BTreeMap<String, TaskProgress>;

pub type SharedStore = Arc<dyn KeyValueStore + Send + Sync>;

/// Result of marking a step done.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepCompletion {
    /// First completion of this step; points were added.
    Awarded { points: u32, task_total: u32 },
    /// Step was already done; nothing changed.
    AlreadyDone,
}

pub struct ProgressStore {
    store: SharedStore,
    entries: ProgressMap,
}

impl ProgressStore {
    /// Load persisted progress. Missing or corrupt data yields an empty mapping.
    ///
    /// Entries come back exactly as they were last saved, including
    /// completions recorded before the task's steps were generated.
    pub fn load(store: SharedStore) -> Self {
        let entries: ProgressMap = load_json(store.as_ref(), KEY_PROGRESS).unwrap_or_default();
        tracing::debug!(tasks = entries.len(), "loaded task progress");
        Self { store, entries }
    }

    /// Persist the entire mapping. Failures are logged and swallowed.
    pub fn save(&self) {
        save_json(self.store.as_ref(), KEY_PROGRESS, &self.entries);
    }

    pub fn entries(&self) -> &ProgressMap {
        &self.entries
    }

    pub fn get(&self, task: &str) -> Option<&TaskProgress> {
        self.entries.get(task)
    }

    /// Create the default entry for a task on first selection.
    pub fn ensure(&mut self, task: &str) -> &TaskProgress {
        if !self.entries.contains_key(task) {
            self.entries.insert(task.to_string(), TaskProgress::default());
            self.save();
        }
        &self.entries[task]
    }

    /// Shallow-merge `patch` into the task's entry, creating it if absent.
    pub fn update(&mut self, task: &str, patch: ProgressPatch) -> &ProgressMap {
        let entry = self.entries.entry(task.to_string()).or_default();
        patch.apply(entry);
        self.save();
        &self.entries
    }

    /// Remove a task's progress. Absent tasks are not an error.
    pub fn delete(&mut self, task: &str) -> &ProgressMap {
        if self.entries.remove(task).is_some() {
            tracing::info!(task, "deleted task progress");
        }
        self.save();
        &self.entries
    }

    /// Mark one step done, awarding points only the first time.
    pub fn complete_step(&mut self, task: &str, index: usize) -> Result<StepCompletion> {
        let Some(current) = self.entries.get(task) else {
            bail!("no guide loaded for \"{task}\"");
        };
        if index >= current.steps.len() {
            bail!(
                "step {} does not exist; \"{task}\" has {} steps",
                index + 1,
                current.steps.len()
            );
        }
        if current.is_completed(index) {
            return Ok(StepCompletion::AlreadyDone);
        }

        let mut completed = current.completed_steps.clone();
        completed.insert(index);
        let task_total = current.total_points + POINTS_PER_STEP;

        self.update(
            task,
            ProgressPatch::default()
                .with_completed(completed)
                .with_points(task_total),
        );

        Ok(StepCompletion::Awarded {
            points: POINTS_PER_STEP,
            task_total,
        })
    }

    pub fn next_incomplete(&self, task: &str) -> Option<usize> {
        self.entries.get(task).and_then(TaskProgress::next_incomplete)
    }

    pub fn aggregate_points(&self) -> u64 {
        aggregate_points(&self.entries)
    }
}

/// Sum of points across every task.
pub fn aggregate_points(entries: &ProgressMap) -> u64 {
    entries.values().map(|p| u64::from(p.total_points)).sum()
}
