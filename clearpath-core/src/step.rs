//! Step-guide data model.
//!
//! A guide is an ordered list of steps generated once per task. Progress is
//! tracked separately so the steps themselves never change after generation.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::codec::step_set;

/// Points awarded the first time a step is marked done.
pub const POINTS_PER_STEP: u32 = 10;

/// Number of steps requested for every guide.
pub const STEPS_PER_GUIDE: usize = 7;

/// One instructed action within a task guide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStep {
    pub title: String,
    pub description: String,
    /// Prompt handed to the image model to illustrate this step.
    #[serde(alias = "imagePrompt")]
    pub image_prompt: String,
}

impl TaskStep {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        image_prompt: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            image_prompt: image_prompt.into(),
        }
    }

    /// Text read aloud for this step.
    pub fn spoken_text(&self) -> String {
        format!("{}. {}", self.title, self.description)
    }

    pub(crate) fn is_well_formed(&self) -> bool {
        !self.title.trim().is_empty()
            && !self.description.trim().is_empty()
            && !self.image_prompt.trim().is_empty()
    }
}

/// Per-task record of generated steps, completed step indices and points.
///
/// Completions are only ever added for existing steps by
/// [`ProgressStore::complete_step`](crate::ProgressStore::complete_step); a raw
/// patch may record indices before the steps exist and they are kept as given.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskProgress {
    #[serde(default)]
    pub steps: Vec<TaskStep>,
    #[serde(default, with = "step_set")]
    pub completed_steps: HashSet<usize>,
    #[serde(default)]
    pub total_points: u32,
}

impl TaskProgress {
    pub fn has_steps(&self) -> bool {
        !self.steps.is_empty()
    }

    pub fn is_completed(&self, index: usize) -> bool {
        self.completed_steps.contains(&index)
    }

    /// First step index not yet completed.
    pub fn next_incomplete(&self) -> Option<usize> {
        (0..self.steps.len()).find(|i| !self.completed_steps.contains(i))
    }

    /// Completed indices that name an existing step.
    pub fn completed_count(&self) -> usize {
        (0..self.steps.len()).filter(|i| self.is_completed(*i)).count()
    }

    pub fn is_finished(&self) -> bool {
        self.has_steps() && self.next_incomplete().is_none()
    }
}

/// Shallow partial update for a [`TaskProgress`].
///
/// Provided fields fully replace prior values; callers union completion sets
/// themselves before calling update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressPatch {
    pub steps: Option<Vec<TaskStep>>,
    pub completed_steps: Option<HashSet<usize>>,
    pub total_points: Option<u32>,
}

impl ProgressPatch {
    pub fn steps(steps: Vec<TaskStep>) -> Self {
        Self {
            steps: Some(steps),
            ..Self::default()
        }
    }

    pub fn with_completed(mut self, completed: HashSet<usize>) -> Self {
        self.completed_steps = Some(completed);
        self
    }

    pub fn with_points(mut self, points: u32) -> Self {
        self.total_points = Some(points);
        self
    }

    pub(crate) fn apply(self, progress: &mut TaskProgress) {
        if let Some(steps) = self.steps {
            progress.steps = steps;
        }
        if let Some(completed) = self.completed_steps {
            progress.completed_steps = completed;
        }
        if let Some(points) = self.total_points {
            progress.total_points = points;
        }
    }
}
