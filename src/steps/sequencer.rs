//! Cursor over the ordered list of wizard steps
//!
//! Every navigation checks the target position before committing it, so the
//! cursor is never observable outside `0..len`.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;

use super::StepDescriptor;
use crate::error::StepError;
use crate::repository::StepRepository;

/// Tracks the current position in a fixed sequence of step names
#[derive(Debug, Clone)]
pub struct StepSequencer {
    steps: Arc<[String]>,
    cursor: usize,
}

impl StepSequencer {
    /// Create a sequencer positioned on the first step
    ///
    /// Rejects an empty list and duplicate names.
    pub fn new(steps: impl Into<Arc<[String]>>) -> Result<Self, StepError> {
        let steps = steps.into();
        if steps.is_empty() {
            return Err(StepError::EmptyManifest);
        }

        let mut seen = HashSet::with_capacity(steps.len());
        for name in steps.iter() {
            if !seen.insert(name.as_str()) {
                return Err(StepError::ParseError(format!(
                    "duplicate step '{}' in manifest",
                    name
                )));
            }
        }

        Ok(Self { steps, cursor: 0 })
    }

    /// Step names in wizard order
    pub fn steps(&self) -> &Arc<[String]> {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Always false: construction rejects empty lists
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.cursor
    }

    /// Move to the next step; fails on the final step
    pub fn advance(&mut self) -> Result<(), StepError> {
        if self.is_at_end() {
            return Err(StepError::out_of_range(
                self.cursor as i64 + 1,
                self.steps.len(),
            ));
        }
        self.cursor += 1;
        debug!(step = %self.current_step_name(), index = self.cursor, "advanced");
        Ok(())
    }

    /// Move to the previous step; fails on the first step
    pub fn retreat(&mut self) -> Result<(), StepError> {
        if self.cursor == 0 {
            return Err(StepError::out_of_range(-1, self.steps.len()));
        }
        self.cursor -= 1;
        debug!(step = %self.current_step_name(), index = self.cursor, "retreated");
        Ok(())
    }

    /// Jump to a position
    pub fn seek_by_index(&mut self, index: i64) -> Result<(), StepError> {
        let target = usize::try_from(index)
            .ok()
            .filter(|i| *i < self.steps.len())
            .ok_or_else(|| StepError::out_of_range(index, self.steps.len()))?;
        self.cursor = target;
        Ok(())
    }

    /// Jump to a step by name
    pub fn seek_by_name(&mut self, name: &str) -> Result<(), StepError> {
        let position = self
            .steps
            .iter()
            .position(|s| s == name)
            .ok_or_else(|| StepError::UnknownStep(name.to_string()))?;
        self.seek_by_index(position as i64)
    }

    /// True on the final step
    pub fn is_at_end(&self) -> bool {
        self.cursor + 1 == self.steps.len()
    }

    pub fn current_step_name(&self) -> &str {
        &self.steps[self.cursor]
    }

    /// Fetch the descriptor of the current step
    ///
    /// A missing descriptor is `Ok(None)`; repository errors pass through.
    pub async fn current_step_descriptor(
        &self,
        repository: &dyn StepRepository,
    ) -> Result<Option<StepDescriptor>, StepError> {
        repository
            .get_step_descriptor(self.current_step_name())
            .await
    }

    /// Get progress as (current_index, total_steps)
    pub fn progress(&self) -> (usize, usize) {
        (self.cursor, self.steps.len())
    }

    /// Format progress for display
    /// Returns something like: "intro > [select_data] > finish"
    pub fn format_progress(&self) -> String {
        self.steps
            .iter()
            .enumerate()
            .map(|(i, name)| {
                if i == self.cursor {
                    format!("[{}]", name)
                } else {
                    name.clone()
                }
            })
            .collect::<Vec<_>>()
            .join(" > ")
    }
}
