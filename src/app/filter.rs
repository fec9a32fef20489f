use serde::Serialize;
use tokio::sync::watch;

use crate::model::{CategoryId, Task};

/// Display filter over the task collection.
///
/// An empty category selection means "any category", not "tasks without
/// categories".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskFilter {
    pub pending_only: bool,
    pub categories: Vec<CategoryId>,
}

impl TaskFilter {
    pub fn matches(&self, task: &Task) -> bool {
        if self.pending_only && task.completed {
            return false;
        }

        self.categories.is_empty() || task.category_id.iter().any(|c| self.categories.contains(c))
    }

    pub fn apply(&self, tasks: &[Task]) -> Vec<Task> {
        tasks.iter().filter(|t| self.matches(t)).cloned().collect()
    }
}

/// The two filter inputs, each published on its own channel.
pub struct FilterState {
    pending_only: watch::Sender<bool>,
    categories: watch::Sender<Vec<CategoryId>>,
}

impl FilterState {
    pub fn new() -> Self {
        let (pending_only, _) = watch::channel(false);
        let (categories, _) = watch::channel(Vec::new());

        Self {
            pending_only,
            categories,
        }
    }

    pub fn current(&self) -> TaskFilter {
        TaskFilter {
            pending_only: *self.pending_only.borrow(),
            categories: self.categories.borrow().clone(),
        }
    }

    pub fn set_pending_only(&self, pending_only: bool) {
        self.pending_only.send_if_modified(|current| {
            let modified = *current != pending_only;
            *current = pending_only;
            modified
        });
    }

    /// Returns the new value.
    pub fn toggle_pending_only(&self) -> bool {
        self.pending_only.send_modify(|current| *current = !*current);
        *self.pending_only.borrow()
    }

    /// Deselects `category_id` if selected, otherwise appends it to the
    /// selection. Returns the new selection.
    pub fn toggle_category(&self, category_id: CategoryId) -> Vec<CategoryId> {
        self.categories.send_modify(|selected| {
            if selected.contains(&category_id) {
                selected.retain(|&c| c != category_id);
            } else {
                selected.push(category_id);
            }
        });

        self.categories.borrow().clone()
    }

    pub fn clear_categories(&self) {
        self.categories.send_if_modified(|selected| {
            let modified = !selected.is_empty();
            selected.clear();
            modified
        });
    }

    /// Derived view combining the task snapshot with both filter inputs.
    pub fn view(&self, tasks: watch::Receiver<Vec<Task>>) -> FilteredTasks {
        FilteredTasks {
            tasks,
            pending_only: self.pending_only.subscribe(),
            categories: self.categories.subscribe(),
        }
    }
}

pub struct FilteredTasks {
    tasks: watch::Receiver<Vec<Task>>,
    pending_only: watch::Receiver<bool>,
    categories: watch::Receiver<Vec<CategoryId>>,
}

impl FilteredTasks {
    pub fn filter(&self) -> TaskFilter {
        TaskFilter {
            pending_only: *self.pending_only.borrow(),
            categories: self.categories.borrow().clone(),
        }
    }

    /// Filtered tasks for the latest value of every input.
    pub fn current(&self) -> Vec<Task> {
        let filter = self.filter();
        let tasks = self.tasks.borrow();

        filter.apply(&tasks)
    }

    /// Waits for any input to change and returns the recomputed view. Fails
    /// once the producing side is gone.
    #[cfg_attr(not(test), allow(dead_code))]
    pub async fn changed(&mut self) -> Result<Vec<Task>, watch::error::RecvError> {
        tokio::select! {
            r = self.tasks.changed() => r?,
            r = self.pending_only.changed() => r?,
            r = self.categories.changed() => r?,
        }

        self.tasks.borrow_and_update();
        self.pending_only.borrow_and_update();
        self.categories.borrow_and_update();

        Ok(self.current())
    }
}
