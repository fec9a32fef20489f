use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use anyhow::{anyhow, Context};
use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::{watch, Mutex};

use crate::model::{tasks, Category, CategoryId, Task};

use super::{
    error::{StorageResultExt, TodoError, TodoResult},
    repositories::KeyValueStore,
};

pub const TASKS_KEY: &str = "tasks";
pub const CATEGORIES_KEY: &str = "categories";

/// Owns the persisted task and category collections and publishes a snapshot
/// of each after every successful write.
///
/// Every mutation reads the current snapshot, transforms the whole collection,
/// overwrites it in the store and only then publishes it. Mutations are
/// serialized internally, so concurrent callers never lose each other's
/// updates. Updating or deleting an unknown id is a no-op reported as `false`
/// (or `None`), and leaves both the store and the snapshot untouched.
pub struct TodoService {
    store: Arc<dyn KeyValueStore>,
    tasks: watch::Sender<Vec<Task>>,
    categories: watch::Sender<Vec<Category>>,
    write_lock: Mutex<()>,
    initialized: AtomicBool,
}

impl TodoService {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        let (tasks, _) = watch::channel(Vec::new());
        let (categories, _) = watch::channel(Vec::new());

        Self {
            store,
            tasks,
            categories,
            write_lock: Mutex::new(()),
            initialized: AtomicBool::new(false),
        }
    }

    /// Opens the store and publishes both collections as loaded from it.
    pub async fn initialize(&self) -> TodoResult<()> {
        let _guard = self.write_lock.lock().await;

        self.store.open().await.storage()?;

        let tasks: Vec<Task> = self.load(TASKS_KEY).await?;
        let categories: Vec<Category> = self.load(CATEGORIES_KEY).await?;

        log::info!(
            "Loaded {} tasks and {} categories from the local store",
            tasks.len(),
            categories.len()
        );

        self.tasks.send_replace(tasks);
        self.categories.send_replace(categories);
        self.initialized.store(true, Ordering::Release);

        Ok(())
    }

    pub fn get_current_tasks(&self) -> Vec<Task> {
        self.tasks.borrow().clone()
    }

    pub fn get_current_categories(&self) -> Vec<Category> {
        self.categories.borrow().clone()
    }

    pub fn subscribe_tasks(&self) -> watch::Receiver<Vec<Task>> {
        self.tasks.subscribe()
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn subscribe_categories(&self) -> watch::Receiver<Vec<Category>> {
        self.categories.subscribe()
    }

    // -------------------------------------------------------------------------
    // Tasks
    // -------------------------------------------------------------------------

    pub async fn add_task(&self, mut task: Task) -> TodoResult<()> {
        task.title = validate_name("task title", &task.title)?;

        self.modify(TASKS_KEY, &self.tasks, |tasks| {
            if tasks.iter().any(|t| t.id == task.id) {
                return Err(TodoError::validation(format!(
                    "task id {} is already in use",
                    task.id
                )));
            }

            tasks.push(task);
            Ok(Some(()))
        })
        .await?;

        Ok(())
    }

    /// Replaces the task with the same id. Returns whether such a task existed.
    pub async fn update_task(&self, mut task: Task) -> TodoResult<bool> {
        task.title = validate_name("task title", &task.title)?;
        let task_id = task.id.clone();

        let replaced = self
            .modify(TASKS_KEY, &self.tasks, |tasks| {
                Ok(replace_where(tasks, |t| t.id == task_id, task))
            })
            .await?;

        Ok(replaced.is_some())
    }

    pub async fn delete_task(&self, task_id: &str) -> TodoResult<bool> {
        let deleted = self
            .modify(TASKS_KEY, &self.tasks, |tasks| {
                Ok(remove_where(tasks, |t| t.id == task_id))
            })
            .await?;

        Ok(deleted.is_some())
    }

    pub async fn create_task(&self, title: &str, description: Option<&str>) -> TodoResult<Task> {
        let title = validate_name("task title", title)?;
        let description = description
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string);

        let task = Task::new(tasks::generate_task_id(), title, description);
        self.add_task(task.clone()).await?;

        Ok(task)
    }

    pub async fn toggle_task(&self, task_id: &str) -> TodoResult<Option<Task>> {
        self.modify_task(task_id, |task| task.completed = !task.completed)
            .await
    }

    /// Adds `category_id` to the task, or removes it if already assigned.
    pub async fn toggle_task_category(
        &self,
        task_id: &str,
        category_id: CategoryId,
    ) -> TodoResult<Option<Task>> {
        self.modify_task(task_id, |task| task.toggle_category(category_id))
            .await
    }

    /// Strips `category_id` from every task referencing it. Returns the number
    /// of tasks changed; the collection is written once, and only if any task
    /// changed.
    pub async fn remove_category_from_tasks(&self, category_id: CategoryId) -> TodoResult<usize> {
        let changed = self
            .modify(TASKS_KEY, &self.tasks, |tasks| {
                let mut changed = 0;

                for task in tasks.iter_mut() {
                    if task.remove_category(category_id) {
                        task.touch();
                        changed += 1;
                    }
                }

                Ok((changed > 0).then_some(changed))
            })
            .await?;

        Ok(changed.unwrap_or(0))
    }

    async fn modify_task(
        &self,
        task_id: &str,
        change: impl FnOnce(&mut Task),
    ) -> TodoResult<Option<Task>> {
        self.modify(TASKS_KEY, &self.tasks, |tasks| {
            let Some(task) = tasks.iter_mut().find(|t| t.id == task_id) else {
                return Ok(None);
            };

            change(task);
            task.touch();

            Ok(Some(task.clone()))
        })
        .await
    }

    // -------------------------------------------------------------------------
    // Categories
    // -------------------------------------------------------------------------

    pub async fn add_category(&self, mut category: Category) -> TodoResult<()> {
        category.name = validate_name("category name", &category.name)?;

        self.modify(CATEGORIES_KEY, &self.categories, |categories| {
            if categories.iter().any(|c| c.id == category.id) {
                return Err(TodoError::validation(format!(
                    "category id {} is already in use",
                    category.id
                )));
            }

            categories.push(category);
            Ok(Some(()))
        })
        .await?;

        Ok(())
    }

    pub async fn update_category(&self, mut category: Category) -> TodoResult<bool> {
        category.name = validate_name("category name", &category.name)?;

        let replaced = self
            .modify(CATEGORIES_KEY, &self.categories, |categories| {
                let category_id = category.id;
                Ok(replace_where(categories, |c| c.id == category_id, category))
            })
            .await?;

        Ok(replaced.is_some())
    }

    /// Removes the category record only; tasks keep referencing it until
    /// [`Self::remove_category_from_tasks`] runs.
    pub async fn delete_category(&self, category_id: CategoryId) -> TodoResult<bool> {
        let deleted = self
            .modify(CATEGORIES_KEY, &self.categories, |categories| {
                Ok(remove_where(categories, |c| c.id == category_id))
            })
            .await?;

        Ok(deleted.is_some())
    }

    /// Creates a category whose id follows the largest existing one.
    pub async fn create_category(&self, name: &str) -> TodoResult<Category> {
        let name = validate_name("category name", name)?;

        self.apply(CATEGORIES_KEY, &self.categories, |categories| {
            let id = CategoryId::next_after(categories.iter().map(|c| c.id))
                .ok_or_else(|| TodoError::validation("no category id is left to assign"))?;
            let category = Category::new(id, name);

            categories.push(category.clone());
            Ok((category, true))
        })
        .await
    }

    pub async fn rename_category(
        &self,
        category_id: CategoryId,
        name: &str,
    ) -> TodoResult<Option<Category>> {
        let name = validate_name("category name", name)?;

        self.modify(CATEGORIES_KEY, &self.categories, |categories| {
            let Some(category) = categories.iter_mut().find(|c| c.id == category_id) else {
                return Ok(None);
            };

            category.name = name;
            category.touch();

            Ok(Some(category.clone()))
        })
        .await
    }

    /// Strips the category from every task, then deletes the record. Tasks are
    /// cleaned even when the record was already gone; if cleaning fails the
    /// record stays, so retrying finishes the job.
    pub async fn delete_category_cascade(&self, category_id: CategoryId) -> TodoResult<bool> {
        let changed = self.remove_category_from_tasks(category_id).await?;
        let deleted = self.delete_category(category_id).await?;

        log::debug!(
            "Deleted category {} (existed: {}), detached from {} tasks",
            category_id,
            deleted,
            changed
        );

        Ok(deleted)
    }

    // -------------------------------------------------------------------------
    // Persistence
    // -------------------------------------------------------------------------

    /// [`Self::apply`] for transforms where `Ok(None)` means nothing matched.
    async fn modify<T, R>(
        &self,
        key: &str,
        snapshot: &watch::Sender<Vec<T>>,
        transform: impl FnOnce(&mut Vec<T>) -> TodoResult<Option<R>>,
    ) -> TodoResult<Option<R>>
    where
        T: Clone + Serialize,
    {
        self.apply(key, snapshot, |items| {
            let result = transform(items)?;
            let changed = result.is_some();

            Ok((result, changed))
        })
        .await
    }

    /// Runs `transform` on a copy of the current snapshot. When it reports no
    /// change there is no write and no publish. Otherwise the whole collection
    /// is persisted and, once the store confirmed the write, published.
    async fn apply<T, R>(
        &self,
        key: &str,
        snapshot: &watch::Sender<Vec<T>>,
        transform: impl FnOnce(&mut Vec<T>) -> TodoResult<(R, bool)>,
    ) -> TodoResult<R>
    where
        T: Clone + Serialize,
    {
        let _guard = self.write_lock.lock().await;

        if !self.initialized.load(Ordering::Acquire) {
            return Err(TodoError::StorageUnavailable(anyhow!(
                "local store is not initialized"
            )));
        }

        let mut items = snapshot.borrow().clone();

        let (result, changed) = transform(&mut items)?;

        if changed {
            self.persist(key, &items).await?;
            snapshot.send_replace(items);
        }

        Ok(result)
    }

    async fn load<T: DeserializeOwned>(&self, key: &str) -> TodoResult<Vec<T>> {
        let Some(value) = self.store.get(key).await.storage()? else {
            return Ok(Vec::new());
        };

        if value.is_null() {
            return Ok(Vec::new());
        }

        serde_json::from_value(value)
            .with_context(|| format!("stored `{}` collection is malformed", key))
            .storage()
    }

    async fn persist<T: Serialize>(&self, key: &str, items: &[T]) -> TodoResult<()> {
        let value = serde_json::to_value(items)
            .with_context(|| format!("could not serialize `{}` collection", key))
            .storage()?;

        self.store.set(key, value).await.storage()?;

        log::debug!("Persisted {} records under `{}`", items.len(), key);
        Ok(())
    }
}

/// Trims `value` and rejects it if nothing is left.
fn validate_name(what: &str, value: &str) -> TodoResult<String> {
    let trimmed = value.trim();

    if trimmed.is_empty() {
        return Err(TodoError::validation(format!("{} must not be empty", what)));
    }

    Ok(trimmed.to_string())
}

fn replace_where<T>(items: &mut [T], matches: impl Fn(&T) -> bool, item: T) -> Option<()> {
    let slot = items.iter_mut().find(|x| matches(x))?;
    *slot = item;

    Some(())
}

fn remove_where<T>(items: &mut Vec<T>, matches: impl Fn(&T) -> bool) -> Option<()> {
    let before = items.len();
    items.retain(|x| !matches(x));

    (items.len() != before).then_some(())
}
