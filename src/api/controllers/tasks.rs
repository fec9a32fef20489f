use rocket::serde::json::Json;
use serde::Deserialize;

use crate::{
    app::error::{FoundExt, TodoError, TodoResult},
    model::{CategoryId, Task},
};

use super::super::{ContextState, Response};

/// Tasks matching the current filter.
#[get("/tasks")]
pub fn get_tasks(context: &ContextState) -> Response<Vec<Task>> {
    Response::from_data(context.filtered.current())
}

#[get("/tasks/all")]
pub fn get_all_tasks(context: &ContextState) -> Response<Vec<Task>> {
    Response::from_data(context.todos.get_current_tasks())
}

#[derive(Deserialize)]
pub struct NewTaskData {
    title: String,
    description: Option<String>,
}

#[post("/tasks", format = "application/json", data = "<data>")]
pub async fn create_task(context: &ContextState, data: Json<NewTaskData>) -> Response<Task> {
    context
        .todos
        .create_task(&data.title, data.description.as_deref())
        .await
        .into()
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskInputData {
    title: String,
    description: Option<String>,
    completed: bool,
    #[serde(default)]
    category_id: Vec<CategoryId>,
}

#[put("/tasks/<task_id>", format = "application/json", data = "<data>")]
pub async fn modify_task(
    context: &ContextState,
    task_id: &str,
    data: Json<TaskInputData>,
) -> Response<Task> {
    replace_task(context, task_id, data.into_inner()).await.into()
}

async fn replace_task(
    context: &ContextState,
    task_id: &str,
    data: TaskInputData,
) -> TodoResult<Task> {
    let todos = &context.todos;

    // The creation time is owned by the stored record, not the client.
    let existing = todos
        .get_current_tasks()
        .into_iter()
        .find(|t| t.id == task_id)
        .ok_or_else(|| TodoError::not_found("task", task_id))?;

    let mut task = Task {
        title: data.title.trim().to_string(),
        description: data.description,
        completed: data.completed,
        category_id: data.category_id,
        ..existing
    };
    task.touch();

    todos.update_task(task.clone()).await.found("task", task_id)?;
    Ok(task)
}

#[put("/tasks/<task_id>/toggle")]
pub async fn toggle_task(context: &ContextState, task_id: &str) -> Response<Task> {
    context
        .todos
        .toggle_task(task_id)
        .await
        .found("task", task_id)
        .into()
}

#[put("/tasks/<task_id>/categories/<category_id>")]
pub async fn toggle_task_category(
    context: &ContextState,
    task_id: &str,
    category_id: i64,
) -> Response<Task> {
    context
        .todos
        .toggle_task_category(task_id, CategoryId::from_raw(category_id))
        .await
        .found("task", task_id)
        .into()
}

#[delete("/tasks/<task_id>")]
pub async fn delete_task(context: &ContextState, task_id: &str) -> Response<()> {
    context
        .todos
        .delete_task(task_id)
        .await
        .found("task", task_id)
        .into()
}
