use rocket::serde::json::Json;
use serde::Deserialize;

use crate::{
    app::error::FoundExt,
    model::{Category, CategoryId},
};

use super::super::{ContextState, Response};

#[get("/categories")]
pub fn get_categories(context: &ContextState) -> Response<Vec<Category>> {
    Response::from_data(context.todos.get_current_categories())
}

#[derive(Deserialize)]
pub struct CategoryInputData {
    name: String,
}

#[post("/categories", format = "application/json", data = "<data>")]
pub async fn create_category(
    context: &ContextState,
    data: Json<CategoryInputData>,
) -> Response<Category> {
    context.todos.create_category(&data.name).await.into()
}

#[put("/categories/<category_id>", format = "application/json", data = "<data>")]
pub async fn rename_category(
    context: &ContextState,
    category_id: i64,
    data: Json<CategoryInputData>,
) -> Response<Category> {
    context
        .todos
        .rename_category(CategoryId::from_raw(category_id), &data.name)
        .await
        .found("category", category_id)
        .into()
}

/// Deletes the category and detaches it from every task.
#[delete("/categories/<category_id>")]
pub async fn delete_category(context: &ContextState, category_id: i64) -> Response<()> {
    context
        .todos
        .delete_category_cascade(CategoryId::from_raw(category_id))
        .await
        .found("category", category_id)
        .into()
}
