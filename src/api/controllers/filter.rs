use crate::{app::filter::TaskFilter, model::CategoryId};

use super::super::{ContextState, Response};

#[get("/filter")]
pub fn get_filter(context: &ContextState) -> Response<TaskFilter> {
    Response::from_data(context.filter.current())
}

/// Sets the pending-only flag, or flips it when `enabled` is omitted.
#[put("/filter/pending?<enabled>")]
pub fn set_pending_filter(context: &ContextState, enabled: Option<bool>) -> Response<TaskFilter> {
    let filter = &context.filter;

    match enabled {
        Some(enabled) => filter.set_pending_only(enabled),
        None => {
            filter.toggle_pending_only();
        }
    }

    Response::from_data(filter.current())
}

#[put("/filter/categories/<category_id>")]
pub fn toggle_category_filter(context: &ContextState, category_id: i64) -> Response<TaskFilter> {
    context
        .filter
        .toggle_category(CategoryId::from_raw(category_id));

    Response::from_data(context.filter.current())
}

#[delete("/filter/categories")]
pub fn clear_category_filter(context: &ContextState) -> Response<TaskFilter> {
    context.filter.clear_categories();

    Response::from_data(context.filter.current())
}
