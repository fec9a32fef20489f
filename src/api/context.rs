use std::sync::Arc;

use rocket::State;

use crate::app::{
    filter::{FilterState, FilteredTasks},
    flags::FeatureFlagService,
    todos::TodoService,
};

pub type ContextState = State<Arc<Context>>;

pub struct Context {
    pub todos: TodoService,
    pub filter: FilterState,
    pub filtered: FilteredTasks,
    pub flags: FeatureFlagService,
}

impl Context {
    pub fn new(todos: TodoService, flags: FeatureFlagService) -> Self {
        let filter = FilterState::new();
        let filtered = filter.view(todos.subscribe_tasks());

        Self {
            todos,
            filter,
            filtered,
            flags,
        }
    }
}
