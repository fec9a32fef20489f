#[derive(Debug, thiserror::Error)]
pub enum TodoError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("storage unavailable: {0:#}")]
    StorageUnavailable(#[source] anyhow::Error),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },
}

pub type TodoResult<T> = Result<T, TodoError>;

impl TodoError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

pub trait StorageResultExt<T> {
    fn storage(self) -> TodoResult<T>;
}

impl<T> StorageResultExt<T> for anyhow::Result<T> {
    fn storage(self) -> TodoResult<T> {
        self.map_err(TodoError::StorageUnavailable)
    }
}

/// Turns the permissive "nothing matched" outcome of a mutation into
/// [`TodoError::NotFound`], for callers that want to report it.
pub trait FoundExt<T> {
    fn found(self, entity: &'static str, id: impl ToString) -> TodoResult<T>;
}

impl<T> FoundExt<T> for TodoResult<Option<T>> {
    fn found(self, entity: &'static str, id: impl ToString) -> TodoResult<T> {
        self?.ok_or_else(|| TodoError::not_found(entity, id))
    }
}

impl FoundExt<()> for TodoResult<bool> {
    fn found(self, entity: &'static str, id: impl ToString) -> TodoResult<()> {
        if self? {
            Ok(())
        } else {
            Err(TodoError::not_found(entity, id))
        }
    }
}
