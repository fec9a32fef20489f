use rocket::{
    http::Status,
    response,
    serde::{json::Json, Serialize},
    Request,
};

use crate::app::error::{TodoError, TodoResult};

#[derive(Debug)]
pub enum Response<T> {
    Success(Json<ResponseBody<T>>),
    NotFound,
    ServerError(TodoError),
}

#[derive(Debug, Serialize)]
pub struct ResponseBody<T> {
    error_code: &'static str,
    data: Option<T>,
}

impl<T> Response<T> {
    pub fn from_error(error_code: &'static str) -> Self {
        Self::Success(Json(ResponseBody {
            error_code,
            data: None,
        }))
    }

    pub fn from_data(data: T) -> Self {
        Self::Success(Json(ResponseBody {
            error_code: "",
            data: Some(data),
        }))
    }
}

impl<T> From<TodoError> for Response<T> {
    fn from(error: TodoError) -> Self {
        match error {
            TodoError::Validation(message) => {
                log::debug!("Rejected input: {}", message);
                Self::from_error("invalid_input")
            }
            TodoError::NotFound { .. } => Self::NotFound,
            error @ TodoError::StorageUnavailable(_) => Self::ServerError(error),
        }
    }
}

impl<T> From<TodoResult<T>> for Response<T> {
    fn from(result: TodoResult<T>) -> Self {
        match result {
            Ok(data) => Self::from_data(data),
            Err(error) => error.into(),
        }
    }
}

impl<'r, 'o: 'r, T: Serialize> response::Responder<'r, 'o> for Response<T> {
    fn respond_to(self, request: &'r Request<'_>) -> response::Result<'o> {
        match self {
            Response::Success(r) => r.respond_to(request),
            Response::NotFound => Status::NotFound.respond_to(request),
            Response::ServerError(error) => {
                log::error!("ServerError: {}", error);
                Status::InternalServerError.respond_to(request)
            }
        }
    }
}
