use serde::Serialize;

use crate::app::flags::ENABLE_CATEGORIES;

use super::super::{ContextState, Response};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Features {
    enable_categories: bool,
}

/// Flag lookup failures hide the optional features instead of failing.
#[get("/features")]
pub async fn get_features(context: &ContextState) -> Response<Features> {
    let enable_categories = match context.flags.is_enabled(ENABLE_CATEGORIES).await {
        Ok(enabled) => enabled,
        Err(err) => {
            log::warn!("Feature flags unavailable, categories stay hidden: {:#}", err);
            false
        }
    };

    Response::from_data(Features { enable_categories })
}
