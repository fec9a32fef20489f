#[macro_use]
extern crate rocket;

mod api;
mod app;
mod model;
mod storage;

use std::sync::Arc;

use api::{initialize_api, Context};
use app::{
    flags::FeatureFlagService,
    repositories::{FlagSource, KeyValueStore},
    todos::TodoService,
};
use storage::{
    db::{DatabaseConnection, DbStore},
    inmemory::{InMemoryStore, StaticFlagSource},
};

struct Environment {
    database_url: Option<String>,
    feature_flags: Option<String>,
}

fn read_environment() -> Environment {
    let database_url = std::env::var("DATABASE").ok();
    let feature_flags = std::env::var("FEATURE_FLAGS").ok();

    Environment {
        database_url,
        feature_flags,
    }
}

fn init_logging() {
    env_logger::init();
}

fn create_store(env: &Environment) -> anyhow::Result<Arc<dyn KeyValueStore>> {
    if let Some(url) = &env.database_url {
        log::info!("Opening local database: {}", url);
        let db = Arc::new(DatabaseConnection::connect(url)?);

        Ok(Arc::new(DbStore::new(db)))
    } else {
        log::info!("Using in-memory store, since database URL is not set.");
        Ok(Arc::new(InMemoryStore::new()))
    }
}

fn create_flag_source(env: &Environment) -> anyhow::Result<Arc<dyn FlagSource>> {
    let spec = env.feature_flags.as_deref().unwrap_or_default();

    Ok(Arc::new(StaticFlagSource::parse(spec)?))
}

async fn create_context(env: &Environment) -> anyhow::Result<Context> {
    let todos = TodoService::new(create_store(env)?);
    todos.initialize().await?;

    let flags = FeatureFlagService::new(create_flag_source(env)?);

    Ok(Context::new(todos, flags))
}

#[rocket::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    log::info!("Start");

    let environment = read_environment();
    let context = Arc::new(create_context(&environment).await?);

    initialize_api(context)
        .launch()
        .await
        .map_err(|err| anyhow::anyhow!("server failed: {}", err))?;

    Ok(())
}
