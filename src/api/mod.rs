use std::sync::Arc;

use rocket::{Build, Rocket};

mod context;
pub mod controllers;
mod response;

pub use context::{Context, ContextState};
pub use response::Response;

/// Creates [`Rocket`] object that serves API requests using the provided context.
pub fn initialize_api(context: Arc<Context>) -> Rocket<Build> {
    let api_routes = routes![
        controllers::tasks::get_tasks,
        controllers::tasks::get_all_tasks,
        controllers::tasks::create_task,
        controllers::tasks::modify_task,
        controllers::tasks::toggle_task,
        controllers::tasks::toggle_task_category,
        controllers::tasks::delete_task,
        controllers::categories::get_categories,
        controllers::categories::create_category,
        controllers::categories::rename_category,
        controllers::categories::delete_category,
        controllers::filter::get_filter,
        controllers::filter::set_pending_filter,
        controllers::filter::toggle_category_filter,
        controllers::filter::clear_category_filter,
        controllers::features::get_features,
    ];

    rocket::build().manage(context).mount("/api", api_routes)
}

#[cfg(test)]
mod tests {
    use rocket::{
        http::{ContentType, Status},
        local::asynchronous::Client,
    };
    use serde_json::{json, Value};

    use super::*;
    use crate::{
        app::{flags::FeatureFlagService, todos::TodoService},
        storage::inmemory::{InMemoryStore, StaticFlagSource},
    };

    async fn client(flags: &str) -> Client {
        let todos = TodoService::new(Arc::new(InMemoryStore::new()));
        todos.initialize().await.unwrap();

        let flags = FeatureFlagService::new(Arc::new(StaticFlagSource::parse(flags).unwrap()));
        let context = Arc::new(Context::new(todos, flags));

        Client::tracked(initialize_api(context)).await.unwrap()
    }

    async fn send(client: &Client, method: &str, uri: &str, body: Option<Value>) -> (Status, Value) {
        let request = match method {
            "GET" => client.get(uri),
            "POST" => client.post(uri),
            "PUT" => client.put(uri),
            "DELETE" => client.delete(uri),
            other => panic!("unsupported method {}", other),
        };

        let request = match body {
            Some(body) => request.header(ContentType::JSON).body(body.to_string()),
            None => request,
        };

        let response = request.dispatch().await;
        let status = response.status();
        let body = if status == Status::Ok {
            response.into_json::<Value>().await.unwrap()
        } else {
            Value::Null
        };

        (status, body)
    }

    #[rocket::async_test]
    async fn task_lifecycle() {
        let client = client("").await;

        let (status, body) = send(&client, "POST", "/api/tasks", Some(json!({ "title": " Buy milk " }))).await;
        assert_eq!(status, Status::Ok);
        assert_eq!(body["error_code"], "");
        assert_eq!(body["data"]["title"], "Buy milk");
        assert_eq!(body["data"]["completed"], false);
        let id = body["data"]["id"].as_str().unwrap().to_string();

        let (_, body) = send(&client, "PUT", &format!("/api/tasks/{}/toggle", id), None).await;
        assert_eq!(body["data"]["completed"], true);

        let (_, body) = send(
            &client,
            "PUT",
            &format!("/api/tasks/{}", id),
            Some(json!({ "title": "Buy oat milk", "description": "2 litres", "completed": false, "categoryId": [3] })),
        )
        .await;
        assert_eq!(body["data"]["title"], "Buy oat milk");
        assert_eq!(body["data"]["categoryId"], json!([3]));
        assert!(body["data"]["updatedAt"].is_string());

        let (status, _) = send(&client, "DELETE", &format!("/api/tasks/{}", id), None).await;
        assert_eq!(status, Status::Ok);

        let (status, _) = send(&client, "DELETE", &format!("/api/tasks/{}", id), None).await;
        assert_eq!(status, Status::NotFound);

        let (_, body) = send(&client, "GET", "/api/tasks/all", None).await;
        assert_eq!(body["data"], json!([]));
    }

    #[rocket::async_test]
    async fn blank_title_is_reported_as_invalid_input() {
        let client = client("").await;

        let (status, body) = send(&client, "POST", "/api/tasks", Some(json!({ "title": "   " }))).await;

        assert_eq!(status, Status::Ok);
        assert_eq!(body["error_code"], "invalid_input");
        assert_eq!(body["data"], Value::Null);
    }

    #[rocket::async_test]
    async fn unknown_task_is_not_found() {
        let client = client("").await;

        let (status, _) = send(&client, "PUT", "/api/tasks/nope/toggle", None).await;
        assert_eq!(status, Status::NotFound);

        let (status, _) = send(
            &client,
            "PUT",
            "/api/tasks/nope",
            Some(json!({ "title": "x", "completed": false })),
        )
        .await;
        assert_eq!(status, Status::NotFound);
    }

    #[rocket::async_test]
    async fn deleting_a_category_detaches_it_from_tasks() {
        let client = client("").await;

        let (_, body) = send(&client, "POST", "/api/categories", Some(json!({ "name": "Home" }))).await;
        assert_eq!(body["data"]["id"], 1);
        let (_, body) = send(&client, "POST", "/api/categories", Some(json!({ "name": "Work" }))).await;
        assert_eq!(body["data"]["id"], 2);

        let (_, body) = send(&client, "POST", "/api/tasks", Some(json!({ "title": "Paint fence" }))).await;
        let id = body["data"]["id"].as_str().unwrap().to_string();
        send(&client, "PUT", &format!("/api/tasks/{}/categories/1", id), None).await;
        let (_, body) = send(&client, "PUT", &format!("/api/tasks/{}/categories/2", id), None).await;
        assert_eq!(body["data"]["categoryId"], json!([1, 2]));

        let (_, body) = send(&client, "PUT", "/api/categories/2", Some(json!({ "name": "Office" }))).await;
        assert_eq!(body["data"]["name"], "Office");

        let (status, _) = send(&client, "DELETE", "/api/categories/1", None).await;
        assert_eq!(status, Status::Ok);

        let (_, body) = send(&client, "GET", "/api/tasks/all", None).await;
        assert_eq!(body["data"][0]["categoryId"], json!([2]));

        let (_, body) = send(&client, "GET", "/api/categories", None).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 1);

        let (status, _) = send(&client, "DELETE", "/api/categories/1", None).await;
        assert_eq!(status, Status::NotFound);
    }

    #[rocket::async_test]
    async fn task_listing_follows_the_filter() {
        let client = client("").await;

        let (_, body) = send(&client, "POST", "/api/tasks", Some(json!({ "title": "open" }))).await;
        let open = body["data"]["id"].as_str().unwrap().to_string();
        let (_, body) = send(&client, "POST", "/api/tasks", Some(json!({ "title": "done" }))).await;
        let done = body["data"]["id"].as_str().unwrap().to_string();

        send(&client, "PUT", &format!("/api/tasks/{}/toggle", done), None).await;
        send(&client, "PUT", &format!("/api/tasks/{}/categories/2", done), None).await;
        send(&client, "PUT", &format!("/api/tasks/{}/categories/1", open), None).await;

        let (_, body) = send(&client, "PUT", "/api/filter/pending", None).await;
        assert_eq!(body["data"], json!({ "pendingOnly": true, "categories": [] }));
        let (_, body) = send(&client, "GET", "/api/tasks", None).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
        assert_eq!(body["data"][0]["id"], open.as_str());

        send(&client, "PUT", "/api/filter/pending?enabled=false", None).await;
        send(&client, "PUT", "/api/filter/categories/2", None).await;
        let (_, body) = send(&client, "GET", "/api/tasks", None).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
        assert_eq!(body["data"][0]["id"], done.as_str());

        send(&client, "PUT", "/api/filter/pending?enabled=true", None).await;
        let (_, body) = send(&client, "GET", "/api/tasks", None).await;
        assert_eq!(body["data"], json!([]));

        let (_, body) = send(&client, "DELETE", "/api/filter/categories", None).await;
        assert_eq!(body["data"]["categories"], json!([]));
        let (_, body) = send(&client, "GET", "/api/filter", None).await;
        assert_eq!(body["data"]["pendingOnly"], true);

        let (_, body) = send(&client, "GET", "/api/tasks/all", None).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 2);
    }

    #[rocket::async_test]
    async fn features_reflect_configured_flags() {
        let enabled = client("enableCategories").await;
        let (_, body) = send(&enabled, "GET", "/api/features", None).await;
        assert_eq!(body["data"], json!({ "enableCategories": true }));

        let disabled = client("enableCategories=false").await;
        let (_, body) = send(&disabled, "GET", "/api/features", None).await;
        assert_eq!(body["data"], json!({ "enableCategories": false }));
    }
}
