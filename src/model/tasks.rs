use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize};

use super::types::{self, CategoryId, Timestamp};

pub type TaskId = String;

/// Creation-time millis followed by a short random suffix, so two tasks
/// created within the same millisecond still get distinct ids.
pub fn generate_task_id() -> TaskId {
    let mut rng = rand::thread_rng();

    let mut bytes: [u8; 4] = [0; 4];
    bytes.iter_mut().for_each(|b| *b = rng.gen());

    format!("{}{}", types::now().timestamp_millis(), hex::encode(bytes))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub category_id: Vec<CategoryId>,
    pub created_at: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
}

impl Task {
    pub fn new(id: TaskId, title: String, description: Option<String>) -> Self {
        Self {
            id,
            title,
            description,
            completed: false,
            category_id: Vec::new(),
            created_at: types::now(),
            updated_at: None,
        }
    }

    pub fn has_category(&self, category_id: CategoryId) -> bool {
        self.category_id.contains(&category_id)
    }

    /// Removes `category_id` if present, appends it otherwise.
    pub fn toggle_category(&mut self, category_id: CategoryId) {
        if self.has_category(category_id) {
            self.category_id.retain(|&c| c != category_id);
        } else {
            self.category_id.push(category_id);
        }
    }

    /// Returns whether the task referenced the category.
    pub fn remove_category(&mut self, category_id: CategoryId) -> bool {
        let before = self.category_id.len();
        self.category_id.retain(|&c| c != category_id);

        self.category_id.len() != before
    }

    pub fn touch(&mut self) {
        self.updated_at = Some(types::now());
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<CategoryId>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<CategoryId>>::deserialize(deserializer)?.unwrap_or_default())
}
