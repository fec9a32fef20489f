use serde::{Deserialize, Serialize};

use super::types::{self, CategoryId, Timestamp};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Category {
    pub fn new(id: CategoryId, name: String) -> Self {
        let now = types::now();

        Self {
            id,
            name,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = types::now();
    }
}
