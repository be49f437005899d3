use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Rider,
    Driver,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub phone: String,
    pub role: Role,
}

impl User {
    pub fn new(phone: String, role: Role) -> Self {
        Self {
            id: Uuid::new_v4(),
            phone,
            role,
        }
    }
}
