use serde::{Deserialize, Serialize};

use crate::entities::users;

/// User record without the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub full_name: Option<String>,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            email: model.email,
            full_name: model.full_name,
            is_active: model.is_active,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

const fn default_true() -> bool {
    true
}

/// Partial update. Fields left as `None` keep their stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserChanges {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub full_name: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserQuery {
    #[serde(default)]
    pub skip: u64,
    #[serde(default = "default_limit")]
    pub limit: u64,
    #[serde(default)]
    pub search: Option<String>,
}

const fn default_limit() -> u64 {
    crate::constants::limits::DEFAULT_PAGE_SIZE
}

impl Default for UserQuery {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: default_limit(),
            search: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UserPage {
    pub users: Vec<User>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

impl UserPage {
    /// `page` is 1-based and derived from `skip / limit`.
    #[must_use]
    pub fn new(users: Vec<User>, total: u64, skip: u64, limit: u64) -> Self {
        let page = if limit > 0 {
            (skip / limit).saturating_add(1)
        } else {
            1
        };
        Self {
            users,
            total,
            page,
            per_page: limit,
        }
    }
}
