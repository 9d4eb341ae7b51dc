use serde::{Deserialize, Serialize};

use crate::location::Location;

/// Account record returned by `GET /users`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub id_google: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    /// Set until the user has registered their first farm.
    #[serde(default)]
    pub is_onboarding: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(flatten)]
    pub user: User,
    #[serde(default)]
    pub locations: Vec<Location>,
}

/// Body of `PATCH /users`. Absent fields are left untouched by the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_onboarding: Option<bool>,
}

impl UserUpdate {
    /// The update sent after the first farm is saved.
    #[must_use]
    pub fn finish_onboarding(user: &User) -> Self {
        Self {
            id_user: Some(user.id.clone()),
            email: Some(user.email.clone()),
            is_onboarding: Some(false),
            name: None,
        }
    }
}
