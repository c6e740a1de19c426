use chrono::{NaiveDate, NaiveDateTime};
use model::entities::{profile, role};
use serde::{Deserialize, Serialize};

/// Role as printed by the CLI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleResponse {
    pub id: i32,
    pub name: String,
}

impl From<role::Model> for RoleResponse {
    fn from(model: role::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
        }
    }
}

/// Profile as printed by the CLI. The password hash is never included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    /// First and last name joined, empty when neither is set
    pub full_name: String,
    pub is_active: bool,
    pub birth_date: Option<NaiveDate>,
    pub number: String,
    /// Gender code (`M`, `F`, `O`), absent when unset
    pub gender: Option<String>,
    pub created_at: NaiveDateTime,
    pub profile_picture: Option<String>,
    pub role_id: Option<i32>,
}

impl From<profile::Model> for ProfileResponse {
    fn from(model: profile::Model) -> Self {
        let full_name = model.full_name();
        Self {
            id: model.id,
            username: model.username,
            email: model.email,
            first_name: model.first_name,
            last_name: model.last_name,
            full_name,
            is_active: model.is_active,
            birth_date: model.birth_date,
            number: model.number,
            gender: model.gender.map(|g| g.code().to_string()),
            created_at: model.created_at,
            profile_picture: model.profile_picture,
            role_id: model.roles_id,
        }
    }
}

/// Result of deleting a row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub id: i32,
    pub deleted: bool,
}

/// Counts reported by the Django import
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub roles_created: usize,
    pub roles_reused: usize,
    pub profiles_created: usize,
    pub profiles_skipped: usize,
    pub records_ignored: usize,
}

/// A generated profile picture path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PicturePathResponse {
    pub original_filename: String,
    pub path: String,
}
