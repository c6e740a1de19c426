//! Create, read, update and delete operations on profiles.
//!
//! Input structs carry declarative field constraints (`validator`); the write
//! path validates them, checks the referenced role and turns an assigned
//! picture filename into a generated storage path.

use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryOrder, Set,
};
use tracing::{debug, info, instrument, trace, warn};
use validator::{Validate, ValidationError};

use crate::entities::{profile, role};
use crate::entities::profile::Gender;
use crate::error::{ModelError, Result};
use crate::upload::profile_image_path;

/// Base user-record fields supplied by the authentication layer.
#[derive(Debug, Clone, Default, Validate)]
pub struct Credentials {
    #[validate(length(min = 1, max = 150))]
    pub username: String,
    /// Already hashed password; it is stored as given.
    #[validate(length(min = 1, max = 128))]
    pub password: String,
    #[validate(length(max = 254))]
    pub email: String,
    #[validate(length(max = 150))]
    pub first_name: String,
    #[validate(length(max = 150))]
    pub last_name: String,
}

/// Input for creating a profile.
#[derive(Debug, Clone, Default, Validate)]
pub struct NewProfile {
    #[validate(nested)]
    pub credentials: Credentials,
    pub birth_date: Option<NaiveDate>,
    #[validate(length(max = 15))]
    pub number: String,
    /// Gender code: `M`, `F`, `O`, or empty for unset.
    #[validate(custom(function = "validate_gender_code"))]
    pub gender: String,
    pub roles_id: Option<i32>,
    /// Original filename of an uploaded picture. Only its extension is kept.
    pub profile_picture: Option<String>,
}

/// Field-level partial update of a profile.
///
/// `None` leaves a field unchanged. For nullable fields `Some(None)` clears the value.
#[derive(Debug, Clone, Default, Validate)]
pub struct ProfileChanges {
    #[validate(length(min = 1, max = 150))]
    pub username: Option<String>,
    #[validate(length(min = 1, max = 128))]
    pub password: Option<String>,
    #[validate(length(max = 254))]
    pub email: Option<String>,
    #[validate(length(max = 150))]
    pub first_name: Option<String>,
    #[validate(length(max = 150))]
    pub last_name: Option<String>,
    pub is_active: Option<bool>,
    pub birth_date: Option<Option<NaiveDate>>,
    #[validate(length(max = 15))]
    pub number: Option<String>,
    /// Gender code; the empty string clears it.
    #[validate(custom(function = "validate_gender_code"))]
    pub gender: Option<String>,
    pub roles_id: Option<Option<i32>>,
    /// New original picture filename, or `Some(None)` to remove the picture.
    pub profile_picture: Option<Option<String>>,
}

impl ProfileChanges {
    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.password.is_none()
            && self.email.is_none()
            && self.first_name.is_none()
            && self.last_name.is_none()
            && self.is_active.is_none()
            && self.birth_date.is_none()
            && self.number.is_none()
            && self.gender.is_none()
            && self.roles_id.is_none()
            && self.profile_picture.is_none()
    }
}

fn validate_gender_code(code: &str) -> std::result::Result<(), ValidationError> {
    match Gender::parse_code(code) {
        Ok(_) => Ok(()),
        Err(_) => {
            let mut err = ValidationError::new("gender");
            err.message = Some(format!("'{}' is not one of M, F, O or empty", code).into());
            Err(err)
        }
    }
}

async fn ensure_role_exists(db: &DatabaseConnection, role_id: i32) -> Result<()> {
    match role::Entity::find_by_id(role_id).one(db).await? {
        Some(_) => {
            debug!("Role {} exists", role_id);
            Ok(())
        }
        None => {
            warn!("Role {} not found", role_id);
            Err(ModelError::Reference(format!("Role with ID {} not found", role_id)))
        }
    }
}

/// Creates a profile. `created_at` is stamped by the entity on insert.
#[instrument(skip(db, input), fields(username = %input.credentials.username))]
pub async fn create(db: &DatabaseConnection, input: NewProfile) -> Result<profile::Model> {
    trace!("Entering profiles::create");
    input.validate()?;
    let gender = Gender::parse_code(&input.gender)?;

    if let Some(role_id) = input.roles_id {
        ensure_role_exists(db, role_id).await?;
    }

    let profile_picture = match input.profile_picture.as_deref() {
        Some(filename) => Some(profile_image_path(filename)?),
        None => None,
    };

    let credentials = input.credentials;
    let username = credentials.username.clone();
    let new_profile = profile::ActiveModel {
        username: Set(credentials.username),
        password: Set(credentials.password),
        email: Set(credentials.email),
        first_name: Set(credentials.first_name),
        last_name: Set(credentials.last_name),
        is_active: Set(true),
        birth_date: Set(input.birth_date),
        number: Set(input.number),
        gender: Set(gender),
        profile_picture: Set(profile_picture),
        roles_id: Set(input.roles_id),
        ..Default::default()
    };

    let created = new_profile
        .insert(db)
        .await
        .map_err(|e| ModelError::from_write(e, "Profile", "username", &username))?;
    info!("Created profile '{}' with ID {}", created.username, created.id);
    Ok(created)
}

#[instrument(skip(db))]
pub async fn get(db: &DatabaseConnection, id: i32) -> Result<Option<profile::Model>> {
    Ok(profile::Entity::find_by_id(id).one(db).await?)
}

#[instrument(skip(db))]
pub async fn get_by_username(
    db: &DatabaseConnection,
    username: &str,
) -> Result<Option<profile::Model>> {
    Ok(profile::Entity::find_by_username(username).one(db).await?)
}

pub async fn list(db: &DatabaseConnection) -> Result<Vec<profile::Model>> {
    let profiles = profile::Entity::find()
        .order_by_asc(profile::Column::Id)
        .all(db)
        .await?;
    debug!("Fetched {} profiles", profiles.len());
    Ok(profiles)
}

/// Applies `changes` to the profile with the given ID and returns the updated row.
#[instrument(skip(db, changes))]
pub async fn update(
    db: &DatabaseConnection,
    id: i32,
    changes: ProfileChanges,
) -> Result<profile::Model> {
    trace!("Entering profiles::update");
    changes.validate()?;

    let existing = profile::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(ModelError::NotFound { entity: "Profile", id })?;

    if changes.is_empty() {
        debug!("No fields to update for profile {}", id);
        return Ok(existing);
    }

    let username = changes
        .username
        .clone()
        .unwrap_or_else(|| existing.username.clone());
    let mut active = existing.into_active_model();
    let mut updated_fields = Vec::new();

    if let Some(value) = changes.username {
        active.username = Set(value);
        updated_fields.push("username");
    }
    if let Some(value) = changes.password {
        active.password = Set(value);
        updated_fields.push("password");
    }
    if let Some(value) = changes.email {
        active.email = Set(value);
        updated_fields.push("email");
    }
    if let Some(value) = changes.first_name {
        active.first_name = Set(value);
        updated_fields.push("first_name");
    }
    if let Some(value) = changes.last_name {
        active.last_name = Set(value);
        updated_fields.push("last_name");
    }
    if let Some(value) = changes.is_active {
        active.is_active = Set(value);
        updated_fields.push("is_active");
    }
    if let Some(value) = changes.birth_date {
        active.birth_date = Set(value);
        updated_fields.push("birth_date");
    }
    if let Some(value) = changes.number {
        active.number = Set(value);
        updated_fields.push("number");
    }
    if let Some(code) = changes.gender {
        active.gender = Set(Gender::parse_code(&code)?);
        updated_fields.push("gender");
    }
    if let Some(value) = changes.roles_id {
        if let Some(role_id) = value {
            ensure_role_exists(db, role_id).await?;
        }
        active.roles_id = Set(value);
        updated_fields.push("roles_id");
    }
    if let Some(value) = changes.profile_picture {
        // The previously stored file is left in place
        let path = match value.as_deref() {
            Some(filename) => Some(profile_image_path(filename)?),
            None => None,
        };
        active.profile_picture = Set(path);
        updated_fields.push("profile_picture");
    }

    debug!("Updating fields: {}", updated_fields.join(", "));
    let updated = active
        .update(db)
        .await
        .map_err(|e| ModelError::from_write(e, "Profile", "username", &username))?;
    info!("Profile with ID {} updated", id);
    Ok(updated)
}

/// Deletes the profile with the given ID.
#[instrument(skip(db))]
pub async fn delete(db: &DatabaseConnection, id: i32) -> Result<()> {
    let result = profile::Entity::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        warn!("Profile with ID {} not found for deletion", id);
        return Err(ModelError::NotFound { entity: "Profile", id });
    }
    info!("Deleted profile with ID {}", id);
    Ok(())
}
