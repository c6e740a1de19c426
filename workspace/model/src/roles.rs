//! Administrative operations on roles: create, read and delete.

use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};
use tracing::{debug, info, instrument, trace};
use validator::Validate;

use crate::entities::role;
use crate::error::{ModelError, Result};

/// Input for creating a role.
#[derive(Debug, Clone, Validate)]
pub struct NewRole {
    #[validate(length(min = 1, max = 50))]
    pub name: String,
}

impl NewRole {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Creates a role. Fails with a uniqueness violation when the name is taken.
#[instrument(skip(db))]
pub async fn create(db: &DatabaseConnection, input: NewRole) -> Result<role::Model> {
    trace!("Entering roles::create");
    input.validate()?;

    let new_role = role::ActiveModel {
        name: Set(input.name.clone()),
        ..Default::default()
    };

    let created = new_role
        .insert(db)
        .await
        .map_err(|e| ModelError::from_write(e, "Role", "name", &input.name))?;
    info!("Created role '{}' with ID {}", created.name, created.id);
    Ok(created)
}

#[instrument(skip(db))]
pub async fn get(db: &DatabaseConnection, id: i32) -> Result<Option<role::Model>> {
    Ok(role::Entity::find_by_id(id).one(db).await?)
}

#[instrument(skip(db))]
pub async fn get_by_name(db: &DatabaseConnection, name: &str) -> Result<Option<role::Model>> {
    Ok(role::Entity::find_by_name(name).one(db).await?)
}

pub async fn list(db: &DatabaseConnection) -> Result<Vec<role::Model>> {
    let roles = role::Entity::find()
        .order_by_asc(role::Column::Id)
        .all(db)
        .await?;
    debug!("Fetched {} roles", roles.len());
    Ok(roles)
}

/// Deletes a role and returns the number of deleted rows (0 when it did not exist).
///
/// Profiles referencing the role are kept; the foreign key's `ON DELETE SET NULL`
/// clears their `roles_id`.
#[instrument(skip(db))]
pub async fn delete(db: &DatabaseConnection, id: i32) -> Result<u64> {
    trace!("Entering roles::delete");
    let result = role::Entity::delete_by_id(id).exec(db).await?;
    if result.rows_affected > 0 {
        info!("Deleted role with ID {}", id);
    } else {
        debug!("Role with ID {} did not exist, nothing deleted", id);
    }
    Ok(result.rows_affected)
}
