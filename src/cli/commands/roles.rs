use anyhow::{anyhow, Result};
use model::roles::{self, NewRole};
use sea_orm::DatabaseConnection;
use tracing::{debug, info, trace, warn};

use crate::schemas::{DeleteResponse, RoleResponse};

pub async fn create_role(db: &DatabaseConnection, name: &str) -> Result<RoleResponse> {
    trace!("Entering create_role function");
    debug!("Creating role with name: {}", name);

    let role = roles::create(db, NewRole::new(name)).await?;
    Ok(RoleResponse::from(role))
}

pub async fn list_roles(db: &DatabaseConnection) -> Result<Vec<RoleResponse>> {
    let roles = roles::list(db).await?;
    info!("Successfully retrieved {} roles", roles.len());
    Ok(roles.into_iter().map(RoleResponse::from).collect())
}

pub async fn show_role(
    db: &DatabaseConnection,
    id: Option<i32>,
    name: Option<&str>,
) -> Result<RoleResponse> {
    let role = match (id, name) {
        (Some(id), _) => roles::get(db, id)
            .await?
            .ok_or_else(|| anyhow!("Role with ID {} not found", id))?,
        (None, Some(name)) => roles::get_by_name(db, name)
            .await?
            .ok_or_else(|| anyhow!("Role '{}' not found", name))?,
        (None, None) => return Err(anyhow!("Either a role ID or a name is required")),
    };
    Ok(RoleResponse::from(role))
}

pub async fn delete_role(db: &DatabaseConnection, id: i32) -> Result<DeleteResponse> {
    trace!("Entering delete_role function for role_id: {}", id);

    let rows = roles::delete(db, id).await?;
    if rows == 0 {
        warn!("Role with ID {} did not exist", id);
    }
    Ok(DeleteResponse {
        id,
        deleted: rows > 0,
    })
}
