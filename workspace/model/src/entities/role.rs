use std::fmt;

use sea_orm::entity::prelude::*;
use sea_orm::{DatabaseConnection, QueryOrder};

use super::profile;

/// A named category that a profile can be assigned to.
/// Roles are only referenced by profiles, never owned by them.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "role")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique, column_type = "String(StringLen::N(50))")]
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Profiles currently holding this role.
    #[sea_orm(has_many = "super::profile::Entity")]
    Profile,
}

impl Related<profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Profile.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Entity {
    /// Select the role with the given name. Names are unique, so at most one row matches.
    pub fn find_by_name(name: &str) -> Select<Entity> {
        Self::find().filter(Column::Name.eq(name))
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl Model {
    /// Returns the profiles referencing this role, ordered by id.
    pub async fn profiles(&self, db: &DatabaseConnection) -> Result<Vec<profile::Model>, DbErr> {
        self.find_related(profile::Entity)
            .order_by_asc(profile::Column::Id)
            .all(db)
            .await
    }
}
