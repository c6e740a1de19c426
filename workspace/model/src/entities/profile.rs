use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, ConnectionTrait, DatabaseConnection};
use tracing::trace;

use super::role;
use crate::error::ModelError;

/// Gender code stored on a profile. An unset gender is represented by `None`
/// on the model and `NULL` in the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(1))")]
pub enum Gender {
    #[sea_orm(string_value = "M")]
    Male,
    #[sea_orm(string_value = "F")]
    Female,
    #[sea_orm(string_value = "O")]
    Other,
}

impl Gender {
    /// Single-letter code as stored in the `gender` column.
    pub fn code(&self) -> &'static str {
        match self {
            Gender::Male => "M",
            Gender::Female => "F",
            Gender::Other => "O",
        }
    }

    /// Parses a gender code. The empty string means "unset" and yields `None`;
    /// anything outside `M`, `F`, `O` is a validation error.
    pub fn parse_code(code: &str) -> Result<Option<Gender>, ModelError> {
        match code {
            "" => Ok(None),
            "M" => Ok(Some(Gender::Male)),
            "F" => Ok(Some(Gender::Female)),
            "O" => Ok(Some(Gender::Other)),
            other => Err(ModelError::Validation(format!(
                "Invalid gender code '{}', expected one of M, F, O or empty",
                other
            ))),
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A user of the system: the base credentials record (username, password hash,
/// email and names) with the personal attributes of the profile embedded next to it.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "profile")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique, column_type = "String(StringLen::N(150))")]
    pub username: String,
    /// Opaque password hash produced by the authentication layer.
    #[sea_orm(column_type = "String(StringLen::N(128))")]
    pub password: String,
    #[sea_orm(column_type = "String(StringLen::N(254))", default_value = "")]
    pub email: String,
    #[sea_orm(column_type = "String(StringLen::N(150))", default_value = "")]
    pub first_name: String,
    #[sea_orm(column_type = "String(StringLen::N(150))", default_value = "")]
    pub last_name: String,
    #[sea_orm(default_value = "true")]
    pub is_active: bool,
    pub birth_date: Option<NaiveDate>,
    /// Phone number, empty when not provided.
    #[sea_orm(column_type = "String(StringLen::N(15))", default_value = "")]
    pub number: String,
    pub gender: Option<Gender>,
    /// Set once when the row is inserted.
    pub created_at: NaiveDateTime,
    /// Storage path produced by `upload::profile_image_path`.
    #[sea_orm(column_type = "String(StringLen::N(100))", nullable)]
    pub profile_picture: Option<String>,
    pub roles_id: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// The optional role of this profile. Deleting the role clears the reference.
    #[sea_orm(
        belongs_to = "super::role::Entity",
        from = "Column::RolesId",
        to = "super::role::Column::Id",
        on_update = "Cascade",
        on_delete = "SetNull"
    )]
    Role,
}

impl Related<role::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Role.def()
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        if insert {
            if self.created_at.is_not_set() {
                self.created_at = ActiveValue::Set(Utc::now().naive_utc());
            }
        } else if self.created_at.is_set() {
            // created_at is written once on insert and never touched afterwards
            trace!("Dropping created_at change on profile update");
            self.created_at = ActiveValue::NotSet;
        }
        Ok(self)
    }
}

impl Entity {
    pub fn find_by_username(username: &str) -> Select<Entity> {
        Self::find().filter(Column::Username.eq(username))
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.username)
    }
}

impl Model {
    /// Returns the role this profile references, if any.
    pub async fn role(&self, db: &DatabaseConnection) -> Result<Option<role::Model>, DbErr> {
        match self.roles_id {
            Some(_) => self.find_related(role::Entity).one(db).await,
            None => Ok(None),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}
