use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create role table
        manager
            .create_table(
                Table::create()
                    .table(Role::Table)
                    .if_not_exists()
                    .col(pk_auto(Role::Id))
                    .col(string_len(Role::Name, 50).unique_key())
                    .to_owned(),
            )
            .await?;

        // Create profile table, credentials columns first
        manager
            .create_table(
                Table::create()
                    .table(Profile::Table)
                    .if_not_exists()
                    .col(pk_auto(Profile::Id))
                    .col(string_len(Profile::Username, 150).unique_key())
                    .col(string_len(Profile::Password, 128))
                    .col(string_len(Profile::Email, 254).default(""))
                    .col(string_len(Profile::FirstName, 150).default(""))
                    .col(string_len(Profile::LastName, 150).default(""))
                    .col(boolean(Profile::IsActive).default(true))
                    .col(date_null(Profile::BirthDate))
                    .col(string_len(Profile::Number, 15).default(""))
                    .col(string_len_null(Profile::Gender, 1))
                    .col(date_time(Profile::CreatedAt))
                    .col(string_len_null(Profile::ProfilePicture, 100))
                    .col(integer_null(Profile::RolesId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_profile_roles")
                            .from(Profile::Table, Profile::RolesId)
                            .to(Role::Table, Role::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_profile_roles_id")
                    .table(Profile::Table)
                    .col(Profile::RolesId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop in reverse order of dependencies
        manager
            .drop_table(Table::drop().table(Profile::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Role::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Role {
    Table,
    Id,
    Name,
}

#[derive(DeriveIden)]
enum Profile {
    Table,
    Id,
    Username,
    Password,
    Email,
    FirstName,
    LastName,
    IsActive,
    BirthDate,
    Number,
    Gender,
    CreatedAt,
    ProfilePicture,
    RolesId,
}
