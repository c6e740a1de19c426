use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use clap::Args;
use model::profiles::{self, Credentials, NewProfile, ProfileChanges};
use sea_orm::DatabaseConnection;
use tracing::{debug, info, trace};

use crate::schemas::{DeleteResponse, ProfileResponse};

/// Arguments of `profile create`
#[derive(Args, Debug, Clone)]
pub struct CreateProfileArgs {
    /// Username (must be unique)
    #[arg(long)]
    pub username: String,
    /// Password hash as produced by the authentication layer
    #[arg(long)]
    pub password_hash: String,
    #[arg(long, default_value = "")]
    pub email: String,
    #[arg(long, default_value = "")]
    pub first_name: String,
    #[arg(long, default_value = "")]
    pub last_name: String,
    /// Birth date (YYYY-MM-DD)
    #[arg(long)]
    pub birth_date: Option<NaiveDate>,
    /// Phone number
    #[arg(long, default_value = "")]
    pub number: String,
    /// Gender code: M, F or O
    #[arg(long, default_value = "")]
    pub gender: String,
    /// ID of the role to assign
    #[arg(long)]
    pub role_id: Option<i32>,
    /// Original filename of the uploaded profile picture
    #[arg(long)]
    pub picture: Option<String>,
}

impl From<CreateProfileArgs> for NewProfile {
    fn from(args: CreateProfileArgs) -> Self {
        NewProfile {
            credentials: Credentials {
                username: args.username,
                password: args.password_hash,
                email: args.email,
                first_name: args.first_name,
                last_name: args.last_name,
            },
            birth_date: args.birth_date,
            number: args.number,
            gender: args.gender,
            roles_id: args.role_id,
            profile_picture: args.picture,
        }
    }
}

/// Arguments of `profile update`. Omitted flags leave the field unchanged.
#[derive(Args, Debug, Clone, Default)]
pub struct UpdateProfileArgs {
    /// Profile ID
    #[arg(long)]
    pub id: i32,
    #[arg(long)]
    pub username: Option<String>,
    #[arg(long)]
    pub password_hash: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub first_name: Option<String>,
    #[arg(long)]
    pub last_name: Option<String>,
    /// Mark the account active
    #[arg(long, conflicts_with = "inactive")]
    pub active: bool,
    /// Mark the account inactive
    #[arg(long)]
    pub inactive: bool,
    /// Birth date (YYYY-MM-DD)
    #[arg(long, conflicts_with = "clear_birth_date")]
    pub birth_date: Option<NaiveDate>,
    #[arg(long)]
    pub clear_birth_date: bool,
    #[arg(long)]
    pub number: Option<String>,
    /// Gender code: M, F, O, or an empty string to unset
    #[arg(long)]
    pub gender: Option<String>,
    #[arg(long, conflicts_with = "clear_role")]
    pub role_id: Option<i32>,
    /// Remove the role reference
    #[arg(long)]
    pub clear_role: bool,
    /// Original filename of a newly uploaded picture
    #[arg(long, conflicts_with = "clear_picture")]
    pub picture: Option<String>,
    /// Remove the profile picture reference
    #[arg(long)]
    pub clear_picture: bool,
}

/// Maps a value flag and its `--clear-*` counterpart to a nullable-field change.
fn nullable_change<T>(value: Option<T>, clear: bool) -> Option<Option<T>> {
    match (value, clear) {
        (Some(value), _) => Some(Some(value)),
        (None, true) => Some(None),
        (None, false) => None,
    }
}

impl From<UpdateProfileArgs> for ProfileChanges {
    fn from(args: UpdateProfileArgs) -> Self {
        let is_active = match (args.active, args.inactive) {
            (true, _) => Some(true),
            (false, true) => Some(false),
            (false, false) => None,
        };
        ProfileChanges {
            username: args.username,
            password: args.password_hash,
            email: args.email,
            first_name: args.first_name,
            last_name: args.last_name,
            is_active,
            birth_date: nullable_change(args.birth_date, args.clear_birth_date),
            number: args.number,
            gender: args.gender,
            roles_id: nullable_change(args.role_id, args.clear_role),
            profile_picture: nullable_change(args.picture, args.clear_picture),
        }
    }
}

pub async fn create_profile(
    db: &DatabaseConnection,
    args: CreateProfileArgs,
) -> Result<ProfileResponse> {
    trace!("Entering create_profile function");
    debug!("Creating profile with username: {}", args.username);

    let profile = profiles::create(db, args.into()).await?;
    Ok(ProfileResponse::from(profile))
}

pub async fn list_profiles(db: &DatabaseConnection) -> Result<Vec<ProfileResponse>> {
    let profiles = profiles::list(db).await?;
    info!("Successfully retrieved {} profiles", profiles.len());
    Ok(profiles.into_iter().map(ProfileResponse::from).collect())
}

pub async fn show_profile(
    db: &DatabaseConnection,
    id: Option<i32>,
    username: Option<&str>,
) -> Result<ProfileResponse> {
    let profile = match (id, username) {
        (Some(id), _) => profiles::get(db, id)
            .await?
            .ok_or_else(|| anyhow!("Profile with ID {} not found", id))?,
        (None, Some(username)) => profiles::get_by_username(db, username)
            .await?
            .ok_or_else(|| anyhow!("Profile '{}' not found", username))?,
        (None, None) => return Err(anyhow!("Either a profile ID or a username is required")),
    };
    Ok(ProfileResponse::from(profile))
}

pub async fn update_profile(
    db: &DatabaseConnection,
    args: UpdateProfileArgs,
) -> Result<ProfileResponse> {
    trace!("Entering update_profile function for profile_id: {}", args.id);
    let id = args.id;

    let profile = profiles::update(db, id, args.into()).await?;
    Ok(ProfileResponse::from(profile))
}

pub async fn delete_profile(db: &DatabaseConnection, id: i32) -> Result<DeleteResponse> {
    trace!("Entering delete_profile function for profile_id: {}", id);

    profiles::delete(db, id).await?;
    Ok(DeleteResponse { id, deleted: true })
}
