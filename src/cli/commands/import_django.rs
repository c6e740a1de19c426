use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use model::ModelError;
use model::entities::{profile, role};
use model::entities::profile::Gender;
use model::profiles::{Credentials, NewProfile};
use model::roles::NewRole;
use model::upload::PROFILE_PICTURE_MAX_LEN;
use sea_orm::{ActiveModelTrait, DatabaseConnection, DatabaseTransaction, Set, TransactionTrait};
use validator::Validate;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{debug, info, trace, warn};

use crate::schemas::ImportSummary;

const ROLE_MODEL: &str = "users.role";
const PROFILE_MODEL: &str = "users.profile";

/// One entry of a `manage.py dumpdata` JSON array
#[derive(Debug, Deserialize)]
struct DjangoRecord {
    model: String,
    #[serde(deserialize_with = "deserialize_pk")]
    pk: i32,
    fields: serde_json::Value,
}

/// Custom deserializer for pk field that handles both string and integer PKs
fn deserialize_pk<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;

    let value: serde_json::Value = serde::Deserialize::deserialize(deserializer)?;

    match value {
        serde_json::Value::Number(n) => n
            .as_i64()
            .and_then(|v| i32::try_from(v).ok())
            .ok_or_else(|| D::Error::custom("pk number out of i32 range")),
        // String keys (sessions, content types) belong to models we ignore
        serde_json::Value::String(_) => Ok(0),
        _ => Err(D::Error::custom("pk must be a number or string")),
    }
}

/// Django Role Model
#[derive(Debug, Deserialize)]
struct DjangoRole {
    name: String,
}

/// Django Profile Model (AbstractUser fields plus the profile attributes)
#[derive(Debug, Deserialize)]
struct DjangoProfile {
    username: String,
    password: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    first_name: String,
    #[serde(default)]
    last_name: String,
    #[serde(default = "default_true")]
    is_active: bool,
    birth_date: Option<String>,
    #[serde(default)]
    number: String,
    #[serde(default)]
    gender: String,
    created_at: Option<String>,
    profile_picture: Option<String>,
    roles: Option<i32>,
}

fn default_true() -> bool {
    true
}

/// Parses a Django `DateTimeField` value, e.g. `2024-05-01T12:34:56.789Z`.
fn parse_django_datetime(value: &str) -> Result<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc).naive_utc());
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .with_context(|| format!("Invalid datetime: {}", value))
}

fn parse_django_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").with_context(|| format!("Invalid date: {}", value))
}

/// Imports roles and profiles from a Django JSON dump file.
pub async fn import_django(db: &DatabaseConnection, json_path: &Path) -> Result<ImportSummary> {
    trace!("Entering import_django function");
    info!("Starting Django data import");
    debug!("JSON path: {}", json_path.display());

    let file = File::open(json_path)
        .with_context(|| format!("Failed to open file: {}", json_path.display()))?;
    import_from_reader(db, BufReader::new(file)).await
}

/// Imports roles and profiles from Django dump JSON read from `reader`.
///
/// The whole import runs in one transaction. Roles whose name already exists are
/// reused, profiles whose username already exists are skipped. Stored picture
/// paths and creation timestamps are copied verbatim.
pub async fn import_from_reader<R: Read>(db: &DatabaseConnection, reader: R) -> Result<ImportSummary> {
    info!("Parsing JSON data...");
    let records: Vec<DjangoRecord> =
        serde_json::from_reader(reader).context("Failed to parse JSON")?;
    info!("Loaded {} records from Django dump", records.len());

    let mut summary = ImportSummary::default();
    let txn = db.begin().await.context("Failed to start transaction")?;

    // First pass: roles, so that profiles can be remapped to the new IDs
    info!("Importing roles...");
    let mut role_map: HashMap<i32, i32> = HashMap::new();
    for record in records.iter().filter(|r| r.model == ROLE_MODEL) {
        let django_role: DjangoRole = serde_json::from_value(record.fields.clone())
            .with_context(|| format!("Invalid role record {}", record.pk))?;
        let role_id = import_role(&txn, &django_role, &mut summary).await?;
        role_map.insert(record.pk, role_id);
        debug!("Mapped role {} -> ID {}", record.pk, role_id);
    }
    info!("Imported {} roles", role_map.len());

    // Second pass: profiles
    info!("Importing profiles...");
    for record in records.iter().filter(|r| r.model == PROFILE_MODEL) {
        let django_profile: DjangoProfile = serde_json::from_value(record.fields.clone())
            .with_context(|| format!("Invalid profile record {}", record.pk))?;
        import_profile(&txn, record.pk, django_profile, &role_map, &mut summary).await?;
    }

    summary.records_ignored = records
        .iter()
        .filter(|r| r.model != ROLE_MODEL && r.model != PROFILE_MODEL)
        .count();

    txn.commit().await.context("Failed to commit import")?;
    info!(
        "Import finished: {} roles created, {} reused, {} profiles created, {} skipped, {} records ignored",
        summary.roles_created,
        summary.roles_reused,
        summary.profiles_created,
        summary.profiles_skipped,
        summary.records_ignored
    );
    Ok(summary)
}

async fn import_role(
    txn: &DatabaseTransaction,
    django_role: &DjangoRole,
    summary: &mut ImportSummary,
) -> Result<i32> {
    NewRole::new(django_role.name.clone())
        .validate()
        .map_err(ModelError::from)
        .with_context(|| format!("Invalid role '{}'", django_role.name))?;

    if let Some(existing) = role::Entity::find_by_name(&django_role.name).one(txn).await? {
        debug!("Role '{}' already exists with ID {}", existing.name, existing.id);
        summary.roles_reused += 1;
        return Ok(existing.id);
    }

    let inserted = role::ActiveModel {
        name: Set(django_role.name.clone()),
        ..Default::default()
    }
    .insert(txn)
    .await
    .with_context(|| format!("Failed to import role '{}'", django_role.name))?;
    summary.roles_created += 1;
    Ok(inserted.id)
}

/// Applies the same field constraints as `profiles::create`. The stored picture
/// path is kept verbatim, so only its column length is checked.
fn validate_profile(django_profile: &DjangoProfile) -> Result<(), ModelError> {
    NewProfile {
        credentials: Credentials {
            username: django_profile.username.clone(),
            password: django_profile.password.clone(),
            email: django_profile.email.clone(),
            first_name: django_profile.first_name.clone(),
            last_name: django_profile.last_name.clone(),
        },
        number: django_profile.number.clone(),
        gender: django_profile.gender.clone(),
        ..Default::default()
    }
    .validate()?;

    if let Some(path) = django_profile.profile_picture.as_deref() {
        if path.len() > PROFILE_PICTURE_MAX_LEN {
            return Err(ModelError::Validation(format!(
                "Profile picture path is longer than {} characters",
                PROFILE_PICTURE_MAX_LEN
            )));
        }
    }
    Ok(())
}

async fn import_profile(
    txn: &DatabaseTransaction,
    pk: i32,
    django_profile: DjangoProfile,
    role_map: &HashMap<i32, i32>,
    summary: &mut ImportSummary,
) -> Result<()> {
    if profile::Entity::find_by_username(&django_profile.username)
        .one(txn)
        .await?
        .is_some()
    {
        warn!("Profile '{}' already exists, skipping", django_profile.username);
        summary.profiles_skipped += 1;
        return Ok(());
    }

    validate_profile(&django_profile).with_context(|| format!("Invalid profile record {}", pk))?;

    let gender = Gender::parse_code(&django_profile.gender)
        .with_context(|| format!("Invalid gender on profile {}", pk))?;
    let birth_date = match django_profile.birth_date.as_deref() {
        Some(value) => Some(parse_django_date(value)?),
        None => None,
    };
    let roles_id = match django_profile.roles {
        Some(role_pk) => match role_map.get(&role_pk) {
            Some(id) => Some(*id),
            None => {
                warn!("Profile {} references unknown role {}, leaving it unset", pk, role_pk);
                None
            }
        },
        None => None,
    };
    let profile_picture = django_profile.profile_picture.filter(|p| !p.is_empty());

    let mut new_profile = profile::ActiveModel {
        username: Set(django_profile.username.clone()),
        password: Set(django_profile.password),
        email: Set(django_profile.email),
        first_name: Set(django_profile.first_name),
        last_name: Set(django_profile.last_name),
        is_active: Set(django_profile.is_active),
        birth_date: Set(birth_date),
        number: Set(django_profile.number),
        gender: Set(gender),
        profile_picture: Set(profile_picture),
        roles_id: Set(roles_id),
        ..Default::default()
    };
    if let Some(created_at) = django_profile.created_at.as_deref() {
        new_profile.created_at = Set(parse_django_datetime(created_at)?);
    }

    let inserted = new_profile
        .insert(txn)
        .await
        .with_context(|| format!("Failed to import profile '{}'", django_profile.username))?;
    summary.profiles_created += 1;
    debug!("Imported profile {} -> ID {}", django_profile.username, inserted.id);
    Ok(())
}
