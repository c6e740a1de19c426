//! Storage paths for uploaded profile pictures.
//!
//! The path is built from a fresh random UUID and the extension of the uploaded
//! file, so nothing from the user-supplied base name ends up in storage.

use uuid::Uuid;

use crate::error::ModelError;

/// Directory (storage key prefix) holding all profile pictures.
pub const PROFILE_PICTURE_DIR: &str = "profile_pics";

/// Maximum length of the `profile.profile_picture` column.
pub const PROFILE_PICTURE_MAX_LEN: usize = 100;

/// Returns the extension of `filename`: the text after the last `.` of its final
/// path component. A name without a dot, or ending in one, has an empty extension.
pub fn extension(filename: &str) -> &str {
    let name = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    match name.rsplit_once('.') {
        Some((_, ext)) => ext,
        None => "",
    }
}

/// Generates the storage path for a newly assigned profile picture,
/// `profile_pics/<uuid>.<extension>`, or `profile_pics/<uuid>` when the
/// original filename has no extension.
///
/// Every call yields a new v4 UUID. No I/O is performed; persisting the bytes
/// at the returned path is up to the storage backend.
pub fn profile_image_path(original_filename: &str) -> Result<String, ModelError> {
    let ext = extension(original_filename);
    let id = Uuid::new_v4();
    let path = if ext.is_empty() {
        format!("{}/{}", PROFILE_PICTURE_DIR, id)
    } else {
        format!("{}/{}.{}", PROFILE_PICTURE_DIR, id, ext)
    };

    if path.len() > PROFILE_PICTURE_MAX_LEN {
        return Err(ModelError::Validation(format!(
            "Profile picture extension '{}' is too long",
            ext
        )));
    }
    Ok(path)
}
