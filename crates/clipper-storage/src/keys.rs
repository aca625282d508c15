//! Key helpers shared by the path-addressed backends (S3 and local).

use crate::traits::{StorageError, StorageResult};

/// Key for `name` stored under `parent`: `{parent}/{name}`, or `name` when no parent is given.
pub fn destination_key(parent: &str, name: &str) -> StorageResult<String> {
    if name.is_empty() || name.contains('/') {
        return Err(StorageError::InvalidKey(format!(
            "Invalid object name: {:?}",
            name
        )));
    }

    let parent = parent.trim_matches('/');
    let key = if parent.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", parent, name)
    };

    validate_key(&key)?;
    Ok(key)
}

/// Reject keys that could escape the configured root.
pub fn validate_key(key: &str) -> StorageResult<()> {
    if key.is_empty() || key.starts_with('/') || key.split('/').any(|segment| segment == "..") {
        return Err(StorageError::InvalidKey(
            "Storage key contains invalid characters".to_string(),
        ));
    }
    Ok(())
}

/// Display name of an object: the last segment of its key.
pub fn display_name(key: &str) -> &str {
    key.rsplit('/').next().unwrap_or(key)
}

/// Percent-encode each segment of a key for use in a URL path.
pub fn url_path(key: &str) -> String {
    key.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
