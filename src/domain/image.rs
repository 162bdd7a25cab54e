use crate::error::StoreError;

/// Largest accepted upload, in bytes.
pub const MAX_IMAGE_BYTES: u64 = 16 * 1024 * 1024;

pub const ALLOWED_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "gif"];

/// Reduces an uploaded file name to a safe, flat name.
///
/// Path components are dropped, whitespace becomes `_`, and anything outside
/// ASCII alphanumerics, `.`, `-` and `_` is stripped. Leading dots are removed
/// so the result can never be hidden or relative.
pub fn sanitize_filename(original: &str) -> String {
    let base = original
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();

    let cleaned: String = base
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
        .collect();

    cleaned.trim_start_matches(['.', '_']).to_string()
}

/// Checks an upload and returns the name it should be stored under.
pub fn validate_image(original: &str, size: u64) -> Result<String, StoreError> {
    if size > MAX_IMAGE_BYTES {
        return Err(StoreError::ValidationError(
            "Image exceeds the 16MB upload limit".to_string(),
        ));
    }

    let name = sanitize_filename(original);
    let extension = name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .ok_or_else(|| {
            StoreError::ValidationError("Invalid file format. Please upload an image.".to_string())
        })?;

    if ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        Ok(name)
    } else {
        Err(StoreError::ValidationError(
            "Invalid file extension. Allowed extensions are jpg, jpeg, png, gif.".to_string(),
        ))
    }
}
