//! Node name rules.

use picvault_core::error::AppError;

/// Longest accepted name, in bytes.
pub const MAX_NAME_LENGTH: usize = 255;

/// Trims and validates a file or folder name.
///
/// Names become path segments, so `/` and control characters are rejected.
pub fn normalize_name(raw: &str) -> Result<String, AppError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(AppError::invalid_argument("Name cannot be empty"));
    }
    if name.len() > MAX_NAME_LENGTH {
        return Err(AppError::invalid_argument(format!(
            "Name exceeds {MAX_NAME_LENGTH} bytes"
        )));
    }
    if name == "." || name == ".." {
        return Err(AppError::invalid_argument(format!("'{name}' is not a valid name")));
    }
    if name.chars().any(|c| c == '/' || c.is_control()) {
        return Err(AppError::invalid_argument(
            "Name cannot contain '/' or control characters",
        ));
    }
    Ok(name.to_string())
}
