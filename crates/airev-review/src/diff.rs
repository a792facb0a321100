use std::path::Path;

use airev_core::AirevError;

/// Read the diff to review from `path`.
///
/// Returns `Ok(None)` when the file holds only whitespace, meaning there is
/// nothing to review. Otherwise the file content is returned unmodified,
/// except that byte sequences which are not valid UTF-8 (binary hunks,
/// Latin-1 sources) are replaced with U+FFFD.
///
/// # Errors
///
/// Returns [`AirevError::MissingInput`] if the file does not exist, or
/// [`AirevError::Io`] if it cannot be read.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use airev_review::diff::load_diff;
///
/// if let Some(diff) = load_diff(Path::new("pr.diff")).unwrap() {
///     println!("{} bytes to review", diff.len());
/// }
/// ```
pub fn load_diff(path: &Path) -> Result<Option<String>, AirevError> {
    if !path.exists() {
        return Err(AirevError::MissingInput(path.to_path_buf()));
    }
    let bytes = std::fs::read(path)?;
    let diff = String::from_utf8_lossy(&bytes).into_owned();
    if diff.trim().is_empty() {
        return Ok(None);
    }
    Ok(Some(diff))
}
