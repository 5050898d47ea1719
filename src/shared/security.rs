use crate::shared::Result;
use std::fs;
use std::path::Path;

/// Validates that a path is not a symbolic link
///
/// # Security
/// This function uses `symlink_metadata()` instead of `metadata()` to ensure
/// we check the symlink itself, not the target it points to.
///
/// # Arguments
/// * `path` - The path to validate
/// * `operation` - Description of the operation (e.g., "read", "write") for error messages
///
/// # Errors
/// Returns an error if the path is a symbolic link or if metadata cannot be read
pub fn validate_not_symlink(path: &Path, operation: &str) -> Result<()> {
    let metadata = fs::symlink_metadata(path).map_err(|e| {
        anyhow::anyhow!(
            "Failed to read metadata for {} operation on {}: {}",
            operation,
            path.display(),
            e
        )
    })?;

    if metadata.is_symlink() {
        anyhow::bail!(
            "Security: {} is a symbolic link. For security reasons, {} operations on symbolic links are not allowed.",
            path.display(),
            operation
        );
    }

    Ok(())
}

/// Creates the report output directory if needed and checks it is a real directory
///
/// # Errors
/// Returns an error if the directory cannot be created, is a symbolic link,
/// or exists as something other than a directory
pub fn prepare_output_directory(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path).map_err(|e| {
            anyhow::anyhow!("Failed to create directory {}: {}", path.display(), e)
        })?;
    }

    validate_not_symlink(path, "write")?;

    if !path.is_dir() {
        anyhow::bail!("{} is not a directory", path.display());
    }

    Ok(())
}

/// Turns a repository name or artifact reference into a single file name component
///
/// Path separators and the tag/digest separator are replaced with `_`, so
/// `team/app` and `sha256:abc` can never escape the output directory.
pub fn sanitize_file_component(component: &str) -> String {
    component
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' => '_',
            other => other,
        })
        .collect()
}
