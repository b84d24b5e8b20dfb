use crate::error::{NaipError, Result};
use std::path::Path;

pub fn ensure_dir_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::PermissionDenied => NaipError::PermissionDenied {
                path: path.to_path_buf(),
            },
            _ => NaipError::from(e),
        })?;
    }
    Ok(())
}

pub fn remove_file_quiet(path: &Path) {
    let _ = std::fs::remove_file(path);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_dir_exists_creates_nested() {
        let temp = tempfile::tempdir().unwrap();
        let nested = temp.path().join("a").join("b").join("c");

        ensure_dir_exists(&nested).unwrap();
        assert!(nested.is_dir());

        // Idempotent on an existing directory
        ensure_dir_exists(&nested).unwrap();
        assert!(nested.is_dir());
    }
}
