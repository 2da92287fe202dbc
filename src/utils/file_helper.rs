//! File system helpers for reading sources and writing converted files.

use std::path::{Path, PathBuf};

use crate::core::error::Result;

/// Read a whole file into memory.
pub fn read_file_bytes(path: &Path) -> Result<Vec<u8>> {
    Ok(std::fs::read(path)?)
}

/// Get the filename from a path.
pub fn get_file_name(path: &Path) -> Option<String> {
    path.file_name().map(|s| s.to_string_lossy().into_owned())
}

/// Get the parent directory from a path.
pub fn get_directory(path: &Path) -> Option<String> {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(|p| p.to_string_lossy().into_owned())
}

/// Where an auto-saved file goes: `output_dir` when set, else beside the source.
pub fn output_path(source: Option<&Path>, output_dir: &str, output_name: &str) -> PathBuf {
    if !output_dir.trim().is_empty() {
        return Path::new(output_dir).join(output_name);
    }

    source
        .and_then(|p| p.parent())
        .map(|dir| dir.join(output_name))
        .unwrap_or_else(|| PathBuf::from(output_name))
}

/// Write UTF-8 content, creating parent directories as needed.
pub fn write_output(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_file_name() {
        assert_eq!(get_file_name(Path::new("/path/to/orders.sql")), Some("orders.sql".to_string()));
    }

    #[test]
    fn test_get_directory() {
        assert_eq!(get_directory(Path::new("/path/to/orders.sql")), Some("/path/to".to_string()));
        assert_eq!(get_directory(Path::new("orders.sql")), None);
    }

    #[test]
    fn test_output_path() {
        let source = Path::new("/data/in/orders.sql");
        assert_eq!(
            output_path(Some(source), "", "orders-utf8.sql"),
            PathBuf::from("/data/in/orders-utf8.sql")
        );
        assert_eq!(
            output_path(Some(source), "/data/out", "orders-utf8.sql"),
            PathBuf::from("/data/out/orders-utf8.sql")
        );
        assert_eq!(output_path(None, "", "x-utf8.sql"), PathBuf::from("x-utf8.sql"));
    }

    #[test]
    fn test_write_and_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("orders-utf8.sql");
        write_output(&path, "SELECT 'é';".as_bytes()).unwrap();
        assert_eq!(read_file_bytes(&path).unwrap(), "SELECT 'é';".as_bytes());
    }

    #[test]
    fn test_read_missing_file() {
        let err = read_file_bytes(Path::new("/definitely/not/here.sql")).unwrap_err();
        assert_eq!(err.kind(), "Io");
    }
}
