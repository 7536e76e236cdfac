//! Data directory resolution.

use sprecon_data::DataConfig;
use std::path::{Path, PathBuf};

/// Directory checked before the platform default.
const LOCAL_DATA_DIR: &str = "data";

/// Get the default data directory path.
///
/// Uses platform-specific data directories:
/// - Linux: `~/.local/share/sprecon/`
/// - macOS: `~/Library/Application Support/sprecon/`
/// - Windows: `%APPDATA%\sprecon\`
pub(crate) fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("sprecon")
}

/// Pick the data directory: explicit flag or `DATA_DIR`, then `./data` when
/// present, then the platform default.
pub(crate) fn resolve_data_dir(explicit: Option<&Path>) -> PathBuf {
    match explicit {
        Some(dir) => dir.to_path_buf(),
        None if Path::new(LOCAL_DATA_DIR).is_dir() => PathBuf::from(LOCAL_DATA_DIR),
        None => default_data_dir(),
    }
}

/// File names of the three input tables.
#[derive(Debug, Clone)]
pub(crate) struct FileNames {
    pub(crate) constituents: String,
    pub(crate) stocks: String,
    pub(crate) index: String,
}

/// Build the loader configuration.
pub(crate) fn data_config(data_dir: Option<&Path>, files: FileNames) -> DataConfig {
    DataConfig {
        data_dir: resolve_data_dir(data_dir),
        constituents_file: files.constituents,
        stock_file: files.stocks,
        index_file: files.index,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_dir_wins() {
        let dir = Path::new("/tmp/crsp");
        assert_eq!(resolve_data_dir(Some(dir)), PathBuf::from("/tmp/crsp"));
    }

    #[test]
    fn test_default_dir_is_namespaced() {
        assert!(default_data_dir().ends_with("sprecon"));
    }

    #[test]
    fn test_data_config_uses_file_names() {
        let config = data_config(
            Some(Path::new("/tmp/crsp")),
            FileNames {
                constituents: "members.csv".to_string(),
                stocks: "msf.csv".to_string(),
                index: "msix.csv".to_string(),
            },
        );
        assert_eq!(config.constituents_path(), PathBuf::from("/tmp/crsp/members.csv"));
        assert_eq!(config.index_path(), PathBuf::from("/tmp/crsp/msix.csv"));
    }
}
