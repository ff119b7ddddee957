//! Configuration file reading and writing.
//!
//! # File Formats
//!
//! Both JSON5 (`.json5`, comments and trailing commas allowed) and plain JSON
//! are read through the JSON5 parser. Files are always written as pretty JSON.
//!
//! # File Locations
//!
//! Configuration is searched in the following order:
//!
//! 1. Local: `./issuekit.json5` or `./issuekit.json`
//! 2. User: `~/.config/issuekit/config.json5` or `~/.config/issuekit/config.json`
//!
//! Because the file may hold a token, it is written owner-readable only on
//! Unix.

use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};

/// Configuration file names to search for, in priority order.
const CONFIG_FILE_NAMES: &[&str] = &["issuekit.json5", "issuekit.json"];

/// User config directory name.
const USER_CONFIG_DIR: &str = "issuekit";

/// User config file names to search for, in priority order.
const USER_CONFIG_FILE_NAMES: &[&str] = &["config.json5", "config.json"];

/// Finds the configuration file in the working directory or the user
/// config directory.
///
/// # Examples
///
/// ```no_run
/// use issuekit_config::persistence::find_config_file;
///
/// if let Some(path) = find_config_file() {
///     println!("Found config at: {}", path.display());
/// }
/// ```
#[must_use]
pub fn find_config_file() -> Option<PathBuf> {
    let user_dir = dirs::config_dir().map(|d| d.join(USER_CONFIG_DIR));
    find_config_file_in(Path::new("."), user_dir.as_deref())
}

/// Finds the configuration file, searching `local_dir` before `user_dir`.
#[must_use]
pub fn find_config_file_in(local_dir: &Path, user_dir: Option<&Path>) -> Option<PathBuf> {
    let local = CONFIG_FILE_NAMES.iter().map(|name| local_dir.join(name));
    let user = user_dir
        .into_iter()
        .flat_map(|dir| USER_CONFIG_FILE_NAMES.iter().map(move |name| dir.join(name)));

    local.chain(user).find(|path| path.exists())
}

/// Returns the default user configuration directory
/// (typically `~/.config/issuekit/`).
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
pub fn user_config_dir() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|d| d.join(USER_CONFIG_DIR))
        .ok_or(ConfigError::NoHomeDirectory)
}

/// Returns the default user configuration file path.
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
pub fn default_user_config_path() -> Result<PathBuf> {
    Ok(user_config_dir()?.join("config.json5"))
}

/// Reads and parses a configuration file (JSON5 or JSON).
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn read_config_file<T: serde::de::DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    serde_json5::from_str(&content).map_err(ConfigError::from)
}

/// Writes a configuration to a file as pretty-printed JSON, creating
/// parent directories as needed.
///
/// # Errors
///
/// Returns an error if the directory or file cannot be written, or the
/// value cannot be serialized.
pub fn write_config_file<T: serde::Serialize>(path: impl AsRef<Path>, config: &T) -> Result<()> {
    let path = path.as_ref();
    let write_err = |source| ConfigError::WriteFile {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty() && !p.exists()) {
        std::fs::create_dir_all(parent).map_err(write_err)?;
    }

    let content = serde_json::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(write_err)?;
    restrict_permissions(path).map_err(write_err)
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use tempfile::TempDir;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct TestConfig {
        name: String,
        value: i32,
    }

    #[test]
    fn read_json5_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("test.json5");
        std::fs::write(
            &path,
            r#"
            {
                // comment
                name: "test",
                value: 42,
            }
            "#,
        )
        .unwrap();

        let config: TestConfig = read_config_file(&path).unwrap();
        assert_eq!(config.name, "test");
        assert_eq!(config.value, 42);
    }

    #[test]
    fn read_nonexistent_file() {
        let result: Result<TestConfig> = read_config_file("/nonexistent/path.json");
        assert!(matches!(result, Err(ConfigError::ReadFile { .. })));
    }

    #[test]
    fn write_and_read_roundtrip_in_nested_dir() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let original = TestConfig {
            name: "test".to_string(),
            value: 42,
        };

        write_config_file(&path, &original).unwrap();
        let loaded: TestConfig = read_config_file(&path).unwrap();
        assert_eq!(original, loaded);
    }

    #[cfg(unix)]
    #[test]
    fn written_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        write_config_file(&path, &TestConfig { name: "t".into(), value: 1 }).unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn local_file_wins_over_user_file() {
        let local = TempDir::new().unwrap();
        let user = TempDir::new().unwrap();
        std::fs::write(local.path().join("issuekit.json"), "{}").unwrap();
        std::fs::write(user.path().join("config.json5"), "{}").unwrap();

        let found = find_config_file_in(local.path(), Some(user.path())).unwrap();
        assert_eq!(found, local.path().join("issuekit.json"));
    }

    #[test]
    fn falls_back_to_user_file() {
        let local = TempDir::new().unwrap();
        let user = TempDir::new().unwrap();
        std::fs::write(user.path().join("config.json"), "{}").unwrap();

        let found = find_config_file_in(local.path(), Some(user.path())).unwrap();
        assert_eq!(found, user.path().join("config.json"));
    }

    #[test]
    fn nothing_found() {
        let local = TempDir::new().unwrap();
        assert!(find_config_file_in(local.path(), None).is_none());
    }
}
