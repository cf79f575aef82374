//! Path handling for the Zellij sandbox.
//!
//! The host filesystem is mounted under `/host`. These helpers locate the
//! plugin's data directory and map user-supplied paths into the sandbox.

use std::path::PathBuf;

/// File holding the local table store.
pub const TABLES_FILE: &str = "tables.json";

/// File holding the logged-in user.
pub const SESSION_FILE: &str = "session.json";

/// Returns the data directory for Hirafi storage.
///
/// The directory is `/host/.local/share/zellij/hirafi` in the sandbox. `/host`
/// points to the cwd of the last focused terminal, or the folder Zellij was
/// started from, so this usually resolves to `~/.local/share/zellij/hirafi`.
///
/// # Examples
///
/// ```
/// use hirafi::infrastructure::get_data_dir;
///
/// let data_dir = get_data_dir();
/// assert_eq!(data_dir.to_str().unwrap(), "/host/.local/share/zellij/hirafi");
/// ```
#[must_use]
pub fn get_data_dir() -> PathBuf {
    PathBuf::from("/host/.local/share/zellij").join("hirafi")
}

/// Expands tilde paths to use the `/host` prefix.
///
/// # Examples
///
/// ```
/// use hirafi::infrastructure::expand_tilde;
///
/// assert_eq!(expand_tilde("~/themes/dark.toml"), "/host/themes/dark.toml");
/// assert_eq!(expand_tilde("~"), "/host");
/// assert_eq!(expand_tilde("/absolute/path"), "/absolute/path");
/// ```
#[must_use]
pub fn expand_tilde(path: &str) -> String {
    if path.starts_with("~/") {
        path.replacen('~', "/host", 1)
    } else if path == "~" {
        "/host".to_string()
    } else {
        path.to_string()
    }
}
