//! Default on-disk locations.

use std::env;
use std::path::PathBuf;

const APP_DIR: &str = "famille";

/// `$XDG_DATA_HOME/famille`, falling back to `~/.local/share/famille`.
///
/// Without `HOME` either, the current directory is used.
pub fn data_dir() -> PathBuf {
    let data_home = env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .or_else(|_| env::var("HOME").map(|home| PathBuf::from(home).join(".local/share")))
        .unwrap_or_else(|_| PathBuf::from("."));

    data_home.join(APP_DIR)
}

/// Default SQLite database file.
pub fn db_path() -> PathBuf {
    data_dir().join("famille.db")
}
