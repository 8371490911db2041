//! Locations of Maven settings files.
//!
//! Maven reads user settings from `~/.m2/settings.xml` and installation
//! settings from `${maven.home}/conf/settings.xml`.

use std::path::{Path, PathBuf};

/// Find the Maven installation by locating the `mvn` executable.
///
/// - `/opt/maven/bin/mvn` -> `/opt/maven`
///
/// Returns `None` if mvn cannot be found.
pub fn find_maven_home() -> Option<PathBuf> {
    let mvn_path = which::which("mvn").ok()?;
    // Follow symlinks such as /usr/bin/mvn -> /usr/share/maven/bin/mvn
    let mvn_path = std::fs::canonicalize(&mvn_path).unwrap_or(mvn_path);
    mvn_path
        .parent()
        .and_then(|p| p.parent())
        .map(|p| p.to_path_buf())
}

/// Get the user's Maven directory (`~/.m2`).
///
/// Returns `None` if the home directory cannot be determined.
pub fn maven_user_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".m2"))
}

/// Get the path to the user's settings file (`~/.m2/settings.xml`).
pub fn user_settings_path() -> Option<PathBuf> {
    maven_user_dir().map(|dir| dir.join("settings.xml"))
}

/// Get the path to the installation settings file (`{mavenHome}/conf/settings.xml`).
pub fn global_settings_path(maven_home: &Path) -> PathBuf {
    maven_home.join("conf").join("settings.xml")
}
