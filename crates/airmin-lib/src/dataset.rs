use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use tracing::debug;

use crate::error::{Error, Result};

/// Default filename for the Airmin database.
const DATABASE_FILENAME: &str = "airmin.db";

/// Environment variable overriding the database location.
pub const DATABASE_ENV_VAR: &str = "AIRMIN_DATABASE";

/// Resolve the default database location using platform-specific project directories.
pub fn default_database_path() -> Result<PathBuf> {
    let dirs = ProjectDirs::from("com", "airmin", "airmin").ok_or(Error::ProjectDirsUnavailable)?;
    Ok(dirs.data_dir().join(DATABASE_FILENAME))
}

/// Resolve which database file to use.
///
/// Resolution order:
/// 1. Explicit `target` (a file, or a directory that receives `airmin.db`).
/// 2. `AIRMIN_DATABASE` environment variable.
/// 3. Platform-specific project data directory.
pub fn resolve_database_path(target: Option<&Path>) -> Result<PathBuf> {
    if let Some(explicit) = target {
        return Ok(canonical_database_path(explicit));
    }

    if let Some(env_path) = env::var_os(DATABASE_ENV_VAR) {
        let resolved = canonical_database_path(Path::new(&env_path));
        debug!(path = %resolved.display(), "using database from {DATABASE_ENV_VAR}");
        return Ok(resolved);
    }

    default_database_path()
}

/// Make sure the directory that will hold `path` exists.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

fn canonical_database_path(path: &Path) -> PathBuf {
    if path.extension().is_some() {
        return path.to_path_buf();
    }

    path.join(DATABASE_FILENAME)
}
