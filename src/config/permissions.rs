use std::fs::{File, Metadata};
use std::path::Path;

use crate::errors::{ConfigError, ConfigResult};

/// Only the owner may read and write the config file.
pub const REQUIRED_MODE: u32 = 0o600;

/// Opens `path` and fails unless it is a regular file with mode exactly 0600.
///
/// The mode is taken from the open handle, which is also what the caller
/// reads from, so the checked file and the parsed file are the same inode.
pub fn open_owner_only(path: &Path) -> ConfigResult<File> {
    let load_error = |source: std::io::Error| ConfigError::LoadError {
        path: path.display().to_string(),
        source,
    };
    let file = File::open(path).map_err(load_error)?;
    let metadata = file.metadata().map_err(load_error)?;
    check_metadata(path, &metadata)?;
    Ok(file)
}

#[cfg(unix)]
fn check_metadata(path: &Path, metadata: &Metadata) -> ConfigResult<()> {
    use std::os::unix::fs::PermissionsExt;

    let mode = metadata.permissions().mode() & 0o7777;
    if !metadata.is_file() || mode != REQUIRED_MODE {
        return Err(ConfigError::PermissionError {
            path: path.display().to_string(),
            mode,
        });
    }
    Ok(())
}

#[cfg(not(unix))]
fn check_metadata(path: &Path, metadata: &Metadata) -> ConfigResult<()> {
    if !metadata.is_file() {
        return Err(ConfigError::PermissionError {
            path: path.display().to_string(),
            mode: 0,
        });
    }
    Ok(())
}
