//! Local share directory preparation

use crate::config::DirMode;
use crate::error::ShareError;
use std::fs;
use std::io;
use std::path::Path;
use tracing::{info, warn};

/// What `prepare_share_dir` found or did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectoryState {
    /// Created by this call and given the configured mode
    Created,
    /// Already present; left untouched
    Existing,
}

/// Make sure the share directory exists before any remote call
///
/// A missing directory is created (parents included) and then chmod'ed to
/// `mode`. The two steps are not atomic: if the chmod fails the directory
/// stays behind with umask-derived permissions and the error is returned.
/// An existing directory keeps its permissions.
pub fn prepare_share_dir(path: &Path, mode: DirMode) -> Result<DirectoryState, ShareError> {
    if path.is_dir() {
        return Ok(DirectoryState::Existing);
    }

    if path.exists() {
        return Err(ShareError::local_io(
            path,
            io::Error::new(io::ErrorKind::AlreadyExists, "exists and is not a directory"),
        ));
    }

    fs::create_dir_all(path).map_err(|e| ShareError::local_io(path, e))?;
    set_mode(path, mode).map_err(|e| ShareError::local_io(path, e))?;

    if mode.is_world_writable() {
        warn!(path = %path.display(), %mode, "Created world-writable share directory");
    } else {
        info!(path = %path.display(), %mode, "Created share directory");
    }
    Ok(DirectoryState::Created)
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: DirMode) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode.bits()))
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: DirMode) -> io::Result<()> {
    Ok(())
}
