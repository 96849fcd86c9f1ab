//! Scratch browser profile directories.
//!
//! Every session gets its own profile directory. It lives exactly as long as
//! the [`ProfileDir`] value and is removed on drop, so a failing scenario does
//! not leave stale browser state behind for the next one. A fixed directory
//! is only ever cleared when warnprobe created it.

use crate::result::{ProbeError, ProbeResult};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const PROFILE_PREFIX: &str = "warnprobe-profile-";

/// File written into every fixed profile directory warnprobe manages.
///
/// A non-empty directory without it is never cleared or removed.
pub const PROFILE_MARKER: &str = ".warnprobe-profile";

#[derive(Debug)]
enum Backing {
    Temp(TempDir),
    Fixed {
        path: PathBuf,
        /// Remove the directory itself at teardown, not just its contents
        owned: bool,
    },
}

/// A browser profile directory owned by one session
#[derive(Debug)]
pub struct ProfileDir {
    backing: Option<Backing>,
}

impl ProfileDir {
    /// Create a fresh, uniquely named directory under the system temp dir
    pub fn scratch() -> ProbeResult<Self> {
        let dir = tempfile::Builder::new()
            .prefix(PROFILE_PREFIX)
            .tempdir()
            .map_err(|e| ProbeError::Profile {
                message: format!("cannot create scratch profile: {e}"),
            })?;
        tracing::debug!(path = %dir.path().display(), "created scratch profile");
        Ok(Self {
            backing: Some(Backing::Temp(dir)),
        })
    }

    /// Use a fixed path.
    ///
    /// A missing directory is created and removed at teardown. An existing
    /// one is reused only when it is empty or carries [`PROFILE_MARKER`] from
    /// an earlier run; a marked directory is cleared first. An empty
    /// directory supplied by the caller is emptied again at teardown but kept.
    ///
    /// # Errors
    ///
    /// [`ProbeError::Profile`] when the path is not a directory, holds
    /// unrelated files, or cannot be created.
    pub fn at(path: impl Into<PathBuf>) -> ProbeResult<Self> {
        let path = path.into();
        let profile_err = |action: &str, e: std::io::Error| ProbeError::Profile {
            message: format!("cannot {action} {}: {e}", path.display()),
        };

        let owned = if path.exists() {
            if !path.is_dir() {
                return Err(ProbeError::Profile {
                    message: format!("{} is not a directory", path.display()),
                });
            }
            if path.join(PROFILE_MARKER).is_file() {
                tracing::debug!(path = %path.display(), "removing stale profile");
                fs::remove_dir_all(&path).map_err(|e| profile_err("clear", e))?;
                true
            } else if is_empty_dir(&path).map_err(|e| profile_err("read", e))? {
                false
            } else {
                return Err(ProbeError::Profile {
                    message: format!(
                        "refusing to use {}: directory is not empty and was not created by warnprobe",
                        path.display()
                    ),
                });
            }
        } else {
            true
        };

        fs::create_dir_all(&path).map_err(|e| profile_err("create", e))?;
        fs::write(path.join(PROFILE_MARKER), "").map_err(|e| profile_err("mark", e))?;
        Ok(Self {
            backing: Some(Backing::Fixed { path, owned }),
        })
    }

    /// Create a profile at `path` when given, otherwise a scratch one
    pub fn create(path: Option<&Path>) -> ProbeResult<Self> {
        match path {
            Some(p) => Self::at(p),
            None => Self::scratch(),
        }
    }

    /// Path of the profile directory
    #[must_use]
    pub fn path(&self) -> &Path {
        match &self.backing {
            Some(Backing::Temp(dir)) => dir.path(),
            Some(Backing::Fixed { path, .. }) => path,
            None => Path::new(""),
        }
    }

    /// Remove the directory now and report failures
    pub fn remove(mut self) -> ProbeResult<()> {
        match self.backing.take() {
            Some(Backing::Temp(dir)) => dir.close().map_err(|e| ProbeError::Profile {
                message: format!("cannot remove scratch profile: {e}"),
            }),
            Some(Backing::Fixed { path, owned }) => {
                release_fixed(&path, owned).map_err(|e| ProbeError::Profile {
                    message: format!("cannot remove {}: {e}", path.display()),
                })
            }
            None => Ok(()),
        }
    }
}

impl Drop for ProfileDir {
    fn drop(&mut self) {
        if let Some(Backing::Fixed { path, owned }) = self.backing.take() {
            if let Err(e) = release_fixed(&path, owned) {
                tracing::warn!(path = %path.display(), error = %e, "profile cleanup failed");
            }
        }
        // TempDir removes itself on drop.
    }
}

fn is_empty_dir(path: &Path) -> std::io::Result<bool> {
    Ok(fs::read_dir(path)?.next().is_none())
}

fn release_fixed(path: &Path, owned: bool) -> std::io::Result<()> {
    if owned {
        return remove_if_present(path);
    }
    let entries = match fs::read_dir(path) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e),
    };
    for entry in entries {
        let entry_path = entry?.path();
        if entry_path.is_dir() {
            remove_if_present(&entry_path)?;
        } else {
            fs::remove_file(&entry_path)?;
        }
    }
    Ok(())
}

fn remove_if_present(path: &Path) -> std::io::Result<()> {
    match fs::remove_dir_all(path) {
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}
