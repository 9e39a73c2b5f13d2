use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use tempfile::TempDir;
use tracing::{debug, info};

use crate::core::errors::{PgpError, Result};
use crate::core::models::keyring_handle::KeyringHandle;

const EPHEMERAL_PREFIX: &str = "pgpkit_";

/// Agent settings written into every keyring pgpkit configures: no
/// passphrase caching, so a wrong passphrase is always reported as such.
const AGENT_CONF: &str = "default-cache-ttl 0\nmax-cache-ttl 0\nallow-loopback-pinentry\n";

/// Owns the active keyring location and the lock that serializes mutations
/// against it.
///
/// Exactly one handle is active at a time. `configure` replaces it; a
/// replaced ephemeral directory is deleted since nothing can reach it any
/// more. Ephemeral storage is also removed on `teardown` or drop.
pub struct KeyringState {
    handle: KeyringHandle,
    ephemeral_dir: Option<TempDir>,
    mutation: Mutex<()>,
}

impl KeyringState {
    /// Create a fresh, randomly named keyring under the system temp dir.
    pub fn ephemeral() -> Result<Self> {
        let (handle, dir) = create_ephemeral()?;
        Ok(Self {
            handle,
            ephemeral_dir: Some(dir),
            mutation: Mutex::new(()),
        })
    }

    /// Use a caller-supplied directory, creating it if needed.
    pub fn at(path: impl Into<PathBuf>) -> Result<Self> {
        let handle = prepare_custom(path.into())?;
        Ok(Self {
            handle,
            ephemeral_dir: None,
            mutation: Mutex::new(()),
        })
    }

    /// `at(path)` when a path is given, `ephemeral()` otherwise.
    pub fn open(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::at(p),
            None => Self::ephemeral(),
        }
    }

    /// Switch to another keyring. Contents are not carried over.
    pub fn configure(&mut self, path: Option<&Path>) -> Result<&KeyringHandle> {
        let (handle, dir) = match path {
            Some(p) => (prepare_custom(p.to_path_buf())?, None),
            None => {
                let (handle, dir) = create_ephemeral()?;
                (handle, Some(dir))
            }
        };

        let previous = std::mem::replace(&mut self.ephemeral_dir, dir);
        self.handle = handle;
        drop(previous);

        info!(keyring = %self.handle, "keyring configured");
        Ok(&self.handle)
    }

    pub fn handle(&self) -> &KeyringHandle {
        &self.handle
    }

    /// Serialize a mutating keyring operation (generate, import, delete).
    ///
    /// The guarded data is `()`, so a poisoned lock is simply recovered.
    pub fn lock_mutations(&self) -> MutexGuard<'_, ()> {
        self.mutation
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Remove ephemeral storage now. Caller-supplied directories are left
    /// untouched.
    pub fn teardown(mut self) -> Result<()> {
        if let Some(dir) = self.ephemeral_dir.take() {
            let path = dir.path().to_path_buf();
            dir.close().map_err(|e| PgpError::StorageUnavailable {
                path,
                reason: format!("failed to remove ephemeral keyring: {e}"),
            })?;
        }
        Ok(())
    }
}

fn create_ephemeral() -> Result<(KeyringHandle, TempDir)> {
    let dir = tempfile::Builder::new()
        .prefix(EPHEMERAL_PREFIX)
        .tempdir()
        .map_err(|e| PgpError::StorageUnavailable {
            path: std::env::temp_dir(),
            reason: e.to_string(),
        })?;
    let path = dir.path().to_path_buf();
    restrict_permissions(&path).map_err(|e| PgpError::StorageUnavailable {
        path: path.clone(),
        reason: e.to_string(),
    })?;
    write_agent_conf(&path)?;
    debug!(path = %path.display(), "created ephemeral keyring");
    Ok((KeyringHandle::new(path, true), dir))
}

fn prepare_custom(path: PathBuf) -> Result<KeyringHandle> {
    if path.exists() && !path.is_dir() {
        return Err(PgpError::StorageUnavailable {
            path,
            reason: "path exists and is not a directory".into(),
        });
    }

    let unavailable = |e: std::io::Error| PgpError::StorageUnavailable {
        path: path.clone(),
        reason: e.to_string(),
    };
    std::fs::create_dir_all(&path).map_err(unavailable)?;
    restrict_permissions(&path).map_err(unavailable)?;
    // Probe writability up front instead of letting gpg fail later.
    tempfile::tempfile_in(&path).map_err(unavailable)?;

    write_agent_conf(&path)?;
    Ok(KeyringHandle::new(path, false))
}

fn write_agent_conf(dir: &Path) -> Result<()> {
    let conf = dir.join("gpg-agent.conf");
    if conf.exists() {
        return Ok(());
    }
    std::fs::write(&conf, AGENT_CONF).map_err(|e| PgpError::StorageUnavailable {
        path: dir.to_path_buf(),
        reason: format!("cannot write gpg-agent.conf: {e}"),
    })
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ephemeral_keyring_is_created_and_removed() {
        let state = KeyringState::ephemeral().unwrap();
        let path = state.handle().path().to_path_buf();
        assert!(state.handle().is_ephemeral());
        assert!(path.is_dir());
        assert!(path.join("gpg-agent.conf").exists());
        assert!(
            path.file_name()
                .unwrap()
                .to_string_lossy()
                .starts_with(EPHEMERAL_PREFIX)
        );
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o700);
        }

        state.teardown().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn custom_directory_is_created_and_kept() {
        let dir = tempfile::tempdir().unwrap();
        let home = dir.path().join("nested").join("gnupg");

        let state = KeyringState::at(&home).unwrap();
        assert!(!state.handle().is_ephemeral());
        assert_eq!(state.handle().path(), home.as_path());
        assert!(home.is_dir());

        state.teardown().unwrap();
        assert!(home.is_dir());
    }

    #[test]
    fn configure_replaces_handle_and_drops_old_ephemeral() {
        let mut state = KeyringState::ephemeral().unwrap();
        let old = state.handle().path().to_path_buf();

        let dir = tempfile::tempdir().unwrap();
        let handle = state.configure(Some(dir.path())).unwrap().clone();

        assert_eq!(handle.path(), dir.path());
        assert!(!handle.is_ephemeral());
        assert!(!old.exists());
    }

    #[test]
    fn configure_without_path_creates_new_ephemeral() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = KeyringState::at(dir.path()).unwrap();
        let handle = state.configure(None).unwrap().clone();
        assert!(handle.is_ephemeral());
        assert_ne!(handle.path(), dir.path());
    }

    #[test]
    fn file_in_place_of_directory_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("not-a-dir");
        std::fs::write(&file, "x").unwrap();

        let result = KeyringState::at(&file);
        assert!(matches!(result, Err(PgpError::StorageUnavailable { .. })));
    }

    #[test]
    fn existing_agent_conf_is_preserved() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("gpg-agent.conf"), "custom\n").unwrap();
        let _state = KeyringState::at(dir.path()).unwrap();
        let content = std::fs::read_to_string(dir.path().join("gpg-agent.conf")).unwrap();
        assert_eq!(content, "custom\n");
    }
}
