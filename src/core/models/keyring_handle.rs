use std::path::{Path, PathBuf};

/// Reference to a directory-backed OpenPGP keyring.
///
/// `ephemeral` handles point at a randomly named directory created by
/// pgpkit itself; the storage is removed when the owning `KeyringState`
/// is torn down. Caller-supplied directories are never removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyringHandle {
    path: PathBuf,
    ephemeral: bool,
}

impl KeyringHandle {
    pub fn new(path: PathBuf, ephemeral: bool) -> Self {
        Self { path, ephemeral }
    }

    /// The keyring home directory (gpg `--homedir`).
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_ephemeral(&self) -> bool {
        self.ephemeral
    }
}

impl std::fmt::Display for KeyringHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.ephemeral {
            write!(f, "{} (ephemeral)", self.path.display())
        } else {
            write!(f, "{}", self.path.display())
        }
    }
}
