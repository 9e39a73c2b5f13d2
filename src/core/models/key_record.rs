use chrono::{DateTime, Utc};
use serde::Serialize;

/// Trust (validity) level reported by the engine for a key or signature.
///
/// Values correspond to the validity column of gpg's `--with-colons`
/// listing and to the `TRUST_*` status lines emitted while verifying.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum TrustLevel {
    #[default]
    Unknown,
    Undefined,
    Never,
    Marginal,
    Full,
    Ultimate,
    Expired,
    Revoked,
}

impl TrustLevel {
    /// Parse the validity character from a colon listing.
    pub fn from_validity_char(c: char) -> Self {
        match c {
            'o' | '-' => Self::Unknown,
            'q' => Self::Undefined,
            'n' => Self::Never,
            'm' => Self::Marginal,
            'f' => Self::Full,
            'u' => Self::Ultimate,
            'e' => Self::Expired,
            'r' => Self::Revoked,
            _ => Self::Unknown,
        }
    }

    /// Parse a `TRUST_*` status keyword (e.g. `TRUST_ULTIMATE`).
    pub fn from_status_keyword(keyword: &str) -> Self {
        match keyword {
            "TRUST_ULTIMATE" => Self::Ultimate,
            "TRUST_FULLY" => Self::Full,
            "TRUST_MARGINAL" => Self::Marginal,
            "TRUST_NEVER" => Self::Never,
            "TRUST_UNDEFINED" => Self::Undefined,
            _ => Self::Unknown,
        }
    }

    /// Display text matching the engine's status vocabulary.
    pub fn as_text(&self) -> &'static str {
        match self {
            Self::Ultimate => "TRUST_ULTIMATE",
            Self::Full => "TRUST_FULLY",
            Self::Marginal => "TRUST_MARGINAL",
            Self::Never => "TRUST_NEVER",
            Self::Undefined => "TRUST_UNDEFINED",
            Self::Unknown => "TRUST_UNKNOWN",
            Self::Expired => "TRUST_EXPIRED",
            Self::Revoked => "TRUST_REVOKED",
        }
    }
}

impl std::fmt::Display for TrustLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_text())
    }
}

/// A subordinate key attached to a primary key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubkeyRecord {
    pub fingerprint: String,
    pub key_id: String,
    pub length: u32,
    pub algorithm: String,
    pub capabilities: String,
    pub created: Option<DateTime<Utc>>,
    pub expires: Option<DateTime<Utc>>,
}

/// Normalized view of one keyring entry.
///
/// Re-derived from the engine listing on every query; nothing here is
/// cached between calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyRecord {
    pub fingerprint: String,
    /// Long (16 hex) key id; the low 64 bits of the fingerprint.
    pub key_id: String,
    pub uids: Vec<String>,
    pub length: u32,
    pub algorithm: String,
    pub created: Option<DateTime<Utc>>,
    /// `None` means the key never expires.
    pub expires: Option<DateTime<Utc>>,
    pub trust: TrustLevel,
    pub subkeys: Vec<SubkeyRecord>,
    /// Whether this record came from the secret-key listing.
    pub secret: bool,
}

impl KeyRecord {
    /// Classic 8-hex short key id.
    pub fn short_id(&self) -> &str {
        let len = self.key_id.len();
        &self.key_id[len.saturating_sub(8)..]
    }

    /// First user id, or an empty string for keys without one.
    pub fn primary_uid(&self) -> &str {
        self.uids.first().map(String::as_str).unwrap_or("")
    }
}

impl std::fmt::Display for KeyRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {}{} {}",
            self.fingerprint,
            self.algorithm.to_lowercase(),
            self.length,
            self.primary_uid()
        )
    }
}
