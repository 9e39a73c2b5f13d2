use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::core::models::key_record::TrustLevel;

/// Outcome of verifying a signed block.
///
/// An invalid or unverifiable signature is data (`valid == false`), never an
/// error. Fields the engine could not report are left empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerificationRecord {
    pub valid: bool,
    pub fingerprint: String,
    pub key_id: String,
    pub username: String,
    pub trust_level: TrustLevel,
    pub trust_text: String,
    pub signature_id: String,
    pub timestamp: Option<DateTime<Utc>>,
}
