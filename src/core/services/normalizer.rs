use chrono::{DateTime, Utc};

use crate::core::errors::{PgpError, Result};
use crate::core::models::key_record::{KeyRecord, SubkeyRecord, TrustLevel};
use crate::core::models::raw_listing::{RawKeyEntry, RawSubkey, SignatureStatus, SignatureVerdict};
use crate::core::models::verification::VerificationRecord;

/// Turn one raw listing entry into a `KeyRecord`.
pub fn key_record(raw: &RawKeyEntry) -> KeyRecord {
    KeyRecord {
        fingerprint: raw.fingerprint.clone(),
        key_id: raw.key_id.clone(),
        uids: raw.uids.clone(),
        length: raw.length.parse().unwrap_or(0),
        algorithm: algorithm_name(&raw.algorithm),
        created: parse_timestamp(&raw.created),
        expires: parse_timestamp(&raw.expires),
        trust: raw
            .validity
            .chars()
            .next()
            .map(TrustLevel::from_validity_char)
            .unwrap_or_default(),
        subkeys: raw.subkeys.iter().map(subkey_record).collect(),
        secret: raw.record_type == "sec",
    }
}

fn subkey_record(raw: &RawSubkey) -> SubkeyRecord {
    SubkeyRecord {
        fingerprint: raw.fingerprint.clone(),
        key_id: raw.key_id.clone(),
        length: raw.length.parse().unwrap_or(0),
        algorithm: algorithm_name(&raw.algorithm),
        capabilities: raw.capabilities.clone(),
        created: parse_timestamp(&raw.created),
        expires: parse_timestamp(&raw.expires),
    }
}

/// Shape a signature status into a `VerificationRecord`.
///
/// Fails only when the engine saw no signature at all.
pub fn verification_record(status: &SignatureStatus) -> Result<VerificationRecord> {
    let Some(verdict) = status.verdict else {
        return Err(PgpError::VerificationError {
            reason: if status.no_data {
                "input is not an OpenPGP signed block".into()
            } else {
                "no signature found".into()
            },
        });
    };

    let trust_level = if status.trust.is_empty() {
        TrustLevel::Unknown
    } else {
        TrustLevel::from_status_keyword(&status.trust)
    };

    let fingerprint = if status.primary_fingerprint.is_empty() {
        status.fingerprint.clone()
    } else {
        status.primary_fingerprint.clone()
    };

    Ok(VerificationRecord {
        valid: verdict == SignatureVerdict::Good && status.valid_signature,
        fingerprint,
        key_id: status.key_id.clone(),
        username: status.username.clone(),
        trust_level,
        trust_text: if status.trust.is_empty() {
            String::new()
        } else {
            trust_level.as_text().to_string()
        },
        signature_id: status.signature_id.clone(),
        timestamp: parse_timestamp(&status.timestamp),
    })
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if s.is_empty() {
        return None;
    }
    s.parse::<i64>()
        .ok()
        .filter(|ts| *ts > 0)
        .and_then(|ts| DateTime::from_timestamp(ts, 0))
}

fn algorithm_name(code: &str) -> String {
    match code {
        "1" | "2" | "3" => "RSA".to_string(),
        "16" | "20" => "Elgamal".to_string(),
        "17" => "DSA".to_string(),
        "18" => "ECDH".to_string(),
        "19" => "ECDSA".to_string(),
        "22" => "EdDSA".to_string(),
        "" => String::new(),
        other => format!("ALG{other}"),
    }
}
