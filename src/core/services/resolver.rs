use crate::core::models::key_record::KeyRecord;

/// Result of looking an identifier up in one keyring listing.
#[derive(Debug)]
pub enum Resolution<'a> {
    Found(&'a KeyRecord),
    NotFound,
    Ambiguous(Vec<&'a KeyRecord>),
}

/// Resolve `identifier` against `records`.
///
/// Tried in order: exact fingerprint, exact key id (16 hex, or the 8 hex
/// short form), then case-sensitive substring of any user id. Hex forms
/// ignore case and an optional `0x` prefix. More than one match at the
/// deciding stage is ambiguous.
pub fn resolve<'a>(records: &'a [KeyRecord], identifier: &str) -> Resolution<'a> {
    let trimmed = identifier.trim();
    if trimmed.is_empty() {
        return Resolution::NotFound;
    }

    let hex = normalize_hex(trimmed);
    if let Some(hex) = &hex {
        let by_fingerprint: Vec<&KeyRecord> = records
            .iter()
            .filter(|r| r.fingerprint.eq_ignore_ascii_case(hex))
            .collect();
        if !by_fingerprint.is_empty() {
            return decide(by_fingerprint);
        }

        let by_key_id: Vec<&KeyRecord> = records
            .iter()
            .filter(|r| match hex.len() {
                16 => r.key_id.eq_ignore_ascii_case(hex),
                8 => r.short_id().eq_ignore_ascii_case(hex),
                _ => false,
            })
            .collect();
        if !by_key_id.is_empty() {
            return decide(by_key_id);
        }
    }

    let by_uid: Vec<&KeyRecord> = records
        .iter()
        .filter(|r| r.uids.iter().any(|uid| uid.contains(trimmed)))
        .collect();
    decide(by_uid)
}

fn decide(mut matches: Vec<&KeyRecord>) -> Resolution<'_> {
    match matches.len() {
        0 => Resolution::NotFound,
        1 => Resolution::Found(matches.remove(0)),
        _ => Resolution::Ambiguous(matches),
    }
}

/// Uppercase hex without `0x`, or `None` if the identifier is not hex.
fn normalize_hex(identifier: &str) -> Option<String> {
    let bare = identifier
        .strip_prefix("0x")
        .or_else(|| identifier.strip_prefix("0X"))
        .unwrap_or(identifier);
    if !bare.is_empty() && bare.chars().all(|c| c.is_ascii_hexdigit()) {
        Some(bare.to_ascii_uppercase())
    } else {
        None
    }
}
