use tracing::debug;

use crate::core::models::raw_listing::{RawKeyEntry, RawSubkey};

/// Parse `gpg --with-colons --fixed-list-mode` key listings.
///
/// Primary keys start at `pub`/`sec`; `fpr` attaches to whichever key
/// record precedes it. Entries without a fingerprint are dropped.
pub fn parse_key_listing(output: &str) -> Vec<RawKeyEntry> {
    let mut keys = Vec::new();
    let mut current: Option<RawKeyEntry> = None;
    // Set while the most recent key record was a subkey.
    let mut in_subkey = false;

    for line in output.lines() {
        let fields: Vec<&str> = line.split(':').collect();

        match fields[0] {
            "pub" | "sec" => {
                if let Some(entry) = current.take() {
                    push_entry(&mut keys, entry);
                }
                current = Some(entry_from_fields(&fields));
                in_subkey = false;
            }
            "sub" | "ssb" if current.is_some() => {
                if let Some(ref mut entry) = current {
                    entry.subkeys.push(subkey_from_fields(&fields));
                }
                in_subkey = true;
            }
            "fpr" if current.is_some() && fields.len() > 9 => {
                if let Some(ref mut entry) = current {
                    let fpr = fields[9].to_string();
                    if in_subkey {
                        if let Some(sub) = entry.subkeys.last_mut()
                            && sub.fingerprint.is_empty()
                        {
                            sub.fingerprint = fpr;
                        }
                    } else if entry.fingerprint.is_empty() {
                        entry.fingerprint = fpr;
                    }
                }
            }
            "uid" if current.is_some() && fields.len() > 9 => {
                if let Some(ref mut entry) = current {
                    entry.uids.push(unescape_colon_field(fields[9]));
                }
            }
            "grp" | "tru" | "rvk" | "uat" | "rev" | "sig" | "cfg" => {}
            other if !other.is_empty() => {
                debug!(record_type = other, "skipping unknown gpg record type");
            }
            _ => {}
        }
    }

    if let Some(entry) = current {
        push_entry(&mut keys, entry);
    }

    keys
}

fn push_entry(keys: &mut Vec<RawKeyEntry>, entry: RawKeyEntry) {
    if entry.fingerprint.is_empty() {
        debug!(key_id = %entry.key_id, "skipping key without fingerprint");
    } else {
        keys.push(entry);
    }
}

fn field(fields: &[&str], idx: usize) -> String {
    fields.get(idx).map(|s| s.to_string()).unwrap_or_default()
}

fn entry_from_fields(fields: &[&str]) -> RawKeyEntry {
    RawKeyEntry {
        record_type: field(fields, 0),
        validity: field(fields, 1),
        length: field(fields, 2),
        algorithm: field(fields, 3),
        key_id: field(fields, 4),
        created: field(fields, 5),
        expires: field(fields, 6),
        ..RawKeyEntry::default()
    }
}

fn subkey_from_fields(fields: &[&str]) -> RawSubkey {
    RawSubkey {
        length: field(fields, 2),
        algorithm: field(fields, 3),
        key_id: field(fields, 4),
        created: field(fields, 5),
        expires: field(fields, 6),
        capabilities: field(fields, 11),
        fingerprint: String::new(),
    }
}

/// gpg escapes `:` and control bytes in user ids as `\xHH`.
fn unescape_colon_field(raw: &str) -> String {
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\'
            && i + 4 <= bytes.len()
            && bytes[i + 1] == b'x'
            && let Ok(hex) = std::str::from_utf8(&bytes[i + 2..i + 4])
            && let Ok(byte) = u8::from_str_radix(hex, 16)
        {
            out.push(byte);
            i += 4;
            continue;
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}
