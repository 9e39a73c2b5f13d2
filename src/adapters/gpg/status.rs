use crate::core::models::raw_listing::{SignatureStatus, SignatureVerdict};

const STATUS_PREFIX: &str = "[GNUPG:] ";

/// gpg-error code for a bad passphrase (low 16 bits of an `ERROR` status).
const GPG_ERR_BAD_PASSPHRASE: u32 = 11;

/// Machine-readable `--status-fd` output of one gpg invocation, plus the
/// human diagnostics that were interleaved with it on stderr.
#[derive(Debug, Clone, Default)]
pub struct StatusReport {
    records: Vec<(String, Vec<String>)>,
    diagnostics: Vec<String>,
}

impl StatusReport {
    pub fn parse(stderr: &str) -> Self {
        let mut report = Self::default();
        for line in stderr.lines() {
            match line.strip_prefix(STATUS_PREFIX) {
                Some(rest) => {
                    let mut parts = rest.split(' ');
                    let keyword = parts.next().unwrap_or_default().to_string();
                    let args = parts.map(str::to_string).collect();
                    report.records.push((keyword, args));
                }
                None if !line.trim().is_empty() => report.diagnostics.push(line.to_string()),
                None => {}
            }
        }
        report
    }

    pub fn has(&self, keyword: &str) -> bool {
        self.records.iter().any(|(k, _)| k == keyword)
    }

    /// Arguments of the first record with this keyword.
    pub fn args(&self, keyword: &str) -> Option<&[String]> {
        self.records
            .iter()
            .find(|(k, _)| k == keyword)
            .map(|(_, args)| args.as_slice())
    }

    /// Arguments of every record with this keyword, in order.
    pub fn all(&self, keyword: &str) -> impl Iterator<Item = &[String]> {
        self.records
            .iter()
            .filter(move |(k, _)| k == keyword)
            .map(|(_, args)| args.as_slice())
    }

    /// Non-status stderr lines joined for error messages.
    pub fn diagnostics(&self) -> String {
        self.diagnostics.join("; ")
    }

    /// Whether the engine refused a secret key because of its passphrase.
    ///
    /// `passphrase_supplied` distinguishes "no passphrase given for a
    /// protected key" (still a passphrase failure) from unrelated errors.
    pub fn passphrase_rejected(&self, passphrase_supplied: bool) -> bool {
        if self.has("BAD_PASSPHRASE") || self.has("MISSING_PASSPHRASE") {
            return true;
        }
        let prompted = self.has("NEED_PASSPHRASE") || self.has("NEED_PASSPHRASE_SYM");
        if !passphrase_supplied && prompted && !self.has("GOOD_PASSPHRASE") {
            return true;
        }
        let bad_code = self.all("ERROR").any(|args| {
            args.get(1)
                .and_then(|code| code.parse::<u32>().ok())
                .is_some_and(|code| code & 0xFFFF == GPG_ERR_BAD_PASSPHRASE)
        });
        bad_code
            || self
                .diagnostics
                .iter()
                .any(|line| {
                    line.contains("Bad passphrase")
                        || line.contains("No passphrase given")
                        || (!passphrase_supplied && line.contains("can't get input"))
                })
    }

    /// Collect the signature-related records into one status.
    ///
    /// Only the first signature of a message is reported.
    pub fn signature(&self) -> SignatureStatus {
        let mut status = SignatureStatus {
            no_data: self.has("NODATA"),
            ..SignatureStatus::default()
        };

        for (keyword, args) in &self.records {
            let verdict = match keyword.as_str() {
                "GOODSIG" => Some(SignatureVerdict::Good),
                "BADSIG" => Some(SignatureVerdict::Bad),
                "EXPSIG" => Some(SignatureVerdict::ExpiredSignature),
                "EXPKEYSIG" => Some(SignatureVerdict::ExpiredKey),
                "REVKEYSIG" => Some(SignatureVerdict::RevokedKey),
                "ERRSIG" => Some(SignatureVerdict::Error),
                _ => None,
            };

            if let Some(verdict) = verdict {
                if status.verdict.is_some() {
                    continue;
                }
                status.verdict = Some(verdict);
                status.key_id = args.first().cloned().unwrap_or_default();
                if verdict == SignatureVerdict::Error {
                    // ERRSIG <keyid> <pkalgo> <hashalgo> <class> <time> <rc> [<fpr>]
                    status.timestamp = args.get(4).cloned().unwrap_or_default();
                    if let Some(fpr) = args.get(6).filter(|f| f.as_str() != "-") {
                        status.fingerprint = fpr.clone();
                    }
                } else {
                    status.username = args[1.min(args.len())..].join(" ");
                }
                continue;
            }

            match keyword.as_str() {
                "VALIDSIG" if !status.valid_signature => {
                    // VALIDSIG <fpr> <date> <timestamp> <expire> <ver> <rsv> <pk> <hash> <class> [<primary>]
                    status.valid_signature = true;
                    status.fingerprint = args.first().cloned().unwrap_or_default();
                    status.timestamp = args.get(2).cloned().unwrap_or_default();
                    status.primary_fingerprint = args
                        .get(9)
                        .cloned()
                        .unwrap_or_else(|| status.fingerprint.clone());
                }
                "SIG_ID" if status.signature_id.is_empty() => {
                    status.signature_id = args.first().cloned().unwrap_or_default();
                    if status.timestamp.is_empty() {
                        status.timestamp = args.get(2).cloned().unwrap_or_default();
                    }
                }
                k if k.starts_with("TRUST_") && status.trust.is_empty() => {
                    status.trust = k.to_string();
                }
                _ => {}
            }
        }

        status
    }
}
