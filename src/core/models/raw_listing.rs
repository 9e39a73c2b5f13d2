/// One primary key as reported by the engine listing, fields still textual.
///
/// Produced by the engine adapter; turned into a `KeyRecord` by the
/// normalizer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawKeyEntry {
    /// `pub` or `sec`.
    pub record_type: String,
    pub validity: String,
    pub length: String,
    pub algorithm: String,
    pub key_id: String,
    pub created: String,
    pub expires: String,
    pub fingerprint: String,
    pub uids: Vec<String>,
    pub subkeys: Vec<RawSubkey>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawSubkey {
    pub length: String,
    pub algorithm: String,
    pub key_id: String,
    pub created: String,
    pub expires: String,
    pub capabilities: String,
    pub fingerprint: String,
}

/// How the engine judged a signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureVerdict {
    Good,
    Bad,
    /// The signature could not be checked (usually a missing public key).
    Error,
    ExpiredSignature,
    ExpiredKey,
    RevokedKey,
}

/// Signature-related status collected from one engine invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignatureStatus {
    pub verdict: Option<SignatureVerdict>,
    pub key_id: String,
    pub username: String,
    /// Signing (sub)key fingerprint from `VALIDSIG` or `ERRSIG`.
    pub fingerprint: String,
    /// Primary key fingerprint from `VALIDSIG`.
    pub primary_fingerprint: String,
    pub signature_id: String,
    /// Unix timestamp of signature creation.
    pub timestamp: String,
    /// `TRUST_*` keyword, if one was emitted.
    pub trust: String,
    pub valid_signature: bool,
    /// The engine found no OpenPGP data at all.
    pub no_data: bool,
}
