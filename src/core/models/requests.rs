use secrecy::SecretString;

/// Passphrases never leave a `SecretString` except when handed to the engine.
pub type Passphrase = SecretString;

/// Wrap a plain string as a passphrase.
pub fn passphrase(value: impl Into<String>) -> Passphrase {
    SecretString::from(value.into())
}

pub const DEFAULT_KEY_LENGTH: u32 = 2048;
pub const DEFAULT_EXPIRE: &str = "0";
pub const DEFAULT_ARMOR: bool = true;

/// Parameters for generating a new key pair.
#[derive(Debug, Clone)]
pub struct KeyGenParams {
    pub email: String,
    pub name: String,
    pub key_length: u32,
    pub passphrase: Option<Passphrase>,
    /// `"0"` for a non-expiring key, otherwise anything gpg accepts
    /// (`"1y"`, `"30d"`, `"2030-01-01"`).
    pub expire: String,
}

impl KeyGenParams {
    pub fn new(email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: name.into(),
            key_length: DEFAULT_KEY_LENGTH,
            passphrase: None,
            expire: DEFAULT_EXPIRE.to_string(),
        }
    }

    pub fn key_length(mut self, bits: u32) -> Self {
        self.key_length = bits;
        self
    }

    pub fn passphrase(mut self, passphrase: Passphrase) -> Self {
        self.passphrase = Some(passphrase);
        self
    }

    pub fn expire(mut self, spec: impl Into<String>) -> Self {
        self.expire = spec.into();
        self
    }
}

/// One or more recipient identifiers, in caller order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipients(Vec<String>);

impl Recipients {
    /// Identifiers in caller order with duplicates removed.
    pub fn identifiers(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for id in &self.0 {
            if !seen.contains(&id.as_str()) {
                seen.push(id.as_str());
            }
        }
        seen
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for Recipients {
    fn from(value: &str) -> Self {
        Self(vec![value.to_string()])
    }
}

impl From<String> for Recipients {
    fn from(value: String) -> Self {
        Self(vec![value])
    }
}

impl From<Vec<String>> for Recipients {
    fn from(value: Vec<String>) -> Self {
        Self(value)
    }
}

impl From<&[&str]> for Recipients {
    fn from(value: &[&str]) -> Self {
        Self(value.iter().map(|s| s.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Recipients {
    fn from(value: [&str; N]) -> Self {
        Self(value.iter().map(|s| s.to_string()).collect())
    }
}

/// Optional knobs for public-key encryption.
#[derive(Debug, Clone)]
pub struct EncryptOptions {
    /// Identifier of the key to co-sign with.
    pub sign: Option<String>,
    /// Unlocks the signer's secret key; never used as a symmetric password.
    pub passphrase: Option<Passphrase>,
    pub armor: bool,
}

impl Default for EncryptOptions {
    fn default() -> Self {
        Self {
            sign: None,
            passphrase: None,
            armor: DEFAULT_ARMOR,
        }
    }
}

/// Encrypted output, either ASCII-armored text or raw OpenPGP packets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ciphertext {
    Armored(String),
    Binary(Vec<u8>),
}

impl Ciphertext {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Ciphertext::Armored(text) => text.as_bytes(),
            Ciphertext::Binary(bytes) => bytes,
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Ciphertext::Armored(text) => text.into_bytes(),
            Ciphertext::Binary(bytes) => bytes,
        }
    }

    /// The armored text, if this ciphertext is armored.
    pub fn as_armored(&self) -> Option<&str> {
        match self {
            Ciphertext::Armored(text) => Some(text),
            Ciphertext::Binary(_) => None,
        }
    }
}
