pub mod encryption_service;
pub mod key_service;
pub mod keyring_state;
pub mod normalizer;
pub mod resolver;
pub mod session;
pub mod signature_service;

#[cfg(test)]
pub mod test_support;
