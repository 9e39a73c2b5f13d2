pub mod key_record;
pub mod keyring_handle;
pub mod raw_listing;
pub mod requests;
pub mod verification;
