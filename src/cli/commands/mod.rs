pub mod decrypt;
pub mod encrypt;
pub mod io_helpers;
pub mod keys;
pub mod sign;
pub mod symmetric;
pub mod verify;
pub mod version;
