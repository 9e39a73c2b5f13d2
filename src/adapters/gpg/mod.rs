pub mod colon_listing;
pub mod gpg_engine;
pub mod status;
