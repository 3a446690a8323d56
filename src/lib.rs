// Library modules for the collage service
// The binary only wires these together

pub mod api;
pub mod builder;
pub mod config;
pub mod covers;
pub mod error;
pub mod fetch;
pub mod grid;
pub mod lastfm;
pub mod models;

#[cfg(test)]
pub mod test_utils;
