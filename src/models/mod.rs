mod album;
mod request;

pub use album::AlbumRecord;
pub use request::{BuildRequest, GridSize, Period};
