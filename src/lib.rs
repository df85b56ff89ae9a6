//! BookTrack view controllers
//!
//! Each page of the reading library (search, library list, book detail) is
//! a controller that owns its render model and talks to the backend through
//! [`booktrack_http::LibraryApi`].

pub mod modules;
pub mod utils;

pub use modules::*;
