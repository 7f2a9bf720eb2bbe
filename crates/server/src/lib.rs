//! Notes reference backend
//!
//! Serves the notes collection the data service consumes: a hypermedia list
//! at `/notes`, an id filter at `/notes/?id=`, item routes at `/notes/{id}`
//! and a name search at `/notes/search/name`.

pub mod config;
pub mod error;
pub mod server;
pub mod store;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use server::{LocalServer, NotesServer};
pub use store::NoteStore;
