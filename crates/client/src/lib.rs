//! Notes data service
//!
//! [`NoteService`] maps the note operations onto HTTP calls against a notes
//! collection URL. Failures never reach the caller: they are logged to the
//! injected [`MessageLog`](notes_common::MessageLog) and replaced by an empty
//! result.

pub mod error;
pub mod service;

pub use error::{ClientError, ClientResult};
pub use service::NoteService;
