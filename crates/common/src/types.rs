//! Core types for Notes

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Server-assigned note identifier
pub type NoteId = i64;

/// A note as stored by the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub name: String,
}

impl Note {
    pub fn new(id: NoteId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    /// Copy of this note carrying a different name
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        Self {
            id: self.id,
            name: name.into(),
        }
    }
}

impl std::fmt::Display for Note {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.id, self.name)
    }
}

/// Body of a create request. The server picks the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewNote {
    pub name: String,
}

impl NewNote {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A note addressed either by id or by an entity the caller already holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteRef<'a> {
    Id(NoteId),
    Note(&'a Note),
}

impl NoteRef<'_> {
    pub fn id(&self) -> NoteId {
        match self {
            NoteRef::Id(id) => *id,
            NoteRef::Note(note) => note.id,
        }
    }
}

impl From<NoteId> for NoteRef<'static> {
    fn from(id: NoteId) -> Self {
        NoteRef::Id(id)
    }
}

impl<'a> From<&'a Note> for NoteRef<'a> {
    fn from(note: &'a Note) -> Self {
        NoteRef::Note(note)
    }
}

/// Hypermedia link
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub href: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub templated: bool,
}

impl Link {
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            templated: false,
        }
    }
}

/// Named links of a resource (`self`, `profile`, `search`, ...)
pub type Links = BTreeMap<String, Link>;

/// Embedded part of a collection response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddedNotes {
    #[serde(default)]
    pub notes: Vec<Note>,
}

/// Collection response wrapping the notes under `_embedded`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteCollection {
    #[serde(rename = "_embedded", default)]
    pub embedded: EmbeddedNotes,
    #[serde(rename = "_links", default, skip_serializing_if = "BTreeMap::is_empty")]
    pub links: Links,
}

impl NoteCollection {
    pub fn into_notes(self) -> Vec<Note> {
        self.embedded.notes
    }
}

impl From<NoteCollection> for Vec<Note> {
    fn from(collection: NoteCollection) -> Self {
        collection.into_notes()
    }
}

/// Status the server returned for a write whose body is not relied on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Acknowledgement {
    pub status: u16,
}

/// Number of notes on the dashboard
pub const DASHBOARD_SIZE: usize = 4;

/// Dashboard slice: the notes at positions 1 through 4, fewer on short lists
pub fn top_notes(notes: &[Note]) -> &[Note] {
    let end = notes.len().min(1 + DASHBOARD_SIZE);
    notes.get(1..end).unwrap_or(&[])
}
